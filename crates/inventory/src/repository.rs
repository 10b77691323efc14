//! Storage ports for stock records and warehouses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use comercia_catalog::{Price, StockQuantity};
use comercia_core::{DomainResult, ProductId, StockId, WarehouseId};

use crate::stock::Stock;
use crate::warehouse::Warehouse;

/// Quantity and value held per product (or per warehouse) across records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub records: usize,
    pub quantity: StockQuantity,
    pub value: Price,
}

pub trait StockRepository: Send + Sync {
    /// Rejects a second record for the same (product, warehouse) pair.
    fn save(&self, stock: Stock) -> DomainResult<Stock>;

    fn find_by_id(&self, id: StockId) -> DomainResult<Option<Stock>>;

    fn delete(&self, id: StockId) -> DomainResult<bool>;

    fn find_all(&self) -> DomainResult<Vec<Stock>>;

    fn find_active(&self) -> DomainResult<Vec<Stock>>;

    fn find_by_product(&self, product_id: ProductId) -> DomainResult<Vec<Stock>>;

    fn find_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Vec<Stock>>;

    fn find_by_product_and_warehouse(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Option<Stock>>;

    fn find_by_batch_number(&self, batch_number: &str) -> DomainResult<Vec<Stock>>;

    fn find_by_location(&self, location: &str) -> DomainResult<Vec<Stock>>;

    /// Active records below their minimum level.
    fn find_low_stock(&self) -> DomainResult<Vec<Stock>>;

    fn find_expired(&self, today: NaiveDate) -> DomainResult<Vec<Stock>>;

    /// Not yet expired, expiring within `days` of `today`.
    fn find_expiring_within(&self, days: i64, today: NaiveDate) -> DomainResult<Vec<Stock>>;

    fn needing_replenishment(&self) -> DomainResult<Vec<Stock>>;

    fn exists_for(&self, product_id: ProductId, warehouse_id: WarehouseId) -> DomainResult<bool>;

    fn total_inventory_value(&self) -> DomainResult<Price>;

    fn inventory_value_by_product(&self, product_id: ProductId) -> DomainResult<Price>;

    fn inventory_value_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Price>;

    fn summary_by_product(&self) -> DomainResult<Vec<(ProductId, StockSummary)>>;

    fn summary_by_warehouse(&self) -> DomainResult<Vec<(WarehouseId, StockSummary)>>;

    /// Moves `quantity` from `source` into the same product's record at
    /// `destination`, creating it (with the source's levels, cost and batch)
    /// when missing. Both records change or neither does.
    ///
    /// Returns `(source, destination)` after the move.
    fn transfer_stock(
        &self,
        source: StockId,
        destination: WarehouseId,
        quantity: StockQuantity,
        location: Option<String>,
    ) -> DomainResult<(Stock, Stock)>;

    /// Signed correction at the record's current unit cost.
    fn adjust_stock(&self, id: StockId, delta: i64, reason: &str) -> DomainResult<Stock>;
}

impl<R> StockRepository for std::sync::Arc<R>
where
    R: StockRepository + ?Sized,
{
    fn save(&self, stock: Stock) -> DomainResult<Stock> {
        (**self).save(stock)
    }

    fn find_by_id(&self, id: StockId) -> DomainResult<Option<Stock>> {
        (**self).find_by_id(id)
    }

    fn delete(&self, id: StockId) -> DomainResult<bool> {
        (**self).delete(id)
    }

    fn find_all(&self) -> DomainResult<Vec<Stock>> {
        (**self).find_all()
    }

    fn find_active(&self) -> DomainResult<Vec<Stock>> {
        (**self).find_active()
    }

    fn find_by_product(&self, product_id: ProductId) -> DomainResult<Vec<Stock>> {
        (**self).find_by_product(product_id)
    }

    fn find_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Vec<Stock>> {
        (**self).find_by_warehouse(warehouse_id)
    }

    fn find_by_product_and_warehouse(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Option<Stock>> {
        (**self).find_by_product_and_warehouse(product_id, warehouse_id)
    }

    fn find_by_batch_number(&self, batch_number: &str) -> DomainResult<Vec<Stock>> {
        (**self).find_by_batch_number(batch_number)
    }

    fn find_by_location(&self, location: &str) -> DomainResult<Vec<Stock>> {
        (**self).find_by_location(location)
    }

    fn find_low_stock(&self) -> DomainResult<Vec<Stock>> {
        (**self).find_low_stock()
    }

    fn find_expired(&self, today: NaiveDate) -> DomainResult<Vec<Stock>> {
        (**self).find_expired(today)
    }

    fn find_expiring_within(&self, days: i64, today: NaiveDate) -> DomainResult<Vec<Stock>> {
        (**self).find_expiring_within(days, today)
    }

    fn needing_replenishment(&self) -> DomainResult<Vec<Stock>> {
        (**self).needing_replenishment()
    }

    fn exists_for(&self, product_id: ProductId, warehouse_id: WarehouseId) -> DomainResult<bool> {
        (**self).exists_for(product_id, warehouse_id)
    }

    fn total_inventory_value(&self) -> DomainResult<Price> {
        (**self).total_inventory_value()
    }

    fn inventory_value_by_product(&self, product_id: ProductId) -> DomainResult<Price> {
        (**self).inventory_value_by_product(product_id)
    }

    fn inventory_value_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Price> {
        (**self).inventory_value_by_warehouse(warehouse_id)
    }

    fn summary_by_product(&self) -> DomainResult<Vec<(ProductId, StockSummary)>> {
        (**self).summary_by_product()
    }

    fn summary_by_warehouse(&self) -> DomainResult<Vec<(WarehouseId, StockSummary)>> {
        (**self).summary_by_warehouse()
    }

    fn transfer_stock(
        &self,
        source: StockId,
        destination: WarehouseId,
        quantity: StockQuantity,
        location: Option<String>,
    ) -> DomainResult<(Stock, Stock)> {
        (**self).transfer_stock(source, destination, quantity, location)
    }

    fn adjust_stock(&self, id: StockId, delta: i64, reason: &str) -> DomainResult<Stock> {
        (**self).adjust_stock(id, delta, reason)
    }
}

pub trait WarehouseRepository: Send + Sync {
    /// Rejects duplicate codes and names; saving a default warehouse clears
    /// the flag on every other one.
    fn save(&self, warehouse: Warehouse) -> DomainResult<Warehouse>;

    fn find_by_id(&self, id: WarehouseId) -> DomainResult<Option<Warehouse>>;

    /// Fails while the warehouse holds stock records.
    fn delete(&self, id: WarehouseId) -> DomainResult<()>;

    fn find_all(&self) -> DomainResult<Vec<Warehouse>>;

    fn find_active(&self) -> DomainResult<Vec<Warehouse>>;

    fn find_default(&self) -> DomainResult<Option<Warehouse>>;

    fn find_by_code(&self, code: &str) -> DomainResult<Option<Warehouse>>;

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Warehouse>>;

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Warehouse>>;

    fn find_by_city(&self, city: &str) -> DomainResult<Vec<Warehouse>>;

    fn find_by_country(&self, country: &str) -> DomainResult<Vec<Warehouse>>;

    /// Warehouses with at least `min_available` free capacity.
    fn with_capacity(&self, min_available: StockQuantity) -> DomainResult<Vec<Warehouse>>;

    fn by_utilization(&self, min_percent: f64, max_percent: f64) -> DomainResult<Vec<Warehouse>>;

    fn exists_with_code(&self, code: &str, exclude: Option<WarehouseId>) -> DomainResult<bool>;

    fn exists_with_name(&self, name: &str, exclude: Option<WarehouseId>) -> DomainResult<bool>;

    /// Sets `current_stock` to the sum of the warehouse's stock records.
    fn recompute_current_stock(&self, id: WarehouseId) -> DomainResult<Warehouse>;

    fn total_capacity(&self) -> DomainResult<u64>;

    fn total_current_stock(&self) -> DomainResult<u64>;

    /// Mean utilization over active warehouses; 0 when there are none.
    fn average_utilization(&self) -> DomainResult<f64>;
}
