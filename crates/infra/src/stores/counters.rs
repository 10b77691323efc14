//! Recomputes the cached counters that other tables keep about products and
//! stock records. Called inside the transaction that changed the source rows.

use comercia_catalog::{Product, StockQuantity};
use comercia_core::{BrandId, CategoryId, DomainResult, UnitId, WarehouseId};

use crate::database::Tables;

fn live_products(tables: &Tables) -> impl Iterator<Item = &Product> {
    tables.products.rows().filter(|p| !p.is_deleted())
}

pub(crate) fn products_in_category(tables: &Tables, id: CategoryId) -> u64 {
    live_products(tables)
        .filter(|p| p.category_id() == Some(id))
        .count() as u64
}

pub(crate) fn products_of_brand(tables: &Tables, id: BrandId) -> u64 {
    live_products(tables)
        .filter(|p| p.brand_id() == Some(id))
        .count() as u64
}

pub(crate) fn products_using_unit(tables: &Tables, id: UnitId) -> u64 {
    live_products(tables)
        .filter(|p| p.unit_id() == Some(id))
        .count() as u64
}

pub(crate) fn stock_in_warehouse(tables: &Tables, id: WarehouseId) -> DomainResult<StockQuantity> {
    tables
        .stocks
        .rows()
        .filter(|s| s.warehouse_id() == id)
        .try_fold(StockQuantity::zero(), |acc, s| acc.add(s.quantity()))
}

pub(crate) fn refresh_category(tables: &mut Tables, id: CategoryId) {
    let count = products_in_category(tables, id);
    if let Some(category) = tables.categories.get_mut(id) {
        category.set_product_count(count);
    }
}

pub(crate) fn refresh_brand(tables: &mut Tables, id: BrandId) {
    let count = products_of_brand(tables, id);
    if let Some(brand) = tables.brands.get_mut(id) {
        brand.set_product_count(count);
    }
}

pub(crate) fn refresh_unit(tables: &mut Tables, id: UnitId) {
    let count = products_using_unit(tables, id);
    if let Some(unit) = tables.units.get_mut(id) {
        unit.set_usage_count(count);
    }
}

/// Fails when the recounted stock no longer fits the warehouse.
pub(crate) fn refresh_warehouse(tables: &mut Tables, id: WarehouseId) -> DomainResult<()> {
    let total = stock_in_warehouse(tables, id)?;
    match tables.warehouses.get_mut(id) {
        Some(warehouse) if warehouse.current_stock() != total => warehouse.update_current_stock(total),
        _ => Ok(()),
    }
}

/// Refreshes every counter a product (before and after a write) points at.
pub(crate) fn refresh_product_references<'a>(
    tables: &mut Tables,
    products: impl IntoIterator<Item = &'a Product>,
) {
    let mut categories = Vec::new();
    let mut brands = Vec::new();
    let mut units = Vec::new();
    for product in products {
        categories.extend(product.category_id());
        brands.extend(product.brand_id());
        units.extend(product.unit_id());
    }
    for id in categories {
        refresh_category(tables, id);
    }
    for id in brands {
        refresh_brand(tables, id);
    }
    for id in units {
        refresh_unit(tables, id);
    }
}
