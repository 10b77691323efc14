use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use comercia_catalog::{Price, StockQuantity};
use comercia_core::{DomainError, DomainResult, Entity, ProductId, StockId, WarehouseId};
use comercia_inventory::{Stock, StockBatch, StockRepository, StockSummary};

use crate::database::{InMemoryDatabase, Tables};
use crate::stores::counters;

/// Stock records, one per (product, warehouse). Every write recounts the
/// affected warehouses, so a write that would overfill one is rejected.
#[derive(Debug, Clone)]
pub struct StockStore {
    db: Arc<InMemoryDatabase>,
}

impl StockStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }

    fn select(&self, keep: impl Fn(&Stock) -> bool) -> Vec<Stock> {
        self.db
            .read(|t| t.stocks.rows().filter(|s| keep(s)).cloned().collect())
    }

    fn value_of(&self, keep: impl Fn(&Stock) -> bool) -> DomainResult<Price> {
        self.select(keep)
            .iter()
            .try_fold(Price::zero(), |acc, s| acc.add(&s.total_value()))
    }
}

fn pair_of(tables: &Tables, product: ProductId, warehouse: WarehouseId) -> Option<&Stock> {
    tables
        .stocks
        .rows()
        .find(|s| s.product_id() == product && s.warehouse_id() == warehouse)
}

fn ensure_warehouse(tables: &Tables, id: WarehouseId) -> DomainResult<()> {
    tables.warehouses.require(id).map(|_| ())
}

fn summarize<K: Ord>(stocks: Vec<Stock>, key: impl Fn(&Stock) -> K) -> DomainResult<Vec<(K, StockSummary)>> {
    let mut totals: BTreeMap<K, StockSummary> = BTreeMap::new();
    for stock in &stocks {
        let entry = totals.entry(key(stock)).or_insert(StockSummary {
            records: 0,
            quantity: StockQuantity::zero(),
            value: Price::zero(),
        });
        entry.records += 1;
        entry.quantity = entry.quantity.add(stock.quantity())?;
        entry.value = entry.value.add(&stock.total_value())?;
    }
    Ok(totals.into_iter().collect())
}

/// Writes `stock` and recounts the warehouses it left and entered.
fn write(tables: &mut Tables, stock: Stock) -> DomainResult<Stock> {
    ensure_warehouse(tables, stock.warehouse_id())?;
    let previous = tables.stocks.get(stock.id()).map(Stock::warehouse_id);
    let saved = tables.stocks.upsert(stock)?;
    if let Some(old) = previous.filter(|w| *w != saved.warehouse_id()) {
        counters::refresh_warehouse(tables, old)?;
    }
    counters::refresh_warehouse(tables, saved.warehouse_id())?;
    Ok(saved)
}

impl StockRepository for StockStore {
    fn save(&self, stock: Stock) -> DomainResult<Stock> {
        self.db.transaction(|t| {
            let exclude = Some(stock.id()).filter(|id| !id.is_null());
            let duplicate = pair_of(t, stock.product_id(), stock.warehouse_id())
                .is_some_and(|s| Some(s.id()) != exclude);
            if duplicate {
                return Err(DomainError::invalid(
                    "Stock for this product already exists in this warehouse",
                ));
            }
            let saved = write(t, stock)?;
            tracing::info!(
                stock_id = %saved.id(),
                product_id = %saved.product_id(),
                warehouse_id = %saved.warehouse_id(),
                quantity = saved.quantity().value(),
                "stock saved"
            );
            Ok(saved)
        })
    }

    fn find_by_id(&self, id: StockId) -> DomainResult<Option<Stock>> {
        Ok(self.db.read(|t| t.stocks.get(id).cloned()))
    }

    fn delete(&self, id: StockId) -> DomainResult<bool> {
        self.db.transaction(|t| {
            let Some(removed) = t.stocks.remove(id) else {
                return Ok(false);
            };
            counters::refresh_warehouse(t, removed.warehouse_id())?;
            tracing::info!(stock_id = %id, "stock deleted");
            Ok(true)
        })
    }

    fn find_all(&self) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|_| true))
    }

    fn find_active(&self) -> DomainResult<Vec<Stock>> {
        Ok(self.select(Stock::is_active))
    }

    fn find_by_product(&self, product_id: ProductId) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|s| s.product_id() == product_id))
    }

    fn find_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|s| s.warehouse_id() == warehouse_id))
    }

    fn find_by_product_and_warehouse(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Option<Stock>> {
        Ok(self
            .db
            .read(|t| pair_of(t, product_id, warehouse_id).cloned()))
    }

    fn find_by_batch_number(&self, batch_number: &str) -> DomainResult<Vec<Stock>> {
        let batch_number = batch_number.trim();
        Ok(self.select(|s| s.batch_number() == Some(batch_number)))
    }

    fn find_by_location(&self, location: &str) -> DomainResult<Vec<Stock>> {
        let location = location.trim();
        Ok(self.select(|s| s.location() == Some(location)))
    }

    fn find_low_stock(&self) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|s| s.is_active() && s.is_below_minimum()))
    }

    fn find_expired(&self, today: NaiveDate) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|s| s.is_expired_at(today)))
    }

    fn find_expiring_within(&self, days: i64, today: NaiveDate) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|s| !s.is_expired_at(today) && s.will_expire_within(days, today)))
    }

    fn needing_replenishment(&self) -> DomainResult<Vec<Stock>> {
        Ok(self.select(|s| s.is_active() && s.requires_replenishment()))
    }

    fn exists_for(&self, product_id: ProductId, warehouse_id: WarehouseId) -> DomainResult<bool> {
        Ok(self
            .db
            .read(|t| pair_of(t, product_id, warehouse_id).is_some()))
    }

    fn total_inventory_value(&self) -> DomainResult<Price> {
        self.value_of(|_| true)
    }

    fn inventory_value_by_product(&self, product_id: ProductId) -> DomainResult<Price> {
        self.value_of(|s| s.product_id() == product_id)
    }

    fn inventory_value_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Price> {
        self.value_of(|s| s.warehouse_id() == warehouse_id)
    }

    fn summary_by_product(&self) -> DomainResult<Vec<(ProductId, StockSummary)>> {
        summarize(self.select(|_| true), Stock::product_id)
    }

    fn summary_by_warehouse(&self) -> DomainResult<Vec<(WarehouseId, StockSummary)>> {
        summarize(self.select(|_| true), Stock::warehouse_id)
    }

    fn transfer_stock(
        &self,
        source: StockId,
        destination: WarehouseId,
        quantity: StockQuantity,
        location: Option<String>,
    ) -> DomainResult<(Stock, Stock)> {
        let outcome = self.db.transaction(|t| {
            if quantity.is_zero() {
                return Err(DomainError::invalid(
                    "Transfer quantity must be greater than zero",
                ));
            }
            let mut from = t.stocks.require(source)?.clone();
            if from.warehouse_id() == destination {
                return Err(DomainError::invalid(
                    "Source and destination warehouses must differ",
                ));
            }
            ensure_warehouse(t, destination)?;
            if !from.quantity().is_sufficient_for(quantity) {
                return Err(DomainError::invalid("Insufficient stock for transfer"));
            }
            from.remove_stock(quantity)?;
            let from = write(t, from)?;

            let to = match pair_of(t, from.product_id(), destination).cloned() {
                Some(mut existing) => {
                    existing.add_stock(quantity, from.unit_cost())?;
                    existing
                }
                None => Stock::create(
                    from.product_id(),
                    destination,
                    quantity,
                    from.minimum_level(),
                    from.maximum_level(),
                    from.unit_cost(),
                    StockBatch {
                        location,
                        ..from.batch()
                    },
                )?,
            };
            let to = write(t, to)?;
            Ok((from, to))
        });
        match &outcome {
            Ok((from, to)) => tracing::info!(
                source = %from.id(),
                destination = %to.id(),
                quantity = quantity.value(),
                "stock transferred"
            ),
            Err(err) => tracing::warn!(source = %source, error = %err, "stock transfer rejected"),
        }
        outcome
    }

    fn adjust_stock(&self, id: StockId, delta: i64, reason: &str) -> DomainResult<Stock> {
        self.db.transaction(|t| {
            let mut stock = t.stocks.require(id)?.clone();
            let amount = StockQuantity::new(delta.saturating_abs())?;
            match delta.signum() {
                1 => stock.add_stock(amount, stock.unit_cost())?,
                -1 => stock.remove_stock(amount)?,
                _ => return Err(DomainError::invalid("Adjustment quantity cannot be zero")),
            }
            let saved = write(t, stock)?;
            tracing::info!(stock_id = %id, delta, reason, "stock adjusted");
            Ok(saved)
        })
    }
}
