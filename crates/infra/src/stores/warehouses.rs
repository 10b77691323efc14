use std::sync::Arc;

use comercia_catalog::StockQuantity;
use comercia_core::text::contains_ignore_case;
use comercia_core::{DomainError, DomainResult, Entity, WarehouseId};
use comercia_inventory::{Warehouse, WarehouseRepository};

use crate::database::{InMemoryDatabase, Tables};
use crate::stores::{counters, same_name};

/// Warehouses. At most one is flagged as default at any time.
#[derive(Debug, Clone)]
pub struct WarehouseStore {
    db: Arc<InMemoryDatabase>,
}

impl WarehouseStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }

    fn select(&self, keep: impl Fn(&Warehouse) -> bool) -> Vec<Warehouse> {
        let mut warehouses: Vec<Warehouse> =
            self.db.read(|t| t.warehouses.rows().filter(|w| keep(w)).cloned().collect());
        warehouses.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        warehouses
    }
}

fn code_taken(tables: &Tables, code: &str, exclude: Option<WarehouseId>) -> bool {
    let code = code.trim();
    tables
        .warehouses
        .rows()
        .any(|w| w.code() == code && Some(w.id()) != exclude)
}

fn name_taken(tables: &Tables, name: &str, exclude: Option<WarehouseId>) -> bool {
    tables
        .warehouses
        .rows()
        .any(|w| same_name(w.name(), name) && Some(w.id()) != exclude)
}

fn matches_place(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| same_name(v, wanted))
}

impl WarehouseRepository for WarehouseStore {
    fn save(&self, warehouse: Warehouse) -> DomainResult<Warehouse> {
        self.db.transaction(|t| {
            let exclude = Some(warehouse.id()).filter(|id| !id.is_null());
            if code_taken(t, warehouse.code(), exclude) {
                return Err(DomainError::invalid(format!(
                    "A warehouse with code {} already exists",
                    warehouse.code()
                )));
            }
            if name_taken(t, warehouse.name(), exclude) {
                return Err(DomainError::invalid(format!(
                    "A warehouse named {} already exists",
                    warehouse.name()
                )));
            }
            let mut warehouse = warehouse;
            if let Some(id) = exclude {
                warehouse.update_current_stock(counters::stock_in_warehouse(t, id)?)?;
            }
            let saved = t.warehouses.upsert(warehouse)?;
            if saved.is_default() {
                let others: Vec<WarehouseId> = t
                    .warehouses
                    .rows()
                    .filter(|w| w.is_default() && w.id() != saved.id())
                    .map(Entity::id)
                    .collect();
                for id in others {
                    if let Some(other) = t.warehouses.get_mut(id) {
                        other.unmark_as_default();
                    }
                }
            }
            tracing::info!(warehouse_id = %saved.id(), code = saved.code(), "warehouse saved");
            Ok(saved)
        })
    }

    fn find_by_id(&self, id: WarehouseId) -> DomainResult<Option<Warehouse>> {
        Ok(self.db.read(|t| t.warehouses.get(id).cloned()))
    }

    fn delete(&self, id: WarehouseId) -> DomainResult<()> {
        self.db.transaction(|t| {
            t.warehouses.require(id)?;
            if t.stocks.rows().any(|s| s.warehouse_id() == id) {
                tracing::warn!(warehouse_id = %id, "delete rejected: warehouse holds stock");
                return Err(DomainError::invalid(
                    "Cannot delete a warehouse that holds stock",
                ));
            }
            t.warehouses.remove(id);
            tracing::info!(warehouse_id = %id, "warehouse deleted");
            Ok(())
        })
    }

    fn find_all(&self) -> DomainResult<Vec<Warehouse>> {
        Ok(self.select(|_| true))
    }

    fn find_active(&self) -> DomainResult<Vec<Warehouse>> {
        Ok(self.select(Warehouse::is_active))
    }

    fn find_default(&self) -> DomainResult<Option<Warehouse>> {
        Ok(self
            .db
            .read(|t| t.warehouses.rows().find(|w| w.is_default()).cloned()))
    }

    fn find_by_code(&self, code: &str) -> DomainResult<Option<Warehouse>> {
        let code = code.trim();
        Ok(self
            .db
            .read(|t| t.warehouses.rows().find(|w| w.code() == code).cloned()))
    }

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Warehouse>> {
        Ok(self.db.read(|t| {
            t.warehouses
                .rows()
                .find(|w| same_name(w.name(), name))
                .cloned()
        }))
    }

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Warehouse>> {
        let term = term.trim();
        Ok(self.select(|w| contains_ignore_case(w.name(), term)))
    }

    fn find_by_city(&self, city: &str) -> DomainResult<Vec<Warehouse>> {
        Ok(self.select(|w| matches_place(w.city(), city)))
    }

    fn find_by_country(&self, country: &str) -> DomainResult<Vec<Warehouse>> {
        Ok(self.select(|w| matches_place(w.country(), country)))
    }

    fn with_capacity(&self, min_available: StockQuantity) -> DomainResult<Vec<Warehouse>> {
        Ok(self.select(|w| w.is_active() && w.has_available_capacity(min_available)))
    }

    fn by_utilization(&self, min_percent: f64, max_percent: f64) -> DomainResult<Vec<Warehouse>> {
        Ok(self.select(|w| (min_percent..=max_percent).contains(&w.utilization_percentage())))
    }

    fn exists_with_code(&self, code: &str, exclude: Option<WarehouseId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| code_taken(t, code, exclude)))
    }

    fn exists_with_name(&self, name: &str, exclude: Option<WarehouseId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| name_taken(t, name, exclude)))
    }

    fn recompute_current_stock(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.db.transaction(|t| {
            t.warehouses.require(id)?;
            counters::refresh_warehouse(t, id)?;
            let warehouse = t.warehouses.require(id)?.clone();
            tracing::info!(
                warehouse_id = %id,
                current_stock = warehouse.current_stock().value(),
                "warehouse stock recomputed"
            );
            Ok(warehouse)
        })
    }

    fn total_capacity(&self) -> DomainResult<u64> {
        Ok(self
            .select(Warehouse::is_active)
            .iter()
            .map(|w| w.capacity().value())
            .sum())
    }

    fn total_current_stock(&self) -> DomainResult<u64> {
        Ok(self
            .select(Warehouse::is_active)
            .iter()
            .map(|w| w.current_stock().value())
            .sum())
    }

    fn average_utilization(&self) -> DomainResult<f64> {
        let active = self.select(Warehouse::is_active);
        if active.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = active.iter().map(Warehouse::utilization_percentage).sum();
        Ok(total / active.len() as f64)
    }
}
