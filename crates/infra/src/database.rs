//! In-memory relational store shared by every repository.
//!
//! All tables live behind one lock so that a write touching several of them
//! (a category move and its subtree, a stock transfer and both warehouses'
//! cached totals) is applied in full or not at all. Intended for tests/dev.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use comercia_catalog::{Brand, Category, Product, Unit};
use comercia_core::{DomainError, DomainResult, Entity};
use comercia_customers::Customer;
use comercia_inventory::{Stock, Warehouse};

use crate::stores::{
    BrandStore, CategoryStore, CustomerStore, ProductStore, StockStore, UnitStore, WarehouseStore,
};

/// Rows of one entity type keyed by their assigned id.
#[derive(Debug, Clone)]
pub struct Table<E> {
    label: &'static str,
    rows: BTreeMap<u64, E>,
    last_id: u64,
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: From<u64> + Into<Option<u64>> + core::fmt::Display,
{
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    pub fn get(&self, id: E::Id) -> Option<&E> {
        let key: Option<u64> = id.into();
        key.and_then(|k| self.rows.get(&k))
    }

    /// Like [`Table::get`], failing with not-found for unknown ids.
    pub fn require(&self, id: E::Id) -> DomainResult<&E> {
        self.get(id).ok_or_else(|| self.missing(id))
    }

    pub fn get_mut(&mut self, id: E::Id) -> Option<&mut E> {
        let key: Option<u64> = id.into();
        key.and_then(|k| self.rows.get_mut(&k))
    }

    pub fn contains(&self, id: E::Id) -> bool {
        self.get(id).is_some()
    }

    /// Inserts an unsaved row under the next id, or replaces a stored one.
    pub fn upsert(&mut self, row: E) -> DomainResult<E> {
        let key: Option<u64> = row.id().into();
        let row = match key {
            None => {
                self.last_id += 1;
                row.with_id(E::Id::from(self.last_id))
            }
            Some(k) if self.rows.contains_key(&k) => row,
            Some(_) => return Err(self.missing(row.id())),
        };
        self.put(row.clone());
        Ok(row)
    }

    /// Writes a row that already carries an id.
    pub fn put(&mut self, row: E) {
        let key: Option<u64> = row.id().into();
        if let Some(key) = key {
            self.last_id = self.last_id.max(key);
            self.rows.insert(key, row);
        }
    }

    pub fn remove(&mut self, id: E::Id) -> Option<E> {
        let key: Option<u64> = id.into();
        key.and_then(|k| self.rows.remove(&k))
    }

    /// Rows in id order.
    pub fn rows(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn missing(&self, id: E::Id) -> DomainError {
        DomainError::not_found(format!("{} with ID {id} not found", self.label))
    }
}

#[derive(Debug, Clone)]
pub struct Tables {
    pub customers: Table<Customer>,
    pub products: Table<Product>,
    pub categories: Table<Category>,
    pub brands: Table<Brand>,
    pub units: Table<Unit>,
    pub stocks: Table<Stock>,
    pub warehouses: Table<Warehouse>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            customers: Table::new("Customer"),
            products: Table::new("Product"),
            categories: Table::new("Category"),
            brands: Table::new("Brand"),
            units: Table::new("Unit"),
            stocks: Table::new("Stock"),
            warehouses: Table::new("Warehouse"),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Runs `f` against a consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        f(&tables)
    }

    /// Runs `f` against a working copy and publishes it only if `f` succeeds.
    ///
    /// Writers are serialized; readers never observe a half-applied change.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut Tables) -> DomainResult<R>) -> DomainResult<R> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut draft = tables.clone();
        let out = f(&mut draft)?;
        *tables = draft;
        Ok(out)
    }

    pub fn customers(self: &Arc<Self>) -> CustomerStore {
        CustomerStore::new(Arc::clone(self))
    }

    pub fn products(self: &Arc<Self>) -> ProductStore {
        ProductStore::new(Arc::clone(self))
    }

    pub fn categories(self: &Arc<Self>) -> CategoryStore {
        CategoryStore::new(Arc::clone(self))
    }

    pub fn brands(self: &Arc<Self>) -> BrandStore {
        BrandStore::new(Arc::clone(self))
    }

    pub fn units(self: &Arc<Self>) -> UnitStore {
        UnitStore::new(Arc::clone(self))
    }

    pub fn stocks(self: &Arc<Self>) -> StockStore {
        StockStore::new(Arc::clone(self))
    }

    pub fn warehouses(self: &Arc<Self>) -> WarehouseStore {
        WarehouseStore::new(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comercia_catalog::Category;
    use comercia_core::CategoryId;

    #[test]
    fn upsert_assigns_sequential_ids() {
        let mut table: Table<Category> = Table::new("Category");
        let a = table.upsert(Category::create("A", "", None).unwrap()).unwrap();
        let b = table.upsert(Category::create("B", "", None).unwrap()).unwrap();
        assert_eq!(a.id(), CategoryId::from(1));
        assert_eq!(b.id(), CategoryId::from(2));
        assert_eq!(table.len(), 2);

        table.remove(b.id());
        let c = table.upsert(Category::create("C", "", None).unwrap()).unwrap();
        assert_eq!(c.id(), CategoryId::from(3));
    }

    #[test]
    fn upsert_of_unknown_id_is_not_found() {
        let mut table: Table<Category> = Table::new("Category");
        let ghost = Category::create("Fantasma", "", None)
            .unwrap()
            .with_id(CategoryId::from(7));
        let err = table.upsert(ghost).unwrap_err();
        assert_eq!(err, DomainError::not_found("Category with ID 7 not found"));
    }

    #[test]
    fn failed_transaction_leaves_tables_untouched() {
        let db = InMemoryDatabase::new();
        db.transaction(|t| t.categories.upsert(Category::create("A", "", None)?))
            .unwrap();

        let result: DomainResult<()> = db.transaction(|t| {
            t.categories.upsert(Category::create("B", "", None)?)?;
            t.categories.remove(CategoryId::from(1));
            Err(DomainError::invalid("abort"))
        });
        assert!(result.is_err());
        db.read(|t| {
            assert_eq!(t.categories.len(), 1);
            assert!(t.categories.contains(CategoryId::from(1)));
        });
    }
}
