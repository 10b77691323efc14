//! Infrastructure layer: the in-memory database and the repository
//! implementations built on it.

pub mod database;
pub mod stores;

pub use database::{InMemoryDatabase, Table, Tables};
pub use stores::{
    BrandStore, CategoryStore, CustomerStore, ProductStore, StockStore, UnitStore, WarehouseStore,
};

#[cfg(test)]
mod integration_tests;
