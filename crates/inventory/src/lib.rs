//! Inventory domain module.
//!
//! Per-warehouse stock records with weighted-average costing and level
//! bounds, storage sites with capacity tracking, and the storage ports the
//! persistence layer implements (including atomic transfers).

pub mod repository;
pub mod stock;
pub mod warehouse;

pub use repository::{StockRepository, StockSummary, WarehouseRepository};
pub use stock::{Stock, StockBatch, StockRecord, StockStatus};
pub use warehouse::{Warehouse, WarehouseDetails, WarehouseRecord};
