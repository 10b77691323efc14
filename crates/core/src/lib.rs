//! `comercia-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns)
//! shared by the customer registry and the inventory/catalog modules.

pub mod email;
pub mod entity;
pub mod error;
pub mod id;
pub mod text;
pub mod value_object;

pub use email::Email;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BrandId, CategoryId, CustomerId, ProductId, StockId, UnitId, WarehouseId};
pub use value_object::ValueObject;
