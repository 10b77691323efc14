//! Product catalog domain module.
//!
//! Value objects for product data (SKU, names, prices, stock quantities,
//! physical measurements), the `Product`, `Category`, `Brand` and `Unit`
//! aggregates, the materialized-path category hierarchy, unit conversion and
//! the storage ports the persistence layer implements.

pub mod brand;
pub mod builder;
pub mod category;
pub mod dimensions;
pub mod filter;
pub mod hierarchy;
mod measure;
pub mod price;
pub mod product;
pub mod product_name;
pub mod quantity;
pub mod repository;
pub mod service;
pub mod sku;
pub mod slug;
pub mod unit;
pub mod weight;

pub use brand::{Brand, BrandDetails, BrandRecord};
pub use builder::{ProductBuilder, ProductRecord};
pub use category::{Category, CategoryRecord};
pub use dimensions::{Dimensions, LengthUnit};
pub use filter::{ProductFilter, ProductSortField, SortDirection};
pub use hierarchy::CategoryNode;
pub use price::Price;
pub use product::Product;
pub use product_name::ProductName;
pub use quantity::StockQuantity;
pub use repository::{BrandRepository, CategoryRepository, ProductRepository, UnitRepository};
pub use service::{CreateProduct, ProductDetails, ProductService, ProductStats, UpdateProduct};
pub use sku::Sku;
pub use slug::ProductSlug;
pub use unit::{Unit, UnitRecord, UnitType};
pub use weight::{Weight, WeightUnit};
