//! Repository implementations over [`crate::database::InMemoryDatabase`].
//!
//! Each store is a cheap handle (`Clone`) onto the shared database, so the
//! stores of one database see each other's writes and can guard deletes
//! against rows owned by other tables.

mod brands;
mod categories;
mod counters;
mod customers;
mod products;
mod stocks;
mod units;
mod warehouses;

pub use brands::BrandStore;
pub use categories::CategoryStore;
pub use customers::CustomerStore;
pub use products::ProductStore;
pub use stocks::StockStore;
pub use units::UnitStore;
pub use warehouses::WarehouseStore;

/// Case-insensitive name comparison used by every uniqueness check.
fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
