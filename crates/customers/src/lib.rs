//! Customer registry domain module.
//!
//! This crate contains the business rules for customers (Mexican tax id,
//! contact data, uniqueness), implemented as deterministic domain logic plus an
//! application service that talks to storage only through [`CustomerRepository`].

pub mod address;
pub mod customer;
pub mod phone;
pub mod repository;
pub mod rfc;
pub mod service;

pub use address::Address;
pub use comercia_core::Email;
pub use customer::{Customer, CustomerRecord};
pub use phone::PhoneNumber;
pub use repository::CustomerRepository;
pub use rfc::Rfc;
pub use service::{CustomerService, CustomerStatistics, NewCustomer};
