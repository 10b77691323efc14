//! Customer application service.
//!
//! Turns raw field values into value objects, enforces the cross-customer
//! uniqueness rules (RFC, email) and delegates storage to a
//! [`CustomerRepository`]. No IO of its own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use comercia_core::{CustomerId, DomainError, DomainResult, Email, Entity};

use crate::address::Address;
use crate::customer::Customer;
use crate::phone::PhoneNumber;
use crate::repository::CustomerRepository;
use crate::rfc::Rfc;

/// Customers created within this window count as recent.
const RECENT_DAYS: i64 = 30;

/// Raw customer fields as received from a caller (create and update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub rfc: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStatistics {
    pub total_customers: usize,
    pub recent_customers: Vec<Customer>,
}

struct ValidFields {
    rfc: Rfc,
    address: Address,
    phone: PhoneNumber,
    email: Email,
}

pub struct CustomerService<R> {
    repository: R,
}

impl<R> CustomerService<R>
where
    R: CustomerRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn create(&self, input: NewCustomer) -> DomainResult<Customer> {
        let fields = self.validate(&input, None)?;
        let customer = Customer::create(
            &input.name,
            fields.rfc,
            fields.address,
            fields.phone,
            fields.email,
            Utc::now(),
        )?;
        let saved = self.repository.save(customer)?;
        tracing::info!(customer_id = %saved.id(), rfc = %saved.rfc(), "customer created");
        Ok(saved)
    }

    pub fn update(&self, id: CustomerId, input: NewCustomer) -> DomainResult<Customer> {
        let mut customer = self.get_by_id(id)?;
        let fields = self.validate(&input, Some(id))?;
        customer.update(
            &input.name,
            fields.rfc,
            fields.address,
            fields.phone,
            fields.email,
            Utc::now(),
        )?;
        let saved = self.repository.save(customer)?;
        tracing::info!(customer_id = %id, "customer updated");
        Ok(saved)
    }

    pub fn get_by_id(&self, id: CustomerId) -> DomainResult<Customer> {
        self.repository
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found(format!("Customer with ID {id} not found")))
    }

    pub fn find_by_rfc(&self, rfc: &str) -> DomainResult<Option<Customer>> {
        self.repository.find_by_rfc(&Rfc::new(rfc)?)
    }

    pub fn find_by_email(&self, email: &str) -> DomainResult<Option<Customer>> {
        self.repository.find_by_email(&Email::new(email)?)
    }

    pub fn list(&self) -> DomainResult<Vec<Customer>> {
        self.repository.find_all()
    }

    pub fn search_by_name(&self, term: &str) -> DomainResult<Vec<Customer>> {
        self.repository.search_by_name(term.trim())
    }

    pub fn exists(&self, id: CustomerId) -> DomainResult<bool> {
        Ok(self.repository.find_by_id(id)?.is_some())
    }

    pub fn delete(&self, id: CustomerId) -> DomainResult<()> {
        self.get_by_id(id)?;
        self.repository.delete(id)?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    pub fn statistics(&self) -> DomainResult<CustomerStatistics> {
        self.statistics_at(Utc::now())
    }

    /// Totals as seen at `now`; recent means created within the last 30 days.
    pub fn statistics_at(&self, now: DateTime<Utc>) -> DomainResult<CustomerStatistics> {
        let customers = self.repository.find_all()?;
        let cutoff = now - Duration::days(RECENT_DAYS);
        let total_customers = customers.len();
        let recent_customers = customers
            .into_iter()
            .filter(|c| c.created_at() > cutoff)
            .collect();
        Ok(CustomerStatistics {
            total_customers,
            recent_customers,
        })
    }

    fn validate(&self, input: &NewCustomer, exclude: Option<CustomerId>) -> DomainResult<ValidFields> {
        let fields = ValidFields {
            rfc: Rfc::new(&input.rfc)?,
            address: Address::new(&input.address)?,
            phone: PhoneNumber::new(&input.phone)?,
            email: Email::new(&input.email)?,
        };
        if self.repository.exists_with_rfc(&fields.rfc, exclude)? {
            tracing::warn!(rfc = %fields.rfc, "duplicate customer RFC rejected");
            return Err(DomainError::invalid("A customer with this RFC already exists"));
        }
        if self.repository.exists_with_email(&fields.email, exclude)? {
            tracing::warn!(email = %fields.email, "duplicate customer email rejected");
            return Err(DomainError::invalid("A customer with this email already exists"));
        }
        Ok(fields)
    }
}
