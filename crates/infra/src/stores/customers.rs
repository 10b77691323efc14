use std::sync::Arc;

use comercia_core::text::contains_ignore_case;
use comercia_core::{CustomerId, DomainError, DomainResult, Email, Entity};
use comercia_customers::{Customer, CustomerRepository, Rfc};

use crate::database::{InMemoryDatabase, Tables};

#[derive(Debug, Clone)]
pub struct CustomerStore {
    db: Arc<InMemoryDatabase>,
}

impl CustomerStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }
}

fn rfc_taken(tables: &Tables, rfc: &Rfc, exclude: Option<CustomerId>) -> bool {
    tables
        .customers
        .rows()
        .any(|c| c.rfc() == rfc && Some(c.id()) != exclude)
}

fn email_taken(tables: &Tables, email: &Email, exclude: Option<CustomerId>) -> bool {
    tables
        .customers
        .rows()
        .any(|c| c.email() == email && Some(c.id()) != exclude)
}

fn sorted_by_name(mut customers: Vec<Customer>) -> Vec<Customer> {
    customers.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
    customers
}

impl CustomerRepository for CustomerStore {
    fn save(&self, customer: Customer) -> DomainResult<Customer> {
        self.db.transaction(|t| {
            let exclude = Some(customer.id()).filter(|id| !id.is_null());
            if rfc_taken(t, customer.rfc(), exclude) {
                return Err(DomainError::invalid("A customer with this RFC already exists"));
            }
            if email_taken(t, customer.email(), exclude) {
                return Err(DomainError::invalid(
                    "A customer with this email already exists",
                ));
            }
            let saved = t.customers.upsert(customer)?;
            tracing::debug!(customer_id = %saved.id(), "customer row written");
            Ok(saved)
        })
    }

    fn find_by_id(&self, id: CustomerId) -> DomainResult<Option<Customer>> {
        Ok(self.db.read(|t| t.customers.get(id).cloned()))
    }

    fn find_by_rfc(&self, rfc: &Rfc) -> DomainResult<Option<Customer>> {
        Ok(self
            .db
            .read(|t| t.customers.rows().find(|c| c.rfc() == rfc).cloned()))
    }

    fn find_by_email(&self, email: &Email) -> DomainResult<Option<Customer>> {
        Ok(self
            .db
            .read(|t| t.customers.rows().find(|c| c.email() == email).cloned()))
    }

    fn find_all(&self) -> DomainResult<Vec<Customer>> {
        Ok(sorted_by_name(
            self.db.read(|t| t.customers.rows().cloned().collect()),
        ))
    }

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Customer>> {
        Ok(sorted_by_name(self.db.read(|t| {
            t.customers
                .rows()
                .filter(|c| contains_ignore_case(c.name(), term))
                .cloned()
                .collect()
        })))
    }

    fn delete(&self, id: CustomerId) -> DomainResult<bool> {
        self.db.transaction(|t| Ok(t.customers.remove(id).is_some()))
    }

    fn exists_with_rfc(&self, rfc: &Rfc, exclude: Option<CustomerId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| rfc_taken(t, rfc, exclude)))
    }

    fn exists_with_email(&self, email: &Email, exclude: Option<CustomerId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| email_taken(t, email, exclude)))
    }
}
