//! Storage port for customers.

use comercia_core::{CustomerId, DomainResult, Email};

use crate::customer::Customer;
use crate::rfc::Rfc;

/// Persistence collaborator for [`Customer`].
///
/// `save` inserts records without an id (returning the stored copy with its
/// new id) and replaces records that already have one.
pub trait CustomerRepository: Send + Sync {
    fn save(&self, customer: Customer) -> DomainResult<Customer>;

    fn find_by_id(&self, id: CustomerId) -> DomainResult<Option<Customer>>;

    fn find_by_rfc(&self, rfc: &Rfc) -> DomainResult<Option<Customer>>;

    fn find_by_email(&self, email: &Email) -> DomainResult<Option<Customer>>;

    fn find_all(&self) -> DomainResult<Vec<Customer>>;

    /// Case-insensitive substring match on the name.
    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Customer>>;

    /// Returns whether a record was removed.
    fn delete(&self, id: CustomerId) -> DomainResult<bool>;

    fn exists_with_rfc(&self, rfc: &Rfc, exclude: Option<CustomerId>) -> DomainResult<bool>;

    fn exists_with_email(&self, email: &Email, exclude: Option<CustomerId>) -> DomainResult<bool>;
}

impl<R> CustomerRepository for std::sync::Arc<R>
where
    R: CustomerRepository + ?Sized,
{
    fn save(&self, customer: Customer) -> DomainResult<Customer> {
        (**self).save(customer)
    }

    fn find_by_id(&self, id: CustomerId) -> DomainResult<Option<Customer>> {
        (**self).find_by_id(id)
    }

    fn find_by_rfc(&self, rfc: &Rfc) -> DomainResult<Option<Customer>> {
        (**self).find_by_rfc(rfc)
    }

    fn find_by_email(&self, email: &Email) -> DomainResult<Option<Customer>> {
        (**self).find_by_email(email)
    }

    fn find_all(&self) -> DomainResult<Vec<Customer>> {
        (**self).find_all()
    }

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Customer>> {
        (**self).search_by_name(term)
    }

    fn delete(&self, id: CustomerId) -> DomainResult<bool> {
        (**self).delete(id)
    }

    fn exists_with_rfc(&self, rfc: &Rfc, exclude: Option<CustomerId>) -> DomainResult<bool> {
        (**self).exists_with_rfc(rfc, exclude)
    }

    fn exists_with_email(&self, email: &Email, exclude: Option<CustomerId>) -> DomainResult<bool> {
        (**self).exists_with_email(email, exclude)
    }
}
