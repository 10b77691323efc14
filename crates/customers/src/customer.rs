use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comercia_core::text::char_len;
use comercia_core::{CustomerId, DomainError, DomainResult, Email, Entity};

use crate::address::Address;
use crate::phone::PhoneNumber;
use crate::rfc::Rfc;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 255;

/// Entity: Customer.
///
/// RFC and email uniqueness spans all customers, so it is checked by
/// [`crate::CustomerService`] against the repository, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerRecord")]
pub struct Customer {
    id: CustomerId,
    name: String,
    rfc: Rfc,
    address: Address,
    phone: PhoneNumber,
    email: Email,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::invalid("Customer name is required"));
    }
    let len = char_len(name);
    if len < NAME_MIN {
        return Err(DomainError::invalid("Customer name is too short"));
    }
    if len > NAME_MAX {
        return Err(DomainError::invalid("Customer name is too long"));
    }
    Ok(name.to_string())
}

/// Stored form of a [`Customer`]. The value objects validate themselves;
/// the name is checked here.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub rfc: Rfc,
    pub address: Address,
    pub phone: PhoneNumber,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = DomainError;

    fn try_from(record: CustomerRecord) -> DomainResult<Self> {
        Ok(Self {
            id: record.id,
            name: validate_name(&record.name)?,
            rfc: record.rfc,
            address: record.address,
            phone: record.phone,
            email: record.email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Customer {
    /// New, not-yet-persisted customer.
    pub fn create(
        name: &str,
        rfc: Rfc,
        address: Address,
        phone: PhoneNumber,
        email: Email,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: CustomerId::null(),
            name: validate_name(name)?,
            rfc,
            address,
            phone,
            email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces every mutable field and bumps `updated_at`.
    pub fn update(
        &mut self,
        name: &str,
        rfc: Rfc,
        address: Address,
        phone: PhoneNumber,
        email: Email,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let name = validate_name(name)?;
        self.name = name;
        self.rfc = rfc;
        self.address = address;
        self.phone = phone;
        self.email = email;
        self.updated_at = now;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rfc(&self) -> &Rfc {
        &self.rfc
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> CustomerId {
        self.id
    }

    fn with_id(mut self, id: CustomerId) -> Self {
        self.id = id;
        self
    }
}
