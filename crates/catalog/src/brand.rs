use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_core::text::{ensure_max_len, ensure_optional_max_len, ensure_present};
use comercia_core::{BrandId, DomainError, DomainResult, Email, Entity};

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("url pattern is valid")
});
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-+()]+$").expect("phone pattern is valid"));

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const WEBSITE_MAX: usize = 200;
const EMAIL_MAX: usize = 100;
const PHONE_MAX: usize = 20;
const LOGO_URL_MAX: usize = 255;

/// Optional brand fields accepted on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandDetails {
    pub description: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
}

/// Entity: product brand. Name uniqueness is enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BrandRecord")]
pub struct Brand {
    id: BrandId,
    name: String,
    description: Option<String>,
    website: Option<String>,
    contact_email: Option<Email>,
    contact_phone: Option<String>,
    logo_url: Option<String>,
    is_active: bool,
    product_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    ensure_present(name, NAME_MAX, "Brand name")?;
    Ok(name.to_string())
}

fn validate_description(description: Option<String>) -> DomainResult<Option<String>> {
    let description = blank_to_none(description);
    ensure_optional_max_len(description.as_deref(), DESCRIPTION_MAX, "Brand description")?;
    Ok(description)
}

fn validate_website(website: Option<String>) -> DomainResult<Option<String>> {
    let Some(website) = blank_to_none(website) else {
        return Ok(None);
    };
    ensure_max_len(&website, WEBSITE_MAX, "Website URL")?;
    if !URL_PATTERN.is_match(&website) {
        return Err(DomainError::invalid("Invalid website URL format"));
    }
    Ok(Some(website))
}

fn validate_email(email: Option<String>) -> DomainResult<Option<Email>> {
    let Some(email) = blank_to_none(email) else {
        return Ok(None);
    };
    ensure_max_len(&email, EMAIL_MAX, "Email")?;
    Email::new(&email).map(Some)
}

fn validate_phone(phone: Option<String>) -> DomainResult<Option<String>> {
    let Some(phone) = blank_to_none(phone) else {
        return Ok(None);
    };
    ensure_max_len(&phone, PHONE_MAX, "Phone number")?;
    if !PHONE_PATTERN.is_match(&phone) {
        return Err(DomainError::invalid("Invalid phone number format"));
    }
    Ok(Some(phone))
}

fn validate_logo_url(logo_url: Option<String>) -> DomainResult<Option<String>> {
    let logo_url = blank_to_none(logo_url);
    ensure_optional_max_len(logo_url.as_deref(), LOGO_URL_MAX, "Logo URL")?;
    Ok(logo_url)
}

/// Stored form of a [`Brand`].
#[derive(Debug, Clone, Deserialize)]
pub struct BrandRecord {
    pub id: BrandId,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub product_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BrandRecord> for Brand {
    type Error = DomainError;

    fn try_from(record: BrandRecord) -> DomainResult<Self> {
        Ok(Self {
            id: record.id,
            name: validate_name(&record.name)?,
            description: validate_description(record.description)?,
            website: validate_website(record.website)?,
            contact_email: validate_email(record.contact_email)?,
            contact_phone: validate_phone(record.contact_phone)?,
            logo_url: validate_logo_url(record.logo_url)?,
            is_active: record.is_active,
            product_count: record.product_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Brand {
    pub fn create(name: &str, details: BrandDetails) -> DomainResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: BrandId::null(),
            name: validate_name(name)?,
            description: validate_description(details.description)?,
            website: validate_website(details.website)?,
            contact_email: validate_email(details.contact_email)?,
            contact_phone: validate_phone(details.contact_phone)?,
            logo_url: validate_logo_url(details.logo_url)?,
            is_active: true,
            product_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn contact_email(&self) -> Option<&Email> {
        self.contact_email.as_ref()
    }

    pub fn contact_phone(&self) -> Option<&str> {
        self.contact_phone.as_deref()
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn product_count(&self) -> u64 {
        self.product_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_contact_info(&self) -> bool {
        self.contact_email.is_some() || self.contact_phone.is_some()
    }

    pub fn update_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn update_description(&mut self, description: Option<String>) -> DomainResult<()> {
        self.description = validate_description(description)?;
        self.touch();
        Ok(())
    }

    pub fn update_website(&mut self, website: Option<String>) -> DomainResult<()> {
        self.website = validate_website(website)?;
        self.touch();
        Ok(())
    }

    pub fn update_contact_email(&mut self, email: Option<String>) -> DomainResult<()> {
        self.contact_email = validate_email(email)?;
        self.touch();
        Ok(())
    }

    pub fn update_contact_phone(&mut self, phone: Option<String>) -> DomainResult<()> {
        self.contact_phone = validate_phone(phone)?;
        self.touch();
        Ok(())
    }

    pub fn update_logo_url(&mut self, logo_url: Option<String>) -> DomainResult<()> {
        self.logo_url = validate_logo_url(logo_url)?;
        self.touch();
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn increment_product_count(&mut self) {
        self.product_count += 1;
        self.touch();
    }

    pub fn decrement_product_count(&mut self) {
        if self.product_count > 0 {
            self.product_count -= 1;
            self.touch();
        }
    }

    pub fn set_product_count(&mut self, count: u64) {
        if self.product_count != count {
            self.product_count = count;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Brand {
    type Id = BrandId;

    fn id(&self) -> BrandId {
        self.id
    }

    fn with_id(mut self, id: BrandId) -> Self {
        self.id = id;
        self
    }
}
