use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use comercia_catalog::{Dimensions, StockQuantity};
use comercia_core::text::{ensure_max_len, ensure_optional_max_len, ensure_present};
use comercia_core::{DomainError, DomainResult, Email, Entity, WarehouseId};

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_-]+$").expect("warehouse code pattern is valid"));

const NAME_MAX: usize = 100;
const CODE_MAX: usize = 20;
const ADDRESS_MAX: usize = 255;
const EMAIL_MAX: usize = 100;
const PHONE_MAX: usize = 20;

/// Optional location and contact fields accepted on creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseDetails {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Entity: storage site with a bounded capacity.
///
/// `current_stock` is a cache of the stock records held here; the store
/// recomputes it, and it never exceeds `capacity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WarehouseRecord")]
pub struct Warehouse {
    id: WarehouseId,
    name: String,
    code: String,
    address: String,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    postal_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    contact_person: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<Email>,
    dimensions: Dimensions,
    capacity: StockQuantity,
    current_stock: StockQuantity,
    is_active: bool,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    ensure_present(name, NAME_MAX, "Warehouse name")?;
    Ok(name.to_string())
}

fn validate_code(code: &str) -> DomainResult<String> {
    let code = code.trim();
    ensure_present(code, CODE_MAX, "Warehouse code")?;
    if !CODE_PATTERN.is_match(code) {
        return Err(DomainError::invalid(
            "Warehouse code can only contain uppercase letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(code.to_string())
}

fn validate_address(address: &str) -> DomainResult<String> {
    let address = address.trim();
    ensure_present(address, ADDRESS_MAX, "Warehouse address")?;
    Ok(address.to_string())
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> DomainResult<()> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(DomainError::invalid("Latitude must be between -90 and 90"));
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(DomainError::invalid(
                    "Longitude must be between -180 and 180",
                ));
            }
            Ok(())
        }
        _ => Err(DomainError::invalid(
            "Both latitude and longitude must be provided together",
        )),
    }
}

fn validate_contact(
    phone: Option<String>,
    email: Option<String>,
) -> DomainResult<(Option<String>, Option<Email>)> {
    let phone = non_blank(phone);
    ensure_optional_max_len(phone.as_deref(), PHONE_MAX, "Contact phone")?;
    let email = match non_blank(email) {
        Some(email) => {
            ensure_max_len(&email, EMAIL_MAX, "Contact email")?;
            Some(Email::new(&email)?)
        }
        None => None,
    };
    Ok((phone, email))
}

/// Stored form of a [`Warehouse`], validated like a freshly created one.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseRecord {
    pub id: WarehouseId,
    pub name: String,
    pub code: String,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub dimensions: Dimensions,
    pub capacity: StockQuantity,
    pub current_stock: StockQuantity,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WarehouseRecord> for Warehouse {
    type Error = DomainError;

    fn try_from(record: WarehouseRecord) -> DomainResult<Self> {
        validate_coordinates(record.latitude, record.longitude)?;
        let (contact_phone, contact_email) =
            validate_contact(record.contact_phone, record.contact_email)?;
        if record.current_stock > record.capacity {
            return Err(DomainError::invalid(
                "Current stock cannot exceed the warehouse capacity",
            ));
        }
        Ok(Self {
            id: record.id,
            name: validate_name(&record.name)?,
            code: validate_code(&record.code)?,
            address: validate_address(&record.address)?,
            city: non_blank(record.city),
            state: non_blank(record.state),
            country: non_blank(record.country),
            postal_code: non_blank(record.postal_code),
            latitude: record.latitude,
            longitude: record.longitude,
            contact_person: non_blank(record.contact_person),
            contact_phone,
            contact_email,
            dimensions: record.dimensions,
            capacity: record.capacity,
            current_stock: record.current_stock,
            is_active: record.is_active,
            is_default: record.is_default,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Warehouse {
    pub fn create(
        name: &str,
        code: &str,
        address: &str,
        dimensions: Dimensions,
        capacity: StockQuantity,
        details: WarehouseDetails,
        is_default: bool,
    ) -> DomainResult<Self> {
        validate_coordinates(details.latitude, details.longitude)?;
        let (contact_phone, contact_email) =
            validate_contact(details.contact_phone, details.contact_email)?;
        let now = Utc::now();
        Ok(Self {
            id: WarehouseId::null(),
            name: validate_name(name)?,
            code: validate_code(code)?,
            address: validate_address(address)?,
            city: non_blank(details.city),
            state: non_blank(details.state),
            country: non_blank(details.country),
            postal_code: non_blank(details.postal_code),
            latitude: details.latitude,
            longitude: details.longitude,
            contact_person: non_blank(details.contact_person),
            contact_phone,
            contact_email,
            dimensions,
            capacity,
            current_stock: StockQuantity::zero(),
            is_active: true,
            is_default,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    pub fn contact_person(&self) -> Option<&str> {
        self.contact_person.as_deref()
    }

    pub fn contact_phone(&self) -> Option<&str> {
        self.contact_phone.as_deref()
    }

    pub fn contact_email(&self) -> Option<&Email> {
        self.contact_email.as_ref()
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn capacity(&self) -> StockQuantity {
        self.capacity
    }

    pub fn current_stock(&self) -> StockQuantity {
        self.current_stock
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn update_code(&mut self, code: &str) -> DomainResult<()> {
        self.code = validate_code(code)?;
        self.touch();
        Ok(())
    }

    pub fn update_address(&mut self, address: &str) -> DomainResult<()> {
        self.address = validate_address(address)?;
        self.touch();
        Ok(())
    }

    pub fn update_location(
        &mut self,
        city: Option<String>,
        state: Option<String>,
        country: Option<String>,
        postal_code: Option<String>,
    ) {
        self.city = non_blank(city);
        self.state = non_blank(state);
        self.country = non_blank(country);
        self.postal_code = non_blank(postal_code);
        self.touch();
    }

    pub fn update_coordinates(&mut self, latitude: Option<f64>, longitude: Option<f64>) -> DomainResult<()> {
        validate_coordinates(latitude, longitude)?;
        self.latitude = latitude;
        self.longitude = longitude;
        self.touch();
        Ok(())
    }

    pub fn update_contact_info(
        &mut self,
        person: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> DomainResult<()> {
        let (phone, email) = validate_contact(phone, email)?;
        self.contact_person = non_blank(person);
        self.contact_phone = phone;
        self.contact_email = email;
        self.touch();
        Ok(())
    }

    pub fn update_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        self.touch();
    }

    pub fn update_capacity(&mut self, capacity: StockQuantity) -> DomainResult<()> {
        if capacity < self.current_stock {
            return Err(DomainError::invalid(
                "Capacity cannot be lower than the current stock",
            ));
        }
        self.capacity = capacity;
        self.touch();
        Ok(())
    }

    /// Overwrites the cached stock total, e.g. after the store recounts it.
    pub fn update_current_stock(&mut self, current: StockQuantity) -> DomainResult<()> {
        if current > self.capacity {
            return Err(DomainError::invalid(
                "Cannot add stock: exceeds warehouse capacity",
            ));
        }
        self.current_stock = current;
        self.touch();
        Ok(())
    }

    pub fn add_stock(&mut self, quantity: StockQuantity) -> DomainResult<()> {
        self.update_current_stock(self.current_stock.add(quantity)?)
    }

    pub fn remove_stock(&mut self, quantity: StockQuantity) -> DomainResult<()> {
        self.current_stock = self.current_stock.subtract(quantity)?;
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

    pub fn mark_as_default(&mut self) {
        self.is_default = true;
        self.touch();
    }

    pub fn unmark_as_default(&mut self) {
        self.is_default = false;
        self.touch();
    }

    pub fn available_capacity(&self) -> StockQuantity {
        self.capacity
            .subtract(self.current_stock)
            .unwrap_or_else(|_| StockQuantity::zero())
    }

    /// 0 for a warehouse without capacity.
    pub fn utilization_percentage(&self) -> f64 {
        self.current_stock.percentage_of(self.capacity)
    }

    pub fn has_available_capacity(&self, required: StockQuantity) -> bool {
        self.available_capacity() >= required
    }

    /// Address, city, state, postal code and country, skipping the blanks.
    pub fn full_address(&self) -> String {
        [
            Some(self.address.as_str()),
            self.city.as_deref(),
            self.state.as_deref(),
            self.postal_code.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn has_contact_info(&self) -> bool {
        self.contact_person.is_some() || self.contact_phone.is_some() || self.contact_email.is_some()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> WarehouseId {
        self.id
    }

    fn with_id(mut self, id: WarehouseId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comercia_catalog::LengthUnit;

    fn qty(v: i64) -> StockQuantity {
        StockQuantity::new(v).unwrap()
    }

    fn site() -> Dimensions {
        Dimensions::new(40.0, 25.0, 8.0, LengthUnit::M).unwrap()
    }

    fn warehouse(capacity: i64) -> Warehouse {
        Warehouse::create(
            "Almacén Central",
            "CDMX-01",
            "Av. Insurgentes Sur 1234",
            site(),
            qty(capacity),
            WarehouseDetails {
                city: Some("Ciudad de México".into()),
                state: Some("CDMX".into()),
                country: Some("México".into()),
                postal_code: Some("03100".into()),
                ..Default::default()
            },
            false,
        )
        .unwrap()
    }

    #[test]
    fn create_defaults() {
        let w = warehouse(1000);
        assert!(w.id().is_null());
        assert!(w.is_active());
        assert!(!w.is_default());
        assert_eq!(w.current_stock(), StockQuantity::zero());
        assert_eq!(
            w.full_address(),
            "Av. Insurgentes Sur 1234, Ciudad de México, CDMX, 03100, México"
        );
        assert!(!w.has_coordinates());
        assert!(!w.has_contact_info());
    }

    #[test]
    fn code_rules() {
        let make = |code: &str| {
            Warehouse::create("W", code, "Calle 1", site(), qty(1), WarehouseDetails::default(), false)
        };
        assert!(make("north-1").is_err());
        assert!(make("NORTH 1").is_err());
        assert!(make(&"A".repeat(21)).is_err());
        assert!(make("  ").is_err());
        assert_eq!(make(" NORTH_1 ").unwrap().code(), "NORTH_1");
    }

    #[test]
    fn coordinates_come_in_pairs() {
        let mut w = warehouse(10);
        let err = w.update_coordinates(Some(19.4), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Both latitude and longitude must be provided together"
        );
        assert!(w.update_coordinates(Some(91.0), Some(0.0)).is_err());
        assert!(w.update_coordinates(Some(0.0), Some(-181.0)).is_err());
        w.update_coordinates(Some(19.4326), Some(-99.1332)).unwrap();
        assert!(w.has_coordinates());
    }

    #[test]
    fn contact_info_validation() {
        let mut w = warehouse(10);
        assert!(
            w.update_contact_info(None, None, Some("not-an-email".into()))
                .is_err()
        );
        assert!(
            w.update_contact_info(None, Some("5".repeat(21)), None)
                .is_err()
        );
        w.update_contact_info(Some("Ana".into()), None, Some("Almacen@Example.com".into()))
            .unwrap();
        assert_eq!(w.contact_email().map(Email::value), Some("almacen@example.com"));
        assert!(w.has_contact_info());
    }

    #[test]
    fn stock_is_bounded_by_capacity() {
        let mut w = warehouse(100);
        w.add_stock(qty(60)).unwrap();
        assert_eq!(w.available_capacity(), qty(40));
        assert!((w.utilization_percentage() - 60.0).abs() < 1e-9);
        assert!(w.has_available_capacity(qty(40)));
        assert!(!w.has_available_capacity(qty(41)));

        let err = w.add_stock(qty(41)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot add stock: exceeds warehouse capacity");
        assert_eq!(w.current_stock(), qty(60));

        assert!(w.update_capacity(qty(50)).is_err());
        w.remove_stock(qty(60)).unwrap();
        assert!(w.remove_stock(qty(1)).is_err());
    }

    #[test]
    fn zero_capacity_has_zero_utilization() {
        let w = warehouse(0);
        assert_eq!(w.utilization_percentage(), 0.0);
    }

    #[test]
    fn default_flag_toggles() {
        let mut w = warehouse(1);
        w.mark_as_default();
        assert!(w.is_default());
        w.unmark_as_default();
        assert!(!w.is_default());
    }

    #[test]
    fn stored_warehouses_are_checked_on_load() {
        let mut w = warehouse(100);
        w.update_contact_info(Some("Ana".into()), None, Some("ana@acme.mx".into()))
            .unwrap();
        w.add_stock(qty(40)).unwrap();
        let json = serde_json::to_value(&w).unwrap();
        let back: Warehouse = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, w);

        let with = |field: &str, value: serde_json::Value| {
            let mut tampered = json.clone();
            tampered[field] = value;
            serde_json::from_value::<Warehouse>(tampered)
        };
        assert!(with("current_stock", 150.into()).is_err());
        assert!(with("code", "cdmx 01".into()).is_err());
        assert!(with("name", "".into()).is_err());
        assert!(with("address", " ".into()).is_err());
        assert!(with("latitude", 19.4.into()).is_err());
        assert!(with("contact_email", "not-an-email".into()).is_err());
    }
}
