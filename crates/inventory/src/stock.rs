use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use comercia_catalog::{Price, StockQuantity};
use comercia_core::text::{ensure_max_len, ensure_optional_max_len};
use comercia_core::{DomainError, DomainResult, Entity, ProductId, StockId, WarehouseId};

static BATCH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_-]+$").expect("batch pattern is valid"));

const LOCATION_MAX: usize = 50;
const BATCH_MAX: usize = 30;

/// Derived on every read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Normal,
    Low,
    High,
    Expired,
}

/// Where a stock record sits and which lot it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBatch {
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
}

/// Entity: quantity of one product held in one warehouse.
///
/// Invariants:
/// - `minimum_level <= maximum_level`
/// - `quantity <= maximum_level`
/// - `quantity >= minimum_level` unless the quantity is zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StockRecord")]
pub struct Stock {
    id: StockId,
    product_id: ProductId,
    warehouse_id: WarehouseId,
    quantity: StockQuantity,
    minimum_level: StockQuantity,
    maximum_level: StockQuantity,
    unit_cost: Price,
    total_value: Price,
    location: Option<String>,
    batch_number: Option<String>,
    expiration_date: Option<NaiveDate>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_levels(
    minimum: StockQuantity,
    maximum: StockQuantity,
    quantity: StockQuantity,
) -> DomainResult<()> {
    if minimum > maximum {
        return Err(DomainError::invalid(
            "Minimum stock level cannot be greater than maximum stock level",
        ));
    }
    if quantity > maximum {
        return Err(DomainError::invalid(
            "Quantity cannot exceed maximum stock level",
        ));
    }
    if quantity < minimum && !quantity.is_zero() {
        return Err(DomainError::invalid(
            "Quantity cannot be below minimum stock level unless zero",
        ));
    }
    Ok(())
}

fn validate_location(location: Option<String>) -> DomainResult<Option<String>> {
    let location = location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    ensure_optional_max_len(location.as_deref(), LOCATION_MAX, "Location")?;
    Ok(location)
}

fn validate_batch_number(batch: Option<String>) -> DomainResult<Option<String>> {
    let Some(batch) = batch.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) else {
        return Ok(None);
    };
    ensure_max_len(&batch, BATCH_MAX, "Batch number")?;
    if !BATCH_PATTERN.is_match(&batch) {
        return Err(DomainError::invalid(
            "Batch number can only contain uppercase letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(Some(batch))
}

fn value_of(unit_cost: Price, quantity: StockQuantity) -> DomainResult<Price> {
    unit_cost.multiply(Decimal::from(quantity.value()))
}

/// Stored form of a [`Stock`]; loading it re-checks the level invariants.
///
/// `total_value` is taken as stored since averaged receipts make it drift
/// from `unit_cost * quantity` by rounding.
#[derive(Debug, Clone, Deserialize)]
pub struct StockRecord {
    pub id: StockId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: StockQuantity,
    pub minimum_level: StockQuantity,
    pub maximum_level: StockQuantity,
    pub unit_cost: Price,
    pub total_value: Price,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StockRecord> for Stock {
    type Error = DomainError;

    fn try_from(record: StockRecord) -> DomainResult<Self> {
        record.product_id.require()?;
        record.warehouse_id.require()?;
        validate_levels(record.minimum_level, record.maximum_level, record.quantity)?;
        Ok(Self {
            id: record.id,
            product_id: record.product_id,
            warehouse_id: record.warehouse_id,
            quantity: record.quantity,
            minimum_level: record.minimum_level,
            maximum_level: record.maximum_level,
            unit_cost: record.unit_cost,
            total_value: record.total_value,
            location: validate_location(record.location)?,
            batch_number: validate_batch_number(record.batch_number)?,
            expiration_date: record.expiration_date,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Stock {
    pub fn create(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: StockQuantity,
        minimum_level: StockQuantity,
        maximum_level: StockQuantity,
        unit_cost: Price,
        batch: StockBatch,
    ) -> DomainResult<Self> {
        product_id.require()?;
        warehouse_id.require()?;
        validate_levels(minimum_level, maximum_level, quantity)?;
        let now = Utc::now();
        Ok(Self {
            id: StockId::null(),
            product_id,
            warehouse_id,
            quantity,
            minimum_level,
            maximum_level,
            unit_cost,
            total_value: value_of(unit_cost, quantity)?,
            location: validate_location(batch.location)?,
            batch_number: validate_batch_number(batch.batch_number)?,
            expiration_date: batch.expiration_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }

    pub fn quantity(&self) -> StockQuantity {
        self.quantity
    }

    pub fn minimum_level(&self) -> StockQuantity {
        self.minimum_level
    }

    pub fn maximum_level(&self) -> StockQuantity {
        self.maximum_level
    }

    pub fn unit_cost(&self) -> Price {
        self.unit_cost
    }

    pub fn total_value(&self) -> Price {
        self.total_value
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn batch_number(&self) -> Option<&str> {
        self.batch_number.as_deref()
    }

    pub fn expiration_date(&self) -> Option<NaiveDate> {
        self.expiration_date
    }

    /// Location, batch and expiration as a unit, e.g. to seed a transfer target.
    pub fn batch(&self) -> StockBatch {
        StockBatch {
            location: self.location.clone(),
            batch_number: self.batch_number.clone(),
            expiration_date: self.expiration_date,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Receives `quantity` units bought at `unit_cost` and re-averages the
    /// unit cost: `(total_value + quantity * unit_cost) / new_quantity`.
    pub fn add_stock(&mut self, quantity: StockQuantity, unit_cost: Price) -> DomainResult<()> {
        if quantity.is_zero() {
            return Err(DomainError::invalid(
                "Quantity to add must be greater than zero",
            ));
        }
        let new_quantity = self.quantity.add(quantity)?;
        if new_quantity > self.maximum_level {
            return Err(DomainError::invalid(
                "Cannot add stock: exceeds maximum stock level",
            ));
        }
        let total = self.total_value.value() + unit_cost.value() * Decimal::from(quantity.value());
        let total_value = Price::new(total)?;
        let averaged = Price::new(total / Decimal::from(new_quantity.value()))?;

        self.quantity = new_quantity;
        self.unit_cost = averaged;
        self.total_value = total_value;
        self.touch();
        Ok(())
    }

    /// Unit cost is unchanged on removal; only the total value shrinks.
    pub fn remove_stock(&mut self, quantity: StockQuantity) -> DomainResult<()> {
        let new_quantity = self.quantity.subtract(quantity)?;
        if new_quantity < self.minimum_level && !new_quantity.is_zero() {
            return Err(DomainError::invalid(
                "Cannot remove stock: would fall below minimum stock level",
            ));
        }
        self.total_value = value_of(self.unit_cost, new_quantity)?;
        self.quantity = new_quantity;
        self.touch();
        Ok(())
    }

    pub fn adjust_levels(&mut self, minimum: StockQuantity, maximum: StockQuantity) -> DomainResult<()> {
        validate_levels(minimum, maximum, self.quantity)?;
        self.minimum_level = minimum;
        self.maximum_level = maximum;
        self.touch();
        Ok(())
    }

    pub fn update_unit_cost(&mut self, unit_cost: Price) -> DomainResult<()> {
        self.total_value = value_of(unit_cost, self.quantity)?;
        self.unit_cost = unit_cost;
        self.touch();
        Ok(())
    }

    pub fn update_location(&mut self, location: Option<String>) -> DomainResult<()> {
        self.location = validate_location(location)?;
        self.touch();
        Ok(())
    }

    pub fn update_batch_info(
        &mut self,
        batch_number: Option<String>,
        expiration_date: Option<NaiveDate>,
    ) -> DomainResult<()> {
        self.batch_number = validate_batch_number(batch_number)?;
        self.expiration_date = expiration_date;
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

    /// Includes an empty record whose minimum is above zero.
    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.minimum_level
    }

    pub fn is_above_maximum(&self) -> bool {
        self.quantity > self.maximum_level
    }

    pub fn is_expired_at(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|date| date < today)
    }

    /// True for lots expiring on or before `today + days` (already expired included).
    ///
    /// A horizon past the last representable date covers every dated lot; one
    /// before the first covers none.
    pub fn will_expire_within(&self, days: i64, today: NaiveDate) -> bool {
        let horizon = Duration::try_days(days).and_then(|d| today.checked_add_signed(d));
        self.expiration_date.is_some_and(|date| match horizon {
            Some(limit) => date <= limit,
            None => days > 0,
        })
    }

    /// Negative once the lot has expired.
    pub fn days_until_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_date.map(|date| (date - today).num_days())
    }

    pub fn status_at(&self, today: NaiveDate) -> StockStatus {
        if self.is_below_minimum() {
            StockStatus::Low
        } else if self.is_above_maximum() {
            StockStatus::High
        } else if self.is_expired_at(today) {
            StockStatus::Expired
        } else {
            StockStatus::Normal
        }
    }

    pub fn status(&self) -> StockStatus {
        self.status_at(Utc::now().date_naive())
    }

    /// Units needed to fill the record up to its maximum.
    pub fn replenishment_quantity(&self) -> StockQuantity {
        self.maximum_level
            .subtract(self.quantity)
            .unwrap_or_else(|_| StockQuantity::zero())
    }

    pub fn requires_replenishment(&self) -> bool {
        self.is_below_minimum() || self.quantity.is_zero()
    }

    pub fn has_batch_info(&self) -> bool {
        self.batch_number.is_some() || self.expiration_date.is_some()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Stock {
    type Id = StockId;

    fn id(&self) -> StockId {
        self.id
    }

    fn with_id(mut self, id: StockId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(v: i64) -> StockQuantity {
        StockQuantity::new(v).unwrap()
    }

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn stock(quantity: i64, min: i64, max: i64, cost: &str) -> Stock {
        Stock::create(
            ProductId::from(1),
            WarehouseId::from(1),
            qty(quantity),
            qty(min),
            qty(max),
            price(cost),
            StockBatch::default(),
        )
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn create_computes_total_value() {
        let s = stock(5, 2, 20, "10.00");
        assert!(s.id().is_null());
        assert_eq!(s.total_value(), price("50"));
        assert!(s.is_active());
    }

    #[test]
    fn create_enforces_levels() {
        let bad = |q, min, max| {
            Stock::create(
                ProductId::from(1),
                WarehouseId::from(1),
                qty(q),
                qty(min),
                qty(max),
                price("1"),
                StockBatch::default(),
            )
            .unwrap_err()
            .to_string()
        };
        assert_eq!(
            bad(5, 10, 2),
            "Minimum stock level cannot be greater than maximum stock level"
        );
        assert_eq!(bad(30, 2, 20), "Quantity cannot exceed maximum stock level");
        assert_eq!(
            bad(1, 2, 20),
            "Quantity cannot be below minimum stock level unless zero"
        );
        assert!(
            Stock::create(
                ProductId::from(1),
                WarehouseId::from(1),
                qty(0),
                qty(2),
                qty(20),
                price("1"),
                StockBatch::default(),
            )
            .is_ok()
        );
    }

    #[test]
    fn create_requires_persisted_references() {
        let err = Stock::create(
            ProductId::null(),
            WarehouseId::from(1),
            qty(0),
            qty(0),
            qty(1),
            price("1"),
            StockBatch::default(),
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn add_stock_averages_unit_cost() {
        let mut s = stock(10, 0, 100, "10.00");
        s.add_stock(qty(10), price("20.00")).unwrap();
        assert_eq!(s.quantity(), qty(20));
        assert_eq!(s.unit_cost(), price("15.00"));
        assert_eq!(s.total_value(), price("300.00"));
    }

    #[test]
    fn add_stock_into_empty_record_takes_incoming_cost() {
        let mut s = stock(0, 0, 100, "0");
        s.add_stock(qty(3), price("7.50")).unwrap();
        assert_eq!(s.unit_cost(), price("7.50"));
    }

    #[test]
    fn add_stock_rejects_exceeding_maximum_and_zero() {
        let mut s = stock(15, 2, 20, "10");
        let err = s.add_stock(qty(6), price("10")).unwrap_err();
        assert_eq!(err.to_string(), "Cannot add stock: exceeds maximum stock level");
        assert!(s.add_stock(qty(0), price("10")).is_err());
        assert_eq!(s.quantity(), qty(15));
    }

    #[test]
    fn remove_stock_respects_minimum_unless_emptied() {
        let mut s = stock(5, 2, 20, "10.00");
        let err = s.remove_stock(qty(4)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot remove stock: would fall below minimum stock level"
        );
        assert_eq!(s.quantity(), qty(5));

        s.remove_stock(qty(5)).unwrap();
        assert_eq!(s.quantity(), StockQuantity::zero());
        assert_eq!(s.total_value(), Price::zero());
        assert_eq!(s.unit_cost(), price("10.00"));
    }

    #[test]
    fn remove_more_than_available_fails() {
        let mut s = stock(5, 0, 20, "10.00");
        assert!(s.remove_stock(qty(6)).is_err());
    }

    #[test]
    fn adjust_levels_revalidates_quantity() {
        let mut s = stock(5, 2, 20, "1");
        assert!(s.adjust_levels(qty(6), qty(20)).is_err());
        assert!(s.adjust_levels(qty(0), qty(4)).is_err());
        s.adjust_levels(qty(5), qty(5)).unwrap();
        assert_eq!(s.maximum_level(), qty(5));
    }

    #[test]
    fn update_unit_cost_recomputes_total() {
        let mut s = stock(4, 0, 20, "10");
        s.update_unit_cost(price("12.25")).unwrap();
        assert_eq!(s.total_value(), price("49.00"));
    }

    #[test]
    fn batch_and_location_validation() {
        let mut s = stock(4, 0, 20, "10");
        assert!(s.update_batch_info(Some("lot-1".into()), None).is_err());
        assert!(s.update_batch_info(Some("L".repeat(31)), None).is_err());
        s.update_batch_info(Some("LOT-2026_01".into()), Some(date(2026, 12, 31)))
            .unwrap();
        assert!(s.has_batch_info());
        assert!(s.update_location(Some("x".repeat(51))).is_err());
        s.update_location(Some("  A-01-03 ".into())).unwrap();
        assert_eq!(s.location(), Some("A-01-03"));
        assert_eq!(s.batch().batch_number.as_deref(), Some("LOT-2026_01"));
    }

    #[test]
    fn expiration_queries() {
        let mut s = stock(4, 0, 20, "10");
        let today = date(2026, 10, 19);
        assert_eq!(s.days_until_expiration(today), None);
        assert!(!s.is_expired_at(today));

        s.update_batch_info(None, Some(date(2026, 10, 29))).unwrap();
        assert_eq!(s.days_until_expiration(today), Some(10));
        assert!(s.will_expire_within(10, today));
        assert!(!s.will_expire_within(9, today));
        assert_eq!(s.status_at(today), StockStatus::Normal);

        let later = date(2026, 11, 2);
        assert!(s.is_expired_at(later));
        assert_eq!(s.days_until_expiration(later), Some(-4));
        assert_eq!(s.status_at(later), StockStatus::Expired);
    }

    #[test]
    fn stored_stock_is_checked_on_load() {
        let s = Stock::create(
            ProductId::from(1),
            WarehouseId::from(2),
            qty(5),
            qty(2),
            qty(10),
            price("12.50"),
            StockBatch {
                location: Some("A-01".into()),
                batch_number: Some("LOTE-7".into()),
                expiration_date: Some(date(2030, 1, 31)),
            },
        )
        .unwrap();
        let json = serde_json::to_value(&s).unwrap();
        let back: Stock = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, s);

        let with = |field: &str, value: serde_json::Value| {
            let mut tampered = json.clone();
            tampered[field] = value;
            serde_json::from_value::<Stock>(tampered)
        };
        assert!(with("quantity", 50.into()).is_err());
        assert!(with("minimum_level", 11.into()).is_err());
        assert!(with("quantity", 1.into()).is_err());
        assert!(with("quantity", 0.into()).is_ok());
        assert!(with("batch_number", "lote 7".into()).is_err());
        assert!(with("location", "x".repeat(51).into()).is_err());
        assert!(with("product_id", serde_json::Value::Null).is_err());
    }

    #[test]
    fn out_of_range_horizons_do_not_overflow() {
        let mut s = stock(4, 0, 20, "10");
        let today = date(2026, 1, 1);
        assert!(!s.will_expire_within(i64::MAX, today));

        s.update_batch_info(None, Some(date(2030, 6, 30))).unwrap();
        assert!(s.will_expire_within(200_000_000, today));
        assert!(s.will_expire_within(i64::MAX, today));
        assert!(!s.will_expire_within(-200_000_000, today));
        assert!(!s.will_expire_within(i64::MIN, today));
    }

    #[test]
    fn status_and_replenishment() {
        let mut s = stock(5, 2, 20, "1");
        assert_eq!(s.status_at(date(2026, 1, 1)), StockStatus::Normal);
        assert_eq!(s.replenishment_quantity(), qty(15));
        assert!(!s.requires_replenishment());

        s.remove_stock(qty(5)).unwrap();
        assert_eq!(s.status_at(date(2026, 1, 1)), StockStatus::Low);
        assert!(s.requires_replenishment());
        assert_eq!(s.replenishment_quantity(), qty(20));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StockStatus::Expired).unwrap(),
            "\"expired\""
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig { cases: 1000, .. ProptestConfig::default() })]

            #[test]
            fn add_stock_is_weighted_average(
                held in 1i64..500,
                held_cost in 0i64..100_000,
                added in 1i64..500,
                added_cost in 0i64..100_000,
            ) {
                let held_cost = Price::from_cents(held_cost).unwrap();
                let added_cost = Price::from_cents(added_cost).unwrap();
                let mut s = Stock::create(
                    ProductId::from(1),
                    WarehouseId::from(1),
                    qty(held),
                    qty(0),
                    qty(1000),
                    held_cost,
                    StockBatch::default(),
                ).unwrap();
                s.add_stock(qty(added), added_cost).unwrap();

                let expected = (held_cost.value() * Decimal::from(held)
                    + added_cost.value() * Decimal::from(added))
                    / Decimal::from(held + added);
                prop_assert_eq!(s.unit_cost(), Price::new(expected).unwrap());
                prop_assert_eq!(s.quantity(), qty(held + added));
            }

            #[test]
            fn remove_to_zero_always_succeeds(held in 1i64..1000, min in 0i64..1000) {
                let min = min.min(held);
                let mut s = Stock::create(
                    ProductId::from(1),
                    WarehouseId::from(1),
                    qty(held),
                    qty(min),
                    qty(1000),
                    Price::from_cents(1999).unwrap(),
                    StockBatch::default(),
                ).unwrap();
                s.remove_stock(qty(held)).unwrap();
                prop_assert!(s.quantity().is_zero());
                prop_assert!(s.total_value().is_zero());
            }
        }
    }
}
