use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use comercia_core::{BrandId, CategoryId, DomainResult, Entity, ProductId, UnitId};

use crate::builder::ProductRecord;
use crate::dimensions::Dimensions;
use crate::price::Price;
use crate::product_name::ProductName;
use crate::quantity::StockQuantity;
use crate::sku::Sku;
use crate::slug::ProductSlug;
use crate::weight::Weight;

/// Entity: catalog product.
///
/// Built through [`crate::ProductBuilder`]; afterwards mutated only through
/// the intention-revealing methods below, each of which bumps `updated_at`.
/// Stock mutators do nothing for products that do not track stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    pub(crate) id: ProductId,
    pub(crate) sku: Sku,
    pub(crate) name: ProductName,
    pub(crate) slug: ProductSlug,
    pub(crate) description: Option<String>,
    pub(crate) short_description: Option<String>,
    pub(crate) category_id: Option<CategoryId>,
    pub(crate) brand_id: Option<BrandId>,
    pub(crate) unit_id: Option<UnitId>,
    pub(crate) cost_price: Price,
    pub(crate) selling_price: Price,
    pub(crate) wholesale_price: Option<Price>,
    pub(crate) discount_price: Option<Price>,
    /// Percentage, e.g. `16` for 16 % VAT.
    pub(crate) tax_rate: Decimal,
    pub(crate) current_stock: StockQuantity,
    pub(crate) min_stock: StockQuantity,
    pub(crate) max_stock: Option<StockQuantity>,
    pub(crate) track_stock: bool,
    pub(crate) allow_backorders: bool,
    pub(crate) weight: Option<Weight>,
    pub(crate) dimensions: Option<Dimensions>,
    pub(crate) barcode: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) manufacturer_part_number: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) additional_images: Vec<String>,
    pub(crate) specifications: BTreeMap<String, String>,
    pub(crate) is_active: bool,
    pub(crate) is_featured: bool,
    pub(crate) is_virtual: bool,
    pub(crate) requires_shipping: bool,
    pub(crate) sort_order: i32,
    pub(crate) available_from: Option<DateTime<Utc>>,
    pub(crate) available_to: Option<DateTime<Utc>>,
    pub(crate) metadata: BTreeMap<String, String>,
    pub(crate) notes: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn slug(&self) -> &ProductSlug {
        &self.slug
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn brand_id(&self) -> Option<BrandId> {
        self.brand_id
    }

    pub fn unit_id(&self) -> Option<UnitId> {
        self.unit_id
    }

    pub fn cost_price(&self) -> Price {
        self.cost_price
    }

    pub fn selling_price(&self) -> Price {
        self.selling_price
    }

    pub fn wholesale_price(&self) -> Option<Price> {
        self.wholesale_price
    }

    pub fn discount_price(&self) -> Option<Price> {
        self.discount_price
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn current_stock(&self) -> StockQuantity {
        self.current_stock
    }

    pub fn min_stock(&self) -> StockQuantity {
        self.min_stock
    }

    pub fn max_stock(&self) -> Option<StockQuantity> {
        self.max_stock
    }

    pub fn tracks_stock(&self) -> bool {
        self.track_stock
    }

    pub fn allows_backorders(&self) -> bool {
        self.allow_backorders
    }

    pub fn weight(&self) -> Option<&Weight> {
        self.weight.as_ref()
    }

    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dimensions.as_ref()
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn manufacturer_part_number(&self) -> Option<&str> {
        self.manufacturer_part_number.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn additional_images(&self) -> &[String] {
        &self.additional_images
    }

    pub fn specifications(&self) -> &BTreeMap<String, String> {
        &self.specifications
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn requires_shipping(&self) -> bool {
        self.requires_shipping
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn available_from(&self) -> Option<DateTime<Utc>> {
        self.available_from
    }

    pub fn available_to(&self) -> Option<DateTime<Utc>> {
        self.available_to
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Discount price when set and non-zero, otherwise the selling price.
    pub fn final_price(&self) -> Price {
        match self.discount_price {
            Some(discount) if !discount.is_zero() => discount,
            _ => self.selling_price,
        }
    }

    pub fn price_with_tax(&self) -> DomainResult<Price> {
        self.final_price().apply_tax(self.tax_rate)
    }

    /// Markup over cost in percent; zero when the cost is zero.
    pub fn profit_margin(&self) -> Decimal {
        let cost = self.cost_price.value();
        if cost.is_zero() {
            return Decimal::ZERO;
        }
        ((self.final_price().value() - cost) / cost * Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// Cost of the units on hand.
    pub fn inventory_value(&self) -> DomainResult<Price> {
        self.cost_price
            .multiply(Decimal::from(self.current_stock.value()))
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        if self.available_from.is_some_and(|from| from > now) {
            return false;
        }
        if self.available_to.is_some_and(|to| to < now) {
            return false;
        }
        self.is_active
    }

    pub fn has_stock(&self) -> bool {
        !self.track_stock || self.current_stock.is_positive()
    }

    pub fn is_below_minimum_stock(&self) -> bool {
        self.track_stock && self.current_stock < self.min_stock
    }

    pub fn is_above_maximum_stock(&self) -> bool {
        match self.max_stock {
            Some(max) if self.track_stock => self.current_stock > max,
            _ => false,
        }
    }

    pub fn update_stock(&mut self, quantity: StockQuantity) {
        if self.track_stock {
            self.current_stock = quantity;
            self.touch();
        }
    }

    pub fn increment_stock(&mut self, quantity: u64) -> DomainResult<()> {
        if self.track_stock {
            self.current_stock = self.current_stock.add(StockQuantity::new(quantity as i64)?)?;
            self.touch();
        }
        Ok(())
    }

    /// Clamped at zero.
    pub fn decrement_stock(&mut self, quantity: u64) {
        if self.track_stock {
            let remaining = self.current_stock.value().saturating_sub(quantity);
            self.current_stock = StockQuantity::new(remaining as i64).unwrap_or_default();
            self.touch();
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    pub fn feature(&mut self) {
        self.is_featured = true;
        self.touch();
    }

    pub fn unfeature(&mut self) {
        self.is_featured = false;
        self.touch();
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }
}
