//! Step-by-step construction of [`Product`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use comercia_core::text::ensure_optional_max_len;
use comercia_core::{BrandId, CategoryId, DomainError, DomainResult, ProductId, UnitId};

use crate::dimensions::Dimensions;
use crate::price::Price;
use crate::product::Product;
use crate::product_name::ProductName;
use crate::quantity::StockQuantity;
use crate::sku::Sku;
use crate::slug::ProductSlug;
use crate::weight::Weight;

const SHORT_DESCRIPTION_MAX: usize = 500;
const CODE_MAX: usize = 100;

/// Defaults: no stock, stock tracked, active, requires shipping.
///
/// Setters that take raw values validate them immediately; cross-field rules
/// (stock bounds, availability window) are checked by [`ProductBuilder::build`].
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    pub fn new(name: &str, sku: &str, selling_price: Price, cost_price: Price) -> DomainResult<Self> {
        let name = ProductName::new(name)?;
        let slug = ProductSlug::from_name(name.value())?;
        let now = Utc::now();
        Ok(Self {
            product: Product {
                id: ProductId::null(),
                sku: Sku::new(sku)?,
                name,
                slug,
                description: None,
                short_description: None,
                category_id: None,
                brand_id: None,
                unit_id: None,
                cost_price,
                selling_price,
                wholesale_price: None,
                discount_price: None,
                tax_rate: Decimal::ZERO,
                current_stock: StockQuantity::zero(),
                min_stock: StockQuantity::zero(),
                max_stock: None,
                track_stock: true,
                allow_backorders: false,
                weight: None,
                dimensions: None,
                barcode: None,
                model: None,
                manufacturer_part_number: None,
                image_url: None,
                additional_images: Vec::new(),
                specifications: BTreeMap::new(),
                is_active: true,
                is_featured: false,
                is_virtual: false,
                requires_shipping: true,
                sort_order: 0,
                available_from: None,
                available_to: None,
                metadata: BTreeMap::new(),
                notes: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        })
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.product.id = id;
        self
    }

    /// Keeps the original creation time when rebuilding a stored product.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.product.created_at = created_at;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.product.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_short_description(mut self, short: Option<String>) -> DomainResult<Self> {
        ensure_optional_max_len(short.as_deref(), SHORT_DESCRIPTION_MAX, "Short description")?;
        self.product.short_description = short;
        Ok(self)
    }

    pub fn with_category_id(mut self, id: Option<CategoryId>) -> Self {
        self.product.category_id = id.filter(|id| !id.is_null());
        self
    }

    pub fn with_brand_id(mut self, id: Option<BrandId>) -> Self {
        self.product.brand_id = id.filter(|id| !id.is_null());
        self
    }

    pub fn with_unit_id(mut self, id: Option<UnitId>) -> Self {
        self.product.unit_id = id.filter(|id| !id.is_null());
        self
    }

    pub fn with_wholesale_price(mut self, price: Option<Price>) -> Self {
        self.product.wholesale_price = price;
        self
    }

    pub fn with_discount_price(mut self, price: Option<Price>) -> Self {
        self.product.discount_price = price;
        self
    }

    /// Percentage in `0..=100`.
    pub fn with_tax_rate(mut self, rate: Decimal) -> DomainResult<Self> {
        self.product.tax_rate = check_tax_rate(rate)?;
        Ok(self)
    }

    pub fn with_current_stock(mut self, quantity: i64) -> DomainResult<Self> {
        self.product.current_stock = StockQuantity::new(quantity)?;
        Ok(self)
    }

    pub fn with_min_stock(mut self, quantity: i64) -> DomainResult<Self> {
        self.product.min_stock = StockQuantity::new(quantity)?;
        Ok(self)
    }

    pub fn with_max_stock(mut self, quantity: Option<i64>) -> DomainResult<Self> {
        self.product.max_stock = quantity.map(StockQuantity::new).transpose()?;
        Ok(self)
    }

    pub fn with_track_stock(mut self, track: bool) -> Self {
        self.product.track_stock = track;
        self
    }

    pub fn with_allow_backorders(mut self, allow: bool) -> Self {
        self.product.allow_backorders = allow;
        self
    }

    pub fn with_weight(mut self, weight: Option<Weight>) -> Self {
        self.product.weight = weight;
        self
    }

    pub fn with_dimensions(mut self, dimensions: Option<Dimensions>) -> Self {
        self.product.dimensions = dimensions;
        self
    }

    pub fn with_barcode(mut self, barcode: Option<String>) -> DomainResult<Self> {
        ensure_optional_max_len(barcode.as_deref(), CODE_MAX, "Barcode")?;
        self.product.barcode = barcode;
        Ok(self)
    }

    pub fn with_model(mut self, model: Option<String>) -> DomainResult<Self> {
        ensure_optional_max_len(model.as_deref(), CODE_MAX, "Model")?;
        self.product.model = model;
        Ok(self)
    }

    pub fn with_manufacturer_part_number(mut self, mpn: Option<String>) -> DomainResult<Self> {
        ensure_optional_max_len(mpn.as_deref(), CODE_MAX, "Manufacturer part number")?;
        self.product.manufacturer_part_number = mpn;
        Ok(self)
    }

    pub fn with_image_url(mut self, url: Option<String>) -> Self {
        self.product.image_url = url;
        self
    }

    pub fn with_additional_images(mut self, images: Vec<String>) -> Self {
        self.product.additional_images = images;
        self
    }

    pub fn with_specifications(mut self, specifications: BTreeMap<String, String>) -> Self {
        self.product.specifications = specifications;
        self
    }

    pub fn with_is_active(mut self, active: bool) -> Self {
        self.product.is_active = active;
        self
    }

    pub fn with_is_featured(mut self, featured: bool) -> Self {
        self.product.is_featured = featured;
        self
    }

    pub fn with_is_virtual(mut self, is_virtual: bool) -> Self {
        self.product.is_virtual = is_virtual;
        self
    }

    pub fn with_requires_shipping(mut self, requires: bool) -> Self {
        self.product.requires_shipping = requires;
        self
    }

    pub fn with_sort_order(mut self, order: i32) -> Self {
        self.product.sort_order = order;
        self
    }

    pub fn with_available_from(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.product.available_from = from;
        self
    }

    pub fn with_available_to(mut self, to: Option<DateTime<Utc>>) -> Self {
        self.product.available_to = to;
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.product.metadata = metadata;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.product.notes = notes;
        self
    }

    pub fn build(self) -> DomainResult<Product> {
        check_cross_fields(&self.product)?;
        Ok(self.product)
    }
}

fn check_tax_rate(rate: Decimal) -> DomainResult<Decimal> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(DomainError::invalid("Tax rate must be between 0 and 100"));
    }
    Ok(rate)
}

fn check_cross_fields(p: &Product) -> DomainResult<()> {
    if let Some(max) = p.max_stock {
        if max < p.min_stock {
            return Err(DomainError::invalid(
                "Maximum stock cannot be less than minimum stock",
            ));
        }
    }
    if let (Some(from), Some(to)) = (p.available_from, p.available_to) {
        if to < from {
            return Err(DomainError::invalid(
                "Availability end cannot be before its start",
            ));
        }
    }
    Ok(())
}

/// Stored form of a [`Product`]. Loading one applies the same checks as the
/// builder; the value objects validate themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub sku: Sku,
    pub name: ProductName,
    pub slug: ProductSlug,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub unit_id: Option<UnitId>,
    pub cost_price: Price,
    pub selling_price: Price,
    pub wholesale_price: Option<Price>,
    pub discount_price: Option<Price>,
    pub tax_rate: Decimal,
    pub current_stock: StockQuantity,
    pub min_stock: StockQuantity,
    pub max_stock: Option<StockQuantity>,
    pub track_stock: bool,
    pub allow_backorders: bool,
    pub weight: Option<Weight>,
    pub dimensions: Option<Dimensions>,
    pub barcode: Option<String>,
    pub model: Option<String>,
    pub manufacturer_part_number: Option<String>,
    pub image_url: Option<String>,
    pub additional_images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_virtual: bool,
    pub requires_shipping: bool,
    pub sort_order: i32,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(r: ProductRecord) -> DomainResult<Self> {
        ensure_optional_max_len(r.short_description.as_deref(), SHORT_DESCRIPTION_MAX, "Short description")?;
        ensure_optional_max_len(r.barcode.as_deref(), CODE_MAX, "Barcode")?;
        ensure_optional_max_len(r.model.as_deref(), CODE_MAX, "Model")?;
        ensure_optional_max_len(
            r.manufacturer_part_number.as_deref(),
            CODE_MAX,
            "Manufacturer part number",
        )?;
        let product = Product {
            id: r.id,
            sku: r.sku,
            name: r.name,
            slug: r.slug,
            description: r.description.filter(|d| !d.trim().is_empty()),
            short_description: r.short_description,
            category_id: r.category_id.filter(|id| !id.is_null()),
            brand_id: r.brand_id.filter(|id| !id.is_null()),
            unit_id: r.unit_id.filter(|id| !id.is_null()),
            cost_price: r.cost_price,
            selling_price: r.selling_price,
            wholesale_price: r.wholesale_price,
            discount_price: r.discount_price,
            tax_rate: check_tax_rate(r.tax_rate)?,
            current_stock: r.current_stock,
            min_stock: r.min_stock,
            max_stock: r.max_stock,
            track_stock: r.track_stock,
            allow_backorders: r.allow_backorders,
            weight: r.weight,
            dimensions: r.dimensions,
            barcode: r.barcode,
            model: r.model,
            manufacturer_part_number: r.manufacturer_part_number,
            image_url: r.image_url,
            additional_images: r.additional_images,
            specifications: r.specifications,
            is_active: r.is_active,
            is_featured: r.is_featured,
            is_virtual: r.is_virtual,
            requires_shipping: r.requires_shipping,
            sort_order: r.sort_order,
            available_from: r.available_from,
            available_to: r.available_to,
            metadata: r.metadata,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        };
        check_cross_fields(&product)?;
        Ok(product)
    }
}
