//! Product commands and queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use comercia_core::{BrandId, CategoryId, DomainError, DomainResult, Entity, ProductId, UnitId};

use crate::builder::ProductBuilder;
use crate::dimensions::{Dimensions, DimensionsRecord};
use crate::filter::ProductFilter;
use crate::price::Price;
use crate::product::Product;
use crate::repository::ProductRepository;
use crate::sku::Sku;
use crate::weight::{Weight, WeightRecord};

/// Stock at or below this counts as low in [`ProductStats`].
pub const LOW_STOCK_THRESHOLD: u64 = 10;

fn default_true() -> bool {
    true
}

/// Descriptive and pricing fields shared by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    #[serde(default)]
    pub wholesale_price: Option<Decimal>,
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub max_stock: Option<i64>,
    #[serde(default)]
    pub weight: Option<WeightRecord>,
    #[serde(default)]
    pub dimensions: Option<DimensionsRecord>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub available_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProduct {
    #[serde(flatten)]
    pub details: ProductDetails,
    #[serde(default)]
    pub current_stock: i64,
    #[serde(default = "default_true")]
    pub track_stock: bool,
    #[serde(default)]
    pub allow_backorders: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Replaces the details of a stored product. Stock, stock flags, activation
/// and the creation timestamp are carried over from the stored copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: ProductDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total: usize,
    pub active: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub total_inventory_value: Price,
}

pub struct ProductService<R> {
    repository: R,
}

impl<R> ProductService<R>
where
    R: ProductRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn create(&self, command: CreateProduct) -> DomainResult<Product> {
        let sku = Sku::new(&command.details.sku)?;
        self.ensure_unique_sku(&sku, None)?;
        let product = builder_for(&command.details)?
            .with_current_stock(command.current_stock)?
            .with_track_stock(command.track_stock)
            .with_allow_backorders(command.allow_backorders)
            .with_is_active(command.is_active)
            .build()?;
        let saved = self.repository.save(product)?;
        tracing::info!(product_id = %saved.id(), sku = %saved.sku(), "product created");
        Ok(saved)
    }

    pub fn update(&self, command: UpdateProduct) -> DomainResult<Product> {
        let existing = self.find_by_id(command.id)?;
        let sku = Sku::new(&command.details.sku)?;
        self.ensure_unique_sku(&sku, Some(command.id))?;
        let product = builder_for(&command.details)?
            .with_id(command.id)
            .with_created_at(existing.created_at())
            .with_current_stock(existing.current_stock().value() as i64)?
            .with_track_stock(existing.tracks_stock())
            .with_allow_backorders(existing.allows_backorders())
            .with_is_active(existing.is_active())
            .build()?;
        let saved = self.repository.save(product)?;
        tracing::info!(product_id = %command.id, "product updated");
        Ok(saved)
    }

    pub fn find_by_id(&self, id: ProductId) -> DomainResult<Product> {
        self.repository
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found(format!("Product with ID {id} not found")))
    }

    pub fn list(&self, filter: &ProductFilter) -> DomainResult<Vec<Product>> {
        self.repository.search(filter)
    }

    pub fn stats(&self) -> DomainResult<ProductStats> {
        Ok(ProductStats {
            total: self.repository.find_all()?.len(),
            active: self.repository.find_active()?.len(),
            low_stock: self.repository.find_low_stock(LOW_STOCK_THRESHOLD)?.len(),
            out_of_stock: self.repository.find_out_of_stock()?.len(),
            total_inventory_value: self.repository.total_inventory_value()?,
        })
    }

    fn ensure_unique_sku(&self, sku: &Sku, exclude: Option<ProductId>) -> DomainResult<()> {
        if self.repository.exists_with_sku(sku, exclude)? {
            tracing::warn!(%sku, "rejected duplicate sku");
            return Err(DomainError::invalid(format!(
                "A product with SKU {sku} already exists"
            )));
        }
        Ok(())
    }
}

fn optional_price(amount: Option<Decimal>) -> DomainResult<Option<Price>> {
    amount.map(Price::new).transpose()
}

fn builder_for(details: &ProductDetails) -> DomainResult<ProductBuilder> {
    let builder = ProductBuilder::new(
        &details.name,
        &details.sku,
        Price::new(details.selling_price)?,
        Price::new(details.cost_price)?,
    )?
    .with_description(details.description.clone())
    .with_short_description(details.short_description.clone())?
    .with_category_id(details.category_id)
    .with_brand_id(details.brand_id)
    .with_unit_id(details.unit_id)
    .with_wholesale_price(optional_price(details.wholesale_price)?)
    .with_discount_price(optional_price(details.discount_price)?)
    .with_tax_rate(details.tax_rate)?
    .with_min_stock(details.min_stock)?
    .with_max_stock(details.max_stock)?
    .with_weight(details.weight.map(Weight::try_from).transpose()?)
    .with_dimensions(details.dimensions.map(Dimensions::try_from).transpose()?)
    .with_barcode(details.barcode.clone())?
    .with_model(details.model.clone())?
    .with_image_url(details.image_url.clone())
    .with_is_featured(details.is_featured)
    .with_available_from(details.available_from)
    .with_available_to(details.available_to)
    .with_notes(details.notes.clone());
    Ok(builder)
}
