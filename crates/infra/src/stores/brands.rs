use std::sync::Arc;

use comercia_catalog::{Brand, BrandRepository};
use comercia_core::text::contains_ignore_case;
use comercia_core::{BrandId, DomainError, DomainResult, Email, Entity};

use crate::database::{InMemoryDatabase, Tables};
use crate::stores::{counters, same_name};

#[derive(Debug, Clone)]
pub struct BrandStore {
    db: Arc<InMemoryDatabase>,
}

impl BrandStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }

    fn select(&self, keep: impl Fn(&Brand) -> bool) -> Vec<Brand> {
        let mut brands: Vec<Brand> =
            self.db.read(|t| t.brands.rows().filter(|b| keep(b)).cloned().collect());
        brands.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        brands
    }
}

fn name_taken(tables: &Tables, name: &str, exclude: Option<BrandId>) -> bool {
    tables
        .brands
        .rows()
        .any(|b| same_name(b.name(), name) && Some(b.id()) != exclude)
}

fn email_taken(tables: &Tables, email: &Email, exclude: Option<BrandId>) -> bool {
    tables
        .brands
        .rows()
        .any(|b| b.contact_email() == Some(email) && Some(b.id()) != exclude)
}

impl BrandRepository for BrandStore {
    fn save(&self, brand: Brand) -> DomainResult<Brand> {
        self.db.transaction(|t| {
            let exclude = Some(brand.id()).filter(|id| !id.is_null());
            if name_taken(t, brand.name(), exclude) {
                tracing::warn!(name = brand.name(), "rejected duplicate brand name");
                return Err(DomainError::invalid(format!(
                    "A brand named {} already exists",
                    brand.name()
                )));
            }
            let mut brand = brand;
            if !brand.id().is_null() {
                brand.set_product_count(counters::products_of_brand(t, brand.id()));
            }
            let saved = t.brands.upsert(brand)?;
            tracing::info!(brand_id = %saved.id(), "brand saved");
            Ok(saved)
        })
    }

    fn find_by_id(&self, id: BrandId) -> DomainResult<Option<Brand>> {
        Ok(self.db.read(|t| t.brands.get(id).cloned()))
    }

    fn find_all(&self) -> DomainResult<Vec<Brand>> {
        Ok(self.select(|_| true))
    }

    fn find_active(&self) -> DomainResult<Vec<Brand>> {
        Ok(self.select(Brand::is_active))
    }

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Brand>> {
        Ok(self
            .db
            .read(|t| t.brands.rows().find(|b| same_name(b.name(), name)).cloned()))
    }

    fn find_by_email(&self, email: &Email) -> DomainResult<Option<Brand>> {
        Ok(self.db.read(|t| {
            t.brands
                .rows()
                .find(|b| b.contact_email() == Some(email))
                .cloned()
        }))
    }

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Brand>> {
        Ok(self.select(|b| contains_ignore_case(b.name(), term.trim())))
    }

    fn delete(&self, id: BrandId) -> DomainResult<()> {
        self.db.transaction(|t| {
            t.brands.require(id)?;
            let owned = counters::products_of_brand(t, id);
            if owned > 0 {
                tracing::warn!(brand_id = %id, products = owned, "delete rejected: brand has products");
                return Err(DomainError::invalid(
                    "Cannot delete a brand that has products",
                ));
            }
            t.brands.remove(id);
            tracing::info!(brand_id = %id, "brand deleted");
            Ok(())
        })
    }

    fn count_products(&self, id: BrandId) -> DomainResult<u64> {
        self.db.read(|t| {
            t.brands.require(id)?;
            Ok(counters::products_of_brand(t, id))
        })
    }

    fn exists_with_name(&self, name: &str, exclude: Option<BrandId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| name_taken(t, name, exclude)))
    }

    fn exists_with_email(&self, email: &Email, exclude: Option<BrandId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| email_taken(t, email, exclude)))
    }

    fn top_brands(&self, limit: usize) -> DomainResult<Vec<Brand>> {
        let mut brands = self.select(Brand::is_active);
        brands.sort_by(|a, b| b.product_count().cmp(&a.product_count()));
        brands.truncate(limit);
        Ok(brands)
    }

    fn recompute_product_count(&self, id: BrandId) -> DomainResult<Brand> {
        self.db.transaction(|t| {
            t.brands.require(id)?;
            counters::refresh_brand(t, id);
            let brand = t.brands.require(id)?.clone();
            tracing::info!(brand_id = %id, product_count = brand.product_count(), "brand count recomputed");
            Ok(brand)
        })
    }
}
