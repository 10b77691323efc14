use std::sync::Arc;

use comercia_catalog::{Price, Product, ProductFilter, ProductRepository, Sku};
use comercia_core::{BrandId, CategoryId, DomainError, DomainResult, Entity, ProductId};

use crate::database::{InMemoryDatabase, Tables};
use crate::stores::counters;

#[derive(Debug, Clone)]
pub struct ProductStore {
    db: Arc<InMemoryDatabase>,
}

impl ProductStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }

    fn select(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> =
            self.db.read(|t| t.products.rows().filter(|p| keep(p)).cloned().collect());
        products.sort_by(|a, b| {
            a.name()
                .value()
                .to_lowercase()
                .cmp(&b.name().value().to_lowercase())
        });
        products
    }
}

fn sku_taken(tables: &Tables, sku: &Sku, exclude: Option<ProductId>) -> bool {
    tables
        .products
        .rows()
        .any(|p| p.sku() == sku && Some(p.id()) != exclude)
}

fn tracked_and_active(product: &Product) -> bool {
    product.is_active() && !product.is_deleted() && product.tracks_stock()
}

impl ProductRepository for ProductStore {
    fn save(&self, product: Product) -> DomainResult<Product> {
        self.db.transaction(|t| {
            let exclude = Some(product.id()).filter(|id| !id.is_null());
            if sku_taken(t, product.sku(), exclude) {
                tracing::warn!(sku = %product.sku(), "rejected duplicate sku");
                return Err(DomainError::invalid(format!(
                    "A product with SKU {} already exists",
                    product.sku()
                )));
            }
            let previous = t.products.get(product.id()).cloned();
            let saved = t.products.upsert(product)?;
            counters::refresh_product_references(t, previous.iter().chain([&saved]));
            tracing::info!(product_id = %saved.id(), sku = %saved.sku(), "product saved");
            Ok(saved)
        })
    }

    fn find_by_id(&self, id: ProductId) -> DomainResult<Option<Product>> {
        let found = self.db.read(|t| t.products.get(id).cloned());
        if found.is_none() {
            tracing::debug!(product_id = %id, "product not found");
        }
        Ok(found)
    }

    fn find_by_sku(&self, sku: &Sku) -> DomainResult<Option<Product>> {
        Ok(self
            .db
            .read(|t| t.products.rows().find(|p| p.sku() == sku).cloned()))
    }

    fn delete(&self, id: ProductId) -> DomainResult<bool> {
        self.db.transaction(|t| {
            let Some(removed) = t.products.remove(id) else {
                return Ok(false);
            };
            counters::refresh_product_references(t, [&removed]);
            tracing::info!(product_id = %id, "product deleted");
            Ok(true)
        })
    }

    fn find_all(&self) -> DomainResult<Vec<Product>> {
        Ok(self.select(|_| true))
    }

    fn find_active(&self) -> DomainResult<Vec<Product>> {
        Ok(self.select(|p| p.is_active() && !p.is_deleted()))
    }

    fn find_by_category(&self, id: CategoryId) -> DomainResult<Vec<Product>> {
        Ok(self.select(|p| p.category_id() == Some(id)))
    }

    fn find_by_brand(&self, id: BrandId) -> DomainResult<Vec<Product>> {
        Ok(self.select(|p| p.brand_id() == Some(id)))
    }

    fn search(&self, filter: &ProductFilter) -> DomainResult<Vec<Product>> {
        Ok(filter.apply(self.db.read(|t| t.products.rows().cloned().collect::<Vec<_>>())))
    }

    fn find_low_stock(&self, threshold: u64) -> DomainResult<Vec<Product>> {
        Ok(self.select(|p| {
            tracked_and_active(p) && (1..=threshold).contains(&p.current_stock().value())
        }))
    }

    fn find_out_of_stock(&self) -> DomainResult<Vec<Product>> {
        Ok(self.select(|p| tracked_and_active(p) && p.current_stock().is_zero()))
    }

    fn exists_with_sku(&self, sku: &Sku, exclude: Option<ProductId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| sku_taken(t, sku, exclude)))
    }

    fn total_inventory_value(&self) -> DomainResult<Price> {
        self.db.read(|t| {
            t.products
                .rows()
                .filter(|p| p.is_active() && !p.is_deleted())
                .try_fold(Price::zero(), |acc, p| acc.add(&p.inventory_value()?))
        })
    }
}
