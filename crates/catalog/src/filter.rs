//! Product listing criteria (no pagination).

use serde::{Deserialize, Serialize};

use comercia_core::text::contains_ignore_case;
use comercia_core::{BrandId, CategoryId};

use crate::price::Price;
use crate::product::Product;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    #[default]
    Name,
    Price,
    Sku,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Active, non-deleted products matching every criterion that is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    /// Case-insensitive match on name, description or SKU.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort_by: ProductSortField,
    pub direction: SortDirection,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active() || product.is_deleted() {
            return false;
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let hit = product.name().contains(term)
                || product.description().is_some_and(|d| contains_ignore_case(d, term))
                || contains_ignore_case(product.sku().value(), term);
            if !hit {
                return false;
            }
        }
        if self.category_id.is_some() && product.category_id() != self.category_id {
            return false;
        }
        if self.brand_id.is_some() && product.brand_id() != self.brand_id {
            return false;
        }
        if self.min_price.is_some_and(|min| product.selling_price() < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.selling_price() > max) {
            return false;
        }
        true
    }

    /// Filters and sorts; ties keep the input order.
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        let mut hits: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        hits.sort_by(|a, b| {
            let ordering = match self.sort_by {
                ProductSortField::Name => a
                    .name()
                    .value()
                    .to_lowercase()
                    .cmp(&b.name().value().to_lowercase()),
                ProductSortField::Price => a.selling_price().cmp(&b.selling_price()),
                ProductSortField::Sku => a.sku().cmp(b.sku()),
                ProductSortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            };
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProductBuilder;

    fn product(name: &str, sku: &str, price: &str, category: u64) -> Product {
        ProductBuilder::new(name, sku, price.parse().unwrap(), "1".parse().unwrap())
            .unwrap()
            .with_category_id(Some(CategoryId::from(category)))
            .with_description(Some(format!("Descripción de {name}")))
            .build()
            .unwrap()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Teclado Mecánico", "KB-01", "1200", 1),
            product("Mouse Inalámbrico", "MS-02", "350", 1),
            product("Monitor 27", "MN-03", "5400", 2),
        ]
    }

    #[test]
    fn default_filter_sorts_by_name() {
        let names: Vec<_> = ProductFilter::default()
            .apply(catalog())
            .iter()
            .map(|p| p.name().value().to_string())
            .collect();
        assert_eq!(names, ["Monitor 27", "Mouse Inalámbrico", "Teclado Mecánico"]);
    }

    #[test]
    fn search_covers_name_description_and_sku() {
        let by = |term: &str| ProductFilter {
            search: Some(term.to_string()),
            ..Default::default()
        };
        assert_eq!(by("teclado").apply(catalog()).len(), 1);
        assert_eq!(by("ms-02").apply(catalog()).len(), 1);
        assert_eq!(by("descripción").apply(catalog()).len(), 3);
        assert_eq!(by("   ").apply(catalog()).len(), 3);
    }

    #[test]
    fn category_price_range_and_direction() {
        let filter = ProductFilter {
            category_id: Some(CategoryId::from(1)),
            min_price: Some("300".parse().unwrap()),
            max_price: Some("1200".parse().unwrap()),
            sort_by: ProductSortField::Price,
            direction: SortDirection::Desc,
            ..Default::default()
        };
        let skus: Vec<_> = filter
            .apply(catalog())
            .iter()
            .map(|p| p.sku().value().to_string())
            .collect();
        assert_eq!(skus, ["KB-01", "MS-02"]);
    }

    #[test]
    fn inactive_and_deleted_products_are_hidden() {
        let mut items = catalog();
        items[0].deactivate();
        items[1].mark_deleted();
        assert_eq!(ProductFilter::default().apply(items).len(), 1);
    }
}
