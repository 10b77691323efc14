//! Storage ports for the catalog aggregates.
//!
//! `save` inserts entities without an id (returning the stored copy with its
//! id assigned) and replaces entities that have one. Uniqueness rules and
//! the denormalized counters are the implementor's responsibility.

use comercia_core::{BrandId, CategoryId, DomainResult, Email, ProductId, UnitId};

use crate::brand::Brand;
use crate::category::Category;
use crate::filter::ProductFilter;
use crate::hierarchy::CategoryNode;
use crate::price::Price;
use crate::product::Product;
use crate::sku::Sku;
use crate::unit::{Unit, UnitType};

pub trait ProductRepository: Send + Sync {
    /// Rejects a SKU already used by another product.
    fn save(&self, product: Product) -> DomainResult<Product>;

    fn find_by_id(&self, id: ProductId) -> DomainResult<Option<Product>>;

    fn find_by_sku(&self, sku: &Sku) -> DomainResult<Option<Product>>;

    fn delete(&self, id: ProductId) -> DomainResult<bool>;

    /// Every stored product, ordered by name.
    fn find_all(&self) -> DomainResult<Vec<Product>>;

    fn find_active(&self) -> DomainResult<Vec<Product>>;

    fn find_by_category(&self, id: CategoryId) -> DomainResult<Vec<Product>>;

    fn find_by_brand(&self, id: BrandId) -> DomainResult<Vec<Product>>;

    fn search(&self, filter: &ProductFilter) -> DomainResult<Vec<Product>>;

    /// Active, tracked products with `0 < stock <= threshold`.
    fn find_low_stock(&self, threshold: u64) -> DomainResult<Vec<Product>>;

    /// Active, tracked products with no stock.
    fn find_out_of_stock(&self) -> DomainResult<Vec<Product>>;

    fn exists_with_sku(&self, sku: &Sku, exclude: Option<ProductId>) -> DomainResult<bool>;

    /// Σ cost × current stock over active products.
    fn total_inventory_value(&self) -> DomainResult<Price>;
}

impl<R> ProductRepository for std::sync::Arc<R>
where
    R: ProductRepository + ?Sized,
{
    fn save(&self, product: Product) -> DomainResult<Product> {
        (**self).save(product)
    }

    fn find_by_id(&self, id: ProductId) -> DomainResult<Option<Product>> {
        (**self).find_by_id(id)
    }

    fn find_by_sku(&self, sku: &Sku) -> DomainResult<Option<Product>> {
        (**self).find_by_sku(sku)
    }

    fn delete(&self, id: ProductId) -> DomainResult<bool> {
        (**self).delete(id)
    }

    fn find_all(&self) -> DomainResult<Vec<Product>> {
        (**self).find_all()
    }

    fn find_active(&self) -> DomainResult<Vec<Product>> {
        (**self).find_active()
    }

    fn find_by_category(&self, id: CategoryId) -> DomainResult<Vec<Product>> {
        (**self).find_by_category(id)
    }

    fn find_by_brand(&self, id: BrandId) -> DomainResult<Vec<Product>> {
        (**self).find_by_brand(id)
    }

    fn search(&self, filter: &ProductFilter) -> DomainResult<Vec<Product>> {
        (**self).search(filter)
    }

    fn find_low_stock(&self, threshold: u64) -> DomainResult<Vec<Product>> {
        (**self).find_low_stock(threshold)
    }

    fn find_out_of_stock(&self) -> DomainResult<Vec<Product>> {
        (**self).find_out_of_stock()
    }

    fn exists_with_sku(&self, sku: &Sku, exclude: Option<ProductId>) -> DomainResult<bool> {
        (**self).exists_with_sku(sku, exclude)
    }

    fn total_inventory_value(&self) -> DomainResult<Price> {
        (**self).total_inventory_value()
    }
}

/// Category tree storage. Implementors keep `path`/`level` in sync with
/// `parent_id` for every node, atomically.
pub trait CategoryRepository: Send + Sync {
    /// Inserts (computing path and level once the id is known) or replaces.
    /// A replaced category whose parent changed is moved with its subtree.
    fn save(&self, category: Category) -> DomainResult<Category>;

    fn find_by_id(&self, id: CategoryId) -> DomainResult<Option<Category>>;

    fn find_all(&self) -> DomainResult<Vec<Category>>;

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Category>>;

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Category>>;

    /// Direct children of `parent`; roots when `None`.
    fn children(&self, parent: Option<CategoryId>) -> DomainResult<Vec<Category>>;

    fn roots(&self) -> DomainResult<Vec<Category>> {
        self.children(None)
    }

    /// All nodes below `id`, by path prefix.
    fn descendants(&self, id: CategoryId) -> DomainResult<Vec<Category>>;

    /// Nodes above `id`, root first.
    fn ancestors(&self, id: CategoryId) -> DomainResult<Vec<Category>>;

    /// The subtree rooted at `root`, or the whole forest.
    fn hierarchy(&self, root: Option<CategoryId>) -> DomainResult<Vec<CategoryNode>>;

    fn move_category(&self, id: CategoryId, new_parent: Option<CategoryId>) -> DomainResult<Category>;

    /// Fails while the category owns products or children.
    fn delete(&self, id: CategoryId) -> DomainResult<()>;

    fn count_products(&self, id: CategoryId) -> DomainResult<u64>;

    /// Products in the category and all of its descendants.
    fn count_products_in_hierarchy(&self, id: CategoryId) -> DomainResult<u64>;

    fn recompute_product_count(&self, id: CategoryId) -> DomainResult<Category>;

    fn exists_with_name(&self, name: &str, exclude: Option<CategoryId>) -> DomainResult<bool>;
}

pub trait BrandRepository: Send + Sync {
    /// Rejects a name already used by another brand (case-insensitive).
    fn save(&self, brand: Brand) -> DomainResult<Brand>;

    fn find_by_id(&self, id: BrandId) -> DomainResult<Option<Brand>>;

    fn find_all(&self) -> DomainResult<Vec<Brand>>;

    fn find_active(&self) -> DomainResult<Vec<Brand>>;

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Brand>>;

    fn find_by_email(&self, email: &Email) -> DomainResult<Option<Brand>>;

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Brand>>;

    /// Fails while the brand owns products.
    fn delete(&self, id: BrandId) -> DomainResult<()>;

    fn count_products(&self, id: BrandId) -> DomainResult<u64>;

    fn exists_with_name(&self, name: &str, exclude: Option<BrandId>) -> DomainResult<bool>;

    fn exists_with_email(&self, email: &Email, exclude: Option<BrandId>) -> DomainResult<bool>;

    /// Brands with the most products first.
    fn top_brands(&self, limit: usize) -> DomainResult<Vec<Brand>>;

    fn recompute_product_count(&self, id: BrandId) -> DomainResult<Brand>;
}

pub trait UnitRepository: Send + Sync {
    /// Rejects duplicate names/abbreviations and a second base unit per type.
    fn save(&self, unit: Unit) -> DomainResult<Unit>;

    fn find_by_id(&self, id: UnitId) -> DomainResult<Option<Unit>>;

    fn find_all(&self) -> DomainResult<Vec<Unit>>;

    fn find_active(&self) -> DomainResult<Vec<Unit>>;

    fn find_by_type(&self, unit_type: UnitType) -> DomainResult<Vec<Unit>>;

    fn find_base_units(&self) -> DomainResult<Vec<Unit>>;

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Unit>>;

    fn find_by_abbreviation(&self, abbreviation: &str) -> DomainResult<Option<Unit>>;

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Unit>>;

    /// Fails while products use the unit.
    fn delete(&self, id: UnitId) -> DomainResult<()>;

    fn exists_with_name(&self, name: &str, exclude: Option<UnitId>) -> DomainResult<bool>;

    fn exists_with_abbreviation(&self, abbreviation: &str, exclude: Option<UnitId>) -> DomainResult<bool>;

    fn base_unit_for_type(&self, unit_type: UnitType) -> DomainResult<Option<Unit>>;

    /// Other active units of the same type.
    fn conversion_options(&self, id: UnitId) -> DomainResult<Vec<Unit>>;

    /// `value` expressed in `source` converted to `target`.
    fn convert(&self, source: UnitId, target: UnitId, value: f64) -> DomainResult<f64>;

    fn recompute_usage_count(&self, id: UnitId) -> DomainResult<Unit>;
}
