use std::sync::Arc;

use comercia_catalog::hierarchy::{self, CategoryNode};
use comercia_catalog::{Category, CategoryRepository};
use comercia_core::text::contains_ignore_case;
use comercia_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::database::{InMemoryDatabase, Tables};
use crate::stores::{counters, same_name};

/// Category tree over materialized paths.
///
/// Every write that changes a parent rewrites `path`/`level` of the moved
/// node and all of its descendants inside one transaction.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    db: Arc<InMemoryDatabase>,
}

fn by_name(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
    categories
}

fn subtree_of(tables: &Tables, root: &Category) -> Vec<Category> {
    let prefix = root.descendant_prefix();
    tables
        .categories
        .rows()
        .filter(|c| c.path().starts_with(&prefix))
        .cloned()
        .collect()
}

fn parent_of(tables: &Tables, parent_id: Option<CategoryId>) -> DomainResult<Option<Category>> {
    parent_id
        .map(|id| {
            tables.categories.get(id).cloned().ok_or_else(|| {
                DomainError::not_found(format!("Parent category with ID {id} not found"))
            })
        })
        .transpose()
}

/// Re-parents an already placed `root` and rewrites its subtree.
fn relocate(
    tables: &mut Tables,
    mut root: Category,
    new_parent: Option<CategoryId>,
) -> DomainResult<Category> {
    let parent = parent_of(tables, new_parent)?;
    let mut descendants = subtree_of(tables, &root);
    if let Err(err) = hierarchy::rebuild_subtree(&mut root, parent.as_ref(), &mut descendants) {
        tracing::warn!(category_id = %root.id(), error = %err, "category move rejected");
        return Err(err);
    }
    let moved = descendants.len();
    tables.categories.put(root.clone());
    for node in descendants {
        tables.categories.put(node);
    }
    tracing::info!(
        category_id = %root.id(),
        path = root.path(),
        descendants = moved,
        "category moved"
    );
    Ok(root)
}

impl CategoryStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }

    fn insert(tables: &mut Tables, category: Category) -> DomainResult<Category> {
        let parent = parent_of(tables, category.parent_id())?;
        let mut saved = tables.categories.upsert(category)?;
        hierarchy::place(&mut saved, parent.as_ref())?;
        tables.categories.put(saved.clone());
        tracing::info!(category_id = %saved.id(), path = saved.path(), "category created");
        Ok(saved)
    }

    fn replace(tables: &mut Tables, mut edited: Category) -> DomainResult<Category> {
        let stored = tables.categories.require(edited.id())?.clone();
        let wanted_parent = edited.parent_id();
        hierarchy::carry_placement(&mut edited, &stored)?;
        edited.set_product_count(counters::products_in_category(tables, edited.id()));
        if wanted_parent == stored.parent_id() {
            tables.categories.put(edited.clone());
            Ok(edited)
        } else {
            relocate(tables, edited, wanted_parent)
        }
    }
}

impl CategoryRepository for CategoryStore {
    fn save(&self, category: Category) -> DomainResult<Category> {
        self.db.transaction(|t| {
            if category.id().is_null() {
                Self::insert(t, category)
            } else {
                Self::replace(t, category)
            }
        })
    }

    fn find_by_id(&self, id: CategoryId) -> DomainResult<Option<Category>> {
        Ok(self.db.read(|t| t.categories.get(id).cloned()))
    }

    fn find_all(&self) -> DomainResult<Vec<Category>> {
        Ok(by_name(self.db.read(|t| t.categories.rows().cloned().collect())))
    }

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Category>> {
        Ok(self.db.read(|t| {
            t.categories
                .rows()
                .find(|c| same_name(c.name(), name))
                .cloned()
        }))
    }

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Category>> {
        Ok(by_name(self.db.read(|t| {
            t.categories
                .rows()
                .filter(|c| contains_ignore_case(c.name(), term.trim()))
                .cloned()
                .collect()
        })))
    }

    fn children(&self, parent: Option<CategoryId>) -> DomainResult<Vec<Category>> {
        Ok(by_name(self.db.read(|t| {
            t.categories
                .rows()
                .filter(|c| c.parent_id() == parent)
                .cloned()
                .collect()
        })))
    }

    fn descendants(&self, id: CategoryId) -> DomainResult<Vec<Category>> {
        let mut nodes = self.db.read(|t| {
            let root = t.categories.require(id)?;
            Ok::<_, DomainError>(subtree_of(t, root))
        })?;
        nodes.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(nodes)
    }

    fn ancestors(&self, id: CategoryId) -> DomainResult<Vec<Category>> {
        self.db.read(|t| {
            let node = t.categories.require(id)?;
            Ok(node
                .ancestor_ids()
                .into_iter()
                .filter_map(|a| t.categories.get(CategoryId::from(a)).cloned())
                .collect())
        })
    }

    fn hierarchy(&self, root: Option<CategoryId>) -> DomainResult<Vec<CategoryNode>> {
        let nodes = self.db.read(|t| match root {
            None => Ok(t.categories.rows().cloned().collect()),
            Some(id) => {
                let root = t.categories.require(id)?;
                let mut nodes = subtree_of(t, root);
                nodes.push(root.clone());
                Ok::<_, DomainError>(nodes)
            }
        })?;
        Ok(hierarchy::build_tree(nodes))
    }

    fn move_category(&self, id: CategoryId, new_parent: Option<CategoryId>) -> DomainResult<Category> {
        self.db.transaction(|t| {
            let root = t.categories.require(id)?.clone();
            relocate(t, root, new_parent)
        })
    }

    fn delete(&self, id: CategoryId) -> DomainResult<()> {
        self.db.transaction(|t| {
            t.categories.require(id)?;
            if t.categories.rows().any(|c| c.parent_id() == Some(id)) {
                tracing::warn!(category_id = %id, "delete rejected: category has subcategories");
                return Err(DomainError::invalid(
                    "Cannot delete a category that has subcategories",
                ));
            }
            if counters::products_in_category(t, id) > 0 {
                tracing::warn!(category_id = %id, "delete rejected: category has products");
                return Err(DomainError::invalid(
                    "Cannot delete a category that has products",
                ));
            }
            t.categories.remove(id);
            tracing::info!(category_id = %id, "category deleted");
            Ok(())
        })
    }

    fn count_products(&self, id: CategoryId) -> DomainResult<u64> {
        self.db.read(|t| {
            t.categories.require(id)?;
            Ok(counters::products_in_category(t, id))
        })
    }

    fn count_products_in_hierarchy(&self, id: CategoryId) -> DomainResult<u64> {
        self.db.read(|t| {
            let root = t.categories.require(id)?;
            let total = subtree_of(t, root)
                .iter()
                .map(|c| counters::products_in_category(t, c.id()))
                .sum::<u64>();
            Ok(total + counters::products_in_category(t, id))
        })
    }

    fn recompute_product_count(&self, id: CategoryId) -> DomainResult<Category> {
        self.db.transaction(|t| {
            t.categories.require(id)?;
            counters::refresh_category(t, id);
            let category = t.categories.require(id)?.clone();
            tracing::info!(category_id = %id, product_count = category.product_count(), "category count recomputed");
            Ok(category)
        })
    }

    fn exists_with_name(&self, name: &str, exclude: Option<CategoryId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| {
            t.categories
                .rows()
                .any(|c| same_name(c.name(), name) && Some(c.id()) != exclude)
        }))
    }
}
