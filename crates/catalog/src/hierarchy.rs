//! Materialized-path maintenance for the category tree.
//!
//! Everything here is pure: callers load the affected categories, call these
//! functions, and write the results back in one atomic step. Nothing is
//! mutated unless the whole operation validates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use comercia_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::category::{Category, MAX_LEVEL, PATH_MAX};

/// Path and level for `id` placed under `parent` (root when `None`).
pub fn placement(id: u64, parent: Option<&Category>) -> DomainResult<(String, u8)> {
    let (path, level) = match parent {
        None => (id.to_string(), 0),
        Some(parent) => {
            if !parent.is_placed() {
                return Err(DomainError::invalid(format!(
                    "Parent category {} has no path yet",
                    parent.id()
                )));
            }
            (format!("{}/{id}", parent.path()), parent.level() + 1)
        }
    };
    if level > MAX_LEVEL {
        return Err(DomainError::invalid(format!(
            "Category level cannot exceed {MAX_LEVEL}"
        )));
    }
    if path.chars().count() > PATH_MAX {
        return Err(DomainError::invalid(format!(
            "Category path cannot exceed {PATH_MAX} characters"
        )));
    }
    Ok((path, level))
}

/// Fills in path and level of a category that just received its id.
pub fn place(category: &mut Category, parent: Option<&Category>) -> DomainResult<()> {
    let id = category.id().require()?;
    if category.parent_id() != parent.map(Entity::id) {
        return Err(DomainError::invalid(
            "Parent does not match the category's parent id",
        ));
    }
    let (path, level) = placement(id, parent)?;
    category.set_placement(parent.map(Entity::id), path, level)
}

/// Copies the stored placement onto an edited copy of the same category, so
/// edits to other fields never overwrite `parent_id`, `path` or `level`.
pub fn carry_placement(edited: &mut Category, stored: &Category) -> DomainResult<()> {
    if edited.id() != stored.id() {
        return Err(DomainError::invalid(
            "Cannot carry placement between different categories",
        ));
    }
    edited.set_placement(stored.parent_id(), stored.path().to_string(), stored.level())
}

/// Rejects moves that would create a cycle.
pub fn ensure_movable(category: &Category, new_parent: Option<&Category>) -> DomainResult<()> {
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if parent.id() == category.id() {
        return Err(DomainError::invalid("A category cannot be its own parent"));
    }
    if parent.path().starts_with(&category.descendant_prefix()) {
        return Err(DomainError::invalid(
            "Cannot move a category under one of its descendants",
        ));
    }
    Ok(())
}

/// Re-parents `root` under `new_parent` and rewrites the path and level of
/// every node in `descendants` (all nodes whose path starts with the old
/// `root.descendant_prefix()`; other entries are rejected).
///
/// All new placements are computed and validated before anything changes.
pub fn rebuild_subtree(
    root: &mut Category,
    new_parent: Option<&Category>,
    descendants: &mut [Category],
) -> DomainResult<()> {
    ensure_movable(root, new_parent)?;
    let root_id = root.id().require()?;
    let old_prefix = root.descendant_prefix();
    let old_level = root.level();
    let (new_root_path, new_root_level) = placement(root_id, new_parent)?;

    let mut planned = Vec::with_capacity(descendants.len());
    for node in descendants.iter() {
        let Some(rest) = node.path().strip_prefix(&old_prefix) else {
            return Err(DomainError::invalid(format!(
                "Category {} is not a descendant of category {}",
                node.id(),
                root.id()
            )));
        };
        let path = format!("{new_root_path}/{rest}");
        let level = u16::from(new_root_level) + u16::from(node.level().saturating_sub(old_level));
        if level > u16::from(MAX_LEVEL) {
            return Err(DomainError::invalid(format!(
                "Moving this category would push descendants past level {MAX_LEVEL}"
            )));
        }
        if path.chars().count() > PATH_MAX {
            return Err(DomainError::invalid(format!(
                "Category path cannot exceed {PATH_MAX} characters"
            )));
        }
        planned.push((path, level as u8));
    }

    root.set_placement(new_parent.map(Entity::id), new_root_path, new_root_level)?;
    for (node, (path, level)) in descendants.iter_mut().zip(planned) {
        let parent_id = node.parent_id();
        node.set_placement(parent_id, path, level)?;
    }
    Ok(())
}

/// A category with its children, for tree views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of categories in this subtree, including the node itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::size).sum::<usize>()
    }
}

/// Arranges a flat list into trees, roots and siblings ordered by name.
/// Nodes whose parent is missing from the list are treated as roots.
pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let present: Vec<CategoryId> = categories.iter().map(Entity::id).collect();
    let mut by_parent: BTreeMap<Option<CategoryId>, Vec<Category>> = BTreeMap::new();
    for category in categories {
        let parent = category.parent_id().filter(|p| present.contains(p));
        by_parent.entry(parent).or_default().push(category);
    }
    attach(None, &mut by_parent)
}

fn attach(
    parent: Option<CategoryId>,
    by_parent: &mut BTreeMap<Option<CategoryId>, Vec<Category>>,
) -> Vec<CategoryNode> {
    let mut level = by_parent.remove(&parent).unwrap_or_default();
    level.sort_by(|a, b| a.name().cmp(b.name()));
    level
        .into_iter()
        .map(|category| {
            let children = attach(Some(category.id()), by_parent);
            CategoryNode { category, children }
        })
        .collect()
}
