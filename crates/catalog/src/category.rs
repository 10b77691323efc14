use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use comercia_core::text::{ensure_max_len, ensure_present};
use comercia_core::{CategoryId, DomainError, DomainResult, Entity};

pub const MAX_LEVEL: u8 = 10;
pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const PATH_MAX: usize = 255;

/// Entity: node of the category tree.
///
/// `path` is the materialized chain of ids from the root down to this node
/// (`"1/4/9"`) and `level` its depth (root = 0). Both depend on data the
/// entity cannot see, so they are filled in by [`crate::hierarchy`] once the
/// node has an id; a freshly created category has an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CategoryRecord")]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
    parent_id: Option<CategoryId>,
    level: u8,
    path: String,
    is_active: bool,
    product_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    ensure_present(name, NAME_MAX, "Category name")?;
    Ok(name.to_string())
}

fn validate_description(description: &str) -> DomainResult<String> {
    let description = description.trim();
    ensure_max_len(description, DESCRIPTION_MAX, "Category description")?;
    Ok(description.to_string())
}

/// Stored form of a [`Category`]. Loading one goes through the same checks
/// as creation and placement.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub parent_id: Option<CategoryId>,
    pub level: u8,
    pub path: String,
    pub is_active: bool,
    pub product_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRecord> for Category {
    type Error = DomainError;

    fn try_from(record: CategoryRecord) -> DomainResult<Self> {
        if record.level > MAX_LEVEL {
            return Err(DomainError::invalid(format!(
                "Category level cannot exceed {MAX_LEVEL}"
            )));
        }
        ensure_max_len(&record.path, PATH_MAX, "Category path")?;
        let category = Self {
            id: record.id,
            name: validate_name(&record.name)?,
            description: validate_description(&record.description)?,
            parent_id: record.parent_id.filter(|id| !id.is_null()),
            level: record.level,
            path: record.path,
            is_active: record.is_active,
            product_count: record.product_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        if category.is_placed() {
            check_path(&category)?;
        }
        Ok(category)
    }
}

/// Path must list `level + 1` ids, end at the category itself and pass
/// through its parent.
fn check_path(category: &Category) -> DomainResult<()> {
    let ids = category.path_ids();
    let consistent = ids.len() == category.path.split('/').count()
        && ids.len() == usize::from(category.level) + 1
        && ids.last().copied() == category.id.value()
        && match category.parent_id {
            None => ids.len() == 1,
            Some(parent) => ids.len() >= 2 && Some(ids[ids.len() - 2]) == parent.value(),
        };
    if !consistent {
        return Err(DomainError::invalid(format!(
            "Category path '{}' does not match its id, parent and level",
            category.path
        )));
    }
    Ok(())
}

impl Category {
    /// New, unplaced category. The level is provisional until placement.
    pub fn create(name: &str, description: &str, parent_id: Option<CategoryId>) -> DomainResult<Self> {
        let parent_id = parent_id.filter(|id| !id.is_null());
        let now = Utc::now();
        Ok(Self {
            id: CategoryId::null(),
            name: validate_name(name)?,
            description: validate_description(description)?,
            parent_id,
            level: if parent_id.is_some() { 1 } else { 0 },
            path: String::new(),
            is_active: true,
            product_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn product_count(&self) -> u64 {
        self.product_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether path and level have been computed.
    pub fn is_placed(&self) -> bool {
        !self.path.is_empty()
    }

    /// Prefix shared by every descendant's path (`"1/4/"`).
    pub fn descendant_prefix(&self) -> String {
        format!("{}/", self.path)
    }

    /// Ids on the path, root first, this category last.
    pub fn path_ids(&self) -> Vec<u64> {
        self.path
            .split('/')
            .filter_map(|segment| segment.parse().ok())
            .collect()
    }

    /// Ids of the ancestors, root first.
    pub fn ancestor_ids(&self) -> Vec<u64> {
        let mut ids = self.path_ids();
        ids.pop();
        ids
    }

    pub fn is_descendant_of(&self, id: CategoryId) -> bool {
        id.value()
            .is_some_and(|id| self.ancestor_ids().contains(&id))
    }

    pub fn is_ancestor_of(&self, other: &Category) -> bool {
        other.is_descendant_of(self.id)
    }

    pub fn update_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn update_description(&mut self, description: &str) -> DomainResult<()> {
        self.description = validate_description(description)?;
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

    pub fn increment_product_count(&mut self) {
        self.product_count += 1;
        self.touch();
    }

    pub fn decrement_product_count(&mut self) {
        if self.product_count > 0 {
            self.product_count -= 1;
            self.touch();
        }
    }

    /// Replaces the cached count with a freshly computed one.
    pub fn set_product_count(&mut self, count: u64) {
        if self.product_count != count {
            self.product_count = count;
            self.touch();
        }
    }

    /// Applies a placement computed by [`crate::hierarchy`].
    pub(crate) fn set_placement(&mut self, parent_id: Option<CategoryId>, path: String, level: u8) -> DomainResult<()> {
        if level > MAX_LEVEL {
            return Err(DomainError::invalid(format!(
                "Category level cannot exceed {MAX_LEVEL}"
            )));
        }
        if path.is_empty() {
            return Err(DomainError::invalid("Category path cannot be empty"));
        }
        ensure_max_len(&path, PATH_MAX, "Category path")?;
        self.parent_id = parent_id;
        self.path = path;
        self.level = level;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }

    fn with_id(mut self, id: CategoryId) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_leaves_placement_to_the_store() {
        let root = Category::create("Electrónica", "", None).unwrap();
        assert!(root.is_root());
        assert_eq!(root.level(), 0);
        assert!(!root.is_placed());
        assert!(root.path_ids().is_empty());

        let child = Category::create(" Teléfonos ", "Móviles", Some(CategoryId::from(1))).unwrap();
        assert_eq!(child.name(), "Teléfonos");
        assert_eq!(child.level(), 1);
        assert!(!child.is_root());

        let orphan = Category::create("Sueltos", "", Some(CategoryId::null())).unwrap();
        assert!(orphan.is_root());
    }

    #[test]
    fn name_and_description_limits() {
        assert_eq!(
            Category::create(" ", "", None).unwrap_err(),
            DomainError::invalid("Category name cannot be empty")
        );
        assert!(Category::create(&"a".repeat(101), "", None).is_err());
        assert!(Category::create("Hogar", &"d".repeat(501), None).is_err());

        let mut c = Category::create("Hogar", "", None).unwrap();
        assert!(c.update_name("").is_err());
        assert_eq!(c.name(), "Hogar");
        c.update_description("Cocina y baño").unwrap();
        assert_eq!(c.description(), "Cocina y baño");
    }

    #[test]
    fn path_queries() {
        let mut c = Category::create("Android", "", Some(CategoryId::from(4)))
            .unwrap()
            .with_id(CategoryId::from(9));
        c.set_placement(Some(CategoryId::from(4)), "1/4/9".to_string(), 2)
            .unwrap();
        assert_eq!(c.path_ids(), vec![1, 4, 9]);
        assert_eq!(c.ancestor_ids(), vec![1, 4]);
        assert_eq!(c.descendant_prefix(), "1/4/9/");
        assert!(c.is_descendant_of(CategoryId::from(1)));
        assert!(!c.is_descendant_of(CategoryId::from(9)));
        assert!(!c.is_descendant_of(CategoryId::null()));

        let mut root = Category::create("Electrónica", "", None)
            .unwrap()
            .with_id(CategoryId::from(1));
        root.set_placement(None, "1".to_string(), 0).unwrap();
        assert!(root.is_ancestor_of(&c));
        assert!(!c.is_ancestor_of(&root));
    }

    #[test]
    fn placement_limits() {
        let mut c = Category::create("Profunda", "", None).unwrap();
        assert!(c.set_placement(None, "1".to_string(), 11).is_err());
        assert!(c.set_placement(None, String::new(), 0).is_err());
        assert!(c.set_placement(None, "9".repeat(256), 0).is_err());
        assert!(!c.is_placed());
    }

    #[test]
    fn product_counter_never_goes_negative() {
        let mut c = Category::create("Hogar", "", None).unwrap();
        c.decrement_product_count();
        assert_eq!(c.product_count(), 0);
        c.increment_product_count();
        c.increment_product_count();
        c.decrement_product_count();
        assert_eq!(c.product_count(), 1);
        c.set_product_count(7);
        assert_eq!(c.product_count(), 7);
    }

    #[test]
    fn stored_categories_are_checked_on_load() {
        let mut child = Category::create("Android", "", Some(CategoryId::from(4)))
            .unwrap()
            .with_id(CategoryId::from(9));
        child
            .set_placement(Some(CategoryId::from(4)), "1/4/9".to_string(), 2)
            .unwrap();
        let json = serde_json::to_value(&child).unwrap();
        let back: Category = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, child);

        let with = |field: &str, value: serde_json::Value| {
            let mut tampered = json.clone();
            tampered[field] = value;
            serde_json::from_value::<Category>(tampered)
        };
        assert!(with("name", " ".into()).is_err());
        assert!(with("description", "d".repeat(501).into()).is_err());
        assert!(with("level", 11.into()).is_err());
        assert!(with("level", 3.into()).is_err());
        assert!(with("path", "1/5/9".into()).is_err());
        assert!(with("path", "1/4/x/9".into()).is_err());
        assert!(with("parent_id", serde_json::Value::Null).is_err());

        let unplaced = Category::create("Hogar", "", None).unwrap();
        let json = serde_json::to_string(&unplaced).unwrap();
        assert_eq!(serde_json::from_str::<Category>(&json).unwrap(), unplaced);
    }
}
