use std::sync::Arc;

use comercia_catalog::{Unit, UnitRepository, UnitType};
use comercia_core::text::contains_ignore_case;
use comercia_core::{DomainError, DomainResult, Entity, UnitId};

use crate::database::{InMemoryDatabase, Tables};
use crate::stores::{counters, same_name};

/// Units of measure. Keeps at most one base unit per [`UnitType`].
#[derive(Debug, Clone)]
pub struct UnitStore {
    db: Arc<InMemoryDatabase>,
}

impl UnitStore {
    pub(crate) fn new(db: Arc<InMemoryDatabase>) -> Self {
        Self { db }
    }

    fn select(&self, keep: impl Fn(&Unit) -> bool) -> Vec<Unit> {
        let mut units: Vec<Unit> =
            self.db.read(|t| t.units.rows().filter(|u| keep(u)).cloned().collect());
        units.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        units
    }
}

fn others<'a>(tables: &'a Tables, exclude: Option<UnitId>) -> impl Iterator<Item = &'a Unit> {
    tables.units.rows().filter(move |u| Some(u.id()) != exclude)
}

fn validate_unique(tables: &Tables, unit: &Unit) -> DomainResult<()> {
    let exclude = Some(unit.id()).filter(|id| !id.is_null());
    if others(tables, exclude).any(|u| same_name(u.name(), unit.name())) {
        return Err(DomainError::invalid(format!(
            "A unit named {} already exists",
            unit.name()
        )));
    }
    if others(tables, exclude).any(|u| same_name(u.abbreviation(), unit.abbreviation())) {
        return Err(DomainError::invalid(format!(
            "A unit with abbreviation {} already exists",
            unit.abbreviation()
        )));
    }
    if unit.is_base_unit()
        && others(tables, exclude).any(|u| u.is_base_unit() && u.unit_type() == unit.unit_type())
    {
        return Err(DomainError::invalid(format!(
            "A base unit already exists for type {}",
            unit.unit_type()
        )));
    }
    Ok(())
}

impl UnitRepository for UnitStore {
    fn save(&self, unit: Unit) -> DomainResult<Unit> {
        self.db.transaction(|t| {
            if let Err(err) = validate_unique(t, &unit) {
                tracing::warn!(unit = unit.name(), error = %err, "unit rejected");
                return Err(err);
            }
            let mut unit = unit;
            if !unit.id().is_null() {
                unit.set_usage_count(counters::products_using_unit(t, unit.id()));
            }
            let saved = t.units.upsert(unit)?;
            tracing::info!(unit_id = %saved.id(), abbreviation = saved.abbreviation(), "unit saved");
            Ok(saved)
        })
    }

    fn find_by_id(&self, id: UnitId) -> DomainResult<Option<Unit>> {
        Ok(self.db.read(|t| t.units.get(id).cloned()))
    }

    fn find_all(&self) -> DomainResult<Vec<Unit>> {
        Ok(self.select(|_| true))
    }

    fn find_active(&self) -> DomainResult<Vec<Unit>> {
        Ok(self.select(Unit::is_active))
    }

    fn find_by_type(&self, unit_type: UnitType) -> DomainResult<Vec<Unit>> {
        Ok(self.select(|u| u.is_of_type(unit_type)))
    }

    fn find_base_units(&self) -> DomainResult<Vec<Unit>> {
        Ok(self.select(Unit::is_base_unit))
    }

    fn find_by_name(&self, name: &str) -> DomainResult<Option<Unit>> {
        Ok(self
            .db
            .read(|t| t.units.rows().find(|u| same_name(u.name(), name)).cloned()))
    }

    fn find_by_abbreviation(&self, abbreviation: &str) -> DomainResult<Option<Unit>> {
        Ok(self.db.read(|t| {
            t.units
                .rows()
                .find(|u| same_name(u.abbreviation(), abbreviation))
                .cloned()
        }))
    }

    fn search_by_name(&self, term: &str) -> DomainResult<Vec<Unit>> {
        let term = term.trim();
        Ok(self.select(|u| {
            contains_ignore_case(u.name(), term) || contains_ignore_case(u.abbreviation(), term)
        }))
    }

    fn delete(&self, id: UnitId) -> DomainResult<()> {
        self.db.transaction(|t| {
            t.units.require(id)?;
            let used_by = counters::products_using_unit(t, id);
            if used_by > 0 {
                tracing::warn!(unit_id = %id, products = used_by, "delete rejected: unit in use");
                return Err(DomainError::invalid(
                    "Cannot delete a unit that is used by products",
                ));
            }
            t.units.remove(id);
            tracing::info!(unit_id = %id, "unit deleted");
            Ok(())
        })
    }

    fn exists_with_name(&self, name: &str, exclude: Option<UnitId>) -> DomainResult<bool> {
        Ok(self
            .db
            .read(|t| others(t, exclude).any(|u| same_name(u.name(), name))))
    }

    fn exists_with_abbreviation(&self, abbreviation: &str, exclude: Option<UnitId>) -> DomainResult<bool> {
        Ok(self.db.read(|t| {
            others(t, exclude).any(|u| same_name(u.abbreviation(), abbreviation))
        }))
    }

    fn base_unit_for_type(&self, unit_type: UnitType) -> DomainResult<Option<Unit>> {
        Ok(self.db.read(|t| {
            t.units
                .rows()
                .find(|u| u.is_base_unit() && u.is_of_type(unit_type))
                .cloned()
        }))
    }

    fn conversion_options(&self, id: UnitId) -> DomainResult<Vec<Unit>> {
        let source = self
            .db
            .read(|t| t.units.require(id).cloned())?;
        Ok(self.select(|u| u.id() != id && u.is_active() && source.can_convert_to(u)))
    }

    fn convert(&self, source: UnitId, target: UnitId, value: f64) -> DomainResult<f64> {
        self.db.read(|t| {
            let from = t.units.require(source)?;
            let to = t.units.require(target)?;
            from.convert_to(to, value)
        })
    }

    fn recompute_usage_count(&self, id: UnitId) -> DomainResult<Unit> {
        self.db.transaction(|t| {
            t.units.require(id)?;
            counters::refresh_unit(t, id);
            let unit = t.units.require(id)?.clone();
            tracing::info!(unit_id = %id, usage_count = unit.usage_count(), "unit usage recomputed");
            Ok(unit)
        })
    }
}
