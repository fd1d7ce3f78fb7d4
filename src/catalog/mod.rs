//! Read-only catalog tables.
//!
//! Holds every unit template, weapon, enhancement, faction, detachment, and
//! stratagem the roster engine may reference. A catalog is built once and
//! shared behind an `Arc`; nothing in the engine mutates it.

pub mod army;
pub mod load;
pub mod unit;
pub mod weapon;

use std::collections::HashMap;
use std::sync::Arc;

pub use army::{
    Detachment, Enhancement, Faction, KeywordPredicate, KeywordRule, RuleText, Stratagem,
    StratagemScope, StratagemText,
};
pub use load::{load_catalog, parse_catalog, CatalogError, RESERVED_ID};
pub use unit::{
    PointTier, Role, StatBlock, UnitTemplate, WargearChoice, WargearLoadout, WargearSubOption,
    ALL_ROLES, CHARACTER_KEYWORD, DEFAULT_QUANTITY_LIMIT, EPIC_HERO_KEYWORD, ROLE_COUNT,
};
pub use weapon::{Weapon, WeaponMode, WeaponPatch, WeaponStats, MELEE_RANGE};

/// The immutable tables the engine reads from.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    units: Vec<Arc<UnitTemplate>>,
    unit_index: HashMap<String, usize>,
    weapons: HashMap<String, Weapon>,
    enhancements: Vec<Enhancement>,
    factions: Vec<Faction>,
    detachments: Vec<Detachment>,
    stratagems: Vec<Stratagem>,
}

impl Catalog {
    /// Builds a catalog from fully resolved tables.
    ///
    /// Units are stored in canonical order (role priority, then name). When
    /// two templates or weapons share an id the later one wins; the loader
    /// rejects such input before it gets here.
    pub fn new(
        units: Vec<UnitTemplate>,
        weapons: Vec<Weapon>,
        enhancements: Vec<Enhancement>,
        factions: Vec<Faction>,
        detachments: Vec<Detachment>,
    ) -> Self {
        let mut units: Vec<Arc<UnitTemplate>> = units.into_iter().map(Arc::new).collect();
        units.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.name.cmp(&b.name)));
        let unit_index = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id.clone(), i))
            .collect();
        let weapons = weapons.into_iter().map(|w| (w.id.clone(), w)).collect();

        Catalog {
            units,
            unit_index,
            weapons,
            enhancements,
            factions,
            detachments,
            stratagems: Vec::new(),
        }
    }

    /// Adds the stratagem table.
    pub fn with_stratagems(mut self, stratagems: Vec<Stratagem>) -> Self {
        self.stratagems = stratagems;
        self
    }

    /// All templates in canonical order.
    pub fn units(&self) -> &[Arc<UnitTemplate>] {
        &self.units
    }

    /// Templates with the given role, sorted by name.
    pub fn units_with_role(&self, role: Role) -> impl Iterator<Item = &UnitTemplate> {
        self.units.iter().map(|u| u.as_ref()).filter(move |u| u.role == role)
    }

    /// Looks up a template by id.
    pub fn unit(&self, id: &str) -> Option<&Arc<UnitTemplate>> {
        self.unit_index.get(id).map(|&i| &self.units[i])
    }

    /// Looks up a weapon by id.
    pub fn weapon(&self, id: &str) -> Option<&Weapon> {
        self.weapons.get(id)
    }

    pub fn enhancements(&self) -> &[Enhancement] {
        &self.enhancements
    }

    /// Looks up an enhancement by id.
    pub fn enhancement(&self, id: &str) -> Option<&Enhancement> {
        self.enhancements.iter().find(|e| e.id == id)
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    /// Looks up a faction by id.
    pub fn faction(&self, id: &str) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id == id)
    }

    pub fn detachments(&self) -> &[Detachment] {
        &self.detachments
    }

    /// Looks up a detachment by id.
    pub fn detachment(&self, id: &str) -> Option<&Detachment> {
        self.detachments.iter().find(|d| d.id == id)
    }

    pub fn stratagems(&self) -> &[Stratagem] {
        &self.stratagems
    }
}
