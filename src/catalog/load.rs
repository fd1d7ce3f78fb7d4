//! JSON catalog loading.
//!
//! The catalog document groups unit datasheets by role file stem and lists
//! the remaining tables flat:
//!
//! ```json
//! {
//!   "base_keywords": ["ADEPTUS ASTARTES"],
//!   "units": { "characters": [...], "battleline": [...] },
//!   "weapons": [...], "enhancements": [...], "chapters": [...],
//!   "detachments": [...], "stratagems": [...]
//! }
//! ```
//!
//! Each unit's role comes from its group, and every unit is enriched with the
//! document's `base_keywords` before the catalog is handed to the engine.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::army::{Detachment, Enhancement, Faction, Stratagem};
use super::unit::{Role, UnitTemplate};
use super::weapon::Weapon;
use super::Catalog;

/// The id the command line uses to clear a faction, detachment, or
/// enhancement. No catalog entry of those kinds may use it.
pub const RESERVED_ID: &str = "none";

/// Errors that can occur while loading a catalog document.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown unit group '{0}'")]
    UnknownRoleGroup(String),

    #[error("unit group '{0}' is not a list")]
    MalformedGroup(String),

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} id '{id}' is reserved")]
    ReservedId { kind: &'static str, id: String },
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    base_keywords: Vec<String>,
    #[serde(default)]
    units: BTreeMap<String, Value>,
    #[serde(default)]
    weapons: Vec<Weapon>,
    #[serde(default)]
    enhancements: Vec<Enhancement>,
    #[serde(default, alias = "chapters")]
    factions: Vec<Faction>,
    #[serde(default)]
    detachments: Vec<Detachment>,
    #[serde(default)]
    stratagems: Vec<Stratagem>,
}

/// Reads and parses a catalog document from disk.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&raw)
}

/// Parses a catalog document.
pub fn parse_catalog(raw: &str) -> Result<Catalog, CatalogError> {
    let doc: CatalogDocument = serde_json::from_str(raw)?;

    let mut units = Vec::new();
    for (group, entries) in doc.units {
        let role = Role::from_group(&group)
            .ok_or_else(|| CatalogError::UnknownRoleGroup(group.clone()))?;
        let Value::Array(entries) = entries else {
            return Err(CatalogError::MalformedGroup(group));
        };
        for entry in entries {
            let mut unit = parse_unit(entry, role)?;
            for keyword in &doc.base_keywords {
                if !unit.has_keyword(keyword) {
                    unit.faction_keywords.push(keyword.clone());
                }
            }
            units.push(unit);
        }
    }

    check_unique("unit", units.iter().map(|u| u.id.as_str()))?;
    check_unique("weapon", doc.weapons.iter().map(|w| w.id.as_str()))?;
    check_unique("enhancement", doc.enhancements.iter().map(|e| e.id.as_str()))?;
    check_unique("faction", doc.factions.iter().map(|f| f.id.as_str()))?;
    check_unique("detachment", doc.detachments.iter().map(|d| d.id.as_str()))?;
    check_not_reserved("enhancement", doc.enhancements.iter().map(|e| e.id.as_str()))?;
    check_not_reserved("faction", doc.factions.iter().map(|f| f.id.as_str()))?;
    check_not_reserved("detachment", doc.detachments.iter().map(|d| d.id.as_str()))?;

    tracing::debug!(
        units = units.len(),
        weapons = doc.weapons.len(),
        enhancements = doc.enhancements.len(),
        factions = doc.factions.len(),
        detachments = doc.detachments.len(),
        stratagems = doc.stratagems.len(),
        "catalog parsed"
    );

    Ok(Catalog::new(units, doc.weapons, doc.enhancements, doc.factions, doc.detachments)
        .with_stratagems(doc.stratagems))
}

/// Deserializes one datasheet, stamping the role of its group onto it.
fn parse_unit(mut entry: Value, role: Role) -> Result<UnitTemplate, CatalogError> {
    if let Value::Object(fields) = &mut entry {
        fields.insert("role".to_string(), serde_json::to_value(role)?);
    }
    Ok(serde_json::from_value(entry)?)
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId { kind, id: id.to_string() });
        }
    }
    Ok(())
}

fn check_not_reserved<'a>(
    kind: &'static str,
    mut ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    match ids.find(|&id| id == RESERVED_ID) {
        Some(id) => Err(CatalogError::ReservedId { kind, id: id.to_string() }),
        None => Ok(()),
    }
}
