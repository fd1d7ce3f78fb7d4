//! Roster legality checks.
//!
//! Pure functions over a roster snapshot. The engine calls the gate checks
//! (`is_add_allowed`, `check_enhancement`) before every mutation; `audit`
//! collects every standing problem for display.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::catalog::{
    Catalog, Enhancement, Role, UnitTemplate, CHARACTER_KEYWORD, DEFAULT_QUANTITY_LIMIT,
    EPIC_HERO_KEYWORD,
};
use crate::roster::{InstanceId, Roster, RosterError, UnitInstance};

use super::keywords::unit_keywords;

/// Maximum copies of one datasheet for a role; `None` gets the default.
pub fn quantity_limit_for(role: Option<Role>) -> usize {
    role.map_or(DEFAULT_QUANTITY_LIMIT, Role::quantity_limit)
}

/// Number of entries created from `template_id`.
pub fn count_of_template(roster: &Roster, template_id: &str) -> usize {
    roster
        .units
        .iter()
        .filter(|u| u.template_id() == template_id)
        .count()
}

/// Returns true if one more copy of `template` fits its datasheet limit.
pub fn is_add_allowed(roster: &Roster, template: &UnitTemplate) -> bool {
    count_of_template(roster, &template.id) < quantity_limit_for(Some(template.role))
}

/// Returns true if the template may be fielded under the active faction.
/// A faction-locked template is incompatible when no faction is active.
pub fn is_faction_compatible(template: &UnitTemplate, active_faction: Option<&str>) -> bool {
    match template.faction_id.as_deref() {
        None => true,
        Some(required) => active_faction == Some(required),
    }
}

/// False for an empty roster; otherwise true iff some entry carries the
/// CHARACTER keyword (Epic Heroes carry it too).
pub fn meets_minimum_character_requirement(catalog: &Catalog, roster: &Roster) -> bool {
    roster
        .units
        .iter()
        .any(|u| unit_keywords(catalog, roster, u).contains(CHARACTER_KEYWORD))
}

/// Entry count per role, in role priority order. Roles with no entries are
/// omitted.
pub fn roles_summary(roster: &Roster) -> BTreeMap<Role, usize> {
    let mut summary = BTreeMap::new();
    for unit in &roster.units {
        *summary.entry(unit.template.role).or_insert(0) += 1;
    }
    summary
}

/// Entries in display order: role priority, then name (byte-wise), then id.
pub fn sorted_units(roster: &Roster) -> Vec<&UnitInstance> {
    let mut units: Vec<&UnitInstance> = roster.units.iter().collect();
    units.sort_by(|a, b| {
        a.template
            .role
            .cmp(&b.template.role)
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id.cmp(&b.id))
    });
    units
}

/// Returns true if the entry's role and keywords allow any enhancement.
pub fn can_take_enhancement(unit: &UnitInstance, keywords: &BTreeSet<String>) -> bool {
    unit.template.role == Role::Character && !keywords.contains(EPIC_HERO_KEYWORD)
}

/// Checks whether `enhancement` may be held by `unit`, in this order:
/// eligibility, uniqueness, prerequisites, detachment.
pub fn check_enhancement(
    catalog: &Catalog,
    roster: &Roster,
    unit: &UnitInstance,
    enhancement: &Enhancement,
) -> Result<(), RosterError> {
    let keywords = unit_keywords(catalog, roster, unit);
    if !can_take_enhancement(unit, &keywords) {
        return Err(RosterError::NotEligible { instance: unit.id });
    }

    if let Some(holder) = roster.holder_of(&enhancement.id) {
        if holder.id != unit.id {
            return Err(RosterError::AlreadyAssigned {
                enhancement_id: enhancement.id.clone(),
                holder: holder.id,
            });
        }
    }

    let missing: Vec<String> = enhancement
        .prerequisites
        .iter()
        .filter(|k| !keywords.contains(*k))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(RosterError::PrerequisiteNotMet {
            instance: unit.id,
            enhancement_id: enhancement.id.clone(),
            missing,
        });
    }

    if roster.detachment.as_deref() != Some(enhancement.detachment_id.as_str()) {
        return Err(RosterError::WrongDetachment {
            enhancement_id: enhancement.id.clone(),
            detachment_id: enhancement.detachment_id.clone(),
        });
    }

    Ok(())
}

/// Enhancements held by more than one entry, with their holders.
pub fn enhancement_conflicts(roster: &Roster) -> Vec<(String, Vec<InstanceId>)> {
    let mut holders: BTreeMap<&str, Vec<InstanceId>> = BTreeMap::new();
    for unit in &roster.units {
        if let Some(id) = unit.enhancement.as_deref() {
            holders.entry(id).or_default().push(unit.id);
        }
    }
    holders
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(id, ids)| (id.to_string(), ids))
        .collect()
}

/// A standing problem with a roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NoCharacter,
    FactionMismatch { instance: InstanceId, required: String },
    OverLimit { template_id: String, count: usize, limit: usize },
    DuplicateEnhancement { enhancement_id: String, holders: Vec<InstanceId> },
    InvalidEnhancement { instance: InstanceId, reason: RosterError },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NoCharacter => write!(f, "army needs at least one CHARACTER"),
            Violation::FactionMismatch { instance, required } => {
                write!(f, "{} requires faction '{}'", instance, required)
            }
            Violation::OverLimit { template_id, count, limit } => {
                write!(f, "'{}' taken {} times (limit {})", template_id, count, limit)
            }
            Violation::DuplicateEnhancement { enhancement_id, holders } => {
                let ids: Vec<String> = holders.iter().map(|h| h.to_string()).collect();
                write!(f, "enhancement '{}' held by {}", enhancement_id, ids.join(", "))
            }
            Violation::InvalidEnhancement { instance, reason } => {
                write!(f, "{}: {}", instance, reason)
            }
        }
    }
}

/// Collects every standing problem with the roster.
///
/// An empty roster reports only `NoCharacter`. Duplicate holders are reported
/// once as `DuplicateEnhancement` rather than per holder.
pub fn audit(catalog: &Catalog, roster: &Roster) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !meets_minimum_character_requirement(catalog, roster) {
        violations.push(Violation::NoCharacter);
    }

    for unit in &roster.units {
        if !is_faction_compatible(&unit.template, roster.faction.as_deref()) {
            violations.push(Violation::FactionMismatch {
                instance: unit.id,
                required: unit.template.faction_id.clone().unwrap_or_default(),
            });
        }
    }

    let mut seen = BTreeSet::new();
    for unit in &roster.units {
        let template = &unit.template;
        if !seen.insert(template.id.as_str()) {
            continue;
        }
        let count = count_of_template(roster, &template.id);
        let limit = quantity_limit_for(Some(template.role));
        if count > limit {
            violations.push(Violation::OverLimit { template_id: template.id.clone(), count, limit });
        }
    }

    for (enhancement_id, holders) in enhancement_conflicts(roster) {
        violations.push(Violation::DuplicateEnhancement { enhancement_id, holders });
    }

    for unit in &roster.units {
        let Some(enhancement_id) = unit.enhancement.as_deref() else {
            continue;
        };
        let result = match catalog.enhancement(enhancement_id) {
            Some(enhancement) => check_enhancement(catalog, roster, unit, enhancement),
            None => Err(RosterError::UnknownEnhancement(enhancement_id.to_string())),
        };
        match result {
            Ok(()) | Err(RosterError::AlreadyAssigned { .. }) => {}
            Err(reason) => violations.push(Violation::InvalidEnhancement { instance: unit.id, reason }),
        }
    }

    violations
}
