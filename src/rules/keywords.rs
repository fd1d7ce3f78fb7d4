//! Effective keyword derivation.
//!
//! A unit's effective keywords are its base keywords plus whatever the active
//! faction's conditional rules add. The set is rebuilt from the template on
//! every call, so switching factions leaves no residue.

use std::collections::BTreeSet;

use crate::catalog::{Catalog, Faction, UnitTemplate};
use crate::roster::{Roster, UnitInstance};

/// Computes the effective keywords of a template under `faction`.
///
/// Rules are applied in catalog order; each predicate sees the base set plus
/// everything earlier rules in the same pass have added.
pub fn effective_keywords(template: &UnitTemplate, faction: Option<&Faction>) -> BTreeSet<String> {
    let mut keywords = template.base_keywords();
    let Some(faction) = faction else {
        return keywords;
    };
    for rule in &faction.keyword_rules {
        if rule.predicate.matches(&keywords) {
            keywords.extend(rule.add.iter().cloned());
        }
    }
    keywords
}

/// Effective keywords of a roster entry under the roster's active faction.
/// An active faction id missing from the catalog counts as no faction.
pub fn unit_keywords(catalog: &Catalog, roster: &Roster, unit: &UnitInstance) -> BTreeSet<String> {
    let faction = roster.faction.as_deref().and_then(|id| catalog.faction(id));
    effective_keywords(&unit.template, faction)
}
