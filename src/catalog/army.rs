//! Army-wide catalog entries: factions, detachments, enhancements, and
//! stratagems.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named rule with its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleText {
    pub name: String,
    #[serde(default, alias = "rule")]
    pub text: String,
}

/// A detachment-scoped upgrade. At most one roster entry may hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enhancement {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::unit::deserialize_cost")]
    pub cost: Option<u32>,
    pub detachment_id: String,
    /// Every keyword listed must be present on the holder.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub rule: String,
}

/// Condition over a keyword set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPredicate {
    #[serde(default)]
    pub all_of: Vec<String>,
    #[serde(default)]
    pub any_of: Vec<String>,
    #[serde(default)]
    pub none_of: Vec<String>,
}

impl KeywordPredicate {
    /// Evaluates the predicate. Empty clauses are vacuously true.
    pub fn matches(&self, keywords: &BTreeSet<String>) -> bool {
        self.all_of.iter().all(|k| keywords.contains(k))
            && (self.any_of.is_empty() || self.any_of.iter().any(|k| keywords.contains(k)))
            && !self.none_of.iter().any(|k| keywords.contains(k))
    }
}

/// Faction rule appending keywords to units matching a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    #[serde(rename = "when")]
    pub predicate: KeywordPredicate,
    pub add: Vec<String>,
}

/// A top-level army selection (a Chapter in the source data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "army_rules")]
    pub rules: Vec<RuleText>,
    #[serde(default)]
    pub keyword_rules: Vec<KeywordRule>,
}

/// A sub-army selection gating which enhancements and stratagems apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detachment {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "allowed_chapters")]
    pub allowed_factions: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleText>,
}

impl Detachment {
    /// Returns true if the detachment may be taken by `faction_id`.
    pub fn allows(&self, faction_id: &str) -> bool {
        self.allowed_factions.iter().any(|f| f == faction_id)
    }
}

/// Which armies a stratagem is available to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum StratagemScope {
    /// Available to every army.
    Core,
    /// Available to every detachment of the catalog's army.
    Army,
    /// Available only with one detachment.
    Detachment { detachment_id: String },
}

/// Stratagem timing, target, and effect text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratagemText {
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stratagem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub scope: StratagemScope,
    /// A unit qualifies if it has any one of these; empty means any unit.
    #[serde(default)]
    pub keyword_requirements: Vec<String>,
    #[serde(default)]
    pub rules: StratagemText,
}
