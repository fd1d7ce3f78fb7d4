//! Unit templates and their wargear definitions.
//!
//! A template is the immutable datasheet for one unit type: role, stat line,
//! keywords, point tiers, and the loadouts a roster entry may choose from.
//! Role ordering and per-role datasheet limits live here as static tables.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::weapon::WeaponPatch;

/// The keyword every character-class unit carries (Epic Heroes included).
pub const CHARACTER_KEYWORD: &str = "CHARACTER";

/// The keyword marking a named, unique character.
pub const EPIC_HERO_KEYWORD: &str = "EPIC HERO";

/// Datasheet limit applied when a role is not known.
pub const DEFAULT_QUANTITY_LIMIT: usize = 3;

/// The number of battlefield roles.
pub const ROLE_COUNT: usize = 8;

/// Battlefield role of a unit template.
///
/// Variants are declared in display priority order, so the derived `Ord`
/// is the canonical sort order for unit lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    EpicHero,
    Character,
    Battleline,
    Infantry,
    Mounted,
    Vehicle,
    Transport,
    Fortification,
}

/// All roles in priority order.
pub const ALL_ROLES: [Role; ROLE_COUNT] = [
    Role::EpicHero,
    Role::Character,
    Role::Battleline,
    Role::Infantry,
    Role::Mounted,
    Role::Vehicle,
    Role::Transport,
    Role::Fortification,
];

impl Role {
    /// Returns the human-readable role label.
    pub const fn label(self) -> &'static str {
        match self {
            Role::EpicHero => "Epic Hero",
            Role::Character => "Character",
            Role::Battleline => "Battleline",
            Role::Infantry => "Infantry",
            Role::Mounted => "Mounted",
            Role::Vehicle => "Vehicle",
            Role::Transport => "Transport",
            Role::Fortification => "Fortification",
        }
    }

    /// Maximum copies of a single datasheet with this role.
    pub const fn quantity_limit(self) -> usize {
        match self {
            Role::EpicHero => 1,
            Role::Character => 3,
            Role::Battleline => 6,
            Role::Infantry => 3,
            Role::Mounted => 3,
            Role::Vehicle => 3,
            Role::Transport => 6,
            Role::Fortification => 3,
        }
    }

    /// Parses a role from its label (`"Epic Hero"`), ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Role> {
        ALL_ROLES.iter().copied().find(|r| r.label().eq_ignore_ascii_case(label))
    }

    /// Parses a role from the catalog group it was loaded from (`"epichero"`,
    /// `"vehicles"`, ...). A trailing `.json` is ignored.
    pub fn from_group(group: &str) -> Option<Role> {
        match group.trim_end_matches(".json") {
            "epichero" => Some(Role::EpicHero),
            "characters" => Some(Role::Character),
            "battleline" => Some(Role::Battleline),
            "infantry" => Some(Role::Infantry),
            "mounted" => Some(Role::Mounted),
            "vehicles" => Some(Role::Vehicle),
            "transports" => Some(Role::Transport),
            "fortifications" => Some(Role::Fortification),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base characteristics shown on a datasheet. Values are display strings
/// (`6"`, `3+`) and may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(default)]
    pub m: String,
    #[serde(default)]
    pub t: String,
    #[serde(default)]
    pub sv: String,
    #[serde(default)]
    pub w: String,
    #[serde(default)]
    pub ld: String,
    #[serde(default)]
    pub oc: String,
}

/// One point-cost tier, indexed by model count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTier {
    #[serde(default)]
    pub models: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub cost: Option<u32>,
}

/// One selectable item inside a sub-option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WargearChoice {
    /// Selection id; defaults to `item_id` when the catalog omits it.
    #[serde(default)]
    pub id: Option<String>,
    pub item_id: String,
    #[serde(default)]
    pub stat_overrides: Option<WeaponPatch>,
}

impl WargearChoice {
    /// The id a roster entry stores to select this choice.
    pub fn choice_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.item_id)
    }
}

/// A configurable slot within a loadout; at most one choice is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WargearSubOption {
    #[serde(alias = "option_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub choices: Vec<WargearChoice>,
}

impl WargearSubOption {
    /// Finds a choice by its selection id.
    pub fn choice(&self, choice_id: &str) -> Option<&WargearChoice> {
        self.choices.iter().find(|c| c.choice_id() == choice_id)
    }
}

/// A named equipment configuration of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WargearLoadout {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "default_items")]
    pub default_weapons: Vec<String>,
    #[serde(default)]
    pub sub_options: Vec<WargearSubOption>,
}

impl WargearLoadout {
    /// Finds a sub-option by id.
    pub fn sub_option(&self, sub_option_id: &str) -> Option<&WargearSubOption> {
        self.sub_options.iter().find(|s| s.id == sub_option_id)
    }
}

/// The immutable datasheet for a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub stats: StatBlock,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub faction_keywords: Vec<String>,
    /// Owning faction; `None` means the datasheet is faction-agnostic.
    #[serde(default, alias = "chapter_id")]
    pub faction_id: Option<String>,
    #[serde(default, rename = "points", deserialize_with = "deserialize_points")]
    pub point_tiers: Vec<PointTier>,
    #[serde(default)]
    pub weapon_ids: Vec<String>,
    #[serde(default, alias = "wargear_options")]
    pub loadouts: Vec<WargearLoadout>,
}

impl UnitTemplate {
    /// Keywords and faction keywords combined, before any faction rules.
    pub fn base_keywords(&self) -> BTreeSet<String> {
        self.keywords
            .iter()
            .chain(self.faction_keywords.iter())
            .cloned()
            .collect()
    }

    /// Returns true if either keyword list contains `keyword`.
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().chain(&self.faction_keywords).any(|k| k == keyword)
    }

    /// Cost shown in the unit picker: the first tier's cost, or 0.
    pub fn display_cost(&self) -> u32 {
        self.point_tiers.first().and_then(|t| t.cost).unwrap_or(0)
    }

    /// Finds the tier for an exact model count.
    pub fn tier_for_models(&self, models: u32) -> Option<&PointTier> {
        self.point_tiers.iter().find(|t| t.models == Some(models))
    }

    /// Finds a loadout by id.
    pub fn loadout(&self, loadout_id: &str) -> Option<&WargearLoadout> {
        self.loadouts.iter().find(|l| l.id == loadout_id)
    }

    /// The loadout a fresh roster entry starts with.
    pub fn default_loadout(&self) -> Option<&WargearLoadout> {
        self.loadouts.first()
    }
}

/// Reads a cost that may be a number, a numeric string, or something else
/// entirely. Anything that is not a non-negative integer is treated as absent.
pub(crate) fn deserialize_cost<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(cost_from_value(&Value::deserialize(deserializer)?))
}

fn cost_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Point costs appear in catalog data either as a flat value or as a list
/// of model-count tiers. Both normalize to a tier list.
fn deserialize_points<'de, D>(deserializer: D) -> Result<Vec<PointTier>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        tiers @ Value::Array(_) => serde_json::from_value(tiers).map_err(D::Error::custom)?,
        flat => vec![PointTier { models: None, cost: cost_from_value(&flat) }],
    })
}
