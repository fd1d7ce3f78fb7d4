//! Weapon profiles and stat-override patches.
//!
//! A weapon either carries its characteristics directly or lists several
//! firing modes (`profiles`). Wargear choices may patch individual fields;
//! a patch overwrites only the fields it names.

use serde::{Deserialize, Serialize};

/// Range value that marks a close-combat profile.
pub const MELEE_RANGE: &str = "Melee";

/// Characteristics of one weapon profile. Values are display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    #[serde(default)]
    pub range: String,
    #[serde(default, rename = "A")]
    pub attacks: String,
    /// Ballistic skill for ranged profiles, weapon skill for melee ones.
    #[serde(default, rename = "BS", alias = "WS")]
    pub skill: String,
    #[serde(default, rename = "S")]
    pub strength: String,
    #[serde(default, rename = "AP")]
    pub ap: String,
    #[serde(default, rename = "D")]
    pub damage: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl WeaponStats {
    /// Returns true for close-combat profiles.
    pub fn is_melee(&self) -> bool {
        self.range == MELEE_RANGE
    }

    /// Returns a copy with every field named by `patch` overwritten.
    pub fn patched(&self, patch: &WeaponPatch) -> WeaponStats {
        WeaponStats {
            range: patch.range.clone().unwrap_or_else(|| self.range.clone()),
            attacks: patch.attacks.clone().unwrap_or_else(|| self.attacks.clone()),
            skill: patch.skill.clone().unwrap_or_else(|| self.skill.clone()),
            strength: patch.strength.clone().unwrap_or_else(|| self.strength.clone()),
            ap: patch.ap.clone().unwrap_or_else(|| self.ap.clone()),
            damage: patch.damage.clone().unwrap_or_else(|| self.damage.clone()),
            keywords: patch.keywords.clone().unwrap_or_else(|| self.keywords.clone()),
        }
    }
}

/// Partial overwrite of a weapon profile. Absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, rename = "A", skip_serializing_if = "Option::is_none")]
    pub attacks: Option<String>,
    #[serde(default, rename = "BS", alias = "WS", skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, rename = "S", skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(default, rename = "AP", skip_serializing_if = "Option::is_none")]
    pub ap: Option<String>,
    #[serde(default, rename = "D", skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// A named firing mode of a multi-profile weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponMode {
    pub name: String,
    #[serde(flatten)]
    pub stats: WeaponStats,
}

/// A weapon as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub stats: WeaponStats,
    /// Firing modes; when non-empty they replace `stats` for display.
    #[serde(default)]
    pub profiles: Vec<WeaponMode>,
}
