//! Wargear resolution.
//!
//! Turns a roster entry's loadout selection into the concrete weapon
//! profiles it carries, then splits them into ranged and melee tables.
//! Weapon ids with no catalog entry are skipped.

use crate::catalog::{Catalog, Weapon, WeaponPatch, WeaponStats};
use crate::roster::UnitInstance;

/// One weapon profile as equipped on a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWeapon {
    pub weapon_id: String,
    /// The weapon's catalog name.
    pub name: String,
    /// Firing-mode name for multi-profile weapons.
    pub mode: Option<String>,
    pub stats: WeaponStats,
}

/// Resolved weapons split for display. Every weapon lands in exactly one
/// table, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaponTables {
    pub ranged: Vec<ResolvedWeapon>,
    pub melee: Vec<ResolvedWeapon>,
}

/// Computes the weapon profiles a roster entry carries.
///
/// Without loadouts the template's own weapon list is used. Otherwise the
/// selected loadout (or the first one, if the selection is missing or stale)
/// supplies its default weapons, followed by one patched weapon per
/// sub-option with a choice made. The fallback loadout never applies the
/// entry's sub-selections.
pub fn resolve_weapons(catalog: &Catalog, unit: &UnitInstance) -> Vec<ResolvedWeapon> {
    let template = &unit.template;
    let mut resolved = Vec::new();

    let selected = unit
        .wargear
        .loadout_id
        .as_deref()
        .and_then(|id| template.loadout(id));
    let Some(loadout) = selected.or_else(|| template.default_loadout()) else {
        for weapon_id in &template.weapon_ids {
            push_weapon(catalog, weapon_id, None, &mut resolved);
        }
        return resolved;
    };

    for weapon_id in &loadout.default_weapons {
        push_weapon(catalog, weapon_id, None, &mut resolved);
    }

    // Sub-selections only count when they were made for this loadout.
    let active = unit.wargear.loadout_id.as_deref() == Some(loadout.id.as_str());
    if !active {
        return resolved;
    }
    for sub_option in &loadout.sub_options {
        let Some(choice_id) = unit.wargear.choice_for(&sub_option.id) else {
            continue;
        };
        let Some(choice) = sub_option.choice(choice_id) else {
            tracing::warn!(
                unit = %unit.id,
                sub_option = %sub_option.id,
                choice = choice_id,
                "selected choice missing from catalog"
            );
            continue;
        };
        push_weapon(catalog, &choice.item_id, choice.stat_overrides.as_ref(), &mut resolved);
    }

    resolved
}

/// Splits resolved weapons into ranged and melee tables.
pub fn partition_weapons(weapons: Vec<ResolvedWeapon>) -> WeaponTables {
    let (melee, ranged) = weapons.into_iter().partition(|w| w.stats.is_melee());
    WeaponTables { ranged, melee }
}

/// Resolves and partitions in one step.
pub fn weapon_tables(catalog: &Catalog, unit: &UnitInstance) -> WeaponTables {
    partition_weapons(resolve_weapons(catalog, unit))
}

fn push_weapon(
    catalog: &Catalog,
    weapon_id: &str,
    patch: Option<&WeaponPatch>,
    out: &mut Vec<ResolvedWeapon>,
) {
    let Some(weapon) = catalog.weapon(weapon_id) else {
        tracing::warn!(weapon = weapon_id, "weapon missing from catalog, skipped");
        return;
    };
    out.extend(expand_profiles(weapon, patch));
}

/// Flattens a weapon into one resolved entry per firing mode, applying the
/// patch to each.
fn expand_profiles(weapon: &Weapon, patch: Option<&WeaponPatch>) -> Vec<ResolvedWeapon> {
    let apply = |stats: &WeaponStats| match patch {
        Some(patch) => stats.patched(patch),
        None => stats.clone(),
    };

    if weapon.profiles.is_empty() {
        vec![ResolvedWeapon {
            weapon_id: weapon.id.clone(),
            name: weapon.name.clone(),
            mode: None,
            stats: apply(&weapon.stats),
        }]
    } else {
        weapon
            .profiles
            .iter()
            .map(|mode| ResolvedWeapon {
                weapon_id: weapon.id.clone(),
                name: weapon.name.clone(),
                mode: Some(mode.name.clone()),
                stats: apply(&mode.stats),
            })
            .collect()
    }
}
