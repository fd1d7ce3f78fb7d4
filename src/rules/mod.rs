//! Derived views and legality rules over a roster snapshot.

pub mod cost;
pub mod keywords;
pub mod options;
pub mod validate;
pub mod wargear;

pub use cost::{base_cost, enhancement_cost, total_cost, unit_cost};
pub use keywords::{effective_keywords, unit_keywords};
pub use options::{
    army_rules, army_stratagems, available_detachments, available_enhancements, core_stratagems,
    is_stratagem_usable,
};
pub use validate::{
    audit, can_take_enhancement, check_enhancement, count_of_template, enhancement_conflicts,
    is_add_allowed, is_faction_compatible, meets_minimum_character_requirement,
    quantity_limit_for, roles_summary, sorted_units, Violation,
};
pub use wargear::{partition_weapons, resolve_weapons, weapon_tables, ResolvedWeapon, WeaponTables};
