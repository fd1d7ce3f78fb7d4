//! Point cost calculation.
//!
//! Costs never fail: missing tiers, missing costs, and dangling enhancement
//! ids all count as zero.

use crate::catalog::Catalog;
use crate::roster::{Roster, UnitInstance};

/// Base cost of an entry: the tier matching its configured model count,
/// else the first tier, else zero.
pub fn base_cost(unit: &UnitInstance) -> u32 {
    let template = &unit.template;
    unit.model_count
        .and_then(|models| template.tier_for_models(models))
        .or_else(|| template.point_tiers.first())
        .and_then(|tier| tier.cost)
        .unwrap_or(0)
}

/// Cost of the entry's enhancement, or zero.
pub fn enhancement_cost(catalog: &Catalog, unit: &UnitInstance) -> u32 {
    unit.enhancement
        .as_deref()
        .and_then(|id| catalog.enhancement(id))
        .and_then(|e| e.cost)
        .unwrap_or(0)
}

/// Full cost of one entry.
pub fn unit_cost(catalog: &Catalog, unit: &UnitInstance) -> u32 {
    base_cost(unit).saturating_add(enhancement_cost(catalog, unit))
}

/// Total roster cost.
pub fn total_cost(catalog: &Catalog, roster: &Roster) -> u32 {
    roster
        .units
        .iter()
        .fold(0u32, |total, unit| total.saturating_add(unit_cost(catalog, unit)))
}
