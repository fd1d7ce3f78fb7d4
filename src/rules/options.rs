//! Choices currently open to the player: detachments, enhancements, army
//! rules and stratagems.

use std::collections::BTreeSet;

use crate::catalog::{Catalog, Detachment, Enhancement, RuleText, Stratagem, StratagemScope};
use crate::roster::{InstanceId, Roster};

use super::validate::check_enhancement;

/// Detachments open to `faction`. Empty when no faction is active.
pub fn available_detachments<'c>(catalog: &'c Catalog, faction: Option<&str>) -> Vec<&'c Detachment> {
    let Some(faction) = faction else {
        return Vec::new();
    };
    catalog.detachments().iter().filter(|d| d.allows(faction)).collect()
}

/// Enhancements the entry could take right now.
pub fn available_enhancements<'c>(
    catalog: &'c Catalog,
    roster: &Roster,
    instance: InstanceId,
) -> Vec<&'c Enhancement> {
    let (Some(unit), Some(detachment)) = (roster.unit(instance), roster.detachment.as_deref()) else {
        return Vec::new();
    };
    catalog
        .enhancements()
        .iter()
        .filter(|e| e.detachment_id == detachment)
        .filter(|e| check_enhancement(catalog, roster, unit, e).is_ok())
        .collect()
}

/// Faction rules followed by detachment rules.
pub fn army_rules<'c>(catalog: &'c Catalog, roster: &Roster) -> Vec<&'c RuleText> {
    let faction = roster.faction.as_deref().and_then(|id| catalog.faction(id));
    let detachment = roster.detachment.as_deref().and_then(|id| catalog.detachment(id));
    faction
        .into_iter()
        .flat_map(|f| f.rules.iter())
        .chain(detachment.into_iter().flat_map(|d| d.rules.iter()))
        .collect()
}

/// Army-wide stratagems plus those of the active detachment. Empty until a
/// detachment is chosen.
pub fn army_stratagems<'c>(catalog: &'c Catalog, roster: &Roster) -> Vec<&'c Stratagem> {
    let Some(active) = roster.detachment.as_deref() else {
        return Vec::new();
    };
    catalog
        .stratagems()
        .iter()
        .filter(|s| match &s.scope {
            StratagemScope::Core => false,
            StratagemScope::Army => true,
            StratagemScope::Detachment { detachment_id } => detachment_id == active,
        })
        .collect()
}

pub fn core_stratagems(catalog: &Catalog) -> Vec<&Stratagem> {
    catalog
        .stratagems()
        .iter()
        .filter(|s| s.scope == StratagemScope::Core)
        .collect()
}

/// True when the stratagem has no keyword requirements or the unit has any
/// one of them.
pub fn is_stratagem_usable(stratagem: &Stratagem, keywords: &BTreeSet<String>) -> bool {
    stratagem.keyword_requirements.is_empty()
        || stratagem.keyword_requirements.iter().any(|k| keywords.contains(k))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{Faction, Role, StatBlock, StratagemText, UnitTemplate};
    use crate::roster::UnitInstance;

    fn rule(name: &str) -> RuleText {
        RuleText { name: name.into(), text: String::new() }
    }

    fn stratagem(id: &str, scope: StratagemScope, requirements: &[&str]) -> Stratagem {
        Stratagem {
            id: id.into(),
            name: id.into(),
            cost: "1CP".into(),
            kind: String::new(),
            scope,
            keyword_requirements: requirements.iter().map(|k| k.to_string()).collect(),
            rules: StratagemText::default(),
        }
    }

    fn catalog() -> Catalog {
        let captain = UnitTemplate {
            id: "captain".into(),
            name: "Captain".into(),
            role: Role::Character,
            stats: StatBlock::default(),
            keywords: vec!["INFANTRY".into(), "CHARACTER".into()],
            faction_keywords: Vec::new(),
            faction_id: None,
            point_tiers: Vec::new(),
            weapon_ids: Vec::new(),
            loadouts: Vec::new(),
        };
        let enhancement = |id: &str, det: &str, pre: &[&str]| Enhancement {
            id: id.into(),
            name: id.into(),
            cost: Some(20),
            detachment_id: det.into(),
            prerequisites: pre.iter().map(|k| k.to_string()).collect(),
            rule: String::new(),
        };
        let detachment = |id: &str, factions: &[&str]| Detachment {
            id: id.into(),
            name: id.into(),
            allowed_factions: factions.iter().map(|f| f.to_string()).collect(),
            rules: vec![rule(&format!("{id} rule"))],
        };
        Catalog::new(
            vec![captain],
            Vec::new(),
            vec![
                enhancement("artificer_armour", "gladius", &[]),
                enhancement("honour_vehement", "gladius", &[]),
                enhancement("fire_discipline", "gladius", &["VETERAN"]),
                enhancement("shield_eternal", "anvil", &[]),
            ],
            vec![Faction {
                id: "ultramarines".into(),
                name: "Ultramarines".into(),
                rules: vec![rule("Oath of Moment")],
                keyword_rules: Vec::new(),
            }],
            vec![
                detachment("gladius", &["ultramarines", "dark_angels"]),
                detachment("unforgiven", &["dark_angels"]),
            ],
        )
        .with_stratagems(vec![
            stratagem("command_reroll", StratagemScope::Core, &[]),
            stratagem("armour_of_contempt", StratagemScope::Army, &["INFANTRY", "VEHICLE"]),
            stratagem(
                "storm_of_fire",
                StratagemScope::Detachment { detachment_id: "gladius".into() },
                &[],
            ),
            stratagem(
                "grim_resolve",
                StratagemScope::Detachment { detachment_id: "unforgiven".into() },
                &[],
            ),
        ])
    }

    fn roster_with_captains(catalog: &Catalog, n: usize) -> Roster {
        let mut roster = Roster::new();
        for _ in 0..n {
            let id = roster.allocate_id();
            let template = catalog.unit("captain").map(Arc::clone).unwrap();
            roster.units.push(UnitInstance::from_template(id, template));
        }
        roster
    }

    #[test]
    fn detachments_filtered_by_faction() {
        let catalog = catalog();
        assert!(available_detachments(&catalog, None).is_empty());
        let ids: Vec<&str> = available_detachments(&catalog, Some("dark_angels"))
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["gladius", "unforgiven"]);
        assert_eq!(available_detachments(&catalog, Some("ultramarines")).len(), 1);
    }

    #[test]
    fn enhancements_need_detachment_and_exclude_taken() {
        let catalog = catalog();
        let mut roster = roster_with_captains(&catalog, 2);
        assert!(available_enhancements(&catalog, &roster, InstanceId(1)).is_empty());

        roster.faction = Some("ultramarines".into());
        roster.detachment = Some("gladius".into());
        let ids: Vec<&str> = available_enhancements(&catalog, &roster, InstanceId(1))
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["artificer_armour", "honour_vehement"]);

        roster.unit_mut(InstanceId(1)).unwrap().enhancement = Some("artificer_armour".into());
        let ids: Vec<&str> = available_enhancements(&catalog, &roster, InstanceId(2))
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["honour_vehement"]);
        assert!(available_enhancements(&catalog, &roster, InstanceId(9)).is_empty());
    }

    #[test]
    fn rules_list_faction_then_detachment() {
        let catalog = catalog();
        let mut roster = Roster::new();
        assert!(army_rules(&catalog, &roster).is_empty());
        roster.faction = Some("ultramarines".into());
        roster.detachment = Some("gladius".into());
        let names: Vec<&str> = army_rules(&catalog, &roster).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Oath of Moment", "gladius rule"]);
    }

    #[test]
    fn stratagems_by_scope() {
        let catalog = catalog();
        let mut roster = Roster::new();
        assert!(army_stratagems(&catalog, &roster).is_empty());
        assert_eq!(core_stratagems(&catalog).len(), 1);

        roster.detachment = Some("gladius".into());
        let ids: Vec<&str> = army_stratagems(&catalog, &roster).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["armour_of_contempt", "storm_of_fire"]);
    }

    #[test]
    fn stratagem_usable_on_any_requirement() {
        let catalog = catalog();
        let contempt = &catalog.stratagems()[1];
        let infantry: BTreeSet<String> = ["INFANTRY".to_string()].into();
        assert!(is_stratagem_usable(contempt, &infantry));
        assert!(!is_stratagem_usable(contempt, &BTreeSet::new()));
        assert!(is_stratagem_usable(&catalog.stratagems()[0], &BTreeSet::new()));
    }
}
