//! The roster engine: sole owner of roster state.
//!
//! Every mutating operation validates against the current snapshot first and
//! only then commits, so a rejected call leaves the roster exactly as it was.

use std::sync::Arc;

use crate::catalog::{Catalog, UnitTemplate};
use crate::rules::{check_enhancement, is_add_allowed, quantity_limit_for};

use super::error::RosterError;
use super::instance::{InstanceId, UnitInstance, WargearSelection};
use super::state::Roster;

pub struct RosterEngine {
    catalog: Arc<Catalog>,
    roster: Roster,
}

impl RosterEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        RosterEngine {
            catalog,
            roster: Roster::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current roster state. Derived views are computed from this.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Sets the active faction and clears the detachment. Enhancements that
    /// no longer validate are released; wargear is untouched.
    pub fn select_faction(&mut self, faction_id: Option<&str>) -> Result<(), RosterError> {
        if let Some(id) = faction_id {
            if self.catalog.faction(id).is_none() {
                tracing::debug!(faction = id, "rejected unknown faction");
                return Err(RosterError::UnknownFaction(id.to_string()));
            }
        }

        self.roster.faction = faction_id.map(str::to_string);
        self.roster.detachment = None;
        let released = self.prune_enhancements();
        tracing::debug!(faction = ?faction_id, released, "faction selected");
        Ok(())
    }

    /// Sets the active detachment and clears every enhancement.
    pub fn select_detachment(&mut self, detachment_id: Option<&str>) -> Result<(), RosterError> {
        if let Some(id) = detachment_id {
            let allowed = match (self.catalog.detachment(id), self.roster.faction.as_deref()) {
                (Some(detachment), Some(faction)) => detachment.allows(faction),
                _ => false,
            };
            if !allowed {
                tracing::debug!(detachment = id, faction = ?self.roster.faction, "rejected detachment");
                return Err(RosterError::InvalidSelection { detachment_id: id.to_string() });
            }
        }

        self.roster.detachment = detachment_id.map(str::to_string);
        let mut released = 0;
        for unit in &mut self.roster.units {
            if unit.enhancement.take().is_some() {
                released += 1;
            }
        }
        tracing::debug!(detachment = ?detachment_id, released, "detachment selected");
        Ok(())
    }

    /// Adds a fresh entry for `template_id` and returns its id.
    pub fn add_unit(&mut self, template_id: &str) -> Result<InstanceId, RosterError> {
        let template = self
            .catalog
            .unit(template_id)
            .map(Arc::clone)
            .ok_or_else(|| RosterError::UnknownTemplate(template_id.to_string()))?;
        self.check_quantity(&template)?;

        let id = self.roster.allocate_id();
        self.roster.units.push(UnitInstance::from_template(id, template));
        tracing::debug!(unit = %id, template = template_id, "unit added");
        Ok(id)
    }

    /// Adds a copy of an existing entry's configuration, without its
    /// enhancement.
    pub fn duplicate_unit(&mut self, source: InstanceId) -> Result<InstanceId, RosterError> {
        let original = self.unit(source)?.clone();
        self.check_quantity(&original.template)?;

        let id = self.roster.allocate_id();
        self.roster.units.push(UnitInstance::duplicate_of(id, &original));
        tracing::debug!(unit = %id, source = %source, "unit duplicated");
        Ok(id)
    }

    /// Removes an entry, releasing its enhancement. Absent ids are ignored.
    pub fn remove_unit(&mut self, instance: InstanceId) {
        let before = self.roster.units.len();
        self.roster.units.retain(|u| u.id != instance);
        if self.roster.units.len() == before {
            return;
        }
        if self.roster.selected == Some(instance) {
            self.roster.selected = None;
        }
        tracing::debug!(unit = %instance, "unit removed");
    }

    /// Switches an entry to another loadout, clearing its sub-selections.
    pub fn set_loadout(&mut self, instance: InstanceId, loadout_id: &str) -> Result<(), RosterError> {
        let unit = self.unit(instance)?;
        if unit.template.loadout(loadout_id).is_none() {
            return Err(RosterError::UnknownLoadout {
                template_id: unit.template_id().to_string(),
                loadout_id: loadout_id.to_string(),
            });
        }

        if let Some(unit) = self.roster.unit_mut(instance) {
            unit.wargear = WargearSelection::loadout(loadout_id);
        }
        tracing::debug!(unit = %instance, loadout = loadout_id, "loadout set");
        Ok(())
    }

    /// Records one sub-option choice. Ignored when `loadout_id` is not the
    /// entry's active loadout, or when the sub-option or choice does not
    /// exist on it.
    pub fn set_sub_selection(
        &mut self,
        instance: InstanceId,
        loadout_id: &str,
        sub_option_id: &str,
        choice_id: &str,
    ) -> Result<(), RosterError> {
        let unit = self.unit(instance)?;
        if unit.wargear.loadout_id.as_deref() != Some(loadout_id) {
            tracing::debug!(unit = %instance, loadout = loadout_id, "stale sub-selection ignored");
            return Ok(());
        }
        let known = unit
            .template
            .loadout(loadout_id)
            .and_then(|l| l.sub_option(sub_option_id))
            .and_then(|s| s.choice(choice_id))
            .is_some();
        if !known {
            tracing::debug!(
                unit = %instance,
                sub_option = sub_option_id,
                choice = choice_id,
                "unknown sub-selection ignored"
            );
            return Ok(());
        }

        if let Some(unit) = self.roster.unit_mut(instance) {
            unit.wargear
                .sub_selections
                .insert(sub_option_id.to_string(), choice_id.to_string());
        }
        tracing::debug!(unit = %instance, sub_option = sub_option_id, choice = choice_id, "sub-selection set");
        Ok(())
    }

    /// Sets the model count, which must match one of the template's point
    /// tiers. `None` restores the default.
    pub fn set_model_count(&mut self, instance: InstanceId, models: Option<u32>) -> Result<(), RosterError> {
        let unit = self.unit(instance)?;
        if let Some(n) = models {
            if unit.template.tier_for_models(n).is_none() {
                return Err(RosterError::UnknownModelCount {
                    template_id: unit.template_id().to_string(),
                    models: n,
                });
            }
        }

        if let Some(unit) = self.roster.unit_mut(instance) {
            unit.model_count = models;
        }
        tracing::debug!(unit = %instance, models = ?models, "model count set");
        Ok(())
    }

    /// Assigns an enhancement, or clears it with `None`.
    pub fn assign_enhancement(
        &mut self,
        instance: InstanceId,
        enhancement_id: Option<&str>,
    ) -> Result<(), RosterError> {
        let unit = self.unit(instance)?;
        if let Some(id) = enhancement_id {
            let enhancement = self
                .catalog
                .enhancement(id)
                .ok_or_else(|| RosterError::UnknownEnhancement(id.to_string()))?;
            if let Err(err) = check_enhancement(&self.catalog, &self.roster, unit, enhancement) {
                tracing::debug!(unit = %instance, enhancement = id, error = %err, "enhancement rejected");
                return Err(err);
            }
        }

        if let Some(unit) = self.roster.unit_mut(instance) {
            unit.enhancement = enhancement_id.map(str::to_string);
        }
        tracing::debug!(unit = %instance, enhancement = ?enhancement_id, "enhancement set");
        Ok(())
    }

    /// Chooses the entry shown in the detail view.
    pub fn select_unit(&mut self, instance: Option<InstanceId>) -> Result<(), RosterError> {
        if let Some(id) = instance {
            self.unit(id)?;
        }
        self.roster.selected = instance;
        Ok(())
    }

    fn unit(&self, instance: InstanceId) -> Result<&UnitInstance, RosterError> {
        self.roster
            .unit(instance)
            .ok_or(RosterError::UnknownInstance(instance))
    }

    fn check_quantity(&self, template: &UnitTemplate) -> Result<(), RosterError> {
        if is_add_allowed(&self.roster, template) {
            return Ok(());
        }
        let limit = quantity_limit_for(Some(template.role));
        tracing::debug!(template = %template.id, limit, "quantity limit reached");
        Err(RosterError::QuantityLimitExceeded {
            template_id: template.id.clone(),
            limit,
        })
    }

    /// Clears every enhancement that fails re-validation against the current
    /// roster. Returns how many were released.
    fn prune_enhancements(&mut self) -> usize {
        let invalid: Vec<InstanceId> = self
            .roster
            .units
            .iter()
            .filter(|unit| {
                let Some(id) = unit.enhancement.as_deref() else {
                    return false;
                };
                match self.catalog.enhancement(id) {
                    Some(e) => check_enhancement(&self.catalog, &self.roster, unit, e).is_err(),
                    None => true,
                }
            })
            .map(|unit| unit.id)
            .collect();

        for id in &invalid {
            if let Some(unit) = self.roster.unit_mut(*id) {
                unit.enhancement = None;
            }
        }
        invalid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Detachment, Enhancement, Faction, PointTier, Role, StatBlock, WargearChoice, WargearLoadout,
        WargearSubOption,
    };

    fn template(id: &str, role: Role, keywords: &[&str]) -> UnitTemplate {
        UnitTemplate {
            id: id.into(),
            name: id.into(),
            role,
            stats: StatBlock::default(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            faction_keywords: Vec::new(),
            faction_id: None,
            point_tiers: vec![
                PointTier { models: Some(5), cost: Some(100) },
                PointTier { models: Some(10), cost: Some(200) },
            ],
            weapon_ids: Vec::new(),
            loadouts: vec![
                WargearLoadout {
                    id: "standard".into(),
                    description: String::new(),
                    default_weapons: Vec::new(),
                    sub_options: vec![WargearSubOption {
                        id: "helmet".into(),
                        description: String::new(),
                        choices: vec![WargearChoice {
                            id: Some("auspex".into()),
                            item_id: "bolt_rifle".into(),
                            stat_overrides: None,
                        }],
                    }],
                },
                WargearLoadout {
                    id: "heavy".into(),
                    description: String::new(),
                    default_weapons: Vec::new(),
                    sub_options: Vec::new(),
                },
            ],
        }
    }

    fn engine() -> RosterEngine {
        let catalog = Catalog::new(
            vec![
                template("captain", Role::Character, &["CHARACTER", "INFANTRY"]),
                template("calgar", Role::EpicHero, &["CHARACTER", "EPIC HERO"]),
            ],
            Vec::new(),
            vec![Enhancement {
                id: "artificer_armour".into(),
                name: "Artificer Armour".into(),
                cost: Some(10),
                detachment_id: "gladius".into(),
                prerequisites: Vec::new(),
                rule: String::new(),
            }],
            vec![Faction {
                id: "ultramarines".into(),
                name: "Ultramarines".into(),
                rules: Vec::new(),
                keyword_rules: Vec::new(),
            }],
            vec![Detachment {
                id: "gladius".into(),
                name: "Gladius Task Force".into(),
                allowed_factions: vec!["ultramarines".into()],
                rules: Vec::new(),
            }],
        );
        RosterEngine::new(Arc::new(catalog))
    }

    #[test]
    fn unknown_ids_are_rejected_without_change() {
        let mut engine = engine();
        assert_eq!(engine.add_unit("nope"), Err(RosterError::UnknownTemplate("nope".into())));
        assert_eq!(
            engine.select_faction(Some("orks")),
            Err(RosterError::UnknownFaction("orks".into()))
        );
        assert_eq!(
            engine.set_loadout(InstanceId(4), "standard"),
            Err(RosterError::UnknownInstance(InstanceId(4)))
        );
        assert_eq!(engine.roster(), &Roster::new());
    }

    #[test]
    fn detachment_requires_allowed_faction() {
        let mut engine = engine();
        let err = engine.select_detachment(Some("gladius"));
        assert!(matches!(err, Err(RosterError::InvalidSelection { .. })));
        engine.select_faction(Some("ultramarines")).unwrap();
        engine.select_detachment(Some("gladius")).unwrap();
        assert_eq!(engine.roster().detachment.as_deref(), Some("gladius"));
        assert!(engine.select_detachment(Some("unknown")).is_err());
        assert_eq!(engine.roster().detachment.as_deref(), Some("gladius"));
        engine.select_detachment(None).unwrap();
        assert!(engine.roster().detachment.is_none());
    }

    #[test]
    fn loadout_change_clears_sub_selections() {
        let mut engine = engine();
        let id = engine.add_unit("captain").unwrap();
        engine.set_sub_selection(id, "standard", "helmet", "auspex").unwrap();
        assert_eq!(engine.roster().unit(id).unwrap().wargear.choice_for("helmet"), Some("auspex"));

        engine.set_loadout(id, "heavy").unwrap();
        let wargear = &engine.roster().unit(id).unwrap().wargear;
        assert_eq!(wargear.loadout_id.as_deref(), Some("heavy"));
        assert!(wargear.sub_selections.is_empty());

        let err = engine.set_loadout(id, "missing");
        assert!(matches!(err, Err(RosterError::UnknownLoadout { .. })));
    }

    #[test]
    fn stale_or_unknown_sub_selections_are_ignored() {
        let mut engine = engine();
        let id = engine.add_unit("captain").unwrap();
        engine.set_sub_selection(id, "heavy", "helmet", "auspex").unwrap();
        engine.set_sub_selection(id, "standard", "helmet", "nothing").unwrap();
        engine.set_sub_selection(id, "standard", "backpack", "auspex").unwrap();
        assert!(engine.roster().unit(id).unwrap().wargear.sub_selections.is_empty());
    }

    #[test]
    fn model_count_must_match_a_tier() {
        let mut engine = engine();
        let id = engine.add_unit("captain").unwrap();
        engine.set_model_count(id, Some(10)).unwrap();
        assert_eq!(engine.roster().unit(id).unwrap().model_count, Some(10));
        let err = engine.set_model_count(id, Some(7));
        assert!(matches!(err, Err(RosterError::UnknownModelCount { models: 7, .. })));
        assert_eq!(engine.roster().unit(id).unwrap().model_count, Some(10));
    }

    #[test]
    fn duplicate_copies_wargear_but_not_enhancement() {
        let mut engine = engine();
        engine.select_faction(Some("ultramarines")).unwrap();
        engine.select_detachment(Some("gladius")).unwrap();
        let id = engine.add_unit("captain").unwrap();
        engine.set_sub_selection(id, "standard", "helmet", "auspex").unwrap();
        engine.assign_enhancement(id, Some("artificer_armour")).unwrap();

        let copy = engine.duplicate_unit(id).unwrap();
        let copied = engine.roster().unit(copy).unwrap();
        assert_eq!(copied.wargear, engine.roster().unit(id).unwrap().wargear);
        assert!(copied.enhancement.is_none());
        assert_eq!(engine.roster().count_assigned_enhancements(), 1);
    }

    #[test]
    fn epic_hero_cannot_take_enhancements() {
        let mut engine = engine();
        engine.select_faction(Some("ultramarines")).unwrap();
        engine.select_detachment(Some("gladius")).unwrap();
        let id = engine.add_unit("calgar").unwrap();
        let err = engine.assign_enhancement(id, Some("artificer_armour"));
        assert_eq!(err, Err(RosterError::NotEligible { instance: id }));
    }

    #[test]
    fn faction_change_releases_enhancements() {
        let mut engine = engine();
        engine.select_faction(Some("ultramarines")).unwrap();
        engine.select_detachment(Some("gladius")).unwrap();
        let id = engine.add_unit("captain").unwrap();
        engine.assign_enhancement(id, Some("artificer_armour")).unwrap();

        engine.select_faction(Some("ultramarines")).unwrap();
        assert!(engine.roster().detachment.is_none());
        assert_eq!(engine.roster().count_assigned_enhancements(), 0);
    }

    #[test]
    fn remove_clears_selection_and_ignores_absent() {
        let mut engine = engine();
        let id = engine.add_unit("captain").unwrap();
        engine.select_unit(Some(id)).unwrap();
        engine.remove_unit(InstanceId(99));
        assert_eq!(engine.roster().selected, Some(id));
        engine.remove_unit(id);
        assert!(engine.roster().is_empty());
        assert!(engine.roster().selected.is_none());
        assert!(engine.select_unit(Some(id)).is_err());
    }
}
