//! Roster entries.
//!
//! A `UnitInstance` is one entry in the army list. It shares its template
//! immutably and owns only the state that varies per entry: id, wargear
//! selection, model count, and enhancement.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::catalog::UnitTemplate;

/// Roster-wide unique id of an entry. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl InstanceId {
    /// Parses `#7` or `7`.
    pub fn parse(s: &str) -> Option<InstanceId> {
        s.strip_prefix('#').unwrap_or(s).parse().ok().map(InstanceId)
    }
}

/// The active loadout and the choice made in each of its sub-options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WargearSelection {
    pub loadout_id: Option<String>,
    /// Sub-option id -> choice id. Keys always belong to `loadout_id`.
    pub sub_selections: BTreeMap<String, String>,
}

impl WargearSelection {
    /// A selection of `loadout_id` with nothing chosen in its sub-options.
    pub fn loadout(loadout_id: impl Into<String>) -> Self {
        WargearSelection {
            loadout_id: Some(loadout_id.into()),
            sub_selections: BTreeMap::new(),
        }
    }

    /// Returns the choice made for a sub-option, if any.
    pub fn choice_for(&self, sub_option_id: &str) -> Option<&str> {
        self.sub_selections.get(sub_option_id).map(String::as_str)
    }
}

/// One entry in the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInstance {
    pub id: InstanceId,
    pub template: Arc<UnitTemplate>,
    pub wargear: WargearSelection,
    /// Configured model count, selecting a point tier. `None` uses the first tier.
    pub model_count: Option<u32>,
    pub enhancement: Option<String>,
}

impl UnitInstance {
    /// Instantiates a fresh entry: first loadout with empty sub-selections,
    /// default model count, no enhancement.
    pub fn from_template(id: InstanceId, template: Arc<UnitTemplate>) -> Self {
        let wargear = template
            .default_loadout()
            .map(|l| WargearSelection::loadout(l.id.clone()))
            .unwrap_or_default();
        UnitInstance {
            id,
            template,
            wargear,
            model_count: None,
            enhancement: None,
        }
    }

    /// Copies another entry's configuration under a new id. The enhancement
    /// is never carried over.
    pub fn duplicate_of(id: InstanceId, source: &UnitInstance) -> Self {
        UnitInstance {
            id,
            template: Arc::clone(&source.template),
            wargear: source.wargear.clone(),
            model_count: source.model_count,
            enhancement: None,
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template.id
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }
}
