//! Roster snapshot.
//!
//! The full mutable state of an army list at a point in time: the entries in
//! insertion order, the faction and detachment selections, and the entry
//! chosen for the detail view. Derived views are computed from a `&Roster`
//! on demand and never stored here.

use super::instance::{InstanceId, UnitInstance};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub units: Vec<UnitInstance>,
    pub faction: Option<String>,
    pub detachment: Option<String>,
    pub selected: Option<InstanceId>,
    /// Next id to hand out. Only ever increases.
    pub(crate) next_id: u32,
}

impl Roster {
    /// Creates an empty roster with no selections.
    pub fn new() -> Self {
        Roster {
            units: Vec::new(),
            faction: None,
            detachment: None,
            selected: None,
            next_id: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Looks up an entry by id.
    pub fn unit(&self, id: InstanceId) -> Option<&UnitInstance> {
        self.units.iter().find(|u| u.id == id)
    }

    pub(crate) fn unit_mut(&mut self, id: InstanceId) -> Option<&mut UnitInstance> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Returns the entry holding an enhancement, if any.
    pub fn holder_of(&self, enhancement_id: &str) -> Option<&UnitInstance> {
        self.units
            .iter()
            .find(|u| u.enhancement.as_deref() == Some(enhancement_id))
    }

    /// Number of entries holding an enhancement.
    pub fn count_assigned_enhancements(&self) -> usize {
        self.units.iter().filter(|u| u.enhancement.is_some()).count()
    }

    /// The entry chosen for the detail view.
    pub fn selected_unit(&self) -> Option<&UnitInstance> {
        self.selected.and_then(|id| self.unit(id))
    }

    pub(crate) fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }
}
