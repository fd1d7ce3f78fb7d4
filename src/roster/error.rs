//! Errors returned by roster engine operations.
//!
//! Every variant is a recoverable, caller-facing rejection. An operation that
//! returns one of these has left the roster unchanged.

use super::instance::InstanceId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("'{template_id}' is limited to {limit} per roster")]
    QuantityLimitExceeded { template_id: String, limit: usize },

    #[error("loadout '{loadout_id}' does not belong to '{template_id}'")]
    UnknownLoadout { template_id: String, loadout_id: String },

    #[error("{instance} cannot take enhancements")]
    NotEligible { instance: InstanceId },

    #[error("enhancement '{enhancement_id}' is already held by {holder}")]
    AlreadyAssigned { enhancement_id: String, holder: InstanceId },

    #[error("{instance} lacks keywords required by '{enhancement_id}': {missing:?}")]
    PrerequisiteNotMet {
        instance: InstanceId,
        enhancement_id: String,
        missing: Vec<String>,
    },

    #[error("enhancement '{enhancement_id}' belongs to detachment '{detachment_id}', not the active one")]
    WrongDetachment { enhancement_id: String, detachment_id: String },

    #[error("detachment '{detachment_id}' is not available to the active faction")]
    InvalidSelection { detachment_id: String },

    #[error("no unit {0} in the roster")]
    UnknownInstance(InstanceId),

    #[error("no unit template '{0}' in the catalog")]
    UnknownTemplate(String),

    #[error("no enhancement '{0}' in the catalog")]
    UnknownEnhancement(String),

    #[error("no faction '{0}' in the catalog")]
    UnknownFaction(String),

    #[error("'{template_id}' has no point tier for {models} models")]
    UnknownModelCount { template_id: String, models: u32 },
}
