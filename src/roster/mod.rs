//! Roster state and the engine that mutates it.

pub mod engine;
pub mod error;
pub mod instance;
pub mod state;

pub use engine::RosterEngine;
pub use error::RosterError;
pub use instance::{InstanceId, UnitInstance, WargearSelection};
pub use state::Roster;
