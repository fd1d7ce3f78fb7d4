//! armylist roster engine library.
//!
//! Exposes the catalog tables, the roster engine, the derived rule views, and
//! the line protocol for use by integration tests and the binary entry point.

pub mod catalog;
pub mod config;
pub mod protocol;
pub mod roster;
pub mod rules;
pub mod session;
