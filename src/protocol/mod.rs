//! Line protocol handling.
//!
//! The binary reads one command per line from stdin and answers on stdout.
//! This module holds the command parser for that loop.

pub mod parser;

pub use parser::{parse_command, Command};
