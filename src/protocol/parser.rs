//! Roster command parser.
//!
//! Parses incoming command lines into structured `Command` variants that the
//! session loop can dispatch on.

use crate::catalog::{Role, RESERVED_ID};
use crate::roster::InstanceId;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select the army faction, or clear it with `none`.
    Faction { id: Option<String> },

    /// Select the detachment, or clear it with `none`.
    Detachment { id: Option<String> },

    /// Add a unit from a catalog template.
    Add { template: String },

    /// Copy an existing entry's configuration into a new entry.
    Duplicate { unit: InstanceId },

    Remove { unit: InstanceId },

    /// Switch an entry to another loadout.
    Loadout { unit: InstanceId, loadout: String },

    /// Pick one choice inside a loadout sub-option.
    Wargear {
        unit: InstanceId,
        loadout: String,
        sub_option: String,
        choice: String,
    },

    /// Set the model count, or restore the default with `default`.
    Models { unit: InstanceId, models: Option<u32> },

    /// Assign an enhancement, or clear it with `none`.
    Enhance { unit: InstanceId, enhancement: Option<String> },

    /// Choose the entry for the detail view, or clear it with `none`.
    Select { unit: Option<InstanceId> },

    /// Print every entry in display order.
    List,

    /// Print the catalog's templates, optionally only those with one role.
    Units { role: Option<Role> },

    /// Print one entry's details; defaults to the selected entry.
    Show { unit: Option<InstanceId> },

    /// Print army selections, composition, total cost and problems.
    Status,

    /// Terminate the session.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&name, args) = tokens.split_first()?;

    match name {
        "faction" => {
            let id = single_arg(name, args)?;
            Some(Command::Faction { id: optional(id) })
        }
        "detachment" => {
            let id = single_arg(name, args)?;
            Some(Command::Detachment { id: optional(id) })
        }
        "add" => {
            let template = single_arg(name, args)?;
            Some(Command::Add { template: template.to_string() })
        }
        "dup" => {
            let unit = instance_arg(name, single_arg(name, args)?)?;
            Some(Command::Duplicate { unit })
        }
        "remove" => {
            let unit = instance_arg(name, single_arg(name, args)?)?;
            Some(Command::Remove { unit })
        }
        "loadout" => parse_loadout(args),
        "wargear" => parse_wargear(args),
        "models" => parse_models(args),
        "enhance" => parse_enhance(args),
        "select" => {
            let arg = single_arg(name, args)?;
            let unit = match optional(arg) {
                None => None,
                Some(_) => Some(instance_arg(name, arg)?),
            };
            Some(Command::Select { unit })
        }
        "list" => Some(Command::List),
        "units" => parse_units(args),
        "show" => match args {
            [] => Some(Command::Show { unit: None }),
            [arg] => Some(Command::Show { unit: Some(instance_arg(name, arg)?) }),
            _ => malformed(name, "show [<#>]"),
        },
        "status" => Some(Command::Status),
        "quit" => Some(Command::Quit),

        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `loadout <#> <loadout>`.
fn parse_loadout(args: &[&str]) -> Option<Command> {
    let [unit, loadout] = args else {
        return malformed("loadout", "loadout <#> <loadout>");
    };
    Some(Command::Loadout {
        unit: instance_arg("loadout", unit)?,
        loadout: loadout.to_string(),
    })
}

/// Parses `wargear <#> <loadout> <sub-option> <choice>`.
fn parse_wargear(args: &[&str]) -> Option<Command> {
    let [unit, loadout, sub_option, choice] = args else {
        return malformed("wargear", "wargear <#> <loadout> <sub-option> <choice>");
    };
    Some(Command::Wargear {
        unit: instance_arg("wargear", unit)?,
        loadout: loadout.to_string(),
        sub_option: sub_option.to_string(),
        choice: choice.to_string(),
    })
}

/// Parses `models <#> <n|default>`.
fn parse_models(args: &[&str]) -> Option<Command> {
    let [unit, count] = args else {
        return malformed("models", "models <#> <n|default>");
    };
    let unit = instance_arg("models", unit)?;
    let models = match *count {
        "default" => None,
        n => match n.parse::<u32>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(value = n, "invalid model count");
                return None;
            }
        },
    };
    Some(Command::Models { unit, models })
}

/// Parses `units [role]`. Role labels may contain spaces (`units epic hero`).
fn parse_units(args: &[&str]) -> Option<Command> {
    if args.is_empty() {
        return Some(Command::Units { role: None });
    }
    let label = args.join(" ");
    match Role::from_label(&label) {
        Some(role) => Some(Command::Units { role: Some(role) }),
        None => {
            tracing::warn!(value = %label, "unknown role");
            None
        }
    }
}

/// Parses `enhance <#> <id|none>`.
fn parse_enhance(args: &[&str]) -> Option<Command> {
    let [unit, enhancement] = args else {
        return malformed("enhance", "enhance <#> <id|none>");
    };
    Some(Command::Enhance {
        unit: instance_arg("enhance", unit)?,
        enhancement: optional(enhancement),
    })
}

fn single_arg<'a>(command: &str, args: &[&'a str]) -> Option<&'a str> {
    match args {
        [arg] => Some(*arg),
        _ => malformed(command, "exactly one argument"),
    }
}

fn instance_arg(command: &str, arg: &str) -> Option<InstanceId> {
    let id = InstanceId::parse(arg);
    if id.is_none() {
        tracing::warn!(command, value = arg, "invalid unit id");
    }
    id
}

/// Maps the literal `none` to `None`. The loader refuses catalogs that use
/// it as a faction, detachment, or enhancement id.
fn optional(arg: &str) -> Option<String> {
    (arg != RESERVED_ID).then(|| arg.to_string())
}

fn malformed<T>(command: &str, usage: &str) -> Option<T> {
    tracing::warn!(command, usage, "malformed command");
    None
}
