//! Session state management.
//!
//! Wraps a roster engine and turns parsed commands into replies. Every
//! mutating command answers `ok ...` or `error <message>`; view commands
//! print their lines and finish with `ok`.

use std::io::{self, Write};
use std::sync::Arc;

use crate::catalog::{Catalog, Role, UnitTemplate};
use crate::protocol::Command;
use crate::roster::{InstanceId, RosterEngine, RosterError, UnitInstance};
use crate::rules::{
    army_rules, army_stratagems, audit, available_detachments, available_enhancements,
    core_stratagems, is_faction_compatible, is_stratagem_usable, roles_summary, sorted_units,
    total_cost, unit_cost, unit_keywords, weapon_tables, ResolvedWeapon,
};

pub struct Session {
    engine: RosterEngine,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Session {
            engine: RosterEngine::new(catalog),
        }
    }

    pub fn engine(&self) -> &RosterEngine {
        &self.engine
    }

    /// Executes one command and writes its reply. `Quit` is handled by the
    /// caller and writes nothing here.
    pub fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        match command {
            Command::Faction { id } => {
                let result = self.engine.select_faction(id.as_deref());
                reply(out, result.map(|()| format!("faction {}", id.as_deref().unwrap_or("none"))))?;
            }
            Command::Detachment { id } => {
                let result = self.engine.select_detachment(id.as_deref());
                reply(out, result.map(|()| format!("detachment {}", id.as_deref().unwrap_or("none"))))?;
            }
            Command::Add { template } => {
                let result = self.engine.add_unit(&template);
                reply(out, result.map(|id| id.to_string()))?;
            }
            Command::Duplicate { unit } => {
                let result = self.engine.duplicate_unit(unit);
                reply(out, result.map(|id| id.to_string()))?;
            }
            Command::Remove { unit } => {
                self.engine.remove_unit(unit);
                writeln!(out, "ok")?;
            }
            Command::Loadout { unit, loadout } => {
                let result = self.engine.set_loadout(unit, &loadout);
                reply(out, result.map(|()| String::new()))?;
            }
            Command::Wargear { unit, loadout, sub_option, choice } => {
                let result = self.engine.set_sub_selection(unit, &loadout, &sub_option, &choice);
                reply(out, result.map(|()| String::new()))?;
            }
            Command::Models { unit, models } => {
                let result = self.engine.set_model_count(unit, models);
                reply(out, result.map(|()| String::new()))?;
            }
            Command::Enhance { unit, enhancement } => {
                let result = self.engine.assign_enhancement(unit, enhancement.as_deref());
                reply(out, result.map(|()| String::new()))?;
            }
            Command::Select { unit } => {
                let result = self.engine.select_unit(unit);
                reply(out, result.map(|()| String::new()))?;
            }
            Command::List => self.write_list(out)?,
            Command::Units { role } => self.write_templates(role, out)?,
            Command::Show { unit } => {
                let target = unit.or(self.engine.roster().selected);
                match target {
                    Some(id) => self.write_unit(id, out)?,
                    None => writeln!(out, "error no unit selected")?,
                }
            }
            Command::Status => self.write_status(out)?,
            Command::Quit => {}
        }
        out.flush()
    }

    fn write_list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let catalog = self.engine.catalog();
        let roster = self.engine.roster();
        for unit in sorted_units(roster) {
            write!(out, "unit {} {} {}", unit.id, unit.template_id(), unit_cost(catalog, unit))?;
            if let Some(enhancement) = &unit.enhancement {
                write!(out, " +{}", enhancement)?;
            }
            writeln!(out, " {}", unit.template.role)?;
        }
        writeln!(out, "ok {} units", roster.len())
    }

    /// Template picker lines. Templates locked to another faction are marked
    /// `!faction`; the role comes last because labels may contain spaces.
    fn write_templates<W: Write>(&self, role: Option<Role>, out: &mut W) -> io::Result<()> {
        let catalog = self.engine.catalog();
        let faction = self.engine.roster().faction.as_deref();
        let templates: Vec<&UnitTemplate> = match role {
            Some(role) => catalog.units_with_role(role).collect(),
            None => catalog.units().iter().map(|u| u.as_ref()).collect(),
        };
        for template in &templates {
            write!(out, "template {} {}", template.id, template.display_cost())?;
            if !is_faction_compatible(template, faction) {
                write!(out, " !faction")?;
            }
            writeln!(out, " {}", template.role)?;
        }
        writeln!(out, "ok {} templates", templates.len())
    }

    fn write_unit<W: Write>(&self, id: InstanceId, out: &mut W) -> io::Result<()> {
        let catalog = self.engine.catalog();
        let roster = self.engine.roster();
        let Some(unit) = roster.unit(id) else {
            return writeln!(out, "error {}", RosterError::UnknownInstance(id));
        };

        writeln!(out, "unit {} {} {}", unit.id, unit.template_id(), unit.name())?;
        writeln!(out, "role {}", unit.template.role.label())?;
        write_wargear(unit, out)?;

        let keywords = unit_keywords(catalog, roster, unit);
        let listed: Vec<&str> = keywords.iter().map(String::as_str).collect();
        writeln!(out, "keywords {}", listed.join(", "))?;

        let tables = weapon_tables(catalog, unit);
        for weapon in &tables.ranged {
            write_weapon("ranged", weapon, out)?;
        }
        for weapon in &tables.melee {
            write_weapon("melee", weapon, out)?;
        }

        writeln!(out, "enhancement {}", unit.enhancement.as_deref().unwrap_or("none"))?;
        let open: Vec<&str> = available_enhancements(catalog, roster, id)
            .iter()
            .filter(|e| unit.enhancement.as_deref() != Some(e.id.as_str()))
            .map(|e| e.id.as_str())
            .collect();
        if !open.is_empty() {
            writeln!(out, "available {}", open.join(" "))?;
        }

        let usable: Vec<&str> = army_stratagems(catalog, roster)
            .into_iter()
            .filter(|s| is_stratagem_usable(s, &keywords))
            .map(|s| s.id.as_str())
            .collect();
        if !usable.is_empty() {
            writeln!(out, "stratagems {}", usable.join(" "))?;
        }
        let core: Vec<&str> = core_stratagems(catalog)
            .into_iter()
            .filter(|s| is_stratagem_usable(s, &keywords))
            .map(|s| s.id.as_str())
            .collect();
        if !core.is_empty() {
            writeln!(out, "core {}", core.join(" "))?;
        }

        writeln!(out, "cost {}", unit_cost(catalog, unit))?;
        writeln!(out, "ok")
    }

    fn write_status<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let catalog = self.engine.catalog();
        let roster = self.engine.roster();

        writeln!(out, "faction {}", roster.faction.as_deref().unwrap_or("none"))?;
        writeln!(out, "detachment {}", roster.detachment.as_deref().unwrap_or("none"))?;
        let detachments: Vec<&str> = available_detachments(catalog, roster.faction.as_deref())
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        if !detachments.is_empty() {
            writeln!(out, "detachments {}", detachments.join(" "))?;
        }

        let roles: Vec<String> = roles_summary(roster)
            .into_iter()
            .map(|(role, count)| format!("{}={}", role, count))
            .collect();
        if roles.is_empty() {
            writeln!(out, "roles none")?;
        } else {
            writeln!(out, "roles {}", roles.join(", "))?;
        }

        for rule in army_rules(catalog, roster) {
            writeln!(out, "rule {}", rule.name)?;
        }
        for violation in audit(catalog, roster) {
            writeln!(out, "violation {}", violation)?;
        }
        writeln!(out, "total {}", total_cost(catalog, roster))?;
        writeln!(out, "ok")
    }
}

fn reply<W: Write>(out: &mut W, result: Result<String, RosterError>) -> io::Result<()> {
    match result {
        Ok(detail) if detail.is_empty() => writeln!(out, "ok"),
        Ok(detail) => writeln!(out, "ok {}", detail),
        Err(err) => writeln!(out, "error {}", err),
    }
}

fn write_wargear<W: Write>(unit: &UnitInstance, out: &mut W) -> io::Result<()> {
    writeln!(out, "loadout {}", unit.wargear.loadout_id.as_deref().unwrap_or("none"))?;
    for (sub_option, choice) in &unit.wargear.sub_selections {
        writeln!(out, "choice {} {}", sub_option, choice)?;
    }
    match unit.model_count {
        Some(n) => writeln!(out, "models {}", n),
        None => writeln!(out, "models default"),
    }
}

fn write_weapon<W: Write>(kind: &str, weapon: &ResolvedWeapon, out: &mut W) -> io::Result<()> {
    let stats = &weapon.stats;
    let name = match &weapon.mode {
        Some(mode) => format!("{} ({})", weapon.name, mode),
        None => weapon.name.clone(),
    };
    writeln!(
        out,
        "{} {} | {} | A{} | {} | S{} | AP{} | D{}",
        kind, name, stats.range, stats.attacks, stats.skill, stats.strength, stats.ap, stats.damage
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog;
    use crate::protocol::parse_command;

    const CATALOG: &str = r#"{
        "units": {
            "characters": [
                {"id": "captain", "name": "Captain", "points": 75,
                 "keywords": ["INFANTRY", "CHARACTER"], "weapon_ids": ["bolt_pistol", "power_fist"]}
            ],
            "epichero": [
                {"id": "calgar", "name": "Marneus Calgar", "points": "200",
                 "keywords": ["INFANTRY", "CHARACTER", "EPIC HERO"], "chapter_id": "ultramarines"}
            ],
            "transports": [
                {"id": "rhino", "name": "Rhino", "points": 75, "keywords": ["VEHICLE", "TRANSPORT"]}
            ]
        },
        "stratagems": [
            {"id": "command_reroll", "name": "Command Re-roll", "cost": "1CP", "type": "Core", "scope": "core"},
            {"id": "tank_shock", "name": "Tank Shock", "cost": "1CP", "type": "Core", "scope": "core",
             "keyword_requirements": ["VEHICLE"]}
        ],
        "weapons": [
            {"id": "bolt_pistol", "name": "Bolt pistol", "range": "12\"", "A": "1", "BS": "2+", "S": "4", "AP": "0", "D": "1"},
            {"id": "power_fist", "name": "Power fist", "range": "Melee", "A": "5", "WS": "2+", "S": "8", "AP": "-2", "D": "2"}
        ],
        "enhancements": [
            {"id": "artificer_armour", "name": "Artificer Armour", "cost": 10, "detachment_id": "gladius"}
        ],
        "chapters": [{"id": "ultramarines", "name": "Ultramarines"}],
        "detachments": [{"id": "gladius", "name": "Gladius Task Force", "allowed_chapters": ["ultramarines"]}]
    }"#;

    fn run(session: &mut Session, line: &str) -> String {
        let mut out = Vec::new();
        let command = parse_command(line).unwrap();
        session.handle(command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn session() -> Session {
        Session::new(Arc::new(parse_catalog(CATALOG).unwrap()))
    }

    #[test]
    fn add_replies_with_new_id() {
        let mut session = session();
        assert_eq!(run(&mut session, "add captain"), "ok #1\n");
        assert_eq!(run(&mut session, "add captain"), "ok #2\n");
        assert_eq!(
            run(&mut session, "add dreadnought"),
            "error no unit template 'dreadnought' in the catalog\n"
        );
    }

    #[test]
    fn rejected_enhancement_reports_error() {
        let mut session = session();
        run(&mut session, "add captain");
        let reply = run(&mut session, "enhance #1 artificer_armour");
        assert!(reply.starts_with("error "), "{}", reply);
        assert!(session.engine().roster().units[0].enhancement.is_none());
    }

    #[test]
    fn show_prints_weapon_tables_and_cost() {
        let mut session = session();
        run(&mut session, "faction ultramarines");
        run(&mut session, "detachment gladius");
        run(&mut session, "add captain");
        run(&mut session, "enhance #1 artificer_armour");
        let reply = run(&mut session, "show #1");
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "unit #1 captain Captain");
        assert!(lines.contains(&"ranged Bolt pistol | 12\" | A1 | 2+ | S4 | AP0 | D1"));
        assert!(lines.contains(&"melee Power fist | Melee | A5 | 2+ | S8 | AP-2 | D2"));
        assert!(lines.contains(&"enhancement artificer_armour"));
        assert!(lines.contains(&"cost 85"));
        assert_eq!(lines.last(), Some(&"ok"));
    }

    #[test]
    fn show_without_selection_is_an_error() {
        let mut session = session();
        assert_eq!(run(&mut session, "show"), "error no unit selected\n");
        run(&mut session, "add captain");
        run(&mut session, "select #1");
        assert!(run(&mut session, "show").starts_with("unit #1"));
    }

    #[test]
    fn status_reports_totals_and_violations() {
        let mut session = session();
        let reply = run(&mut session, "status");
        assert!(reply.contains("violation army needs at least one CHARACTER\n"));
        assert!(reply.contains("total 0\n"));

        run(&mut session, "add captain");
        run(&mut session, "faction ultramarines");
        let reply = run(&mut session, "status");
        assert!(reply.contains("faction ultramarines\n"));
        assert!(reply.contains("detachments gladius\n"));
        assert!(reply.contains("roles Character=1\n"));
        assert!(!reply.contains("violation"));
        assert!(reply.ends_with("total 75\nok\n"));
    }

    #[test]
    fn units_lists_templates_and_marks_locked_ones() {
        let mut session = session();
        assert_eq!(
            run(&mut session, "units"),
            "template calgar 200 !faction Epic Hero\n\
             template captain 75 Character\n\
             template rhino 75 Transport\n\
             ok 3 templates\n"
        );

        run(&mut session, "faction ultramarines");
        assert_eq!(
            run(&mut session, "units epic hero"),
            "template calgar 200 Epic Hero\nok 1 templates\n"
        );
        assert_eq!(run(&mut session, "units Battleline"), "ok 0 templates\n");
    }

    #[test]
    fn show_lists_usable_core_stratagems() {
        let mut session = session();
        run(&mut session, "add captain");
        run(&mut session, "add rhino");
        let captain = run(&mut session, "show #1");
        assert!(captain.lines().any(|l| l == "core command_reroll"), "{}", captain);
        let rhino = run(&mut session, "show #2");
        assert!(rhino.lines().any(|l| l == "core command_reroll tank_shock"), "{}", rhino);
    }

    #[test]
    fn list_is_sorted_and_counted() {
        let mut session = session();
        run(&mut session, "add captain");
        run(&mut session, "dup #1");
        let reply = run(&mut session, "list");
        assert_eq!(
            reply,
            "unit #1 captain 75 Character\nunit #2 captain 75 Character\nok 2 units\n"
        );
    }
}
