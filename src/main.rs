//! armylist -- an army-list roster builder driven by a line protocol.
//!
//! This binary loads a catalog, then reads commands from stdin and writes
//! replies to stdout. Logs go to stderr.

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use armylist::catalog::load_catalog;
use armylist::config::Config;
use armylist::protocol::{parse_command, Command};
use armylist::session::Session;

/// Runs the main command loop, reading commands from stdin and writing
/// replies to stdout.
fn main() -> ExitCode {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let catalog = match load_catalog(&config.catalog_path) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "failed to load catalog");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        path = %config.catalog_path.display(),
        units = catalog.units().len(),
        "catalog loaded"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut session = Session::new(catalog);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        if cmd == Command::Quit {
            break;
        }

        if let Err(e) = session.handle(cmd, &mut out) {
            tracing::error!(error = %e, "failed to write reply");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
