//! Startup configuration for the `armylist` binary.

use std::path::PathBuf;

pub const CATALOG_ENV: &str = "ARMYLIST_CATALOG";
pub const LOG_ENV: &str = "ARMYLIST_LOG";
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
pub const DEFAULT_LOG_FILTER: &str = "armylist=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    /// Fallback filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Config {
    /// Resolves configuration from process arguments and environment.
    pub fn from_env() -> Self {
        Config::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Resolves configuration from explicit arguments (program name already
    /// stripped) and an environment lookup.
    ///
    /// The catalog path is the first argument, else `ARMYLIST_CATALOG`, else
    /// `data/catalog.json`.
    pub fn resolve<I, F>(args: I, env: F) -> Self
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let catalog_path = args
            .into_iter()
            .next()
            .or_else(|| env(CATALOG_ENV))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string());
        let log_filter = env(LOG_ENV)
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Config {
            catalog_path: PathBuf::from(catalog_path),
            log_filter,
        }
    }
}
