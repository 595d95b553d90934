//! Layered runtime settings.
//!
//! Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `LOOTWATCH_*` environment variables, e.g. `LOOTWATCH_CATALOG_CAPACITY=64`

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::data::aggregate::DEFAULT_MAX_KEYS;

/// Defaults applied to the CLI subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Data lines of the event log to skip before aggregating.
    pub start_line: u64,
    /// Records kept by the catalog loader; `0` selects its default.
    pub catalog_capacity: usize,
    /// Distinct keys tracked per category by the aggregator.
    pub max_keys: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_line: 0,
            catalog_capacity: 0,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }
}

impl Settings {
    /// Build settings from defaults, an optional file, and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, environment())
    }

    fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("start_line", defaults.start_line)?
            .set_default("catalog_capacity", defaults.catalog_capacity as u64)?
            .set_default("max_keys", defaults.max_keys as u64)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder.add_source(env).build()?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("LOOTWATCH").try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_keys, DEFAULT_MAX_KEYS);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "start_line = 120\ncatalog_capacity = 32").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.start_line, 120);
        assert_eq!(settings.catalog_capacity, 32);
        assert_eq!(settings.max_keys, DEFAULT_MAX_KEYS);
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings =
            Settings::load_with_env(None, env(&[("LOOTWATCH_CATALOG_CAPACITY", "64")])).unwrap();
        assert_eq!(settings.catalog_capacity, 64);
        assert_eq!(settings.start_line, 0);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "start_line = 120\nmax_keys = 100").unwrap();

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[("LOOTWATCH_START_LINE", "5"), ("OTHER_MAX_KEYS", "1")]),
        )
        .unwrap();
        assert_eq!(settings.start_line, 5);
        assert_eq!(settings.max_keys, 100);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/lootwatch.toml"))).is_err());
    }
}
