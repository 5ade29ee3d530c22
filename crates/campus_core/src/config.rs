//! Environment-driven portal configuration.
//!
//! # Responsibility
//! - Read `CAMPUS_*` variables once at startup.
//! - Fall back to documented defaults for unset variables.
//!
//! # Invariants
//! - Unset variables never fail; malformed values always do.
//! - Parsing does not touch the filesystem.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::entity_repo::{MalformedDataPolicy, RepoOptions};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CAMPUS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CAMPUS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CAMPUS_LOG_DIR";
pub const ENV_SEED_DEMO: &str = "CAMPUS_SEED_DEMO";
pub const ENV_MALFORMED_DATA: &str = "CAMPUS_MALFORMED_DATA";

const IN_MEMORY_MARKER: &str = ":memory:";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} value `{}`; expected {}",
            self.key, self.value, self.expected
        )
    }
}

impl Error for ConfigError {}

/// Where portal data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Process-lifetime SQLite database.
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub storage: StorageLocation,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub seed_demo_data: bool,
    pub malformed_data: MalformedDataPolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            storage: StorageLocation::Memory,
            log_level: default_log_level(),
            log_dir: None,
            seed_demo_data: true,
            malformed_data: MalformedDataPolicy::default(),
        }
    }
}

impl PortalConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let storage = match var(ENV_DB_PATH) {
            None => defaults.storage,
            Some(value) if value == IN_MEMORY_MARKER => StorageLocation::Memory,
            Some(value) => StorageLocation::File(PathBuf::from(value)),
        };

        let log_level = match var(ENV_LOG_LEVEL) {
            None => defaults.log_level,
            Some(value) => normalize_level(&value).map_err(|_| ConfigError {
                key: ENV_LOG_LEVEL,
                value,
                expected: "trace|debug|info|warn|error",
            })?,
        };

        let seed_demo_data = match var(ENV_SEED_DEMO) {
            None => defaults.seed_demo_data,
            Some(value) => parse_flag(&value).ok_or(ConfigError {
                key: ENV_SEED_DEMO,
                value,
                expected: "true|false",
            })?,
        };

        let malformed_data = match var(ENV_MALFORMED_DATA) {
            None => defaults.malformed_data,
            Some(value) => MalformedDataPolicy::parse(&value).ok_or(ConfigError {
                key: ENV_MALFORMED_DATA,
                value,
                expected: "reject|regenerate",
            })?,
        };

        let config = Self {
            storage,
            log_level,
            log_dir: var(ENV_LOG_DIR).map(PathBuf::from),
            seed_demo_data,
            malformed_data,
        };
        if config.malformed_data == MalformedDataPolicy::RegenerateDemo {
            warn!(
                "event=config_load module=core status=ok malformed_data=regenerate note=stored_lists_may_be_replaced"
            );
        }
        info!(
            "event=config_load module=core status=ok storage={} seed_demo={} malformed_data={}",
            match &config.storage {
                StorageLocation::Memory => "memory",
                StorageLocation::File(_) => "file",
            },
            config.seed_demo_data,
            config.malformed_data.as_str()
        );
        Ok(config)
    }

    pub fn repo_options(&self) -> RepoOptions {
        RepoOptions {
            seed_demo_data: self.seed_demo_data,
            malformed_data: self.malformed_data,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{PortalConfig, StorageLocation, ENV_DB_PATH, ENV_MALFORMED_DATA, ENV_SEED_DEMO};
    use crate::repo::entity_repo::MalformedDataPolicy;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(vars: &[(&str, &str)]) -> Result<PortalConfig, super::ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PortalConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_variables_use_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.storage, StorageLocation::Memory);
        assert!(config.repo_options().seed_demo_data);
        assert_eq!(config.malformed_data, MalformedDataPolicy::Reject);
    }

    #[test]
    fn reads_storage_path_and_switches() {
        let config = load(&[
            (ENV_DB_PATH, "/var/lib/campus/portal.db"),
            ("CAMPUS_LOG_LEVEL", "WARNING"),
            (ENV_SEED_DEMO, "off"),
            (ENV_MALFORMED_DATA, "regenerate"),
        ])
        .unwrap();

        assert_eq!(
            config.storage,
            StorageLocation::File(PathBuf::from("/var/lib/campus/portal.db"))
        );
        assert_eq!(config.log_level, "warn");
        assert!(!config.seed_demo_data);
        assert_eq!(
            config.repo_options().malformed_data,
            MalformedDataPolicy::RegenerateDemo
        );
    }

    #[test]
    fn memory_marker_and_blank_values_mean_in_memory() {
        assert_eq!(
            load(&[(ENV_DB_PATH, ":memory:")]).unwrap().storage,
            StorageLocation::Memory
        );
        assert_eq!(
            load(&[(ENV_DB_PATH, "   ")]).unwrap().storage,
            StorageLocation::Memory
        );
    }

    #[test]
    fn malformed_values_are_rejected_with_the_variable_name() {
        let err = load(&[(ENV_SEED_DEMO, "maybe")]).unwrap_err();
        assert_eq!(err.key, ENV_SEED_DEMO);
        assert!(err.to_string().contains("maybe"));

        let err = load(&[(ENV_MALFORMED_DATA, "ignore")]).unwrap_err();
        assert_eq!(err.key, ENV_MALFORMED_DATA);
    }
}
