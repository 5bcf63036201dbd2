//! Master configuration via `masterdb.toml`
//!
//! A default `masterdb.toml` is written on first use. To change settings,
//! edit the file and reopen the master.

use masterdb_core::{MasterError, MasterResult, ID_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed next to the data the master serves.
pub const CONFIG_FILE_NAME: &str = "masterdb.toml";

/// Master configuration loaded from `masterdb.toml`.
///
/// # Example
///
/// ```toml
/// scheme = "DbExg"
/// history_page_size = 20
/// max_replacements = 10000
/// verify_commits = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Scheme used for object ids generated by `add`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Page size for history requests that do not set one.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
    /// Largest replacement list a single splice accepts.
    #[serde(default = "default_max_replacements")]
    pub max_replacements: usize,
    /// Re-read and check the active slice after every commit.
    #[serde(default = "default_verify_commits")]
    pub verify_commits: bool,
}

fn default_scheme() -> String {
    "DbDoc".to_string()
}

fn default_history_page_size() -> usize {
    20
}

fn default_max_replacements() -> usize {
    10_000
}

fn default_verify_commits() -> bool {
    true
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            history_page_size: default_history_page_size(),
            max_replacements: default_max_replacements(),
            verify_commits: default_verify_commits(),
        }
    }
}

impl MasterConfig {
    /// Config using `scheme` for generated ids, defaults otherwise.
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..Self::default()
        }
    }

    /// Check every value.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first invalid field.
    pub fn validate(&self) -> MasterResult<()> {
        if self.scheme.is_empty() {
            return Err(MasterError::config("scheme must not be empty"));
        }
        if self.scheme.contains(ID_SEPARATOR) {
            return Err(MasterError::config(format!(
                "scheme '{}' must not contain '{}'",
                self.scheme, ID_SEPARATOR
            )));
        }
        if self.history_page_size == 0 {
            return Err(MasterError::config("history_page_size must be positive"));
        }
        if self.max_replacements == 0 {
            return Err(MasterError::config("max_replacements must be positive"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# MasterDB configuration
#
# Scheme for object ids generated on add, rendered as "<scheme>~<value>".
# Must not contain '~'.
scheme = "DbDoc"

# Page size used when a history request does not set one (default: 20)
history_page_size = 20

# Largest number of replacements accepted by one splice (default: 10000)
max_replacements = 10000

# Re-read the active slice after every commit and check that it still
# partitions version time (default: true)
verify_commits = true
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> MasterResult<Self> {
        let config: MasterConfig = toml::from_str(content)
            .map_err(|e| MasterError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> MasterResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MasterError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            MasterError::Config(message) => {
                MasterError::config(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> MasterResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                MasterError::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> MasterResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MasterError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            MasterError::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
