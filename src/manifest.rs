//! Configuration file parsing for Lookout
//!
//! Parses `lookout.toml` configuration files using serde

use crate::error::{Error, Result};
use crate::probe::PingMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Load configuration from a file
pub fn load(path: &Path) -> Result<LookoutConfig> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config: LookoutConfig = toml::from_str(&content)?;

    config.keep_first_applications();
    config.validate()?;

    Ok(config)
}

/// Root configuration structure
#[derive(Debug, Deserialize)]
pub struct LookoutConfig {
    /// Global watcher settings
    #[serde(default)]
    pub watcher: WatcherSettings,

    /// Watched application definitions, in declaration order
    #[serde(default)]
    pub applications: Vec<ApplicationSpec>,
}

impl LookoutConfig {
    /// Drop applications whose name was already defined earlier in the file.
    ///
    /// Application names are unique; the first definition wins.
    fn keep_first_applications(&mut self) {
        let mut seen = HashSet::new();
        self.applications.retain(|app| {
            if seen.insert(app.name.clone()) {
                true
            } else {
                eprintln!(
                    "lookout warning: duplicate application '{}' ignored, keeping the first definition",
                    app.name
                );
                false
            }
        });
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for app in &self.applications {
            if app.name.trim().is_empty() {
                return Err(Error::ConfigValidation(
                    "Application with empty name".into(),
                ));
            }
            if app.trigger.trim().is_empty() {
                return Err(Error::ConfigValidation(format!(
                    "Application '{}' has an empty trigger",
                    app.name
                )));
            }
        }
        Ok(())
    }
}

/// Global watcher settings
///
/// `smtp_server` and `email_from` are only consulted by the mail repair
/// action; a configuration without mail notifications never touches them.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherSettings {
    /// SMTP relay used for failure notifications
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    /// Sender address for failure notifications
    pub email_from: Option<String>,

    /// Timeout in seconds applied to each probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: u64,

    /// Ping probe mode (simulated mode skips the actual echo probes)
    #[serde(default)]
    pub ping_mode: PingMode,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            smtp_server: default_smtp_server(),
            email_from: None,
            probe_timeout: default_probe_timeout(),
            ping_mode: PingMode::default(),
        }
    }
}

fn default_smtp_server() -> String {
    "localhost".into()
}

fn default_probe_timeout() -> u64 {
    10
}

/// A watched application definition from the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationSpec {
    /// Unique application name
    pub name: String,

    /// Trigger expression: `<type> <target> <operator>: <expected text>`
    pub trigger: String,

    /// Restart command spawned when the trigger fires
    pub command: Option<String>,

    /// Log file receiving one line per detected failure
    pub log_file: Option<PathBuf>,

    /// Whitespace-separated notification recipients
    pub notify_mail: Option<String>,
}
