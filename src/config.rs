//! Bot configuration: owners, identity, and user-facing message style.
//!
//! Configuration is loaded from a TOML file, with the owner list optionally
//! extended from the `BOT_OWNER_IDS` environment variable (comma-separated
//! user ids) so deployments can grant ownership without editing the file.

use crate::errors::{Error, Result};
use crate::interaction::payload::Snowflake;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BotConfig {
    /// The application's own id, used by the demo registrar output.
    #[serde(default)]
    pub application_id: Option<Snowflake>,
    /// Users allowed to invoke owner-gated commands.
    #[serde(default)]
    pub owners: Vec<Snowflake>,
    #[serde(default)]
    pub messages: MessageStyle,
}

impl BotConfig {
    #[must_use]
    pub fn is_owner(&self, user: &Snowflake) -> bool {
        self.owners.contains(user)
    }
}

/// Templates for the engine's own user-facing replies.
#[derive(Deserialize, Debug, Clone)]
pub struct MessageStyle {
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,
    /// Shown when a command is still cooling down. `{until}` is replaced
    /// with the expiry timestamp.
    #[serde(default = "default_cooldown_notice")]
    pub cooldown_notice: String,
}

impl Default for MessageStyle {
    fn default() -> Self {
        Self {
            error_prefix: default_error_prefix(),
            cooldown_notice: default_cooldown_notice(),
        }
    }
}

impl MessageStyle {
    /// Renders the cooldown notice for a concrete expiry.
    #[must_use]
    pub fn cooldown_message(&self, until: &DateTime<Utc>) -> String {
        self.cooldown_notice
            .replace("{until}", &until.format("%H:%M:%S UTC").to_string())
    }
}

fn default_error_prefix() -> String {
    "Sorry, that didn't work:".to_string()
}

fn default_cooldown_notice() -> String {
    "You're doing that too often. Try again at {until}.".to_string()
}

/// Loads configuration from a TOML file and folds in environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    let mut config: BotConfig = toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        ))
    })?;

    if let Ok(raw) = std::env::var("BOT_OWNER_IDS") {
        for owner in parse_owner_list(&raw) {
            if !config.owners.contains(&owner) {
                config.owners.push(owner);
            }
        }
    }
    Ok(config)
}

fn parse_owner_list(raw: &str) -> Vec<Snowflake> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Snowflake::from)
        .collect()
}
