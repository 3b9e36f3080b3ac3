//! Adapter settings shared by every resource of a connector

use crate::defaults::DEFAULT_TAG_DELAY_SECS;
use std::time::Duration;
use thiserror::Error;

/// Environment variable toggling emulation mode ("1"/"true"/"yes")
pub const ENV_EMULATION: &str = "EC2WRAP_EMULATION";

/// Environment variable holding the instance name prefix
pub const ENV_INSTANCE_PREFIX: &str = "EC2WRAP_INSTANCE_PREFIX";

/// Environment variable overriding the post-launch tag delay (seconds)
pub const ENV_TAG_DELAY_SECS: &str = "EC2WRAP_TAG_DELAY_SECS";

/// Environment variable naming the local user (folded into instance names)
pub const ENV_USERNAME: &str = "USERNAME";

/// Errors raised while reading settings from the environment
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid boolean for {var}: '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("Invalid number for {var}: '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings handed to lifecycle handlers and resource kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Dry-run intent passed to handlers; the core ignores it
    pub emulation: bool,
    /// Prefix prepended to instance names
    pub instance_prefix: String,
    /// Local user name folded into instance names
    pub owner: Option<String>,
    /// Delay between launching an instance and tagging it
    pub tag_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            emulation: false,
            instance_prefix: String::new(),
            owner: None,
            tag_delay: Duration::from_secs(DEFAULT_TAG_DELAY_SECS),
        }
    }
}

impl Settings {
    /// Load settings from `EC2WRAP_*` variables and `USERNAME`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_EMULATION) {
            settings.emulation = parse_bool(ENV_EMULATION, &value)?;
        }
        if let Some(prefix) = lookup(ENV_INSTANCE_PREFIX) {
            settings.instance_prefix = prefix;
        }
        if let Some(value) = lookup(ENV_TAG_DELAY_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| SettingsError::InvalidNumber {
                    var: ENV_TAG_DELAY_SECS,
                    value: value.clone(),
                })?;
            settings.tag_delay = Duration::from_secs(secs);
        }
        settings.owner = lookup(ENV_USERNAME).filter(|name| !name.is_empty());

        Ok(settings)
    }

    /// Set the emulation flag
    pub fn with_emulation(mut self, emulation: bool) -> Self {
        self.emulation = emulation;
        self
    }

    /// Set the instance name prefix
    pub fn with_instance_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.instance_prefix = prefix.into();
        self
    }

    /// Set the owner folded into instance names
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the delay between launch and tagging
    pub fn with_tag_delay(mut self, delay: Duration) -> Self {
        self.tag_delay = delay;
        self
    }

    /// Name given to a freshly launched instance: `<prefix><owner>_<description>`.
    pub fn instance_name(&self, description: &str) -> String {
        match &self.owner {
            Some(owner) => format!("{}{}_{}", self.instance_prefix, owner, description),
            None => format!("{}{}", self.instance_prefix, description),
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(SettingsError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
