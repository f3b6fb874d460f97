//! Startup configuration and credential lookup

use crate::credits::FREE_CHAT_LIMIT;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b:free";
pub const DEFAULT_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_PORT: u16 = 8000;
/// Simulated wait of the "watch an ad" top-up
pub const DEFAULT_TOP_UP_DELAY: Duration = Duration::from_secs(3);
/// Sessions untouched for this long are dropped
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API key not found. Set {var} to enable chat.")]
    MissingCredential { var: String },
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

/// Service configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub api_url: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token
    pub api_key_var: String,
    pub top_up_delay: Duration,
    pub starting_credits: u32,
    pub session_idle_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            top_up_delay: DEFAULT_TOP_UP_DELAY,
            starting_credits: FREE_CHAT_LIMIT,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Invalid numeric values fall back to their default and are returned
    /// alongside the config so the caller can report them.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut problems = Vec::new();

        if let Some(port) = parse_var(&lookup, "WELLNESS_PORT", &mut problems) {
            config.port = port;
        }
        if let Some(url) = lookup("OPENROUTER_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(model) = lookup("OPENROUTER_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        if let Some(var) = lookup("WELLNESS_API_KEY_VAR").filter(|v| !v.trim().is_empty()) {
            config.api_key_var = var;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "WELLNESS_TOP_UP_DELAY_MS", &mut problems) {
            config.top_up_delay = Duration::from_millis(ms);
        }
        if let Some(credits) = parse_var(&lookup, "WELLNESS_STARTING_CREDITS", &mut problems) {
            config.starting_credits = credits;
        }
        if let Some(secs) =
            parse_var::<u64>(&lookup, "WELLNESS_SESSION_IDLE_SECS", &mut problems)
        {
            config.session_idle_timeout = Duration::from_secs(secs);
        }

        (config, problems)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    problems: &mut Vec<ConfigError>,
) -> Option<T> {
    let raw = lookup(var)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            problems.push(ConfigError::InvalidValue {
                var: var.to_string(),
                value: raw,
            });
            None
        }
    }
}

/// Opaque secret store for the chat-service bearer token
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Option<String>;

    /// Name reported to the user when the key is missing
    fn describe(&self) -> &str;
}

/// Reads the key from an environment variable on every lookup
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredential {
    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|k| !k.trim().is_empty())
    }

    fn describe(&self) -> &str {
        &self.var
    }
}

/// Fixed key for tests
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticCredential(pub Option<String>);

#[cfg(test)]
impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.0.clone().filter(|k| !k.trim().is_empty())
    }

    fn describe(&self) -> &str {
        "static credential"
    }
}
