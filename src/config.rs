//! Configuration for the homework status bot.
//!
//! Secrets always come from the environment. Everything else is an optional
//! YAML settings file whose keys fall back to defaults.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

use crate::error::BotError;

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// The three secrets the bot needs. Values may be empty until checked.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish_non_exhaustive()
    }
}

impl Secrets {
    pub fn new(
        practicum_token: impl Into<String>,
        telegram_token: impl Into<String>,
        telegram_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            telegram_chat_id: telegram_chat_id.into(),
        }
    }

    /// Read the secrets from the process environment. Unset variables become empty.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self::new(
            var(PRACTICUM_TOKEN_VAR),
            var(TELEGRAM_TOKEN_VAR),
            var(TELEGRAM_CHAT_ID_VAR),
        )
    }

    /// Names of the secrets that are unset, empty or whitespace-only.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Token guard: all three secrets must be present.
    pub fn check(&self) -> Result<(), BotError> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }
        error!(fatal = true, ?missing, "required environment variables are missing");
        Err(BotError::FatalConfig { missing })
    }
}

/// Tunable settings mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub retry_period_secs: u64,
    pub request_timeout_secs: u64,
    pub log_file: String,
    pub suppress_repeated_failures: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_period_secs: 600,
            request_timeout_secs: 30,
            log_file: "main.log".to_string(),
            suppress_repeated_failures: true,
        }
    }
}

impl Settings {
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Everything the poller is constructed from.
#[derive(Debug, Clone)]
pub struct Config {
    pub secrets: Secrets,
    pub settings: Settings,
}

impl Config {
    /// Secrets from the environment, settings from `path` or defaults.
    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            secrets: Secrets::from_env(),
            settings: load(path)?,
        })
    }
}

/// Load settings from a YAML file and validate them.
/// - If `path` is None, the defaults are used.
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        }
        None => Settings::default(),
    };
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid("endpoint must be non-empty"));
    }
    if settings.retry_period_secs == 0 {
        return Err(ConfigError::Invalid("retry_period_secs must be > 0"));
    }
    if settings.request_timeout_secs == 0 {
        return Err(ConfigError::Invalid("request_timeout_secs must be > 0"));
    }
    if settings.log_file.trim().is_empty() {
        return Err(ConfigError::Invalid("log_file must be non-empty"));
    }
    Ok(())
}

/// Example settings file with every key spelled out.
pub fn example() -> &'static str {
    r#"endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/"
retry_period_secs: 600
request_timeout_secs: 30
log_file: "main.log"
suppress_repeated_failures: true
"#
}
