//! Process configuration, read once at startup.

use std::env;
use std::time::Duration;

use thiserror::Error;
use weather_agent_openai_model::{OpenAIConfig, OpenAIConfigBuilder};

const API_KEY: &str = "GOOGLE_API_KEY";
const MODEL: &str = "WEATHER_AGENT_MODEL";
const BASE_URL: &str = "WEATHER_AGENT_BASE_URL";
const OFFLINE: &str = "WEATHER_AGENT_OFFLINE";
const TURN_TIMEOUT_SECS: &str = "WEATHER_AGENT_TURN_TIMEOUT_SECS";
const STREAMING: &str = "WEATHER_AGENT_STREAMING";

/// Errors found while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key and offline mode is off.
    #[error(
        "GOOGLE_API_KEY is not set; set it or enable WEATHER_AGENT_OFFLINE"
    )]
    MissingApiKey,
    /// A variable is set to something that cannot be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// The variable name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// What was expected instead.
        reason: &'static str,
    },
}

/// Which model answers the queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelBackend {
    /// The local keyword model.
    Offline,
    /// A hosted OpenAI-compatible chat completion API.
    OpenAI(OpenAIConfig),
}

/// Everything the program reads from its environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The model backend.
    pub backend: ModelBackend,
    /// Upper bound for one conversation turn.
    pub turn_timeout: Option<Duration>,
    /// Whether the runner reports text deltas as partial events.
    pub streaming: bool,
}

impl Config {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let offline = parse_flag(OFFLINE, lookup(OFFLINE))?;
        let backend = if offline {
            ModelBackend::Offline
        } else {
            let api_key = lookup(API_KEY)
                .filter(|key| !key.trim().is_empty())
                .ok_or(ConfigError::MissingApiKey)?;
            let mut builder = OpenAIConfigBuilder::with_api_key(api_key);
            if let Some(model) = lookup(MODEL) {
                builder = builder.with_model(model);
            }
            if let Some(base_url) = lookup(BASE_URL) {
                builder = builder.with_base_url(base_url);
            }
            ModelBackend::OpenAI(builder.build())
        };

        let turn_timeout = match lookup(TURN_TIMEOUT_SECS) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: TURN_TIMEOUT_SECS,
                        value,
                        reason: "expected a positive number of seconds",
                    });
                }
            },
            None => None,
        };

        Ok(Self {
            backend,
            turn_timeout,
            streaming: parse_flag(STREAMING, lookup(STREAMING))?,
        })
    }
}

fn parse_flag(
    key: &'static str,
    value: Option<String>,
) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected a boolean such as `true` or `0`",
        }),
    }
}
