//! Startup configuration, read from the environment

use crate::inventory::DEFAULT_CAPACITY;
use crate::llm::{Sampling, DEFAULT_BASE_URL};
use crate::state_machine::BranchExit;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which assistant to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    /// One booking dialogue, no classifier, no functions
    Booking,
    /// Classifier plus the three dialogues, no functions
    Intent,
    /// Classifier plus the three dialogues with reservation functions
    #[default]
    IntentTools,
}

impl Variant {
    pub fn routed(self) -> bool {
        !matches!(self, Variant::Booking)
    }

    pub fn uses_tools(self) -> bool {
        matches!(self, Variant::IntentTools)
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "booking" => Ok(Variant::Booking),
            "intent" => Ok(Variant::Intent),
            "intent_tools" => Ok(Variant::IntentTools),
            _ => Err("expected booking, intent or intent_tools".to_string()),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Booking => "booking",
            Variant::Intent => "intent",
            Variant::IntentTools => "intent_tools",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub sampling: Sampling,
    pub variant: Variant,
    pub branch_exit: BranchExit,
    pub seat_capacity: u32,
    /// Turns replayed per model call; `None` replays everything
    pub memory_window: Option<usize>,
    pub max_attempts: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            sampling: Sampling::default(),
            variant: Variant::default(),
            branch_exit: BranchExit::default(),
            seat_capacity: DEFAULT_CAPACITY,
            memory_window: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let temperature = match get("TABLEBOT_TEMPERATURE") {
            Some(raw) => {
                let value: f32 = parse("TABLEBOT_TEMPERATURE", &raw)?;
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::invalid(
                        "TABLEBOT_TEMPERATURE",
                        &raw,
                        "must be a non-negative number",
                    ));
                }
                value
            }
            None => defaults.sampling.temperature,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: get("TABLEBOT_MODEL").unwrap_or(defaults.model),
            sampling: Sampling {
                max_tokens: positive("TABLEBOT_MAX_TOKENS", get("TABLEBOT_MAX_TOKENS"))?
                    .unwrap_or(defaults.sampling.max_tokens),
                temperature,
            },
            variant: get("TABLEBOT_VARIANT")
                .map(|raw| parse("TABLEBOT_VARIANT", &raw))
                .transpose()?
                .unwrap_or(defaults.variant),
            branch_exit: get("TABLEBOT_BRANCH_EXIT")
                .map(|raw| parse("TABLEBOT_BRANCH_EXIT", &raw))
                .transpose()?
                .unwrap_or(defaults.branch_exit),
            seat_capacity: positive("TABLEBOT_SEAT_CAPACITY", get("TABLEBOT_SEAT_CAPACITY"))?
                .unwrap_or(defaults.seat_capacity),
            memory_window: positive("TABLEBOT_MEMORY_WINDOW", get("TABLEBOT_MEMORY_WINDOW"))?,
            max_attempts: positive("TABLEBOT_MAX_ATTEMPTS", get("TABLEBOT_MAX_ATTEMPTS"))?
                .unwrap_or(defaults.max_attempts),
        })
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(var, raw, e.to_string()))
}

fn positive<T>(var: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: T = parse(var, &raw)?;
    if value <= T::default() {
        return Err(ConfigError::invalid(var, &raw, "must be at least 1"));
    }
    Ok(Some(value))
}
