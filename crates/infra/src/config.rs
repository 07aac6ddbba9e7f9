//! Configuration loading and representation.
//!
//! Everything comes from environment variables with sane defaults so the
//! publisher can run with zero configuration against a local Redis.

use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;

use tradefeed_transactions::RetryState;

pub const ENV_TOPIC: &str = "TRADEFEED_TOPIC";
pub const ENV_MAX_ATTEMPTS: &str = "TRADEFEED_MAX_ATTEMPTS";
pub const ENV_BASE_DELAY_MS: &str = "TRADEFEED_BASE_DELAY_MS";
pub const ENV_UTC_OFFSET_MINUTES: &str = "TRADEFEED_UTC_OFFSET_MINUTES";
pub const ENV_REDIS_URL: &str = "TRADEFEED_REDIS_URL";

pub const DEFAULT_TOPIC: &str = "transactions";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("{var}: {reason}")]
    OutOfRange { var: &'static str, reason: String },
}

/// Runtime settings for a publisher process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub topic: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Offset of the business calendar's zone from UTC.
    pub utc_offset_minutes: i32,
    pub redis_url: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            max_attempts: RetryState::DEFAULT_MAX_ATTEMPTS,
            base_delay: RetryState::DEFAULT_BASE_DELAY,
            utc_offset_minutes: 0,
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

impl PublisherConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Unset or empty keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let topic = get(ENV_TOPIC).unwrap_or(defaults.topic);

        let max_attempts = match get(ENV_MAX_ATTEMPTS) {
            Some(raw) => parse::<u32>(ENV_MAX_ATTEMPTS, &raw)?,
            None => defaults.max_attempts,
        };
        if max_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                var: ENV_MAX_ATTEMPTS,
                reason: "must allow at least one attempt".to_string(),
            });
        }

        let base_delay = match get(ENV_BASE_DELAY_MS) {
            Some(raw) => Duration::from_millis(parse::<u64>(ENV_BASE_DELAY_MS, &raw)?),
            None => defaults.base_delay,
        };

        let utc_offset_minutes = match get(ENV_UTC_OFFSET_MINUTES) {
            Some(raw) => parse::<i32>(ENV_UTC_OFFSET_MINUTES, &raw)?,
            None => defaults.utc_offset_minutes,
        };

        let config = Self {
            topic,
            max_attempts,
            base_delay,
            utc_offset_minutes,
            redis_url: get(ENV_REDIS_URL).unwrap_or(defaults.redis_url),
        };
        config.zone()?;
        Ok(config)
    }

    /// Retry state each record starts from.
    pub fn retry_state(&self) -> RetryState {
        RetryState::initial(self.max_attempts, self.base_delay)
    }

    /// Zone for business-date evaluation.
    pub fn zone(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            ConfigError::OutOfRange {
                var: ENV_UTC_OFFSET_MINUTES,
                reason: format!("{} minutes is not a valid UTC offset", self.utc_offset_minutes),
            }
        })
    }
}

fn parse<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<PublisherConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PublisherConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config, PublisherConfig::default());
        assert_eq!(config.retry_state(), RetryState::default());
        assert_eq!(config.zone().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            (ENV_TOPIC, "settlements"),
            (ENV_MAX_ATTEMPTS, "5"),
            (ENV_BASE_DELAY_MS, "250"),
            (ENV_UTC_OFFSET_MINUTES, "-300"),
            (ENV_REDIS_URL, "redis://bus:6379"),
        ])
        .unwrap();

        assert_eq!(config.topic, "settlements");
        assert_eq!(config.retry_state(), RetryState::initial(5, Duration::from_millis(250)));
        assert_eq!(config.zone().unwrap().local_minus_utc(), -300 * 60);
        assert_eq!(config.redis_url, "redis://bus:6379");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[(ENV_TOPIC, "  "), (ENV_MAX_ATTEMPTS, "")]).unwrap();

        assert_eq!(config.topic, DEFAULT_TOPIC);
        assert_eq!(config.max_attempts, RetryState::DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn rejects_unparseable_numbers() {
        assert_eq!(
            load(&[(ENV_BASE_DELAY_MS, "soon")]),
            Err(ConfigError::Invalid {
                var: ENV_BASE_DELAY_MS,
                value: "soon".to_string(),
            })
        );
        assert!(matches!(
            load(&[(ENV_MAX_ATTEMPTS, "-1")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_zero_attempts_and_impossible_offsets() {
        assert!(matches!(
            load(&[(ENV_MAX_ATTEMPTS, "0")]),
            Err(ConfigError::OutOfRange { var: ENV_MAX_ATTEMPTS, .. })
        ));
        assert!(matches!(
            load(&[(ENV_UTC_OFFSET_MINUTES, "1440")]),
            Err(ConfigError::OutOfRange { var: ENV_UTC_OFFSET_MINUTES, .. })
        ));
    }
}
