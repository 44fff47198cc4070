use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings for one timed assessment session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of the assessment window in seconds.
    pub duration_secs: u64,

    /// The session variance is drawn uniformly from `[-spread, spread]`.
    pub variance_spread: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            variance_spread: 3.0,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `GOLDEN_FACE_SESSION_SECS` and
    /// `GOLDEN_FACE_VARIANCE_SPREAD`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            duration_secs: env_or_parse("GOLDEN_FACE_SESSION_SECS", defaults.duration_secs),
            variance_spread: env_or_parse("GOLDEN_FACE_VARIANCE_SPREAD", defaults.variance_spread),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_secs == 0 {
            return Err(Error::InvalidConfig(
                "session duration must be at least one second".into(),
            ));
        }
        if !self.variance_spread.is_finite() || self.variance_spread < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "variance spread must be a non-negative number, got {}",
                self.variance_spread
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Failed to parse env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}
