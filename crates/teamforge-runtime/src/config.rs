//! Runtime configuration, read from the environment.
//!
//! | Variable              | Default            | Meaning                         |
//! |-----------------------|--------------------|---------------------------------|
//! | `STATE_PATH`          | `data/state.json`  | State document location         |
//! | `TEAM_BASE`           | `5`                | Minimum team size               |
//! | `ELASTIC_MAX`         | `2`                | Extra members a team may absorb |
//! | `MATCH_INTERVAL_DAYS` | `2`                | Days between scheduled rounds   |
//! | `MATCH_HOUR_UTC`      | `12`               | Hour of day for scheduled rounds|

use anyhow::{Context, Result};
use std::path::PathBuf;
use teamforge_engine::config::{
    DEFAULT_ELASTIC, DEFAULT_INTERVAL_DAYS, DEFAULT_MATCH_HOUR_UTC, DEFAULT_TEAM_BASE,
};
use teamforge_engine::{EngineConfig, ScheduleConfig};

/// Everything the runtime needs to wire the engine.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Path of the persisted state document.
    pub state_path: PathBuf,
    /// Matching parameters.
    pub engine: EngineConfig,
    /// Cadence parameters.
    pub schedule: ScheduleConfig,
}

impl RuntimeConfig {
    /// Builds the configuration from environment variables, falling back to
    /// defaults for anything unset. Malformed values are errors, not silent
    /// fallbacks.
    pub fn from_env() -> Result<Self> {
        let state_path = std::env::var("STATE_PATH")
            .unwrap_or_else(|_| "data/state.json".to_string())
            .into();

        let engine = EngineConfig {
            base: env_parse("TEAM_BASE", DEFAULT_TEAM_BASE)?,
            elastic: env_parse("ELASTIC_MAX", DEFAULT_ELASTIC)?,
        };

        let mut schedule = ScheduleConfig::default();
        schedule.interval_days = env_parse("MATCH_INTERVAL_DAYS", DEFAULT_INTERVAL_DAYS)?;
        schedule.hour_utc = env_parse("MATCH_HOUR_UTC", DEFAULT_MATCH_HOUR_UTC)?;

        Ok(Self {
            state_path,
            engine,
            schedule,
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
