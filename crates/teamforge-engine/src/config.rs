//! Configuration types for the engine and its scheduler.
//!
//! `base`, `elastic`, and the cadence parameters are process configuration,
//! not engine state: they are validated once at startup and treated as
//! constants afterwards. Validation failures are fatal
//! ([`EngineError::InvalidConfiguration`]), never recovered at runtime.

use crate::domain::EngineError;
use chrono::NaiveDate;
use serde::Deserialize;

/// Minimum team size when none is configured.
pub const DEFAULT_TEAM_BASE: usize = 5;

/// Extra members a team may absorb when none is configured.
pub const DEFAULT_ELASTIC: usize = 2;

/// Cadence interval in days when none is configured.
pub const DEFAULT_INTERVAL_DAYS: i64 = 2;

/// Hour of day (UTC) for scheduled rounds when none is configured.
pub const DEFAULT_MATCH_HOUR_UTC: u32 = 12;

/// Matching parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct EngineConfig {
    /// Minimum team size.
    pub base: usize,
    /// Maximum extra members per team beyond `base`.
    pub elastic: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_TEAM_BASE,
            elastic: DEFAULT_ELASTIC,
        }
    }
}

impl EngineConfig {
    /// Rejects a base below 1. `elastic` is unsigned, so every value it can
    /// hold is acceptable.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.base < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "team base must be at least 1, got {}",
                self.base
            )));
        }
        Ok(())
    }

    /// Largest size an active team may reach.
    pub fn cap(&self) -> usize {
        self.base + self.elastic
    }
}

/// Cadence parameters for the scheduler.
///
/// A round fires at `hour_utc` on days whose offset from `epoch` is an even
/// multiple of `interval_days`, giving a stable "every N days" rhythm that
/// survives process restarts.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ScheduleConfig {
    /// Days between scheduled rounds.
    pub interval_days: i64,
    /// Hour of day, UTC, 0-23.
    pub hour_utc: u32,
    /// Anchor date for the every-N-days rhythm.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
}

fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid anchor date")
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_INTERVAL_DAYS,
            hour_utc: DEFAULT_MATCH_HOUR_UTC,
            epoch: default_epoch(),
        }
    }
}

impl ScheduleConfig {
    /// Rejects a non-positive interval or an out-of-range hour.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.interval_days < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "match interval must be at least 1 day, got {}",
                self.interval_days
            )));
        }
        if self.hour_utc > 23 {
            return Err(EngineError::InvalidConfiguration(format!(
                "match hour must be 0-23, got {}",
                self.hour_utc
            )));
        }
        Ok(())
    }
}
