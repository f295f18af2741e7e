//! Simulation tuning: tick cadence, phase threshold, and scoring ranges.
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tick_interval_ms must be greater than zero")]
    ZeroTickInterval,
    #[error("exchanges_per_phase must be greater than zero")]
    ZeroExchangesPerPhase,
    #[error("score_init_range [{0}, {1}) is empty")]
    EmptyInitRange(i32, i32),
    #[error("score_delta [{0}, {1}] is inverted")]
    InvertedDelta(i32, i32),
    #[error("score_ceiling {ceiling} is below the highest seeded score {highest}")]
    CeilingBelowInitRange { ceiling: i32, highest: i32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Named configuration options for a simulation run.
///
/// Every field has a default, so a RON file only needs the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cadence at which a host should call `tick()`.
    pub tick_interval_ms: u64,
    /// Exchanges recorded before the scheduler moves to the next phase.
    pub exchanges_per_phase: u32,
    /// Half-open `[lo, hi)` range for seeding each agent's score.
    pub score_init_range: (i32, i32),
    /// Inclusive `[lo, hi]` range of the per-utterance score change.
    pub score_delta: (i32, i32),
    /// Upper clamp applied after every score change. There is no lower clamp.
    pub score_ceiling: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 3000,
            exchanges_per_phase: 8,
            score_init_range: (70, 90),
            score_delta: (-2, 3),
            score_ceiling: 100,
        }
    }
}

impl SimulationConfig {
    pub fn load_from_ron(path: &Path) -> Result<SimulationConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a config from a RON string.
    pub fn parse_ron(input: &str) -> Result<SimulationConfig, ConfigError> {
        let config: SimulationConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.exchanges_per_phase == 0 {
            return Err(ConfigError::ZeroExchangesPerPhase);
        }
        let (lo, hi) = self.score_init_range;
        if lo >= hi {
            return Err(ConfigError::EmptyInitRange(lo, hi));
        }
        if self.score_ceiling < hi - 1 {
            return Err(ConfigError::CeilingBelowInitRange {
                ceiling: self.score_ceiling,
                highest: hi - 1,
            });
        }
        let (lo, hi) = self.score_delta;
        if lo > hi {
            return Err(ConfigError::InvertedDelta(lo, hi));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
