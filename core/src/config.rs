use serde::{Deserialize, Serialize};

use crate::constants::{
    DEDUPE_DISTANCE, LOOKAHEAD_OFFSET, PROGRESS_EPSILON, PRUNE_WINDOW, RETREAT_OFFSETS,
    SECTION_RESET_AFTER, SECTION_RESET_WINDOW,
};
use crate::error::ConfigError;
use crate::timeline::ActionKind;

/// Knobs for the death-driven heuristic.
///
/// With `n = retreat_offsets.len()` the fail table reads:
/// streaks `1..=n` insert at `x - retreat_offsets[streak - 1]`, streak `n + 1`
/// prunes the nearest entry before the death and drops the streak back to 1,
/// streak `n + 2` inserts at `x + lookahead_offset`, streaks up to
/// `section_reset_after` do nothing, and anything above purges the section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub dedupe_distance: f32,
    pub progress_epsilon: f32,
    pub prune_window: f32,
    pub section_reset_window: f32,
    pub retreat_offsets: Vec<f32>,
    pub lookahead_offset: f32,
    pub section_reset_after: u32,
    pub candidate_kind: ActionKind,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            dedupe_distance: DEDUPE_DISTANCE,
            progress_epsilon: PROGRESS_EPSILON,
            prune_window: PRUNE_WINDOW,
            section_reset_window: SECTION_RESET_WINDOW,
            retreat_offsets: RETREAT_OFFSETS.to_vec(),
            lookahead_offset: LOOKAHEAD_OFFSET,
            section_reset_after: SECTION_RESET_AFTER,
            candidate_kind: ActionKind::Click,
        }
    }
}

impl TuningConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(data).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("dedupe_distance", self.dedupe_distance)?;
        positive("prune_window", self.prune_window)?;
        positive("section_reset_window", self.section_reset_window)?;
        if !self.progress_epsilon.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "progress_epsilon",
            });
        }
        if !self.lookahead_offset.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "lookahead_offset",
            });
        }
        if self.retreat_offsets.is_empty() {
            return Err(ConfigError::EmptyRetreatTable);
        }
        if self.retreat_offsets.iter().any(|offset| !offset.is_finite()) {
            return Err(ConfigError::NotFinite {
                field: "retreat_offsets",
            });
        }
        Ok(())
    }

    /// Streak at which the nearest earlier entry is pruned.
    pub fn prune_streak(&self) -> u32 {
        self.retreat_offsets.len() as u32 + 1
    }

    /// Streak at which a candidate is tried ahead of the death point.
    pub fn lookahead_streak(&self) -> u32 {
        self.prune_streak() + 1
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}
