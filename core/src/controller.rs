use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::codec::{self, SaveDocument};
use crate::config::TuningConfig;
use crate::error::{ControlError, PersistError};
use crate::input::InputSink;
use crate::learning::{LearningController, LearningOutcome, LearningStats};
use crate::replay::ReplayEngine;
use crate::timeline::ActionTimeline;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BotMode {
    #[default]
    Off,
    Pathfinding,
    Replaying,
}

/// Read-only snapshot for whatever UI the host draws.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BotStatus {
    pub mode: BotMode,
    pub best_progress: f32,
    pub attempt_count: u32,
    pub action_count: usize,
}

/// Mode state machine tying the timeline, the heuristic and the replay cursor
/// to one host input.
///
/// The host calls [`on_tick`](Self::on_tick) once per simulation step,
/// [`on_attempt_end`](Self::on_attempt_end) when the player dies and
/// [`on_attempt_reset`](Self::on_attempt_reset) whenever the level restarts.
/// Everything runs on the caller's thread; wrap the controller in a mutex if
/// the host delivers callbacks from more than one.
#[derive(Debug)]
pub struct BotController<I: InputSink> {
    mode: BotMode,
    timeline: ActionTimeline,
    learning: LearningController,
    replay: ReplayEngine,
    input: I,
}

impl<I: InputSink> BotController<I> {
    pub fn new(input: I) -> Self {
        Self::with_tuning(input, TuningConfig::default())
    }

    pub fn with_tuning(input: I, tuning: TuningConfig) -> Self {
        Self {
            mode: BotMode::Off,
            timeline: ActionTimeline::new(tuning.dedupe_distance),
            learning: LearningController::new(tuning),
            replay: ReplayEngine::new(),
            input,
        }
    }

    pub fn mode(&self) -> BotMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != BotMode::Off
    }

    pub fn timeline(&self) -> &ActionTimeline {
        &self.timeline
    }

    pub fn stats(&self) -> &LearningStats {
        self.learning.stats()
    }

    pub fn tuning(&self) -> &TuningConfig {
        self.learning.tuning()
    }

    pub fn replay(&self) -> &ReplayEngine {
        &self.replay
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn into_input(self) -> I {
        self.input
    }

    pub fn status(&self) -> BotStatus {
        let stats = self.learning.stats();
        BotStatus {
            mode: self.mode,
            best_progress: stats.best_progress,
            attempt_count: stats.attempt_count,
            action_count: self.timeline.len(),
        }
    }

    pub fn start_pathfind(&mut self) {
        self.timeline.clear();
        self.learning.reset();
        self.replay.reset_attempt(&mut self.input);
        self.set_mode(BotMode::Pathfinding);
    }

    pub fn start_replay(&mut self) -> Result<(), ControlError> {
        if self.timeline.is_empty() {
            tracing::warn!("replay requested with an empty timeline");
            return Err(ControlError::EmptyTimeline);
        }
        self.replay.reset_attempt(&mut self.input);
        self.set_mode(BotMode::Replaying);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.replay.reset_attempt(&mut self.input);
        self.set_mode(BotMode::Off);
    }

    /// Feeds one position sample. Returns how many actions fired.
    pub fn on_tick(&mut self, position: f32) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        self.replay.advance(&self.timeline, position, &mut self.input)
    }

    /// Player died at `death_x`. Only pathfinding learns from it; the host
    /// still has to call [`on_attempt_reset`](Self::on_attempt_reset) before
    /// the next attempt starts feeding ticks.
    pub fn on_attempt_end(&mut self, death_x: f32) -> LearningOutcome {
        if self.mode != BotMode::Pathfinding {
            return LearningOutcome::Inactive;
        }
        let outcome = self.learning.record_death(&mut self.timeline, death_x);
        let stats = self.learning.stats();
        tracing::debug!(
            death_x,
            attempt = stats.attempt_count,
            streak = stats.fail_streak,
            best = stats.best_progress,
            ?outcome,
            "attempt ended"
        );
        outcome
    }

    pub fn on_attempt_reset(&mut self) {
        self.replay.reset_attempt(&mut self.input);
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let doc = SaveDocument::capture(self.learning.stats().best_progress, &self.timeline);
        let text = codec::encode(&doc).map_err(|source| PersistError::Encode { source })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            actions = self.timeline.len(),
            best = doc.best,
            "saved timeline"
        );
        Ok(())
    }

    /// Replaces the timeline and best mark with the file's contents. On any
    /// error the in-memory state is left exactly as it was.
    pub fn load(&mut self, path: &Path) -> Result<(), PersistError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(PersistError::MissingSaveFile {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(PersistError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let doc = codec::decode(&text).map_err(|source| PersistError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        let version = doc.version;
        let (best, timeline, rejected) = doc.into_timeline(self.tuning().dedupe_distance);
        if rejected > 0 {
            tracing::warn!(
                path = %path.display(),
                rejected,
                "dropped save entries closer than the dedupe distance"
            );
        }

        self.replay.reset_attempt(&mut self.input);
        self.timeline = timeline;
        let stats = self.learning.stats_mut();
        stats.best_progress = best;
        stats.fail_streak = 0;

        tracing::info!(
            path = %path.display(),
            version,
            actions = self.timeline.len(),
            best,
            "loaded timeline"
        );
        Ok(())
    }

    fn set_mode(&mut self, mode: BotMode) {
        if self.mode != mode {
            tracing::info!(from = ?self.mode, to = ?mode, "bot mode changed");
        }
        self.mode = mode;
    }
}
