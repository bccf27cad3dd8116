//! Death-driven timeline tuning.
//!
//! Every death either beats the best mark (progress, nothing else happens) or
//! bumps the fail streak, and the streak value picks one fixed adjustment from
//! the fail table in [`TuningConfig`]. There is no lookahead or search: each
//! death is handled on its own, given only the streak and the death position.

use serde::Serialize;

use crate::config::TuningConfig;
use crate::timeline::ActionTimeline;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LearningStats {
    pub best_progress: f32,
    pub fail_streak: u32,
    pub attempt_count: u32,
}

/// What a single death did to the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LearningOutcome {
    /// Controller was not pathfinding; nothing recorded.
    Inactive,
    Progress { best: f32 },
    Inserted { streak: u32, position: f32 },
    /// Candidate collided with an existing entry.
    Rejected { streak: u32, position: f32 },
    /// Candidate was not strictly positive.
    Skipped { streak: u32, position: f32 },
    Pruned { removed: Option<f32> },
    Idle { streak: u32 },
    SectionReset { threshold: f32, removed: usize },
}

impl LearningOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Progress { .. } => "progress",
            Self::Inserted { .. } => "inserted",
            Self::Rejected { .. } => "rejected",
            Self::Skipped { .. } => "skipped",
            Self::Pruned { .. } => "pruned",
            Self::Idle { .. } => "idle",
            Self::SectionReset { .. } => "section_reset",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum FailStep {
    Retreat(f32),
    Prune,
    Lookahead(f32),
    Idle,
    SectionReset,
}

#[derive(Clone, Debug)]
pub struct LearningController {
    stats: LearningStats,
    tuning: TuningConfig,
}

impl LearningController {
    pub fn new(tuning: TuningConfig) -> Self {
        Self {
            stats: LearningStats::default(),
            tuning,
        }
    }

    pub fn stats(&self) -> &LearningStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut LearningStats {
        &mut self.stats
    }

    pub fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    pub fn reset(&mut self) {
        self.stats = LearningStats::default();
    }

    pub fn record_death(&mut self, timeline: &mut ActionTimeline, x: f32) -> LearningOutcome {
        self.stats.attempt_count += 1;

        if x > self.stats.best_progress + self.tuning.progress_epsilon {
            self.stats.best_progress = x;
            self.stats.fail_streak = 0;
            return LearningOutcome::Progress { best: x };
        }

        self.stats.fail_streak += 1;
        let streak = self.stats.fail_streak;

        match self.step_for(streak) {
            FailStep::Retreat(offset) => self.try_candidate(timeline, streak, x - offset),
            FailStep::Lookahead(offset) => self.try_candidate(timeline, streak, x + offset),
            FailStep::Prune => {
                let removed = timeline.remove_nearest_before(x, self.tuning.prune_window);
                self.stats.fail_streak = 1;
                LearningOutcome::Pruned { removed }
            }
            FailStep::Idle => LearningOutcome::Idle { streak },
            FailStep::SectionReset => {
                let threshold = x - self.tuning.section_reset_window;
                let removed = timeline.purge_after(threshold);
                self.stats.fail_streak = 0;
                LearningOutcome::SectionReset { threshold, removed }
            }
        }
    }

    fn step_for(&self, streak: u32) -> FailStep {
        let offsets = &self.tuning.retreat_offsets;
        if streak >= 1 && (streak as usize) <= offsets.len() {
            return FailStep::Retreat(offsets[streak as usize - 1]);
        }
        if streak == self.tuning.prune_streak() {
            return FailStep::Prune;
        }
        if streak == self.tuning.lookahead_streak() {
            return FailStep::Lookahead(self.tuning.lookahead_offset);
        }
        if streak <= self.tuning.section_reset_after {
            return FailStep::Idle;
        }
        FailStep::SectionReset
    }

    fn try_candidate(
        &self,
        timeline: &mut ActionTimeline,
        streak: u32,
        position: f32,
    ) -> LearningOutcome {
        if position.is_nan() || position <= 0.0 {
            return LearningOutcome::Skipped { streak, position };
        }
        if timeline.insert(position, self.tuning.candidate_kind) {
            LearningOutcome::Inserted { streak, position }
        } else {
            LearningOutcome::Rejected { streak, position }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::ActionKind;

    fn setup() -> (LearningController, ActionTimeline) {
        (
            LearningController::new(TuningConfig::default()),
            ActionTimeline::default(),
        )
    }

    fn positions(timeline: &ActionTimeline) -> Vec<f32> {
        timeline.iter().map(|action| action.position).collect()
    }

    #[test]
    fn first_death_counts_as_progress() {
        let (mut learning, mut timeline) = setup();
        let outcome = learning.record_death(&mut timeline, 100.0);
        assert_eq!(outcome, LearningOutcome::Progress { best: 100.0 });
        assert_eq!(learning.stats().best_progress, 100.0);
        assert_eq!(learning.stats().fail_streak, 0);
        assert_eq!(learning.stats().attempt_count, 1);
        assert!(timeline.is_empty());
    }

    #[test]
    fn death_within_epsilon_is_not_progress() {
        let (mut learning, mut timeline) = setup();
        learning.record_death(&mut timeline, 100.0);
        let outcome = learning.record_death(&mut timeline, 102.0);
        assert_eq!(
            outcome,
            LearningOutcome::Inserted {
                streak: 1,
                position: 77.0
            }
        );
        assert_eq!(learning.stats().best_progress, 100.0);
        assert_eq!(
            learning.record_death(&mut timeline, 102.5),
            LearningOutcome::Progress { best: 102.5 }
        );
    }

    #[test]
    fn fail_table_at_fixed_death_point() {
        let (mut learning, mut timeline) = setup();
        learning.record_death(&mut timeline, 100.0);

        let expected = [75.0, 50.0, 85.0, 30.0, 92.0];
        for (i, x) in expected.iter().enumerate() {
            let outcome = learning.record_death(&mut timeline, 100.0);
            assert_eq!(
                outcome,
                LearningOutcome::Inserted {
                    streak: i as u32 + 1,
                    position: *x
                }
            );
        }
        assert_eq!(positions(&timeline), vec![30.0, 50.0, 75.0, 85.0, 92.0]);

        let outcome = learning.record_death(&mut timeline, 100.0);
        assert_eq!(outcome, LearningOutcome::Pruned { removed: Some(92.0) });
        assert_eq!(learning.stats().fail_streak, 1);
        assert_eq!(positions(&timeline), vec![30.0, 50.0, 75.0, 85.0]);

        // The prune step drops the streak back to 1, so the lookahead step is
        // only reached when something else parks the streak at 6.
        learning.stats_mut().fail_streak = 6;
        let outcome = learning.record_death(&mut timeline, 100.0);
        assert_eq!(
            outcome,
            LearningOutcome::Inserted {
                streak: 7,
                position: 105.0
            }
        );

        for streak in 8..=10 {
            let before = timeline.clone();
            let outcome = learning.record_death(&mut timeline, 100.0);
            assert_eq!(outcome, LearningOutcome::Idle { streak });
            assert_eq!(timeline, before);
        }

        let outcome = learning.record_death(&mut timeline, 100.0);
        assert_eq!(
            outcome,
            LearningOutcome::SectionReset {
                threshold: -100.0,
                removed: 5
            }
        );
        assert!(timeline.is_empty());
        assert_eq!(learning.stats().fail_streak, 0);
        assert_eq!(learning.stats().attempt_count, 12);
    }

    #[test]
    fn repeated_deaths_cycle_between_retreat_and_prune() {
        let (mut learning, mut timeline) = setup();
        learning.record_death(&mut timeline, 100.0);
        for _ in 0..40 {
            learning.record_death(&mut timeline, 100.0);
            let streak = learning.stats().fail_streak;
            assert!((1..=5).contains(&streak), "streak escaped the cycle: {streak}");
        }
    }

    #[test]
    fn candidates_at_or_below_zero_are_skipped() {
        let (mut learning, mut timeline) = setup();
        learning.record_death(&mut timeline, 20.0);
        let outcome = learning.record_death(&mut timeline, 20.0);
        assert_eq!(
            outcome,
            LearningOutcome::Skipped {
                streak: 1,
                position: -5.0
            }
        );
        learning.stats_mut().fail_streak = 4;
        // 20 - 8 = 12 is positive and goes in.
        assert_eq!(
            learning.record_death(&mut timeline, 20.0),
            LearningOutcome::Inserted {
                streak: 5,
                position: 12.0
            }
        );
        learning.stats_mut().fail_streak = 0;
        // 25 - 25 = 0 is not strictly positive.
        learning.stats_mut().best_progress = 25.0;
        assert_eq!(
            learning.record_death(&mut timeline, 25.0),
            LearningOutcome::Skipped {
                streak: 1,
                position: 0.0
            }
        );
    }

    #[test]
    fn duplicate_candidate_is_rejected_silently() {
        let (mut learning, mut timeline) = setup();
        timeline.insert(73.0, ActionKind::HoldStart);
        learning.record_death(&mut timeline, 100.0);
        let outcome = learning.record_death(&mut timeline, 100.0);
        assert_eq!(
            outcome,
            LearningOutcome::Rejected {
                streak: 1,
                position: 75.0
            }
        );
        assert_eq!(timeline.len(), 1);
        assert_eq!(learning.stats().fail_streak, 1);
    }

    #[test]
    fn best_progress_never_decreases() {
        let (mut learning, mut timeline) = setup();
        let deaths = [50.0, 40.0, 120.0, 121.0, 90.0, 300.0, 10.0, 299.0];
        let mut last_best = 0.0;
        for x in deaths {
            learning.record_death(&mut timeline, x);
            assert!(learning.stats().best_progress >= last_best);
            last_best = learning.stats().best_progress;
        }
        assert_eq!(last_best, 300.0);
    }

    #[test]
    fn candidate_kind_follows_tuning() {
        let tuning = TuningConfig {
            candidate_kind: ActionKind::HoldStart,
            ..TuningConfig::default()
        };
        let mut learning = LearningController::new(tuning);
        let mut timeline = ActionTimeline::default();
        learning.record_death(&mut timeline, 100.0);
        learning.record_death(&mut timeline, 100.0);
        assert_eq!(timeline.get(0).unwrap().kind, ActionKind::HoldStart);
    }
}
