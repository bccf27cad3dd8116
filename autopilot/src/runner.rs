use anyhow::{anyhow, Result};
use dashbot_core::{Action, BotController, BotStatus, InputSink, TuningConfig};
use serde::{Deserialize, Serialize};

use crate::course::Course;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Horizontal distance covered per tick.
    pub speed: f32,
    /// Horizontal distance spent airborne per jump.
    pub jump_span: f32,
    pub max_attempts: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            jump_span: 80.0,
            max_attempts: 500,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(anyhow!("speed must be > 0, got {}", self.speed));
        }
        if !self.jump_span.is_finite() || self.jump_span <= 0.0 {
            return Err(anyhow!("jump_span must be > 0, got {}", self.jump_span));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be > 0"));
        }
        Ok(())
    }
}

/// Player body driven by the bot's button. A press while grounded starts a
/// jump; holding the button re-jumps on every landing.
#[derive(Clone, Debug, Default)]
pub struct Player {
    held: bool,
    jump_queued: bool,
    airborne_until: Option<f32>,
    presses: u32,
}

impl Player {
    pub fn presses(&self) -> u32 {
        self.presses
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne_until.is_some()
    }

    fn respawn(&mut self) {
        self.jump_queued = false;
        self.airborne_until = None;
    }

    fn step(&mut self, x: f32, jump_span: f32) {
        if self.airborne_until.is_some_and(|until| x >= until) {
            self.airborne_until = None;
        }
        if self.airborne_until.is_none() && (self.jump_queued || self.held) {
            self.airborne_until = Some(x + jump_span);
        }
        self.jump_queued = false;
    }
}

impl InputSink for Player {
    fn press(&mut self) {
        self.held = true;
        self.jump_queued = true;
        self.presses += 1;
    }

    fn release(&mut self) {
        self.held = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Died { x: f32, ticks: u32 },
    Completed { ticks: u32 },
}

/// Plays one attempt from the start line. The host-side part of the attempt
/// boundary (death report and reset) is left to the caller.
pub fn run_attempt(
    bot: &mut BotController<Player>,
    course: &Course,
    sim: &SimConfig,
) -> AttemptOutcome {
    bot.input_mut().respawn();
    let mut tick = 0u32;
    loop {
        let x = tick as f32 * sim.speed;
        bot.on_tick(x);
        bot.input_mut().step(x, sim.jump_span);

        if !bot.input().is_airborne() && course.hazard_at(x).is_some() {
            return AttemptOutcome::Died { x, ticks: tick };
        }
        if x >= course.length {
            return AttemptOutcome::Completed { ticks: tick };
        }
        tick += 1;
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DeathRecord {
    pub attempt: u32,
    pub x: f32,
    pub outcome: &'static str,
    pub fail_streak: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PathfindReport {
    pub course_id: String,
    pub course_length: f32,
    pub completed: bool,
    pub attempts: u32,
    pub status: BotStatus,
    pub sim: SimConfig,
    pub tuning: TuningConfig,
    pub deaths: Vec<DeathRecord>,
    pub actions: Vec<Action>,
}

pub struct PathfindArtifact {
    pub report: PathfindReport,
    pub bot: BotController<Player>,
}

pub fn run_pathfind(
    course: &Course,
    tuning: TuningConfig,
    sim: &SimConfig,
) -> Result<PathfindArtifact> {
    sim.validate()?;
    tuning
        .validate()
        .map_err(|err| anyhow!("invalid tuning: {err}"))?;
    course.validate()?;

    let mut bot = BotController::with_tuning(Player::default(), tuning);
    bot.start_pathfind();

    let mut deaths = Vec::new();
    let mut completed = false;
    let mut attempts = 0u32;
    while attempts < sim.max_attempts {
        attempts += 1;
        match run_attempt(&mut bot, course, sim) {
            AttemptOutcome::Completed { ticks } => {
                tracing::info!(course = %course.id, attempts, ticks, "course completed");
                completed = true;
                bot.on_attempt_reset();
                break;
            }
            AttemptOutcome::Died { x, .. } => {
                let outcome = bot.on_attempt_end(x);
                bot.on_attempt_reset();
                deaths.push(DeathRecord {
                    attempt: attempts,
                    x,
                    outcome: outcome.as_str(),
                    fail_streak: bot.stats().fail_streak,
                });
            }
        }
    }
    if !completed {
        tracing::warn!(
            course = %course.id,
            attempts,
            best = bot.stats().best_progress,
            "attempt cap reached before completion"
        );
    }

    let report = PathfindReport {
        course_id: course.id.clone(),
        course_length: course.length,
        completed,
        attempts,
        status: bot.status(),
        sim: *sim,
        tuning: bot.tuning().clone(),
        deaths,
        actions: bot.timeline().iter().copied().collect(),
    };
    Ok(PathfindArtifact { report, bot })
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub course_id: String,
    pub outcome: AttemptOutcome,
    pub presses: u32,
    pub status: BotStatus,
}

/// Plays the bot's current timeline once without learning from the result.
pub fn run_replay(
    bot: &mut BotController<Player>,
    course: &Course,
    sim: &SimConfig,
) -> Result<ReplayReport> {
    sim.validate()?;
    bot.start_replay()?;
    let presses_before = bot.input().presses();
    let outcome = run_attempt(bot, course, sim);
    if let AttemptOutcome::Died { x, .. } = outcome {
        bot.on_attempt_end(x);
    }
    bot.on_attempt_reset();
    Ok(ReplayReport {
        course_id: course.id.clone(),
        outcome,
        presses: bot.input().presses() - presses_before,
        status: bot.status(),
    })
}
