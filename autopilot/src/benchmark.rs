use anyhow::{anyhow, Context, Result};
use dashbot_core::TuningConfig;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::course::Course;
use crate::runner::{run_pathfind, PathfindArtifact, SimConfig};
use crate::util::{seed_to_hex, write_json};

#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub course_id: String,
    pub hazards: usize,
    pub completed: bool,
    pub attempts: u32,
    pub best_progress: f32,
    pub action_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct SavedTimelineRecord {
    pub rank: usize,
    pub seed_hex: String,
    pub attempts: u32,
    pub actions: usize,
    pub path: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub run_count: usize,
    pub jobs: Option<usize>,
    pub course_length: f32,
    pub completion_rate: f64,
    pub avg_attempts_completed: f64,
    pub max_attempts_completed: u32,
    pub avg_best_fraction: f64,
    pub sim: SimConfig,
    pub tuning: TuningConfig,
    pub runs: Vec<RunRecord>,
    pub saved_timelines: Vec<SavedTimelineRecord>,
}

pub struct BenchmarkConfig {
    pub seeds: Vec<u32>,
    pub course_length: f32,
    pub sim: SimConfig,
    pub tuning: TuningConfig,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

struct InternalRun {
    seed: u32,
    hazards: usize,
    artifact: PathfindArtifact,
}

/// Pathfinds one generated course per seed, each on its own controller, and
/// writes `summary.json` plus the timelines of the quickest solves.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_one = |seed: &u32| -> Result<InternalRun> {
        let course = Course::generate(*seed, config.course_length)?;
        let artifact = run_pathfind(&course, config.tuning.clone(), &config.sim)
            .with_context(|| format!("benchmark run failed for seed={seed:#x}"))?;
        Ok(InternalRun {
            seed: *seed,
            hazards: course.hazards.len(),
            artifact,
        })
    };

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let total_runs = runs.len();
    let completed: Vec<&InternalRun> = runs
        .iter()
        .filter(|r| r.artifact.report.completed)
        .collect();
    let sum_attempts: u64 = completed
        .iter()
        .map(|r| r.artifact.report.attempts as u64)
        .sum();
    let max_attempts_completed = completed
        .iter()
        .map(|r| r.artifact.report.attempts)
        .max()
        .unwrap_or(0);
    let sum_best_fraction: f64 = runs
        .iter()
        .map(|r| {
            let report = &r.artifact.report;
            if report.completed {
                1.0
            } else {
                (report.status.best_progress / report.course_length).min(1.0) as f64
            }
        })
        .sum();

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|r| {
            let report = &r.artifact.report;
            RunRecord {
                seed: r.seed,
                seed_hex: seed_to_hex(r.seed),
                course_id: report.course_id.clone(),
                hazards: r.hazards,
                completed: report.completed,
                attempts: report.attempts,
                best_progress: report.status.best_progress,
                action_count: report.status.action_count,
            }
        })
        .collect();
    run_records.sort_by(|a, b| {
        b.completed
            .cmp(&a.completed)
            .then(a.attempts.cmp(&b.attempts))
    });

    let mut saved_timelines = Vec::new();
    if config.save_top > 0 && !completed.is_empty() {
        let mut order = completed.clone();
        order.sort_by_key(|r| r.artifact.report.attempts);

        let save_dir = config.out_dir.join("top-timelines");
        for (idx, run) in order.iter().take(config.save_top).enumerate() {
            let rank = idx + 1;
            let report = &run.artifact.report;
            let filename = format!(
                "rank{rank:02}-seed{:08x}-attempts{}.json",
                run.seed, report.attempts
            );
            let path = save_dir.join(&filename);
            run.artifact.bot.save(&path)?;
            saved_timelines.push(SavedTimelineRecord {
                rank,
                seed_hex: seed_to_hex(run.seed),
                attempts: report.attempts,
                actions: report.status.action_count,
                path: path.to_string_lossy().into_owned(),
            });
        }
    }

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        run_count: total_runs,
        jobs: config.jobs,
        course_length: config.course_length,
        completion_rate: completed.len() as f64 / total_runs as f64,
        avg_attempts_completed: if completed.is_empty() {
            0.0
        } else {
            sum_attempts as f64 / completed.len() as f64
        },
        max_attempts_completed,
        avg_best_fraction: sum_best_fraction / total_runs as f64,
        sim: config.sim,
        tuning: config.tuning.clone(),
        runs: run_records,
        saved_timelines,
    };

    write_json(&config.out_dir.join("summary.json"), &report)?;
    Ok(report)
}
