use dashbot_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use dashbot_autopilot::course::{Course, Hazard};
use dashbot_autopilot::runner::{run_pathfind, run_replay, AttemptOutcome, Player, SimConfig};
use dashbot_core::{BotController, BotMode, TuningConfig};

fn sim() -> SimConfig {
    SimConfig {
        max_attempts: 300,
        ..SimConfig::default()
    }
}

#[test]
fn learned_timeline_survives_save_load_and_replays_clean() {
    let course = Course::new(
        "three-spikes",
        1_200.0,
        vec![
            Hazard {
                start: 300.0,
                end: 320.0,
            },
            Hazard {
                start: 600.0,
                end: 630.0,
            },
            Hazard {
                start: 900.0,
                end: 915.0,
            },
        ],
    )
    .unwrap();

    let artifact = run_pathfind(&course, TuningConfig::default(), &sim()).unwrap();
    assert!(artifact.report.completed, "deaths: {:?}", artifact.report.deaths);
    assert!(!artifact.report.actions.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("three-spikes.json");
    artifact.bot.save(&path).unwrap();

    let mut bot = BotController::new(Player::default());
    bot.load(&path).unwrap();
    assert_eq!(bot.timeline(), artifact.bot.timeline());
    assert_eq!(bot.stats().best_progress, artifact.report.status.best_progress);
    assert_eq!(bot.mode(), BotMode::Off);

    let report = run_replay(&mut bot, &course, &sim()).unwrap();
    assert!(matches!(report.outcome, AttemptOutcome::Completed { .. }));
    assert_eq!(report.presses as usize, artifact.report.actions.len());
    assert_eq!(bot.mode(), BotMode::Replaying);
}

#[test]
fn benchmark_writes_summary_and_top_timelines() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("bench");
    let report = run_benchmark(BenchmarkConfig {
        seeds: vec![0x0000_0001, 0x0000_0002, 0x0000_0003],
        course_length: 1_500.0,
        sim: sim(),
        tuning: TuningConfig::default(),
        out_dir: out_dir.clone(),
        save_top: 2,
        jobs: Some(2),
    })
    .unwrap();

    assert_eq!(report.run_count, 3);
    assert_eq!(report.runs.len(), 3);
    assert!(out_dir.join("summary.json").exists());

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out_dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["run_count"], 3);

    let completed = report.runs.iter().filter(|run| run.completed).count();
    assert_eq!(report.saved_timelines.len(), completed.min(2));
    for saved in &report.saved_timelines {
        let mut bot = BotController::new(Player::default());
        bot.load(std::path::Path::new(&saved.path)).unwrap();
        assert_eq!(bot.timeline().len(), saved.actions);
    }
}

#[test]
fn benchmark_rejects_empty_seed_list() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_benchmark(BenchmarkConfig {
        seeds: Vec::new(),
        course_length: 1_000.0,
        sim: sim(),
        tuning: TuningConfig::default(),
        out_dir: dir.path().to_path_buf(),
        save_top: 1,
        jobs: None,
    });
    assert!(result.is_err());
}

#[test]
fn benchmark_rejects_unbounded_course_length() {
    let dir = tempfile::tempdir().unwrap();
    for course_length in [f32::INFINITY, f32::NAN] {
        let result = run_benchmark(BenchmarkConfig {
            seeds: vec![1],
            course_length,
            sim: sim(),
            tuning: TuningConfig::default(),
            out_dir: dir.path().to_path_buf(),
            save_top: 1,
            jobs: Some(1),
        });
        assert!(result.is_err(), "course_length={course_length}");
    }
}

#[test]
fn generated_course_round_trips_and_pathfinds() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("course.json");
    let course = Course::generate(0x5EED_0042, 1_000.0)?;
    course.write(&path)?;
    let loaded = Course::load(&path)?;
    assert_eq!(loaded, course);

    let first = run_pathfind(&loaded, TuningConfig::default(), &sim())?;
    let second = run_pathfind(&course, TuningConfig::default(), &sim())?;
    assert_eq!(first.report.actions, second.report.actions);
    assert_eq!(first.report.deaths.len(), second.report.deaths.len());
    Ok(())
}
