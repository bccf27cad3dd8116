//! End-to-end flows through the public controller API.

use dashbot_core::{
    ActionKind, BotController, BotMode, InputEvent, LearningOutcome, RecordingInput,
};

/// Deterministic stand-in for a level: every death is the first position at or
/// past `wall` unless a click fired within `clear` units before it.
fn run_attempt(bot: &mut BotController<RecordingInput>, wall: f32, clear: f32) -> Option<f32> {
    let mut last_click: Option<f32> = None;
    let mut x = 0.0f32;
    while x <= wall + 50.0 {
        bot.on_tick(x);
        if bot.input_mut().take().contains(&InputEvent::Press) {
            last_click = Some(x);
        }
        if x >= wall {
            let cleared = last_click.is_some_and(|at| wall - at <= clear && at <= wall);
            if !cleared {
                return Some(x);
            }
        }
        x += 2.5;
    }
    None
}

#[test]
fn pathfinding_learns_a_single_wall_and_replays_it() {
    let mut bot = BotController::new(RecordingInput::new());
    bot.start_pathfind();

    let mut completed_at = None;
    for attempt in 1..=20 {
        match run_attempt(&mut bot, 200.0, 40.0) {
            Some(death_x) => {
                bot.on_attempt_end(death_x);
                bot.on_attempt_reset();
            }
            None => {
                completed_at = Some(attempt);
                break;
            }
        }
    }

    // Attempt 1 sets the best mark, attempt 2 inserts 175, attempt 3 clears.
    assert_eq!(completed_at, Some(3));
    assert_eq!(bot.timeline().len(), 1);
    assert_eq!(bot.timeline().get(0).unwrap().position, 175.0);

    bot.start_replay().unwrap();
    assert_eq!(bot.mode(), BotMode::Replaying);
    assert_eq!(run_attempt(&mut bot, 200.0, 40.0), None);
    bot.on_attempt_reset();
    assert_eq!(run_attempt(&mut bot, 200.0, 40.0), None);
}

#[test]
fn invariants_hold_across_long_pathfinding_sessions() {
    let mut bot = BotController::new(RecordingInput::new());
    bot.start_pathfind();

    let deaths = [
        120.0, 120.0, 118.0, 121.0, 90.0, 400.0, 399.0, 398.5, 401.0, 12.0, 250.0, 600.0,
    ];
    let mut last_best = 0.0f32;
    for round in 0..30 {
        for (i, base) in deaths.iter().enumerate() {
            let x = base + ((round * 7 + i) % 11) as f32;
            bot.on_attempt_end(x);
            bot.on_attempt_reset();

            let xs: Vec<f32> = bot.timeline().iter().map(|a| a.position).collect();
            for pair in xs.windows(2) {
                assert!(pair[0] < pair[1]);
                assert!(pair[1] - pair[0] >= 5.0);
            }
            assert!(xs.iter().all(|x| *x > 0.0));
            assert!(bot.stats().best_progress >= last_best);
            last_best = bot.stats().best_progress;
        }
    }
    assert_eq!(bot.stats().attempt_count, 30 * deaths.len() as u32);
}

#[test]
fn hold_entries_are_released_at_every_attempt_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hold.json");
    std::fs::write(
        &path,
        r#"{"best":300,"actions":[{"x":50,"t":1},{"x":150,"t":2}]}"#,
    )
    .unwrap();

    let mut bot = BotController::new(RecordingInput::new());
    bot.load(&path).unwrap();
    bot.start_replay().unwrap();

    for x in [0.0, 25.0, 60.0, 100.0] {
        bot.on_tick(x);
    }
    assert!(bot.input().pressed);

    // Death mid-hold: replay mode does not learn but the hold must not leak.
    assert_eq!(bot.on_attempt_end(100.0), LearningOutcome::Inactive);
    bot.on_attempt_reset();
    assert!(!bot.input().pressed);
    assert_eq!(
        bot.input_mut().take(),
        vec![InputEvent::Press, InputEvent::Release]
    );

    for x in [0.0, 60.0, 160.0] {
        bot.on_tick(x);
    }
    assert!(!bot.input().pressed);
    assert_eq!(bot.timeline().get(0).unwrap().kind, ActionKind::HoldStart);
}
