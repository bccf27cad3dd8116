// Default tuning values. `TuningConfig::default()` is built from these and
// reproduces the stock fail table exactly.

/// Minimum spacing between two timeline entries.
pub const DEDUPE_DISTANCE: f32 = 5.0;
/// A death must beat the best mark by more than this to count as progress.
pub const PROGRESS_EPSILON: f32 = 2.0;
/// Search window used when pruning the entry nearest before a death.
pub const PRUNE_WINDOW: f32 = 80.0;
/// Distance behind the death point kept on a section reset.
pub const SECTION_RESET_WINDOW: f32 = 200.0;
/// Candidate offsets behind the death point for fail streaks 1..=5.
pub const RETREAT_OFFSETS: [f32; 5] = [25.0, 50.0, 15.0, 70.0, 8.0];
/// Candidate offset ahead of the death point, tried right after the prune step.
pub const LOOKAHEAD_OFFSET: f32 = 5.0;
/// Streaks above the lookahead step and up to this value do nothing.
pub const SECTION_RESET_AFTER: u32 = 10;

/// Persistence schema version written by `codec::encode`.
pub const SAVE_FORMAT_VERSION: u32 = 1;

pub const ACTION_KIND_CLICK: u8 = 0;
pub const ACTION_KIND_HOLD_START: u8 = 1;
pub const ACTION_KIND_HOLD_END: u8 = 2;
