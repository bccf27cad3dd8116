//! Position-keyed input automation for side-scrolling obstacle games.
//!
//! A [`BotController`] owns a sorted [`ActionTimeline`], learns it by trial and
//! error from death positions ([`learning`]) and plays it back as the player
//! crosses each recorded position ([`replay`]).

pub mod codec;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod input;
pub mod learning;
pub mod replay;
pub mod timeline;

pub use config::TuningConfig;
pub use controller::{BotController, BotMode, BotStatus};
pub use error::{ConfigError, ControlError, DecodeError, PersistError};
pub use input::{InputEvent, InputSink, RecordingInput};
pub use learning::{LearningOutcome, LearningStats};
pub use timeline::{Action, ActionKind, ActionTimeline};
