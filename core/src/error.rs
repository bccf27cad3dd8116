use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// Replay was requested while the timeline holds no actions.
    EmptyTimeline,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTimeline => write!(f, "cannot replay: the action timeline is empty"),
        }
    }
}

impl std::error::Error for ControlError {}

#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    MissingField { field: &'static str },
    InvalidNumber { field: &'static str, offset: usize },
    NotFinite { field: &'static str },
    UnknownActionKind { found: i64 },
    UnsupportedVersion { found: u32, supported: u32 },
    Json { message: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "save data has no `{field}` field"),
            Self::InvalidNumber { field, offset } => {
                write!(f, "value of `{field}` at byte {offset} is not a number")
            }
            Self::NotFinite { field } => write!(f, "value of `{field}` is out of range"),
            Self::UnknownActionKind { found } => {
                write!(f, "unknown action kind {found} (expected 0, 1 or 2)")
            }
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "unsupported save format version {found} (this build reads up to {supported})"
            ),
            Self::Json { message } => write!(f, "invalid save document: {message}"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug)]
pub enum PersistError {
    MissingSaveFile { path: PathBuf },
    Io { path: PathBuf, source: io::Error },
    Encode { source: serde_json::Error },
    Malformed { path: PathBuf, source: DecodeError },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSaveFile { path } => {
                write!(f, "no save file at {}", path.display())
            }
            Self::Io { path, source } => write!(f, "i/o error on {}: {source}", path.display()),
            Self::Encode { source } => write!(f, "failed to encode save data: {source}"),
            Self::Malformed { path, source } => {
                write!(f, "malformed save data in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingSaveFile { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Encode { source } => Some(source),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    NotPositive { field: &'static str, value: f32 },
    NotFinite { field: &'static str },
    EmptyRetreatTable,
    Parse { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "tuning value `{field}` must be > 0, got {value}")
            }
            Self::NotFinite { field } => write!(f, "tuning value `{field}` must be finite"),
            Self::EmptyRetreatTable => write!(f, "retreat_offsets must not be empty"),
            Self::Parse { message } => write!(f, "invalid tuning config: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}
