//! Save-file codec.
//!
//! Current layout (pretty-printed JSON):
//!   `{"version": 1, "best": <f32>, "actions": [{"x": <f32>, "t": <0|1|2>}, ...]}`
//!
//! Legacy layout (no version, written on one line):
//!   `{"best":<f32>,"actions":[{"x":<f32>,"t":<int>},...]}`
//!
//! Legacy files are read by locating the literal `"best":`, `"x":` and `"t":`
//! markers rather than by parsing structure, so hand-edited files with stray
//! text between records still load. `t` codes: 0 = click, 1 = hold start,
//! 2 = hold end.

use serde::{Deserialize, Serialize};

use crate::constants::SAVE_FORMAT_VERSION;
use crate::error::DecodeError;
use crate::timeline::{Action, ActionKind, ActionTimeline};

const VERSION_MARKER: &str = "\"version\"";
const BEST_MARKER: &str = "\"best\":";
const ACTIONS_MARKER: &str = "\"actions\":";
const X_MARKER: &str = "\"x\":";
const T_MARKER: &str = "\"t\":";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub version: u32,
    pub best: f32,
    pub actions: Vec<Action>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl SaveDocument {
    pub fn capture(best: f32, timeline: &ActionTimeline) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            best,
            actions: timeline.iter().copied().collect(),
        }
    }

    /// Rebuilds a timeline under the given dedupe distance. Also returns how
    /// many stored entries were dropped as too close to a neighbour.
    pub fn into_timeline(self, dedupe_distance: f32) -> (f32, ActionTimeline, usize) {
        let (timeline, rejected) = ActionTimeline::from_actions(self.actions, dedupe_distance);
        (self.best, timeline, rejected)
    }
}

pub fn encode(doc: &SaveDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Writes the unversioned single-line layout older builds understand.
pub fn encode_legacy(best: f32, actions: &[Action]) -> String {
    let mut out = format!("{{{BEST_MARKER}{best},{ACTIONS_MARKER}[");
    for (i, action) in actions.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            "{{{X_MARKER}{},{T_MARKER}{}}}",
            action.position,
            action.kind.code()
        ));
    }
    out.push_str("]}");
    out
}

pub fn decode(text: &str) -> Result<SaveDocument, DecodeError> {
    if text.contains(VERSION_MARKER) {
        decode_versioned(text)
    } else {
        decode_legacy(text)
    }
}

fn decode_versioned(text: &str) -> Result<SaveDocument, DecodeError> {
    let probe: VersionProbe = serde_json::from_str(text).map_err(json_error)?;
    if probe.version == 0 || probe.version > SAVE_FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: probe.version,
            supported: SAVE_FORMAT_VERSION,
        });
    }
    let doc: SaveDocument = serde_json::from_str(text).map_err(json_error)?;
    // serde narrows out-of-range numbers to infinity rather than failing.
    if !doc.best.is_finite() {
        return Err(DecodeError::NotFinite { field: "best" });
    }
    if doc.actions.iter().any(|action| !action.position.is_finite()) {
        return Err(DecodeError::NotFinite { field: "x" });
    }
    Ok(doc)
}

pub fn decode_legacy(text: &str) -> Result<SaveDocument, DecodeError> {
    let best_at = text
        .find(BEST_MARKER)
        .ok_or(DecodeError::MissingField { field: "best" })?;
    let (best, _) = read_f32(text, best_at + BEST_MARKER.len(), "best")?;

    let mut actions = Vec::new();
    if let Some(actions_at) = text.find(ACTIONS_MARKER) {
        let mut cursor = actions_at + ACTIONS_MARKER.len();
        while let Some(rel) = text[cursor..].find(X_MARKER) {
            let (position, after_x) = read_f32(text, cursor + rel + X_MARKER.len(), "x")?;
            let record_end = text[after_x..]
                .find(X_MARKER)
                .map_or(text.len(), |rel| after_x + rel);
            let t_rel = text[after_x..record_end]
                .find(T_MARKER)
                .ok_or(DecodeError::MissingField { field: "t" })?;
            let t_start = after_x + t_rel + T_MARKER.len();
            let (token, after_t) = number_token(text, t_start);
            let code = token.parse::<i64>().map_err(|_| DecodeError::InvalidNumber {
                field: "t",
                offset: t_start,
            })?;
            actions.push(Action::new(position, ActionKind::from_code(code)?));
            cursor = after_t;
        }
    }

    Ok(SaveDocument {
        version: 0,
        best,
        actions,
    })
}

fn read_f32(text: &str, start: usize, field: &'static str) -> Result<(f32, usize), DecodeError> {
    let (token, end) = number_token(text, start);
    match token.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok((value, end)),
        _ => Err(DecodeError::InvalidNumber {
            field,
            offset: start,
        }),
    }
}

/// Skips leading whitespace and returns the run of number-ish characters.
fn number_token(text: &str, start: usize) -> (&str, usize) {
    let rest = &text[start..];
    let trimmed = rest.trim_start();
    let begin = start + (rest.len() - trimmed.len());
    let len = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    (&text[begin..begin + len], begin + len)
}

fn json_error(err: serde_json::Error) -> DecodeError {
    DecodeError::Json {
        message: err.to_string(),
    }
}
