use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTION_KIND_CLICK, ACTION_KIND_HOLD_END, ACTION_KIND_HOLD_START, DEDUPE_DISTANCE,
};
use crate::error::DecodeError;

/// What the replay engine does with the input when an entry comes due.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ActionKind {
    Click,
    HoldStart,
    HoldEnd,
}

impl ActionKind {
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Self::Click => ACTION_KIND_CLICK,
            Self::HoldStart => ACTION_KIND_HOLD_START,
            Self::HoldEnd => ACTION_KIND_HOLD_END,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, DecodeError> {
        match code {
            c if c == ACTION_KIND_CLICK as i64 => Ok(Self::Click),
            c if c == ACTION_KIND_HOLD_START as i64 => Ok(Self::HoldStart),
            c if c == ACTION_KIND_HOLD_END as i64 => Ok(Self::HoldEnd),
            other => Err(DecodeError::UnknownActionKind { found: other }),
        }
    }
}

impl From<ActionKind> for u8 {
    fn from(kind: ActionKind) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for ActionKind {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code as i64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "x")]
    pub position: f32,
    #[serde(rename = "t")]
    pub kind: ActionKind,
}

impl Action {
    pub fn new(position: f32, kind: ActionKind) -> Self {
        Self { position, kind }
    }
}

/// Sorted, deduplicated schedule of input actions keyed by horizontal position.
///
/// Entries are kept ascending by position and no two entries are closer than
/// the dedupe distance. An insert that would break the spacing is rejected
/// outright rather than merged with its neighbour.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionTimeline {
    actions: Vec<Action>,
    dedupe_distance: f32,
}

impl Default for ActionTimeline {
    fn default() -> Self {
        Self::new(DEDUPE_DISTANCE)
    }
}

impl ActionTimeline {
    pub fn new(dedupe_distance: f32) -> Self {
        Self {
            actions: Vec::new(),
            dedupe_distance,
        }
    }

    /// Rebuilds a timeline from decoded entries under the normal insert rules.
    /// Returns the timeline and the number of entries dropped as duplicates.
    pub fn from_actions<I>(actions: I, dedupe_distance: f32) -> (Self, usize)
    where
        I: IntoIterator<Item = Action>,
    {
        let mut timeline = Self::new(dedupe_distance);
        let mut rejected = 0usize;
        for action in actions {
            if !timeline.insert(action.position, action.kind) {
                rejected += 1;
            }
        }
        (timeline, rejected)
    }

    pub fn dedupe_distance(&self) -> f32 {
        self.dedupe_distance
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    /// Inserts an action unless an existing entry lies within
    /// `[x - dedupe, x + dedupe]`. Returns whether the timeline changed.
    pub fn insert(&mut self, x: f32, kind: ActionKind) -> bool {
        if !x.is_finite() {
            return false;
        }
        let lo = x - self.dedupe_distance;
        let hi = x + self.dedupe_distance;
        if self
            .actions
            .iter()
            .any(|action| action.position >= lo && action.position <= hi)
        {
            return false;
        }

        let at = self.actions.partition_point(|action| action.position < x);
        self.actions.insert(at, Action::new(x, kind));
        true
    }

    /// Removes the highest entry with position in `(x - window, x)`.
    pub fn remove_nearest_before(&mut self, x: f32, window: f32) -> Option<f32> {
        let idx = self
            .actions
            .iter()
            .rposition(|action| action.position > x - window && action.position < x)?;
        Some(self.actions.remove(idx).position)
    }

    /// Drops every entry strictly past `threshold`. Returns how many went.
    pub fn purge_after(&mut self, threshold: f32) -> usize {
        let before = self.actions.len();
        self.actions.retain(|action| action.position <= threshold);
        before - self.actions.len()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl<'a> IntoIterator for &'a ActionTimeline {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
