use crate::input::InputSink;
use crate::timeline::{ActionKind, ActionTimeline};

/// Cursor over the timeline that fires actions as the player passes them.
///
/// `cursor` only moves forward between resets and every entry with
/// `position <= current` is dispatched exactly once, in timeline order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayEngine {
    cursor: usize,
    holding: bool,
}

impl ReplayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Fires every entry that has come due at `position`. Returns how many.
    pub fn advance<I: InputSink + ?Sized>(
        &mut self,
        timeline: &ActionTimeline,
        position: f32,
        input: &mut I,
    ) -> usize {
        // A NaN sample is not past anything.
        if position.is_nan() {
            return 0;
        }
        let mut fired = 0usize;
        while let Some(action) = timeline.get(self.cursor) {
            if position < action.position {
                break;
            }
            match action.kind {
                ActionKind::Click => {
                    input.press();
                    input.release();
                }
                ActionKind::HoldStart => {
                    input.press();
                    self.holding = true;
                }
                ActionKind::HoldEnd => {
                    input.release();
                    self.holding = false;
                }
            }
            tracing::trace!(
                cursor = self.cursor,
                at = action.position,
                kind = ?action.kind,
                "dispatched action"
            );
            self.cursor += 1;
            fired += 1;
        }
        fired
    }

    pub fn force_release<I: InputSink + ?Sized>(&mut self, input: &mut I) {
        if self.holding {
            input.release();
            self.holding = false;
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Attempt boundary: let go of any held input and rewind.
    pub fn reset_attempt<I: InputSink + ?Sized>(&mut self, input: &mut I) {
        self.force_release(input);
        self.reset_cursor();
    }
}
