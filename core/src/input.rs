/// Binary digital control exposed by the host (the jump button).
pub trait InputSink {
    fn press(&mut self);
    fn release(&mut self);
}

impl<T: InputSink + ?Sized> InputSink for &mut T {
    fn press(&mut self) {
        (**self).press();
    }

    fn release(&mut self) {
        (**self).release();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Press,
    Release,
}

/// Sink that just remembers what it was told, for headless hosts and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingInput {
    pub events: Vec<InputEvent>,
    pub pressed: bool,
}

impl RecordingInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}

impl InputSink for RecordingInput {
    fn press(&mut self) {
        self.pressed = true;
        self.events.push(InputEvent::Press);
    }

    fn release(&mut self) {
        self.pressed = false;
        self.events.push(InputEvent::Release);
    }
}
