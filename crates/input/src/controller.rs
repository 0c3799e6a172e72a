/// Number of tracked motion controllers. Fixed by the platform.
pub const CONTROLLER_COUNT: usize = 2;

/// Latest known state of one motion controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub connected: bool,
    pub select_pressed: bool,
}

/// Signals emitted by the platform input layer for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerSignal {
    Connected,
    Disconnected,
    SelectStart,
    SelectEnd,
}

/// Both controller slots.
#[derive(Debug, Clone, Default)]
pub struct Controllers {
    slots: [ControllerState; CONTROLLER_COUNT],
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a platform signal to slot `index`. Returns false for an unknown slot.
    pub fn apply(&mut self, index: usize, signal: ControllerSignal) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::warn!(index, ?signal, "signal for unknown controller slot ignored");
            return false;
        };
        match signal {
            ControllerSignal::Connected => slot.connected = true,
            ControllerSignal::Disconnected => *slot = ControllerState::default(),
            ControllerSignal::SelectStart => slot.select_pressed = true,
            ControllerSignal::SelectEnd => slot.select_pressed = false,
        }
        tracing::trace!(index, ?signal, "controller signal");
        true
    }

    pub fn get(&self, index: usize) -> Option<&ControllerState> {
        self.slots.get(index)
    }

    pub fn any_select_pressed(&self) -> bool {
        self.slots.iter().any(|s| s.select_pressed)
    }

    pub fn any_connected(&self) -> bool {
        self.slots.iter().any(|s| s.connected)
    }
}
