use glam::IVec2;

use crate::action::{Action, Key};

/// Signed unit intents set by held keys.
///
/// `strafe.x` is forward/back (forward is -1), `strafe.y` is left/right
/// (left is -1). `rotate.x` is pitch (up is -1), `rotate.y` is yaw (left is -1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionIntent {
    pub strafe: IVec2,
    pub rotate: IVec2,
}

impl MotionIntent {
    pub fn is_idle(&self) -> bool {
        self.strafe == IVec2::ZERO && self.rotate == IVec2::ZERO
    }
}

/// Maps key press/release events to a [`MotionIntent`] and [`Action`]s.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    intent: MotionIntent,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current intent, read by the camera each tick.
    pub fn intent(&self) -> MotionIntent {
        self.intent
    }

    /// Handle a key press. Movement keys update the intent; command keys
    /// return the action for the caller to apply.
    pub fn key_down(&mut self, key: Key) -> Option<Action> {
        let i = &mut self.intent;
        match key {
            Key::W => i.strafe.x = -1,
            Key::S => i.strafe.x = 1,
            Key::A => i.strafe.y = -1,
            Key::D => i.strafe.y = 1,
            Key::Up => i.rotate.x = -1,
            Key::Down => i.rotate.x = 1,
            Key::Left => i.rotate.y = -1,
            Key::Right => i.rotate.y = 1,
            Key::R => return Some(Action::ResetCamera),
            Key::Enter => return Some(Action::ToggleRunning),
            Key::Tab => return Some(Action::NextPreset),
        }
        tracing::trace!(?key, intent = ?self.intent, "intent updated");
        None
    }

    /// Handle a key release: zero the axis the key controls, whichever key
    /// last set it.
    pub fn key_up(&mut self, key: Key) {
        let i = &mut self.intent;
        match key {
            Key::W | Key::S => i.strafe.x = 0,
            Key::A | Key::D => i.strafe.y = 0,
            Key::Up | Key::Down => i.rotate.x = 0,
            Key::Left | Key::Right => i.rotate.y = 0,
            Key::R | Key::Enter | Key::Tab => {}
        }
    }

    /// Drop every held intent, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.intent = MotionIntent::default();
    }
}
