/// Keys the viewer reacts to. Windowing backends translate their own key
/// codes into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    R,
    Enter,
    Tab,
}

/// A discrete command produced by a key press.
///
/// Held keys become [`MotionIntent`](crate::MotionIntent) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Flip the run/pause gate on point generation.
    ToggleRunning,
    /// Put the camera back at its home position and rotation.
    ResetCamera,
    /// Swap the point source for the next built-in one.
    NextPreset,
}
