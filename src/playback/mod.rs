pub mod clock;
pub mod engine;
pub mod gap;

pub use clock::{AnimationClock, SystemClock, TickToken, TimeSource};
pub use engine::{CarFrameState, Frame, PlaybackEngine, VisibilityMap};

/// Animation loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
}
