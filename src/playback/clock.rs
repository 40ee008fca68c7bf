use std::time::Instant;
use tracing::debug;

use super::PlaybackState;

/// Supplies the timestamp for each animation tick
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// Wall-clock time source
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Identifies the loop a tick was scheduled for.
///
/// Tokens from a cancelled loop are rejected, so a tick scheduled before a
/// cancel can never advance the next loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    epoch: u64,
}

/// Converts tick timestamps into seconds elapsed since the animation began
///
/// The start timestamp is captured on the first tick after a (re)start.
#[derive(Debug)]
pub struct AnimationClock {
    state: PlaybackState,
    start: Option<Instant>,
    epoch: u64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            start: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Begin a new loop, invalidating any tokens from a previous one
    pub fn start(&mut self) -> TickToken {
        self.epoch += 1;
        self.state = PlaybackState::Running;
        self.start = None;
        debug!("Animation loop started (epoch {})", self.epoch);
        TickToken { epoch: self.epoch }
    }

    /// Re-anchor the running loop to zero on its next tick.
    ///
    /// An idle clock is started.
    pub fn restart(&mut self) -> TickToken {
        if !self.is_running() {
            return self.start();
        }
        self.start = None;
        debug!("Animation loop restarted (epoch {})", self.epoch);
        TickToken { epoch: self.epoch }
    }

    /// Stop the loop. No-op when already idle.
    pub fn cancel(&mut self) {
        if !self.is_running() {
            return;
        }
        self.epoch += 1;
        self.state = PlaybackState::Idle;
        self.start = None;
        debug!("Animation loop cancelled");
    }

    /// Advance the loop to `now`, returning elapsed seconds.
    ///
    /// Returns `None` when idle or when `token` belongs to a cancelled loop.
    pub fn tick(&mut self, token: TickToken, now: Instant) -> Option<f64> {
        if !self.is_running() || token.epoch != self.epoch {
            return None;
        }
        let start = *self.start.get_or_insert(now);
        Some(now.saturating_duration_since(start).as_secs_f64())
    }
}
