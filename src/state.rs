//! Motion intent shared between the Event Reader and the Actuation Loop.
//!
//! The reader writes through [`SharedIntent::update`], the actuation loop
//! takes a [`MotionIntent`] copy once per tick via [`SharedIntent::snapshot`].
//! A tick may see a value one event late; the control domain tolerates that.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Current operator intent. All fields are plain values so a snapshot is a
/// cheap copy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionIntent {
    /// Forward/backward drive, `[-100, 100]`.
    pub speed: f32,
    /// Left/right steering bias, `[-100, 100]`.
    pub steering: f32,
    /// In-place rotation magnitude, only applied while `turning`.
    pub turn_speed: f32,
    pub turning: bool,
    /// Front auxiliary motor, one of -200, 0, 200.
    pub speed_front: i32,
    /// Rear auxiliary motor, one of -200, 0, 200.
    pub speed_rear: i32,
    /// +1 or -1.
    pub invert_drive: i32,
    pub running: bool,
}

impl Default for MotionIntent {
    fn default() -> Self {
        Self {
            speed: 0.0,
            steering: 0.0,
            turn_speed: 0.0,
            turning: false,
            speed_front: 0,
            speed_rear: 0,
            invert_drive: 1,
            running: true,
        }
    }
}

impl MotionIntent {
    /// Flips forward/backward semantics.
    pub fn toggle_invert(&mut self) {
        self.invert_drive = -self.invert_drive;
    }
}

/// Cloneable handle to the single intent record.
///
/// The `running` flag lives in a [`CancellationToken`] so that stopping is
/// visible without taking the lock and can be awaited.
#[derive(Clone, Debug, Default)]
pub struct SharedIntent {
    inner: Arc<Mutex<MotionIntent>>,
    shutdown: CancellationToken,
}

impl SharedIntent {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MotionIntent> {
        // The record holds plain values, a panicked writer cannot leave it invalid
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current intent with `running` taken from the token.
    pub fn snapshot(&self) -> MotionIntent {
        let mut intent = *self.lock();
        intent.running = self.is_running();
        intent
    }

    /// Applies `f` to the record under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut MotionIntent) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Sets `running = false` for both loops. Idempotent.
    pub fn stop(&self) {
        self.lock().running = false;
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
