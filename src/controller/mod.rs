//! Gamepad input subsystem
//!
//! Turns raw gamepad events into updates of the shared motion intent:
//!
//! 1. [`device`] - Controller discovery and the live event stream
//! 2. [`scaler`] - Raw axis range normalization and deadzone
//! 3. [`event_reader`] - Binding table and dispatch into [`SharedIntent`]
//!
//! # Architecture
//!
//! ```text
//! evdev ──► EvdevSource ──► EventReader ──► SharedIntent
//!           (Axis/Button)   (BindingTable)   (MotionIntent)
//! ```
//!
//! [`SharedIntent`]: crate::state::SharedIntent

pub mod device;
pub mod event;
pub mod event_reader;
pub mod scaler;

pub use device::{discover, select_controller, EvdevSource, EventSource};
pub use event::{ControllerEvent, EventClass};
pub use event_reader::{Binding, BindingTable, EventReader, ReaderExit};

/// Errors raised while finding or reading the gamepad
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// None of the connected input devices is a supported gamepad
    #[error("No supported controller found (saw: {})", seen.join(", "))]
    NoMatchingController { seen: Vec<String> },

    /// Reading from the device failed, usually because it disconnected
    #[error("Device error: {0}")]
    Device(#[from] std::io::Error),

    /// The controller went away
    #[error("Controller disconnected")]
    Disconnected,
}
