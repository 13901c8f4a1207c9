//! Motor side of the rover
//!
//! - [`hal`] - Motor and drive traits, steering mixing
//! - [`ev3`] - EV3 hardware backend
//! - [`actuation`] - The loop that applies the motion intent to the motors
//!
//! ```text
//! SharedIntent ──► ActuationLoop ──► Drivetrain ──► Motors
//!  (snapshot)      (busy loop)       (drive + aux)
//! ```

pub mod actuation;
pub mod ev3;
pub mod hal;

pub use actuation::{ActuationHandle, ActuationLoop};
pub use hal::{DriveBase, Drivetrain, DynDrivetrain, Motor, MotorPair, SteeringDrive, TankDrive};

/// Errors raised while setting up or running the motors
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// No usable motor at the expected port
    #[error("No motor found in port {port}: {reason}")]
    MotorNotFound { port: char, reason: String },

    /// The actuation task could not report back or panicked
    #[error("Actuation task failed: {0}")]
    TaskFailed(String),
}
