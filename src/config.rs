//! Built-in settings for the rover.
//!
//! There is no configuration file. Every tunable lives in a plain struct
//! with a `Default` impl, and the only runtime choice is which
//! [`ControllerProfile`] matches the connected gamepad.

use crate::controller::scaler::AxisRange;
use ev3dev_lang_rust::motors::MotorPort;

/// Gains and pacing for the Actuation Loop.
#[derive(Clone, Debug)]
pub struct DriveSettings {
    /// Multiplier applied to `steering` before the steering drive.
    pub steering_factor: f32,

    /// Multiplier applied to `speed` before the steering drive.
    pub speed_factor: f32,

    /// Multiplier applied to `turn_speed` for each track while spinning.
    pub spin_factor: f32,

    /// Multiplier applied to the auxiliary speeds (+/-200 becomes +/-40%).
    pub aux_factor: f32,

    /// How often the loop reports its tick rate.
    pub stats_interval_secs: i64,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            steering_factor: 1.0,
            speed_factor: 0.3,
            spin_factor: 0.5,
            aux_factor: 0.2,
            stats_interval_secs: 10,
        }
    }
}

/// Thresholds the Event Reader applies to incoming events.
#[derive(Clone, Debug)]
pub struct ReaderSettings {
    /// Scaled stick magnitudes below this are forced to zero.
    pub stick_deadzone: f32,

    /// Scaled right-stick X magnitude at which an in-place turn starts.
    pub turn_threshold: f32,

    /// Gain from scaled right-stick X to `turn_speed`.
    pub turn_factor: f32,

    /// Raw trigger-axis value above which a trigger counts as pulled.
    pub trigger_threshold: i32,

    /// Magnitude written to the auxiliary speeds by triggers and bumpers.
    pub aux_speed: i32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            stick_deadzone: 15.0,
            turn_threshold: 20.0,
            turn_factor: 0.4,
            trigger_threshold: 10,
            aux_speed: 200,
        }
    }
}

/// A gamepad model the rover knows how to read.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerProfile {
    /// Exact device name reported by the input subsystem.
    pub name: &'static str,

    /// Raw range of the analog sticks, low end first.
    pub stick_range: AxisRange,
}

pub const LOGITECH_F710: ControllerProfile = ControllerProfile {
    name: "Logitech Gamepad F710",
    stick_range: AxisRange::new(32768.0, -32768.0),
};

pub const PS3_SIXAXIS: ControllerProfile = ControllerProfile {
    name: "PLAYSTATION(R)3 Controller",
    stick_range: AxisRange::new(0.0, 255.0),
};

/// Profiles in matching priority order.
pub const KNOWN_CONTROLLERS: [ControllerProfile; 2] = [LOGITECH_F710, PS3_SIXAXIS];

/// Where each motor is plugged into the EV3 brick.
#[derive(Clone, Debug)]
pub struct PortLayout {
    pub front: MotorPort,
    pub rear: MotorPort,
    pub drive_left: MotorPort,
    pub drive_right: MotorPort,
}

impl Default for PortLayout {
    fn default() -> Self {
        Self {
            front: MotorPort::OutA,
            rear: MotorPort::OutD,
            drive_left: MotorPort::OutC,
            drive_right: MotorPort::OutB,
        }
    }
}
