//! Actuator abstractions.
//!
//! A [`Motor`] takes a signed speed in percent. Two motors form a
//! [`MotorPair`], which can be driven either with a steering bias
//! ([`SteeringDrive`]) or with independent track speeds ([`TankDrive`]).

use std::fmt::Debug;
use tracing::debug;

/// Largest speed magnitude accepted by any motor, in percent.
pub const MAX_SPEED: f32 = 100.0;

pub fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(-MAX_SPEED, MAX_SPEED)
}

/// A single motor.
pub trait Motor: Debug {
    /// Runs the motor at `speed` percent until told otherwise.
    fn on(&mut self, speed: f32);

    fn stop(&mut self);
}

impl<M: Motor + ?Sized> Motor for Box<M> {
    fn on(&mut self, speed: f32) {
        (**self).on(speed)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Drive that combines a steering bias with a forward speed.
pub trait SteeringDrive {
    /// `steering` in `[-100, 100]`: 0 is straight, +/-50 pivots on one
    /// track, +/-100 spins in place.
    fn on_steering(&mut self, steering: f32, speed: f32);
}

/// Drive with independently controlled left and right tracks.
pub trait TankDrive {
    fn on_tank(&mut self, left: f32, right: f32);
}

/// A drive base usable both ways.
pub trait DriveBase: SteeringDrive + TankDrive + Debug {
    fn stop(&mut self);
}

impl<D: DriveBase + ?Sized> SteeringDrive for Box<D> {
    fn on_steering(&mut self, steering: f32, speed: f32) {
        (**self).on_steering(steering, speed)
    }
}

impl<D: DriveBase + ?Sized> TankDrive for Box<D> {
    fn on_tank(&mut self, left: f32, right: f32) {
        (**self).on_tank(left, right)
    }
}

impl<D: DriveBase + ?Sized> DriveBase for Box<D> {
    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Splits `(steering, speed)` into `(left, right)` track speeds.
///
/// Both tracks start at `speed`; the track on the inside of the turn is
/// multiplied by `(50 - |steering|) / 50`.
pub fn steering_to_tank(steering: f32, speed: f32) -> (f32, f32) {
    let steering = clamp_speed(steering);
    let factor = (50.0 - steering.abs()) / 50.0;
    if steering >= 0.0 {
        (speed, speed * factor)
    } else {
        (speed * factor, speed)
    }
}

/// Left and right drive motors.
#[derive(Debug)]
pub struct MotorPair<L, R> {
    left: L,
    right: R,
}

impl<L: Motor, R: Motor> MotorPair<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L: Motor, R: Motor> SteeringDrive for MotorPair<L, R> {
    fn on_steering(&mut self, steering: f32, speed: f32) {
        let (left, right) = steering_to_tank(steering, speed);
        self.on_tank(left, right);
    }
}

impl<L: Motor, R: Motor> TankDrive for MotorPair<L, R> {
    fn on_tank(&mut self, left: f32, right: f32) {
        self.left.on(clamp_speed(left));
        self.right.on(clamp_speed(right));
    }
}

impl<L: Motor, R: Motor> DriveBase for MotorPair<L, R> {
    fn stop(&mut self) {
        debug!("Stopping drive motors");
        self.left.stop();
        self.right.stop();
    }
}

/// Every actuator the rover owns. The auxiliary motors are `None` when
/// they were not found at startup and stay that way.
#[derive(Debug)]
pub struct Drivetrain<D, M> {
    pub drive: D,
    pub front: Option<M>,
    pub rear: Option<M>,
}

impl<D: DriveBase, M: Motor> Drivetrain<D, M> {
    pub fn new(drive: D, front: Option<M>, rear: Option<M>) -> Self {
        Self { drive, front, rear }
    }

    /// Stops the drive and every auxiliary motor that is present.
    pub fn stop_all(&mut self) {
        self.drive.stop();
        for motor in [self.front.as_mut(), self.rear.as_mut()].into_iter().flatten() {
            motor.stop();
        }
    }
}

/// Drivetrain with the concrete hardware erased.
pub type DynDrivetrain = Drivetrain<Box<dyn DriveBase>, Box<dyn Motor>>;

#[cfg(test)]
pub(crate) mod testing {
    //! Recording motors for tests.

    use super::Motor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    pub enum Command {
        On(f32),
        Stop,
    }

    /// Motor that appends every command to a shared log.
    #[derive(Clone, Debug, Default)]
    pub struct RecordingMotor {
        pub log: Arc<Mutex<Vec<Command>>>,
    }

    impl RecordingMotor {
        pub fn commands(&self) -> Vec<Command> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Motor for RecordingMotor {
        fn on(&mut self, speed: f32) {
            self.log.lock().unwrap().push(Command::On(speed));
        }

        fn stop(&mut self) {
            self.log.lock().unwrap().push(Command::Stop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Command, RecordingMotor};
    use super::*;

    #[test]
    fn straight_ahead_drives_both_tracks_equally() {
        assert_eq!(steering_to_tank(0.0, 30.0), (30.0, 30.0));
    }

    #[test]
    fn steering_slows_the_inside_track() {
        assert_eq!(steering_to_tank(25.0, 40.0), (40.0, 20.0));
        assert_eq!(steering_to_tank(-25.0, 40.0), (20.0, 40.0));
        assert_eq!(steering_to_tank(50.0, 40.0), (40.0, 0.0));
    }

    #[test]
    fn full_steering_spins_in_place() {
        assert_eq!(steering_to_tank(100.0, 30.0), (30.0, -30.0));
        assert_eq!(steering_to_tank(-100.0, 30.0), (-30.0, 30.0));
    }

    #[test]
    fn tank_speeds_are_clamped() {
        let left = RecordingMotor::default();
        let right = RecordingMotor::default();
        let mut pair = MotorPair::new(left.clone(), right.clone());

        pair.on_tank(150.0, -120.0);

        assert_eq!(left.commands(), vec![Command::On(100.0)]);
        assert_eq!(right.commands(), vec![Command::On(-100.0)]);
    }

    #[test]
    fn stop_all_skips_missing_aux_motors() {
        let left = RecordingMotor::default();
        let right = RecordingMotor::default();
        let rear = RecordingMotor::default();
        let mut drivetrain = Drivetrain::new(
            MotorPair::new(left.clone(), right.clone()),
            None,
            Some(rear.clone()),
        );

        drivetrain.stop_all();

        assert_eq!(left.commands(), vec![Command::Stop]);
        assert_eq!(right.commands(), vec![Command::Stop]);
        assert_eq!(rear.commands(), vec![Command::Stop]);
    }
}
