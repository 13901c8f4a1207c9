//! LEGO EV3 motor backend on top of `ev3dev-lang-rust`.
//!
//! Drive motors are large tacho motors, the auxiliary ones medium motors.
//! Speeds arrive in percent and are converted to `speed_sp` counts using
//! each motor's reported maximum speed.

use crate::config::PortLayout;
use crate::drive::hal::{
    clamp_speed, DriveBase, Drivetrain, DynDrivetrain, Motor, MotorPair, MAX_SPEED,
};
use crate::drive::DriveError;
use ev3dev_lang_rust::motors::{LargeMotor, MediumMotor, MotorPort};
use ev3dev_lang_rust::{Ev3Error, Ev3Result};
use std::fmt;
use tracing::{debug, info, warn};

/// The tacho motor operations the rover needs.
pub trait TachoControl: Sized {
    const KIND: &'static str;

    fn connect(port: MotorPort) -> Ev3Result<Self>;
    fn max_speed(&self) -> Ev3Result<i32>;
    fn set_speed(&self, speed_sp: i32) -> Ev3Result<()>;
    fn run(&self) -> Ev3Result<()>;
    fn halt(&self) -> Ev3Result<()>;
}

macro_rules! tacho_control {
    ($($motor:ty => $kind:literal),* $(,)?) => {
        $(
            impl TachoControl for $motor {
                const KIND: &'static str = $kind;

                fn connect(port: MotorPort) -> Ev3Result<Self> {
                    <$motor>::get(port)
                }

                fn max_speed(&self) -> Ev3Result<i32> {
                    self.get_max_speed()
                }

                fn set_speed(&self, speed_sp: i32) -> Ev3Result<()> {
                    self.set_speed_sp(speed_sp)
                }

                fn run(&self) -> Ev3Result<()> {
                    self.run_forever()
                }

                fn halt(&self) -> Ev3Result<()> {
                    self.stop()
                }
            }
        )*
    };
}

tacho_control!(LargeMotor => "large", MediumMotor => "medium");

pub fn port_letter(port: MotorPort) -> char {
    match port {
        MotorPort::OutA => 'A',
        MotorPort::OutB => 'B',
        MotorPort::OutC => 'C',
        MotorPort::OutD => 'D',
    }
}

/// Converts a percentage into tacho counts per second.
pub fn speed_sp(percent: f32, max_speed: i32) -> i32 {
    (clamp_speed(percent) / MAX_SPEED * max_speed as f32).round() as i32
}

pub struct Ev3Motor<T> {
    motor: T,
    port: MotorPort,
    max_speed: i32,
}

impl<T: TachoControl> Ev3Motor<T> {
    pub fn connect(port: MotorPort) -> Result<Self, DriveError> {
        let not_found = |e: Ev3Error| DriveError::MotorNotFound {
            port: port_letter(port),
            reason: format!("{:?}", e),
        };
        let motor = T::connect(port).map_err(not_found)?;
        let max_speed = motor.max_speed().map_err(not_found)?;
        debug!(
            "Connected {} motor on port {} (max speed {})",
            T::KIND,
            port_letter(port),
            max_speed
        );
        Ok(Self {
            motor,
            port,
            max_speed,
        })
    }
}

impl<T> fmt::Debug for Ev3Motor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ev3Motor")
            .field("port", &port_letter(self.port))
            .field("max_speed", &self.max_speed)
            .finish()
    }
}

impl<T: TachoControl> Motor for Ev3Motor<T> {
    fn on(&mut self, speed: f32) {
        let sp = speed_sp(speed, self.max_speed);
        // Runs every tick, failures are only worth a debug line
        if let Err(e) = self.motor.set_speed(sp).and_then(|_| self.motor.run()) {
            debug!("Port {} rejected speed {}: {:?}", port_letter(self.port), sp, e);
        }
    }

    fn stop(&mut self) {
        if let Err(e) = self.motor.halt() {
            warn!("Failed to stop motor on port {}: {:?}", port_letter(self.port), e);
        }
    }
}

fn optional_motor<T: TachoControl + 'static>(port: MotorPort) -> Option<Box<dyn Motor>> {
    match Ev3Motor::<T>::connect(port) {
        Ok(motor) => Some(Box::new(motor)),
        Err(e) => {
            warn!("No motor found in port {}", port_letter(port));
            debug!("{}", e);
            None
        }
    }
}

/// Finds every motor described by `layout`.
///
/// The drive motors are mandatory. A missing auxiliary motor is logged and
/// left out for the rest of the run.
pub fn detect(layout: &PortLayout) -> Result<DynDrivetrain, DriveError> {
    info!("Detecting motors");
    let front = optional_motor::<MediumMotor>(layout.front);
    let rear = optional_motor::<MediumMotor>(layout.rear);

    let left = Ev3Motor::<LargeMotor>::connect(layout.drive_left)?;
    let right = Ev3Motor::<LargeMotor>::connect(layout.drive_right)?;
    let drive: Box<dyn DriveBase> = Box::new(MotorPair::new(left, right));

    info!(
        "Drive on ports {}/{}, front motor {}, rear motor {}",
        port_letter(layout.drive_left),
        port_letter(layout.drive_right),
        if front.is_some() { "present" } else { "absent" },
        if rear.is_some() { "present" } else { "absent" },
    );
    Ok(Drivetrain::new(drive, front, rear))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_maps_onto_max_speed() {
        assert_eq!(speed_sp(100.0, 1050), 1050);
        assert_eq!(speed_sp(-50.0, 1050), -525);
        assert_eq!(speed_sp(0.0, 1560), 0);
    }

    #[test]
    fn out_of_range_percent_is_clamped() {
        assert_eq!(speed_sp(140.0, 1000), 1000);
        assert_eq!(speed_sp(-400.0, 1000), -1000);
    }

    #[test]
    fn ports_print_as_letters() {
        assert_eq!(port_letter(MotorPort::OutA), 'A');
        assert_eq!(port_letter(MotorPort::OutD), 'D');
    }
}
