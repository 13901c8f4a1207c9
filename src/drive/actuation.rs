//! Actuation Loop with statum state machine
//!
//! Applies the shared motion intent to the motors as fast as the scheduler
//! allows. There is no pacing: every tick takes a fresh snapshot and issues
//! commands straight away.
//!
//! # State Machine
//!
//! ```text
//! Idle ──► Running ──► Stopped
//!          (busy loop until the intent stops running)
//! ```
//!
//! While `turning` is set the loop spins in place with tank commands only
//! and never issues a steering command.

use crate::config::DriveSettings;
use crate::drive::hal::{DynDrivetrain, Motor, SteeringDrive, TankDrive};
use crate::drive::DriveError;
use crate::state::{MotionIntent, SharedIntent};
use chrono::Local;
use statum::{machine, state};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// States for the actuation lifecycle
#[state]
#[derive(Debug, Clone)]
pub enum ActuationState {
    Idle,    // Motors detected, nothing commanded yet
    Running, // Busy loop applying the intent
    Stopped, // All present motors stopped
}

#[machine]
pub struct ActuationLoop<S: ActuationState> {
    drivetrain: DynDrivetrain,
    intent: SharedIntent,
    settings: DriveSettings,
    ticks: u64,
}

impl<S: ActuationState> ActuationLoop<S> {
    /// Number of outer loop iterations so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl ActuationLoop<Idle> {
    pub fn create(
        drivetrain: DynDrivetrain,
        intent: SharedIntent,
        settings: Option<DriveSettings>,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating Actuation Loop with settings: {:?}", settings);
        Self::new(drivetrain, intent, settings, 0)
    }

    pub fn start(self) -> ActuationLoop<Running> {
        info!("Engine running!");
        self.transition()
    }
}

impl ActuationLoop<Running> {
    /// Loops until the intent stops running, then stops every present motor.
    pub fn run(mut self) -> ActuationLoop<Stopped> {
        let mut window_ticks: u64 = 0;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(self.settings.stats_interval_secs);

        while self.intent.is_running() {
            self.tick();
            window_ticks += 1;

            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "Actuation stats: {} ticks in last {} seconds (avg {:.0}/sec)",
                    window_ticks,
                    log_interval.num_seconds(),
                    window_ticks as f64 / log_interval.num_seconds() as f64
                );
                window_ticks = 0;
                last_log_time = now;
            }
        }

        info!("Stopping all motors after {} ticks", self.ticks);
        self.drivetrain.stop_all();
        self.transition()
    }

    /// One pass: either a steering command plus the auxiliary motors, or a
    /// full in-place spin that lasts as long as `turning` stays set.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let intent = self.intent.snapshot();

        if intent.turning {
            self.spin();
            return;
        }

        let invert = intent.invert_drive as f32;
        self.drivetrain.drive.on_steering(
            intent.steering * self.settings.steering_factor * invert,
            intent.speed * self.settings.speed_factor * invert,
        );
        self.drive_aux(&intent);
    }

    fn drive_aux(&mut self, intent: &MotionIntent) {
        let factor = self.settings.aux_factor;
        if let Some(front) = self.drivetrain.front.as_mut() {
            front.on(intent.speed_front as f32 * factor);
        }
        if let Some(rear) = self.drivetrain.rear.as_mut() {
            rear.on(intent.speed_rear as f32 * factor);
        }
    }

    fn spin(&mut self) {
        debug!("Entering in-place turn");
        loop {
            let intent = self.intent.snapshot();
            if !intent.turning || !intent.running {
                break;
            }
            let track = intent.turn_speed * self.settings.spin_factor;
            self.drivetrain.drive.on_tank(track, -track);
        }
        debug!("Leaving in-place turn");
    }
}

impl ActuationLoop<Stopped> {}

/// Handle for the actuation loop running on a blocking thread
///
/// The drivetrain is built on that thread and never leaves it, so the
/// loop owns every actuator exclusively.
#[derive(Debug)]
pub struct ActuationHandle {
    intent: SharedIntent,
    task_handle: Option<JoinHandle<u64>>,
}

impl ActuationHandle {
    /// Builds the drivetrain with `detect` on a blocking thread and starts
    /// the loop there.
    ///
    /// Returns once detection has finished. A detection error is returned
    /// as is and no loop is started.
    pub async fn spawn<F>(
        detect: F,
        intent: SharedIntent,
        settings: Option<DriveSettings>,
    ) -> Result<Self, DriveError>
    where
        F: FnOnce() -> Result<DynDrivetrain, DriveError> + Send + 'static,
    {
        let (ready_tx, ready_rx) = oneshot::channel();
        let loop_intent = intent.clone();

        let task_handle = tokio::task::spawn_blocking(move || {
            let drivetrain = match detect() {
                Ok(drivetrain) => {
                    let _ = ready_tx.send(Ok(()));
                    drivetrain
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return 0;
                }
            };

            let stopped = ActuationLoop::create(drivetrain, loop_intent, settings)
                .start()
                .run();
            stopped.ticks()
        });

        match ready_rx.await {
            Ok(Ok(())) => {
                info!("Actuation Loop successfully started");
                Ok(Self {
                    intent,
                    task_handle: Some(task_handle),
                })
            }
            Ok(Err(e)) => {
                error!("Motor detection failed: {}", e);
                Err(e)
            }
            Err(e) => Err(DriveError::TaskFailed(format!(
                "Actuation task ended before reporting: {}",
                e
            ))),
        }
    }

    /// Requests shutdown and waits until every motor has been stopped.
    ///
    /// Returns the number of ticks the loop ran.
    pub async fn shutdown(&mut self) -> Result<u64, DriveError> {
        debug!("Sending shutdown signal to Actuation Loop");
        self.intent.stop();

        match self.task_handle.take() {
            Some(handle) => match handle.await {
                Ok(ticks) => {
                    info!("Actuation Loop finished after {} ticks", ticks);
                    Ok(ticks)
                }
                Err(e) => {
                    error!("Actuation task panicked: {}", e);
                    Err(DriveError::TaskFailed(format!(
                        "Actuation task panicked: {}",
                        e
                    )))
                }
            },
            None => {
                warn!("Actuation Loop already shut down");
                Ok(0)
            }
        }
    }
}
