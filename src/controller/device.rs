//! Gamepad discovery and the live event stream.

use crate::config::{ControllerProfile, KNOWN_CONTROLLERS};
use crate::controller::event::ControllerEvent;
use crate::controller::ControllerError;
use std::path::PathBuf;
use tracing::{debug, info};

// errno for a device that was unplugged while being read
const ENODEV: i32 = 19;

/// Anything that reports a device name.
pub trait NamedDevice {
    fn name(&self) -> Option<&str>;
}

impl NamedDevice for evdev::Device {
    fn name(&self) -> Option<&str> {
        evdev::Device::name(self)
    }
}

/// An input device found under `/dev/input`.
pub struct DiscoveredDevice {
    pub path: PathBuf,
    pub device: evdev::Device,
}

impl NamedDevice for DiscoveredDevice {
    fn name(&self) -> Option<&str> {
        self.device.name()
    }
}

/// Lists every readable input device.
pub fn discover() -> Vec<DiscoveredDevice> {
    evdev::enumerate()
        .map(|(path, device)| DiscoveredDevice { path, device })
        .collect()
}

/// Returns the first device whose name exactly matches a known controller,
/// together with that controller's profile.
pub fn select_controller<D: NamedDevice>(
    devices: impl IntoIterator<Item = D>,
) -> Result<(D, ControllerProfile), ControllerError> {
    let mut seen = Vec::new();

    for device in devices {
        let name = device.name().unwrap_or("<unnamed>").to_string();
        info!("Device: {}", name);

        if let Some(profile) = KNOWN_CONTROLLERS.iter().find(|p| p.name == name) {
            info!("{} found.", name);
            debug!("Using stick range {:?}", profile.stick_range);
            return Ok((device, profile.clone()));
        }
        seen.push(name);
    }

    Err(ControllerError::NoMatchingController { seen })
}

/// Async stream of gamepad events.
pub trait EventSource {
    /// Waits for the next axis or button event.
    async fn next_event(&mut self) -> Result<ControllerEvent, ControllerError>;
}

/// Event stream backed by an evdev device.
pub struct EvdevSource {
    stream: evdev::EventStream,
}

impl EvdevSource {
    pub fn open(device: DiscoveredDevice) -> Result<Self, ControllerError> {
        debug!("Opening event stream on {}", device.path.display());
        let stream = device
            .device
            .into_event_stream()
            .map_err(ControllerError::Device)?;
        Ok(Self { stream })
    }
}

impl EventSource for EvdevSource {
    async fn next_event(&mut self) -> Result<ControllerEvent, ControllerError> {
        loop {
            let raw = self.stream.next_event().await.map_err(|e| {
                if e.raw_os_error() == Some(ENODEV) {
                    ControllerError::Disconnected
                } else {
                    ControllerError::Device(e)
                }
            })?;
            if let Some(event) = ControllerEvent::from_input(&raw) {
                return Ok(event);
            }
        }
    }
}
