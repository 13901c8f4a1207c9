use std::fmt;

// Linux input event classes we care about
pub const EV_KEY: u16 = 1;
pub const EV_ABS: u16 = 3;

// Axis codes
pub const ABS_X: u16 = 0; // left stick X
pub const ABS_Y: u16 = 1; // left stick Y
pub const ABS_Z: u16 = 2; // left trigger (F710)
pub const ABS_RX: u16 = 3; // right stick X
pub const ABS_RZ: u16 = 5; // right trigger (F710)

// Button codes
pub const BTN_TL: u16 = 310; // left bumper
pub const BTN_TR: u16 = 311; // right bumper
pub const BTN_TL2: u16 = 312; // left trigger (PS3)
pub const BTN_TR2: u16 = 313; // right trigger (PS3)
pub const BTN_SELECT: u16 = 314;
pub const BTN_START: u16 = 315;

/// Button value reported on the press edge.
pub const PRESSED: i32 = 1;

/// Which family an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventClass {
    Axis,
    Button,
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventClass::Axis => write!(f, "axis"),
            EventClass::Button => write!(f, "button"),
        }
    }
}

/// A single input event from the gamepad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    Axis { code: u16, value: i32 },
    Button { code: u16, value: i32 },
}

impl ControllerEvent {
    /// Builds an event from a raw `(type, code, value)` triple. Sync,
    /// misc and every other class yield `None`.
    pub fn from_raw(event_type: u16, code: u16, value: i32) -> Option<Self> {
        match event_type {
            EV_ABS => Some(ControllerEvent::Axis { code, value }),
            EV_KEY => Some(ControllerEvent::Button { code, value }),
            _ => None,
        }
    }

    pub fn from_input(event: &evdev::InputEvent) -> Option<Self> {
        Self::from_raw(event.event_type().0, event.code(), event.value())
    }

    pub fn class(&self) -> EventClass {
        match self {
            ControllerEvent::Axis { .. } => EventClass::Axis,
            ControllerEvent::Button { .. } => EventClass::Button,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            ControllerEvent::Axis { code, .. } | ControllerEvent::Button { code, .. } => *code,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            ControllerEvent::Axis { value, .. } | ControllerEvent::Button { value, .. } => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_triples_map_to_classes() {
        assert_eq!(
            ControllerEvent::from_raw(3, ABS_Y, 200),
            Some(ControllerEvent::Axis { code: 1, value: 200 })
        );
        assert_eq!(
            ControllerEvent::from_raw(1, BTN_START, 1),
            Some(ControllerEvent::Button { code: 315, value: 1 })
        );
    }

    #[test]
    fn sync_and_misc_events_are_dropped() {
        assert_eq!(ControllerEvent::from_raw(0, 0, 0), None);
        assert_eq!(ControllerEvent::from_raw(4, 4, 589_825), None);
    }

    #[test]
    fn accessors_expose_class_code_and_value() {
        let event = ControllerEvent::Button { code: BTN_TR, value: 0 };
        assert_eq!(event.class(), EventClass::Button);
        assert_eq!(event.code(), 311);
        assert_eq!(event.value(), 0);
    }
}
