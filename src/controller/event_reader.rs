//! Event Reader - gamepad events into motion intent
//!
//! Consumes one event at a time from an [`EventSource`] and writes the
//! result into the [`SharedIntent`]. Which event does what is decided by a
//! [`BindingTable`] keyed on `(class, code)`; events without a binding are
//! ignored.
//!
//! The reader never restarts. It returns when the stop button is pressed,
//! when shutdown is requested from elsewhere, or with an error when the
//! source fails.

use crate::config::{ControllerProfile, ReaderSettings};
use crate::controller::device::EventSource;
use crate::controller::event::{
    ControllerEvent, EventClass, ABS_RX, ABS_RZ, ABS_X, ABS_Y, ABS_Z, BTN_SELECT, BTN_START,
    BTN_TL, BTN_TL2, BTN_TR, BTN_TR2, PRESSED,
};
use crate::controller::scaler::scale_stick;
use crate::controller::ControllerError;
use crate::state::{MotionIntent, SharedIntent};
use std::collections::HashMap;
use tracing::{debug, info};

/// What an event does to the motion intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Left stick Y, sign flipped so pushing forward is positive.
    Speed,
    /// Left stick X.
    Steering,
    /// Right stick X, starts and ends in-place turns.
    Turn,
    /// Analog trigger axis driving the front motor forward.
    FrontTrigger,
    /// Analog trigger axis driving the rear motor forward.
    RearTrigger,
    FrontBumper,
    FrontTriggerButton,
    RearBumper,
    RearTriggerButton,
    /// Toggles `invert_drive` on each press.
    InvertDrive,
    Stop,
}

/// Maps `(class, code)` to a [`Binding`].
#[derive(Clone, Debug)]
pub struct BindingTable {
    bindings: HashMap<(EventClass, u16), Binding>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl BindingTable {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Layout shared by the F710 and the PS3 pad. The F710 reports its
    /// triggers as axes, the PS3 pad as buttons, so both forms are bound.
    pub fn standard() -> Self {
        Self::empty()
            .bind(EventClass::Axis, ABS_Y, Binding::Speed)
            .bind(EventClass::Axis, ABS_X, Binding::Steering)
            .bind(EventClass::Axis, ABS_RX, Binding::Turn)
            .bind(EventClass::Axis, ABS_Z, Binding::RearTrigger)
            .bind(EventClass::Axis, ABS_RZ, Binding::FrontTrigger)
            .bind(EventClass::Button, BTN_TR, Binding::FrontBumper)
            .bind(EventClass::Button, BTN_TR2, Binding::FrontTriggerButton)
            .bind(EventClass::Button, BTN_TL, Binding::RearBumper)
            .bind(EventClass::Button, BTN_TL2, Binding::RearTriggerButton)
            .bind(EventClass::Button, BTN_SELECT, Binding::InvertDrive)
            .bind(EventClass::Button, BTN_START, Binding::Stop)
    }

    pub fn bind(mut self, class: EventClass, code: u16, binding: Binding) -> Self {
        self.bindings.insert((class, code), binding);
        self
    }

    pub fn lookup(&self, event: &ControllerEvent) -> Option<Binding> {
        self.bindings.get(&(event.class(), event.code())).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Why the reader returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderExit {
    /// The stop button was pressed.
    StopButton,
    /// Shutdown was requested through the intent's token.
    Cancelled,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct EventReader<S> {
    source: S,
    intent: SharedIntent,
    profile: ControllerProfile,
    settings: ReaderSettings,
    bindings: BindingTable,
    events_handled: u64,
}

impl<S: EventSource> EventReader<S> {
    pub fn new(
        source: S,
        intent: SharedIntent,
        profile: ControllerProfile,
        settings: Option<ReaderSettings>,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        debug!(
            "Creating Event Reader for {} with settings: {:?}",
            profile.name, settings
        );
        Self {
            source,
            intent,
            profile,
            settings,
            bindings: BindingTable::standard(),
            events_handled: 0,
        }
    }

    pub fn with_bindings(mut self, bindings: BindingTable) -> Self {
        self.bindings = bindings;
        self
    }

    /// Reads events until the stop button, a shutdown request or a source error.
    pub async fn run(mut self) -> Result<ReaderExit, ControllerError> {
        info!(
            "Event Reader started with {} bindings",
            self.bindings.len()
        );
        let shutdown = self.intent.shutdown_token();

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Event Reader cancelled after {} events", self.events_handled);
                    return Ok(ReaderExit::Cancelled);
                }
                event = self.source.next_event() => event?,
            };

            if self.handle_event(event) == Flow::Stop {
                info!("START button is pressed. Stopping.");
                self.intent.stop();
                return Ok(ReaderExit::StopButton);
            }
        }
    }

    fn handle_event(&mut self, event: ControllerEvent) -> Flow {
        self.events_handled += 1;

        let Some(binding) = self.bindings.lookup(&event) else {
            debug!("Ignoring unbound {} event {:?}", event.class(), event);
            return Flow::Continue;
        };
        debug!("{:?} <- {:?}", binding, event);

        let profile = &self.profile;
        let settings = &self.settings;
        self.intent
            .update(|intent| apply(binding, event.value(), profile, settings, intent))
    }
}

fn apply(
    binding: Binding,
    value: i32,
    profile: &ControllerProfile,
    settings: &ReaderSettings,
    intent: &mut MotionIntent,
) -> Flow {
    let stick = || scale_stick(value, profile.stick_range, settings.stick_deadzone);
    let pressed = value == PRESSED;
    let aux = settings.aux_speed;
    let button = |speed: i32| if pressed { speed } else { 0 };
    let trigger = || {
        if value > settings.trigger_threshold {
            aux
        } else {
            0
        }
    };

    match binding {
        Binding::Speed => intent.speed = -stick(),
        Binding::Steering => intent.steering = stick(),
        Binding::Turn => {
            let scaled = stick();
            if scaled.abs() < settings.turn_threshold {
                intent.turning = false;
            } else {
                intent.turning = true;
                intent.turn_speed = scaled * settings.turn_factor * intent.invert_drive as f32;
            }
        }
        Binding::FrontTrigger => intent.speed_front = trigger(),
        Binding::RearTrigger => intent.speed_rear = trigger(),
        Binding::FrontBumper => intent.speed_front = button(-aux),
        Binding::FrontTriggerButton => intent.speed_front = button(aux),
        Binding::RearBumper => intent.speed_rear = button(-aux),
        Binding::RearTriggerButton => intent.speed_rear = button(aux),
        Binding::InvertDrive => {
            if pressed {
                intent.toggle_invert();
                info!("Drive direction inverted ({})", intent.invert_drive);
            }
        }
        Binding::Stop => {
            if pressed {
                return Flow::Stop;
            }
        }
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LOGITECH_F710, PS3_SIXAXIS};
    use std::collections::VecDeque;

    struct ScriptedSource {
        events: VecDeque<ControllerEvent>,
    }

    impl ScriptedSource {
        fn new(events: impl IntoIterator<Item = ControllerEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
            }
        }
    }

    impl EventSource for ScriptedSource {
        async fn next_event(&mut self) -> Result<ControllerEvent, ControllerError> {
            self.events.pop_front().ok_or(ControllerError::Disconnected)
        }
    }

    fn axis(code: u16, value: i32) -> ControllerEvent {
        ControllerEvent::Axis { code, value }
    }

    fn button(code: u16, value: i32) -> ControllerEvent {
        ControllerEvent::Button { code, value }
    }

    fn reader(profile: ControllerProfile) -> (EventReader<ScriptedSource>, SharedIntent) {
        let intent = SharedIntent::new();
        let reader = EventReader::new(ScriptedSource::new([]), intent.clone(), profile, None);
        (reader, intent)
    }

    #[test]
    fn full_back_on_ps3_left_stick_is_full_forward_speed() {
        let (mut reader, intent) = reader(PS3_SIXAXIS);

        reader.handle_event(axis(ABS_Y, 0));

        assert_eq!(intent.snapshot().speed, 100.0);
    }

    #[test]
    fn f710_steering_follows_descending_range() {
        let (mut reader, intent) = reader(LOGITECH_F710);

        reader.handle_event(axis(ABS_X, -32768));
        assert_eq!(intent.snapshot().steering, 100.0);

        reader.handle_event(axis(ABS_X, 100));
        assert_eq!(intent.snapshot().steering, 0.0);
    }

    #[test]
    fn right_stick_crossing_threshold_toggles_turning() {
        let (mut reader, intent) = reader(PS3_SIXAXIS);

        // 255 scales to 100
        reader.handle_event(axis(ABS_RX, 255));
        let state = intent.snapshot();
        assert!(state.turning);
        assert!((state.turn_speed - 40.0).abs() < 1e-4);

        // 150 scales to about 17.6, inside the turn threshold
        reader.handle_event(axis(ABS_RX, 150));
        let state = intent.snapshot();
        assert!(!state.turning);
        assert!((state.turn_speed - 40.0).abs() < 1e-4);

        // 160 scales to about 25.5
        reader.handle_event(axis(ABS_RX, 160));
        assert!(intent.snapshot().turning);
    }

    #[test]
    fn turn_speed_follows_invert_sign() {
        let (mut reader, intent) = reader(PS3_SIXAXIS);

        reader.handle_event(button(BTN_SELECT, 1));
        reader.handle_event(axis(ABS_RX, 255));

        assert!((intent.snapshot().turn_speed + 40.0).abs() < 1e-4);
    }

    #[test]
    fn trigger_axes_act_as_switches() {
        let (mut reader, intent) = reader(LOGITECH_F710);

        reader.handle_event(axis(ABS_RZ, 11));
        reader.handle_event(axis(ABS_Z, 255));
        let state = intent.snapshot();
        assert_eq!(state.speed_front, 200);
        assert_eq!(state.speed_rear, 200);

        reader.handle_event(axis(ABS_RZ, 10));
        reader.handle_event(axis(ABS_Z, 0));
        let state = intent.snapshot();
        assert_eq!(state.speed_front, 0);
        assert_eq!(state.speed_rear, 0);
    }

    #[test]
    fn bumpers_and_trigger_buttons_set_aux_speeds() {
        let (mut reader, intent) = reader(PS3_SIXAXIS);

        reader.handle_event(button(BTN_TR, 1));
        reader.handle_event(button(BTN_TL2, 1));
        let state = intent.snapshot();
        assert_eq!(state.speed_front, -200);
        assert_eq!(state.speed_rear, 200);

        reader.handle_event(button(BTN_TR, 0));
        reader.handle_event(button(BTN_TL2, 0));
        let state = intent.snapshot();
        assert_eq!(state.speed_front, 0);
        assert_eq!(state.speed_rear, 0);

        reader.handle_event(button(BTN_TR2, 1));
        reader.handle_event(button(BTN_TL, 1));
        let state = intent.snapshot();
        assert_eq!(state.speed_front, 200);
        assert_eq!(state.speed_rear, -200);

        // autorepeat (value 2) counts as released
        reader.handle_event(button(BTN_TR2, 2));
        assert_eq!(intent.snapshot().speed_front, 0);
    }

    #[test]
    fn invert_toggles_on_press_edge_only() {
        let (mut reader, intent) = reader(PS3_SIXAXIS);

        reader.handle_event(button(BTN_SELECT, 1));
        reader.handle_event(button(BTN_SELECT, 0));
        assert_eq!(intent.snapshot().invert_drive, -1);

        reader.handle_event(button(BTN_SELECT, 1));
        reader.handle_event(button(BTN_SELECT, 0));
        assert_eq!(intent.snapshot().invert_drive, 1);
    }

    #[test]
    fn unbound_events_change_nothing() {
        let (mut reader, intent) = reader(PS3_SIXAXIS);

        assert_eq!(reader.handle_event(button(304, 1)), Flow::Continue);
        assert_eq!(reader.handle_event(axis(4, 0)), Flow::Continue);
        // button code 1 is not the left stick
        assert_eq!(reader.handle_event(button(ABS_Y, 0)), Flow::Continue);

        assert_eq!(intent.snapshot(), MotionIntent::default());
    }

    #[test]
    fn custom_table_replaces_standard_bindings() {
        let intent = SharedIntent::new();
        let table = BindingTable::empty().bind(EventClass::Button, 304, Binding::Stop);
        let mut reader =
            EventReader::new(ScriptedSource::new([]), intent.clone(), PS3_SIXAXIS, None)
                .with_bindings(table);

        assert_eq!(reader.handle_event(button(BTN_START, 1)), Flow::Continue);
        assert_eq!(reader.handle_event(button(304, 1)), Flow::Stop);
    }

    #[tokio::test]
    async fn stop_button_ends_the_reader_and_clears_running() {
        let intent = SharedIntent::new();
        let source = ScriptedSource::new([
            axis(ABS_Y, 0),
            button(BTN_START, 0),
            button(BTN_START, 1),
            axis(ABS_Y, 255),
        ]);

        let exit = EventReader::new(source, intent.clone(), PS3_SIXAXIS, None)
            .run()
            .await
            .unwrap();

        assert_eq!(exit, ReaderExit::StopButton);
        let state = intent.snapshot();
        assert!(!state.running);
        // events after the stop press are never read
        assert_eq!(state.speed, 100.0);
    }

    #[tokio::test]
    async fn source_failure_propagates() {
        let intent = SharedIntent::new();
        let source = ScriptedSource::new([axis(ABS_X, 255)]);

        let result = EventReader::new(source, intent.clone(), PS3_SIXAXIS, None)
            .run()
            .await;

        assert!(matches!(result, Err(ControllerError::Disconnected)));
        assert!(intent.is_running());
    }

    #[tokio::test]
    async fn external_stop_cancels_the_reader() {
        let intent = SharedIntent::new();
        intent.stop();

        let exit = EventReader::new(ScriptedSource::new([]), intent, PS3_SIXAXIS, None)
            .run()
            .await
            .unwrap();

        assert_eq!(exit, ReaderExit::Cancelled);
    }
}
