//! Raw axis value scaling.
//!
//! Gamepads disagree on their raw stick ranges: the PS3 pad reports an
//! ascending `0..255`, the F710 a descending `32768..-32768`. Everything
//! downstream works in `[-100, 100]`.

/// Output range every stick is normalized into.
pub const STICK_OUTPUT: AxisRange = AxisRange::new(-100.0, 100.0);

/// A closed interval given as its two ends. `low` maps to the lower end of
/// the target range, so a descending source (`low > high`) flips the sign.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub low: f32,
    pub high: f32,
}

impl AxisRange {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    fn span(&self) -> f32 {
        self.high - self.low
    }
}

/// Linear interpolation of `value` from `src` into `dst`.
///
/// A zero-width source range has no meaningful mapping and yields the
/// lower end of `dst`.
pub fn scale(value: f32, src: AxisRange, dst: AxisRange) -> f32 {
    let span = src.span();
    if span == 0.0 {
        return dst.low;
    }
    (value - src.low) / span * dst.span() + dst.low
}

/// Forces magnitudes below `deadzone` to exactly zero.
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        value
    }
}

/// Scales a raw stick reading into `[-100, 100]` and suppresses center drift.
pub fn scale_stick(raw: i32, src: AxisRange, deadzone: f32) -> f32 {
    apply_deadzone(scale(raw as f32, src, STICK_OUTPUT), deadzone)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PS3: AxisRange = AxisRange::new(0.0, 255.0);
    const F710: AxisRange = AxisRange::new(32768.0, -32768.0);

    #[test]
    fn endpoints_map_to_output_bounds() {
        assert_eq!(scale(0.0, PS3, STICK_OUTPUT), -100.0);
        assert_eq!(scale(255.0, PS3, STICK_OUTPUT), 100.0);
        assert_eq!(scale(32768.0, F710, STICK_OUTPUT), -100.0);
        assert_eq!(scale(-32768.0, F710, STICK_OUTPUT), 100.0);
    }

    #[test]
    fn ascending_source_is_increasing() {
        let mut previous = f32::MIN;
        for raw in 0..=255 {
            let scaled = scale(raw as f32, PS3, STICK_OUTPUT);
            assert!(scaled > previous, "not increasing at raw={raw}");
            previous = scaled;
        }
    }

    #[test]
    fn descending_source_is_decreasing_in_raw_value() {
        let mut previous = f32::MAX;
        for raw in (-32768..=32768).step_by(512) {
            let scaled = scale(raw as f32, F710, STICK_OUTPUT);
            assert!(scaled < previous, "not decreasing at raw={raw}");
            previous = scaled;
        }
    }

    #[test]
    fn zero_width_source_yields_low_end() {
        let flat = AxisRange::new(5.0, 5.0);
        assert_eq!(scale(5.0, flat, STICK_OUTPUT), -100.0);
    }

    #[test]
    fn deadzone_zeroes_small_magnitudes_only() {
        assert_eq!(apply_deadzone(14.9, 15.0), 0.0);
        assert_eq!(apply_deadzone(-14.9, 15.0), 0.0);
        assert_eq!(apply_deadzone(15.0, 15.0), 15.0);
        assert_eq!(apply_deadzone(-42.0, 15.0), -42.0);
    }

    #[test]
    fn centered_sticks_read_as_zero() {
        // 127 on the PS3 pad is about -0.4 after scaling
        assert_eq!(scale_stick(127, PS3, 15.0), 0.0);
        assert_eq!(scale_stick(128, PS3, 15.0), 0.0);
        assert_eq!(scale_stick(0, F710, 15.0), 0.0);
        assert_eq!(scale_stick(0, PS3, 15.0), -100.0);
    }
}
