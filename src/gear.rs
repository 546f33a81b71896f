//! Gear position resolution from the position switch lines.
//!
//! The gearbox exposes one switch per position (Neutral plus five forward
//! gears), wired active-low to the drum. The switches are mutually exclusive
//! by construction, but lines float briefly while the drum rotates between
//! detents, and a worn drum can short two lines for a few milliseconds.
//!
//! # Priority Policy
//!
//! Lines are scanned in a fixed order with Neutral first: if the Neutral
//! line reads active, Neutral wins regardless of any other active line.
//! This is a fail-safe default - reporting Neutral while a gear switch
//! chatters is harmless, the reverse is not.
//!
//! # Hold Policy
//!
//! If no line reads active (drum between detents), the previously resolved
//! position is returned unchanged. The display never regresses to Unknown
//! once a real reading has occurred; Unknown exists only so the bootstrap
//! frame has something to show. A pin read error degrades the same way:
//! the line is treated as inactive for that scan.

use embedded_hal::digital::InputPin;

use crate::config::{GEAR_LINE_COUNT, GEAR_TOP_SPEED_KMH, RATE_MAX_RPM};

// =============================================================================
// Gear Position
// =============================================================================

/// Resolved gearbox position.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Gear {
    /// No reading has occurred yet. Bootstrap display only, never persisted
    /// once a line has been seen active.
    #[default]
    Unknown,
    /// Neutral. Highest scan priority.
    Neutral,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Gear {
    /// Position for a switch line index in scan order (0 = Neutral).
    const fn from_line(index: usize) -> Self {
        match index {
            0 => Self::Neutral,
            1 => Self::First,
            2 => Self::Second,
            3 => Self::Third,
            4 => Self::Fourth,
            5 => Self::Fifth,
            _ => Self::Unknown,
        }
    }

    /// Single-character indicator shown in the gear box.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "-",
            Self::Neutral => "N",
            Self::First => "1",
            Self::Second => "2",
            Self::Third => "3",
            Self::Fourth => "4",
            Self::Fifth => "5",
        }
    }

    /// Top speed reachable in this position (km/h). Neutral and Unknown
    /// transmit no drive, so they derive zero.
    pub const fn top_speed_kmh(self) -> f32 {
        match self {
            Self::Unknown | Self::Neutral => 0.0,
            Self::First => GEAR_TOP_SPEED_KMH[0],
            Self::Second => GEAR_TOP_SPEED_KMH[1],
            Self::Third => GEAR_TOP_SPEED_KMH[2],
            Self::Fourth => GEAR_TOP_SPEED_KMH[3],
            Self::Fifth => GEAR_TOP_SPEED_KMH[4],
        }
    }

    /// Road speed derived from the current rate in this position.
    pub fn speed_from(self, rate_rpm: f32) -> f32 {
        let top = self.top_speed_kmh();
        ((rate_rpm / RATE_MAX_RPM) * top).clamp(0.0, top)
    }
}

// =============================================================================
// Position Switch Selector
// =============================================================================

/// Resolves one position from the priority-ordered switch lines.
///
/// `lines[0]` is Neutral, `lines[1..]` the forward gears in ascending order.
pub struct GearSelector<P> {
    lines: [P; GEAR_LINE_COUNT],
    held: Gear,
}

impl<P: InputPin> GearSelector<P> {
    /// Create a selector over the switch lines, holding Unknown until the
    /// first active reading.
    pub const fn new(lines: [P; GEAR_LINE_COUNT]) -> Self {
        Self {
            lines,
            held: Gear::Unknown,
        }
    }

    /// Scan the lines and resolve the current position.
    ///
    /// Returns the first line that reads active (logic-low); Neutral is
    /// scanned first and therefore wins any simultaneous activation. With
    /// no active line the previously held position is returned unchanged.
    pub fn resolve(&mut self) -> Gear {
        for (index, line) in self.lines.iter_mut().enumerate() {
            // A failed read counts as inactive for this scan.
            if line.is_low().unwrap_or(false) {
                self.held = Gear::from_line(index);
                return self.held;
            }
        }
        self.held
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::digital::{ErrorType, InputPin};

    use super::*;

    /// Test double for a switch line. `Some(level)` reads normally,
    /// `None` simulates a failed read.
    struct FakeLine(Option<bool>);

    impl ErrorType for FakeLine {
        type Error = Infallible;
    }

    impl InputPin for FakeLine {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0.unwrap_or(false))
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0.unwrap_or(false))
        }
    }

    /// Selector with the given lines active (indices into scan order).
    fn selector(active: &[usize]) -> GearSelector<FakeLine> {
        let lines = core::array::from_fn(|i| FakeLine(Some(active.contains(&i))));
        GearSelector::new(lines)
    }

    fn set_active(sel: &mut GearSelector<FakeLine>, active: &[usize]) {
        for (i, line) in sel.lines.iter_mut().enumerate() {
            line.0 = Some(active.contains(&i));
        }
    }

    // -------------------------------------------------------------------------
    // Priority Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_neutral_line_resolves_neutral() {
        let mut sel = selector(&[0]);
        assert_eq!(sel.resolve(), Gear::Neutral);
    }

    #[test]
    fn test_single_gear_line_resolves_that_gear() {
        assert_eq!(selector(&[1]).resolve(), Gear::First);
        assert_eq!(selector(&[3]).resolve(), Gear::Third);
        assert_eq!(selector(&[5]).resolve(), Gear::Fifth);
    }

    #[test]
    fn test_neutral_wins_any_simultaneous_activation() {
        // Neutral takes priority no matter which other lines chatter.
        for other in 1..GEAR_LINE_COUNT {
            let mut sel = selector(&[0, other]);
            assert_eq!(
                sel.resolve(),
                Gear::Neutral,
                "Neutral must win over simultaneously active line {other}"
            );
        }
    }

    #[test]
    fn test_lower_gear_wins_between_adjacent_lines() {
        // Scan order resolves a drum short between 2nd and 3rd as 2nd.
        let mut sel = selector(&[2, 3]);
        assert_eq!(sel.resolve(), Gear::Second);
    }

    // -------------------------------------------------------------------------
    // Hold Policy Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_no_active_line_holds_previous() {
        let mut sel = selector(&[2]);
        assert_eq!(sel.resolve(), Gear::Second);

        // Drum between detents: all lines float high.
        set_active(&mut sel, &[]);
        assert_eq!(sel.resolve(), Gear::Second, "Floating lines must hold the last position");

        // Next detent lands.
        set_active(&mut sel, &[3]);
        assert_eq!(sel.resolve(), Gear::Third);
    }

    #[test]
    fn test_unknown_only_before_first_reading() {
        let mut sel = selector(&[]);
        assert_eq!(sel.resolve(), Gear::Unknown, "No reading yet resolves Unknown");

        set_active(&mut sel, &[1]);
        assert_eq!(sel.resolve(), Gear::First);

        // Once a real reading occurred, Unknown never comes back.
        set_active(&mut sel, &[]);
        assert_eq!(sel.resolve(), Gear::First);
    }

    // -------------------------------------------------------------------------
    // Derived Value Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_labels() {
        assert_eq!(Gear::Unknown.label(), "-");
        assert_eq!(Gear::Neutral.label(), "N");
        assert_eq!(Gear::Fifth.label(), "5");
    }

    #[test]
    fn test_speed_derivation_scales_with_rate() {
        // Full rate in fifth reaches the configured top speed.
        let top = GEAR_TOP_SPEED_KMH[4];
        assert!((Gear::Fifth.speed_from(RATE_MAX_RPM) - top).abs() < f32::EPSILON);

        // Half rate reaches half of it.
        assert!((Gear::Fifth.speed_from(RATE_MAX_RPM / 2.0) - top / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_speed_is_zero_without_drive() {
        assert_eq!(Gear::Neutral.speed_from(8_000.0), 0.0);
        assert_eq!(Gear::Unknown.speed_from(8_000.0), 0.0);
    }
}
