//! Simulated engine, gearbox wiring, and touch panel.
//!
//! The simulator has no real coil, gear drum, or resistive panel, so this
//! module stands in for all three behind the same interfaces the cluster
//! logic consumes: synthetic coil edges go into the shared
//! [`PulseAccumulator`], the gearbox switch lines implement
//! [`embedded_hal::digital::InputPin`], and the panel implements
//! [`TouchPanel`]. The cluster cannot tell the difference.
//!
//! # Engine Model
//!
//! A rider at full throttle: revs climb at a fixed rate, each gear is wrung
//! out to its upshift threshold (the shift drops the revs by a fixed ratio),
//! top gear is held to the lift-off point, then the ride unwinds back down
//! through the downshifts until the throttle opens again.

use core::convert::Infallible;
use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};

use crate::{
    config::{
        DOWNSHIFT_RPM, DOWNSHIFT_RESCALE, GEAR_COUNT, GEAR_LINE_COUNT, RATE_MAX_RPM, RPM_PER_PPS,
        SIM_LIFT_OFF_RPM, SIM_RPM_ACCEL, SIM_RPM_DECEL, SIM_RPM_MIN, SIM_THROTTLE_ON_RPM,
        UPSHIFT_RPM, UPSHIFT_RESCALE,
    },
    tach::PulseAccumulator,
    touch::TouchPanel,
};

// =============================================================================
// Engine Model
// =============================================================================

/// Simulated throttle position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Throttle {
    Open,
    Closed,
}

/// Closed-loop engine and gearbox simulation.
pub struct EngineModel {
    rpm: f32,
    throttle: Throttle,
    /// Zero-based gear index into the shift threshold tables.
    gear_index: usize,
    /// Active switch line, shared with the [`SimGearLine`]s handed to the
    /// gear selector (0 = Neutral, 1..=5 = forward gears).
    active_line: Rc<Cell<usize>>,
    /// Fractional pulse left over from the previous tick.
    pulse_carry: f32,
}

impl EngineModel {
    /// Start idling in first gear with the throttle open.
    pub fn new() -> Self {
        Self {
            rpm: SIM_RPM_MIN,
            throttle: Throttle::Open,
            gear_index: 0,
            active_line: Rc::new(Cell::new(1)),
            pulse_carry: 0.0,
        }
    }

    /// Switch lines wired to this model, in gear selector scan order. The
    /// Neutral line exists but the simulated rider never selects it.
    pub fn gear_lines(&self) -> [SimGearLine; GEAR_LINE_COUNT] {
        core::array::from_fn(|index| SimGearLine {
            index,
            active: Rc::clone(&self.active_line),
        })
    }

    /// Advance the model by one tick of `dt_ms`.
    pub fn step(&mut self, dt_ms: u32) {
        let dt_s = dt_ms as f32 / 1000.0;
        let slope = match self.throttle {
            Throttle::Open => SIM_RPM_ACCEL,
            Throttle::Closed => SIM_RPM_DECEL,
        };
        self.rpm = (self.rpm + slope * dt_s).clamp(SIM_RPM_MIN, RATE_MAX_RPM);

        match self.throttle {
            Throttle::Open => {
                if self.gear_index + 1 < GEAR_COUNT && self.rpm >= UPSHIFT_RPM[self.gear_index] {
                    self.gear_index += 1;
                    self.rpm = (self.rpm * UPSHIFT_RESCALE).max(SIM_RPM_MIN);
                } else if self.rpm >= SIM_LIFT_OFF_RPM {
                    self.throttle = Throttle::Closed;
                }
            }
            Throttle::Closed => {
                if self.gear_index > 0 && self.rpm <= DOWNSHIFT_RPM[self.gear_index] {
                    self.gear_index -= 1;
                    self.rpm = (self.rpm * DOWNSHIFT_RESCALE).min(RATE_MAX_RPM);
                } else if self.gear_index == 0 && self.rpm <= SIM_THROTTLE_ON_RPM {
                    self.throttle = Throttle::Open;
                }
            }
        }

        self.active_line.set(self.gear_index + 1);
    }

    /// Feed the coil edges this tick produces into the shared accumulator.
    ///
    /// Edges are spread evenly across the tick; at the rev ceiling that is
    /// one edge per 2.5 ms, comfortably outside the edge debounce. The
    /// fractional remainder carries into the next tick so the long-run edge
    /// count matches the rate exactly.
    pub fn emit_pulses(&mut self, pulses: &PulseAccumulator, tick_start_ms: u32, dt_ms: u32) {
        let exact = self.rpm / RPM_PER_PPS * dt_ms as f32 / 1000.0 + self.pulse_carry;
        let count = exact as u32;
        self.pulse_carry = exact - count as f32;
        if count == 0 {
            return;
        }

        let spacing = dt_ms as f32 / count as f32;
        for i in 0..count {
            pulses.on_edge(tick_start_ms + (i as f32 * spacing) as u32);
        }
    }

    /// Current simulated rate.
    #[allow(dead_code)]
    pub const fn rpm(&self) -> f32 {
        self.rpm
    }

    /// Current simulated gear, 1-based.
    pub const fn gear_number(&self) -> usize {
        self.gear_index + 1
    }

    /// Whether the simulated rider is on the throttle.
    #[allow(dead_code)]
    pub fn is_throttle_open(&self) -> bool {
        self.throttle == Throttle::Open
    }

    #[cfg(test)]
    fn set_rpm(&mut self, rpm: f32) {
        self.rpm = rpm;
    }
}

impl Default for EngineModel {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Gear Switch Lines
// =============================================================================

/// One simulated gearbox switch line. Reads active (low) while the model
/// holds the matching position.
pub struct SimGearLine {
    index: usize,
    active: Rc<Cell<usize>>,
}

impl ErrorType for SimGearLine {
    type Error = Infallible;
}

impl InputPin for SimGearLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.active.get() != self.index)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.active.get() == self.index)
    }
}

// =============================================================================
// Touch Panel
// =============================================================================

/// Untouched channel level on the simulated X axis.
const SIM_BASE_X: u16 = 1800;

/// Untouched channel level on the simulated Y axis.
const SIM_BASE_Y: u16 = 1700;

/// Excursion above baseline while a tap is held. Far enough beyond the
/// press margin that the EMA crosses the threshold within two polls.
const SIM_PRESS_OFFSET: u16 = 400;

/// Polls a simulated tap stays held. Long enough for the filter to cross
/// the press threshold and return below the release threshold afterwards.
const SIM_PRESS_POLLS: u32 = 6;

/// Simulated resistive panel with tap injection.
pub struct SimTouchPanel {
    press_polls_left: u32,
}

impl SimTouchPanel {
    pub const fn new() -> Self {
        Self { press_polls_left: 0 }
    }

    /// Inject one tap: the next few polls read pressed, then the panel
    /// returns to baseline.
    pub const fn tap(&mut self) {
        self.press_polls_left = SIM_PRESS_POLLS;
    }

    fn pressed(&self) -> bool {
        self.press_polls_left > 0
    }
}

impl Default for SimTouchPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchPanel for SimTouchPanel {
    fn excite_x_read_y(&mut self) -> u16 {
        if self.pressed() {
            SIM_BASE_Y + SIM_PRESS_OFFSET
        } else {
            SIM_BASE_Y
        }
    }

    fn excite_y_read_x(&mut self) -> u16 {
        let raw = if self.pressed() {
            SIM_BASE_X + SIM_PRESS_OFFSET
        } else {
            SIM_BASE_X
        };
        // The X read is the second half of a poll; count the poll down here.
        self.press_polls_left = self.press_polls_left.saturating_sub(1);
        raw
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
