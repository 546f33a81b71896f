//! Touch gesture detection for the 4-wire resistive panel.
//!
//! The panel is read with two complementary excitation steps per poll: the
//! X rails are driven and the Y sense line sampled, then the Y rails are
//! driven and the X sense line sampled. Each axis must be fully re-excited
//! before its orthogonal read or the measurements cross-talk; the
//! [`TouchPanel`] trait encodes that sequencing as two separate calls that
//! [`TouchDetector::poll`] always makes in the same order.
//!
//! # Filtering and Calibration
//!
//! Raw readings are clamped to the valid ADC range (a floating channel can
//! report rail values that would otherwise drag the filter off indefinitely)
//! and smoothed with a per-axis EMA (0.7 retain / 0.3 new). For a settling
//! period after boot the detector only filters; once the settling time
//! elapses, the filtered values are frozen as the calibration baselines.
//! Calibration runs exactly once and is never re-triggered.
//!
//! # Hysteresis and Tap Debounce
//!
//! A press is recognized well above baseline, a release only once the
//! filtered values fall back below a strictly lower threshold - resistive
//! panels are electrically noisy near the activation boundary and symmetric
//! thresholds would read the chatter as a burst of taps. A recognized press
//! emits a mode-advance event unless it lands inside the tap debounce window
//! of the previously emitted event; the state transition happens either way,
//! only the event is suppressed. Nothing fires on release.

use crate::config::{
    TAP_DEBOUNCE_MS, TOUCH_ADC_MAX, TOUCH_EMA_RETAIN, TOUCH_MARGIN_X, TOUCH_PRESS_MARGIN,
    TOUCH_RELEASE_MARGIN, TOUCH_SETTLE_MS,
};

// =============================================================================
// Panel Interface
// =============================================================================

/// Two-step excitation interface to the resistive panel.
///
/// Implementations drive the named rail pair, let it settle, and sample the
/// orthogonal sense line. The detector calls [`Self::excite_x_read_y`]
/// before [`Self::excite_y_read_x`] on every poll; implementations must
/// re-excite on every call rather than caching.
pub trait TouchPanel {
    /// Drive the X rails and sample the Y sense line.
    fn excite_x_read_y(&mut self) -> u16;

    /// Drive the Y rails and sample the X sense line.
    fn excite_y_read_x(&mut self) -> u16;
}

// =============================================================================
// Events and Calibration
// =============================================================================

/// Discrete gesture emitted by the detector.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TouchEvent {
    /// A debounced single tap: advance the info panel to the next page.
    ModeAdvance,
}

/// Baselines and thresholds frozen at the end of the settling period.
#[derive(Clone, Copy, Debug)]
pub struct TouchCalibration {
    /// Filtered X at calibration time (untouched panel).
    pub baseline_x: f32,
    /// Filtered Y at calibration time (untouched panel).
    pub baseline_y: f32,
    /// Y level at or above which a press is recognized.
    pub press_threshold_y: f32,
    /// Y level at or below which a release is recognized. Strictly below
    /// the press threshold (hysteresis).
    pub release_threshold_y: f32,
    /// X margin above baseline that also recognizes a press.
    pub margin_x: f32,
}

impl TouchCalibration {
    /// Derive thresholds from the frozen baselines.
    fn from_baselines(baseline_x: f32, baseline_y: f32) -> Self {
        Self {
            baseline_x,
            baseline_y,
            press_threshold_y: baseline_y + TOUCH_PRESS_MARGIN,
            release_threshold_y: baseline_y + TOUCH_RELEASE_MARGIN,
            margin_x: TOUCH_MARGIN_X,
        }
    }
}

// =============================================================================
// Detector State Machine
// =============================================================================

/// Detector phase. Settling precedes calibration; Idle/Pressed exist only
/// once calibrated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TouchPhase {
    /// Filtering since boot, waiting for the settling time to elapse.
    Settling,
    /// Calibrated, panel untouched.
    Idle,
    /// Calibrated, press recognized and not yet released.
    Pressed,
}

/// Filters the panel, calibrates once, and emits debounced tap events.
pub struct TouchDetector {
    /// Per-axis EMA state. Never reset.
    filtered_x: f32,
    filtered_y: f32,
    /// First poll seeds the filter instead of averaging against zero.
    seeded: bool,

    phase: TouchPhase,
    calibration: Option<TouchCalibration>,

    /// Boot timestamp the settling period is measured from.
    boot_ms: u32,
    /// Timestamp of the last *emitted* tap event.
    last_tap_ms: Option<u32>,
}

impl TouchDetector {
    /// Create a detector booted at `now_ms`; calibration will freeze once
    /// the settling period has elapsed.
    pub const fn new(now_ms: u32) -> Self {
        Self {
            filtered_x: 0.0,
            filtered_y: 0.0,
            seeded: false,
            phase: TouchPhase::Settling,
            calibration: None,
            boot_ms: now_ms,
            last_tap_ms: None,
        }
    }

    /// Poll the panel once.
    ///
    /// Performs the two-step excitation read, updates the filters, advances
    /// the state machine, and returns a mode-advance event on a debounced
    /// recognized tap.
    pub fn poll<P: TouchPanel>(&mut self, panel: &mut P, now_ms: u32) -> Option<TouchEvent> {
        // Sequencing is load-bearing: X rails driven for the Y read, then
        // the panel re-excited on Y rails for the X read.
        let raw_y = panel.excite_x_read_y().min(TOUCH_ADC_MAX);
        let raw_x = panel.excite_y_read_x().min(TOUCH_ADC_MAX);
        self.filter(f32::from(raw_x), f32::from(raw_y));

        match self.phase {
            TouchPhase::Settling => {
                if now_ms.wrapping_sub(self.boot_ms) >= TOUCH_SETTLE_MS {
                    self.calibration =
                        Some(TouchCalibration::from_baselines(self.filtered_x, self.filtered_y));
                    self.phase = TouchPhase::Idle;
                }
                None
            }

            TouchPhase::Idle => {
                let cal = self.calibration?;
                let pressed = self.filtered_y >= cal.press_threshold_y
                    || self.filtered_x >= cal.baseline_x + cal.margin_x;
                if !pressed {
                    return None;
                }

                self.phase = TouchPhase::Pressed;

                // Tap debounce: the transition stands, the event may not.
                let bounced = self
                    .last_tap_ms
                    .is_some_and(|last| now_ms.wrapping_sub(last) < TAP_DEBOUNCE_MS);
                if bounced {
                    None
                } else {
                    self.last_tap_ms = Some(now_ms);
                    Some(TouchEvent::ModeAdvance)
                }
            }

            TouchPhase::Pressed => {
                let cal = self.calibration?;
                // Tighter X bound on release prevents chatter at the boundary.
                let released = self.filtered_y <= cal.release_threshold_y
                    && self.filtered_x <= cal.baseline_x + cal.margin_x / 2.0;
                if released {
                    self.phase = TouchPhase::Idle;
                }
                None
            }
        }
    }

    /// Update the per-axis EMA with clamped raw readings.
    fn filter(&mut self, raw_x: f32, raw_y: f32) {
        if self.seeded {
            self.filtered_x = TOUCH_EMA_RETAIN * self.filtered_x + (1.0 - TOUCH_EMA_RETAIN) * raw_x;
            self.filtered_y = TOUCH_EMA_RETAIN * self.filtered_y + (1.0 - TOUCH_EMA_RETAIN) * raw_y;
        } else {
            self.filtered_x = raw_x;
            self.filtered_y = raw_y;
            self.seeded = true;
        }
    }

    /// Frozen calibration, if the settling period has elapsed.
    #[allow(dead_code)]
    pub const fn calibration(&self) -> Option<&TouchCalibration> {
        self.calibration.as_ref()
    }

    /// Whether a press is currently recognized.
    #[allow(dead_code)]
    pub fn is_pressed(&self) -> bool {
        self.phase == TouchPhase::Pressed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
