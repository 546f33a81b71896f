//! Application configuration constants.
//!
//! All timing windows, signal thresholds, and redraw epsilons live here as
//! documented `const`s so every module agrees on the same numbers. Threshold
//! groups include compile-time `assert!` validation: if a group is configured
//! inconsistently (e.g. a release threshold above its press threshold),
//! compilation fails with a clear error.

use std::time::Duration;

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (landscape ST7789/ILI9341 class panel: 320x240).
pub const SCREEN_WIDTH: u32 = 320;

/// Display height in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

/// Height of the masked band at the bottom of the panel. This hardware
/// revision shows artifacts in the bottom rows, so nothing is drawn there
/// and the band is periodically repainted black.
pub const MASK_BOTTOM: u32 = 40;

/// Height of the usable drawing area above the masked band.
pub const VISIBLE_HEIGHT: u32 = SCREEN_HEIGHT - MASK_BOTTOM;

/// How often the masked bottom band is repainted to cover bleed-through.
pub const MASK_REPAINT_MS: u32 = 500;

// =============================================================================
// Timing Configuration
// =============================================================================

/// Target frame time for the simulator loop (~50 FPS).
pub const FRAME_TIME: Duration = Duration::from_millis(20);

/// Period of the telemetry sampling tick (gear, rate, integration, render).
pub const SAMPLE_TICK_MS: u32 = 50;

/// Period of the touch polling tick. Faster than the sampling tick so taps
/// are not missed between telemetry frames.
pub const TOUCH_POLL_MS: u32 = 25;

// =============================================================================
// Pulse Rate (Tachometer) Configuration
// =============================================================================

/// Minimum spacing between accepted coil edges. Edges arriving closer than
/// this are discarded as electrical noise (ringing on the pulse line).
pub const EDGE_DEBOUNCE_MS: u32 = 2;

/// Minimum sampling window before a new rate is derived. Shorter windows
/// return the previously computed rate unchanged.
pub const MIN_SAMPLE_WINDOW_MS: u32 = 250;

/// Ignition pulses per crankshaft revolution (wasted-spark twin).
pub const PULSES_PER_REV: u32 = 2;

/// RPM per pulse-per-second: 60 s/min divided by pulses per revolution.
pub const RPM_PER_PPS: f32 = 60.0 / PULSES_PER_REV as f32;

/// Upper clamp for the derived rate. Matches the redline end of the bar.
pub const RATE_MAX_RPM: f32 = 12_000.0;

const _: () = assert!(EDGE_DEBOUNCE_MS < MIN_SAMPLE_WINDOW_MS);

// =============================================================================
// Touch Panel Configuration
// =============================================================================

/// Full-scale reading of the touch ADC channels (12-bit).
pub const TOUCH_ADC_MAX: u16 = 4095;

/// EMA retain weight: `filtered = retain * filtered + (1 - retain) * raw`.
pub const TOUCH_EMA_RETAIN: f32 = 0.7;

/// Settling time after boot before the filtered values are frozen as the
/// calibration baselines. Calibration runs exactly once.
pub const TOUCH_SETTLE_MS: u32 = 1200;

/// Y-axis margin above baseline that recognizes a press.
pub const TOUCH_PRESS_MARGIN: f32 = 160.0;

/// Y-axis margin above baseline that must be re-crossed downward to
/// recognize a release. Strictly below [`TOUCH_PRESS_MARGIN`] so noise near
/// the activation boundary cannot oscillate press/release.
pub const TOUCH_RELEASE_MARGIN: f32 = 90.0;

/// X-axis margin above baseline that also recognizes a press. Release
/// requires X back within half this margin.
pub const TOUCH_MARGIN_X: f32 = 140.0;

/// Minimum spacing between emitted tap events. Presses recognized inside
/// this window still transition the state machine but emit nothing.
pub const TAP_DEBOUNCE_MS: u32 = 300;

// Hysteresis requires a strictly lower release threshold than press.
const _: () = assert!(TOUCH_RELEASE_MARGIN < TOUCH_PRESS_MARGIN);

// =============================================================================
// Render Diff Epsilons
// =============================================================================
//
// Redraws are suppressed while a value stays within its epsilon of the last
// rendered value. This keeps sensor jitter from causing visible flicker and
// needless bus traffic.

/// Minimum rate change (rpm) that redraws the rate bar and rate text.
pub const RATE_EPSILON: f32 = 50.0;

/// Minimum speed change (km/h) that redraws the speed readout.
pub const SPEED_EPSILON: f32 = 1.0;

/// Minimum distance change (km) that redraws the odometer/trip panel.
pub const DISTANCE_EPSILON_KM: f64 = 0.05;

/// Minimum running-hours change that redraws the hours panel.
pub const HOURS_EPSILON: f64 = 0.01;

// =============================================================================
// Alert Thresholds
// =============================================================================

/// Rate at which the bar turns yellow (approaching redline).
pub const RATE_WARN_RPM: f32 = 10_000.0;

/// Rate at which the full-screen overrev alert starts flashing.
pub const ALERT_RPM: f32 = 11_500.0;

const _: () = assert!(RATE_WARN_RPM < ALERT_RPM);
const _: () = assert!(ALERT_RPM <= RATE_MAX_RPM);

// =============================================================================
// Gearbox Configuration
// =============================================================================

/// Number of forward gears.
pub const GEAR_COUNT: usize = 5;

/// Number of position switch lines (Neutral + forward gears), scanned in
/// priority order with Neutral first.
pub const GEAR_LINE_COUNT: usize = GEAR_COUNT + 1;

/// Top speed reachable in each gear (km/h), indexed by gear - 1. Speed is
/// derived as `rate / RATE_MAX_RPM * top_speed`.
pub const GEAR_TOP_SPEED_KMH: [f32; GEAR_COUNT] = [40.0, 60.0, 70.0, 90.0, 107.0];

// =============================================================================
// Engine Simulation Model
// =============================================================================

/// Floor of the simulated rev range (idle).
pub const SIM_RPM_MIN: f32 = 800.0;

/// Acceleration applied while the simulated throttle is open (rpm/s).
pub const SIM_RPM_ACCEL: f32 = 180.0;

/// Deceleration applied while the simulated throttle is closed (rpm/s).
pub const SIM_RPM_DECEL: f32 = -220.0;

/// Rate above which the simulated rider lifts off.
pub const SIM_LIFT_OFF_RPM: f32 = 11_800.0;

/// Rate below which the simulated rider opens the throttle again.
pub const SIM_THROTTLE_ON_RPM: f32 = 1_500.0;

/// Upshift thresholds per current gear (shift when rate exceeds).
pub const UPSHIFT_RPM: [f32; GEAR_COUNT] = [9_500.0, 10_500.0, 11_000.0, 11_500.0, 12_000.0];

/// Downshift thresholds per current gear (shift when rate drops below).
pub const DOWNSHIFT_RPM: [f32; GEAR_COUNT] = [800.0, 3_000.0, 4_000.0, 4_500.0, 5_000.0];

/// Rate multiplier applied when an upshift drops the revs.
pub const UPSHIFT_RESCALE: f32 = 0.7;

/// Rate multiplier applied when a downshift raises the revs.
pub const DOWNSHIFT_RESCALE: f32 = 1.25;

const _: () = assert!(SIM_RPM_MIN < SIM_THROTTLE_ON_RPM);
const _: () = assert!(SIM_LIFT_OFF_RPM < RATE_MAX_RPM);
const _: () = assert!(UPSHIFT_RPM[0] < UPSHIFT_RPM[1]);
const _: () = assert!(UPSHIFT_RPM[1] < UPSHIFT_RPM[2]);
const _: () = assert!(UPSHIFT_RPM[2] < UPSHIFT_RPM[3]);
const _: () = assert!(UPSHIFT_RPM[3] <= UPSHIFT_RPM[4]);
const _: () = assert!(DOWNSHIFT_RPM[1] < UPSHIFT_RPM[0]);
