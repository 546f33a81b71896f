//! Ignition pulse counting and rate estimation.
//!
//! The coil pulse train arrives on a hardware edge interrupt, so the counter
//! is split in two:
//!
//! - [`PulseAccumulator`]: the interrupt-shared half. Lives in a `static`,
//!   written by the edge handler ([`PulseAccumulator::on_edge`]) and drained
//!   by the sampling context with a single atomic swap. The handler performs
//!   exactly one atomic increment, which keeps the critical region minimal;
//!   no lock is needed because the exchange is single-producer /
//!   single-consumer.
//! - [`PulseRateEstimator`]: the sampling half. Owns the window timing and
//!   converts the drained count into an RPM figure.
//!
//! # Edge Debounce
//!
//! The pulse line rings electrically after each genuine coil discharge.
//! Edges closer than [`EDGE_DEBOUNCE_MS`] to the previously accepted edge are
//! discarded, so the counter advances at most once per debounce window.
//! The last-accepted-edge timestamp is touched only by the interrupt context.
//!
//! # Window Policy
//!
//! A rate is derived only once the sampling window reaches
//! [`MIN_SAMPLE_WINDOW_MS`]; a shorter window returns the previous rate
//! unchanged rather than a jittery partial estimate (fail-safe hold, never
//! zero).

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::{EDGE_DEBOUNCE_MS, MIN_SAMPLE_WINDOW_MS, RATE_MAX_RPM, RPM_PER_PPS};

/// Sentinel for "no edge accepted yet".
const NO_EDGE: u32 = u32::MAX;

// =============================================================================
// Interrupt-Shared Pulse Counter
// =============================================================================

/// Debounced pulse counter shared between the edge interrupt and the
/// sampling context.
///
/// Construct as a `static` and pass by reference to both contexts.
pub struct PulseAccumulator {
    /// Accepted edges in the current window. Incremented by the interrupt,
    /// swapped to zero by the sampling context.
    count: AtomicU32,

    /// Timestamp of the last accepted edge. Read and written only by the
    /// interrupt context; atomic so the type stays `Sync`.
    last_edge_ms: AtomicU32,
}

impl PulseAccumulator {
    /// Create an empty accumulator. Usable in `static` position.
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            last_edge_ms: AtomicU32::new(NO_EDGE),
        }
    }

    /// Edge interrupt handler body.
    ///
    /// Accepts the edge only if at least [`EDGE_DEBOUNCE_MS`] has elapsed
    /// since the previously accepted edge; closer edges are discarded as
    /// ringing. Safe to call from a context that preempts the sampling loop.
    pub fn on_edge(&self, now_ms: u32) {
        let last = self.last_edge_ms.load(Ordering::Relaxed);
        if last != NO_EDGE && now_ms.wrapping_sub(last) < EDGE_DEBOUNCE_MS {
            return;
        }
        self.last_edge_ms.store(now_ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Drain the counter: return the accepted-edge count and reset it to
    /// zero in one atomic exchange. Called only from the sampling context.
    fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Current count without draining. Test and diagnostics use only.
    #[cfg(test)]
    fn peek(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for PulseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Rate Estimator
// =============================================================================

/// Converts drained pulse counts into a clamped RPM figure once per window.
pub struct PulseRateEstimator {
    /// Start of the current sampling window.
    window_start_ms: u32,

    /// Most recently derived rate, held across short windows.
    last_rate: f32,
}

impl PulseRateEstimator {
    /// Create an estimator whose first window opens at `now_ms`.
    pub const fn new(now_ms: u32) -> Self {
        Self {
            window_start_ms: now_ms,
            last_rate: 0.0,
        }
    }

    /// Sample the accumulator.
    ///
    /// If the window is still shorter than [`MIN_SAMPLE_WINDOW_MS`], the
    /// previous rate is returned unchanged and the counter is left alone.
    /// Otherwise the counter is drained, the rate derived as
    /// `pulses_per_second * RPM_PER_PPS`, clamped to `[0, RATE_MAX_RPM]`,
    /// and a new window opened.
    pub fn sample(&mut self, pulses: &PulseAccumulator, now_ms: u32) -> f32 {
        let elapsed_ms = now_ms.wrapping_sub(self.window_start_ms);
        if elapsed_ms < MIN_SAMPLE_WINDOW_MS {
            return self.last_rate;
        }

        let count = pulses.take();
        let pulses_per_second = count as f32 * 1000.0 / elapsed_ms as f32;
        let rate = (pulses_per_second * RPM_PER_PPS).clamp(0.0, RATE_MAX_RPM);

        self.window_start_ms = now_ms;
        self.last_rate = rate;
        rate
    }

    /// Most recently derived rate without sampling.
    pub const fn rate(&self) -> f32 {
        self.last_rate
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Edge Debounce Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_first_edge_accepted() {
        let pulses = PulseAccumulator::new();
        pulses.on_edge(0);
        assert_eq!(pulses.peek(), 1, "First edge should always be accepted");
    }

    #[test]
    fn test_edge_within_debounce_discarded() {
        let pulses = PulseAccumulator::new();
        pulses.on_edge(10);
        pulses.on_edge(11); // 1 ms later: ringing, discard
        assert_eq!(pulses.peek(), 1, "Edge inside the debounce window should be discarded");
    }

    #[test]
    fn test_edge_at_debounce_boundary_accepted() {
        let pulses = PulseAccumulator::new();
        pulses.on_edge(10);
        pulses.on_edge(10 + EDGE_DEBOUNCE_MS);
        assert_eq!(pulses.peek(), 2, "Edge exactly at the debounce spacing should be accepted");
    }

    #[test]
    fn test_at_most_one_increment_per_debounce_window() {
        let pulses = PulseAccumulator::new();
        // 1 kHz burst over 20 ms: at 2 ms debounce, at most 10 survive.
        for t in 0..20 {
            pulses.on_edge(t);
        }
        assert_eq!(
            pulses.peek(),
            10,
            "A 1 ms burst should be thinned to one edge per debounce window"
        );
    }

    #[test]
    fn test_discarded_edge_does_not_extend_window() {
        let pulses = PulseAccumulator::new();
        pulses.on_edge(10);
        pulses.on_edge(11); // discarded
        pulses.on_edge(12); // 2 ms after the ACCEPTED edge: accepted
        assert_eq!(
            pulses.peek(),
            2,
            "Debounce must be measured from the last accepted edge, not the last seen one"
        );
    }

    #[test]
    fn test_on_edge_from_other_thread() {
        // The accumulator is the one cross-context resource; make sure the
        // producer side genuinely works from another thread.
        static PULSES: PulseAccumulator = PulseAccumulator::new();
        std::thread::scope(|s| {
            s.spawn(|| {
                for t in (0..100).step_by(2) {
                    PULSES.on_edge(t);
                }
            });
        });
        assert_eq!(PULSES.take(), 50, "All well-spaced edges from the producer thread count");
    }

    // -------------------------------------------------------------------------
    // Window Policy Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_short_window_returns_previous_rate() {
        let pulses = PulseAccumulator::new();
        let mut est = PulseRateEstimator::new(0);

        // Establish a rate over a full window: 50 pulses / 500 ms.
        for t in (0..500).step_by(10) {
            pulses.on_edge(t);
        }
        let rate = est.sample(&pulses, 500);
        assert!(rate > 0.0, "Full window should derive a rate");

        // Sample again after only 100 ms: held, counter untouched.
        pulses.on_edge(510);
        let held = est.sample(&pulses, 600);
        assert_eq!(held, rate, "Short window must return the previous rate unchanged");
        assert_eq!(pulses.peek(), 1, "Short window must not drain the counter");
    }

    #[test]
    fn test_short_window_idempotent_for_all_elapsed_below_minimum() {
        let pulses = PulseAccumulator::new();
        let mut est = PulseRateEstimator::new(1000);
        for dt in 0..MIN_SAMPLE_WINDOW_MS {
            assert_eq!(
                est.sample(&pulses, 1000 + dt),
                0.0,
                "Any window below the minimum must hold the previous rate"
            );
        }
    }

    #[test]
    fn test_rate_derivation() {
        let pulses = PulseAccumulator::new();
        let mut est = PulseRateEstimator::new(0);

        // 100 accepted pulses over exactly 1 s = 100 pps.
        for t in (0..1000).step_by(10) {
            pulses.on_edge(t);
        }
        let rate = est.sample(&pulses, 1000);
        assert!(
            (rate - 100.0 * RPM_PER_PPS).abs() < 0.01,
            "100 pps should convert via the pulses-per-rev multiplier, got {rate}"
        );
    }

    #[test]
    fn test_rate_clamped_to_max() {
        let pulses = PulseAccumulator::new();
        let mut est = PulseRateEstimator::new(0);

        // Implausibly dense (but debounce-legal) pulse train.
        for t in (0..1000).step_by(2) {
            pulses.on_edge(t);
        }
        let rate = est.sample(&pulses, 1000);
        assert_eq!(rate, RATE_MAX_RPM, "Derived rate must be clamped to RATE_MAX_RPM");
    }

    #[test]
    fn test_sample_resets_counter_and_window() {
        let pulses = PulseAccumulator::new();
        let mut est = PulseRateEstimator::new(0);

        for t in (0..500).step_by(10) {
            pulses.on_edge(t);
        }
        est.sample(&pulses, 500);
        assert_eq!(pulses.peek(), 0, "Sampling a full window must reset the counter");

        // A quiet next window derives zero.
        let rate = est.sample(&pulses, 1000);
        assert_eq!(rate, 0.0, "A window with no pulses should derive zero");
    }

    #[test]
    fn test_rate_accessor_tracks_last_sample() {
        let pulses = PulseAccumulator::new();
        let mut est = PulseRateEstimator::new(0);
        assert_eq!(est.rate(), 0.0);

        for t in (0..1000).step_by(10) {
            pulses.on_edge(t);
        }
        let rate = est.sample(&pulses, 1000);
        assert_eq!(est.rate(), rate, "rate() should return the last derived value");
    }
}
