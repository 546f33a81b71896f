//! Time-integrated usage counters: odometer, trip distance, running hours.
//!
//! Each sampling tick integrates the instantaneous speed over the wall-time
//! elapsed since the previous tick. The first call only latches the
//! timestamp - there is no previous interval to integrate, and inventing one
//! would credit distance that was never ridden.
//!
//! Running hours advance only while the engine turns (`rate > 0`), so
//! coasting with the engine off accumulates distance but not hours.
//!
//! All three counters are monotonically non-decreasing for the process
//! lifetime. The trip counter is the one with an external reset affordance
//! ([`UsageIntegrator::reset_trip`], wired to a key in the simulator);
//! odometer and hours have none. Counters are f64: a 50 ms tick at town
//! speeds is sub-meter, and those deltas must survive accumulation against
//! a six-digit odometer.

/// Milliseconds per hour, as the integration divisor.
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Cumulative usage counters. Read by the info panel each tick.
#[derive(Clone, Copy, Default, Debug)]
pub struct UsageAccumulators {
    /// Total distance, km. Never resets.
    pub odometer_km: f64,
    /// Trip distance, km. Resets via [`UsageIntegrator::reset_trip`].
    pub trip_km: f64,
    /// Engine running time, hours. Never resets.
    pub running_hours: f64,
}

/// Integrates speed and engine state into the usage counters.
pub struct UsageIntegrator {
    acc: UsageAccumulators,
    /// Timestamp of the previous integration; `None` until the first call.
    last_ms: Option<u32>,
}

impl UsageIntegrator {
    /// Create an integrator with zeroed counters.
    pub const fn new() -> Self {
        Self {
            acc: UsageAccumulators {
                odometer_km: 0.0,
                trip_km: 0.0,
                running_hours: 0.0,
            },
            last_ms: None,
        }
    }

    /// Integrate one tick.
    ///
    /// The first call latches `now_ms` and accumulates nothing. Subsequent
    /// calls advance odometer and trip by `speed * elapsed_hours` and, while
    /// `rate > 0`, running hours by `elapsed_hours`.
    pub fn integrate(&mut self, now_ms: u32, speed_kmh: f32, rate_rpm: f32) {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return;
        };

        let elapsed_hours = f64::from(now_ms.wrapping_sub(last)) / MS_PER_HOUR;
        let delta_km = f64::from(speed_kmh.max(0.0)) * elapsed_hours;

        self.acc.odometer_km += delta_km;
        self.acc.trip_km += delta_km;
        if rate_rpm > 0.0 {
            self.acc.running_hours += elapsed_hours;
        }

        self.last_ms = Some(now_ms);
    }

    /// Current counter values.
    pub const fn accumulators(&self) -> &UsageAccumulators {
        &self.acc
    }

    /// Reset the trip counter. Odometer and running hours are unaffected.
    pub const fn reset_trip(&mut self) {
        self.acc.trip_km = 0.0;
    }
}

impl Default for UsageIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
