//! Cluster orchestration: one sampling tick from inputs to pixels.
//!
//! [`Cluster`] owns every per-subsystem state machine and enforces the tick
//! ordering the derived values depend on: gear first (speed needs the gear
//! ratio), then rate, then speed, then the usage integration, and only then
//! the render plan - the plan must see the values of *this* tick, and the
//! integrators must have run before the info panel is diffed.
//!
//! The pulse accumulator is the one resource shared with the edge interrupt
//! context, so it stays outside the struct and is passed in by reference.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics_simulator::SimulatorDisplay;
use embedded_hal::digital::InputPin;

use crate::{
    config::GEAR_LINE_COUNT,
    gear::{Gear, GearSelector},
    pages::InfoPage,
    render::{FramePlan, RenderDiff, SurfaceOp, TickValues},
    tach::{PulseAccumulator, PulseRateEstimator},
    touch::{TouchDetector, TouchEvent, TouchPanel},
    trip::{UsageAccumulators, UsageIntegrator},
    widgets,
};

/// The full instrument cluster pipeline.
pub struct Cluster<P> {
    selector: GearSelector<P>,
    estimator: PulseRateEstimator,
    touch: TouchDetector,
    integrator: UsageIntegrator,
    render: RenderDiff,

    gear: Gear,
    speed_kmh: f32,
}

impl<P: InputPin> Cluster<P> {
    /// Build a cluster over the gearbox switch lines, booted at `now_ms`.
    pub const fn new(lines: [P; GEAR_LINE_COUNT], now_ms: u32) -> Self {
        Self {
            selector: GearSelector::new(lines),
            estimator: PulseRateEstimator::new(now_ms),
            touch: TouchDetector::new(now_ms),
            integrator: UsageIntegrator::new(),
            render: RenderDiff::new(),
            gear: Gear::Unknown,
            speed_kmh: 0.0,
        }
    }

    /// Run one sampling tick and draw whatever the plan flags.
    pub fn tick(
        &mut self,
        pulses: &PulseAccumulator,
        display: &mut SimulatorDisplay<Rgb565>,
        now_ms: u32,
    ) -> FramePlan {
        // Ordering is load-bearing: speed derives from this tick's gear and
        // rate, and the integrators must run before the panel is diffed.
        self.gear = self.selector.resolve();
        let rate = self.estimator.sample(pulses, now_ms);
        self.speed_kmh = self.gear.speed_from(rate);
        self.integrator.integrate(now_ms, self.speed_kmh, rate);

        let values = TickValues {
            rate_rpm: rate,
            speed_kmh: self.speed_kmh,
            gear: self.gear,
            usage: *self.integrator.accumulators(),
        };
        let plan = self.render.plan(&values);
        self.draw(display, &plan, &values);
        plan
    }

    /// Execute a frame plan against the display.
    fn draw(&self, display: &mut SimulatorDisplay<Rgb565>, plan: &FramePlan, values: &TickValues) {
        match plan.surface {
            SurfaceOp::AlertFill => {
                widgets::draw_alert_fill(display);
                return;
            }
            SurfaceOp::FullRepaint => widgets::draw_static_frame(display),
            SurfaceOp::Keep => {}
        }

        if plan.draw_rate {
            widgets::draw_rate(display, values.rate_rpm);
        }
        if plan.draw_speed {
            widgets::draw_speed(display, values.speed_kmh);
        }
        if plan.draw_gear {
            widgets::draw_gear(display, values.gear);
        }
        if plan.draw_panel {
            let page = self.render.page();
            widgets::draw_info_panel(display, page, RenderDiff::panel_value(page, &values.usage));
        }
    }

    /// Poll the touch panel once; a recognized tap advances the info page.
    pub fn poll_touch<T: TouchPanel>(&mut self, panel: &mut T, now_ms: u32) -> Option<TouchEvent> {
        let event = self.touch.poll(panel, now_ms);
        if let Some(TouchEvent::ModeAdvance) = event {
            self.render.advance_page();
        }
        event
    }

    /// Reset the trip counter.
    pub const fn reset_trip(&mut self) {
        self.integrator.reset_trip();
    }

    /// Most recently resolved gear.
    #[allow(dead_code)]
    pub const fn gear(&self) -> Gear {
        self.gear
    }

    /// Most recently derived rate.
    #[allow(dead_code)]
    pub const fn rate_rpm(&self) -> f32 {
        self.estimator.rate()
    }

    /// Most recently derived speed.
    #[allow(dead_code)]
    pub const fn speed_kmh(&self) -> f32 {
        self.speed_kmh
    }

    /// Currently selected info page.
    pub const fn page(&self) -> InfoPage {
        self.render.page()
    }

    /// Whether the overrev alert is flashing.
    pub const fn alert_active(&self) -> bool {
        self.render.alert_active()
    }

    /// Current usage counters.
    #[allow(dead_code)]
    pub const fn accumulators(&self) -> &UsageAccumulators {
        self.integrator.accumulators()
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::prelude::*;

    use crate::config::{
        ALERT_RPM, SAMPLE_TICK_MS, SCREEN_HEIGHT, SCREEN_WIDTH, TOUCH_POLL_MS, TOUCH_SETTLE_MS,
    };
    use crate::sim::{EngineModel, SimTouchPanel};

    use super::*;

    fn display() -> SimulatorDisplay<Rgb565> {
        SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT))
    }

    /// Feed debounce-legal edges at the given pulse spacing across a window.
    fn feed_edges(pulses: &PulseAccumulator, from_ms: u32, to_ms: u32, spacing_ms: u32) {
        let mut t = from_ms;
        while t < to_ms {
            pulses.on_edge(t);
            t += spacing_ms;
        }
    }

    #[test]
    fn test_first_tick_paints_everything() {
        let model = EngineModel::new();
        let mut cluster = Cluster::new(model.gear_lines(), 0);
        let pulses = PulseAccumulator::new();
        let mut disp = display();

        let plan = cluster.tick(&pulses, &mut disp, 0);
        assert_eq!(plan.surface, SurfaceOp::FullRepaint, "Boot frame repaints the static UI");
        assert_eq!(cluster.gear(), Gear::First, "Switch lines resolve on the first tick");
    }

    #[test]
    fn test_pipeline_derives_speed_from_gear_and_rate() {
        let model = EngineModel::new();
        let mut cluster = Cluster::new(model.gear_lines(), 0);
        let pulses = PulseAccumulator::new();
        let mut disp = display();

        // 100 pps across a full window: 3000 rpm.
        feed_edges(&pulses, 0, 300, 10);
        cluster.tick(&pulses, &mut disp, 300);

        let rate = cluster.rate_rpm();
        assert!((rate - 3_000.0).abs() < 50.0, "Expected ~3000 rpm, got {rate}");
        assert_eq!(
            cluster.speed_kmh(),
            cluster.gear().speed_from(rate),
            "Speed must derive from this tick's gear and rate"
        );
        assert!(cluster.speed_kmh() > 0.0);
    }

    #[test]
    fn test_usage_counters_advance_across_ticks() {
        let model = EngineModel::new();
        let mut cluster = Cluster::new(model.gear_lines(), 0);
        let pulses = PulseAccumulator::new();
        let mut disp = display();

        cluster.tick(&pulses, &mut disp, 0);
        let mut t = 0;
        for _ in 0..40 {
            feed_edges(&pulses, t, t + 300, 10);
            t += 300;
            cluster.tick(&pulses, &mut disp, t);
        }

        let acc = cluster.accumulators();
        assert!(acc.odometer_km > 0.0, "Riding for 12 s must accumulate distance");
        assert!(acc.running_hours > 0.0, "A turning engine must accumulate hours");
    }

    #[test]
    fn test_trip_reset_through_cluster() {
        let model = EngineModel::new();
        let mut cluster = Cluster::new(model.gear_lines(), 0);
        let pulses = PulseAccumulator::new();
        let mut disp = display();

        cluster.tick(&pulses, &mut disp, 0);
        feed_edges(&pulses, 0, 300, 10);
        cluster.tick(&pulses, &mut disp, 300);
        feed_edges(&pulses, 300, 600, 10);
        cluster.tick(&pulses, &mut disp, 600);
        assert!(cluster.accumulators().trip_km > 0.0);

        let odo = cluster.accumulators().odometer_km;
        cluster.reset_trip();
        assert_eq!(cluster.accumulators().trip_km, 0.0);
        assert_eq!(cluster.accumulators().odometer_km, odo, "Reset must not touch the odometer");
    }

    #[test]
    fn test_tap_advances_info_page() {
        let model = EngineModel::new();
        let mut cluster = Cluster::new(model.gear_lines(), 0);
        let mut panel = SimTouchPanel::new();

        let mut t = 0;
        while t <= TOUCH_SETTLE_MS {
            assert!(cluster.poll_touch(&mut panel, t).is_none());
            t += TOUCH_POLL_MS;
        }
        assert_eq!(cluster.page(), InfoPage::Odometer);

        panel.tap();
        let mut events = 0;
        for _ in 0..20 {
            if cluster.poll_touch(&mut panel, t).is_some() {
                events += 1;
            }
            t += TOUCH_POLL_MS;
        }
        assert_eq!(events, 1);
        assert_eq!(cluster.page(), InfoPage::Trip, "A tap advances the panel page");
    }

    #[test]
    fn test_overrev_alert_flashes_and_clears() {
        let model = EngineModel::new();
        let mut cluster = Cluster::new(model.gear_lines(), 0);
        let pulses = PulseAccumulator::new();
        let mut disp = display();

        cluster.tick(&pulses, &mut disp, 0);

        // Edges at the debounce floor: the derived rate clamps to the
        // ceiling, well above the alert threshold.
        feed_edges(&pulses, 0, 300, 2);
        let plan = cluster.tick(&pulses, &mut disp, 300);
        assert!(cluster.rate_rpm() >= ALERT_RPM);
        assert_eq!(plan.surface, SurfaceOp::AlertFill, "Crossing the threshold fills the screen");
        assert!(cluster.alert_active());

        // Quiet window: rate collapses, the exit repaints in full.
        let plan = cluster.tick(&pulses, &mut disp, 600);
        assert_eq!(
            plan.surface,
            SurfaceOp::FullRepaint,
            "Leaving the alert forces one full repaint"
        );
        assert!(!cluster.alert_active());

        // Steady-state diffing resumes afterwards.
        let plan = cluster.tick(&pulses, &mut disp, 600 + 2 * SAMPLE_TICK_MS);
        assert_eq!(plan.surface, SurfaceOp::Keep);
    }
}
