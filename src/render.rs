//! Render diff tracking and the overrev alert state machine.
//!
//! The controller decides, per logical field, whether the display is worth
//! touching this tick. It owns the last-*rendered* snapshot - the values
//! that actually reached the panel, which is not the same as the values of
//! the previous tick: a change below a field's epsilon is not drawn, and the
//! snapshot keeps the older value so slow drift still accumulates into a
//! redraw once it crosses the epsilon.
//!
//! # Update Strategy
//!
//! | Field      | Redraw condition                                   |
//! |------------|----------------------------------------------------|
//! | Rate       | changed by >= `RATE_EPSILON` rpm                   |
//! | Speed      | changed by >= `SPEED_EPSILON` km/h                 |
//! | Gear       | exact change                                       |
//! | Info panel | page changed, or value moved beyond its epsilon    |
//!
//! # Alert State Machine
//!
//! `rate >= ALERT_RPM` enters Flashing. Each tick in Flashing toggles the
//! phase: phase-on frames fill the whole screen with the alert (normal
//! content suppressed), phase-off frames repaint the full static UI plus
//! every value - the flashing overwrote the entire surface, so per-field
//! diffing is necessarily discarded for those frames. Dropping back below
//! the threshold forces exactly one more full repaint, guaranteeing the
//! display is left complete and consistent.

use crate::config::{ALERT_RPM, DISTANCE_EPSILON_KM, HOURS_EPSILON, RATE_EPSILON, SPEED_EPSILON};
use crate::gear::Gear;
use crate::pages::InfoPage;
use crate::trip::UsageAccumulators;

// =============================================================================
// Planner Input and Output
// =============================================================================

/// Telemetry values of one sampling tick, as given to the planner.
#[derive(Clone, Copy, Debug)]
pub struct TickValues {
    pub rate_rpm: f32,
    pub speed_kmh: f32,
    pub gear: Gear,
    pub usage: UsageAccumulators,
}

/// What to do with the whole drawing surface this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SurfaceOp {
    /// Leave the surface as is; only flagged fields are redrawn.
    Keep,
    /// Fill the screen with the alert; no fields are drawn.
    AlertFill,
    /// Repaint the static UI from scratch before drawing fields.
    FullRepaint,
}

/// Per-frame draw instructions handed to the widget layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FramePlan {
    pub surface: SurfaceOp,
    pub draw_rate: bool,
    pub draw_speed: bool,
    pub draw_gear: bool,
    pub draw_panel: bool,
}

impl FramePlan {
    /// Repaint everything: static UI and all four fields.
    const fn full_repaint() -> Self {
        Self {
            surface: SurfaceOp::FullRepaint,
            draw_rate: true,
            draw_speed: true,
            draw_gear: true,
            draw_panel: true,
        }
    }

    /// Alert fill: the surface op suppresses all field drawing.
    const fn alert_fill() -> Self {
        Self {
            surface: SurfaceOp::AlertFill,
            draw_rate: false,
            draw_speed: false,
            draw_gear: false,
            draw_panel: false,
        }
    }
}

// =============================================================================
// Controller State
// =============================================================================

/// Overrev alert phase.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum AlertState {
    Normal,
    /// Flashing; `phase_on` frames show the alert fill, the others the UI.
    Flashing { phase_on: bool },
}

/// The last values actually drawn. Used solely for render diffing.
#[derive(Clone, Copy, Debug)]
struct Snapshot {
    rate_rpm: f32,
    speed_kmh: f32,
    gear: Gear,
    page: InfoPage,
    panel_value: f64,
}

/// Decides what to redraw each tick and owns the alert state machine.
pub struct RenderDiff {
    page: InfoPage,
    alert: AlertState,
    /// `None` when the surface content is unknown (boot, or just overwritten
    /// by an alert fill); the next normal frame then repaints fully.
    last: Option<Snapshot>,
}

impl RenderDiff {
    pub const fn new() -> Self {
        Self {
            page: InfoPage::Odometer,
            alert: AlertState::Normal,
            last: None,
        }
    }

    /// Advance the info panel page. Called on a touch mode-advance event;
    /// the next plan picks the change up as a panel redraw.
    pub const fn advance_page(&mut self) {
        self.page = self.page.advance();
    }

    /// Currently selected info panel page.
    pub const fn page(&self) -> InfoPage {
        self.page
    }

    /// Whether the overrev alert is currently flashing.
    pub const fn alert_active(&self) -> bool {
        matches!(self.alert, AlertState::Flashing { .. })
    }

    /// Plan one frame from this tick's values.
    ///
    /// Mutates the snapshot for every field the plan flags, so consecutive
    /// calls diff against what was actually rendered.
    pub fn plan(&mut self, values: &TickValues) -> FramePlan {
        match self.alert {
            AlertState::Normal => {
                if values.rate_rpm >= ALERT_RPM {
                    // Enter flashing on the alert phase; the fill overwrites
                    // the surface, so the snapshot is no longer meaningful.
                    self.alert = AlertState::Flashing { phase_on: true };
                    self.last = None;
                    return FramePlan::alert_fill();
                }
                self.plan_diff(values)
            }

            AlertState::Flashing { phase_on } => {
                if values.rate_rpm < ALERT_RPM {
                    // Leaving the alert: one forced full repaint, whatever
                    // the per-field diffs say.
                    self.alert = AlertState::Normal;
                    self.commit_full(values);
                    return FramePlan::full_repaint();
                }

                let phase_on = !phase_on;
                self.alert = AlertState::Flashing { phase_on };
                if phase_on {
                    self.last = None;
                    FramePlan::alert_fill()
                } else {
                    self.commit_full(values);
                    FramePlan::full_repaint()
                }
            }
        }
    }

    /// Per-field epsilon diffing against the last rendered snapshot.
    fn plan_diff(&mut self, values: &TickValues) -> FramePlan {
        let panel_value = Self::panel_value(self.page, &values.usage);

        let Some(last) = self.last.as_mut() else {
            // Surface content unknown: paint everything.
            self.commit_full(values);
            return FramePlan::full_repaint();
        };

        let draw_rate = (values.rate_rpm - last.rate_rpm).abs() >= RATE_EPSILON;
        let draw_speed = (values.speed_kmh - last.speed_kmh).abs() >= SPEED_EPSILON;
        let draw_gear = values.gear != last.gear;
        let draw_panel = self.page != last.page
            || (panel_value - last.panel_value).abs() >= Self::panel_epsilon(self.page);

        // Commit only what will be drawn; undrawn fields keep the value
        // still on the panel, so drift accumulates toward the epsilon.
        if draw_rate {
            last.rate_rpm = values.rate_rpm;
        }
        if draw_speed {
            last.speed_kmh = values.speed_kmh;
        }
        if draw_gear {
            last.gear = values.gear;
        }
        if draw_panel {
            last.page = self.page;
            last.panel_value = panel_value;
        }

        FramePlan {
            surface: SurfaceOp::Keep,
            draw_rate,
            draw_speed,
            draw_gear,
            draw_panel,
        }
    }

    /// Snapshot every field as rendered.
    fn commit_full(&mut self, values: &TickValues) {
        self.last = Some(Snapshot {
            rate_rpm: values.rate_rpm,
            speed_kmh: values.speed_kmh,
            gear: values.gear,
            page: self.page,
            panel_value: Self::panel_value(self.page, &values.usage),
        });
    }

    /// The counter shown on the given page.
    pub fn panel_value(page: InfoPage, usage: &UsageAccumulators) -> f64 {
        match page {
            InfoPage::Odometer => usage.odometer_km,
            InfoPage::Trip => usage.trip_km,
            InfoPage::RunningHours => usage.running_hours,
        }
    }

    /// Redraw epsilon for the given page's value.
    const fn panel_epsilon(page: InfoPage) -> f64 {
        match page {
            InfoPage::Odometer | InfoPage::Trip => DISTANCE_EPSILON_KM,
            InfoPage::RunningHours => HOURS_EPSILON,
        }
    }
}

impl Default for RenderDiff {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
