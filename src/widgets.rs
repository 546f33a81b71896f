//! Drawing routines for the cluster widgets.
//!
//! Every function here draws one region and nothing else, so the render
//! planner can redraw exactly the fields that changed. Dynamic widgets
//! first clear their own background rectangle; regions never overlap, so a
//! partial redraw cannot leave ghosting from a neighbour.
//!
//! All fixed positions are `const Point`/`const Size`, and stroke/fill
//! styles are const `PrimitiveStyle`s - nothing is computed per frame
//! except the rate bar fill width and color.
//!
//! Layout (320x240, bottom 40 px masked):
//!
//! ```text
//! +------------------------------------+  y=0
//! | [ rate bar                       ] |  y=12..30
//! |                        1234 RPM    |  y=34..46
//! |   +------------------+             |
//! |   |       87         |  +------+   |  speed box y=56..132
//! |   |      km/h        |  |  3   |   |  gear box  y=120..184
//! |   +------------------+  +------+   |
//! | ODO                                |  info panel y=150..198
//! | 12345.6 km                         |
//! +------------------------------------+  y=200 (visible limit)
//! |            masked band             |  y=200..240
//! +------------------------------------+
//! ```

use core::fmt::Write;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::Text,
};
use embedded_graphics_simulator::SimulatorDisplay;
use heapless::String;

use crate::{
    colors::{BLACK, GRAY, GREEN, RED, WHITE, YELLOW},
    config::{ALERT_RPM, MASK_BOTTOM, RATE_MAX_RPM, RATE_WARN_RPM, SCREEN_WIDTH, VISIBLE_HEIGHT},
    gear::Gear,
    pages::InfoPage,
    profiling::DebugLog,
    styles::{
        ALERT_STYLE, CENTERED, GEAR_STYLE, LABEL_STYLE_WHITE, LEFT_ALIGNED, RIGHT_ALIGNED,
        SPEED_STYLE, UNIT_STYLE_WHITE,
    },
};

// =============================================================================
// Layout Constants
// =============================================================================

/// Outer frame around the visible area.
const FRAME_POS: Point = Point::new(0, 0);
const FRAME_SIZE: Size = Size::new(SCREEN_WIDTH, VISIBLE_HEIGHT);

/// Rate bar border.
const BAR_POS: Point = Point::new(16, 12);
const BAR_SIZE: Size = Size::new(288, 18);

/// Rate bar interior (2 px inside the border).
const BAR_FILL_POS: Point = Point::new(18, 14);
const BAR_FILL_WIDTH: u32 = 284;
const BAR_FILL_HEIGHT: u32 = 14;

/// Small numeric rate readout under the bar's right end.
const RATE_TEXT_POS: Point = Point::new(304, 44);
const RATE_TEXT_CLEAR_POS: Point = Point::new(180, 34);
const RATE_TEXT_CLEAR_SIZE: Size = Size::new(124, 14);

/// Speed box outline and contents.
const SPEED_BOX_POS: Point = Point::new(50, 56);
const SPEED_BOX_SIZE: Size = Size::new(170, 76);
const SPEED_BOX_CORNER: Size = Size::new(6, 6);
const SPEED_CLEAR_POS: Point = Point::new(53, 59);
const SPEED_CLEAR_SIZE: Size = Size::new(164, 70);
const SPEED_VALUE_POS: Point = Point::new(135, 102);
const SPEED_UNIT_POS: Point = Point::new(135, 126);

/// Gear box outline and digit.
const GEAR_BOX_POS: Point = Point::new(244, 120);
const GEAR_BOX_SIZE: Size = Size::new(60, 64);
const GEAR_BOX_CORNER: Size = Size::new(6, 6);
const GEAR_CLEAR_POS: Point = Point::new(247, 123);
const GEAR_CLEAR_SIZE: Size = Size::new(54, 58);
const GEAR_DIGIT_POS: Point = Point::new(274, 162);

/// Bottom-left info panel (page label above value).
const PANEL_CLEAR_POS: Point = Point::new(14, 146);
const PANEL_CLEAR_SIZE: Size = Size::new(216, 52);
const PANEL_LABEL_POS: Point = Point::new(16, 156);
const PANEL_VALUE_POS: Point = Point::new(16, 182);

/// Full-screen alert text, centered in the visible area.
const ALERT_TEXT_POS: Point = Point::new(160, 106);

/// Masked band across the bottom of the panel.
const MASK_POS: Point = Point::new(0, VISIBLE_HEIGHT as i32);
const MASK_SIZE: Size = Size::new(SCREEN_WIDTH, MASK_BOTTOM);

/// Diagnostics overlay rows inside the masked band.
const DIAG_LINE_X: i32 = 4;
const DIAG_LINE_Y0: i32 = 210;
const DIAG_LINE_STEP: i32 = 12;
const DIAG_FPS_POS: Point = Point::new((SCREEN_WIDTH - 4) as i32, 210);

// =============================================================================
// Pre-computed Primitive Styles
// =============================================================================

const FRAME_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GRAY, 1);
const BAR_BORDER_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(WHITE, 1);
const SPEED_BOX_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GRAY, 1);
const GEAR_BOX_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(YELLOW, 2);
const BLACK_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(BLACK);
const ALERT_FILL_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(RED);

// =============================================================================
// Static Frame
// =============================================================================

/// Repaint the static UI: clear the visible area and draw the frame, the
/// rate bar border, and the speed and gear boxes. Field values are drawn
/// separately by the per-field functions.
pub fn draw_static_frame(display: &mut SimulatorDisplay<Rgb565>) {
    Rectangle::new(FRAME_POS, FRAME_SIZE)
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();

    Rectangle::new(FRAME_POS, FRAME_SIZE)
        .into_styled(FRAME_STYLE)
        .draw(display)
        .ok();

    Rectangle::new(BAR_POS, BAR_SIZE)
        .into_styled(BAR_BORDER_STYLE)
        .draw(display)
        .ok();

    RoundedRectangle::with_equal_corners(Rectangle::new(SPEED_BOX_POS, SPEED_BOX_SIZE), SPEED_BOX_CORNER)
        .into_styled(SPEED_BOX_STYLE)
        .draw(display)
        .ok();

    RoundedRectangle::with_equal_corners(Rectangle::new(GEAR_BOX_POS, GEAR_BOX_SIZE), GEAR_BOX_CORNER)
        .into_styled(GEAR_BOX_STYLE)
        .draw(display)
        .ok();
}

// =============================================================================
// Dynamic Fields
// =============================================================================

/// Fill color for the rate bar at the given rate.
const fn bar_color(rate_rpm: f32) -> Rgb565 {
    if rate_rpm >= ALERT_RPM {
        RED
    } else if rate_rpm >= RATE_WARN_RPM {
        YELLOW
    } else {
        GREEN
    }
}

/// Redraw the rate bar fill and the numeric readout.
pub fn draw_rate(display: &mut SimulatorDisplay<Rgb565>, rate_rpm: f32) {
    // Clear the full interior, then fill the active portion.
    Rectangle::new(BAR_FILL_POS, Size::new(BAR_FILL_WIDTH, BAR_FILL_HEIGHT))
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();

    let fill = ((rate_rpm / RATE_MAX_RPM) * BAR_FILL_WIDTH as f32) as u32;
    if fill > 0 {
        Rectangle::new(BAR_FILL_POS, Size::new(fill.min(BAR_FILL_WIDTH), BAR_FILL_HEIGHT))
            .into_styled(PrimitiveStyle::with_fill(bar_color(rate_rpm)))
            .draw(display)
            .ok();
    }

    Rectangle::new(RATE_TEXT_CLEAR_POS, RATE_TEXT_CLEAR_SIZE)
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();

    let mut text: String<16> = String::new();
    let _ = write!(text, "{rate_rpm:.0} RPM");
    Text::with_text_style(&text, RATE_TEXT_POS, LABEL_STYLE_WHITE, RIGHT_ALIGNED)
        .draw(display)
        .ok();
}

/// Redraw the speed value and unit inside the speed box.
pub fn draw_speed(display: &mut SimulatorDisplay<Rgb565>, speed_kmh: f32) {
    Rectangle::new(SPEED_CLEAR_POS, SPEED_CLEAR_SIZE)
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();

    let mut value: String<8> = String::new();
    let _ = write!(value, "{speed_kmh:.0}");
    Text::with_text_style(&value, SPEED_VALUE_POS, SPEED_STYLE, CENTERED)
        .draw(display)
        .ok();

    Text::with_text_style("km/h", SPEED_UNIT_POS, UNIT_STYLE_WHITE, CENTERED)
        .draw(display)
        .ok();
}

/// Redraw the gear indicator digit.
pub fn draw_gear(display: &mut SimulatorDisplay<Rgb565>, gear: Gear) {
    Rectangle::new(GEAR_CLEAR_POS, GEAR_CLEAR_SIZE)
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();

    Text::with_text_style(gear.label(), GEAR_DIGIT_POS, GEAR_STYLE, CENTERED)
        .draw(display)
        .ok();
}

/// Redraw the bottom-left info panel: the page label and its counter.
pub fn draw_info_panel(display: &mut SimulatorDisplay<Rgb565>, page: InfoPage, value: f64) {
    Rectangle::new(PANEL_CLEAR_POS, PANEL_CLEAR_SIZE)
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();

    Text::with_text_style(page.label(), PANEL_LABEL_POS, LABEL_STYLE_WHITE, LEFT_ALIGNED)
        .draw(display)
        .ok();

    let mut text: String<24> = String::new();
    let unit = match page {
        InfoPage::Odometer | InfoPage::Trip => "km",
        InfoPage::RunningHours => "h",
    };
    let _ = write!(text, "{value:.1} {unit}");
    Text::with_text_style(&text, PANEL_VALUE_POS, UNIT_STYLE_WHITE, LEFT_ALIGNED)
        .draw(display)
        .ok();
}

// =============================================================================
// Alert and Mask
// =============================================================================

/// Fill the visible area with the overrev alert.
pub fn draw_alert_fill(display: &mut SimulatorDisplay<Rgb565>) {
    Rectangle::new(FRAME_POS, FRAME_SIZE)
        .into_styled(ALERT_FILL_STYLE)
        .draw(display)
        .ok();

    Text::with_text_style("SHIFT UP", ALERT_TEXT_POS, ALERT_STYLE, CENTERED)
        .draw(display)
        .ok();
}

/// Repaint the masked bottom band black. Called periodically to cover
/// bleed-through on the defective rows.
pub fn draw_mask_band(display: &mut SimulatorDisplay<Rgb565>) {
    Rectangle::new(MASK_POS, MASK_SIZE)
        .into_styled(BLACK_FILL)
        .draw(display)
        .ok();
}

/// Draw the diagnostics overlay inside the masked band: recent log lines
/// on the left, the frame rate on the right.
pub fn draw_diagnostics(display: &mut SimulatorDisplay<Rgb565>, log: &DebugLog, fps: f32) {
    draw_mask_band(display);

    for (row, line) in log.recent().enumerate() {
        let pos = Point::new(DIAG_LINE_X, DIAG_LINE_Y0 + row as i32 * DIAG_LINE_STEP);
        Text::with_text_style(line, pos, LABEL_STYLE_WHITE, LEFT_ALIGNED)
            .draw(display)
            .ok();
    }

    let mut fps_text: String<16> = String::new();
    let _ = write!(fps_text, "{fps:.0} FPS");
    Text::with_text_style(&fps_text, DIAG_FPS_POS, LABEL_STYLE_WHITE, RIGHT_ALIGNED)
        .draw(display)
        .ok();
}
