// Crate-level lints: allow common embedded/graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // Intentional f32->i32, u32->i32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u32/i32->f32 in graphics calculations
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for our value ranges
#![allow(clippy::cast_sign_loss)] // i32->u32 where we know sign is positive

//! Motorcycle instrument cluster simulator.
//!
//! Renders a 320x240 cluster fed by a simulated engine: an ignition pulse
//! tachometer with a bar and numeric readout, a gear indicator resolved from
//! the gearbox switch lines, a derived speed readout, and a tap-switchable
//! info panel cycling odometer, trip, and running hours. Revving past the
//! redline flashes a full-screen shift alert.
//!
//! The cluster logic runs on a 50 ms sampling tick and a 25 ms touch poll,
//! decoupled from the ~50 FPS frame loop, so the timing matches what the
//! hardware build uses.
//!
//! # Controls (Simulator Mode)
//!
//! | Key | Action |
//! |-----|--------|
//! | `T` | Tap the touch panel (advance the info page) |
//! | `R` | Reset the trip counter |
//! | `D` | Toggle the diagnostics overlay |
//!
//! Key repeat is ignored to prevent spam when holding keys.

mod colors;
mod config;
mod engine;
mod gear;
mod pages;
mod profiling;
mod render;
mod sim;
mod styles;
mod tach;
mod touch;
mod trip;
mod widgets;

use core::fmt::Write;
use std::thread;
use std::time::Instant;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use heapless::String;

use colors::BLACK;
use config::{FRAME_TIME, MASK_REPAINT_MS, SAMPLE_TICK_MS, SCREEN_HEIGHT, SCREEN_WIDTH, TOUCH_POLL_MS};
use engine::Cluster;
use profiling::{DebugLog, FrameStats};
use sim::{EngineModel, SimTouchPanel};
use tach::PulseAccumulator;

/// Shared with the (simulated) edge interrupt context.
static PULSES: PulseAccumulator = PulseAccumulator::new();

fn main() {
    // Initialize display and window (simulator mode)
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Moto Cluster", &output_settings);

    display.clear(BLACK).ok();
    window.update(&display);

    // ==========================================================================
    // Main Loop State
    // ==========================================================================

    let mut model = EngineModel::new();
    let mut cluster = Cluster::new(model.gear_lines(), 0);
    let mut panel = SimTouchPanel::new();

    let mut stats = FrameStats::new();
    let mut debug_log = DebugLog::new();
    debug_log.push("Cluster started");

    // Diagnostics overlay state (D key toggles)
    let mut show_diagnostics = false;

    // Last values logged, to report transitions once
    let mut last_gear = model.gear_number();
    let mut alert_was_active = false;

    // Cadence deadlines, milliseconds since start
    let start = Instant::now();
    let mut next_sample_ms = 0u32;
    let mut next_touch_ms = 0u32;
    let mut next_mask_ms = 0u32;

    // ==========================================================================
    // Main Render Loop
    // ==========================================================================

    loop {
        let frame_start = Instant::now();

        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    // Ignore OS key repeat to prevent spam when holding keys
                    if repeat {
                        continue;
                    }
                    match keycode {
                        // T: tap the simulated touch panel
                        Keycode::T => panel.tap(),
                        // R: reset the trip counter
                        Keycode::R => {
                            cluster.reset_trip();
                            debug_log.push("Trip reset");
                        }
                        // D: toggle the diagnostics overlay
                        Keycode::D => {
                            show_diagnostics = !show_diagnostics;
                            debug_log.push(if show_diagnostics {
                                "Diagnostics: ON"
                            } else {
                                "Diagnostics: OFF"
                            });
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        let now_ms = start.elapsed().as_millis() as u32;

        // ======================================================================
        // Touch Polling Cadence (25 ms)
        // ======================================================================

        while now_ms >= next_touch_ms {
            if cluster.poll_touch(&mut panel, next_touch_ms).is_some() {
                let mut line: String<24> = String::new();
                let _ = write!(line, "Page: {}", cluster.page().label());
                debug_log.push(&line);
            }
            next_touch_ms += TOUCH_POLL_MS;
        }

        // ======================================================================
        // Sampling Cadence (50 ms): model, pulses, cluster tick
        // ======================================================================

        while now_ms >= next_sample_ms {
            model.step(SAMPLE_TICK_MS);
            model.emit_pulses(&PULSES, next_sample_ms, SAMPLE_TICK_MS);
            cluster.tick(&PULSES, &mut display, next_sample_ms);

            if model.gear_number() != last_gear {
                last_gear = model.gear_number();
                let mut line: String<24> = String::new();
                let _ = write!(line, "Shift -> {last_gear}");
                debug_log.push(&line);
            }
            if cluster.alert_active() != alert_was_active {
                alert_was_active = cluster.alert_active();
                debug_log.push(if alert_was_active { "Overrev alert" } else { "Alert cleared" });
            }

            next_sample_ms += SAMPLE_TICK_MS;
        }

        // ======================================================================
        // Masked Band Cadence (500 ms)
        // ======================================================================

        while now_ms >= next_mask_ms {
            if show_diagnostics {
                widgets::draw_diagnostics(&mut display, &debug_log, stats.fps());
            } else {
                widgets::draw_mask_band(&mut display);
            }
            next_mask_ms += MASK_REPAINT_MS;
        }

        // ======================================================================
        // Frame Timing
        // ======================================================================

        window.update(&display);

        let pre_sleep = frame_start.elapsed();
        if pre_sleep < FRAME_TIME {
            thread::sleep(FRAME_TIME - pre_sleep);
        }
        stats.record_frame(frame_start.elapsed());
    }
}
