//! Color constants for the cluster display.
//!
//! Rgb565 is native to the target panel (5 bits red, 6 bits green, 5 bits
//! blue), so these constants go to the display buffer without conversion.
//! Standard colors come from the `RgbColor` trait to guarantee optimal
//! channel values.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors (from RgbColor trait - guaranteed optimal values)
// =============================================================================

/// Pure black. Background everywhere, including the masked bottom band.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Text on dark backgrounds and the rate bar border.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Pure red. Redline segment of the rate bar and the overrev alert fill.
pub const RED: Rgb565 = Rgb565::RED;

/// Pure green. Normal-range segment of the rate bar.
pub const GREEN: Rgb565 = Rgb565::GREEN;

/// Pure yellow. Warning segment of the rate bar and the gear box outline.
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

/// Pure cyan. Large speed readout.
pub const CYAN: Rgb565 = Rgb565::CYAN;

// =============================================================================
// Custom Colors (application-specific)
// =============================================================================

/// Dark gray for the outer frame and the speed box guide outline.
/// RGB565: (8, 16, 8) - roughly 25% brightness.
pub const GRAY: Rgb565 = Rgb565::new(8, 16, 8);
