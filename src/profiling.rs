//! Frame timing statistics and the diagnostics log ring buffer.
//!
//! Both feed the optional diagnostics overlay in the masked bottom band:
//! [`FrameStats`] smooths the frame rate with an exponential moving average,
//! [`DebugLog`] keeps the most recent cluster events (shifts, page changes,
//! alert transitions) in a fixed-size ring.

use std::time::Duration;

use heapless::{Deque, String};

// =============================================================================
// Debug Log Configuration
// =============================================================================

/// Maximum number of log lines kept in the ring buffer.
pub const LOG_BUFFER_SIZE: usize = 6;

/// Maximum characters per log line.
pub const LOG_LINE_LENGTH: usize = 48;

/// Lines shown by the diagnostics overlay (the band fits three rows).
pub const OVERLAY_LINES: usize = 3;

// =============================================================================
// Frame Statistics
// =============================================================================

/// Smoothed frame timing for the diagnostics overlay.
pub struct FrameStats {
    /// Rolling average frame time (exponential moving average).
    frame_time_avg_us: f32,
    /// Total frames recorded since startup.
    pub total_frames: u64,
}

impl FrameStats {
    /// Exponential moving average alpha (0.1 for smooth updates).
    const EMA_ALPHA: f32 = 0.1;

    pub const fn new() -> Self {
        Self {
            frame_time_avg_us: 0.0,
            total_frames: 0,
        }
    }

    /// Record one frame's total time.
    pub fn record_frame(&mut self, total_time: Duration) {
        let total_us = total_time.as_micros() as f32;
        if self.total_frames == 0 {
            self.frame_time_avg_us = total_us;
        } else {
            self.frame_time_avg_us =
                Self::EMA_ALPHA.mul_add(total_us, (1.0 - Self::EMA_ALPHA) * self.frame_time_avg_us);
        }
        self.total_frames += 1;
    }

    /// Smoothed frames per second. Zero until the first frame is recorded.
    pub fn fps(&self) -> f32 {
        if self.frame_time_avg_us > 0.0 {
            1_000_000.0 / self.frame_time_avg_us
        } else {
            0.0
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Debug Log Ring Buffer
// =============================================================================

/// Ring buffer of diagnostic messages. Oldest lines are dropped when full.
pub struct DebugLog {
    buffer: Deque<String<LOG_LINE_LENGTH>, LOG_BUFFER_SIZE>,
}

impl DebugLog {
    pub const fn new() -> Self {
        Self { buffer: Deque::new() }
    }

    /// Push a log message, truncating to the line length and dropping the
    /// oldest entry when the ring is full.
    pub fn push(&mut self, msg: &str) {
        if self.buffer.is_full() {
            self.buffer.pop_front();
        }

        let mut line: String<LOG_LINE_LENGTH> = String::new();
        for (i, c) in msg.chars().enumerate() {
            if i >= LOG_LINE_LENGTH - 1 {
                break;
            }
            line.push(c).ok();
        }

        self.buffer.push_back(line).ok();
    }

    /// Iterate over all log messages (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.buffer.iter().map(heapless::string::StringInner::as_str)
    }

    /// The newest messages that fit the overlay (oldest of them first).
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        let skip = self.buffer.len().saturating_sub(OVERLAY_LINES);
        self.iter().skip(skip)
    }

    #[inline]
    #[allow(dead_code)]
    pub const fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats_new() {
        let stats = FrameStats::new();
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.fps(), 0.0, "No frames recorded yet means no rate");
    }

    #[test]
    fn test_fps_from_steady_frames() {
        let mut stats = FrameStats::new();
        for _ in 0..50 {
            stats.record_frame(Duration::from_millis(20));
        }
        let fps = stats.fps();
        assert!((fps - 50.0).abs() < 0.5, "20 ms frames should converge near 50 FPS, got {fps}");
    }

    #[test]
    fn test_first_frame_seeds_average() {
        let mut stats = FrameStats::new();
        stats.record_frame(Duration::from_millis(10));
        assert!((stats.fps() - 100.0).abs() < 0.5, "First frame seeds the average directly");
    }

    #[test]
    fn test_debug_log_push() {
        let mut log = DebugLog::new();
        assert!(log.is_empty());

        log.push("Shift 2 -> 3");
        assert_eq!(log.len(), 1);

        log.push("Page: TRIP");
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_debug_log_ring_buffer() {
        let mut log = DebugLog::new();

        for i in 0..LOG_BUFFER_SIZE {
            log.push(&format!("Message {i}"));
        }
        assert_eq!(log.len(), LOG_BUFFER_SIZE);

        // One more drops the oldest.
        log.push("New message");
        assert_eq!(log.len(), LOG_BUFFER_SIZE);

        let first = log.iter().next().unwrap();
        assert!(first.starts_with("Message 1"), "Oldest entry must have been dropped");
    }

    #[test]
    fn test_debug_log_truncation() {
        let mut log = DebugLog::new();
        let long_msg = "This is a very long message that exceeds the maximum line length limit";
        log.push(long_msg);

        let stored = log.iter().next().unwrap();
        assert!(stored.len() < LOG_LINE_LENGTH);
    }

    #[test]
    fn test_recent_returns_newest_lines() {
        let mut log = DebugLog::new();
        for i in 0..5 {
            log.push(&format!("Line {i}"));
        }

        let recent: Vec<&str> = log.recent().collect();
        assert_eq!(recent.len(), OVERLAY_LINES);
        assert_eq!(recent[0], "Line 2", "Overlay shows the newest lines, oldest of them first");
        assert_eq!(recent[2], "Line 4");
    }
}
