//! Three-point velocity and acceleration estimation.
//!
//! Given the newest sample `s0`, the previous `s1` and the oldest `s2`:
//!
//! ```text
//! v1 = 1000 * (s1 - s2) / (t1 - t2)
//! v2 = 1000 * (s0 - s1) / (t0 - t1)
//! velocity     = 0.75 * v2 + 0.25 * v1
//! acceleration = 1000 * (v2 - v1) / (mid(t0, t1) - mid(t1, t2))
//! ```
//!
//! Timestamps are milliseconds, so the factor of 1000 yields per-second
//! velocity and per-second² acceleration.

use serde::{Deserialize, Serialize};

use gazetrack_common::error::{GazeError, GazeResult};

use crate::history::{ShortHistory, HISTORY_LEN};
use crate::point::Point2D;
use crate::sample::{GazeSample, TimestampMs, VelocityReading};

/// Weight of the most recent interval in the smoothed velocity.
pub const RECENT_WEIGHT: f64 = 0.75;

/// Velocity and acceleration derived from three consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEstimate {
    /// Smoothed velocity (units/s).
    pub velocity: Point2D,
    /// Acceleration (units/s²).
    pub acceleration: Point2D,
    /// Timestamp of the newest sample used.
    pub timestamp_ms: TimestampMs,
}

impl MotionEstimate {
    pub fn velocity_reading(&self) -> VelocityReading {
        VelocityReading {
            velocity: self.velocity,
            timestamp_ms: self.timestamp_ms,
        }
    }
}

/// Estimate motion from `[newest, middle, oldest]`.
pub fn estimate(s0: &GazeSample, s1: &GazeSample, s2: &GazeSample) -> GazeResult<MotionEstimate> {
    if s1.timestamp_ms <= s2.timestamp_ms {
        return Err(GazeError::NonMonotonicTimestamp {
            previous_ms: s2.timestamp_ms,
            current_ms: s1.timestamp_ms,
        });
    }
    if s0.timestamp_ms <= s1.timestamp_ms {
        return Err(GazeError::NonMonotonicTimestamp {
            previous_ms: s1.timestamp_ms,
            current_ms: s0.timestamp_ms,
        });
    }

    let (t0, t1, t2) = (
        f64::from(s0.timestamp_ms),
        f64::from(s1.timestamp_ms),
        f64::from(s2.timestamp_ms),
    );

    let v1 = 1000.0 * (s1.position - s2.position) / (t1 - t2);
    let v2 = 1000.0 * (s0.position - s1.position) / (t0 - t1);

    let mid_old = 0.5 * (t1 + t2);
    let mid_new = 0.5 * (t0 + t1);

    Ok(MotionEstimate {
        velocity: RECENT_WEIGHT * v2 + (1.0 - RECENT_WEIGHT) * v1,
        acceleration: 1000.0 * (v2 - v1) / (mid_new - mid_old),
        timestamp_ms: s0.timestamp_ms,
    })
}

/// Estimate motion from a full short history.
pub fn estimate_from_history(history: &ShortHistory) -> GazeResult<MotionEstimate> {
    let [s0, s1, s2] = history.triple().ok_or(GazeError::InsufficientHistory {
        available: history.len(),
        required: HISTORY_LEN,
    })?;
    estimate(&s0, &s1, &s2)
}

/// Motion estimates for every consecutive triple of a recorded log.
///
/// `samples` is oldest-first, as stored in a gaze log. The result has
/// `samples.len() - 2` entries (none for fewer than three samples).
pub fn motion_profile(samples: &[GazeSample]) -> GazeResult<Vec<MotionEstimate>> {
    samples
        .windows(HISTORY_LEN)
        .map(|w| estimate(&w[2], &w[1], &w[0]))
        .collect()
}
