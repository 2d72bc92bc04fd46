//! Timestamped gaze samples and stream metadata.

use gazetrack_common::clock::ms_to_secs;
use serde::{Deserialize, Serialize};

use crate::point::Point2D;

/// Milliseconds since the start of the current tracking session.
pub type TimestampMs = u32;

/// A single gaze position with its session timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GazeSample {
    #[serde(flatten)]
    pub position: Point2D,

    /// Milliseconds since session start.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,
}

impl GazeSample {
    pub fn new(position: Point2D, timestamp_ms: TimestampMs) -> Self {
        Self {
            position,
            timestamp_ms,
        }
    }

    /// Shorthand for `GazeSample::new(Point2D::new(x, y), t)`.
    pub fn at(x: f64, y: f64, timestamp_ms: TimestampMs) -> Self {
        Self::new(Point2D::new(x, y), timestamp_ms)
    }

    /// Timestamp as fractional seconds since session start.
    pub fn timestamp_secs(&self) -> f64 {
        ms_to_secs(self.timestamp_ms)
    }
}

/// Smoothed gaze velocity (units per second) and the time it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityReading {
    pub velocity: Point2D,
    pub timestamp_ms: TimestampMs,
}

impl VelocityReading {
    /// Scalar speed (units per second).
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Direction of motion in degrees from the +y axis.
    pub fn direction_deg(&self) -> f64 {
        self.velocity.angle_deg()
    }
}

/// Metadata written at the top of a JSONL gaze stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazeStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at session start (ISO 8601).
    pub epoch_wall: String,

    /// Nominal sampling period (ms).
    pub sampling_period_ms: u32,

    /// Name of the gaze source that produced the stream.
    #[serde(default)]
    pub source: String,
}

impl GazeStreamHeader {
    pub const SCHEMA_VERSION: &'static str = "1.0";

    pub fn new(epoch_wall: impl Into<String>, sampling_period_ms: u32, source: &str) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            epoch_wall: epoch_wall.into(),
            sampling_period_ms,
            source: source.to_string(),
        }
    }
}
