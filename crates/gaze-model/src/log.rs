//! Append-only gaze log recorded during a session.

use gazetrack_common::error::{GazeError, GazeResult};

use crate::point::Point2D;
use crate::sample::{GazeSample, TimestampMs};

/// Ordered gaze samples with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GazeLog {
    samples: Vec<GazeSample>,
}

impl GazeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Build a log from existing samples, checking their order.
    pub fn from_samples(samples: Vec<GazeSample>) -> GazeResult<Self> {
        for pair in samples.windows(2) {
            if pair[1].timestamp_ms <= pair[0].timestamp_ms {
                return Err(GazeError::NonMonotonicTimestamp {
                    previous_ms: pair[0].timestamp_ms,
                    current_ms: pair[1].timestamp_ms,
                });
            }
        }
        Ok(Self { samples })
    }

    /// Append a sample. Its timestamp must be later than the last one.
    pub fn push(&mut self, sample: GazeSample) -> GazeResult<()> {
        if let Some(last) = self.samples.last() {
            if sample.timestamp_ms <= last.timestamp_ms {
                return Err(GazeError::NonMonotonicTimestamp {
                    previous_ms: last.timestamp_ms,
                    current_ms: sample.timestamp_ms,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Drop all samples and make room for `capacity` new ones.
    pub fn reset(&mut self, capacity: usize) {
        self.samples.clear();
        self.samples.reserve(capacity);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    pub fn samples(&self) -> &[GazeSample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&GazeSample> {
        self.samples.last()
    }

    /// Timestamp of the last logged sample.
    pub fn final_time_ms(&self) -> GazeResult<TimestampMs> {
        self.samples
            .last()
            .map(|s| s.timestamp_ms)
            .ok_or(GazeError::NoSamples)
    }

    /// Samples with `start_ms <= t <= end_ms`.
    pub fn window(&self, start_ms: TimestampMs, end_ms: TimestampMs) -> &[GazeSample] {
        let lo = self.samples.partition_point(|s| s.timestamp_ms < start_ms);
        let hi = self.samples.partition_point(|s| s.timestamp_ms <= end_ms);
        if lo >= hi {
            return &[];
        }
        &self.samples[lo..hi]
    }

    /// Samples from the `window_ms` milliseconds ending at `current_ms`.
    pub fn trailing_window(&self, current_ms: TimestampMs, window_ms: u32) -> &[GazeSample] {
        self.window(current_ms.saturating_sub(window_ms), current_ms)
    }
}

/// Arithmetic mean position of `samples`, `None` when empty.
pub fn mean_position(samples: &[GazeSample]) -> Option<Point2D> {
    if samples.is_empty() {
        return None;
    }
    let sum: Point2D = samples.iter().map(|s| s.position).sum();
    Some(sum / samples.len() as f64)
}
