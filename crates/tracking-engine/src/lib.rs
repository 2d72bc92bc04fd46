//! gazetrack Tracking Engine
//!
//! Samples a gaze source on a dedicated thread at a fixed temporal
//! resolution and serves position, velocity, acceleration and blink
//! queries to other threads. Gaze sources plug in through the
//! [`GazeSource`] trait:
//!
//! - **Simulated:** clock-driven pursuit target with periodic blinks
//! - **Scripted:** replays a fixed sequence, including read failures
//! - **Hardware:** vendor SDK wrappers implemented outside this crate
//!
//! Recorded logs can be written as binary dumps or JSONL streams.

pub mod engine;
pub mod scheduler;
pub mod sources;
pub mod writer;

use gazetrack_common::error::GazeResult;
use gazetrack_gaze_model::Point2D;

pub use engine::{EngineStats, TrackingEngine, TrackingState};
pub use scheduler::DeadlineScheduler;

/// A provider of raw gaze samples.
///
/// Both reads may block until the hardware delivers a sample. The engine
/// calls them only from its sampling thread.
pub trait GazeSource: Send {
    /// Most recent gaze position.
    fn gaze_position(&mut self) -> GazeResult<Point2D>;

    /// Whether the most recent sample shows a closed eye.
    fn blink_signal(&mut self) -> GazeResult<bool>;

    /// Source name for logging.
    fn name(&self) -> &str;
}
