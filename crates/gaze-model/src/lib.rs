//! gazetrack Gaze Model
//!
//! Defines the data contracts of the sampling engine:
//! - **Point2D:** 2-D vector arithmetic and angles
//! - **Samples:** timestamped gaze positions and stream headers
//! - **History / Log:** the 3-slot motion buffer and the recorded gaze log
//! - **Motion:** three-point velocity and acceleration estimates
//! - **Export:** binary and JSONL serialization of gaze logs
//!
//! Timestamps are whole milliseconds since the start of a tracking session.

pub mod export;
pub mod history;
pub mod log;
pub mod motion;
pub mod point;
pub mod sample;

pub use history::*;
pub use log::*;
pub use motion::*;
pub use point::*;
pub use sample::*;
