//! Gaze source implementations.
//!
//! Hardware trackers are wrapped outside this crate; the sources here cover
//! simulation and tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gazetrack_common::clock::Clock;
use gazetrack_common::error::{GazeError, GazeResult};
use gazetrack_gaze_model::Point2D;

use crate::GazeSource;

/// One scripted source reading.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// A position with the blink signal seen alongside it.
    Sample { position: Point2D, blink: bool },
    /// A transient read failure; the next step follows on the next read.
    Glitch(String),
    /// The connection drops; every later read fails.
    Disconnect(String),
}

impl ScriptStep {
    pub fn at(x: f64, y: f64) -> Self {
        Self::Sample {
            position: Point2D::new(x, y),
            blink: false,
        }
    }

    pub fn blink_at(x: f64, y: f64) -> Self {
        Self::Sample {
            position: Point2D::new(x, y),
            blink: true,
        }
    }
}

/// Replays pre-loaded steps, one per position read.
///
/// Once the script runs out, the last sample repeats forever.
pub struct ScriptedSource {
    steps: VecDeque<ScriptStep>,
    current: Point2D,
    blink: bool,
    disconnected: Option<String>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            current: Point2D::ZERO,
            blink: false,
            disconnected: None,
        }
    }

    /// A source that reports the same position forever.
    pub fn fixed(position: Point2D) -> Self {
        Self::new([ScriptStep::Sample {
            position,
            blink: false,
        }])
    }

    /// Number of steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl GazeSource for ScriptedSource {
    fn gaze_position(&mut self) -> GazeResult<Point2D> {
        if let Some(reason) = &self.disconnected {
            return Err(GazeError::connection_lost(reason.clone()));
        }
        match self.steps.pop_front() {
            Some(ScriptStep::Sample { position, blink }) => {
                self.current = position;
                self.blink = blink;
            }
            Some(ScriptStep::Glitch(reason)) => return Err(GazeError::source(reason)),
            Some(ScriptStep::Disconnect(reason)) => {
                self.disconnected = Some(reason.clone());
                return Err(GazeError::connection_lost(reason));
            }
            None => {}
        }
        Ok(self.current)
    }

    fn blink_signal(&mut self) -> GazeResult<bool> {
        if let Some(reason) = &self.disconnected {
            return Err(GazeError::connection_lost(reason.clone()));
        }
        Ok(self.blink)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Clock-driven synthetic gaze: smooth circular pursuit with periodic
/// blinks. Stands in for a tracker running in simulation mode.
pub struct SimulatedSource {
    clock: Arc<dyn Clock>,
    epoch: Instant,
    center: Point2D,
    radius: f64,
    orbit: Duration,
    blink_interval: Duration,
    blink_duration: Duration,
}

impl SimulatedSource {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            center: Point2D::new(960.0, 540.0),
            radius: 200.0,
            orbit: Duration::from_secs(2),
            blink_interval: Duration::from_secs(4),
            blink_duration: Duration::from_millis(150),
        }
    }

    pub fn with_center(mut self, center: Point2D) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Orbit period of the pursuit target.
    pub fn with_orbit(mut self, orbit: Duration) -> Self {
        self.orbit = orbit;
        self
    }

    /// Close the eye for `duration` at the end of every `interval`.
    pub fn with_blinks(mut self, interval: Duration, duration: Duration) -> Self {
        self.blink_interval = interval;
        self.blink_duration = duration;
        self
    }

    fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.epoch)
    }

    /// Simulated position `elapsed` after the source was created.
    pub fn position_at(&self, elapsed: Duration) -> Point2D {
        let orbit = self.orbit.as_secs_f64();
        let phase = if orbit > 0.0 {
            elapsed.as_secs_f64() / orbit
        } else {
            0.0
        };
        self.center + Point2D::new(0.0, self.radius).rotate_rad(std::f64::consts::TAU * phase)
    }

    /// Whether the simulated eye is closed `elapsed` after creation.
    pub fn blinking_at(&self, elapsed: Duration) -> bool {
        let interval = self.blink_interval.as_micros();
        if interval == 0 || self.blink_duration.is_zero() {
            return false;
        }
        let into_cycle = elapsed.as_micros() % interval;
        into_cycle >= interval.saturating_sub(self.blink_duration.as_micros())
    }
}

impl GazeSource for SimulatedSource {
    fn gaze_position(&mut self) -> GazeResult<Point2D> {
        Ok(self.position_at(self.elapsed()))
    }

    fn blink_signal(&mut self) -> GazeResult<bool> {
        Ok(self.blinking_at(self.elapsed()))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Names accepted by [`source_by_name`].
pub const SOURCE_NAMES: &[&str] = &["simulated", "static"];

/// Construct a built-in source by name.
pub fn source_by_name(name: &str, clock: Arc<dyn Clock>) -> GazeResult<Box<dyn GazeSource>> {
    match name {
        "simulated" => {
            tracing::info!("Using simulated gaze source");
            Ok(Box::new(SimulatedSource::new(clock)))
        }
        "static" => {
            tracing::info!("Using static gaze source");
            Ok(Box::new(ScriptedSource::fixed(Point2D::new(960.0, 540.0))))
        }
        other => Err(GazeError::config(format!(
            "unknown gaze source '{other}' (expected one of: {})",
            SOURCE_NAMES.join(", ")
        ))),
    }
}
