//! The tracking engine: session state machine, sampling thread, and the
//! query/control API used by client threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use gazetrack_common::clock::{Clock, SessionClock, SystemClock};
use gazetrack_common::config::EngineConfig;
use gazetrack_common::error::{GazeError, GazeResult};
use gazetrack_gaze_model::{
    estimate_from_history, mean_position, GazeLog, GazeSample, MotionEstimate, Point2D,
    ShortHistory, VelocityReading, HISTORY_LEN,
};

use crate::scheduler::{scheduler_for, DeadlineScheduler};
use crate::GazeSource;

/// What the sampling loop does on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No sampling.
    Stopped,
    /// Sampling into the short history only.
    Tracking,
    /// Sampling into the short history and the gaze log.
    Recording,
}

/// Counters maintained by the sampling loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Ticks that reached the gaze source and were applied.
    pub ticks: u64,
    /// Samples appended to the gaze log.
    pub samples_recorded: u64,
    /// Failed source reads, transient or fatal.
    pub source_errors: u64,
    /// Reads dropped because the session changed while they were in flight.
    pub discarded_samples: u64,
}

struct EngineState {
    tracking: TrackingState,
    session: SessionClock,
    /// Bumped on every session start so in-flight reads of an older
    /// session can be recognised and dropped.
    generation: u64,
    elapsed_ms: u32,
    period_ms: u32,
    history: ShortHistory,
    log: GazeLog,
    current: Option<GazeSample>,
    motion: Option<MotionEstimate>,
    blink_latched: bool,
    fault: Option<String>,
    consecutive_errors: u32,
    stats: EngineStats,
}

struct Shared {
    state: Mutex<EngineState>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Real-time gaze sampler.
///
/// Owns one background thread that reads the injected [`GazeSource`] once
/// per sampling period. All methods are safe to call from any thread while
/// the loop runs. Dropping the engine stops and joins the thread.
pub struct TrackingEngine {
    shared: Arc<Shared>,
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    source_name: String,
}

impl TrackingEngine {
    /// Create an engine on the system clock with the configured scheduler.
    pub fn new(source: Box<dyn GazeSource>, config: EngineConfig) -> GazeResult<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let scheduler = scheduler_for(config.scheduler, clock.clone());
        Self::with_timing(source, config, clock, scheduler)
    }

    /// Create an engine with an explicit clock and deadline scheduler.
    pub fn with_timing(
        source: Box<dyn GazeSource>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        scheduler: Box<dyn DeadlineScheduler>,
    ) -> GazeResult<Self> {
        config.validate()?;

        let source_name = source.name().to_string();
        let state = EngineState {
            tracking: TrackingState::Stopped,
            session: SessionClock::start(clock.as_ref()),
            generation: 0,
            elapsed_ms: 0,
            period_ms: config.tracking_period_ms,
            history: ShortHistory::new(),
            log: GazeLog::new(),
            current: None,
            motion: None,
            blink_latched: false,
            fault: None,
            consecutive_errors: 0,
            stats: EngineStats::default(),
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            config,
            clock,
        });
        let alive = Arc::new(AtomicBool::new(true));

        let sampler = Sampler {
            idle_poll: Duration::from_micros(shared.config.idle_poll_us),
            shared: shared.clone(),
            alive: alive.clone(),
            source,
            scheduler,
        };
        let handle = std::thread::Builder::new()
            .name("gaze-sampler".to_string())
            .spawn(move || sampler.run())?;

        Ok(Self {
            shared,
            alive,
            handle: Some(handle),
            source_name,
        })
    }

    /// Start a tracking session. Does nothing unless stopped.
    pub fn start_tracking(&self) {
        let mut state = self.shared.lock();
        if state.tracking != TrackingState::Stopped {
            return;
        }
        self.enter_tracking(&mut state);
        drop(state);
        tracing::info!(source = %self.source_name, "Tracking started");
    }

    /// Stop sampling. Recorded data is kept.
    pub fn stop_tracking(&self) {
        let previous = {
            let mut state = self.shared.lock();
            std::mem::replace(&mut state.tracking, TrackingState::Stopped)
        };
        if previous != TrackingState::Stopped {
            tracing::info!(?previous, "Tracking stopped");
        }
    }

    /// Start a fresh recording session from any state.
    ///
    /// Clears the gaze log and blink latch, switches to the recording
    /// sampling period and restarts the session clock.
    pub fn start_recording(&self) {
        let mut state = self.shared.lock();
        if state.tracking == TrackingState::Stopped {
            self.enter_tracking(&mut state);
        }
        state.period_ms = self.shared.config.recording_period_ms;
        state.tracking = TrackingState::Recording;
        state.blink_latched = false;
        state.log.reset(self.shared.config.log_capacity_hint);
        self.begin_session(&mut state);
        let period_ms = state.period_ms;
        drop(state);
        tracing::info!(period_ms, "Recording started");
    }

    /// Return to plain tracking. The gaze log is kept.
    pub fn stop_recording(&self) {
        let (was_recording, samples) = {
            let mut state = self.shared.lock();
            let was_recording = state.tracking == TrackingState::Recording;
            if was_recording {
                state.tracking = TrackingState::Tracking;
            }
            state.blink_latched = false;
            (was_recording, state.log.len())
        };
        if was_recording {
            tracing::info!(samples, "Recording stopped");
        }
    }

    /// Change the sampling period. Takes effect from the next deadline.
    pub fn set_sampling_period(&self, period_ms: u32) -> GazeResult<()> {
        if period_ms == 0 {
            return Err(GazeError::InvalidSamplingPeriod { ms: period_ms });
        }
        self.shared.lock().period_ms = period_ms;
        tracing::debug!(period_ms, "Sampling period changed");
        Ok(())
    }

    /// Clear the blink latch.
    pub fn reset_blink_latch(&self) {
        self.shared.lock().blink_latched = false;
    }

    /// Stop the sampling thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop_thread();
    }

    /// Most recent sample of the current session.
    pub fn current_position(&self) -> GazeResult<GazeSample> {
        self.live()?.current.ok_or(GazeError::NoSamples)
    }

    /// Milliseconds since the session started, as of the last tick.
    pub fn current_time_ms(&self) -> GazeResult<u32> {
        Ok(self.live()?.elapsed_ms)
    }

    /// Mean logged position over the last `window_ms` milliseconds.
    pub fn windowed_position(&self, window_ms: u32) -> GazeResult<Point2D> {
        let window = {
            let state = self.live()?;
            state
                .log
                .trailing_window(state.elapsed_ms, window_ms)
                .to_vec()
        };
        mean_position(&window).ok_or(GazeError::EmptyWindow { window_ms })
    }

    /// Smoothed velocity (units/s) and the time of the newest sample used.
    pub fn current_velocity(&self) -> GazeResult<VelocityReading> {
        Ok(self.current_motion()?.velocity_reading())
    }

    /// Acceleration (units/s²).
    pub fn current_acceleration(&self) -> GazeResult<Point2D> {
        Ok(self.current_motion()?.acceleration)
    }

    /// Whether a blink was seen since the latch was last cleared.
    pub fn is_blinking(&self) -> GazeResult<bool> {
        Ok(self.live()?.blink_latched)
    }

    /// Copy of the gaze log. Available even after a connection loss.
    pub fn gaze_log_snapshot(&self) -> Vec<GazeSample> {
        self.shared.lock().log.samples().to_vec()
    }

    /// Timestamp of the last logged sample.
    pub fn final_time_ms(&self) -> GazeResult<u32> {
        self.shared.lock().log.final_time_ms()
    }

    pub fn state(&self) -> TrackingState {
        self.shared.lock().tracking
    }

    pub fn sampling_period_ms(&self) -> u32 {
        self.shared.lock().period_ms
    }

    /// Wall-clock time at which the current session started.
    pub fn session_epoch_wall(&self) -> String {
        self.shared.lock().session.epoch_wall().to_string()
    }

    pub fn stats(&self) -> EngineStats {
        self.shared.lock().stats
    }

    /// `Err(ConnectionLost)` if the source dropped during this session.
    pub fn check_health(&self) -> GazeResult<()> {
        self.live().map(drop)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    fn live(&self) -> GazeResult<MutexGuard<'_, EngineState>> {
        let state = self.shared.lock();
        if let Some(reason) = &state.fault {
            return Err(GazeError::connection_lost(reason.clone()));
        }
        Ok(state)
    }

    fn current_motion(&self) -> GazeResult<MotionEstimate> {
        let state = self.live()?;
        state.motion.ok_or(GazeError::InsufficientHistory {
            available: state.history.len(),
            required: HISTORY_LEN,
        })
    }

    fn enter_tracking(&self, state: &mut EngineState) {
        state.log.clear();
        state.blink_latched = false;
        state.tracking = TrackingState::Tracking;
        self.begin_session(state);
    }

    fn begin_session(&self, state: &mut EngineState) {
        state.session = SessionClock::start(self.shared.clock.as_ref());
        state.generation = state.generation.wrapping_add(1);
        state.elapsed_ms = 0;
        state.history.clear();
        state.current = None;
        state.motion = None;
        state.fault = None;
        state.consecutive_errors = 0;
    }

    fn stop_thread(&mut self) {
        self.alive.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Gaze sampler thread panicked");
            }
        }
    }
}

impl Drop for TrackingEngine {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

enum TickOutcome {
    Sampled { auto_stopped_after: Option<usize> },
    SourceError { error: GazeError, consecutive: u32 },
    ConnectionLost(GazeError),
    Rejected(GazeError),
    Discarded,
}

/// The background half of the engine. Sole user of the gaze source.
struct Sampler {
    shared: Arc<Shared>,
    alive: Arc<AtomicBool>,
    source: Box<dyn GazeSource>,
    scheduler: Box<dyn DeadlineScheduler>,
    idle_poll: Duration,
}

impl Sampler {
    fn run(mut self) {
        tracing::info!(
            source = %self.source.name(),
            scheduler = %self.scheduler.name(),
            "Gaze sampler started"
        );

        while self.alive.load(Ordering::Acquire) {
            let (mode, generation) = {
                let state = self.shared.lock();
                (state.tracking, state.generation)
            };

            if mode == TrackingState::Stopped {
                std::thread::sleep(self.idle_poll);
                continue;
            }

            let (outcome, deadline) = self.tick(mode, generation);
            self.report(outcome);

            if let Some(deadline) = deadline {
                self.scheduler.wait_until(deadline);
            }
        }

        let stats = self.shared.lock().stats;
        tracing::info!(
            ticks = stats.ticks,
            recorded = stats.samples_recorded,
            errors = stats.source_errors,
            "Gaze sampler stopped"
        );
    }

    /// One sampling step. The source is read before the lock is taken.
    fn tick(&mut self, mode: TrackingState, generation: u64) -> (TickOutcome, Option<Instant>) {
        let position = self.source.gaze_position();
        let blink = match (&position, mode) {
            (Ok(_), TrackingState::Recording) => Some(self.source.blink_signal()),
            _ => None,
        };

        let mut state = self.shared.lock();
        if state.generation != generation || state.tracking == TrackingState::Stopped {
            state.stats.discarded_samples += 1;
            return (TickOutcome::Discarded, None);
        }

        let elapsed_ms = state.session.elapsed_ms_at(self.shared.clock.now());
        state.elapsed_ms = elapsed_ms;
        state.stats.ticks += 1;
        let deadline = state.session.deadline(elapsed_ms, state.period_ms);

        let position = match position {
            Ok(position) => position,
            Err(error) => return record_failure(&mut state, error, deadline),
        };

        let (blink, blink_error) = match blink {
            Some(Ok(signal)) => (signal, None),
            Some(Err(error)) if error.is_connection_loss() => {
                return record_failure(&mut state, error, deadline);
            }
            Some(Err(error)) => (false, Some(error)),
            None => (false, None),
        };

        let sample = GazeSample::new(position, elapsed_ms);
        let mut auto_stopped_after = None;

        if mode == TrackingState::Recording && state.tracking == TrackingState::Recording {
            if let Err(error) = state.log.push(sample) {
                state.stats.discarded_samples += 1;
                return (TickOutcome::Rejected(error), Some(deadline));
            }
            state.stats.samples_recorded += 1;
            if blink {
                state.blink_latched = true;
            }
            if elapsed_ms > self.shared.config.max_session_ms {
                state.tracking = TrackingState::Tracking;
                state.blink_latched = false;
                auto_stopped_after = Some(state.log.len());
            }
        }

        state.current = Some(sample);
        state.history.push(sample);
        // Keep the previous estimate if the new triple is unusable.
        if let Ok(motion) = estimate_from_history(&state.history) {
            state.motion = Some(motion);
        }

        if let Some(error) = blink_error {
            return record_failure(&mut state, error, deadline);
        }
        state.consecutive_errors = 0;

        (TickOutcome::Sampled { auto_stopped_after }, Some(deadline))
    }

    fn report(&self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Sampled {
                auto_stopped_after: Some(samples),
            } => {
                tracing::info!(
                    samples,
                    max_session_ms = self.shared.config.max_session_ms,
                    "Recording hit the session limit; switched to tracking"
                );
            }
            TickOutcome::SourceError { error, consecutive } => {
                if consecutive == 1 {
                    tracing::warn!(error = %error, "Gaze source read failed; retrying next tick");
                } else {
                    tracing::debug!(error = %error, consecutive, "Gaze source read failed");
                }
            }
            TickOutcome::ConnectionLost(error) => {
                tracing::error!(error = %error, "Gaze source lost; sampling halted");
            }
            TickOutcome::Rejected(error) => {
                tracing::warn!(error = %error, "Dropped out-of-order gaze sample");
            }
            TickOutcome::Sampled { .. } | TickOutcome::Discarded => {}
        }
    }
}

fn record_failure(
    state: &mut EngineState,
    error: GazeError,
    deadline: Instant,
) -> (TickOutcome, Option<Instant>) {
    state.stats.source_errors += 1;
    if let GazeError::ConnectionLost { message } = &error {
        state.fault = Some(message.clone());
        state.tracking = TrackingState::Stopped;
        return (TickOutcome::ConnectionLost(error), None);
    }
    state.consecutive_errors += 1;
    (
        TickOutcome::SourceError {
            error,
            consecutive: state.consecutive_errors,
        },
        Some(deadline),
    )
}
