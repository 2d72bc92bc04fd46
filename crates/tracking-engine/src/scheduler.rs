//! Deadline schedulers for the sampling loop.
//!
//! OS sleep primitives overshoot by hundreds of microseconds or more, which
//! is too coarse for 1 kHz sampling. The default scheduler therefore spins
//! on the clock until the deadline. The hybrid scheduler sleeps through most
//! of the interval and spins only for the last stretch. The simulated
//! scheduler jumps a [`ManualClock`] straight to the deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gazetrack_common::clock::{Clock, ManualClock};
use gazetrack_common::config::SchedulerKind;

/// Blocks the sampling thread until a deadline has passed.
pub trait DeadlineScheduler: Send {
    /// Return once `clock.now() >= deadline`.
    fn wait_until(&mut self, deadline: Instant);

    /// Scheduler name for logging.
    fn name(&self) -> &str;
}

/// Polls the clock in a tight loop. Never yields the processor.
pub struct BusySpinScheduler {
    clock: Arc<dyn Clock>,
}

impl BusySpinScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl DeadlineScheduler for BusySpinScheduler {
    fn wait_until(&mut self, deadline: Instant) {
        while self.clock.now() < deadline {
            std::hint::spin_loop();
        }
    }

    fn name(&self) -> &str {
        "busy-spin"
    }
}

/// Sleeps until `spin_window` before the deadline, then spins.
pub struct HybridScheduler {
    clock: Arc<dyn Clock>,
    spin_window: Duration,
}

impl HybridScheduler {
    pub fn new(clock: Arc<dyn Clock>, spin_window: Duration) -> Self {
        Self { clock, spin_window }
    }
}

impl DeadlineScheduler for HybridScheduler {
    fn wait_until(&mut self, deadline: Instant) {
        let now = self.clock.now();
        if let Some(sleep_for) = deadline
            .checked_duration_since(now)
            .and_then(|remaining| remaining.checked_sub(self.spin_window))
        {
            if !sleep_for.is_zero() {
                std::thread::sleep(sleep_for);
            }
        }
        while self.clock.now() < deadline {
            std::hint::spin_loop();
        }
    }

    fn name(&self) -> &str {
        "hybrid"
    }
}

/// Advances a manual clock to each deadline instead of waiting.
pub struct SimulatedScheduler {
    clock: Arc<ManualClock>,
}

impl SimulatedScheduler {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self { clock }
    }
}

impl DeadlineScheduler for SimulatedScheduler {
    fn wait_until(&mut self, deadline: Instant) {
        self.clock.advance_to(deadline);
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Build the scheduler selected in the engine configuration.
pub fn scheduler_for(kind: SchedulerKind, clock: Arc<dyn Clock>) -> Box<dyn DeadlineScheduler> {
    match kind {
        SchedulerKind::BusySpin => Box::new(BusySpinScheduler::new(clock)),
        SchedulerKind::Hybrid { spin_window_us } => Box::new(HybridScheduler::new(
            clock,
            Duration::from_micros(spin_window_us),
        )),
    }
}
