//! Show configuration and probe deadline scheduling.

use std::sync::Arc;
use std::time::Duration;

use gazetrack_common::clock::{Clock, SystemClock};
use gazetrack_common::config::{config_file_path, AppConfig};
use gazetrack_engine::scheduler::scheduler_for;

/// Wake-ups later than this make 1 kHz sampling unreliable.
const JITTER_WARN: Duration = Duration::from_micros(500);

pub fn run(config: AppConfig, probe_ticks: u32, write_config: bool) -> anyhow::Result<()> {
    println!("Gazetrack System Check");
    println!("{}", "=".repeat(50));

    let path = config_file_path();
    if write_config {
        config.save()?;
        println!("[OK] Config written: {}", path.display());
    } else if path.exists() {
        println!("[OK] Config file: {}", path.display());
    } else {
        println!("[OK] Config file: {} (not present, using defaults)", path.display());
    }

    let engine = &config.engine;
    match engine.validate() {
        Ok(()) => println!("[OK] Engine settings are valid"),
        Err(e) => println!("[FAIL] Engine settings: {e}"),
    }
    println!("     Tracking period: {} ms", engine.tracking_period_ms);
    println!("     Recording period: {} ms", engine.recording_period_ms);
    println!("     Max session: {} ms", engine.max_session_ms);
    println!("     Scheduler: {:?}", engine.scheduler);
    println!("     Export dir: {}", config.export_dir.display());
    println!();

    if probe_ticks == 0 {
        return Ok(());
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut scheduler = scheduler_for(engine.scheduler, clock.clone());
    let start = clock.now();
    let mut total = Duration::ZERO;
    let mut worst = Duration::ZERO;
    for tick in 1..=probe_ticks {
        let deadline = start + Duration::from_millis(u64::from(tick));
        scheduler.wait_until(deadline);
        let late = clock.now().saturating_duration_since(deadline);
        total += late;
        worst = worst.max(late);
    }
    let mean = total / probe_ticks;

    let status = if worst <= JITTER_WARN { "OK" } else { "WARN" };
    println!(
        "[{status}] {} scheduler over {probe_ticks} ticks: mean lateness {} µs, worst {} µs",
        scheduler.name(),
        mean.as_micros(),
        worst.as_micros()
    );
    if worst > JITTER_WARN {
        println!("     Wake-ups are late; timestamps may skip milliseconds under load.");
    }

    Ok(())
}
