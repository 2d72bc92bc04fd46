//! Record a gaze session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gazetrack_common::clock::{Clock, SystemClock};
use gazetrack_common::config::AppConfig;
use gazetrack_engine::sources::source_by_name;
use gazetrack_engine::writer::{write_binary_file, SampleWriter};
use gazetrack_engine::{TrackingEngine, TrackingState};
use gazetrack_gaze_model::GazeStreamHeader;

use super::ExportFormat;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub async fn run(
    config: AppConfig,
    source: String,
    duration_ms: u32,
    period_ms: Option<u32>,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let mut engine_config = config.engine.clone();
    engine_config.max_session_ms = duration_ms;
    if let Some(period_ms) = period_ms {
        engine_config.recording_period_ms = period_ms;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gaze_source = source_by_name(&source, clock)?;
    let engine = TrackingEngine::new(gaze_source, engine_config)?;

    println!("Recording gaze session");
    println!("  Source: {}", engine.source_name());
    println!("  Duration: {duration_ms} ms");
    println!(
        "  Period: {} ms",
        engine.config().recording_period_ms
    );
    println!();
    println!("Press Ctrl+C to stop early...");

    engine.start_recording();
    let epoch_wall = engine.session_epoch_wall();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                println!();
                println!("Interrupted");
                break;
            }
            _ = tokio::time::sleep(POLL_INTERVAL) => {
                if engine.state() != TrackingState::Recording {
                    break;
                }
            }
        }
    }

    engine.stop_recording();
    if let Err(e) = engine.check_health() {
        println!("[WARN] {e}; saving the samples recorded before the failure");
    }

    let samples = engine.gaze_log_snapshot();
    let stats = engine.stats();
    let period = engine.config().recording_period_ms;
    let source_name = engine.source_name().to_string();
    engine.shutdown();

    if samples.is_empty() {
        anyhow::bail!("No gaze samples were recorded");
    }

    let path = output.unwrap_or_else(|| {
        let stamp = epoch_wall.replace([':', '.'], "-");
        config
            .export_dir
            .join(format!("gaze-{stamp}.{}", format.extension()))
    });

    match format {
        ExportFormat::Binary => write_binary_file(&path, &samples)?,
        ExportFormat::Jsonl => {
            let header = GazeStreamHeader::new(epoch_wall, period, &source_name);
            let mut writer = SampleWriter::new(path.clone(), &header)?;
            writer.write_all(&samples)?;
            writer.flush()?;
        }
    }

    tracing::info!(
        path = %path.display(),
        samples = samples.len(),
        source_errors = stats.source_errors,
        "Gaze log saved"
    );

    println!();
    println!("Samples: {}", samples.len());
    if let Some(last) = samples.last() {
        println!("Final time: {} ms", last.timestamp_ms);
    }
    println!("Source errors: {}", stats.source_errors);
    println!("Saved to: {}", path.display());

    Ok(())
}
