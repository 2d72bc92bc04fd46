//! Summarize a recorded gaze log.

use std::path::PathBuf;

use gazetrack_gaze_model::{mean_position, motion_profile};

use super::{load_samples, ExportFormat};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let samples =
        load_samples(&path).map_err(|e| anyhow::anyhow!("Failed to load gaze log: {e}"))?;

    println!("Gaze log: {}", path.display());
    println!("  Format: {:?}", ExportFormat::from_path(&path));
    println!("  Samples: {}", samples.len());

    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Ok(());
    };

    let span_ms = last.timestamp_ms.saturating_sub(first.timestamp_ms);
    println!(
        "  Time range: {} ms .. {} ms ({:.3}s)",
        first.timestamp_ms,
        last.timestamp_ms,
        last.timestamp_secs() - first.timestamp_secs()
    );
    if samples.len() > 1 {
        let mean_interval = f64::from(span_ms) / (samples.len() - 1) as f64;
        let max_gap = samples
            .windows(2)
            .map(|w| w[1].timestamp_ms.saturating_sub(w[0].timestamp_ms))
            .max()
            .unwrap_or(0);
        println!("  Mean interval: {mean_interval:.3} ms (max gap {max_gap} ms)");
    }
    println!();

    println!("Position:");
    if let Some(mean) = mean_position(&samples) {
        println!("  Mean: {mean}");
    }
    let (min_x, max_x, min_y, max_y) = samples.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), s| {
            (
                min_x.min(s.position.x),
                max_x.max(s.position.x),
                min_y.min(s.position.y),
                max_y.max(s.position.y),
            )
        },
    );
    println!("  Extent: x [{min_x:.2}, {max_x:.2}], y [{min_y:.2}, {max_y:.2}]");
    println!();

    println!("Motion:");
    match motion_profile(&samples) {
        Ok(profile) if !profile.is_empty() => {
            let speeds: Vec<f64> = profile
                .iter()
                .map(|m| m.velocity_reading().speed())
                .collect();
            let mean_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;
            let peak = profile
                .iter()
                .max_by(|a, b| {
                    a.velocity
                        .magnitude()
                        .total_cmp(&b.velocity.magnitude())
                })
                .map(|m| m.velocity_reading());
            println!("  Mean speed: {mean_speed:.1} units/s");
            if let Some(peak) = peak {
                println!(
                    "  Peak speed: {:.1} units/s at {} ms (heading {:.0}°)",
                    peak.speed(),
                    peak.timestamp_ms,
                    peak.direction_deg()
                );
            }
        }
        Ok(_) => println!("  Not enough samples for motion estimates"),
        Err(e) => println!("  [WARN] {e}"),
    }

    Ok(())
}
