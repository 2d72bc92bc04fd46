//! Convert gaze logs between the binary and JSONL formats.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use gazetrack_engine::writer::{write_binary_file, SampleWriter};
use gazetrack_gaze_model::GazeStreamHeader;

use super::{load_samples, ExportFormat};

pub fn run(input: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let from = ExportFormat::from_path(&input);
    let to = match from {
        ExportFormat::Binary => ExportFormat::Jsonl,
        ExportFormat::Jsonl => ExportFormat::Binary,
    };
    let output = output.unwrap_or_else(|| input.with_extension(to.extension()));

    let samples =
        load_samples(&input).map_err(|e| anyhow::anyhow!("Failed to load gaze log: {e}"))?;

    match to {
        ExportFormat::Binary => write_binary_file(&output, &samples)?,
        ExportFormat::Jsonl => {
            // Binary dumps carry no header; rebuild one from the file itself.
            let modified: DateTime<Utc> = std::fs::metadata(&input)?.modified()?.into();
            let period = samples
                .windows(2)
                .map(|w| w[1].timestamp_ms.saturating_sub(w[0].timestamp_ms))
                .filter(|gap| *gap > 0)
                .min()
                .unwrap_or(1);
            let header = GazeStreamHeader::new(modified.to_rfc3339(), period, "converted");

            let mut writer = SampleWriter::new(output.clone(), &header)?;
            writer.write_all(&samples)?;
            writer.flush()?;
        }
    }

    println!(
        "Converted {} samples: {} -> {}",
        samples.len(),
        input.display(),
        output.display()
    );
    Ok(())
}
