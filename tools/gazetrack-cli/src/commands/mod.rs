pub mod check;
pub mod convert;
pub mod info;
pub mod record;

use std::path::Path;

use gazetrack_common::error::GazeResult;
use gazetrack_engine::writer::read_binary_file;
use gazetrack_gaze_model::export::parse_samples;
use gazetrack_gaze_model::GazeSample;

/// On-disk gaze log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Count-prefixed little-endian records
    Binary,
    /// One JSON sample per line after a `#` header
    Jsonl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Binary => "bin",
            ExportFormat::Jsonl => "jsonl",
        }
    }

    /// Guess the format from a file extension. Anything but `.jsonl` is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") => ExportFormat::Jsonl,
            _ => ExportFormat::Binary,
        }
    }
}

/// Load a gaze log in either format.
pub fn load_samples(path: &Path) -> GazeResult<Vec<GazeSample>> {
    match ExportFormat::from_path(path) {
        ExportFormat::Binary => read_binary_file(path),
        ExportFormat::Jsonl => {
            let content = std::fs::read_to_string(path)?;
            Ok(parse_samples(&content)?)
        }
    }
}
