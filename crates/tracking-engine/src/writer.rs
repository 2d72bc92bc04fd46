//! Gaze log persistence: streaming JSONL writer and binary dump files.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use gazetrack_common::error::{GazeError, GazeResult};
use gazetrack_gaze_model::export::{read_binary, write_binary};
use gazetrack_gaze_model::{GazeSample, GazeStreamHeader};

/// Flush to disk every this many samples.
const FLUSH_EVERY: u64 = 1000;

/// Writes gaze samples to a JSONL file, header first.
pub struct SampleWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    samples_written: u64,
}

impl SampleWriter {
    /// Create the file (truncating any existing one) and write the header
    /// as a `#` comment line.
    pub fn new(path: PathBuf, header: &GazeStreamHeader) -> GazeResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| GazeError::format(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            samples_written: 0,
        })
    }

    /// Write a single sample as a JSONL line.
    pub fn write_sample(&mut self, sample: &GazeSample) -> GazeResult<()> {
        let json = serde_json::to_string(sample)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| GazeError::format(format!("Failed to write sample: {e}")))?;
        self.samples_written += 1;

        if self.samples_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }

        Ok(())
    }

    pub fn write_all(&mut self, samples: &[GazeSample]) -> GazeResult<()> {
        samples.iter().try_for_each(|s| self.write_sample(s))
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> GazeResult<()> {
        self.writer
            .flush()
            .map_err(|e| GazeError::format(format!("Failed to flush samples: {e}")))?;
        Ok(())
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for SampleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Write a gaze log snapshot as a binary dump.
pub fn write_binary_file(path: &Path, samples: &[GazeSample]) -> GazeResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_binary(&mut writer, samples)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), samples = samples.len(), "Wrote binary gaze log");
    Ok(())
}

/// Read a binary dump written by [`write_binary_file`].
pub fn read_binary_file(path: &Path) -> GazeResult<Vec<GazeSample>> {
    let mut reader = BufReader::new(File::open(path)?);
    read_binary(&mut reader)
}
