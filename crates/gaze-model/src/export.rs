//! Gaze log serialization.
//!
//! Two formats are supported:
//!
//! - **Binary**: a little-endian `i32` sample count followed by one
//!   24-byte record per sample: `f64 x`, `f64 y`, `u32 time_ms` and four
//!   zero padding bytes, matching a `#[repr(C)]` dump of the sample
//!   struct as read by existing analysis scripts.
//! - **JSONL**: an optional `# {header}` comment line followed by one
//!   `{"x":..,"y":..,"t":..}` object per line.

use std::io::{Read, Write};

use gazetrack_common::error::{GazeError, GazeResult};

use crate::point::Point2D;
use crate::sample::GazeSample;

/// Size of one binary record in bytes (including padding).
pub const RECORD_SIZE: usize = 24;

const COUNT_SIZE: usize = 4;

/// Encode samples into the binary export format.
pub fn encode_binary(samples: &[GazeSample]) -> GazeResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(COUNT_SIZE + samples.len() * RECORD_SIZE);
    write_binary(&mut buf, samples)?;
    Ok(buf)
}

/// Write samples in the binary export format.
pub fn write_binary<W: Write>(writer: &mut W, samples: &[GazeSample]) -> GazeResult<()> {
    let count = i32::try_from(samples.len()).map_err(|_| {
        GazeError::format(format!(
            "{} samples exceed the binary format's i32 count",
            samples.len()
        ))
    })?;
    writer.write_all(&count.to_le_bytes())?;

    let mut record = [0u8; RECORD_SIZE];
    for sample in samples {
        record[0..8].copy_from_slice(&sample.position.x.to_le_bytes());
        record[8..16].copy_from_slice(&sample.position.y.to_le_bytes());
        record[16..20].copy_from_slice(&sample.timestamp_ms.to_le_bytes());
        writer.write_all(&record)?;
    }
    Ok(())
}

/// Decode a binary export held in memory.
pub fn decode_binary(bytes: &[u8]) -> GazeResult<Vec<GazeSample>> {
    let header: [u8; COUNT_SIZE] = bytes
        .get(..COUNT_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| GazeError::format("missing sample count"))?;
    let count = checked_count(i32::from_le_bytes(header))?;

    let body = &bytes[COUNT_SIZE..];
    let expected = count * RECORD_SIZE;
    if body.len() < expected {
        return Err(GazeError::format(format!(
            "expected {count} records ({expected} bytes), found {} bytes",
            body.len()
        )));
    }
    if body.len() > expected {
        tracing::warn!(
            extra_bytes = body.len() - expected,
            "Ignoring trailing bytes after gaze records"
        );
    }

    Ok(body[..expected]
        .chunks_exact(RECORD_SIZE)
        .map(decode_record)
        .collect())
}

/// Read a binary export from a stream.
pub fn read_binary<R: Read>(reader: &mut R) -> GazeResult<Vec<GazeSample>> {
    let mut header = [0u8; COUNT_SIZE];
    reader
        .read_exact(&mut header)
        .map_err(|e| GazeError::format(format!("missing sample count: {e}")))?;
    let count = checked_count(i32::from_le_bytes(header))?;

    let mut samples = Vec::with_capacity(count);
    let mut record = [0u8; RECORD_SIZE];
    for index in 0..count {
        reader.read_exact(&mut record).map_err(|e| {
            GazeError::format(format!("truncated record {index} of {count}: {e}"))
        })?;
        samples.push(decode_record(&record));
    }
    Ok(samples)
}

fn checked_count(count: i32) -> GazeResult<usize> {
    usize::try_from(count).map_err(|_| GazeError::format(format!("negative sample count {count}")))
}

fn decode_record(record: &[u8]) -> GazeSample {
    let mut f = [0u8; 8];
    f.copy_from_slice(&record[0..8]);
    let x = f64::from_le_bytes(f);
    f.copy_from_slice(&record[8..16]);
    let y = f64::from_le_bytes(f);
    let mut t = [0u8; 4];
    t.copy_from_slice(&record[16..20]);
    GazeSample::new(Point2D::new(x, y), u32::from_le_bytes(t))
}

/// Serialize samples to JSONL (no header line).
pub fn serialize_samples(samples: &[GazeSample]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for sample in samples {
        output.push_str(&serde_json::to_string(sample)?);
        output.push('\n');
    }
    Ok(output)
}

/// Parse samples from JSONL content, skipping `#` header lines.
pub fn parse_samples(jsonl: &str) -> Result<Vec<GazeSample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_binary_layout() {
        let samples = vec![GazeSample::at(1.5, -2.0, 7)];
        let bytes = encode_binary(&samples).unwrap();

        assert_eq!(bytes.len(), 4 + RECORD_SIZE);
        assert_eq!(&bytes[0..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..12], &1.5f64.to_le_bytes());
        assert_eq!(&bytes[12..20], &(-2.0f64).to_le_bytes());
        assert_eq!(&bytes[20..24], &7u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_log_encodes_count_only() {
        let bytes = encode_binary(&[]).unwrap();
        assert_eq!(bytes, 0i32.to_le_bytes().to_vec());
        assert!(decode_binary(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_input_is_format_error() {
        let mut bytes = encode_binary(&[GazeSample::at(1.0, 1.0, 1), GazeSample::at(2.0, 2.0, 2)])
            .unwrap();
        bytes.truncate(bytes.len() - 5);

        assert!(matches!(decode_binary(&bytes), Err(GazeError::Format { .. })));
        assert!(matches!(
            read_binary(&mut bytes.as_slice()),
            Err(GazeError::Format { .. })
        ));
        assert!(matches!(decode_binary(&[1, 0]), Err(GazeError::Format { .. })));
    }

    #[test]
    fn test_negative_count_is_format_error() {
        let bytes = (-1i32).to_le_bytes();
        assert!(matches!(decode_binary(&bytes), Err(GazeError::Format { .. })));
    }

    #[test]
    fn test_jsonl_skips_header() {
        let jsonl = "# {\"schema_version\":\"1.0\"}\n{\"x\":0.5,\"y\":0.25,\"t\":3}\n\n";
        let parsed = parse_samples(jsonl).unwrap();
        assert_eq!(parsed, vec![GazeSample::at(0.5, 0.25, 3)]);
    }

    #[test]
    fn test_jsonl_roundtrip() {
        let samples = vec![GazeSample::at(0.0, 0.0, 0), GazeSample::at(10.25, -3.5, 1)];
        let jsonl = serialize_samples(&samples).unwrap();
        assert_eq!(parse_samples(&jsonl).unwrap(), samples);
    }

    proptest! {
        #[test]
        fn prop_binary_roundtrip_is_bit_exact(
            raw in prop::collection::vec((any::<f64>(), any::<f64>(), any::<u32>()), 0..64)
        ) {
            let samples: Vec<GazeSample> = raw
                .iter()
                .map(|&(x, y, t)| GazeSample::at(x, y, t))
                .collect();

            let bytes = encode_binary(&samples).unwrap();
            let from_slice = decode_binary(&bytes).unwrap();
            let from_reader = read_binary(&mut bytes.as_slice()).unwrap();

            prop_assert_eq!(from_slice.len(), samples.len());
            for ((a, b), c) in samples.iter().zip(&from_slice).zip(&from_reader) {
                prop_assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
                prop_assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
                prop_assert_eq!(a.timestamp_ms, b.timestamp_ms);
                prop_assert_eq!(b.position.x.to_bits(), c.position.x.to_bits());
                prop_assert_eq!(b.timestamp_ms, c.timestamp_ms);
            }
        }
    }
}
