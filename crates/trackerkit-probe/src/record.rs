//! One report row per probed file.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};
use trackerkit_formats::{DecodePolicy, Registry, analyze};

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// A detector matched and its decoder succeeded.
    Decoded,
    /// No detector matched.
    Unrecognised,
    /// The file could not be read, or the matching decoder failed.
    Error,
}

/// Flat summary of a probed file. Song fields are empty unless decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeRecord {
    /// File path as given or found by the scan.
    pub path: String,
    /// Outcome of the probe.
    pub status: ProbeStatus,
    /// Short format tag, e.g. `MOD`.
    pub tag: Option<&'static str>,
    /// Human-readable format name.
    pub format: Option<&'static str>,
    /// Whether the format is decoded here or handed to a native engine.
    pub policy: Option<DecodePolicy>,
    /// Song name with the format suffix.
    pub song_name: Option<String>,
    /// Channels per pattern.
    pub channels: Option<usize>,
    /// Patterns in the song.
    pub patterns: Option<usize>,
    /// Entries in the order list.
    pub order_length: Option<usize>,
    /// Instrument slots, sampled or not.
    pub instruments: Option<usize>,
    /// Instruments carrying PCM.
    pub sampled_instruments: Option<usize>,
    /// Pitched notes per channel row across the pattern pool.
    pub note_density: Option<f32>,
    /// Read or decode error text.
    pub error: Option<String>,
}

impl ProbeRecord {
    fn bare(path: &Path, status: ProbeStatus) -> Self {
        Self {
            path: path.display().to_string(),
            status,
            tag: None,
            format: None,
            policy: None,
            song_name: None,
            channels: None,
            patterns: None,
            order_length: None,
            instruments: None,
            sampled_instruments: None,
            note_density: None,
            error: None,
        }
    }

    fn failed(path: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::bare(path, ProbeStatus::Error)
        }
    }
}

/// Probe an in-memory buffer; `path` doubles as the filename hint.
pub fn probe_bytes(registry: &Registry, path: &Path, data: &[u8]) -> ProbeRecord {
    let filename = path.to_str();
    let Some((id, decoded)) = registry.detect_and_decode(data, filename) else {
        debug!(path = %path.display(), "unrecognised");
        return ProbeRecord::bare(path, ProbeStatus::Unrecognised);
    };

    let outcome = match decoded {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(path = %path.display(), format = id.tag(), error = %err, "decode failed");
            return ProbeRecord {
                tag: Some(id.tag()),
                format: Some(id.name()),
                policy: Some(id.policy()),
                ..ProbeRecord::failed(path, err.to_string())
            };
        }
    };

    let song = outcome.song();
    let report = analyze(song);
    ProbeRecord {
        tag: Some(id.tag()),
        format: Some(id.name()),
        policy: Some(id.policy()),
        song_name: Some(song.name.clone()),
        channels: Some(report.channel_count),
        patterns: Some(report.pattern_count),
        order_length: Some(report.order_length),
        instruments: Some(report.instrument_count),
        sampled_instruments: Some(report.sampled_instrument_count),
        note_density: Some(report.note_density),
        ..ProbeRecord::bare(path, ProbeStatus::Decoded)
    }
}

/// Read and probe one file. Read failures become [`ProbeStatus::Error`] rows.
pub fn probe_file(registry: &Registry, path: &Path) -> ProbeRecord {
    match fs::read(path) {
        Ok(data) => probe_bytes(registry, path, &data),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "read failed");
            ProbeRecord::failed(path, err.to_string())
        }
    }
}

/// Probe `files` in parallel with one shared registry, keeping input order.
pub fn probe_all(registry: &Registry, files: &[PathBuf], progress: Option<&ProgressBar>) -> Vec<ProbeRecord> {
    files
        .par_iter()
        .map(|path| {
            let record = probe_file(registry, path);
            if let Some(bar) = progress {
                bar.inc(1);
            }
            record
        })
        .collect()
}
