//! Ordered format table and the detect-then-decode dispatcher.
//!
//! The table is built once and never mutated. Detection walks it in
//! registration order and stops at the first detector that accepts the
//! buffer; the paired decoder's result is returned as-is. A decoder failure
//! after a positive detection is reported to the caller, later formats are
//! not consulted.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use trackerkit_common::{FormatError, Result};

use crate::format_id::FormatId;
use crate::formats;
use crate::outcome::{DecodeOutcome, Imported};

/// Decoder signature shared by all formats.
pub type DecodeFn = fn(&[u8], Option<&str>) -> Result<DecodeOutcome>;

/// How a format recognises its input.
#[derive(Debug, Clone, Copy)]
pub enum Detector {
    /// Looks at the bytes only.
    Content(fn(&[u8]) -> bool),
    /// Needs the filename as well; never matches without one.
    Named(fn(&[u8], Option<&str>) -> bool),
}

impl Detector {
    /// Run the predicate.
    pub fn matches(&self, data: &[u8], filename: Option<&str>) -> bool {
        match self {
            Detector::Content(detect) => detect(data),
            Detector::Named(detect) => filename.is_some() && detect(data, filename),
        }
    }

    /// `true` for filename-based detectors.
    pub fn is_named(&self) -> bool {
        matches!(self, Detector::Named(_))
    }
}

/// One row of the format table.
#[derive(Debug, Clone, Copy)]
pub struct FormatEntry {
    /// Format identity.
    pub id: FormatId,
    /// Recogniser.
    pub detector: Detector,
    /// Decoder, called only after the detector accepted the buffer.
    pub decoder: DecodeFn,
    /// Shortest buffer the detector can accept.
    pub min_len: usize,
}

impl FormatEntry {
    /// Run the detector.
    pub fn matches(&self, data: &[u8], filename: Option<&str>) -> bool {
        self.detector.matches(data, filename)
    }

    /// Run the decoder.
    pub fn decode(&self, data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
        (self.decoder)(data, filename)
    }
}

/// Registry settings, usually loaded from a TOML file by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Tags of formats to leave out of detection (`["SFX", "JPO"]`).
    pub disabled_formats: Vec<String>,
    /// Keep detectors that rely on filename conventions.
    pub filename_detection: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            disabled_formats: Vec::new(),
            filename_detection: true,
        }
    }
}

/// Immutable, ordered format table.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<FormatEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// Every supported format in registration order.
    pub fn standard() -> Self {
        Self {
            entries: formats::standard_entries(),
        }
    }

    /// The standard table minus what `config` switches off.
    pub fn with_config(config: &RegistryConfig) -> Self {
        let mut disabled = Vec::with_capacity(config.disabled_formats.len());
        for tag in &config.disabled_formats {
            match FormatId::from_tag(tag) {
                Some(id) => disabled.push(id),
                None => warn!(tag = %tag, "ignoring unknown format in disabled_formats"),
            }
        }

        let entries = formats::standard_entries()
            .into_iter()
            .filter(|entry| !disabled.contains(&entry.id))
            .filter(|entry| config.filename_detection || !entry.detector.is_named())
            .collect::<Vec<_>>();
        debug!(formats = entries.len(), "built format registry");
        Self { entries }
    }

    /// The table in probe order.
    pub fn entries(&self) -> &[FormatEntry] {
        &self.entries
    }

    /// Entry for `id`, if registered.
    pub fn entry(&self, id: FormatId) -> Option<&FormatEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// First entry whose detector accepts the buffer.
    pub fn detect_entry(&self, data: &[u8], filename: Option<&str>) -> Option<&FormatEntry> {
        self.entries.iter().find(|entry| {
            let hit = entry.matches(data, filename);
            trace!(format = entry.id.tag(), hit, "probed");
            hit
        })
    }

    /// Format of the first matching detector.
    pub fn detect(&self, data: &[u8], filename: Option<&str>) -> Option<FormatId> {
        self.detect_entry(data, filename).map(|entry| entry.id)
    }

    /// Run the decoder paired with the first matching detector.
    ///
    /// Returns `None` when no detector matched. The decoder result is kept
    /// next to the detected format so callers can report which format
    /// failed; later formats are never tried.
    pub fn detect_and_decode(
        &self,
        data: &[u8],
        filename: Option<&str>,
    ) -> Option<(FormatId, Result<DecodeOutcome>)> {
        let Some(entry) = self.detect_entry(data, filename) else {
            debug!(size = data.len(), filename, "no format matched");
            return None;
        };
        debug!(format = entry.id.tag(), size = data.len(), filename, "format detected");
        Some((entry.id, entry.decode(data, filename)))
    }

    /// Detect the format and decode with the matching decoder.
    ///
    /// Returns `Ok(None)` when no detector matched. Once a detector matched,
    /// its decoder's error is returned unchanged.
    pub fn detect_and_parse(&self, data: &[u8], filename: Option<&str>) -> Result<Option<Imported>> {
        match self.detect_and_decode(data, filename) {
            None => Ok(None),
            Some((format, outcome)) => Ok(Some(Imported {
                format,
                outcome: outcome?,
            })),
        }
    }

    /// Decode as a specific format, bypassing detection order.
    pub fn parse_as(&self, id: FormatId, data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
        match self.entry(id) {
            Some(entry) => entry.decode(data, filename),
            None => Err(FormatError::NotRecognized { format: id.tag() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order_follows_format_ids() {
        let registry = Registry::standard();
        let ids: Vec<FormatId> = registry.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, FormatId::ALL);
    }

    #[test]
    fn test_config_drops_disabled_and_named() {
        let config = RegistryConfig {
            disabled_formats: vec!["mod".into(), "nope".into()],
            filename_detection: false,
        };
        let registry = Registry::with_config(&config);
        assert!(registry.entry(FormatId::ProTracker).is_none());
        assert!(registry.entry(FormatId::SteveTurner).is_none());
        assert!(registry.entry(FormatId::AdpcmMono).is_none());
        assert!(registry.entry(FormatId::Xm).is_some());
        assert!(registry.entries().iter().all(|e| !e.detector.is_named()));
    }

    #[test]
    fn test_config_defaults_from_partial_input() {
        let config: RegistryConfig = serde_json::from_str(r#"{"disabled_formats":["SFX"]}"#).unwrap();
        assert!(config.filename_detection);
        assert_eq!(config.disabled_formats, vec!["SFX".to_string()]);
    }

    #[test]
    fn test_no_match_is_ok_none() {
        let registry = Registry::standard();
        assert!(registry.detect_and_parse(&[0u8; 4096], None).unwrap().is_none());
        assert!(registry.detect(b"", Some("x.adpcm")).is_none());
    }

    #[test]
    fn test_parse_as_unregistered_format() {
        let config = RegistryConfig {
            disabled_formats: vec!["XM".into()],
            ..RegistryConfig::default()
        };
        let err = Registry::with_config(&config)
            .parse_as(FormatId::Xm, b"", None)
            .unwrap_err();
        assert_eq!(err, FormatError::NotRecognized { format: "XM" });
    }

    fn accept_all(_: &[u8]) -> bool {
        true
    }

    fn always_fails(_: &[u8], _: Option<&str>) -> Result<DecodeOutcome> {
        Err(FormatError::Malformed {
            format: "XM",
            reason: "truncated".into(),
        })
    }

    #[test]
    fn test_decoder_error_does_not_fall_through() {
        let registry = Registry {
            entries: vec![
                FormatEntry {
                    id: FormatId::Xm,
                    detector: Detector::Content(accept_all),
                    decoder: always_fails,
                    min_len: 0,
                },
                formats::furnace::ENTRY,
            ],
        };
        let mut data = b"-Furnace module-".to_vec();
        data.resize(64, 0);
        assert_eq!(registry.detect(&data, None), Some(FormatId::Xm));
        let err = registry.detect_and_parse(&data, None).unwrap_err();
        assert!(matches!(err, FormatError::Malformed { format: "XM", .. }));

        let (format, outcome) = registry.detect_and_decode(&data, None).unwrap();
        assert_eq!(format, FormatId::Xm);
        assert!(outcome.is_err());
        assert!(registry.detect_and_decode(b"nothing", None).is_some());
    }

    #[test]
    fn test_detect_and_decode_without_match() {
        let registry = Registry::standard();
        assert!(registry.detect_and_decode(&[0u8; 4096], Some("zeros.bin")).is_none());
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
