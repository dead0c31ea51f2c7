//! JamCracker modules.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature and instrument count.
pub const MIN_LEN: usize = 8;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::JamCracker,
    detector: Detector::Content(is_jamcracker_format),
    decoder: parse_jamcracker_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a JamCracker module.
pub fn is_jamcracker_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"BeEp")
}

/// Recognise a JamCracker module and hand it to the native engine.
pub fn parse_jamcracker_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::JamCracker, is_jamcracker_format(data))?;
    delegate(FormatId::JamCracker, data, filename, None)
}
