//! SunVox projects.
//!
//! A SunVox file is a chunk stream whose first chunk is `SVOX` with an empty
//! body.

use trackerkit_common::Result;
use trackerkit_common::reader::{magic_at, u32_le};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// First chunk header.
pub const MIN_LEN: usize = 8;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SunVox,
    detector: Detector::Content(is_sunvox_format),
    decoder: parse_sunvox_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a SunVox project.
pub fn is_sunvox_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"SVOX") && u32_le(data, 4) == 0
}

/// Recognise a SunVox project and hand it to the native engine.
pub fn parse_sunvox_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SunVox, is_sunvox_format(data))?;
    delegate(FormatId::SunVox, data, filename, None)
}
