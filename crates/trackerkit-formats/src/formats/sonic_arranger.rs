//! Sonic Arranger modules (editor format, not the packed replayer binary).

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature and the `STBL` chunk tag.
pub const MIN_LEN: usize = 16;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SonicArranger,
    detector: Detector::Content(is_sonic_arranger_format),
    decoder: parse_sonic_arranger_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Sonic Arranger module.
pub fn is_sonic_arranger_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"SOARV1.0")
}

/// Recognise a Sonic Arranger module and hand it to the native engine.
pub fn parse_sonic_arranger_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SonicArranger, is_sonic_arranger_format(data))?;
    delegate(FormatId::SonicArranger, data, filename, None)
}
