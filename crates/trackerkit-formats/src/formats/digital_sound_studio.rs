//! Digital Sound Studio modules.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature and song tempo.
pub const MIN_LEN: usize = 8;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::DigitalSoundStudio,
    detector: Detector::Content(is_dss_format),
    decoder: parse_dss_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Digital Sound Studio module.
pub fn is_dss_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"MMU2")
}

/// Recognise a DSS module and hand it to the native engine.
pub fn parse_dss_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::DigitalSoundStudio, is_dss_format(data))?;
    delegate(FormatId::DigitalSoundStudio, data, filename, None)
}
