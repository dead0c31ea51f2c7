//! Digital Mugician I and II.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature, flags and the eight sub-song lengths.
pub const MIN_LEN: usize = 76;

const MAGIC_V1: &[u8] = b" MUGICIAN/SOFTEAM";
const MAGIC_V2: &[u8] = b" MUGICIAN2/SOFTEAM";

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::DigitalMugician,
    detector: Detector::Content(is_mugician_format),
    decoder: parse_mugician_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Digital Mugician module.
pub fn is_mugician_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && (magic_at(data, 0, MAGIC_V1) || magic_at(data, 0, MAGIC_V2))
}

/// Recognise a Digital Mugician module and hand it to the native engine.
pub fn parse_mugician_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::DigitalMugician, is_mugician_format(data))?;
    delegate(FormatId::DigitalMugician, data, filename, None)
}
