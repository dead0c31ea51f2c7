//! Future Composer 1.3 (`SMOD`) and 1.4 (`FC14`).
//!
//! The sequence table length is a multiple of 13 (four voices of three bytes
//! plus a speed byte); the pattern and sample pointers must land inside the
//! file.

use trackerkit_common::Result;
use trackerkit_common::reader::{magic_at, u32_be};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Future Composer 1.3 header.
pub const MIN_LEN: usize = 100;
const MIN_LEN_FC14: usize = 180;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::FutureComposer,
    detector: Detector::Content(is_future_composer_format),
    decoder: parse_future_composer_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Future Composer 1.3 or 1.4 module.
pub fn is_future_composer_format(data: &[u8]) -> bool {
    let min_len = if magic_at(data, 0, b"SMOD") {
        MIN_LEN
    } else if magic_at(data, 0, b"FC14") {
        MIN_LEN_FC14
    } else {
        return false;
    };
    if data.len() < min_len {
        return false;
    }
    let sequence_len = u32_be(data, 4);
    let patterns_at = u32_be(data, 8) as usize;
    let samples_at = u32_be(data, 32) as usize;
    sequence_len != 0
        && sequence_len % 13 == 0
        && patterns_at < data.len()
        && samples_at < data.len()
}

/// Recognise a Future Composer module and hand it to the native engine.
pub fn parse_future_composer_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::FutureComposer, is_future_composer_format(data))?;
    delegate(FormatId::FutureComposer, data, filename, None)
}
