//! OctaMED `MMD0`..`MMD3` modules.

use trackerkit_common::Result;
use trackerkit_common::reader::{magic_at, u32_be, window};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed `MMD` header.
pub const MIN_LEN: usize = 52;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::OctaMed,
    detector: Detector::Content(is_med_format),
    decoder: parse_med_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is an OctaMED module. The stored module length must
/// be non-zero and fit in the buffer.
pub fn is_med_format(data: &[u8]) -> bool {
    if data.len() < MIN_LEN || !magic_at(data, 0, b"MMD") {
        return false;
    }
    let version_ok = window(data, 3, 1).is_some_and(|v| (b'0'..=b'3').contains(&v[0]));
    let length = u32_be(data, 4) as usize;
    version_ok && (1..=data.len()).contains(&length)
}

/// Recognise an OctaMED module and hand it to the native engine.
pub fn parse_med_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::OctaMed, is_med_format(data))?;
    delegate(FormatId::OctaMed, data, filename, None)
}
