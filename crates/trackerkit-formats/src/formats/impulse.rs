//! Impulse Tracker modules.

use trackerkit_common::Result;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Header through the initial channel volumes.
pub const MIN_LEN: usize = 192;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::ImpulseTracker,
    detector: Detector::Content(is_it_format),
    decoder: parse_it_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is an Impulse Tracker module.
pub fn is_it_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"IMPM")
}

/// Recognise an IT module and hand it to the native engine.
pub fn parse_it_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::ImpulseTracker, is_it_format(data))?;
    let title = clean_title(&read_fixed_string(data, 4, 26));
    delegate(FormatId::ImpulseTracker, data, filename, Some(&title))
}
