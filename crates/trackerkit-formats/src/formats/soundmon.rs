//! SoundMon (Brian Postma) versions 1 to 3.

use trackerkit_common::Result;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Title, version tag and sequence length.
pub const MIN_LEN: usize = 32;

const VERSION_AT: usize = 26;
const VERSION_TAGS: [&[u8]; 3] = [b"V.2", b"V.3", b"BPSM"];

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SoundMon,
    detector: Detector::Content(is_soundmon_format),
    decoder: parse_soundmon_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a SoundMon module.
pub fn is_soundmon_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && VERSION_TAGS.iter().any(|tag| magic_at(data, VERSION_AT, tag))
}

/// Recognise a SoundMon module and hand it to the native engine.
pub fn parse_soundmon_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SoundMon, is_soundmon_format(data))?;
    let title = clean_title(&read_fixed_string(data, 0, VERSION_AT));
    delegate(FormatId::SoundMon, data, filename, Some(&title))
}
