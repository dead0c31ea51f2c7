//! TFMX song files (`mdat.*`).
//!
//! Four spellings of the header signature exist across TFMX editor versions.
//! The sample file (`smpl.*`) is a companion the native engine resolves from
//! the filename.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Header with text area and song tables.
pub const MIN_LEN: usize = 512;

const MAGICS: [&[u8]; 4] = [b"TFMX-SONG ", b"TFMX_SONG", b"tfmxsong", b"TFMX "];

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Tfmx,
    detector: Detector::Content(is_tfmx_format),
    decoder: parse_tfmx_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a TFMX song file.
pub fn is_tfmx_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && MAGICS.iter().any(|magic| magic_at(data, 0, magic))
}

/// Recognise a TFMX song and hand it to the native engine.
pub fn parse_tfmx_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Tfmx, is_tfmx_format(data))?;
    delegate(FormatId::Tfmx, data, filename, None)
}
