//! Quadra Composer (`EMOD`) modules.
//!
//! IFF container: `FORM`, size, `EMOD`, then an `EMIC` chunk whose body
//! starts with a version word and the 20-byte song name.

use trackerkit_common::Result;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// IFF header and the `EMIC` tag.
pub const MIN_LEN: usize = 16;

const NAME_AT: usize = 22;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::QuadraComposer,
    detector: Detector::Content(is_quadra_format),
    decoder: parse_quadra_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Quadra Composer module.
pub fn is_quadra_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN
        && magic_at(data, 0, b"FORM")
        && magic_at(data, 8, b"EMOD")
        && magic_at(data, 12, b"EMIC")
}

/// Recognise a Quadra Composer module and hand it to the native engine.
pub fn parse_quadra_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::QuadraComposer, is_quadra_format(data))?;
    let title = clean_title(&read_fixed_string(data, NAME_AT, 20));
    delegate(FormatId::QuadraComposer, data, filename, Some(&title))
}
