//! HivelyTracker and AHX (Abyss' Highest eXperience) modules.
//!
//! Both share a header layout: three-letter signature and revision byte,
//! then a big-endian offset to the string table. The song title is the
//! first NUL-terminated string there.

use trackerkit_common::Result;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string, read_u8, u16_be};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed header of both formats.
pub const MIN_LEN: usize = 14;

const TITLE_MAX: usize = 128;

pub(crate) const HVL_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::HivelyTracker,
    detector: Detector::Content(is_hvl_format),
    decoder: parse_hvl_file,
    min_len: MIN_LEN,
};

pub(crate) const AHX_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Ahx,
    detector: Detector::Content(is_ahx_format),
    decoder: parse_ahx_file,
    min_len: MIN_LEN,
};

fn string_table_title(data: &[u8]) -> String {
    clean_title(&read_fixed_string(data, u16_be(data, 4) as usize, TITLE_MAX))
}

/// Check whether `data` is a HivelyTracker module.
pub fn is_hvl_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"HVL\0")
}

/// Recognise a HivelyTracker module and hand it to the native engine.
pub fn parse_hvl_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::HivelyTracker, is_hvl_format(data))?;
    let title = string_table_title(data);
    delegate(FormatId::HivelyTracker, data, filename, Some(&title))
}

/// Check whether `data` is an AHX module (revision 0 or 1).
pub fn is_ahx_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"THX") && read_u8(data, 3) <= 1
}

/// Recognise an AHX module and hand it to the native engine.
pub fn parse_ahx_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Ahx, is_ahx_format(data))?;
    let title = string_table_title(data);
    delegate(FormatId::Ahx, data, filename, Some(&title))
}
