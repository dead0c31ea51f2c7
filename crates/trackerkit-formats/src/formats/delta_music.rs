//! Delta Music 1 and 2.
//!
//! Delta Music 2 modules are player binaries; the `.FNL` marker closes the
//! replay code at a fixed offset. Delta Music 1 files start with `ALL ` and
//! a table of 25 block lengths whose sum must fit in the file.

use trackerkit_common::Result;
use trackerkit_common::reader::{checked_u32, magic_at, Endian};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Delta Music 2 player through its end marker.
pub const DM2_MIN_LEN: usize = 0xBCA;
/// Delta Music 1 signature and block table.
pub const DM1_MIN_LEN: usize = 104;

const DM2_MARKER_AT: usize = 0xBC6;
const DM1_BLOCKS: usize = 25;

pub(crate) const DM2_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::DeltaMusic2,
    detector: Detector::Content(is_delta_music2_format),
    decoder: parse_delta_music2_file,
    min_len: DM2_MIN_LEN,
};

pub(crate) const DM1_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::DeltaMusic1,
    detector: Detector::Content(is_delta_music1_format),
    decoder: parse_delta_music1_file,
    min_len: DM1_MIN_LEN,
};

/// Check whether `data` is a Delta Music 2 module.
pub fn is_delta_music2_format(data: &[u8]) -> bool {
    data.len() >= DM2_MIN_LEN && magic_at(data, DM2_MARKER_AT, b".FNL")
}

/// Recognise a Delta Music 2 module and hand it to the native engine.
pub fn parse_delta_music2_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::DeltaMusic2, is_delta_music2_format(data))?;
    delegate(FormatId::DeltaMusic2, data, filename, None)
}

/// Check whether `data` is a Delta Music 1 module.
pub fn is_delta_music1_format(data: &[u8]) -> bool {
    if data.len() < DM1_MIN_LEN || !magic_at(data, 0, b"ALL ") {
        return false;
    }
    let total = (0..DM1_BLOCKS).try_fold(DM1_MIN_LEN as u64, |total, block| {
        checked_u32(data, 4 + block * 4, Endian::Big).map(|len| total + len as u64)
    });
    total.is_some_and(|total| total <= data.len() as u64)
}

/// Recognise a Delta Music 1 module and hand it to the native engine.
pub fn parse_delta_music1_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::DeltaMusic1, is_delta_music1_format(data))?;
    delegate(FormatId::DeltaMusic1, data, filename, None)
}
