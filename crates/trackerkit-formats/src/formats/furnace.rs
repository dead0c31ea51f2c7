//! Furnace Tracker modules.
//!
//! Only uncompressed files carry the plain-text signature; zlib-packed
//! `.fur` files are left to the native engine's own loader.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature plus version and header pointer.
pub const MIN_LEN: usize = 32;

const MAGIC: &[u8] = b"-Furnace module-";

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Furnace,
    detector: Detector::Content(is_furnace_format),
    decoder: parse_furnace_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is an uncompressed Furnace module.
pub fn is_furnace_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, MAGIC)
}

/// Recognise a Furnace module and hand it to the native engine.
pub fn parse_furnace_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Furnace, is_furnace_format(data))?;
    delegate(FormatId::Furnace, data, filename, None)
}
