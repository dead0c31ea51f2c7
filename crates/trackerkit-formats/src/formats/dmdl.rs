//! Modules tagged `DMDL` at offset 0.
//!
//! Only the signature is known; the rest of the file goes to the native
//! engine unchanged.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature plus one header block.
pub const MIN_LEN: usize = 16;

const MAGIC: &[u8; 4] = b"DMDL";

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Dmdl,
    detector: Detector::Content(is_dmdl_format),
    decoder: parse_dmdl_file,
    min_len: MIN_LEN,
};

/// Check whether `data` starts with the `DMDL` signature.
pub fn is_dmdl_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, MAGIC)
}

/// Recognise a `DMDL` module and hand it to the native engine.
pub fn parse_dmdl_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Dmdl, is_dmdl_format(data))?;
    delegate(FormatId::Dmdl, data, filename, None)
}
