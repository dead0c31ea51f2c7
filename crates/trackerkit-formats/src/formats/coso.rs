//! Jochen Hippel COSO modules.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// COSO offset table and the embedded TFMX header tag.
pub const MIN_LEN: usize = 36;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::HippelCoso,
    detector: Detector::Content(is_coso_format),
    decoder: parse_coso_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Hippel COSO module.
pub fn is_coso_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"COSO") && magic_at(data, 32, b"TFMX")
}

/// Recognise a COSO module and hand it to the native engine.
pub fn parse_coso_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::HippelCoso, is_coso_format(data))?;
    delegate(FormatId::HippelCoso, data, filename, None)
}
