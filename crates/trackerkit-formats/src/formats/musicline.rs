//! MusicLine Editor modules.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature and first chunk header.
pub const MIN_LEN: usize = 16;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::MusicLine,
    detector: Detector::Content(is_musicline_format),
    decoder: parse_musicline_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a MusicLine Editor module.
pub fn is_musicline_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"MLEDMODL")
}

/// Recognise a MusicLine module and hand it to the native engine.
pub fn parse_musicline_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::MusicLine, is_musicline_format(data))?;
    delegate(FormatId::MusicLine, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    #[test]
    fn test_detection() {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, b"MLEDMODL");
        assert!(is_musicline_format(&data));
        assert!(!is_musicline_format(&data[..8]));
        assert!(parse_musicline_file(&data, None).unwrap().is_delegated());
    }
}
