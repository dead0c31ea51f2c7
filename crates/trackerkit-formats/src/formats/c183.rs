//! Modules opening with the big-endian longword `0xC1832A9E`.
//!
//! The longword is the whole signature. Files are delegated untouched.

use trackerkit_common::Result;
use trackerkit_common::reader::u32_be;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature plus one header block.
pub const MIN_LEN: usize = 16;

const SIGNATURE: u32 = 0xC183_2A9E;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::C183,
    detector: Detector::Content(is_c183_format),
    decoder: parse_c183_file,
    min_len: MIN_LEN,
};

/// Check whether `data` starts with `0xC1832A9E`.
pub fn is_c183_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && u32_be(data, 0) == SIGNATURE
}

/// Recognise a `0xC1832A9E` module and hand it to the native engine.
pub fn parse_c183_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::C183, is_c183_format(data))?;
    delegate(FormatId::C183, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    fn module() -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put_u32_be(&mut data, 0, SIGNATURE);
        data
    }

    #[test]
    fn test_signature() {
        assert!(is_c183_format(&module()));
        assert!(!is_c183_format(&zeroed(MIN_LEN)));
        assert!(!is_c183_format(&module()[..MIN_LEN - 1]));

        // Little-endian order is not the signature.
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, &SIGNATURE.to_le_bytes());
        assert!(!is_c183_format(&data));
    }

    #[test]
    fn test_stub_without_filename() {
        let song = parse_c183_file(&module(), None).unwrap().into_song();
        assert_eq!(song.name, "C183 Module [C183]");
        assert_eq!(song.num_channels, 4);
        assert!(song.instruments.is_empty());
    }
}
