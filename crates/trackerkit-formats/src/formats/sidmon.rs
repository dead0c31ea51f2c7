//! SidMon 1 modules.
//!
//! SidMon 1 files are ripped with their replay code in front, so the
//! signature string sits at a varying offset inside the player.

use trackerkit_common::Result;
use trackerkit_common::reader::find_bytes;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Shortest file that can hold a player stub and the signature.
pub const MIN_LEN: usize = 64;

const SIGNATURE: &[u8] = b"SID-MON BY R.v.VLIET";
const SEARCH_LIMIT: usize = 0x800;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SidMon1,
    detector: Detector::Content(is_sidmon1_format),
    decoder: parse_sidmon1_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a SidMon 1 module.
pub fn is_sidmon1_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && find_bytes(data, SIGNATURE, SEARCH_LIMIT).is_some()
}

/// Recognise a SidMon 1 module and hand it to the native engine.
pub fn parse_sidmon1_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SidMon1, is_sidmon1_format(data))?;
    delegate(FormatId::SidMon1, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    #[test]
    fn test_signature_inside_player() {
        let mut data = zeroed(0x400);
        put(&mut data, 0x1F2, SIGNATURE);
        assert!(is_sidmon1_format(&data));
    }

    #[test]
    fn test_signature_past_search_window() {
        let mut data = zeroed(0x1000);
        put(&mut data, SEARCH_LIMIT + 4, SIGNATURE);
        assert!(!is_sidmon1_format(&data));
    }

    #[test]
    fn test_short_buffer() {
        let mut data = zeroed(MIN_LEN - 1);
        put(&mut data, 0, SIGNATURE);
        assert!(!is_sidmon1_format(&data[..MIN_LEN - 1]));
    }
}
