//! SoundTracker Pro II modules.

use trackerkit_common::Result;
use trackerkit_common::reader::{magic_at, u16_be};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed `STP3` header.
pub const MIN_LEN: usize = 204;

const MAX_VERSION: u16 = 2;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SoundTrackerPro,
    detector: Detector::Content(is_stp_format),
    decoder: parse_stp_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a SoundTracker Pro II module.
pub fn is_stp_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"STP3") && u16_be(data, 4) <= MAX_VERSION
}

/// Recognise an STP module and hand it to the native engine.
pub fn parse_stp_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SoundTrackerPro, is_stp_format(data))?;
    delegate(FormatId::SoundTrackerPro, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    fn module(version: u16) -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, b"STP3");
        put_u16_be(&mut data, 4, version);
        data
    }

    #[test]
    fn test_versions() {
        assert!(is_stp_format(&module(0)));
        assert!(is_stp_format(&module(2)));
        assert!(!is_stp_format(&module(3)));
        assert!(!is_stp_format(&module(1)[..MIN_LEN - 1]));
    }
}
