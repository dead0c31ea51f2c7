//! SoundFX 1.x and 2.0 modules.
//!
//! Version 1 stores 15 sample lengths as longwords and the `SONG` tag at 60;
//! version 2 has 31 and the tag `SO31` at 124.

use trackerkit_common::Result;
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Shortest SoundFX 1 header.
pub const MIN_LEN: usize = 80;
const MIN_LEN_V2: usize = 144;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SoundFx,
    detector: Detector::Content(is_soundfx_format),
    decoder: parse_soundfx_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a SoundFX module of either version.
pub fn is_soundfx_format(data: &[u8]) -> bool {
    (data.len() >= MIN_LEN && magic_at(data, 60, b"SONG"))
        || (data.len() >= MIN_LEN_V2 && magic_at(data, 124, b"SO31"))
}

/// Recognise a SoundFX module and hand it to the native engine.
pub fn parse_soundfx_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SoundFx, is_soundfx_format(data))?;
    delegate(FormatId::SoundFx, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    #[test]
    fn test_version_one() {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 60, b"SONG");
        assert!(is_soundfx_format(&data));
        assert!(!is_soundfx_format(&data[..MIN_LEN - 1]));
    }

    #[test]
    fn test_version_two_needs_longer_header() {
        let mut data = zeroed(MIN_LEN_V2);
        put(&mut data, 124, b"SO31");
        assert!(is_soundfx_format(&data));
        assert!(!is_soundfx_format(&data[..MIN_LEN_V2 - 1]));
    }
}
