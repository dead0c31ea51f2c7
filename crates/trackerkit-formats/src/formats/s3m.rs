//! Scream Tracker 3 modules.

use trackerkit_common::Result;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string, read_u8};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed header up to the channel settings.
pub const MIN_LEN: usize = 96;

const FILE_TYPE_MODULE: u8 = 0x10;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::ScreamTracker3,
    detector: Detector::Content(is_s3m_format),
    decoder: parse_s3m_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Scream Tracker 3 module.
pub fn is_s3m_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 44, b"SCRM") && read_u8(data, 29) == FILE_TYPE_MODULE
}

/// Recognise an S3M module and hand it to the native engine.
pub fn parse_s3m_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::ScreamTracker3, is_s3m_format(data))?;
    let title = clean_title(&read_fixed_string(data, 0, 28));
    delegate(FormatId::ScreamTracker3, data, filename, Some(&title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    fn module() -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, b"2nd reality");
        data[28] = 0x1A;
        data[29] = FILE_TYPE_MODULE;
        put(&mut data, 44, b"SCRM");
        data
    }

    #[test]
    fn test_detection() {
        assert!(is_s3m_format(&module()));

        let mut data = module();
        data[29] = 0x11;
        assert!(!is_s3m_format(&data));
        assert!(!is_s3m_format(&module()[..MIN_LEN - 1]));
    }

    #[test]
    fn test_title() {
        let song = parse_s3m_file(&module(), Some("pm_2nd.s3m")).unwrap().into_song();
        assert_eq!(song.name, "2nd reality (Scream Tracker 3) [S3M]");
    }
}
