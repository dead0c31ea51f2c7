//! Sound Player (`SJS.`) modules.
//!
//! No signature: the header starts with an even, non-zero word, a voice
//! count of 7 or 15 and two small fields. The 15-voice layout repeats byte 5
//! at byte 14.

use trackerkit_common::Result;
use trackerkit_common::reader::{read_u8, u16_be};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed header.
pub const MIN_LEN: usize = 16;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SoundPlayer,
    detector: Detector::Content(is_sound_player_format),
    decoder: parse_sound_player_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Sound Player module.
pub fn is_sound_player_format(data: &[u8]) -> bool {
    if data.len() < MIN_LEN {
        return false;
    }
    let first = u16_be(data, 0);
    if first == 0 || first % 2 != 0 {
        return false;
    }
    let voices = read_u8(data, 2);
    if voices != 7 && voices != 15 {
        return false;
    }
    if read_u8(data, 3) == 0 || read_u8(data, 4) >= 0x80 {
        return false;
    }
    voices == 7 || read_u8(data, 14) == read_u8(data, 5)
}

/// Recognise a Sound Player module and hand it to the native engine.
pub fn parse_sound_player_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SoundPlayer, is_sound_player_format(data))?;
    delegate(FormatId::SoundPlayer, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    fn header(voices: u8) -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put_u16_be(&mut data, 0, 0x0040);
        data[2] = voices;
        data[3] = 1;
        data[4] = 0x10;
        data[5] = 0x22;
        data[14] = 0x22;
        data
    }

    #[test]
    fn test_both_voice_counts() {
        assert!(is_sound_player_format(&header(7)));
        assert!(is_sound_player_format(&header(15)));
        assert!(!is_sound_player_format(&header(8)));
    }

    #[test]
    fn test_byte14_only_checked_for_15_voices() {
        let mut fifteen = header(15);
        fifteen[14] = 0x23;
        assert!(!is_sound_player_format(&fifteen));

        let mut seven = header(7);
        seven[14] = 0x23;
        assert!(is_sound_player_format(&seven));
    }

    #[test]
    fn test_field_ranges() {
        let mut data = header(7);
        put_u16_be(&mut data, 0, 0x0041);
        assert!(!is_sound_player_format(&data));

        let mut data = header(7);
        data[3] = 0;
        assert!(!is_sound_player_format(&data));

        let mut data = header(7);
        data[4] = 0x80;
        assert!(!is_sound_player_format(&data));

        assert!(!is_sound_player_format(&header(7)[..MIN_LEN - 1]));
    }
}
