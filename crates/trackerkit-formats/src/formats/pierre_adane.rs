//! Pierre Adane Packer (`PAP.`) modules.
//!
//! The header holds four big-endian offsets D1..D4. D1 bounds a table of
//! even words that starts at offset 8; D2..D4 point at three evenly spaced
//! blocks, and the block before D3 ends with `0xFF`.

use trackerkit_common::Result;
use trackerkit_common::reader::{read_u8, u16_be};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Offsets plus the first table words.
pub const MIN_LEN: usize = 16;

const TABLE_AT: usize = 8;
const TABLE_MAX_ENTRIES: usize = 128;
const TERMINATOR: u8 = 0xFF;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::PierreAdane,
    detector: Detector::Content(is_pierre_adane_format),
    decoder: parse_pierre_adane_file,
    min_len: MIN_LEN,
};

/// Even with the sign bit clear.
fn even_offset(data: &[u8], at: usize) -> Option<i32> {
    let value = u16_be(data, at);
    (value % 2 == 0 && value & 0x8000 == 0).then_some(value as i32)
}

fn offsets(data: &[u8]) -> Option<[i32; 4]> {
    Some([
        even_offset(data, 0)?,
        even_offset(data, 2)?,
        even_offset(data, 4)?,
        even_offset(data, 6)?,
    ])
}

/// Check whether `data` is a Pierre Adane packed module.
pub fn is_pierre_adane_format(data: &[u8]) -> bool {
    if data.len() < MIN_LEN {
        return false;
    }
    let Some([d1, d2, d3, d4]) = offsets(data) else {
        return false;
    };
    let gap = d4 - d3;
    if d1 < TABLE_AT as i32 || gap != d3 - d2 || gap != (d2 - d1) - 2 || d4 as usize >= data.len() {
        return false;
    }
    if d3 < 1 || read_u8(data, d3 as usize - 1) != TERMINATOR {
        return false;
    }

    let table_end = (d1 as usize).min(TABLE_AT + TABLE_MAX_ENTRIES * 2);
    (TABLE_AT..table_end).step_by(2).all(|at| {
        let entry = u16_be(data, at);
        entry % 2 == 0 && entry & 0x8000 == 0 && entry as i32 <= d1
    })
}

/// Recognise a Pierre Adane module and hand it to the native engine.
pub fn parse_pierre_adane_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::PierreAdane, is_pierre_adane_format(data))?;
    delegate(FormatId::PierreAdane, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    fn module() -> Vec<u8> {
        let mut data = zeroed(64);
        put_u16_be(&mut data, 0, 32);
        put_u16_be(&mut data, 2, 36);
        put_u16_be(&mut data, 4, 38);
        put_u16_be(&mut data, 6, 40);
        data[37] = TERMINATOR;
        data
    }

    #[test]
    fn test_gap_arithmetic() {
        assert!(is_pierre_adane_format(&module()));

        let mut data = module();
        data[37] = 0x00;
        assert!(!is_pierre_adane_format(&data));

        let mut data = module();
        put_u16_be(&mut data, 6, 42);
        assert!(!is_pierre_adane_format(&data));
    }

    #[test]
    fn test_offsets_must_be_even_and_positive() {
        let mut data = module();
        put_u16_be(&mut data, 0, 33);
        assert!(!is_pierre_adane_format(&data));

        let mut data = module();
        put_u16_be(&mut data, 6, 0x8028);
        assert!(!is_pierre_adane_format(&data));
    }

    #[test]
    fn test_sequence_table() {
        let mut data = module();
        put_u16_be(&mut data, 8, 32);
        put_u16_be(&mut data, 30, 16);
        assert!(is_pierre_adane_format(&data));

        put_u16_be(&mut data, 10, 34);
        assert!(!is_pierre_adane_format(&data));

        let mut data = module();
        put_u16_be(&mut data, 12, 5);
        assert!(!is_pierre_adane_format(&data));
    }

    #[test]
    fn test_last_offset_inside_file() {
        assert!(!is_pierre_adane_format(&module()[..40]));
        assert!(is_pierre_adane_format(&module()[..41]));
    }

    #[test]
    fn test_stub() {
        let song = parse_pierre_adane_file(&module(), Some("PAP.wings")).unwrap().into_song();
        assert_eq!(song.name, "wings (Pierre Adane Packer) [PAP]");
    }
}
