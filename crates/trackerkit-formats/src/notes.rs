//! Amiga period table and note conversions shared by the Amiga decoders.

use trackerkit_common::{NOTE_MAX, NOTE_NONE, PERIOD_C1};

/// ProTracker periods at finetune 0, C-0 (1712) to B-4 (57).
pub const PERIOD_TABLE: [u16; 60] = [
    1712, 1616, 1524, 1440, 1356, 1280, 1208, 1140, 1076, 1016, 960, 907, // octave 0
    856, 808, 762, 720, 678, 640, 604, 570, 538, 508, 480, 453, // octave 1
    428, 404, 381, 360, 339, 320, 302, 285, 269, 254, 240, 226, // octave 2
    214, 202, 190, 180, 170, 160, 151, 143, 135, 127, 120, 113, // octave 3
    107, 101, 95, 90, 85, 80, 76, 71, 67, 64, 60, 57, // octave 4
];

/// Song note of period table index 0.
pub const PERIOD_NOTE_BASE: u8 = 25;

/// Index of ProTracker C-1 in [`PERIOD_TABLE`].
pub const PERIOD_INDEX_C1: usize = 12;

/// Closest song note for an Amiga period, `0` for no period.
pub fn period_to_note(period: u16) -> u8 {
    if period == 0 {
        return NOTE_NONE;
    }
    let index = PERIOD_TABLE
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.abs_diff(period))
        .map_or(PERIOD_INDEX_C1, |(index, _)| index);
    period_index_to_note(index as i32)
}

/// Song note for a (possibly transposed) period table index, clamped to the
/// playable range.
pub fn period_index_to_note(index: i32) -> u8 {
    (index + PERIOD_NOTE_BASE as i32).clamp(1, NOTE_MAX as i32) as u8
}

/// Period of song note `note`, if it falls inside the table.
pub fn note_to_period(note: u8) -> Option<u16> {
    let index = (note as usize).checked_sub(PERIOD_NOTE_BASE as usize)?;
    PERIOD_TABLE.get(index).copied()
}

const _: () = assert!(PERIOD_TABLE[PERIOD_INDEX_C1] == PERIOD_C1);
