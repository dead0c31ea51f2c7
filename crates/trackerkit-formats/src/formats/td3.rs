//! Behringer TD-3 pattern dumps (146 bytes).
//!
//! Every value is stored as nibble pairs: the first byte carries the high
//! nibble, the second the low nibble.
//!
//! | offset | field                                   |
//! |--------|-----------------------------------------|
//! | 0x00   | `23 98 54 76`                           |
//! | 0x08   | `"TD-3"` in UTF-16BE                    |
//! | 0x24   | 16 pitches (2 bytes each, bit 7 = +1 octave) |
//! | 0x44   | 16 accent flags (2 bytes each)          |
//! | 0x64   | 16 slide flags (2 bytes each)           |
//! | 0x84   | triplet mode                            |
//! | 0x86   | step count, 1..=16                      |
//! | 0x8A   | tie flags (4 bytes, LSB-first)          |
//! | 0x8E   | rest flags (4 bytes, LSB-first)         |
//!
//! A set rest bit silences the step. A set tie bit holds the previous note
//! through the step without retriggering. A slide flag glides from its step
//! into the next played note.
//!
//! The rest and tie polarities are inferred from captured dumps, not from
//! vendor documentation. Check them against new reference files before
//! relying on them.

use trackerkit_common::reader::{
    flag_at, magic_at, nibble_byte, nibble_flags16, read_fixed_string_utf16be, window,
};
use trackerkit_common::{InstrumentKind, NOTE_MAX, NOTE_OFF, Result, Row, SongBuilder};

use crate::format_id::FormatId;
use crate::formats::{not_recognized, title_for};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Size of a pattern dump.
pub const MIN_LEN: usize = 146;

const MAGIC: [u8; 4] = [0x23, 0x98, 0x54, 0x76];
const PITCH_AT: usize = 0x24;
const ACCENT_AT: usize = 0x44;
const SLIDE_AT: usize = 0x64;
const TRIPLET_AT: usize = 0x84;
const STEPS_AT: usize = 0x86;
const TIE_AT: usize = 0x8A;
const REST_AT: usize = 0x8E;
const MAX_STEPS: usize = 16;

const ACCENT_VOLUME: u8 = 0x50;
const NORMAL_VOLUME: u8 = 0x38;
const TONE_PORTAMENTO: u8 = 0x03;
const SLIDE_SPEED: u8 = 0x20;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Td3,
    detector: Detector::Content(is_td3_format),
    decoder: parse_td3_file,
    min_len: MIN_LEN,
};

/// Decoded step grid before conversion to rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Td3Pattern {
    /// Played steps, 1..=16.
    pub steps: usize,
    /// Raw pitch value per step (bit 7 = upper octave).
    pub pitches: [u8; MAX_STEPS],
    /// Accent per step.
    pub accents: [bool; MAX_STEPS],
    /// Slide per step.
    pub slides: [bool; MAX_STEPS],
    /// Tie flags, bit i = step i.
    pub ties: u16,
    /// Rest flags, bit i = step i.
    pub rests: u16,
    /// Triplet timing.
    pub triplets: bool,
}

fn pair(data: &[u8], offset: usize) -> u8 {
    match window(data, offset, 2) {
        Some(bytes) => nibble_byte(bytes[0], bytes[1]),
        None => 0,
    }
}

fn step_count(data: &[u8]) -> usize {
    pair(data, STEPS_AT) as usize
}

/// Check whether `data` is a TD-3 pattern dump.
pub fn is_td3_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN
        && magic_at(data, 0, &MAGIC)
        && read_fixed_string_utf16be(data, 8, 4) == "TD-3"
        && (1..=MAX_STEPS).contains(&step_count(data))
}

/// Read the step grid of a pattern dump the detector accepted.
pub fn read_td3_pattern(data: &[u8]) -> Option<Td3Pattern> {
    if !is_td3_format(data) {
        return None;
    }
    let mut pattern = Td3Pattern {
        steps: step_count(data),
        pitches: [0; MAX_STEPS],
        accents: [false; MAX_STEPS],
        slides: [false; MAX_STEPS],
        ties: nibble_flags16(window(data, TIE_AT, 4)?),
        rests: nibble_flags16(window(data, REST_AT, 4)?),
        triplets: pair(data, TRIPLET_AT) != 0,
    };
    for step in 0..MAX_STEPS {
        pattern.pitches[step] = pair(data, PITCH_AT + step * 2);
        pattern.accents[step] = pair(data, ACCENT_AT + step * 2) != 0;
        pattern.slides[step] = pair(data, SLIDE_AT + step * 2) != 0;
    }
    Some(pattern)
}

/// Song note for a raw pitch value.
fn pitch_to_note(pitch: u8) -> u8 {
    let octave_up = if pitch & 0x80 != 0 { 12 } else { 0 };
    ((pitch & 0x7F) as u16 + 1 + octave_up).min(NOTE_MAX as u16) as u8
}

/// Decode a TD-3 pattern into a one-channel song.
pub fn parse_td3_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let Some(steps) = read_td3_pattern(data) else {
        return Err(not_recognized(FormatId::Td3));
    };

    let id = FormatId::Td3;
    let mut builder = SongBuilder::new(id.tag(), id.family(), 1)
        .name(title_for(id, None, filename))
        .speed(if steps.triplets { 4 } else { 6 });
    let instrument = builder.push_instrument("TD-3", InstrumentKind::Placeholder);

    let mut pattern = builder.empty_pattern(steps.steps);
    let channel = &mut pattern.channels[0];
    channel.instrument_id = Some(instrument);

    let mut sounding = false;
    let mut glide = false;
    for (step, row) in channel.rows.iter_mut().enumerate() {
        if flag_at(steps.rests, step) {
            if sounding {
                row.note = NOTE_OFF;
            }
            sounding = false;
            glide = false;
            continue;
        }
        if flag_at(steps.ties, step) && sounding {
            continue;
        }
        *row = Row {
            note: pitch_to_note(steps.pitches[step]),
            instrument: instrument as u8,
            volume: if steps.accents[step] {
                ACCENT_VOLUME
            } else {
                NORMAL_VOLUME
            },
            ..Row::default()
        };
        if glide {
            row.effect = TONE_PORTAMENTO;
            row.param = SLIDE_SPEED;
        }
        sounding = true;
        glide = steps.slides[step];
    }

    builder.push_pattern(pattern);
    Ok(DecodeOutcome::Song(builder.order(vec![0]).finish()?))
}
