//! ChipTracker (`KRIS`) modules.
//!
//! The header mirrors ProTracker up to the magic: a 22-byte title and 31
//! sample headers, then `"KRIS"`@952, song length @956 and restart @957.
//! Each of the 128 positions lists four `(track, transpose)` byte pairs.
//! Tracks are 64 rows of `note, instrument, effect, param` starting at 1984;
//! sample bodies follow the highest track in use.

use std::collections::HashMap;

use tracing::debug;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string, read_u8};
use trackerkit_common::{Result, Row, SongBuilder};

use crate::format_id::FormatId;
use crate::formats::protracker::{ModSample, SAMPLE_HEADER_LEN, SAMPLES};
use crate::formats::{not_recognized, sample_bytes, title_for};
use crate::notes::period_index_to_note;
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Files must be strictly longer than this.
pub const MIN_LEN: usize = 2240;

const MAGIC_AT: usize = 952;
const SONG_LENGTH_AT: usize = 956;
const POSITIONS_AT: usize = 958;
const TRACKS_AT: usize = 1984;
const TRACK_LEN: usize = 256;
const VOICES: usize = 4;
const ROWS: usize = 64;
const EMPTY_NOTE: u8 = 0xA8;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::ChipTracker,
    detector: Detector::Content(is_chiptracker_format),
    decoder: parse_chiptracker_file,
    min_len: MIN_LEN + 1,
};

/// Track and transpose per voice at one song position.
type Position = [(u8, i8); VOICES];

fn positions(data: &[u8], song_length: usize) -> Vec<Position> {
    (0..song_length)
        .map(|position| {
            let base = POSITIONS_AT + position * VOICES * 2;
            std::array::from_fn(|voice| {
                let at = base + voice * 2;
                (read_u8(data, at), read_u8(data, at + 1) as i8)
            })
        })
        .collect()
}

fn song_length(data: &[u8]) -> Option<usize> {
    if data.len() <= MIN_LEN || !magic_at(data, MAGIC_AT, b"KRIS") {
        return None;
    }
    let length = read_u8(data, SONG_LENGTH_AT) as usize;
    (1..=128).contains(&length).then_some(length)
}

fn highest_track(positions: &[Position]) -> usize {
    positions
        .iter()
        .flat_map(|position| position.iter().map(|&(track, _)| track as usize))
        .max()
        .unwrap_or(0)
}

fn tracks_end(highest: usize) -> usize {
    TRACKS_AT + (highest + 1) * TRACK_LEN
}

/// Check whether `data` is a ChipTracker module.
pub fn is_chiptracker_format(data: &[u8]) -> bool {
    song_length(data)
        .map(|length| tracks_end(highest_track(&positions(data, length))) <= data.len())
        .unwrap_or(false)
}

fn transposed_note(raw: u8, transpose: i8) -> u8 {
    if raw == EMPTY_NOTE {
        0
    } else {
        period_index_to_note(raw as i32 / 2 + transpose as i32)
    }
}

fn read_track_row(data: &[u8], track: u8, row: usize, transpose: i8) -> Row {
    let at = TRACKS_AT + track as usize * TRACK_LEN + row * 4;
    Row {
        note: transposed_note(data[at], transpose),
        instrument: data[at + 1],
        effect: data[at + 2] & 0x0F,
        param: data[at + 3],
        ..Row::default()
    }
}

/// Decode a ChipTracker module.
pub fn parse_chiptracker_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let id = FormatId::ChipTracker;
    let Some(length) = song_length(data) else {
        return Err(not_recognized(id));
    };
    let positions = positions(data, length);
    let highest = highest_track(&positions);
    if tracks_end(highest) > data.len() {
        return Err(not_recognized(id));
    }

    let title = clean_title(&read_fixed_string(data, 0, 22));
    let mut builder = SongBuilder::new(id.tag(), id.family(), VOICES)
        .name(title_for(id, Some(&title), filename))
        .restart(read_u8(data, SONG_LENGTH_AT + 1) as usize);

    // Positions sharing the same tracks and transposes share a pattern.
    let mut seen: HashMap<Position, u16> = HashMap::new();
    let mut orders = Vec::with_capacity(positions.len());
    for position in &positions {
        if let Some(&index) = seen.get(position) {
            orders.push(index);
            continue;
        }
        let mut pattern = builder.empty_pattern(ROWS);
        for (channel, &(track, transpose)) in pattern.channels.iter_mut().zip(position) {
            for (row, cell) in channel.rows.iter_mut().enumerate() {
                *cell = read_track_row(data, track, row, transpose);
            }
        }
        let index = builder.push_pattern(pattern);
        seen.insert(*position, index);
        orders.push(index);
    }
    debug!(positions = positions.len(), patterns = seen.len(), "chiptracker positions folded");

    let mut offset = tracks_end(highest);
    for index in 0..SAMPLES {
        let sample = ModSample::read(data, 22 + index * SAMPLE_HEADER_LEN);
        let body = sample_bytes(id, data, offset, sample.length, index + 1);
        builder.push_instrument(sample.name.clone(), sample.instrument(body));
        offset = offset.saturating_add(sample.length);
    }

    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}
