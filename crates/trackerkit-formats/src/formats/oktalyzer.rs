//! Oktalyzer modules (`OKTASONG`).
//!
//! An IFF-like stream of big-endian chunks after the 8-byte magic: `CMOD`
//! (four channel split flags), `SAMP` (32-byte sample entries), `SPEE`,
//! `SLEN` (pattern count), `PLEN` (song length), `PATT` (order list), one
//! `PBOD` per pattern and one `SBOD` per non-empty sample.

use tracing::warn;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string, u16_be, u32_be};
use trackerkit_common::{InstrumentKind, Result, Row, SampleData, SongBuilder, amiga_pan};

use crate::format_id::FormatId;
use crate::formats::{bind_orders, not_recognized, pcm8, sample_bytes, title_for};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Magic plus a complete `CMOD` chunk.
pub const MIN_LEN: usize = 24;

const MAGIC: &[u8; 8] = b"OKTASONG";
const SAMPLE_ENTRY_LEN: usize = 32;
const CELL_LEN: usize = 4;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Oktalyzer,
    detector: Detector::Content(is_oktalyzer_format),
    decoder: parse_oktalyzer_file,
    min_len: MIN_LEN,
};

#[derive(Debug, Clone, Copy)]
struct Chunk {
    id: [u8; 4],
    start: usize,
    size: usize,
}

struct Layout {
    splits: [bool; 4],
    samples: Option<Chunk>,
    speed: u16,
    song_length: usize,
    orders: Chunk,
    bodies: Vec<Chunk>,
    sample_bodies: Vec<Chunk>,
}

impl Layout {
    fn channels(&self) -> usize {
        4 + self.splits.iter().filter(|&&s| s).count()
    }
}

/// Walk all chunks. Only `SBOD` chunks may run past the end of the buffer.
fn chunks(data: &[u8]) -> Option<Vec<Chunk>> {
    let mut found = Vec::new();
    let mut pos = MAGIC.len();
    while pos.checked_add(8)? <= data.len() {
        let id = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
        let size = u32_be(data, pos + 4) as usize;
        let start = pos + 8;
        let end = start.checked_add(size)?;
        if end > data.len() && &id != b"SBOD" {
            return None;
        }
        found.push(Chunk { id, start, size });
        pos = end;
    }
    Some(found)
}

fn layout(data: &[u8]) -> Option<Layout> {
    if data.len() < MIN_LEN || !magic_at(data, 0, MAGIC) {
        return None;
    }
    let chunks = chunks(data)?;
    let cmod = chunks.first().filter(|c| &c.id == b"CMOD" && c.size == 8)?;
    let find = |id: &[u8; 4]| chunks.iter().find(|c| &c.id == id).copied();

    let speed = find(b"SPEE").filter(|c| c.size >= 2)?;
    let slen = find(b"SLEN").filter(|c| c.size >= 2)?;
    let plen = find(b"PLEN").filter(|c| c.size >= 2)?;
    let orders = find(b"PATT")?;

    let pattern_count = u16_be(data, slen.start) as usize;
    let song_length = u16_be(data, plen.start) as usize;
    if !(1..=128).contains(&song_length) || orders.size < song_length || pattern_count == 0 {
        return None;
    }

    let mut splits = [false; 4];
    for (voice, split) in splits.iter_mut().enumerate() {
        *split = u16_be(data, cmod.start + voice * 2) != 0;
    }
    let channels = 4 + splits.iter().filter(|&&s| s).count();

    let bodies: Vec<Chunk> = chunks
        .iter()
        .filter(|c| &c.id == b"PBOD")
        .take(pattern_count)
        .copied()
        .collect();
    if bodies.len() < pattern_count {
        return None;
    }
    for body in &bodies {
        let rows = u16_be(data, body.start) as usize;
        if !(1..=128).contains(&rows) || body.size < 2 + rows * channels * CELL_LEN {
            return None;
        }
    }

    Some(Layout {
        splits,
        samples: find(b"SAMP"),
        speed: u16_be(data, speed.start),
        song_length,
        orders,
        bodies,
        sample_bodies: chunks.iter().filter(|c| &c.id == b"SBOD").copied().collect(),
    })
}

/// Check whether `data` is an Oktalyzer module.
pub fn is_oktalyzer_format(data: &[u8]) -> bool {
    layout(data).is_some()
}

/// Decode an Oktalyzer module.
pub fn parse_oktalyzer_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let Some(layout) = layout(data) else {
        return Err(not_recognized(FormatId::Oktalyzer));
    };

    let mut pans = Vec::with_capacity(8);
    for (voice, &split) in layout.splits.iter().enumerate() {
        pans.push(amiga_pan(voice));
        if split {
            pans.push(amiga_pan(voice));
        }
    }

    let channels = layout.channels();
    let id = FormatId::Oktalyzer;
    let mut builder = SongBuilder::new(id.tag(), id.family(), channels)
        .name(title_for(FormatId::Oktalyzer, None, filename))
        .speed(layout.speed.min(u8::MAX as u16) as u8)
        .pans(pans);

    for body in &layout.bodies {
        let rows = u16_be(data, body.start) as usize;
        let mut pattern = builder.empty_pattern(rows);
        for row in 0..rows {
            for (ch, channel) in pattern.channels.iter_mut().enumerate() {
                let at = body.start + 2 + (row * channels + ch) * CELL_LEN;
                channel.rows[row] = decode_cell(&data[at..at + CELL_LEN]);
            }
        }
        builder.push_pattern(pattern);
    }

    read_samples(data, &layout, &mut builder);

    let orders: Vec<u16> = data[layout.orders.start..layout.orders.start + layout.song_length]
        .iter()
        .map(|&o| o as u16)
        .collect();
    let orders = bind_orders(&mut builder, &orders, 64);
    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}

fn decode_cell(cell: &[u8]) -> Row {
    let (note, sample, command, param) = (cell[0], cell[1], cell[2], cell[3]);
    let (effect, param) = map_effect(command, param);
    let playable = (1..=36).contains(&note);
    Row {
        // Oktalyzer note 1 is ProTracker C-1.
        note: if playable { note + 36 } else { 0 },
        instrument: if playable { sample.saturating_add(1) } else { 0 },
        effect,
        param,
        ..Row::default()
    }
}

/// Translate an Oktalyzer command into ProTracker numbering.
fn map_effect(command: u8, param: u8) -> (u8, u8) {
    match command {
        // Period slides: a falling period raises the pitch.
        1 => (0x1, param),
        2 => (0x2, param),
        10..=12 => (0x0, param),
        15 => (0xE, param & 0x0F),
        25 => (0xB, param),
        28 => (0xF, param),
        31 => match param {
            0..=0x40 => (0xC, param),
            0x41..=0x50 => (0xA, (param - 0x40).min(0xF)),
            0x51..=0x60 => (0xA, (param - 0x50).min(0xF) << 4),
            0x61..=0x70 => (0xE, 0xB0 | (param - 0x60).min(0xF)),
            0x71..=0x80 => (0xE, 0xA0 | (param - 0x70).min(0xF)),
            _ => (0, 0),
        },
        _ => (0, 0),
    }
}

fn read_samples(data: &[u8], layout: &Layout, builder: &mut SongBuilder) {
    let Some(table) = layout.samples else {
        return;
    };
    let mut bodies = layout.sample_bodies.iter();
    for index in 0..table.size / SAMPLE_ENTRY_LEN {
        let at = table.start + index * SAMPLE_ENTRY_LEN;
        let name = clean_title(&read_fixed_string(data, at, 20));
        let length = u32_be(data, at + 20) as usize;
        if length == 0 {
            builder.push_instrument(name, InstrumentKind::Placeholder);
            continue;
        }
        let Some(body) = bodies.next() else {
            warn!(sample = index + 1, "sample body missing");
            builder.push_instrument(name, InstrumentKind::Placeholder);
            continue;
        };
        let bytes = sample_bytes(FormatId::Oktalyzer, data, body.start, length.min(body.size), index);
        let mut sample = SampleData::pcm8(pcm8(bytes));
        sample.volume = data[at + 29].min(64);
        let repeat_words = u16_be(data, at + 26) as u32;
        if repeat_words > 1 {
            sample = sample.with_loop(u16_be(data, at + 24) as u32 * 2, repeat_words * 2);
        }
        builder.push_instrument(name, InstrumentKind::Sample(sample));
    }
}
