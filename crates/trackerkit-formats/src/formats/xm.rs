//! FastTracker 2 extended modules (`.xm`).
//!
//! ## Layout (little-endian)
//!
//! - 0: `"Extended Module: "`, 17: title (20), 37: `0x1A`, 38: tracker name
//! - 58: version (`0x0104`), 60: header size counted from offset 60
//! - 64: song length, restart, channels, patterns, instruments, flags,
//!   speed, bpm, then the 256-entry order table at 80
//! - patterns: `u32` header length, packing type, `u16` rows, `u16` packed size
//! - instruments: `u32` header size, name (22), type, `u16` sample count,
//!   `u32` sample header size, then sample headers (40 bytes) and delta PCM
//!
//! Packed cells start with a byte whose top bit flags which of note,
//! instrument, volume, effect and parameter follow (bits 0..4).

use bitflags::bitflags;
use tracing::warn;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string, read_u8, u16_le, u32_le};
use trackerkit_common::{
    ByteReader, InstrumentKind, NOTE_MAX, NOTE_OFF, Pattern, Pcm, Result, Row, SampleData,
    SongBuilder,
};

use crate::format_id::FormatId;
use crate::formats::{bind_orders, not_recognized, pcm16_le, sample_bytes, title_for};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Header plus order table.
pub const MIN_LEN: usize = 336;

const MAGIC: &[u8; 17] = b"Extended Module: ";
const VERSION: u16 = 0x0104;
const HEADER_BASE: usize = 60;
const PATTERN_HEADER_MIN: usize = 9;
const INSTRUMENT_HEADER_MIN: usize = 29;
const SAMPLE_HEADER_LEN: usize = 40;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Xm,
    detector: Detector::Content(is_xm_format),
    decoder: parse_xm_file,
    min_len: MIN_LEN,
};

bitflags! {
    /// Module header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct XmFlags: u16 {
        /// Linear frequency table instead of Amiga periods.
        const LINEAR_FREQUENCIES = 0x0001;
    }

    /// Sample header type byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct XmSampleType: u8 {
        /// Forward loop.
        const LOOP_FORWARD = 0x01;
        /// Ping-pong loop.
        const LOOP_PINGPONG = 0x02;
        /// 16-bit frames.
        const SIXTEEN_BIT = 0x10;
    }
}

struct Header {
    title: String,
    song_length: usize,
    restart: usize,
    channels: usize,
    patterns: usize,
    instruments: usize,
    flags: XmFlags,
    speed: u16,
    bpm: u16,
    first_pattern: usize,
}

struct PatternSpan {
    rows: usize,
    start: usize,
    packed: usize,
}

fn read_header(data: &[u8]) -> Option<Header> {
    if data.len() < MIN_LEN || !magic_at(data, 0, MAGIC) || read_u8(data, 37) != 0x1A {
        return None;
    }
    if u16_le(data, 58) != VERSION {
        return None;
    }
    let header_size = u32_le(data, 60) as usize;
    let song_length = u16_le(data, 64) as usize;
    let channels = u16_le(data, 68) as usize;
    let patterns = u16_le(data, 70) as usize;
    let instruments = u16_le(data, 72) as usize;
    if header_size < 20
        || !(1..=32).contains(&channels)
        || patterns > 256
        || instruments > 128
        || !(1..=256).contains(&song_length)
    {
        return None;
    }
    let first_pattern = HEADER_BASE.checked_add(header_size)?;
    if first_pattern > data.len() {
        return None;
    }
    Some(Header {
        title: clean_title(&read_fixed_string(data, 17, 20)),
        song_length,
        restart: u16_le(data, 66) as usize,
        channels,
        patterns,
        instruments,
        flags: XmFlags::from_bits_truncate(u16_le(data, 74)),
        speed: u16_le(data, 76),
        bpm: u16_le(data, 78),
        first_pattern,
    })
}

/// Walk the pattern headers; `None` if any pattern leaves the buffer.
fn pattern_spans(data: &[u8], header: &Header) -> Option<(Vec<PatternSpan>, usize)> {
    let mut spans = Vec::with_capacity(header.patterns);
    let mut pos = header.first_pattern;
    for _ in 0..header.patterns {
        if pos.checked_add(PATTERN_HEADER_MIN)? > data.len() {
            return None;
        }
        let header_len = u32_le(data, pos) as usize;
        let rows = u16_le(data, pos + 5) as usize;
        let packed = u16_le(data, pos + 7) as usize;
        if header_len < PATTERN_HEADER_MIN || !(1..=256).contains(&rows) {
            return None;
        }
        let start = pos.checked_add(header_len)?;
        let end = start.checked_add(packed)?;
        if end > data.len() {
            return None;
        }
        spans.push(PatternSpan {
            rows,
            start,
            packed,
        });
        pos = end;
    }
    Some((spans, pos))
}

/// Check whether `data` is a FastTracker 2 module.
pub fn is_xm_format(data: &[u8]) -> bool {
    read_header(data)
        .and_then(|header| pattern_spans(data, &header))
        .is_some()
}

/// Decode a FastTracker 2 module.
pub fn parse_xm_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let Some((header, (spans, instruments_at))) =
        read_header(data).and_then(|h| pattern_spans(data, &h).map(|spans| (h, spans)))
    else {
        return Err(not_recognized(FormatId::Xm));
    };

    let title = title_for(FormatId::Xm, Some(&header.title), filename);
    let mut builder = SongBuilder::new(FormatId::Xm.tag(), FormatId::Xm.family(), header.channels)
        .name(title)
        .speed(header.speed.min(u8::MAX as u16) as u8)
        .bpm(header.bpm)
        .linear_periods(header.flags.contains(XmFlags::LINEAR_FREQUENCIES))
        .restart(header.restart);

    for (index, span) in spans.iter().enumerate() {
        let mut pattern = builder.empty_pattern(span.rows);
        unpack_pattern(&data[span.start..span.start + span.packed], &mut pattern, index);
        builder.push_pattern(pattern);
    }

    read_instruments(data, instruments_at, header.instruments, &mut builder);

    let orders: Vec<u16> = (0..header.song_length)
        .map(|i| read_u8(data, 80 + i) as u16)
        .collect();
    let orders = bind_orders(&mut builder, &orders, 64);
    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}

fn unpack_pattern(packed: &[u8], pattern: &mut Pattern, index: usize) {
    if packed.is_empty() {
        return;
    }
    let mut reader = ByteReader::new(packed, FormatId::Xm.tag());
    for row in 0..pattern.length {
        for channel in pattern.channels.iter_mut() {
            match unpack_cell(&mut reader) {
                Ok(cell) => channel.rows[row] = cell,
                Err(_) => {
                    warn!(pattern = index, row, "packed pattern data ends early");
                    return;
                }
            }
        }
    }
}

fn unpack_cell(reader: &mut ByteReader<'_>) -> Result<Row> {
    let first = reader.u8()?;
    let (note, instrument, volume, effect, param) = if first & 0x80 != 0 {
        let mut field = |bit: u8| -> Result<u8> {
            if first & bit != 0 { reader.u8() } else { Ok(0) }
        };
        (field(0x01)?, field(0x02)?, field(0x04)?, field(0x08)?, field(0x10)?)
    } else {
        (first, reader.u8()?, reader.u8()?, reader.u8()?, reader.u8()?)
    };
    Ok(Row {
        note: match note {
            1..=NOTE_MAX => note,
            NOTE_OFF => NOTE_OFF,
            _ => 0,
        },
        instrument,
        volume,
        effect,
        param,
        ..Row::default()
    })
}

fn read_instruments(data: &[u8], mut pos: usize, count: usize, builder: &mut SongBuilder) {
    for index in 0..count {
        if pos.saturating_add(INSTRUMENT_HEADER_MIN) > data.len() {
            warn!(instrument = index + 1, "instrument table truncated");
            return;
        }
        let header_size = u32_le(data, pos) as usize;
        let name = clean_title(&read_fixed_string(data, pos + 4, 22));
        let samples = if header_size >= INSTRUMENT_HEADER_MIN {
            u16_le(data, pos + 27) as usize
        } else {
            0
        };
        if samples == 0 {
            builder.push_instrument(name, InstrumentKind::Placeholder);
            pos = pos.saturating_add(header_size.max(4));
            continue;
        }

        let sample_header_len = match u32_le(data, pos + 29) as usize {
            0 => SAMPLE_HEADER_LEN,
            len => len,
        };
        let headers_at = pos.saturating_add(header_size);
        let mut lengths = Vec::with_capacity(samples);
        let mut first = None;
        for s in 0..samples {
            let at = headers_at.saturating_add(s.saturating_mul(sample_header_len));
            if at.saturating_add(SAMPLE_HEADER_LEN) > data.len() {
                break;
            }
            lengths.push(u32_le(data, at) as usize);
            if s == 0 {
                first = Some(at);
            }
        }

        let body_at = headers_at.saturating_add(samples.saturating_mul(sample_header_len));
        let kind = match first {
            Some(at) => {
                InstrumentKind::Sample(read_sample(data, at, body_at, lengths[0], index))
            }
            None => {
                warn!(instrument = index + 1, "sample headers truncated");
                InstrumentKind::Placeholder
            }
        };
        builder.push_instrument(name, kind);
        pos = lengths.iter().fold(body_at, |p, &len| p.saturating_add(len));
    }
}

fn read_sample(data: &[u8], header: usize, body: usize, length: usize, index: usize) -> SampleData {
    let kind = XmSampleType::from_bits_truncate(read_u8(data, header + 14));
    let bytes = sample_bytes(FormatId::Xm, data, body, length, index);
    let (pcm, width) = if kind.contains(XmSampleType::SIXTEEN_BIT) {
        (Pcm::Sixteen(delta16(bytes)), 2)
    } else {
        (Pcm::Eight(delta8(bytes)), 1)
    };

    let mut sample = SampleData {
        pcm,
        loop_start: 0,
        loop_length: 0,
        volume: read_u8(data, header + 12).min(64),
        finetune: read_u8(data, header + 13) as i8,
        relative_note: read_u8(data, header + 16) as i8,
    };
    if kind.intersects(XmSampleType::LOOP_FORWARD | XmSampleType::LOOP_PINGPONG) {
        sample = sample.with_loop(
            u32_le(data, header + 4) / width,
            u32_le(data, header + 8) / width,
        );
    }
    sample
}

fn delta8(bytes: &[u8]) -> Vec<i8> {
    let mut acc = 0i8;
    bytes
        .iter()
        .map(|&b| {
            acc = acc.wrapping_add(b as i8);
            acc
        })
        .collect()
}

fn delta16(bytes: &[u8]) -> Vec<i16> {
    let mut acc = 0i16;
    pcm16_le(bytes)
        .into_iter()
        .map(|delta| {
            acc = acc.wrapping_add(delta);
            acc
        })
        .collect()
}
