//! Imago Orpheus modules (`.imf`).
//!
//! ## Layout (little-endian)
//!
//! - 0x000: title (32), order count, pattern count, instrument count, flags
//! - 0x030: tempo, bpm, master volume, amplification
//! - 0x03C: `"IM10"`
//! - 0x040: 32 channel records of 16 bytes (name, chorus, reverb, pan, status)
//! - 0x240: 256-entry order list
//! - 0x340: patterns, each `u16` byte length (including its 4-byte header),
//!   `u16` rows, then packed rows
//! - instruments: 384-byte `"II10"` records, each followed by 64-byte
//!   `"IS10"` sample headers with their PCM
//!
//! Packed rows are a stream of mask bytes: `0` ends the row, the low five
//! bits select the channel, `0x20` adds note and instrument, `0x40` the first
//! effect and `0x80` the second.

use bitflags::bitflags;
use nom::IResult;
use nom::bytes::complete::{tag, take};
use nom::multi::count;
use nom::number::complete::{le_u8, le_u16};
use nom::sequence::tuple;
use tracing::warn;
use trackerkit_common::reader::{clean_title, magic_at, read_fixed_string, read_u8, u16_le, u32_le};
use trackerkit_common::{
    ByteReader, InstrumentKind, NOTE_MAX, NOTE_OFF, Pattern, Pcm, Result, Row, SampleData,
    SongBuilder,
};

use crate::format_id::FormatId;
use crate::formats::{bind_orders, not_recognized, pcm8, pcm16_le, sample_bytes, title_for};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Header including the channel table.
pub const MIN_LEN: usize = 576;

const ORDERS_AT: usize = 0x240;
const PATTERNS_AT: usize = 0x340;
const CHANNELS: usize = 32;
const INSTRUMENT_LEN: usize = 384;
const SAMPLE_HEADER_LEN: usize = 64;
const KEY_OFF: u8 = 0xA0;
const EMPTY_NOTE: u8 = 0xFF;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Imf,
    detector: Detector::Content(is_imf_format),
    decoder: parse_imf_file,
    min_len: MIN_LEN,
};

bitflags! {
    /// Song flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImfFlags: u16 {
        /// Linear frequency table.
        const LINEAR_SLIDES = 0x0001;
    }

    /// Sample header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImfSampleFlags: u8 {
        /// Forward loop.
        const LOOP = 0x01;
        /// Ping-pong loop.
        const PINGPONG = 0x02;
        /// 16-bit frames.
        const SIXTEEN_BIT = 0x04;
        /// Sample carries a default pan.
        const PANNING = 0x08;
    }
}

/// Channel record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Plays.
    Enabled,
    /// Present but muted.
    Muted,
    /// Not part of the song.
    Disabled,
}

#[derive(Debug, Clone)]
struct ChannelRecord {
    name: String,
    pan: u8,
    status: ChannelStatus,
}

#[derive(Debug, Clone)]
struct Header {
    title: String,
    order_count: usize,
    pattern_count: usize,
    instrument_count: usize,
    flags: ImfFlags,
    tempo: u8,
    bpm: u8,
    master: u8,
    channels: Vec<ChannelRecord>,
}

fn channel_record(input: &[u8]) -> IResult<&[u8], Option<ChannelRecord>> {
    let (input, (name, _chorus, _reverb, pan, status)) =
        tuple((take(12usize), le_u8, le_u8, le_u8, le_u8))(input)?;
    let status = match status {
        0 => ChannelStatus::Enabled,
        1 => ChannelStatus::Muted,
        2 => ChannelStatus::Disabled,
        _ => return Ok((input, None)),
    };
    let name = clean_title(&read_fixed_string(name, 0, 12));
    Ok((input, Some(ChannelRecord { name, pan, status })))
}

fn header_record(input: &[u8]) -> IResult<&[u8], Option<Header>> {
    let (input, title) = take(32usize)(input)?;
    let (input, (orders, patterns, instruments, flags)) =
        tuple((le_u16, le_u16, le_u16, le_u16))(input)?;
    let (input, _) = take(8usize)(input)?;
    let (input, (tempo, bpm, master, _amp)) = tuple((le_u8, le_u8, le_u8, le_u8))(input)?;
    let (input, _) = take(8usize)(input)?;
    let (input, _) = tag(&b"IM10"[..])(input)?;
    let (input, channels) = count(channel_record, CHANNELS)(input)?;

    let channels: Option<Vec<ChannelRecord>> = channels.into_iter().collect();
    Ok((
        input,
        channels.map(|channels| Header {
            title: clean_title(&read_fixed_string(title, 0, 32)),
            order_count: orders as usize,
            pattern_count: patterns as usize,
            instrument_count: instruments as usize,
            flags: ImfFlags::from_bits_truncate(flags),
            tempo,
            bpm,
            master,
            channels,
        }),
    ))
}

fn read_header(data: &[u8]) -> Option<Header> {
    if data.len() < MIN_LEN || !magic_at(data, 60, b"IM10") {
        return None;
    }
    let (_, header) = header_record(data).ok()?;
    let header = header?;
    let valid = header.order_count <= 256
        && header.pattern_count <= 256
        && header.instrument_count <= 255
        && header.tempo >= 1
        && header.bpm >= 32
        && header.master <= 64
        && header.channel_count() > 0;
    valid.then_some(header)
}

impl Header {
    fn channel_count(&self) -> usize {
        self.channels
            .iter()
            .rposition(|c| c.status != ChannelStatus::Disabled)
            .map_or(0, |last| last + 1)
    }
}

/// Byte ranges of pattern bodies plus the offset after the last one.
fn pattern_spans(data: &[u8], header: &Header) -> Option<(Vec<(usize, usize, usize)>, usize)> {
    if header.pattern_count == 0 {
        return (ORDERS_AT + header.order_count <= data.len()).then(|| (Vec::new(), data.len()));
    }
    let mut spans = Vec::with_capacity(header.pattern_count);
    let mut pos = PATTERNS_AT;
    for _ in 0..header.pattern_count {
        if pos + 4 > data.len() {
            return None;
        }
        let length = u16_le(data, pos) as usize;
        let rows = u16_le(data, pos + 2) as usize;
        if length < 4 || !(1..=256).contains(&rows) || pos + length > data.len() {
            return None;
        }
        spans.push((rows, pos + 4, pos + length));
        pos += length;
    }
    Some((spans, pos))
}

/// Check whether `data` is an Imago Orpheus module.
pub fn is_imf_format(data: &[u8]) -> bool {
    read_header(data)
        .and_then(|header| pattern_spans(data, &header))
        .is_some()
}

/// Decode an Imago Orpheus module.
pub fn parse_imf_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let Some((header, (spans, instruments_at))) =
        read_header(data).and_then(|h| pattern_spans(data, &h).map(|spans| (h, spans)))
    else {
        return Err(not_recognized(FormatId::Imf));
    };

    let id = FormatId::Imf;
    let channels = header.channel_count();
    let pans = header.channels[..channels]
        .iter()
        .map(|c| ((c.pan as i32 * 200) / 255 - 100) as i8)
        .collect();
    let mut builder = SongBuilder::new(id.tag(), id.family(), channels)
        .name(title_for(id, Some(&header.title), filename))
        .speed(header.tempo)
        .bpm(header.bpm as u16)
        .linear_periods(header.flags.contains(ImfFlags::LINEAR_SLIDES))
        .pans(pans);

    for (index, &(rows, start, end)) in spans.iter().enumerate() {
        let mut pattern = builder.empty_pattern(rows);
        for (channel, record) in pattern.channels.iter_mut().zip(&header.channels) {
            channel.muted = record.status != ChannelStatus::Enabled;
            if !record.name.is_empty() {
                channel.name = record.name.clone();
            }
        }
        unpack_pattern(&data[start..end], &mut pattern, index);
        builder.push_pattern(pattern);
    }

    read_instruments(data, instruments_at, header.instrument_count, &mut builder);

    // 0xFF entries mark unused order slots.
    let orders: Vec<u16> = (0..header.order_count)
        .map(|i| read_u8(data, ORDERS_AT + i))
        .filter(|&o| o != 0xFF)
        .map(u16::from)
        .collect();
    let orders = if orders.is_empty() { vec![0] } else { orders };
    let orders = bind_orders(&mut builder, &orders, 64);
    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}

fn unpack_pattern(packed: &[u8], pattern: &mut Pattern, index: usize) {
    let mut reader = ByteReader::new(packed, FormatId::Imf.tag());
    let mut row = 0;
    while row < pattern.length {
        let Ok(mask) = reader.u8() else {
            warn!(pattern = index, row, "pattern data ends early");
            return;
        };
        if mask == 0 {
            row += 1;
            continue;
        }
        match read_cell(&mut reader, mask) {
            Ok(cell) => {
                if let Some(channel) = pattern.channels.get_mut((mask & 0x1F) as usize) {
                    channel.rows[row] = cell;
                }
            }
            Err(_) => {
                warn!(pattern = index, row, "pattern data ends early");
                return;
            }
        }
    }
}

fn read_cell(reader: &mut ByteReader<'_>, mask: u8) -> Result<Row> {
    let mut cell = Row::default();
    if mask & 0x20 != 0 {
        cell.note = map_note(reader.u8()?);
        cell.instrument = reader.u8()?;
    }
    if mask & 0x40 != 0 {
        let (command, param) = (reader.u8()?, reader.u8()?);
        (cell.effect, cell.param) = map_effect(command, param);
    }
    if mask & 0x80 != 0 {
        let (command, param) = (reader.u8()?, reader.u8()?);
        (cell.effect2, cell.param2) = map_effect(command, param);
    }
    Ok(cell)
}

/// Octave in the high nibble, semitone in the low one.
fn map_note(raw: u8) -> u8 {
    match raw {
        KEY_OFF => NOTE_OFF,
        EMPTY_NOTE => 0,
        _ => {
            let note = (raw >> 4) as u16 * 12 + (raw & 0x0F) as u16 + 13;
            if (raw & 0x0F) < 12 && note <= NOTE_MAX as u16 {
                note as u8
            } else {
                0
            }
        }
    }
}

/// Translate an Orpheus command into FastTracker 2 numbering.
fn map_effect(command: u8, param: u8) -> (u8, u8) {
    match command {
        0x01 => (0x0F, param.clamp(1, 0x1F)),
        0x02 => (0x0F, param.max(0x20)),
        0x03 => (0x03, param),
        0x04 => (0x05, param),
        0x05 => (0x04, param),
        0x06 => (0x06, param),
        0x08 => (0x07, param),
        0x09 => (0x00, param),
        0x0A => (0x08, param),
        0x0B => (0x19, param),
        0x0C => (0x0C, ((param as u16 + 1) / 4).min(64) as u8),
        0x0D => (0x0A, param),
        0x0E if param >> 4 != 0 => (0x0E, 0xA0 | (param >> 4)),
        0x0E => (0x0E, 0xB0 | (param & 0x0F)),
        0x12 => (0x01, param),
        0x13 => (0x02, param),
        0x14 => (0x0E, 0x10 | (param & 0x0F)),
        0x15 => (0x0E, 0x20 | (param & 0x0F)),
        0x1A => (0x09, param),
        0x1C => (0x14, param),
        0x1D => (0x1B, param),
        0x1E => (0x1D, param),
        0x1F => (0x0B, param),
        0x20 => (0x0D, param),
        0x21 => (0x10, param.min(64)),
        0x22 => (0x11, param),
        _ => (0, 0),
    }
}

fn read_instruments(data: &[u8], mut pos: usize, count: usize, builder: &mut SongBuilder) {
    for index in 0..count {
        if pos + INSTRUMENT_LEN > data.len() || !magic_at(data, pos + 380, b"II10") {
            warn!(instrument = index + 1, "instrument table truncated");
            return;
        }
        let name = clean_title(&read_fixed_string(data, pos, 32));
        let samples = u16_le(data, pos + 378) as usize;
        pos += INSTRUMENT_LEN;

        let mut first = None;
        for s in 0..samples {
            if pos + SAMPLE_HEADER_LEN > data.len() || !magic_at(data, pos + 60, b"IS10") {
                warn!(instrument = index + 1, sample = s, "sample header truncated");
                break;
            }
            let length = u32_le(data, pos + 16) as usize;
            let body = pos + SAMPLE_HEADER_LEN;
            if s == 0 {
                first = Some(read_sample(data, pos, body, length, index));
            }
            pos = body.saturating_add(length);
        }

        let kind = first.map_or(InstrumentKind::Placeholder, InstrumentKind::Sample);
        builder.push_instrument(name, kind);
    }
}

fn read_sample(data: &[u8], header: usize, body: usize, length: usize, index: usize) -> SampleData {
    let flags = ImfSampleFlags::from_bits_truncate(read_u8(data, header + 48));
    let bytes = sample_bytes(FormatId::Imf, data, body, length, index);
    let (pcm, width) = if flags.contains(ImfSampleFlags::SIXTEEN_BIT) {
        (Pcm::Sixteen(pcm16_le(bytes)), 2)
    } else {
        (Pcm::Eight(pcm8(bytes)), 1)
    };
    let mut sample = SampleData::pcm8(Vec::new());
    sample.pcm = pcm;
    sample.volume = read_u8(data, header + 32).min(64);
    if flags.intersects(ImfSampleFlags::LOOP | ImfSampleFlags::PINGPONG) {
        let start = u32_le(data, header + 20) / width;
        let end = u32_le(data, header + 24) / width;
        sample = sample.with_loop(start, end.saturating_sub(start));
    }
    sample
}
