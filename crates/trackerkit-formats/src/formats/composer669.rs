//! Composer 669 and UNIS 669 modules.
//!
//! Eight channels of 64-row patterns with three-byte cells. Each pattern has
//! its own tempo and break row in two 128-byte lists; they are folded into
//! the secondary effect column of channel 0 as `Fxx` and `D00`.

use trackerkit_common::reader::{clean_title, read_fixed_string, read_u8, u32_le, window};
use trackerkit_common::{InstrumentKind, Result, Row, SampleData, SongBuilder};

use crate::format_id::FormatId;
use crate::formats::{bind_orders, not_recognized, sample_bytes, title_for};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed header up to the first sample record.
pub const MIN_LEN: usize = 497;

const MESSAGE_AT: usize = 2;
const LINE_LEN: usize = 36;
const SAMPLE_COUNT_AT: usize = 110;
const PATTERN_COUNT_AT: usize = 111;
const LOOP_ORDER_AT: usize = 112;
const ORDERS_AT: usize = 113;
const TEMPOS_AT: usize = 241;
const BREAKS_AT: usize = 369;
const SAMPLE_RECORD_LEN: usize = 25;
const CHANNELS: usize = 8;
const ROWS: usize = 64;
const PATTERN_LEN: usize = ROWS * CHANNELS * 3;
const END_OF_ORDERS: u8 = 0xFF;
const BPM: u16 = 78;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Composer669,
    detector: Detector::Content(is_669_format),
    decoder: parse_669_file,
    min_len: MIN_LEN,
};

struct Header {
    samples: usize,
    patterns: usize,
}

impl Header {
    fn patterns_at(&self) -> usize {
        MIN_LEN + self.samples * SAMPLE_RECORD_LEN
    }

    fn sample_data_at(&self) -> usize {
        self.patterns_at() + self.patterns * PATTERN_LEN
    }
}

fn read_header(data: &[u8]) -> Option<Header> {
    if data.len() < MIN_LEN || !matches!(window(data, 0, 2)?, b"if" | b"JN") {
        return None;
    }
    let header = Header {
        samples: read_u8(data, SAMPLE_COUNT_AT) as usize,
        patterns: read_u8(data, PATTERN_COUNT_AT) as usize,
    };
    let tempos = window(data, TEMPOS_AT, header.patterns)?;
    let breaks = window(data, BREAKS_AT, header.patterns)?;
    let valid = header.samples <= 64
        && (1..=128).contains(&header.patterns)
        && read_u8(data, LOOP_ORDER_AT) < 128
        && tempos.iter().all(|&t| t <= 15)
        && breaks.iter().all(|&b| (b as usize) < ROWS)
        && header.sample_data_at() <= data.len();
    valid.then_some(header)
}

/// Check whether `data` is a 669 module.
pub fn is_669_format(data: &[u8]) -> bool {
    read_header(data).is_some()
}

fn read_cell(cell: &[u8]) -> Row {
    let mut row = Row::default();
    let [note, instrument_volume, command] = [cell[0], cell[1], cell[2]];
    // 0xFF: empty. 0xFE: volume only.
    if note < 0xFE {
        row.note = (note >> 2) + 25;
        row.instrument = (((note & 0x03) << 4) | (instrument_volume >> 4)) + 1;
    }
    if note <= 0xFE {
        let volume = (instrument_volume & 0x0F) as u16 * 64 / 15;
        row.volume = Row::set_volume(volume as u8);
    }
    if command != 0xFF {
        (row.effect, row.param) = map_effect(command >> 4, command & 0x0F);
    }
    row
}

fn map_effect(command: u8, param: u8) -> (u8, u8) {
    match command {
        0 => (0x01, param),
        1 => (0x02, param),
        2 => (0x03, param),
        3 => (0x0E, 0x10 | param),
        4 => (0x04, 0x80 | param),
        5 => (0x0F, param.max(1)),
        _ => (0, 0),
    }
}

fn message(data: &[u8]) -> (String, String) {
    let lines: Vec<String> = (0..3)
        .map(|line| clean_title(&read_fixed_string(data, MESSAGE_AT + line * LINE_LEN, LINE_LEN)))
        .collect();
    let comment = lines
        .iter()
        .filter(|line| !line.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    (lines[0].clone(), comment)
}

/// Decode a 669 module.
pub fn parse_669_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let id = FormatId::Composer669;
    let Some(header) = read_header(data) else {
        return Err(not_recognized(id));
    };

    let (title, comment) = message(data);
    let orders: Vec<u16> = data[ORDERS_AT..ORDERS_AT + 128]
        .iter()
        .take_while(|&&o| o != END_OF_ORDERS)
        .map(|&o| o as u16)
        .collect();
    let orders = if orders.is_empty() { vec![0] } else { orders };
    let first_tempo = read_u8(data, TEMPOS_AT + orders[0] as usize);

    let pans = (0..CHANNELS).map(|c| if c % 2 == 0 { -62 } else { 62 }).collect();
    let mut builder = SongBuilder::new(id.tag(), id.family(), CHANNELS)
        .name(title_for(id, Some(&title), filename))
        .speed(if (1..=15).contains(&first_tempo) { first_tempo } else { 4 })
        .bpm(BPM)
        .restart(read_u8(data, LOOP_ORDER_AT) as usize)
        .pans(pans);
    if !comment.is_empty() {
        builder = builder.comment(comment);
    }

    for index in 0..header.patterns {
        let mut pattern = builder.empty_pattern(ROWS);
        let base = header.patterns_at() + index * PATTERN_LEN;
        for (voice, channel) in pattern.channels.iter_mut().enumerate() {
            for (row, cell) in channel.rows.iter_mut().enumerate() {
                let at = base + (row * CHANNELS + voice) * 3;
                *cell = read_cell(&data[at..at + 3]);
            }
        }
        let rows = &mut pattern.channels[0].rows;
        let tempo = read_u8(data, TEMPOS_AT + index);
        if tempo > 0 {
            (rows[0].effect2, rows[0].param2) = (0x0F, tempo);
        }
        let break_row = read_u8(data, BREAKS_AT + index) as usize;
        if break_row < ROWS - 1 {
            (rows[break_row].effect2, rows[break_row].param2) = (0x0D, 0);
        }
        builder.push_pattern(pattern);
    }

    let mut offset = header.sample_data_at();
    for index in 0..header.samples {
        let record = MIN_LEN + index * SAMPLE_RECORD_LEN;
        let name = clean_title(&read_fixed_string(data, record, 13));
        let length = u32_le(data, record + 13) as usize;
        let body = sample_bytes(id, data, offset, length, index + 1);
        offset = offset.saturating_add(length);
        if length == 0 {
            builder.push_instrument(name, InstrumentKind::Placeholder);
            continue;
        }

        // Bodies are unsigned 8-bit.
        let mut sample = SampleData::pcm8(body.iter().map(|b| (b ^ 0x80) as i8).collect());
        let loop_start = u32_le(data, record + 17);
        let loop_end = u32_le(data, record + 21);
        if loop_end as usize <= length && loop_end > loop_start {
            sample = sample.with_loop(loop_start, loop_end - loop_start);
        }
        builder.push_instrument(name, InstrumentKind::Sample(sample));
    }

    let orders = bind_orders(&mut builder, &orders, ROWS);
    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;
    use trackerkit_common::{FormatFamily, NOTE_NONE, Pcm};

    fn module(magic: &[u8; 2], samples: u8, patterns: u8) -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, magic);
        put(&mut data, MESSAGE_AT, b"lunatic asylum");
        put(&mut data, MESSAGE_AT + LINE_LEN, b"greets to all");
        data[SAMPLE_COUNT_AT] = samples;
        data[PATTERN_COUNT_AT] = patterns;
        put(&mut data, ORDERS_AT, &[END_OF_ORDERS; 128]);
        data.resize(
            MIN_LEN + samples as usize * SAMPLE_RECORD_LEN + patterns as usize * PATTERN_LEN,
            0xFF,
        );
        data
    }

    #[test]
    fn test_detection() {
        assert!(is_669_format(&module(b"if", 0, 1)));
        assert!(is_669_format(&module(b"JN", 0, 1)));
        assert!(!is_669_format(&module(b"JM", 0, 1)));
        assert!(!is_669_format(&module(b"if", 0, 0)));
        assert!(!is_669_format(&module(b"if", 65, 1)));

        let mut data = module(b"if", 0, 1);
        data[TEMPOS_AT] = 16;
        assert!(!is_669_format(&data));

        let mut data = module(b"if", 0, 1);
        data[BREAKS_AT] = 64;
        assert!(!is_669_format(&data));

        let data = module(b"if", 0, 2);
        assert!(!is_669_format(&data[..data.len() - 1]));
    }

    #[test]
    fn test_decodes_pattern() {
        let mut data = module(b"if", 1, 1);
        data[ORDERS_AT] = 0;
        data[TEMPOS_AT] = 5;
        data[BREAKS_AT] = 31;
        put(&mut data, MIN_LEN, b"kick");
        put_u32_le(&mut data, MIN_LEN + 13, 2);
        put_u32_le(&mut data, MIN_LEN + 21, 0xFFFFF);
        let patterns_at = MIN_LEN + SAMPLE_RECORD_LEN;
        // Row 0, voice 1: note 12, instrument 1, volume 15, portamento up 3.
        put(&mut data, patterns_at + 3, &[0x30, 0x0F, 0x03]);
        // Row 1, voice 2: volume-only cell.
        put(&mut data, patterns_at + (CHANNELS + 2) * 3, &[0xFE, 0x07, 0xFF]);
        data.extend_from_slice(&[0x80, 0xFF]);

        let song = parse_669_file(&data, None).unwrap().into_song();
        assert_eq!(song.name, "lunatic asylum [669]");
        assert_eq!(song.format, FormatFamily::Xm);
        assert_eq!(song.metadata.comment.as_deref(), Some("lunatic asylum\ngreets to all"));
        assert_eq!(song.num_channels, CHANNELS);
        assert_eq!((song.initial_speed, song.initial_bpm), (5, BPM));
        assert_eq!(song.song_positions, vec![0]);

        let channels = &song.patterns[0].channels;
        let cell = channels[1].rows[0];
        assert_eq!((cell.note, cell.instrument, cell.volume), (37, 1, 0x50));
        assert_eq!((cell.effect, cell.param), (0x01, 3));

        let volume_only = channels[2].rows[1];
        assert_eq!(volume_only.note, NOTE_NONE);
        assert_eq!(volume_only.volume, Row::set_volume(29));
        assert!(channels[3].rows[0].is_empty());

        assert_eq!((channels[0].rows[0].effect2, channels[0].rows[0].param2), (0x0F, 5));
        assert_eq!(channels[0].rows[31].effect2, 0x0D);

        let sample = song.instruments[0].sample().unwrap();
        assert_eq!(sample.pcm, Pcm::Eight(vec![0, 127]));
        assert!(!sample.is_looped());
    }
}
