//! MultiTracker modules (`.mtm`).
//!
//! A 66-byte header is followed by 37-byte sample records, a 128-byte order
//! list, the track pool (64 rows x 3 bytes each), the sequence table (32
//! track numbers per pattern, `0` = silent), the song comment and finally the
//! sample bodies. All integers are little-endian.

use nom::IResult;
use nom::bytes::complete::{tag, take};
use nom::number::complete::{le_u8, le_u16};
use nom::sequence::tuple;
use trackerkit_common::reader::{clean_title, read_fixed_string, read_u8, u16_le, u32_le};
use trackerkit_common::{InstrumentKind, Pcm, Result, Row, SampleData, SongBuilder};

use crate::format_id::FormatId;
use crate::formats::{bind_orders, not_recognized, pcm16_le, sample_bytes, title_for};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Fixed header.
pub const MIN_LEN: usize = 66;

const VERSION: u8 = 0x10;
const SAMPLE_RECORD_LEN: usize = 37;
const ORDER_LEN: usize = 128;
const TRACK_ROWS: usize = 64;
const TRACK_LEN: usize = TRACK_ROWS * 3;
const SEQUENCE_LEN: usize = 32 * 2;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Mtm,
    detector: Detector::Content(is_mtm_format),
    decoder: parse_mtm_file,
    min_len: MIN_LEN,
};

#[derive(Debug, Clone)]
struct Header {
    title: String,
    tracks: usize,
    last_pattern: usize,
    last_order: usize,
    comment_len: usize,
    samples: usize,
    rows: usize,
    channels: usize,
    pans: [u8; 32],
}

impl Header {
    fn samples_at(&self) -> usize {
        MIN_LEN
    }

    fn orders_at(&self) -> usize {
        self.samples_at() + self.samples * SAMPLE_RECORD_LEN
    }

    fn tracks_at(&self) -> usize {
        self.orders_at() + ORDER_LEN
    }

    fn sequences_at(&self) -> usize {
        self.tracks_at() + self.tracks * TRACK_LEN
    }

    fn comment_at(&self) -> usize {
        self.sequences_at() + (self.last_pattern + 1) * SEQUENCE_LEN
    }

    fn sample_data_at(&self) -> usize {
        self.comment_at() + self.comment_len
    }
}

fn header_record(input: &[u8]) -> IResult<&[u8], Header> {
    let (input, _) = tag(&b"MTM"[..])(input)?;
    let (input, _) = tag(&[VERSION][..])(input)?;
    let (input, title) = take(20usize)(input)?;
    let (input, (tracks, last_pattern, last_order, comment_len)) =
        tuple((le_u16, le_u8, le_u8, le_u16))(input)?;
    let (input, (samples, _attributes, rows, channels)) =
        tuple((le_u8, le_u8, le_u8, le_u8))(input)?;
    let (input, pans) = take(32usize)(input)?;

    let mut pan_table = [0u8; 32];
    pan_table.copy_from_slice(pans);
    Ok((
        input,
        Header {
            title: clean_title(&read_fixed_string(title, 0, 20)),
            tracks: tracks as usize,
            last_pattern: last_pattern as usize,
            last_order: last_order as usize,
            comment_len: comment_len as usize,
            samples: samples as usize,
            rows: rows as usize,
            channels: channels as usize,
            pans: pan_table,
        },
    ))
}

fn read_header(data: &[u8]) -> Option<Header> {
    let (_, header) = header_record(data).ok()?;
    let valid = (1..=32).contains(&header.channels)
        && (1..=TRACK_ROWS).contains(&header.rows)
        && header.samples <= 63
        && header.last_order < ORDER_LEN
        && header.sample_data_at() <= data.len();
    valid.then_some(header)
}

/// Check whether `data` is a MultiTracker module.
pub fn is_mtm_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && read_header(data).is_some()
}

/// Note in the high six bits, instrument across the byte boundary, effect
/// in the low nibble of the second byte.
fn read_track_cell(cell: &[u8]) -> Row {
    let raw_note = cell[0] >> 2;
    Row {
        note: if raw_note == 0 { 0 } else { raw_note + 25 },
        instrument: ((cell[0] & 0x03) << 4) | (cell[1] >> 4),
        effect: cell[1] & 0x0F,
        param: cell[2],
        ..Row::default()
    }
}

/// Decode a MultiTracker module.
pub fn parse_mtm_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let id = FormatId::Mtm;
    let Some(header) = read_header(data) else {
        return Err(not_recognized(id));
    };

    let pans = header.pans[..header.channels]
        .iter()
        .map(|&p| ((p.min(15) as i32 * 200) / 15 - 100) as i8)
        .collect();
    let mut builder = SongBuilder::new(id.tag(), id.family(), header.channels)
        .name(title_for(id, Some(&header.title), filename))
        .pans(pans);
    if header.comment_len > 0 {
        let comment = read_fixed_string(data, header.comment_at(), header.comment_len);
        builder = builder.comment(comment);
    }

    for pattern_index in 0..=header.last_pattern {
        let mut pattern = builder.empty_pattern(header.rows);
        let sequence = header.sequences_at() + pattern_index * SEQUENCE_LEN;
        for (voice, channel) in pattern.channels.iter_mut().enumerate() {
            // Track numbers are 1-based; 0 and unknown tracks stay silent.
            let track = u16_le(data, sequence + voice * 2) as usize;
            if track == 0 || track > header.tracks {
                continue;
            }
            let base = header.tracks_at() + (track - 1) * TRACK_LEN;
            for (row, cell) in channel.rows.iter_mut().enumerate() {
                *cell = read_track_cell(&data[base + row * 3..base + row * 3 + 3]);
            }
        }
        builder.push_pattern(pattern);
    }

    let mut offset = header.sample_data_at();
    for index in 0..header.samples {
        let record = header.samples_at() + index * SAMPLE_RECORD_LEN;
        let name = clean_title(&read_fixed_string(data, record, 22));
        let length = u32_le(data, record + 22) as usize;
        let body = sample_bytes(id, data, offset, length, index + 1);
        offset = offset.saturating_add(length);
        if length == 0 {
            builder.push_instrument(name, InstrumentKind::Placeholder);
            continue;
        }

        let sixteen = read_u8(data, record + 36) & 0x01 != 0;
        let (pcm, width) = if sixteen {
            (Pcm::Sixteen(pcm16_le(body)), 2)
        } else {
            // 8-bit bodies are unsigned.
            (Pcm::Eight(body.iter().map(|b| (b ^ 0x80) as i8).collect()), 1)
        };
        let mut sample = SampleData::pcm8(Vec::new());
        sample.pcm = pcm;
        sample.finetune = (read_u8(data, record + 34) as i8).clamp(-8, 7) * 16;
        sample.volume = read_u8(data, record + 35).min(64);
        let loop_start = u32_le(data, record + 26) / width;
        let loop_end = u32_le(data, record + 30) / width;
        if loop_end > loop_start.saturating_add(2) {
            sample = sample.with_loop(loop_start, loop_end - loop_start);
        }
        builder.push_instrument(name, InstrumentKind::Sample(sample));
    }

    let orders: Vec<u16> = data[header.orders_at()..header.orders_at() + header.last_order + 1]
        .iter()
        .map(|&o| o as u16)
        .collect();
    let orders = bind_orders(&mut builder, &orders, header.rows);
    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;
    use trackerkit_common::FormatFamily;

    fn header(channels: u8, rows: u8, samples: u8, tracks: u16) -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, b"MTM");
        data[3] = VERSION;
        put(&mut data, 4, b"tracked down");
        put_u16_le(&mut data, 24, tracks);
        data[30] = samples;
        data[32] = rows;
        data[33] = channels;
        for voice in 0..32 {
            data[34 + voice] = if voice % 2 == 0 { 3 } else { 12 };
        }
        data
    }

    /// Header plus every table the detector requires, zero-filled.
    fn module(channels: u8, samples: u8, tracks: u16) -> Vec<u8> {
        let mut data = header(channels, 64, samples, tracks);
        let len = MIN_LEN
            + samples as usize * SAMPLE_RECORD_LEN
            + ORDER_LEN
            + tracks as usize * TRACK_LEN
            + SEQUENCE_LEN;
        data.resize(len, 0);
        data
    }

    #[test]
    fn test_header_ranges() {
        assert!(is_mtm_format(&module(4, 0, 0)));
        assert!(!is_mtm_format(&module(0, 0, 0)));
        assert!(!is_mtm_format(&module(33, 0, 0)));
        assert!(!is_mtm_format(&header(4, 65, 0, 0)));

        let mut data = module(4, 0, 0);
        data[3] = 0x11;
        assert!(!is_mtm_format(&data));
    }

    #[test]
    fn test_rejects_truncated_tables() {
        let data = module(4, 1, 2);
        assert!(is_mtm_format(&data));
        assert!(!is_mtm_format(&data[..data.len() - 1]));
    }

    #[test]
    fn test_decodes_tracks_and_samples() {
        let mut data = module(4, 1, 1);
        let orders_at = MIN_LEN + SAMPLE_RECORD_LEN;
        let tracks_at = orders_at + ORDER_LEN;
        let sequences_at = tracks_at + TRACK_LEN;
        data[27] = 1; // two orders

        put(&mut data, MIN_LEN, b"bass");
        put_u32_le(&mut data, MIN_LEN + 22, 3);
        data[MIN_LEN + 35] = 48;

        // Track 1 row 0: note 12 (0x30 >> 2), instrument 1, effect C10.
        put(&mut data, tracks_at, &[0x30, 0x1C, 0x10]);
        put_u16_le(&mut data, sequences_at + 2, 1);
        data.extend_from_slice(&[0x80, 0x90, 0x70]);

        let song = parse_mtm_file(&data, None).unwrap().into_song();
        assert_eq!(song.name, "tracked down [MTM]");
        assert_eq!(song.format, FormatFamily::Xm);
        assert_eq!(song.num_channels, 4);
        assert_eq!(song.song_positions, vec![0, 0]);

        let pattern = &song.patterns[0];
        assert_eq!(pattern.channels[0].pan, -60);
        assert!(pattern.channels[0].rows.iter().all(Row::is_empty));
        let cell = pattern.channels[1].rows[0];
        assert_eq!((cell.note, cell.instrument), (37, 1));
        assert_eq!((cell.effect, cell.param), (0x0C, 0x10));

        let sample = song.instruments[0].sample().unwrap();
        assert_eq!(sample.pcm, Pcm::Eight(vec![0, 16, -16]));
        assert_eq!(sample.volume, 48);
    }

    #[test]
    fn test_sixteen_bit_sample_frames() {
        let mut data = module(4, 1, 0);
        put(&mut data, MIN_LEN, b"snare");
        put_u32_le(&mut data, MIN_LEN + 22, 8);
        put_u32_le(&mut data, MIN_LEN + 26, 2);
        put_u32_le(&mut data, MIN_LEN + 30, 8);
        data[MIN_LEN + 36] = 0x01;
        data.extend_from_slice(&[0x00, 0x01, 0xFF, 0xFF, 0x00, 0x80, 0x10, 0x00]);

        let song = parse_mtm_file(&data, None).unwrap().into_song();
        let sample = song.instruments[0].sample().unwrap();
        assert_eq!(sample.pcm, Pcm::Sixteen(vec![256, -1, i16::MIN, 16]));
        assert_eq!((sample.loop_start, sample.loop_length), (1, 3));
    }
}
