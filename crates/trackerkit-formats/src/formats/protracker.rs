//! ProTracker family modules (`M.K.` and relatives).
//!
//! 20-byte title, 31 sample headers of 30 bytes, song length @950, restart
//! @951, 128 orders @952, channel tag @1080, patterns from 1084. Each cell is
//! four bytes: sample high nibble and 12-bit period, then sample low nibble,
//! effect and parameter. Sample bodies follow the last pattern.

use tracing::debug;
use trackerkit_common::reader::{clean_title, read_fixed_string, read_u8, u16_be, window};
use trackerkit_common::{InstrumentKind, Result, Row, SampleData, SongBuilder};

use crate::format_id::FormatId;
use crate::formats::{bind_orders, not_recognized, pcm8, sample_bytes, title_for};
use crate::notes::period_to_note;
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Header with 31 samples and the channel tag.
pub const MIN_LEN: usize = 1084;

pub(crate) const SAMPLES: usize = 31;
pub(crate) const SAMPLE_HEADER_LEN: usize = 30;
const SONG_LENGTH_AT: usize = 950;
const ORDERS_AT: usize = 952;
const TAG_AT: usize = 1080;
const ROWS: usize = 64;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::ProTracker,
    detector: Detector::Content(is_protracker_format),
    decoder: parse_protracker_file,
    min_len: MIN_LEN,
};

/// One 30-byte Amiga sample header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModSample {
    pub name: String,
    /// Body length in bytes.
    pub length: usize,
    pub finetune: i8,
    pub volume: u8,
    /// Loop start in bytes.
    pub loop_start: u32,
    /// Loop length in bytes.
    pub loop_length: u32,
}

impl ModSample {
    pub(crate) fn read(data: &[u8], offset: usize) -> ModSample {
        // Finetune is a signed nibble in 1/8 semitones.
        let nibble = (read_u8(data, offset + 24) & 0x0F) as i8;
        let finetune = if nibble > 7 { nibble - 16 } else { nibble };
        ModSample {
            name: clean_title(&read_fixed_string(data, offset, 22)),
            length: u16_be(data, offset + 22) as usize * 2,
            finetune: finetune * 16,
            volume: read_u8(data, offset + 25).min(64),
            loop_start: u16_be(data, offset + 26) as u32 * 2,
            loop_length: u16_be(data, offset + 28) as u32 * 2,
        }
    }

    /// Instrument built from this header and its body bytes.
    pub(crate) fn instrument(&self, body: &[u8]) -> InstrumentKind {
        if self.length == 0 {
            return InstrumentKind::Placeholder;
        }
        let mut sample = SampleData::pcm8(pcm8(body));
        sample.volume = self.volume;
        sample.finetune = self.finetune;
        if self.loop_length > 2 {
            sample = sample.with_loop(self.loop_start, self.loop_length);
        }
        InstrumentKind::Sample(sample)
    }
}

/// Channel layout implied by the tag at 1080.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    channels: usize,
    /// Startrekker `FLT8`: 8-channel patterns stored as two 4-channel halves.
    split: bool,
}

fn layout(tag: &[u8]) -> Option<Layout> {
    let plain = |channels| Some(Layout { channels, split: false });
    match tag {
        b"M.K." | b"M!K!" | b"M&K!" | b"FLT4" | b"4CHN" => plain(4),
        b"6CHN" => plain(6),
        b"8CHN" | b"CD81" | b"OKTA" | b"OCTA" => plain(8),
        b"FLT8" => Some(Layout { channels: 8, split: true }),
        [d, b'C', b'H', b'N'] if d.is_ascii_digit() => plain((d - b'0') as usize),
        [h, l, b'C', b'H'] if h.is_ascii_digit() && l.is_ascii_digit() => {
            let channels = ((h - b'0') * 10 + (l - b'0')) as usize;
            (10..=32).contains(&channels).then_some(Layout { channels, split: false })
        }
        _ => None,
    }
    .filter(|layout| layout.channels > 0)
}

struct Header {
    layout: Layout,
    song_length: usize,
    /// Patterns stored in the file, in units of the stored width.
    stored_patterns: usize,
    stored_channels: usize,
}

impl Header {
    fn patterns_end(&self) -> usize {
        MIN_LEN + self.stored_patterns * ROWS * self.stored_channels * 4
    }
}

fn read_header(data: &[u8]) -> Option<Header> {
    let layout = layout(window(data, TAG_AT, 4)?)?;
    let song_length = read_u8(data, SONG_LENGTH_AT) as usize;
    if !(1..=128).contains(&song_length) {
        return None;
    }
    let highest = window(data, ORDERS_AT, 128)?.iter().copied().max().unwrap_or(0) as usize;
    let (stored_patterns, stored_channels) = if layout.split {
        ((highest / 2 + 1) * 2, 4)
    } else {
        (highest + 1, layout.channels)
    };
    let header = Header {
        layout,
        song_length,
        stored_patterns,
        stored_channels,
    };
    (header.patterns_end() <= data.len()).then_some(header)
}

/// Check whether `data` is a ProTracker-family module.
pub fn is_protracker_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && read_header(data).is_some()
}

/// Decode a four-byte ProTracker cell.
pub(crate) fn read_cell(cell: &[u8]) -> Row {
    let period = u16::from(cell[0] & 0x0F) << 8 | u16::from(cell[1]);
    Row {
        note: period_to_note(period),
        instrument: (cell[0] & 0xF0) | (cell[2] >> 4),
        effect: cell[2] & 0x0F,
        param: cell[3],
        ..Row::default()
    }
}

/// Decode a ProTracker-family module.
pub fn parse_protracker_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    let Some(header) = read_header(data) else {
        return Err(not_recognized(FormatId::ProTracker));
    };

    let id = FormatId::ProTracker;
    let title = clean_title(&read_fixed_string(data, 0, 20));
    let channels = header.layout.channels;
    debug!(channels, patterns = header.stored_patterns, "protracker layout");
    let mut builder = SongBuilder::new(id.tag(), id.family(), channels)
        .name(title_for(id, Some(&title), filename))
        .restart(read_u8(data, SONG_LENGTH_AT + 1) as usize);

    let stored_size = ROWS * header.stored_channels * 4;
    let pattern_count = header.stored_patterns / if header.layout.split { 2 } else { 1 };
    for index in 0..pattern_count {
        let mut pattern = builder.empty_pattern(ROWS);
        for (channel_index, channel) in pattern.channels.iter_mut().enumerate() {
            // FLT8 keeps channels 4..8 in the following stored pattern.
            let (stored, column) = if header.layout.split {
                (index * 2 + channel_index / 4, channel_index % 4)
            } else {
                (index, channel_index)
            };
            let base = MIN_LEN + stored * stored_size;
            for (row, cell) in channel.rows.iter_mut().enumerate() {
                let at = base + (row * header.stored_channels + column) * 4;
                *cell = read_cell(&data[at..at + 4]);
            }
        }
        builder.push_pattern(pattern);
    }

    let mut offset = header.patterns_end();
    for index in 0..SAMPLES {
        let sample = ModSample::read(data, 20 + index * SAMPLE_HEADER_LEN);
        let body = sample_bytes(id, data, offset, sample.length, index + 1);
        builder.push_instrument(sample.name.clone(), sample.instrument(body));
        offset = offset.saturating_add(sample.length);
    }

    let orders: Vec<u16> = data[ORDERS_AT..ORDERS_AT + header.song_length]
        .iter()
        .map(|&o| u16::from(if header.layout.split { o / 2 } else { o }))
        .collect();
    let orders = bind_orders(&mut builder, &orders, ROWS);
    Ok(DecodeOutcome::Song(builder.order(orders).finish()?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::formats::test_util::*;
    use trackerkit_common::{FormatFamily, Pcm};

    /// Minimal module: one pattern, given tag and order list.
    pub(crate) fn module(tag: &[u8; 4], channels: usize, orders: &[u8]) -> Vec<u8> {
        let patterns = orders.iter().copied().max().unwrap_or(0) as usize + 1;
        let mut data = zeroed(MIN_LEN + patterns * ROWS * channels * 4);
        put(&mut data, 0, b"space debris");
        data[SONG_LENGTH_AT] = orders.len() as u8;
        put(&mut data, ORDERS_AT, orders);
        put(&mut data, TAG_AT, tag);
        data
    }

    #[test]
    fn test_channel_tags() {
        assert_eq!(layout(b"M.K.").map(|l| l.channels), Some(4));
        assert_eq!(layout(b"6CHN").map(|l| l.channels), Some(6));
        assert_eq!(layout(b"CD81").map(|l| l.channels), Some(8));
        assert_eq!(layout(b"12CH").map(|l| l.channels), Some(12));
        assert_eq!(layout(b"FLT8"), Some(Layout { channels: 8, split: true }));
        assert_eq!(layout(b"40CH"), None);
        assert_eq!(layout(b"0CHN"), None);
        assert_eq!(layout(b"ABCD"), None);
    }

    #[test]
    fn test_detection() {
        assert!(is_protracker_format(&module(b"M.K.", 4, &[0])));
        assert!(!is_protracker_format(&module(b"M.K.", 4, &[])));

        let mut short = module(b"M.K.", 4, &[0, 1]);
        short.truncate(short.len() - 1);
        assert!(!is_protracker_format(&short));
    }

    #[test]
    fn test_decodes_cells_and_samples() {
        let mut data = module(b"M.K.", 4, &[0, 0]);
        // Sample 1: 4 bytes, volume 40, finetune -1.
        put_u16_be(&mut data, 20 + 22, 2);
        data[20 + 24] = 0x0F;
        data[20 + 25] = 40;
        // Row 0, channel 1: sample 1, C-1, effect C20.
        put(&mut data, MIN_LEN + 4, &[0x03, 0x58, 0x1C, 0x20]);
        data.extend_from_slice(&[1, 2, 3, 4]);

        let song = parse_protracker_file(&data, None).unwrap().into_song();
        assert_eq!(song.name, "space debris [MOD]");
        assert_eq!(song.format, FormatFamily::Mod);
        assert_eq!(song.num_channels, 4);
        assert_eq!(song.song_positions, vec![0, 0]);
        assert_eq!(song.instruments.len(), SAMPLES);
        assert_eq!(song.patterns[0].channels[1].pan, 50);

        let cell = song.patterns[0].channels[1].rows[0];
        assert_eq!((cell.note, cell.instrument), (37, 1));
        assert_eq!((cell.effect, cell.param), (0x0C, 0x20));

        let sample = song.instruments[0].sample().unwrap();
        assert_eq!(sample.pcm, Pcm::Eight(vec![1, 2, 3, 4]));
        assert_eq!((sample.volume, sample.finetune), (40, -16));
        assert!(song.instruments[1].sample().is_none());
    }

    #[test]
    fn test_flt8_joins_halves() {
        let mut data = module(b"FLT8", 4, &[0, 1]);
        put(&mut data, MIN_LEN, &[0x03, 0x58, 0x00, 0x00]);
        put(&mut data, MIN_LEN + ROWS * 16, &[0x01, 0xAC, 0x00, 0x00]);

        let song = parse_protracker_file(&data, None).unwrap().into_song();
        assert_eq!(song.num_channels, 8);
        assert_eq!(song.patterns.len(), 1);
        assert_eq!(song.song_positions, vec![0, 0]);
        assert_eq!(song.patterns[0].channels[0].rows[0].note, 37);
        assert_eq!(song.patterns[0].channels[4].rows[0].note, 49);
    }
}
