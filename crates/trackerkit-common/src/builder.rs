//! Incremental construction of [`TrackerSong`] values.
//!
//! Decoders collect patterns, instruments and the order list into a
//! [`SongBuilder`] and call [`SongBuilder::finish`], which appends the
//! provenance suffix to the title and runs [`TrackerSong::validate`]. A
//! decoder therefore never returns a song that breaks the model's invariants.

use crate::error::{FormatError, Result};
use crate::naming::tagged_name;
use crate::song::{
    Channel, FormatFamily, Instrument, InstrumentKind, MAX_VOLUME, Pattern, Row, SongMetadata,
    TrackerSong,
};

/// Default ticks per row.
pub const DEFAULT_SPEED: u8 = 6;
/// Default tempo.
pub const DEFAULT_BPM: u16 = 125;
/// Rows in the placeholder pattern of a stub song.
pub const STUB_PATTERN_ROWS: usize = 64;
/// Channels in the placeholder pattern of a stub song.
pub const STUB_CHANNELS: usize = 4;

/// Amiga hardware panning: voices alternate left, right, right, left.
pub fn amiga_pan(channel: usize) -> i8 {
    match channel % 4 {
        0 | 3 => -50,
        _ => 50,
    }
}

/// Initial pan for a channel of a song in `family`.
pub fn default_pan(family: FormatFamily, channel: usize) -> i8 {
    match family {
        FormatFamily::Xm => 0,
        FormatFamily::Mod | FormatFamily::Native => amiga_pan(channel),
    }
}

/// Collects the parts of a song and validates them on [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct SongBuilder {
    tag: &'static str,
    family: FormatFamily,
    title: String,
    num_channels: usize,
    patterns: Vec<Pattern>,
    instruments: Vec<Instrument>,
    positions: Vec<u16>,
    song_length: Option<usize>,
    restart: usize,
    speed: u8,
    bpm: u16,
    linear_periods: bool,
    pans: Option<Vec<i8>>,
    author: Option<String>,
    comment: Option<String>,
}

impl SongBuilder {
    /// Start a song for the decoder of `tag`.
    pub fn new(tag: &'static str, family: FormatFamily, num_channels: usize) -> Self {
        Self {
            tag,
            family,
            title: String::new(),
            num_channels,
            patterns: Vec::new(),
            instruments: Vec::new(),
            positions: Vec::new(),
            song_length: None,
            restart: 0,
            speed: DEFAULT_SPEED,
            bpm: DEFAULT_BPM,
            linear_periods: false,
            pans: None,
            author: None,
            comment: None,
        }
    }

    /// Title without the format suffix.
    pub fn name(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Ticks per row. Zero is replaced by the default.
    pub fn speed(mut self, speed: u8) -> Self {
        self.speed = if speed == 0 { DEFAULT_SPEED } else { speed };
        self
    }

    /// Beats per minute. Zero is replaced by the default.
    pub fn bpm(mut self, bpm: u16) -> Self {
        self.bpm = if bpm == 0 { DEFAULT_BPM } else { bpm };
        self
    }

    /// Use the linear frequency table.
    pub fn linear_periods(mut self, linear: bool) -> Self {
        self.linear_periods = linear;
        self
    }

    /// Order index to loop back to. Out-of-range values fall back to 0.
    pub fn restart(mut self, restart: usize) -> Self {
        self.restart = restart;
        self
    }

    /// Override the per-channel pan positions (clamped to -100..=100).
    pub fn pans(mut self, pans: Vec<i8>) -> Self {
        self.pans = Some(pans.into_iter().map(|p| p.clamp(-100, 100)).collect());
        self
    }

    /// Composer name; blank strings are ignored.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = non_blank(author.into());
        self
    }

    /// Message text; blank strings are ignored.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = non_blank(comment.into());
        self
    }

    /// Order list. The song length defaults to its full length.
    pub fn order(mut self, positions: Vec<u16>) -> Self {
        self.positions = positions;
        self
    }

    /// Played prefix of the order list.
    pub fn song_length(mut self, length: usize) -> Self {
        self.song_length = Some(length);
        self
    }

    /// Channels per pattern.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Patterns pushed so far.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// A pattern of `length` empty rows with this song's channel layout.
    pub fn empty_pattern(&self, length: usize) -> Pattern {
        let id = self.patterns.len() as u16;
        Pattern {
            id,
            name: format!("Pattern {id}"),
            length,
            channels: (0..self.num_channels)
                .map(|index| Channel {
                    id: index as u16,
                    name: format!("Channel {}", index + 1),
                    muted: false,
                    solo: false,
                    volume: MAX_VOLUME,
                    pan: self.pan_for(index),
                    instrument_id: None,
                    rows: vec![Row::default(); length],
                })
                .collect(),
        }
    }

    /// Append a pattern and return its index. The pattern id is rewritten
    /// to match its position.
    pub fn push_pattern(&mut self, mut pattern: Pattern) -> u16 {
        let id = self.patterns.len() as u16;
        pattern.id = id;
        self.patterns.push(pattern);
        id
    }

    /// Append an instrument and return its 1-based id.
    pub fn push_instrument(&mut self, name: impl Into<String>, kind: InstrumentKind) -> u16 {
        let id = self.instruments.len() as u16 + 1;
        self.instruments.push(Instrument {
            id,
            name: name.into(),
            kind,
        });
        id
    }

    /// Assemble and validate the song.
    pub fn finish(self) -> Result<TrackerSong> {
        let song_length = self.song_length.unwrap_or(self.positions.len());
        let restart = if self.restart < song_length {
            self.restart
        } else {
            0
        };
        let title = if self.title.trim().is_empty() {
            "Untitled"
        } else {
            self.title.trim()
        };

        let song = TrackerSong {
            name: tagged_name(title, self.tag),
            format: self.family,
            patterns: self.patterns,
            instruments: self.instruments,
            song_positions: self.positions,
            song_length,
            restart_position: restart,
            num_channels: self.num_channels,
            initial_speed: self.speed,
            initial_bpm: self.bpm,
            linear_periods: self.linear_periods,
            metadata: SongMetadata {
                source_format: self.tag.to_string(),
                author: self.author,
                comment: self.comment,
            },
        };

        song.validate()
            .map_err(|violation| FormatError::invariant(self.tag, violation))?;
        Ok(song)
    }

    fn pan_for(&self, index: usize) -> i8 {
        self.pans
            .as_ref()
            .and_then(|pans| pans.get(index).copied())
            .unwrap_or_else(|| default_pan(self.family, index))
    }
}

/// Metadata-only song for a module handed to a native engine: no
/// instruments, one empty 64-row pattern over four Amiga-panned channels,
/// order list `[0]`.
pub fn stub_song(tag: &'static str, title: &str) -> Result<TrackerSong> {
    let mut builder = SongBuilder::new(tag, FormatFamily::Native, STUB_CHANNELS).name(title);
    builder.push_pattern(builder.empty_pattern(STUB_PATTERN_ROWS));
    builder.order(vec![0]).finish()
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
