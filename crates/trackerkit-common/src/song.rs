//! Unified in-memory song representation.
//!
//! Every decoder, whatever its source format, produces a [`TrackerSong`]:
//! an order list over patterns, each pattern a grid of channels by rows,
//! plus an instrument table. Songs are built once per decode through
//! [`SongBuilder`](crate::SongBuilder) and handed out by value.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

/// Coarse engine family used by a player to choose a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatFamily {
    /// Amiga period-based playback (ProTracker semantics).
    Mod,
    /// FastTracker 2 style playback (XM effect set, optional linear periods).
    Xm,
    /// Played by a format-specific native engine; the song is a stub.
    Native,
}

impl FormatFamily {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatFamily::Mod => "mod",
            FormatFamily::Xm => "xm",
            FormatFamily::Native => "native",
        }
    }
}

/// No note on this row.
pub const NOTE_NONE: u8 = 0;
/// Highest playable note (B-7).
pub const NOTE_MAX: u8 = 96;
/// Key-off.
pub const NOTE_OFF: u8 = 97;
/// Volume-column value meaning "set volume 0"; `0x50` sets 64.
pub const VOLUME_SET_MIN: u8 = 0x10;
/// Volume-column value meaning "set volume 64".
pub const VOLUME_SET_MAX: u8 = 0x50;
/// Loudest channel or sample volume.
pub const MAX_VOLUME: u8 = 64;

/// One cell of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// `0` empty, `1..=96` C-0..B-7, `97` key-off.
    pub note: u8,
    /// 1-based instrument number, `0` for none.
    pub instrument: u8,
    /// `0` for none, `0x10..=0x50` sets volume 0..64.
    pub volume: u8,
    /// Primary effect command.
    pub effect: u8,
    /// Primary effect parameter.
    pub param: u8,
    /// Secondary effect command.
    pub effect2: u8,
    /// Secondary effect parameter.
    pub param2: u8,
}

impl Row {
    /// `true` if nothing at all is set.
    pub fn is_empty(&self) -> bool {
        *self == Row::default()
    }

    /// `true` if the row triggers a pitched note (key-off excluded).
    pub fn has_note(&self) -> bool {
        (1..=NOTE_MAX).contains(&self.note)
    }

    /// Volume-column encoding for an absolute volume.
    pub fn set_volume(volume: u8) -> u8 {
        VOLUME_SET_MIN + volume.min(MAX_VOLUME)
    }
}

/// One voice of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// 0-based channel index.
    pub id: u16,
    /// Display name.
    pub name: String,
    /// Muted in the mixer.
    pub muted: bool,
    /// Soloed in the mixer.
    pub solo: bool,
    /// Channel volume, `0..=64`.
    pub volume: u8,
    /// Stereo position, `-100` (left) to `100` (right).
    pub pan: i8,
    /// Instrument bound to the whole channel, for single-voice formats.
    pub instrument_id: Option<u16>,
    /// Exactly `Pattern::length` rows.
    pub rows: Vec<Row>,
}

/// A grid of channels by rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// 0-based pattern index.
    pub id: u16,
    /// Display name.
    pub name: String,
    /// Rows per channel.
    pub length: usize,
    /// Voices, one per song channel.
    pub channels: Vec<Channel>,
}

/// Signed PCM sample storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bits", content = "frames")]
pub enum Pcm {
    /// 8-bit signed frames.
    #[serde(rename = "8")]
    Eight(Vec<i8>),
    /// 16-bit signed frames.
    #[serde(rename = "16")]
    Sixteen(Vec<i16>),
}

impl Pcm {
    /// Number of frames.
    pub fn len(&self) -> usize {
        match self {
            Pcm::Eight(frames) => frames.len(),
            Pcm::Sixteen(frames) => frames.len(),
        }
    }

    /// `true` if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bits per frame.
    pub fn bits(&self) -> u8 {
        match self {
            Pcm::Eight(_) => 8,
            Pcm::Sixteen(_) => 16,
        }
    }
}

/// Sample body and playback defaults of a sampled instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleData {
    /// Signed PCM.
    pub pcm: Pcm,
    /// Loop start in frames.
    pub loop_start: u32,
    /// Loop length in frames; `0` means no loop.
    pub loop_length: u32,
    /// Default volume, `0..=64`.
    pub volume: u8,
    /// Finetune in 1/128 semitone steps.
    pub finetune: i8,
    /// Semitone offset relative to C-4.
    pub relative_note: i8,
}

impl SampleData {
    /// 8-bit sample without loop at full volume.
    pub fn pcm8(frames: Vec<i8>) -> Self {
        Self {
            pcm: Pcm::Eight(frames),
            loop_start: 0,
            loop_length: 0,
            volume: MAX_VOLUME,
            finetune: 0,
            relative_note: 0,
        }
    }

    /// Set the loop window, clamped to the sample body.
    pub fn with_loop(mut self, start: u32, length: u32) -> Self {
        let frames = self.pcm.len() as u32;
        let start = start.min(frames);
        self.loop_start = start;
        self.loop_length = length.min(frames - start);
        self
    }

    /// `true` if the loop window is non-trivial.
    pub fn is_looped(&self) -> bool {
        self.loop_length > 2
    }
}

/// What an instrument carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InstrumentKind {
    /// Name only; the sound lives in a native engine or was not decoded.
    Placeholder,
    /// Decoded PCM sample.
    Sample(SampleData),
}

/// Entry of the instrument table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// 1-based id, equal to the table position plus one.
    pub id: u16,
    /// Display name.
    pub name: String,
    /// Payload.
    pub kind: InstrumentKind,
}

impl Instrument {
    /// Sample payload, if any.
    pub fn sample(&self) -> Option<&SampleData> {
        match &self.kind {
            InstrumentKind::Sample(sample) => Some(sample),
            InstrumentKind::Placeholder => None,
        }
    }
}

/// Descriptive fields that do not affect playback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// Format tag of the decoder that built the song (`"MOD"`, `"XM"`, ...).
    pub source_format: String,
    /// Composer, when the file stores one.
    pub author: Option<String>,
    /// Free-form message text, when the file stores one.
    pub comment: Option<String>,
}

/// A decoded module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSong {
    /// Title with a ` [TAG]` provenance suffix.
    pub name: String,
    /// Renderer family.
    pub format: FormatFamily,
    /// Pattern pool.
    pub patterns: Vec<Pattern>,
    /// Instrument table, empty for delegated stubs.
    pub instruments: Vec<Instrument>,
    /// Order list of pattern indices.
    pub song_positions: Vec<u16>,
    /// Number of played order entries.
    pub song_length: usize,
    /// Order index to jump to after the last position.
    pub restart_position: usize,
    /// Channels in every pattern.
    pub num_channels: usize,
    /// Ticks per row.
    pub initial_speed: u8,
    /// Beats per minute.
    pub initial_bpm: u16,
    /// Linear frequency table instead of Amiga periods.
    pub linear_periods: bool,
    /// Non-playback descriptive data.
    pub metadata: SongMetadata,
}

impl TrackerSong {
    /// Check the structural invariants every decoder must uphold.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.patterns.is_empty() {
            return Err(InvariantViolation::NoPatterns);
        }
        if self.song_positions.is_empty() {
            return Err(InvariantViolation::EmptyOrderList);
        }
        if self.song_length == 0 || self.song_length > self.song_positions.len() {
            return Err(InvariantViolation::SongLength {
                length: self.song_length,
                positions: self.song_positions.len(),
            });
        }
        if self.restart_position >= self.song_length {
            return Err(InvariantViolation::RestartPosition {
                restart: self.restart_position,
                length: self.song_length,
            });
        }

        for (position, &pattern) in self.song_positions.iter().enumerate() {
            if pattern as usize >= self.patterns.len() {
                return Err(InvariantViolation::OrderOutOfRange {
                    position,
                    pattern,
                    count: self.patterns.len(),
                });
            }
        }

        for (index, pattern) in self.patterns.iter().enumerate() {
            if pattern.channels.len() != self.num_channels {
                return Err(InvariantViolation::ChannelCount {
                    pattern: index,
                    found: pattern.channels.len(),
                    expected: self.num_channels,
                });
            }
            for channel in &pattern.channels {
                if channel.rows.len() != pattern.length {
                    return Err(InvariantViolation::RowCount {
                        pattern: index,
                        channel: channel.id,
                        found: channel.rows.len(),
                        expected: pattern.length,
                    });
                }
                if channel.volume > MAX_VOLUME || !(-100..=100).contains(&channel.pan) {
                    return Err(InvariantViolation::ChannelMix {
                        pattern: index,
                        channel: channel.id,
                    });
                }
                if let Some(row) = channel.rows.iter().position(|r| r.note > NOTE_OFF) {
                    return Err(InvariantViolation::NoteRange {
                        pattern: index,
                        channel: channel.id,
                        row,
                    });
                }
            }
        }

        for (index, instrument) in self.instruments.iter().enumerate() {
            if instrument.id as usize != index + 1 {
                return Err(InvariantViolation::InstrumentId {
                    index,
                    id: instrument.id,
                });
            }
        }

        Ok(())
    }

    /// Iterate over the patterns in play order.
    pub fn ordered_patterns(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.song_positions[..self.song_length.min(self.song_positions.len())]
            .iter()
            .filter_map(|&index| self.patterns.get(index as usize))
    }
}
