//! Capability summary of a decoded song.
//!
//! Used by hosts to decide which editor features and renderer a song can use
//! without walking the pattern data themselves.

use bitflags::bitflags;
use serde::Serialize;
use trackerkit_common::{FormatFamily, TrackerSong};

bitflags! {
    /// What a song actually makes use of.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Capabilities: u8 {
        /// At least one row carries data.
        const PATTERNS = 1 << 0;
        /// The instrument table is non-empty.
        const INSTRUMENTS = 1 << 1;
        /// At least one instrument holds PCM.
        const SAMPLE_DATA = 1 << 2;
        /// Linear frequency table.
        const LINEAR_PERIODS = 1 << 3;
        /// Playback needs a native engine.
        const DELEGATED = 1 << 4;
        /// Some row uses the second effect column.
        const MULTI_EFFECT = 1 << 5;
    }
}

/// Summary produced by [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityReport {
    /// Provenance tag.
    pub format_tag: String,
    /// Renderer family.
    pub family: FormatFamily,
    /// Channels per pattern.
    pub channel_count: usize,
    /// Patterns in the pool.
    pub pattern_count: usize,
    /// Played order entries.
    pub order_length: usize,
    /// Instruments in the table.
    pub instrument_count: usize,
    /// Instruments carrying PCM.
    pub sampled_instrument_count: usize,
    /// Rows with a pitched note across the pattern pool.
    pub note_count: usize,
    /// `note_count` over all channel rows, `0.0` for an empty pool.
    pub note_density: f32,
    /// Feature set.
    pub capabilities: Capabilities,
}

/// Summarise `song`.
pub fn analyze(song: &TrackerSong) -> CapabilityReport {
    let rows = || {
        song.patterns
            .iter()
            .flat_map(|pattern| pattern.channels.iter())
            .flat_map(|channel| channel.rows.iter())
    };

    let total_rows = rows().count();
    let note_count = rows().filter(|row| row.has_note()).count();
    let sampled = song
        .instruments
        .iter()
        .filter(|instrument| instrument.sample().is_some_and(|s| !s.pcm.is_empty()))
        .count();

    let mut capabilities = Capabilities::empty();
    capabilities.set(Capabilities::PATTERNS, rows().any(|row| !row.is_empty()));
    capabilities.set(Capabilities::INSTRUMENTS, !song.instruments.is_empty());
    capabilities.set(Capabilities::SAMPLE_DATA, sampled > 0);
    capabilities.set(Capabilities::LINEAR_PERIODS, song.linear_periods);
    capabilities.set(Capabilities::DELEGATED, song.format == FormatFamily::Native);
    capabilities.set(
        Capabilities::MULTI_EFFECT,
        rows().any(|row| row.effect2 != 0 || row.param2 != 0),
    );

    CapabilityReport {
        format_tag: song.metadata.source_format.clone(),
        family: song.format,
        channel_count: song.num_channels,
        pattern_count: song.patterns.len(),
        order_length: song.song_length,
        instrument_count: song.instruments.len(),
        sampled_instrument_count: sampled,
        note_count,
        note_density: if total_rows == 0 {
            0.0
        } else {
            note_count as f32 / total_rows as f32
        },
        capabilities,
    }
}
