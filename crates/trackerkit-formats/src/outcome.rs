//! What a decoder hands back.

use trackerkit_common::TrackerSong;

use crate::format_id::FormatId;

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The module was decoded into a playable song.
    Song(TrackerSong),
    /// The module is played by a native engine; only a stub song was built.
    Delegate(DelegatedModule),
}

impl DecodeOutcome {
    /// The decoded song, or the stub of a delegated module.
    pub fn song(&self) -> &TrackerSong {
        match self {
            DecodeOutcome::Song(song) => song,
            DecodeOutcome::Delegate(module) => &module.stub,
        }
    }

    /// Take the song out, dropping any delegated bytes.
    pub fn into_song(self) -> TrackerSong {
        match self {
            DecodeOutcome::Song(song) => song,
            DecodeOutcome::Delegate(module) => module.stub,
        }
    }

    /// `true` for [`DecodeOutcome::Delegate`].
    pub fn is_delegated(&self) -> bool {
        matches!(self, DecodeOutcome::Delegate(_))
    }
}

/// A module the core recognises but does not decode itself.
///
/// The native engine receives the original bytes untouched plus the filename
/// (some engines locate companion files from it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedModule {
    /// Metadata-only song for listings and UI.
    pub stub: TrackerSong,
    /// Original module bytes.
    pub data: Vec<u8>,
    /// Filename as supplied to the decoder.
    pub filename: Option<String>,
}

/// A detected and decoded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    /// Format whose detector matched.
    pub format: FormatId,
    /// Decoder result.
    pub outcome: DecodeOutcome,
}

impl Imported {
    /// The decoded or stub song.
    pub fn song(&self) -> &TrackerSong {
        self.outcome.song()
    }

    /// `true` if playback needs a native engine.
    pub fn is_delegated(&self) -> bool {
        self.outcome.is_delegated()
    }
}
