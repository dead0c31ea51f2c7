//! Shared building blocks for the trackerkit format parsers.
//!
//! This crate holds everything the per-format detectors and decoders have in
//! common:
//!
//! - [`reader`] - sentinel-returning byte readers, fixed strings, nibble helpers
//!   and the [`ByteReader`] cursor
//! - [`TrackerSong`] and its parts - the unified song model
//! - [`SongBuilder`] - validated construction of songs and delegation stubs
//! - [`FormatError`] - the decoder error taxonomy
//!
//! # Example
//!
//! ```
//! use trackerkit_common::{FormatFamily, SongBuilder};
//!
//! let mut builder = SongBuilder::new("MOD", FormatFamily::Mod, 4).name("axelf");
//! builder.push_pattern(builder.empty_pattern(64));
//! let song = builder.order(vec![0]).finish().unwrap();
//! assert_eq!(song.name, "axelf [MOD]");
//! ```

#![warn(missing_docs)]

mod builder;
mod error;
pub mod naming;
pub mod reader;
mod song;

pub use builder::{
    DEFAULT_BPM, DEFAULT_SPEED, STUB_CHANNELS, STUB_PATTERN_ROWS, SongBuilder, amiga_pan,
    default_pan, stub_song,
};
pub use error::{FormatError, InvariantViolation, Result};
pub use reader::{ByteReader, Endian};
pub use song::{
    Channel, FormatFamily, Instrument, InstrumentKind, MAX_VOLUME, NOTE_MAX,
    NOTE_NONE, NOTE_OFF, Pattern, Pcm, Row, SampleData, SongMetadata, TrackerSong,
    VOLUME_SET_MAX, VOLUME_SET_MIN,
};

// ============================================================================
// Common Constants
// ============================================================================

/// ProTracker period for C-1 at finetune 0.
pub const PERIOD_C1: u16 = 856;
