//! Error types for module detection and decoding.

use thiserror::Error;

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors a format decoder can report.
///
/// Detectors never produce these; they answer `true`/`false` only. A decoder
/// distinguishes "this buffer is not my format" from "this buffer is my
/// format but it is damaged", so callers know whether to try another
/// pipeline or to surface a parse failure.
///
/// Handing a module to the native engine is not an error and has no variant
/// here; see `DecodeOutcome::Delegate` in `trackerkit-formats`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The decoder's own detector rejected the buffer.
    #[error("data is not a {format} module")]
    NotRecognized {
        /// Format tag of the decoder that was called.
        format: &'static str,
    },

    /// The buffer was recognised but is truncated or structurally corrupt.
    #[error("malformed {format} module: {reason}")]
    Malformed {
        /// Format tag of the decoder that failed.
        format: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// The decoded song violates a structural invariant of the song model.
    #[error("{format} decoder produced an inconsistent song: {reason}")]
    Invariant {
        /// Format tag of the decoder that produced the song.
        format: &'static str,
        /// Which invariant failed.
        reason: String,
    },
}

/// A structural rule of [`TrackerSong`](crate::TrackerSong) that a song breaks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The pattern pool is empty.
    #[error("song has no patterns")]
    NoPatterns,

    /// The order list is empty.
    #[error("song has an empty order list")]
    EmptyOrderList,

    /// `song_length` is zero or longer than the order list.
    #[error("song length {length} does not fit {positions} order entries")]
    SongLength {
        /// Declared length.
        length: usize,
        /// Order list entries.
        positions: usize,
    },

    /// Restart position lies past the song length.
    #[error("restart position {restart} is not below song length {length}")]
    RestartPosition {
        /// Restart order index.
        restart: usize,
        /// Song length.
        length: usize,
    },

    /// An order entry names a pattern that does not exist.
    #[error("order {position} points at pattern {pattern}, only {count} exist")]
    OrderOutOfRange {
        /// Order index.
        position: usize,
        /// Referenced pattern.
        pattern: u16,
        /// Patterns available.
        count: usize,
    },

    /// A pattern has a different channel count than the song.
    #[error("pattern {pattern} has {found} channels, song has {expected}")]
    ChannelCount {
        /// Pattern index.
        pattern: usize,
        /// Channels present.
        found: usize,
        /// Song channel count.
        expected: usize,
    },

    /// A channel's row count differs from its pattern length.
    #[error("pattern {pattern} channel {channel} has {found} rows, expected {expected}")]
    RowCount {
        /// Pattern index.
        pattern: usize,
        /// Channel id.
        channel: u16,
        /// Rows present.
        found: usize,
        /// Pattern length.
        expected: usize,
    },

    /// Channel volume or pan out of range.
    #[error("pattern {pattern} channel {channel} has volume or pan out of range")]
    ChannelMix {
        /// Pattern index.
        pattern: usize,
        /// Channel id.
        channel: u16,
    },

    /// A row carries a note value above key-off.
    #[error("pattern {pattern} channel {channel} row {row} has an invalid note")]
    NoteRange {
        /// Pattern index.
        pattern: usize,
        /// Channel id.
        channel: u16,
        /// Row index.
        row: usize,
    },

    /// Instrument ids are not 1-based and sequential.
    #[error("instrument at index {index} has id {id}")]
    InstrumentId {
        /// Table position.
        index: usize,
        /// Stored id.
        id: u16,
    },
}

impl FormatError {
    /// Wrap an invariant violation for the decoder of `format`.
    pub fn invariant(format: &'static str, violation: InvariantViolation) -> Self {
        FormatError::Invariant {
            format,
            reason: violation.to_string(),
        }
    }

    /// Shorthand for [`FormatError::Malformed`].
    pub fn malformed(format: &'static str, reason: impl Into<String>) -> Self {
        FormatError::Malformed {
            format,
            reason: reason.into(),
        }
    }

    /// Format tag carried by every variant.
    pub fn format(&self) -> &'static str {
        match self {
            FormatError::NotRecognized { format }
            | FormatError::Malformed { format, .. }
            | FormatError::Invariant { format, .. } => format,
        }
    }

    /// `true` when the error means "try something else" rather than "corrupt".
    pub fn is_not_recognized(&self) -> bool {
        matches!(self, FormatError::NotRecognized { .. })
    }
}
