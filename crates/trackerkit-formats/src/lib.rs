//! Tracker module format detection and decoding.
//!
//! Every supported format contributes a pure detector and a decoder to one
//! ordered [`Registry`]. Detection walks the table in registration order and
//! the first detector that accepts the buffer decides the format:
//!
//! - **Full decoders** (XM, Oktalyzer, TD-3, IMF, MTM, ChipTracker,
//!   ProTracker, 669) build a complete [`TrackerSong`].
//! - **Delegated formats** are recognised and returned as a
//!   [`DecodeOutcome::Delegate`]: a metadata stub plus the original bytes for
//!   a native playback engine.
//!
//! # Example
//!
//! ```
//! use trackerkit_formats::{FormatId, Registry};
//!
//! let mut data = vec![0u8; 64];
//! data[..4].copy_from_slice(b"IMPM");
//! data.resize(192, 0);
//!
//! let registry = Registry::standard();
//! let imported = registry.detect_and_parse(&data, Some("beyond.it")).unwrap().unwrap();
//! assert_eq!(imported.format, FormatId::ImpulseTracker);
//! assert!(imported.is_delegated());
//! assert_eq!(imported.song().name, "beyond (Impulse Tracker) [IT]");
//! ```
//!
//! Detectors never panic and reject truncated or all-zero input. Decoders
//! return [`FormatError::NotRecognized`] when called on a buffer their own
//! detector rejects, so each can be used standalone.

#![warn(missing_docs)]

pub mod analyzer;
mod format_id;
pub mod formats;
pub mod notes;
mod outcome;
mod registry;

pub use analyzer::{Capabilities, CapabilityReport, analyze};
pub use format_id::{DecodePolicy, FormatId, FormatInfo};
pub use outcome::{DecodeOutcome, DelegatedModule, Imported};
pub use registry::{DecodeFn, Detector, FormatEntry, Registry, RegistryConfig};
pub use trackerkit_common::{FormatError, Result, TrackerSong};
