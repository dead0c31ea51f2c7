//! ADPCM sample streams.
//!
//! `ADPCM2` and `ADPCM3` files carry their own signature. Mono streams have
//! none and are recognised by the `.adpcm` extension alone, provided the
//! content is not one of the signed variants.

use trackerkit_common::Result;
use trackerkit_common::naming::{base_name, has_suffix_ci};
use trackerkit_common::reader::magic_at;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Signature and stream header of the signed variants.
pub const MIN_LEN: usize = 16;
/// Shortest mono stream.
pub const MONO_MIN_LEN: usize = 2;

const EXTENSION: &str = ".adpcm";

pub(crate) const ADPCM2_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Adpcm2,
    detector: Detector::Content(is_adpcm2_format),
    decoder: parse_adpcm2_file,
    min_len: MIN_LEN,
};

pub(crate) const ADPCM3_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Adpcm3,
    detector: Detector::Content(is_adpcm3_format),
    decoder: parse_adpcm3_file,
    min_len: MIN_LEN,
};

pub(crate) const MONO_ENTRY: FormatEntry = FormatEntry {
    id: FormatId::AdpcmMono,
    detector: Detector::Named(is_adpcm_mono_format),
    decoder: parse_adpcm_mono_file,
    min_len: MONO_MIN_LEN,
};

/// Check whether `data` is an `ADPCM2` stream.
pub fn is_adpcm2_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"ADPCM2")
}

/// Recognise an `ADPCM2` stream and hand it to the native engine.
pub fn parse_adpcm2_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Adpcm2, is_adpcm2_format(data))?;
    delegate(FormatId::Adpcm2, data, filename, None)
}

/// Check whether `data` is an `ADPCM3` stream.
pub fn is_adpcm3_format(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && magic_at(data, 0, b"ADPCM3")
}

/// Recognise an `ADPCM3` stream and hand it to the native engine.
pub fn parse_adpcm3_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Adpcm3, is_adpcm3_format(data))?;
    delegate(FormatId::Adpcm3, data, filename, None)
}

/// Check whether `filename` names a mono ADPCM stream and `data` is not one
/// of the signed variants.
pub fn is_adpcm_mono_format(data: &[u8], filename: Option<&str>) -> bool {
    let Some(name) = filename.map(base_name) else {
        return false;
    };
    data.len() >= MONO_MIN_LEN
        && has_suffix_ci(name, EXTENSION)
        && !magic_at(data, 0, b"ADPCM2")
        && !magic_at(data, 0, b"ADPCM3")
}

/// Recognise a mono ADPCM stream and hand it to the native engine.
pub fn parse_adpcm_mono_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::AdpcmMono, is_adpcm_mono_format(data, filename))?;
    delegate(FormatId::AdpcmMono, data, filename, None)
}
