//! Per-format detectors and decoders.
//!
//! Every format module exposes an `is_*` detector, a `parse_*` decoder and
//! an `ENTRY` row for the registry. Full decoders build a
//! [`TrackerSong`](trackerkit_common::TrackerSong); the remaining formats are
//! recognised and handed to a native engine through [`delegate`].

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, warn};
use trackerkit_common::naming::song_title;
use trackerkit_common::{FormatError, Result, SongBuilder, stub_song};

use crate::format_id::FormatId;
use crate::outcome::{DecodeOutcome, DelegatedModule};
use crate::registry::FormatEntry;

pub mod adpcm;
pub mod ahx;
pub mod c183;
pub mod chiptracker;
pub mod composer669;
pub mod coso;
pub mod delta_music;
pub mod digital_sound_studio;
pub mod dmdl;
pub mod furnace;
pub mod future_composer;
pub mod imf;
pub mod impulse;
pub mod jamcracker;
pub mod lme;
pub mod med;
pub mod mtm;
pub mod mugician;
pub mod musicline;
pub mod novotrade;
pub mod oktalyzer;
pub mod pierre_adane;
pub mod protracker;
pub mod quadra;
pub mod s3m;
pub mod sidmon;
pub mod sonic_arranger;
pub mod sound_player;
pub mod soundfx;
pub mod soundmon;
pub mod soundtracker_pro;
pub mod steve_turner;
pub mod sunvox;
pub mod td3;
pub mod tfmx;
pub mod xm;

/// The registry table in probe order.
///
/// Full decoders with strong magic come first. Weak structural detectors
/// (Sound Player, Pierre Adane) and filename-based ones run last so they
/// cannot shadow a format with an exact signature.
pub(crate) fn standard_entries() -> Vec<FormatEntry> {
    vec![
        xm::ENTRY,
        oktalyzer::ENTRY,
        td3::ENTRY,
        imf::ENTRY,
        mtm::ENTRY,
        chiptracker::ENTRY,
        protracker::ENTRY,
        composer669::ENTRY,
        furnace::ENTRY,
        mugician::ENTRY,
        tfmx::ENTRY,
        musicline::ENTRY,
        sonic_arranger::ENTRY,
        quadra::ENTRY,
        coso::ENTRY,
        sidmon::ENTRY,
        s3m::ENTRY,
        impulse::ENTRY,
        soundfx::ENTRY,
        delta_music::DM2_ENTRY,
        med::ENTRY,
        novotrade::ENTRY,
        future_composer::ENTRY,
        soundmon::ENTRY,
        ahx::HVL_ENTRY,
        ahx::AHX_ENTRY,
        jamcracker::ENTRY,
        digital_sound_studio::ENTRY,
        sunvox::ENTRY,
        delta_music::DM1_ENTRY,
        soundtracker_pro::ENTRY,
        dmdl::ENTRY,
        c183::ENTRY,
        adpcm::ADPCM2_ENTRY,
        adpcm::ADPCM3_ENTRY,
        steve_turner::ENTRY,
        sound_player::ENTRY,
        pierre_adane::ENTRY,
        adpcm::MONO_ENTRY,
        lme::ENTRY,
    ]
}

/// `Err(NotRecognized)` unless the format's own detector accepted the buffer.
pub(crate) fn ensure_detected(id: FormatId, detected: bool) -> Result<()> {
    if detected {
        Ok(())
    } else {
        Err(not_recognized(id))
    }
}

/// Error for a decoder called on a buffer its detector rejects.
pub(crate) fn not_recognized(id: FormatId) -> FormatError {
    FormatError::NotRecognized { format: id.tag() }
}

/// Title for a decoded song: the embedded one, else the filename stem.
pub(crate) fn title_for(id: FormatId, embedded: Option<&str>, filename: Option<&str>) -> String {
    let info = id.info();
    song_title(embedded, filename, info.prefixes, info.suffixes, info.name)
}

/// Title of a stub song: the module title followed by the format name, so
/// listings show which engine will play it.
pub(crate) fn stub_title(id: FormatId, embedded: Option<&str>, filename: Option<&str>) -> String {
    let title = title_for(id, embedded, filename);
    if title == id.name() {
        title
    } else {
        format!("{title} ({})", id.name())
    }
}

/// Build the delegation outcome for a recognised native-engine module.
pub(crate) fn delegate(
    id: FormatId,
    data: &[u8],
    filename: Option<&str>,
    embedded_title: Option<&str>,
) -> Result<DecodeOutcome> {
    let title = stub_title(id, embedded_title, filename);
    let stub = stub_song(id.tag(), &title)?;
    debug!(format = id.tag(), title = %title, size = data.len(), "delegating to native engine");
    Ok(DecodeOutcome::Delegate(DelegatedModule {
        stub,
        data: data.to_vec(),
        filename: filename.map(str::to_owned),
    }))
}

/// Map an order list onto the pushed patterns. Entries naming a pattern that
/// does not exist are pointed at one shared empty pattern of `rows` rows.
pub(crate) fn bind_orders(builder: &mut SongBuilder, orders: &[u16], rows: usize) -> Vec<u16> {
    let count = builder.pattern_count() as u16;
    let mut filler = None;
    let mut bound = Vec::with_capacity(orders.len());
    for &order in orders {
        if order < count {
            bound.push(order);
            continue;
        }
        let index = match filler {
            Some(index) => index,
            None => {
                let pattern = builder.empty_pattern(rows);
                let index = builder.push_pattern(pattern);
                filler = Some(index);
                index
            }
        };
        bound.push(index);
    }
    bound
}

/// Borrow sample bytes, clipping at the end of the buffer.
pub(crate) fn sample_bytes(
    id: FormatId,
    data: &[u8],
    offset: usize,
    len: usize,
    sample: usize,
) -> &[u8] {
    let start = offset.min(data.len());
    let end = offset.saturating_add(len).min(data.len());
    if end - start < len {
        warn!(
            format = id.tag(),
            sample,
            expected = len,
            available = end - start,
            "sample data truncated"
        );
    }
    &data[start..end]
}

/// Reinterpret bytes as signed 8-bit PCM.
pub(crate) fn pcm8(bytes: &[u8]) -> Vec<i8> {
    bytes.iter().map(|&b| b as i8).collect()
}

/// Read little-endian signed 16-bit PCM. A trailing odd byte is dropped.
pub(crate) fn pcm16_le(bytes: &[u8]) -> Vec<i16> {
    let mut frames = vec![0i16; bytes.len() / 2];
    LittleEndian::read_i16_into(&bytes[..frames.len() * 2], &mut frames);
    frames
}

#[cfg(test)]
pub(crate) mod test_util {
    //! Byte builders for synthetic fixtures.

    /// Zeroed buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Vec<u8> {
        vec![0u8; len]
    }

    /// Copy `bytes` into `data` at `offset`, growing it if needed.
    pub fn put(data: &mut Vec<u8>, offset: usize, bytes: &[u8]) {
        if data.len() < offset + bytes.len() {
            data.resize(offset + bytes.len(), 0);
        }
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Write a big-endian `u16`.
    pub fn put_u16_be(data: &mut Vec<u8>, offset: usize, value: u16) {
        put(data, offset, &value.to_be_bytes());
    }

    /// Write a little-endian `u16`.
    pub fn put_u16_le(data: &mut Vec<u8>, offset: usize, value: u16) {
        put(data, offset, &value.to_le_bytes());
    }

    /// Write a big-endian `u32`.
    pub fn put_u32_be(data: &mut Vec<u8>, offset: usize, value: u32) {
        put(data, offset, &value.to_be_bytes());
    }

    /// Write a little-endian `u32`.
    pub fn put_u32_le(data: &mut Vec<u8>, offset: usize, value: u32) {
        put(data, offset, &value.to_le_bytes());
    }
}
