//! NovoTrade Packer modules.
//!
//! An IFF-like chain: `MODU` header whose word at 16 gives the distance to
//! `BODY` (counted from offset 4), a `BODY` chunk with its size word at +4,
//! then `SAMP` with its own size word. Every size is even and non-zero.

use trackerkit_common::Result;
use trackerkit_common::reader::{checked_u16, magic_at, Endian};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// `MODU` header through the first chunk.
pub const MIN_LEN: usize = 28;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::NovoTrade,
    detector: Detector::Content(is_novotrade_format),
    decoder: parse_novotrade_file,
    min_len: MIN_LEN,
};

fn even_size(data: &[u8], offset: usize) -> Option<usize> {
    checked_u16(data, offset, Endian::Big)
        .filter(|&size| size != 0 && size % 2 == 0)
        .map(usize::from)
}

/// Check whether `data` is a NovoTrade packed module.
pub fn is_novotrade_format(data: &[u8]) -> bool {
    if data.len() < MIN_LEN || !magic_at(data, 0, b"MODU") {
        return false;
    }
    let chain = || -> Option<()> {
        let body = 4 + even_size(data, 16)?;
        if !magic_at(data, body, b"BODY") {
            return None;
        }
        let samp = body + even_size(data, body + 4)?;
        if !magic_at(data, samp, b"SAMP") {
            return None;
        }
        even_size(data, samp + 4).map(|_| ())
    };
    chain().is_some()
}

/// Recognise a NovoTrade module and hand it to the native engine.
pub fn parse_novotrade_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::NovoTrade, is_novotrade_format(data))?;
    delegate(FormatId::NovoTrade, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    fn module() -> Vec<u8> {
        let mut data = zeroed(MIN_LEN);
        put(&mut data, 0, b"MODU");
        put(&mut data, 12, b"BODY");
        put_u16_be(&mut data, 16, 8);
        put(&mut data, 20, b"SAMP");
        put_u16_be(&mut data, 24, 8);
        data
    }

    #[test]
    fn test_chunk_chain() {
        assert!(is_novotrade_format(&module()));
        assert!(!is_novotrade_format(&module()[..MIN_LEN - 1]));
    }

    #[test]
    fn test_rejects_odd_or_zero_sizes() {
        let mut data = module();
        put_u16_be(&mut data, 24, 7);
        assert!(!is_novotrade_format(&data));
        put_u16_be(&mut data, 24, 0);
        assert!(!is_novotrade_format(&data));
    }

    #[test]
    fn test_rejects_missing_samp() {
        let mut data = module();
        put(&mut data, 20, b"SMPL");
        assert!(!is_novotrade_format(&data));
    }

    #[test]
    fn test_name_mentions_packer() {
        let song = parse_novotrade_file(&module(), None).unwrap().into_song();
        assert!(song.name.contains("NovoTrade"));

        let song = parse_novotrade_file(&module(), Some("NTP.intro")).unwrap().into_song();
        assert_eq!(song.name, "intro (NovoTrade Packer) [NTP]");
    }
}
