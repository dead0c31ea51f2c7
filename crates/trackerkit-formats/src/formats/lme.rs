//! Leggless Music Editor modules.

use trackerkit_common::Result;
use trackerkit_common::naming::{base_name, has_prefix_ci, has_suffix_ci};

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Header block that must not be blank.
pub const MIN_LEN: usize = 32;

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::Lme,
    detector: Detector::Named(is_lme_format),
    decoder: parse_lme_file,
    min_len: MIN_LEN,
};

/// Check whether `filename` follows the LME convention and the header is
/// not all zero.
pub fn is_lme_format(data: &[u8], filename: Option<&str>) -> bool {
    let named = filename
        .map(base_name)
        .is_some_and(|name| has_suffix_ci(name, ".lme") || has_prefix_ci(name, "LME."));
    named && data.len() >= MIN_LEN && data[..MIN_LEN].iter().any(|&b| b != 0)
}

/// Recognise an LME module and hand it to the native engine.
pub fn parse_lme_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::Lme, is_lme_format(data, filename))?;
    delegate(FormatId::Lme, data, filename, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::test_util::*;

    #[test]
    fn test_name_conventions() {
        let mut data = zeroed(MIN_LEN);
        data[31] = 1;
        assert!(is_lme_format(&data, Some("LME.tune")));
        assert!(is_lme_format(&data, Some("tune.LME")));
        assert!(!is_lme_format(&data, Some("tune.mod")));
        assert!(!is_lme_format(&data, None));
    }

    #[test]
    fn test_blank_header() {
        let data = zeroed(256);
        assert!(!is_lme_format(&data, Some("LME.tune")));
        assert!(!is_lme_format(&[1; MIN_LEN - 1], Some("LME.tune")));
    }
}
