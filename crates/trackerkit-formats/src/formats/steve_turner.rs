//! Steve Turner (`JPO.`) player modules.
//!
//! These are ripped replayers. Detection needs the `JPO.` filename prefix and
//! the player's opening instructions: four `move.l #imm,` words
//! (`0x2B7C`) spaced eight bytes apart, then `move.w #imm,d0` (`0x303C`).

use trackerkit_common::Result;
use trackerkit_common::naming::{base_name, has_prefix_ci};
use trackerkit_common::reader::u16_be;

use crate::format_id::FormatId;
use crate::formats::{delegate, ensure_detected};
use crate::outcome::DecodeOutcome;
use crate::registry::{Detector, FormatEntry};

/// Through the `move.w` opcode.
pub const MIN_LEN: usize = 0x24;

const MOVE_L: u16 = 0x2B7C;
const MOVE_W_D0: u16 = 0x303C;
const PREFIX: &str = "JPO.";

pub(crate) const ENTRY: FormatEntry = FormatEntry {
    id: FormatId::SteveTurner,
    detector: Detector::Named(is_steve_turner_format),
    decoder: parse_steve_turner_file,
    min_len: MIN_LEN,
};

/// Check whether `data` is a Steve Turner module named `JPO.*`.
pub fn is_steve_turner_format(data: &[u8], filename: Option<&str>) -> bool {
    let named = filename.is_some_and(|name| has_prefix_ci(base_name(name), PREFIX));
    named
        && data.len() >= MIN_LEN
        && [0, 8, 16, 24].iter().all(|&at| u16_be(data, at) == MOVE_L)
        && u16_be(data, 0x20) == MOVE_W_D0
}

/// Recognise a Steve Turner module and hand it to the native engine.
pub fn parse_steve_turner_file(data: &[u8], filename: Option<&str>) -> Result<DecodeOutcome> {
    ensure_detected(FormatId::SteveTurner, is_steve_turner_format(data, filename))?;
    delegate(FormatId::SteveTurner, data, filename, None)
}
