//! Endianness-aware readers over raw module bytes.
//!
//! Two flavours are provided:
//!
//! - Free functions (`read_u8`, `read_u16`, `read_u32`, ...) for detectors.
//!   They never panic; reads past the end of the buffer return an all-ones
//!   sentinel (`0xFF`, `0xFFFF`, `0xFFFF_FFFF`) so that magic and range
//!   comparisons simply fail. Detectors still guard on minimum length first.
//! - [`ByteReader`], a cursor for decoders that reports overruns as
//!   [`FormatError::Malformed`].
//!
//! Strings are legacy 8-bit text: each byte becomes the char with the same
//! code point and no encoding validation is done.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{FormatError, Result};

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Motorola order (Amiga, Atari ST formats).
    Big,
    /// Intel order (PC tracker formats).
    Little,
}

/// Borrow `len` bytes at `offset`, or `None` if any of them is out of range.
#[inline]
pub fn window(data: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    data.get(offset..offset.checked_add(len)?)
}

/// Read one byte, `0xFF` when out of range.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> u8 {
    data.get(offset).copied().unwrap_or(u8::MAX)
}

/// Read a 16-bit value, `0xFFFF` when out of range.
#[inline]
pub fn read_u16(data: &[u8], offset: usize, endian: Endian) -> u16 {
    checked_u16(data, offset, endian).unwrap_or(u16::MAX)
}

/// Read a 32-bit value, `0xFFFF_FFFF` when out of range.
#[inline]
pub fn read_u32(data: &[u8], offset: usize, endian: Endian) -> u32 {
    checked_u32(data, offset, endian).unwrap_or(u32::MAX)
}

/// Read a 16-bit value if it lies fully inside the buffer.
#[inline]
pub fn checked_u16(data: &[u8], offset: usize, endian: Endian) -> Option<u16> {
    let bytes = window(data, offset, 2)?;
    Some(match endian {
        Endian::Big => BigEndian::read_u16(bytes),
        Endian::Little => LittleEndian::read_u16(bytes),
    })
}

/// Read a 32-bit value if it lies fully inside the buffer.
#[inline]
pub fn checked_u32(data: &[u8], offset: usize, endian: Endian) -> Option<u32> {
    let bytes = window(data, offset, 4)?;
    Some(match endian {
        Endian::Big => BigEndian::read_u32(bytes),
        Endian::Little => LittleEndian::read_u32(bytes),
    })
}

/// Big-endian `u16` with sentinel.
#[inline]
pub fn u16_be(data: &[u8], offset: usize) -> u16 {
    read_u16(data, offset, Endian::Big)
}

/// Little-endian `u16` with sentinel.
#[inline]
pub fn u16_le(data: &[u8], offset: usize) -> u16 {
    read_u16(data, offset, Endian::Little)
}

/// Big-endian `u32` with sentinel.
#[inline]
pub fn u32_be(data: &[u8], offset: usize) -> u32 {
    read_u32(data, offset, Endian::Big)
}

/// Little-endian `u32` with sentinel.
#[inline]
pub fn u32_le(data: &[u8], offset: usize) -> u32 {
    read_u32(data, offset, Endian::Little)
}

/// `true` if `magic` appears verbatim at `offset`.
#[inline]
pub fn magic_at(data: &[u8], offset: usize, magic: &[u8]) -> bool {
    window(data, offset, magic.len()) == Some(magic)
}

/// Position of the first occurrence of `needle` starting before `limit`.
pub fn find_bytes(data: &[u8], needle: &[u8], limit: usize) -> Option<usize> {
    if needle.is_empty() || data.len() < needle.len() {
        return None;
    }
    let last_start = (data.len() - needle.len()).min(limit);
    (0..=last_start).find(|&pos| &data[pos..pos + needle.len()] == needle)
}

/// Read a fixed-width 8-bit string. Stops at the first NUL; bytes past the
/// end of the buffer are ignored.
pub fn read_fixed_string(data: &[u8], offset: usize, len: usize) -> String {
    let end = offset.saturating_add(len).min(data.len());
    let bytes = data.get(offset..end).unwrap_or(&[]);
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Read `chars` UTF-16BE code units. Unpaired surrogates become U+FFFD.
pub fn read_fixed_string_utf16be(data: &[u8], offset: usize, chars: usize) -> String {
    let units: Vec<u16> = (0..chars)
        .map_while(|i| checked_u16(data, offset + i * 2, Endian::Big))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Trim a fixed-width title: drop trailing blanks and replace control codes.
pub fn clean_title(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Combine two nibble-carrying bytes into one value: `(hi << 4) | (lo & 0xF)`.
#[inline]
pub fn nibble_byte(hi: u8, lo: u8) -> u8 {
    (hi << 4) | (lo & 0x0F)
}

/// Decode 16 step flags stored as four nibble bytes `n0 n1 n2 n3`.
///
/// `n0 n1` form the low byte and `n2 n3` the high byte; step `i` is bit `i`
/// of the resulting word (LSB first). Missing bytes read as zero.
pub fn nibble_flags16(bytes: &[u8]) -> u16 {
    let nib = |i: usize| bytes.get(i).copied().unwrap_or(0);
    let lo = nibble_byte(nib(0), nib(1)) as u16;
    let hi = nibble_byte(nib(2), nib(3)) as u16;
    lo | (hi << 8)
}

/// Test step `step` (0..16) of a flag word produced by [`nibble_flags16`].
#[inline]
pub fn flag_at(flags: u16, step: usize) -> bool {
    step < 16 && (flags >> step) & 1 == 1
}

/// Sequential reader for decoders.
///
/// Every read is bounds-checked and reports overruns as
/// [`FormatError::Malformed`] tagged with the decoder's format.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    format: &'static str,
}

impl<'a> ByteReader<'a> {
    /// Reader positioned at the start of `data`.
    pub fn new(data: &'a [u8], format: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            format,
        }
    }

    /// Reader positioned at `pos`.
    pub fn at(data: &'a [u8], pos: usize, format: &'static str) -> Result<Self> {
        let mut reader = Self::new(data, format);
        reader.seek(pos)?;
        Ok(reader)
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset (the end of the buffer is allowed).
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.eof(pos));
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance by `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let target = self.pos.checked_add(count).ok_or_else(|| self.eof(usize::MAX))?;
        self.seek(target)
    }

    /// Borrow the next `count` bytes.
    pub fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let slice = window(self.data, self.pos, count).ok_or_else(|| self.eof(self.pos))?;
        self.pos += count;
        Ok(slice)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    /// Read one signed byte.
    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    /// Read a big-endian `u16`.
    pub fn u16_be(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.bytes(2)?))
    }

    /// Read a little-endian `u16`.
    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.bytes(2)?))
    }

    /// Read a big-endian `u32`.
    pub fn u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.bytes(4)?))
    }

    /// Read a little-endian `u32`.
    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.bytes(4)?))
    }

    /// Read a fixed-width 8-bit string.
    pub fn string(&mut self, len: usize) -> Result<String> {
        let start = self.pos;
        self.bytes(len)?;
        Ok(read_fixed_string(self.data, start, len))
    }

    fn eof(&self, at: usize) -> FormatError {
        FormatError::malformed(
            self.format,
            format!("unexpected end of data at offset {at} (size {})", self.data.len()),
        )
    }
}
