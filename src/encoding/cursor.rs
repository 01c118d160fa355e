// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Forward reader over wire-format input.
//!
//! The cursor never reads past the end of its buffer: every read checks
//! the remaining length first and reports [`DecodeError::UnexpectedEof`]
//! with the offset at which bytes were missing.

use byteorder::{ByteOrder, LittleEndian};

use super::wire::{split_tag, WireType};
use crate::core::{DecodeError, Result};

/// Wire cursor that tracks the read position within a borrowed buffer.
///
/// # Example
///
/// ```
/// use fastproto::encoding::WireCursor;
///
/// let data = [0x96, 0x01];
/// let mut cursor = WireCursor::new(&data);
/// assert_eq!(cursor.read_varint().unwrap(), 150);
/// assert!(cursor.is_at_end());
/// ```
#[derive(Debug, Clone)]
pub struct WireCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Move forward by `count` bytes.
    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(DecodeError::eof(self.data.len()));
        }
        self.offset += count;
        Ok(())
    }

    /// Read a base-128 varint of at most ten bytes.
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.offset;
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return Err(DecodeError::overflow(start));
            }
            let Some(&byte) = self.data.get(self.offset) else {
                return Err(DecodeError::eof(self.offset));
            };
            self.offset += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte < 0x80 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Read a tag, returning the raw field number and wire type.
    ///
    /// The field number is not range-checked here; the decode loop owns
    /// that policy.
    pub fn read_tag(&mut self) -> Result<(u64, u8, u64)> {
        let tag = self.read_varint()?;
        let (number, wire_type) = split_tag(tag);
        Ok((number, wire_type, tag))
    }

    pub fn read_fixed32(&mut self) -> Result<u32> {
        let bytes = self.read_raw(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    pub fn read_fixed64(&mut self) -> Result<u64> {
        let bytes = self.read_raw(8)?;
        Ok(LittleEndian::read_u64(bytes))
    }

    /// Read exactly `count` bytes.
    pub fn read_raw(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(DecodeError::eof(self.data.len()));
        }
        let bytes = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    /// Read a varint length prefix and the payload it announces.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let prefix_at = self.offset;
        let length = self.read_varint()?;
        let length = usize::try_from(length)
            .ok()
            .filter(|len| *len <= isize::MAX as usize)
            .ok_or_else(|| DecodeError::invalid_length(prefix_at))?;
        self.read_raw(length)
    }

    /// Skip the payload of a field whose tag has already been consumed.
    ///
    /// For [`WireType::StartGroup`] the whole group up to its end tag is
    /// consumed, tracking nested groups.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => self.advance(8)?,
            WireType::Fixed32 => self.advance(4)?,
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::StartGroup => {
                let mut depth = 1usize;
                while depth > 0 {
                    if self.is_at_end() {
                        return Err(DecodeError::eof(self.offset));
                    }
                    let (_, wire_type, _) = self.read_tag()?;
                    match WireType::try_from(wire_type)? {
                        WireType::StartGroup => depth += 1,
                        WireType::EndGroup => depth -= 1,
                        other => self.skip_field(other)?,
                    }
                }
            }
            WireType::EndGroup => return Err(DecodeError::UnexpectedEndOfGroup),
        }
        Ok(())
    }

    /// Consume the record that starts at `start` and return its bytes.
    ///
    /// `start` is the offset of the record's tag, which may already have
    /// been read. The record is measured with [`skip`].
    pub fn take_record(&mut self, start: usize) -> Result<&'a [u8]> {
        let tail = self.data.get(start..).ok_or_else(|| DecodeError::eof(start))?;
        let len = skip(tail).map_err(|err| shift_offset(err, start))?;
        self.offset = start + len;
        Ok(&tail[..len])
    }
}

/// Measure one complete record (tag included) at the start of `data`.
///
/// Returns the number of bytes the record occupies without interpreting
/// its payload. Legacy groups are consumed up to their matching end tag.
///
/// ```
/// use fastproto::encoding::skip;
///
/// // field 1, length-delimited "hi", followed by another record
/// let data = [0x0a, 0x02, b'h', b'i', 0x10, 0x01];
/// assert_eq!(skip(&data).unwrap(), 4);
/// ```
pub fn skip(data: &[u8]) -> Result<usize> {
    let mut cursor = WireCursor::new(data);
    let mut depth = 0usize;
    loop {
        if cursor.is_at_end() {
            return Err(DecodeError::eof(cursor.position()));
        }
        let (_, wire_type, _) = cursor.read_tag()?;
        match WireType::try_from(wire_type)? {
            WireType::StartGroup => depth += 1,
            WireType::EndGroup => {
                if depth == 0 {
                    return Err(DecodeError::UnexpectedEndOfGroup);
                }
                depth -= 1;
            }
            other => cursor.skip_field(other)?,
        }
        if depth == 0 {
            return Ok(cursor.position());
        }
    }
}

/// Check that `data` is a sequence of complete, well-formed records.
pub fn validate_records(data: &[u8]) -> Result<()> {
    let mut offset = 0;
    while offset < data.len() {
        let start = offset;
        let consumed = skip(&data[start..]).map_err(|err| shift_offset(err, start))?;
        offset += consumed;
    }
    Ok(())
}

fn shift_offset(err: DecodeError, by: usize) -> DecodeError {
    match err {
        DecodeError::UnexpectedEof { offset } => DecodeError::eof(offset + by),
        DecodeError::IntOverflow { offset } => DecodeError::overflow(offset + by),
        DecodeError::InvalidLength { offset } => DecodeError::invalid_length(offset + by),
        other => other,
    }
}
