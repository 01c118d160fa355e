// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Back-to-front wire encoder.
//!
//! The encoder writes into a buffer whose size was computed up front by
//! `Message::size`. It starts at the end of the buffer and moves toward
//! the start, so a length-delimited record is written payload first and
//! its length prefix afterwards, once the payload span is known. No
//! length back-patching is ever needed.

use byteorder::{ByteOrder, LittleEndian};

use super::wire::{make_tag, sov, WireType};
use crate::core::EncodeError;

type EncodeResult = std::result::Result<(), EncodeError>;

/// Encoder writing from the tail of a pre-sized buffer toward its head.
///
/// # Example
///
/// ```
/// use fastproto::encoding::{WireEncoder, WireType};
///
/// let mut buf = [0u8; 4];
/// let mut encoder = WireEncoder::new(&mut buf);
/// encoder.put_slice(b"hi").unwrap();
/// encoder.put_varint(2).unwrap();
/// encoder.put_tag(1, WireType::LengthDelimited).unwrap();
/// assert_eq!(encoder.written(), 4);
/// assert_eq!(buf, [0x0a, 0x02, b'h', b'i']);
/// ```
#[derive(Debug)]
pub struct WireEncoder<'a> {
    buf: &'a mut [u8],
    /// Index of the first written byte; writing moves it toward zero
    pos: usize,
}

impl<'a> WireEncoder<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        let pos = buf.len();
        Self { buf, pos }
    }

    /// Bytes written so far (all at the tail of the buffer).
    #[inline]
    pub fn written(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Free bytes left in front of the written region.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.pos
    }

    #[inline]
    fn reserve(&mut self, count: usize) -> Result<usize, EncodeError> {
        if count > self.pos {
            return Err(EncodeError::InsufficientBuffer {
                required: count,
                remaining: self.pos,
            });
        }
        self.pos -= count;
        Ok(self.pos)
    }

    pub fn put_u8(&mut self, byte: u8) -> EncodeResult {
        let at = self.reserve(1)?;
        self.buf[at] = byte;
        Ok(())
    }

    /// Prepend raw bytes verbatim.
    pub fn put_slice(&mut self, bytes: &[u8]) -> EncodeResult {
        let at = self.reserve(bytes.len())?;
        self.buf[at..at + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Prepend `value` as a base-128 varint.
    pub fn put_varint(&mut self, mut value: u64) -> EncodeResult {
        let mut at = self.reserve(sov(value))?;
        while value >= 0x80 {
            self.buf[at] = (value as u8 & 0x7F) | 0x80;
            value >>= 7;
            at += 1;
        }
        self.buf[at] = value as u8;
        Ok(())
    }

    pub fn put_tag(&mut self, number: u32, wire_type: WireType) -> EncodeResult {
        self.put_varint(make_tag(number, wire_type))
    }

    pub fn put_bool(&mut self, value: bool) -> EncodeResult {
        self.put_u8(u8::from(value))
    }

    pub fn put_fixed32(&mut self, value: u32) -> EncodeResult {
        let at = self.reserve(4)?;
        LittleEndian::write_u32(&mut self.buf[at..at + 4], value);
        Ok(())
    }

    pub fn put_fixed64(&mut self, value: u64) -> EncodeResult {
        let at = self.reserve(8)?;
        LittleEndian::write_u64(&mut self.buf[at..at + 8], value);
        Ok(())
    }

    /// Prepend a complete length-delimited record: tag, length, payload.
    pub fn put_bytes_field(&mut self, number: u32, payload: &[u8]) -> EncodeResult {
        self.put_slice(payload)?;
        self.put_varint(payload.len() as u64)?;
        self.put_tag(number, WireType::LengthDelimited)
    }

    /// Prepend the length prefix and tag for a body written since `mark`.
    ///
    /// `mark` is the value of [`written`](Self::written) taken before the
    /// body was written.
    pub fn close_length_delimited(&mut self, number: u32, mark: usize) -> EncodeResult {
        let length = self.written() - mark;
        self.put_varint(length as u64)?;
        self.put_tag(number, WireType::LengthDelimited)
    }
}
