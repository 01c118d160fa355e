// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire size calculator for computing the encoded length of a message.

use super::wire::{sov, tag_size, zigzag_encode};

/// Wire size calculator.
///
/// Accumulates the exact number of bytes a message will occupy on the
/// wire, so the encode buffer can be allocated once before writing.
///
/// # Example
///
/// ```
/// use fastproto::encoding::SizeCalculator;
///
/// let mut calc = SizeCalculator::new();
/// calc.tag(1);                // 1 byte
/// calc.length_delimited(2);   // 1 (length) + 2 bytes
/// calc.tag(2);                // 1 byte
/// calc.varint(1);             // 1 byte
/// assert_eq!(calc.size(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SizeCalculator {
    size: usize,
}

impl SizeCalculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current calculated size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Tag of field `number`.
    pub fn tag(&mut self, number: u32) -> usize {
        self.add(tag_size(number))
    }

    /// Start and end tags of a group.
    pub fn group_tags(&mut self, number: u32) -> usize {
        self.add(2 * tag_size(number))
    }

    pub fn varint(&mut self, value: u64) -> usize {
        self.add(sov(value))
    }

    /// Zig-zag varint of a signed value (sint32/sint64).
    pub fn zigzag(&mut self, value: i64) -> usize {
        self.add(sov(zigzag_encode(value)))
    }

    pub fn fixed32(&mut self) -> usize {
        self.add(4)
    }

    pub fn fixed64(&mut self) -> usize {
        self.add(8)
    }

    /// Length prefix plus a payload of `len` bytes.
    pub fn length_delimited(&mut self, len: usize) -> usize {
        self.add(sov(len as u64) + len)
    }

    /// Bytes copied verbatim (unknown fields).
    pub fn raw(&mut self, len: usize) -> usize {
        self.add(len)
    }

    fn add(&mut self, bytes: usize) -> usize {
        self.size += bytes;
        self.size
    }
}
