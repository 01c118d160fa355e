// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protocol Buffers wire-format primitives.
//!
//! Tags, wire types, zig-zag mapping and varint sizing. All sizing
//! arithmetic is done on `u64`.

use crate::core::DecodeError;

/// Largest legal field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Longest varint encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Physical encoding of a field payload, the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            wire_type => Err(DecodeError::IllegalWireType { wire_type }),
        }
    }
}

/// Build the tag value `(number << 3) | wire_type`.
#[inline]
pub const fn make_tag(number: u32, wire_type: WireType) -> u64 {
    ((number as u64) << 3) | wire_type as u64
}

/// Split a raw tag into field number and wire type bits.
#[inline]
pub const fn split_tag(tag: u64) -> (u64, u8) {
    (tag >> 3, (tag & 0x7) as u8)
}

/// Bytes needed to varint-encode `x`: `ceil(bitlen(x | 1) / 7)`.
#[inline]
pub const fn sov(x: u64) -> usize {
    ((64 - (x | 1).leading_zeros()) as usize + 6) / 7
}

/// Bytes needed to varint-encode `x` after zig-zag mapping.
#[inline]
pub const fn soz(x: u64) -> usize {
    sov(zigzag_encode(x as i64))
}

/// Bytes needed for the tag of field `number`.
#[inline]
pub const fn tag_size(number: u32) -> usize {
    sov(make_tag(number, WireType::Varint))
}

#[inline]
pub const fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
pub const fn zigzag_decode(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}

#[inline]
pub const fn zigzag_encode32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

#[inline]
pub const fn zigzag_decode32(z: u32) -> i32 {
    ((z >> 1) as i32) ^ -((z & 1) as i32)
}
