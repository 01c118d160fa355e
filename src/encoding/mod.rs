// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protocol-buffers wire encoding.
//!
//! This module provides the binary codec building blocks:
//! - [`wire`] - wire types, tags, varint sizes and zig-zag mapping
//! - [`cursor`] - forward reader and record skipping
//! - [`encoder`] - back-to-front writer over a pre-sized buffer
//! - [`calculator`] - exact encoded-size accumulation
//! - [`codec`] - the [`Message`] trait and the shared decode loop
//! - [`json`] - proto3 JSON rendering of reflective messages

pub mod calculator;
pub mod codec;
pub mod cursor;
pub mod encoder;
pub mod json;
pub mod wire;

pub use calculator::SizeCalculator;
pub use codec::{
    encode_embedded, encode_group, expect_wire_type, merge_embedded, merge_group, merge_message,
    read_string, DecodeContext, MarshalOptions, Message, UnmarshalOptions,
    DEFAULT_RECURSION_LIMIT,
};
pub use cursor::{skip, validate_records, WireCursor};
pub use encoder::WireEncoder;
pub use wire::{
    make_tag, sov, soz, split_tag, tag_size, zigzag_decode, zigzag_encode, WireType,
    MAX_FIELD_NUMBER, MAX_VARINT_LEN,
};
