// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message codec interface.
//!
//! Every message type, generated or dynamic, implements [`Message`]. The
//! trait asks each type for three primitives:
//!
//! - **Size** ([`Message::size`]) - exact encoded length
//! - **Encode** ([`Message::encode_raw`]) - back-to-front write of the body
//! - **Field merge** ([`Message::merge_field`]) - the per-type switch on
//!   field number
//!
//! and builds marshal/unmarshal on top of them. The decode loop itself is
//! shared ([`merge_message`]) so tag validation, unknown-field capture and
//! group termination behave identically for every type.
//!
//! ## Example
//!
//! ```
//! use fastproto::encoding::Message;
//! use fastproto::DynamicMessage;
//! # use fastproto::schema::{FieldDescriptor, Kind, MessageDescriptor, Syntax};
//! # static FIELDS: [FieldDescriptor; 1] =
//! #     [FieldDescriptor::new("world", "demo.Hello.world", 1, Kind::String)];
//! # static HELLO: MessageDescriptor = MessageDescriptor {
//! #     name: "Hello",
//! #     full_name: "demo.Hello",
//! #     syntax: Syntax::Proto3,
//! #     fields: &FIELDS,
//! #     oneofs: &[],
//! #     extension_ranges: &[],
//! # };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut msg = DynamicMessage::new(&HELLO);
//! msg.unmarshal(&[0x0a, 0x02, b'h', b'i'])?;
//! assert_eq!(msg.size(), 4);
//! assert_eq!(msg.marshal()?, vec![0x0a, 0x02, b'h', b'i']);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use super::cursor::WireCursor;
use super::encoder::WireEncoder;
use super::wire::{WireType, MAX_FIELD_NUMBER};
use crate::core::{DecodeError, EncodeError, Result};
use crate::schema::ExtensionRegistry;

/// Default nesting limit for embedded messages and groups.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

// =============================================================================
// Options
// =============================================================================

/// Marshal configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarshalOptions {
    /// Write map entries in key order so equal messages encode identically
    pub deterministic: bool,
}

/// Unmarshal configuration.
///
/// Deserializable from configuration files; the extension registry is
/// attached in code with [`UnmarshalOptions::with_extensions`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnmarshalOptions {
    /// Drop unrecognized fields instead of keeping their bytes
    pub discard_unknown: bool,
    /// Maximum nesting depth of embedded messages and groups
    pub recursion_limit: u32,
    /// Extensions to decode for messages with extension ranges
    #[serde(skip)]
    pub extensions: Option<Arc<ExtensionRegistry>>,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        Self {
            discard_unknown: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            extensions: None,
        }
    }
}

impl UnmarshalOptions {
    /// Decode extension fields found in `registry`.
    pub fn with_extensions(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.extensions = Some(registry);
        self
    }
}

/// Per-call decode state threaded through nested merges.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'o> {
    options: &'o UnmarshalOptions,
    depth: u32,
}

impl<'o> DecodeContext<'o> {
    pub fn new(options: &'o UnmarshalOptions) -> Self {
        Self { options, depth: 0 }
    }

    pub fn options(&self) -> &'o UnmarshalOptions {
        self.options
    }

    /// Context for one more level of nesting.
    pub fn enter(self) -> Result<Self> {
        if self.depth >= self.options.recursion_limit {
            return Err(DecodeError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }
}

// =============================================================================
// Message Trait
// =============================================================================

/// Binary codec of one message type.
pub trait Message {
    /// Fully qualified type name, used in error messages.
    fn message_name(&self) -> &'static str;

    /// Exact number of bytes [`encode_raw`](Self::encode_raw) will write.
    fn size(&self) -> usize;

    /// Write the message body back-to-front.
    ///
    /// Implementations prepend unknown bytes first, then extensions and
    /// fields in descending number, so the output reads in ascending order.
    fn encode_raw(
        &self,
        encoder: &mut WireEncoder<'_>,
        options: &MarshalOptions,
    ) -> std::result::Result<(), EncodeError>;

    /// Decode the payload of one record whose tag has been read.
    ///
    /// Returns `Ok(false)` without consuming anything when `number` is not a
    /// field of this type; the decode loop then keeps the whole record as
    /// unknown bytes.
    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        cursor: &mut WireCursor<'_>,
        ctx: DecodeContext<'_>,
    ) -> Result<bool>;

    /// Raw bytes of fields this type did not recognize.
    fn unknown_fields(&self) -> &[u8];

    fn unknown_fields_mut(&mut self) -> &mut Vec<u8>;

    /// Return every field to its zero state and drop unknown bytes.
    fn reset(&mut self);

    /// Encode into a newly allocated buffer of exactly [`size`](Self::size) bytes.
    fn marshal(&self) -> std::result::Result<Vec<u8>, EncodeError> {
        self.marshal_with(&MarshalOptions::default())
    }

    fn marshal_with(&self, options: &MarshalOptions) -> std::result::Result<Vec<u8>, EncodeError> {
        let mut buf = vec![0u8; self.size()];
        let written = self.marshal_to_with(&mut buf, options)?;
        debug_assert_eq!(
            written,
            buf.len(),
            "size and encode disagree for {}",
            self.message_name()
        );
        Ok(buf)
    }

    /// Encode into the front of `buf`, returning the number of bytes written.
    fn marshal_to(&self, buf: &mut [u8]) -> std::result::Result<usize, EncodeError> {
        self.marshal_to_with(buf, &MarshalOptions::default())
    }

    fn marshal_to_with(
        &self,
        buf: &mut [u8],
        options: &MarshalOptions,
    ) -> std::result::Result<usize, EncodeError> {
        let size = self.size();
        if buf.len() < size {
            return Err(EncodeError::InsufficientBuffer {
                required: size,
                remaining: buf.len(),
            });
        }
        let mut encoder = WireEncoder::new(&mut buf[..size]);
        self.encode_raw(&mut encoder, options)?;
        Ok(encoder.written())
    }

    /// Replace the contents of this message with the decoded `data`.
    fn unmarshal(&mut self, data: &[u8]) -> Result<()> {
        self.unmarshal_with(data, &UnmarshalOptions::default())
    }

    fn unmarshal_with(&mut self, data: &[u8], options: &UnmarshalOptions) -> Result<()> {
        self.reset();
        self.merge_with(data, options)
    }

    /// Decode `data` on top of the current contents.
    ///
    /// Singular scalars are overwritten, lists are appended to, embedded
    /// messages are merged recursively.
    fn merge(&mut self, data: &[u8]) -> Result<()> {
        self.merge_with(data, &UnmarshalOptions::default())
    }

    fn merge_with(&mut self, data: &[u8], options: &UnmarshalOptions) -> Result<()> {
        let mut cursor = WireCursor::new(data);
        merge_message(self, &mut cursor, DecodeContext::new(options), None)
    }
}

// =============================================================================
// Decode Loop
// =============================================================================

/// Decode records from `cursor` into `msg` until the input ends.
///
/// With `group = Some(number)` the loop instead stops after the end-group
/// tag carrying `number`, and running out of input is an error.
pub fn merge_message<M: Message + ?Sized>(
    msg: &mut M,
    cursor: &mut WireCursor<'_>,
    ctx: DecodeContext<'_>,
    group: Option<u32>,
) -> Result<()> {
    while !cursor.is_at_end() {
        let start = cursor.position();
        let (number, wire_type, _) = cursor.read_tag()?;

        if wire_type == WireType::EndGroup.as_u8() {
            return match group {
                Some(expected) if number == u64::from(expected) => Ok(()),
                Some(expected) => Err(DecodeError::MismatchedEndGroup {
                    expected,
                    found: number,
                }),
                None => Err(DecodeError::UnexpectedEndGroup {
                    message: msg.message_name(),
                }),
            };
        }
        if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::IllegalTag {
                message: msg.message_name(),
                field_number: number,
                wire_type,
            });
        }
        let wire_type = WireType::try_from(wire_type)?;
        let number = number as u32;

        if msg.merge_field(number, wire_type, cursor, ctx)? {
            continue;
        }

        let record = cursor.take_record(start)?;
        if ctx.options().discard_unknown {
            trace!(
                message = msg.message_name(),
                number,
                len = record.len(),
                "Discarding unknown field"
            );
        } else {
            trace!(
                message = msg.message_name(),
                number,
                len = record.len(),
                "Preserving unknown field"
            );
            msg.unknown_fields_mut().extend_from_slice(record);
        }
    }

    match group {
        Some(_) => Err(DecodeError::eof(cursor.position())),
        None => Ok(()),
    }
}

/// Merge a length-delimited embedded message into `msg`.
pub fn merge_embedded<M: Message + ?Sized>(
    msg: &mut M,
    cursor: &mut WireCursor<'_>,
    ctx: DecodeContext<'_>,
) -> Result<()> {
    let body = cursor.read_length_delimited()?;
    let mut inner = WireCursor::new(body);
    merge_message(msg, &mut inner, ctx.enter()?, None)
}

/// Merge a group body into `msg`, consuming its end tag.
pub fn merge_group<M: Message + ?Sized>(
    msg: &mut M,
    number: u32,
    cursor: &mut WireCursor<'_>,
    ctx: DecodeContext<'_>,
) -> Result<()> {
    merge_message(msg, cursor, ctx.enter()?, Some(number))
}

/// Fail with [`DecodeError::WrongWireType`] unless `found == expected`.
pub fn expect_wire_type(field: &'static str, found: WireType, expected: WireType) -> Result<()> {
    if found != expected {
        return Err(DecodeError::wrong_wire_type(field, found.as_u8()));
    }
    Ok(())
}

/// Read a length-delimited UTF-8 string.
pub fn read_string(cursor: &mut WireCursor<'_>, field: &'static str) -> Result<String> {
    let bytes = cursor.read_length_delimited()?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8 { field })
}

// =============================================================================
// Encode Helpers
// =============================================================================

/// Prepend `msg` as a length-delimited embedded message of field `number`.
pub fn encode_embedded<M: Message + ?Sized>(
    msg: &M,
    number: u32,
    encoder: &mut WireEncoder<'_>,
    options: &MarshalOptions,
) -> std::result::Result<(), EncodeError> {
    let mark = encoder.written();
    msg.encode_raw(encoder, options)?;
    encoder.close_length_delimited(number, mark)
}

/// Prepend `msg` as a group of field `number`.
pub fn encode_group<M: Message + ?Sized>(
    msg: &M,
    number: u32,
    encoder: &mut WireEncoder<'_>,
    options: &MarshalOptions,
) -> std::result::Result<(), EncodeError> {
    encoder.put_tag(number, WireType::EndGroup)?;
    msg.encode_raw(encoder, options)?;
    encoder.put_tag(number, WireType::StartGroup)
}
