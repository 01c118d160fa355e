// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for fastproto.
//!
//! Errors fall into three families that callers handle differently:
//! - [`DecodeError`] - malformed wire input, fatal to the current decode call
//! - [`EncodeError`] - caller supplied a destination buffer that is too small
//! - [`ReflectError`] - descriptor/type mismatches on the reflective accessor
//!
//! Decoding is deterministic, so none of these are worth retrying.

use thiserror::Error;

/// Malformed-input errors raised while decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended in the middle of a record.
    #[error("proto: unexpected end of input at offset {offset}")]
    UnexpectedEof {
        /// Offset at which more bytes were required
        offset: usize,
    },

    /// A varint continued past 64 bits.
    #[error("proto: integer overflow at offset {offset}")]
    IntOverflow {
        /// Offset of the first byte of the varint
        offset: usize,
    },

    /// A length prefix does not fit in the address space.
    #[error("proto: negative length found during unmarshaling at offset {offset}")]
    InvalidLength {
        /// Offset of the length prefix
        offset: usize,
    },

    /// An end-group tag outside of any group.
    #[error("proto: {message}: wiretype end group for non-group")]
    UnexpectedEndGroup {
        /// Message being decoded
        message: &'static str,
    },

    /// An end-group tag at depth zero while skipping.
    #[error("proto: unexpected end of group")]
    UnexpectedEndOfGroup,

    /// An end-group tag whose number does not match the open group.
    #[error("proto: end group for field {found} while decoding group {expected}")]
    MismatchedEndGroup {
        /// Field number of the open group
        expected: u32,
        /// Field number carried by the end tag
        found: u64,
    },

    /// Field number zero or beyond the largest legal number.
    #[error("proto: {message}: illegal tag {field_number} (wire type {wire_type})")]
    IllegalTag {
        /// Message being decoded
        message: &'static str,
        /// Decoded field number
        field_number: u64,
        /// Wire type bits of the tag
        wire_type: u8,
    },

    /// Wire types 6 and 7 are not defined.
    #[error("proto: illegal wireType {wire_type}")]
    IllegalWireType {
        /// The offending wire type
        wire_type: u8,
    },

    /// A known field arrived with a wire type its kind cannot carry.
    #[error("proto: wrong wireType = {wire_type} for field {field}")]
    WrongWireType {
        /// Field name
        field: &'static str,
        /// The wire type found on the wire
        wire_type: u8,
    },

    /// A string field held bytes that are not UTF-8.
    #[error("proto: field {field} contains invalid UTF-8")]
    InvalidUtf8 {
        /// Field full name
        field: &'static str,
    },

    /// Embedded messages nested deeper than the configured limit.
    #[error("proto: exceeded maximum recursion depth of {limit}")]
    RecursionLimitExceeded {
        /// Configured limit
        limit: u32,
    },
}

impl DecodeError {
    /// Create an unexpected end-of-input error.
    pub fn eof(offset: usize) -> Self {
        DecodeError::UnexpectedEof { offset }
    }

    /// Create an integer overflow error.
    pub fn overflow(offset: usize) -> Self {
        DecodeError::IntOverflow { offset }
    }

    /// Create an invalid length error.
    pub fn invalid_length(offset: usize) -> Self {
        DecodeError::InvalidLength { offset }
    }

    /// Create a wrong wire type error.
    pub fn wrong_wire_type(field: &'static str, wire_type: u8) -> Self {
        DecodeError::WrongWireType { field, wire_type }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            DecodeError::UnexpectedEof { offset }
            | DecodeError::IntOverflow { offset }
            | DecodeError::InvalidLength { offset } => vec![("offset", offset.to_string())],
            DecodeError::UnexpectedEndGroup { message } => vec![("message", message.to_string())],
            DecodeError::UnexpectedEndOfGroup => Vec::new(),
            DecodeError::MismatchedEndGroup { expected, found } => vec![
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            DecodeError::IllegalTag {
                message,
                field_number,
                wire_type,
            } => vec![
                ("message", message.to_string()),
                ("field_number", field_number.to_string()),
                ("wire_type", wire_type.to_string()),
            ],
            DecodeError::IllegalWireType { wire_type } => {
                vec![("wire_type", wire_type.to_string())]
            }
            DecodeError::WrongWireType { field, wire_type } => vec![
                ("field", field.to_string()),
                ("wire_type", wire_type.to_string()),
            ],
            DecodeError::InvalidUtf8 { field } => vec![("field", field.to_string())],
            DecodeError::RecursionLimitExceeded { limit } => vec![("limit", limit.to_string())],
        }
    }
}

/// Errors raised while marshaling into a caller-provided buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The destination cannot hold the encoded message.
    #[error("proto: buffer too small: need {required} bytes, {remaining} remaining")]
    InsufficientBuffer {
        /// Bytes the next write needed
        required: usize,
        /// Bytes still free in the buffer
        remaining: usize,
    },
}

/// Programming-contract errors from the reflective accessor.
///
/// These indicate that a descriptor was used with a message type it does
/// not belong to, or that an operation was applied to the wrong kind of
/// field. They are never caused by input data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// The field descriptor is not part of the message.
    #[error("message {message} does not contain field {field}")]
    UnknownField {
        /// Message full name
        message: &'static str,
        /// Field full name
        field: &'static str,
    },

    /// An extension descriptor was used on a message without extension ranges.
    #[error("message {message} does not support extensions: {field}")]
    ExtensionsUnsupported {
        /// Message full name
        message: &'static str,
        /// Extension full name
        field: &'static str,
    },

    /// The oneof descriptor is not part of the message.
    #[error("message {message} does not contain oneof {oneof}")]
    UnknownOneof {
        /// Message full name
        message: &'static str,
        /// Oneof full name
        oneof: &'static str,
    },

    /// Mutable was called on a scalar field.
    #[error("field {field} is not a composite type")]
    NotComposite {
        /// Field full name
        field: &'static str,
    },

    /// The supplied value does not fit the field.
    #[error("invalid value for field {field}: expected {expected}, got {found}")]
    TypeMismatch {
        /// Field full name
        field: &'static str,
        /// Expected value type
        expected: &'static str,
        /// Supplied value type
        found: &'static str,
    },

    /// Two messages of different types were combined.
    #[error("cannot copy {found} into {expected}")]
    MessageMismatch {
        /// Destination message full name
        expected: &'static str,
        /// Source message full name
        found: &'static str,
    },

    /// A non-extension field was handed to the extension registry.
    #[error("field {field} is not an extension")]
    NotAnExtension {
        /// Field full name
        field: &'static str,
    },

    /// A descriptor table violates a structural invariant.
    #[error("invalid descriptor {message}: {reason}")]
    InvalidDescriptor {
        /// Message full name
        message: &'static str,
        /// What is wrong
        reason: String,
    },
}

impl ReflectError {
    /// Create an unknown field error.
    pub fn unknown_field(message: &'static str, field: &'static str) -> Self {
        ReflectError::UnknownField { message, field }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(field: &'static str, expected: &'static str, found: &'static str) -> Self {
        ReflectError::TypeMismatch {
            field,
            expected,
            found,
        }
    }

    /// Create an invalid descriptor error.
    pub fn invalid_descriptor(message: &'static str, reason: impl Into<String>) -> Self {
        ReflectError::InvalidDescriptor {
            message,
            reason: reason.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ReflectError::UnknownField { message, field }
            | ReflectError::ExtensionsUnsupported { message, field } => vec![
                ("message", message.to_string()),
                ("field", field.to_string()),
            ],
            ReflectError::UnknownOneof { message, oneof } => vec![
                ("message", message.to_string()),
                ("oneof", oneof.to_string()),
            ],
            ReflectError::NotComposite { field } | ReflectError::NotAnExtension { field } => {
                vec![("field", field.to_string())]
            }
            ReflectError::TypeMismatch {
                field,
                expected,
                found,
            } => vec![
                ("field", field.to_string()),
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            ReflectError::MessageMismatch { expected, found } => vec![
                ("expected", expected.to_string()),
                ("found", found.to_string()),
            ],
            ReflectError::InvalidDescriptor { message, reason } => vec![
                ("message", message.to_string()),
                ("reason", reason.clone()),
            ],
        }
    }
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
