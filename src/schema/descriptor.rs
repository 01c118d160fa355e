// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Static descriptor tables for message types.
//!
//! A schema compiler emits one [`MessageDescriptor`] per message type as a
//! `static` item. Fields are stored sorted by field number so that lookups
//! from the wire (by number) are a binary search, and the position of a
//! field in the table doubles as its storage slot index.
//!
//! ```
//! use fastproto::schema::{FieldDescriptor, Kind, MessageDescriptor, Syntax};
//!
//! static HELLO_FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::new("world", "demo.Hello.world", 1, Kind::String),
//!     FieldDescriptor::new("universe", "demo.Hello.universe", 2, Kind::Bool),
//! ];
//!
//! static HELLO: MessageDescriptor = MessageDescriptor {
//!     name: "Hello",
//!     full_name: "demo.Hello",
//!     syntax: Syntax::Proto3,
//!     fields: &HELLO_FIELDS,
//!     oneofs: &[],
//!     extension_ranges: &[],
//! };
//!
//! assert_eq!(HELLO.get_field(2).unwrap().name, "universe");
//! assert!(HELLO.validate().is_ok());
//! ```

use std::fmt;
use std::ops::Range;

use crate::core::{ReflectError, Value};
use crate::dynamic::DynamicMessage;
use crate::encoding::wire::{WireType, MAX_FIELD_NUMBER};

/// Schema dialect a field was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// proto2: explicit presence for singular fields, unpacked repeats
    Proto2,
    /// proto3: implicit presence for scalars, packed repeats
    Proto3,
}

/// Field kind, which fixes both the in-memory value type and the wire type.
#[derive(Clone, Copy)]
pub enum Kind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    /// Legacy delimited message encoded between start/end group tags
    Group(&'static MessageDescriptor),
    Message(&'static MessageDescriptor),
    Bytes,
    Uint32,
    Enum(&'static EnumDescriptor),
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl Kind {
    /// Wire type used for a single (unpacked) value of this kind.
    pub const fn wire_type(&self) -> WireType {
        match self {
            Kind::Int32
            | Kind::Int64
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Bool
            | Kind::Enum(_) => WireType::Varint,
            Kind::Fixed64 | Kind::Sfixed64 | Kind::Double => WireType::Fixed64,
            Kind::Fixed32 | Kind::Sfixed32 | Kind::Float => WireType::Fixed32,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
            Kind::Group(_) => WireType::StartGroup,
        }
    }

    /// Whether repeated values of this kind may use packed encoding.
    pub const fn is_packable(&self) -> bool {
        !matches!(
            self,
            Kind::String | Kind::Bytes | Kind::Message(_) | Kind::Group(_)
        )
    }

    /// Whether values of this kind are messages (embedded or group).
    pub const fn is_message(&self) -> bool {
        matches!(self, Kind::Message(_) | Kind::Group(_))
    }

    /// Whether this kind may be used as a map key.
    pub const fn is_valid_map_key(&self) -> bool {
        matches!(
            self,
            Kind::Int32
                | Kind::Int64
                | Kind::Uint32
                | Kind::Uint64
                | Kind::Sint32
                | Kind::Sint64
                | Kind::Fixed32
                | Kind::Fixed64
                | Kind::Sfixed32
                | Kind::Sfixed64
                | Kind::Bool
                | Kind::String
        )
    }

    /// Descriptor of the message type, for message and group kinds.
    pub fn message_descriptor(&self) -> Option<&'static MessageDescriptor> {
        match self {
            Kind::Message(desc) | Kind::Group(desc) => Some(desc),
            _ => None,
        }
    }

    /// Descriptor of the enum type, for enum kinds.
    pub fn enum_descriptor(&self) -> Option<&'static EnumDescriptor> {
        match self {
            Kind::Enum(desc) => Some(desc),
            _ => None,
        }
    }

    /// Schema-language name of this kind.
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Int64 => "int64",
            Kind::Uint64 => "uint64",
            Kind::Int32 => "int32",
            Kind::Fixed64 => "fixed64",
            Kind::Fixed32 => "fixed32",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Group(_) => "group",
            Kind::Message(_) => "message",
            Kind::Bytes => "bytes",
            Kind::Uint32 => "uint32",
            Kind::Enum(_) => "enum",
            Kind::Sfixed32 => "sfixed32",
            Kind::Sfixed64 => "sfixed64",
            Kind::Sint32 => "sint32",
            Kind::Sint64 => "sint64",
        }
    }

    /// Zero value of this kind. Messages yield a fresh empty instance.
    pub fn default_value(&self) -> Value {
        match self {
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(Vec::new()),
            Kind::Enum(_) => Value::EnumNumber(0),
            Kind::Message(desc) | Kind::Group(desc) => Value::Message(DynamicMessage::new(desc)),
        }
    }
}

// Message kinds compare and print by type name; descriptors can be recursive.
impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Kind::Message(a), Kind::Message(b)) | (Kind::Group(a), Kind::Group(b)) => {
                a.full_name == b.full_name
            }
            (Kind::Enum(a), Kind::Enum(b)) => a.full_name == b.full_name,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Message(desc) => write!(f, "Message({})", desc.full_name),
            Kind::Group(desc) => write!(f, "Group({})", desc.full_name),
            Kind::Enum(desc) => write!(f, "Enum({})", desc.full_name),
            other => f.write_str(other.name()),
        }
    }
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cardinality {
    /// At most one value
    Singular,
    /// A list of values
    Repeated,
    /// A map from `key` to values of the field's kind
    Map {
        /// Key kind (scalar, never float/bytes/message)
        key: Kind,
    },
}

/// One named value of an enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub name: &'static str,
    pub number: i32,
}

/// Enum type descriptor.
#[derive(Debug)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub full_name: &'static str,
    pub values: &'static [EnumValue],
}

impl EnumDescriptor {
    /// Name of the value with the given number, if declared.
    pub fn value_name(&self, number: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|v| v.number == number)
            .map(|v| v.name)
    }

    /// Number of the value with the given name, if declared.
    pub fn value_number(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.number)
    }
}

/// Oneof group descriptor. Members point at the group through
/// [`FieldDescriptor::oneof_index`].
#[derive(Debug, PartialEq, Eq)]
pub struct OneofDescriptor {
    pub name: &'static str,
    pub full_name: &'static str,
}

/// Field descriptor.
///
/// Built with `const` constructors so tables can live in `static` items:
///
/// ```
/// use fastproto::schema::{FieldDescriptor, Kind};
///
/// const SAMPLES: FieldDescriptor =
///     FieldDescriptor::new("samples", "demo.Probe.samples", 4, Kind::Sint64).repeated();
/// assert!(SAMPLES.is_packed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub full_name: &'static str,
    pub number: u32,
    pub kind: Kind,
    pub cardinality: Cardinality,
    pub syntax: Syntax,
    /// Index into the containing message's oneofs
    pub oneof_index: Option<usize>,
    /// proto3 `optional`: scalar with explicit presence
    pub proto3_optional: bool,
    /// Explicit `[packed = ...]` option; `None` uses the syntax default
    pub packed: Option<bool>,
    /// Full name of the extended message, for extension fields
    pub extendee: Option<&'static str>,
}

impl FieldDescriptor {
    /// A singular proto3 field.
    pub const fn new(
        name: &'static str,
        full_name: &'static str,
        number: u32,
        kind: Kind,
    ) -> Self {
        Self {
            name,
            full_name,
            number,
            kind,
            cardinality: Cardinality::Singular,
            syntax: Syntax::Proto3,
            oneof_index: None,
            proto3_optional: false,
            packed: None,
            extendee: None,
        }
    }

    /// Mark the field as declared in a proto2 file.
    pub const fn proto2(self) -> Self {
        Self {
            syntax: Syntax::Proto2,
            ..self
        }
    }

    /// Make the field repeated.
    pub const fn repeated(self) -> Self {
        Self {
            cardinality: Cardinality::Repeated,
            ..self
        }
    }

    /// Make the field a map keyed by `key`; the field kind is the value kind.
    pub const fn map(self, key: Kind) -> Self {
        Self {
            cardinality: Cardinality::Map { key },
            ..self
        }
    }

    /// Place the field in the oneof at `index`.
    pub const fn oneof(self, index: usize) -> Self {
        Self {
            oneof_index: Some(index),
            ..self
        }
    }

    /// Give a proto3 scalar explicit presence.
    pub const fn optional(self) -> Self {
        Self {
            proto3_optional: true,
            ..self
        }
    }

    /// Override the packed encoding default.
    pub const fn packed(self, packed: bool) -> Self {
        Self {
            packed: Some(packed),
            ..self
        }
    }

    /// Declare the field as an extension of `extendee`.
    pub const fn extension(self, extendee: &'static str) -> Self {
        Self {
            extendee: Some(extendee),
            ..self
        }
    }

    pub const fn is_list(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated)
    }

    pub const fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }

    pub const fn is_extension(&self) -> bool {
        self.extendee.is_some()
    }

    /// Key kind of a map field.
    pub const fn map_key(&self) -> Option<Kind> {
        match self.cardinality {
            Cardinality::Map { key } => Some(key),
            _ => None,
        }
    }

    /// Whether the field distinguishes "set to default" from "unset".
    ///
    /// Singular message fields, oneof members, proto2 singular fields and
    /// proto3 `optional` scalars track presence. Lists and maps never do.
    pub const fn has_presence(&self) -> bool {
        match self.cardinality {
            Cardinality::Repeated | Cardinality::Map { .. } => false,
            Cardinality::Singular => {
                self.kind.is_message()
                    || self.oneof_index.is_some()
                    || self.proto3_optional
                    || self.is_extension()
                    || matches!(self.syntax, Syntax::Proto2)
            }
        }
    }

    /// Whether repeated values are written as one packed record.
    pub const fn is_packed(&self) -> bool {
        if !self.is_list() || !self.kind.is_packable() {
            return false;
        }
        match self.packed {
            Some(packed) => packed,
            None => matches!(self.syntax, Syntax::Proto3),
        }
    }
}

/// Where a field descriptor lives inside a message instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    /// Declared field at this table index
    Field(usize),
    /// Extension field, stored by number
    Extension,
}

/// Message type descriptor.
#[derive(Debug)]
pub struct MessageDescriptor {
    pub name: &'static str,
    pub full_name: &'static str,
    pub syntax: Syntax,
    /// Declared fields, sorted by field number
    pub fields: &'static [FieldDescriptor],
    pub oneofs: &'static [OneofDescriptor],
    /// Half-open extension number ranges; empty when extensions are not allowed
    pub extension_ranges: &'static [Range<u32>],
}

impl MessageDescriptor {
    /// Table index of the field with `number`.
    pub fn field_index(&self, number: u32) -> Option<usize> {
        self.fields
            .binary_search_by_key(&number, |field| field.number)
            .ok()
    }

    /// Field with `number`.
    pub fn get_field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.field_index(number).map(|index| &self.fields[index])
    }

    /// Field with the short name `name`.
    pub fn get_field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Oneof with the short name `name`.
    pub fn get_oneof_by_name(&self, name: &str) -> Option<&OneofDescriptor> {
        self.oneofs.iter().find(|oneof| oneof.name == name)
    }

    /// Index of `oneof` in this message, matched by full name.
    pub fn oneof_index(&self, oneof: &OneofDescriptor) -> Option<usize> {
        self.oneofs
            .iter()
            .position(|candidate| candidate.full_name == oneof.full_name)
    }

    /// Table indices and descriptors of the members of oneof `index`.
    pub fn oneof_fields(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (usize, &FieldDescriptor)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, field)| field.oneof_index == Some(index))
    }

    pub fn supports_extensions(&self) -> bool {
        !self.extension_ranges.is_empty()
    }

    pub fn in_extension_range(&self, number: u32) -> bool {
        self.extension_ranges
            .iter()
            .any(|range| range.contains(&number))
    }

    /// Locate `field` in this message.
    ///
    /// Fails with [`ReflectError::ExtensionsUnsupported`] for any extension
    /// descriptor when the message declares no extension ranges, and with
    /// [`ReflectError::UnknownField`] for descriptors of other messages.
    pub fn resolve(&self, field: &FieldDescriptor) -> Result<FieldSlot, ReflectError> {
        if let Some(extendee) = field.extendee {
            if !self.supports_extensions() {
                return Err(ReflectError::ExtensionsUnsupported {
                    message: self.full_name,
                    field: field.full_name,
                });
            }
            if extendee == self.full_name && self.in_extension_range(field.number) {
                return Ok(FieldSlot::Extension);
            }
            return Err(ReflectError::unknown_field(self.full_name, field.full_name));
        }

        match self.field_index(field.number) {
            Some(index) if self.fields[index].full_name == field.full_name => {
                Ok(FieldSlot::Field(index))
            }
            _ => Err(ReflectError::unknown_field(self.full_name, field.full_name)),
        }
    }

    /// Check the structural invariants of the table.
    pub fn validate(&self) -> Result<(), ReflectError> {
        let invalid = |reason: String| ReflectError::invalid_descriptor(self.full_name, reason);

        let mut previous = 0u32;
        for field in self.fields {
            if field.number == 0 || field.number > MAX_FIELD_NUMBER {
                return Err(invalid(format!(
                    "field {} has illegal number {}",
                    field.name, field.number
                )));
            }
            if field.number <= previous {
                return Err(invalid(format!(
                    "field {} (number {}) is duplicated or out of order",
                    field.name, field.number
                )));
            }
            previous = field.number;

            if field.is_extension() {
                return Err(invalid(format!(
                    "extension {} declared as a regular field",
                    field.full_name
                )));
            }
            if let Some(index) = field.oneof_index {
                if index >= self.oneofs.len() {
                    return Err(invalid(format!(
                        "field {} refers to missing oneof {index}",
                        field.name
                    )));
                }
                if !matches!(field.cardinality, Cardinality::Singular) {
                    return Err(invalid(format!(
                        "oneof member {} must be singular",
                        field.name
                    )));
                }
            }
            if let Some(key) = field.map_key() {
                if !key.is_valid_map_key() {
                    return Err(invalid(format!(
                        "map field {} has invalid key kind {}",
                        field.name,
                        key.name()
                    )));
                }
            }
            if self.in_extension_range(field.number) {
                return Err(invalid(format!(
                    "field {} lies inside an extension range",
                    field.name
                )));
            }
        }
        Ok(())
    }
}
