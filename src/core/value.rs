// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field value type system.
//!
//! [`Value`] is the owned representation of any field value handed across
//! the reflective accessor. Every variant corresponds to one or more
//! field kinds; [`Value::matches_kind`] is the single source of truth for
//! that mapping.

use std::collections::HashMap;
use std::fmt;

use crate::core::ReflectError;
use crate::dynamic::DynamicMessage;
use crate::schema::{Cardinality, FieldDescriptor, Kind, MessageDescriptor};

/// Owned value of a field.
///
/// Integer variants are grouped by in-memory width, not wire encoding:
/// `int32`, `sint32` and `sfixed32` fields all hold [`Value::I32`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value by number; numbers outside the declared set are kept
    EnumNumber(i32),
    Message(DynamicMessage),
    List(Vec<Value>),
    Map(HashMap<MapKey, Value>),
}

impl Value {
    // ========================================================================
    // Kind Checks
    // ========================================================================

    /// Whether this value can be stored in a single field of `kind`.
    pub fn matches_kind(&self, kind: &Kind) -> bool {
        match (kind, self) {
            (Kind::Double, Value::F64(_))
            | (Kind::Float, Value::F32(_))
            | (Kind::Int64 | Kind::Sint64 | Kind::Sfixed64, Value::I64(_))
            | (Kind::Uint64 | Kind::Fixed64, Value::U64(_))
            | (Kind::Int32 | Kind::Sint32 | Kind::Sfixed32, Value::I32(_))
            | (Kind::Uint32 | Kind::Fixed32, Value::U32(_))
            | (Kind::Bool, Value::Bool(_))
            | (Kind::String, Value::String(_))
            | (Kind::Bytes, Value::Bytes(_))
            | (Kind::Enum(_), Value::EnumNumber(_)) => true,
            (Kind::Message(desc) | Kind::Group(desc), Value::Message(msg)) => {
                msg.descriptor().full_name == desc.full_name
            }
            _ => false,
        }
    }

    /// Check that this value is assignable to `field` as a whole.
    ///
    /// Lists and maps are checked element by element.
    pub fn check_field(&self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        let mismatch = |expected: &'static str, found: &'static str| {
            Err(ReflectError::type_mismatch(field.full_name, expected, found))
        };
        match (&field.cardinality, self) {
            (Cardinality::Repeated, Value::List(items)) => {
                for item in items {
                    if !item.matches_kind(&field.kind) {
                        return mismatch(field.kind.name(), item.type_name());
                    }
                }
                Ok(())
            }
            (Cardinality::Map { key }, Value::Map(entries)) => {
                for (k, v) in entries {
                    if !k.matches_kind(key) {
                        return mismatch(key.name(), k.type_name());
                    }
                    if !v.matches_kind(&field.kind) {
                        return mismatch(field.kind.name(), v.type_name());
                    }
                }
                Ok(())
            }
            (Cardinality::Repeated, other) => mismatch("list", other.type_name()),
            (Cardinality::Map { .. }, other) => mismatch("map", other.type_name()),
            (Cardinality::Singular, value) if value.matches_kind(&field.kind) => Ok(()),
            (Cardinality::Singular, other) => mismatch(field.kind.name(), other.type_name()),
        }
    }

    /// Equality with floats compared by bit pattern, recursively.
    ///
    /// Unlike `==`, a NaN equals an identical NaN and `-0.0` differs from
    /// `0.0`, which matches what survives an encode/decode cycle.
    pub fn bit_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.bit_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.bit_eq(y)))
            }
            _ => self == other,
        }
    }

    /// Whether this is the zero value of its type.
    ///
    /// Floats compare by bit pattern, so `-0.0` is not zero. Messages are
    /// never zero: their presence is always explicit.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(v) => !v,
            Value::I32(v) | Value::EnumNumber(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::U32(v) => *v == 0,
            Value::U64(v) => *v == 0,
            Value::F32(v) => v.to_bits() == 0,
            Value::F64(v) => v.to_bits() == 0,
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Map(v) => v.is_empty(),
            Value::Message(_) => false,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match self {
            Value::EnumNumber(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<MapKey, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Take the message out of this value.
    pub fn into_message(self) -> Option<DynamicMessage> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    // ========================================================================
    // In-place Slot Access
    // ========================================================================

    /// Message held by this slot, replacing any other content with an
    /// empty message of type `desc`.
    pub(crate) fn message_or_insert(
        &mut self,
        desc: &'static MessageDescriptor,
    ) -> &mut DynamicMessage {
        match self {
            Value::Message(m) => m,
            other => {
                *other = Value::Message(DynamicMessage::new(desc));
                other.message_or_insert(desc)
            }
        }
    }

    /// List held by this slot, replacing any other content with an empty list.
    pub(crate) fn list_or_insert(&mut self) -> &mut Vec<Value> {
        match self {
            Value::List(items) => items,
            other => {
                *other = Value::List(Vec::new());
                other.list_or_insert()
            }
        }
    }

    /// Map held by this slot, replacing any other content with an empty map.
    pub(crate) fn map_or_insert(&mut self) -> &mut HashMap<MapKey, Value> {
        match self {
            Value::Map(entries) => entries,
            other => {
                *other = Value::Map(HashMap::new());
                other.map_or_insert()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::EnumNumber(v) => write!(f, "enum({v})"),
            Value::Message(m) => write!(f, "{}{{..}}", m.descriptor().full_name),
            Value::List(v) => write!(f, "[{} elements]", v.len()),
            Value::Map(v) => write!(f, "{{{} entries}}", v.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<DynamicMessage> for Value {
    fn from(v: DynamicMessage) -> Self {
        Value::Message(v)
    }
}

// =============================================================================
// Map Keys
// =============================================================================

/// Key of a map field entry.
///
/// Ordered so that deterministic marshaling can sort entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl MapKey {
    /// Whether this key can be stored in a map keyed by `kind`.
    pub fn matches_kind(&self, kind: &Kind) -> bool {
        matches!(
            (kind, self),
            (Kind::Bool, MapKey::Bool(_))
                | (Kind::Int32 | Kind::Sint32 | Kind::Sfixed32, MapKey::I32(_))
                | (Kind::Int64 | Kind::Sint64 | Kind::Sfixed64, MapKey::I64(_))
                | (Kind::Uint32 | Kind::Fixed32, MapKey::U32(_))
                | (Kind::Uint64 | Kind::Fixed64, MapKey::U64(_))
                | (Kind::String, MapKey::String(_))
        )
    }

    /// Zero key for `kind`, used when an entry omits its key.
    pub fn default_for(kind: &Kind) -> Option<MapKey> {
        MapKey::from_value(kind.default_value())
    }

    /// Convert a scalar value into a key. Returns `None` for kinds that
    /// cannot key a map.
    pub fn from_value(value: Value) -> Option<MapKey> {
        match value {
            Value::Bool(v) => Some(MapKey::Bool(v)),
            Value::I32(v) => Some(MapKey::I32(v)),
            Value::I64(v) => Some(MapKey::I64(v)),
            Value::U32(v) => Some(MapKey::U32(v)),
            Value::U64(v) => Some(MapKey::U64(v)),
            Value::String(v) => Some(MapKey::String(v)),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            MapKey::Bool(_) => "bool",
            MapKey::I32(_) => "int32",
            MapKey::I64(_) => "int64",
            MapKey::U32(_) => "uint32",
            MapKey::U64(_) => "uint64",
            MapKey::String(_) => "string",
        }
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Bool(v) => Value::Bool(v),
            MapKey::I32(v) => Value::I32(v),
            MapKey::I64(v) => Value::I64(v),
            MapKey::U32(v) => Value::U32(v),
            MapKey::U64(v) => Value::U64(v),
            MapKey::String(v) => Value::String(v),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(v) => write!(f, "{v}"),
            MapKey::I32(v) => write!(f, "{v}"),
            MapKey::I64(v) => write!(f, "{v}"),
            MapKey::U32(v) => write!(f, "{v}"),
            MapKey::U64(v) => write!(f, "{v}"),
            MapKey::String(v) => f.write_str(v),
        }
    }
}

// =============================================================================
// Typed Scalars
// =============================================================================

/// Rust scalar types that map one-to-one onto a [`Value`] variant.
///
/// Generated message types keep repeated scalars in plain `Vec<T>`; this
/// trait lets those vectors be exposed through the reflective list handle.
pub trait ScalarValue: Sized + Clone {
    /// Name reported in type mismatch errors
    const TYPE_NAME: &'static str;

    fn into_value(self) -> Value;

    /// Convert back, returning the value unchanged when its variant differs.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl ScalarValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

scalar_value!(bool, Bool, "bool");
scalar_value!(i32, I32, "int32");
scalar_value!(i64, I64, "int64");
scalar_value!(u32, U32, "uint32");
scalar_value!(u64, U64, "uint64");
scalar_value!(f32, F32, "float");
scalar_value!(f64, F64, "double");
scalar_value!(String, String, "string");
scalar_value!(Vec<u8>, Bytes, "bytes");
