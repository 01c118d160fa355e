// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reflective field access.
//!
//! [`ReflectMessage`] exposes a message's fields through its descriptor:
//! callers name a field by its [`FieldDescriptor`] and read or write it as
//! a [`Value`]. Generated types implement it by matching on the field
//! number; [`DynamicMessage`](crate::DynamicMessage) implements it over
//! descriptor-indexed storage.
//!
//! Presence follows the field's declaration:
//! - explicit presence (message fields, oneof members, proto2 scalars,
//!   proto3 `optional`, extensions): set means explicitly assigned
//! - implicit presence (other proto3 scalars): set means non-zero
//! - lists and maps: set means non-empty

use std::borrow::Cow;

use crate::core::{MapKey, ReflectError, Result as DecodeResult, ScalarValue, Value};
use crate::dynamic::DynamicMessage;
use crate::encoding::Message;
use crate::schema::{FieldDescriptor, MessageDescriptor, OneofDescriptor};

/// Reflective view of a message instance.
///
/// All field operations fail with [`ReflectError::UnknownField`] when the
/// descriptor does not belong to this message type.
pub trait ReflectMessage {
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// Whether `field` is populated.
    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError>;

    /// Current value of `field`; the zero value (or an empty composite)
    /// when unset.
    fn get(&self, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError>;

    /// Store `value` in `field`.
    ///
    /// Selecting a oneof member clears its siblings. Zero values of
    /// implicit-presence fields are stored as unset.
    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), ReflectError>;

    /// Reset `field` to unset. Idempotent.
    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError>;

    /// Live handle to a message, list or map field, allocated on demand.
    fn mutable(&mut self, field: &FieldDescriptor) -> Result<ValueMut<'_>, ReflectError>;

    /// Call `visitor` for every populated field in ascending number order,
    /// then for every extension. Stops early when the visitor returns false.
    fn range(&self, visitor: &mut dyn FnMut(&FieldDescriptor, &Value) -> bool);

    /// The selected member of `oneof`, if any.
    fn which_oneof(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<&'static FieldDescriptor>, ReflectError>;

    /// A fresh value assignable to `field`.
    fn new_field(&self, field: &FieldDescriptor) -> Result<Value, ReflectError> {
        self.descriptor().resolve(field)?;
        Ok(zero_value(field))
    }

    /// Raw bytes of unrecognized fields.
    fn get_unknown(&self) -> &[u8];

    /// Replace the unknown bytes. The bytes must be complete records.
    fn set_unknown(&mut self, unknown: Vec<u8>) -> DecodeResult<()>;
}

/// Zero value of `field` as a whole: empty list, empty map or kind default.
pub fn zero_value(field: &FieldDescriptor) -> Value {
    if field.is_list() {
        Value::List(Vec::new())
    } else if field.is_map() {
        Value::Map(Default::default())
    } else {
        field.kind.default_value()
    }
}

/// Copy every populated field of `src` into `dst`.
///
/// Both messages must have the same type. Fields populated only in `dst`
/// are left untouched. The top-level unknown bytes are not copied; nested
/// messages travel as [`Value::Message`] and keep theirs.
pub fn copy_fields(src: &dyn ReflectMessage, dst: &mut dyn ReflectMessage) -> Result<(), ReflectError> {
    let (from, to) = (src.descriptor(), dst.descriptor());
    if from.full_name != to.full_name {
        return Err(ReflectError::MessageMismatch {
            expected: to.full_name,
            found: from.full_name,
        });
    }

    let mut populated = Vec::new();
    src.range(&mut |field, value| {
        populated.push((*field, value.clone()));
        true
    });
    for (field, value) in populated {
        dst.set(&field, value)?;
    }
    Ok(())
}

/// Snapshot of `msg` as a [`DynamicMessage`], unknown bytes included.
///
/// Generated types use this to hand a nested message out as a
/// [`Value::Message`].
pub fn to_dynamic(msg: &dyn ReflectMessage) -> Result<DynamicMessage, ReflectError> {
    let mut dynamic = DynamicMessage::new(msg.descriptor());
    copy_fields(msg, &mut dynamic)?;
    dynamic.unknown_fields_mut().extend_from_slice(msg.get_unknown());
    Ok(dynamic)
}

// =============================================================================
// Live Handles
// =============================================================================

/// Mutable handle to a composite field returned by [`ReflectMessage::mutable`].
pub enum ValueMut<'a> {
    Message(&'a mut dyn ReflectMessage),
    List(Box<dyn ReflectList + 'a>),
    Map(Box<dyn ReflectMap + 'a>),
}

impl<'a> ValueMut<'a> {
    pub fn into_message(self) -> Option<&'a mut dyn ReflectMessage> {
        match self {
            ValueMut::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Box<dyn ReflectList + 'a>> {
        match self {
            ValueMut::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Box<dyn ReflectMap + 'a>> {
        match self {
            ValueMut::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Reflective list of a repeated field.
pub trait ReflectList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<Value>;

    /// Overwrite the element at `index`; out-of-range indices are ignored
    /// and reported as `Ok(false)`.
    fn set(&mut self, index: usize, value: Value) -> Result<bool, ReflectError>;

    fn push(&mut self, value: Value) -> Result<(), ReflectError>;

    fn truncate(&mut self, len: usize);

    fn clear(&mut self) {
        self.truncate(0);
    }
}

/// Reflective map of a map field.
pub trait ReflectMap {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &MapKey) -> Option<Value>;

    fn contains(&self, key: &MapKey) -> bool {
        self.get(key).is_some()
    }

    fn insert(&mut self, key: MapKey, value: Value) -> Result<(), ReflectError>;

    fn remove(&mut self, key: &MapKey) -> Option<Value>;

    /// All keys in ascending order.
    fn keys(&self) -> Vec<MapKey>;
}

fn scalar_from<T: ScalarValue>(value: Value) -> Result<T, ReflectError> {
    T::from_value(value)
        .map_err(|other| ReflectError::type_mismatch("list element", T::TYPE_NAME, other.type_name()))
}

impl<T: ScalarValue> ReflectList for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.as_slice().get(index).cloned().map(T::into_value)
    }

    fn set(&mut self, index: usize, value: Value) -> Result<bool, ReflectError> {
        let value = scalar_from::<T>(value)?;
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn push(&mut self, value: Value) -> Result<(), ReflectError> {
        Vec::push(self, scalar_from::<T>(value)?);
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }
}

impl<L: ReflectList + ?Sized> ReflectList for &mut L {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        (**self).get(index)
    }

    fn set(&mut self, index: usize, value: Value) -> Result<bool, ReflectError> {
        (**self).set(index, value)
    }

    fn push(&mut self, value: Value) -> Result<(), ReflectError> {
        (**self).push(value)
    }

    fn truncate(&mut self, len: usize) {
        (**self).truncate(len)
    }
}
