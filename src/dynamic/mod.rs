// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Descriptor-driven message instances.
//!
//! [`DynamicMessage`] stores the fields of any [`MessageDescriptor`] without
//! generated code. Storage mirrors what a generated struct holds:
//! - one slot per declared field, indexed by the field's table position
//! - one tagged slot per oneof, recording which member is selected
//! - extension values keyed by field number
//! - unrecognized bytes, kept verbatim

mod codec;

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::core::{MapKey, ReflectError, Result as DecodeResult, Value};
use crate::encoding::validate_records;
use crate::reflect::{zero_value, ReflectList, ReflectMap, ReflectMessage, ValueMut};
use crate::schema::{FieldDescriptor, FieldSlot, Kind, MessageDescriptor, OneofDescriptor};

/// Value of a oneof together with the selected member's table index.
#[derive(Debug, Clone, PartialEq)]
struct OneofValue {
    index: usize,
    value: Value,
}

#[derive(Debug, Clone, PartialEq)]
struct ExtensionValue {
    field: FieldDescriptor,
    value: Value,
}

/// Message instance backed by a static descriptor table.
///
/// # Example
///
/// ```
/// use fastproto::reflect::ReflectMessage;
/// use fastproto::{DynamicMessage, Value};
/// # use fastproto::schema::{FieldDescriptor, Kind, MessageDescriptor, Syntax};
/// # static FIELDS: [FieldDescriptor; 2] = [
/// #     FieldDescriptor::new("world", "demo.Hello.world", 1, Kind::String),
/// #     FieldDescriptor::new("universe", "demo.Hello.universe", 2, Kind::Bool),
/// # ];
/// # static HELLO: MessageDescriptor = MessageDescriptor {
/// #     name: "Hello",
/// #     full_name: "demo.Hello",
/// #     syntax: Syntax::Proto3,
/// #     fields: &FIELDS,
/// #     oneofs: &[],
/// #     extension_ranges: &[],
/// # };
///
/// let universe = &HELLO.fields[1];
/// let mut msg = DynamicMessage::new(&HELLO);
/// msg.set(universe, Value::Bool(false)).unwrap();
/// assert!(!msg.has(universe).unwrap());
/// msg.set(universe, Value::Bool(true)).unwrap();
/// assert!(msg.has(universe).unwrap());
/// ```
#[derive(Clone)]
pub struct DynamicMessage {
    desc: &'static MessageDescriptor,
    fields: Vec<Option<Value>>,
    oneofs: Vec<Option<OneofValue>>,
    extensions: BTreeMap<u32, ExtensionValue>,
    unknown: Vec<u8>,
}

/// Whether `value` counts as set for `field`.
fn is_populated(field: &FieldDescriptor, value: &Value) -> bool {
    match value {
        Value::List(items) => !items.is_empty(),
        Value::Map(entries) => !entries.is_empty(),
        value => field.has_presence() || !value.is_zero(),
    }
}

impl DynamicMessage {
    /// Create an empty message of type `desc`.
    pub fn new(desc: &'static MessageDescriptor) -> Self {
        Self {
            desc,
            fields: vec![None; desc.fields.len()],
            oneofs: vec![None; desc.oneofs.len()],
            extensions: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &'static MessageDescriptor {
        self.desc
    }

    /// Value of the declared field at table `index`, if populated.
    fn populated(&self, index: usize) -> Option<&Value> {
        let field = &self.desc.fields[index];
        let value = match field.oneof_index {
            Some(oneof) => self.oneofs[oneof]
                .as_ref()
                .filter(|selected| selected.index == index)
                .map(|selected| &selected.value)?,
            None => self.fields[index].as_ref()?,
        };
        is_populated(field, value).then_some(value)
    }

    fn populated_extension(&self, number: u32) -> Option<&Value> {
        self.extensions
            .get(&number)
            .filter(|ext| is_populated(&ext.field, &ext.value))
            .map(|ext| &ext.value)
    }

    fn populated_extensions(&self) -> impl DoubleEndedIterator<Item = &ExtensionValue> + '_ {
        self.extensions
            .values()
            .filter(|ext| is_populated(&ext.field, &ext.value))
    }

    /// Storage slot of the declared field at `index`, created on demand.
    ///
    /// For a oneof member this selects the member, dropping any sibling.
    fn slot_mut(&mut self, index: usize) -> &mut Value {
        let desc = self.desc;
        let field = &desc.fields[index];
        match field.oneof_index {
            Some(oneof) => {
                let selected = &mut self.oneofs[oneof];
                if selected.as_ref().is_some_and(|current| current.index != index) {
                    *selected = None;
                }
                &mut selected
                    .get_or_insert_with(|| OneofValue {
                        index,
                        value: zero_value(field),
                    })
                    .value
            }
            None => self.fields[index].get_or_insert_with(|| zero_value(field)),
        }
    }

    fn extension_slot_mut(&mut self, field: &FieldDescriptor) -> &mut Value {
        let entry = self
            .extensions
            .entry(field.number)
            .or_insert_with(|| ExtensionValue {
                field: *field,
                value: zero_value(field),
            });
        if entry.field.full_name != field.full_name {
            *entry = ExtensionValue {
                field: *field,
                value: zero_value(field),
            };
        }
        &mut entry.value
    }
}

/// Populated fields and extensions must match, with floats compared by
/// bit pattern so a decoded copy equals its source even for NaN payloads.
impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        let same_slot = |a: Option<&Value>, b: Option<&Value>| match (a, b) {
            (Some(a), Some(b)) => a.bit_eq(b),
            (None, None) => true,
            _ => false,
        };
        self.desc.full_name == other.desc.full_name
            && (0..self.desc.fields.len())
                .all(|index| same_slot(self.populated(index), other.populated(index)))
            && {
                let ours: Vec<_> = self.populated_extensions().collect();
                let theirs: Vec<_> = other.populated_extensions().collect();
                ours.len() == theirs.len()
                    && ours.iter().zip(&theirs).all(|(a, b)| {
                        a.field.full_name == b.field.full_name && a.value.bit_eq(&b.value)
                    })
            }
            && self.unknown == other.unknown
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.desc.full_name);
        self.range(&mut |field, value| {
            out.field(field.name, value);
            true
        });
        if !self.unknown.is_empty() {
            out.field("unknown", &hex::encode(&self.unknown));
        }
        out.finish()
    }
}

impl ReflectMessage for DynamicMessage {
    fn descriptor(&self) -> &'static MessageDescriptor {
        self.desc
    }

    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        Ok(match self.desc.resolve(field)? {
            FieldSlot::Field(index) => self.populated(index).is_some(),
            FieldSlot::Extension => self.populated_extension(field.number).is_some(),
        })
    }

    fn get(&self, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError> {
        let stored = match self.desc.resolve(field)? {
            FieldSlot::Field(index) => self.populated(index),
            FieldSlot::Extension => self.populated_extension(field.number),
        };
        Ok(match stored {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(zero_value(field)),
        })
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), ReflectError> {
        let slot = self.desc.resolve(field)?;
        value.check_field(field)?;

        match slot {
            FieldSlot::Extension => {
                if is_populated(field, &value) {
                    let ext = ExtensionValue {
                        field: *field,
                        value,
                    };
                    self.extensions.insert(field.number, ext);
                } else {
                    self.extensions.remove(&field.number);
                }
            }
            FieldSlot::Field(index) => match field.oneof_index {
                Some(oneof) => self.oneofs[oneof] = Some(OneofValue { index, value }),
                None => {
                    self.fields[index] = is_populated(field, &value).then_some(value);
                }
            },
        }
        Ok(())
    }

    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        match self.desc.resolve(field)? {
            FieldSlot::Extension => {
                self.extensions.remove(&field.number);
            }
            FieldSlot::Field(index) => match field.oneof_index {
                Some(oneof) => {
                    let selected = &mut self.oneofs[oneof];
                    if selected.as_ref().is_some_and(|current| current.index == index) {
                        *selected = None;
                    }
                }
                None => self.fields[index] = None,
            },
        }
        Ok(())
    }

    fn mutable(&mut self, field: &FieldDescriptor) -> Result<ValueMut<'_>, ReflectError> {
        let slot = self.desc.resolve(field)?;
        let message_desc = field.kind.message_descriptor();
        if !field.is_list() && !field.is_map() && message_desc.is_none() {
            return Err(ReflectError::NotComposite {
                field: field.full_name,
            });
        }

        let value = match slot {
            FieldSlot::Field(index) => self.slot_mut(index),
            FieldSlot::Extension => self.extension_slot_mut(field),
        };

        if field.is_list() {
            return Ok(ValueMut::List(Box::new(DynamicList {
                field: *field,
                items: value.list_or_insert(),
            })));
        }
        if let Some(key) = field.map_key() {
            return Ok(ValueMut::Map(Box::new(DynamicMap {
                field: *field,
                key,
                entries: value.map_or_insert(),
            })));
        }
        match message_desc {
            Some(desc) => Ok(ValueMut::Message(value.message_or_insert(desc))),
            None => Err(ReflectError::NotComposite {
                field: field.full_name,
            }),
        }
    }

    fn range(&self, visitor: &mut dyn FnMut(&FieldDescriptor, &Value) -> bool) {
        let desc = self.desc;
        for (index, field) in desc.fields.iter().enumerate() {
            if let Some(value) = self.populated(index) {
                if !visitor(field, value) {
                    return;
                }
            }
        }
        for ext in self.populated_extensions() {
            if !visitor(&ext.field, &ext.value) {
                return;
            }
        }
    }

    fn which_oneof(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<&'static FieldDescriptor>, ReflectError> {
        let desc = self.desc;
        let index = desc
            .oneof_index(oneof)
            .ok_or(ReflectError::UnknownOneof {
                message: desc.full_name,
                oneof: oneof.full_name,
            })?;
        Ok(self.oneofs[index]
            .as_ref()
            .map(|selected| &desc.fields[selected.index]))
    }

    fn get_unknown(&self) -> &[u8] {
        &self.unknown
    }

    fn set_unknown(&mut self, unknown: Vec<u8>) -> DecodeResult<()> {
        validate_records(&unknown)?;
        self.unknown = unknown;
        Ok(())
    }
}

// =============================================================================
// Live Handles
// =============================================================================

fn check_element(field: &FieldDescriptor, kind: &Kind, value: &Value) -> Result<(), ReflectError> {
    if value.matches_kind(kind) {
        Ok(())
    } else {
        Err(ReflectError::type_mismatch(
            field.full_name,
            kind.name(),
            value.type_name(),
        ))
    }
}

/// Kind-checked handle to a repeated field of a [`DynamicMessage`].
struct DynamicList<'a> {
    field: FieldDescriptor,
    items: &'a mut Vec<Value>,
}

impl ReflectList for DynamicList<'_> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Option<Value> {
        self.items.get(index).cloned()
    }

    fn set(&mut self, index: usize, value: Value) -> Result<bool, ReflectError> {
        check_element(&self.field, &self.field.kind, &value)?;
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn push(&mut self, value: Value) -> Result<(), ReflectError> {
        check_element(&self.field, &self.field.kind, &value)?;
        self.items.push(value);
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }
}

/// Kind-checked handle to a map field of a [`DynamicMessage`].
struct DynamicMap<'a> {
    field: FieldDescriptor,
    key: Kind,
    entries: &'a mut HashMap<MapKey, Value>,
}

impl ReflectMap for DynamicMap<'_> {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, key: &MapKey) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn contains(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    fn insert(&mut self, key: MapKey, value: Value) -> Result<(), ReflectError> {
        if !key.matches_kind(&self.key) {
            return Err(ReflectError::type_mismatch(
                self.field.full_name,
                self.key.name(),
                key.type_name(),
            ));
        }
        check_element(&self.field, &self.field.kind, &value)?;
        self.entries.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &MapKey) -> Option<Value> {
        self.entries.remove(key)
    }

    fn keys(&self) -> Vec<MapKey> {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}
