// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common fixtures for integration tests.
//!
//! The typed messages here are written the way emitted code looks: plain
//! structs whose codec and reflection impls match on the field number.
//!
//! ```proto
//! syntax = "proto3";
//! package test;
//!
//! message Bar { string baz = 1; }
//! message Hello { string world = 1; bool universe = 2; }
//! message Probe {
//!   string name = 1;
//!   repeated sint64 samples = 2;
//!   oneof key { uint32 id = 3; string label = 4; }
//!   Bar bar = 5;
//!   optional int32 level = 6;
//! }
//! ```

#![allow(dead_code)]

use std::borrow::Cow;
use std::ops::Range;

use fastproto::core::{ReflectError, Result as DecodeResult, Value};
use fastproto::encoding::{
    encode_embedded, expect_wire_type, merge_embedded, read_string, validate_records,
    zigzag_decode, zigzag_encode, DecodeContext, MarshalOptions, Message, SizeCalculator,
    WireCursor, WireEncoder, WireType,
};
use fastproto::reflect::{copy_fields, to_dynamic, ReflectMessage, ValueMut};
use fastproto::schema::{FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor, Syntax};
use fastproto::{DecodeError, EncodeError};

type EncodeResult = std::result::Result<(), EncodeError>;

// ============================================================================
// Descriptors
// ============================================================================

pub static BAR_FIELDS: [FieldDescriptor; 1] =
    [FieldDescriptor::new("baz", "test.Bar.baz", 1, Kind::String)];

pub static BAR: MessageDescriptor = MessageDescriptor {
    name: "Bar",
    full_name: "test.Bar",
    syntax: Syntax::Proto3,
    fields: &BAR_FIELDS,
    oneofs: &[],
    extension_ranges: &[],
};

pub static HELLO_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("world", "test.Hello.world", 1, Kind::String),
    FieldDescriptor::new("universe", "test.Hello.universe", 2, Kind::Bool),
];

pub static HELLO: MessageDescriptor = MessageDescriptor {
    name: "Hello",
    full_name: "test.Hello",
    syntax: Syntax::Proto3,
    fields: &HELLO_FIELDS,
    oneofs: &[],
    extension_ranges: &[],
};

pub static PROBE_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor::new("name", "test.Probe.name", 1, Kind::String),
    FieldDescriptor::new("samples", "test.Probe.samples", 2, Kind::Sint64).repeated(),
    FieldDescriptor::new("id", "test.Probe.id", 3, Kind::Uint32).oneof(0),
    FieldDescriptor::new("label", "test.Probe.label", 4, Kind::String).oneof(0),
    FieldDescriptor::new("bar", "test.Probe.bar", 5, Kind::Message(&BAR)),
    FieldDescriptor::new("level", "test.Probe.level", 6, Kind::Int32).optional(),
];

pub static PROBE_ONEOFS: [OneofDescriptor; 1] = [OneofDescriptor {
    name: "key",
    full_name: "test.Probe.key",
}];

pub static PROBE: MessageDescriptor = MessageDescriptor {
    name: "Probe",
    full_name: "test.Probe",
    syntax: Syntax::Proto3,
    fields: &PROBE_FIELDS,
    oneofs: &PROBE_ONEOFS,
    extension_ranges: &[],
};

/// proto2 message with an extension range, only used dynamically.
pub static EXTENDABLE_FIELDS: [FieldDescriptor; 1] =
    [FieldDescriptor::new("id", "test.Extendable.id", 1, Kind::Int32).proto2()];

pub static EXTENDABLE_RANGES: [Range<u32>; 1] = [100..200];

pub static EXTENDABLE: MessageDescriptor = MessageDescriptor {
    name: "Extendable",
    full_name: "test.Extendable",
    syntax: Syntax::Proto2,
    fields: &EXTENDABLE_FIELDS,
    oneofs: &[],
    extension_ranges: &EXTENDABLE_RANGES,
};

pub static EXT_NOTE: FieldDescriptor = FieldDescriptor::new("note", "test.note", 100, Kind::String)
    .proto2()
    .extension("test.Extendable");

pub static EXT_WEIGHTS: FieldDescriptor =
    FieldDescriptor::new("weights", "test.weights", 101, Kind::Fixed32)
        .proto2()
        .repeated()
        .extension("test.Extendable");

pub static EXT_BAR: FieldDescriptor = FieldDescriptor::new("bar", "test.bar", 150, Kind::Message(&BAR))
    .proto2()
    .extension("test.Extendable");

/// Extension whose extendee has no extension ranges.
pub static EXT_ON_HELLO: FieldDescriptor =
    FieldDescriptor::new("stray", "test.stray", 100, Kind::Int32).extension("test.Hello");

/// Number of `field`, or the reflect error when it is not part of `desc`.
fn field_number(desc: &'static MessageDescriptor, field: &FieldDescriptor) -> Result<u32, ReflectError> {
    desc.resolve(field)?;
    Ok(field.number)
}

fn not_composite(field: &FieldDescriptor) -> ReflectError {
    ReflectError::NotComposite {
        field: field.full_name,
    }
}


// ============================================================================
// Bar
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bar {
    pub baz: String,
    pub unknown: Vec<u8>,
}

impl Message for Bar {
    fn message_name(&self) -> &'static str {
        BAR.full_name
    }

    fn size(&self) -> usize {
        let mut calc = SizeCalculator::new();
        if !self.baz.is_empty() {
            calc.tag(1);
            calc.length_delimited(self.baz.len());
        }
        calc.raw(self.unknown.len());
        calc.size()
    }

    fn encode_raw(&self, encoder: &mut WireEncoder<'_>, _: &MarshalOptions) -> EncodeResult {
        encoder.put_slice(&self.unknown)?;
        if !self.baz.is_empty() {
            encoder.put_bytes_field(1, self.baz.as_bytes())?;
        }
        Ok(())
    }

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        cursor: &mut WireCursor<'_>,
        _: DecodeContext<'_>,
    ) -> DecodeResult<bool> {
        match number {
            1 => {
                expect_wire_type("test.Bar.baz", wire_type, WireType::LengthDelimited)?;
                self.baz = read_string(cursor, "test.Bar.baz")?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown
    }

    fn unknown_fields_mut(&mut self) -> &mut Vec<u8> {
        &mut self.unknown
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl ReflectMessage for Bar {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &BAR
    }

    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        match field_number(&BAR, field)? {
            1 => Ok(!self.baz.is_empty()),
            _ => Err(ReflectError::unknown_field(BAR.full_name, field.full_name)),
        }
    }

    fn get(&self, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError> {
        match field_number(&BAR, field)? {
            1 => Ok(Cow::Owned(Value::String(self.baz.clone()))),
            _ => Err(ReflectError::unknown_field(BAR.full_name, field.full_name)),
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), ReflectError> {
        field_number(&BAR, field)?;
        value.check_field(field)?;
        if let Value::String(baz) = value {
            self.baz = baz;
        }
        Ok(())
    }

    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        field_number(&BAR, field)?;
        self.baz.clear();
        Ok(())
    }

    fn mutable(&mut self, field: &FieldDescriptor) -> Result<ValueMut<'_>, ReflectError> {
        field_number(&BAR, field)?;
        Err(not_composite(field))
    }

    fn range(&self, visitor: &mut dyn FnMut(&FieldDescriptor, &Value) -> bool) {
        if !self.baz.is_empty() {
            visitor(&BAR_FIELDS[0], &Value::String(self.baz.clone()));
        }
    }

    fn which_oneof(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<&'static FieldDescriptor>, ReflectError> {
        Err(ReflectError::UnknownOneof {
            message: BAR.full_name,
            oneof: oneof.full_name,
        })
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

// ============================================================================
// Hello
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hello {
    pub world: String,
    pub universe: bool,
    pub unknown: Vec<u8>,
}

impl Message for Hello {
    fn message_name(&self) -> &'static str {
        HELLO.full_name
    }

    fn size(&self) -> usize {
        let mut calc = SizeCalculator::new();
        if !self.world.is_empty() {
            calc.tag(1);
            calc.length_delimited(self.world.len());
        }
        if self.universe {
            calc.tag(2);
            calc.varint(1);
        }
        calc.raw(self.unknown.len());
        calc.size()
    }

    fn encode_raw(&self, encoder: &mut WireEncoder<'_>, _: &MarshalOptions) -> EncodeResult {
        encoder.put_slice(&self.unknown)?;
        if self.universe {
            encoder.put_bool(true)?;
            encoder.put_tag(2, WireType::Varint)?;
        }
        if !self.world.is_empty() {
            encoder.put_bytes_field(1, self.world.as_bytes())?;
        }
        Ok(())
    }

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        cursor: &mut WireCursor<'_>,
        _: DecodeContext<'_>,
    ) -> DecodeResult<bool> {
        match number {
            1 => {
                expect_wire_type("test.Hello.world", wire_type, WireType::LengthDelimited)?;
                self.world = read_string(cursor, "test.Hello.world")?;
            }
            2 => {
                expect_wire_type("test.Hello.universe", wire_type, WireType::Varint)?;
                self.universe = cursor.read_varint()? != 0;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown
    }

    fn unknown_fields_mut(&mut self) -> &mut Vec<u8> {
        &mut self.unknown
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl ReflectMessage for Hello {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &HELLO
    }

    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        match field_number(&HELLO, field)? {
            1 => Ok(!self.world.is_empty()),
            2 => Ok(self.universe),
            _ => Err(ReflectError::unknown_field(HELLO.full_name, field.full_name)),
        }
    }

    fn get(&self, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError> {
        match field_number(&HELLO, field)? {
            1 => Ok(Cow::Owned(Value::String(self.world.clone()))),
            2 => Ok(Cow::Owned(Value::Bool(self.universe))),
            _ => Err(ReflectError::unknown_field(HELLO.full_name, field.full_name)),
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), ReflectError> {
        field_number(&HELLO, field)?;
        value.check_field(field)?;
        match value {
            Value::String(world) => self.world = world,
            Value::Bool(universe) => self.universe = universe,
            _ => {}
        }
        Ok(())
    }

    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        match field_number(&HELLO, field)? {
            1 => self.world.clear(),
            _ => self.universe = false,
        }
        Ok(())
    }

    fn mutable(&mut self, field: &FieldDescriptor) -> Result<ValueMut<'_>, ReflectError> {
        field_number(&HELLO, field)?;
        Err(not_composite(field))
    }

    fn range(&self, visitor: &mut dyn FnMut(&FieldDescriptor, &Value) -> bool) {
        if !self.world.is_empty() && !visitor(&HELLO_FIELDS[0], &Value::String(self.world.clone())) {
            return;
        }
        if self.universe {
            visitor(&HELLO_FIELDS[1], &Value::Bool(true));
        }
    }

    fn which_oneof(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<&'static FieldDescriptor>, ReflectError> {
        Err(ReflectError::UnknownOneof {
            message: HELLO.full_name,
            oneof: oneof.full_name,
        })
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

// ============================================================================
// Probe
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeKey {
    Id(u32),
    Label(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probe {
    pub name: String,
    pub samples: Vec<i64>,
    pub key: Option<ProbeKey>,
    pub bar: Option<Bar>,
    pub level: Option<i32>,
    pub unknown: Vec<u8>,
}

impl Message for Probe {
    fn message_name(&self) -> &'static str {
        PROBE.full_name
    }

    fn size(&self) -> usize {
        let mut calc = SizeCalculator::new();
        if !self.name.is_empty() {
            calc.tag(1);
            calc.length_delimited(self.name.len());
        }
        if !self.samples.is_empty() {
            let mut packed = SizeCalculator::new();
            for sample in &self.samples {
                packed.zigzag(*sample);
            }
            calc.tag(2);
            calc.length_delimited(packed.size());
        }
        match &self.key {
            Some(ProbeKey::Id(id)) => {
                calc.tag(3);
                calc.varint(u64::from(*id));
            }
            Some(ProbeKey::Label(label)) => {
                calc.tag(4);
                calc.length_delimited(label.len());
            }
            None => {}
        }
        if let Some(bar) = &self.bar {
            calc.tag(5);
            calc.length_delimited(bar.size());
        }
        if let Some(level) = self.level {
            calc.tag(6);
            calc.varint(i64::from(level) as u64);
        }
        calc.raw(self.unknown.len());
        calc.size()
    }

    fn encode_raw(&self, encoder: &mut WireEncoder<'_>, options: &MarshalOptions) -> EncodeResult {
        encoder.put_slice(&self.unknown)?;
        if let Some(level) = self.level {
            encoder.put_varint(i64::from(level) as u64)?;
            encoder.put_tag(6, WireType::Varint)?;
        }
        if let Some(bar) = &self.bar {
            encode_embedded(bar, 5, encoder, options)?;
        }
        match &self.key {
            Some(ProbeKey::Id(id)) => {
                encoder.put_varint(u64::from(*id))?;
                encoder.put_tag(3, WireType::Varint)?;
            }
            Some(ProbeKey::Label(label)) => encoder.put_bytes_field(4, label.as_bytes())?,
            None => {}
        }
        if !self.samples.is_empty() {
            let mark = encoder.written();
            for sample in self.samples.iter().rev() {
                encoder.put_varint(zigzag_encode(*sample))?;
            }
            encoder.close_length_delimited(2, mark)?;
        }
        if !self.name.is_empty() {
            encoder.put_bytes_field(1, self.name.as_bytes())?;
        }
        Ok(())
    }

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        cursor: &mut WireCursor<'_>,
        ctx: DecodeContext<'_>,
    ) -> DecodeResult<bool> {
        match number {
            1 => {
                expect_wire_type("test.Probe.name", wire_type, WireType::LengthDelimited)?;
                self.name = read_string(cursor, "test.Probe.name")?;
            }
            2 => match wire_type {
                WireType::LengthDelimited => {
                    let mut packed = WireCursor::new(cursor.read_length_delimited()?);
                    while !packed.is_at_end() {
                        self.samples.push(zigzag_decode(packed.read_varint()?));
                    }
                }
                WireType::Varint => self.samples.push(zigzag_decode(cursor.read_varint()?)),
                other => {
                    return Err(DecodeError::wrong_wire_type(
                        "test.Probe.samples",
                        other.as_u8(),
                    ))
                }
            },
            3 => {
                expect_wire_type("test.Probe.id", wire_type, WireType::Varint)?;
                self.key = Some(ProbeKey::Id(cursor.read_varint()? as u32));
            }
            4 => {
                expect_wire_type("test.Probe.label", wire_type, WireType::LengthDelimited)?;
                self.key = Some(ProbeKey::Label(read_string(cursor, "test.Probe.label")?));
            }
            5 => {
                expect_wire_type("test.Probe.bar", wire_type, WireType::LengthDelimited)?;
                merge_embedded(self.bar.get_or_insert_with(Bar::default), cursor, ctx)?;
            }
            6 => {
                expect_wire_type("test.Probe.level", wire_type, WireType::Varint)?;
                self.level = Some(cursor.read_varint()? as i32);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown
    }

    fn unknown_fields_mut(&mut self) -> &mut Vec<u8> {
        &mut self.unknown
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Probe {
    fn field_value(&self, number: u32) -> Result<Option<Value>, ReflectError> {
        Ok(match number {
            1 if !self.name.is_empty() => Some(Value::String(self.name.clone())),
            2 if !self.samples.is_empty() => Some(Value::List(
                self.samples.iter().copied().map(Value::I64).collect(),
            )),
            3 => match self.key {
                Some(ProbeKey::Id(id)) => Some(Value::U32(id)),
                _ => None,
            },
            4 => match &self.key {
                Some(ProbeKey::Label(label)) => Some(Value::String(label.clone())),
                _ => None,
            },
            5 => match &self.bar {
                Some(bar) => Some(Value::Message(to_dynamic(bar)?)),
                None => None,
            },
            6 => self.level.map(Value::I32),
            _ => None,
        })
    }
}

impl ReflectMessage for Probe {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &PROBE
    }

    fn has(&self, field: &FieldDescriptor) -> Result<bool, ReflectError> {
        let number = field_number(&PROBE, field)?;
        Ok(self.field_value(number)?.is_some())
    }

    fn get(&self, field: &FieldDescriptor) -> Result<Cow<'_, Value>, ReflectError> {
        let number = field_number(&PROBE, field)?;
        let value = self.field_value(number)?;
        Ok(Cow::Owned(value.unwrap_or_else(|| {
            fastproto::reflect::zero_value(field)
        })))
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), ReflectError> {
        let number = field_number(&PROBE, field)?;
        value.check_field(field)?;
        match (number, value) {
            (1, Value::String(name)) => self.name = name,
            (2, Value::List(items)) => {
                self.samples = items.iter().filter_map(Value::as_i64).collect();
            }
            (3, Value::U32(id)) => self.key = Some(ProbeKey::Id(id)),
            (4, Value::String(label)) => self.key = Some(ProbeKey::Label(label)),
            (5, Value::Message(msg)) => {
                let mut bar = Bar::default();
                copy_fields(&msg, &mut bar)?;
                bar.unknown = msg.get_unknown().to_vec();
                self.bar = Some(bar);
            }
            (6, Value::I32(level)) => self.level = Some(level),
            _ => {}
        }
        Ok(())
    }

    fn clear(&mut self, field: &FieldDescriptor) -> Result<(), ReflectError> {
        match field_number(&PROBE, field)? {
            1 => self.name.clear(),
            2 => self.samples.clear(),
            3 if matches!(self.key, Some(ProbeKey::Id(_))) => self.key = None,
            4 if matches!(self.key, Some(ProbeKey::Label(_))) => self.key = None,
            5 => self.bar = None,
            6 => self.level = None,
            _ => {}
        }
        Ok(())
    }

    fn mutable(&mut self, field: &FieldDescriptor) -> Result<ValueMut<'_>, ReflectError> {
        match field_number(&PROBE, field)? {
            2 => Ok(ValueMut::List(Box::new(&mut self.samples))),
            5 => Ok(ValueMut::Message(self.bar.get_or_insert_with(Bar::default))),
            _ => Err(not_composite(field)),
        }
    }

    fn range(&self, visitor: &mut dyn FnMut(&FieldDescriptor, &Value) -> bool) {
        for field in PROBE_FIELDS.iter() {
            if let Ok(Some(value)) = self.field_value(field.number) {
                if !visitor(field, &value) {
                    return;
                }
            }
        }
    }

    fn which_oneof(
        &self,
        oneof: &OneofDescriptor,
    ) -> Result<Option<&'static FieldDescriptor>, ReflectError> {
        if PROBE.oneof_index(oneof).is_none() {
            return Err(ReflectError::UnknownOneof {
                message: PROBE.full_name,
                oneof: oneof.full_name,
            });
        }
        Ok(match self.key {
            Some(ProbeKey::Id(_)) => Some(&PROBE_FIELDS[2]),
            Some(ProbeKey::Label(_)) => Some(&PROBE_FIELDS[3]),
            None => None,
        })
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

// ============================================================================
// Helpers
// ============================================================================

/// Field of `desc` with the short name `name`.
pub fn field(desc: &'static MessageDescriptor, name: &str) -> &'static FieldDescriptor {
    desc.get_field_by_name(name)
        .unwrap_or_else(|| panic!("{} has no field {name}", desc.full_name))
}

/// A fully populated probe.
pub fn sample_probe() -> Probe {
    Probe {
        name: "imu".to_string(),
        samples: vec![0, -1, 1, i64::MIN, i64::MAX],
        key: Some(ProbeKey::Label("left".to_string())),
        bar: Some(Bar {
            baz: "z".to_string(),
            unknown: Vec::new(),
        }),
        level: Some(-7),
        unknown: Vec::new(),
    }
}
