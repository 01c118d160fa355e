// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Binary codec for [`DynamicMessage`], driven by the field table.

use tracing::trace;

use super::DynamicMessage;
use crate::core::{DecodeError, EncodeError, MapKey, Result, Value};
use crate::encoding::codec::{
    encode_embedded, encode_group, expect_wire_type, merge_embedded, merge_group, read_string,
    DecodeContext, MarshalOptions, Message,
};
use crate::encoding::wire::{
    zigzag_decode, zigzag_decode32, zigzag_encode, zigzag_encode32, MAX_FIELD_NUMBER,
};
use crate::encoding::{SizeCalculator, WireCursor, WireEncoder, WireType};
use crate::schema::{FieldDescriptor, Kind};

type EncodeResult = std::result::Result<(), EncodeError>;

impl Message for DynamicMessage {
    fn message_name(&self) -> &'static str {
        self.desc.full_name
    }

    fn size(&self) -> usize {
        let mut calc = SizeCalculator::new();
        for (field, value) in populated_fields(self) {
            size_field(&mut calc, field, value);
        }
        calc.raw(self.unknown.len());
        calc.size()
    }

    fn encode_raw(&self, encoder: &mut WireEncoder<'_>, options: &MarshalOptions) -> EncodeResult {
        encoder.put_slice(&self.unknown)?;
        for (field, value) in populated_fields(self).into_iter().rev() {
            encode_field(encoder, field, value, options)?;
        }
        Ok(())
    }

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        cursor: &mut WireCursor<'_>,
        ctx: DecodeContext<'_>,
    ) -> Result<bool> {
        let desc = self.desc;
        if let Some(index) = desc.field_index(number) {
            let field = &desc.fields[index];
            check_wire_type(field, wire_type)?;
            merge_value(field, self.slot_mut(index), wire_type, cursor, ctx)?;
            return Ok(true);
        }

        if !desc.in_extension_range(number) {
            return Ok(false);
        }
        let Some(field) = ctx
            .options()
            .extensions
            .as_ref()
            .and_then(|registry| registry.find(desc.full_name, number))
        else {
            return Ok(false);
        };
        trace!(
            message = desc.full_name,
            extension = field.full_name,
            "Decoding extension field"
        );
        check_wire_type(field, wire_type)?;
        merge_value(field, self.extension_slot_mut(field), wire_type, cursor, ctx)?;
        Ok(true)
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown
    }

    fn unknown_fields_mut(&mut self) -> &mut Vec<u8> {
        &mut self.unknown
    }

    fn reset(&mut self) {
        *self = DynamicMessage::new(self.desc);
    }
}

/// Populated fields in wire order: declared fields by number, then extensions.
fn populated_fields(msg: &DynamicMessage) -> Vec<(&FieldDescriptor, &Value)> {
    let declared = msg
        .desc
        .fields
        .iter()
        .enumerate()
        .filter_map(|(index, field)| msg.populated(index).map(|value| (field, value)));
    let extensions = msg
        .populated_extensions()
        .map(|ext| (&ext.field, &ext.value));
    declared.chain(extensions).collect()
}

// =============================================================================
// Scalar Bits
// =============================================================================

fn varint_bits(kind: &Kind, value: &Value) -> u64 {
    match (kind, value) {
        (Kind::Sint32, Value::I32(v)) => u64::from(zigzag_encode32(*v)),
        (Kind::Sint64, Value::I64(v)) => zigzag_encode(*v),
        // negative int32 and enum values are sign-extended to ten bytes
        (_, Value::I32(v) | Value::EnumNumber(v)) => i64::from(*v) as u64,
        (_, Value::I64(v)) => *v as u64,
        (_, Value::U32(v)) => u64::from(*v),
        (_, Value::U64(v)) => *v,
        (_, Value::Bool(v)) => u64::from(*v),
        _ => 0,
    }
}

fn fixed32_bits(value: &Value) -> u32 {
    match value {
        Value::F32(v) => v.to_bits(),
        Value::U32(v) => *v,
        Value::I32(v) => *v as u32,
        _ => 0,
    }
}

fn fixed64_bits(value: &Value) -> u64 {
    match value {
        Value::F64(v) => v.to_bits(),
        Value::U64(v) => *v,
        Value::I64(v) => *v as u64,
        _ => 0,
    }
}

fn payload(value: &Value) -> &[u8] {
    match value {
        Value::String(v) => v.as_bytes(),
        Value::Bytes(v) => v,
        _ => &[],
    }
}

// =============================================================================
// Size
// =============================================================================

fn size_field(calc: &mut SizeCalculator, field: &FieldDescriptor, value: &Value) {
    match (value, field.map_key()) {
        (Value::List(items), _) if field.is_packed() => {
            let mut body = SizeCalculator::new();
            for item in items {
                scalar_size(&mut body, &field.kind, item);
            }
            calc.tag(field.number);
            calc.length_delimited(body.size());
        }
        (Value::List(items), _) => {
            for item in items {
                size_single(calc, field.number, &field.kind, item);
            }
        }
        (Value::Map(entries), Some(key_kind)) => {
            for (key, item) in entries {
                let mut entry = SizeCalculator::new();
                size_single(&mut entry, 1, &key_kind, &Value::from(key.clone()));
                size_single(&mut entry, 2, &field.kind, item);
                calc.tag(field.number);
                calc.length_delimited(entry.size());
            }
        }
        _ => size_single(calc, field.number, &field.kind, value),
    }
}

fn size_single(calc: &mut SizeCalculator, number: u32, kind: &Kind, value: &Value) {
    match (kind, value) {
        (Kind::Group(_), Value::Message(msg)) => {
            calc.group_tags(number);
            calc.raw(msg.size());
        }
        (Kind::Message(_), Value::Message(msg)) => {
            calc.tag(number);
            calc.length_delimited(msg.size());
        }
        _ => {
            calc.tag(number);
            scalar_size(calc, kind, value);
        }
    }
}

fn scalar_size(calc: &mut SizeCalculator, kind: &Kind, value: &Value) {
    match kind.wire_type() {
        WireType::Fixed32 => calc.fixed32(),
        WireType::Fixed64 => calc.fixed64(),
        WireType::LengthDelimited => calc.length_delimited(payload(value).len()),
        _ => calc.varint(varint_bits(kind, value)),
    };
}

// =============================================================================
// Encode
// =============================================================================

fn encode_field(
    encoder: &mut WireEncoder<'_>,
    field: &FieldDescriptor,
    value: &Value,
    options: &MarshalOptions,
) -> EncodeResult {
    match (value, field.map_key()) {
        (Value::List(items), _) if field.is_packed() => {
            let mark = encoder.written();
            for item in items.iter().rev() {
                encode_scalar(encoder, &field.kind, item)?;
            }
            encoder.close_length_delimited(field.number, mark)
        }
        (Value::List(items), _) => {
            for item in items.iter().rev() {
                encode_single(encoder, field.number, &field.kind, item, options)?;
            }
            Ok(())
        }
        (Value::Map(entries), Some(key_kind)) => {
            if options.deterministic {
                let mut sorted: Vec<_> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(b.0));
                for (key, item) in sorted.into_iter().rev() {
                    encode_entry(encoder, field, &key_kind, key, item, options)?;
                }
            } else {
                for (key, item) in entries {
                    encode_entry(encoder, field, &key_kind, key, item, options)?;
                }
            }
            Ok(())
        }
        _ => encode_single(encoder, field.number, &field.kind, value, options),
    }
}

fn encode_entry(
    encoder: &mut WireEncoder<'_>,
    field: &FieldDescriptor,
    key_kind: &Kind,
    key: &MapKey,
    value: &Value,
    options: &MarshalOptions,
) -> EncodeResult {
    let mark = encoder.written();
    encode_single(encoder, 2, &field.kind, value, options)?;
    encode_single(encoder, 1, key_kind, &Value::from(key.clone()), options)?;
    encoder.close_length_delimited(field.number, mark)
}

fn encode_single(
    encoder: &mut WireEncoder<'_>,
    number: u32,
    kind: &Kind,
    value: &Value,
    options: &MarshalOptions,
) -> EncodeResult {
    match (kind, value) {
        (Kind::Group(_), Value::Message(msg)) => encode_group(msg, number, encoder, options),
        (Kind::Message(_), Value::Message(msg)) => encode_embedded(msg, number, encoder, options),
        _ => {
            encode_scalar(encoder, kind, value)?;
            encoder.put_tag(number, kind.wire_type())
        }
    }
}

fn encode_scalar(encoder: &mut WireEncoder<'_>, kind: &Kind, value: &Value) -> EncodeResult {
    match kind.wire_type() {
        WireType::Fixed32 => encoder.put_fixed32(fixed32_bits(value)),
        WireType::Fixed64 => encoder.put_fixed64(fixed64_bits(value)),
        WireType::LengthDelimited => {
            let bytes = payload(value);
            encoder.put_slice(bytes)?;
            encoder.put_varint(bytes.len() as u64)
        }
        _ => encoder.put_varint(varint_bits(kind, value)),
    }
}

// =============================================================================
// Decode
// =============================================================================

/// Reject a record whose wire type the field cannot carry. Repeated
/// packable fields accept both the packed and the unpacked form.
fn check_wire_type(field: &FieldDescriptor, wire_type: WireType) -> Result<()> {
    if field.is_map() {
        return expect_wire_type(field.full_name, wire_type, WireType::LengthDelimited);
    }
    if field.is_list() && field.kind.is_packable() && wire_type == WireType::LengthDelimited {
        return Ok(());
    }
    expect_wire_type(field.full_name, wire_type, field.kind.wire_type())
}

fn merge_value(
    field: &FieldDescriptor,
    slot: &mut Value,
    wire_type: WireType,
    cursor: &mut WireCursor<'_>,
    ctx: DecodeContext<'_>,
) -> Result<()> {
    if let Some(key_kind) = field.map_key() {
        let (key, value) = read_map_entry(field, &key_kind, cursor, ctx)?;
        slot.map_or_insert().insert(key, value);
        return Ok(());
    }

    if field.is_list() {
        let items = slot.list_or_insert();
        if wire_type == WireType::LengthDelimited && field.kind.is_packable() {
            let mut packed = WireCursor::new(cursor.read_length_delimited()?);
            while !packed.is_at_end() {
                items.push(read_scalar(&mut packed, field, &field.kind)?);
            }
        } else {
            items.push(read_element(field, &field.kind, cursor, ctx)?);
        }
        return Ok(());
    }

    // messages merge into what is already there, scalars overwrite
    match field.kind {
        Kind::Message(desc) => merge_embedded(slot.message_or_insert(desc), cursor, ctx),
        Kind::Group(desc) => merge_group(slot.message_or_insert(desc), field.number, cursor, ctx),
        kind => {
            *slot = read_scalar(cursor, field, &kind)?;
            Ok(())
        }
    }
}

/// Decode one map entry. A missing key or value takes its zero value.
fn read_map_entry(
    field: &FieldDescriptor,
    key_kind: &Kind,
    cursor: &mut WireCursor<'_>,
    ctx: DecodeContext<'_>,
) -> Result<(MapKey, Value)> {
    let mut entry = WireCursor::new(cursor.read_length_delimited()?);
    let mut key = None;
    let mut value = None;

    while !entry.is_at_end() {
        let (number, wire_type, _) = entry.read_tag()?;
        if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::IllegalTag {
                message: field.full_name,
                field_number: number,
                wire_type,
            });
        }
        let wire_type = WireType::try_from(wire_type)?;
        match number {
            1 => {
                expect_wire_type(field.full_name, wire_type, key_kind.wire_type())?;
                key = Some(read_scalar(&mut entry, field, key_kind)?);
            }
            2 => {
                expect_wire_type(field.full_name, wire_type, field.kind.wire_type())?;
                value = Some(read_element(field, &field.kind, &mut entry, ctx)?);
            }
            _ => entry.skip_field(wire_type)?,
        }
    }

    let key = key
        .and_then(MapKey::from_value)
        .or_else(|| MapKey::default_for(key_kind))
        .ok_or_else(|| DecodeError::wrong_wire_type(field.full_name, key_kind.wire_type().as_u8()))?;
    let value = value.unwrap_or_else(|| field.kind.default_value());
    Ok((key, value))
}

/// Decode one freshly allocated value of `kind`.
fn read_element(
    field: &FieldDescriptor,
    kind: &Kind,
    cursor: &mut WireCursor<'_>,
    ctx: DecodeContext<'_>,
) -> Result<Value> {
    match kind {
        Kind::Message(desc) => {
            let mut msg = DynamicMessage::new(desc);
            merge_embedded(&mut msg, cursor, ctx)?;
            Ok(Value::Message(msg))
        }
        Kind::Group(desc) => {
            let mut msg = DynamicMessage::new(desc);
            merge_group(&mut msg, field.number, cursor, ctx)?;
            Ok(Value::Message(msg))
        }
        kind => read_scalar(cursor, field, kind),
    }
}

fn read_scalar(cursor: &mut WireCursor<'_>, field: &FieldDescriptor, kind: &Kind) -> Result<Value> {
    Ok(match kind {
        Kind::Double => Value::F64(f64::from_bits(cursor.read_fixed64()?)),
        Kind::Float => Value::F32(f32::from_bits(cursor.read_fixed32()?)),
        Kind::Int64 => Value::I64(cursor.read_varint()? as i64),
        Kind::Uint64 => Value::U64(cursor.read_varint()?),
        Kind::Int32 => Value::I32(cursor.read_varint()? as i32),
        Kind::Fixed64 => Value::U64(cursor.read_fixed64()?),
        Kind::Fixed32 => Value::U32(cursor.read_fixed32()?),
        Kind::Bool => Value::Bool(cursor.read_varint()? != 0),
        Kind::String => Value::String(read_string(cursor, field.full_name)?),
        Kind::Bytes => Value::Bytes(cursor.read_length_delimited()?.to_vec()),
        Kind::Uint32 => Value::U32(cursor.read_varint()? as u32),
        Kind::Enum(_) => Value::EnumNumber(cursor.read_varint()? as i32),
        Kind::Sfixed32 => Value::I32(cursor.read_fixed32()? as i32),
        Kind::Sfixed64 => Value::I64(cursor.read_fixed64()? as i64),
        Kind::Sint32 => Value::I32(zigzag_decode32(cursor.read_varint()? as u32)),
        Kind::Sint64 => Value::I64(zigzag_decode(cursor.read_varint()?)),
        Kind::Message(_) | Kind::Group(_) => {
            return Err(DecodeError::wrong_wire_type(
                field.full_name,
                kind.wire_type().as_u8(),
            ))
        }
    })
}
