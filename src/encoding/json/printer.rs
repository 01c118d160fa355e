// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # JSON Printer
//!
//! Renders any [`ReflectMessage`] as a `serde_json::Value` following the
//! proto3 JSON mapping.
//!
//! ## Mapping
//!
//! | Field kind | JSON |
//! |------------|------|
//! | int32, uint32, sint32, fixed32, sfixed32 | number |
//! | 64-bit integers | decimal string |
//! | float, double | number; `"NaN"`, `"Infinity"`, `"-Infinity"` |
//! | bytes | standard base64 string |
//! | enum | value name, or the number when not declared |
//! | message | object |
//! | map | object with stringified keys |
//!
//! Object keys are the lowerCamelCase field names; extensions are keyed by
//! `"[full.name]"`. Only populated fields are printed.
//!
//! ## Example
//!
//! ```
//! use fastproto::encoding::json::to_json;
//! use fastproto::reflect::ReflectMessage;
//! use fastproto::{DynamicMessage, Value};
//! # use fastproto::schema::{FieldDescriptor, Kind, MessageDescriptor, Syntax};
//! # static FIELDS: [FieldDescriptor; 1] =
//! #     [FieldDescriptor::new("sample_count", "demo.Probe.sample_count", 1, Kind::Uint64)];
//! # static PROBE: MessageDescriptor = MessageDescriptor {
//! #     name: "Probe",
//! #     full_name: "demo.Probe",
//! #     syntax: Syntax::Proto3,
//! #     fields: &FIELDS,
//! #     oneofs: &[],
//! #     extension_ranges: &[],
//! # };
//!
//! let mut probe = DynamicMessage::new(&PROBE);
//! probe.set(&FIELDS[0], Value::U64(7)).unwrap();
//! assert_eq!(to_json(&probe).to_string(), r#"{"sampleCount":"7"}"#);
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value as Json};

use crate::core::Value;
use crate::reflect::ReflectMessage;
use crate::schema::{FieldDescriptor, Kind};

/// Render `msg` as a JSON object.
pub fn to_json(msg: &dyn ReflectMessage) -> Json {
    let mut object = Map::new();
    msg.range(&mut |field, value| {
        object.insert(json_name(field), field_to_json(field, value));
        true
    });
    Json::Object(object)
}

/// JSON object key of `field`.
pub fn json_name(field: &FieldDescriptor) -> String {
    if field.is_extension() {
        return format!("[{}]", field.full_name);
    }
    let mut name = String::with_capacity(field.name.len());
    let mut upper = false;
    for c in field.name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

fn field_to_json(field: &FieldDescriptor, value: &Value) -> Json {
    match value {
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| value_to_json(&field.kind, item))
                .collect(),
        ),
        Value::Map(entries) => {
            let mut keys: Vec<_> = entries.keys().collect();
            keys.sort();
            let object = keys
                .into_iter()
                .map(|key| (key.to_string(), value_to_json(&field.kind, &entries[key])))
                .collect();
            Json::Object(object)
        }
        value => value_to_json(&field.kind, value),
    }
}

fn value_to_json(kind: &Kind, value: &Value) -> Json {
    match value {
        Value::Bool(v) => Json::Bool(*v),
        Value::I32(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::I64(v) => Json::String(v.to_string()),
        Value::U64(v) => Json::String(v.to_string()),
        Value::F32(v) => float_to_json(f64::from(*v)),
        Value::F64(v) => float_to_json(*v),
        Value::String(v) => Json::String(v.clone()),
        Value::Bytes(v) => Json::String(STANDARD.encode(v)),
        Value::EnumNumber(number) => match kind.enum_descriptor().and_then(|e| e.value_name(*number)) {
            Some(name) => Json::String(name.to_string()),
            None => Json::from(*number),
        },
        Value::Message(msg) => to_json(msg),
        // nested lists and maps only occur through a mis-typed Value
        Value::List(items) => Json::Array(items.iter().map(|item| value_to_json(kind, item)).collect()),
        Value::Map(_) => Json::Null,
    }
}

fn float_to_json(v: f64) -> Json {
    if v.is_nan() {
        Json::String("NaN".into())
    } else if v.is_infinite() {
        let name = if v > 0.0 { "Infinity" } else { "-Infinity" };
        Json::String(name.into())
    } else {
        Number::from_f64(v).map_or(Json::Null, Json::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MapKey;
    use crate::dynamic::DynamicMessage;
    use crate::schema::{EnumDescriptor, EnumValue, MessageDescriptor, Syntax};
    use serde_json::json;
    use std::collections::HashMap;
    use std::ops::Range;

    static MODE: EnumDescriptor = EnumDescriptor {
        name: "Mode",
        full_name: "test.Mode",
        values: &[
            EnumValue {
                name: "MODE_OFF",
                number: 0,
            },
            EnumValue {
                name: "MODE_ON",
                number: 1,
            },
        ],
    };

    static CHILD_FIELDS: [FieldDescriptor; 1] =
        [FieldDescriptor::new("flag", "test.Child.flag", 1, Kind::Bool)];

    static CHILD: MessageDescriptor = MessageDescriptor {
        name: "Child",
        full_name: "test.Child",
        syntax: Syntax::Proto3,
        fields: &CHILD_FIELDS,
        oneofs: &[],
        extension_ranges: &[],
    };

    static SAMPLE_FIELDS: [FieldDescriptor; 8] = [
        FieldDescriptor::new("frame_id", "test.Sample.frame_id", 1, Kind::Int32),
        FieldDescriptor::new("stamp_ns", "test.Sample.stamp_ns", 2, Kind::Int64),
        FieldDescriptor::new("gain", "test.Sample.gain", 3, Kind::Double),
        FieldDescriptor::new("raw", "test.Sample.raw", 4, Kind::Bytes),
        FieldDescriptor::new("mode", "test.Sample.mode", 5, Kind::Enum(&MODE)).repeated(),
        FieldDescriptor::new("child", "test.Sample.child", 6, Kind::Message(&CHILD)),
        FieldDescriptor::new("labels", "test.Sample.labels", 7, Kind::String).map(Kind::Int32),
        FieldDescriptor::new("ratio", "test.Sample.ratio", 8, Kind::Float).repeated(),
    ];

    static SAMPLE_EXTENSIONS: [Range<u32>; 1] = [100..200];

    static SAMPLE: MessageDescriptor = MessageDescriptor {
        name: "Sample",
        full_name: "test.Sample",
        syntax: Syntax::Proto3,
        fields: &SAMPLE_FIELDS,
        oneofs: &[],
        extension_ranges: &SAMPLE_EXTENSIONS,
    };

    static ORIGIN: FieldDescriptor =
        FieldDescriptor::new("origin", "test.origin", 100, Kind::String).extension("test.Sample");

    #[test]
    fn test_empty_message() {
        assert_eq!(to_json(&DynamicMessage::new(&SAMPLE)), json!({}));
    }

    #[test]
    fn test_json_names() {
        assert_eq!(json_name(&SAMPLE_FIELDS[0]), "frameId");
        assert_eq!(json_name(&SAMPLE_FIELDS[2]), "gain");
        assert_eq!(json_name(&ORIGIN), "[test.origin]");
    }

    #[test]
    fn test_full_mapping() {
        let mut child = DynamicMessage::new(&CHILD);
        child.set(&CHILD_FIELDS[0], Value::Bool(true)).unwrap();

        let mut labels = HashMap::new();
        labels.insert(MapKey::I32(2), Value::from("two"));
        labels.insert(MapKey::I32(-1), Value::from("neg"));

        let mut msg = DynamicMessage::new(&SAMPLE);
        msg.set(&SAMPLE_FIELDS[0], Value::I32(-4)).unwrap();
        msg.set(&SAMPLE_FIELDS[1], Value::I64(1 << 40)).unwrap();
        msg.set(&SAMPLE_FIELDS[2], Value::F64(0.5)).unwrap();
        msg.set(&SAMPLE_FIELDS[3], Value::Bytes(b"hi".to_vec())).unwrap();
        msg.set(
            &SAMPLE_FIELDS[4],
            Value::List(vec![Value::EnumNumber(1), Value::EnumNumber(9)]),
        )
        .unwrap();
        msg.set(&SAMPLE_FIELDS[5], Value::Message(child)).unwrap();
        msg.set(&SAMPLE_FIELDS[6], Value::Map(labels)).unwrap();
        msg.set(
            &SAMPLE_FIELDS[7],
            Value::List(vec![
                Value::F32(f32::NAN),
                Value::F32(f32::NEG_INFINITY),
                Value::F32(1.5),
            ]),
        )
        .unwrap();
        msg.set(&ORIGIN, Value::from("lab")).unwrap();

        assert_eq!(
            to_json(&msg),
            json!({
                "frameId": -4,
                "stampNs": "1099511627776",
                "gain": 0.5,
                "raw": "aGk=",
                "mode": ["MODE_ON", 9],
                "child": {"flag": true},
                "labels": {"-1": "neg", "2": "two"},
                "ratio": ["NaN", "-Infinity", 1.5],
                "[test.origin]": "lab",
            })
        );
    }
}
