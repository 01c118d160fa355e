// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # fastproto
//!
//! Protocol-buffers runtime for generated message types: a bit-exact wire
//! codec and a reflective field accessor, both driven by static descriptor
//! tables.
//!
//! ## Architecture
//!
//! The library is organized into layers:
//! - `core/` - values and error types shared by every layer
//! - `schema/` - static message/field/enum descriptors and the extension registry
//! - `encoding/` - wire primitives, the [`Message`](encoding::Message) codec
//!   trait, and the JSON printer
//! - `reflect/` - the [`ReflectMessage`](reflect::ReflectMessage) accessor
//!   and algorithms built on it
//! - `dynamic/` - [`DynamicMessage`], a message instance for any descriptor
//!
//! Generated types implement both traits by matching on field numbers;
//! [`DynamicMessage`] implements them over the descriptor table.
//!
//! ## Example: Decoding and Reflecting
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use fastproto::encoding::Message;
//! use fastproto::reflect::ReflectMessage;
//! use fastproto::DynamicMessage;
//! # use fastproto::schema::{FieldDescriptor, Kind, MessageDescriptor, Syntax};
//! # static FIELDS: [FieldDescriptor; 2] = [
//! #     FieldDescriptor::new("world", "demo.Hello.world", 1, Kind::String),
//! #     FieldDescriptor::new("universe", "demo.Hello.universe", 2, Kind::Bool),
//! # ];
//! # static HELLO: MessageDescriptor = MessageDescriptor {
//! #     name: "Hello",
//! #     full_name: "demo.Hello",
//! #     syntax: Syntax::Proto3,
//! #     fields: &FIELDS,
//! #     oneofs: &[],
//! #     extension_ranges: &[],
//! # };
//!
//! let mut hello = DynamicMessage::new(&HELLO);
//! hello.unmarshal(&[0x0a, 0x02, b'h', b'i', 0x10, 0x01])?;
//!
//! let world = HELLO.get_field_by_name("world").unwrap();
//! assert_eq!(hello.get(world)?.as_str(), Some("hi"));
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{DecodeError, EncodeError, MapKey, ReflectError, Result, Value};

// Wire codec
pub mod encoding;

// Descriptor tables
pub mod schema;

// Reflective access
pub mod reflect;

// Descriptor-driven messages
pub mod dynamic;

pub use dynamic::DynamicMessage;
pub use encoding::{MarshalOptions, Message, UnmarshalOptions};
pub use reflect::ReflectMessage;
pub use schema::{ExtensionRegistry, FieldDescriptor, MessageDescriptor};
