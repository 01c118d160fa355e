// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message schema model.
//!
//! This module provides:
//! - [`MessageDescriptor`] and friends - static per-type descriptor tables
//! - [`ExtensionRegistry`] - runtime lookup of extension fields

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    Cardinality, EnumDescriptor, EnumValue, FieldDescriptor, FieldSlot, Kind, MessageDescriptor,
    OneofDescriptor, Syntax,
};
pub use registry::ExtensionRegistry;
