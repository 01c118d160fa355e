// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout fastproto.
//!
//! This module provides the foundational types for the library:
//! - [`DecodeError`], [`EncodeError`], [`ReflectError`] - error handling
//! - [`Value`] and [`MapKey`] - owned field values

pub mod error;
pub mod value;

pub use error::{DecodeError, EncodeError, ReflectError, Result};
pub use value::{MapKey, ScalarValue, Value};
