// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON printer module.
//!
//! Provides proto3-style JSON rendering of reflective messages.

pub mod printer;

pub use printer::{json_name, to_json};
