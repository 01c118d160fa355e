// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Extension registry.
//!
//! Extension fields are declared outside the message they extend, so the
//! decoder cannot find them in the message's own field table. Callers
//! register the extensions they know about and pass the registry to
//! [`UnmarshalOptions`](crate::encoding::UnmarshalOptions); extension
//! numbers with no registered descriptor stay in the unknown bytes.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use super::descriptor::FieldDescriptor;
use crate::core::ReflectError;

/// Thread-safe registry of extension descriptors.
///
/// Keyed by extended message full name and field number. Uses RwLock for
/// concurrent lookups during decoding with exclusive registration.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    inner: RwLock<HashMap<(String, u32), &'static FieldDescriptor>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension field.
    ///
    /// Registering a second extension with the same extendee and number
    /// replaces the first.
    pub fn register(&self, field: &'static FieldDescriptor) -> Result<(), ReflectError> {
        let Some(extendee) = field.extendee else {
            return Err(ReflectError::NotAnExtension {
                field: field.full_name,
            });
        };

        // Entries are plain references, so a poisoned map is still consistent.
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = inner.insert((extendee.to_string(), field.number), field) {
            warn!(
                extendee,
                number = field.number,
                previous = previous.full_name,
                replacement = field.full_name,
                "Replaced registered extension"
            );
        } else {
            debug!(
                extendee,
                number = field.number,
                extension = field.full_name,
                "Registered extension"
            );
        }
        Ok(())
    }

    /// Look up the extension of `extendee` with `number`.
    pub fn find(&self, extendee: &str, number: u32) -> Option<&'static FieldDescriptor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(&(extendee.to_string(), number)).copied()
    }

    pub fn contains(&self, extendee: &str, number: u32) -> bool {
        self.find(extendee, number).is_some()
    }

    /// All extensions registered for `extendee`, sorted by number.
    pub fn extensions_of(&self, extendee: &str) -> Vec<&'static FieldDescriptor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut fields: Vec<_> = inner
            .iter()
            .filter(|((name, _), _)| name == extendee)
            .map(|(_, field)| *field)
            .collect();
        fields.sort_by_key(|field| field.number);
        fields
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    static PRIORITY: FieldDescriptor =
        FieldDescriptor::new("priority", "test.priority", 100, Kind::Int32).extension("test.Base");
    static LABEL: FieldDescriptor =
        FieldDescriptor::new("label", "test.label", 101, Kind::String).extension("test.Base");
    static LABEL_V2: FieldDescriptor =
        FieldDescriptor::new("label_v2", "test.label_v2", 101, Kind::String).extension("test.Base");
    static PLAIN: FieldDescriptor = FieldDescriptor::new("plain", "test.Base.plain", 1, Kind::Bool);

    #[test]
    fn test_register_and_find() {
        let registry = ExtensionRegistry::new();
        assert!(registry.is_empty());

        registry.register(&PRIORITY).unwrap();
        registry.register(&LABEL).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("test.Base", 100));
        assert!(!registry.contains("test.Other", 100));
        assert_eq!(
            registry.find("test.Base", 101).map(|f| f.full_name),
            Some("test.label")
        );
        assert!(registry.find("test.Base", 102).is_none());
    }

    #[test]
    fn test_register_replaces() {
        let registry = ExtensionRegistry::new();
        registry.register(&LABEL).unwrap();
        registry.register(&LABEL_V2).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.find("test.Base", 101).map(|f| f.name),
            Some("label_v2")
        );
    }

    #[test]
    fn test_register_rejects_regular_field() {
        let registry = ExtensionRegistry::new();
        assert_eq!(
            registry.register(&PLAIN),
            Err(ReflectError::NotAnExtension {
                field: "test.Base.plain"
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_extensions_of_sorted() {
        let registry = ExtensionRegistry::new();
        registry.register(&LABEL).unwrap();
        registry.register(&PRIORITY).unwrap();
        let numbers: Vec<_> = registry
            .extensions_of("test.Base")
            .iter()
            .map(|f| f.number)
            .collect();
        assert_eq!(numbers, vec![100, 101]);
        assert!(registry.extensions_of("test.Other").is_empty());
    }
}
