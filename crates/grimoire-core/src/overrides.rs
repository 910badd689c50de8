//! Caller-supplied values that mask computed fields.

use std::collections::BTreeMap;

use grimoire_types::HudField;

/// Per-viewer map of field overrides.
///
/// An entry replaces the computed value of its field until removed. Nothing
/// here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    values: BTreeMap<HudField, String>,
}

impl OverrideMap {
    /// An empty map.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// The override for `field`, if set.
    pub fn get(&self, field: HudField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Set (`Some`) or remove (`None`) the override for `field`.
    ///
    /// Returns the previous value.
    pub fn set(&mut self, field: HudField, value: Option<String>) -> Option<String> {
        match value {
            Some(value) => self.values.insert(field, value),
            None => self.values.remove(&field),
        }
    }

    /// The override for `field`, or the computed value.
    ///
    /// `compute` only runs when no override is present.
    pub fn resolve_with(&self, field: HudField, compute: impl FnOnce() -> String) -> String {
        self.values.get(&field).cloned().unwrap_or_else(compute)
    }

    /// Number of active overrides.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no override is active.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Active overrides in field order.
    pub fn iter(&self) -> impl Iterator<Item = (HudField, &str)> {
        self.values
            .iter()
            .map(|(field, value)| (*field, value.as_str()))
    }
}
