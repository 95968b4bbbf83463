//! Key and value dimension descriptors.

use serde::{Deserialize, Serialize};

/// How a dimension participates in the collection and how it is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Mapping key held weakly.
    WeakMapKey,
    /// Mapping key held strongly.
    StrongMapKey,
    /// Set element held weakly.
    WeakSetElement,
    /// Set element held strongly.
    StrongSetElement,
    /// The value stored under a full key of a map.
    Value,
}

impl KeyKind {
    /// Mapping key or set element of the requested retention.
    pub fn for_key(is_map_key: bool, hold_weak: bool) -> Self {
        match (is_map_key, hold_weak) {
            (true, true) => KeyKind::WeakMapKey,
            (true, false) => KeyKind::StrongMapKey,
            (false, true) => KeyKind::WeakSetElement,
            (false, false) => KeyKind::StrongSetElement,
        }
    }

    /// Whether the dimension is held weakly.
    pub fn is_weak(&self) -> bool { matches!(self, KeyKind::WeakMapKey | KeyKind::WeakSetElement) }

    /// Whether the dimension is a mapping key.
    pub fn is_map_key(&self) -> bool { matches!(self, KeyKind::WeakMapKey | KeyKind::StrongMapKey) }

    /// Whether the dimension is a set element.
    pub fn is_set_element(&self) -> bool {
        matches!(self, KeyKind::WeakSetElement | KeyKind::StrongSetElement)
    }

    /// Documentation type used when the caller supplies none.
    pub fn default_jsdoc_type(&self) -> &'static str { if self.is_weak() { "object" } else { "*" } }

    /// Type annotation used when the caller supplies none.
    pub fn default_ts_type(&self) -> &'static str { if self.is_weak() { "object" } else { "unknown" } }
}

/// One declared key, set element or value dimension.
///
/// Descriptors are immutable once built and compare structurally. The
/// `with_*` methods consume the descriptor and are only meant for
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    name: String,
    kind: KeyKind,
    jsdoc_type: String,
    ts_type: String,
    description: String,
    validator: Option<String>,
}

impl KeyDescriptor {
    /// Descriptor with default types and no validator.
    pub fn new(name: impl Into<String>, kind: KeyKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            jsdoc_type: kind.default_jsdoc_type().to_string(),
            ts_type: kind.default_ts_type().to_string(),
            description: description.into(),
            validator: None,
        }
    }

    /// Replace the documentation type.
    pub fn with_jsdoc_type(mut self, jsdoc_type: impl Into<String>) -> Self {
        self.jsdoc_type = jsdoc_type.into();
        self
    }

    /// Replace the type annotation.
    pub fn with_ts_type(mut self, ts_type: impl Into<String>) -> Self {
        self.ts_type = ts_type.into();
        self
    }

    /// Attach a validator expression body.
    pub fn with_validator(mut self, validator: impl Into<String>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    /// Dimension name; becomes the generated argument name.
    pub fn name(&self) -> &str { &self.name }

    /// Role and retention.
    pub fn kind(&self) -> KeyKind { self.kind }

    /// Display type for generated documentation.
    pub fn jsdoc_type(&self) -> &str { &self.jsdoc_type }

    /// Type annotation for type-checked output.
    pub fn ts_type(&self) -> &str { &self.ts_type }

    /// Human-readable description.
    pub fn description(&self) -> &str { &self.description }

    /// Validator expression body, spliced verbatim into generated code.
    pub fn validator(&self) -> Option<&str> { self.validator.as_deref() }
}
