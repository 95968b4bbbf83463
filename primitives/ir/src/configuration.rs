//! Normalized configuration snapshot of one collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key_descriptor::{KeyDescriptor, KeyKind};
use crate::shape::TemplateFamily;

/// Structural violations of a [`CollectionConfiguration`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A write-once field was written twice.
    #[error("The {0} has already been set")]
    AlreadySet(&'static str),
    /// A dimension name was declared twice.
    #[error("Argument name \"{0}\" has already been defined!")]
    DuplicateDimension(String),
    /// A key descriptor was passed where a value descriptor belongs, or vice versa.
    #[error("Descriptor \"{name}\" has kind {kind:?}, which does not belong here")]
    MisplacedDescriptor {
        /// Name of the descriptor.
        name: String,
        /// Its kind.
        kind: KeyKind,
    },
}

/// Options that shape how a paired collection composes its base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingOptions {
    /// Module specifier to import the base class from instead of generating it inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_to_base_module: Option<String>,
}

/// Where the base of a paired collection comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingBaseKind {
    /// The platform's own weak map; nothing is generated for it.
    BuiltinWeakMap,
    /// A well-known base resolved by name.
    WellKnown(String),
    /// A locked configuration supplied by the caller.
    Declared,
}

/// The base of a paired collection and how to compose it.
#[derive(Debug, Clone, PartialEq)]
pub struct PairingRecord {
    /// Weak dimension of the base that holds the internal identity key.
    pub reserved_key: String,
    /// Snapshot of the base configuration.
    pub base: Box<CollectionConfiguration>,
    /// Provenance of the base.
    pub base_kind: PairingBaseKind,
    /// Composition options, owned by this record.
    pub options: PairingOptions,
}

impl PairingRecord {
    /// Base dimensions other than the reserved key, in declared order.
    pub fn source_dimensions(&self) -> Vec<Arc<KeyDescriptor>> {
        self.base
            .dimensions()
            .iter()
            .filter(|d| d.name() != self.reserved_key)
            .cloned()
            .collect()
    }

    /// Whether the base is keyed by the reserved key alone.
    pub fn is_single_argument(&self) -> bool { self.base.dimensions().len() == 1 }
}

/// Normalized snapshot of one collection's declared shape.
///
/// Cloning yields an independent object: the dimension table and derived
/// partitions are copied, while the immutable descriptors are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfiguration {
    class_name: String,
    family: TemplateFamily,
    overview: Option<String>,
    import_lines: Option<String>,
    dimensions: Vec<Arc<KeyDescriptor>>,
    weak_map_keys: Vec<String>,
    strong_map_keys: Vec<String>,
    weak_set_elements: Vec<String>,
    strong_set_elements: Vec<String>,
    value: Option<Arc<KeyDescriptor>>,
    pairing: Option<PairingRecord>,
}

impl CollectionConfiguration {
    /// Empty configuration for `class_name`.
    pub fn new(class_name: impl Into<String>, family: TemplateFamily) -> Self {
        Self {
            class_name: class_name.into(),
            family,
            overview: None,
            import_lines: None,
            dimensions: Vec::new(),
            weak_map_keys: Vec::new(),
            strong_map_keys: Vec::new(),
            weak_set_elements: Vec::new(),
            strong_set_elements: Vec::new(),
            value: None,
            pairing: None,
        }
    }

    /// Name of the generated class.
    pub fn class_name(&self) -> &str { &self.class_name }

    /// Current template family.
    pub fn family(&self) -> TemplateFamily { self.family }

    /// File overview text, if any.
    pub fn overview(&self) -> Option<&str> { self.overview.as_deref() }

    /// Extra import lines, if any.
    pub fn import_lines(&self) -> Option<&str> { self.import_lines.as_deref() }

    /// Key dimensions in declaration order; this is positional argument order.
    pub fn dimensions(&self) -> &[Arc<KeyDescriptor>] { &self.dimensions }

    /// Dimension called `name`.
    pub fn dimension(&self, name: &str) -> Option<&Arc<KeyDescriptor>> {
        self.dimensions.iter().find(|d| d.name() == name)
    }

    /// Whether a key dimension called `name` exists.
    pub fn has_dimension(&self, name: &str) -> bool { self.dimension(name).is_some() }

    /// Names of every key dimension, in declaration order.
    pub fn argument_names(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name().to_string()).collect()
    }

    /// Mapping keys in declaration order.
    pub fn map_keys(&self) -> Vec<Arc<KeyDescriptor>> {
        self.dimensions.iter().filter(|d| d.kind().is_map_key()).cloned().collect()
    }

    /// Set elements in declaration order.
    pub fn set_elements(&self) -> Vec<Arc<KeyDescriptor>> {
        self.dimensions.iter().filter(|d| d.kind().is_set_element()).cloned().collect()
    }

    /// Weakly held mapping keys.
    pub fn weak_map_keys(&self) -> &[String] { &self.weak_map_keys }

    /// Strongly held mapping keys.
    pub fn strong_map_keys(&self) -> &[String] { &self.strong_map_keys }

    /// Weakly held set elements.
    pub fn weak_set_elements(&self) -> &[String] { &self.weak_set_elements }

    /// Strongly held set elements.
    pub fn strong_set_elements(&self) -> &[String] { &self.strong_set_elements }

    /// Value dimension of a map, if declared.
    pub fn value(&self) -> Option<&Arc<KeyDescriptor>> { self.value.as_ref() }

    /// Pairing record of a paired collection, if configured.
    pub fn pairing(&self) -> Option<&PairingRecord> { self.pairing.as_ref() }

    /// Replace the template family.
    pub fn set_family(&mut self, family: TemplateFamily) { self.family = family; }

    /// Set the overview text. Write-once.
    pub fn set_overview(&mut self, overview: impl Into<String>) -> Result<(), ConfigurationError> {
        if self.overview.is_some() {
            return Err(ConfigurationError::AlreadySet("file overview"));
        }
        self.overview = Some(overview.into());
        Ok(())
    }

    /// Set the import text. Write-once.
    pub fn set_import_lines(&mut self, lines: impl Into<String>) -> Result<(), ConfigurationError> {
        if self.import_lines.is_some() {
            return Err(ConfigurationError::AlreadySet("import text"));
        }
        self.import_lines = Some(lines.into());
        Ok(())
    }

    /// Append a key dimension and update the derived partitions.
    pub fn add_dimension(&mut self, descriptor: KeyDescriptor) -> Result<(), ConfigurationError> {
        let duplicate = self.has_dimension(descriptor.name());
        let partition = match descriptor.kind() {
            KeyKind::WeakMapKey => &mut self.weak_map_keys,
            KeyKind::StrongMapKey => &mut self.strong_map_keys,
            KeyKind::WeakSetElement => &mut self.weak_set_elements,
            KeyKind::StrongSetElement => &mut self.strong_set_elements,
            KeyKind::Value => {
                return Err(ConfigurationError::MisplacedDescriptor {
                    name: descriptor.name().to_string(),
                    kind: KeyKind::Value,
                })
            }
        };
        if duplicate {
            return Err(ConfigurationError::DuplicateDimension(descriptor.name().to_string()));
        }

        partition.push(descriptor.name().to_string());
        self.dimensions.push(Arc::new(descriptor));
        Ok(())
    }

    /// Set the value dimension. Write-once.
    pub fn set_value(&mut self, descriptor: KeyDescriptor) -> Result<(), ConfigurationError> {
        if descriptor.kind() != KeyKind::Value {
            return Err(ConfigurationError::MisplacedDescriptor {
                name: descriptor.name().to_string(),
                kind: descriptor.kind(),
            });
        }
        if self.value.is_some() {
            return Err(ConfigurationError::AlreadySet("value type"));
        }
        self.value = Some(Arc::new(descriptor));
        Ok(())
    }

    /// Set the pairing record. Write-once.
    pub fn set_pairing(&mut self, record: PairingRecord) -> Result<(), ConfigurationError> {
        if self.pairing.is_some() {
            return Err(ConfigurationError::AlreadySet("one-to-one base"));
        }
        self.pairing = Some(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CollectionConfiguration {
        let mut config = CollectionConfiguration::new("CarDrivers", TemplateFamily::WeakMap);
        config
            .add_dimension(KeyDescriptor::new("car", KeyKind::WeakMapKey, "The car."))
            .expect("car");
        config
            .add_dimension(KeyDescriptor::new("seat", KeyKind::StrongMapKey, "The seat."))
            .expect("seat");
        config
    }

    #[test]
    fn test_partitions_follow_declarations() {
        let config = sample();
        assert_eq!(config.argument_names(), vec!["car", "seat"]);
        assert_eq!(config.weak_map_keys(), ["car".to_string()]);
        assert_eq!(config.strong_map_keys(), ["seat".to_string()]);
        assert!(config.weak_set_elements().is_empty());
        assert_eq!(config.map_keys().len(), 2);
        assert!(config.set_elements().is_empty());
    }

    #[test]
    fn test_duplicate_and_misplaced_descriptors() {
        let mut config = sample();
        assert_eq!(
            config.add_dimension(KeyDescriptor::new("car", KeyKind::StrongMapKey, "Again.")),
            Err(ConfigurationError::DuplicateDimension("car".into()))
        );
        assert!(config.add_dimension(KeyDescriptor::new("value", KeyKind::Value, "V")).is_err());
        assert!(config.set_value(KeyDescriptor::new("x", KeyKind::StrongMapKey, "X")).is_err());
        config.set_value(KeyDescriptor::new("value", KeyKind::Value, "The driver.")).expect("value");
        assert_eq!(
            config.set_value(KeyDescriptor::new("value", KeyKind::Value, "Again.")),
            Err(ConfigurationError::AlreadySet("value type"))
        );
    }

    #[test]
    fn test_write_once_text() {
        let mut config = sample();
        config.set_overview("Cars and drivers.").expect("overview");
        assert!(config.set_overview("Again").is_err());
        config.set_import_lines("import Car from \"./Car.mjs\";").expect("imports");
        assert!(config.set_import_lines("again").is_err());
    }
}
