//! `*.collection.toml` collection manifests.
//!
//! A manifest describes one collection the same way the builder calls do:
//!
//! ```toml
//! class_name = "OwnerPoints"
//! outer = "WeakMap"
//! inner = "Set"
//! overview = "Points owned by an object."
//!
//! [[map_keys]]
//! name = "owner"
//! description = "The owner."
//! hold_weak = true
//!
//! [[set_elements]]
//! name = "x"
//! description = "The x coordinate."
//! validator = "x => typeof x === \"number\""
//! ```
//!
//! A paired collection names its base either as a well-known base
//! (`base = "WeakStrongMap"`) or as another manifest relative to this one
//! (`base_manifest = "Base.collection.toml"`).

use std::path::{Path, PathBuf};

use builder::{CollectionBuilder, KeyOptions, PairingBase};
use ir::{InnerShape, OuterShape, PairingOptions};
use serde::{Deserialize, Serialize};

use crate::{PipelineError, Result};

/// File name suffix of a manifest.
pub const MANIFEST_SUFFIX: &str = ".collection.toml";

/// One collection manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Name of the generated class.
    pub class_name: String,
    /// Outer shape.
    pub outer: OuterShape,
    /// Inner shape of a mapping of sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<InnerShape>,
    /// `@file` overview text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Import statements copied into the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_lines: Option<String>,
    /// Mapping keys, in argument order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map_keys: Vec<KeyEntry>,
    /// Set elements, in argument order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_elements: Vec<KeyEntry>,
    /// Value of a mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueEntry>,
    /// Base of a paired collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing: Option<PairingEntry>,
}

/// A mapping key or set element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEntry {
    /// Argument name.
    pub name: String,
    /// Documentation text.
    pub description: String,
    /// Hold the argument weakly.
    #[serde(default)]
    pub hold_weak: bool,
    /// JSDoc display type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsdoc_type: Option<String>,
    /// Type-checked annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_type: Option<String>,
    /// Validator arrow function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

/// The value of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueEntry {
    /// Documentation text.
    pub description: String,
    /// JSDoc display type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsdoc_type: Option<String>,
    /// Type-checked annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_type: Option<String>,
    /// Validator arrow function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

/// Base of a paired collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairingEntry {
    /// Well-known base name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Manifest of a declared base, relative to this manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_manifest: Option<PathBuf>,
    /// Weak key of the base reserved for the pairing identity.
    pub reserved_key: String,
    /// Module to import the base class from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_to_base_module: Option<String>,
}

fn key_options(jsdoc: &Option<String>, ts: &Option<String>, validator: &Option<String>) -> KeyOptions {
    KeyOptions { jsdoc_type: jsdoc.clone(), ts_type: ts.clone(), validator: validator.clone() }
}

impl Manifest {
    /// Parses manifest text.
    pub fn parse(text: &str) -> Result<Self> { Ok(toml::from_str(text)?) }

    /// Reads and parses a manifest file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text).map_err(|e| PipelineError::Manifest {
            path: path.as_ref().to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Replays the manifest against a fresh builder and locks it.
    ///
    /// `base` must be supplied when the pairing names a `base_manifest`.
    pub fn build(&self, base: Option<&CollectionBuilder>) -> Result<CollectionBuilder> {
        let mut builder = CollectionBuilder::new(&self.class_name, self.outer, self.inner)?;
        if let Some(overview) = &self.overview {
            builder.set_overview(overview)?;
        }
        if let Some(lines) = &self.import_lines {
            builder.set_import_lines(lines)?;
        }
        for key in &self.map_keys {
            let options = key_options(&key.jsdoc_type, &key.ts_type, &key.validator);
            builder.add_map_key(&key.name, &key.description, key.hold_weak, options)?;
        }
        for element in &self.set_elements {
            let options = key_options(&element.jsdoc_type, &element.ts_type, &element.validator);
            builder.add_set_element(
                &element.name,
                &element.description,
                element.hold_weak,
                options,
            )?;
        }
        if let Some(value) = &self.value {
            let options = key_options(&value.jsdoc_type, &value.ts_type, &value.validator);
            builder.set_value_type(&value.description, options)?;
        }
        if let Some(pairing) = &self.pairing {
            let options =
                PairingOptions { path_to_base_module: pairing.path_to_base_module.clone() };
            let base = match (&pairing.base, &pairing.base_manifest, base) {
                (Some(name), None, _) => PairingBase::WellKnown(name),
                (None, Some(_), Some(base)) => PairingBase::Builder(base),
                (None, Some(path), None) => {
                    return Err(PipelineError::Message(format!(
                        "base manifest {} of \"{}\" was not loaded",
                        path.display(),
                        self.class_name
                    )))
                }
                _ => {
                    return Err(PipelineError::Message(format!(
                        "pairing of \"{}\" needs exactly one of base or base_manifest",
                        self.class_name
                    )))
                }
            };
            builder.configure_pairing(base, &pairing.reserved_key, &options)?;
        }
        builder.lock()?;
        Ok(builder)
    }
}

/// Loads the manifest at `path`, and any base manifest it names, into a
/// locked builder.
pub fn load_collection(path: &Path) -> Result<CollectionBuilder> { load_with(path, &mut Vec::new()) }

fn load_with(path: &Path, loading: &mut Vec<PathBuf>) -> Result<CollectionBuilder> {
    if loading.iter().any(|p| p == path) {
        return Err(PipelineError::Manifest {
            path: path.to_path_buf(),
            message: "base manifests form a cycle".to_string(),
        });
    }
    loading.push(path.to_path_buf());

    let manifest = Manifest::from_file(path)?;
    let base = match manifest.pairing.as_ref().and_then(|p| p.base_manifest.as_ref()) {
        Some(relative) => {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            Some(load_with(&dir.join(relative), loading)?)
        }
        None => None,
    };

    let built = manifest.build(base.as_ref()).map_err(|e| PipelineError::Manifest {
        path: path.to_path_buf(),
        message: e.to_string(),
    });
    loading.pop();
    built
}
