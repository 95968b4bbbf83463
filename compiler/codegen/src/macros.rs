//! Flat macro table derived from a configuration snapshot.
//!
//! Templates read names and validation code from here instead of walking the
//! configuration themselves. Validation code is a sequence of
//! `if (...) return false;` lines, one or two per guarded dimension, left
//! unindented for the template to place.

use std::collections::BTreeMap;

use ir::{CollectionConfiguration, KeyDescriptor, PairingBaseKind};

use crate::utils::{array_literal, name_list};
use crate::{CodegenError, Result};

/// Identity key name used in place of the reserved key of a pairing base.
pub const INTERNAL_KEY: &str = "__key__";

/// Value dimension macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueMacros {
    /// Display type.
    pub jsdoc_type: String,
    /// Description.
    pub description: String,
    /// Validation lines for `value`, empty when unvalidated.
    pub validate: String,
}

/// How a paired collection reaches its base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseSource {
    /// The platform `WeakMap`.
    Builtin,
    /// Generated into the same file ahead of the wrapper.
    Nested,
    /// Imported from a module specifier.
    Imported(String),
}

/// Paired collection macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingMacros {
    /// Weak key of the base that carries the identity key.
    pub reserved_key: String,
    /// Class name of the base.
    pub base_class_name: String,
    /// Where the base class comes from.
    pub base_source: BaseSource,
    /// Base dimensions other than the reserved key.
    pub source_names: Vec<String>,
    /// Base arguments in base order, with [`INTERNAL_KEY`] at the reserved position.
    pub base_arg_names: Vec<String>,
    /// Validation lines for the source dimensions.
    pub validate_sources: String,
}

impl PairingMacros {
    /// Whether the base is keyed by the reserved key alone.
    pub fn is_single_argument(&self) -> bool { self.source_names.is_empty() }

    /// `new X` expression creating the base instance.
    pub fn base_constructor(&self) -> String {
        match self.base_source {
            BaseSource::Builtin => "new WeakMap".to_string(),
            _ => format!("new {}", self.base_class_name),
        }
    }

    /// Base arguments with every source name suffixed by `suffix`.
    pub fn base_args_with_suffix(&self, suffix: &str) -> String {
        let args: Vec<String> = self
            .base_arg_names
            .iter()
            .map(|a| if a == INTERNAL_KEY { a.clone() } else { format!("{}{}", a, suffix) })
            .collect();
        name_list(&args)
    }
}

/// Name-to-value table consumed by templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroMap {
    /// Generated class name.
    pub class_name: String,
    /// Every key dimension, in declared order.
    pub arg_names: Vec<String>,
    /// Mapping keys.
    pub map_keys: Vec<String>,
    /// Set elements.
    pub set_elements: Vec<String>,
    /// Weakly held mapping keys.
    pub weak_map_keys: Vec<String>,
    /// Strongly held mapping keys.
    pub strong_map_keys: Vec<String>,
    /// Weakly held set elements.
    pub weak_set_elements: Vec<String>,
    /// Strongly held set elements.
    pub strong_set_elements: Vec<String>,
    /// Validation lines for every key dimension.
    pub validate_arguments: String,
    /// Validation lines for mapping keys only.
    pub validate_map_arguments: String,
    /// Validation lines for set elements only.
    pub validate_set_arguments: String,
    /// Display type of the first key dimension.
    pub key_first_type: String,
    /// Value dimension, if declared.
    pub value: Option<ValueMacros>,
    /// Extra import lines.
    pub import_lines: Option<String>,
    /// Pairing macros of a paired collection.
    pub pairing: Option<PairingMacros>,
}

impl MacroMap {
    /// Computes the table for `config`.
    pub fn from_configuration(config: &CollectionConfiguration) -> Result<Self> {
        let dims = config.dimensions();
        let map_dims: Vec<_> = dims.iter().filter(|d| d.kind().is_map_key()).collect();
        let set_dims: Vec<_> = dims.iter().filter(|d| d.kind().is_set_element()).collect();

        let pairing = match config.pairing() {
            Some(record) => {
                let sources = record.source_dimensions();
                let base_source = match (&record.base_kind, &record.options.path_to_base_module) {
                    (PairingBaseKind::BuiltinWeakMap, _) => BaseSource::Builtin,
                    (_, Some(path)) => BaseSource::Imported(path.clone()),
                    (_, None) => BaseSource::Nested,
                };
                Some(PairingMacros {
                    reserved_key: record.reserved_key.clone(),
                    base_class_name: record.base.class_name().to_string(),
                    base_source,
                    source_names: sources.iter().map(|d| d.name().to_string()).collect(),
                    base_arg_names: record
                        .base
                        .dimensions()
                        .iter()
                        .map(|d| {
                            if d.name() == record.reserved_key {
                                INTERNAL_KEY.to_string()
                            } else {
                                d.name().to_string()
                            }
                        })
                        .collect(),
                    validate_sources: sources.iter().map(|d| validation_lines(d)).collect(),
                })
            }
            None if config.family().is_one_to_one() => {
                return Err(CodegenError::Unreachable(format!(
                    "one-to-one configuration \"{}\" has no pairing base",
                    config.class_name()
                )))
            }
            None => None,
        };

        Ok(Self {
            class_name: config.class_name().to_string(),
            arg_names: config.argument_names(),
            map_keys: map_dims.iter().map(|d| d.name().to_string()).collect(),
            set_elements: set_dims.iter().map(|d| d.name().to_string()).collect(),
            weak_map_keys: config.weak_map_keys().to_vec(),
            strong_map_keys: config.strong_map_keys().to_vec(),
            weak_set_elements: config.weak_set_elements().to_vec(),
            strong_set_elements: config.strong_set_elements().to_vec(),
            validate_arguments: dims.iter().map(|d| validation_lines(d)).collect(),
            validate_map_arguments: map_dims.iter().map(|d| validation_lines(d)).collect(),
            validate_set_arguments: set_dims.iter().map(|d| validation_lines(d)).collect(),
            key_first_type: dims.first().map(|d| d.jsdoc_type().to_string()).unwrap_or_default(),
            value: config.value().map(|v| ValueMacros {
                jsdoc_type: v.jsdoc_type().to_string(),
                description: v.description().to_string(),
                validate: validation_lines(v),
            }),
            import_lines: config.import_lines().map(str::to_string),
            pairing,
        })
    }

    /// `a, b` form of every key argument.
    pub fn arg_list(&self) -> String { name_list(&self.arg_names) }

    /// `[a, b]` form of every key argument.
    pub fn arg_array(&self) -> String { array_literal(&self.arg_names) }

    /// `a, b` form of the mapping keys.
    pub fn map_arg_list(&self) -> String { name_list(&self.map_keys) }

    /// `a, b` form of the set elements.
    pub fn set_arg_list(&self) -> String { name_list(&self.set_elements) }

    /// Whether any key dimension is validated.
    pub fn has_validation(&self) -> bool { !self.validate_arguments.is_empty() }

    /// Whether any mapping key is validated.
    pub fn has_map_validation(&self) -> bool { !self.validate_map_arguments.is_empty() }

    /// Whether any set element is validated.
    pub fn has_set_validation(&self) -> bool { !self.validate_set_arguments.is_empty() }

    /// Validation lines for the value dimension.
    pub fn validate_value(&self) -> &str {
        self.value.as_ref().map(|v| v.validate.as_str()).unwrap_or("")
    }

    /// Flat view of the table, for tracing and inspection.
    pub fn as_table(&self) -> BTreeMap<&'static str, String> {
        let mut table = BTreeMap::new();
        table.insert("className", self.class_name.clone());
        table.insert("argList", self.arg_array());
        table.insert("argNameList", self.arg_list());
        table.insert("argCount", self.arg_names.len().to_string());
        table.insert("mapKeys", array_literal(&self.map_keys));
        table.insert("mapCount", self.map_keys.len().to_string());
        table.insert("setKeys", array_literal(&self.set_elements));
        table.insert("setCount", self.set_elements.len().to_string());
        table.insert("weakMapKeys", array_literal(&self.weak_map_keys));
        table.insert("weakMapCount", self.weak_map_keys.len().to_string());
        table.insert("strongMapKeys", array_literal(&self.strong_map_keys));
        table.insert("strongMapCount", self.strong_map_keys.len().to_string());
        table.insert("weakSetElements", array_literal(&self.weak_set_elements));
        table.insert("weakSetCount", self.weak_set_elements.len().to_string());
        table.insert("strongSetElements", array_literal(&self.strong_set_elements));
        table.insert("strongSetCount", self.strong_set_elements.len().to_string());
        table.insert("validateArguments", self.validate_arguments.clone());
        table.insert("validateMapArguments", self.validate_map_arguments.clone());
        table.insert("validateSetArguments", self.validate_set_arguments.clone());
        table.insert("keyFirstType", self.key_first_type.clone());
        if let Some(value) = &self.value {
            table.insert("valueType", value.jsdoc_type.clone());
            table.insert("valueDesc", value.description.clone());
            table.insert("validateValue", value.validate.clone());
        }
        if let Some(imports) = &self.import_lines {
            table.insert("importLines", imports.clone());
        }
        if let Some(pairing) = &self.pairing {
            table.insert("baseClassName", pairing.base_class_name.clone());
            table.insert("baseArgList", name_list(&pairing.base_arg_names));
            table.insert("sourceArgList", name_list(&pairing.source_names));
        }
        table
    }
}

/// Weak object check and caller validator for one dimension.
fn validation_lines(descriptor: &KeyDescriptor) -> String {
    let name = descriptor.name();
    let mut lines = String::new();
    if descriptor.kind().is_weak() {
        lines.push_str(&format!("if (Object({}) !== {}) return false;\n", name, name));
    }
    if let Some(expression) = descriptor.validator() {
        lines.push_str(&format!("if (!({})) return false;\n", expression));
    }
    lines
}
