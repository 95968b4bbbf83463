//! Identifier and reserved-name checks for class names, dimension names and
//! caller-supplied documentation text.

use regex::Regex;

use crate::{BuilderError, Result};

/// Built-in collection names a generated class may not shadow.
pub const RESERVED_CLASS_NAMES: [&str; 4] = ["Map", "Set", "WeakMap", "WeakSet"];

/// Name of the value dimension on mapping shapes.
pub const VALUE_NAME: &str = "value";

// ECMAScript keywords plus the strict-mode and module reserved words.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` is a plain JavaScript identifier that is not a reserved word.
pub fn is_identifier(name: &str) -> Result<bool> {
    let re = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$")?;
    Ok(re.is_match(name) && !RESERVED_WORDS.contains(&name))
}

/// Whether `name` both starts and ends with a double underscore.
pub fn is_reserved_pattern(name: &str) -> Result<bool> {
    let re = Regex::new(r"^__.*__$")?;
    Ok(re.is_match(name))
}

/// Whether `text` embeds a `__name__` token anywhere.
pub fn contains_reserved_pattern(text: &str) -> Result<bool> {
    let re = Regex::new(r"__[A-Za-z0-9_$]+__")?;
    Ok(re.is_match(text))
}

/// Checks a class name for the generated module.
pub fn check_class_name(name: &str) -> Result<()> {
    if name.trim() != name {
        return Err(BuilderError::Whitespace(name.to_string()));
    }
    if !is_identifier(name)? {
        return Err(BuilderError::Identifier(name.to_string()));
    }
    if RESERVED_CLASS_NAMES.contains(&name) || is_reserved_pattern(name)? {
        return Err(BuilderError::Reserved(name.to_string()));
    }
    Ok(())
}

/// Checks a dimension name. `value_reserved` is set on mapping shapes.
pub fn check_dimension_name(name: &str, value_reserved: bool) -> Result<()> {
    if name.trim() != name {
        return Err(BuilderError::Whitespace(name.to_string()));
    }
    if !is_identifier(name)? {
        return Err(BuilderError::Identifier(name.to_string()));
    }
    if is_reserved_pattern(name)? || (value_reserved && name == VALUE_NAME) {
        return Err(BuilderError::Reserved(name.to_string()));
    }
    Ok(())
}

/// Checks a documentation string such as a description or display type.
pub fn check_text(field: &'static str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(BuilderError::EmptyText(field));
    }
    if contains_reserved_pattern(text)? {
        return Err(BuilderError::ReservedText { field, text: text.to_string() });
    }
    Ok(())
}
