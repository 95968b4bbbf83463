#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Code generation for keyed collections.
//!
//! This crate turns a locked [`ir::CollectionConfiguration`] into the source of
//! one JavaScript module. It focuses solely on producing text: picking the
//! template variant, computing the macro table, rendering doc comments and
//! assembling the file.
//!
//! Scheduling, file output and post-processing live in the pipeline crate.

pub mod generators;
pub mod macros;
pub mod source_generator;

use regex::Regex;
use thiserror::Error;

pub use generators::registry::{discriminant, select_variant, TemplateRegistry, TemplateVariant};
pub use generators::HelperUse;
pub use macros::MacroMap;
pub use source_generator::{GeneratedSource, SourceGenerator};

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Malformed pattern.
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// A method template failed validation.
    #[error("Invalid doc template \"{name}\": {reason}")]
    InvalidDocTemplate {
        /// Method name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A block was requested for a method with no template.
    #[error("No doc template for method \"{0}\"")]
    MissingDocTemplate(String),
    /// Internal invariant violation.
    #[error("Unreachable: {0}")]
    Unreachable(String),
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Sub-crate: **`utils`**
///
/// Line writer and small list helpers shared by the templates.
pub mod utils;

/// Normalizes generated source.
///
/// Trailing whitespace is stripped from every line, runs of blank lines are
/// collapsed to a single blank line and the result ends with exactly one
/// newline. Empty input stays empty.
pub fn format_source(src: &str) -> Result<String> {
    let trimmed: Vec<&str> = src.lines().map(str::trim_end).collect();
    let joined = trimmed.join("\n");
    let collapsed = Regex::new(r"\n{3,}")?.replace_all(&joined, "\n\n");
    let body = collapsed.trim_matches('\n');
    if body.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{}\n", body))
    }
}
