#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Asynchronous generation pipeline for keyed collection modules.
//!
//! A [`GenerationRun`] owns the task graph of one invocation. Every
//! [`Generator`] registers one target per output file under the run's
//! `generators` target; running any generator drives the whole run, after
//! which the runtime helpers are copied beside the outputs and type-checked
//! outputs are handed to the external checker in one launch.
//!
//! ## Module Organization
//!
//! - `run` - the generation run and its post-processing targets
//! - `generator` - one configuration written to one file
//! - `runtime_helpers` - embedded `Hasher.mjs` / `Composite.mjs` sources
//! - `type_check` - batch launch of the external type checker
//! - `manifest` - `*.collection.toml` collection manifests
//! - `driver` - in-memory and directory-driven entry points

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the generation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configuration handed to a generator was never locked.
    #[error("Configuration \"{0}\" must be locked before it is generated")]
    NotLocked(String),
    /// The output path has no file name or parent directory.
    #[error("Invalid output path: {0}")]
    OutputPath(PathBuf),
    /// The configured type checker could not be found.
    #[error("Type checker \"{0}\" was not found on PATH")]
    TypeCheckerMissing(String),
    /// The type checker ran past its timeout and was killed.
    #[error("Type checker timed out after {0} seconds")]
    TypeCheckTimeout(u64),
    /// The type checker rejected the generated files.
    #[error("Type check failed ({status}):\n{output}")]
    TypeCheckFailed {
        /// Exit status description.
        status: String,
        /// Captured stdout and stderr.
        output: String,
    },
    /// A manifest could not be turned into a collection.
    #[error("Manifest {path}: {message}")]
    Manifest {
        /// Manifest file.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
    /// Error from the task graph.
    #[error(transparent)]
    Task(#[from] tasks::TaskError),
    /// Error from the configuration builder.
    #[error(transparent)]
    Builder(#[from] builder::BuilderError),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Error loading the configuration file.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error parsing a manifest.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    /// Error walking the source tree.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    /// I/O error while creating or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub mod driver;
pub mod generator;
pub mod manifest;
pub mod run;
pub mod runtime_helpers;
pub mod type_check;

pub use driver::{DirectoryDriver, InMemoryDriver};
pub use generator::{Generator, GeneratorStatus};
pub use manifest::Manifest;
pub use run::GenerationRun;
