#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Collection of utilities for the keymesh command-line tool.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError};
use pipeline::{DirectoryDriver, PipelineError};
use thiserror::Error;

/// Errors that can occur during keymesh operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or saving the configuration file failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Generation failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Generic error with a custom message.
    #[error("{0}")]
    Message(String),
}

/// Result type alias for keymesh operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Flags of `keymesh generate` that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOverrides {
    /// Manifest directory.
    pub source: Option<PathBuf>,
    /// Output directory.
    pub output: Option<PathBuf>,
    /// Force type-checked output.
    pub type_check: bool,
    /// Disable mapping-of-sets specialization.
    pub no_specialization: bool,
}

/// Applies command-line overrides to a loaded configuration.
pub fn apply_overrides(mut config: Config, overrides: &GenerateOverrides) -> Config {
    if let Some(source) = &overrides.source {
        config.codegen.source_dir = source.clone();
    }
    if let Some(output) = &overrides.output {
        config.codegen.output_dir = output.clone();
    }
    if overrides.type_check {
        config.compile = config.compile.with_generate_type_checked(true);
    }
    if overrides.no_specialization {
        config.compile = config.compile.with_disable_key_optimization(true);
    }
    config
}

/// Generates every manifest under the configured source directory.
pub async fn generate(config: &Config) -> Result<Vec<String>> {
    let source = &config.codegen.source_dir;
    if !source.is_dir() {
        return Err(CliError::Message(format!(
            "Source directory {} does not exist",
            source.display()
        )));
    }

    let driver = DirectoryDriver::new(
        source,
        &config.codegen.output_dir,
        config.compile.clone(),
        config.type_check.clone(),
    );
    Ok(driver.run().await?)
}

/// Writes a default configuration file to `path`.
///
/// An existing file is only replaced when `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Message(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(ConfigError::from)?;
    }
    Config::default().save(path)?;
    Ok(())
}
