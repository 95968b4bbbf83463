#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! keymesh configuration
//!
//! This crate provides configuration management for keymesh.
//! It handles loading, saving, and managing configuration files that specify:
//! - Logging configuration
//! - Where collection manifests are read from and generated modules written to
//! - Compile-time options stamped into every generated file
//! - The external type checker used for type-checked output
//!
//! Configuration is stored in TOML format. Every section is optional and falls
//! back to its defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Source and output directories
    pub codegen: CodegenConfig,
    /// Compile-time options
    pub compile: CompileOptions,
    /// External type checker
    pub type_check: TypeCheckConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string() } }
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Directory scanned for `*.collection.toml` manifests
    pub source_dir: PathBuf,
    /// Where to write generated modules
    pub output_dir: PathBuf,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self { source_dir: PathBuf::from("collections"), output_dir: PathBuf::from("generated") }
    }
}

/// External type checker invoked once per run over every type-checked output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCheckConfig {
    /// Program to launch
    pub program: String,
    /// Arguments placed before the list of files
    pub args: Vec<String>,
    /// Seconds to wait before the checker is killed
    pub timeout_secs: u64,
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self {
            program: "tsc".to_string(),
            args: vec!["--noEmit".into(), "--allowJs".into(), "--checkJs".into()],
            timeout_secs: 120,
        }
    }
}

/// Compile-time options applied to one generated file.
///
/// An immutable value: build it with the `with_*` methods, then read it through
/// the getters. Every field defaults to empty or `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    license_text: String,
    license: String,
    author: String,
    copyright: String,
    disable_key_optimization: bool,
    generate_type_checked: bool,
}

impl CompileOptions {
    /// Options with every field empty.
    pub fn new() -> Self { Self::default() }

    /// Full license text placed at the top of the file.
    pub fn with_license_text(mut self, text: impl Into<String>) -> Self {
        self.license_text = text.into();
        self
    }

    /// License identifier for the `@license` tag.
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    /// Author for the `@author` tag.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Holder for the `@copyright` tag.
    pub fn with_copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = copyright.into();
        self
    }

    /// Turn off the cardinality-based template specialization.
    pub fn with_disable_key_optimization(mut self, disable: bool) -> Self {
        self.disable_key_optimization = disable;
        self
    }

    /// Request type-checked output.
    pub fn with_generate_type_checked(mut self, enabled: bool) -> Self {
        self.generate_type_checked = enabled;
        self
    }

    /// Full license text.
    pub fn license_text(&self) -> &str { &self.license_text }

    /// License identifier.
    pub fn license(&self) -> &str { &self.license }

    /// Author.
    pub fn author(&self) -> &str { &self.author }

    /// Copyright holder.
    pub fn copyright(&self) -> &str { &self.copyright }

    /// Whether template specialization is disabled.
    pub fn disable_key_optimization(&self) -> bool { self.disable_key_optimization }

    /// Whether type-checked output is requested.
    pub fn generate_type_checked(&self) -> bool { self.generate_type_checked }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/keymesh/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("keymesh");
        Ok(config_dir.join("config.toml"))
    }

    /// Load `path` when given, else the default path when it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [logging]
            level = "debug"

            [codegen]
            source_dir = "manifests"
            output_dir = "out"

            [compile]
            license = "MIT"
            author = "Jane Doe"
            generate_type_checked = true

            [type_check]
            program = "npx"
            args = ["tsc", "--noEmit"]
            timeout_secs = 30
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let loaded = Config::from_file(&temp_file).expect("Failed to load config");
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.codegen.source_dir, PathBuf::from("manifests"));
        assert_eq!(loaded.codegen.output_dir, PathBuf::from("out"));
        assert_eq!(loaded.compile.license(), "MIT");
        assert_eq!(loaded.compile.author(), "Jane Doe");
        assert_eq!(loaded.compile.copyright(), "");
        assert!(loaded.compile.generate_type_checked());
        assert!(!loaded.compile.disable_key_optimization());
        assert_eq!(loaded.type_check.program, "npx");
        assert_eq!(loaded.type_check.args, vec!["tsc", "--noEmit"]);
        assert_eq!(loaded.type_check.timeout_secs, 30);

        // Missing sections fall back to defaults
        let temp_file2 = NamedTempFile::new().expect("Failed to create second temporary file");
        fs::write(&temp_file2, "[compile]\ndisable_key_optimization = true\n")
            .expect("Failed to write partial config");
        let partial = Config::from_file(&temp_file2).expect("Failed to load partial config");
        assert_eq!(partial.logging, LoggingConfig::default());
        assert_eq!(partial.type_check, TypeCheckConfig::default());
        assert!(partial.compile.disable_key_optimization());

        let result = Config::from_file("nonexistent_file.toml");
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        let temp_file3 = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file3, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file3).expect_err("Expected parse error") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_save() {
        let mut config = Config::default();
        config.compile = CompileOptions::new().with_license("ISC").with_author("keymesh");
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        config.save(&temp_file).expect("Failed to save config");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("[compile]"));
        assert!(contents.contains("ISC"));
        assert!(contents.contains("tsc"));

        let reloaded = Config::from_file(&temp_file).expect("Failed to reload config");
        assert_eq!(reloaded, config);

        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&non_existent_subdir).expect_err("Expected file write error") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.contains("keymesh"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_or_default_prefers_explicit_path() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "[logging]\nlevel = \"warn\"\n").expect("Failed to write config");
        let config =
            Config::load_or_default(Some(temp_file.path())).expect("Failed to load config");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_compile_options_defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.license_text(), "");
        assert_eq!(options.license(), "");
        assert!(!options.generate_type_checked());

        let options = options.with_copyright("2024 keymesh").with_generate_type_checked(true);
        assert_eq!(options.copyright(), "2024 keymesh");
        assert!(options.generate_type_checked());
    }
}
