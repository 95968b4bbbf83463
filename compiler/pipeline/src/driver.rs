//! Entry points that feed configurations to one [`GenerationRun`].

use std::path::{Path, PathBuf};

use builder::CollectionBuilder;
use config::{CompileOptions, TypeCheckConfig};
use futures::future::try_join_all;
use walkdir::WalkDir;

use crate::generator::Generator;
use crate::manifest::{load_collection, MANIFEST_SUFFIX};
use crate::run::GenerationRun;
use crate::{PipelineError, Result};

/// Generates locked builders to paths relative to an output directory.
#[derive(Debug)]
pub struct InMemoryDriver {
    run: GenerationRun,
    options: CompileOptions,
    generators: Vec<Generator>,
}

impl InMemoryDriver {
    /// A driver writing under `output_dir`.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        options: CompileOptions,
        type_check: TypeCheckConfig,
    ) -> Result<Self> {
        Ok(Self { run: GenerationRun::new(output_dir, type_check)?, options, generators: Vec::new() })
    }

    /// The driver's run.
    pub fn generation_run(&self) -> &GenerationRun { &self.run }

    /// Schedules `builder` to be written to `relative_path` under the output directory.
    pub fn add(&mut self, builder: &CollectionBuilder, relative_path: impl AsRef<Path>) -> Result<()> {
        let relative_path = relative_path.as_ref();
        if relative_path.is_absolute() {
            return Err(PipelineError::OutputPath(relative_path.to_path_buf()));
        }
        let output = self.run.output_root().join(relative_path);
        let generator = Generator::new(builder, output, self.options.clone(), &self.run)?;
        self.generators.push(generator);
        Ok(())
    }

    /// Runs every scheduled generator and returns the class names in the
    /// order they were added.
    pub async fn run(&self) -> Result<Vec<String>> {
        try_join_all(self.generators.iter().map(Generator::run)).await
    }
}

/// Generates every `*.collection.toml` manifest found under a source tree.
///
/// `fleet/Cars.collection.toml` is written to `<output>/fleet/Cars.mjs`.
#[derive(Debug, Clone)]
pub struct DirectoryDriver {
    source_dir: PathBuf,
    output_dir: PathBuf,
    options: CompileOptions,
    type_check: TypeCheckConfig,
}

impl DirectoryDriver {
    /// A driver reading `source_dir` and writing `output_dir`.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        options: CompileOptions,
        type_check: TypeCheckConfig,
    ) -> Self {
        Self { source_dir: source_dir.into(), output_dir: output_dir.into(), options, type_check }
    }

    /// Manifest files under the source directory, sorted.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut manifests = Vec::new();
        for entry in WalkDir::new(&self.source_dir) {
            let entry = entry?;
            let is_manifest = entry.file_name().to_string_lossy().ends_with(MANIFEST_SUFFIX);
            if entry.file_type().is_file() && is_manifest {
                manifests.push(entry.into_path());
            }
        }
        manifests.sort();
        logging::debug(
            "pipeline",
            &format!("found {} manifests under {}", manifests.len(), self.source_dir.display()),
        );
        Ok(manifests)
    }

    /// Output path of `manifest`, relative to the output directory.
    pub fn relative_output(&self, manifest: &Path) -> Result<PathBuf> {
        let relative = manifest
            .strip_prefix(&self.source_dir)
            .map_err(|_| PipelineError::OutputPath(manifest.to_path_buf()))?;
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::OutputPath(manifest.to_path_buf()))?;
        let stem = file_name
            .strip_suffix(MANIFEST_SUFFIX)
            .ok_or_else(|| PipelineError::OutputPath(manifest.to_path_buf()))?;
        Ok(relative.with_file_name(format!("{}.mjs", stem)))
    }

    /// Builds and generates every manifest.
    pub async fn run(&self) -> Result<Vec<String>> {
        let mut driver =
            InMemoryDriver::new(&self.output_dir, self.options.clone(), self.type_check.clone())?;
        for manifest in self.discover()? {
            let builder = load_collection(&manifest)?;
            driver.add(&builder, self.relative_output(&manifest)?)?;
        }
        driver.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_output_swaps_the_suffix() {
        let driver = DirectoryDriver::new(
            "/src",
            "/out",
            CompileOptions::default(),
            TypeCheckConfig::default(),
        );
        let relative =
            driver.relative_output(Path::new("/src/fleet/Cars.collection.toml")).expect("path");
        assert_eq!(relative, PathBuf::from("fleet/Cars.mjs"));
        assert!(driver.relative_output(Path::new("/elsewhere/Cars.collection.toml")).is_err());
    }
}
