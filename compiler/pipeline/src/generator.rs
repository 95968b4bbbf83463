//! One locked configuration written to one output file.
//!
//! Construction registers the file with a [`GenerationRun`]; nothing is
//! generated until [`Generator::run`] is awaited. Generators asking for a
//! path that is already known attach to the existing target instead of
//! creating a second one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use builder::CollectionBuilder;
use codegen::{SourceGenerator, TemplateRegistry};
use config::{CompileOptions, TypeCheckConfig};
use ir::CollectionConfiguration;
use tasks::{Target, TaskError};

use crate::run::{GenerationRun, OutputLedger};
use crate::runtime_helpers::import_prefix;
use crate::{PipelineError, Result};

/// Progress of one generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStatus {
    /// `run()` was never called.
    NotStarted,
    /// The run is underway.
    InProgress,
    /// The file (and every file of the run) was written.
    Completed,
    /// The run failed.
    Aborted,
}

impl fmt::Display for GeneratorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorStatus::NotStarted => "not started",
            GeneratorStatus::InProgress => "in progress",
            GeneratorStatus::Completed => "completed",
            GeneratorStatus::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Generates one collection module as part of a [`GenerationRun`].
#[derive(Debug, Clone)]
pub struct Generator {
    class_name: String,
    output: PathBuf,
    run: GenerationRun,
    target: Arc<Target>,
    owns_target: bool,
    status: Arc<Mutex<GeneratorStatus>>,
}

impl Generator {
    /// Registers `builder` to be written to `output` during `run`.
    pub fn new(
        builder: &CollectionBuilder,
        output: impl Into<PathBuf>,
        options: CompileOptions,
        run: &GenerationRun,
    ) -> Result<Self> {
        let output = output.into();
        if !builder.is_locked() {
            return Err(PipelineError::NotLocked(builder.class_name().to_string()));
        }
        if output.file_name().is_none() {
            return Err(PipelineError::OutputPath(output));
        }

        let config = builder.configuration();
        let (entry, owns_target) = run.claim_path(&output, config.class_name())?;
        if owns_target {
            let task = WriteModule {
                helper_prefix: import_prefix(&output, &run.helper_dir()),
                config,
                options,
                output: output.clone(),
                registry: run.registry(),
                ledger: run.ledger(),
            };
            let name = entry.target.name().to_string();
            entry.target.add_task(move || async move {
                task.execute().await.map_err(|e| TaskError::failed(name, e))
            })?;
        } else {
            logging::debug(
                "pipeline",
                &format!(
                    "{} attaches to the existing target for {}",
                    builder.class_name(),
                    output.display()
                ),
            );
        }

        Ok(Self {
            class_name: entry.class_name,
            output,
            run: run.clone(),
            target: entry.target,
            owns_target,
            status: Arc::new(Mutex::new(GeneratorStatus::NotStarted)),
        })
    }

    /// A generator with a private run rooted at the output's directory.
    pub fn standalone(
        builder: &CollectionBuilder,
        output: impl Into<PathBuf>,
        options: CompileOptions,
    ) -> Result<Self> {
        let output = output.into();
        let root = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let run = GenerationRun::new(root, TypeCheckConfig::default())?;
        Self::new(builder, output, options, &run)
    }

    /// Class name the output file defines.
    pub fn class_name(&self) -> &str { &self.class_name }

    /// File this generator writes.
    pub fn output(&self) -> &Path { &self.output }

    /// The run this generator belongs to.
    pub fn generation_run(&self) -> &GenerationRun { &self.run }

    /// Whether this generator created the file's target, rather than attaching.
    pub fn owns_target(&self) -> bool { self.owns_target }

    /// Name of the file's task-graph target.
    pub fn target_name(&self) -> &str { self.target.name() }

    /// Current status.
    pub fn status(&self) -> GeneratorStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: GeneratorStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Drives the run and resolves to the generated class name.
    ///
    /// Safe to call any number of times; the file is written once.
    pub async fn run(&self) -> Result<String> {
        if self.status() == GeneratorStatus::NotStarted {
            self.set_status(GeneratorStatus::InProgress);
        }

        match self.run.run().await {
            Ok(()) => {
                self.set_status(GeneratorStatus::Completed);
                Ok(self.class_name.clone())
            }
            Err(error) => {
                self.set_status(GeneratorStatus::Aborted);
                tracing::error!(class = %self.class_name, %error, "generator aborted");
                Err(error)
            }
        }
    }
}

/// Task body of a file target.
struct WriteModule {
    config: CollectionConfiguration,
    options: CompileOptions,
    output: PathBuf,
    helper_prefix: String,
    registry: Arc<TemplateRegistry>,
    ledger: Arc<OutputLedger>,
}

impl WriteModule {
    async fn execute(self) -> Result<()> {
        logging::trace("pipeline", &format!("generating {}", self.output.display()));
        let type_checked = self.options.generate_type_checked();
        let generated = SourceGenerator::new(self.config, self.options)
            .with_registry(self.registry)
            .with_helper_dir(self.helper_prefix)
            .generate()?;

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.output, &generated.source).await?;

        self.ledger.record(generated.helpers, type_checked.then(|| self.output.clone()));
        tracing::info!(
            class = %generated.class_name,
            variant = %generated.variant,
            path = %self.output.display(),
            "wrote collection module"
        );
        Ok(())
    }
}
