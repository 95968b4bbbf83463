//! One generation invocation.
//!
//! The run owns a [`TaskGraph`] with three fixed targets placed under the
//! root when the run starts:
//!
//! 1. `generators`, whose subtargets are one target per output file
//! 2. `copy runtime helpers`, writing `keys/*.mjs` if any output imports them
//! 3. `type check`, one checker launch over every type-checked output
//!
//! The run also keeps the set of known output paths, so two generators asking
//! for the same file share one target.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use codegen::{HelperUse, TemplateRegistry};
use config::TypeCheckConfig;
use futures::future::{self, FutureExt};
use tasks::{Completion, GraphStatus, Target, TaskError, TaskGraph};

use crate::runtime_helpers::{copy_helpers, HELPER_DIR_NAME};
use crate::type_check::type_check;
use crate::Result;

/// Parent of every per-file target.
pub const GENERATORS_TARGET: &str = "generators";
/// Copies the runtime helpers beside the outputs.
pub const COPY_HELPERS_TARGET: &str = "copy runtime helpers";
/// Launches the external type checker.
pub const TYPE_CHECK_TARGET: &str = "type check";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

/// What the per-file targets report to the post-processing targets.
#[derive(Debug, Default)]
pub(crate) struct OutputLedger {
    helpers: Mutex<HelperUse>,
    type_checked: Mutex<Vec<PathBuf>>,
}

impl OutputLedger {
    pub(crate) fn record(&self, helpers: HelperUse, type_checked: Option<PathBuf>) {
        let mut used = lock(&self.helpers);
        *used = used.union(helpers);
        if let Some(path) = type_checked {
            lock(&self.type_checked).push(path);
        }
    }

    fn helpers(&self) -> HelperUse { *lock(&self.helpers) }

    fn take_type_checked(&self) -> Vec<PathBuf> { std::mem::take(&mut *lock(&self.type_checked)) }
}

#[derive(Debug, Clone)]
pub(crate) struct FileEntry {
    pub(crate) target: Arc<Target>,
    pub(crate) class_name: String,
}

struct RunInner {
    graph: TaskGraph,
    output_root: PathBuf,
    registry: Arc<TemplateRegistry>,
    ledger: Arc<OutputLedger>,
    known_paths: Mutex<BTreeMap<PathBuf, FileEntry>>,
    started: OnceLock<Completion>,
}

/// Task graph and shared state of one generation invocation.
///
/// Cloning yields a handle to the same run.
#[derive(Clone)]
pub struct GenerationRun {
    inner: Arc<RunInner>,
}

impl fmt::Debug for GenerationRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRun")
            .field("output_root", &self.inner.output_root)
            .field("status", &self.status())
            .field("known_paths", &self.known_paths())
            .finish()
    }
}

impl GenerationRun {
    /// A run writing its runtime helpers under `output_root/keys`.
    pub fn new(output_root: impl Into<PathBuf>, type_check_config: TypeCheckConfig) -> Result<Self> {
        let output_root = output_root.into();
        let graph = TaskGraph::new();
        let ledger = Arc::new(OutputLedger::default());

        graph.target(GENERATORS_TARGET).set_description("Generate every collection module")?;

        let copy = graph.target(COPY_HELPERS_TARGET);
        copy.set_description("Copy runtime helpers beside the generated modules")?;
        let helper_dir = output_root.join(HELPER_DIR_NAME);
        let copy_ledger = Arc::clone(&ledger);
        copy.add_task(move || async move {
            let helpers = copy_ledger.helpers();
            copy_helpers(&helper_dir, helpers)
                .await
                .map(|_| ())
                .map_err(|e| TaskError::failed(COPY_HELPERS_TARGET, e))
        })?;

        let check = graph.target(TYPE_CHECK_TARGET);
        check.set_description("Type-check the generated modules")?;
        let check_root = output_root.clone();
        let check_ledger = Arc::clone(&ledger);
        check.add_task(move || async move {
            let files = check_ledger.take_type_checked();
            type_check(&type_check_config, &check_root, files)
                .await
                .map_err(|e| TaskError::failed(TYPE_CHECK_TARGET, e))
        })?;

        Ok(Self {
            inner: Arc::new(RunInner {
                graph,
                output_root,
                registry: Arc::new(TemplateRegistry::new()),
                ledger,
                known_paths: Mutex::new(BTreeMap::new()),
                started: OnceLock::new(),
            }),
        })
    }

    /// Directory the run writes into.
    pub fn output_root(&self) -> &Path { &self.inner.output_root }

    /// Directory the runtime helpers are copied to.
    pub fn helper_dir(&self) -> PathBuf { self.inner.output_root.join(HELPER_DIR_NAME) }

    /// Template registry shared by every generator of this run.
    pub fn registry(&self) -> Arc<TemplateRegistry> { Arc::clone(&self.inner.registry) }

    /// The run's task graph.
    pub fn graph(&self) -> &TaskGraph { &self.inner.graph }

    /// Status of the run's task graph.
    pub fn status(&self) -> GraphStatus { self.inner.graph.status() }

    /// Whether a generator already claimed `path`.
    pub fn has_known_path(&self, path: &Path) -> bool {
        lock(&self.inner.known_paths).contains_key(path)
    }

    /// Every claimed output path, sorted.
    pub fn known_paths(&self) -> Vec<PathBuf> {
        lock(&self.inner.known_paths).keys().cloned().collect()
    }

    pub(crate) fn ledger(&self) -> Arc<OutputLedger> { Arc::clone(&self.inner.ledger) }

    /// Returns the entry for `path` and whether this call created it.
    ///
    /// A new entry gets its own target under `generators`.
    pub(crate) fn claim_path(&self, path: &Path, class_name: &str) -> Result<(FileEntry, bool)> {
        let mut known = lock(&self.inner.known_paths);
        if let Some(entry) = known.get(path) {
            return Ok((entry.clone(), false));
        }

        let status = self.status();
        if status != GraphStatus::NotStarted {
            return Err(TaskError::Status { expected: GraphStatus::NotStarted, actual: status }.into());
        }

        let name = path.display().to_string();
        let target = self.inner.graph.target(&name);
        target.set_description(format!("Generate {}", class_name))?;
        self.inner.graph.target(GENERATORS_TARGET).add_subtarget(&name)?;

        let entry = FileEntry { target, class_name: class_name.to_string() };
        known.insert(path.to_path_buf(), entry.clone());
        logging::trace("pipeline", &format!("claimed {} for {}", name, class_name));
        Ok((entry, true))
    }

    /// Starts the run on first call; every caller awaits the same completion.
    pub async fn run(&self) -> Result<()> {
        let completion = self.inner.started.get_or_init(|| self.start()).clone();
        completion.await?;
        Ok(())
    }

    fn start(&self) -> Completion {
        let graph = self.inner.graph.clone();
        let attach = || -> tasks::Result<()> {
            graph.mark_ready()?;
            let root = graph.root();
            for name in [GENERATORS_TARGET, COPY_HELPERS_TARGET, TYPE_CHECK_TARGET] {
                root.add_subtarget(name)?;
            }
            Ok(())
        };
        if let Err(error) = attach() {
            return future::ready(Err(error)).boxed().shared();
        }

        tracing::info!(root = %self.inner.output_root.display(), "generation run started");
        let root = graph.run();
        async move {
            match root.await {
                Ok(()) => {
                    graph.mark_closed()?;
                    tracing::info!("generation run finished");
                    Ok(())
                }
                Err(error) => {
                    tracing::error!(%error, "generation run failed");
                    Err(error)
                }
            }
        }
        .boxed()
        .shared()
    }
}
