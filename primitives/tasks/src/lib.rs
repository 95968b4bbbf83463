#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `keymesh-tasks`: dependency-ordered task graph
//!
//! A [`TaskGraph`] owns a set of named [`Target`]s. Each target lists the
//! targets it depends on (its *subtargets*) and the asynchronous tasks it
//! runs once those dependencies have finished.
//!
//! ## Lifecycle
//!
//! The graph moves through [`GraphStatus`]:
//!
//! - `NotStarted`: ordinary targets accept descriptions, tasks and subtargets.
//! - `Ready`: set by [`TaskGraph::mark_ready`]. Only now does the root target
//!   ([`ROOT_TARGET`]) accept subtargets, so an assembler can declare every
//!   target first and then choose which ones actually run.
//! - `Running`: entered when the root target starts.
//! - `Errored`: any task or dependency failure. Nothing runs afterwards.
//! - `Closed`: explicit terminal state set by [`TaskGraph::mark_closed`].
//!
//! ## Execution
//!
//! [`Target::run`] returns a memoized, shared completion future. However many
//! times it is called, sequentially or concurrently, the target executes at
//! most once: dependencies first, in declared order, then its own tasks, in
//! declared order and one after another.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;

/// Reserved name of the distinguished root target.
pub const ROOT_TARGET: &str = "main";

/// Convenient result type for task graph operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// A zero-argument asynchronous task callback.
pub type Task = Box<dyn FnOnce() -> BoxFuture<'static, Result<()>> + Send>;

/// Memoized completion future of a target; clones resolve together.
pub type Completion = Shared<BoxFuture<'static, Result<()>>>;

/// Status of a [`TaskGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphStatus {
    /// Targets are still being declared.
    NotStarted,
    /// Declarations are frozen; the root target may now receive subtargets.
    Ready,
    /// The root target has started.
    Running,
    /// A task or dependency failed.
    Errored,
    /// The graph was closed explicitly.
    Closed,
}

impl fmt::Display for GraphStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphStatus::NotStarted => "not started",
            GraphStatus::Ready => "ready",
            GraphStatus::Running => "running",
            GraphStatus::Errored => "errored",
            GraphStatus::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Errors raised while declaring or running a task graph.
///
/// The type is `Clone` so that one failure can be handed to every caller
/// awaiting the same completion future.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The graph was not in the status the operation requires.
    #[error("Task graph is {actual}, but the operation requires it to be {expected}")]
    Status {
        /// Status the operation needed.
        expected: GraphStatus,
        /// Status the graph was actually in.
        actual: GraphStatus,
    },
    /// A target's description may only be set once.
    #[error("Target \"{0}\" already has a description")]
    DescriptionAlreadySet(String),
    /// A target may not depend on itself.
    #[error("Target \"{0}\" cannot have a dependency on itself")]
    SelfDependency(String),
    /// No target may depend on the root target.
    #[error("Target \"{0}\" cannot have a dependency on the root target \"main\"")]
    RootDependency(String),
    /// The subtarget was already declared.
    #[error("Target \"{target}\" already has a dependency on \"{subtarget}\"")]
    DuplicateDependency {
        /// Dependent target.
        target: String,
        /// Dependency that was repeated.
        subtarget: String,
    },
    /// Adding the dependency would create a cycle.
    #[error("\"{subtarget}\" already has a dependency on \"{target}\"")]
    DependencyCycle {
        /// Dependent target.
        target: String,
        /// Dependency whose closure already contains `target`.
        subtarget: String,
    },
    /// A subtarget named at declaration time never came into existence.
    #[error("Unknown target \"{0}\"")]
    UnknownTarget(String),
    /// The owning graph was dropped while a target was still in use.
    #[error("Task graph for target \"{0}\" no longer exists")]
    GraphDropped(String),
    /// A task reported a failure.
    #[error("Target \"{target}\" failed: {message}")]
    Failed {
        /// Target whose task failed.
        target: String,
        /// Rendered error of the failing task.
        message: String,
    },
}

impl TaskError {
    /// Builds a [`TaskError::Failed`] from any displayable error.
    pub fn failed(target: impl Into<String>, error: impl fmt::Display) -> Self {
        TaskError::Failed { target: target.into(), message: error.to_string() }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> { mutex.lock().unwrap_or_else(PoisonError::into_inner) }

struct GraphInner {
    status: Mutex<GraphStatus>,
    targets: Mutex<BTreeMap<String, Arc<Target>>>,
}

impl GraphInner {
    fn status(&self) -> GraphStatus { *lock(&self.status) }

    fn set_status(&self, status: GraphStatus) { *lock(&self.status) = status; }

    fn require_status(&self, expected: GraphStatus) -> Result<()> {
        let actual = self.status();
        if actual == expected {
            Ok(())
        } else {
            Err(TaskError::Status { expected, actual })
        }
    }

    fn get(&self, name: &str) -> Option<Arc<Target>> { lock(&self.targets).get(name).cloned() }

    /// Names reachable from `start` through subtarget edges, `start` included.
    fn closure_contains(&self, start: &str, needle: &str) -> bool {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(name) = queue.pop_front() {
            if name == needle {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(target) = self.get(&name) {
                queue.extend(target.subtargets());
            }
        }
        false
    }
}

/// Owner of a set of named targets and of their shared status.
///
/// Cloning is cheap and yields a handle to the same graph.
#[derive(Clone)]
pub struct TaskGraph {
    inner: Arc<GraphInner>,
}

impl Default for TaskGraph {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph")
            .field("status", &self.status())
            .field("targets", &self.target_names())
            .finish()
    }
}

impl TaskGraph {
    /// Create an empty graph holding only the root target.
    pub fn new() -> Self {
        let inner = Arc::new(GraphInner {
            status: Mutex::new(GraphStatus::NotStarted),
            targets: Mutex::new(BTreeMap::new()),
        });
        let graph = Self { inner };
        graph.target(ROOT_TARGET);
        graph
    }

    /// Current status.
    pub fn status(&self) -> GraphStatus { self.inner.status() }

    /// `NotStarted` → `Ready`.
    pub fn mark_ready(&self) -> Result<()> {
        let mut status = lock(&self.inner.status);
        if *status != GraphStatus::NotStarted {
            return Err(TaskError::Status { expected: GraphStatus::NotStarted, actual: *status });
        }
        *status = GraphStatus::Ready;
        Ok(())
    }

    /// Moves the graph to its terminal `Closed` status.
    ///
    /// Fails only when the graph already errored.
    pub fn mark_closed(&self) -> Result<()> {
        let mut status = lock(&self.inner.status);
        if *status == GraphStatus::Errored {
            return Err(TaskError::Status { expected: GraphStatus::Running, actual: *status });
        }
        *status = GraphStatus::Closed;
        Ok(())
    }

    /// The distinguished root target.
    pub fn root(&self) -> Arc<Target> { self.target(ROOT_TARGET) }

    /// Returns the target called `name`, creating it on first use.
    pub fn target(&self, name: &str) -> Arc<Target> {
        let mut targets = lock(&self.inner.targets);
        targets
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Target {
                    name: name.to_string(),
                    graph: Arc::downgrade(&self.inner),
                    state: Mutex::new(TargetState::default()),
                    completion: OnceLock::new(),
                })
            })
            .clone()
    }

    /// Returns the target called `name` if it was ever created.
    pub fn get(&self, name: &str) -> Option<Arc<Target>> { self.inner.get(name) }

    /// Whether a target called `name` exists.
    pub fn contains(&self, name: &str) -> bool { lock(&self.inner.targets).contains_key(name) }

    /// Names of every target, the root included, in sorted order.
    pub fn target_names(&self) -> Vec<String> { lock(&self.inner.targets).keys().cloned().collect() }

    /// Runs the root target.
    pub fn run(&self) -> Completion { self.root().run() }
}

#[derive(Default)]
struct TargetState {
    description: Option<String>,
    subtargets: Vec<String>,
    tasks: Vec<Task>,
}

/// A named vertex of a [`TaskGraph`].
pub struct Target {
    name: String,
    graph: Weak<GraphInner>,
    state: Mutex<TargetState>,
    completion: OnceLock<Completion>,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("description", &self.description())
            .field("subtargets", &self.subtargets())
            .finish()
    }
}

impl Target {
    /// Unique name of this target.
    pub fn name(&self) -> &str { &self.name }

    /// Whether this is the graph's root target.
    pub fn is_root(&self) -> bool { self.name == ROOT_TARGET }

    /// Human-readable description, if one was set.
    pub fn description(&self) -> Option<String> { lock(&self.state).description.clone() }

    /// Declared dependencies, in order.
    pub fn subtargets(&self) -> Vec<String> { lock(&self.state).subtargets.clone() }

    /// Number of tasks that have not run yet.
    pub fn pending_tasks(&self) -> usize { lock(&self.state).tasks.len() }

    fn graph(&self) -> Result<Arc<GraphInner>> {
        self.graph.upgrade().ok_or_else(|| TaskError::GraphDropped(self.name.clone()))
    }

    /// Sets the description. Allowed once, before the graph leaves `NotStarted`.
    pub fn set_description(&self, description: impl Into<String>) -> Result<()> {
        self.graph()?.require_status(GraphStatus::NotStarted)?;
        let mut state = lock(&self.state);
        if state.description.is_some() {
            return Err(TaskError::DescriptionAlreadySet(self.name.clone()));
        }
        state.description = Some(description.into());
        Ok(())
    }

    /// Declares that this target depends on `subtarget`.
    ///
    /// Ordinary targets accept dependencies while the graph is `NotStarted`;
    /// the root target only once the graph is `Ready`.
    pub fn add_subtarget(&self, subtarget: &str) -> Result<()> {
        if subtarget == self.name {
            return Err(TaskError::SelfDependency(self.name.clone()));
        }
        if subtarget == ROOT_TARGET {
            return Err(TaskError::RootDependency(self.name.clone()));
        }

        let graph = self.graph()?;
        graph.require_status(if self.is_root() {
            GraphStatus::Ready
        } else {
            GraphStatus::NotStarted
        })?;

        if lock(&self.state).subtargets.iter().any(|s| s == subtarget) {
            return Err(TaskError::DuplicateDependency {
                target: self.name.clone(),
                subtarget: subtarget.to_string(),
            });
        }
        if graph.closure_contains(subtarget, &self.name) {
            return Err(TaskError::DependencyCycle {
                target: self.name.clone(),
                subtarget: subtarget.to_string(),
            });
        }

        lock(&self.state).subtargets.push(subtarget.to_string());
        Ok(())
    }

    /// Appends a task. Allowed while the graph is `NotStarted`.
    pub fn add_task<F, Fut>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.graph()?.require_status(GraphStatus::NotStarted)?;
        lock(&self.state).tasks.push(Box::new(move || task().boxed()));
        Ok(())
    }

    /// Starts this target on first call and returns its shared completion future.
    pub fn run(self: &Arc<Self>) -> Completion {
        self.completion
            .get_or_init(|| {
                let target = Arc::clone(self);
                async move { target.execute().await }.boxed().shared()
            })
            .clone()
    }

    async fn execute(self: Arc<Self>) -> Result<()> {
        let graph = self.graph()?;
        let result = self.execute_in(&graph).await;
        if let Err(error) = &result {
            logging::debug("tasks", &format!("target \"{}\" failed: {}", self.name, error));
            graph.set_status(GraphStatus::Errored);
        }
        result
    }

    async fn execute_in(&self, graph: &GraphInner) -> Result<()> {
        {
            let mut status = lock(&graph.status);
            if self.is_root() && matches!(*status, GraphStatus::NotStarted | GraphStatus::Ready) {
                *status = GraphStatus::Running;
            }
            if *status != GraphStatus::Running {
                return Err(TaskError::Status { expected: GraphStatus::Running, actual: *status });
            }
        }

        let (subtargets, tasks) = {
            let mut state = lock(&self.state);
            (state.subtargets.clone(), std::mem::take(&mut state.tasks))
        };

        logging::trace("tasks", &format!("running target \"{}\"", self.name));
        for name in subtargets {
            let subtarget = graph.get(&name).ok_or_else(|| TaskError::UnknownTarget(name.clone()))?;
            subtarget.run().await?;
        }
        for task in tasks {
            task().await?;
        }
        Ok(())
    }
}
