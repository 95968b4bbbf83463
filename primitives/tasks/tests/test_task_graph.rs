use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tasks::{GraphStatus, TaskError, TaskGraph, ROOT_TARGET};

/// Helper that records the order in which tasks run.
fn recorder(graph: &TaskGraph, target: &str, log: &Arc<Mutex<Vec<String>>>, entry: &str) {
    let log = Arc::clone(log);
    let entry = entry.to_string();
    graph
        .target(target)
        .add_task(move || async move {
            log.lock().expect("log poisoned").push(entry);
            Ok(())
        })
        .expect("Failed to add task");
}

#[test]
fn test_dependency_cycles_are_rejected() {
    let graph = TaskGraph::new();
    graph.target("a").add_subtarget("b").expect("a -> b");
    graph.target("b").add_subtarget("c").expect("b -> c");

    let err = graph.target("c").add_subtarget("a").expect_err("c -> a closes a cycle");
    assert!(matches!(err, TaskError::DependencyCycle { .. }));
    assert!(err.to_string().contains("dependency"));

    let err = graph.target("a").add_subtarget("a").expect_err("self dependency");
    assert_eq!(err, TaskError::SelfDependency("a".to_string()));

    let err = graph.target("a").add_subtarget(ROOT_TARGET).expect_err("root dependency");
    assert_eq!(err, TaskError::RootDependency("a".to_string()));

    let err = graph.target("a").add_subtarget("b").expect_err("duplicate dependency");
    assert!(matches!(err, TaskError::DuplicateDependency { .. }));
}

#[test]
fn test_description_is_write_once() {
    let graph = TaskGraph::new();
    let target = graph.target("docs");
    target.set_description("first").expect("first description");
    assert_eq!(
        target.set_description("second"),
        Err(TaskError::DescriptionAlreadySet("docs".to_string()))
    );
    assert_eq!(target.description().as_deref(), Some("first"));
}

#[test]
fn test_root_accepts_subtargets_only_when_ready() {
    let graph = TaskGraph::new();
    graph.target("build");

    let err = graph.root().add_subtarget("build").expect_err("root is not ready yet");
    assert_eq!(
        err,
        TaskError::Status { expected: GraphStatus::Ready, actual: GraphStatus::NotStarted }
    );

    graph.mark_ready().expect("mark ready");
    graph.root().add_subtarget("build").expect("root accepts subtargets once ready");

    // Ordinary targets are frozen once the graph is ready.
    assert!(graph.target("build").add_subtarget("other").is_err());
    assert!(graph.target("build").add_task(|| async { Ok(()) }).is_err());
    assert!(graph.target("build").set_description("late").is_err());
}

#[tokio::test]
async fn test_dependencies_run_before_tasks_in_declared_order() {
    let graph = TaskGraph::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    graph.target("app").add_subtarget("lib").expect("app -> lib");
    graph.target("app").add_subtarget("assets").expect("app -> assets");
    graph.target("lib").add_subtarget("assets").expect("lib -> assets");

    recorder(&graph, "assets", &log, "assets");
    recorder(&graph, "lib", &log, "lib");
    recorder(&graph, "app", &log, "app:1");
    recorder(&graph, "app", &log, "app:2");

    graph.mark_ready().expect("mark ready");
    graph.root().add_subtarget("app").expect("main -> app");
    graph.run().await.expect("graph run");

    let log = log.lock().expect("log poisoned").clone();
    assert_eq!(log, vec!["assets", "lib", "app:1", "app:2"]);
    assert_eq!(graph.status(), GraphStatus::Running);
}

#[tokio::test]
async fn test_run_executes_tasks_exactly_once() {
    let graph = TaskGraph::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let target = graph.target("once");
    {
        let counter = Arc::clone(&counter);
        target
            .add_task(move || async move {
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .expect("add task");
    }

    graph.mark_ready().expect("mark ready");
    graph.root().add_subtarget("once").expect("main -> once");

    let (a, b, c) = tokio::join!(graph.run(), graph.run(), graph.root().run());
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    target.run().await.expect("sequential rerun");
    graph.run().await.expect("sequential root rerun");

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(target.pending_tasks(), 0);
}

#[tokio::test]
async fn test_failure_errors_the_graph() {
    let graph = TaskGraph::new();
    graph
        .target("broken")
        .add_task(|| async { Err(TaskError::failed("broken", "disk full")) })
        .expect("add failing task");
    graph.target("late").add_task(|| async { Ok(()) }).expect("add task");

    graph.mark_ready().expect("mark ready");
    graph.root().add_subtarget("broken").expect("main -> broken");

    let err = graph.run().await.expect_err("run must fail");
    assert_eq!(err, TaskError::Failed { target: "broken".into(), message: "disk full".into() });
    assert_eq!(graph.status(), GraphStatus::Errored);

    // Every awaiter sees the same failure, and nothing else may start.
    assert_eq!(graph.run().await, Err(err));
    let late = graph.target("late").run().await.expect_err("graph is errored");
    assert_eq!(
        late,
        TaskError::Status { expected: GraphStatus::Running, actual: GraphStatus::Errored }
    );
    assert!(graph.mark_closed().is_err());
}

#[tokio::test]
async fn test_non_root_target_requires_running_graph() {
    let graph = TaskGraph::new();
    graph.target("lonely").add_task(|| async { Ok(()) }).expect("add task");

    let err = graph.target("lonely").run().await.expect_err("graph not running");
    assert!(matches!(err, TaskError::Status { expected: GraphStatus::Running, .. }));
}

#[tokio::test]
async fn test_unknown_subtarget_fails_at_run_time() {
    let graph = TaskGraph::new();
    graph.target("a").add_subtarget("ghost").expect("names may be declared early");
    graph.mark_ready().expect("mark ready");
    graph.root().add_subtarget("a").expect("main -> a");

    // `ghost` was never created, so only `a` and `main` exist.
    assert!(!graph.contains("ghost"));
    assert_eq!(graph.run().await, Err(TaskError::UnknownTarget("ghost".to_string())));
}

#[tokio::test]
async fn test_close_after_success() {
    let graph = TaskGraph::new();
    graph.mark_ready().expect("mark ready");
    graph.run().await.expect("empty graph runs");
    graph.mark_closed().expect("close");
    assert_eq!(graph.status(), GraphStatus::Closed);
}
