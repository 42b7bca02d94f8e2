use std::cell::Cell;
use std::rc::Rc;

use javelin_core::error::{ErrorCode, JavelinErrorExt};
use javelin_core::frontend::{FrontendError, MemoryFrontend};
use javelin_core::ir::MemoryEmitter;
use javelin_core::scheduler::{
    FnPass, GoalKey, GoalKind, GoalStatus, MAX_PASS_ATTEMPTS, Pass, PassEnv, PassError, Scheduler,
};
use javelin_core::{ClassTable, JobId, Options};

fn scheduler() -> Scheduler {
    Scheduler::new(
        Box::new(ClassTable::bootstrap()),
        Box::new(MemoryFrontend::new()),
        Box::new(MemoryEmitter::default()),
        Options::default(),
    )
}

fn custom(job: JobId, name: &str) -> GoalKey {
    GoalKey::new(job, GoalKind::Custom(name.to_string()))
}

fn counting(name: &str, counter: &Rc<Cell<usize>>) -> Box<dyn Pass> {
    let counter = Rc::clone(counter);
    Box::new(FnPass::new(name, move |_env: &mut PassEnv<'_>| {
        counter.set(counter.get() + 1);
        Ok(())
    }))
}

#[test]
fn equal_keys_intern_to_one_goal_and_run_once() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let runs = Rc::new(Cell::new(0));

    let first = s.intern_goal(custom(job, "work"), vec![], counting("work", &runs), true).unwrap();
    let second = s.intern_goal(custom(job, "work"), vec![], counting("other", &runs), true).unwrap();
    assert_eq!(first, second);

    s.run(first).unwrap();
    s.run(second).unwrap();
    assert_eq!(runs.get(), 1);
    assert_eq!(s.status(first), Some(GoalStatus::Succeeded));
    assert_eq!(s.goal(first).unwrap().attempts, 1);
}

#[test]
fn prerequisites_run_first() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let order = Rc::new(std::cell::RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    let dep = s
        .intern_goal(custom(job, "dep"), vec![], Box::new(FnPass::new("dep", move |_env: &mut PassEnv<'_>| {
            log.borrow_mut().push("dep");
            Ok(())
        })), true)
        .unwrap();
    let log = Rc::clone(&order);
    let top = s
        .intern_goal(custom(job, "top"), vec![dep], Box::new(FnPass::new("top", move |_env: &mut PassEnv<'_>| {
            log.borrow_mut().push("top");
            Ok(())
        })), true)
        .unwrap();

    s.run(top).unwrap();
    assert_eq!(*order.borrow(), vec!["dep", "top"]);
}

#[test]
fn cycle_is_rejected_with_its_path() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let runs = Rc::new(Cell::new(0));
    let a = s.intern_goal(custom(job, "a"), vec![], counting("a", &runs), true).unwrap();
    let b = s.intern_goal(custom(job, "b"), vec![a], counting("b", &runs), true).unwrap();

    let err = s.add_prerequisite(a, b).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CyclicDependency);
    assert!(err.message().contains("Custom(a)"));
    assert!(err.message().contains("Custom(b)"));
    assert!(s.goal(a).unwrap().prerequisites.is_empty());
}

#[test]
fn self_prerequisite_is_a_cycle() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let runs = Rc::new(Cell::new(0));
    let a = s.intern_goal(custom(job, "a"), vec![], counting("a", &runs), true).unwrap();
    assert_eq!(s.add_prerequisite(a, a).unwrap_err().code(), ErrorCode::CyclicDependency);
}

#[test]
fn missing_dependency_is_satisfied_then_pass_retried() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let dep_runs = Rc::new(Cell::new(0));
    let dep = s.intern_goal(custom(job, "dep"), vec![], counting("dep", &dep_runs), true).unwrap();

    let dep_key = custom(job, "dep");
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let top = s
        .intern_goal(custom(job, "top"), vec![], Box::new(FnPass::new("top", move |_env: &mut PassEnv<'_>| {
            seen.set(seen.get() + 1);
            if seen.get() == 1 { Err(PassError::MissingDependency(dep_key.clone())) } else { Ok(()) }
        })), true)
        .unwrap();

    s.run(top).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(dep_runs.get(), 1);
    assert_eq!(s.goal(top).unwrap().prerequisites, vec![dep]);
    assert_eq!(s.status(dep), Some(GoalStatus::Succeeded));
}

#[test]
fn non_idempotent_goal_cannot_resume() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let runs = Rc::new(Cell::new(0));
    s.intern_goal(custom(job, "dep"), vec![], counting("dep", &runs), true).unwrap();

    let dep_key = custom(job, "dep");
    let top = s
        .intern_goal(custom(job, "top"), vec![], Box::new(FnPass::new("top", move |_env: &mut PassEnv<'_>| {
            Err(PassError::MissingDependency(dep_key.clone()))
        })), false)
        .unwrap();

    let err = s.run(top).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingDependency);
    assert_eq!(s.status(top), Some(GoalStatus::Failed));
    assert_eq!(runs.get(), 0);
}

#[test]
fn endless_missing_dependency_hits_retry_limit() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let runs = Rc::new(Cell::new(0));
    s.intern_goal(custom(job, "dep"), vec![], counting("dep", &runs), true).unwrap();

    let dep_key = custom(job, "dep");
    let top = s
        .intern_goal(custom(job, "top"), vec![], Box::new(FnPass::new("top", move |_env: &mut PassEnv<'_>| {
            Err(PassError::MissingDependency(dep_key.clone()))
        })), true)
        .unwrap();

    let err = s.run(top).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingDependency);
    assert_eq!(s.goal(top).unwrap().attempts, MAX_PASS_ATTEMPTS);
    assert_eq!(s.status(top), Some(GoalStatus::Failed));
}

#[test]
fn failing_prerequisite_fails_dependent() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let dep = s
        .intern_goal(custom(job, "dep"), vec![], Box::new(FnPass::new("dep", |_env: &mut PassEnv<'_>| {
            Err(PassError::from(FrontendError::internal("boom")))
        })), true)
        .unwrap();
    let runs = Rc::new(Cell::new(0));
    let top = s.intern_goal(custom(job, "top"), vec![dep], counting("top", &runs), true).unwrap();

    let err = s.run(top).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
    assert_eq!(err.root, Some(custom(job, "dep")));
    assert!(err.message().contains("boom"), "{}", err.message());
    assert_eq!(s.status(dep), Some(GoalStatus::Failed));
    assert_eq!(s.status(top), Some(GoalStatus::Failed));
    assert_eq!(runs.get(), 0);

    // Failed goals stay failed and keep their cause.
    let again = s.run(dep).unwrap_err();
    assert_eq!(again.code(), ErrorCode::Internal);
    assert!(again.message().contains("boom"));
}

#[test]
fn failure_cause_survives_a_longer_chain() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let root = s
        .intern_goal(custom(job, "root"), vec![], Box::new(FnPass::new("root", |_env: &mut PassEnv<'_>| {
            Err(PassError::from(FrontendError::internal("root cause")))
        })), true)
        .unwrap();
    let runs = Rc::new(Cell::new(0));
    let mid = s.intern_goal(custom(job, "mid"), vec![root], counting("mid", &runs), true).unwrap();
    let top = s.intern_goal(custom(job, "top"), vec![mid], counting("top", &runs), true).unwrap();

    let err = s.run(top).unwrap_err();
    assert_eq!(err.goal, Some(custom(job, "top")));
    assert_eq!(err.root, Some(custom(job, "root")));
    assert!(err.message().contains("root cause"), "{}", err.message());
    assert!(!err.message().contains("Custom(mid)"), "{}", err.message());
}

#[test]
fn ids_from_another_scheduler_are_rejected() {
    let mut other = scheduler();
    let job = other.add_job("A.java");
    let runs = Rc::new(Cell::new(0));
    other.intern_goal(custom(job, "a"), vec![], counting("a", &runs), true).unwrap();
    let foreign = other.intern_goal(custom(job, "b"), vec![], counting("b", &runs), true).unwrap();

    let mut s = scheduler();
    assert!(s.goal(foreign).is_none());
    assert!(s.status(foreign).is_none());
    assert_eq!(s.run(foreign).unwrap_err().code(), ErrorCode::Internal);
    match s.invoke_pass(foreign) {
        Err(PassError::Fatal(err)) => assert_eq!(err.code(), ErrorCode::Internal),
        other => panic!("expected a fatal error, got {:?}", other),
    }
    assert_eq!(runs.get(), 0);
}

#[test]
fn invoking_a_succeeded_pass_again_is_an_error() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let runs = Rc::new(Cell::new(0));
    let id = s.intern_goal(custom(job, "once"), vec![], counting("once", &runs), true).unwrap();
    s.run(id).unwrap();

    match s.invoke_pass(id) {
        Err(PassError::Fatal(err)) => assert_eq!(err.code(), ErrorCode::Internal),
        other => panic!("expected a fatal error, got {:?}", other),
    }
    assert_eq!(runs.get(), 1);
}

#[test]
fn standard_chain_is_built_on_demand_and_shared() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    let emitted = s.resolve(GoalKey::new(job, GoalKind::Emitted)).unwrap();
    let codegen = s.lookup(&GoalKey::new(job, GoalKind::CodeGenerated)).unwrap();
    assert_eq!(s.goal(emitted).unwrap().prerequisites, vec![codegen]);

    let parsed = s.lookup(&GoalKey::new(job, GoalKind::Parsed)).unwrap();
    assert_eq!(s.resolve(GoalKey::new(job, GoalKind::Parsed)).unwrap(), parsed);

    let desugared = s.lookup(&GoalKey::new(job, GoalKind::Desugared)).unwrap();
    assert!(!s.goal(desugared).unwrap().idempotent);
    assert!(s.goal(codegen).unwrap().idempotent);
}

#[test]
fn custom_keys_do_not_resolve() {
    let mut s = scheduler();
    let job = s.add_job("A.java");
    assert_eq!(s.resolve(custom(job, "nope")).unwrap_err().code(), ErrorCode::Internal);
}

#[test]
fn goals_of_unknown_jobs_are_rejected() {
    let mut s = scheduler();
    let runs = Rc::new(Cell::new(0));
    let err = s.intern_goal(custom(JobId(7), "x"), vec![], counting("x", &runs), true).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Internal);
}
