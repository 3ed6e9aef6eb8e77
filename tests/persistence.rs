//! Persistence against a real directory.

use phaseflow::core::{Artifact, State, Task, TaskStatus};
use phaseflow::persistence::{Backend, Context, FileBackend, PersistError, Store};
use phaseflow::{advance, AdvanceRequest, ConfigBuilder, Event, Project, Settings};
use std::fs;

const PLANNING: State = State::from_static("Planning");
const BUILDING: State = State::from_static("Building");
const START: Event = Event::from_static("Start");

fn project() -> Project {
    let config = ConfigBuilder::new("build")
        .set_initial_state(PLANNING)
        .with_phase("plan", |p| p.start_state(PLANNING).end_state(BUILDING))
        .with_phase("build", |p| p.start_state(BUILDING).tasks())
        .add_transition(PLANNING, BUILDING, START)
        .build()
        .unwrap();
    let mut project = config.new_project("compiler", "a small compiler").unwrap();

    let plan = project.phase_mut("plan").unwrap();
    plan.outputs.push(Artifact::new("plan", "docs/plan.md").approved());
    plan.set_meta("complexity", "high");

    let build = project.phase_mut("build").unwrap();
    build.tasks.push(Task::new("010", "lexer").with_status(TaskStatus::Completed));
    build.tasks.push(Task::new("020", "parser"));
    project
}

#[test]
fn round_trip_through_local_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    let project = project();

    store.save(&project).unwrap();

    assert!(dir.path().join(".phaseflow/project/state.json").exists());
    assert_eq!(store.load().unwrap(), project);
}

#[test]
fn repeated_load_save_cycles_do_not_drift() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    store.save(&project()).unwrap();
    let path = dir.path().join(".phaseflow/project/state.json");
    let first = fs::read_to_string(&path).unwrap();

    for _ in 0..3 {
        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn float_metadata_survives_repeated_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    let mut project = project();
    let plan = project.phase_mut("plan").unwrap();
    plan.set_meta("score", 1.0715660391465826e-75);
    plan.set_meta("ratio", 0.1);
    plan.set_meta("budget", f64::MAX);
    plan.set_meta("epsilon", 5e-324);
    store.save(&project).unwrap();
    let path = dir.path().join(".phaseflow/project/state.json");
    let first = fs::read_to_string(&path).unwrap();

    for _ in 0..3 {
        let loaded = store.load().unwrap();
        assert_eq!(loaded, project);
        store.save(&loaded).unwrap();
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn phase_order_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    let mut project = project();
    project.phases.insert("deploy", phaseflow::core::Phase::new());
    store.save(&project).unwrap();

    let names: Vec<String> = store.load().unwrap().phases.names().map(String::from).collect();
    assert_eq!(names, vec!["plan", "build", "deploy"]);
}

#[test]
fn settings_choose_the_document_path() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::from_toml_str("state_path = \"state/custom.json\"\npretty = false").unwrap();
    let backend = FileBackend::from_settings(&settings);
    let ctx = Context::local(dir.path());

    backend.save(&ctx, &project()).unwrap();

    let text = fs::read_to_string(dir.path().join("state/custom.json")).unwrap();
    assert!(!text.contains('\n'));
    assert!(backend.exists(&ctx).unwrap());
    backend.delete(&ctx).unwrap();
    assert!(!backend.exists(&ctx).unwrap());
}

#[test]
fn load_reports_missing_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path());
    assert!(matches!(store.load(), Err(PersistError::NotFound { .. })));
}

#[test]
fn advanced_project_resumes_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigBuilder::new("build")
        .set_initial_state(PLANNING)
        .with_phase("plan", |p| p.start_state(PLANNING))
        .add_transition(PLANNING, BUILDING, START)
        .build()
        .unwrap();
    let store = Store::open(dir.path());
    store.save(&config.new_project("compiler", "").unwrap()).unwrap();

    let (project, _) =
        phaseflow::machine::advance_stored(&config, &store, AdvanceRequest::Explicit(START)).unwrap();
    assert_eq!(project.current_state(), &BUILDING);

    let mut reloaded = store.load().unwrap();
    assert_eq!(reloaded.current_state(), &BUILDING);
    assert_eq!(reloaded.history.len(), 1);

    let err = advance(&config, &mut reloaded, &store, AdvanceRequest::Auto).unwrap_err();
    assert_eq!(err.kind(), phaseflow::ErrorKind::Usage);
}
