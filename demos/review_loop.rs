//! Draft Review Loop
//!
//! This demo walks one project through a draft/review lifecycle backed by a
//! state document on disk.
//!
//! Key concepts:
//! - A branch at `Drafting` picks the next event from the draft's outcome
//! - Rejections loop back and bump a retry counter
//! - Publishing is guarded by an approved review artifact
//! - Discovery lists what can happen next, including blocked options
//!
//! Run with: RUST_LOG=phaseflow=debug cargo run --example review_loop

use phaseflow::core::{ActionError, Artifact, Project};
use phaseflow::machine::discover;
use phaseflow::{
    advance, events, guards, states, AdvanceOutcome, AdvanceRequest, Config, ConfigBuilder,
    Registry, Store, Validator,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

states! {
    DRAFTING = "Drafting";
    REVIEWED = "Reviewed";
    PUBLISHED = "Published";
}

events! {
    ACCEPT = "Accept";
    REVISE = "Revise";
    PUBLISH = "Publish";
}

const REVIEW_SCHEMA: &str = r#"{
    "properties": {
        "outcome": {"enum": ["approved", "rejected"]},
        "retries": {"type": "integer", "minimum": 0}
    }
}"#;

fn outcome(project: &Project) -> String {
    project
        .phase("draft")
        .and_then(|p| p.meta_str("outcome"))
        .unwrap_or_default()
        .to_string()
}

fn count_retry(project: &mut Project) -> Result<(), ActionError> {
    let draft = project
        .phase_mut("draft")
        .ok_or_else(|| ActionError::new("draft phase missing"))?;
    let retries = draft.meta("retries").and_then(Value::as_u64).unwrap_or(0);
    draft.set_meta("retries", retries + 1);
    draft.metadata.remove("outcome");
    Ok(())
}

fn review_config() -> Result<Config, phaseflow::BuildError> {
    ConfigBuilder::new("review")
        .with_description("Draft, review, publish")
        .set_initial_state(DRAFTING)
        .with_phase("draft", |p| {
            p.start_state(DRAFTING)
                .end_state(REVIEWED)
                .outputs(["draft", "review"])
                .metadata_schema(REVIEW_SCHEMA)
        })
        .with_phase("publish", |p| p.start_state(REVIEWED).end_state(PUBLISHED))
        .add_branch(DRAFTING, |b| {
            b.discriminator(outcome)
                .when("approved", ACCEPT, REVIEWED)
                .when_with("rejected", REVISE, DRAFTING, |t| {
                    t.description("rework the draft").on_entry(count_retry)
                })
        })
        .add_transition_with(REVIEWED, PUBLISHED, PUBLISH, |t| {
            t.guard(guards::artifact_approved("draft", "review"))
                .description("publish the approved draft")
        })
        .with_prompt(DRAFTING, |p| {
            format!("Write the draft for '{}', then record an outcome.", p.name)
        })
        .build()
}

fn show(outcome: &AdvanceOutcome) {
    match outcome {
        AdvanceOutcome::Advanced { from, to, event } => println!("  {from} --{event}--> {to}"),
        AdvanceOutcome::Options { state, options } => {
            println!("  from {state}:");
            for option in options {
                match &option.blocked_reason {
                    None => println!("    {} -> {}", option.event, option.target),
                    Some(reason) => {
                        println!("    {} -> {} (blocked: {reason})", option.event, option.target)
                    }
                }
            }
        }
        AdvanceOutcome::DryRun(report) => println!("  dry run {}: {}", report.event, report.permitted),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Draft Review Loop ===\n");

    let registry = Registry::new().with("review", review_config()?)?;
    let config = registry.require("review")?;

    let dir = tempfile::tempdir()?;
    let store = Store::open(dir.path());

    let mut project = config.new_project("release-notes", "Notes for the next release")?;
    store.save(&project)?;
    if let Some(prompt) = config.prompt(project.current_state(), &project) {
        println!("Guidance: {prompt}\n");
    }

    println!("1. Reviewer rejects the first draft:");
    project.phase_mut("draft").ok_or("draft phase missing")?.set_meta("outcome", "rejected");
    show(&advance(&config, &mut project, &store, AdvanceRequest::Auto)?);

    println!("\n2. Second draft is approved:");
    let draft = project.phase_mut("draft").ok_or("draft phase missing")?;
    draft.set_meta("outcome", "approved");
    draft.outputs.push(Artifact::new("review", "reviews/release-notes.md"));
    show(&advance(&config, &mut project, &store, AdvanceRequest::Auto)?);

    println!("\n3. What can happen next?");
    show(&advance(&config, &mut project, &store, AdvanceRequest::Discover)?);

    println!("\n4. Approve the review and publish:");
    if let Some(review) = project
        .phase_mut("draft")
        .and_then(|p| p.outputs.iter_mut().find(|a| a.artifact_type == "review"))
    {
        review.approved = true;
    }
    show(&advance(&config, &mut project, &store, AdvanceRequest::Explicit(PUBLISH))?);

    let reloaded = store.load()?;
    println!("\nReloaded state: {}", reloaded.current_state());
    println!("Transitions recorded: {}", reloaded.history.len());
    println!("Options from here: {}", discover(&config, &reloaded)?.len());

    let problems = Validator::new(&config).validate(&reloaded);
    if problems.is_empty() {
        println!("Validation: ok");
    } else {
        for problem in problems {
            println!("Validation: {problem}");
        }
    }

    Ok(())
}
