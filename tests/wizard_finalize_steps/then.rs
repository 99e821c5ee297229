//! Then steps for wizard finalize BDD scenarios.

use super::world::{WizardWorld, run_async};
use rstest_bdd_macros::then;
use staircase::subtask::{
    domain::{FieldName, FinalRecord, RecordKey, SubtaskDomainError, WizardPhase},
    ports::LocalRecordStore,
    services::{BootOutcome, FinalizeOutcome, WizardError},
};

fn stored_record(world: &WizardWorld) -> Result<Option<FinalRecord>, eyre::Report> {
    let controller = world.controller()?;
    let key: RecordKey = controller.record_key();
    let Some(raw) = run_async(world.store.get(&key))? else {
        return Ok(None);
    };
    Ok(FinalRecord::decode(&raw, 1).into_current())
}

#[then("the task is completed")]
fn task_is_completed(world: &WizardWorld) -> Result<(), eyre::Report> {
    match world.last_finalize {
        Some(FinalizeOutcome::Completed(_)) => {}
        ref other => return Err(eyre::eyre!("expected a completed finalize, got {other:?}")),
    }
    let phase = world.controller()?.phase()?;
    if phase != WizardPhase::Review {
        return Err(eyre::eyre!("expected review phase, found {phase:?}"));
    }
    Ok(())
}

#[then(r#"finalizing failed with "{code}""#)]
fn finalizing_failed_with(world: &WizardWorld, code: String) -> Result<(), eyre::Report> {
    match &world.last_finalize {
        Some(FinalizeOutcome::Failed(reason)) if reason.as_str() == code => Ok(()),
        other => Err(eyre::eyre!("expected failure {code}, got {other:?}")),
    }
}

#[then("the completion service received {count:usize} claim")]
fn service_received_claims(world: &WizardWorld, count: usize) -> Result<(), eyre::Report> {
    let calls = world.client.call_count();
    if calls != count {
        return Err(eyre::eyre!("expected {count} completion calls, found {calls}"));
    }
    Ok(())
}

#[then(r#"the stored record holds {count:usize} "{field}""#)]
fn stored_record_holds(
    world: &WizardWorld,
    count: usize,
    field: String,
) -> Result<(), eyre::Report> {
    let record = stored_record(world)?.ok_or_else(|| eyre::eyre!("no current record stored"))?;
    let held = record
        .field(&FieldName::new(field.as_str())?)
        .and_then(|value| value.as_choices())
        .map_or(0, <[String]>::len);
    if held != count {
        return Err(eyre::eyre!("expected {count} selections in {field}, found {held}"));
    }
    Ok(())
}

#[then("no record is stored")]
fn no_record_is_stored(world: &WizardWorld) -> Result<(), eyre::Report> {
    if stored_record(world)?.is_some() {
        return Err(eyre::eyre!("expected no stored record"));
    }
    Ok(())
}

#[then("advancing was refused")]
fn advancing_was_refused(world: &WizardWorld) -> Result<(), eyre::Report> {
    match &world.last_advance {
        Some(Err(WizardError::Domain(SubtaskDomainError::GateBlocked { .. }))) => Ok(()),
        other => Err(eyre::eyre!("expected a gate refusal, got {other:?}")),
    }
}

#[then("the member is on step {step:usize}")]
fn member_is_on_step(world: &WizardWorld, step: usize) -> Result<(), eyre::Report> {
    let visible = world.controller()?.view()?.step + 1;
    if visible != step {
        return Err(eyre::eyre!("expected step {step}, found step {visible}"));
    }
    Ok(())
}

#[then("the task opens in review")]
fn task_opens_in_review(world: &WizardWorld) -> Result<(), eyre::Report> {
    if world.last_boot != Some(BootOutcome::Review) {
        return Err(eyre::eyre!("expected review boot, got {:?}", world.last_boot));
    }
    Ok(())
}
