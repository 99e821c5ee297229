//! When steps for wizard finalize BDD scenarios.

use super::world::{WizardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use staircase::subtask::{
    catalog,
    domain::{FieldEdit, FieldName},
};

const CHOSEN_COMMITMENTS: [&str; 4] = [
    "daily_walk",
    "sleep_schedule",
    "call_a_friend",
    "limit_screens",
];

fn open(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    let controller = world.mount()?;
    let outcome = run_async(controller.boot()).wrap_err("boot wizard in scenario")?;
    world.last_boot = Some(outcome);
    Ok(())
}

#[when("the member opens the task")]
fn member_opens_task(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    open(world)
}

#[when("the member reopens the task")]
fn member_reopens_task(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    if let Some(previous) = world.controller.take() {
        previous.unmount();
    }
    open(world)
}

#[when(r#"the member writes "{text}" in "{field}""#)]
fn member_writes(world: &mut WizardWorld, text: String, field: String) -> Result<(), eyre::Report> {
    world
        .controller()?
        .edit(&FieldName::new(field)?, FieldEdit::SetText(text))?;
    Ok(())
}

#[when(r#"the member selects "{option}" in "{field}""#)]
fn member_selects(
    world: &mut WizardWorld,
    option: String,
    field: String,
) -> Result<(), eyre::Report> {
    world
        .controller()?
        .edit(&FieldName::new(field)?, FieldEdit::ToggleOption(option))?;
    Ok(())
}

#[when("the member advances")]
fn member_advances(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    let result = world.controller()?.advance();
    world.record_advance(result);
    Ok(())
}

#[when("the member fills every step")]
fn member_fills_every_step(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    let controller = world.controller()?;
    controller.edit(
        &FieldName::new(catalog::INTENTION)?,
        FieldEdit::SetText("Rebuild one small habit at a time".to_owned()),
    )?;
    controller.advance()?;
    let commitments = FieldName::new(catalog::COMMITMENTS)?;
    for option in CHOSEN_COMMITMENTS {
        controller.edit(&commitments, FieldEdit::ToggleOption(option.to_owned()))?;
    }
    controller.advance()?;
    for toggle in catalog::READINESS_TOGGLES {
        controller.edit(&FieldName::new(toggle)?, FieldEdit::SetFlag(true))?;
    }
    controller.advance()?;
    controller.edit(
        &FieldName::new(catalog::FINAL_CONFIRM)?,
        FieldEdit::SetFlag(true),
    )?;
    Ok(())
}

#[when("the member finalizes")]
fn member_finalizes(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    let outcome =
        run_async(world.controller()?.finalize()).wrap_err("finalize wizard in scenario")?;
    world.last_finalize = Some(outcome);
    Ok(())
}
