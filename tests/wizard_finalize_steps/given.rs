//! Given steps for wizard finalize BDD scenarios.

use super::world::WizardWorld;
use rstest_bdd_macros::given;
use staircase::subtask::domain::CompletionOutcome;

#[given("a signed-in member on the commitment checklist")]
fn signed_in_member(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    world.sign_in()?;
    world.use_checklist()
}

#[given("a signed-out member on the commitment checklist")]
fn signed_out_member(world: &mut WizardWorld) -> Result<(), eyre::Report> {
    world.use_checklist()
}

#[given("the completion service reports the task as already done")]
fn service_reports_already_done(world: &mut WizardWorld) {
    world.client.push_outcome(CompletionOutcome::AlreadyDone);
}
