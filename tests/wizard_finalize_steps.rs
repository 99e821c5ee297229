//! Behaviour tests for gated wizard finalization.

#[path = "wizard_finalize_steps/mod.rs"]
mod wizard_finalize_steps_defs;

use rstest_bdd_macros::scenario;
use wizard_finalize_steps_defs::world::{WizardWorld, world};

#[scenario(
    path = "tests/features/wizard_finalize.feature",
    name = "Finalizing a filled checklist completes once"
)]
#[tokio::test(flavor = "multi_thread")]
async fn finalizing_filled_checklist(world: WizardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wizard_finalize.feature",
    name = "The gate refuses too few commitments"
)]
#[tokio::test(flavor = "multi_thread")]
async fn gate_refuses_too_few_commitments(world: WizardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wizard_finalize.feature",
    name = "A signed-out member cannot finalize"
)]
#[tokio::test(flavor = "multi_thread")]
async fn signed_out_member_cannot_finalize(world: WizardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wizard_finalize.feature",
    name = "A server that already recorded the task converges locally"
)]
#[tokio::test(flavor = "multi_thread")]
async fn already_done_converges_locally(world: WizardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wizard_finalize.feature",
    name = "Reopening a completed task shows the summary"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reopening_completed_task_shows_summary(world: WizardWorld) {
    let _ = world;
}
