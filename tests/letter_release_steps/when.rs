//! When steps for letter release BDD scenarios.

use super::world::{LetterWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"the member closes the letter with "{choice}""#)]
fn member_closes_letter(world: &mut LetterWorld, choice: String) -> Result<(), eyre::Report> {
    world.close_letter(&choice, true)
}

#[when("the member opens the closing ritual")]
fn member_opens_closing(world: &mut LetterWorld) -> Result<(), eyre::Report> {
    let ritual = world.mount(&world.closing, true)?;
    world.last_boot = Some(run_async(ritual.boot()).wrap_err("boot closing ritual")?);
    Ok(())
}

#[when("the member reopens the letter")]
fn member_reopens_letter(world: &mut LetterWorld) -> Result<(), eyre::Report> {
    let letter = world.mount(&world.writing, true)?;
    world.last_boot = Some(run_async(letter.boot()).wrap_err("boot letter writing")?);
    Ok(())
}
