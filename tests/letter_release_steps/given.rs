//! Given steps for letter release BDD scenarios.

use super::world::{LetterWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use staircase::subtask::{
    catalog,
    domain::{FieldEdit, FieldName},
};

#[given(r#"a member who has written a letter to "{recipient}""#)]
fn member_wrote_letter(world: &mut LetterWorld, recipient: String) -> Result<(), eyre::Report> {
    let letter = world.mount(&world.writing, true)?;
    run_async(letter.boot()).wrap_err("boot letter writing")?;
    letter.edit(
        &FieldName::new(catalog::LETTER_RECIPIENT)?,
        FieldEdit::SetText(recipient),
    )?;
    letter.advance()?;
    letter.edit(
        &FieldName::new(catalog::LETTER_TEXT)?,
        FieldEdit::SetText("I kept this to myself for far too long.".to_owned()),
    )?;
    letter.advance()?;
    letter.edit(
        &FieldName::new(catalog::FINAL_CONFIRM)?,
        FieldEdit::SetFlag(true),
    )?;
    run_async(letter.finalize()).wrap_err("finalize letter writing")?;
    Ok(())
}

#[given("a member who has not written a letter")]
fn member_without_letter(world: &mut LetterWorld) {
    world.last_boot = None;
}

#[given("the closing ritual ran without applying its effects")]
fn closing_without_effects(world: &mut LetterWorld) -> Result<(), eyre::Report> {
    world.close_letter(catalog::RELEASE_OPTION, false)
}
