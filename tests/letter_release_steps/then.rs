//! Then steps for letter release BDD scenarios.

use super::world::LetterWorld;
use rstest_bdd_macros::then;
use staircase::subtask::{
    catalog,
    domain::{FieldName, FieldValue},
    services::BootOutcome,
};

fn letter_text(world: &LetterWorld) -> Result<(Option<FieldValue>, bool), eyre::Report> {
    let record = world.letter_record()?;
    let field = FieldName::new(catalog::LETTER_TEXT)?;
    Ok((record.field(&field).cloned(), record.is_redacted(&field)))
}

#[then("the letter text is cleared")]
fn letter_text_cleared(world: &LetterWorld) -> Result<(), eyre::Report> {
    let (value, redacted) = letter_text(world)?;
    if value != Some(FieldValue::Text(String::new())) || !redacted {
        return Err(eyre::eyre!("expected a redacted empty letter, found {value:?}"));
    }
    Ok(())
}

#[then("the letter text is intact")]
fn letter_text_intact(world: &LetterWorld) -> Result<(), eyre::Report> {
    let (value, redacted) = letter_text(world)?;
    let kept = value
        .as_ref()
        .and_then(FieldValue::as_text)
        .is_some_and(|text| !text.is_empty());
    if !kept || redacted {
        return Err(eyre::eyre!("expected the letter to be kept, found {value:?}"));
    }
    Ok(())
}

#[then(r#"the letter recipient is still "{recipient}""#)]
fn letter_recipient_is(world: &LetterWorld, recipient: String) -> Result<(), eyre::Report> {
    let record = world.letter_record()?;
    let stored = record
        .field(&FieldName::new(catalog::LETTER_RECIPIENT)?)
        .and_then(FieldValue::as_text);
    if stored != Some(recipient.as_str()) {
        return Err(eyre::eyre!("expected recipient {recipient}, found {stored:?}"));
    }
    Ok(())
}

#[then(r#"the closing ritual is blocked on "{task}""#)]
fn closing_blocked_on(world: &LetterWorld, task: String) -> Result<(), eyre::Report> {
    match &world.last_boot {
        Some(BootOutcome::Blocked(dependency)) if dependency.instance.task().as_str() == task => {
            Ok(())
        }
        other => Err(eyre::eyre!("expected a block on {task}, got {other:?}")),
    }
}

#[then("the letter opens in review")]
fn letter_opens_in_review(world: &LetterWorld) -> Result<(), eyre::Report> {
    if world.last_boot != Some(BootOutcome::Review) {
        return Err(eyre::eyre!("expected review boot, got {:?}", world.last_boot));
    }
    Ok(())
}
