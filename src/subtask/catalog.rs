//! Concrete Staircase sub-tasks built from the declarative vocabulary.
//!
//! Each constructor returns a validated [`TaskDefinition`]. Field and
//! option names are exported as constants so hosts and tests can address
//! them without repeating string literals.

use crate::subtask::domain::{
    CrossTaskEffect, FieldName, FieldSchema, GateRule, PayloadProjection, Step,
    SubtaskDomainError, TaskDefinition, TaskInstance, TaskKey,
};

/// Letter writing ritual.
pub const LETTER_WRITING: &str = "letter_writing";
/// Closing ritual for a written letter.
pub const LETTER_CLOSING: &str = "letter_closing";
/// Commitment checklist.
pub const COMMITMENT_CHECKLIST: &str = "commitment_checklist";
/// Role definition form.
pub const ROLE_DEFINITION: &str = "role_definition";
/// Reality and fantasy journal.
pub const REALITY_FANTASY_JOURNAL: &str = "reality_fantasy_journal";

/// Free-text body of the letter.
pub const LETTER_TEXT: &str = "letter_text";
/// Addressee of the letter.
pub const LETTER_RECIPIENT: &str = "recipient";
/// Closing choice for the letter.
pub const CLOSING_CHOICE: &str = "closing_choice";
/// Closing option that releases the letter and clears its text.
pub const RELEASE_OPTION: &str = "release";
/// Closing option that keeps the letter.
pub const KEEP_OPTION: &str = "keep";
/// Final confirmation toggle shared by every task.
pub const FINAL_CONFIRM: &str = "final_confirm";
/// Stated intention of the commitment checklist.
pub const INTENTION: &str = "intention";
/// Selected commitments.
pub const COMMITMENTS: &str = "commitments";
/// Readiness toggles of the commitment checklist.
pub const READINESS_TOGGLES: [&str; 3] = ["ready_honest", "ready_consistent", "ready_supported"];
/// Selected roles.
pub const ROLES: &str = "roles";
/// Exclusive "none of these" role.
pub const NO_ROLE_OPTION: &str = "none";
/// Description of the chosen roles.
pub const ROLE_NOTES: &str = "role_notes";
/// Journal entry describing reality.
pub const REALITY_ENTRY: &str = "reality";
/// Journal entry describing the fantasy.
pub const FANTASY_ENTRY: &str = "fantasy";
/// Mood after journaling.
pub const MOOD: &str = "mood";

/// Schema version shared by the catalog definitions.
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

const COMMITMENT_OPTIONS: [&str; 6] = [
    "daily_walk",
    "sleep_schedule",
    "call_a_friend",
    "limit_screens",
    "journal_nightly",
    "ask_for_help",
];
const ROLE_OPTIONS: [&str; 5] = ["parent", "partner", "friend", "worker", NO_ROLE_OPTION];
const MOOD_OPTIONS: [&str; 3] = ["lighter", "same", "heavier"];

fn name(value: &str) -> Result<FieldName, SubtaskDomainError> {
    FieldName::new(value)
}

fn confirm_step() -> Result<Step, SubtaskDomainError> {
    Ok(Step::new("confirm")
        .with_field(FieldSchema::toggle(name(FINAL_CONFIRM)?))
        .with_gate(GateRule::all_true([name(FINAL_CONFIRM)?])))
}

/// Returns the unscoped instance of a catalog task.
///
/// # Errors
///
/// Returns [`SubtaskDomainError::InvalidTaskKey`] for an invalid key.
pub fn instance(task: &str) -> Result<TaskInstance, SubtaskDomainError> {
    Ok(TaskInstance::new(TaskKey::new(task)?))
}

/// Letter writing: addressee, a private letter body and a confirmation.
///
/// The letter body never leaves the device in full; only its length is
/// sent with the completion claim.
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] when the definition is malformed.
pub fn letter_writing() -> Result<TaskDefinition, SubtaskDomainError> {
    TaskDefinition::builder(TaskKey::new(LETTER_WRITING)?)
        .schema_version(CATALOG_SCHEMA_VERSION)
        .step(
            Step::new("recipient")
                .with_field(
                    FieldSchema::text(name(LETTER_RECIPIENT)?)
                        .with_max_chars(80)
                        .with_projection(PayloadProjection::Omit),
                )
                .with_gate(GateRule::min_length(name(LETTER_RECIPIENT)?, 2)),
        )
        .step(
            Step::new("write")
                .with_field(FieldSchema::text(name(LETTER_TEXT)?).with_max_chars(5000))
                .with_gate(GateRule::min_length(name(LETTER_TEXT)?, 20)),
        )
        .step(confirm_step()?)
        .build()
}

/// Letter closing: choose what happens to the written letter.
///
/// Requires a completed letter. Choosing [`RELEASE_OPTION`] triggers
/// [`letter_release_effect`].
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] when the definition is malformed.
pub fn letter_closing() -> Result<TaskDefinition, SubtaskDomainError> {
    TaskDefinition::builder(TaskKey::new(LETTER_CLOSING)?)
        .schema_version(CATALOG_SCHEMA_VERSION)
        .depends_on(instance(LETTER_WRITING)?, CATALOG_SCHEMA_VERSION)
        .step(
            Step::new("choose")
                .with_field(FieldSchema::single_select(
                    name(CLOSING_CHOICE)?,
                    [RELEASE_OPTION, KEEP_OPTION],
                ))
                .with_gate(GateRule::selected(name(CLOSING_CHOICE)?)),
        )
        .step(confirm_step()?)
        .build()
}

/// Releasing a letter clears its text from the letter writing record.
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] for invalid catalog names.
pub fn letter_release_effect() -> Result<CrossTaskEffect, SubtaskDomainError> {
    Ok(CrossTaskEffect::new(
        instance(LETTER_CLOSING)?,
        CATALOG_SCHEMA_VERSION,
        instance(LETTER_WRITING)?,
        CATALOG_SCHEMA_VERSION,
    )
    .when_chosen(name(CLOSING_CHOICE)?, RELEASE_OPTION)
    .redacting([name(LETTER_TEXT)?]))
}

/// Commitment checklist: an intention, at least four commitments, three
/// readiness toggles and a final confirmation.
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] when the definition is malformed.
pub fn commitment_checklist() -> Result<TaskDefinition, SubtaskDomainError> {
    let toggles = READINESS_TOGGLES
        .into_iter()
        .map(name)
        .collect::<Result<Vec<_>, _>>()?;
    let readiness = toggles
        .iter()
        .cloned()
        .fold(Step::new("readiness"), |step, toggle| {
            step.with_field(FieldSchema::toggle(toggle))
        })
        .with_gate(GateRule::all_true(toggles));

    TaskDefinition::builder(TaskKey::new(COMMITMENT_CHECKLIST)?)
        .schema_version(CATALOG_SCHEMA_VERSION)
        .step(
            Step::new("intention")
                .with_field(FieldSchema::text(name(INTENTION)?).with_max_chars(280))
                .with_gate(GateRule::min_length(name(INTENTION)?, 10)),
        )
        .step(
            Step::new("commitments")
                .with_field(FieldSchema::multi_select(
                    name(COMMITMENTS)?,
                    COMMITMENT_OPTIONS,
                ))
                .with_gate(GateRule::min_count(name(COMMITMENTS)?, 4)),
        )
        .step(readiness)
        .step(confirm_step()?)
        .build()
}

/// Role definition: pick roles (or "none"), describe them and confirm.
///
/// Selecting [`NO_ROLE_OPTION`] clears the other roles, disables the notes
/// field and blocks forward progress.
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] when the definition is malformed.
pub fn role_definition() -> Result<TaskDefinition, SubtaskDomainError> {
    TaskDefinition::builder(TaskKey::new(ROLE_DEFINITION)?)
        .schema_version(CATALOG_SCHEMA_VERSION)
        .step(
            Step::new("roles")
                .with_field(
                    FieldSchema::multi_select(name(ROLES)?, ROLE_OPTIONS)
                        .with_exclusive_option(NO_ROLE_OPTION)
                        .with_projection(PayloadProjection::Full),
                )
                .with_gate(GateRule::min_count(name(ROLES)?, 1))
                .with_gate(GateRule::exclusive_option(name(ROLES)?, NO_ROLE_OPTION)),
        )
        .step(
            Step::new("notes")
                .with_field(
                    FieldSchema::text(name(ROLE_NOTES)?)
                        .with_max_chars(1000)
                        .disabled_when(name(ROLES)?, NO_ROLE_OPTION),
                )
                .with_gate(GateRule::min_length(name(ROLE_NOTES)?, 5)),
        )
        .step(confirm_step()?)
        .build()
}

/// Reality and fantasy journal: two private entries and a mood check.
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] when the definition is malformed.
pub fn reality_fantasy_journal() -> Result<TaskDefinition, SubtaskDomainError> {
    TaskDefinition::builder(TaskKey::new(REALITY_FANTASY_JOURNAL)?)
        .schema_version(CATALOG_SCHEMA_VERSION)
        .step(
            Step::new("reality")
                .with_field(FieldSchema::text(name(REALITY_ENTRY)?).with_max_chars(2000))
                .with_gate(GateRule::min_length(name(REALITY_ENTRY)?, 10)),
        )
        .step(
            Step::new("fantasy")
                .with_field(
                    FieldSchema::text(name(FANTASY_ENTRY)?)
                        .with_max_chars(2000)
                        .with_projection(PayloadProjection::Omit),
                )
                .with_gate(GateRule::min_length(name(FANTASY_ENTRY)?, 10)),
        )
        .step(
            Step::new("mood")
                .with_field(FieldSchema::single_select(name(MOOD)?, MOOD_OPTIONS))
                .with_field(FieldSchema::toggle(name(FINAL_CONFIRM)?))
                .with_gate(GateRule::selected(name(MOOD)?))
                .with_gate(GateRule::all_true([name(FINAL_CONFIRM)?])),
        )
        .build()
}

/// Builds every catalog definition.
///
/// # Errors
///
/// Returns [`SubtaskDomainError`] when any definition is malformed.
pub fn all() -> Result<Vec<TaskDefinition>, SubtaskDomainError> {
    Ok(vec![
        letter_writing()?,
        letter_closing()?,
        commitment_checklist()?,
        role_definition()?,
        reality_fantasy_journal()?,
    ])
}
