//! Tests for forward-gate rules.

use std::sync::Arc;

use super::fixtures::{exclusive, field, four_step};
use crate::subtask::domain::{Draft, FieldEdit, GateRule, GateViolation, TaskDefinition};
use rstest::rstest;

fn draft_with_text(definition: &TaskDefinition, text: &str) -> Draft {
    let mut draft = Draft::new(definition);
    draft
        .apply(definition, &field("reflection"), FieldEdit::SetText(text.to_owned()))
        .expect("set reflection");
    draft
}

#[rstest]
#[case("123456789", false)]
#[case("1234567890", true)]
#[case("   12345   ", false)]
#[case("שלום עולם!!", true)]
fn min_length_counts_trimmed_characters(
    four_step: Arc<TaskDefinition>,
    #[case] text: &str,
    #[case] holds: bool,
) {
    let draft = draft_with_text(&four_step, text);
    let rule = GateRule::min_length(field("reflection"), 10);

    assert_eq!(rule.holds(&draft), holds);
}

#[rstest]
fn min_length_reports_actual_length(four_step: Arc<TaskDefinition>) {
    let draft = draft_with_text(&four_step, "  short ");
    let rule = GateRule::min_length(field("reflection"), 10);

    assert_eq!(
        rule.check(&draft),
        Some(GateViolation::TooShort {
            field: field("reflection"),
            min: 10,
            actual: 5,
        })
    );
}

#[rstest]
fn min_count_requires_enough_selections(four_step: Arc<TaskDefinition>) {
    let mut draft = Draft::new(&four_step);
    let rule = GateRule::min_count(field("items"), 4);
    for item in ["walk", "sleep", "call"] {
        draft
            .apply(&four_step, &field("items"), FieldEdit::ToggleOption(item.to_owned()))
            .expect("select item");
    }

    assert_eq!(
        rule.check(&draft),
        Some(GateViolation::TooFewSelected {
            field: field("items"),
            min: 4,
            actual: 3,
        })
    );

    draft
        .apply(&four_step, &field("items"), FieldEdit::ToggleOption("read".to_owned()))
        .expect("select fourth item");
    assert!(rule.holds(&draft));
}

#[rstest]
fn all_true_names_first_unset_toggle(four_step: Arc<TaskDefinition>) {
    let mut draft = Draft::new(&four_step);
    let rule = GateRule::all_true([field("safe"), field("ready"), field("willing")]);
    draft
        .apply(&four_step, &field("safe"), FieldEdit::SetFlag(true))
        .expect("set safe");

    assert_eq!(
        rule.check(&draft),
        Some(GateViolation::NotSet {
            field: field("ready"),
        })
    );
}

#[rstest]
fn exclusive_option_blocks_while_selected(exclusive: Arc<TaskDefinition>) {
    let mut draft = Draft::new(&exclusive);
    let rule = GateRule::exclusive_option(field("supports"), "none");
    assert!(rule.holds(&draft));

    draft
        .apply(&exclusive, &field("supports"), FieldEdit::ToggleOption("none".to_owned()))
        .expect("select none");

    assert_eq!(
        rule.check(&draft),
        Some(GateViolation::ExclusiveSelected {
            field: field("supports"),
            option: "none".to_owned(),
        })
    );
}

#[rstest]
fn rules_report_their_fields() {
    let rule = GateRule::all_true([field("a"), field("b")]);

    assert_eq!(rule.fields(), vec![&field("a"), &field("b")]);
    assert_eq!(rule.expected_kind(), "toggle");
    assert_eq!(GateRule::selected(field("c")).expected_kind(), "single-select");
}
