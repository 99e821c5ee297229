//! Tests for the completion payload projection.

use std::sync::Arc;

use super::fixtures::{exclusive, field, four_step, key};
use crate::subtask::domain::{
    CompletionPayload, Draft, FieldEdit, FieldSchema, PayloadProjection, Step, TaskDefinition,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
fn summary_projection_sends_counts_not_text(four_step: Arc<TaskDefinition>) {
    let mut draft = Draft::new(&four_step);
    draft
        .apply(
            &four_step,
            &field("reflection"),
            FieldEdit::SetText("  a private thought  ".to_owned()),
        )
        .expect("set reflection");
    for item in ["walk", "read"] {
        draft
            .apply(&four_step, &field("items"), FieldEdit::ToggleOption(item.to_owned()))
            .expect("select item");
    }

    let payload = CompletionPayload::project(&four_step, &draft);

    assert_eq!(payload.get("reflection"), None);
    assert_eq!(payload.get("reflection_length"), Some(&json!(17)));
    assert_eq!(payload.get("items_count"), Some(&json!(2)));
    assert_eq!(payload.get("safe"), Some(&json!(false)));
}

#[rstest]
fn full_projection_sends_selected_options(exclusive: Arc<TaskDefinition>) {
    let mut draft = Draft::new(&exclusive);
    draft
        .apply(&exclusive, &field("supports"), FieldEdit::ToggleOption("friends".to_owned()))
        .expect("select friends");

    let payload = CompletionPayload::project(&exclusive, &draft);

    assert_eq!(payload.get("supports"), Some(&json!(["friends"])));
}

#[rstest]
fn omitted_fields_never_leave_the_device() {
    let definition = TaskDefinition::builder(key("journal"))
        .step(
            Step::new("write")
                .with_field(
                    FieldSchema::text(field("entry")).with_projection(PayloadProjection::Omit),
                )
                .with_field(FieldSchema::single_select(field("mood"), ["up", "down"])),
        )
        .build()
        .expect("valid definition");
    let mut draft = Draft::new(&definition);
    draft
        .apply(&definition, &field("entry"), FieldEdit::SetText("secret".to_owned()))
        .expect("write entry");

    let payload = CompletionPayload::project(&definition, &draft);

    assert_eq!(
        serde_json::to_value(&payload).expect("serialize payload"),
        json!({ "mood": null })
    );
}
