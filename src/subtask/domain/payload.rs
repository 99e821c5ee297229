//! Server-side audit projection of a draft.

use super::{Draft, FieldValue, PayloadProjection, TaskDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload sent with a completion claim.
///
/// Built from a draft according to each field's [`PayloadProjection`]:
/// summarized text becomes `<field>_length`, summarized multi-selects become
/// `<field>_count`, and omitted fields never leave the device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionPayload(Map<String, Value>);

impl CompletionPayload {
    /// Projects `draft` through the field policies of `definition`.
    #[must_use]
    pub fn project(definition: &TaskDefinition, draft: &Draft) -> Self {
        let mut entries = Map::new();
        for field in definition.fields() {
            let Some(value) = draft.value(field.name()) else {
                continue;
            };
            let name = field.name().as_str();
            match (field.projection(), value) {
                (PayloadProjection::Omit, _) => {}
                (PayloadProjection::Full, value) => {
                    entries.insert(name.to_owned(), full_value(value));
                }
                (PayloadProjection::Summary, FieldValue::Text(text)) => {
                    entries.insert(
                        format!("{name}_length"),
                        Value::from(text.trim().chars().count()),
                    );
                }
                (PayloadProjection::Summary, FieldValue::Choices(choices)) => {
                    entries.insert(format!("{name}_count"), Value::from(choices.len()));
                }
                (PayloadProjection::Summary, value) => {
                    entries.insert(name.to_owned(), full_value(value));
                }
            }
        }
        Self(entries)
    }

    /// Returns the projected entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no entries were projected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the projected entries.
    #[must_use]
    pub const fn entries(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn full_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) => Value::from(text.as_str()),
        FieldValue::Choice(choice) => choice.as_deref().map_or(Value::Null, Value::from),
        FieldValue::Choices(choices) => Value::from(choices.clone()),
        FieldValue::Toggle(flag) => Value::Bool(*flag),
    }
}
