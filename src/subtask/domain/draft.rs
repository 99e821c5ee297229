//! In-memory draft answers of one active task instance.
//!
//! A draft is never persisted: it lives as long as the wizard that owns it
//! and is replaced by a [`super::FinalRecord`] only when finalize succeeds.

use super::{
    FieldEdit, FieldKind, FieldName, FieldSchema, FieldValue, SubtaskDomainError, TaskDefinition,
};
use std::collections::BTreeMap;

/// Mutable in-progress answers plus the current step index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    values: BTreeMap<FieldName, FieldValue>,
    step: usize,
}

impl Draft {
    /// Creates an empty draft at the first step with every declared field
    /// holding its empty value.
    #[must_use]
    pub fn new(definition: &TaskDefinition) -> Self {
        let values = definition
            .fields()
            .map(|field| (field.name().clone(), field.kind().empty_value()))
            .collect();
        Self { values, step: 0 }
    }

    /// Creates a draft from stored values. Declared fields missing from
    /// `values` take their empty value; undeclared values are dropped.
    #[must_use]
    pub fn hydrate(definition: &TaskDefinition, values: &BTreeMap<FieldName, FieldValue>) -> Self {
        let mut draft = Self::new(definition);
        for (name, slot) in &mut draft.values {
            if let Some(stored) = values.get(name) {
                stored.clone_into(slot);
            }
        }
        draft
    }

    /// Returns the current step index.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    pub(super) const fn move_to(&mut self, step: usize) {
        self.step = step;
    }

    /// Returns every field value.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<FieldName, FieldValue> {
        &self.values
    }

    /// Returns the value of `field`.
    #[must_use]
    pub fn value(&self, field: &FieldName) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Returns the text of `field`, or `""` when it is not a text field.
    #[must_use]
    pub fn text(&self, field: &FieldName) -> &str {
        self.value(field).and_then(FieldValue::as_text).unwrap_or_default()
    }

    /// Returns the selections of `field`, or nothing when it is not a
    /// multi-select.
    #[must_use]
    pub fn selections(&self, field: &FieldName) -> &[String] {
        self.value(field)
            .and_then(FieldValue::as_choices)
            .unwrap_or_default()
    }

    /// Returns the choice of a single-select `field`.
    #[must_use]
    pub fn choice(&self, field: &FieldName) -> Option<&str> {
        self.value(field).and_then(FieldValue::as_choice)
    }

    /// Returns the flag of a toggle `field`, or `false`.
    #[must_use]
    pub fn flag(&self, field: &FieldName) -> bool {
        self.value(field)
            .and_then(FieldValue::as_toggle)
            .unwrap_or_default()
    }

    /// Returns `true` when `field` is disabled by a held exclusive option.
    #[must_use]
    pub fn is_disabled(&self, field: &FieldSchema) -> bool {
        field.disabling_selection().is_some_and(|selection| {
            self.selections(&selection.field)
                .iter()
                .any(|held| held == &selection.option)
        })
    }

    /// Applies an edit to `field`.
    ///
    /// Selecting a multi-select's exclusive option clears every other
    /// selection of that field and every field that depends on the option.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError`] when the field is unknown or disabled,
    /// the edit does not fit the field kind, an option is not offered or is
    /// disabled, or text exceeds the field's maximum length.
    pub fn apply(
        &mut self,
        definition: &TaskDefinition,
        field: &FieldName,
        edit: FieldEdit,
    ) -> Result<(), SubtaskDomainError> {
        let schema = definition
            .field(field)
            .ok_or_else(|| SubtaskDomainError::UnknownField(field.clone()))?;
        if self.is_disabled(schema) {
            return Err(SubtaskDomainError::FieldDisabled(field.clone()));
        }

        match (schema.kind(), edit) {
            (FieldKind::Text { max_chars }, FieldEdit::SetText(text)) => {
                let actual = text.chars().count();
                if let Some(max) = *max_chars
                    && actual > max
                {
                    return Err(SubtaskDomainError::TextTooLong {
                        field: field.clone(),
                        max,
                        actual,
                    });
                }
                self.values.insert(field.clone(), FieldValue::Text(text));
            }
            (FieldKind::SingleSelect { options }, FieldEdit::Choose(option)) => {
                ensure_offered(field, options, &option)?;
                self.values
                    .insert(field.clone(), FieldValue::Choice(Some(option)));
            }
            (FieldKind::SingleSelect { .. }, FieldEdit::ClearChoice) => {
                self.values.insert(field.clone(), FieldValue::Choice(None));
            }
            (FieldKind::MultiSelect { options, exclusive }, FieldEdit::ToggleOption(option)) => {
                ensure_offered(field, options, &option)?;
                self.toggle_option(definition, field, exclusive.as_deref(), option)?;
            }
            (FieldKind::Toggle, FieldEdit::SetFlag(flag)) => {
                self.values.insert(field.clone(), FieldValue::Toggle(flag));
            }
            (kind, edit) => {
                return Err(SubtaskDomainError::FieldKindMismatch {
                    field: field.clone(),
                    expected: edit_kind(&edit),
                    actual: kind.name(),
                });
            }
        }
        Ok(())
    }

    fn toggle_option(
        &mut self,
        definition: &TaskDefinition,
        field: &FieldName,
        exclusive: Option<&str>,
        option: String,
    ) -> Result<(), SubtaskDomainError> {
        let mut selections = self.selections(field).to_vec();
        if let Some(position) = selections.iter().position(|held| held == &option) {
            selections.remove(position);
        } else if exclusive == Some(option.as_str()) {
            selections.clear();
            let dependents: Vec<FieldSchema> =
                definition.dependents_of(field, &option).cloned().collect();
            for dependent in dependents {
                self.values
                    .insert(dependent.name().clone(), dependent.kind().empty_value());
            }
            selections.push(option);
        } else if let Some(exclusive_option) = exclusive
            && selections.iter().any(|held| held == exclusive_option)
        {
            return Err(SubtaskDomainError::OptionDisabled {
                field: field.clone(),
                option,
            });
        } else {
            selections.push(option);
        }
        self.values
            .insert(field.clone(), FieldValue::Choices(selections));
        Ok(())
    }
}

fn ensure_offered(
    field: &FieldName,
    options: &[String],
    option: &str,
) -> Result<(), SubtaskDomainError> {
    if options.iter().any(|offered| offered == option) {
        Ok(())
    } else {
        Err(SubtaskDomainError::UnknownOption {
            field: field.clone(),
            option: option.to_owned(),
        })
    }
}

const fn edit_kind(edit: &FieldEdit) -> &'static str {
    match edit {
        FieldEdit::SetText(_) => "text",
        FieldEdit::Choose(_) | FieldEdit::ClearChoice => "single-select",
        FieldEdit::ToggleOption(_) => "multi-select",
        FieldEdit::SetFlag(_) => "toggle",
    }
}
