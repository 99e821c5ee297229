//! Field schema, field values and edit commands.

use super::FieldName;
use serde::{Deserialize, Serialize};

/// Declared input kind of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, optionally bounded in characters.
    Text {
        /// Maximum number of characters accepted, if bounded.
        max_chars: Option<usize>,
    },
    /// Exactly zero or one option from a fixed list.
    SingleSelect {
        /// Offered options.
        options: Vec<String>,
    },
    /// Any subset of a fixed list of options.
    MultiSelect {
        /// Offered options.
        options: Vec<String>,
        /// A "none of the above" option that clears every other selection.
        exclusive: Option<String>,
    },
    /// A boolean toggle.
    Toggle,
}

impl FieldKind {
    /// Returns a short human-readable name for the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::SingleSelect { .. } => "single-select",
            Self::MultiSelect { .. } => "multi-select",
            Self::Toggle => "toggle",
        }
    }

    /// Returns the value a fresh draft holds for this kind.
    #[must_use]
    pub const fn empty_value(&self) -> FieldValue {
        match self {
            Self::Text { .. } => FieldValue::Text(String::new()),
            Self::SingleSelect { .. } => FieldValue::Choice(None),
            Self::MultiSelect { .. } => FieldValue::Choices(Vec::new()),
            Self::Toggle => FieldValue::Toggle(false),
        }
    }

    /// Returns the offered options for select kinds.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            Self::SingleSelect { options } | Self::MultiSelect { options, .. } => options,
            Self::Text { .. } | Self::Toggle => &[],
        }
    }
}

/// How a field appears in the payload sent to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadProjection {
    /// The full value is sent.
    Full,
    /// A summary is sent: text length, selection count, or the value itself
    /// for single selects and toggles.
    #[default]
    Summary,
    /// The field stays local-only.
    Omit,
}

/// A selection that disables a dependent field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveSelection {
    /// The multi-select field holding the exclusive option.
    pub field: FieldName,
    /// The exclusive option.
    pub option: String,
}

/// A named, typed input of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    name: FieldName,
    kind: FieldKind,
    projection: PayloadProjection,
    disabled_when: Option<ExclusiveSelection>,
}

fn collect_options(options: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    options.into_iter().map(Into::into).collect()
}

impl FieldSchema {
    fn with_kind(name: FieldName, kind: FieldKind, projection: PayloadProjection) -> Self {
        Self {
            name,
            kind,
            projection,
            disabled_when: None,
        }
    }

    /// Declares an unbounded free-text field, summarized in payloads.
    #[must_use]
    pub fn text(name: FieldName) -> Self {
        Self::with_kind(
            name,
            FieldKind::Text { max_chars: None },
            PayloadProjection::Summary,
        )
    }

    /// Declares a single-select field.
    #[must_use]
    pub fn single_select(
        name: FieldName,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::with_kind(
            name,
            FieldKind::SingleSelect {
                options: collect_options(options),
            },
            PayloadProjection::Full,
        )
    }

    /// Declares a multi-select field.
    #[must_use]
    pub fn multi_select(
        name: FieldName,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::with_kind(
            name,
            FieldKind::MultiSelect {
                options: collect_options(options),
                exclusive: None,
            },
            PayloadProjection::Summary,
        )
    }

    /// Declares a boolean toggle.
    #[must_use]
    pub fn toggle(name: FieldName) -> Self {
        Self::with_kind(name, FieldKind::Toggle, PayloadProjection::Full)
    }

    /// Bounds a text field. Has no effect on other kinds.
    #[must_use]
    pub fn with_max_chars(mut self, max: usize) -> Self {
        if let FieldKind::Text { max_chars } = &mut self.kind {
            *max_chars = Some(max);
        }
        self
    }

    /// Marks a multi-select option as exclusive. Has no effect on other
    /// kinds.
    #[must_use]
    pub fn with_exclusive_option(mut self, option: impl Into<String>) -> Self {
        if let FieldKind::MultiSelect { exclusive, .. } = &mut self.kind {
            *exclusive = Some(option.into());
        }
        self
    }

    /// Overrides the payload projection.
    #[must_use]
    pub const fn with_projection(mut self, projection: PayloadProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Clears and disables this field while `option` is selected in `field`.
    #[must_use]
    pub fn disabled_when(mut self, field: FieldName, option: impl Into<String>) -> Self {
        self.disabled_when = Some(ExclusiveSelection {
            field,
            option: option.into(),
        });
        self
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &FieldName {
        &self.name
    }

    /// Returns the field kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the payload projection.
    #[must_use]
    pub const fn projection(&self) -> PayloadProjection {
        self.projection
    }

    /// Returns the exclusive selection that disables this field, if any.
    #[must_use]
    pub const fn disabling_selection(&self) -> Option<&ExclusiveSelection> {
        self.disabled_when.as_ref()
    }

    /// Returns the exclusive option of a multi-select field, if any.
    #[must_use]
    pub fn exclusive_option(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::MultiSelect { exclusive, .. } => exclusive.as_deref(),
            _ => None,
        }
    }
}

/// Current value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text.
    Text(String),
    /// Single-select choice.
    Choice(Option<String>),
    /// Multi-select choices in selection order.
    Choices(Vec<String>),
    /// Toggle state.
    Toggle(bool),
}

impl FieldValue {
    /// Returns the text when this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the chosen option when this is a single-select value.
    #[must_use]
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(choice) => choice.as_deref(),
            _ => None,
        }
    }

    /// Returns the selections when this is a multi-select value.
    #[must_use]
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(choices) => Some(choices),
            _ => None,
        }
    }

    /// Returns the flag when this is a toggle value.
    #[must_use]
    pub const fn as_toggle(&self) -> Option<bool> {
        match self {
            Self::Toggle(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns `true` when `option` is held by a single or multi select.
    #[must_use]
    pub fn holds_option(&self, option: &str) -> bool {
        match self {
            Self::Choice(choice) => choice.as_deref() == Some(option),
            Self::Choices(choices) => choices.iter().any(|held| held == option),
            Self::Text(_) | Self::Toggle(_) => false,
        }
    }
}

/// An edit applied to one field of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Replaces the text of a text field.
    SetText(String),
    /// Chooses an option of a single-select field.
    Choose(String),
    /// Clears a single-select field.
    ClearChoice,
    /// Selects or deselects an option of a multi-select field.
    ToggleOption(String),
    /// Sets a toggle field.
    SetFlag(bool),
}
