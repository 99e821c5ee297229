//! Declarative forward-gate rules.
//!
//! Each rule is a pure predicate over a [`Draft`]; a step's gate holds when
//! every one of its rules holds. Rules never perform I/O or read the clock.

use super::{Draft, FieldName};

/// A single forward-gate rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRule {
    /// Trimmed text must contain at least `min` characters.
    MinLength {
        /// Text field checked.
        field: FieldName,
        /// Minimum character count.
        min: usize,
    },
    /// A multi-select must hold at least `min` options.
    MinCount {
        /// Multi-select field checked.
        field: FieldName,
        /// Minimum selection count.
        min: usize,
    },
    /// Every listed toggle must be set.
    AllTrue {
        /// Toggle fields checked.
        fields: Vec<FieldName>,
    },
    /// Forward progress is blocked while the exclusive option is selected.
    ExclusiveOption {
        /// Multi-select field checked.
        field: FieldName,
        /// The exclusive option.
        option: String,
    },
    /// A single-select must hold a value.
    Selected {
        /// Single-select field checked.
        field: FieldName,
    },
    /// A single-select must hold a specific option.
    Equals {
        /// Single-select field checked.
        field: FieldName,
        /// The required option.
        option: String,
    },
}

/// Why a gate rule does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateViolation {
    /// Text is shorter than required.
    TooShort {
        /// Text field.
        field: FieldName,
        /// Minimum character count.
        min: usize,
        /// Current trimmed character count.
        actual: usize,
    },
    /// Fewer options are selected than required.
    TooFewSelected {
        /// Multi-select field.
        field: FieldName,
        /// Minimum selection count.
        min: usize,
        /// Current selection count.
        actual: usize,
    },
    /// A required toggle is not set.
    NotSet {
        /// Toggle field.
        field: FieldName,
    },
    /// The exclusive option is selected.
    ExclusiveSelected {
        /// Multi-select field.
        field: FieldName,
        /// The exclusive option.
        option: String,
    },
    /// A single-select holds no value.
    NothingSelected {
        /// Single-select field.
        field: FieldName,
    },
    /// A single-select holds a different option than required.
    NotEqual {
        /// Single-select field.
        field: FieldName,
        /// The required option.
        expected: String,
    },
}

impl GateRule {
    /// Requires at least `min` trimmed characters in `field`.
    #[must_use]
    pub const fn min_length(field: FieldName, min: usize) -> Self {
        Self::MinLength { field, min }
    }

    /// Requires at least `min` selections in `field`.
    #[must_use]
    pub const fn min_count(field: FieldName, min: usize) -> Self {
        Self::MinCount { field, min }
    }

    /// Requires every toggle in `fields` to be set.
    #[must_use]
    pub fn all_true(fields: impl IntoIterator<Item = FieldName>) -> Self {
        Self::AllTrue {
            fields: fields.into_iter().collect(),
        }
    }

    /// Blocks progress while `option` is selected in `field`.
    #[must_use]
    pub fn exclusive_option(field: FieldName, option: impl Into<String>) -> Self {
        Self::ExclusiveOption {
            field,
            option: option.into(),
        }
    }

    /// Requires `field` to hold a choice.
    #[must_use]
    pub const fn selected(field: FieldName) -> Self {
        Self::Selected { field }
    }

    /// Requires `field` to hold `option`.
    #[must_use]
    pub fn equals(field: FieldName, option: impl Into<String>) -> Self {
        Self::Equals {
            field,
            option: option.into(),
        }
    }

    /// Returns the fields this rule reads.
    #[must_use]
    pub fn fields(&self) -> Vec<&FieldName> {
        match self {
            Self::MinLength { field, .. }
            | Self::MinCount { field, .. }
            | Self::ExclusiveOption { field, .. }
            | Self::Selected { field }
            | Self::Equals { field, .. } => vec![field],
            Self::AllTrue { fields } => fields.iter().collect(),
        }
    }

    /// Returns the field kind name this rule expects.
    #[must_use]
    pub const fn expected_kind(&self) -> &'static str {
        match self {
            Self::MinLength { .. } => "text",
            Self::MinCount { .. } | Self::ExclusiveOption { .. } => "multi-select",
            Self::AllTrue { .. } => "toggle",
            Self::Selected { .. } | Self::Equals { .. } => "single-select",
        }
    }

    /// Evaluates the rule, returning the violation when it does not hold.
    #[must_use]
    pub fn check(&self, draft: &Draft) -> Option<GateViolation> {
        match self {
            Self::MinLength { field, min } => {
                let actual = draft.text(field).trim().chars().count();
                (actual < *min).then(|| GateViolation::TooShort {
                    field: field.clone(),
                    min: *min,
                    actual,
                })
            }
            Self::MinCount { field, min } => {
                let actual = draft.selections(field).len();
                (actual < *min).then(|| GateViolation::TooFewSelected {
                    field: field.clone(),
                    min: *min,
                    actual,
                })
            }
            Self::AllTrue { fields } => fields
                .iter()
                .find(|field| !draft.flag(field))
                .map(|field| GateViolation::NotSet {
                    field: field.clone(),
                }),
            Self::ExclusiveOption { field, option } => draft
                .selections(field)
                .iter()
                .any(|held| held == option)
                .then(|| GateViolation::ExclusiveSelected {
                    field: field.clone(),
                    option: option.clone(),
                }),
            Self::Selected { field } => {
                draft
                    .choice(field)
                    .is_none()
                    .then(|| GateViolation::NothingSelected {
                        field: field.clone(),
                    })
            }
            Self::Equals { field, option } => (draft.choice(field) != Some(option.as_str()))
                .then(|| GateViolation::NotEqual {
                    field: field.clone(),
                    expected: option.clone(),
                }),
        }
    }

    /// Returns `true` when the rule holds for `draft`.
    #[must_use]
    pub fn holds(&self, draft: &Draft) -> bool {
        self.check(draft).is_none()
    }
}
