//! Error types for sub-task definitions, drafts and wizard navigation.

use super::{FieldName, GateViolation, TaskInstance};
use thiserror::Error;

/// Errors returned while building definitions or driving a wizard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubtaskDomainError {
    /// The task key is empty or contains unsupported characters.
    #[error("invalid task key '{0}', expected [A-Za-z0-9._-]+")]
    InvalidTaskKey(String),

    /// The field name is empty or contains whitespace.
    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    /// The storage namespace is empty or contains unsupported characters.
    #[error("invalid namespace '{0}', expected [A-Za-z0-9._-]+")]
    InvalidNamespace(String),

    /// The instance scope is empty or contains unsupported characters.
    #[error("invalid instance scope '{0}', expected [A-Za-z0-9._-]+")]
    InvalidScope(String),

    /// A task definition has no steps.
    #[error("task definition must contain at least one step")]
    EmptyDefinition,

    /// A field name is declared more than once across the definition.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(FieldName),

    /// A field or gate references a field that is not declared.
    #[error("unknown field '{0}'")]
    UnknownField(FieldName),

    /// A value or rule does not match the declared field kind.
    #[error("field '{field}' is {actual}, expected {expected}")]
    FieldKindMismatch {
        /// The field being accessed.
        field: FieldName,
        /// The kind required by the operation.
        expected: &'static str,
        /// The declared kind of the field.
        actual: &'static str,
    },

    /// A select option is not part of the field's option list.
    #[error("option '{option}' is not offered by field '{field}'")]
    UnknownOption {
        /// The select field.
        field: FieldName,
        /// The rejected option.
        option: String,
    },

    /// An option is disabled because the field's exclusive option is held.
    #[error("option '{option}' of field '{field}' is disabled by an exclusive selection")]
    OptionDisabled {
        /// The multi-select field.
        field: FieldName,
        /// The rejected option.
        option: String,
    },

    /// A field is disabled by a selected exclusive option.
    #[error("field '{0}' is disabled by an exclusive selection")]
    FieldDisabled(FieldName),

    /// Text exceeds the field's configured maximum length.
    #[error("field '{field}' accepts at most {max} characters, got {actual}")]
    TextTooLong {
        /// The text field.
        field: FieldName,
        /// Maximum character count.
        max: usize,
        /// Character count that was submitted.
        actual: usize,
    },

    /// The wizard has not finished booting.
    #[error("wizard has not finished booting")]
    NotBooted,

    /// The wizard is blocked on a missing dependency record.
    #[error("wizard is blocked until '{0}' has been completed")]
    Blocked(TaskInstance),

    /// The task is locked in review and cannot be edited.
    #[error("task is completed and read-only")]
    ReadOnly,

    /// A forward transition was attempted while a gate does not hold.
    #[error("step {step} gate does not hold: {violations:?}")]
    GateBlocked {
        /// Zero-based index of the step whose gate failed.
        step: usize,
        /// The individual rule violations.
        violations: Vec<GateViolation>,
    },

    /// The requested step does not exist.
    #[error("step {step} is out of range for a {count}-step task")]
    StepOutOfRange {
        /// The requested zero-based step index.
        step: usize,
        /// Number of steps in the definition.
        count: usize,
    },

    /// Finalize was requested before reaching the last step.
    #[error("finalize is only available on the last step")]
    NotOnLastStep,

    /// A completion claim is pending; the wizard accepts no input.
    #[error("a completion claim is pending")]
    FinalizeInFlight,
}
