//! Domain model for gated sub-task wizards.
//!
//! The domain covers task definitions and their declarative gates, the
//! in-memory draft, the immutable final record, completion outcomes and the
//! wizard state machine. Storage and transport stay outside the domain
//! boundary.

mod definition;
mod draft;
mod effect;
mod error;
mod field;
mod gate;
mod ids;
mod outcome;
mod payload;
mod record;
mod sanitize;
mod wizard;

pub use definition::{Step, TaskDefinition, TaskDefinitionBuilder, TaskDependency};
pub use draft::Draft;
pub use effect::{CrossTaskEffect, EffectTrigger, TaskFinalized};
pub use error::SubtaskDomainError;
pub use field::{
    ExclusiveSelection, FieldEdit, FieldKind, FieldSchema, FieldValue, PayloadProjection,
};
pub use gate::{GateRule, GateViolation};
pub use ids::{FeatureNamespace, FieldName, RecordKey, TaskInstance, TaskKey};
pub use outcome::{CompletionOutcome, FailureReason};
pub use payload::CompletionPayload;
pub use record::{FinalRecord, RecordCodecError, RecordDecode, Redaction};
pub use sanitize::{LocalScript, sanitize_display_text};
pub use wizard::{FieldValueView, FinalizeClaim, Wizard, WizardPhase, WizardView};
