//! Declarative cross-task effects and the event that triggers them.

use super::{FieldName, FinalRecord, TaskInstance};

/// Choice in the origin record that triggers an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectTrigger {
    /// Single- or multi-select field of the origin record.
    pub field: FieldName,
    /// Option that must be held.
    pub option: String,
}

/// A redaction patch applied to a target instance's final record after an
/// origin instance is finalized.
///
/// Effects are data, so a reconciler can re-derive and re-apply them from the
/// origin's stored record at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTaskEffect {
    origin: TaskInstance,
    origin_version: u32,
    target: TaskInstance,
    target_version: u32,
    trigger: Option<EffectTrigger>,
    redact: Vec<FieldName>,
}

impl CrossTaskEffect {
    /// Declares an effect of `origin` on `target`, with the schema versions
    /// of both records. Without a trigger or fields the effect does nothing.
    #[must_use]
    pub const fn new(
        origin: TaskInstance,
        origin_version: u32,
        target: TaskInstance,
        target_version: u32,
    ) -> Self {
        Self {
            origin,
            origin_version,
            target,
            target_version,
            trigger: None,
            redact: Vec::new(),
        }
    }

    /// Applies the effect only when `option` is held in the origin's `field`.
    #[must_use]
    pub fn when_chosen(mut self, field: FieldName, option: impl Into<String>) -> Self {
        self.trigger = Some(EffectTrigger {
            field,
            option: option.into(),
        });
        self
    }

    /// Adds target fields to redact.
    #[must_use]
    pub fn redacting(mut self, fields: impl IntoIterator<Item = FieldName>) -> Self {
        self.redact.extend(fields);
        self
    }

    /// Returns the origin instance.
    #[must_use]
    pub const fn origin(&self) -> &TaskInstance {
        &self.origin
    }

    /// Returns the origin record's schema version.
    #[must_use]
    pub const fn origin_version(&self) -> u32 {
        self.origin_version
    }

    /// Returns the target instance.
    #[must_use]
    pub const fn target(&self) -> &TaskInstance {
        &self.target
    }

    /// Returns the target record's schema version.
    #[must_use]
    pub const fn target_version(&self) -> u32 {
        self.target_version
    }

    /// Returns the trigger, if any.
    #[must_use]
    pub const fn trigger(&self) -> Option<&EffectTrigger> {
        self.trigger.as_ref()
    }

    /// Returns the target fields to redact.
    #[must_use]
    pub fn redacted_fields(&self) -> &[FieldName] {
        &self.redact
    }

    /// Returns `true` when `record` is this effect's origin and holds the
    /// trigger choice.
    #[must_use]
    pub fn triggered_by(&self, record: &FinalRecord) -> bool {
        if record.instance() != &self.origin || record.version() != self.origin_version {
            return false;
        }
        self.trigger.as_ref().is_none_or(|trigger| {
            record
                .field(&trigger.field)
                .is_some_and(|value| value.holds_option(&trigger.option))
        })
    }
}

/// Published after an instance's final record has been durably written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFinalized {
    /// The record that was written.
    pub record: FinalRecord,
}

impl TaskFinalized {
    /// Returns the finalized instance.
    #[must_use]
    pub const fn instance(&self) -> &TaskInstance {
        self.record.instance()
    }
}
