//! Immutable, versioned final records and their storage codec.

use super::{Draft, FieldName, FieldValue, TaskInstance};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A field cleared by a cross-task effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    /// The cleared field.
    pub field: FieldName,
    /// The instance whose finalize triggered the redaction.
    pub origin: TaskInstance,
    /// When the redaction was applied.
    pub redacted_at: DateTime<Utc>,
}

/// Snapshot of all draft fields written once when finalize succeeds.
///
/// The only mutation a stored record ever sees is [`FinalRecord::redact`],
/// applied by cross-task effects; the record itself is never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    version: u32,
    instance: TaskInstance,
    fields: BTreeMap<FieldName, FieldValue>,
    completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    redactions: Vec<Redaction>,
}

impl FinalRecord {
    /// Snapshots `draft` for `instance` at schema `version`.
    #[must_use]
    pub fn capture(
        instance: TaskInstance,
        version: u32,
        draft: &Draft,
        clock: &impl Clock,
    ) -> Self {
        Self {
            version,
            instance,
            fields: draft.values().clone(),
            completed_at: clock.utc(),
            redactions: Vec::new(),
        }
    }

    /// Returns the schema version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the completed instance.
    #[must_use]
    pub const fn instance(&self) -> &TaskInstance {
        &self.instance
    }

    /// Returns the stored field values.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<FieldName, FieldValue> {
        &self.fields
    }

    /// Returns the stored value of `field`.
    #[must_use]
    pub fn field(&self, field: &FieldName) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Returns the applied redactions.
    #[must_use]
    pub fn redactions(&self) -> &[Redaction] {
        &self.redactions
    }

    /// Returns `true` when `field` has been redacted.
    #[must_use]
    pub fn is_redacted(&self, field: &FieldName) -> bool {
        self.redactions.iter().any(|entry| &entry.field == field)
    }

    /// Clears `fields` to their empty values, recording each redaction.
    ///
    /// Fields already redacted or absent from the record are skipped, so
    /// applying the same patch twice changes nothing. Returns the fields
    /// that were cleared by this call.
    pub fn redact<'a>(
        &mut self,
        fields: impl IntoIterator<Item = &'a FieldName>,
        origin: &TaskInstance,
        clock: &impl Clock,
    ) -> Vec<FieldName> {
        let mut cleared = Vec::new();
        for field in fields {
            if self.is_redacted(field) {
                continue;
            }
            let Some(value) = self.fields.get_mut(field) else {
                continue;
            };
            *value = emptied(value);
            self.redactions.push(Redaction {
                field: field.clone(),
                origin: origin.clone(),
                redacted_at: clock.utc(),
            });
            cleared.push(field.clone());
        }
        cleared
    }

    /// Serializes the record for storage.
    ///
    /// # Errors
    ///
    /// Returns [`RecordCodecError`] when serialization fails.
    pub fn encode(&self) -> Result<String, RecordCodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a stored value, checking it against `expected_version`.
    #[must_use]
    pub fn decode(raw: &str, expected_version: u32) -> RecordDecode {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => return RecordDecode::Corrupt(err.to_string()),
        };
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .and_then(|version| u32::try_from(version).ok());
        if found != Some(expected_version) {
            return RecordDecode::Stale { found };
        }
        match serde_json::from_value(value) {
            Ok(record) => RecordDecode::Current(record),
            Err(err) => RecordDecode::Corrupt(err.to_string()),
        }
    }
}

fn emptied(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(_) => FieldValue::Text(String::new()),
        FieldValue::Choice(_) => FieldValue::Choice(None),
        FieldValue::Choices(_) => FieldValue::Choices(Vec::new()),
        FieldValue::Toggle(_) => FieldValue::Toggle(false),
    }
}

/// Result of decoding a stored final record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDecode {
    /// The record matches the expected schema version.
    Current(FinalRecord),
    /// The record carries a different (or no) version tag and is treated as
    /// absent.
    Stale {
        /// Version tag found in storage, if any.
        found: Option<u32>,
    },
    /// The stored value could not be parsed and is treated as absent.
    Corrupt(String),
}

impl RecordDecode {
    /// Returns the record when it is current.
    #[must_use]
    pub fn into_current(self) -> Option<FinalRecord> {
        match self {
            Self::Current(record) => Some(record),
            Self::Stale { .. } | Self::Corrupt(_) => None,
        }
    }
}

/// Error raised while serializing a final record.
#[derive(Debug, Error)]
#[error("failed to encode final record: {0}")]
pub struct RecordCodecError(#[from] serde_json::Error);
