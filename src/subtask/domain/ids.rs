//! Identifier and validated scalar types for the sub-task domain.

use super::SubtaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns `true` when `ch` may appear in a key segment.
const fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')
}

fn validated_segment(raw: &str) -> Option<String> {
    let normalized = raw.trim();
    if normalized.is_empty() || !normalized.chars().all(is_key_char) {
        return None;
    }
    Some(normalized.to_owned())
}

/// Stable key identifying a task definition, such as `letter_writing`.
///
/// Keys are restricted to ASCII alphanumerics, `-`, `_` and `.` so that they
/// can be embedded in namespaced storage keys without escaping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskKey(String);

impl TaskKey {
    /// Creates a validated task key.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::InvalidTaskKey`] when the value is empty
    /// or contains characters outside `[A-Za-z0-9._-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, SubtaskDomainError> {
        let raw = value.into();
        validated_segment(&raw)
            .map(Self)
            .ok_or(SubtaskDomainError::InvalidTaskKey(raw))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskKey {
    type Error = SubtaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskKey> for String {
    fn from(value: TaskKey) -> Self {
        value.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a field inside a task definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl FieldName {
    /// Creates a validated field name.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::InvalidFieldName`] when the value is
    /// empty after trimming or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, SubtaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(SubtaskDomainError::InvalidFieldName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the field name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FieldName {
    type Error = SubtaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldName> for String {
    fn from(value: FieldName) -> Self {
        value.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage namespace for one feature of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureNamespace(String);

impl FeatureNamespace {
    /// Namespace used when no other is configured.
    pub const DEFAULT: &'static str = "staircase";

    /// Creates a validated namespace.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::InvalidNamespace`] when the value is
    /// empty or contains characters outside `[A-Za-z0-9._-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, SubtaskDomainError> {
        let raw = value.into();
        validated_segment(&raw)
            .map(Self)
            .ok_or(SubtaskDomainError::InvalidNamespace(raw))
    }

    /// Returns the namespace as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FeatureNamespace {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl TryFrom<String> for FeatureNamespace {
    type Error = SubtaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeatureNamespace> for String {
    fn from(value: FeatureNamespace) -> Self {
        value.0
    }
}

impl fmt::Display for FeatureNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One user's attempt at one task definition.
///
/// Composite flows scope an instance by a parent identifier so that the same
/// definition can be completed once per parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskInstance {
    task: TaskKey,
    scope: Option<String>,
}

impl TaskInstance {
    /// Creates an unscoped instance of `task`.
    #[must_use]
    pub const fn new(task: TaskKey) -> Self {
        Self { task, scope: None }
    }

    /// Creates an instance of `task` scoped by a parent identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::InvalidScope`] when the scope is empty
    /// or contains characters outside `[A-Za-z0-9._-]`.
    pub fn scoped(task: TaskKey, scope: impl Into<String>) -> Result<Self, SubtaskDomainError> {
        let raw = scope.into();
        let scope = validated_segment(&raw).ok_or(SubtaskDomainError::InvalidScope(raw))?;
        Ok(Self {
            task,
            scope: Some(scope),
        })
    }

    /// Returns the task definition key.
    #[must_use]
    pub const fn task(&self) -> &TaskKey {
        &self.task
    }

    /// Returns the parent scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl From<TaskKey> for TaskInstance {
    fn from(task: TaskKey) -> Self {
        Self::new(task)
    }
}

impl fmt::Display for TaskInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}/{scope}", self.task),
            None => write!(f, "{}", self.task),
        }
    }
}

/// Fully-qualified key of a stored final record.
///
/// Formatted as `<feature>:<instance>:final:v<schema-version>`, where the
/// instance renders as `<task-key>` or `<task-key>/<scope>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(String);

impl RecordKey {
    /// Builds the final-record key for an instance at a schema version.
    #[must_use]
    pub fn final_record(
        namespace: &FeatureNamespace,
        instance: &TaskInstance,
        schema_version: u32,
    ) -> Self {
        Self(format!("{namespace}:{instance}:final:v{schema_version}"))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
