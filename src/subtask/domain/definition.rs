//! Task definitions: ordered steps, their fields and their gates.

use super::{
    Draft, FieldKind, FieldName, FieldSchema, GateRule, GateViolation, SubtaskDomainError,
    TaskInstance, TaskKey,
};
use std::collections::HashSet;

/// One wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    id: String,
    fields: Vec<FieldSchema>,
    gates: Vec<GateRule>,
}

impl Step {
    /// Creates an empty step with a stable identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            gates: Vec::new(),
        }
    }

    /// Adds a field to the step.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a rule to the step's forward gate.
    #[must_use]
    pub fn with_gate(mut self, rule: GateRule) -> Self {
        self.gates.push(rule);
        self
    }

    /// Returns the step identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the fields declared by this step.
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Returns the rules of the step's forward gate.
    #[must_use]
    pub fn gates(&self) -> &[GateRule] {
        &self.gates
    }

    /// Returns every rule violation for `draft`.
    #[must_use]
    pub fn violations(&self, draft: &Draft) -> Vec<GateViolation> {
        self.gates.iter().filter_map(|rule| rule.check(draft)).collect()
    }

    /// Returns `true` when the forward gate holds for `draft`.
    #[must_use]
    pub fn forward_gate(&self, draft: &Draft) -> bool {
        self.gates.iter().all(|rule| rule.holds(draft))
    }
}

/// A hard dependency on another task instance's final record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDependency {
    /// The instance that must be completed first.
    pub instance: TaskInstance,
    /// Schema version of the dependency's final record.
    pub schema_version: u32,
}

/// Immutable description of a sub-task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinition {
    key: TaskKey,
    schema_version: u32,
    steps: Vec<Step>,
    dependency: Option<TaskDependency>,
}

impl TaskDefinition {
    /// Starts building a definition for `key`.
    #[must_use]
    pub const fn builder(key: TaskKey) -> TaskDefinitionBuilder {
        TaskDefinitionBuilder {
            key,
            schema_version: 1,
            steps: Vec::new(),
            dependency: None,
        }
    }

    /// Returns the definition key.
    #[must_use]
    pub const fn key(&self) -> &TaskKey {
        &self.key
    }

    /// Returns the schema version of final records for this definition.
    #[must_use]
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Returns the ordered steps.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the index of the last step.
    #[must_use]
    pub fn last_step(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Returns the step at `index`.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Returns the hard dependency, if any.
    #[must_use]
    pub const fn dependency(&self) -> Option<&TaskDependency> {
        self.dependency.as_ref()
    }

    /// Iterates over every field of every step in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &FieldName) -> Option<&FieldSchema> {
        self.fields().find(|field| field.name() == name)
    }

    /// Returns the fields disabled while `option` is selected in `field`.
    pub fn dependents_of<'a>(
        &'a self,
        field: &'a FieldName,
        option: &'a str,
    ) -> impl Iterator<Item = &'a FieldSchema> + 'a {
        self.fields().filter(move |candidate| {
            candidate
                .disabling_selection()
                .is_some_and(|selection| &selection.field == field && selection.option == option)
        })
    }

    /// Returns `true` when `Step(index)`'s forward gate holds.
    ///
    /// Steps outside the definition never hold.
    #[must_use]
    pub fn forward_gate(&self, index: usize, draft: &Draft) -> bool {
        self.step(index).is_some_and(|step| step.forward_gate(draft))
    }

    /// Returns `true` when every gate of steps `0..target` holds, meaning the
    /// wizard may show step `target`.
    #[must_use]
    pub fn can_reach(&self, target: usize, draft: &Draft) -> bool {
        target < self.steps.len()
            && self
                .steps
                .iter()
                .take(target)
                .all(|step| step.forward_gate(draft))
    }

    /// Returns `true` when every step's gate holds.
    #[must_use]
    pub fn can_finalize(&self, draft: &Draft) -> bool {
        self.steps.iter().all(|step| step.forward_gate(draft))
    }

    /// Returns the first step whose gate does not hold, with its violations.
    #[must_use]
    pub fn first_blocked_step(&self, draft: &Draft) -> Option<(usize, Vec<GateViolation>)> {
        self.steps.iter().enumerate().find_map(|(index, step)| {
            let violations = step.violations(draft);
            (!violations.is_empty()).then_some((index, violations))
        })
    }
}

/// Builder for [`TaskDefinition`] that validates the schema on `build`.
#[derive(Debug, Clone)]
pub struct TaskDefinitionBuilder {
    key: TaskKey,
    schema_version: u32,
    steps: Vec<Step>,
    dependency: Option<TaskDependency>,
}

impl TaskDefinitionBuilder {
    /// Sets the schema version of final records. Defaults to `1`.
    #[must_use]
    pub const fn schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Requires another instance's final record before the wizard can start.
    #[must_use]
    pub fn depends_on(mut self, instance: TaskInstance, schema_version: u32) -> Self {
        self.dependency = Some(TaskDependency {
            instance,
            schema_version,
        });
        self
    }

    /// Validates and builds the definition.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError`] when the definition has no steps,
    /// declares a field twice, or contains a gate or field dependency that
    /// references an unknown field, a mismatched field kind, or an option the
    /// field does not offer.
    pub fn build(self) -> Result<TaskDefinition, SubtaskDomainError> {
        let definition = TaskDefinition {
            key: self.key,
            schema_version: self.schema_version,
            steps: self.steps,
            dependency: self.dependency,
        };
        validate_definition(&definition)?;
        Ok(definition)
    }
}

fn validate_definition(definition: &TaskDefinition) -> Result<(), SubtaskDomainError> {
    if definition.steps.is_empty() {
        return Err(SubtaskDomainError::EmptyDefinition);
    }

    let mut seen = HashSet::new();
    for field in definition.fields() {
        if !seen.insert(field.name()) {
            return Err(SubtaskDomainError::DuplicateField(field.name().clone()));
        }
        if let Some(option) = field.exclusive_option() {
            require_option(field, option)?;
        }
        if let Some(selection) = field.disabling_selection() {
            let source = lookup(definition, &selection.field)?;
            require_kind(source, "multi-select")?;
            require_option(source, &selection.option)?;
        }
    }

    for rule in definition.steps.iter().flat_map(Step::gates) {
        for name in rule.fields() {
            let field = lookup(definition, name)?;
            require_kind(field, rule.expected_kind())?;
        }
        match rule {
            GateRule::ExclusiveOption { field, option } | GateRule::Equals { field, option } => {
                require_option(lookup(definition, field)?, option)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn lookup<'a>(
    definition: &'a TaskDefinition,
    name: &FieldName,
) -> Result<&'a FieldSchema, SubtaskDomainError> {
    definition
        .field(name)
        .ok_or_else(|| SubtaskDomainError::UnknownField(name.clone()))
}

fn require_kind(field: &FieldSchema, expected: &'static str) -> Result<(), SubtaskDomainError> {
    let actual = field.kind().name();
    if actual != expected {
        return Err(SubtaskDomainError::FieldKindMismatch {
            field: field.name().clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn require_option(field: &FieldSchema, option: &str) -> Result<(), SubtaskDomainError> {
    let offered = match field.kind() {
        FieldKind::SingleSelect { options } | FieldKind::MultiSelect { options, .. } => {
            options.iter().any(|candidate| candidate == option)
        }
        FieldKind::Text { .. } | FieldKind::Toggle => false,
    };
    if !offered {
        return Err(SubtaskDomainError::UnknownOption {
            field: field.name().clone(),
            option: option.to_owned(),
        });
    }
    Ok(())
}
