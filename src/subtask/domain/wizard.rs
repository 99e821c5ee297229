//! Wizard aggregate: the gated step state machine of one task instance.
//!
//! ```text
//! Booting ──► Fresh(step) ──finalize ok/already-done──► Review
//!    │            ▲  │
//!    │            └──┘ advance (gate) / back / go_to
//!    ├──────────────────────────────────────────────────► Review
//!    └──► Blocked (dependency missing)
//! ```
//!
//! While a completion claim is pending the wizard is frozen: edits,
//! navigation and a second claim are rejected until the claim settles.
//!
//! The aggregate is synchronous and performs no I/O; the wizard service
//! drives it from store reads and completion outcomes.

use super::{
    CompletionPayload, Draft, FieldEdit, FieldName, FieldValue, FinalRecord, GateViolation,
    SubtaskDomainError, TaskDefinition, TaskDependency, TaskInstance,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lifecycle phase of a wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    /// Waiting for the boot-time store read.
    Booting,
    /// Editable, not yet completed.
    Fresh,
    /// Completed and permanently read-only.
    Review,
    /// Cannot start until the dependency has been completed.
    Blocked(TaskDependency),
}

impl WizardPhase {
    /// Returns a short name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Fresh => "fresh",
            Self::Review => "review",
            Self::Blocked(_) => "blocked",
        }
    }
}

/// Everything needed to claim completion for the current draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeClaim {
    /// The draft snapshot the final record will hold.
    pub draft: Draft,
    /// The audit projection sent to the completion service.
    pub payload: CompletionPayload,
}

/// Read model of a wizard for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardView {
    /// Current phase.
    pub phase: WizardPhase,
    /// Visible step index.
    pub step: usize,
    /// Number of steps.
    pub step_count: usize,
    /// Current field values.
    pub values: BTreeMap<FieldName, FieldValueView>,
    /// Whether each step may be shown (step pills).
    pub reachable: Vec<bool>,
    /// Whether "continue" is enabled.
    pub can_advance: bool,
    /// Whether "finish" is enabled.
    pub can_finalize: bool,
    /// Violations of the visible step's gate.
    pub violations: Vec<GateViolation>,
    /// Completion timestamp once in review.
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether a completion claim is pending.
    pub finalizing: bool,
}

/// Value and enablement of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValueView {
    /// Current value.
    pub value: FieldValue,
    /// Whether the control accepts input.
    pub enabled: bool,
    /// Whether a cross-task effect cleared the stored value.
    pub redacted: bool,
}

/// Gated multi-step state machine over a [`Draft`].
#[derive(Debug, Clone)]
pub struct Wizard {
    definition: Arc<TaskDefinition>,
    instance: TaskInstance,
    phase: WizardPhase,
    draft: Draft,
    record: Option<FinalRecord>,
    finalizing: bool,
}

impl Wizard {
    /// Creates a wizard in [`WizardPhase::Booting`].
    #[must_use]
    pub fn new(definition: Arc<TaskDefinition>, instance: TaskInstance) -> Self {
        let draft = Draft::new(&definition);
        Self {
            definition,
            instance,
            phase: WizardPhase::Booting,
            draft,
            record: None,
            finalizing: false,
        }
    }

    /// Returns the task definition.
    #[must_use]
    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    /// Returns the task instance.
    #[must_use]
    pub const fn instance(&self) -> &TaskInstance {
        &self.instance
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    /// Returns the draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Returns the visible step index.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.draft.step()
    }

    /// Returns the final record once in review.
    #[must_use]
    pub const fn record(&self) -> Option<&FinalRecord> {
        self.record.as_ref()
    }

    /// Returns `true` once the task is locked in review.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self.phase, WizardPhase::Review)
    }

    /// Returns `true` while a completion claim is pending.
    #[must_use]
    pub const fn is_finalizing(&self) -> bool {
        self.finalizing
    }

    /// Enters `Fresh` at the first step with an empty draft.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::ReadOnly`] when the wizard is not
    /// booting.
    pub fn start_fresh(&mut self) -> Result<(), SubtaskDomainError> {
        self.require_booting()?;
        self.draft = Draft::new(&self.definition);
        self.phase = WizardPhase::Fresh;
        Ok(())
    }

    /// Enters `Blocked` because `dependency` has no final record.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::ReadOnly`] when the wizard is not
    /// booting.
    pub fn block_on(&mut self, dependency: TaskDependency) -> Result<(), SubtaskDomainError> {
        self.require_booting()?;
        self.phase = WizardPhase::Blocked(dependency);
        Ok(())
    }

    /// Enters `Review`, hydrating the draft from `record` and showing the
    /// last (summary) step.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::ReadOnly`] when already in review and
    /// [`SubtaskDomainError::Blocked`] when blocked on a dependency.
    pub fn lock_in(&mut self, record: FinalRecord) -> Result<(), SubtaskDomainError> {
        match &self.phase {
            WizardPhase::Booting | WizardPhase::Fresh => {}
            WizardPhase::Review => return Err(SubtaskDomainError::ReadOnly),
            WizardPhase::Blocked(dependency) => {
                return Err(SubtaskDomainError::Blocked(dependency.instance.clone()));
            }
        }
        let mut draft = Draft::hydrate(&self.definition, record.fields());
        draft.move_to(self.definition.last_step());
        self.draft = draft;
        self.record = Some(record);
        self.phase = WizardPhase::Review;
        self.finalizing = false;
        Ok(())
    }

    /// Applies an edit to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::ReadOnly`] in review, the phase error
    /// when not editable, or the draft's own validation error.
    pub fn edit(&mut self, field: &FieldName, edit: FieldEdit) -> Result<(), SubtaskDomainError> {
        self.require_fresh()?;
        self.draft.apply(&self.definition, field, edit)
    }

    /// Moves to the next step when the current step's gate holds.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::GateBlocked`] when the gate does not
    /// hold, [`SubtaskDomainError::StepOutOfRange`] on the last step, or the
    /// phase error when not editable.
    pub fn advance(&mut self) -> Result<usize, SubtaskDomainError> {
        self.require_fresh()?;
        let current = self.draft.step();
        let next = current + 1;
        if next >= self.definition.step_count() {
            return Err(SubtaskDomainError::StepOutOfRange {
                step: next,
                count: self.definition.step_count(),
            });
        }
        self.require_gate(current)?;
        self.draft.move_to(next);
        Ok(next)
    }

    /// Moves to the previous step without re-validating. A no-op on the
    /// first step.
    ///
    /// # Errors
    ///
    /// Returns the phase error while booting or blocked.
    pub fn back(&mut self) -> Result<usize, SubtaskDomainError> {
        self.require_viewable()?;
        self.require_settled()?;
        let previous = self.draft.step().saturating_sub(1);
        self.draft.move_to(previous);
        Ok(previous)
    }

    /// Jumps to `target`.
    ///
    /// While fresh, jumping back is always allowed and jumping forward
    /// requires every gate before `target` to hold. In review every step can
    /// be viewed.
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::StepOutOfRange`],
    /// [`SubtaskDomainError::GateBlocked`] for the first failing step, or the
    /// phase error while booting or blocked.
    pub fn go_to(&mut self, target: usize) -> Result<usize, SubtaskDomainError> {
        self.require_viewable()?;
        self.require_settled()?;
        let count = self.definition.step_count();
        if target >= count {
            return Err(SubtaskDomainError::StepOutOfRange {
                step: target,
                count,
            });
        }
        if !self.is_read_only() && target > self.draft.step() {
            for step in 0..target {
                self.require_gate(step)?;
            }
        }
        self.draft.move_to(target);
        Ok(target)
    }

    /// Checks that the wizard may finalize, builds the claim and freezes
    /// the wizard until [`Wizard::settle_finalize`] or [`Wizard::lock_in`].
    ///
    /// # Errors
    ///
    /// Returns [`SubtaskDomainError::NotOnLastStep`] before the last step,
    /// [`SubtaskDomainError::GateBlocked`] for the first step whose gate
    /// does not hold, [`SubtaskDomainError::FinalizeInFlight`] while a
    /// claim is pending, or the phase error when not editable.
    pub fn prepare_finalize(&mut self) -> Result<FinalizeClaim, SubtaskDomainError> {
        self.require_fresh()?;
        if self.draft.step() != self.definition.last_step() {
            return Err(SubtaskDomainError::NotOnLastStep);
        }
        if let Some((step, violations)) = self.definition.first_blocked_step(&self.draft) {
            return Err(SubtaskDomainError::GateBlocked { step, violations });
        }
        self.finalizing = true;
        Ok(FinalizeClaim {
            draft: self.draft.clone(),
            payload: CompletionPayload::project(&self.definition, &self.draft),
        })
    }

    /// Unfreezes the wizard after a claim that did not lock it in. The
    /// draft and step are left as they were when the claim was prepared.
    pub const fn settle_finalize(&mut self) {
        self.finalizing = false;
    }

    /// Returns `true` when "continue" is enabled on the current step.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        matches!(self.phase, WizardPhase::Fresh)
            && !self.finalizing
            && self.draft.step() < self.definition.last_step()
            && self.definition.forward_gate(self.draft.step(), &self.draft)
    }

    /// Returns `true` when "finish" is enabled.
    #[must_use]
    pub fn can_finalize(&self) -> bool {
        matches!(self.phase, WizardPhase::Fresh)
            && !self.finalizing
            && self.draft.step() == self.definition.last_step()
            && self.definition.can_finalize(&self.draft)
    }

    /// Returns `true` when the control for `field` accepts input.
    #[must_use]
    pub fn is_field_enabled(&self, field: &FieldName) -> bool {
        matches!(self.phase, WizardPhase::Fresh)
            && !self.finalizing
            && self
                .definition
                .field(field)
                .is_some_and(|schema| !self.draft.is_disabled(schema))
    }

    /// Builds the read model.
    #[must_use]
    pub fn view(&self) -> WizardView {
        let values = self
            .draft
            .values()
            .iter()
            .map(|(name, value)| {
                let redacted = self
                    .record
                    .as_ref()
                    .is_some_and(|record| record.is_redacted(name));
                let field = FieldValueView {
                    value: value.clone(),
                    enabled: self.is_field_enabled(name),
                    redacted,
                };
                (name.clone(), field)
            })
            .collect();
        let reachable = (0..self.definition.step_count())
            .map(|step| self.is_reachable(step))
            .collect();
        let violations = match self.phase {
            WizardPhase::Fresh => self
                .definition
                .step(self.draft.step())
                .map(|step| step.violations(&self.draft))
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        WizardView {
            phase: self.phase.clone(),
            step: self.draft.step(),
            step_count: self.definition.step_count(),
            values,
            reachable,
            can_advance: self.can_advance(),
            can_finalize: self.can_finalize(),
            violations,
            completed_at: self.record.as_ref().map(FinalRecord::completed_at),
            finalizing: self.finalizing,
        }
    }

    fn is_reachable(&self, step: usize) -> bool {
        match self.phase {
            WizardPhase::Review => true,
            WizardPhase::Fresh => {
                step <= self.draft.step() || self.definition.can_reach(step, &self.draft)
            }
            WizardPhase::Booting | WizardPhase::Blocked(_) => false,
        }
    }

    fn require_gate(&self, step: usize) -> Result<(), SubtaskDomainError> {
        let violations = self
            .definition
            .step(step)
            .map(|candidate| candidate.violations(&self.draft))
            .unwrap_or_default();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SubtaskDomainError::GateBlocked { step, violations })
        }
    }

    fn require_booting(&self) -> Result<(), SubtaskDomainError> {
        match self.phase {
            WizardPhase::Booting => Ok(()),
            _ => Err(SubtaskDomainError::ReadOnly),
        }
    }

    const fn require_settled(&self) -> Result<(), SubtaskDomainError> {
        if self.finalizing {
            Err(SubtaskDomainError::FinalizeInFlight)
        } else {
            Ok(())
        }
    }

    fn require_fresh(&self) -> Result<(), SubtaskDomainError> {
        match &self.phase {
            WizardPhase::Fresh => self.require_settled(),
            WizardPhase::Booting => Err(SubtaskDomainError::NotBooted),
            WizardPhase::Review => Err(SubtaskDomainError::ReadOnly),
            WizardPhase::Blocked(dependency) => {
                Err(SubtaskDomainError::Blocked(dependency.instance.clone()))
            }
        }
    }

    fn require_viewable(&self) -> Result<(), SubtaskDomainError> {
        match &self.phase {
            WizardPhase::Fresh | WizardPhase::Review => Ok(()),
            WizardPhase::Booting => Err(SubtaskDomainError::NotBooted),
            WizardPhase::Blocked(dependency) => {
                Err(SubtaskDomainError::Blocked(dependency.instance.clone()))
            }
        }
    }
}
