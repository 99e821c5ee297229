//! Async orchestration of one wizard: boot, navigation and finalize.

use super::reconciler::CrossTaskReconciler;
use crate::session::SessionSource;
use crate::subtask::{
    domain::{
        CompletionOutcome, FailureReason, FeatureNamespace, FieldEdit, FieldName, FinalRecord,
        RecordCodecError, RecordDecode, RecordKey, SubtaskDomainError, TaskDefinition,
        TaskDependency, TaskFinalized, TaskInstance, Wizard, WizardPhase, WizardView,
    },
    ports::{CompletionClient, LocalRecordStore, RecordStoreError},
};
use mockable::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::Semaphore;

/// Settings shared by every wizard of a feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardConfig {
    namespace: FeatureNamespace,
}

impl WizardConfig {
    /// Creates a configuration storing records under `namespace`.
    #[must_use]
    pub const fn new(namespace: FeatureNamespace) -> Self {
        Self { namespace }
    }

    /// Replaces the storage namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: FeatureNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Returns the storage namespace.
    #[must_use]
    pub const fn namespace(&self) -> &FeatureNamespace {
        &self.namespace
    }
}

/// Service-level errors for wizard operations.
#[derive(Debug, Error)]
pub enum WizardError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] SubtaskDomainError),
    /// The record store failed.
    #[error(transparent)]
    Store(#[from] RecordStoreError),
    /// The final record could not be serialized.
    #[error(transparent)]
    Codec(#[from] RecordCodecError),
    /// The wizard state lock was poisoned.
    #[error("wizard state unavailable: {0}")]
    StatePoisoned(String),
}

/// Result type for wizard service operations.
pub type WizardResult<T> = Result<T, WizardError>;

/// How boot resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// No final record: editing starts at the first step.
    Fresh,
    /// A final record exists: the task is read-only.
    Review,
    /// A required task has not been completed yet.
    Blocked(TaskDependency),
    /// The view was unmounted while the store read was pending.
    Detached,
}

/// How a finalize request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The claim was accepted (`Ok` or `AlreadyDone`) and the task is locked.
    Completed(CompletionOutcome),
    /// The claim failed; the draft is untouched and finalize may be retried.
    Failed(FailureReason),
    /// Another finalize is still running; nothing was done.
    InFlight,
    /// The view was unmounted while the claim was pending. Durable work has
    /// finished but the wizard state was not updated.
    Detached,
}

/// Drives a [`Wizard`] against the record store and completion service.
///
/// Finalize is guarded by a single-permit semaphore: a second request while
/// one is pending returns [`FinalizeOutcome::InFlight`] without any I/O.
/// The local record is written only after the completion service returned
/// a non-`Fail` outcome.
pub struct WizardController<R, C, S, K>
where
    R: LocalRecordStore,
    C: CompletionClient,
    S: SessionSource,
    K: Clock + Send + Sync,
{
    definition: Arc<TaskDefinition>,
    instance: TaskInstance,
    wizard: Mutex<Wizard>,
    store: Arc<R>,
    completion: Arc<C>,
    session: Arc<S>,
    clock: Arc<K>,
    reconciler: Option<Arc<CrossTaskReconciler<R, K>>>,
    config: WizardConfig,
    finalize_permit: Semaphore,
    mounted: AtomicBool,
}

impl<R, C, S, K> WizardController<R, C, S, K>
where
    R: LocalRecordStore,
    C: CompletionClient,
    S: SessionSource,
    K: Clock + Send + Sync,
{
    /// Mounts a wizard for `instance` of `definition` in the booting phase.
    #[must_use]
    pub fn new(
        definition: Arc<TaskDefinition>,
        instance: TaskInstance,
        store: Arc<R>,
        completion: Arc<C>,
        session: Arc<S>,
        clock: Arc<K>,
    ) -> Self {
        let wizard = Wizard::new(Arc::clone(&definition), instance.clone());
        Self {
            definition,
            instance,
            wizard: Mutex::new(wizard),
            store,
            completion,
            session,
            clock,
            reconciler: None,
            config: WizardConfig::default(),
            finalize_permit: Semaphore::new(1),
            mounted: AtomicBool::new(true),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    /// Publishes finalize events to `reconciler` and reconciles this
    /// instance's pending effects at boot.
    #[must_use]
    pub fn with_reconciler(mut self, reconciler: Arc<CrossTaskReconciler<R, K>>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    /// Returns the wizard's task instance.
    #[must_use]
    pub const fn instance(&self) -> &TaskInstance {
        &self.instance
    }

    /// Returns the store key of this instance's final record.
    #[must_use]
    pub fn record_key(&self) -> RecordKey {
        RecordKey::final_record(
            self.config.namespace(),
            &self.instance,
            self.definition.schema_version(),
        )
    }

    /// Reads the store and decides between `Fresh`, `Review` and `Blocked`.
    ///
    /// Calling boot again after it resolved returns the current phase
    /// without reading the store.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Store`] when the store cannot be read.
    pub async fn boot(&self) -> WizardResult<BootOutcome> {
        if let Some(resolved) = resolved_boot(self.lock()?.phase()) {
            return Ok(resolved);
        }
        tracing::debug!(instance = %self.instance, "booting wizard");

        if let Some(reconciler) = &self.reconciler
            && let Err(err) = reconciler.reconcile_target(&self.instance).await
        {
            tracing::warn!(
                instance = %self.instance,
                error = %err,
                "pending cross-task effects not applied"
            );
        }

        let own_key = self.record_key();
        let record = self
            .load_record(&own_key, self.definition.schema_version())
            .await?;
        let missing_dependency = match (&record, self.definition.dependency()) {
            (None, Some(dependency)) => {
                let key = RecordKey::final_record(
                    self.config.namespace(),
                    &dependency.instance,
                    dependency.schema_version,
                );
                self.load_record(&key, dependency.schema_version)
                    .await?
                    .is_none()
                    .then(|| dependency.clone())
            }
            _ => None,
        };

        if !self.is_mounted() {
            tracing::warn!(
                instance = %self.instance,
                "wizard unmounted during boot, skipping update"
            );
            return Ok(BootOutcome::Detached);
        }

        let mut wizard = self.lock()?;
        if let Some(resolved) = resolved_boot(wizard.phase()) {
            return Ok(resolved);
        }
        let outcome = match (record, missing_dependency) {
            (Some(record), _) => {
                wizard.lock_in(record)?;
                BootOutcome::Review
            }
            (None, Some(dependency)) => {
                wizard.block_on(dependency.clone())?;
                BootOutcome::Blocked(dependency)
            }
            (None, None) => {
                wizard.start_fresh()?;
                BootOutcome::Fresh
            }
        };
        tracing::info!(
            instance = %self.instance,
            phase = wizard.phase().as_str(),
            "wizard boot resolved"
        );
        Ok(outcome)
    }

    /// Applies an edit to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Domain`] when the edit is rejected.
    pub fn edit(&self, field: &FieldName, edit: FieldEdit) -> WizardResult<()> {
        Ok(self.lock()?.edit(field, edit)?)
    }

    /// Moves to the next step when the current gate holds.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Domain`] when the gate blocks the transition.
    pub fn advance(&self) -> WizardResult<usize> {
        Ok(self.lock()?.advance()?)
    }

    /// Moves to the previous step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Domain`] while booting or blocked.
    pub fn back(&self) -> WizardResult<usize> {
        Ok(self.lock()?.back()?)
    }

    /// Jumps to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Domain`] when the step is out of range or
    /// not yet reachable.
    pub fn go_to(&self, step: usize) -> WizardResult<usize> {
        Ok(self.lock()?.go_to(step)?)
    }

    /// Claims completion and, once acknowledged, writes the final record.
    ///
    /// On `Fail` the draft is untouched and nothing is stored. On `Ok` or
    /// `AlreadyDone` the record is written, cross-task effects are
    /// published and the wizard enters review. While the claim is pending,
    /// edits and navigation fail with
    /// [`SubtaskDomainError::FinalizeInFlight`].
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Domain`] when finalize is not allowed, and
    /// [`WizardError::Store`] or [`WizardError::Codec`] when the record
    /// cannot be written. After a store failure the wizard stays editable
    /// and a retry converges through `AlreadyDone`.
    pub async fn finalize(&self) -> WizardResult<FinalizeOutcome> {
        let Ok(_permit) = self.finalize_permit.try_acquire() else {
            tracing::warn!(
                instance = %self.instance,
                "finalize already in flight, ignoring request"
            );
            return Ok(FinalizeOutcome::InFlight);
        };

        let claim = self.lock()?.prepare_finalize()?;
        let _settle = SettleOnDrop(&self.wizard);
        let identity = self.session.current();
        tracing::debug!(instance = %self.instance, "dispatching completion claim");
        let outcome = self
            .completion
            .complete(self.definition.key(), identity.as_ref(), &claim.payload)
            .await;

        if let CompletionOutcome::Fail(reason) = &outcome {
            tracing::warn!(instance = %self.instance, reason = %reason, "completion claim failed");
            if !self.is_mounted() {
                return Ok(FinalizeOutcome::Detached);
            }
            return Ok(FinalizeOutcome::Failed(reason.clone()));
        }

        let record = FinalRecord::capture(
            self.instance.clone(),
            self.definition.schema_version(),
            &claim.draft,
            &*self.clock,
        );
        let key = self.record_key();
        tracing::debug!(key = %key, "writing final record");
        self.store.put(&key, record.encode()?).await?;
        tracing::info!(instance = %self.instance, outcome = ?outcome, "task finalized");

        if let Some(reconciler) = &self.reconciler {
            let event = TaskFinalized {
                record: record.clone(),
            };
            if let Err(err) = reconciler.apply_finalized(&event).await {
                tracing::warn!(
                    instance = %self.instance,
                    error = %err,
                    "cross-task effects deferred to the target's next boot"
                );
            }
        }

        if !self.is_mounted() {
            tracing::warn!(
                instance = %self.instance,
                "wizard unmounted during finalize, skipping update"
            );
            return Ok(FinalizeOutcome::Detached);
        }
        self.lock()?.lock_in(record)?;
        Ok(FinalizeOutcome::Completed(outcome))
    }

    /// Returns the current read model.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn view(&self) -> WizardResult<WizardView> {
        Ok(self.lock()?.view())
    }

    /// Returns the current phase.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn phase(&self) -> WizardResult<WizardPhase> {
        Ok(self.lock()?.phase().clone())
    }

    /// Detaches the view. Pending boot or finalize work completes but no
    /// longer updates the wizard.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    /// Returns `false` once [`Self::unmount`] has been called.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    async fn load_record(
        &self,
        key: &RecordKey,
        version: u32,
    ) -> WizardResult<Option<FinalRecord>> {
        tracing::debug!(key = %key, "reading final record");
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match FinalRecord::decode(&raw, version) {
            RecordDecode::Current(record) => Ok(Some(record)),
            RecordDecode::Stale { found } => {
                tracing::warn!(
                    key = %key,
                    expected = version,
                    found = ?found,
                    "discarding stale record"
                );
                Ok(None)
            }
            RecordDecode::Corrupt(reason) => {
                tracing::warn!(key = %key, reason = %reason, "discarding corrupt record");
                Ok(None)
            }
        }
    }

    fn lock(&self) -> WizardResult<MutexGuard<'_, Wizard>> {
        self.wizard
            .lock()
            .map_err(|err| WizardError::StatePoisoned(err.to_string()))
    }
}

fn resolved_boot(phase: &WizardPhase) -> Option<BootOutcome> {
    match phase {
        WizardPhase::Booting => None,
        WizardPhase::Fresh => Some(BootOutcome::Fresh),
        WizardPhase::Review => Some(BootOutcome::Review),
        WizardPhase::Blocked(dependency) => Some(BootOutcome::Blocked(dependency.clone())),
    }
}

/// Unfreezes the wizard when a finalize call ends, whichever way it ends.
struct SettleOnDrop<'a>(&'a Mutex<Wizard>);

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .settle_finalize();
    }
}
