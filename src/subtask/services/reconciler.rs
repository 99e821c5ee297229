//! Retry-safe application of cross-task effects.
//!
//! An origin's final record is the durable form of its `TaskFinalized`
//! event, so every pending effect can be re-derived from stored origin
//! records. Redaction is idempotent, which makes re-running any of the
//! entry points safe after an interruption.

use crate::subtask::{
    domain::{
        CrossTaskEffect, FeatureNamespace, FieldName, FinalRecord, RecordCodecError, RecordDecode,
        RecordKey, TaskFinalized, TaskInstance,
    },
    ports::{LocalRecordStore, RecordStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while applying cross-task effects.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Reading or writing a record failed.
    #[error(transparent)]
    Store(#[from] RecordStoreError),
    /// A patched record could not be serialized.
    #[error(transparent)]
    Codec(#[from] RecordCodecError),
}

/// Result type for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Fields cleared in one target record by one reconciler pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRedaction {
    /// The patched instance.
    pub target: TaskInstance,
    /// The instance whose record triggered the patch.
    pub origin: TaskInstance,
    /// Fields cleared by this pass.
    pub fields: Vec<FieldName>,
}

/// Applies declared [`CrossTaskEffect`]s to target records.
pub struct CrossTaskReconciler<R, K>
where
    R: LocalRecordStore,
    K: Clock + Send + Sync,
{
    store: Arc<R>,
    clock: Arc<K>,
    namespace: FeatureNamespace,
    effects: Vec<CrossTaskEffect>,
}

impl<R, K> CrossTaskReconciler<R, K>
where
    R: LocalRecordStore,
    K: Clock + Send + Sync,
{
    /// Creates a reconciler with no effects.
    #[must_use]
    pub const fn new(store: Arc<R>, clock: Arc<K>, namespace: FeatureNamespace) -> Self {
        Self {
            store,
            clock,
            namespace,
            effects: Vec::new(),
        }
    }

    /// Registers an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: CrossTaskEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Returns the registered effects.
    #[must_use]
    pub fn effects(&self) -> &[CrossTaskEffect] {
        &self.effects
    }

    /// Applies every effect triggered by a freshly written origin record.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when a target cannot be read or written.
    /// Effects processed before the failure stay applied.
    pub async fn apply_finalized(
        &self,
        event: &TaskFinalized,
    ) -> ReconcileResult<Vec<AppliedRedaction>> {
        let mut applied = Vec::new();
        for effect in &self.effects {
            if effect.triggered_by(&event.record) {
                applied.extend(self.patch(effect).await?);
            }
        }
        Ok(applied)
    }

    /// Re-derives and applies the effects aimed at `target` from the stored
    /// origin records.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when a record cannot be read or written.
    pub async fn reconcile_target(
        &self,
        target: &TaskInstance,
    ) -> ReconcileResult<Vec<AppliedRedaction>> {
        let mut applied = Vec::new();
        for effect in self.effects.iter().filter(|effect| effect.target() == target) {
            applied.extend(self.reconcile_effect(effect).await?);
        }
        Ok(applied)
    }

    /// Re-derives and applies every registered effect.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when a record cannot be read or written.
    pub async fn reconcile_all(&self) -> ReconcileResult<Vec<AppliedRedaction>> {
        let mut applied = Vec::new();
        for effect in &self.effects {
            applied.extend(self.reconcile_effect(effect).await?);
        }
        Ok(applied)
    }

    async fn reconcile_effect(
        &self,
        effect: &CrossTaskEffect,
    ) -> ReconcileResult<Option<AppliedRedaction>> {
        let Some(origin) = self
            .load(effect.origin(), effect.origin_version())
            .await?
        else {
            return Ok(None);
        };
        if !effect.triggered_by(&origin) {
            return Ok(None);
        }
        self.patch(effect).await
    }

    async fn patch(&self, effect: &CrossTaskEffect) -> ReconcileResult<Option<AppliedRedaction>> {
        let Some(mut target) = self
            .load(effect.target(), effect.target_version())
            .await?
        else {
            tracing::debug!(
                origin = %effect.origin(),
                target = %effect.target(),
                "effect target has no record, nothing to redact"
            );
            return Ok(None);
        };
        let cleared = target.redact(effect.redacted_fields(), effect.origin(), &*self.clock);
        if cleared.is_empty() {
            return Ok(None);
        }
        let key = self.key(effect.target(), effect.target_version());
        self.store.put(&key, target.encode()?).await?;
        tracing::info!(
            origin = %effect.origin(),
            target = %effect.target(),
            fields = cleared.len(),
            "cross-task redaction applied"
        );
        Ok(Some(AppliedRedaction {
            target: effect.target().clone(),
            origin: effect.origin().clone(),
            fields: cleared,
        }))
    }

    async fn load(
        &self,
        instance: &TaskInstance,
        version: u32,
    ) -> ReconcileResult<Option<FinalRecord>> {
        let key = self.key(instance, version);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match FinalRecord::decode(&raw, version) {
            RecordDecode::Current(record) => Ok(Some(record)),
            RecordDecode::Stale { found } => {
                tracing::warn!(
                    key = %key,
                    expected = version,
                    found = ?found,
                    "ignoring stale record"
                );
                Ok(None)
            }
            RecordDecode::Corrupt(reason) => {
                tracing::warn!(key = %key, reason = %reason, "ignoring corrupt record");
                Ok(None)
            }
        }
    }

    fn key(&self, instance: &TaskInstance, version: u32) -> RecordKey {
        RecordKey::final_record(&self.namespace, instance, version)
    }
}
