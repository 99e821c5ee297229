//! Shared world state for letter release BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use staircase::{
    session::{SessionIdentity, StaticSession},
    subtask::{
        adapters::memory::{InMemoryRecordStore, ScriptedCompletionClient},
        catalog,
        domain::{FeatureNamespace, FieldEdit, FieldName, FinalRecord, TaskDefinition},
        ports::LocalRecordStore,
        services::{BootOutcome, CrossTaskReconciler, FinalizeOutcome, WizardController},
    },
};

/// Controller type used by the BDD world.
pub type TestController =
    WizardController<InMemoryRecordStore, ScriptedCompletionClient, StaticSession, DefaultClock>;

/// Reconciler type used by the BDD world.
pub type TestReconciler = CrossTaskReconciler<InMemoryRecordStore, DefaultClock>;

/// Scenario world for letter release behaviour tests.
pub struct LetterWorld {
    pub store: Arc<InMemoryRecordStore>,
    pub client: Arc<ScriptedCompletionClient>,
    pub session: Arc<StaticSession>,
    pub reconciler: Arc<TestReconciler>,
    pub writing: Arc<TaskDefinition>,
    pub closing: Arc<TaskDefinition>,
    pub last_boot: Option<BootOutcome>,
}

impl LetterWorld {
    /// Creates a signed-in world with the letter tasks and release effect.
    pub fn new() -> Result<Self, eyre::Report> {
        let store = Arc::new(InMemoryRecordStore::new());
        let reconciler = CrossTaskReconciler::new(
            Arc::clone(&store),
            Arc::new(DefaultClock),
            FeatureNamespace::default(),
        )
        .with_effect(catalog::letter_release_effect()?);
        Ok(Self {
            store,
            client: Arc::new(ScriptedCompletionClient::new()),
            session: Arc::new(StaticSession::signed_in(SessionIdentity::new(
                "0501234567",
                "token-abc",
            )?)),
            reconciler: Arc::new(reconciler),
            writing: Arc::new(catalog::letter_writing()?),
            closing: Arc::new(catalog::letter_closing()?),
            last_boot: None,
        })
    }

    /// Mounts a controller for `definition`, optionally wired to the
    /// reconciler.
    pub fn mount(
        &self,
        definition: &Arc<TaskDefinition>,
        reconciling: bool,
    ) -> Result<TestController, eyre::Report> {
        let controller = WizardController::new(
            Arc::clone(definition),
            catalog::instance(definition.key().as_str())?,
            Arc::clone(&self.store),
            Arc::clone(&self.client),
            Arc::clone(&self.session),
            Arc::new(DefaultClock),
        );
        if reconciling {
            return Ok(controller.with_reconciler(Arc::clone(&self.reconciler)));
        }
        Ok(controller)
    }

    /// Runs the closing ritual with `choice` through to completion.
    pub fn close_letter(&self, choice: &str, reconciling: bool) -> Result<(), eyre::Report> {
        let ritual = self.mount(&self.closing, reconciling)?;
        let booted = run_async(ritual.boot())?;
        if booted != BootOutcome::Fresh {
            return Err(eyre::eyre!("closing ritual did not start fresh: {booted:?}"));
        }
        ritual.edit(
            &FieldName::new(catalog::CLOSING_CHOICE)?,
            FieldEdit::Choose(choice.to_owned()),
        )?;
        ritual.advance()?;
        ritual.edit(
            &FieldName::new(catalog::FINAL_CONFIRM)?,
            FieldEdit::SetFlag(true),
        )?;
        match run_async(ritual.finalize())? {
            FinalizeOutcome::Completed(_) => Ok(()),
            other => Err(eyre::eyre!("closing ritual did not complete: {other:?}")),
        }
    }

    /// Reads the stored letter record.
    pub fn letter_record(&self) -> Result<FinalRecord, eyre::Report> {
        let key = self.mount(&self.writing, false)?.record_key();
        let raw = run_async(self.store.get(&key))?
            .ok_or_else(|| eyre::eyre!("no letter record stored"))?;
        FinalRecord::decode(&raw, catalog::CATALOG_SCHEMA_VERSION)
            .into_current()
            .ok_or_else(|| eyre::eyre!("letter record is not current"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LetterWorld {
    LetterWorld::new().expect("letter world should build")
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
