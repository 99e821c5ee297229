//! Shared world state for wizard finalize BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use staircase::{
    session::{SessionIdentity, StaticSession},
    subtask::{
        adapters::memory::{InMemoryRecordStore, ScriptedCompletionClient},
        catalog,
        domain::TaskDefinition,
        services::{BootOutcome, FinalizeOutcome, WizardController, WizardError, WizardResult},
    },
};

/// Controller type used by the BDD world.
pub type TestController =
    WizardController<InMemoryRecordStore, ScriptedCompletionClient, StaticSession, DefaultClock>;

/// Scenario world for wizard finalize behaviour tests.
pub struct WizardWorld {
    pub store: Arc<InMemoryRecordStore>,
    pub client: Arc<ScriptedCompletionClient>,
    pub session: Arc<StaticSession>,
    pub definition: Option<Arc<TaskDefinition>>,
    pub controller: Option<TestController>,
    pub last_boot: Option<BootOutcome>,
    pub last_advance: Option<Result<usize, WizardError>>,
    pub last_finalize: Option<FinalizeOutcome>,
}

impl WizardWorld {
    /// Creates a signed-out world with empty adapters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryRecordStore::new()),
            client: Arc::new(ScriptedCompletionClient::new()),
            session: Arc::new(StaticSession::signed_out()),
            definition: None,
            controller: None,
            last_boot: None,
            last_advance: None,
            last_finalize: None,
        }
    }

    /// Signs the member in with a fixed test identity.
    pub fn sign_in(&mut self) -> Result<(), eyre::Report> {
        let identity = SessionIdentity::new("0501234567", "token-abc")?;
        self.session = Arc::new(StaticSession::signed_in(identity));
        Ok(())
    }

    /// Selects the commitment checklist as the scenario task.
    pub fn use_checklist(&mut self) -> Result<(), eyre::Report> {
        self.definition = Some(Arc::new(catalog::commitment_checklist()?));
        Ok(())
    }

    /// Mounts a new controller over the shared adapters.
    pub fn mount(&mut self) -> Result<&TestController, eyre::Report> {
        let definition = self
            .definition
            .clone()
            .ok_or_else(|| eyre::eyre!("missing task definition in scenario world"))?;
        let instance = catalog::instance(definition.key().as_str())?;
        let controller = WizardController::new(
            definition,
            instance,
            Arc::clone(&self.store),
            Arc::clone(&self.client),
            Arc::clone(&self.session),
            Arc::new(DefaultClock),
        );
        let mounted: &TestController = self.controller.insert(controller);
        Ok(mounted)
    }

    /// Returns the mounted controller.
    pub fn controller(&self) -> Result<&TestController, eyre::Report> {
        self.controller
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing mounted controller in scenario world"))
    }

    /// Records the result of an advance attempt.
    pub fn record_advance(&mut self, result: WizardResult<usize>) {
        self.last_advance = Some(result);
    }
}

impl Default for WizardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WizardWorld {
    WizardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
