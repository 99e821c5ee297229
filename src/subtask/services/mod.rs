//! Application services for wizard orchestration and cross-task effects.

mod reconciler;
mod wizard;

pub use reconciler::{AppliedRedaction, CrossTaskReconciler, ReconcileError, ReconcileResult};
pub use wizard::{
    BootOutcome, FinalizeOutcome, WizardConfig, WizardController, WizardError, WizardResult,
};
