//! Application services for task ownership and reconciliation.

mod ownership;
mod reconciliation;
mod store;

pub use ownership::{OwnershipError, OwnershipResult, OwnershipService, TransitionOutcome};
pub use reconciliation::{
    ConfirmOutcome, MergeOutcome, ReconcileError, Reconciler, RollbackOutcome, SnapshotSummary,
};
pub use store::{PendingWriteId, TaskRecordStore};
