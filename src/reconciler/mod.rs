//! Per-page state and the mutation-driven reconciliation loop.

pub mod index;
pub mod pending;
pub mod reconciler;

pub use index::{FieldIndex, is_field_capable};
pub use pending::PendingQueue;
pub use reconciler::{PageState, ReconcileReport, Reconciler};
