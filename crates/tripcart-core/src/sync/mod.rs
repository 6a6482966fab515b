//! Reconciliation of the local queue against the remote item store.

mod engine;
mod resolve;

pub use engine::reconcile;
pub use resolve::{resolve, Resolution};
