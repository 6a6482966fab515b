//! Services shared by front ends.

mod sync_context;

pub use sync_context::SyncContext;
