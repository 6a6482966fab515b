//! Remote item store: row CRUD over the current user's shopping items.

mod memory;
mod supabase;

pub use memory::{MemoryItemStore, RemoteCall};
pub use supabase::SupabaseItemStore;

use crate::error::RemoteError;
use crate::models::{ItemId, ShoppingItem};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// CRUD against the hosted item table.
///
/// `create` and `update` stamp `updated_at` with the write time before
/// sending; `create` also attaches the signed-in user as owner.
#[allow(async_fn_in_trait)]
pub trait RemoteItemStore {
    /// All of the user's items, newest `created_at` first
    async fn list(&self) -> RemoteResult<Vec<ShoppingItem>>;

    /// Insert `item` and return the stored row
    async fn create(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem>;

    /// Overwrite the row with `item.id` and return the stored row
    async fn update(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem>;

    /// Delete the row with `id`
    async fn delete(&self, id: &ItemId) -> RemoteResult<()>;
}

/// Sort newest `created_at` first, the order `list` promises.
pub fn sort_newest_first(items: &mut [ShoppingItem]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
