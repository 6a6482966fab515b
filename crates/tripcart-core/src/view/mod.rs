//! What the user sees: merged lists, filters and optimistic edits.
//!
//! Nothing here talks to a store. The sync context feeds these types with
//! remote snapshots and queued items and asks them for the list to show.

mod command;
mod filter;
mod merge;

pub use command::OptimisticUpdate;
pub use filter::ItemFilter;
pub use merge::merge_for_display;

use crate::models::{ItemId, ShoppingItem};
use crate::remote::sort_newest_first;

/// In-memory list of displayed items, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemView {
    items: Vec<ShoppingItem>,
}

impl ItemView {
    pub fn new(items: Vec<ShoppingItem>) -> Self {
        let mut view = Self::default();
        view.replace_all(items);
        view
    }

    pub fn replace_all(&mut self, mut items: Vec<ShoppingItem>) {
        sort_newest_first(&mut items);
        self.items = items;
    }

    /// Replace the entry with the same id, or insert keeping the order.
    ///
    /// Returns the entry that was replaced.
    pub fn upsert(&mut self, item: ShoppingItem) -> Option<ShoppingItem> {
        if let Some(existing) = self.items.iter_mut().find(|existing| existing.id == item.id) {
            return Some(std::mem::replace(existing, item));
        }
        let position = self
            .items
            .iter()
            .position(|existing| existing.created_at < item.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(position, item);
        None
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<ShoppingItem> {
        let position = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(position))
    }

    pub fn get(&self, id: &ItemId) -> Option<&ShoppingItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
