use std::collections::HashMap;

use crate::models::{ItemId, ShoppingItem};
use crate::remote::sort_newest_first;

/// Union of the last remote snapshot and the local queue, keyed by id.
///
/// Queued copies shadow remote ones. The result is sorted newest
/// `created_at` first.
pub fn merge_for_display(remote: &[ShoppingItem], local: &[ShoppingItem]) -> Vec<ShoppingItem> {
    let mut merged: HashMap<&ItemId, &ShoppingItem> =
        remote.iter().map(|item| (&item.id, item)).collect();
    for item in local {
        merged.insert(&item.id, item);
    }

    let mut items: Vec<ShoppingItem> = merged.into_values().cloned().collect();
    sort_newest_first(&mut items);
    items
}
