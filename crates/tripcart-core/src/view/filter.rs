use serde::{Deserialize, Serialize};

use crate::models::ShoppingItem;

/// Gallery filters over a rendered list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    pub liked_only: bool,
    pub purchased_only: bool,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ItemFilter {
    pub fn matches(&self, item: &ShoppingItem) -> bool {
        if self.liked_only && !item.liked {
            return false;
        }
        if self.purchased_only && !item.purchased {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => item.matches_name(query),
            _ => true,
        }
    }

    /// Keep matching items in order, up to `limit`.
    pub fn apply<'a>(&self, items: &'a [ShoppingItem]) -> Vec<&'a ShoppingItem> {
        items
            .iter()
            .filter(|item| self.matches(item))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}
