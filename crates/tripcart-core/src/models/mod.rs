//! Data models for Tripcart

mod currency;
mod item;
mod report;

pub use currency::{convert, normalize_currency_code, validate_price, validate_rate};
pub use item::{ItemId, ItemPatch, NewShoppingItem, ShoppingItem};
pub use report::SyncReport;
