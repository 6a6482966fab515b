//! tripcart-core - Core library for Tripcart
//!
//! This crate contains the shopping-item model, the offline cache, the remote
//! item store client, and the reconciliation logic used by every Tripcart
//! interface.

pub mod auth;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;
pub mod view;

pub use error::{Error, RemoteError, Result, SyncError};
pub use models::{ItemId, ItemPatch, NewShoppingItem, ShoppingItem, SyncReport};
pub use services::SyncContext;
pub use state::SyncStatus;
