//! On-device storage for Tripcart

mod connection;
mod local_storage;
mod migrations;

pub use connection::Database;
pub use local_storage::{LibSqlLocalStorage, LocalStorage, MemoryLocalStorage};
