pub mod add;
pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod list;
pub mod mark;
pub mod status;
pub mod sync;
pub mod watch;
