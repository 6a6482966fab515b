use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tripcart_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Item ID cannot be empty")]
    EmptyItemId,
    #[error("Item not found for id/prefix: {0}")]
    ItemNotFound(String),
    #[error("{0}")]
    AmbiguousItemId(String),
    #[error("--rate is required when converting from {from} to {to}")]
    MissingRate { from: String, to: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Cannot sync while offline")]
    Offline,
    #[error(
        "Backend is not configured. Run `tripcart config init` + `tripcart auth login`, or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    BackendNotConfigured,
}

impl From<tripcart_core::RemoteError> for CliError {
    fn from(error: tripcart_core::RemoteError) -> Self {
        Self::Core(error.into())
    }
}
