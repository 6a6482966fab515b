//! Client configuration.
//!
//! `ClientConfig` names the hosted backend (Supabase project URL, public anon
//! key, items table); `SyncSettings` tunes the reconciliation loop. Both are
//! plain serde structs so front ends can persist them however they like.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{normalize_base_url, normalize_text_option};

/// Default PostgREST table holding shopping items
pub const DEFAULT_ITEMS_TABLE: &str = "shopping_items";

/// Default delay before the single retry of a failed sync pass
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Backend endpoints and public keys.
///
/// Only safe-to-ship values belong here; session tokens are kept by the
/// front end's `SessionPersistence`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default)]
    pub items_table: Option<String>,
}

/// Validated backend settings ready to build clients from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub items_table: String,
}

impl ClientConfig {
    /// Fill unset values from `SUPABASE_URL`, `SUPABASE_ANON_KEY` and
    /// `TRIPCART_ITEMS_TABLE`.
    #[must_use]
    pub fn with_env_fallback(self) -> Self {
        Self {
            supabase_url: normalize_text_option(self.supabase_url)
                .or_else(|| normalize_text_option(std::env::var("SUPABASE_URL").ok())),
            supabase_anon_key: normalize_text_option(self.supabase_anon_key)
                .or_else(|| normalize_text_option(std::env::var("SUPABASE_ANON_KEY").ok())),
            items_table: normalize_text_option(self.items_table)
                .or_else(|| normalize_text_option(std::env::var("TRIPCART_ITEMS_TABLE").ok())),
        }
    }

    pub fn items_table(&self) -> String {
        normalize_text_option(self.items_table.clone())
            .unwrap_or_else(|| DEFAULT_ITEMS_TABLE.to_string())
    }

    /// Validate into a `BackendConfig`; `Ok(None)` when no backend is set.
    pub fn backend(&self) -> Result<Option<BackendConfig>, String> {
        let url = normalize_text_option(self.supabase_url.clone());
        let anon_key = normalize_text_option(self.supabase_anon_key.clone());

        match (url, anon_key) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => Ok(Some(BackendConfig {
                supabase_url: normalize_base_url(&url, "supabase_url")?,
                anon_key,
                items_table: self.items_table(),
            })),
            (Some(_), None) => Err("supabase_anon_key is required with supabase_url".to_string()),
            (None, Some(_)) => Err("supabase_url is required with supabase_anon_key".to_string()),
        }
    }
}

/// Tuning knobs of the sync context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Delay before the one retry of a pass whose snapshot fetch failed
    pub retry_delay: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl SyncSettings {
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}
