use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tripcart_core::auth::{AuthSession, SessionHandle, SessionProvider};
use tripcart_core::config::{BackendConfig, ClientConfig};
use tripcart_core::connectivity::HttpProbe;
use tripcart_core::db::LibSqlLocalStorage;
use tripcart_core::remote::{RemoteItemStore, RemoteResult, SupabaseItemStore};
use tripcart_core::{ItemId, RemoteError, ShoppingItem, SyncContext};

use crate::auth::SupabaseAuthService;
use crate::cli::GlobalArgs;
use crate::config_profiles::{default_db_path, CliProfilesConfig};
use crate::error::CliError;

/// Remote side of the CLI: Supabase when a backend is configured.
pub enum Backend {
    Supabase(SupabaseItemStore<SessionHandle>),
    Detached,
}

impl Backend {
    fn detached<T>() -> RemoteResult<T> {
        Err(RemoteError::Unavailable(
            "no backend configured".to_string(),
        ))
    }
}

impl RemoteItemStore for Backend {
    async fn list(&self) -> RemoteResult<Vec<ShoppingItem>> {
        match self {
            Self::Supabase(store) => store.list().await,
            Self::Detached => Self::detached(),
        }
    }

    async fn create(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem> {
        match self {
            Self::Supabase(store) => store.create(item).await,
            Self::Detached => Self::detached(),
        }
    }

    async fn update(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem> {
        match self {
            Self::Supabase(store) => store.update(item).await,
            Self::Detached => Self::detached(),
        }
    }

    async fn delete(&self, id: &ItemId) -> RemoteResult<()> {
        match self {
            Self::Supabase(store) => store.delete(id).await,
            Self::Detached => Self::detached(),
        }
    }
}

pub type CliContext = SyncContext<Backend, LibSqlLocalStorage>;

/// Everything a command needs: the sync context plus what it was built from.
pub struct App {
    pub context: CliContext,
    pub profile_name: String,
    pub backend: Option<BackendConfig>,
    pub signed_in: bool,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("TRIPCART_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

/// Open the context for the selected profile and load the view.
pub async fn open_app(global: &GlobalArgs) -> Result<App, CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global.profile.as_deref());
    let client_config = config.client_config(&profile_name);
    let db_path = resolve_db_path(global.db_path.clone());
    open_app_with(&db_path, profile_name, &client_config, global.offline).await
}

pub async fn open_app_with(
    db_path: &Path,
    profile_name: String,
    client_config: &ClientConfig,
    force_offline: bool,
) -> Result<App, CliError> {
    let backend = client_config.backend().map_err(CliError::Config)?;
    let storage = LibSqlLocalStorage::open(db_path).await?;
    let session = SessionHandle::default();

    let (remote, online) = match &backend {
        Some(backend) => {
            session.set(restore_session(&profile_name, backend).await);
            let online = !force_offline && probe(backend).await;
            let store = SupabaseItemStore::new(backend, session.clone())?;
            (Backend::Supabase(store), online)
        }
        None => {
            tracing::debug!("No backend configured; working offline");
            (Backend::Detached, false)
        }
    };

    let signed_in = session.current_user_id().is_some();
    let context = SyncContext::new(remote, storage, session, online);
    context.refresh().await;

    Ok(App {
        context,
        profile_name,
        backend,
        signed_in,
    })
}

async fn restore_session(
    profile_name: &str,
    backend: &BackendConfig,
) -> Option<AuthSession> {
    let service = match SupabaseAuthService::new(profile_name, backend) {
        Ok(service) => service,
        Err(error) => {
            tracing::warn!("Auth client unavailable: {}", error);
            return None;
        }
    };
    match service.restore_session().await {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!("Failed to restore session for '{}': {}", profile_name, error);
            None
        }
    }
}

pub async fn probe(backend: &BackendConfig) -> bool {
    match HttpProbe::new(&backend.supabase_url) {
        Ok(probe) => probe.is_online().await,
        Err(error) => {
            tracing::warn!("Failed to build connectivity probe: {}", error);
            false
        }
    }
}

pub fn normalize_item_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyItemId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Resolve a full id or a unique id prefix against `items`.
pub fn resolve_item_id(query: &str, items: &[ShoppingItem]) -> Result<ItemId, CliError> {
    let query = normalize_item_identifier(query)?;
    if let Some(item) = items.iter().find(|item| item.id.as_str() == query) {
        return Ok(item.id.clone());
    }

    let matching = items
        .iter()
        .filter(|item| item.id.as_str().starts_with(&query))
        .map(|item| &item.id)
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::ItemNotFound(query)),
        [id] => Ok((*id).clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousItemId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Items in the view plus queued ones the view does not show
pub async fn known_items(context: &CliContext) -> Vec<ShoppingItem> {
    let mut items = context.items().await;
    for queued in context.pending().await {
        if !items.iter().any(|item| item.id == queued.id) {
            items.push(queued);
        }
    }
    items
}

pub fn short_id(id: &ItemId) -> String {
    id.as_str().chars().take(13).collect()
}

pub fn format_price(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

pub fn format_item_price(item: &ShoppingItem) -> String {
    let original = format_price(item.price_original, &item.original_currency);
    if item.original_currency == item.converted_currency {
        original
    } else {
        format!(
            "{original} ({})",
            format_price(item.price_converted, &item.converted_currency)
        )
    }
}

fn item_flags(item: &ShoppingItem, pending: bool) -> String {
    let mut flags = Vec::new();
    if item.liked {
        flags.push("liked");
    }
    if item.purchased {
        flags.push("purchased");
    }
    if pending {
        flags.push("queued");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!("[{}]", flags.join(", "))
    }
}

pub fn item_preview(name: &str, max_chars: usize) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_item_lines(items: &[ShoppingItem], pending: &[ItemId]) -> Vec<String> {
    let now = Utc::now();
    items
        .iter()
        .map(|item| {
            let id = short_id(&item.id);
            let name = item_preview(&item.name, 30);
            let price = format_item_price(item);
            let relative_time = format_relative_time(item.updated_at, now);
            let flags = item_flags(item, pending.contains(&item.id));

            if flags.is_empty() {
                format!("{id:<13}  {name:<30}  {price:<24}  {relative_time}")
            } else {
                format!("{id:<13}  {name:<30}  {price:<24}  {relative_time:<10}  {flags}")
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ItemListEntry {
    #[serde(flatten)]
    pub item: ShoppingItem,
    pub pending: bool,
    pub relative_time: String,
}

pub fn item_to_list_entry(item: &ShoppingItem, pending: bool) -> ItemListEntry {
    ItemListEntry {
        item: item.clone(),
        pending,
        relative_time: format_relative_time(item.updated_at, Utc::now()),
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(at).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
