//! PostgREST client for the Supabase-hosted item table.

use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{RemoteItemStore, RemoteResult};
use crate::auth::{AuthSession, SessionProvider};
use crate::config::BackendConfig;
use crate::error::RemoteError;
use crate::models::{ItemId, ShoppingItem};
use crate::util::compact_text;

/// `RemoteItemStore` backed by Supabase's REST API
#[derive(Clone)]
pub struct SupabaseItemStore<P> {
    table_url: String,
    anon_key: String,
    client: Client,
    session: P,
}

impl<P: SessionProvider> SupabaseItemStore<P> {
    pub fn new(config: &BackendConfig, session: P) -> RemoteResult<Self> {
        Ok(Self {
            table_url: format!("{}/rest/v1/{}", config.supabase_url, config.items_table),
            anon_key: config.anon_key.clone(),
            client: Client::builder().build()?,
            session,
        })
    }

    fn session(&self) -> RemoteResult<AuthSession> {
        self.session
            .current_session()
            .ok_or(RemoteError::NotAuthenticated)
    }

    fn authorized(&self, request: RequestBuilder) -> RemoteResult<RequestBuilder> {
        let session = self.session()?;
        Ok(request
            .header("apikey", &self.anon_key)
            .bearer_auth(session.access_token)
            .header("Accept", "application/json"))
    }
}

fn by_id(request: RequestBuilder, id: &ItemId) -> RequestBuilder {
    request.query(&[("id", format!("eq.{id}"))])
}

impl<P: SessionProvider> RemoteItemStore for SupabaseItemStore<P> {
    async fn list(&self) -> RemoteResult<Vec<ShoppingItem>> {
        let request = self.authorized(
            self.client
                .get(&self.table_url)
                .query(&[("select", "*"), ("order", "created_at.desc")]),
        )?;
        let response = checked(request.send().await?).await?;
        decode(response).await
    }

    async fn create(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem> {
        let session = self.session()?;
        let mut row = item.clone();
        row.touch(Utc::now());
        row.user_id = Some(session.user.id);

        let request = self.authorized(
            self.client
                .post(&self.table_url)
                .header("Prefer", "return=representation")
                .json(&row),
        )?;
        let response = checked(request.send().await?).await?;
        first_row(decode(response).await?, &row.id)
    }

    async fn update(&self, item: &ShoppingItem) -> RemoteResult<ShoppingItem> {
        let mut row = item.clone();
        row.touch(Utc::now());

        let request = self.authorized(
            by_id(self.client.patch(&self.table_url), &row.id)
                .header("Prefer", "return=representation")
                .json(&row),
        )?;
        let response = checked(request.send().await?).await?;
        first_row(decode(response).await?, &row.id)
    }

    async fn delete(&self, id: &ItemId) -> RemoteResult<()> {
        let request = self.authorized(
            by_id(self.client.delete(&self.table_url), id)
                .header("Prefer", "return=minimal"),
        )?;
        checked(request.send().await?).await?;
        Ok(())
    }
}

async fn checked(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!("Remote store rejected session: {}", compact_text(&body));
        return Err(RemoteError::NotAuthenticated);
    }
    Err(RemoteError::Api(parse_api_error(status, &body)))
}

async fn decode(response: Response) -> RemoteResult<Vec<ShoppingItem>> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|error| RemoteError::Decode(error.to_string()))
}

fn first_row(rows: Vec<ShoppingItem>, id: &ItemId) -> RemoteResult<ShoppingItem> {
    rows.into_iter()
        .next()
        .ok_or_else(|| RemoteError::NotFound(id.to_string()))
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.details).or(payload.hint) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
