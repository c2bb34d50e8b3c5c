use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    AnonymousAiResponse, ApiErrorBody, ConnectionTestResponse, ContextEntries, CreateEntryRequest,
    CreatedEntry, CsrfResponse, EntryDetail, EntryId, EntrySummary, HelpType,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::domain::authoring::{prepare_anonymous_request, prepare_entry};
use crate::error::{ClientError, ClientResult};
use crate::storage::{EntryStore, TokenStore};

pub const CSRF_HEADER: &str = "X-CSRFToken";

const ANONYMOUS_FORBIDDEN: &str =
    "Anonymous users can only use acute_validation or acute_skills. Please sign in for advanced features.";

/// API client for communicating with the journal backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        Self::build(config.base_url.clone(), config.request_timeout, tokens)
    }

    /// Create a client with a custom base URL and the default timeout
    pub fn with_base_url(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        Self::build(base_url.into(), Duration::from_secs(DEFAULT_TIMEOUT_SECS), tokens)
    }

    fn build(base_url: String, timeout: Duration, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        // The session cookie and the csrftoken cookie must survive between requests
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Unexpected(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Test connection to the backend
    pub async fn test_connection(&self) -> ClientResult<ConnectionTestResponse> {
        self.get_json("/api/test/").await
    }

    /// Fetches a fresh CSRF token; the matching cookie lands in the cookie store
    pub async fn csrf_token(&self) -> ClientResult<String> {
        let response: CsrfResponse = self.get_json("/api/csrf/").await?;
        Ok(response.csrf_token)
    }

    /// Stored access token, if any. An unreadable token file counts as signed out.
    pub(crate) fn access_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(tokens) => tokens.access_token,
            Err(error) => {
                warn!(error = %error, "failed to read stored tokens");
                None
            }
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.authorize(self.http.get(self.url(path)));
        let response = send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// POST with a CSRF token; `authorized` adds the bearer token when one is stored
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: Option<&B>, authorized: bool) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body, authorized).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn post<B>(&self, path: &str, body: Option<&B>, authorized: bool) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let csrf = self.csrf_token().await?;
        let mut request = self.http.post(self.url(path)).header(CSRF_HEADER, csrf);
        if let Some(body) = body {
            request = request.json(body);
        }
        if authorized {
            request = self.authorize(request);
        }
        send(request).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let csrf = self.csrf_token().await?;
        let request = self.authorize(self.http.delete(self.url(path)).header(CSRF_HEADER, csrf));
        send(request).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> ClientResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "backend responded");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

/// Maps a non-success status and its body to the client error taxonomy
pub fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let server_message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message().map(str::to_string));
    let message = server_message.unwrap_or_else(|| format!("{} returned by the journal service", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        _ => ClientError::Unexpected(format!("status {}: {}", status.as_u16(), body)),
    }
}

#[async_trait]
impl EntryStore for ApiClient {
    async fn list_entries(&self) -> ClientResult<Vec<EntrySummary>> {
        let entries: Vec<EntrySummary> = self.get_json("/api/journal-entries/").await?;
        debug!(count = entries.len(), "fetched journal entries");
        Ok(entries)
    }

    async fn get_entry(&self, id: EntryId) -> ClientResult<EntryDetail> {
        self.get_json(&format!("/api/journal-entries/{}/", id)).await
    }

    async fn delete_entry(&self, id: EntryId) -> ClientResult<()> {
        self.delete(&format!("/api/journal-entries/{}/", id)).await?;
        info!(entry_id = id, "deleted journal entry on the backend");
        Ok(())
    }

    async fn create_entry(&self, request: &CreateEntryRequest) -> ClientResult<CreatedEntry> {
        let request = prepare_entry(request)?;
        let created: CreatedEntry = self.post_json("/api/journal-entries/", Some(&request), true).await?;
        match &created {
            CreatedEntry::AiFailed(entry) => {
                warn!(entry_id = entry.id, ai_error = %entry.ai_error, "entry saved without an AI response")
            }
            _ => info!(entry_id = created.id(), "saved journal entry"),
        }
        Ok(created)
    }

    async fn request_anonymous_response(
        &self,
        content: &str,
        help_type: HelpType,
    ) -> ClientResult<AnonymousAiResponse> {
        let request = prepare_anonymous_request(content, help_type)?;
        self.post_json("/api/journal-entries/", Some(&request), false)
            .await
            .map_err(|error| match error {
                ClientError::Auth(_) => ClientError::Auth(ANONYMOUS_FORBIDDEN.to_string()),
                other => other,
            })
    }

    async fn context_entries(&self, id: EntryId) -> ClientResult<ContextEntries> {
        self.get_json(&format!("/api/journal-entries/{}/context_entries/", id)).await
    }
}
