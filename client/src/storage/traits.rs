//! # Storage Traits
//!
//! Ports through which the domain layer reaches the remote journal service
//! and the local token storage. The HTTP `ApiClient` and the in-memory
//! adapters implement them interchangeably.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{
    AnonymousAiResponse, ContextEntries, CreateEntryRequest, CreatedEntry, EntryDetail, EntryId,
    EntrySummary, HelpType, LoginCredentials, RegisterCredentials, User,
};

use crate::error::ClientResult;

/// Journal entry operations offered by the backend
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries of the signed-in user, newest first
    async fn list_entries(&self) -> ClientResult<Vec<EntrySummary>>;

    /// Full record of one entry; `NotFound` if missing or not owned by the caller
    async fn get_entry(&self, id: EntryId) -> ClientResult<EntryDetail>;

    async fn delete_entry(&self, id: EntryId) -> ClientResult<()>;

    /// Save an entry for the signed-in user, generating an AI response when requested
    async fn create_entry(&self, request: &CreateEntryRequest) -> ClientResult<CreatedEntry>;

    /// AI response for an anonymous user; nothing is saved
    async fn request_anonymous_response(
        &self,
        content: &str,
        help_type: HelpType,
    ) -> ClientResult<AnonymousAiResponse>;

    /// Entries the backend would use as model context for `id`
    async fn context_entries(&self, id: EntryId) -> ClientResult<ContextEntries>;
}

/// Session operations of the authentication collaborator
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<User>;

    async fn register(&self, credentials: &RegisterCredentials) -> ClientResult<User>;

    async fn logout(&self) -> ClientResult<()>;

    /// Current user of the stored session; `None` when there is no valid session
    async fn check_session_status(&self) -> ClientResult<Option<User>>;
}

/// Tokens handed out by login/signup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Local key-value persistence for session tokens
pub trait TokenStore: Send + Sync {
    fn load(&self) -> anyhow::Result<StoredTokens>;

    fn save(&self, tokens: &StoredTokens) -> anyhow::Result<()>;

    /// Remove both tokens
    fn clear(&self) -> anyhow::Result<()>;
}
