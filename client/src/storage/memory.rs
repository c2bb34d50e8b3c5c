//! In-memory adapters for the storage ports.
//!
//! `MemoryEntryStore` behaves like the remote journal service for a single
//! signed-in user and can be told to fail the next call of an operation,
//! which is how the calendar and selection flows are exercised in tests.

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    AnonymousAiResponse, ContextEntries, CreateEntryRequest, CreatedEntry, EntryDetail, EntryId,
    EntrySummary, HelpType,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::authoring::{prepare_anonymous_request, prepare_entry};
use crate::error::{ClientError, ClientResult};
use crate::storage::traits::{EntryStore, StoredTokens, TokenStore};

/// Operations of `EntryStore` that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Get,
    Delete,
    Create,
}

#[derive(Default)]
struct MemoryState {
    entries: Vec<EntryDetail>,
    next_id: EntryId,
    pending_failures: HashMap<StoreOperation, ClientError>,
    calls: HashMap<StoreOperation, usize>,
    anonymous_reply: Option<String>,
}

impl MemoryState {
    fn record(&mut self, operation: StoreOperation) -> ClientResult<()> {
        *self.calls.entry(operation).or_insert(0) += 1;
        match self.pending_failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryEntryStore {
    state: Mutex<MemoryState>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<EntryDetail>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// Adds an entry as-is, keeping its id
    pub fn insert(&self, entry: EntryDetail) {
        let mut state = self.state();
        state.next_id = state.next_id.max(entry.id);
        state.entries.push(entry);
    }

    /// Makes the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: StoreOperation, error: ClientError) {
        self.state().pending_failures.insert(operation, error);
    }

    /// Text returned for anonymous AI requests; unset means generation is unavailable
    pub fn set_anonymous_reply(&self, reply: impl Into<String>) {
        self.state().anonymous_reply = Some(reply.into());
    }

    pub fn call_count(&self, operation: StoreOperation) -> usize {
        self.state().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn list_entries(&self) -> ClientResult<Vec<EntrySummary>> {
        let mut state = self.state();
        state.record(StoreOperation::List)?;

        let mut entries: Vec<&EntryDetail> = state.entries.iter().collect();
        // Same ordering as the backend listing: newest first
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries.into_iter().map(EntryDetail::summary).collect())
    }

    async fn get_entry(&self, id: EntryId) -> ClientResult<EntryDetail> {
        let mut state = self.state();
        state.record(StoreOperation::Get)?;
        state
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Entry {} not found", id)))
    }

    async fn delete_entry(&self, id: EntryId) -> ClientResult<()> {
        let mut state = self.state();
        state.record(StoreOperation::Delete)?;
        let before = state.entries.len();
        state.entries.retain(|entry| entry.id != id);
        if state.entries.len() == before {
            return Err(ClientError::NotFound(format!("Entry {} not found", id)));
        }
        Ok(())
    }

    async fn create_entry(&self, request: &CreateEntryRequest) -> ClientResult<CreatedEntry> {
        let request = prepare_entry(request)?;
        let mut state = self.state();
        state.record(StoreOperation::Create)?;

        state.next_id += 1;
        let detail = EntryDetail {
            id: state.next_id,
            title: request.title,
            content: request.content,
            requested_help_type: request.requested_help_type,
            is_continuation: request.is_continuation.unwrap_or(false),
            references_past_entries: request.references_past_entries.unwrap_or(false),
            created_at: Utc::now().fixed_offset(),
            context_window_size: request
                .requested_help_type
                .map(|help_type| help_type.context_window_size())
                .unwrap_or(0),
            ai_interaction: None,
        };
        state.entries.push(detail.clone());
        Ok(CreatedEntry::Saved(detail))
    }

    async fn request_anonymous_response(
        &self,
        content: &str,
        help_type: HelpType,
    ) -> ClientResult<AnonymousAiResponse> {
        prepare_anonymous_request(content, help_type)?;
        let state = self.state();
        let reply = state
            .anonymous_reply
            .clone()
            .ok_or_else(|| ClientError::Unexpected("AI generation is not available".to_string()))?;
        Ok(AnonymousAiResponse {
            message: "Response generated".to_string(),
            ai_response: reply,
            tokens_used: 0,
            estimated_cost: 0.0,
            help_type,
        })
    }

    async fn context_entries(&self, id: EntryId) -> ClientResult<ContextEntries> {
        let state = self.state();
        let entry = state
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Entry {} not found", id)))?;

        let window = entry
            .requested_help_type
            .map(|help_type| help_type.context_window_size())
            .unwrap_or(0);

        let mut earlier: Vec<&EntryDetail> = state
            .entries
            .iter()
            .filter(|other| other.created_at < entry.created_at)
            .collect();
        earlier.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let entries: Vec<EntrySummary> = earlier
            .into_iter()
            .take(window as usize)
            .map(EntryDetail::summary)
            .collect();

        Ok(ContextEntries {
            context_window_size: window,
            actual_entries_count: entries.len() as u32,
            entries,
        })
    }
}

/// Token storage that lives as long as the process
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> anyhow::Result<StoredTokens> {
        Ok(self.tokens.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, tokens: &StoredTokens) -> anyhow::Result<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.save(&StoredTokens::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn entry(id: EntryId, created_at: &str, help_type: Option<HelpType>) -> EntryDetail {
        EntryDetail {
            id,
            title: Some(format!("Entry {}", id)),
            content: format!("Content of entry {}", id),
            requested_help_type: help_type,
            is_continuation: false,
            references_past_entries: false,
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
            context_window_size: 0,
            ai_interaction: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryEntryStore::with_entries(vec![
            entry(1, "2024-03-01T09:00:00Z", None),
            entry(2, "2024-03-09T09:00:00Z", None),
            entry(3, "2024-03-05T09:00:00Z", None),
        ]);

        let ids: Vec<EntryId> = store.list_entries().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(store.call_count(StoreOperation::List), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = MemoryEntryStore::with_entries(vec![entry(1, "2024-03-01T09:00:00Z", None)]);
        store.fail_next(StoreOperation::Get, ClientError::Network("offline".to_string()));

        assert!(matches!(store.get_entry(1).await, Err(ClientError::Network(_))));
        assert!(store.get_entry(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_entry() {
        let store = MemoryEntryStore::new();
        assert!(matches!(store.delete_entry(42).await, Err(ClientError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let store = MemoryEntryStore::with_entries(vec![entry(7, "2024-03-01T09:00:00Z", None)]);
        let request = CreateEntryRequest {
            content: "  New thoughts  ".to_string(),
            requested_help_type: Some(HelpType::MaxValidation),
            ..CreateEntryRequest::default()
        };

        let created = store.create_entry(&request).await.unwrap();
        assert_eq!(created.id(), 8);
        let detail = store.get_entry(8).await.unwrap();
        assert_eq!(detail.content, "New thoughts");
        assert_eq!(detail.context_window_size, 30);
    }

    #[tokio::test]
    async fn test_context_entries_respect_window() {
        let store = MemoryEntryStore::with_entries(vec![
            entry(1, "2024-03-01T09:00:00Z", None),
            entry(2, "2024-03-02T09:00:00Z", None),
            entry(3, "2024-03-03T09:00:00Z", Some(HelpType::AcuteSkills)),
            entry(4, "2024-03-04T09:00:00Z", Some(HelpType::ChronicValidation)),
        ]);

        let acute = store.context_entries(3).await.unwrap();
        assert_eq!(acute.context_window_size, 0);
        assert!(acute.entries.is_empty());

        let chronic = store.context_entries(4).await.unwrap();
        assert_eq!(chronic.context_window_size, 7);
        assert_eq!(chronic.actual_entries_count, 3);
        assert_eq!(chronic.entries[0].id, 3);
    }

    #[tokio::test]
    async fn test_anonymous_reply() {
        let store = MemoryEntryStore::new();
        assert!(matches!(
            store.request_anonymous_response("hello", HelpType::AcuteValidation).await,
            Err(ClientError::Unexpected(_))
        ));

        store.set_anonymous_reply("I hear you.");
        let reply = store
            .request_anonymous_response("hello", HelpType::AcuteValidation)
            .await
            .unwrap();
        assert_eq!(reply.ai_response, "I hear you.");
    }

    #[test]
    fn test_memory_token_store() {
        let store = MemoryTokenStore::new();
        let tokens = StoredTokens {
            access_token: Some("access".to_string()),
            refresh_token: None,
        };
        store.save(&tokens).unwrap();
        assert_eq!(store.load().unwrap(), tokens);
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), StoredTokens::default());
    }
}
