//! Selection and detail flow for a clicked calendar day.
//!
//! ```text
//! Idle ──select──▶ FetchingDetail ──ok──▶ DetailShown
//!  ▲                    │                     │
//!  └──────error─────────┘      close / deleted┘
//! ```
//!
//! Each transition is split into a `begin_*` and a `complete_*` half so the
//! state is observable while a request is in flight; `select` and `delete`
//! drive both halves against an `EntryStore`.

use shared::{EntryDetail, EntryId, EntrySummary};
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::storage::EntryStore;

/// Placed between the entry content and the AI response in the detail payload
pub const RESPONSE_SEPARATOR: &str = "\n\n---\n\n";

/// Entry content, then the AI response when one was recorded
pub fn display_payload(detail: &EntryDetail) -> String {
    match detail.ai_response() {
        Some(response) if !response.trim().is_empty() => {
            format!("{}{}{}", detail.content, RESPONSE_SEPARATOR, response)
        }
        _ => detail.content.clone(),
    }
}

/// An opened entry ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub detail: EntryDetail,
    pub payload: String,
}

impl DetailView {
    pub fn new(detail: EntryDetail) -> Self {
        let payload = display_payload(&detail);
        Self { detail, payload }
    }

    pub fn title(&self) -> &str {
        self.detail.title.as_deref().unwrap_or("Journal Entry")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Idle,
    FetchingDetail { entry_id: EntryId },
    DetailShown(DetailView),
}

#[derive(Debug)]
pub struct SelectionFlow {
    state: SelectionState,
    deleting: bool,
    error_message: Option<String>,
}

impl Default for SelectionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionFlow {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
            deleting: false,
            error_message: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn detail(&self) -> Option<&DetailView> {
        match &self.state {
            SelectionState::DetailShown(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SelectionState::Idle)
    }

    /// A detail fetch or a delete is in flight
    pub fn is_busy(&self) -> bool {
        self.deleting || matches!(self.state, SelectionState::FetchingDetail { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Idle → FetchingDetail for the clicked entry
    pub fn begin_select(&mut self, entry: &EntrySummary) -> ClientResult<EntryId> {
        match self.state {
            SelectionState::Idle => {
                self.state = SelectionState::FetchingDetail { entry_id: entry.id };
                self.error_message = None;
                Ok(entry.id)
            }
            SelectionState::FetchingDetail { .. } => Err(ClientError::Validation(
                "An entry is already being opened".to_string(),
            )),
            SelectionState::DetailShown(_) => Err(ClientError::Validation(
                "Close the open entry before selecting another day".to_string(),
            )),
        }
    }

    /// FetchingDetail → DetailShown on success, → Idle with an error otherwise
    pub fn complete_select(&mut self, entry_id: EntryId, result: ClientResult<EntryDetail>) -> ClientResult<()> {
        match self.state {
            SelectionState::FetchingDetail { entry_id: pending } if pending == entry_id => {}
            _ => {
                warn!(entry_id, "ignoring detail for an entry that is no longer being opened");
                return Ok(());
            }
        }

        match result {
            Ok(detail) => {
                info!(entry_id, has_ai_response = detail.ai_interaction.is_some(), "opened journal entry");
                self.state = SelectionState::DetailShown(DetailView::new(detail));
                Ok(())
            }
            Err(error) => {
                warn!(entry_id, %error, "failed to open journal entry");
                self.state = SelectionState::Idle;
                self.error_message = Some(error.user_message());
                Err(error)
            }
        }
    }

    pub async fn select(&mut self, entry: &EntrySummary, store: &dyn EntryStore) -> ClientResult<()> {
        let entry_id = self.begin_select(entry)?;
        let result = store.get_entry(entry_id).await;
        self.complete_select(entry_id, result)
    }

    /// DetailShown → Idle
    pub fn close(&mut self) {
        if !self.deleting {
            self.state = SelectionState::Idle;
            self.error_message = None;
        }
    }

    /// Marks the shown entry as being deleted and returns its id
    pub fn begin_delete(&mut self) -> ClientResult<EntryId> {
        if self.deleting {
            return Err(ClientError::Validation("A delete is already in progress".to_string()));
        }
        match &self.state {
            SelectionState::DetailShown(view) => {
                self.deleting = true;
                self.error_message = None;
                Ok(view.detail.id)
            }
            _ => Err(ClientError::Validation("No journal entry is open".to_string())),
        }
    }

    /// On success the detail closes; on failure it stays open with an error
    pub fn complete_delete(&mut self, entry_id: EntryId, result: ClientResult<()>) -> ClientResult<()> {
        self.deleting = false;
        match result {
            Ok(()) => {
                info!(entry_id, "deleted journal entry");
                self.state = SelectionState::Idle;
                Ok(())
            }
            Err(error) => {
                warn!(entry_id, %error, "failed to delete journal entry");
                self.error_message = Some(error.user_message());
                Err(error)
            }
        }
    }

    pub async fn delete(&mut self, store: &dyn EntryStore) -> ClientResult<EntryId> {
        let entry_id = self.begin_delete()?;
        let result = store.delete_entry(entry_id).await;
        self.complete_delete(entry_id, result)?;
        Ok(entry_id)
    }
}
