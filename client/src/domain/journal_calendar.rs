//! # Journal Calendar
//!
//! Ties month navigation, aggregation and the selection flow together over
//! one entry store. This is what a history screen drives:
//! open → navigate → select a day → read or delete → back to the grid.

use shared::{EntryId, NavigationDirection};
use std::sync::Arc;
use tracing::info;

use crate::domain::month_view::{MonthNavigator, MonthViewState};
use crate::domain::selection::SelectionFlow;
use crate::error::{ClientError, ClientResult};
use crate::storage::EntryStore;

pub struct JournalCalendar {
    store: Arc<dyn EntryStore>,
    navigator: MonthNavigator,
    selection: SelectionFlow,
}

impl JournalCalendar {
    pub fn new(store: Arc<dyn EntryStore>, navigator: MonthNavigator) -> Self {
        Self {
            store,
            navigator,
            selection: SelectionFlow::new(),
        }
    }

    pub fn view(&self) -> &MonthViewState {
        self.navigator.view()
    }

    pub fn navigator(&self) -> &MonthNavigator {
        &self.navigator
    }

    pub fn selection(&self) -> &SelectionFlow {
        &self.selection
    }

    /// Most relevant error for a banner: the selection's, then the month's
    pub fn error_message(&self) -> Option<&str> {
        self.selection
            .error_message()
            .or_else(|| self.navigator.error_message())
    }

    /// Loads the current month. On failure the empty grid stays viewable and
    /// the load error is returned.
    pub async fn open(&mut self) -> ClientResult<()> {
        self.navigator.load(self.store.as_ref()).await;
        match self.navigator.load_error() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub async fn next_month(&mut self) -> bool {
        self.change_month(NavigationDirection::Next).await
    }

    pub async fn previous_month(&mut self) -> bool {
        self.change_month(NavigationDirection::Previous).await
    }

    /// Any open detail belongs to the old month and is closed first
    async fn change_month(&mut self, direction: NavigationDirection) -> bool {
        self.selection.close();
        self.navigator.go(direction, self.store.as_ref()).await
    }

    /// Opens the entry shown on `day` of the current month.
    ///
    /// An empty day of a month whose list failed to load reports the load
    /// error, not a missing entry.
    pub async fn select_day(&mut self, day: u32) -> ClientResult<()> {
        let entry = match self.navigator.view().entry_for_day(day) {
            Some(entry) => entry.clone(),
            None => {
                return Err(match self.navigator.load_error() {
                    Some(error) => error.clone(),
                    None => ClientError::Validation(format!("There is no entry on day {}", day)),
                })
            }
        };
        self.selection.select(&entry, self.store.as_ref()).await
    }

    pub fn close_detail(&mut self) {
        self.selection.close();
    }

    /// Deletes the open entry and rebuilds the month from a fresh fetch
    pub async fn delete_selected(&mut self) -> ClientResult<EntryId> {
        let entry_id = self.selection.delete(self.store.as_ref()).await?;
        info!(entry_id, "refreshing month after delete");
        self.navigator.load(self.store.as_ref()).await;
        Ok(entry_id)
    }
}
