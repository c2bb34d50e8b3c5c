//! # Month View Module
//!
//! Owns the reference date of the calendar and the month view computed for
//! it. Every change of the reference date, and every refresh, starts a new
//! load identified by a generation number; a list response that arrives for
//! an older generation is dropped so a slow fetch can never overwrite the
//! month the user navigated to afterwards.

use chrono::{Datelike, FixedOffset, NaiveDate};
use shared::{CalendarMonth, EntrySummary, NavigationDirection};
use tracing::{debug, info, warn};

use crate::domain::calendar::{
    advance_month, aggregate_entries, aggregate_entries_in, generate_calendar_month, month_name,
    EntriesByDay,
};
use crate::error::{ClientError, ClientResult};
use crate::storage::EntryStore;

/// Aggregated, grid-ready representation of one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthViewState {
    pub reference_date: NaiveDate,
    pub entries_by_day: EntriesByDay,
    pub calendar: CalendarMonth,
}

impl MonthViewState {
    /// Reads entry timestamps in the process-local time zone
    pub fn compute(entries: &[EntrySummary], reference_date: NaiveDate) -> Self {
        Self::from_days(reference_date, aggregate_entries(entries, reference_date))
    }

    pub fn compute_in(entries: &[EntrySummary], reference_date: NaiveDate, zone: &FixedOffset) -> Self {
        Self::from_days(reference_date, aggregate_entries_in(entries, reference_date, zone))
    }

    pub fn empty(reference_date: NaiveDate) -> Self {
        Self::from_days(reference_date, EntriesByDay::new())
    }

    fn from_days(reference_date: NaiveDate, entries_by_day: EntriesByDay) -> Self {
        let calendar = generate_calendar_month(reference_date, &entries_by_day);
        Self {
            reference_date,
            entries_by_day,
            calendar,
        }
    }

    pub fn entry_for_day(&self, day: u32) -> Option<&EntrySummary> {
        self.entries_by_day.get(&day)
    }

    pub fn entry_count(&self) -> usize {
        self.entries_by_day.len()
    }

    /// e.g. "March 2024"
    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.reference_date.month()), self.reference_date.year())
    }

    fn same_month(&self, date: NaiveDate) -> bool {
        self.reference_date.year() == date.year() && self.reference_date.month() == date.month()
    }
}

/// Identifies one list fetch started by the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub reference_date: NaiveDate,
}

/// Navigation controller: reference date, current month view and load status
#[derive(Debug)]
pub struct MonthNavigator {
    reference_date: NaiveDate,
    generation: u64,
    view: MonthViewState,
    loading: bool,
    load_error: Option<ClientError>,
    error_message: Option<String>,
    zone: Option<FixedOffset>,
}

impl MonthNavigator {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            generation: 0,
            view: MonthViewState::empty(reference_date),
            loading: false,
            load_error: None,
            error_message: None,
            zone: None,
        }
    }

    /// Starts at today's date in the local time zone
    pub fn starting_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Reads entry timestamps at a fixed offset instead of the local zone
    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn view(&self) -> &MonthViewState {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Error of the latest applied load, cleared by the next successful one
    pub fn load_error(&self) -> Option<&ClientError> {
        self.load_error.as_ref()
    }

    /// Starts a reload of the current month
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
            reference_date: self.reference_date,
        }
    }

    /// Moves the reference date one month and starts loading it
    pub fn navigate(&mut self, direction: NavigationDirection) -> LoadTicket {
        self.reference_date = advance_month(self.reference_date, direction);
        info!(
            month = self.reference_date.month(),
            year = self.reference_date.year(),
            ?direction,
            "navigated calendar"
        );
        self.begin_load()
    }

    /// Applies the outcome of a list fetch.
    ///
    /// Returns `false` when the ticket is stale and the result was dropped.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: ClientResult<Vec<EntrySummary>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "dropping entry list for an outdated navigation"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(entries) => {
                self.view = match &self.zone {
                    Some(zone) => MonthViewState::compute_in(&entries, ticket.reference_date, zone),
                    None => MonthViewState::compute(&entries, ticket.reference_date),
                };
                self.load_error = None;
                self.error_message = None;
                info!(
                    fetched = entries.len(),
                    shown = self.view.entry_count(),
                    month = %self.view.title(),
                    "month view rebuilt"
                );
            }
            Err(error) => {
                warn!(%error, "failed to load journal entries");
                // A failed refresh keeps the stale grid; a failed navigation shows the new month empty
                if !self.view.same_month(ticket.reference_date) {
                    self.view = MonthViewState::empty(ticket.reference_date);
                }
                self.error_message = Some(error.user_message());
                self.load_error = Some(error);
            }
        }
        true
    }

    /// Fetches the entry list and rebuilds the view for the current month
    pub async fn load(&mut self, store: &dyn EntryStore) -> bool {
        let ticket = self.begin_load();
        let result = store.list_entries().await;
        self.complete_load(ticket, result)
    }

    pub async fn go(&mut self, direction: NavigationDirection, store: &dyn EntryStore) -> bool {
        let ticket = self.navigate(direction);
        let result = store.list_entries().await;
        self.complete_load(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::storage::{MemoryEntryStore, StoreOperation};
    use chrono::DateTime;
    use shared::EntryDetail;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn summary(id: i64, created_at: &str) -> EntrySummary {
        EntrySummary {
            id,
            title: None,
            content_preview: format!("Preview {}", id),
            requested_help_type: None,
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
        }
    }

    fn detail(id: i64, created_at: &str) -> EntryDetail {
        EntryDetail {
            id,
            title: None,
            content: format!("Content {}", id),
            requested_help_type: None,
            is_continuation: false,
            references_past_entries: false,
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
            context_window_size: 0,
            ai_interaction: None,
        }
    }

    #[test]
    fn test_complete_load_builds_view() {
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());
        let ticket = navigator.begin_load();
        assert!(navigator.is_loading());

        let applied = navigator.complete_load(
            ticket,
            Ok(vec![summary(1, "2024-03-05T10:00:00Z"), summary(2, "2024-04-02T10:00:00Z")]),
        );

        assert!(applied);
        assert!(!navigator.is_loading());
        assert_eq!(navigator.view().entry_count(), 1);
        assert_eq!(navigator.view().entry_for_day(5).map(|e| e.id), Some(1));
        assert_eq!(navigator.view().title(), "March 2024");
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());
        let march = navigator.begin_load();
        let april = navigator.navigate(NavigationDirection::Next);

        // April answers first, then the slow March response arrives
        assert!(navigator.complete_load(april, Ok(vec![summary(2, "2024-04-02T10:00:00Z")])));
        assert!(!navigator.complete_load(march, Ok(vec![summary(1, "2024-03-05T10:00:00Z")])));

        assert_eq!(navigator.reference_date(), date(2024, 4, 15));
        assert_eq!(navigator.view().reference_date, date(2024, 4, 15));
        assert_eq!(navigator.view().entry_for_day(2).map(|e| e.id), Some(2));
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());
        let first = navigator.begin_load();
        let _second = navigator.navigate(NavigationDirection::Previous);

        navigator.complete_load(first, Ok(vec![]));
        assert!(navigator.is_loading());
    }

    #[test]
    fn test_failed_refresh_keeps_stale_grid() {
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());
        let ticket = navigator.begin_load();
        navigator.complete_load(ticket, Ok(vec![summary(1, "2024-03-05T10:00:00Z")]));

        let ticket = navigator.begin_load();
        navigator.complete_load(ticket, Err(ClientError::Network("offline".to_string())));

        assert_eq!(navigator.view().entry_count(), 1);
        assert!(navigator.error_message().is_some());
        assert_eq!(navigator.load_error(), Some(&ClientError::Network("offline".to_string())));
    }

    #[test]
    fn test_failed_navigation_shows_empty_month() {
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());
        let ticket = navigator.begin_load();
        navigator.complete_load(ticket, Ok(vec![summary(1, "2024-03-05T10:00:00Z")]));

        let ticket = navigator.navigate(NavigationDirection::Next);
        navigator.complete_load(ticket, Err(ClientError::Auth("401".to_string())));

        assert_eq!(navigator.view().reference_date, date(2024, 4, 15));
        assert_eq!(navigator.view().entry_count(), 0);
        assert_eq!(navigator.view().calendar.slots.len(), 1 + 30);
        assert!(navigator.error_message().unwrap().contains("not signed in"));
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());
        let ticket = navigator.begin_load();
        navigator.complete_load(ticket, Err(ClientError::Network("offline".to_string())));
        assert!(navigator.error_message().is_some());

        let ticket = navigator.begin_load();
        navigator.complete_load(ticket, Ok(vec![]));
        assert!(navigator.error_message().is_none());
        assert!(navigator.load_error().is_none());
    }

    #[test]
    fn test_starting_today_opens_current_month() {
        let navigator = MonthNavigator::starting_today();
        let today = chrono::Local::now().date_naive();
        assert_eq!(navigator.reference_date(), today);
        assert_eq!(navigator.view().reference_date, today);
        assert!(!navigator.is_loading());
    }

    #[tokio::test]
    async fn test_go_refetches_every_month() {
        let store = MemoryEntryStore::with_entries(vec![
            detail(1, "2024-03-05T10:00:00Z"),
            detail(2, "2024-04-09T10:00:00Z"),
        ]);
        let mut navigator = MonthNavigator::new(date(2024, 3, 15)).with_zone(utc());

        assert!(navigator.load(&store).await);
        assert_eq!(navigator.view().entry_for_day(5).map(|e| e.id), Some(1));

        assert!(navigator.go(NavigationDirection::Next, &store).await);
        assert_eq!(navigator.view().entry_for_day(9).map(|e| e.id), Some(2));
        assert!(navigator.view().entry_for_day(5).is_none());

        assert!(navigator.go(NavigationDirection::Previous, &store).await);
        assert_eq!(navigator.view().entry_for_day(5).map(|e| e.id), Some(1));

        assert_eq!(store.call_count(StoreOperation::List), 3);
    }
}
