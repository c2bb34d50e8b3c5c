//! # Domain Module
//!
//! Calendar aggregation, month navigation, the selection flow and the auth
//! context. Nothing here talks HTTP; the flows reach the backend through the
//! storage traits.

pub mod auth_context;
pub mod authoring;
pub mod calendar;
pub mod journal_calendar;
pub mod month_view;
pub mod selection;

pub use auth_context::AuthContext;
pub use journal_calendar::JournalCalendar;
pub use month_view::{LoadTicket, MonthNavigator, MonthViewState};
pub use selection::{DetailView, SelectionFlow, SelectionState};
