//! Mindful Companion journal client.
//!
//! A month-at-a-time view of the user's journal: entries are fetched from
//! the backend, reduced to at most one per calendar day, laid out on a
//! Sunday-first grid and opened or deleted from there.

pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod services;
pub mod storage;

pub use config::{Config, ConfigError};
pub use domain::{AuthContext, JournalCalendar, MonthNavigator};
pub use error::{ClientError, ClientResult};
pub use services::ApiClient;
pub use storage::{AuthGateway, EntryStore, FileTokenStore, TokenStore};
