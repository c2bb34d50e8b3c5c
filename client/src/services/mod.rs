//! # Services Module
//!
//! The HTTP side of the client: `ApiClient` implements both `EntryStore`
//! and `AuthGateway` against the journal backend.

pub mod api;
pub mod auth;
pub mod date_utils;

pub use api::{error_for_status, ApiClient, CSRF_HEADER};
