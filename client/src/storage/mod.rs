//! # Storage Module
//!
//! Ports to the remote journal service and local token persistence, plus the
//! in-memory and file-backed adapters.

pub mod memory;
pub mod token_store;
pub mod traits;

pub use memory::{MemoryEntryStore, MemoryTokenStore, StoreOperation};
pub use token_store::FileTokenStore;
pub use traits::{AuthGateway, EntryStore, StoredTokens, TokenStore};
