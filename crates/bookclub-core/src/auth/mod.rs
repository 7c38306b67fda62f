//! Session token storage.
//!
//! This module provides:
//! - `TokenStore`: key/value storage for the bearer token
//! - `TokenSlot`: a store bound to the configured token key
//! - `FileTokenStore`: JSON file in the data directory (default)
//! - `KeyringTokenStore`: OS-level storage via keyring
//! - `MemoryTokenStore`: process-local storage
//!
//! Tokens carry no client-side expiry; the backend decides validity and a
//! 401 response clears the slot.

pub mod credentials;
pub mod storage;
pub mod token;

pub use credentials::KeyringTokenStore;
pub use storage::FileTokenStore;
pub use token::{MemoryTokenStore, TokenSlot, TokenStore};
