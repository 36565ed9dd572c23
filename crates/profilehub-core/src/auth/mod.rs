//! Authentication module for managing the user's session tokens.
//!
//! This module provides:
//! - `Session`: Shared holder of the access/refresh token pair
//! - `TokenStore`: Storage backend trait, with memory, file and keyring backends
//! - `Auth`: Login, signup and logout on top of the API client
//!
//! Tokens are opaque strings. They are persisted by the configured backend
//! and read once at start-up to decide whether the user is logged in.

pub mod credentials;
pub mod facade;
pub mod file_store;
pub mod seal;
pub mod session;
pub mod store;
pub mod validate;

pub use credentials::KeyringTokenStore;
pub use facade::Auth;
pub use file_store::FileTokenStore;
pub use session::Session;
pub use store::{MemoryTokenStore, TokenStore, Tokens};
pub use validate::{validate_credentials, ValidationError};
