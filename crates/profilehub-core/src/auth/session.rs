use std::sync::{Mutex as StdMutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use super::store::{MemoryTokenStore, TokenStore, Tokens};

/// The user's session: token pair, authenticated flag, and the lock that
/// serializes token refreshes.
///
/// Shared between the API client and the front end through an `Arc`.
pub struct Session {
    store: Box<dyn TokenStore>,
    /// Held across read-modify-write of the store
    write_lock: StdMutex<()>,
    refresh_lock: Mutex<()>,
    authenticated: watch::Sender<bool>,
}

impl Session {
    /// Create a session over `store`.
    /// The authenticated flag starts as "an access token is persisted".
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self::from_boxed(Box::new(store))
    }

    pub fn from_boxed(store: Box<dyn TokenStore>) -> Self {
        let has_access = match store.get() {
            Ok(tokens) => tokens.access.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to load stored session, starting logged out");
                false
            }
        };
        debug!(authenticated = has_access, "Session initialized");

        let (authenticated, _) = watch::channel(has_access);
        Self {
            store,
            write_lock: StdMutex::new(()),
            refresh_lock: Mutex::new(()),
            authenticated,
        }
    }

    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    pub fn tokens(&self) -> Result<Tokens> {
        self.store.get()
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.get()?.access)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.store.get()?.refresh)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a fresh token pair from a successful login
    pub fn set(&self, access: impl Into<String>, refresh: impl Into<String>) -> Result<()> {
        let _writes = self.lock_writes();
        self.store.set(&Tokens::new(access, refresh))?;
        self.authenticated.send_replace(true);
        Ok(())
    }

    /// Replace the access token obtained with `refresh`, keeping the refresh
    /// token. Returns false and writes nothing when the stored refresh token
    /// is no longer `refresh` (logged out or logged in again meanwhile).
    pub fn renew_access(&self, refresh: &str, access: impl Into<String>) -> Result<bool> {
        let _writes = self.lock_writes();
        let mut tokens = self.store.get()?;
        if tokens.refresh.as_deref() != Some(refresh) {
            return Ok(false);
        }
        tokens.access = Some(access.into());
        self.store.set(&tokens)?;
        Ok(true)
    }

    /// Drop both tokens. The flag goes down even if the backend fails.
    pub fn clear(&self) -> Result<()> {
        let _writes = self.lock_writes();
        self.authenticated.send_replace(false);
        self.store.clear()
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Observe authenticated-flag transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.store.saved_at()
    }

    pub(crate) fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }
}
