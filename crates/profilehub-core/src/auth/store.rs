use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

/// Fixed slot name for the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Fixed slot name for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// The access/refresh pair as held by a store. Either half may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Tokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

// Only presence is printed, never the token values
impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("has_access", &self.access.is_some())
            .field("has_refresh", &self.refresh.is_some())
            .finish()
    }
}

/// Storage backend for the session tokens.
///
/// `set` overwrites both slots; a `None` half removes that slot.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Tokens>;

    fn set(&self, tokens: &Tokens) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// When the tokens were last written, for backends that record it
    fn saved_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// In-process store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Tokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Tokens> {
        let tokens = self
            .tokens
            .lock()
            .map_err(|_| anyhow!("Token store lock poisoned"))?;
        Ok(tokens.clone())
    }

    fn set(&self, tokens: &Tokens) -> Result<()> {
        let mut current = self
            .tokens
            .lock()
            .map_err(|_| anyhow!("Token store lock poisoned"))?;
        *current = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.set(&Tokens::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_overwrites() {
        let store = MemoryTokenStore::new();
        assert!(store.get().unwrap().is_empty());

        store.set(&Tokens::new("A1", "R1")).unwrap();
        store.set(&Tokens::new("A2", "R2")).unwrap();
        assert_eq!(store.get().unwrap(), Tokens::new("A2", "R2"));
    }

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryTokenStore::with_tokens(Tokens::new("A1", "R1"));
        store.clear().unwrap();

        let tokens = store.get().unwrap();
        assert_eq!(tokens.access, None);
        assert_eq!(tokens.refresh, None);
    }

    #[test]
    fn test_tokens_debug_hides_values() {
        let debug = format!("{:?}", Tokens::new("secret-access", "secret-refresh"));
        assert!(!debug.contains("secret"));
        assert!(debug.contains("has_access: true"));
    }
}
