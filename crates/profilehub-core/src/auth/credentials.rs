use anyhow::{Context, Result};
use keyring::Entry;
use tracing::error;

use super::store::{TokenStore, Tokens, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const SERVICE_NAME: &str = "profilehub";

/// Token store backed by the OS keychain, one entry per token slot.
pub struct KeyringTokenStore {
    access: Entry,
    refresh: Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self> {
        Self::for_service(SERVICE_NAME)
    }

    pub fn for_service(service: &str) -> Result<Self> {
        let access = Entry::new(service, ACCESS_TOKEN_KEY)
            .context("Failed to create keyring entry")?;
        let refresh = Entry::new(service, REFRESH_TOKEN_KEY)
            .context("Failed to create keyring entry")?;
        Ok(Self { access, refresh })
    }

    fn read(entry: &Entry) -> Result<Option<String>> {
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn write(entry: &Entry, value: Option<&str>) -> Result<()> {
        match value {
            Some(token) => entry
                .set_password(token)
                .context("Failed to store token in keychain"),
            None => Self::delete(entry),
        }
    }

    fn delete(entry: &Entry) -> Result<()> {
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Tokens> {
        Ok(Tokens {
            access: Self::read(&self.access)?,
            refresh: Self::read(&self.refresh)?,
        })
    }

    /// Refresh slot first. If the access write then fails both slots are
    /// emptied, so a half-written pair never survives.
    fn set(&self, tokens: &Tokens) -> Result<()> {
        Self::write(&self.refresh, tokens.refresh.as_deref())?;
        if let Err(e) = Self::write(&self.access, tokens.access.as_deref()) {
            if let Err(clear_err) = self.clear() {
                error!(error = %clear_err, "Failed to clear keychain after partial write");
            }
            return Err(e);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Self::delete(&self.access)?;
        Self::delete(&self.refresh)
    }
}
