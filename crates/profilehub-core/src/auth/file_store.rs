use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::seal::{SealedBox, Sealer};
use super::store::{TokenStore, Tokens};

/// Session file name in the session directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl From<&Tokens> for StoredTokens {
    fn from(tokens: &Tokens) -> Self {
        Self {
            access_token: tokens.access.clone(),
            refresh_token: tokens.refresh.clone(),
        }
    }
}

impl From<StoredTokens> for Tokens {
    fn from(stored: StoredTokens) -> Self {
        Self {
            access: stored.access_token,
            refresh: stored.refresh_token,
        }
    }
}

/// On-disk layout. Exactly one of `tokens` and `sealed` is written.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tokens: Option<StoredTokens>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sealed: Option<SealedBox>,
}

/// Token store backed by a JSON file, optionally sealed with a passphrase.
pub struct FileTokenStore {
    path: PathBuf,
    sealer: Option<Sealer>,
}

impl FileTokenStore {
    pub fn new(session_dir: impl AsRef<Path>) -> Self {
        Self {
            path: session_dir.as_ref().join(SESSION_FILE),
            sealer: None,
        }
    }

    /// Encrypt the file contents with a key derived from `passphrase`
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.sealer = Some(Sealer::new(passphrase));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Option<SessionFile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")?;
        let file: SessionFile = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        Ok(Some(file))
    }

    fn write_file(&self, file: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(file)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Tokens> {
        let Some(file) = self.read_file()? else {
            return Ok(Tokens::default());
        };

        if let Some(sealed) = file.sealed {
            let sealer = self.sealer.as_ref().ok_or_else(|| {
                anyhow!("Session file is encrypted but no passphrase is configured")
            })?;
            let plaintext = sealer.open(&sealed)?;
            let stored: StoredTokens = serde_json::from_slice(&plaintext)
                .context("Failed to parse decrypted session")?;
            return Ok(stored.into());
        }

        Ok(file.tokens.unwrap_or_default().into())
    }

    fn set(&self, tokens: &Tokens) -> Result<()> {
        let stored = StoredTokens::from(tokens);
        let file = match self.sealer {
            Some(ref sealer) => SessionFile {
                saved_at: Utc::now(),
                tokens: None,
                sealed: Some(sealer.seal(&serde_json::to_vec(&stored)?)?),
            },
            None => SessionFile {
                saved_at: Utc::now(),
                tokens: Some(stored),
                sealed: None,
            },
        };
        self.write_file(&file)?;
        debug!(path = ?self.path, sealed = self.sealer.is_some(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.read_file().ok().flatten().map(|f| f.saved_at)
    }
}
