//! Passphrase sealing for tokens stored on disk.
//!
//! A 256-bit key is derived from the passphrase with Argon2 and a random
//! salt, and the payload is encrypted with ChaCha20-Poly1305. Salt and nonce
//! are stored next to the ciphertext. The nonce is fresh on every write; the
//! salt and its derived key are kept for the life of the `Sealer`, so Argon2
//! runs once per salt rather than once per token read.

use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Result};
use argon2::Argon2;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedBox {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

type DerivedKey = (Vec<u8>, [u8; KEY_LEN]);

pub struct Sealer {
    passphrase: String,
    /// Last salt used or seen, with its key
    derived: Mutex<Option<DerivedKey>>,
}

impl std::fmt::Debug for Sealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sealer").finish_non_exhaustive()
    }
}

impl Sealer {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
            derived: Mutex::new(None),
        }
    }

    fn derive_key(&self, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
        let mut key = [0u8; KEY_LEN];
        Argon2::default()
            .hash_password_into(self.passphrase.as_bytes(), salt, &mut key)
            .map_err(|e| anyhow!("Key derivation failed: {}", e))?;
        Ok(key)
    }

    /// Key for `salt`, or for the cached salt (a new random one if none) when
    /// `salt` is None.
    fn key_for(&self, salt: Option<&[u8]>) -> Result<DerivedKey> {
        let mut derived = self.derived.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_salt, key)) = derived.as_ref() {
            if salt.map_or(true, |s| s == cached_salt.as_slice()) {
                return Ok((cached_salt.clone(), *key));
            }
        }

        let salt = match salt {
            Some(s) => s.to_vec(),
            None => {
                let mut fresh = [0u8; SALT_LEN];
                rand::thread_rng().fill_bytes(&mut fresh);
                fresh.to_vec()
            }
        };
        let key = self.derive_key(&salt)?;
        *derived = Some((salt.clone(), key));
        Ok((salt, key))
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedBox> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let (salt, key) = self.key_for(None)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| anyhow!("Failed to encrypt session"))?;

        Ok(SealedBox {
            salt,
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    pub fn open(&self, sealed: &SealedBox) -> Result<Vec<u8>> {
        if sealed.nonce.len() != NONCE_LEN {
            return Err(anyhow!("Sealed session has an invalid nonce"));
        }

        let (_, key) = self.key_for(Some(&sealed.salt))?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
            .map_err(|_| anyhow!("Failed to decrypt session - wrong passphrase or corrupted file"))
    }
}
