//! Persistent storage for the client token pair.
//!
//! Mirrors what a browser client keeps in local storage: the access/refresh
//! pair survives process restarts through [`FileTokenStore`], while
//! [`MemoryTokenStore`] backs tests and short-lived tools.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Access/refresh token pair held by the client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Storage abstraction for the session tokens.
pub trait TokenStore: Send + Sync {
    /// Load the persisted pair, if any.
    ///
    /// # Errors
    /// Returns an error when the backing store is unreadable.
    fn load(&self) -> Result<Option<TokenPair>>;

    /// Persist the pair.
    ///
    /// # Errors
    /// Returns an error when the backing store is unwritable.
    fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// Drop the persisted pair.
    ///
    /// # Errors
    /// Returns an error when the backing store is unwritable.
    fn clear(&self) -> Result<()>;
}

/// In-memory store; the session dies with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>> {
        Ok(self
            .tokens
            .lock()
            .map_err(|_| anyhow::anyhow!("token store poisoned"))?
            .clone())
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        *self
            .tokens
            .lock()
            .map_err(|_| anyhow::anyhow!("token store poisoned"))? = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .tokens
            .lock()
            .map_err(|_| anyhow::anyhow!("token store poisoned"))? = None;
        Ok(())
    }
}

/// JSON file store under the user data directory.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store under the platform data dir (`<data>/authflow/session.json`).
    #[must_use]
    pub fn new() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("authflow")
            .join("session.json");
        Self { path }
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()))
            }
        };

        let tokens = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(tokens))
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string(tokens).context("failed to encode tokens")?;
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().expect("load"), None);

        store.save(&pair()).expect("save");
        assert_eq!(store.load().expect("load"), Some(pair()));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn file_store_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "authflow-store-test-{}-{:x}.json",
            std::process::id(),
            rand::random::<u64>()
        ));
        let store = FileTokenStore::with_path(path.clone());

        assert_eq!(store.load().expect("load"), None);

        store.save(&pair()).expect("save");
        assert_eq!(store.load().expect("load"), Some(pair()));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);

        // Clearing an already-empty store stays fine.
        store.clear().expect("clear again");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn token_pair_uses_camel_case_on_disk() {
        let encoded = serde_json::to_string(&pair()).expect("encode");
        assert!(encoded.contains("accessToken"));
        assert!(encoded.contains("refreshToken"));
    }
}
