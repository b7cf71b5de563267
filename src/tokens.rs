//! Durable storage for the access/refresh token pair.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
struct StoredTokens {
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Tokens currently held by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub access: String,
    pub refresh: Option<String>,
}

/// File-backed token store. Expiry is never tracked here; a rejected
/// request is the only signal that the access token went stale.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: StoredTokens,
}

impl TokenStore {
    /// Open the store at `path`. A missing file means no credentials.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            return Ok(Self {
                path,
                tokens: StoredTokens::default(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| CatalogError::TokenFile {
            path: path.clone(),
            source: e,
        })?;

        let tokens = serde_json::from_str(&contents).map_err(|e| CatalogError::TokenParse {
            path: path.clone(),
            source: e,
        })?;

        Ok(Self { path, tokens })
    }

    pub fn get(&self) -> Option<Tokens> {
        self.tokens.access_token.as_ref().map(|access| Tokens {
            access: access.clone(),
            refresh: self.tokens.refresh_token.clone(),
        })
    }

    pub fn set_access(&mut self, access: &str) -> Result<()> {
        self.tokens.access_token = Some(access.to_string());
        self.persist()
    }

    pub fn set_tokens(&mut self, access: &str, refresh: &str) -> Result<()> {
        self.tokens = StoredTokens {
            access_token: Some(access.to_string()),
            refresh_token: Some(refresh.to_string()),
        };
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.tokens = StoredTokens::default();

        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CatalogError::TokenFile {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn persist(&self) -> Result<()> {
        let io_err = |e| CatalogError::TokenFile {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(&self.tokens).map_err(|e| {
            CatalogError::TokenParse {
                path: self.path.clone(),
                source: e,
            }
        })?;

        std::fs::write(&self.path, contents).map_err(io_err)?;
        restrict_permissions(&self.path).map_err(io_err)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Shared handle to the token store, injected into every request.
#[derive(Debug, Clone)]
pub struct Credentials {
    store: Arc<Mutex<TokenStore>>,
}

impl Credentials {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Option<Tokens> {
        self.lock().get()
    }

    pub fn access(&self) -> Option<String> {
        self.get().map(|tokens| tokens.access)
    }

    pub fn refresh(&self) -> Option<String> {
        self.get().and_then(|tokens| tokens.refresh)
    }

    pub fn set_access(&self, access: &str) -> Result<()> {
        self.lock().set_access(access)
    }

    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.lock().set_tokens(access, refresh)
    }

    pub fn clear(&self) -> Result<()> {
        self.lock().clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path().join("tokens.json")).unwrap();
        assert_eq!(store.get(), None);
        assert!(store.tokens.refresh_token.is_none());
    }

    #[test]
    fn tokens_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let mut store = TokenStore::open(&path).unwrap();
        store.set_tokens("access-1", "refresh-1").unwrap();

        let reopened = TokenStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(),
            Some(Tokens {
                access: "access-1".to_string(),
                refresh: Some("refresh-1".to_string()),
            })
        );
    }

    #[test]
    fn file_uses_browser_storage_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        TokenStore::open(&path)
            .unwrap()
            .set_tokens("a", "r")
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "a");
        assert_eq!(raw["refreshToken"], "r");
    }

    #[test]
    fn set_access_keeps_refresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TokenStore::open(dir.path().join("tokens.json")).unwrap();
        store.set_tokens("old", "refresh").unwrap();
        store.set_access("new").unwrap();

        let tokens = store.get().unwrap();
        assert_eq!(tokens.access, "new");
        assert_eq!(tokens.refresh.as_deref(), Some("refresh"));
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let mut store = TokenStore::open(&path).unwrap();
        store.set_tokens("a", "r").unwrap();

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get(), None);

        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn credentials_share_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = Credentials::new(TokenStore::open(dir.path().join("t.json")).unwrap());
        let other = credentials.clone();

        credentials.set_tokens("a", "r").unwrap();
        other.set_access("b").unwrap();

        assert_eq!(credentials.access().as_deref(), Some("b"));
        assert_eq!(credentials.refresh().as_deref(), Some("r"));
    }
}
