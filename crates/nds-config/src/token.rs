//! Persisted bearer-token storage.
//!
//! # Design
//! - The token is an opaque string stored exactly as given: the store never
//!   inspects its shape or expiry and only refuses the empty string.
//! - `FileTokenStore` treats its file as a small key/value area and only owns the
//!   `token` key, so unrelated keys survive writes.
//! - An unparseable storage file reads as empty and is replaced by the next write.
//! - Stores are shared behind `Arc<dyn TokenStore>`, hence the `&self` mutators.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::defaults::TOKEN_KEY;
use crate::error::{ConfigError, ConfigResult};

/// Get/set/clear access to the single persisted auth token.
pub trait TokenStore: Send + Sync {
    /// Current token, if one is stored.
    fn get(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] for an empty string, or a storage error
    /// when the value cannot be persisted.
    fn set(&self, token: &str) -> ConfigResult<()>;

    /// Remove the stored token. Clearing an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the removal cannot be persisted.
    fn clear(&self) -> ConfigResult<()>;

    /// Whether a token is currently stored.
    fn has_token(&self) -> bool {
        self.get().is_some()
    }
}

fn check_token(token: &str) -> ConfigResult<&str> {
    if token.is_empty() {
        return Err(ConfigError::EmptyToken);
    }
    Ok(token)
}

/// Token store backed by a JSON key/value file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store rooted at `path`. The file is created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_area(&self) -> ConfigResult<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "read_storage",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ConfigError::StorageFormat {
                path: self.path.clone(),
                source: None,
            }),
            Err(source) => Err(ConfigError::StorageFormat {
                path: self.path.clone(),
                source: Some(source),
            }),
        }
    }

    /// Key/value area to modify. A corrupt document is discarded; the flag
    /// reports whether that happened.
    fn area_for_update(&self) -> ConfigResult<(Map<String, Value>, bool)> {
        match self.read_area() {
            Ok(area) => Ok((area, false)),
            Err(err @ ConfigError::StorageFormat { .. }) => {
                tracing::warn!(error = %err, path = %self.path.display(), "replacing unreadable token storage");
                Ok((Map::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn write_area(&self, area: &Map<String, Value>) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                operation: "create_storage_dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let encoded = serde_json::to_vec_pretty(area)
            .map_err(|source| ConfigError::StorageEncode { source })?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(|source| ConfigError::Io {
            operation: "write_storage",
            path: staging.clone(),
            source,
        })?;
        restrict_permissions(&staging).map_err(|source| ConfigError::Io {
            operation: "restrict_storage",
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| ConfigError::Io {
            operation: "replace_storage",
            path: self.path.clone(),
            source,
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match self.read_area() {
            Ok(area) => area
                .get(TOKEN_KEY)
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "token storage unreadable; treating as empty");
                None
            }
        }
    }

    fn set(&self, token: &str) -> ConfigResult<()> {
        let token = check_token(token)?;
        let (mut area, _) = self.area_for_update()?;
        area.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_area(&area)?;
        tracing::debug!(path = %self.path.display(), "token stored");
        Ok(())
    }

    fn clear(&self) -> ConfigResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let (mut area, discarded) = self.area_for_update()?;
        if area.remove(TOKEN_KEY).is_none() && !discarded {
            return Ok(());
        }
        self.write_area(&area)?;
        tracing::debug!(path = %self.path.display(), "token removed");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) -> ConfigResult<()> {
        let token = check_token(token)?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ConfigResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
