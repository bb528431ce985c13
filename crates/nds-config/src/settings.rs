//! Resolved client settings.
//!
//! # Design
//! - Flags and environment variables are parsed by the front end; this type
//!   holds the validated result.
//! - Storage location resolution takes the home directory as input so it can be
//!   tested without touching the process environment.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::defaults::{FALLBACK_STORAGE_FILE, STORAGE_FILE_NAME};
use crate::error::{ConfigError, ConfigResult};

/// Settings shared by the HTTP client and the token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL of the remote API.
    pub base_url: Url,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Location of the persisted key/value storage file.
    pub storage_path: PathBuf,
}

impl ClientSettings {
    /// Build settings from already-parsed values.
    #[must_use]
    pub const fn new(base_url: Url, timeout_secs: u64, storage_path: PathBuf) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            storage_path,
        }
    }
}

/// Parse and validate an API base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] when the input is not an absolute
/// `http`/`https` URL.
pub fn parse_base_url(input: &str) -> ConfigResult<Url> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidBaseUrl {
        value: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            value: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            value: trimmed.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Default storage file: `$HOME/.config/nds/storage.json`, or a file in the
/// working directory when `HOME` is unset.
#[must_use]
pub fn default_storage_path() -> PathBuf {
    storage_path_for_home(std::env::var_os("HOME"))
}

fn storage_path_for_home(home: Option<OsString>) -> PathBuf {
    match home.filter(|value| !value.is_empty()) {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("nds")
            .join(STORAGE_FILE_NAME),
        None => PathBuf::from(FALLBACK_STORAGE_FILE),
    }
}
