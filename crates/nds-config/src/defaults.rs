//! Default endpoints, timeouts, and storage locations.
//!
//! # Design
//! - Keep every default in one place so CLI flags and tests agree on them.
//! - Storage keys mirror a browser key/value store: one well-known key per value.

/// Base URL used when neither a flag nor `NDS_API_URL` is supplied.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// File name of the persisted key/value storage.
pub const STORAGE_FILE_NAME: &str = "storage.json";
/// Fallback storage file used when no home directory can be resolved.
pub const FALLBACK_STORAGE_FILE: &str = "nds-storage.json";
