#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client-side configuration for the NDS admin client.
//!
//! Layout: `defaults.rs` (default endpoints, paths, and storage keys),
//! `settings.rs` (`ClientSettings`), `token.rs` (`TokenStore` and its file and
//! in-memory implementations), `error.rs` (`ConfigError`).

pub mod defaults;
pub mod error;
pub mod settings;
pub mod token;

pub use error::{ConfigError, ConfigResult};
pub use settings::ClientSettings;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
