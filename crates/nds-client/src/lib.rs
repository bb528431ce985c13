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

//! HTTP client for the NDS reference-table API.
//!
//! Layout:
//! - `http.rs`: `HttpNdsApi`, the reqwest-backed `NdsApi` implementation
//! - `response.rs`: status classification and body decoding

mod http;
mod response;

pub use http::{HEADER_REQUEST_ID, HttpNdsApi, build_http_client};
