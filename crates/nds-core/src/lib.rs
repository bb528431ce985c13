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

//! Client-side state for the NDS reference table.
//!
//! Layout: `api.rs` (the `NdsApi` seam and its error type), `filter.rs`
//! (list projection and row actions), `form.rs` (create/edit form state
//! machine), `page.rs` (`PageController`, the sole owner of the record
//! collection), `clock.rs` (timestamp helpers).

pub mod api;
pub mod clock;
pub mod filter;
pub mod form;
pub mod page;

pub use api::{ApiError, ApiResult, DEFAULT_ERROR_MESSAGE, NdsApi};
pub use filter::{RecordFilter, RowAction, available_actions};
pub use form::{FormError, FormMode, FormSubmission, RecordForm};
pub use page::{PageController, PageError, PageResult};
