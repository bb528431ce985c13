//! Remote API seam consumed by the page controller.
//!
//! # Design
//! - The controller talks to a trait so it can run against HTTP or an in-memory fake.
//! - Errors are transport-agnostic; implementations translate their own failures.
//! - The only user-facing text is `user_message`, which falls back to a generic string.

use async_trait::async_trait;
use nds_api_models::{NdsCreateRequest, NdsPayload, NdsRecord, RecordId};
use thiserror::Error;

/// Message shown when a failure carries no server-supplied text.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred.";

/// Uniform failure shape for remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connect, DNS, timeout).
    #[error("request to {operation} failed: {detail}")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Transport error text.
        detail: String,
    },
    /// The server answered with a non-success status.
    #[error("{operation} returned status {status}")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Message decoded from the error body, when present.
        message: Option<String>,
    },
    /// A success response carried a body of the wrong shape.
    #[error("failed to decode {operation} response: {detail}")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Decoder error text.
        detail: String,
    },
    /// The request URL could not be built.
    #[error("invalid URL for {operation}: {detail}")]
    InvalidUrl {
        /// Operation identifier.
        operation: &'static str,
        /// URL error text.
        detail: String,
    },
}

impl ApiError {
    /// Text to show the user: the server message when one was supplied,
    /// otherwise [`DEFAULT_ERROR_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// HTTP status code, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias for remote call results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Operations offered by the NDS reference-table API.
#[async_trait]
pub trait NdsApi: Send + Sync {
    /// Obtain a bearer token (`GET /token`).
    async fn fetch_token(&self) -> ApiResult<String>;

    /// List every record, active and soft-deleted (`GET /api/nds`).
    async fn list_records(&self) -> ApiResult<Vec<NdsRecord>>;

    /// Fetch a single record (`GET /api/nds/{id}`).
    async fn get_record(&self, id: &RecordId) -> ApiResult<NdsRecord>;

    /// Create a record (`POST /api/nds`).
    async fn create_record(&self, request: &NdsCreateRequest) -> ApiResult<NdsRecord>;

    /// Update a record's mutable fields (`PUT /api/nds/{id}`). Any success
    /// status counts; the response body is not read.
    async fn update_record(&self, id: &RecordId, payload: &NdsPayload) -> ApiResult<()>;

    /// Permanently delete a record (`DELETE /api/nds/{id}`).
    async fn delete_record(&self, id: &RecordId) -> ApiResult<()>;
}
