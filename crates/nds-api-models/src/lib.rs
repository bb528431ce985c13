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
//! Shared HTTP DTOs for the NDS reference-table API.
//!
//! These types are used by the HTTP client for request/response encoding and
//! by the page controller for its in-memory collection, so the wire contract
//! (camelCase field names, nullable `deletedAt`) has a single definition.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque record identifier, generated client-side when a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Produce a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A VAT rate entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdsRecord {
    /// Immutable identifier.
    pub id: RecordId,
    /// Optional display label.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Non-negative rate, in percent.
    pub value: f64,
    /// Soft-delete marker; `None` means the record is active.
    #[serde(default)]
    pub deleted_at: Option<String>,
    /// Server-assigned creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Server-assigned modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl NdsRecord {
    /// Whether the record carries a soft-delete marker.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Extract the mutable fields as an update payload.
    #[must_use]
    pub fn to_payload(&self) -> NdsPayload {
        NdsPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            value: self.value,
            deleted_at: self.deleted_at.clone(),
        }
    }

    /// Overwrite the mutable fields with the given payload, keeping the id and
    /// server timestamps intact.
    pub fn apply_payload(&mut self, payload: &NdsPayload) {
        self.name.clone_from(&payload.name);
        self.description.clone_from(&payload.description);
        self.value = payload.value;
        self.deleted_at.clone_from(&payload.deleted_at);
    }
}

/// Mutable record fields sent on update and embedded in create requests.
///
/// `deletedAt` is always serialised, so a restore explicitly sends `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NdsPayload {
    /// Optional display label.
    pub name: Option<String>,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Non-negative rate, in percent.
    pub value: f64,
    /// Soft-delete marker carried through unchanged by the form.
    pub deleted_at: Option<String>,
}

/// Body of `POST /api/nds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdsCreateRequest {
    /// Client-generated identifier.
    pub id: RecordId,
    /// Record fields.
    #[serde(flatten)]
    pub payload: NdsPayload,
}

/// Error body returned by the API; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Decode an error response body, returning the server message when the
    /// body is JSON and carries a non-empty `message`.
    #[must_use]
    pub fn decode_message(bytes: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(bytes)
            .ok()
            .and_then(|body| body.message)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_decodes_with_missing_optionals() {
        let record: NdsRecord = serde_json::from_value(json!({
            "id": "a1",
            "value": 20.0
        }))
        .expect("record decodes");
        assert_eq!(record.id.as_str(), "a1");
        assert!(record.name.is_none());
        assert!(!record.is_deleted());
    }

    #[test]
    fn record_uses_camel_case_timestamps() {
        let record: NdsRecord = serde_json::from_value(json!({
            "id": "a1",
            "name": "Standard",
            "description": null,
            "value": 20,
            "deletedAt": "2024-03-01T10:00:00.000Z",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .expect("record decodes");
        assert!(record.is_deleted());
        assert_eq!(record.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));

        let encoded = serde_json::to_value(&record).expect("record encodes");
        assert_eq!(encoded["deletedAt"], json!("2024-03-01T10:00:00.000Z"));
        assert!(encoded.get("updatedAt").is_none());
    }

    #[test]
    fn payload_serialises_null_deleted_at() {
        let payload = NdsPayload {
            name: Some("Reduced".to_string()),
            description: None,
            value: 10.0,
            deleted_at: None,
        };
        let encoded = serde_json::to_value(&payload).expect("payload encodes");
        assert_eq!(
            encoded,
            json!({"name": "Reduced", "description": null, "value": 10.0, "deletedAt": null})
        );
    }

    #[test]
    fn create_request_flattens_payload() {
        let request = NdsCreateRequest {
            id: RecordId::from("fixed"),
            payload: NdsPayload {
                name: None,
                description: Some("export".to_string()),
                value: 0.0,
                deleted_at: None,
            },
        };
        let encoded = serde_json::to_value(&request).expect("request encodes");
        assert_eq!(encoded["id"], json!("fixed"));
        assert_eq!(encoded["description"], json!("export"));
        assert_eq!(encoded["deletedAt"], json!(null));
    }

    #[test]
    fn apply_payload_keeps_identity_and_server_fields() {
        let mut record = NdsRecord {
            id: RecordId::from("keep"),
            name: Some("Old".to_string()),
            description: None,
            value: 18.0,
            deleted_at: None,
            created_at: Some("2023-01-01T00:00:00Z".to_string()),
            updated_at: None,
        };
        let payload = NdsPayload {
            name: Some("New".to_string()),
            description: Some("changed".to_string()),
            value: 20.0,
            deleted_at: None,
        };
        record.apply_payload(&payload);
        assert_eq!(record.id.as_str(), "keep");
        assert_eq!(record.name.as_deref(), Some("New"));
        assert_eq!(record.created_at.as_deref(), Some("2023-01-01T00:00:00Z"));
        assert_eq!(record.to_payload(), payload);
    }

    #[test]
    fn error_body_decode_handles_loose_shapes() {
        assert_eq!(
            ErrorBody::decode_message(br#"{"message":"rate exists"}"#),
            Some("rate exists".to_string())
        );
        assert_eq!(ErrorBody::decode_message(br#"{"message":"  "}"#), None);
        assert_eq!(ErrorBody::decode_message(br#"{"error":"x"}"#), None);
        assert_eq!(ErrorBody::decode_message(b"<html>502</html>"), None);
        assert_eq!(ErrorBody::decode_message(b""), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }
}
