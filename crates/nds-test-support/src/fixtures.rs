//! Sample records for tests.

use nds_api_models::{NdsPayload, NdsRecord, RecordId};

/// Timestamp used for fixtures that start out soft-deleted.
pub const DELETED_AT: &str = "2024-01-15T09:30:00.000Z";

/// Active record with the given id and rate.
#[must_use]
pub fn active_record(id: &str, value: f64) -> NdsRecord {
    NdsRecord {
        id: RecordId::from(id),
        name: Some(format!("Rate {id}")),
        description: Some(format!("fixture {id}")),
        value,
        deleted_at: None,
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        updated_at: None,
    }
}

/// Soft-deleted record with the given id and rate.
#[must_use]
pub fn deleted_record(id: &str, value: f64) -> NdsRecord {
    NdsRecord {
        deleted_at: Some(DELETED_AT.to_string()),
        ..active_record(id, value)
    }
}

/// Payload with a name and rate and no description.
#[must_use]
pub fn payload(name: &str, value: f64) -> NdsPayload {
    NdsPayload {
        name: Some(name.to_string()),
        description: None,
        value,
        deleted_at: None,
    }
}

/// Ids of `records`, in order.
#[must_use]
pub fn ids<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a NdsRecord>,
{
    records.into_iter().map(|record| record.id.to_string()).collect()
}
