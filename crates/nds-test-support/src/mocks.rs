//! Scripted in-memory implementation of [`NdsApi`].
//!
//! Behaves like a small server: it keeps its own record list, records every
//! call it receives, and can be told to fail the next call of a given kind.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use nds_api_models::{NdsCreateRequest, NdsPayload, NdsRecord, RecordId};
use nds_core::{ApiError, ApiResult, NdsApi};

/// Kind of remote call, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `fetch_token`.
    FetchToken,
    /// `list_records`.
    List,
    /// `get_record`.
    Get,
    /// `create_record`.
    Create,
    /// `update_record`.
    Update,
    /// `delete_record`.
    Delete,
}

/// A call observed by the scripted API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    /// `fetch_token`.
    FetchToken,
    /// `list_records`.
    List,
    /// `get_record`.
    Get(RecordId),
    /// `create_record` with its request.
    Create(NdsCreateRequest),
    /// `update_record` with its payload.
    Update(RecordId, NdsPayload),
    /// `delete_record`.
    Delete(RecordId),
}

#[derive(Default)]
struct ScriptState {
    records: Vec<NdsRecord>,
    calls: Vec<ApiCall>,
    failures: HashMap<CallKind, ApiError>,
    token: String,
}

/// In-memory API double.
pub struct ScriptedApi {
    state: Mutex<ScriptState>,
}

impl ScriptedApi {
    /// API serving `records` from its list endpoint.
    #[must_use]
    pub fn with_records(records: Vec<NdsRecord>) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                records,
                token: "scripted-token".to_string(),
                ..ScriptState::default()
            }),
        }
    }

    /// Fail the next call of `kind` with `error`.
    pub fn fail_next(&self, kind: CallKind, error: ApiError) {
        self.lock().failures.insert(kind, error);
    }

    /// Fail the next call of `kind` with a status error carrying `message`.
    pub fn fail_next_with_status(&self, kind: CallKind, status: u16, message: Option<&str>) {
        self.fail_next(
            kind,
            ApiError::Status {
                operation: operation_name(kind),
                status,
                message: message.map(str::to_string),
            },
        );
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of mutating calls (create, update, delete) received so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    ApiCall::Create(_) | ApiCall::Update(..) | ApiCall::Delete(_)
                )
            })
            .count()
    }

    /// Current server-side records.
    #[must_use]
    pub fn server_records(&self) -> Vec<NdsRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, kind: CallKind, call: ApiCall) -> ApiResult<MutexGuard<'_, ScriptState>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(error) = state.failures.remove(&kind) {
            return Err(error);
        }
        Ok(state)
    }
}

const fn operation_name(kind: CallKind) -> &'static str {
    match kind {
        CallKind::FetchToken => "fetch_token",
        CallKind::List => "list_records",
        CallKind::Get => "get_record",
        CallKind::Create => "create_record",
        CallKind::Update => "update_record",
        CallKind::Delete => "delete_record",
    }
}

fn not_found(kind: CallKind) -> ApiError {
    ApiError::Status {
        operation: operation_name(kind),
        status: 404,
        message: None,
    }
}

#[async_trait]
impl NdsApi for ScriptedApi {
    async fn fetch_token(&self) -> ApiResult<String> {
        let state = self.enter(CallKind::FetchToken, ApiCall::FetchToken)?;
        Ok(state.token.clone())
    }

    async fn list_records(&self) -> ApiResult<Vec<NdsRecord>> {
        let state = self.enter(CallKind::List, ApiCall::List)?;
        Ok(state.records.clone())
    }

    async fn get_record(&self, id: &RecordId) -> ApiResult<NdsRecord> {
        let state = self.enter(CallKind::Get, ApiCall::Get(id.clone()))?;
        state
            .records
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| not_found(CallKind::Get))
    }

    async fn create_record(&self, request: &NdsCreateRequest) -> ApiResult<NdsRecord> {
        let mut state = self.enter(CallKind::Create, ApiCall::Create(request.clone()))?;
        let created = NdsRecord {
            id: request.id.clone(),
            name: request.payload.name.clone(),
            description: request.payload.description.clone(),
            value: request.payload.value,
            deleted_at: request.payload.deleted_at.clone(),
            created_at: Some("2024-06-01T00:00:00Z".to_string()),
            updated_at: None,
        };
        state.records.push(created.clone());
        Ok(created)
    }

    async fn update_record(&self, id: &RecordId, payload: &NdsPayload) -> ApiResult<()> {
        let mut state = self.enter(
            CallKind::Update,
            ApiCall::Update(id.clone(), payload.clone()),
        )?;
        let record = state
            .records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| not_found(CallKind::Update))?;
        record.apply_payload(payload);
        Ok(())
    }

    async fn delete_record(&self, id: &RecordId) -> ApiResult<()> {
        let mut state = self.enter(CallKind::Delete, ApiCall::Delete(id.clone()))?;
        let before = state.records.len();
        state.records.retain(|record| &record.id != id);
        if state.records.len() == before {
            return Err(not_found(CallKind::Delete));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::active_record;

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let api = ScriptedApi::with_records(vec![active_record("a", 20.0)]);
        api.fail_next_with_status(CallKind::List, 500, Some("boom"));

        let first = api.list_records().await;
        assert!(matches!(first, Err(ApiError::Status { status: 500, .. })));
        let second = api.list_records().await.expect("second list succeeds");
        assert_eq!(second.len(), 1);
        assert_eq!(api.calls(), vec![ApiCall::List, ApiCall::List]);
    }

    #[tokio::test]
    async fn delete_of_unknown_record_is_not_found() {
        let api = ScriptedApi::with_records(Vec::new());
        let result = api.delete_record(&RecordId::from("ghost")).await;
        assert_eq!(result.map_err(|err| err.status()), Err(Some(404)));
    }
}
