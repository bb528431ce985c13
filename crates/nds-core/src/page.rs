//! Page controller: the single owner of the in-memory record collection.
//!
//! # Design
//! - Local state changes only after the remote call succeeds.
//! - Every failure is captured as the displayed error message and also returned,
//!   so front ends can pick an exit code without re-deriving the text.
//! - Each action clears the previous error and runs under the busy flag.
//! - Hard delete is gated on the record already being soft-deleted.

use nds_api_models::{NdsCreateRequest, NdsPayload, NdsRecord, RecordId};
use thiserror::Error;

use crate::api::{ApiError, NdsApi};
use crate::clock::timestamp_now;
use crate::filter::RecordFilter;
use crate::form::{FormError, RecordForm};

/// Failures surfaced by controller actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// Another action is still running.
    #[error("Another operation is in progress.")]
    Busy,
    /// No record with this id is loaded.
    #[error("Record {id} is not in the list.")]
    UnknownRecord {
        /// Requested id.
        id: RecordId,
    },
    /// Hard delete requested for a record that is still active.
    #[error("Record {id} must be deleted before it can be removed permanently.")]
    NotSoftDeleted {
        /// Requested id.
        id: RecordId,
    },
    /// Submit requested with no form open.
    #[error("No form is open.")]
    NoForm,
    /// Local validation failed; nothing was sent.
    #[error("{0}")]
    Validation(#[from] FormError),
    /// The remote call failed.
    #[error("{message}")]
    Remote {
        /// Text shown to the user.
        message: String,
        /// Underlying API failure.
        source: ApiError,
    },
}

impl PageError {
    fn remote(source: ApiError) -> Self {
        Self::Remote {
            message: source.user_message(),
            source,
        }
    }
}

/// Convenience alias for controller results.
pub type PageResult<T> = Result<T, PageError>;

/// Orchestrates loading, mutations, the form, and error display.
pub struct PageController<A> {
    api: A,
    records: Vec<NdsRecord>,
    filter: RecordFilter,
    error: Option<String>,
    busy: bool,
    loaded: bool,
    form: Option<RecordForm>,
}

impl<A: NdsApi> PageController<A> {
    /// Controller with an empty collection; call [`Self::activate`] to load.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
            records: Vec::new(),
            filter: RecordFilter::All,
            error: None,
            busy: false,
            loaded: false,
            form: None,
        }
    }

    /// Borrow the API handle.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Full collection in display order.
    #[must_use]
    pub fn records(&self) -> &[NdsRecord] {
        &self.records
    }

    /// Collection projected through the current filter.
    #[must_use]
    pub fn visible_records(&self) -> Vec<&NdsRecord> {
        self.filter.apply(&self.records)
    }

    /// Look up a loaded record.
    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<&NdsRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Current filter.
    #[must_use]
    pub const fn filter(&self) -> RecordFilter {
        self.filter
    }

    /// Change the filter; purely a view concern.
    pub const fn set_filter(&mut self, filter: RecordFilter) {
        self.filter = filter;
    }

    /// Message from the most recent failed action.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether an action is running.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the initial load has been attempted.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Open form, if any.
    #[must_use]
    pub const fn form(&self) -> Option<&RecordForm> {
        self.form.as_ref()
    }

    /// Mutable access to the open form's fields.
    pub const fn form_mut(&mut self) -> Option<&mut RecordForm> {
        self.form.as_mut()
    }

    /// First activation: load once. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn activate(&mut self) -> PageResult<()> {
        if self.loaded {
            return Ok(());
        }
        self.refresh().await
    }

    /// Reload the whole collection. On failure the previous collection stays.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Remote`].
    pub async fn refresh(&mut self) -> PageResult<()> {
        self.begin()?;
        self.loaded = true;
        let result = {
            let _busy = BusyGuard::hold(&mut self.busy);
            self.api.list_records().await
        };
        match result {
            Ok(records) => {
                tracing::debug!(count = records.len(), "records loaded");
                self.records = records;
                Ok(())
            }
            Err(err) => Err(self.fail(PageError::remote(err))),
        }
    }

    /// Open an empty create form.
    pub fn open_create_form(&mut self) {
        self.form = Some(RecordForm::create());
    }

    /// Open the edit form seeded from the loaded record.
    ///
    /// # Errors
    ///
    /// [`PageError::UnknownRecord`] when `id` is not loaded.
    pub fn open_edit_form(&mut self, id: &RecordId) -> PageResult<()> {
        let Some(record) = self.record(id) else {
            return Err(self.fail(PageError::UnknownRecord { id: id.clone() }));
        };
        self.form = Some(RecordForm::edit(record));
        Ok(())
    }

    /// Close the form, discarding field edits.
    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Validate the open form and run the matching create or edit. The form
    /// closes only when the remote call succeeds.
    ///
    /// # Errors
    ///
    /// [`PageError::NoForm`], [`PageError::Validation`] (nothing is sent), or
    /// any error from [`Self::create`] / [`Self::edit`].
    pub async fn submit_form(&mut self) -> PageResult<()> {
        let Some(form) = self.form.as_mut() else {
            return Err(PageError::NoForm);
        };
        let submission = match form.submit() {
            Ok(submission) => submission,
            Err(err) => return Err(PageError::Validation(err)),
        };
        match submission.target {
            Some(id) => self.edit(&id, submission.payload).await?,
            None => {
                self.create(submission.payload).await?;
            }
        }
        self.form = None;
        Ok(())
    }

    /// Create a record with a fresh id and prepend the server's copy.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Remote`]; the collection is unchanged.
    pub async fn create(&mut self, payload: NdsPayload) -> PageResult<RecordId> {
        self.begin()?;
        let request = NdsCreateRequest {
            id: RecordId::generate(),
            payload: NdsPayload {
                deleted_at: None,
                ..payload
            },
        };
        let result = {
            let _busy = BusyGuard::hold(&mut self.busy);
            self.api.create_record(&request).await
        };
        match result {
            Ok(created) => {
                let id = created.id.clone();
                tracing::info!(id = %id, "record created");
                self.records.insert(0, created);
                Ok(id)
            }
            Err(err) => Err(self.fail(PageError::remote(err))),
        }
    }

    /// Update a record's fields. The soft-delete marker is kept as it is on the
    /// loaded record; on success the record is replaced in place.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`], [`PageError::UnknownRecord`], or [`PageError::Remote`].
    pub async fn edit(&mut self, id: &RecordId, payload: NdsPayload) -> PageResult<()> {
        self.begin()?;
        let Some(index) = self.position(id) else {
            return Err(self.fail(PageError::UnknownRecord { id: id.clone() }));
        };
        let payload = NdsPayload {
            deleted_at: self.records[index].deleted_at.clone(),
            ..payload
        };
        self.send_update(index, payload).await?;
        tracing::info!(id = %id, "record updated");
        Ok(())
    }

    /// Soft-delete an active record or restore a deleted one.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`], [`PageError::UnknownRecord`], or [`PageError::Remote`].
    pub async fn toggle_deleted(&mut self, id: &RecordId) -> PageResult<()> {
        self.begin()?;
        let Some(index) = self.position(id) else {
            return Err(self.fail(PageError::UnknownRecord { id: id.clone() }));
        };
        let current = &self.records[index];
        let deleted_at = if current.is_deleted() {
            None
        } else {
            Some(timestamp_now())
        };
        let payload = NdsPayload {
            deleted_at,
            ..current.to_payload()
        };
        let restoring = payload.deleted_at.is_none();
        self.send_update(index, payload).await?;
        if restoring {
            tracing::info!(id = %id, "record restored");
        } else {
            tracing::info!(id = %id, "record soft-deleted");
        }
        Ok(())
    }

    /// Permanently delete a soft-deleted record.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`], [`PageError::UnknownRecord`],
    /// [`PageError::NotSoftDeleted`] (no call is made), or [`PageError::Remote`].
    pub async fn hard_delete(&mut self, id: &RecordId) -> PageResult<()> {
        self.begin()?;
        let Some(index) = self.position(id) else {
            return Err(self.fail(PageError::UnknownRecord { id: id.clone() }));
        };
        if !self.records[index].is_deleted() {
            return Err(self.fail(PageError::NotSoftDeleted { id: id.clone() }));
        }
        let result = {
            let _busy = BusyGuard::hold(&mut self.busy);
            self.api.delete_record(id).await
        };
        match result {
            Ok(()) => {
                if let Some(index) = self.position(id) {
                    self.records.remove(index);
                }
                tracing::info!(id = %id, "record removed");
                Ok(())
            }
            Err(err) => Err(self.fail(PageError::remote(err))),
        }
    }

    async fn send_update(&mut self, index: usize, payload: NdsPayload) -> PageResult<()> {
        let id = self.records[index].id.clone();
        let result = {
            let _busy = BusyGuard::hold(&mut self.busy);
            self.api.update_record(&id, &payload).await
        };
        match result {
            Ok(()) => {
                if let Some(record) = self.records.get_mut(index) {
                    record.apply_payload(&payload);
                }
                Ok(())
            }
            Err(err) => Err(self.fail(PageError::remote(err))),
        }
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    fn begin(&mut self) -> PageResult<()> {
        if self.busy {
            return Err(PageError::Busy);
        }
        self.error = None;
        Ok(())
    }

    fn fail(&mut self, err: PageError) -> PageError {
        tracing::warn!(error = %err, "page action failed");
        self.error = Some(err.to_string());
        err
    }
}

/// Raises the busy flag for one remote call and lowers it on drop, so a
/// cancelled call leaves the controller usable.
struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    fn hold(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
