//! Create/edit form state machine.
//!
//! # Design
//! - Fields hold raw user text; parsing happens only on submit.
//! - A failed submit leaves the form as it was, with the validation message recorded.
//! - The form never touches the soft-delete marker: it is copied from the edited
//!   record (or left absent for a new one).

use nds_api_models::{NdsPayload, NdsRecord, RecordId};
use thiserror::Error;

/// Validation failures raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The rate field is not a finite, non-negative number.
    #[error("Enter a valid non-negative number for the rate (%) field.")]
    InvalidRate {
        /// Raw input that failed validation.
        input: String,
    },
}

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    /// Empty form for a new record.
    Create,
    /// Form seeded from an existing record.
    Edit(NdsRecord),
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    /// Record being edited, or `None` for a create.
    pub target: Option<RecordId>,
    /// Normalised field values.
    pub payload: NdsPayload,
}

/// Editable fields for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordForm {
    mode: FormMode,
    name: String,
    description: String,
    rate: String,
    error: Option<FormError>,
}

impl RecordForm {
    /// Empty form in create mode.
    #[must_use]
    pub const fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            description: String::new(),
            rate: String::new(),
            error: None,
        }
    }

    /// Form populated from `record`.
    #[must_use]
    pub fn edit(record: &NdsRecord) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            rate: record.value.to_string(),
            mode: FormMode::Edit(record.clone()),
            error: None,
        }
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Whether this form edits an existing record.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    /// Name field text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description field text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Rate field text.
    #[must_use]
    pub fn rate(&self) -> &str {
        &self.rate
    }

    /// Standing validation failure from the last submit.
    #[must_use]
    pub const fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    /// Replace the name field.
    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    /// Replace the description field.
    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    /// Replace the rate field, clearing any standing validation message.
    pub fn set_rate(&mut self, value: impl Into<String>) {
        self.rate = value.into();
        self.error = None;
    }

    /// Validate the fields and produce the normalised payload.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidRate`] when the rate does not parse to a
    /// finite, non-negative number; the error is also kept on the form.
    pub fn submit(&mut self) -> Result<FormSubmission, FormError> {
        let value = match parse_rate(&self.rate) {
            Ok(value) => value,
            Err(err) => {
                self.error = Some(err.clone());
                return Err(err);
            }
        };
        self.error = None;

        let (target, deleted_at) = match &self.mode {
            FormMode::Create => (None, None),
            FormMode::Edit(record) => (Some(record.id.clone()), record.deleted_at.clone()),
        };

        Ok(FormSubmission {
            target,
            payload: NdsPayload {
                name: non_blank(&self.name),
                description: non_blank(&self.description),
                value,
                deleted_at,
            },
        })
    }
}

impl Default for RecordForm {
    fn default() -> Self {
        Self::create()
    }
}

/// Parse a rate field as a finite, non-negative float.
///
/// # Errors
///
/// Returns [`FormError::InvalidRate`] for anything else.
pub fn parse_rate(input: &str) -> Result<f64, FormError> {
    let invalid = || FormError::InvalidRate {
        input: input.to_string(),
    };
    let value: f64 = input.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deleted_record() -> NdsRecord {
        NdsRecord {
            id: RecordId::from("r-1"),
            name: Some("Reduced".to_string()),
            description: Some("food".to_string()),
            value: 10.0,
            deleted_at: Some("2024-02-02T00:00:00.000Z".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn rejects_non_numeric_and_negative_rates() {
        for input in ["abc", "-5", "", "NaN", "inf", "1e400"] {
            let mut form = RecordForm::create();
            form.set_rate(input);
            let err = form.submit().expect_err("rate must be rejected");
            assert_eq!(
                err,
                FormError::InvalidRate {
                    input: input.to_string()
                }
            );
            assert_eq!(form.error(), Some(&err));
            assert_eq!(form.rate(), input);
        }
    }

    #[test]
    fn accepts_decimal_rate() {
        let mut form = RecordForm::create();
        form.set_name("Standard");
        form.set_rate(" 7.5 ");
        let submission = form.submit().expect("valid rate");
        assert!(submission.target.is_none());
        assert!((submission.payload.value - 7.5).abs() < f64::EPSILON);
        assert_eq!(submission.payload.name.as_deref(), Some("Standard"));
        assert!(submission.payload.description.is_none());
        assert!(submission.payload.deleted_at.is_none());
    }

    #[test]
    fn zero_is_a_valid_rate() {
        assert_eq!(parse_rate("0"), Ok(0.0));
    }

    #[test]
    fn editing_rate_clears_validation_message() {
        let mut form = RecordForm::create();
        form.set_rate("x");
        assert!(form.submit().is_err());
        form.set_rate("5");
        assert!(form.error().is_none());
    }

    #[test]
    fn edit_mode_prefills_and_keeps_deleted_marker() {
        let record = deleted_record();
        let mut form = RecordForm::edit(&record);
        assert!(form.is_edit());
        assert_eq!(form.name(), "Reduced");
        assert_eq!(form.description(), "food");
        assert_eq!(form.rate(), "10");

        form.set_description("  ");
        let submission = form.submit().expect("valid form");
        assert_eq!(submission.target, Some(RecordId::from("r-1")));
        assert_eq!(submission.payload.deleted_at, record.deleted_at);
        assert!(submission.payload.description.is_none());
    }

    #[test]
    fn default_form_is_empty_create() {
        let form = RecordForm::default();
        assert_eq!(form.mode(), &FormMode::Create);
        assert!(form.name().is_empty());
        assert!(form.rate().is_empty());
    }
}
