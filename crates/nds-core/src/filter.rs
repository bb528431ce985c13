//! Pure list projections over the record collection.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nds_api_models::NdsRecord;

/// Which records the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecordFilter {
    /// Every record.
    #[default]
    All,
    /// Records without a soft-delete marker.
    Active,
    /// Soft-deleted records.
    Deleted,
}

impl RecordFilter {
    /// Whether `record` passes this filter.
    #[must_use]
    pub const fn matches(self, record: &NdsRecord) -> bool {
        match self {
            Self::All => true,
            Self::Active => !record.is_deleted(),
            Self::Deleted => record.is_deleted(),
        }
    }

    /// Project `records` through the filter, preserving order.
    #[must_use]
    pub fn apply(self, records: &[NdsRecord]) -> Vec<&NdsRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .collect()
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl Display for RecordFilter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RecordFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            other => Err(format!(
                "unknown filter '{other}' (expected all, active, or deleted)"
            )),
        }
    }
}

/// Per-row actions offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Open the edit form.
    Edit,
    /// Mark the record deleted.
    SoftDelete,
    /// Clear the soft-delete marker.
    Restore,
    /// Remove the record permanently.
    HardDelete,
}

/// Actions available for `record`: active rows can be edited or soft-deleted,
/// deleted rows can be restored or removed for good.
#[must_use]
pub const fn available_actions(record: &NdsRecord) -> &'static [RowAction] {
    if record.is_deleted() {
        &[RowAction::Restore, RowAction::HardDelete]
    } else {
        &[RowAction::Edit, RowAction::SoftDelete]
    }
}
