//! Command handlers grouped by concern.

pub(crate) mod records;
pub(crate) mod shell;
pub(crate) mod token;
