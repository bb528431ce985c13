//! Shared error type, exit codes, and application context for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use nds_client::HttpNdsApi;
use nds_config::{ClientSettings, ConfigError, FileTokenStore, TokenStore};
use nds_core::{ApiError, PageController, PageError};

use crate::cli::OutputFormat;

/// Shown when a record command runs without a stored token.
pub(crate) const MISSING_TOKEN_MESSAGE: &str =
    "no API token stored (run `nds token fetch` or `nds token set <TOKEN>`)";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Statuses the server uses to reject input rather than fail.
const fn is_rejection(status: Option<u16>) -> bool {
    matches!(status, Some(400 | 409 | 422))
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        if is_rejection(err.status()) {
            Self::validation(err.user_message())
        } else {
            let message = err.user_message();
            Self::failure(anyhow::Error::new(err).context(message))
        }
    }
}

impl From<PageError> for CliError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Remote { source, .. } => source.into(),
            PageError::Busy => Self::failure(anyhow!(PageError::Busy)),
            other => Self::validation(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::EmptyToken | ConfigError::InvalidBaseUrl { .. } => {
                Self::validation(err.to_string())
            }
            other => Self::failure(other),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) api: HttpNdsApi,
    pub(crate) tokens: Arc<dyn TokenStore>,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Wire the file-backed token store into a fresh HTTP client.
    pub(crate) fn from_settings(
        settings: &ClientSettings,
        trace_id: &str,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&settings.storage_path));
        let api = HttpNdsApi::from_settings(settings, trace_id, Arc::clone(&tokens))
            .map_err(CliError::failure)?;
        Ok(Self {
            api,
            tokens,
            output,
        })
    }

    /// Fail fast when no token is stored.
    pub(crate) fn require_token(&self) -> CliResult<()> {
        if self.tokens.has_token() {
            Ok(())
        } else {
            Err(CliError::validation(MISSING_TOKEN_MESSAGE))
        }
    }

    /// Page controller over this context's API, gated on a stored token.
    pub(crate) fn page(&self) -> CliResult<PageController<HttpNdsApi>> {
        self.require_token()?;
        Ok(PageController::new(self.api.clone()))
    }
}
