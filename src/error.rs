//! Error types.
//!
//! - `ResolveError` is what the library returns: source failures and bad input.
//!   "No observation in range" is *not* an error, see `domain::Resolution::NotFound`.
//! - `AppError` is what the `asof` binary reports, carrying a process exit code.

use thiserror::Error;

/// Exit code for bad arguments, bad configuration, or unknown series.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for failures writing output files.
pub const EXIT_OUTPUT: u8 = 3;
/// Exit code for data-source failures.
pub const EXIT_SOURCE: u8 = 4;

/// Failure of a resolution call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The external fetch failed (network, HTTP status, auth, rate limit, malformed payload).
    #[error("{provider} unavailable: {message}")]
    SourceUnavailable {
        /// Name of the data source, e.g. "fred".
        provider: &'static str,
        message: String,
    },

    /// Malformed date, blank or unrecognized series id, negative window.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ResolveError {
    pub fn unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            provider,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let exit_code = match err {
            ResolveError::InvalidInput(_) => EXIT_USAGE,
            ResolveError::SourceUnavailable { .. } => EXIT_SOURCE,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
