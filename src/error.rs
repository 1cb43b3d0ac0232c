//! Error types for pg-rotating

use crate::credential::Slot;
use std::fmt;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Connection string template could not be parsed
    #[error("invalid connection string template: {0}")]
    DsnParse(String),

    /// Both credential slots were rejected during a single open
    #[error(
        "both credential slots rejected: {primary_slot} slot failed with '{primary}', \
         {fallback_slot} slot rejected too"
    )]
    BothCredentialsInvalid {
        /// Slot tried first
        primary_slot: Slot,
        /// Slot tried on failover
        fallback_slot: Slot,
        /// Error from the first attempt
        primary: DriverError,
        /// Error from the failover attempt
        #[source]
        fallback: DriverError,
    },

    /// Non-authentication failure from the wrapped driver, passed through unchanged
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Invalid state transition of an open call
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// No driver registered under this name
    #[error("no driver registered as '{0}'")]
    UnknownDriver(String),

    /// A driver is already registered under this name
    #[error("driver '{0}' is already registered")]
    DuplicateDriver(String),

    /// Secret document is structurally valid JSON but unusable
    #[error("invalid credential secret: {0}")]
    Secret(String),

    /// Secret document is not valid JSON
    #[error("credential secret is not valid JSON: {0}")]
    SecretJson(#[from] serde_json::Error),
}

impl Error {
    /// Whether both credential slots were rejected in the same open call
    pub fn is_both_credentials_invalid(&self) -> bool {
        matches!(self, Self::BothCredentialsInvalid { .. })
    }

    /// Backend status code of the underlying driver error, if any
    ///
    /// For [`Error::BothCredentialsInvalid`] this is the code of the failover attempt.
    pub fn driver_code(&self) -> Option<&str> {
        match self {
            Self::Driver(err) => err.code(),
            Self::BothCredentialsInvalid { fallback, .. } => fallback.code(),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by a wrapped driver
///
/// Carries the driver's own error untouched plus the backend status code
/// (a SQLSTATE for Postgres) used to classify the failure.
pub struct DriverError {
    code: Option<String>,
    inner: BoxError,
}

impl DriverError {
    /// Wrap a driver error with no status code
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self {
            code: None,
            inner: err.into(),
        }
    }

    /// Attach a backend status code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Backend status code, if the driver reported one
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Borrow the wrapped error as a concrete type
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Unwrap into the driver's original error
    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl fmt::Debug for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverError")
            .field("code", &self.code)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for DriverError {
    // Display already renders the wrapped error, so the chain continues below it.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}
