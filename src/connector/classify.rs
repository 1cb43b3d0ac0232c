//! Failure classification
//!
//! Decides whether a driver error means "these credentials were rejected"
//! (worth failing over to the other slot) or anything else (returned as is).

use crate::error::DriverError;
use std::collections::HashMap;

/// Postgres SQLSTATE codes
pub mod sqlstate {
    /// Class 28: invalid authorization specification
    pub const INVALID_AUTHORIZATION_SPECIFICATION: &str = "28000";

    /// Class 28: invalid password
    pub const INVALID_PASSWORD: &str = "28P01";
}

/// How a failed connect attempt is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Credentials were rejected; fail over to the other slot
    Authentication,
    /// Anything else; returned to the caller unchanged
    Other,
}

/// Classifies driver errors
///
/// Implemented for [`SqlStateTable`] and for any
/// `Fn(&DriverError) -> FailureClass` closure.
pub trait FailureClassifier: Send + Sync {
    /// Classify a failed connect attempt
    fn classify(&self, err: &DriverError) -> FailureClass;
}

impl<F> FailureClassifier for F
where
    F: Fn(&DriverError) -> FailureClass + Send + Sync,
{
    fn classify(&self, err: &DriverError) -> FailureClass {
        self(err)
    }
}

/// Classification keyed by backend status code
///
/// Codes absent from the table, and errors without a code, classify as
/// [`FailureClass::Other`].
#[derive(Debug, Clone, Default)]
pub struct SqlStateTable {
    codes: HashMap<String, FailureClass>,
}

impl SqlStateTable {
    /// Table with no entries; everything classifies as `Other`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Postgres authentication failures: 28000 and 28P01
    pub fn postgres() -> Self {
        Self::empty()
            .with_code(
                sqlstate::INVALID_AUTHORIZATION_SPECIFICATION,
                FailureClass::Authentication,
            )
            .with_code(sqlstate::INVALID_PASSWORD, FailureClass::Authentication)
    }

    /// Add or override an entry
    pub fn with_code(mut self, code: impl Into<String>, class: FailureClass) -> Self {
        self.codes.insert(code.into(), class);
        self
    }

    /// Class for a status code
    pub fn lookup(&self, code: &str) -> FailureClass {
        self.codes
            .get(code)
            .copied()
            .unwrap_or(FailureClass::Other)
    }
}

impl FailureClassifier for SqlStateTable {
    fn classify(&self, err: &DriverError) -> FailureClass {
        err.code()
            .map_or(FailureClass::Other, |code| self.lookup(code))
    }
}
