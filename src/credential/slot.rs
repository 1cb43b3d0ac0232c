//! Credential slots and credential pairs

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two interchangeable credential slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// The "odd" credential pair
    Odd,
    /// The "even" credential pair
    Even,
}

impl Slot {
    /// The other slot
    pub fn other(self) -> Self {
        match self {
            Self::Odd => Self::Even,
            Self::Even => Self::Odd,
        }
    }

    /// Lowercase name, also used as a metrics label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Odd => "odd",
            Self::Even => "even",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "odd" => Ok(Self::Odd),
            "even" => Ok(Self::Even),
            _ => Err(Error::Secret(format!(
                "invalid credential slot '{}': expected odd or even",
                s
            ))),
        }
    }
}

/// A username/password pair
///
/// `Debug` output never contains the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Copy of the active credential pair taken under the state lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSnapshot {
    /// Slot the pair was read from
    pub slot: Slot,
    /// The pair itself
    pub credential: Credential,
}

impl CredentialSnapshot {
    /// Username of the snapshotted pair
    pub fn username(&self) -> &str {
        self.credential.username()
    }

    /// Password of the snapshotted pair
    pub fn password(&self) -> &str {
        self.credential.password()
    }
}
