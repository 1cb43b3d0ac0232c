//! Secret-store document layout
//!
//! Rotating secrets are commonly stored as one JSON document holding both
//! slots and the slot to try first:
//!
//! ```json
//! {
//!     "odd_username": "app_odd",
//!     "odd_password": "...",
//!     "even_username": "app_even",
//!     "even_password": "...",
//!     "active_credential": "even"
//! }
//! ```
//!
//! A refresher fetches the document, parses it with
//! [`SecretDocument::from_json`] and installs it with
//! [`SecretDocument::install`].

use crate::credential::{Credential, CredentialState, Slot};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Both credential slots as stored in a secret store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDocument {
    /// Odd slot username
    pub odd_username: String,
    /// Odd slot password
    pub odd_password: String,
    /// Even slot username
    pub even_username: String,
    /// Even slot password
    pub even_password: String,
    /// Slot to try first
    pub active_credential: Slot,
}

impl SecretDocument {
    /// Parse a JSON secret
    ///
    /// Usernames must be non-empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.odd_username.is_empty() || doc.even_username.is_empty() {
            return Err(Error::Secret("username must not be empty".into()));
        }
        Ok(doc)
    }

    /// Serialize back to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Split into (odd, even, active)
    pub fn into_parts(self) -> (Credential, Credential, Slot) {
        (
            Credential::new(self.odd_username, self.odd_password),
            Credential::new(self.even_username, self.even_password),
            self.active_credential,
        )
    }

    /// Install into `state` with one atomic replace
    pub fn install(self, state: &CredentialState) {
        let (odd, even, active) = self.into_parts();
        state.replace_all(odd, even, active);
        tracing::info!(active = %active, "credential secret installed");
    }
}

impl fmt::Debug for SecretDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDocument")
            .field("odd_username", &self.odd_username)
            .field("even_username", &self.even_username)
            .field("active_credential", &self.active_credential)
            .finish_non_exhaustive()
    }
}

impl CredentialState {
    /// Initial state from a secret document
    pub fn from_document(doc: SecretDocument) -> Self {
        let (odd, even, active) = doc.into_parts();
        Self::new(odd, even, active)
    }
}
