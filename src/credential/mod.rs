//! Credential state
//!
//! This module handles:
//! * The two interchangeable credential slots (odd/even)
//! * The active-slot indicator consulted by each open
//! * Atomic snapshot, flip and wholesale replacement under one lock

mod slot;
mod state;

pub use slot::{Credential, CredentialSnapshot, Slot};
pub use state::{CredentialGuard, CredentialState};
