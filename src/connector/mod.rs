//! Rotating connector
//!
//! This module handles:
//! * Slot selection and the per-open flip of the active slot
//! * Failure classification (authentication vs everything else)
//! * The single failover attempt and its state machine
//! * Starting detached credential refreshes

mod classify;
mod refresh;
mod rotating;
mod state;

pub use classify::{sqlstate, FailureClass, FailureClassifier, SqlStateTable};
pub use refresh::{CredentialRefresher, RefreshPolicy};
pub use rotating::{RotatingConnector, RotatingConnectorBuilder};
pub use state::{AttemptOutcome, ConnectionAttempt, OpenState};
