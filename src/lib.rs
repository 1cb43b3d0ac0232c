//! pg-rotating: zero-downtime credential rotation for Postgres connections
//!
//! The same logical account is provisioned as two interchangeable credential
//! pairs, the *odd* and *even* slots. Every new connection tries the slot
//! that is currently active and advances the active slot for the next one.
//! When the server rejects a pair (SQLSTATE 28000 or 28P01), the open fails
//! over once to the other slot and, on success, starts a background refresh
//! of both slots from the secret store.
//!
//! ```no_run
//! # async fn example() -> pg_rotating::Result<()> {
//! use pg_rotating::credential::{Credential, CredentialState, Slot};
//! use pg_rotating::driver::postgres::PgConnector;
//! use pg_rotating::RotatingConnector;
//!
//! let state = CredentialState::new(
//!     Credential::new("app_odd", "odd-secret"),
//!     Credential::new("app_even", "even-secret"),
//!     Slot::Odd,
//! );
//!
//! let connector = RotatingConnector::builder(PgConnector::new(), state)
//!     .refresher(|state: CredentialState| async move {
//!         // Fetch both pairs from the secret store, then install them
//!         // in one critical section.
//!         state.replace_all(
//!             Credential::new("app_odd", "rotated-odd"),
//!             Credential::new("app_even", "rotated-even"),
//!             Slot::Even,
//!         );
//!     })
//!     .build();
//!
//! let client = connector
//!     .open("postgres://db.example.com:5432/orders?sslmode=disable")
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod connector;
pub mod credential;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod secret;

pub use client::DsnTemplate;
pub use connector::{RefreshPolicy, RotatingConnector};
pub use credential::{Credential, CredentialState, Slot};
pub use driver::{Connect, Driver, DriverRegistry};
pub use error::{DriverError, Error, Result};
pub use secret::SecretDocument;
