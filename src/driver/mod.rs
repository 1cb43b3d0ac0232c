//! Driver plumbing
//!
//! This module handles:
//! * [`Connect`]: the wrapped driver that negotiates a session from a full connection string
//! * [`Driver`]: the `open(dsn)` entry point a registry dispatches to
//! * [`DriverRegistry`]: named drivers opened through `open(name, dsn)`

mod registry;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use registry::DriverRegistry;

use crate::error::DriverError;
use crate::Result;
use futures::future::BoxFuture;

/// A database driver that connects with a fully formed connection string
///
/// Implementations report the backend status code (SQLSTATE for Postgres)
/// through [`DriverError::with_code`] so failures can be classified.
pub trait Connect: Send + Sync + 'static {
    /// Live connection type
    type Connection: Send + 'static;

    /// Connect using a connection string that embeds credentials
    fn connect<'a>(
        &'a self,
        dsn: &'a str,
    ) -> BoxFuture<'a, std::result::Result<Self::Connection, DriverError>>;
}

/// A driver that can be registered under a name and opened by DSN
pub trait Driver: Send + Sync + 'static {
    /// Live connection type
    type Connection: Send + 'static;

    /// Open a connection
    fn open<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<Self::Connection>>;
}
