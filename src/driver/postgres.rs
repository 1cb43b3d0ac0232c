//! Wrapped driver backed by tokio-postgres

use super::Connect;
use crate::error::DriverError;
use futures::future::BoxFuture;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::{Client, NoTls, Socket};

/// Connects through `tokio_postgres::connect`
///
/// The connection task is spawned on the current runtime; the returned
/// [`Client`] is the live connection. SQLSTATE codes from the server are
/// carried on the [`DriverError`].
#[derive(Debug, Clone)]
pub struct PgConnector<T = NoTls> {
    tls: T,
}

impl PgConnector<NoTls> {
    /// Plaintext connector
    pub fn new() -> Self {
        Self { tls: NoTls }
    }
}

impl Default for PgConnector<NoTls> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PgConnector<T> {
    /// Connector using the given TLS implementation
    pub fn with_tls(tls: T) -> Self {
        Self { tls }
    }
}

/// Map a tokio-postgres error, keeping its SQLSTATE
pub fn driver_error(err: tokio_postgres::Error) -> DriverError {
    match err.code().map(|state| state.code().to_owned()) {
        Some(code) => DriverError::new(err).with_code(code),
        None => DriverError::new(err),
    }
}

impl<T> Connect for PgConnector<T>
where
    T: MakeTlsConnect<Socket> + Clone + Send + Sync + 'static,
    T::Stream: Send + Sync + 'static,
    T::TlsConnect: Send + Sync,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    type Connection = Client;

    fn connect<'a>(
        &'a self,
        dsn: &'a str,
    ) -> BoxFuture<'a, std::result::Result<Client, DriverError>> {
        Box::pin(async move {
            let (client, connection) = tokio_postgres::connect(dsn, self.tls.clone())
                .await
                .map_err(driver_error)?;

            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::warn!(error = %e, "postgres connection closed with error");
                }
            });

            Ok(client)
        })
    }
}
