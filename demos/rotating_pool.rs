//! Rotating credentials end to end, without a database
//!
//! A simulated server accepts whatever pairs the simulated secret store
//! currently holds. Halfway through, the odd password is rotated on both;
//! opens that still carry the old odd password fail over to the even slot
//! and trigger one refresh that installs the new secret.
//!
//! Run with: RUST_LOG=pg_rotating=debug cargo run --example rotating_pool

use futures::future::BoxFuture;
use pg_rotating::credential::CredentialState;
use pg_rotating::{
    Connect, DriverError, DriverRegistry, RefreshPolicy, RotatingConnector, SecretDocument,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DRIVER_NAME: &str = "postgresrotating";
const TEMPLATE: &str = "postgres://db.internal:5432/orders?sslmode=require";

/// Secret store and server share this document
#[derive(Clone)]
struct SecretStore {
    json: Arc<Mutex<String>>,
}

impl SecretStore {
    fn new(doc: &SecretDocument) -> pg_rotating::Result<Self> {
        Ok(Self {
            json: Arc::new(Mutex::new(doc.to_json()?)),
        })
    }

    fn read(&self) -> String {
        self.json.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn rotate_odd(&self, password: &str) -> pg_rotating::Result<()> {
        let mut doc = SecretDocument::from_json(&self.read())?;
        doc.odd_password = password.to_string();
        *self.json.lock().unwrap_or_else(|e| e.into_inner()) = doc.to_json()?;
        Ok(())
    }
}

/// Accepts exactly the pairs currently in the store
struct SimulatedServer {
    store: SecretStore,
}

impl Connect for SimulatedServer {
    type Connection = String;

    fn connect<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<String, DriverError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;

            let doc = SecretDocument::from_json(&self.store.read()).map_err(DriverError::new)?;
            let accepted = [
                format!("{}:{}@", doc.odd_username, doc.odd_password),
                format!("{}:{}@", doc.even_username, doc.even_password),
            ];
            match accepted.iter().find(|userinfo| dsn.contains(userinfo.as_str())) {
                Some(userinfo) => Ok(userinfo.trim_end_matches('@').to_string()),
                None => Err(DriverError::new("password authentication failed").with_code("28P01")),
            }
        })
    }
}

#[tokio::main]
async fn main() -> pg_rotating::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pg_rotating=info")),
        )
        .init();

    let initial = SecretDocument::from_json(
        r#"{
            "odd_username": "orders_odd",
            "odd_password": "odd-v1",
            "even_username": "orders_even",
            "even_password": "even-v1",
            "active_credential": "odd"
        }"#,
    )?;
    let store = SecretStore::new(&initial)?;

    let refresher_store = store.clone();
    let connector = RotatingConnector::builder(
        SimulatedServer {
            store: store.clone(),
        },
        CredentialState::from_document(initial),
    )
    .refresh_policy(RefreshPolicy::SingleFlight)
    .refresher(move |state: CredentialState| {
        let store = refresher_store.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            match SecretDocument::from_json(&store.read()) {
                Ok(doc) => doc.install(&state),
                Err(e) => tracing::error!(error = %e, "could not refresh credentials"),
            }
        }
    })
    .build();

    let registry = Arc::new(DriverRegistry::new());
    registry.register(DRIVER_NAME, connector)?;

    for round in 0..2 {
        if round == 1 {
            store.rotate_odd("odd-v2")?;
            tracing::info!("rotated odd password in the secret store");
        }

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for _ in 0..5 {
                        match registry.open(DRIVER_NAME, TEMPLATE).await {
                            Ok(user) => tracing::info!(worker, user = %user, "connected"),
                            Err(e) => tracing::warn!(worker, error = %e, "open failed"),
                        }
                    }
                })
            })
            .collect();

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "worker panicked");
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Ok(())
}
