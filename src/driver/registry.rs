//! Named driver registry

use super::Driver;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type SharedDriver<C> = Arc<dyn Driver<Connection = C>>;

/// Registry of drivers that share a connection type
///
/// # Examples
///
/// ```ignore
/// let registry = DriverRegistry::new();
/// registry.register("postgresrotating", connector)?;
/// let client = registry.open("postgresrotating", "postgres://db:5432/app").await?;
/// ```
pub struct DriverRegistry<C: Send + 'static> {
    drivers: RwLock<HashMap<String, SharedDriver<C>>>,
}

impl<C: Send + 'static> DriverRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a driver under `name`
    ///
    /// Fails with [`Error::DuplicateDriver`] if the name is taken.
    pub fn register<D>(&self, name: impl Into<String>, driver: D) -> Result<()>
    where
        D: Driver<Connection = C>,
    {
        self.register_shared(name, Arc::new(driver))
    }

    /// Register an already shared driver under `name`
    pub fn register_shared(&self, name: impl Into<String>, driver: SharedDriver<C>) -> Result<()> {
        let name = name.into();
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        if drivers.contains_key(&name) {
            return Err(Error::DuplicateDriver(name));
        }
        tracing::debug!(driver = %name, "driver registered");
        drivers.insert(name, driver);
        Ok(())
    }

    /// Look up a driver by name
    pub fn get(&self, name: &str) -> Option<SharedDriver<C>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Open a connection through the driver registered as `name`
    pub async fn open(&self, name: &str, dsn: &str) -> Result<C> {
        // Clone out of the lock; it must not be held across the connect.
        let driver = self
            .get(name)
            .ok_or_else(|| Error::UnknownDriver(name.to_string()))?;
        driver.open(dsn).await
    }

    /// Registered driver names, sorted
    pub fn drivers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl<C: Send + 'static> Default for DriverRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static> std::fmt::Debug for DriverRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("DriverRegistry")
            .field("drivers", &drivers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    struct Echo(&'static str);

    impl Driver for Echo {
        type Connection = String;

        fn open<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<String>> {
            Box::pin(async move { Ok(format!("{}:{}", self.0, dsn)) })
        }
    }

    #[test]
    fn test_open_by_name() {
        let registry = DriverRegistry::new();
        registry.register("a", Echo("a")).unwrap();
        registry.register("b", Echo("b")).unwrap();

        let conn = tokio_test::block_on(registry.open("b", "postgres://db/app")).unwrap();
        assert_eq!(conn, "b:postgres://db/app");
        assert_eq!(registry.drivers(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = DriverRegistry::new();
        registry.register("postgresrotating", Echo("first")).unwrap();
        let err = registry
            .register("postgresrotating", Echo("second"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDriver(name) if name == "postgresrotating"));

        let conn = tokio_test::block_on(registry.open("postgresrotating", "x")).unwrap();
        assert_eq!(conn, "first:x");
    }

    #[test]
    fn test_unknown_driver() {
        let registry: DriverRegistry<String> = DriverRegistry::new();
        let err = tokio_test::block_on(registry.open("missing", "x")).unwrap_err();
        assert!(matches!(err, Error::UnknownDriver(name) if name == "missing"));
        assert!(registry.get("missing").is_none());
    }
}
