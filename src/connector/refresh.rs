//! Credential refresh contract
//!
//! A refresher fetches new secrets from external storage and installs them
//! with one atomic `replace_all`. The connector starts it as a detached task
//! and never awaits or inspects it.

use crate::credential::CredentialState;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Externally supplied routine that installs fresh credentials
///
/// Implemented for any `Fn(CredentialState) -> impl Future<Output = ()>`
/// closure. Errors are the refresher's own to report.
pub trait CredentialRefresher: Send + Sync + 'static {
    /// Fetch new secrets and install them into `state`
    fn refresh(&self, state: CredentialState) -> BoxFuture<'static, ()>;
}

impl<F, Fut> CredentialRefresher for F
where
    F: Fn(CredentialState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn refresh(&self, state: CredentialState) -> BoxFuture<'static, ()> {
        Box::pin(self(state))
    }
}

/// When a successful failover starts a refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Only one refresh runs at a time; failovers while one is in flight skip it
    #[default]
    SingleFlight,
    /// Every failover starts its own refresh
    Always,
}

/// What happened when a refresh was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshAction {
    Spawned,
    Suppressed,
    NoRuntime,
    Unconfigured,
}

impl RefreshAction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Spawned => "spawned",
            Self::Suppressed => "suppressed",
            Self::NoRuntime => "no_runtime",
            Self::Unconfigured => "unconfigured",
        }
    }
}

/// Clears the in-flight flag when the refresh task ends, even by panic
struct InFlight(CredentialState);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.end_refresh();
    }
}

/// Start a detached refresh according to `policy`
pub(crate) fn schedule(
    refresher: Option<&Arc<dyn CredentialRefresher>>,
    policy: RefreshPolicy,
    state: &CredentialState,
) -> RefreshAction {
    let Some(refresher) = refresher else {
        return RefreshAction::Unconfigured;
    };

    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return RefreshAction::NoRuntime;
    };

    let in_flight = match policy {
        RefreshPolicy::SingleFlight => {
            if !state.try_begin_refresh() {
                return RefreshAction::Suppressed;
            }
            Some(InFlight(state.clone()))
        }
        RefreshPolicy::Always => None,
    };

    let task = refresher.refresh(state.clone());
    handle.spawn(async move {
        let _in_flight = in_flight;
        task.await;
    });
    RefreshAction::Spawned
}
