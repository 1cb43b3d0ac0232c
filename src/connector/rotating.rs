//! Rotating connector

use super::classify::{FailureClass, FailureClassifier, SqlStateTable};
use super::refresh::{self, CredentialRefresher, RefreshAction, RefreshPolicy};
use super::state::{AttemptOutcome, ConnectionAttempt, OpenState};
use crate::client::DsnTemplate;
use crate::credential::{CredentialSnapshot, CredentialState};
use crate::driver::{Connect, Driver};
use crate::error::DriverError;
use crate::metrics::{counters, histograms, labels};
use crate::{Error, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

type AttemptResult<C> = std::result::Result<C, (AttemptOutcome, DriverError)>;

/// Opens connections with alternating credential slots
///
/// Each open tries the slot that was active when it started and advances
/// the active slot for the next caller. An authentication failure fails over
/// once to whatever slot is active then; if that succeeds, a credential
/// refresh is started in the background.
///
/// The state lock is only held for in-memory reads and flips, never across
/// the driver's connect.
pub struct RotatingConnector<D> {
    driver: D,
    state: CredentialState,
    classifier: Arc<dyn FailureClassifier>,
    refresher: Option<Arc<dyn CredentialRefresher>>,
    refresh_policy: RefreshPolicy,
}

impl<D: Connect> RotatingConnector<D> {
    /// Connector with the default Postgres classification and no refresher
    pub fn new(driver: D, state: CredentialState) -> Self {
        Self::builder(driver, state).build()
    }

    /// Create a builder
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let connector = RotatingConnector::builder(PgConnector::new(), state)
    ///     .refresher(|state: CredentialState| async move {
    ///         // fetch secrets, then one atomic replace
    ///         state.replace_all(odd, even, Slot::Odd);
    ///     })
    ///     .refresh_policy(RefreshPolicy::SingleFlight)
    ///     .build();
    /// ```
    pub fn builder(driver: D, state: CredentialState) -> RotatingConnectorBuilder<D> {
        RotatingConnectorBuilder {
            driver,
            state,
            classifier: None,
            refresher: None,
            refresh_policy: RefreshPolicy::default(),
        }
    }

    /// Shared credential state
    pub fn state(&self) -> &CredentialState {
        &self.state
    }

    /// Wrapped driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Refresh policy in effect
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    /// Open a connection from a credential-free template
    ///
    /// A malformed template fails with [`Error::DsnParse`] before the active
    /// slot is touched.
    pub async fn open(&self, dsn_template: &str) -> Result<D::Connection> {
        let template = DsnTemplate::parse(dsn_template)?;
        self.open_template(&template).await
    }

    /// Open a connection from a parsed template
    pub async fn open_template(&self, template: &DsnTemplate) -> Result<D::Connection> {
        let started = Instant::now();
        self.run(template, started)
            .instrument(tracing::info_span!("rotating_open", dsn = %template))
            .await
    }

    async fn run(&self, template: &DsnTemplate, started: Instant) -> Result<D::Connection> {
        let mut state = OpenState::Start;

        let primary = self.state.snapshot_active();
        self.state.flip_active();
        state.transition(OpenState::TryPrimary)?;

        let primary_err = match self.attempt(template, &primary).await {
            Ok(conn) => {
                state.transition(OpenState::Success)?;
                finish(labels::RESULT_PRIMARY, started);
                return Ok(conn);
            }
            Err((AttemptOutcome::AuthFailure, err)) => err,
            Err((_, err)) => {
                state.transition(OpenState::OtherFailure)?;
                finish(labels::RESULT_ERROR, started);
                return Err(Error::Driver(err));
            }
        };

        state.transition(OpenState::Failover)?;
        counters::failover();
        // Re-read: a concurrent open or refresh may have moved things on.
        let fallback = self.state.snapshot_active();
        tracing::warn!(
            slot = %primary.slot,
            code = primary_err.code().unwrap_or_default(),
            fallback_slot = %fallback.slot,
            "credentials rejected, failing over"
        );

        state.transition(OpenState::TrySecondary)?;
        match self.attempt(template, &fallback).await {
            Ok(conn) => {
                state.transition(OpenState::Success)?;
                self.request_refresh();
                finish(labels::RESULT_FAILOVER, started);
                Ok(conn)
            }
            Err((AttemptOutcome::AuthFailure, err)) => {
                state.transition(OpenState::BothFailed)?;
                tracing::warn!(
                    primary_slot = %primary.slot,
                    fallback_slot = %fallback.slot,
                    "both credential slots rejected"
                );
                finish(labels::RESULT_BOTH_REJECTED, started);
                Err(Error::BothCredentialsInvalid {
                    primary_slot: primary.slot,
                    fallback_slot: fallback.slot,
                    primary: primary_err,
                    fallback: err,
                })
            }
            Err((_, err)) => {
                state.transition(OpenState::OtherFailure)?;
                finish(labels::RESULT_ERROR, started);
                Err(Error::Driver(err))
            }
        }
    }

    async fn attempt(
        &self,
        template: &DsnTemplate,
        snapshot: &CredentialSnapshot,
    ) -> AttemptResult<D::Connection> {
        let dsn = template.render(&snapshot.credential);
        let result = self.driver.connect(dsn.with_secrets()).await;

        let outcome = match &result {
            Ok(_) => AttemptOutcome::Success,
            Err(err) => match self.classifier.classify(err) {
                FailureClass::Authentication => AttemptOutcome::AuthFailure,
                FailureClass::Other => AttemptOutcome::OtherFailure,
            },
        };

        let attempt = ConnectionAttempt {
            dsn_template: template.to_string(),
            tried_slot: snapshot.slot,
            outcome,
        };
        counters::attempt(attempt.tried_slot, attempt.outcome);
        tracing::debug!(?attempt, dsn = %dsn, "connect attempt finished");

        result.map_err(|err| (outcome, err))
    }

    fn request_refresh(&self) {
        let action = refresh::schedule(self.refresher.as_ref(), self.refresh_policy, &self.state);
        counters::refresh(action.as_str());
        match action {
            RefreshAction::Spawned => tracing::info!("credential refresh scheduled"),
            RefreshAction::Suppressed => {
                tracing::debug!("credential refresh already in flight")
            }
            RefreshAction::NoRuntime => {
                tracing::warn!("no tokio runtime available, credential refresh skipped")
            }
            RefreshAction::Unconfigured => {
                tracing::warn!("no credential refresher configured, credential refresh skipped")
            }
        }
    }
}

fn finish(result: &'static str, started: Instant) {
    counters::open_completed(result);
    histograms::open_duration(result, started.elapsed());
}

impl<D: Connect> Driver for RotatingConnector<D> {
    type Connection = D::Connection;

    fn open<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<Self::Connection>> {
        Box::pin(RotatingConnector::open(self, dsn))
    }
}

impl<D> std::fmt::Debug for RotatingConnector<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingConnector")
            .field("state", &self.state)
            .field("refresh_policy", &self.refresh_policy)
            .field("refresher", &self.refresher.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RotatingConnector`]
pub struct RotatingConnectorBuilder<D> {
    driver: D,
    state: CredentialState,
    classifier: Option<Arc<dyn FailureClassifier>>,
    refresher: Option<Arc<dyn CredentialRefresher>>,
    refresh_policy: RefreshPolicy,
}

impl<D: Connect> RotatingConnectorBuilder<D> {
    /// Set the failure classifier
    ///
    /// Default: [`SqlStateTable::postgres`]
    pub fn classifier(mut self, classifier: impl FailureClassifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Set the routine started after a successful failover
    ///
    /// Default: none (failover still happens, nothing is refreshed)
    pub fn refresher(mut self, refresher: impl CredentialRefresher) -> Self {
        self.refresher = Some(Arc::new(refresher));
        self
    }

    /// Set the refresh policy
    ///
    /// Default: [`RefreshPolicy::SingleFlight`]
    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Build the connector
    pub fn build(self) -> RotatingConnector<D> {
        RotatingConnector {
            driver: self.driver,
            state: self.state,
            classifier: self
                .classifier
                .unwrap_or_else(|| Arc::new(SqlStateTable::postgres())),
            refresher: self.refresher,
            refresh_policy: self.refresh_policy,
        }
    }
}
