//! Database facade.
//!
//! The provider is an abstract capability, not a vendor driver: hosts supply
//! one and advertise what execution modes it supports through a capability
//! bitmask. The facade surfaces capability errors up front and keeps the
//! close path idempotent.

use std::{
    future::Future,
    ops::BitOr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use herald_common::{RetryOrchestrator, error::DataError, tracing};

/// One result row, keyed by column name.
pub type Row = toml::value::Table;

/// Execution modes a [`DatabaseProvider`] may support.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const IMMEDIATE: Self = Self(1);
    pub const BATCH: Self = Self(1 << 1);
    pub const TRANSACTION: Self = Self(1 << 2);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The capability surface a host's database driver must provide.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Run a statement that yields rows. `None` when the provider produced
    /// no result set at all.
    ///
    /// # Errors
    ///
    /// Fails when the statement is rejected or the connection is lost.
    async fn query(
        &self,
        statement: &str,
        params: &[toml::Value],
    ) -> Result<Option<Vec<Row>>, DataError>;

    /// Run a statement for its side effects only.
    ///
    /// # Errors
    ///
    /// Fails when the statement is rejected or the connection is lost.
    async fn execute(&self, statement: &str, params: &[toml::Value]) -> Result<(), DataError>;

    /// Release the connection pool.
    ///
    /// # Errors
    ///
    /// Fails when the pool cannot be shut down cleanly.
    async fn close(&self) -> Result<(), DataError>;
}

/// Capability-checked wrapper around a [`DatabaseProvider`].
pub struct Database {
    provider: Arc<dyn DatabaseProvider>,
    closed: AtomicBool,
}

impl Database {
    #[must_use]
    pub fn new(provider: Arc<dyn DatabaseProvider>) -> Self {
        Self {
            provider,
            closed: AtomicBool::new(false),
        }
    }

    /// # Errors
    ///
    /// Propagates provider failures.
    pub async fn query(
        &self,
        statement: &str,
        params: &[toml::Value],
    ) -> Result<Option<Vec<Row>>, DataError> {
        self.provider.query(statement, params).await
    }

    /// # Errors
    ///
    /// Propagates provider failures.
    pub async fn execute(&self, statement: &str, params: &[toml::Value]) -> Result<(), DataError> {
        self.provider.execute(statement, params).await
    }

    /// The provider in batch mode.
    ///
    /// # Errors
    ///
    /// Fails when the provider does not advertise batch support.
    pub fn batch(&self) -> Result<&Arc<dyn DatabaseProvider>, DataError> {
        self.mode(Capabilities::BATCH, "batch")
    }

    /// The provider in transaction mode.
    ///
    /// # Errors
    ///
    /// Fails when the provider does not advertise transaction support.
    pub fn transaction(&self) -> Result<&Arc<dyn DatabaseProvider>, DataError> {
        self.mode(Capabilities::TRANSACTION, "transaction")
    }

    fn mode(
        &self,
        capability: Capabilities,
        name: &'static str,
    ) -> Result<&Arc<dyn DatabaseProvider>, DataError> {
        if self.provider.capabilities().contains(capability) {
            Ok(&self.provider)
        } else {
            Err(DataError::UnsupportedCapability(name))
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Release the provider. Safe to call more than once; only the first
    /// call reaches the provider.
    ///
    /// # Errors
    ///
    /// Propagates the provider's shutdown failure.
    pub async fn close(&self) -> Result<(), DataError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        tracing::debug!("Closing connection pool");
        self.provider.close().await
    }
}

/// Coordinates a single in-flight connection handshake across overlapping
/// callers.
///
/// The first caller owns the handshake and drives it through the retry
/// budget; callers arriving while it is in flight wait for the outcome
/// instead of opening a second one.
pub struct ConnectionGate {
    connecting: AtomicBool,
    connected: AtomicBool,
    retry: RetryOrchestrator,
}

impl ConnectionGate {
    #[must_use]
    pub fn new(retry: RetryOrchestrator) -> Self {
        Self {
            connecting: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            retry,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Ensure a connection is established, invoking `connect` as needed.
    /// Attempt failures are absorbed and retried within the budget.
    ///
    /// # Errors
    ///
    /// Fails with [`DataError::ConnectionFailed`] once the retry budget is
    /// exhausted without a successful handshake.
    pub async fn establish<F, Fut>(&self, mut connect: F) -> Result<(), DataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), DataError>>,
    {
        if self.connected.load(Ordering::SeqCst) {
            return Ok(());
        }

        if self.connecting.swap(true, Ordering::SeqCst) {
            // Another caller owns the handshake; wait for it to settle.
            tracing::debug!("Connection is already being established");
            RetryOrchestrator::wait_for(
                || !self.connecting.load(Ordering::SeqCst),
                RetryOrchestrator::DEFAULT_WAIT_ATTEMPTS,
            )
            .await;

            return if self.connected.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DataError::ConnectionFailed)
            };
        }

        let outcome: Result<bool, DataError> = self
            .retry
            .repeat_until(
                || {
                    tracing::debug!("Establishing connection to the database");
                    let attempt = connect();
                    async move {
                        match attempt.await {
                            Ok(()) => Ok(true),
                            Err(err) => {
                                tracing::warn!(error = %err, "Connection attempt failed");
                                Ok(false)
                            }
                        }
                    }
                },
                |connected| *connected,
            )
            .await;

        let connected = outcome.unwrap_or(false);
        self.connected.store(connected, Ordering::SeqCst);
        self.connecting.store(false, Ordering::SeqCst);

        if connected {
            Ok(())
        } else {
            Err(DataError::ConnectionFailed)
        }
    }
}
