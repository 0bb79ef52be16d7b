//! Application wiring.
//!
//! [`Foundation::setup`] builds the application context from configuration
//! and the host's collaborators, runs the host's closure against it, and
//! releases resources exactly once whether the closure succeeds or fails.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use herald_common::{
    logging::{LogTransport, TransportLogger},
    tracing,
};
use herald_config::{Configuration, ConfigurationOptions, EnvironmentProvider, RemoteConnector};
use herald_dispatch::{DispatchEngine, DispatchOptions, TransportFactory};
use serde::{Deserialize, Serialize};

use crate::data::{Database, DatabaseProvider};

/// The configuration key holding the dispatch engine's options.
const COMMUNICATION_KEY: &str = "communication";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct FoundationOptions {
    #[serde(default)]
    pub configuration: ConfigurationOptions,
}

/// The host-supplied collaborators behind the external interfaces: message
/// transports, the remote configuration store, the database driver, and the
/// structured-log sink.
#[derive(Clone)]
pub struct Collaborators {
    pub transports: Arc<dyn TransportFactory>,
    pub remote_config: Option<Arc<dyn RemoteConnector>>,
    pub database: Option<Arc<dyn DatabaseProvider>>,
    pub log_transport: Option<Arc<dyn LogTransport>>,
}

impl Collaborators {
    #[must_use]
    pub fn new(transports: Arc<dyn TransportFactory>) -> Self {
        Self {
            transports,
            remote_config: None,
            database: None,
            log_transport: None,
        }
    }
}

/// The wired application context handed to the host's closure.
#[derive(Clone)]
pub struct Context {
    pub configuration: Arc<Configuration>,
    pub communications: Arc<DispatchEngine>,
    pub database: Option<Arc<Database>>,
    pub logger: Option<Arc<TransportLogger>>,
}

pub struct Foundation {
    options: FoundationOptions,
    collaborators: Collaborators,
    cleanup_ran: AtomicBool,
}

impl Foundation {
    #[must_use]
    pub fn new(options: FoundationOptions, collaborators: Collaborators) -> Self {
        Self {
            options,
            collaborators,
            cleanup_ran: AtomicBool::new(false),
        }
    }

    /// Build the application context, run `callback` against it, and release
    /// resources afterwards. Cleanup runs on the failure path too, and at
    /// most once per foundation.
    pub async fn setup<T, E, F, Fut>(&self, callback: F) -> Result<T, E>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let configuration = Arc::new(Configuration::with_sources(
            self.options.configuration.clone(),
            Arc::new(EnvironmentProvider::new()),
            self.collaborators.remote_config.clone(),
        ));

        let dispatch = match configuration.get_as::<DispatchOptions>(COMMUNICATION_KEY).await {
            Ok(options) => options.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "Malformed communication configuration, dispatching nothing");
                DispatchOptions::default()
            }
        };
        let communications = Arc::new(DispatchEngine::from_options(
            &dispatch,
            self.collaborators.transports.as_ref(),
        ));

        let database = self
            .collaborators
            .database
            .clone()
            .map(|provider| Arc::new(Database::new(provider)));
        let logger = self
            .collaborators
            .log_transport
            .clone()
            .map(|transport| Arc::new(TransportLogger::new(transport)));

        let context = Context {
            configuration,
            communications,
            database: database.clone(),
            logger: logger.clone(),
        };

        let result = callback(context).await;

        if result.is_err() {
            tracing::error!("Application callback failed, releasing resources");
        }
        self.finalise(database.as_deref(), logger.as_deref()).await;

        result
    }

    /// Close the database and drain the log transport. Runs at most once
    /// across all paths that reach it.
    async fn finalise(&self, database: Option<&Database>, logger: Option<&TransportLogger>) {
        if self.cleanup_ran.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(database) = database
            && let Err(err) = database.close().await
        {
            tracing::warn!(error = %err, "Failed to close the database");
        }

        if let Some(logger) = logger {
            logger.flush().await;
        }
    }
}
