use std::{sync::Arc, time::Duration};

use ahash::AHashMap;
use herald_common::{error::ConfigError, tracing};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::{
    sync::{OnceCell, RwLock},
    time::Instant,
};

use crate::{
    environment::EnvironmentProvider,
    provider::{ConfigProvider, Fetch},
    remote::{RemoteConnector, RemoteProvider},
};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConfigurationOptions {
    /// How long a cached value is served without consulting the provider.
    #[serde(default = "defaults::cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// The environment key whose value, when present, is the connection
    /// string for the remote configuration store.
    #[serde(default = "defaults::connection_string_key")]
    pub connection_string_key: String,
}

impl Default for ConfigurationOptions {
    fn default() -> Self {
        Self {
            cache_ttl_ms: defaults::cache_ttl_ms(),
            connection_string_key: defaults::connection_string_key(),
        }
    }
}

mod defaults {
    pub(super) const fn cache_ttl_ms() -> u64 {
        600_000
    }

    pub(super) fn connection_string_key() -> String {
        "configuration".to_string()
    }
}

struct CacheEntry {
    value: toml::Value,
    tag: Option<String>,
    entered: Instant,
}

/// Cached configuration lookup over a lazily-selected provider.
///
/// The provider is chosen exactly once, on first use: remote when the
/// connection-string key resolves through the environment and the connector
/// can reach the store, the environment itself otherwise. Lookups racing the
/// selection all await the same initialisation.
pub struct Configuration {
    environment: Arc<EnvironmentProvider>,
    connector: Option<Arc<dyn RemoteConnector>>,
    provider: OnceCell<Arc<dyn ConfigProvider>>,
    cache: RwLock<AHashMap<String, CacheEntry>>,
    ttl: Duration,
    connection_string_key: String,
}

impl Configuration {
    #[must_use]
    pub fn new(options: ConfigurationOptions) -> Self {
        Self::with_sources(options, Arc::new(EnvironmentProvider::new()), None)
    }

    #[must_use]
    pub fn with_sources(
        options: ConfigurationOptions,
        environment: Arc<EnvironmentProvider>,
        connector: Option<Arc<dyn RemoteConnector>>,
    ) -> Self {
        Self {
            environment,
            connector,
            provider: OnceCell::new(),
            cache: RwLock::new(AHashMap::new()),
            ttl: Duration::from_millis(options.cache_ttl_ms),
            connection_string_key: options.connection_string_key,
        }
    }

    /// Look up `key`, consulting the provider only when the cached value is
    /// missing or older than the TTL. A provider answer carrying the cached
    /// entry's revalidation tag restarts the TTL without replacing the value.
    pub async fn get(&self, key: &str) -> Option<toml::Value> {
        let stale = {
            let cache = self.cache.read().await;
            match cache.get(key) {
                Some(entry) if entry.entered.elapsed() <= self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(entry) => Some((entry.value.clone(), entry.tag.clone())),
                None => None,
            }
        };

        let provider = self.provider().await;
        let tag = stale.as_ref().and_then(|(_, tag)| tag.as_deref());

        match provider.fetch(key, tag).await {
            Ok(Fetch::Absent) => {
                self.cache.write().await.remove(key);
                None
            }
            Ok(Fetch::Unchanged) => {
                let mut cache = self.cache.write().await;
                if let Some(entry) = cache.get_mut(key) {
                    entry.entered = Instant::now();
                }
                stale.map(|(value, _)| value)
            }
            Ok(Fetch::Value(tagged)) => {
                let mut cache = self.cache.write().await;
                match (&stale, tagged.tag.as_deref()) {
                    // Unchanged at the source, only the entry aged out.
                    (Some((value, Some(old))), Some(new)) if old == new => {
                        if let Some(entry) = cache.get_mut(key) {
                            entry.entered = Instant::now();
                        }
                        Some(value.clone())
                    }
                    _ => {
                        cache.insert(
                            key.to_string(),
                            CacheEntry {
                                value: tagged.value.clone(),
                                tag: tagged.tag,
                                entered: Instant::now(),
                            },
                        );
                        Some(tagged.value)
                    }
                }
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Configuration fetch failed");
                stale.map(|(value, _)| value)
            }
        }
    }

    /// Look up `key` and deserialise it into `T`.
    ///
    /// # Errors
    ///
    /// Fails when the value exists but does not have the shape of `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key).await {
            Some(value) => value
                .try_into()
                .map(Some)
                .map_err(|err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn provider(&self) -> &Arc<dyn ConfigProvider> {
        self.provider
            .get_or_init(|| async { self.select_provider().await })
            .await
    }

    async fn select_provider(&self) -> Arc<dyn ConfigProvider> {
        if let Some(connector) = &self.connector
            && let Some(connection) = self
                .environment
                .value(&self.connection_string_key)
                .as_ref()
                .and_then(toml::Value::as_str)
        {
            match connector.connect(connection).await {
                Ok(store) => {
                    tracing::info!("Configuration backed by the remote store");
                    return Arc::new(RemoteProvider::new(store));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Remote configuration store unreachable, falling back to the environment");
                }
            }
        }

        Arc::clone(&self.environment) as Arc<dyn ConfigProvider>
    }
}
