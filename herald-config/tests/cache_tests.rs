#![allow(clippy::unwrap_used)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use herald_config::{
    ConfigError, Configuration, ConfigurationOptions, EnvironmentProvider, RemoteConnector,
    Setting, SettingStore,
};
use pretty_assertions::assert_eq;

/// Always stores `value = "v1"` under tag `t1`; answers conditional fetches
/// for `t1` without re-transferring the value.
struct RevalidatingStore {
    fetches: AtomicUsize,
}

#[async_trait]
impl SettingStore for RevalidatingStore {
    async fn setting(
        &self,
        _key: &str,
        if_none_match: Option<&str>,
    ) -> Result<Option<Setting>, ConfigError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        Ok(Some(if if_none_match == Some("t1") {
            Setting {
                value: None,
                tag: Some("t1".to_string()),
            }
        } else {
            Setting {
                value: Some("v1".to_string()),
                tag: Some("t1".to_string()),
            }
        }))
    }
}

struct FixedConnector {
    store: Arc<RevalidatingStore>,
}

#[async_trait]
impl RemoteConnector for FixedConnector {
    async fn connect(
        &self,
        _connection_string: &str,
    ) -> Result<Arc<dyn SettingStore>, ConfigError> {
        Ok(Arc::clone(&self.store) as Arc<dyn SettingStore>)
    }
}

fn remote_configuration(ttl_ms: u64) -> (Configuration, Arc<RevalidatingStore>) {
    let store = Arc::new(RevalidatingStore {
        fetches: AtomicUsize::new(0),
    });
    let environment = Arc::new(EnvironmentProvider::from_vars([(
        "configuration".to_string(),
        "Endpoint=https://example;".to_string(),
    )]));

    let configuration = Configuration::with_sources(
        ConfigurationOptions {
            cache_ttl_ms: ttl_ms,
            ..ConfigurationOptions::default()
        },
        environment,
        Some(Arc::new(FixedConnector {
            store: Arc::clone(&store),
        }) as Arc<dyn RemoteConnector>),
    );

    (configuration, store)
}

#[tokio::test]
async fn cached_values_are_served_without_io_within_the_ttl() {
    let (configuration, store) = remote_configuration(600_000);

    assert_eq!(
        configuration.get("k").await,
        Some(toml::Value::String("v1".to_string()))
    );
    assert_eq!(
        configuration.get("k").await,
        Some(toml::Value::String("v1".to_string()))
    );

    assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn an_unchanged_tag_refreshes_the_entry_without_re_transfer() {
    let (configuration, store) = remote_configuration(50);

    assert_eq!(
        configuration.get("k").await,
        Some(toml::Value::String("v1".to_string()))
    );

    tokio::time::sleep(Duration::from_millis(80)).await;

    // Expired entry revalidates against the store: same tag, old value kept.
    assert_eq!(
        configuration.get("k").await,
        Some(toml::Value::String("v1".to_string()))
    );
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);

    // The timestamp was restarted, so the next lookup is a pure cache hit.
    assert_eq!(
        configuration.get("k").await,
        Some(toml::Value::String("v1".to_string()))
    );
    assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn absent_keys_evict_their_stale_entries() {
    struct VanishingStore {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl SettingStore for VanishingStore {
        async fn setting(
            &self,
            _key: &str,
            _if_none_match: Option<&str>,
        ) -> Result<Option<Setting>, ConfigError> {
            let fetch = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok((fetch == 0).then(|| Setting {
                value: Some("v1".to_string()),
                tag: None,
            }))
        }
    }

    struct VanishingConnector {
        store: Arc<VanishingStore>,
    }

    #[async_trait]
    impl RemoteConnector for VanishingConnector {
        async fn connect(
            &self,
            _connection_string: &str,
        ) -> Result<Arc<dyn SettingStore>, ConfigError> {
            Ok(Arc::clone(&self.store) as Arc<dyn SettingStore>)
        }
    }

    let store = Arc::new(VanishingStore {
        fetches: AtomicUsize::new(0),
    });
    let configuration = Configuration::with_sources(
        ConfigurationOptions {
            cache_ttl_ms: 0,
            ..ConfigurationOptions::default()
        },
        Arc::new(EnvironmentProvider::from_vars([(
            "configuration".to_string(),
            "Endpoint=https://example;".to_string(),
        )])),
        Some(Arc::new(VanishingConnector {
            store: Arc::clone(&store),
        }) as Arc<dyn RemoteConnector>),
    );

    assert_eq!(
        configuration.get("k").await,
        Some(toml::Value::String("v1".to_string()))
    );
    assert_eq!(configuration.get("k").await, None);
    assert_eq!(configuration.get("k").await, None);
}
