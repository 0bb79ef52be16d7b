//! Remote configuration store adapter.

use std::sync::Arc;

use async_trait::async_trait;
use herald_common::{error::ConfigError, tracing};

use crate::{
    environment,
    provider::{ConfigProvider, Fetch, TaggedValue},
};

/// A single setting as stored by a remote configuration service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Setting {
    /// The raw stored value. Absent when the store answered a conditional
    /// fetch with "not modified".
    pub value: Option<String>,
    /// The store's revision tag for this setting.
    pub tag: Option<String>,
}

/// The wire surface of a remote configuration store.
#[async_trait]
pub trait SettingStore: Send + Sync {
    /// Fetch a setting, `None` when the key does not exist. Stores that
    /// support conditional fetches may answer with a value-less [`Setting`]
    /// when `if_none_match` still names the current revision.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be reached or rejects the request.
    async fn setting(
        &self,
        key: &str,
        if_none_match: Option<&str>,
    ) -> Result<Option<Setting>, ConfigError>;
}

/// Builds a [`SettingStore`] from a connection string.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// # Errors
    ///
    /// Fails when the connection string is invalid or the store is
    /// unreachable.
    async fn connect(&self, connection_string: &str) -> Result<Arc<dyn SettingStore>, ConfigError>;
}

/// A [`ConfigProvider`] backed by a remote configuration store.
///
/// Store failures are absorbed rather than surfaced: configuration lookup
/// degrades to the cached value (or nothing) instead of failing the caller.
pub struct RemoteProvider {
    store: Arc<dyn SettingStore>,
}

impl RemoteProvider {
    #[must_use]
    pub fn new(store: Arc<dyn SettingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigProvider for RemoteProvider {
    async fn fetch(&self, key: &str, tag: Option<&str>) -> Result<Fetch, ConfigError> {
        let setting = match self.store.setting(key, tag).await {
            Ok(setting) => setting,
            Err(err) => {
                tracing::warn!(key, error = %err, "Remote configuration store unavailable");
                // Serve the cached value when one exists, nothing otherwise.
                return Ok(if tag.is_some() {
                    Fetch::Unchanged
                } else {
                    Fetch::Absent
                });
            }
        };

        let Some(setting) = setting else {
            return Ok(Fetch::Absent);
        };

        match setting.value {
            Some(raw) => Ok(Fetch::Value(TaggedValue {
                value: parse(&raw),
                tag: setting.tag,
            })),
            None => Ok(Fetch::Unchanged),
        }
    }
}

/// Structured settings are stored as TOML documents; anything that does not
/// parse as one is taken as a scalar.
fn parse(raw: &str) -> toml::Value {
    raw.parse::<toml::Table>()
        .map_or_else(|_| environment::scalar(raw), toml::Value::Table)
}
