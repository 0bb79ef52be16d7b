use async_trait::async_trait;
use herald_common::error::ConfigError;

/// A configuration value together with its revalidation tag, when the
/// backing source supplies one.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedValue {
    pub value: toml::Value,
    pub tag: Option<String>,
}

impl TaggedValue {
    #[must_use]
    pub fn untagged(value: toml::Value) -> Self {
        Self { value, tag: None }
    }
}

/// The outcome of a provider fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum Fetch {
    /// The source has no value for the key.
    Absent,
    /// The source confirmed the caller's revalidation tag is still current,
    /// without re-transferring the value.
    Unchanged,
    /// A value, tagged when the source supports revalidation.
    Value(TaggedValue),
}

/// A pluggable key/value configuration source.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Fetch the value for `key`. The caller's last-seen revalidation tag is
    /// passed through so sources that support it can avoid re-transfer.
    ///
    /// # Errors
    ///
    /// Fails when the backing source cannot be reached or answers with
    /// something uninterpretable.
    async fn fetch(&self, key: &str, tag: Option<&str>) -> Result<Fetch, ConfigError>;
}
