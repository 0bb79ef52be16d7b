//! Layered configuration lookup with a TTL, tag-aware cache
//!
//! Values come from a pluggable provider: the process environment by
//! default, or a remote configuration service when one is configured. The
//! cache keeps externally-unchanged values alive without re-transfer by
//! comparing revalidation tags.

mod cache;
mod environment;
mod provider;
mod remote;

pub use cache::{Configuration, ConfigurationOptions};
pub use environment::EnvironmentProvider;
pub use herald_common::error::ConfigError;
pub use provider::{ConfigProvider, Fetch, TaggedValue};
pub use remote::{RemoteConnector, RemoteProvider, Setting, SettingStore};
