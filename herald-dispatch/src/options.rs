//! Configuration records for the dispatch engine and its channels.

use herald_common::{ContactAddress, Protocol, RetryOrchestrator};
use serde::{Deserialize, Serialize};

/// One per-channel configuration record.
///
/// Either `protocol` or `author` must be present for the record to be
/// usable; when `protocol` is absent it is derived from the author address.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChannelOptions {
    #[serde(default)]
    pub protocol: Option<Protocol>,

    /// The sending identity for this channel.
    #[serde(default)]
    pub author: Option<ContactAddress>,

    /// Vendor connection string, handed verbatim to the transport factory.
    #[serde(default)]
    pub connection_string: String,

    /// Overrides for the delivery-status polling retry policy.
    #[serde(default)]
    pub retry: Option<RetryOrchestrator>,
}

/// Options for the dispatch engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DispatchOptions {
    /// Ordered per-channel configuration records.
    #[serde(default)]
    pub channels: Vec<ChannelOptions>,

    /// When configured, recipients absent from this list are rejected.
    #[serde(default)]
    pub allow_list: Option<Vec<ContactAddress>>,

    /// When configured, recipients present in this list are rejected.
    #[serde(default)]
    pub deny_list: Option<Vec<ContactAddress>>,
}
