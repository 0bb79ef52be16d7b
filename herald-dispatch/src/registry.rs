//! Channel registry construction from configuration.

use std::sync::Arc;

use ahash::AHashMap;
use herald_common::Protocol;
use tracing::{debug, warn};

use crate::{
    channel::{Channel, TransportFactory},
    email::EmailChannel,
    options::ChannelOptions,
    sms::SmsChannel,
};

/// An immutable mapping from transport protocol to its configured channel
/// adapter. At most one adapter per protocol; last registration wins.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: AHashMap<Protocol, Arc<dyn Channel>>,
}

impl ChannelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from ordered per-channel configuration records.
    ///
    /// Records specifying neither a protocol nor an author are skipped with
    /// a warning; so are records whose adapter cannot be constructed.
    /// Protocols without an adapter implementation are silently skipped.
    #[must_use]
    pub fn from_options(records: &[ChannelOptions], factory: &dyn TransportFactory) -> Self {
        let mut registry = Self::new();

        for record in records {
            let protocol = match (record.protocol, &record.author) {
                (Some(protocol), _) => protocol,
                (None, Some(author)) => author.protocol(),
                (None, None) => {
                    warn!("No protocol or author specified for channel record");
                    continue;
                }
            };

            let adapter = match protocol {
                Protocol::Email => factory
                    .email(record)
                    .and_then(|transport| EmailChannel::new(record, transport))
                    .map(|channel| Arc::new(channel) as Arc<dyn Channel>),
                Protocol::Sms => factory
                    .sms(record)
                    .and_then(|transport| SmsChannel::new(record, transport))
                    .map(|channel| Arc::new(channel) as Arc<dyn Channel>),
                Protocol::Voice | Protocol::Unknown => continue,
            };

            match adapter {
                Ok(channel) => registry.register(protocol, channel),
                Err(error) => {
                    warn!(%protocol, %error, "Skipping unusable channel record");
                }
            }
        }

        debug!(channels = registry.len(), "Channel registry constructed");
        registry
    }

    pub fn register(&mut self, protocol: Protocol, channel: Arc<dyn Channel>) {
        self.channels.insert(protocol, channel);
    }

    #[must_use]
    pub fn get(&self, protocol: Protocol) -> Option<&Arc<dyn Channel>> {
        self.channels.get(&protocol)
    }

    #[must_use]
    pub fn contains(&self, protocol: Protocol) -> bool {
        self.channels.contains_key(&protocol)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use herald_common::{Protocol, error::ChannelError};

    use super::ChannelRegistry;
    use crate::{
        channel::{
            EmailRequest, EmailTransport, SmsReport, SmsRequest, SmsTransport, TransportFactory,
        },
        options::ChannelOptions,
    };

    struct NullTransport;

    #[async_trait]
    impl EmailTransport for NullTransport {
        async fn submit(&self, _request: EmailRequest) -> Result<String, ChannelError> {
            Ok(String::new())
        }

        async fn send_status(&self, _operation_id: &str) -> Result<String, ChannelError> {
            Ok("outfordelivery".to_string())
        }
    }

    #[async_trait]
    impl SmsTransport for NullTransport {
        async fn submit(&self, _request: SmsRequest) -> Result<Vec<SmsReport>, ChannelError> {
            Ok(Vec::new())
        }
    }

    struct NullFactory;

    impl TransportFactory for NullFactory {
        fn email(
            &self,
            _options: &ChannelOptions,
        ) -> Result<Arc<dyn EmailTransport>, ChannelError> {
            Ok(Arc::new(NullTransport))
        }

        fn sms(&self, _options: &ChannelOptions) -> Result<Arc<dyn SmsTransport>, ChannelError> {
            Ok(Arc::new(NullTransport))
        }
    }

    fn record(protocol: Option<Protocol>, author: Option<&str>) -> ChannelOptions {
        ChannelOptions {
            protocol,
            author: author.map(Into::into),
            ..ChannelOptions::default()
        }
    }

    #[test]
    fn explicit_protocol_wins_over_author_derivation() {
        let records = [record(Some(Protocol::Sms), Some("mailto:noreply@x.com"))];
        let registry = ChannelRegistry::from_options(&records, &NullFactory);

        assert!(registry.contains(Protocol::Sms));
        assert!(!registry.contains(Protocol::Email));
    }

    #[test]
    fn protocol_is_derived_from_the_author_address() {
        let records = [record(None, Some("mailto:noreply@x.com"))];
        let registry = ChannelRegistry::from_options(&records, &NullFactory);

        assert!(registry.contains(Protocol::Email));
    }

    #[test]
    fn empty_records_are_skipped_without_failing() {
        let records = [
            record(None, None),
            record(None, Some("mailto:noreply@x.com")),
        ];
        let registry = ChannelRegistry::from_options(&records, &NullFactory);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unsupported_protocols_are_silently_skipped() {
        let records = [
            record(Some(Protocol::Voice), Some("tel:+15550000000")),
            record(Some(Protocol::Unknown), None),
        ];
        let registry = ChannelRegistry::from_options(&records, &NullFactory);

        assert!(registry.is_empty());
    }

    #[test]
    fn a_record_without_an_author_cannot_build_an_adapter() {
        let records = [record(Some(Protocol::Email), None)];
        let registry = ChannelRegistry::from_options(&records, &NullFactory);

        assert!(registry.is_empty());
    }

    #[test]
    fn last_registration_per_protocol_wins() {
        let records = [
            record(Some(Protocol::Email), Some("mailto:first@x.com")),
            record(Some(Protocol::Email), Some("mailto:second@x.com")),
        ];
        let registry = ChannelRegistry::from_options(&records, &NullFactory);

        assert_eq!(registry.len(), 1);
    }
}
