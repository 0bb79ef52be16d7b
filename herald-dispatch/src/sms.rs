//! SMS channel adapter.
//!
//! Attachments and copy roles are ignored; only primary recipients with an
//! `sms:` scheme are submitted. Numbers are expected in E.164 form.

use std::sync::Arc;

use async_trait::async_trait;
use herald_common::{
    ContactAddress, DeliveryResult, DeliveryState, Message, Undelivered, error::ChannelError,
};

use crate::{
    channel::{Channel, SmsRequest, SmsTransport},
    options::ChannelOptions,
};

pub struct SmsChannel {
    author: ContactAddress,
    transport: Arc<dyn SmsTransport>,
}

impl SmsChannel {
    /// # Errors
    ///
    /// Fails when the record has no author address; the sending identity is
    /// required for SMS.
    pub fn new(
        options: &ChannelOptions,
        transport: Arc<dyn SmsTransport>,
    ) -> Result<Self, ChannelError> {
        let author = options
            .author
            .clone()
            .ok_or(ChannelError::MissingField("author"))?;

        Ok(Self { author, transport })
    }
}

#[async_trait]
impl Channel for SmsChannel {
    /// Guarantees a message has been submitted successfully, but is not
    /// configured to guarantee delivery. The channel receives the whole
    /// filtered message and re-filters by protocol itself.
    async fn send(&self, message: &Message) -> Result<DeliveryResult, ChannelError> {
        let request = SmsRequest {
            from: self.author.to_string(),
            to: message
                .recipients
                .to
                .iter()
                .filter(|recipient| recipient.protocol() == herald_common::Protocol::Sms)
                .filter_map(|recipient| recipient.path().ok().map(str::to_string))
                .collect(),
            body: message.content.body.clone().unwrap_or_default(),
        };

        let reports = self.transport.submit(request).await?;

        let mut state = DeliveryState::Pending;
        let mut failures = Vec::new();

        for report in reports {
            if report.successful {
                state = match state {
                    DeliveryState::Pending | DeliveryState::Sent => DeliveryState::Sent,
                    _ => DeliveryState::PartiallySent,
                };
            } else {
                state = match state {
                    DeliveryState::Pending | DeliveryState::Undeliverable => {
                        DeliveryState::Undeliverable
                    }
                    _ => DeliveryState::PartiallySent,
                };
                failures.push(Undelivered::with_state(
                    report.to,
                    DeliveryState::Undeliverable,
                ));
            }
        }

        // Nothing submitted (e.g. no primary sms recipients) must still
        // yield a terminal state.
        if state == DeliveryState::Pending {
            state = DeliveryState::Undeliverable;
        }

        Ok(DeliveryResult::new(state, failures))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use herald_common::{DeliveryState, Message, error::ChannelError};
    use pretty_assertions::assert_eq;

    use super::SmsChannel;
    use crate::{
        channel::{Channel, SmsReport, SmsRequest, SmsTransport},
        options::ChannelOptions,
    };

    struct RecordingTransport {
        reports: Vec<SmsReport>,
        last_request: Mutex<Option<SmsRequest>>,
    }

    impl RecordingTransport {
        fn new(reports: Vec<SmsReport>) -> Self {
            Self {
                reports,
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl SmsTransport for RecordingTransport {
        async fn submit(&self, request: SmsRequest) -> Result<Vec<SmsReport>, ChannelError> {
            *self.last_request.lock().unwrap() = Some(request);
            Ok(self.reports.clone())
        }
    }

    fn channel(reports: Vec<SmsReport>) -> (SmsChannel, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new(reports));
        let options = ChannelOptions {
            author: Some("sms:+15550000000".into()),
            ..ChannelOptions::default()
        };
        let channel =
            SmsChannel::new(&options, Arc::clone(&transport) as Arc<dyn SmsTransport>).unwrap();
        (channel, transport)
    }

    fn report(to: &str, successful: bool) -> SmsReport {
        SmsReport {
            to: to.to_string(),
            successful,
        }
    }

    #[tokio::test]
    async fn only_primary_sms_recipients_are_submitted() {
        let (channel, transport) = channel(vec![report("+15551234567", true)]);

        let message = Message::write()
            .body("ping")
            .to(["sms:+15551234567", "mailto:a@x.com"])
            .copy(["sms:+15559999999"])
            .build();

        channel.send(&message).await.unwrap();

        let request = transport.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.to, vec!["+15551234567"]);
    }

    #[tokio::test]
    async fn all_successful_is_sent() {
        let (channel, _) = channel(vec![
            report("+15551234567", true),
            report("+15557654321", true),
        ]);

        let message = Message::write()
            .body("ping")
            .to(["sms:+15551234567", "sms:+15557654321"])
            .build();

        let result = channel.send(&message).await.unwrap();
        assert_eq!(result.state, DeliveryState::Sent);
        assert!(result.undelivered.is_empty());
    }

    #[tokio::test]
    async fn mixed_outcomes_are_partially_sent_with_failures_reported() {
        let (channel, _) = channel(vec![
            report("+15551234567", true),
            report("+15557654321", false),
        ]);

        let message = Message::write()
            .body("ping")
            .to(["sms:+15551234567", "sms:+15557654321"])
            .build();

        let result = channel.send(&message).await.unwrap();
        assert_eq!(result.state, DeliveryState::PartiallySent);
        assert_eq!(result.undelivered.len(), 1);
        assert_eq!(result.undelivered[0].uri, "+15557654321");
        assert_eq!(
            result.undelivered[0].state,
            Some(DeliveryState::Undeliverable)
        );
    }

    #[tokio::test]
    async fn no_submittable_recipients_is_a_terminal_state() {
        let (channel, _) = channel(Vec::new());

        // The sms recipient sits in a copy role, which this channel ignores.
        let message = Message::write()
            .body("ping")
            .blind()
            .copy(["sms:+15551234567"])
            .build();

        let result = channel.send(&message).await.unwrap();
        assert_eq!(result.state, DeliveryState::Undeliverable);
    }
}
