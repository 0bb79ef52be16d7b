//! Email channel adapter.
//!
//! Maps a message's roles onto to/cc/bcc, submits through the transport,
//! then polls the transport's delivery status until the accepted state or
//! the retry budget runs out.

use std::sync::Arc;

use async_trait::async_trait;
use herald_common::{
    ContactAddress, DeliveryResult, Message, RetryOrchestrator, error::ChannelError,
    message::Attachment, mime::MimeType,
};
use tracing::debug;

use crate::{
    channel::{Channel, EmailAttachment, EmailRequest, EmailTransport},
    options::ChannelOptions,
};

pub struct EmailChannel {
    author: ContactAddress,
    transport: Arc<dyn EmailTransport>,
    retry: RetryOrchestrator,
}

impl EmailChannel {
    /// The transport status meaning the message was accepted for sending.
    const ACCEPTED_STATUS: &'static str = "outfordelivery";

    /// # Errors
    ///
    /// Fails when the record has no author address; the sending identity is
    /// required for email.
    pub fn new(
        options: &ChannelOptions,
        transport: Arc<dyn EmailTransport>,
    ) -> Result<Self, ChannelError> {
        let author = options
            .author
            .clone()
            .ok_or(ChannelError::MissingField("author"))?;

        Ok(Self {
            author,
            transport,
            retry: options.retry.clone().unwrap_or_default(),
        })
    }

    /// Transport-local paths for a recipient sequence. Addresses without a
    /// scheme delimiter cannot be mapped and are skipped.
    fn paths(recipients: &[ContactAddress]) -> Vec<String> {
        recipients
            .iter()
            .filter_map(|recipient| recipient.path().ok().map(str::to_string))
            .collect()
    }

    fn map_attachment(attachment: &Attachment) -> EmailAttachment {
        EmailAttachment {
            name: attachment.name.clone(),
            attachment_type: attachment_type(attachment.content_type),
            content_base64: attachment.payload.clone(),
        }
    }
}

#[async_trait]
impl Channel for EmailChannel {
    /// Sends a message to the specified recipients. Guarantees the message
    /// was accepted for sending, not that any recipient has or will receive
    /// it.
    async fn send(&self, message: &Message) -> Result<DeliveryResult, ChannelError> {
        let request = EmailRequest {
            sender: self.author.path()?.to_string(),
            subject: message.content.subject.clone().unwrap_or_default(),
            body: message.content.body.clone().unwrap_or_default(),
            to: Self::paths(&message.recipients.to),
            cc: Self::paths(&message.recipients.additional),
            bcc: Self::paths(&message.recipients.hidden),
            attachments: message.attachments.iter().map(Self::map_attachment).collect(),
        };

        let operation_id = self.transport.submit(request).await?;

        let status = self
            .retry
            .repeat_until(
                || self.transport.send_status(&operation_id),
                |status| status.eq_ignore_ascii_case(Self::ACCEPTED_STATUS),
            )
            .await?;

        debug!(%status, "Email transport settled");

        Ok(if status.eq_ignore_ascii_case(Self::ACCEPTED_STATUS) {
            DeliveryResult::sent()
        } else {
            DeliveryResult::undeliverable()
        })
    }
}

/// Transport attachment-type token for a content type. Unrecognised content
/// falls back to plain text, matching the transport's most permissive type.
const fn attachment_type(content_type: MimeType) -> &'static str {
    match content_type {
        MimeType::Bmp => "bmp",
        MimeType::Doc => "doc",
        MimeType::Docm => "docm",
        MimeType::Docx => "docx",
        MimeType::Jpeg => "jpeg",
        MimeType::Pdf => "pdf",
        MimeType::Png => "png",
        MimeType::Ppsm => "ppsm",
        MimeType::Ppsx => "ppsx",
        MimeType::Ppt => "ppt",
        MimeType::Pptm => "pptm",
        MimeType::Pptx => "pptx",
        MimeType::Rtf => "rtf",
        MimeType::Tif => "tif",
        MimeType::Txt => "txt",
        MimeType::Vsd => "vsd",
        MimeType::Xls => "xls",
        MimeType::Xlsb => "xlsb",
        MimeType::Xlsm => "xlsm",
        MimeType::Xlsx => "xlsx",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use async_trait::async_trait;
    use herald_common::{
        DeliveryState, Message, Protocol, RetryOrchestrator, error::ChannelError,
        retry::Backoff,
    };
    use pretty_assertions::assert_eq;

    use super::EmailChannel;
    use crate::{
        channel::{Channel, EmailRequest, EmailTransport},
        options::ChannelOptions,
    };

    struct ScriptedTransport {
        statuses: Mutex<Vec<&'static str>>,
        polls: AtomicU32,
        last_request: Mutex<Option<EmailRequest>>,
    }

    impl ScriptedTransport {
        fn new(statuses: Vec<&'static str>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                polls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl EmailTransport for ScriptedTransport {
        async fn submit(&self, request: EmailRequest) -> Result<String, ChannelError> {
            *self.last_request.lock().unwrap() = Some(request);
            Ok("op-1".to_string())
        }

        async fn send_status(&self, _operation_id: &str) -> Result<String, ChannelError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            };
            Ok(status.to_string())
        }
    }

    fn options() -> ChannelOptions {
        ChannelOptions {
            protocol: Some(Protocol::Email),
            author: Some("mailto:noreply@x.com".into()),
            connection_string: String::new(),
            retry: Some(RetryOrchestrator {
                strategy: Backoff::Linear,
                max_attempts: 2,
                initial_delay_ms: 1,
            }),
        }
    }

    #[tokio::test]
    async fn polls_until_the_accepted_status() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            "queued",
            "queued",
            "OutForDelivery",
        ]));
        let channel = EmailChannel::new(&options(), Arc::clone(&transport) as Arc<dyn EmailTransport>).unwrap();

        let message = Message::write()
            .subject("Hi")
            .body("Hello")
            .to(["mailto:a@x.com"])
            .build();

        let result = channel.send(&message).await.unwrap();
        assert_eq!(result.state, DeliveryState::Sent);
        assert_eq!(transport.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_accepted_means_undeliverable() {
        let transport = Arc::new(ScriptedTransport::new(vec!["queued"]));
        let channel = EmailChannel::new(&options(), Arc::clone(&transport) as Arc<dyn EmailTransport>).unwrap();

        let message = Message::write().to(["mailto:a@x.com"]).build();
        let result = channel.send(&message).await.unwrap();

        assert_eq!(result.state, DeliveryState::Undeliverable);
        // Budget of 2 retries past the first poll.
        assert_eq!(transport.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn roles_map_onto_to_cc_and_bcc() {
        let transport = Arc::new(ScriptedTransport::new(vec!["outfordelivery"]));
        let channel = EmailChannel::new(&options(), Arc::clone(&transport) as Arc<dyn EmailTransport>).unwrap();

        let message = Message::write()
            .to(["mailto:a@x.com"])
            .copy(["mailto:b@x.com"])
            .blind()
            .copy(["mailto:c@x.com"])
            .build();

        channel.send(&message).await.unwrap();

        let request = transport.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.sender, "noreply@x.com");
        assert_eq!(request.to, vec!["a@x.com"]);
        assert_eq!(request.cc, vec!["b@x.com"]);
        assert_eq!(request.bcc, vec!["c@x.com"]);
    }

    #[test]
    fn construction_requires_an_author() {
        let mut options = options();
        options.author = None;

        let transport = Arc::new(ScriptedTransport::new(vec!["outfordelivery"]));
        assert!(EmailChannel::new(&options, transport as Arc<dyn EmailTransport>).is_err());
    }
}
