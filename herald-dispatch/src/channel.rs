//! Capability traits at the transport seam.
//!
//! The vendor email/SMS clients live outside this crate; adapters talk to
//! them through these traits only.

use std::sync::Arc;

use async_trait::async_trait;
use herald_common::{DeliveryResult, Message, error::ChannelError};

use crate::options::ChannelOptions;

/// A configured delivery channel for one transport protocol.
///
/// A channel may fail outright (network/transport error) or resolve with a
/// [`DeliveryResult`]. It must never silently drop recipients it was given:
/// where failure is detectable per-recipient, those recipients appear in the
/// result's `undelivered` list.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, message: &Message) -> Result<DeliveryResult, ChannelError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailAttachment {
    pub name: String,
    /// Transport attachment-type token, e.g. `pdf` or `txt`.
    pub attachment_type: &'static str,
    pub content_base64: String,
}

/// A fully mapped outbound email submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailRequest {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub attachments: Vec<EmailAttachment>,
}

/// Outbound email transport: submission plus delivery-status polling.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Submit a message, returning an operation id for status polling.
    async fn submit(&self, request: EmailRequest) -> Result<String, ChannelError>;

    /// The transport's current status string for a submitted operation.
    async fn send_status(&self, operation_id: &str) -> Result<String, ChannelError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmsRequest {
    pub from: String,
    pub to: Vec<String>,
    pub body: String,
}

/// Per-recipient submission outcome from the SMS transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmsReport {
    pub to: String,
    pub successful: bool,
}

/// Outbound SMS transport. Reports acceptance per recipient.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn submit(&self, request: SmsRequest) -> Result<Vec<SmsReport>, ChannelError>;
}

/// Builds vendor transports from channel configuration records.
///
/// # Errors
///
/// Implementations fail when a record cannot produce a usable client (e.g.
/// an unusable connection string); the registry treats such failures as
/// non-fatal configuration warnings.
pub trait TransportFactory: Send + Sync {
    fn email(&self, options: &ChannelOptions) -> Result<Arc<dyn EmailTransport>, ChannelError>;

    fn sms(&self, options: &ChannelOptions) -> Result<Arc<dyn SmsTransport>, ChannelError>;
}
