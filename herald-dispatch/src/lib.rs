//! Outbound multi-channel message dispatch
//!
//! This crate provides functionality to:
//! - Classify a message's recipients and apply allow/deny lists
//! - Group surviving recipients by transport protocol
//! - Deliver through the configured channel adapter for each protocol
//! - Reconcile per-channel outcomes into one aggregate result

mod channel;
mod email;
mod engine;
mod options;
mod registry;
mod sms;

pub use channel::{
    Channel, EmailAttachment, EmailRequest, EmailTransport, SmsReport, SmsRequest, SmsTransport,
    TransportFactory,
};
pub use email::EmailChannel;
pub use engine::DispatchEngine;
pub use herald_common::{
    ContactAddress, DeliveryResult, DeliveryState, Message, Protocol, Undelivered,
};
pub use options::{ChannelOptions, DispatchOptions};
pub use registry::ChannelRegistry;
pub use sms::SmsChannel;
