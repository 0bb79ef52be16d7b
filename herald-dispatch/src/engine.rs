//! Recipient classification, protocol batching and result reconciliation.

use std::sync::Arc;

use futures_util::future::join_all;
use herald_common::{
    ContactAddress, DeliveryResult, DeliveryState, Message, Protocol, Undelivered,
};
use tracing::{debug, warn};

use crate::{
    channel::{Channel, TransportFactory},
    options::DispatchOptions,
    registry::ChannelRegistry,
};

/// Classifies a message's recipients, applies allow/deny lists, groups the
/// survivors by protocol and reconciles the per-channel outcomes into one
/// aggregate [`DeliveryResult`].
pub struct DispatchEngine {
    registry: ChannelRegistry,
    allow_list: Option<Vec<ContactAddress>>,
    deny_list: Option<Vec<ContactAddress>>,
}

impl DispatchEngine {
    #[must_use]
    pub const fn new(
        registry: ChannelRegistry,
        allow_list: Option<Vec<ContactAddress>>,
        deny_list: Option<Vec<ContactAddress>>,
    ) -> Self {
        Self {
            registry,
            allow_list,
            deny_list,
        }
    }

    /// Build the engine, constructing its channel registry from the ordered
    /// configuration records. An empty or fully unusable configuration is
    /// not an error; an empty registry yields every message undeliverable.
    #[must_use]
    pub fn from_options(options: &DispatchOptions, factory: &dyn TransportFactory) -> Self {
        Self::new(
            ChannelRegistry::from_options(&options.channels, factory),
            options.allow_list.clone(),
            options.deny_list.clone(),
        )
    }

    /// Attempt to send a message to its recipients through the configured
    /// channel(s).
    ///
    /// Filtered recipients are removed from the message in place, so the
    /// caller observes the surviving recipients after this returns. The call
    /// itself never fails; channel failures are absorbed into the aggregate
    /// state.
    pub async fn send(&self, message: &mut Message) -> DeliveryResult {
        let mut unsupported: Vec<Undelivered> = Vec::new();
        let mut bound_protocols: Vec<Protocol> = Vec::new();
        let mut bound_channels: Vec<Arc<dyn Channel>> = Vec::new();

        for (address, role) in message.tagged_recipients() {
            if let Some(allow_list) = &self.allow_list
                && !allow_list.contains(&address)
            {
                debug!(recipient = %address, "Recipient not in allow list");
                message.remove_recipient(role, &address);
                unsupported.push(Undelivered::unsupported(address.as_str()));
                continue;
            }

            if let Some(deny_list) = &self.deny_list
                && deny_list.contains(&address)
            {
                debug!(recipient = %address, "Recipient in deny list");
                message.remove_recipient(role, &address);
                unsupported.push(Undelivered::unsupported(address.as_str()));
                continue;
            }

            let protocol = address.protocol();
            let Some(channel) = self.registry.get(protocol) else {
                debug!(recipient = %address, %protocol, "No channel configured for recipient protocol");
                message.remove_recipient(role, &address);
                unsupported.push(Undelivered::unsupported(address.as_str()));
                continue;
            };

            // The first survivor of a protocol binds that protocol, in
            // encounter order, to the entire filtered message.
            if !bound_protocols.contains(&protocol) {
                bound_protocols.push(protocol);
                bound_channels.push(Arc::clone(channel));
            }
        }

        // Fan out once per distinct protocol; every adapter receives the
        // whole filtered message and must ignore recipients irrelevant to
        // it. All sends settle before reconciliation; a failure in one
        // channel neither cancels nor blocks the others.
        let snapshot: &Message = message;
        let outcomes = join_all(
            bound_channels
                .iter()
                .map(|channel| channel.send(snapshot)),
        )
        .await;

        let mut delivered = false;
        let mut channel_undelivered: Vec<Undelivered> = Vec::new();
        let mut failed_channels: u32 = 0;

        for outcome in outcomes {
            match outcome {
                Err(error) => {
                    warn!(%error, "Channel rejected dispatch");
                    failed_channels += 1;
                }
                Ok(result) => {
                    if result.state.is_delivered() {
                        delivered = true;
                    }
                    channel_undelivered.extend(result.undelivered);
                }
            }
        }

        if failed_channels > 0 {
            warn!(
                failed_channels,
                invoked = bound_channels.len(),
                "One or more channels failed outright"
            );
        }

        let state = if delivered {
            if channel_undelivered.is_empty() && unsupported.is_empty() {
                DeliveryState::Sent
            } else {
                DeliveryState::PartiallySent
            }
        } else {
            DeliveryState::Undeliverable
        };

        // Unsupported recipients first, in filtering order; channel-reported
        // entries follow in channel invocation order.
        unsupported.extend(channel_undelivered);
        DeliveryResult::new(state, unsupported)
    }
}
