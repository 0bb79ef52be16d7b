//! Shared test doubles for dispatch integration tests.

use std::sync::Mutex;

use async_trait::async_trait;
use herald_common::{DeliveryResult, Message, error::ChannelError};
use herald_dispatch::Channel;

/// A channel that records every message it receives and answers with a
/// scripted outcome.
pub struct RecordingChannel {
    outcome: Result<DeliveryResult, String>,
    pub received: Mutex<Vec<Message>>,
}

impl RecordingChannel {
    pub fn succeeding(result: DeliveryResult) -> Self {
        Self {
            outcome: Ok(result),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn sends(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    async fn send(&self, message: &Message) -> Result<DeliveryResult, ChannelError> {
        self.received.lock().unwrap().push(message.clone());

        match &self.outcome {
            Ok(result) => Ok(result.clone()),
            Err(reason) => Err(ChannelError::Transport(reason.clone())),
        }
    }
}
