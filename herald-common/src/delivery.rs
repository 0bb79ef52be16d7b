use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Terminal and internal delivery states for one dispatch call.
///
/// `Pending` is adapter-internal only and is never returned to the caller;
/// each `send` produces exactly one of the terminal states, with no
/// transitions back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    Pending,
    Sent,
    PartiallySent,
    Undeliverable,
}

impl DeliveryState {
    /// Whether at least one recipient was accepted for sending.
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Sent | Self::PartiallySent)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for DeliveryState {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        fmt.write_str(match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::PartiallySent => "partially sent",
            Self::Undeliverable => "undeliverable",
        })
    }
}

/// A recipient that was not delivered to, with the per-recipient state when
/// the reporting channel could determine one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Undelivered {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<DeliveryState>,
}

impl Undelivered {
    #[must_use]
    pub fn unsupported(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            state: None,
        }
    }

    #[must_use]
    pub fn with_state(uri: impl Into<String>, state: DeliveryState) -> Self {
        Self {
            uri: uri.into(),
            state: Some(state),
        }
    }
}

/// The outcome of one `send` call: an aggregate state plus every recipient
/// that was filtered out or reported undelivered by a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub state: DeliveryState,
    #[serde(default)]
    pub undelivered: Vec<Undelivered>,
}

impl DeliveryResult {
    #[must_use]
    pub const fn new(state: DeliveryState, undelivered: Vec<Undelivered>) -> Self {
        Self { state, undelivered }
    }

    #[must_use]
    pub const fn sent() -> Self {
        Self {
            state: DeliveryState::Sent,
            undelivered: Vec::new(),
        }
    }

    #[must_use]
    pub const fn undeliverable() -> Self {
        Self {
            state: DeliveryState::Undeliverable,
            undelivered: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::DeliveryState;

    #[test]
    fn delivered_states() {
        assert!(DeliveryState::Sent.is_delivered());
        assert!(DeliveryState::PartiallySent.is_delivered());
        assert!(!DeliveryState::Undeliverable.is_delivered());
        assert!(!DeliveryState::Pending.is_delivered());
    }

    #[test]
    fn pending_is_the_only_non_terminal_state() {
        assert!(!DeliveryState::Pending.is_terminal());
        assert!(DeliveryState::Sent.is_terminal());
        assert!(DeliveryState::PartiallySent.is_terminal());
        assert!(DeliveryState::Undeliverable.is_terminal());
    }
}
