use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// The delivery mechanism implied by a contact address scheme.
///
/// `Voice` is recognised but has no delivery adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Email,
    Voice,
    Sms,
    Unknown,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Email => "email",
            Self::Voice => "voice",
            Self::Sms => "sms",
            Self::Unknown => "unknown",
        })
    }
}

/// An opaque contact address with a scheme prefix (`mailto:`, `tel:`, `sms:`).
///
/// Parsing never fails; addresses with an unrecognised scheme carry
/// [`Protocol::Unknown`]. The protocol is derived on demand rather than
/// stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactAddress(String);

impl ContactAddress {
    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derive the transport protocol from the scheme prefix. Checked in
    /// order: `mailto:`, `tel:`, `sms:`; first match wins.
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        if self.0.starts_with("mailto:") {
            Protocol::Email
        } else if self.0.starts_with("tel:") {
            Protocol::Voice
        } else if self.0.starts_with("sms:") {
            Protocol::Sms
        } else {
            Protocol::Unknown
        }
    }

    /// The transport-local path: everything after the first `:`.
    ///
    /// # Errors
    ///
    /// Fails with [`AddressError::Malformed`] when the address contains no
    /// colon at all.
    pub fn path(&self) -> Result<&str, AddressError> {
        self.0
            .find(':')
            .map(|at| &self.0[at + 1..])
            .ok_or_else(|| AddressError::Malformed(self.0.clone()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContactAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContactAddress {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for ContactAddress {
    fn from(value: String) -> Self {
        Self::parse(value)
    }
}
