use serde::{Deserialize, Serialize};

use crate::{contact::ContactAddress, mime::MimeType};

/// The role a recipient occupies within a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipientRole {
    /// Visible primary recipient (`to`).
    Primary,
    /// Visible copy (`additional`).
    Carbon,
    /// Blind copy (`hidden`).
    Blind,
}

/// Recipient sequences by role. Order within a sequence is send-significant
/// for display only, not for delivery semantics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipients {
    #[serde(default)]
    pub to: Vec<ContactAddress>,
    #[serde(default)]
    pub additional: Vec<ContactAddress>,
    #[serde(default)]
    pub hidden: Vec<ContactAddress>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// A binary attachment carried as base64.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content_type: MimeType,
    pub payload: String,
}

/// An outbound message.
///
/// Built via [`Message::write`]; the dispatch engine mutates the message in
/// place when recipients are filtered out, so callers must not rely on the
/// message being unchanged after a send.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub recipients: Recipients,
    pub content: Content,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Begin composing a message.
    #[must_use]
    pub fn write() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// One ordered pass over every recipient with its role tag:
    /// `to`, then `additional`, then `hidden`.
    #[must_use]
    pub fn tagged_recipients(&self) -> Vec<(ContactAddress, RecipientRole)> {
        let tag = |role: RecipientRole| {
            move |address: &ContactAddress| (address.clone(), role)
        };

        self.recipients
            .to
            .iter()
            .map(tag(RecipientRole::Primary))
            .chain(
                self.recipients
                    .additional
                    .iter()
                    .map(tag(RecipientRole::Carbon)),
            )
            .chain(self.recipients.hidden.iter().map(tag(RecipientRole::Blind)))
            .collect()
    }

    /// Remove the first occurrence of `address` from its role sequence.
    pub fn remove_recipient(&mut self, role: RecipientRole, address: &ContactAddress) {
        let sequence = match role {
            RecipientRole::Primary => &mut self.recipients.to,
            RecipientRole::Carbon => &mut self.recipients.additional,
            RecipientRole::Blind => &mut self.recipients.hidden,
        };

        if let Some(at) = sequence.iter().position(|candidate| candidate == address) {
            sequence.remove(at);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum CopyMode {
    #[default]
    Public,
    Blind,
}

/// Fluent construction of an outbound [`Message`].
///
/// The builder exclusively owns the in-progress message until [`build`]
/// finalises it.
///
/// [`build`]: MessageBuilder::build
#[derive(Debug, Default)]
pub struct MessageBuilder {
    message: Message,
    copy_mode: CopyMode,
}

impl MessageBuilder {
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.content.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.message.content.body = Some(body.into());
        self
    }

    /// Set the primary recipients. An empty iterator leaves the message
    /// unchanged.
    #[must_use]
    pub fn to<I, A>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ContactAddress>,
    {
        let contacts: Vec<_> = recipients.into_iter().map(Into::into).collect();
        if !contacts.is_empty() {
            self.message.recipients.to = contacts;
        }
        self
    }

    /// Copy the given recipients, either visibly or blind depending on the
    /// current copy mode (see [`blind`] and [`visible`]).
    ///
    /// [`blind`]: MessageBuilder::blind
    /// [`visible`]: MessageBuilder::visible
    #[must_use]
    pub fn copy<I, A>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ContactAddress>,
    {
        let contacts: Vec<_> = recipients.into_iter().map(Into::into).collect();
        if contacts.is_empty() {
            return self;
        }

        match self.copy_mode {
            CopyMode::Blind => self.message.recipients.hidden = contacts,
            CopyMode::Public => self.message.recipients.additional = contacts,
        }
        self
    }

    /// Subsequent [`copy`] calls add blind (hidden) recipients.
    ///
    /// [`copy`]: MessageBuilder::copy
    #[must_use]
    pub const fn blind(mut self) -> Self {
        self.copy_mode = CopyMode::Blind;
        self
    }

    /// Subsequent [`copy`] calls add visible (carbon) recipients.
    ///
    /// [`copy`]: MessageBuilder::copy
    #[must_use]
    pub const fn visible(mut self) -> Self {
        self.copy_mode = CopyMode::Public;
        self
    }

    #[must_use]
    pub fn attach<I>(mut self, attachments: I) -> Self
    where
        I: IntoIterator<Item = Attachment>,
    {
        self.message.attachments.extend(attachments);
        self
    }

    #[must_use]
    pub fn build(self) -> Message {
        self.message
    }
}
