//! Data-transfer types shared between the transport and the dispatcher.
//!
//! These carry only the fields the bot reads. The transport owns the real
//! account, group and contact records and hands out snapshots of them.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Profile data a contact has published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub emoji: Option<String>,
    pub about: Option<String>,
    pub coin_address: Option<String>,
    /// Last profile refresh, unix epoch milliseconds.
    pub last_update_ms: Option<i64>,
    pub has_avatar: bool,
}

impl Profile {
    /// `"<given> <family>"`, trimmed; `None` when both are blank.
    pub fn full_name(&self) -> Option<String> {
        let given = self.given_name.as_deref().unwrap_or("");
        let family = self.family_name.as_deref().unwrap_or("");
        let name = format!("{given} {family}").trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

/// A contact known to the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub number: Option<String>,
    pub uuid: Option<String>,
    pub name: String,
    pub profile: Option<Profile>,
}

impl Contact {
    /// Address used to reach this contact: the phone number, else the uuid.
    pub fn id(&self) -> &str {
        self.number
            .as_deref()
            .or(self.uuid.as_deref())
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        self.profile
            .as_ref()
            .and_then(Profile::full_name)
            .unwrap_or_else(|| self.id().to_string())
    }

    /// True when either identifier matches. Blank identifiers never match.
    pub fn matches(&self, number: Option<&str>, uuid: Option<&str>) -> bool {
        let same = |mine: Option<&str>, theirs: Option<&str>| match (mine, theirs) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        };
        same(self.number.as_deref(), number) || same(self.uuid.as_deref(), uuid)
    }
}

/// A group conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Id used when sending to the group (`group.<base64>` on signal-cli).
    pub id: String,
    /// Raw group id as it appears on inbound envelopes.
    pub internal_id: String,
    pub name: String,
}

impl Group {
    pub fn is_same(&self, other: &Group) -> bool {
        (!self.id.is_empty() && self.id == other.id)
            || (!self.internal_id.is_empty() && self.internal_id == other.internal_id)
    }
}

/// Destination of a message: a single contact or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    Contact(Contact),
    Group(Group),
}

impl Recipient {
    pub fn display_name(&self) -> String {
        match self {
            Self::Contact(contact) => contact.display_name(),
            Self::Group(group) => group.name.clone(),
        }
    }

    /// The address the transport sends to.
    pub fn address(&self) -> &str {
        match self {
            Self::Contact(contact) => contact.id(),
            Self::Group(group) => &group.id,
        }
    }

    pub fn is_group(&self, group: &Group) -> bool {
        matches!(self, Self::Group(g) if g.is_same(group))
    }
}

/// A mention of a contact inside a message body.
///
/// `start` and `length` are in UTF-16 code units, as Signal reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub start: usize,
    pub length: usize,
    pub number: Option<String>,
    pub uuid: Option<String>,
}

impl Mention {
    pub fn references(&self, contact: &Contact) -> bool {
        contact.matches(self.number.as_deref(), self.uuid.as_deref())
    }
}

/// A file travelling with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    /// A file on the bot's own filesystem.
    Local(PathBuf),
    /// An attachment held by the transport, referenced by id.
    Stored {
        id: String,
        content_type: Option<String>,
        filename: Option<String>,
    },
    /// Bytes already in memory (avatars).
    Inline {
        filename: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// A sticker reference, written `<pack_id>:<sticker_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub pack_id: String,
    pub sticker_id: u32,
}

impl FromStr for Sticker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (pack_id, sticker_id) = s
            .split_once(':')
            .ok_or_else(|| Error::invalid_sticker(s))?;
        let sticker_id = sticker_id
            .parse()
            .map_err(|_| Error::invalid_sticker(s))?;
        if pack_id.is_empty() {
            return Err(Error::invalid_sticker(s));
        }
        Ok(Self {
            pack_id: pack_id.to_string(),
            sticker_id,
        })
    }
}

impl fmt::Display for Sticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pack_id, self.sticker_id)
    }
}

/// Points at one message in one conversation; the target of reactions and
/// receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub conversation: Recipient,
    /// Address of the message's author.
    pub author: String,
    /// Sent timestamp, unix epoch milliseconds. Signal identifies messages by it.
    pub timestamp: i64,
}

/// Reference to a message shown above a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub author: String,
    pub timestamp: i64,
    pub text: String,
}

/// A decoded inbound data message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub sender: Contact,
    pub recipient: Recipient,
    pub timestamp: i64,
    pub body: String,
    pub mentions: Vec<Mention>,
    pub attachments: Vec<Attachment>,
    pub sticker: Option<Sticker>,
}

impl InboundMessage {
    pub fn message_ref(&self) -> MessageRef {
        let conversation = match &self.recipient {
            Recipient::Group(group) => Recipient::Group(group.clone()),
            Recipient::Contact(_) => Recipient::Contact(self.sender.clone()),
        };
        MessageRef {
            conversation,
            author: self.sender.id().to_string(),
            timestamp: self.timestamp,
        }
    }

    pub fn quote(&self) -> Quote {
        Quote {
            author: self.sender.id().to_string(),
            timestamp: self.timestamp,
            text: self.body.clone(),
        }
    }

    /// First mention that references `contact`.
    pub fn mention_of(&self, contact: &Contact) -> Option<&Mention> {
        self.mentions.iter().find(|m| m.references(contact))
    }
}

/// A message to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient: Recipient,
    pub body: String,
    pub attachments: Vec<Attachment>,
    pub sticker: Option<Sticker>,
    pub quote: Option<Quote>,
}

impl OutboundMessage {
    pub fn text(recipient: Recipient, body: impl Into<String>) -> Self {
        Self {
            recipient,
            body: body.into(),
            attachments: Vec::new(),
            sticker: None,
            quote: None,
        }
    }

    #[must_use]
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = Some(quote);
        self
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    #[must_use]
    pub fn with_sticker(mut self, sticker: Option<Sticker>) -> Self {
        self.sticker = sticker;
        self
    }
}

/// Receipt for a message the transport accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub recipient: Recipient,
    /// Our own address.
    pub author: String,
    pub timestamp: i64,
}

impl SentMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            conversation: self.recipient.clone(),
            author: self.author.clone(),
            timestamp: self.timestamp,
        }
    }
}
