//! Envelope decoding.
//!
//! Turns `/v1/receive` envelopes into [`InboundMessage`]s. Receipts, typing
//! indicators, sync transcripts and bare reactions carry nothing to act on
//! and are dropped here.

use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    sigrelay_common::types::{
        Attachment, Contact, Group, InboundMessage, Mention, Profile, Recipient, Sticker,
    },
    tracing::debug,
};

use crate::api::{ContactEntry, Envelope, GroupEntry, ReceivedEnvelope};

/// What the decoder needs to know about the account.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub identity: Contact,
    pub contacts: Vec<Contact>,
    pub groups: Vec<Group>,
}

impl Directory {
    fn sender(&self, envelope: &Envelope) -> Contact {
        let number = envelope
            .source_number
            .clone()
            .or_else(|| envelope.source.clone().filter(|s| s.starts_with('+')));
        let uuid = envelope
            .source_uuid
            .clone()
            .or_else(|| envelope.source.clone().filter(|s| !s.starts_with('+')));

        self.contacts
            .iter()
            .find(|c| c.matches(number.as_deref(), uuid.as_deref()))
            .cloned()
            .unwrap_or_else(|| Contact {
                number,
                uuid,
                name: envelope.source_name.clone().unwrap_or_default(),
                profile: None,
            })
    }

    fn group(&self, internal_id: &str) -> Group {
        self.groups
            .iter()
            .find(|g| g.internal_id == internal_id)
            .cloned()
            .unwrap_or_else(|| Group {
                id: send_group_id(internal_id),
                internal_id: internal_id.to_string(),
                name: String::new(),
            })
    }
}

/// The daemon's send id for a group is `group.` plus the base64 of its
/// internal id.
pub fn send_group_id(internal_id: &str) -> String {
    format!("group.{}", STANDARD.encode(internal_id))
}

/// Decode one envelope. `None` for anything that is not a data message
/// with content.
pub fn decode(received: &ReceivedEnvelope, directory: &Directory) -> Option<InboundMessage> {
    if let Some(account) = received.account.as_deref()
        && directory.identity.number.as_deref() != Some(account)
    {
        debug!(account, "skipping envelope for another account");
        return None;
    }
    let envelope = received.envelope.as_ref()?;
    let Some(data) = envelope.data_message.as_ref() else {
        debug!(
            sync = envelope.sync_message.is_some(),
            receipt = envelope.receipt_message.is_some(),
            typing = envelope.typing_message.is_some(),
            "skipping envelope without data message"
        );
        return None;
    };

    let body = data.message.clone().unwrap_or_default();
    let sticker = data.sticker.as_ref().and_then(|s| {
        Some(Sticker {
            pack_id: s.pack_id.clone()?,
            sticker_id: s.sticker_id?,
        })
    });
    let attachments: Vec<Attachment> = data
        .attachments
        .iter()
        .filter_map(|a| {
            Some(Attachment::Stored {
                id: a.id.clone()?,
                content_type: a.content_type.clone(),
                filename: a.filename.clone(),
            })
        })
        .collect();

    if body.is_empty() && attachments.is_empty() && sticker.is_none() {
        if data.reaction.is_some() {
            debug!("skipping reaction");
        }
        return None;
    }

    let recipient = match data.group_info.as_ref().and_then(|g| g.group_id.as_deref()) {
        Some(internal_id) => Recipient::Group(directory.group(internal_id)),
        None => Recipient::Contact(directory.identity.clone()),
    };

    let mentions = data
        .mentions
        .iter()
        .map(|m| Mention {
            start: m.start,
            length: m.length,
            number: m.number.clone(),
            uuid: m.uuid.clone(),
        })
        .collect();

    Some(InboundMessage {
        sender: directory.sender(envelope),
        recipient,
        timestamp: data.timestamp.or(envelope.timestamp).unwrap_or_default(),
        body,
        mentions,
        attachments,
        sticker,
    })
}

impl From<ContactEntry> for Contact {
    fn from(entry: ContactEntry) -> Self {
        let name = entry
            .name
            .filter(|n| !n.trim().is_empty())
            .or(entry.profile_name)
            .unwrap_or_default();
        let profile = entry.profile.map(|p| Profile {
            given_name: p.given_name.filter(|s| !s.is_empty()),
            family_name: p.lastname.filter(|s| !s.is_empty()),
            emoji: p.about_emoji.filter(|s| !s.is_empty()),
            about: p.about.filter(|s| !s.is_empty()),
            coin_address: p.mobile_coin_address.filter(|s| !s.is_empty()),
            last_update_ms: p.last_updated_timestamp.filter(|ts| *ts > 0),
            has_avatar: p.has_avatar,
        });
        Self {
            number: entry.number.filter(|s| !s.is_empty()),
            uuid: entry.uuid.filter(|s| !s.is_empty()),
            name,
            profile,
        }
    }
}

impl From<GroupEntry> for Group {
    fn from(entry: GroupEntry) -> Self {
        Self {
            id: entry.id,
            internal_id: entry.internal_id,
            name: entry.name,
        }
    }
}
