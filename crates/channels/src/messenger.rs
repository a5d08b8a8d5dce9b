use async_trait::async_trait;

use sigrelay_common::types::{
    Attachment, Contact, Group, InboundMessage, MessageRef, OutboundMessage, SentMessage,
};

use crate::Result;

/// Outbound calls and lookups against one messaging account.
///
/// Every call is awaited to completion before the caller moves on, so the
/// actions for one inbound message land in the order they were issued.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// The account the bot runs as.
    fn identity(&self) -> &Contact;

    /// Contacts of the account, in a stable order. Command indices refer
    /// to positions in this list.
    async fn contacts(&self) -> Result<Vec<Contact>>;

    /// Groups the account is a member of.
    async fn groups(&self) -> Result<Vec<Group>>;

    /// Send a message and return the transport's receipt for it.
    async fn send(&self, message: OutboundMessage) -> Result<SentMessage>;

    /// React to a message with an emoji.
    async fn react(&self, target: &MessageRef, emoji: &str) -> Result<()>;

    /// Send a read receipt for an inbound message.
    async fn mark_read(&self, message: &InboundMessage) -> Result<()>;

    /// The contact's profile avatar, if one can be fetched. `None` by default.
    async fn avatar(&self, _contact: &Contact) -> Result<Option<Attachment>> {
        Ok(None)
    }
}

/// Receives inbound messages from the transport, one at a time.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, message: InboundMessage) -> Result<()>;
}
