use std::{path::Path, sync::Arc};

use {
    async_trait::async_trait,
    tracing::{debug, info, warn},
};

use {
    sigrelay_channels::{InboundHandler, Messenger},
    sigrelay_common::types::{Attachment, Contact, Group, InboundMessage, OutboundMessage, Recipient},
};

use crate::{
    command::{self, Command},
    error::{CommandError, Error, Result},
    mention, render,
};

pub const THUMBS_UP: &str = "👍";
pub const THUMBS_DOWN: &str = "👎";

/// Handles every inbound message for one account.
///
/// Stateless between messages: contacts and identity are read through the
/// messenger each time.
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
    control_group: Group,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn Messenger>, control_group: Group) -> Self {
        Self {
            messenger,
            control_group,
        }
    }

    fn control(&self) -> Recipient {
        Recipient::Group(self.control_group.clone())
    }

    async fn post(&self, body: impl Into<String>) -> sigrelay_channels::Result<()> {
        self.messenger
            .send(OutboundMessage::text(self.control(), body))
            .await?;
        Ok(())
    }

    /// Process one inbound message.
    ///
    /// Refused commands are answered in the control group and count as
    /// success. Only transport failures are returned.
    pub async fn dispatch(&self, message: InboundMessage) -> sigrelay_channels::Result<()> {
        debug!(
            sender = message.sender.id(),
            timestamp = message.timestamp,
            "message received"
        );
        if let Err(e) = self.messenger.mark_read(&message).await {
            warn!(error = %e, timestamp = message.timestamp, "failed to send read receipt");
        }

        if !message.recipient.is_group(&self.control_group) {
            return self.relay(message).await;
        }

        let Some(mention) = message.mention_of(self.messenger.identity()) else {
            debug!("bot not mentioned, ignoring");
            return Ok(());
        };
        let text = mention::command_text(&message.body, mention);
        debug!(command = %text, "command received");

        match self.execute(&message, &text).await {
            Ok(()) => Ok(()),
            Err(Error::Command(reason)) => self.reject(&message, &reason).await,
            Err(Error::Channel(e)) => Err(e),
        }
    }

    /// Copy foreign traffic into the control group.
    async fn relay(&self, message: InboundMessage) -> sigrelay_channels::Result<()> {
        let from = message.sender.display_name();
        let to = message.recipient.display_name();
        info!(from = %from, to = %to, "relaying message into control group");

        self.post(format!("Relaying message.\nFrom: {from}\nTo: {to}"))
            .await?;
        let copy = OutboundMessage::text(self.control(), message.body)
            .with_attachments(message.attachments)
            .with_sticker(message.sticker);
        self.messenger.send(copy).await?;
        Ok(())
    }

    async fn reject(
        &self,
        message: &InboundMessage,
        reason: &CommandError,
    ) -> sigrelay_channels::Result<()> {
        warn!(%reason, sender = message.sender.id(), "command rejected");
        self.messenger
            .react(&message.message_ref(), THUMBS_DOWN)
            .await?;
        let mut reply = OutboundMessage::text(self.control(), reason.to_string());
        if reason.quoted() {
            reply = reply.with_quote(message.quote());
        }
        self.messenger.send(reply).await?;
        Ok(())
    }

    async fn execute(&self, message: &InboundMessage, text: &str) -> Result<()> {
        let request = command::parse_request(text)?;
        let contacts = if request.needs_contacts() {
            self.messenger.contacts().await?
        } else {
            Vec::new()
        };
        let command = request.into_command(contacts.len())?;
        info!(method = command.method().as_str(), "executing command");

        match command {
            Command::ListContacts => {
                self.messenger
                    .react(&message.message_ref(), THUMBS_UP)
                    .await?;
                for (index, contact) in contacts.iter().enumerate() {
                    self.post(render::contact_summary(index, contact)).await?;
                }
            },
            Command::ContactDetail { contact_id } => {
                let contact = contacts
                    .get(contact_id)
                    .ok_or(CommandError::ContactIdRange)?;
                let attachments = self.avatar(contact).await.into_iter().collect();
                let detail = OutboundMessage::text(self.control(), render::contact_detail(contact))
                    .with_attachments(attachments);
                self.messenger.send(detail).await?;
            },
            Command::Send {
                contact_id,
                message: body,
                attachment,
            } => {
                let contact = contacts
                    .get(contact_id)
                    .ok_or(CommandError::ContactIdRange)?;
                let attachments = match attachment {
                    Some(path) => {
                        if !is_file(&path).await {
                            return Err(CommandError::AttachmentNotFound.into());
                        }
                        vec![Attachment::Local(path)]
                    },
                    None => Vec::new(),
                };
                let outbound = OutboundMessage::text(Recipient::Contact(contact.clone()), body)
                    .with_attachments(attachments);
                self.messenger.send(outbound).await?;
                info!(to = contact.id(), "message delivered");
                self.post("Message sent.").await?;
            },
            Command::Help(topic) => {
                self.post(topic.text()).await?;
            },
        }
        Ok(())
    }

    /// The contact's avatar, when its profile advertises one. Fetch failures
    /// only drop the avatar.
    async fn avatar(&self, contact: &Contact) -> Option<Attachment> {
        if !contact.profile.as_ref().is_some_and(|p| p.has_avatar) {
            return None;
        }
        match self.messenger.avatar(contact).await {
            Ok(avatar) => avatar,
            Err(e) => {
                warn!(contact = contact.id(), error = %e, "failed to fetch avatar");
                None
            },
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

#[async_trait]
impl InboundHandler for Dispatcher {
    async fn handle(&self, message: InboundMessage) -> sigrelay_channels::Result<()> {
        self.dispatch(message).await
    }
}
