use {
    async_trait::async_trait,
    sigrelay_channels::Messenger,
    sigrelay_common::types::{
        Attachment, Contact, Group, InboundMessage, MessageRef, OutboundMessage, SentMessage,
    },
    tracing::{debug, info, warn},
};

use crate::{
    api::{ReactionRequest, ReceiptRequest, ReceivedEnvelope, SendRequest, SignalApi},
    attachments,
    config::SignalAccountConfig,
    error::Result,
    inbound::{self, Directory},
};

/// [`Messenger`] backed by a signal-cli REST daemon.
#[derive(Debug)]
pub struct SignalMessenger {
    api: SignalApi,
    config: SignalAccountConfig,
    identity: Contact,
}

impl SignalMessenger {
    /// Check the daemon is reachable and resolve the account's own contact.
    pub async fn connect(config: SignalAccountConfig) -> Result<Self> {
        let api = SignalApi::new(&config)?;
        let about = api.about().await?;
        info!(
            account = %config.account,
            versions = ?about.versions,
            version = ?about.version,
            build = ?about.build,
            mode = ?about.mode,
            "signal-cli daemon reachable"
        );

        let account = config.account.clone();
        let identity = api
            .contacts()
            .await?
            .into_iter()
            .map(Contact::from)
            .find(|c| c.number.as_deref() == Some(account.as_str()))
            .unwrap_or_else(|| Contact {
                number: Some(account),
                ..Default::default()
            });
        debug!(identity = ?identity, "resolved account identity");

        Ok(Self {
            api,
            config,
            identity,
        })
    }

    pub fn api(&self) -> &SignalApi {
        &self.api
    }

    pub fn config(&self) -> &SignalAccountConfig {
        &self.config
    }

    /// Decode a batch of envelopes against a fresh contact and group list.
    /// A failed lookup degrades to bare addresses rather than dropping the
    /// batch.
    pub async fn decode(&self, envelopes: &[ReceivedEnvelope]) -> Vec<InboundMessage> {
        if envelopes.is_empty() {
            return Vec::new();
        }

        let contacts = Messenger::contacts(self).await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to list contacts while decoding envelopes");
            Vec::new()
        });
        let groups = Messenger::groups(self).await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to list groups while decoding envelopes");
            Vec::new()
        });
        let directory = Directory {
            identity: self.identity.clone(),
            contacts,
            groups,
        };

        envelopes
            .iter()
            .filter_map(|e| inbound::decode(e, &directory))
            .collect()
    }

    async fn encode_attachment(&self, attachment: &Attachment) -> Result<String> {
        match attachment {
            Attachment::Local(path) => {
                let data = tokio::fs::read(path).await?;
                Ok(attachments::data_uri(
                    attachments::mime_from_path(path),
                    &attachments::file_name(path),
                    &data,
                ))
            },
            Attachment::Stored {
                id,
                content_type,
                filename,
            } => {
                let data = self.api.attachment(id).await?;
                Ok(attachments::data_uri(
                    content_type
                        .as_deref()
                        .unwrap_or("application/octet-stream"),
                    filename.as_deref().unwrap_or_default(),
                    &data,
                ))
            },
            Attachment::Inline {
                filename,
                content_type,
                data,
            } => Ok(attachments::data_uri(content_type, filename, data)),
        }
    }
}

#[async_trait]
impl Messenger for SignalMessenger {
    fn identity(&self) -> &Contact {
        &self.identity
    }

    async fn contacts(&self) -> sigrelay_channels::Result<Vec<Contact>> {
        let mut contacts: Vec<Contact> = self
            .api
            .contacts()
            .await?
            .into_iter()
            .map(Contact::from)
            .collect();
        // The daemon's order is not guaranteed between calls; command
        // indices must stay put.
        contacts.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(contacts)
    }

    async fn groups(&self) -> sigrelay_channels::Result<Vec<Group>> {
        Ok(self
            .api
            .groups()
            .await?
            .into_iter()
            .map(Group::from)
            .collect())
    }

    async fn send(&self, message: OutboundMessage) -> sigrelay_channels::Result<SentMessage> {
        let mut base64_attachments = Vec::with_capacity(message.attachments.len());
        for attachment in &message.attachments {
            base64_attachments.push(self.encode_attachment(attachment).await?);
        }

        let (quote_timestamp, quote_author, quote_message) = match message.quote {
            Some(quote) => (Some(quote.timestamp), Some(quote.author), Some(quote.text)),
            None => (None, None, None),
        };

        let request = SendRequest {
            number: self.config.account.clone(),
            recipients: vec![message.recipient.address().to_string()],
            message: message.body,
            base64_attachments,
            sticker: message.sticker.map(|s| s.to_string()),
            quote_timestamp,
            quote_author,
            quote_message,
        };
        let response = self.api.send(&request).await?;

        Ok(SentMessage {
            recipient: message.recipient,
            author: self.identity.id().to_string(),
            timestamp: response.timestamp,
        })
    }

    async fn react(&self, target: &MessageRef, emoji: &str) -> sigrelay_channels::Result<()> {
        let request = ReactionRequest {
            reaction: emoji.to_string(),
            recipient: target.conversation.address().to_string(),
            target_author: target.author.clone(),
            timestamp: target.timestamp,
        };
        self.api.react(&request).await?;
        Ok(())
    }

    async fn mark_read(&self, message: &InboundMessage) -> sigrelay_channels::Result<()> {
        let request = ReceiptRequest {
            receipt_type: "read",
            recipient: message.sender.id().to_string(),
            timestamp: message.timestamp,
        };
        self.api.receipt(&request).await?;
        Ok(())
    }

    async fn avatar(&self, contact: &Contact) -> sigrelay_channels::Result<Option<Attachment>> {
        let Some(uuid) = contact.uuid.as_deref() else {
            return Ok(None);
        };
        let Some(data) = self.api.avatar(uuid).await? else {
            return Ok(None);
        };
        let (content_type, ext) = attachments::sniff_image(&data);
        Ok(Some(Attachment::Inline {
            filename: format!("avatar.{ext}"),
            content_type: content_type.to_string(),
            data,
        }))
    }
}
