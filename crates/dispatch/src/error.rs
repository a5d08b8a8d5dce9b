use thiserror::Error;

/// Why a command was refused.
///
/// The `Display` text is exactly what gets posted back to the control group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Message is not json. Doing nothing. Reason: {0}")]
    NotJson(String),

    #[error("Invalid command, expected a json object.")]
    NotObject,

    #[error("Invalid command, method not defined.")]
    MissingMethod,

    #[error("type error: method not str")]
    MethodType,

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Missing required parameter: contactid(int)")]
    MissingContactId,

    #[error("type error: contactid not int")]
    ContactIdType,

    #[error("index error: contact id out of range")]
    ContactIdRange,

    #[error("Missing required parameter: message(str)")]
    MissingMessage,

    #[error("type error: message not str")]
    MessageType,

    #[error("type error: attachment not str")]
    AttachmentType,

    #[error("attachment path doesn't exist.")]
    AttachmentNotFound,

    #[error("type error: param not str")]
    ParamType,
}

impl CommandError {
    /// Whether the reply quotes the offending message. Only the missing
    /// `method` reply goes out unquoted.
    pub fn quoted(&self) -> bool {
        !matches!(self, Self::MissingMethod)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The command was refused; reported back into the control group.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The transport failed while carrying out the command.
    #[error(transparent)]
    Channel(#[from] sigrelay_channels::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
