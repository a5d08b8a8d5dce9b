use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("signal-cli {operation} failed: {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("signal-cli {operation} still rate limited after {retries} retries")]
    RateLimited {
        operation: &'static str,
        retries: usize,
    },

    #[error("{message}")]
    Message { message: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl From<Error> for sigrelay_channels::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { operation, .. } | Error::RateLimited { operation, .. } => {
                Self::api(operation, err)
            },
            Error::Message { message } => Self::invalid_input(message),
            Error::Io(e) => Self::Io(e),
            other => Self::external("signal-cli", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
