use thiserror::Error;

/// Errors surfaced by the task store, the snapshot layer and the remote assistant.
#[derive(Debug, Error)]
pub enum Error {
    /// A task was rejected at creation. Callers in the UI ignore these.
    #[error("invalid task: {0}")]
    Validation(String),

    /// The remote assistant is not configured well enough to send a request.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("Failed to get response from LLM API: {0}")]
    Transport(String),

    #[error("Failed to get response from LLM API: request failed with {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to get response from LLM API: unreadable response: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}
