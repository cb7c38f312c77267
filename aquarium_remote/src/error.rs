use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport: {0}")]
    Transport(String),
    /// The Bot API answered `ok: false`.
    #[error("api error: {0}")]
    Api(String),
    #[error("decode: {0}")]
    Decode(String),
}

impl From<ureq::Error> for RemoteError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, resp) => RemoteError::Status {
                status,
                body: resp.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(t) => RemoteError::Transport(t.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
