use thiserror::Error;

/// Any failure while exchanging a message with the chat endpoint.
///
/// The variants exist for the log; the view treats them all the same way.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}
