//! Error taxonomy for one polling cycle.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Required secrets are absent. The only error that stops the process.
    #[error("missing required environment variables: {}", missing.join(", "))]
    FatalConfig { missing: Vec<&'static str> },
    #[error("homework API unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("homework API returned a body that is not JSON: {0}")]
    MalformedResponseBody(String),
    #[error("unexpected API response shape: {0}")]
    UnexpectedShape(&'static str),
    #[error("homework record has no `{0}` field")]
    MissingField(&'static str),
    #[error("unknown homework status: {0}")]
    UnknownVerdict(String),
    #[error("failed to deliver notification: {0}")]
    NotificationDeliveryFailed(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
