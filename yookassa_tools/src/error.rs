use thiserror::Error;

#[derive(Debug, Error)]
pub enum YooKassaApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach YooKassa: {0}")]
    Transport(String),
    #[error("YooKassa did not respond in time: {0}")]
    Timeout(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Invalid webhook notification: {0}")]
    InvalidNotification(String),
}

impl YooKassaApiError {
    /// Returns true if repeating the same request cannot succeed, i.e. YooKassa understood the request and refused it.
    ///
    /// Network failures, timeouts, rate limiting and 5xx responses are all transient.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::QueryError { status, .. } => (400..500).contains(status) && *status != 429,
            Self::Initialization(_) | Self::InvalidNotification(_) => true,
            Self::Transport(_) | Self::Timeout(_) | Self::JsonError(_) => false,
        }
    }
}
