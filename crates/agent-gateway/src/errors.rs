use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Remote call failed: {0}")]
    RemoteCallFailure(String),

    #[error("Malformed content: {0}")]
    MalformedContent(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::RemoteCallFailure(err.to_string())
    }
}
