pub mod connection;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error returned from the storage service.
    #[error("api call failed: status={0} detail={1}")]
    Response(u16, String),

    /// An error from the underlying HTTP client.
    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),

    /// An error from the configured token source.
    #[error("token source failed: {0}")]
    TokenSource(Box<dyn std::error::Error + Send + Sync>),

    /// The response body could not be decoded.
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
}
