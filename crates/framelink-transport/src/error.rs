/// Errors that can occur when binding to the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport has been shut down; no new bindings can be created.
    #[error("transport shut down")]
    Shutdown,

    /// The channel name is not usable (empty).
    #[error("invalid channel name: {0:?}")]
    InvalidChannelName(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
