/// Errors that can occur while constructing bridge components.
///
/// Construction is the only fallible operation in this crate: a decode
/// failure on the subscribe side is recovered locally (logged, buffer
/// unchanged) and an empty-frame publish is a deliberate no-op.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The transport refused the channel binding.
    #[error("channel binding failed: {0}")]
    Transport(#[from] framelink_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, StreamError>;
