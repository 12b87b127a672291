/// Errors that can occur while constructing or decoding images.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The message is shorter than a complete image header.
    #[error("truncated image message ({size} bytes, header is {header})")]
    Truncated { size: usize, header: usize },

    /// The message header contains an invalid magic number.
    #[error("invalid image magic (expected 0x464C \"FL\")")]
    InvalidMagic,

    /// The encoding tag is not one the decoder understands.
    #[error("unsupported pixel encoding tag {0:#04x}")]
    UnsupportedEncoding(u8),

    /// The pixel payload does not match the declared dimensions.
    #[error("pixel data size mismatch (expected {expected} bytes, got {actual})")]
    SizeMismatch { expected: usize, actual: usize },

    /// The declared dimensions exceed the maximum payload size.
    #[error("image too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ImageError>;
