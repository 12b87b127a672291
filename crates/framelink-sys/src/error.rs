use std::path::PathBuf;

/// Errors that can occur while querying filesystem information.
#[derive(Debug, thiserror::Error)]
pub enum SysError {
    /// The `statvfs` call failed for the given path.
    #[error("statvfs failed for {path}: {source}")]
    Statvfs {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path cannot be passed to the OS (interior NUL byte).
    #[error("path contains an interior NUL byte: {path}")]
    InvalidPath { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, SysError>;
