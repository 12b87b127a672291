//! Filesystem space queries.
//!
//! Recording components (sequence writers dumping camera streams to
//! disk) need to know how much room is left on the volume they write
//! to. This crate answers that with `statvfs`-backed queries for the
//! mount point containing a given path.

pub mod error;

#[cfg(unix)]
pub mod fsinfo;

pub use error::{Result, SysError};

#[cfg(unix)]
pub use fsinfo::{
    available_space, available_space_percentage, block_size, free_space, max_filename_length,
    total_space, used_space, used_space_percentage, SpaceUnit,
};
