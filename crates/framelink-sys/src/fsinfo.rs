use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::{Result, SysError};

/// Unit for reporting disk space.
///
/// Decimal multiples of 10³ bytes, plus the filesystem's own block as a
/// unit (its size varies per mount; see [`block_size`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceUnit {
    /// Filesystem blocks.
    Block,
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
}

/// Total size of the volume containing `path`, in `unit`.
pub fn total_space(path: impl AsRef<Path>, unit: SpaceUnit) -> Result<f64> {
    let stats = statvfs(path.as_ref())?;
    Ok(convert(stats.f_blocks as u64, stats.f_frsize as u64, unit))
}

/// Free space on the volume containing `path`, in `unit`.
///
/// This is the space free for the superuser, not to be confused with
/// [`available_space`], which is what unprivileged users can use.
pub fn free_space(path: impl AsRef<Path>, unit: SpaceUnit) -> Result<f64> {
    let stats = statvfs(path.as_ref())?;
    Ok(convert(stats.f_bfree as u64, stats.f_frsize as u64, unit))
}

/// Space available to unprivileged users on the volume containing
/// `path`, in `unit`.
pub fn available_space(path: impl AsRef<Path>, unit: SpaceUnit) -> Result<f64> {
    let stats = statvfs(path.as_ref())?;
    Ok(convert(stats.f_bavail as u64, stats.f_frsize as u64, unit))
}

/// Used space on the volume containing `path`, in `unit`.
pub fn used_space(path: impl AsRef<Path>, unit: SpaceUnit) -> Result<f64> {
    let stats = statvfs(path.as_ref())?;
    let used = (stats.f_blocks as u64).saturating_sub(stats.f_bfree as u64);
    Ok(convert(used, stats.f_frsize as u64, unit))
}

/// Used space on the volume containing `path`, as a percentage of its
/// total size.
pub fn used_space_percentage(path: impl AsRef<Path>) -> Result<f64> {
    let stats = statvfs(path.as_ref())?;
    if stats.f_blocks == 0 {
        return Ok(0.0);
    }
    let used = (stats.f_blocks as u64).saturating_sub(stats.f_bfree as u64);
    Ok(used as f64 / stats.f_blocks as f64 * 100.0)
}

/// Space available to unprivileged users on the volume containing
/// `path`, as a percentage of its total size.
pub fn available_space_percentage(path: impl AsRef<Path>) -> Result<f64> {
    let stats = statvfs(path.as_ref())?;
    if stats.f_blocks == 0 {
        return Ok(0.0);
    }
    Ok(stats.f_bavail as f64 / stats.f_blocks as f64 * 100.0)
}

/// Fragment size of the filesystem containing `path`, in bytes.
///
/// This is the unit `statvfs` reports block counts in and the basis for
/// every conversion above.
pub fn block_size(path: impl AsRef<Path>) -> Result<u64> {
    let stats = statvfs(path.as_ref())?;
    Ok(stats.f_frsize as u64)
}

/// Maximum filename length on the filesystem containing `path`.
pub fn max_filename_length(path: impl AsRef<Path>) -> Result<u64> {
    let stats = statvfs(path.as_ref())?;
    Ok(stats.f_namemax as u64)
}

fn convert(blocks: u64, block_size: u64, unit: SpaceUnit) -> f64 {
    let bytes = blocks as f64 * block_size as f64;
    match unit {
        SpaceUnit::Block => blocks as f64,
        SpaceUnit::Bytes => bytes,
        SpaceUnit::Kilobytes => bytes / 1e3,
        SpaceUnit::Megabytes => bytes / 1e6,
        SpaceUnit::Gigabytes => bytes / 1e9,
        SpaceUnit::Terabytes => bytes / 1e12,
    }
}

fn statvfs(path: &Path) -> Result<libc::statvfs> {
    let c_path =
        CString::new(path.as_os_str().as_bytes()).map_err(|_| SysError::InvalidPath {
            path: path.to_path_buf(),
        })?;

    let mut stats = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: `c_path` is a valid NUL-terminated string and `stats` is
    // writable memory of the correct size for the out-parameter.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), stats.as_mut_ptr()) };
    if rc != 0 {
        return Err(SysError::Statvfs {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }
    // SAFETY: statvfs returned 0, so the struct is fully initialized.
    Ok(unsafe { stats.assume_init() })
}
