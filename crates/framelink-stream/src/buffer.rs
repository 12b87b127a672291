use std::sync::{Mutex, MutexGuard, PoisonError};

use framelink_image::Image;

/// Single-slot, last-write-wins cache of the most recent frame.
///
/// The slot is only reachable through [`replace`] and [`snapshot`], so a
/// reader can never observe a torn write: every snapshot is one complete
/// frame. One writer (the transport delivery thread) and any number of
/// readers are safe. The slot starts out holding the empty image.
///
/// A snapshot clones the [`Image`], which is a reference-count bump on
/// the pixel buffer, so reads are cheap and the lock is never held
/// across anything slow.
///
/// [`replace`]: FrameBuffer::replace
/// [`snapshot`]: FrameBuffer::snapshot
#[derive(Debug, Default)]
pub struct FrameBuffer {
    slot: Mutex<Image>,
}

impl FrameBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with a new frame.
    pub fn replace(&self, frame: Image) {
        *self.lock() = frame;
    }

    /// The current frame — empty until the first [`replace`].
    ///
    /// [`replace`]: FrameBuffer::replace
    pub fn snapshot(&self) -> Image {
        self.lock().clone()
    }

    // Poisoning is absorbed: replacing an `Image` is a single move, so
    // the slot always holds a complete frame even after a panic.
    fn lock(&self) -> MutexGuard<'_, Image> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
