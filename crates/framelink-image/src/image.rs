use bytes::Bytes;

use crate::error::{ImageError, Result};

/// Bytes per pixel in the fixed BGR8 representation.
pub const BYTES_PER_PIXEL: usize = 3;

/// An in-memory raster image, always BGR 8 bits/channel.
///
/// The pixel buffer is an immutable [`Bytes`], so cloning an `Image` is a
/// reference-count bump, not a pixel copy. The invariant
/// `data.len() == width * height * 3` is enforced at construction and
/// holds for every `Image` in the process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    width: u32,
    height: u32,
    data: Bytes,
}

impl Image {
    /// Create an image from BGR8 pixel data.
    ///
    /// Fails with [`ImageError::SizeMismatch`] if `data` is not exactly
    /// `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        // Saturating: a dimension product that would wrap can never
        // match a real buffer length, so it falls into SizeMismatch.
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(BYTES_PER_PIXEL);
        if data.len() != expected {
            return Err(ImageError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// The empty 0x0 image. Same as `Image::default()`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a uniform image where every pixel is `bgr`.
    pub fn solid(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let pixels = (width as usize).saturating_mul(height as usize);
        let mut data = Vec::with_capacity(pixels.saturating_mul(BYTES_PER_PIXEL));
        for _ in 0..pixels {
            data.extend_from_slice(&bgr);
        }
        Self {
            width,
            height,
            data: Bytes::from(data),
        }
    }

    /// Returns true if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw BGR8 pixel data, row-major, no padding.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the image and return the pixel buffer.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}
