use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ImageError, Result};
use crate::image::{Image, BYTES_PER_PIXEL};

/// Image header: magic (2) + encoding (1) + width (4) + height (4) = 11 bytes.
pub const HEADER_SIZE: usize = 11;

/// Magic bytes: "FL" (0x46 0x4C).
pub const MAGIC: [u8; 2] = [0x46, 0x4C];

/// Maximum pixel payload size: 64 MiB (a 4K BGR8 frame is ~24 MiB).
pub const MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Pixel encodings that can appear on the wire.
///
/// [`PixelFormat::Bgr8`] is the fixed internal representation; the other
/// encodings exist so the decoder can accept foreign publishers and convert
/// on delivery. The encoder only ever writes `Bgr8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    /// Blue, green, red — 8 bits/channel. The internal representation.
    Bgr8 = 0,
    /// Red, green, blue — 8 bits/channel. Converted by channel swap.
    Rgb8 = 1,
    /// Single 8-bit gray channel. Converted by replication.
    Mono8 = 2,
}

impl PixelFormat {
    /// Bytes per pixel for this encoding.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
            PixelFormat::Mono8 => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(PixelFormat::Bgr8),
            1 => Ok(PixelFormat::Rgb8),
            2 => Ok(PixelFormat::Mono8),
            other => Err(ImageError::UnsupportedEncoding(other)),
        }
    }
}

/// Encode an image into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────┬────────────┬────────────┬───────────────┐
/// │ Magic (2B) │ Enc (1B) │ Width      │ Height     │ Pixels        │
/// │ 0x46 0x4C  │ 0 = BGR8 │ (4B LE)    │ (4B LE)    │ (row-major)   │
/// └────────────┴──────────┴────────────┴────────────┴───────────────┘
/// ```
///
/// The encoder always writes BGR8 — the only representation an [`Image`]
/// can hold.
pub fn encode_image(image: &Image, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + image.data().len());
    dst.put_slice(&MAGIC);
    dst.put_u8(PixelFormat::Bgr8 as u8);
    dst.put_u32_le(image.width());
    dst.put_u32_le(image.height());
    dst.put_slice(image.data());
}

/// Decode a wire message into a BGR8 [`Image`].
///
/// Foreign encodings (RGB8, MONO8) are converted; BGR8 payloads are taken
/// zero-copy. Fails on truncated messages, bad magic, unknown encoding
/// tags, or a payload that disagrees with the declared dimensions.
pub fn decode_image(src: &Bytes) -> Result<Image> {
    if src.len() < HEADER_SIZE {
        return Err(ImageError::Truncated {
            size: src.len(),
            header: HEADER_SIZE,
        });
    }
    if src[0..2] != MAGIC {
        return Err(ImageError::InvalidMagic);
    }

    let format = PixelFormat::from_tag(src[2])?;
    let width = u32::from_le_bytes(src[3..7].try_into().unwrap());
    let height = u32::from_le_bytes(src[7..11].try_into().unwrap());

    // Saturating on purpose: a header declaring absurd dimensions must
    // land in TooLarge, never overflow.
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(format.bytes_per_pixel());
    if expected > MAX_PAYLOAD {
        return Err(ImageError::TooLarge {
            size: expected,
            max: MAX_PAYLOAD,
        });
    }

    let payload = src.slice(HEADER_SIZE..);
    if payload.len() != expected {
        return Err(ImageError::SizeMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let data = match format {
        PixelFormat::Bgr8 => payload,
        PixelFormat::Rgb8 => {
            let mut bgr = Vec::with_capacity(payload.len());
            for rgb in payload.chunks_exact(3) {
                bgr.extend_from_slice(&[rgb[2], rgb[1], rgb[0]]);
            }
            Bytes::from(bgr)
        }
        PixelFormat::Mono8 => {
            let mut bgr = Vec::with_capacity(payload.len() * BYTES_PER_PIXEL);
            for &gray in payload.iter() {
                bgr.extend_from_slice(&[gray, gray, gray]);
            }
            Bytes::from(bgr)
        }
    };

    Image::new(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(image: &Image) -> Bytes {
        let mut buf = BytesMut::new();
        encode_image(image, &mut buf);
        buf.freeze()
    }

    #[test]
    fn encode_decode_roundtrip() {
        let img = Image::solid(3, 2, [9, 8, 7]);
        let wire = encoded(&img);
        assert_eq!(wire.len(), HEADER_SIZE + 18);

        let decoded = decode_image(&wire).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn bgr8_payload_is_zero_copy() {
        let img = Image::solid(2, 2, [1, 2, 3]);
        let wire = encoded(&img);
        let decoded = decode_image(&wire).unwrap();
        assert_eq!(
            decoded.data().as_ptr(),
            wire[HEADER_SIZE..].as_ptr(),
            "BGR8 decode must reuse the wire buffer"
        );
    }

    #[test]
    fn decode_truncated_header() {
        let wire = Bytes::from_static(&[0x46, 0x4C, 0x00]);
        let err = decode_image(&wire).unwrap_err();
        assert!(matches!(err, ImageError::Truncated { size: 3, .. }));
    }

    #[test]
    fn decode_invalid_magic() {
        let mut buf = BytesMut::new();
        encode_image(&Image::solid(1, 1, [0, 0, 0]), &mut buf);
        buf[0] = 0xFF;
        let err = decode_image(&buf.freeze()).unwrap_err();
        assert!(matches!(err, ImageError::InvalidMagic));
    }

    #[test]
    fn decode_unknown_encoding_tag() {
        let mut buf = BytesMut::new();
        encode_image(&Image::solid(1, 1, [0, 0, 0]), &mut buf);
        buf[2] = 0x7E;
        let err = decode_image(&buf.freeze()).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedEncoding(0x7E)));
    }

    #[test]
    fn decode_size_mismatch() {
        let mut buf = BytesMut::new();
        encode_image(&Image::solid(2, 2, [0, 0, 0]), &mut buf);
        buf.truncate(HEADER_SIZE + 7);
        let err = decode_image(&buf.freeze()).unwrap_err();
        assert!(matches!(
            err,
            ImageError::SizeMismatch {
                expected: 12,
                actual: 7
            }
        ));
    }

    #[test]
    fn decode_rejects_oversized_dimensions() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(PixelFormat::Bgr8 as u8);
        buf.put_u32_le(100_000);
        buf.put_u32_le(100_000);
        let err = decode_image(&buf.freeze()).unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
    }

    #[test]
    fn decode_rejects_dimension_overflow() {
        // width * height fits in usize but * 3 would wrap; must still
        // come back as TooLarge, not a panic.
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(PixelFormat::Bgr8 as u8);
        buf.put_u32_le(u32::MAX);
        buf.put_u32_le(u32::MAX);
        let err = decode_image(&buf.freeze()).unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
    }

    #[test]
    fn rgb8_converts_by_channel_swap() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(PixelFormat::Rgb8 as u8);
        buf.put_u32_le(2);
        buf.put_u32_le(1);
        // Two RGB pixels: red, blue.
        buf.put_slice(&[255, 0, 0, 0, 0, 255]);

        let decoded = decode_image(&buf.freeze()).unwrap();
        assert_eq!(decoded.data().as_ref(), &[0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn mono8_converts_by_replication() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(PixelFormat::Mono8 as u8);
        buf.put_u32_le(2);
        buf.put_u32_le(1);
        buf.put_slice(&[7, 200]);

        let decoded = decode_image(&buf.freeze()).unwrap();
        assert_eq!(decoded.data().as_ref(), &[7, 7, 7, 200, 200, 200]);
    }

    #[test]
    fn empty_image_roundtrip() {
        let wire = encoded(&Image::empty());
        let decoded = decode_image(&wire).unwrap();
        assert!(decoded.is_empty());
    }
}
