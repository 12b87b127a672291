//! Raster image type and wire codec for framelink.
//!
//! Every image that crosses a framelink channel is framed with:
//! - A 2-byte magic number ("FL") for message validation
//! - A 1-byte pixel encoding tag
//! - 4-byte little-endian width and height
//!
//! The payload is the raw pixel grid. Inside the process there is exactly
//! one raster representation: BGR 8 bits/channel. The decoder accepts a
//! small set of foreign encodings and converts on the way in.

pub mod codec;
pub mod error;
pub mod image;

pub use codec::{decode_image, encode_image, PixelFormat, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{ImageError, Result};
pub use image::{Image, BYTES_PER_PIXEL};
