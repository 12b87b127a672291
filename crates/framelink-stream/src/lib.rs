//! Image streaming bridge over framelink channels.
//!
//! This is the core value-add layer of framelink. An [`ImagePublisher`]
//! adapts "write one frame" into a transport publish; an
//! [`ImageSubscriber`] keeps a guarded, always-current snapshot of the
//! latest frame delivered on its channel. Any producer can drive the
//! publish side through [`FrameSink`], and any consumer can poll the
//! subscribe side through [`FrameSource`] — no delivery timing to worry
//! about, no partial frames, ever.

pub mod buffer;
pub mod error;
pub mod publisher;
pub mod subscriber;
pub mod traits;

pub use buffer::FrameBuffer;
pub use error::{Result, StreamError};
pub use publisher::ImagePublisher;
pub use subscriber::ImageSubscriber;
pub use traits::{FrameSink, FrameSource};
