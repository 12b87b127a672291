use bytes::BytesMut;
use framelink_image::{encode_image, Image};
use framelink_transport::{Publication, Transport};
use tracing::trace;

use crate::error::Result;
use crate::traits::FrameSink;

/// Publishes frames onto a named channel.
///
/// Adapts the generic "write one frame" call into a transport publish.
/// Attach it to anything that drives a [`FrameSink`] — a camera, a video
/// file decoder — and every frame it emits goes out on the channel.
///
/// Empty frames are a silent no-op: upstream sources legitimately emit
/// them at end-of-stream, and "do nothing observable" beats erroring on
/// every teardown.
pub struct ImagePublisher {
    publication: Publication,
    encode_buf: BytesMut,
}

impl ImagePublisher {
    /// Bind to a channel on the given transport.
    ///
    /// Fails fast if the transport is shut down or the channel name is
    /// invalid; a misconfigured binding should stop initialization early.
    pub fn new(transport: &Transport, channel: &str) -> Result<Self> {
        let publication = transport.advertise(channel)?;
        Ok(Self {
            publication,
            encode_buf: BytesMut::new(),
        })
    }

    /// The channel this publisher is bound to.
    pub fn channel(&self) -> &str {
        self.publication.channel()
    }

    /// Encode `frame` as BGR8 and hand it to the transport.
    ///
    /// Fire-and-forget: no acknowledgement, no backpressure. Blocks only
    /// as long as the transport's own enqueue.
    pub fn publish(&mut self, frame: &Image) {
        if frame.is_empty() {
            return;
        }
        self.encode_buf.clear();
        encode_image(frame, &mut self.encode_buf);
        let payload = self.encode_buf.split().freeze();
        trace!(
            channel = %self.publication.channel(),
            width = frame.width(),
            height = frame.height(),
            "publishing frame"
        );
        self.publication.publish(payload);
    }
}

impl FrameSink for ImagePublisher {
    fn write_frame(&mut self, frame: &Image) {
        self.publish(frame);
    }
}

impl std::fmt::Debug for ImagePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePublisher")
            .field("channel", &self.publication.channel())
            .finish()
    }
}
