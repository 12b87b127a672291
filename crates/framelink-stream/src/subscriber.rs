use std::sync::Arc;

use framelink_image::{decode_image, Image};
use framelink_transport::{Subscription, Transport};
use tracing::error;

use crate::buffer::FrameBuffer;
use crate::error::Result;
use crate::traits::FrameSource;

/// Maintains a thread-safe snapshot of the latest frame on a channel.
///
/// The transport's delivery thread decodes every inbound message into
/// the fixed BGR8 representation and overwrites the internal
/// [`FrameBuffer`]; [`latest_frame`] reads that buffer from any thread
/// at any time, independent of delivery timing.
///
/// A malformed message never disrupts the stream: the decode failure is
/// logged, the buffered frame stays as it was, and the next valid
/// delivery simply supersedes it.
///
/// Dropping the subscriber unregisters the callback first and waits out
/// an in-flight delivery, so no buffer write can happen after teardown
/// begins.
///
/// [`latest_frame`]: ImageSubscriber::latest_frame
pub struct ImageSubscriber {
    buffer: Arc<FrameBuffer>,
    subscription: Subscription,
}

impl ImageSubscriber {
    /// Bind to a channel on the given transport and start receiving.
    ///
    /// Fails fast if the transport is shut down or the channel name is
    /// invalid.
    pub fn new(transport: &Transport, channel: &str) -> Result<Self> {
        let buffer = Arc::new(FrameBuffer::new());
        let slot = Arc::clone(&buffer);
        let name = channel.to_string();
        let subscription = transport.subscribe(channel, move |payload| {
            match decode_image(payload) {
                Ok(frame) => slot.replace(frame),
                // Recovered locally: keep the last good frame.
                Err(err) => error!(channel = %name, %err, "unable to decode inbound image"),
            }
        })?;
        Ok(Self {
            buffer,
            subscription,
        })
    }

    /// The channel this subscriber is bound to.
    pub fn channel(&self) -> &str {
        self.subscription.channel()
    }

    /// The most recent completely-delivered frame.
    ///
    /// Callable from any thread. Returns the empty image until the first
    /// message arrives. The returned frame always reflects one single
    /// complete delivery, never a mix of two.
    pub fn latest_frame(&self) -> Image {
        self.buffer.snapshot()
    }
}

impl FrameSource for ImageSubscriber {
    fn latest_frame(&self) -> Image {
        ImageSubscriber::latest_frame(self)
    }
}

impl std::fmt::Debug for ImageSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSubscriber")
            .field("channel", &self.subscription.channel())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, Bytes, BytesMut};
    use framelink_image::encode_image;
    use framelink_transport::Transport;

    use super::*;
    use crate::error::StreamError;

    fn wire_frame(image: &Image) -> Bytes {
        let mut buf = BytesMut::new();
        encode_image(image, &mut buf);
        buf.freeze()
    }

    #[test]
    fn empty_until_first_delivery() {
        let transport = Transport::new();
        let subscriber = ImageSubscriber::new(&transport, "cam/in").unwrap();
        assert!(subscriber.latest_frame().is_empty());
    }

    #[test]
    fn stores_last_delivered_frame() {
        let transport = Transport::new();
        let subscriber = ImageSubscriber::new(&transport, "cam/in").unwrap();
        let publication = transport.advertise("cam/in").unwrap();

        let frame = Image::solid(2, 2, [10, 20, 30]);
        publication.publish(wire_frame(&frame));
        transport.quiesce();

        assert_eq!(subscriber.latest_frame(), frame);
    }

    #[test]
    fn malformed_message_keeps_previous_frame() {
        let transport = Transport::new();
        let subscriber = ImageSubscriber::new(&transport, "cam/in").unwrap();
        let publication = transport.advertise("cam/in").unwrap();

        let frame = Image::solid(2, 2, [1, 1, 1]);
        publication.publish(wire_frame(&frame));
        transport.quiesce();

        publication.publish(Bytes::from_static(b"not an image"));
        transport.quiesce();

        assert_eq!(subscriber.latest_frame(), frame);
    }

    #[test]
    fn oversized_header_is_recovered_like_any_decode_failure() {
        let transport = Transport::new();
        let subscriber = ImageSubscriber::new(&transport, "cam/in").unwrap();
        let publication = transport.advertise("cam/in").unwrap();

        let frame = Image::solid(2, 2, [3, 3, 3]);
        publication.publish(wire_frame(&frame));
        transport.quiesce();

        // Valid magic and tag, dimensions whose byte count would wrap.
        let mut buf = BytesMut::new();
        buf.put_slice(&[0x46, 0x4C]);
        buf.put_u8(0);
        buf.put_u32_le(u32::MAX);
        buf.put_u32_le(u32::MAX);
        publication.publish(buf.freeze());
        // Must come back: the delivery thread survives the message.
        transport.quiesce();
        assert_eq!(subscriber.latest_frame(), frame);

        let next = Image::solid(2, 2, [4, 4, 4]);
        publication.publish(wire_frame(&next));
        transport.quiesce();
        assert_eq!(subscriber.latest_frame(), next);
    }

    #[test]
    fn foreign_encoding_is_converted_to_bgr8() {
        let transport = Transport::new();
        let subscriber = ImageSubscriber::new(&transport, "cam/in").unwrap();
        let publication = transport.advertise("cam/in").unwrap();

        // A MONO8 message from a foreign publisher.
        let mut buf = BytesMut::new();
        buf.put_slice(&[0x46, 0x4C]);
        buf.put_u8(2);
        buf.put_u32_le(1);
        buf.put_u32_le(1);
        buf.put_u8(42);
        publication.publish(buf.freeze());
        transport.quiesce();

        assert_eq!(subscriber.latest_frame(), Image::solid(1, 1, [42, 42, 42]));
    }

    #[test]
    fn construction_fails_on_shut_down_transport() {
        let transport = Transport::new();
        transport.shutdown();

        let err = ImageSubscriber::new(&transport, "cam/in").unwrap_err();
        assert!(matches!(err, StreamError::Transport(_)));
    }

    #[test]
    fn no_delivery_after_drop() {
        let transport = Transport::new();
        let subscriber = ImageSubscriber::new(&transport, "cam/in").unwrap();
        let publication = transport.advertise("cam/in").unwrap();
        drop(subscriber);

        publication.publish(wire_frame(&Image::solid(2, 2, [9, 9, 9])));
        transport.quiesce();
        // Nothing to assert on the dropped subscriber; this is a
        // does-not-crash check for late deliveries.
    }
}
