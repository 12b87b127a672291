use framelink_image::Image;

/// Accepts one frame at a time from an upstream producer.
///
/// Anything that consumes a sequence of frames — a channel publisher, a
/// file writer, a display — implements this. Producers (e.g. a video
/// decoder streaming a recorded file) call [`write_frame`] once per
/// frame, fire-and-forget.
///
/// [`write_frame`]: FrameSink::write_frame
pub trait FrameSink {
    /// Accept one frame. Never fails; what "accept" means is up to the
    /// implementation.
    fn write_frame(&mut self, frame: &Image);
}

/// Exposes the most recent frame of a sequence on demand.
///
/// The returned frame reflects some single complete write; successive
/// calls may return the same frame if nothing new arrived in between.
pub trait FrameSource {
    /// The latest known frame, or the empty image if none has been
    /// observed yet.
    fn latest_frame(&self) -> Image;
}
