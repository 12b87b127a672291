//! Minimal bridge demo — a synthetic camera publishes frames on
//! "cam/front" while a consumer polls the subscriber's latest frame.
//!
//! Run with:
//!   cargo run --example camera-relay

use std::time::Duration;

use framelink_image::Image;
use framelink_stream::{FrameSink, ImagePublisher, ImageSubscriber};
use framelink_transport::Transport;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let transport = Transport::new();
    let subscriber = ImageSubscriber::new(&transport, "cam/front")?;
    let mut publisher = ImagePublisher::new(&transport, "cam/front")?;

    // A fake 64x48 camera ramping through gray levels at ~30 fps.
    for step in 0u8..=90 {
        let level = step.saturating_mul(2);
        publisher.write_frame(&Image::solid(64, 48, [level, level, level]));

        if step % 30 == 0 {
            let frame = subscriber.latest_frame();
            eprintln!(
                "latest frame: {}x{}, first pixel B={}",
                frame.width(),
                frame.height(),
                frame.data().first().copied().unwrap_or(0)
            );
        }
        std::thread::sleep(Duration::from_millis(33));
    }

    transport.quiesce();
    let last = subscriber.latest_frame();
    eprintln!(
        "final frame: {}x{}, first pixel B={}",
        last.width(),
        last.height(),
        last.data().first().copied().unwrap_or(0)
    );

    transport.shutdown();
    Ok(())
}
