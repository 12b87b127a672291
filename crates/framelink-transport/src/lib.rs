//! In-process pub/sub message bus with named channels.
//!
//! This is the lowest layer of framelink. A [`Transport`] owns a single
//! delivery worker thread; publications enqueue opaque payloads onto a
//! named channel and the worker hands each payload to every callback
//! currently subscribed to that channel. Delivery is fire-and-forget:
//! no acknowledgement, no backpressure, no ordering promise between a
//! publisher's thread and a reader polling subscriber state.
//!
//! Bindings ([`Publication`], [`Subscription`]) are released on drop.
//! Dropping a subscription waits out an in-flight delivery to its
//! callback, so no callback can run after teardown completes.

pub mod binding;
pub mod bus;
pub mod error;

pub use binding::{Publication, Subscription};
pub use bus::Transport;
pub use error::{Result, TransportError};
