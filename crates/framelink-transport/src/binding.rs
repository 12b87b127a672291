use std::sync::Arc;

use bytes::Bytes;

use crate::bus::{Shared, Topic};

/// Publish-side binding to a named channel.
///
/// Created by [`Transport::advertise`](crate::Transport::advertise).
/// Dropping the publication releases the channel binding; a channel with
/// no remaining bindings disappears from the bus.
pub struct Publication {
    shared: Arc<Shared>,
    topic: Arc<Topic>,
}

impl Publication {
    pub(crate) fn new(shared: Arc<Shared>, topic: Arc<Topic>) -> Self {
        Self { shared, topic }
    }

    /// Enqueue a payload for delivery to every current subscriber of the
    /// channel.
    ///
    /// Fire-and-forget: no acknowledgement, no backpressure. Blocks only
    /// for the queue handoff. A publish racing the bus shutdown is
    /// silently dropped.
    pub fn publish(&self, payload: Bytes) {
        self.shared.send_to(&self.topic, payload);
    }

    /// The channel this publication is bound to.
    pub fn channel(&self) -> &str {
        &self.topic.name
    }
}

impl Drop for Publication {
    fn drop(&mut self) {
        self.shared.release_binding(&self.topic);
    }
}

impl std::fmt::Debug for Publication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publication")
            .field("channel", &self.topic.name)
            .finish()
    }
}

/// Subscribe-side binding to a named channel.
///
/// Created by [`Transport::subscribe`](crate::Transport::subscribe).
/// Dropping the subscription unregisters the callback before releasing
/// the binding; the drop blocks until an in-flight delivery to this
/// callback has completed, so the callback never runs after teardown.
pub struct Subscription {
    shared: Arc<Shared>,
    topic: Arc<Topic>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(shared: Arc<Shared>, topic: Arc<Topic>, id: u64) -> Self {
        Self { shared, topic, id }
    }

    /// The channel this subscription is bound to.
    pub fn channel(&self) -> &str {
        &self.topic.name
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shared.remove_subscriber(&self.topic, self.id);
        self.shared.release_binding(&self.topic);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.topic.name)
            .field("id", &self.id)
            .finish()
    }
}
