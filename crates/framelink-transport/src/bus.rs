use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use bytes::Bytes;
use tracing::{debug, error, info, trace};

use crate::binding::{Publication, Subscription};
use crate::error::{Result, TransportError};

pub(crate) type Callback = Arc<dyn Fn(&Bytes) + Send + Sync>;

/// Lock a mutex, absorbing poisoning.
///
/// A panicking subscriber callback must not wedge the whole bus; every
/// guarded structure (subscriber lists, counters) remains valid after a
/// partial callback run.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct SubscriberEntry {
    pub(crate) id: u64,
    pub(crate) callback: Callback,
}

/// One named channel: its current subscribers plus a count of live
/// bindings (publications and subscriptions).
///
/// The binding count is only touched while holding the topic registry
/// lock, which keeps "last binding dropped" and "channel removed from
/// the registry" a single atomic step.
pub(crate) struct Topic {
    pub(crate) name: String,
    pub(crate) subscribers: Mutex<Vec<SubscriberEntry>>,
    bindings: AtomicUsize,
}

enum Job {
    Deliver { topic: Arc<Topic>, payload: Bytes },
}

/// Counts enqueued-but-undelivered jobs so `quiesce` can wait for the
/// worker to drain.
struct DeliveryQueue {
    pending: Mutex<usize>,
    idle: Condvar,
}

impl DeliveryQueue {
    fn start_job(&self) {
        *lock(&self.pending) += 1;
    }

    fn finish_job(&self) {
        let mut pending = lock(&self.pending);
        *pending -= 1;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut pending = lock(&self.pending);
        while *pending > 0 {
            pending = self
                .idle
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

pub(crate) struct Shared {
    topics: Mutex<HashMap<String, Arc<Topic>>>,
    tx: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    queue: Arc<DeliveryQueue>,
    next_subscriber_id: AtomicU64,
}

/// Handle to an in-process pub/sub bus.
///
/// Cloning the handle is cheap and every clone refers to the same bus.
/// The bus owns one delivery worker thread; all subscriber callbacks run
/// on that thread, asynchronously relative to publishers and readers.
#[derive(Clone)]
pub struct Transport {
    shared: Arc<Shared>,
}

impl Transport {
    /// Create a new bus and spawn its delivery worker thread.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let queue = Arc::new(DeliveryQueue {
            pending: Mutex::new(0),
            idle: Condvar::new(),
        });
        let worker_queue = Arc::clone(&queue);
        let worker = std::thread::spawn(move || deliver_loop(rx, worker_queue));
        debug!("transport started");

        Self {
            shared: Arc::new(Shared {
                topics: Mutex::new(HashMap::new()),
                tx: Mutex::new(Some(tx)),
                worker: Mutex::new(Some(worker)),
                queue,
                next_subscriber_id: AtomicU64::new(0),
            }),
        }
    }

    /// Create a publish-side binding on a named channel.
    ///
    /// Fails with [`TransportError::Shutdown`] after [`Transport::shutdown`]
    /// and with [`TransportError::InvalidChannelName`] for an empty name.
    pub fn advertise(&self, channel: &str) -> Result<Publication> {
        let topic = self.shared.bind(channel)?;
        debug!(channel, "advertised publication");
        Ok(Publication::new(Arc::clone(&self.shared), topic))
    }

    /// Create a subscribe-side binding on a named channel.
    ///
    /// The callback runs on the delivery worker thread for every payload
    /// published to `channel`, under the channel's subscriber lock — it
    /// must not call back into the transport. Same failure modes as
    /// [`Transport::advertise`].
    pub fn subscribe<F>(&self, channel: &str, callback: F) -> Result<Subscription>
    where
        F: Fn(&Bytes) + Send + Sync + 'static,
    {
        let topic = self.shared.bind(channel)?;
        let id = self
            .shared
            .next_subscriber_id
            .fetch_add(1, Ordering::Relaxed);
        lock(&topic.subscribers).push(SubscriberEntry {
            id,
            callback: Arc::new(callback),
        });
        debug!(channel, id, "registered subscription");
        Ok(Subscription::new(Arc::clone(&self.shared), topic, id))
    }

    /// Block until every payload enqueued so far has been delivered.
    pub fn quiesce(&self) {
        self.shared.queue.wait_idle();
    }

    /// Shut down the bus: stop accepting bindings and publishes, then
    /// join the worker once the queue drains. Idempotent.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    #[cfg(test)]
    pub(crate) fn topic_count(&self) -> usize {
        lock(&self.shared.topics).len()
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("channels", &lock(&self.shared.topics).len())
            .finish()
    }
}

impl Shared {
    fn bind(&self, channel: &str) -> Result<Arc<Topic>> {
        if channel.is_empty() {
            return Err(TransportError::InvalidChannelName(channel.to_string()));
        }
        if lock(&self.tx).is_none() {
            return Err(TransportError::Shutdown);
        }

        let mut topics = lock(&self.topics);
        let topic = topics
            .entry(channel.to_string())
            .or_insert_with(|| {
                Arc::new(Topic {
                    name: channel.to_string(),
                    subscribers: Mutex::new(Vec::new()),
                    bindings: AtomicUsize::new(0),
                })
            })
            .clone();
        topic.bindings.fetch_add(1, Ordering::Relaxed);
        Ok(topic)
    }

    pub(crate) fn send_to(&self, topic: &Arc<Topic>, payload: Bytes) {
        let tx = lock(&self.tx);
        match tx.as_ref() {
            Some(tx) => {
                self.queue.start_job();
                let job = Job::Deliver {
                    topic: Arc::clone(topic),
                    payload,
                };
                if tx.send(job).is_err() {
                    self.queue.finish_job();
                    debug!(channel = %topic.name, "delivery worker gone, message dropped");
                }
            }
            None => {
                debug!(channel = %topic.name, "publish after shutdown, message dropped");
            }
        }
    }

    pub(crate) fn remove_subscriber(&self, topic: &Arc<Topic>, id: u64) {
        // Taking the subscriber lock waits out an in-flight delivery to
        // this callback; once held, the callback can never run again.
        lock(&topic.subscribers).retain(|entry| entry.id != id);
        debug!(channel = %topic.name, id, "removed subscription");
    }

    pub(crate) fn release_binding(&self, topic: &Arc<Topic>) {
        let mut topics = lock(&self.topics);
        if topic.bindings.fetch_sub(1, Ordering::Relaxed) == 1 {
            topics.remove(&topic.name);
            debug!(channel = %topic.name, "channel released");
        }
    }

    fn shutdown(&self) {
        let tx = lock(&self.tx).take();
        drop(tx);
        let worker = lock(&self.worker).take();
        if let Some(handle) = worker {
            let _ = handle.join();
            info!("transport shut down");
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn deliver_loop(rx: Receiver<Job>, queue: Arc<DeliveryQueue>) {
    while let Ok(job) = rx.recv() {
        match job {
            Job::Deliver { topic, payload } => {
                // The job is finished even if a callback unwinds, so
                // `quiesce` can never hang on a dead delivery.
                let _finished = FinishOnDrop(&queue);
                // Callbacks run under the subscriber lock so that
                // unsubscription waits out an in-flight delivery.
                let subscribers = lock(&topic.subscribers);
                for entry in subscribers.iter() {
                    let callback = Arc::clone(&entry.callback);
                    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                        || callback(&payload),
                    ));
                    if outcome.is_err() {
                        error!(
                            channel = %topic.name,
                            id = entry.id,
                            "subscriber callback panicked, continuing delivery"
                        );
                    }
                }
                trace!(
                    channel = %topic.name,
                    subscribers = subscribers.len(),
                    bytes = payload.len(),
                    "delivered message"
                );
            }
        }
    }
}

struct FinishOnDrop<'a>(&'a DeliveryQueue);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish_job();
    }
}
