use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::MessageTag;

/// Type-erased message payload, shared with every handler of one dispatch.
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

/// A type-erased handler. The typed wrapper downcasts the payload.
type HandlerFn = dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync;

/// Handle identifying one registered handler.
///
/// Returned by `subscribe` on either bus and passed back to `unsubscribe`.
/// The handle remembers the tag it was registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    tag: MessageTag,
    id: u64,
}

impl Subscription {
    /// Returns the tag this subscription listens to.
    pub fn tag(&self) -> MessageTag {
        self.tag
    }
}

struct Subscriber {
    id: u64,
    handler: Arc<HandlerFn>,
}

/// A queued message waiting for the next drain.
pub(crate) struct Envelope {
    tag: MessageTag,
    payload: Payload,
}

impl Envelope {
    pub fn new(tag: MessageTag, payload: Payload) -> Self {
        Self { tag, payload }
    }
}

/// Dispatch core shared by the event and command buses.
///
/// Holds the subscription registry (tag → handlers in registration order)
/// and the deferred FIFO queue. Both are guarded by their own mutex, and
/// neither lock is held while a handler runs, so handlers may subscribe,
/// unsubscribe, send and post re-entrantly.
pub(crate) struct Dispatcher {
    /// Channel name used in log messages ("event" / "command").
    channel: &'static str,
    handlers: Mutex<HashMap<MessageTag, Vec<Subscriber>>>,
    queue: Mutex<VecDeque<Envelope>>,
    next_id: AtomicU64,
    /// Set while a drain is delivering its batch.
    draining: AtomicBool,
    /// Queue length above which a warning is logged; zero disables it.
    warning_threshold: AtomicUsize,
    /// Whether the current excursion above the threshold was already reported.
    warned: AtomicBool,
}

impl Dispatcher {
    pub fn new(channel: &'static str, warning_threshold: usize) -> Self {
        Self {
            channel,
            handlers: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            draining: AtomicBool::new(false),
            warning_threshold: AtomicUsize::new(warning_threshold),
            warned: AtomicBool::new(false),
        }
    }

    /// Registers a handler under `tag`. Duplicates are allowed.
    pub fn subscribe(
        &self,
        tag: MessageTag,
        handler: impl Fn(&(dyn Any + Send + Sync)) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.lock().entry(tag).or_default().push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        log::trace!("{} subscriber {id} registered for `{tag}`", self.channel);
        Subscription { tag, id }
    }

    /// Removes a handler. Returns `false` if it was not registered.
    ///
    /// A dispatch that already took its snapshot still calls the handler;
    /// the removal applies to every later dispatch.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut handlers = self.handlers.lock();
        let Some(subscribers) = handlers.get_mut(&subscription.tag) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|s| s.id != subscription.id);
        let removed = subscribers.len() != before;
        if subscribers.is_empty() {
            handlers.remove(&subscription.tag);
        }
        removed
    }

    /// Removes every handler of every tag.
    pub fn clear_subscribers(&self) {
        self.handlers.lock().clear();
    }

    /// Returns the number of handlers registered under `tag`.
    pub fn subscriber_count(&self, tag: MessageTag) -> usize {
        self.handlers.lock().get(&tag).map_or(0, Vec::len)
    }

    /// Delivers a message to every handler currently registered for its tag.
    ///
    /// The handler list is snapshotted before the first call, then the
    /// registry lock is released. A panicking handler is contained and
    /// logged; the remaining handlers still run.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, envelope: &Envelope) -> usize {
        let snapshot: Vec<Arc<HandlerFn>> = {
            let handlers = self.handlers.lock();
            match handlers.get(&envelope.tag) {
                Some(subscribers) => subscribers.iter().map(|s| s.handler.clone()).collect(),
                None => return 0,
            }
        };

        log::trace!(
            "dispatching {} `{}` to {} handler(s)",
            self.channel,
            envelope.tag,
            snapshot.len()
        );

        for handler in &snapshot {
            let payload = envelope.payload.as_ref();
            if panic::catch_unwind(AssertUnwindSafe(|| handler(payload))).is_err() {
                log::error!(
                    "{} handler for `{}` panicked; delivery continues with the next handler",
                    self.channel,
                    envelope.tag
                );
            }
        }
        snapshot.len()
    }

    /// Appends a message to the deferred queue. Callable from any thread.
    pub fn post(&self, envelope: Envelope) {
        let len = {
            let mut queue = self.queue.lock();
            queue.push_back(envelope);
            queue.len()
        };

        let threshold = self.warning_threshold.load(Ordering::Relaxed);
        if threshold > 0 && len > threshold && !self.warned.swap(true, Ordering::Relaxed) {
            log::warn!(
                "{} queue holds {len} undelivered messages (warning threshold {threshold})",
                self.channel
            );
        }
    }

    /// Delivers every message queued at the moment the drain starts.
    ///
    /// The batch is split off the queue under the lock, so messages posted
    /// by handlers during this drain stay queued for the next one. A drain
    /// started from inside a handler of an ongoing drain delivers nothing.
    ///
    /// Returns the number of messages delivered.
    pub fn drain(&self) -> usize {
        if self.draining.swap(true, Ordering::Acquire) {
            log::debug!("nested {} drain ignored", self.channel);
            return 0;
        }

        let batch: Vec<Envelope> = {
            let mut queue = self.queue.lock();
            let len = queue.len();
            queue.drain(..len).collect()
        };
        self.warned.store(false, Ordering::Relaxed);

        for envelope in &batch {
            self.dispatch(envelope);
        }

        self.draining.store(false, Ordering::Release);
        batch.len()
    }

    /// Returns the number of queued, undelivered messages.
    pub fn pending_len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn set_warning_threshold(&self, threshold: usize) {
        self.warning_threshold.store(threshold, Ordering::Relaxed);
    }
}
