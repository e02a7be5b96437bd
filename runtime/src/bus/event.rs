use std::any::{Any, type_name};
use std::sync::Arc;

use super::MessageTag;
use super::dispatch::{Dispatcher, Envelope, Subscription};
use crate::config::BusConfig;
use crate::service::{ServiceResult, SystemService};

/// A notification that something happened.
///
/// Events are immutable once published. Implement it with
/// [`impl_event!`](crate::impl_event) or by hand:
///
/// ```ignore
/// struct TextureHydrated { id: String }
///
/// impl Event for TextureHydrated {
///     const TAG: MessageTag = MessageTag::new("texture.hydrated");
/// }
/// ```
pub trait Event: Send + Sync + 'static {
    /// Dispatch key of this event type. Must be unique among event types.
    const TAG: MessageTag;
}

/// Typed publish/subscribe channel for [`Event`]s.
///
/// # Delivery
///
/// - [`send`](Self::send) calls every handler registered for the event's tag
///   right away, in registration order, on the calling thread.
/// - [`post`](Self::post) appends the event to a FIFO queue; the next
///   [`drain`](Self::drain) delivers it.
///
/// A drain delivers only the events that were queued when it started.
/// Events posted by handlers during that drain wait for the next one, so a
/// chain of reactions advances one step per drain instead of recursing.
///
/// The bus is `Send + Sync`. Handlers run without any internal lock held and
/// may subscribe, unsubscribe, send or post re-entrantly.
///
/// # Example
///
/// ```ignore
/// let bus = EventBus::new();
/// let sub = bus.subscribe(|e: &TextureHydrated| log::info!("{} ready", e.id));
/// bus.post(TextureHydrated { id: "albedo".into() });
/// assert_eq!(bus.drain(), 1);
/// bus.unsubscribe(&sub);
/// ```
pub struct EventBus {
    inner: Dispatcher,
}

impl EventBus {
    /// Creates a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&BusConfig::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(config: &BusConfig) -> Self {
        Self {
            inner: Dispatcher::new("event", config.queue_warning_threshold),
        }
    }

    /// Registers `handler` for events of type `E`.
    pub fn subscribe<E: Event>(
        &self,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.subscribe(E::TAG, move |payload: &(dyn Any + Send + Sync)| {
            match payload.downcast_ref::<E>() {
                Some(event) => handler(event),
                None => log::error!(
                    "event tag `{}` is shared by another type; `{}` handler skipped",
                    E::TAG,
                    type_name::<E>()
                ),
            }
        })
    }

    /// Removes a handler. Returns `false` if it was not registered.
    ///
    /// Safe to call from inside a handler. A dispatch already in progress
    /// still delivers to the handlers it started with.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.inner.unsubscribe(subscription)
    }

    /// Delivers `event` synchronously. Returns the number of handlers called.
    pub fn send<E: Event>(&self, event: E) -> usize {
        self.inner.dispatch(&Envelope::new(E::TAG, Arc::new(event)))
    }

    /// Queues `event` for the next [`drain`](Self::drain).
    pub fn post<E: Event>(&self, event: E) {
        self.inner.post(Envelope::new(E::TAG, Arc::new(event)));
    }

    /// Alias of [`post`](Self::post).
    pub fn enqueue<E: Event>(&self, event: E) {
        self.post(event);
    }

    /// Delivers the events queued at entry. Returns how many were delivered.
    ///
    /// Called from inside a handler of an ongoing drain it does nothing and
    /// returns 0.
    pub fn drain(&self) -> usize {
        self.inner.drain()
    }

    /// Number of posted events not yet delivered.
    pub fn pending_len(&self) -> usize {
        self.inner.pending_len()
    }

    /// Returns `true` if no posted event is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending_len() == 0
    }

    /// Number of handlers registered for `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.inner.subscriber_count(E::TAG)
    }

    /// Changes the queue length above which a warning is logged.
    pub fn set_queue_warning_threshold(&self, threshold: usize) {
        self.inner.set_warning_threshold(threshold);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

/// The bus drains once per scheduler tick.
impl SystemService for EventBus {
    fn name(&self) -> &'static str {
        "EventBus"
    }

    fn needs_tick(&self) -> bool {
        true
    }

    fn on_tick(&self) -> ServiceResult {
        self.drain();
        ServiceResult::Pending
    }

    fn on_term(&self) {
        let delivered = self.drain();
        if delivered > 0 {
            log::debug!("event bus delivered {delivered} event(s) during shutdown");
        }
        self.inner.clear_subscribers();
    }
}
