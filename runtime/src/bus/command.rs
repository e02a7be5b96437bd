use std::any::{Any, type_name};
use std::sync::Arc;

use super::MessageTag;
use super::dispatch::{Dispatcher, Envelope, Subscription};
use crate::config::BusConfig;
use crate::service::{ServiceResult, SystemService};

/// A directive asking some subsystem to do something.
///
/// Separate from [`Event`](crate::Event) so a command can never be
/// published on the event channel and the other way round.
pub trait Command: Send + Sync + 'static {
    /// Dispatch key of this command type. Must be unique among command types.
    const TAG: MessageTag;
}

/// Typed channel for [`Command`]s.
///
/// Same delivery rules as [`EventBus`](crate::EventBus): `send` is
/// synchronous, `post` is delivered by the next `drain`, and a drain only
/// delivers what was queued when it started.
pub struct CommandBus {
    inner: Dispatcher,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::with_config(&BusConfig::default())
    }

    pub fn with_config(config: &BusConfig) -> Self {
        Self {
            inner: Dispatcher::new("command", config.queue_warning_threshold),
        }
    }

    /// Registers `handler` for commands of type `C`.
    pub fn subscribe<C: Command>(
        &self,
        handler: impl Fn(&C) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.subscribe(C::TAG, move |payload: &(dyn Any + Send + Sync)| {
            match payload.downcast_ref::<C>() {
                Some(command) => handler(command),
                None => log::error!(
                    "command tag `{}` is shared by another type; `{}` handler skipped",
                    C::TAG,
                    type_name::<C>()
                ),
            }
        })
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.inner.unsubscribe(subscription)
    }

    /// Executes `command` synchronously. Returns the number of handlers called.
    pub fn send<C: Command>(&self, command: C) -> usize {
        self.inner.dispatch(&Envelope::new(C::TAG, Arc::new(command)))
    }

    pub fn post<C: Command>(&self, command: C) {
        self.inner.post(Envelope::new(C::TAG, Arc::new(command)));
    }

    pub fn enqueue<C: Command>(&self, command: C) {
        self.post(command);
    }

    pub fn drain(&self) -> usize {
        self.inner.drain()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending_len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_len() == 0
    }

    pub fn subscriber_count<C: Command>(&self) -> usize {
        self.inner.subscriber_count(C::TAG)
    }

    pub fn set_queue_warning_threshold(&self, threshold: usize) {
        self.inner.set_warning_threshold(threshold);
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBus")
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

impl SystemService for CommandBus {
    fn name(&self) -> &'static str {
        "CommandBus"
    }

    fn needs_tick(&self) -> bool {
        true
    }

    fn on_tick(&self) -> ServiceResult {
        self.drain();
        ServiceResult::Pending
    }

    fn on_term(&self) {
        self.drain();
        self.inner.clear_subscribers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, EventBus};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Build(u32);
    crate::impl_command!(Build => "test.build");

    struct Built(u32);
    crate::impl_event!(Built => "test.build");

    #[test]
    fn commands_and_events_use_separate_registries() {
        let commands = CommandBus::new();
        let events = EventBus::new();
        let calls = Arc::new(AtomicU32::new(0));

        let c = calls.clone();
        commands.subscribe(move |b: &Build| {
            c.fetch_add(b.0, Ordering::SeqCst);
        });

        // Same tag string on the other channel does not reach command handlers.
        assert_eq!(events.send(Built(100)), 0);
        assert_eq!(commands.send(Build(2)), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(<Built as Event>::TAG, <Build as Command>::TAG);
    }

    #[test]
    fn posted_command_runs_on_drain() {
        let commands = CommandBus::new();
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        commands.subscribe(move |b: &Build| {
            c.fetch_add(b.0, Ordering::SeqCst);
        });

        commands.post(Build(5));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(commands.drain(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
