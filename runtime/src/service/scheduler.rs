use std::any::{Any, TypeId, type_name};
use std::collections::HashSet;
use std::sync::Arc;

use super::{ServiceResult, ServiceState, SystemService};
use crate::bus::EventBus;
use crate::config::SchedulerConfig;

/// Posted on the event bus when every registered service has finished
/// initializing.
///
/// Posted again after a later registration finishes its own initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllServicesInitialized;
crate::impl_event!(AllServicesInitialized => "runtime.all_services_initialized");

struct ServiceRecord {
    type_id: TypeId,
    name: &'static str,
    state: ServiceState,
    /// `unregister_service` arrived before initialization finished.
    shutdown_requested: bool,
    service: Arc<dyn SystemService>,
    /// Same object as `service`, kept as `Any` for typed lookups.
    handle: Arc<dyn Any + Send + Sync>,
}

impl ServiceRecord {
    fn set_state(&mut self, next: ServiceState) {
        log::debug!("service `{}`: {} -> {}", self.name, self.state, next);
        self.state = next;
    }

    /// Runs `on_init` once and applies its outcome.
    fn initialize(&mut self) {
        if self.state == ServiceState::Created {
            self.set_state(ServiceState::Initializing);
        }
        match self.service.on_init() {
            Ok(ServiceResult::Complete) if self.shutdown_requested => {
                self.set_state(ServiceState::PendingShutdown);
            }
            Ok(ServiceResult::Complete) => self.set_state(ServiceState::Running),
            Ok(ServiceResult::Pending) => {}
            Err(err) => {
                log::error!("service `{}` failed to initialize: {err}", self.name);
                self.set_state(ServiceState::Completed);
            }
        }
    }

    /// Calls `on_term` now unless it already ran, then marks the record completed.
    fn terminate_now(&mut self) {
        match self.state {
            ServiceState::Created
            | ServiceState::Initializing
            | ServiceState::Running
            | ServiceState::PendingShutdown => {
                self.service.on_term();
                self.set_state(ServiceState::Completed);
            }
            ServiceState::ShuttingDown => self.set_state(ServiceState::Completed),
            ServiceState::Completed | ServiceState::Removed => {}
        }
    }
}

/// Owns the registered [`SystemService`]s and advances their lifecycle.
///
/// Services are kept in registration order, one per concrete type, and
/// every call to [`run_once`](Self::run_once) moves each service by at most
/// one lifecycle stage:
///
/// | Stage             | `run_once` does                                    |
/// |-------------------|----------------------------------------------------|
/// | `Initializing`    | calls `on_init` again                              |
/// | `Running`         | calls `on_tick` if `needs_tick()`                  |
/// | `PendingShutdown` | calls `on_term`, moves to `ShuttingDown`           |
/// | `ShuttingDown`    | moves to `Completed`                               |
/// | `Completed`       | erases the service (`Removed`)                     |
///
/// Shutdown is therefore never synchronous: a service stays reachable for
/// three more ticks after [`unregister_service`](Self::unregister_service),
/// so messages already queued for it in the current frame still resolve.
///
/// # Example
///
/// ```ignore
/// let events = Arc::new(EventBus::new());
/// let mut scheduler = ServiceScheduler::new(events, SchedulerConfig::default());
/// scheduler.register_service(Arc::new(Clock::default()));
/// loop {
///     scheduler.run_once();
/// }
/// ```
pub struct ServiceScheduler {
    events: Arc<EventBus>,
    config: SchedulerConfig,
    records: Vec<ServiceRecord>,
    /// Types that were registered and have since been erased.
    retired: HashSet<TypeId>,
    announced: bool,
}

impl ServiceScheduler {
    /// Creates an empty scheduler publishing lifecycle events on `events`.
    pub fn new(events: Arc<EventBus>, config: SchedulerConfig) -> Self {
        Self {
            events,
            config,
            records: Vec::new(),
            retired: HashSet::new(),
            announced: false,
        }
    }

    /// Adds `service`, moves it to `Initializing` and calls `on_init` once.
    ///
    /// Registering a second service of the same type is a programming
    /// error: it panics in debug builds and is logged and ignored in
    /// release builds.
    pub fn register_service<S: SystemService>(&mut self, service: Arc<S>) {
        let type_id = TypeId::of::<S>();
        let duplicate = self.position(type_id).is_some();
        debug_assert!(!duplicate, "service `{}` registered twice", type_name::<S>());
        if duplicate {
            log::error!(
                "service `{}` is already registered; registration ignored",
                type_name::<S>()
            );
            return;
        }

        self.retired.remove(&type_id);
        let handle: Arc<dyn Any + Send + Sync> = service.clone();
        let mut record = ServiceRecord {
            type_id,
            name: service.name(),
            state: ServiceState::Created,
            shutdown_requested: false,
            service,
            handle,
        };
        log::debug!("service `{}` registered", record.name);

        self.announced = false;
        record.initialize();
        self.records.push(record);
    }

    /// Requests shutdown of the service of type `S`.
    ///
    /// A running service moves to `PendingShutdown`. A service still
    /// initializing is moved there as soon as initialization completes.
    /// Returns `false` if no such service is registered.
    pub fn unregister_service<S: SystemService>(&mut self) -> bool {
        let Some(index) = self.position(TypeId::of::<S>()) else {
            log::warn!(
                "unregister_service: `{}` is not registered",
                type_name::<S>()
            );
            return false;
        };

        let record = &mut self.records[index];
        match record.state {
            ServiceState::Created | ServiceState::Initializing => {
                record.shutdown_requested = true;
            }
            ServiceState::Running => record.set_state(ServiceState::PendingShutdown),
            _ => {}
        }
        true
    }

    /// Shuts the service of type `S` down immediately.
    ///
    /// `on_term` runs now (unless it already ran) and the service is marked
    /// `Completed`; the next [`run_once`](Self::run_once) erases it.
    pub fn shutdown_service<S: SystemService>(&mut self) -> bool {
        match self.position(TypeId::of::<S>()) {
            Some(index) => {
                self.records[index].terminate_now();
                true
            }
            None => false,
        }
    }

    /// Terminates every service immediately, in reverse registration order,
    /// and erases them all.
    pub fn shutdown_all(&mut self) {
        for record in self.records.iter_mut().rev() {
            record.terminate_now();
        }
        for record in self.records.drain(..) {
            log::debug!(
                "service `{}`: {} -> {}",
                record.name,
                record.state,
                ServiceState::Removed
            );
            self.retired.insert(record.type_id);
        }
    }

    /// Advances every service by one lifecycle stage, in registration order.
    ///
    /// Suspended services are skipped.
    pub fn run_once(&mut self) {
        let mut index = 0;
        while index < self.records.len() {
            let record = &mut self.records[index];
            if record.service.is_suspended() {
                index += 1;
                continue;
            }

            match record.state {
                ServiceState::Created | ServiceState::Initializing => record.initialize(),
                ServiceState::Running => {
                    if record.service.needs_tick()
                        && record.service.on_tick() == ServiceResult::Complete
                    {
                        record.set_state(ServiceState::PendingShutdown);
                    }
                }
                ServiceState::PendingShutdown => {
                    record.service.on_term();
                    record.set_state(ServiceState::ShuttingDown);
                }
                ServiceState::ShuttingDown => record.set_state(ServiceState::Completed),
                ServiceState::Completed | ServiceState::Removed => {
                    let record = self.records.remove(index);
                    log::debug!(
                        "service `{}`: {} -> {}",
                        record.name,
                        record.state,
                        ServiceState::Removed
                    );
                    self.retired.insert(record.type_id);
                    continue;
                }
            }
            index += 1;
        }

        self.announce_initialized();
    }

    /// Returns the service of type `S`, or `None` if it is absent or erased.
    pub fn service_as<S: SystemService>(&self) -> Option<Arc<S>> {
        let index = self.position(TypeId::of::<S>())?;
        self.records[index].handle.clone().downcast::<S>().ok()
    }

    /// Returns the lifecycle stage of the service of type `S`.
    ///
    /// `Some(Removed)` for a type that was registered and has been erased,
    /// `None` for a type that was never registered.
    pub fn service_state<S: SystemService>(&self) -> Option<ServiceState> {
        let type_id = TypeId::of::<S>();
        match self.position(type_id) {
            Some(index) => Some(self.records[index].state),
            None if self.retired.contains(&type_id) => Some(ServiceState::Removed),
            None => None,
        }
    }

    /// Returns `true` if a service of type `S` is registered and not erased.
    pub fn contains<S: SystemService>(&self) -> bool {
        self.position(TypeId::of::<S>()).is_some()
    }

    /// Names of the registered services, in registration order.
    pub fn service_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.records.iter().map(|r| r.name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, type_id: TypeId) -> Option<usize> {
        self.records.iter().position(|r| r.type_id == type_id)
    }

    fn announce_initialized(&mut self) {
        if self.announced || self.records.is_empty() {
            return;
        }
        if self.records.iter().all(|r| r.state.is_initialized()) {
            self.announced = true;
            if self.config.announce_initialized {
                log::debug!("all {} service(s) initialized", self.records.len());
                self.events.post(AllServicesInitialized);
            }
        }
    }
}

impl Drop for ServiceScheduler {
    fn drop(&mut self) {
        if !self.records.is_empty() {
            self.shutdown_all();
        }
    }
}
