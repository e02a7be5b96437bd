use std::sync::Arc;

use crate::bus::{CommandBus, EventBus};
use crate::config::RuntimeConfig;
use crate::service::{ServiceScheduler, ServiceState, SystemService};

/// The reactive runtime of one engine instance.
///
/// Owns the event bus, the command bus and the service scheduler. Both
/// buses are registered as the first two services, so every
/// [`run_once`](Self::run_once) drains them in that order before ticking
/// the services registered after them.
///
/// Subsystems keep `Arc` clones of the buses; the runtime itself is passed
/// around by reference instead of living in a global.
pub struct Runtime {
    events: Arc<EventBus>,
    commands: Arc<CommandBus>,
    scheduler: ServiceScheduler,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let events = Arc::new(EventBus::with_config(&config.bus));
        let commands = Arc::new(CommandBus::with_config(&config.bus));
        let mut scheduler = ServiceScheduler::new(events.clone(), config.scheduler);
        scheduler.register_service(events.clone());
        scheduler.register_service(commands.clone());
        log::debug!("runtime created");

        Self {
            events,
            commands,
            scheduler,
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn commands(&self) -> &Arc<CommandBus> {
        &self.commands
    }

    pub fn scheduler(&self) -> &ServiceScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ServiceScheduler {
        &mut self.scheduler
    }

    /// See [`ServiceScheduler::register_service`].
    pub fn register_service<S: SystemService>(&mut self, service: Arc<S>) {
        self.scheduler.register_service(service);
    }

    /// See [`ServiceScheduler::unregister_service`].
    pub fn unregister_service<S: SystemService>(&mut self) -> bool {
        self.scheduler.unregister_service::<S>()
    }

    /// One frame: drains both buses, then ticks the other services.
    pub fn run_once(&mut self) {
        self.scheduler.run_once();
    }

    pub fn service_as<S: SystemService>(&self) -> Option<Arc<S>> {
        self.scheduler.service_as::<S>()
    }

    pub fn service_state<S: SystemService>(&self) -> Option<ServiceState> {
        self.scheduler.service_state::<S>()
    }

    /// Terminates every service, buses last, so their final drain still
    /// delivers what the other services posted while shutting down.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown_all();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
