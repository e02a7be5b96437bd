//! # RedLilium Runtime
//!
//! Reactive substrate shared by every engine subsystem.
//!
//! ## Messaging
//!
//! - [`EventBus`] — Typed publish/subscribe channel for notifications ("this happened")
//! - [`CommandBus`] — Typed channel for directives ("do this")
//! - [`MessageTag`] — Explicit dispatch key assigned where a message type is declared
//! - [`Subscription`] — Handle returned by `subscribe`, used to unsubscribe
//!
//! Both buses deliver synchronously through `send` or deferred through
//! `post` + `drain`. A drain only delivers the messages that were queued
//! when it started, so handlers that post more messages never recurse
//! into the same drain.
//!
//! ## Services
//!
//! - [`SystemService`] — Long-lived subsystem with init/tick/terminate hooks
//! - [`ServiceScheduler`] — Owns services and drives one cooperative tick per frame
//! - [`ServiceState`] — Lifecycle stage of a registered service
//!
//! ## Context
//!
//! - [`Runtime`] — Bundles both buses and the scheduler; constructed once
//!   per process and handed to the subsystems that need it

mod bus;
mod config;
mod context;
mod error;
mod service;

pub use bus::{Command, CommandBus, Event, EventBus, MessageTag, Subscription};
pub use config::{BusConfig, RuntimeConfig, SchedulerConfig};
pub use context::Runtime;
pub use error::{ConfigError, ServiceError};
pub use service::{
    AllServicesInitialized, ServiceResult, ServiceScheduler, ServiceState, SystemService,
};
