use std::any::type_name;

use crate::error::ServiceError;

/// Outcome of a lifecycle hook that may take several ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceResult {
    /// Not finished; call again on the next `run_once`.
    Pending,
    /// Finished. From `on_init` this means "initialized"; from `on_tick` it
    /// means the service has no more work and asks to be shut down.
    Complete,
}

/// A long-lived subsystem driven by the
/// [`ServiceScheduler`](crate::ServiceScheduler).
///
/// Hooks take `&self`: the scheduler hands out shared `Arc` handles to the
/// same service, so mutable state lives behind the service's own locks.
/// Every hook runs on the thread calling `run_once`.
///
/// All hooks have defaults, so a service only overrides what it uses:
///
/// ```ignore
/// struct Clock { frames: AtomicU64 }
///
/// impl SystemService for Clock {
///     fn needs_tick(&self) -> bool { true }
///     fn on_tick(&self) -> ServiceResult {
///         self.frames.fetch_add(1, Ordering::Relaxed);
///         ServiceResult::Pending
///     }
/// }
/// ```
pub trait SystemService: Send + Sync + 'static {
    /// Name used in log messages.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Called at registration and, while it returns `Pending`, once per
    /// `run_once` until it returns `Complete`.
    ///
    /// An error moves the service to `Completed`: it is never ticked and
    /// `on_term` is not called.
    fn on_init(&self) -> Result<ServiceResult, ServiceError> {
        Ok(ServiceResult::Complete)
    }

    /// Called once per `run_once` while the service is running and
    /// [`needs_tick`](Self::needs_tick) returns `true`.
    fn on_tick(&self) -> ServiceResult {
        ServiceResult::Pending
    }

    /// Called exactly once when the service shuts down.
    fn on_term(&self) {}

    /// Whether `on_tick` should be called. Re-read on every `run_once`.
    fn needs_tick(&self) -> bool {
        false
    }

    /// A suspended service is skipped by `run_once`: no hook, no stage change.
    fn is_suspended(&self) -> bool {
        false
    }
}
