use std::fmt;

/// Lifecycle stage of a registered [`SystemService`](crate::SystemService).
///
/// Stages only move forward:
///
/// ```text
/// Created → Initializing → Running → PendingShutdown → ShuttingDown → Completed → Removed
/// ```
///
/// A failed initialization jumps straight to `Completed`. The ordering of
/// the variants follows the lifecycle, so `state >= Running` means
/// "initialization has finished".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceState {
    /// Registered, `on_init` not called yet.
    Created,
    /// `on_init` has been called and reported `Pending` (or is running).
    Initializing,
    /// Initialized; ticked every `run_once` while it asks for ticks.
    Running,
    /// Shutdown requested; `on_term` runs on the next `run_once`.
    PendingShutdown,
    /// `on_term` has run.
    ShuttingDown,
    /// Finished. Erased from the scheduler on the next `run_once`.
    Completed,
    /// Erased. No handle can be obtained any more.
    Removed,
}

impl ServiceState {
    /// Returns `true` once initialization is over, successfully or not.
    pub fn is_initialized(self) -> bool {
        self > ServiceState::Initializing
    }

    /// Returns `true` if the service is in its regular ticking stage.
    pub fn is_running(self) -> bool {
        self == ServiceState::Running
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_lifecycle() {
        assert!(ServiceState::Created < ServiceState::Initializing);
        assert!(ServiceState::Running < ServiceState::PendingShutdown);
        assert!(ServiceState::Completed < ServiceState::Removed);
    }

    #[test]
    fn initialized_after_initializing() {
        assert!(!ServiceState::Created.is_initialized());
        assert!(!ServiceState::Initializing.is_initialized());
        assert!(ServiceState::Running.is_initialized());
        assert!(ServiceState::Completed.is_initialized());
    }
}
