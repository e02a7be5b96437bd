use std::fmt;

/// Progress of a primitive or one of its sub-resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Readiness {
    /// Waiting in a build queue.
    #[default]
    Queued,
    /// Being built; sub-resources may still be outstanding.
    Loading,
    /// Fully built and usable.
    Ready,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
