use std::collections::VecDeque;

use crate::id::PrimitiveId;

/// Something a [`BuildQueue`] can hold.
pub(crate) trait QueuedPlan {
    fn id(&self) -> &PrimitiveId;
}

/// FIFO of plans for one resource class plus the single plan in progress.
pub(crate) struct BuildQueue<P> {
    pending: VecDeque<P>,
    current: Option<P>,
}

impl<P: QueuedPlan> BuildQueue<P> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
        }
    }

    pub fn push(&mut self, plan: P) {
        self.pending.push_back(plan);
    }

    /// Makes the head plan current if nothing is in progress.
    ///
    /// Returns the newly promoted plan.
    pub fn promote(&mut self) -> Option<&mut P> {
        if self.current.is_some() {
            return None;
        }
        self.current = Some(self.pending.pop_front()?);
        self.current.as_mut()
    }

    pub fn current(&self) -> Option<&P> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut P> {
        self.current.as_mut()
    }

    pub fn take_current(&mut self) -> Option<P> {
        self.current.take()
    }

    /// Finds a queued or in-progress plan by id.
    pub fn find_mut(&mut self, id: &PrimitiveId) -> Option<&mut P> {
        self.current
            .iter_mut()
            .chain(self.pending.iter_mut())
            .find(|p| p.id() == id)
    }

    /// Number of plans waiting behind the current one.
    pub fn queued_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Empties the queue, returning the current plan first, then the
    /// pending ones in order.
    pub fn take_all(&mut self) -> Vec<P> {
        self.current.take().into_iter().chain(self.pending.drain(..)).collect()
    }
}
