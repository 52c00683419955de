use std::collections::VecDeque;

/// Per-view-type FIFO queues of detached view handles awaiting reuse.
///
/// There is no eviction: queues only shrink through [`RecyclePool::acquire`] and are dropped
/// wholesale by [`RecyclePool::initialize`]. In practice they never hold more than roughly
/// one screen worth of handles.
#[derive(Clone, Debug)]
pub struct RecyclePool<H> {
    queues: Vec<VecDeque<H>>,
}

impl<H> Default for RecyclePool<H> {
    fn default() -> Self {
        Self { queues: Vec::new() }
    }
}

impl<H> RecyclePool<H> {
    pub fn new(view_type_count: usize) -> Self {
        let mut pool = Self::default();
        pool.initialize(view_type_count);
        pool
    }

    /// Drops every pooled handle and creates `view_type_count` empty queues.
    pub fn initialize(&mut self, view_type_count: usize) {
        vdebug!(view_type_count, "RecyclePool::initialize");
        self.queues.clear();
        self.queues.resize_with(view_type_count, VecDeque::new);
    }

    pub fn view_type_count(&self) -> usize {
        self.queues.len()
    }

    pub fn is_valid_type(&self, view_type: usize) -> bool {
        view_type < self.queues.len()
    }

    /// Pops the oldest handle recycled for `view_type`.
    pub fn acquire(&mut self, view_type: usize) -> Option<H> {
        self.queues.get_mut(view_type)?.pop_front()
    }

    /// Queues `handle` for reuse.
    ///
    /// Returns `false` (and drops the handle) when `view_type` is outside the known range, e.g.
    /// a stale type after the provider changed its type count.
    pub fn release(&mut self, view_type: usize, handle: H) -> bool {
        match self.queues.get_mut(view_type) {
            Some(queue) => {
                queue.push_back(handle);
                true
            }
            None => {
                vwarn!(
                    view_type,
                    view_type_count = self.queues.len(),
                    "RecyclePool::release: unknown view type"
                );
                false
            }
        }
    }

    /// Number of pooled handles for `view_type`.
    pub fn len_of(&self, view_type: usize) -> usize {
        self.queues.get(view_type).map_or(0, VecDeque::len)
    }

    /// Total number of pooled handles.
    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }
}
