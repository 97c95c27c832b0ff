#![forbid(unsafe_code)]

//! Redraw scheduling.
//!
//! The root of the layer tree calls [`UpdateScheduler::schedule_update`] every
//! time a region is invalidated. The scheduler's only contract is to arrange a
//! future call to the renderer's `update()`; any number of requests made before
//! that call coalesce into one.
//!
//! The pipeline is single-threaded, so schedulers are shared as `Rc` handles.

use std::cell::Cell;
use std::rc::Rc;

/// Narrow capability for requesting a redraw on the next tick.
pub trait UpdateScheduler {
    /// Request that the renderer runs before the next idle point.
    fn schedule_update(&self);
}

/// A scheduler that never schedules anything.
///
/// Useful for headless composition where the caller drives `update()` itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl UpdateScheduler for NoopScheduler {
    fn schedule_update(&self) {}
}

/// Coalescing flag scheduler.
///
/// Requests set a shared flag; the event loop calls [`TickFlag::take`] once per
/// tick and runs the renderer when it returns `true`. Clones share the flag.
#[derive(Debug, Default, Clone)]
pub struct TickFlag {
    pending: Rc<Cell<bool>>,
    requests: Rc<Cell<u64>>,
}

impl TickFlag {
    /// Create a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an update has been requested since the last [`take`](Self::take).
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Clear the flag, returning whether it was set.
    #[inline]
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    /// Total number of requests received, including coalesced ones.
    #[inline]
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }
}

impl UpdateScheduler for TickFlag {
    fn schedule_update(&self) {
        self.requests.set(self.requests.get() + 1);
        if !self.pending.replace(true) {
            crate::trace!("redraw scheduled");
        }
    }
}

impl<S: UpdateScheduler + ?Sized> UpdateScheduler for Rc<S> {
    fn schedule_update(&self) {
        (**self).schedule_update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_flag_coalesces_requests() {
        let flag = TickFlag::new();
        assert!(!flag.is_pending());

        flag.schedule_update();
        flag.schedule_update();
        flag.schedule_update();

        assert!(flag.is_pending());
        assert_eq!(flag.request_count(), 3);
        assert!(flag.take());
        assert!(!flag.take(), "second take in the same tick sees nothing");
    }

    #[test]
    fn tick_flag_clones_share_state() {
        let flag = TickFlag::new();
        let handle: Rc<dyn UpdateScheduler> = Rc::new(flag.clone());
        handle.schedule_update();
        assert!(flag.take());
    }

    #[test]
    fn noop_scheduler_is_inert() {
        NoopScheduler.schedule_update();
    }
}
