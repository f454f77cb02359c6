use super::EffectId;
use indexmap::IndexSet;

/// Bookkeeping for pending effect re-runs. The [`Runtime`](super::Runtime)
/// owns one and does the actual running.
///
/// The first schedule while idle queues a flush, which the host performs at
/// its next microtask checkpoint via
/// [`Runtime::run_microtasks`](super::Runtime::run_microtasks).
#[derive(Debug, Default)]
pub struct Scheduler {
    /// In the order effects were first scheduled in this pass.
    pending: IndexSet<EffectId>,
    flushing: bool,
    flush_queued: bool,
}

impl Scheduler {
    pub fn schedule(&mut self, effect: EffectId) {
        self.pending.insert(effect);
        if !self.flushing && !self.flush_queued {
            self.flush_queued = true;
            tracing::trace!("flush queued");
        }
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    pub fn is_flush_queued(&self) -> bool {
        self.flush_queued
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns false if a flush is already running.
    pub(super) fn begin_flush(&mut self) -> bool {
        !std::mem::replace(&mut self.flushing, true)
    }

    pub(super) fn end_flush(&mut self) {
        self.flushing = false;
    }

    /// Suppress queueing until [`Scheduler::end_batch`]; returns whether a
    /// flush or batch was already in progress.
    pub(super) fn begin_batch(&mut self) -> bool {
        std::mem::replace(&mut self.flushing, true)
    }

    pub(super) fn end_batch(&mut self, was_flushing: bool) {
        self.flushing = was_flushing;
    }

    /// Take the whole pending set for one pass.
    pub(super) fn take_pending(&mut self) -> Vec<EffectId> {
        self.pending.drain(..).collect()
    }

    /// Put back the effects a failed pass did not get to.
    pub(super) fn requeue(&mut self, effects: &[EffectId]) {
        self.pending.extend(effects.iter().copied());
        if !self.pending.is_empty() {
            self.flush_queued = true;
        }
    }

    /// Consume the queued flush, as the host microtask would.
    pub(super) fn take_queued(&mut self) -> bool {
        std::mem::take(&mut self.flush_queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::List;
    use crate::reactive::EffectSlot;

    fn ids(count: usize) -> Vec<EffectId> {
        let mut list = List::default();
        (0..count).map(|_| list.add(EffectSlot::detached())).collect()
    }

    #[test]
    fn first_schedule_queues_one_flush() {
        let ids = ids(2);
        let mut scheduler = Scheduler::default();
        scheduler.schedule(ids[0]);
        assert!(scheduler.is_flush_queued());
        scheduler.schedule(ids[1]);
        scheduler.schedule(ids[0]);
        assert_eq!(scheduler.pending_len(), 2);
        assert!(scheduler.take_queued());
        assert!(!scheduler.take_queued());
    }

    #[test]
    fn no_queue_while_flushing() {
        let ids = ids(1);
        let mut scheduler = Scheduler::default();
        assert!(scheduler.begin_flush());
        assert!(!scheduler.begin_flush());
        scheduler.schedule(ids[0]);
        assert!(!scheduler.is_flush_queued());
        assert_eq!(scheduler.take_pending(), ids);
        scheduler.end_flush();
        assert!(!scheduler.is_flushing());
    }

    #[test]
    fn nested_batches_restore_state() {
        let mut scheduler = Scheduler::default();
        let outer = scheduler.begin_batch();
        let inner = scheduler.begin_batch();
        assert!(!outer);
        assert!(inner);
        scheduler.end_batch(inner);
        assert!(scheduler.is_flushing());
        scheduler.end_batch(outer);
        assert!(!scheduler.is_flushing());
    }
}
