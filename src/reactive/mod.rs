//! Signals, effects and the scheduler that generated apps are written against.
//!
//! All state lives behind a [`Runtime`] handle that is passed to whatever
//! creates signals and effects. The runtime tracks the effect that is
//! currently running, so a signal read inside an effect subscribes it.
//!
//! ```
//! use lingo::reactive::Runtime;
//!
//! let runtime = Runtime::new();
//! let count = runtime.create_signal(0);
//! let seen = runtime.create_signal(Vec::new());
//! runtime.create_effect({
//!     let (count, seen) = (count.clone(), seen.clone());
//!     move || seen.set([seen.get_untracked(), vec![count.get()]].concat())
//! });
//! count.set(1);
//! count.set(2);
//! runtime.run_microtasks().unwrap();
//! assert_eq!(seen.get(), [0, 2]);
//! ```

mod effect;
mod mount;
mod scheduler;
mod signal;

pub use effect::{Effect, EffectOutput};
pub use mount::{render_app, Mount};
pub use scheduler::Scheduler;
pub use signal::Signal;

use crate::list::{Id, List};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + 'static>),
}

impl From<String> for EffectError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for EffectError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

type EffectFn = Box<dyn FnMut() -> Result<(), EffectError>>;
type Unsubscribe = Box<dyn FnOnce()>;

/// An effect's body and subscriptions. Owned by its [`Effect`] handles and by
/// the signals it is subscribed to; the runtime only keeps a weak reference,
/// so the node and everything its body captured is freed once both are gone.
struct EffectNode {
    id: EffectId,
    run: RefCell<EffectFn>,
    /// One per signal read during the most recent run.
    unsubscribers: RefCell<Vec<Unsubscribe>>,
    runtime: Weak<RefCell<RuntimeState>>,
}

impl EffectNode {
    /// Drop every subscription made by the last run.
    fn cleanup(&self) {
        let unsubscribers = std::mem::take(&mut *self.unsubscribers.borrow_mut());
        for unsubscribe in unsubscribers {
            unsubscribe();
        }
    }
}

impl Drop for EffectNode {
    fn drop(&mut self) {
        let Some(state) = self.runtime.upgrade() else {
            return;
        };
        let Ok(mut state) = state.try_borrow_mut() else {
            // the dead slot is removed the next time it is scheduled
            tracing::trace!(effect = ?self.id, "runtime busy, slot kept");
            return;
        };
        state.effects.remove(self.id);
    }
}

/// The runtime's reference to one effect.
pub struct EffectSlot(Weak<EffectNode>);

impl EffectSlot {
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self(Weak::new())
    }
}

pub type EffectId = Id<EffectSlot>;

#[derive(Default)]
struct RuntimeState {
    effects: List<EffectSlot>,
    current: Option<Rc<EffectNode>>,
    scheduler: Scheduler,
}

/// Shared handle to one running app's reactive state. Cloning is cheap and
/// every clone refers to the same state.
#[derive(Clone, Default)]
pub struct Runtime {
    state: Rc<RefCell<RuntimeState>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_signal<T: Clone + PartialEq + 'static>(&self, initial: T) -> Signal<T> {
        Signal::new(self, initial, None)
    }

    /// Like [`Runtime::create_signal`], tagged with the name it has in source.
    pub fn create_named_signal<T: Clone + PartialEq + 'static>(
        &self,
        initial: T,
        name: impl Into<String>,
    ) -> Signal<T> {
        Signal::new(self, initial, Some(name.into()))
    }

    /// Create an effect and run it once to find its dependencies. An error
    /// from this first run is logged and dropped; errors from later runs are
    /// returned by [`Runtime::flush`].
    ///
    /// The effect lives while the returned handle (or a clone) does, or while
    /// it is subscribed to a signal.
    pub fn create_effect<R: EffectOutput>(&self, mut f: impl FnMut() -> R + 'static) -> Effect {
        let id = self
            .state
            .borrow_mut()
            .effects
            .add(EffectSlot(Weak::new()));
        let node = Rc::new(EffectNode {
            id,
            run: RefCell::new(Box::new(move || f().into_result())),
            unsubscribers: RefCell::default(),
            runtime: self.downgrade(),
        });
        if let Some(slot) = self.state.borrow_mut().effects.get_mut(id) {
            slot.0 = Rc::downgrade(&node);
        }
        if let Err(error) = self.run_node(&node) {
            tracing::debug!(effect = ?id, %error, "ignoring error from first effect run");
        }
        Effect::new(node)
    }

    /// Run `f` without scheduling a flush, then flush once if this is the
    /// outermost batch.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> Result<R, EffectError> {
        let was_flushing = self.state.borrow_mut().scheduler.begin_batch();
        let value = f();
        self.state.borrow_mut().scheduler.end_batch(was_flushing);
        if !was_flushing {
            self.flush()?;
        }
        Ok(value)
    }

    /// Run pending effects until none are left. Effects scheduled while
    /// flushing run in a later pass of the same flush. Does nothing if a
    /// flush is already running.
    pub fn flush(&self) -> Result<(), EffectError> {
        if !self.state.borrow_mut().scheduler.begin_flush() {
            return Ok(());
        }
        let result = self.drain();
        self.state.borrow_mut().scheduler.end_flush();
        result
    }

    fn drain(&self) -> Result<(), EffectError> {
        let mut pass = 0;
        loop {
            let effects = self.state.borrow_mut().scheduler.take_pending();
            if effects.is_empty() {
                return Ok(());
            }
            pass += 1;
            tracing::trace!(pass, effects = effects.len(), "flush pass");
            for (index, &id) in effects.iter().enumerate() {
                if let Err(error) = self.run_effect(id) {
                    self.state
                        .borrow_mut()
                        .scheduler
                        .requeue(&effects[index + 1..]);
                    return Err(error);
                }
            }
        }
    }

    /// Host microtask checkpoint: perform the flush queued by the first
    /// signal write since the last one, if any.
    pub fn run_microtasks(&self) -> Result<(), EffectError> {
        let queued = self.state.borrow_mut().scheduler.take_queued();
        if queued {
            self.flush()
        } else {
            Ok(())
        }
    }

    pub fn pending_effects(&self) -> usize {
        self.state.borrow().scheduler.pending_len()
    }

    pub fn is_flush_queued(&self) -> bool {
        self.state.borrow().scheduler.is_flush_queued()
    }

    /// Effects that are still alive.
    pub fn effect_count(&self) -> usize {
        self.state.borrow().effects.len()
    }

    fn downgrade(&self) -> Weak<RefCell<RuntimeState>> {
        Rc::downgrade(&self.state)
    }

    fn upgrade(state: &Weak<RefCell<RuntimeState>>) -> Option<Self> {
        state.upgrade().map(|state| Self { state })
    }

    fn current_effect(&self) -> Option<Rc<EffectNode>> {
        self.state.borrow().current.clone()
    }

    fn schedule(&self, id: EffectId) {
        self.state.borrow_mut().scheduler.schedule(id);
    }

    fn run_effect(&self, id: EffectId) -> Result<(), EffectError> {
        let node = {
            let mut state = self.state.borrow_mut();
            let node = state.effects.get(id).and_then(|slot| slot.0.upgrade());
            if node.is_none() {
                state.effects.remove(id);
            }
            node
        };
        match node {
            Some(node) => self.run_node(&node),
            None => Ok(()),
        }
    }

    fn run_node(&self, node: &Rc<EffectNode>) -> Result<(), EffectError> {
        node.cleanup();
        let previous = self.state.borrow_mut().current.replace(node.clone());
        // re-entrant runs of the same effect are skipped
        let result = match node.run.try_borrow_mut() {
            Ok(mut f) => (*f)(),
            Err(_) => Ok(()),
        };
        let finished = std::mem::replace(&mut self.state.borrow_mut().current, previous);
        drop(finished);
        result
    }
}
