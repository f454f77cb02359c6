use super::{Effect, EffectId, EffectNode, Runtime, RuntimeState};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct SignalInner<T> {
    value: RefCell<T>,
    /// Subscribed effects, kept alive by their subscription.
    subscribers: RefCell<IndexMap<EffectId, Rc<EffectNode>>>,
    name: Option<String>,
}

/// A reactive value. Reading it inside an effect subscribes that effect;
/// writing a different value schedules every subscriber.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
    // effect bodies may hold both the runtime and this signal
    runtime: Weak<RefCell<RuntimeState>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.inner.name)
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    pub(super) fn new(runtime: &Runtime, initial: T, name: Option<String>) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(initial),
                subscribers: RefCell::default(),
                name,
            }),
            runtime: runtime.downgrade(),
        }
    }

    pub fn get(&self) -> T {
        if let Some(runtime) = Runtime::upgrade(&self.runtime) {
            if let Some(effect) = runtime.current_effect() {
                self.track(&effect);
            }
        }
        self.get_untracked()
    }

    /// Read without subscribing the running effect.
    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn set(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Set to the result of `f` applied to the current value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let value = f(&self.inner.value.borrow());
        self.set(value);
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Subscribe `effect` by hand. Returns the matching unsubscribe.
    pub fn subscribe(&self, effect: &Effect) -> impl FnOnce() + 'static {
        self.inner
            .subscribers
            .borrow_mut()
            .insert(effect.id(), effect.node.clone());
        self.unsubscriber(effect.id())
    }

    fn track(&self, effect: &Rc<EffectNode>) {
        let added = match self.inner.subscribers.borrow_mut().entry(effect.id) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(effect.clone());
                true
            }
        };
        if added {
            let unsubscribe = self.unsubscriber(effect.id);
            effect.unsubscribers.borrow_mut().push(Box::new(unsubscribe));
        }
    }

    fn unsubscriber(&self, effect: EffectId) -> impl FnOnce() + 'static {
        let inner = Rc::downgrade(&self.inner);
        move || {
            if let Some(inner) = inner.upgrade() {
                // released after the borrow ends, since it may be the last reference
                let removed = inner.subscribers.borrow_mut().shift_remove(&effect);
                drop(removed);
            }
        }
    }

    fn notify(&self) {
        let Some(runtime) = Runtime::upgrade(&self.runtime) else {
            return;
        };
        // scheduling never touches subscribers, but a copy keeps the borrow short
        let subscribers: Vec<EffectId> = self.inner.subscribers.borrow().keys().copied().collect();
        for effect in subscribers {
            runtime.schedule(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_reads_do_not_subscribe() {
        let runtime = Runtime::new();
        let signal = runtime.create_named_signal(String::from("a"), "label");
        let tracked = runtime.create_signal(0);
        runtime.create_effect({
            let (signal, tracked) = (signal.clone(), tracked.clone());
            move || {
                signal.get_untracked();
                tracked.get();
            }
        });
        assert_eq!(signal.name(), Some("label"));
        assert_eq!(signal.subscriber_count(), 0);
        assert_eq!(tracked.subscriber_count(), 1);
        signal.set("b".into());
        assert_eq!(runtime.pending_effects(), 0);
    }

    #[test]
    fn reads_outside_effects_do_not_subscribe() {
        let runtime = Runtime::new();
        let signal = runtime.create_signal(vec![1, 2]);
        assert_eq!(signal.get(), [1, 2]);
        assert_eq!(signal.subscriber_count(), 0);
        signal.update(|items| [items.clone(), vec![3]].concat());
        assert_eq!(signal.get(), [1, 2, 3]);
        assert!(!runtime.is_flush_queued());
    }

    #[test]
    fn repeated_reads_subscribe_once() {
        let runtime = Runtime::new();
        let signal = runtime.create_signal(1);
        let effect = runtime.create_effect({
            let signal = signal.clone();
            move || {
                signal.get();
                signal.get();
            }
        });
        assert_eq!(signal.subscriber_count(), 1);
        effect.cleanup();
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn manual_subscription() {
        let runtime = Runtime::new();
        let signal = runtime.create_signal(0);
        let effect = runtime.create_effect(|| {});
        let unsubscribe = signal.subscribe(&effect);
        signal.set(1);
        assert_eq!(runtime.pending_effects(), 1);
        runtime.flush().unwrap();
        unsubscribe();
        signal.set(2);
        assert_eq!(runtime.pending_effects(), 0);
    }

    #[test]
    fn outlives_runtime() {
        let signal = Runtime::new().create_signal(1);
        signal.set(2);
        assert_eq!(signal.get(), 2);
    }
}
