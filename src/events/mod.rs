//! Event stream primitives.
//!
//! The game has no central update loop. Every temporal or input-driven
//! sequence is a [`Signal`]: a single-threaded producer/consumer channel
//! whose subscribers run in subscription order. Session teardown is a
//! [`StopSignal`] cancellation token; a gated signal completes the moment
//! the token fires and delivers nothing afterwards, no matter what timers
//! are still in flight.
//!
//! Everything here is `Rc`/`RefCell` based and deliberately not `Send`:
//! streams are multiplexed on the one browser execution context.

mod scheduler;

pub use scheduler::{Scheduler, TimerId};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`Signal::subscribe`], usable for unsubscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    const DEAD: SubscriptionId = SubscriptionId(0);
}

struct Entry<T> {
    id: u64,
    // Taken out while the callback runs so callbacks may subscribe,
    // unsubscribe or emit on the same signal.
    callback: Option<Box<dyn FnMut(&T)>>,
    dead: bool,
}

struct SignalInner<T> {
    entries: RefCell<Vec<Entry<T>>>,
    stopped: Cell<bool>,
    next_id: Cell<u64>,
}

/// A named, independently subscribable event sequence.
///
/// Cloning a `Signal` clones a handle to the same underlying channel.
pub struct Signal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                entries: RefCell::new(Vec::new()),
                stopped: Cell::new(false),
                next_id: Cell::new(1),
            }),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Registers `callback` for every future emission. Subscribing to a
    /// stopped sequence is a composition bug; it trips a debug assertion and
    /// is ignored in release builds.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        debug_assert!(
            !self.inner.stopped.get(),
            "subscribe on a stopped event sequence"
        );
        if self.inner.stopped.get() {
            return SubscriptionId::DEAD;
        }
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push(Entry {
            id,
            callback: Some(Box::new(callback)),
            dead: false,
        });
        SubscriptionId(id)
    }

    /// Registers a subscription that removes itself after the first value.
    pub fn subscribe_once(&self, callback: impl FnOnce(&T) + 'static) -> SubscriptionId {
        let own_id = Rc::new(Cell::new(SubscriptionId::DEAD));
        let signal = self.clone();
        let slot = Rc::clone(&own_id);
        let mut callback = Some(callback);
        let id = self.subscribe(move |value| {
            if let Some(callback) = callback.take() {
                signal.unsubscribe(slot.get());
                callback(value);
            }
        });
        own_id.set(id);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut entries = self.inner.entries.borrow_mut();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == id.0) {
            entry.dead = true;
            entry.callback = None;
        }
        entries.retain(|e| !e.dead);
    }

    /// Delivers `value` to every live subscriber in subscription order.
    ///
    /// Subscribers added during the emission do not observe the in-flight
    /// value. If the signal is stopped mid-emission, delivery ceases before
    /// the next subscriber.
    pub fn emit(&self, value: &T) {
        if self.inner.stopped.get() {
            return;
        }
        let ids: Vec<u64> = self
            .inner
            .entries
            .borrow()
            .iter()
            .filter(|e| !e.dead)
            .map(|e| e.id)
            .collect();
        for id in ids {
            if self.inner.stopped.get() {
                break;
            }
            let callback = {
                let mut entries = self.inner.entries.borrow_mut();
                entries
                    .iter_mut()
                    .find(|e| e.id == id && !e.dead)
                    .and_then(|e| e.callback.take())
            };
            let Some(mut callback) = callback else {
                continue;
            };
            callback(value);
            let mut entries = self.inner.entries.borrow_mut();
            if let Some(entry) = entries.iter_mut().find(|e| e.id == id && !e.dead) {
                entry.callback = Some(callback);
            }
        }
        self.inner.entries.borrow_mut().retain(|e| !e.dead);
    }

    /// Marks the sequence complete and drops every subscription. Further
    /// emissions are no-ops.
    pub fn stop(&self) {
        self.inner.stopped.set(true);
        self.inner.entries.borrow_mut().clear();
    }

    /// Ties the lifetime of this sequence to a stop token.
    pub fn gate(&self, stop: &StopSignal) {
        let signal = self.clone();
        stop.on_fire(move || signal.stop());
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct StopInner {
    fired: Cell<bool>,
    listeners: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Single-fire cancellation broadcast ending all session-scoped sequences.
pub struct StopSignal {
    inner: Rc<StopInner>,
}

impl Clone for StopSignal {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StopInner {
                fired: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn fired(&self) -> bool {
        self.inner.fired.get()
    }

    /// Registers a teardown action, run once when the token fires. If it
    /// already fired, the action runs immediately.
    pub fn on_fire(&self, listener: impl FnOnce() + 'static) {
        if self.inner.fired.get() {
            listener();
            return;
        }
        self.inner.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Fires the token. Idempotent; only the first call runs the listeners.
    pub fn fire(&self) {
        if self.inner.fired.replace(true) {
            return;
        }
        loop {
            let batch = std::mem::take(&mut *self.inner.listeners.borrow_mut());
            if batch.is_empty() {
                break;
            }
            for listener in batch {
                listener();
            }
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_signal() -> (Signal<u32>, Rc<RefCell<Vec<(u32, u32)>>>) {
        (Signal::new(), Rc::new(RefCell::new(Vec::new())))
    }

    #[test]
    fn delivery_follows_subscription_order() {
        let (signal, log) = counting_signal();
        for tag in 1..=3 {
            let log = Rc::clone(&log);
            signal.subscribe(move |v| log.borrow_mut().push((tag, *v)));
        }
        signal.emit(&10);
        assert_eq!(*log.borrow(), vec![(1, 10), (2, 10), (3, 10)]);
    }

    #[test]
    fn unsubscribe_during_emission_takes_effect_immediately() {
        let (signal, log) = counting_signal();
        let later_id: Rc<Cell<SubscriptionId>> = Rc::new(Cell::new(SubscriptionId::DEAD));

        let sig = signal.clone();
        let slot = Rc::clone(&later_id);
        let log1 = Rc::clone(&log);
        signal.subscribe(move |v| {
            log1.borrow_mut().push((1, *v));
            sig.unsubscribe(slot.get());
        });
        let log2 = Rc::clone(&log);
        later_id.set(signal.subscribe(move |v| log2.borrow_mut().push((2, *v))));

        signal.emit(&1);
        assert_eq!(*log.borrow(), vec![(1, 1)]);
    }

    #[test]
    fn subscribers_added_during_emission_miss_the_inflight_value() {
        let (signal, log) = counting_signal();
        let sig = signal.clone();
        let log1 = Rc::clone(&log);
        signal.subscribe(move |v| {
            log1.borrow_mut().push((1, *v));
            let log_inner = Rc::clone(&log1);
            sig.subscribe(move |v| log_inner.borrow_mut().push((99, *v)));
        });

        signal.emit(&1);
        assert_eq!(*log.borrow(), vec![(1, 1)]);
        signal.emit(&2);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn stop_during_emission_halts_delivery_before_next_subscriber() {
        let (signal, log) = counting_signal();
        let sig = signal.clone();
        let log1 = Rc::clone(&log);
        signal.subscribe(move |v| {
            log1.borrow_mut().push((1, *v));
            sig.stop();
        });
        let log2 = Rc::clone(&log);
        signal.subscribe(move |v| log2.borrow_mut().push((2, *v)));

        signal.emit(&1);
        signal.emit(&2);
        assert_eq!(*log.borrow(), vec![(1, 1)]);
    }

    #[test]
    fn subscribe_once_sees_exactly_one_value() {
        let (signal, log) = counting_signal();
        let log1 = Rc::clone(&log);
        signal.subscribe_once(move |v| log1.borrow_mut().push((1, *v)));
        signal.emit(&1);
        signal.emit(&2);
        assert_eq!(*log.borrow(), vec![(1, 1)]);
    }

    #[test]
    fn gated_signal_stops_when_token_fires() {
        let (signal, log) = counting_signal();
        let stop = StopSignal::new();
        signal.gate(&stop);
        let log1 = Rc::clone(&log);
        signal.subscribe(move |v| log1.borrow_mut().push((1, *v)));

        signal.emit(&1);
        stop.fire();
        signal.emit(&2);
        assert!(signal.is_stopped());
        assert_eq!(*log.borrow(), vec![(1, 1)]);
    }

    #[test]
    fn stop_token_fires_once_and_late_listeners_run_immediately() {
        let stop = StopSignal::new();
        let log: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));

        let log1 = Rc::clone(&log);
        stop.on_fire(move || log1.borrow_mut().push(1));
        stop.fire();
        stop.fire();
        assert_eq!(*log.borrow(), vec![1]);

        let log2 = Rc::clone(&log);
        stop.on_fire(move || log2.borrow_mut().push(2));
        assert_eq!(*log.borrow(), vec![1, 2]);
    }
}
