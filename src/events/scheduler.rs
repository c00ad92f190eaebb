//! Virtual-time timer scheduler.
//!
//! All delayed and periodic effects in the game run through this scheduler
//! instead of `setTimeout`/`setInterval`. Time is advanced explicitly from
//! the animation-frame callback, which keeps every timer deterministic under
//! test and multiplexed on the single browser execution context.

use std::cell::{Cell, RefCell};

/// Handle returned by timer registration, usable for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerId(u64);

#[derive(Clone, Copy)]
enum Repeat {
    Once,
    Every(f64),
}

struct Timer {
    id: u64,
    due_ms: f64,
    repeat: Repeat,
    // Taken out while the callback runs so callbacks may re-enter the
    // scheduler to register or cancel timers.
    callback: Option<Box<dyn FnMut()>>,
    dead: bool,
}

pub struct Scheduler {
    now_ms: Cell<f64>,
    timers: RefCell<Vec<Timer>>,
    next_id: Cell<u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0.0),
            timers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Registers a one-shot timer firing `delay_ms` from the current
    /// virtual time.
    pub fn set_timeout(&self, delay_ms: f64, callback: impl FnOnce() + 'static) -> TimerId {
        let mut callback = Some(callback);
        self.register(delay_ms, Repeat::Once, move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        })
    }

    /// Registers a periodic timer firing first after `first_ms`, then every
    /// `period_ms` at a fixed rate.
    pub fn set_interval(
        &self,
        first_ms: f64,
        period_ms: f64,
        callback: impl FnMut() + 'static,
    ) -> TimerId {
        self.register(first_ms, Repeat::Every(period_ms), callback)
    }

    pub fn cancel(&self, id: TimerId) {
        let mut timers = self.timers.borrow_mut();
        if let Some(timer) = timers.iter_mut().find(|t| t.id == id.0) {
            timer.dead = true;
            timer.callback = None;
        }
        timers.retain(|t| !t.dead);
    }

    /// Moves virtual time forward by `elapsed_ms`, firing every timer due in
    /// the window in due-time order (ties resolve in registration order).
    /// A step spanning several periods fires a periodic timer once per
    /// elapsed period. Timers registered by a callback take part in the same
    /// step when they fall due inside it.
    pub fn advance(&self, elapsed_ms: f64) {
        let target = self.now_ms.get() + elapsed_ms;
        loop {
            let next = {
                let timers = self.timers.borrow();
                timers
                    .iter()
                    .filter(|t| !t.dead && t.callback.is_some() && t.due_ms <= target)
                    .min_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
                    .map(|t| t.id)
            };
            let Some(id) = next else { break };

            let (mut callback, due) = {
                let mut timers = self.timers.borrow_mut();
                match timers.iter_mut().find(|t| t.id == id) {
                    Some(timer) => (timer.callback.take(), timer.due_ms),
                    None => break,
                }
            };
            if due > self.now_ms.get() {
                self.now_ms.set(due);
            }
            if let Some(callback) = callback.as_mut() {
                callback();
            }

            let mut timers = self.timers.borrow_mut();
            if let Some(timer) = timers.iter_mut().find(|t| t.id == id) {
                if !timer.dead {
                    match timer.repeat {
                        Repeat::Every(period) => {
                            timer.due_ms = due + period;
                            timer.callback = callback;
                        }
                        Repeat::Once => timer.dead = true,
                    }
                }
            }
            timers.retain(|t| !t.dead);
        }
        self.now_ms.set(target);
    }

    fn register(&self, delay_ms: f64, repeat: Repeat, callback: impl FnMut() + 'static) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.timers.borrow_mut().push(Timer {
            id,
            due_ms: self.now_ms.get() + delay_ms,
            repeat,
            callback: Some(Box::new(callback)),
            dead: false,
        });
        TimerId(id)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl Fn(u32) -> Box<dyn FnMut()>) {
        let log: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        let make = move |tag: u32| -> Box<dyn FnMut()> {
            let log = Rc::clone(&log2);
            Box::new(move || log.borrow_mut().push(tag))
        };
        (log, make)
    }

    #[test]
    fn timeout_fires_once_at_due_time() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();
        let mut cb = make(1);
        scheduler.set_timeout(100.0, move || cb());

        scheduler.advance(99.0);
        assert!(log.borrow().is_empty());
        scheduler.advance(1.0);
        assert_eq!(*log.borrow(), vec![1]);
        scheduler.advance(500.0);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn interval_fires_once_per_elapsed_period() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();
        let mut cb = make(7);
        scheduler.set_interval(1500.0, 2500.0, move || cb());

        scheduler.advance(1500.0);
        assert_eq!(log.borrow().len(), 1);
        // One big step spanning three more periods.
        scheduler.advance(7500.0);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn due_order_wins_over_registration_order() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();
        let mut late = make(2);
        let mut early = make(1);
        scheduler.set_timeout(200.0, move || late());
        scheduler.set_timeout(100.0, move || early());

        scheduler.advance(300.0);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();
        let mut cb = make(1);
        let id = scheduler.set_interval(100.0, 100.0, move || cb());
        scheduler.advance(100.0);
        scheduler.cancel(id);
        scheduler.advance(1000.0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn callback_may_register_a_timer_due_in_same_step() {
        let scheduler = Scheduler::new();
        let log: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));

        let fired = Rc::clone(&log);
        // The callback chains a follow-up timer through a second handle.
        let scheduler = Rc::new(scheduler);
        let inner_sched = Rc::clone(&scheduler);
        scheduler.set_timeout(50.0, move || {
            fired.borrow_mut().push(1);
            let fired2 = Rc::clone(&fired);
            inner_sched.set_timeout(25.0, move || fired2.borrow_mut().push(2));
        });

        scheduler.advance(100.0);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn callback_may_cancel_another_timer() {
        let scheduler = Rc::new(Scheduler::new());
        let (log, make) = recorder();
        let mut victim = make(9);
        let victim_id = scheduler.set_timeout(200.0, move || victim());

        let sched = Rc::clone(&scheduler);
        scheduler.set_timeout(100.0, move || sched.cancel(victim_id));

        scheduler.advance(300.0);
        assert!(log.borrow().is_empty());
    }
}
