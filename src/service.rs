//! Event/stream service.
//!
//! Derives every temporal and input-driven sequence the controller consumes
//! and terminates each one at session end. One raw key source feeds all
//! key-derived streams, so a single physical press is observed by the flap,
//! restart and easter-egg pipelines alike without the browser listener being
//! attached more than once.
//!
//! A service instance belongs to exactly one session. Stopping it is final;
//! a restarted game constructs a fresh instance.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{
    EASTER_EGG_BUFFER_LEN, EASTER_EGG_BUFFER_MS, FRAME_UNIT_MS, KEY_SPACE, KEY_UP,
    PIPE_FIRST_WAIT_MS, PIPE_INTERVAL_MS, SCORE_FIRST_WAIT_MS, SKYLINE_INTERVAL_MS,
};
use crate::events::{Scheduler, Signal, StopSignal, TimerId};

/// A logical key press as delivered by the host page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: String,
}

pub struct GameService {
    scheduler: Rc<Scheduler>,
    stop: StopSignal,
    /// Raw keydown source, shared by every key-derived stream. Not gated:
    /// the restart pipeline must keep observing presses after game over.
    pub pressed_key: Signal<KeyEvent>,
    /// Per-frame delta in frame units. Gated.
    pub on_frame_update: Signal<f64>,
    /// Key presses filtered to the flap bindings. Gated.
    pub on_flap: Signal<KeyEvent>,
    /// Fixed one-second cadence for skyline maintenance. Gated.
    pub skyline_update: Signal<u64>,
    /// Obstacle spawn cadence: one-shot initial delay, then fixed interval.
    /// Gated.
    pub create_obstacle: Signal<u64>,
    /// Running score count, first emission after the long initial delay.
    /// Gated.
    pub score: Signal<u32>,
    /// Key presses filtered to SPACE. Deliberately not gated.
    pub restart: Signal<KeyEvent>,
    /// Buffered key windows holding more than the threshold count. Gated.
    pub easter_egg: Signal<Vec<KeyEvent>>,
}

impl GameService {
    pub fn new() -> Rc<Self> {
        let scheduler = Rc::new(Scheduler::new());
        let stop = StopSignal::new();

        let pressed_key: Signal<KeyEvent> = Signal::new();
        let on_frame_update: Signal<f64> = Signal::new();
        let on_flap: Signal<KeyEvent> = Signal::new();
        let skyline_update: Signal<u64> = Signal::new();
        let create_obstacle: Signal<u64> = Signal::new();
        let score: Signal<u32> = Signal::new();
        let restart: Signal<KeyEvent> = Signal::new();
        let easter_egg: Signal<Vec<KeyEvent>> = Signal::new();

        on_frame_update.gate(&stop);
        on_flap.gate(&stop);
        skyline_update.gate(&stop);
        create_obstacle.gate(&stop);
        score.gate(&stop);
        easter_egg.gate(&stop);

        let flap_sub = {
            let on_flap = on_flap.clone();
            pressed_key.subscribe(move |key| {
                if key.code == KEY_SPACE || key.code == KEY_UP {
                    on_flap.emit(key);
                }
            })
        };

        {
            let restart = restart.clone();
            pressed_key.subscribe(move |key| {
                if key.code == KEY_SPACE {
                    restart.emit(key);
                }
            });
        }

        // Easter egg: collect raw presses into fixed-size time windows and
        // forward only the windows that cross the threshold.
        let window: Rc<RefCell<Vec<KeyEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let buffer_sub = {
            let window = Rc::clone(&window);
            pressed_key.subscribe(move |key| window.borrow_mut().push(key.clone()))
        };
        let buffer_timer = {
            let easter_egg = easter_egg.clone();
            scheduler.set_interval(EASTER_EGG_BUFFER_MS, EASTER_EGG_BUFFER_MS, move || {
                let batch = std::mem::take(&mut *window.borrow_mut());
                if batch.len() > EASTER_EGG_BUFFER_LEN {
                    easter_egg.emit(&batch);
                }
            })
        };

        let skyline_timer = {
            let skyline_update = skyline_update.clone();
            let mut ticks: u64 = 0;
            scheduler.set_interval(SKYLINE_INTERVAL_MS, SKYLINE_INTERVAL_MS, move || {
                skyline_update.emit(&ticks);
                ticks += 1;
            })
        };

        let obstacle_timer = {
            let create_obstacle = create_obstacle.clone();
            let mut ticks: u64 = 0;
            scheduler.set_interval(PIPE_FIRST_WAIT_MS, PIPE_INTERVAL_MS, move || {
                create_obstacle.emit(&ticks);
                ticks += 1;
            })
        };

        let score_timer = {
            let score = score.clone();
            let mut count: u32 = 0;
            scheduler.set_interval(SCORE_FIRST_WAIT_MS, PIPE_INTERVAL_MS, move || {
                count += 1;
                score.emit(&count);
            })
        };

        // Session teardown: gated signals stop through their gates; the
        // producing timers and the key-derived subscriptions go with them.
        {
            let scheduler = Rc::clone(&scheduler);
            let pressed_key = pressed_key.clone();
            stop.on_fire(move || {
                for timer in [buffer_timer, skyline_timer, obstacle_timer, score_timer] {
                    scheduler.cancel(timer);
                }
                pressed_key.unsubscribe(flap_sub);
                pressed_key.unsubscribe(buffer_sub);
            });
        }

        Rc::new(Self {
            scheduler,
            stop,
            pressed_key,
            on_frame_update,
            on_flap,
            skyline_update,
            create_obstacle,
            score,
            restart,
            easter_egg,
        })
    }

    /// Advances virtual time and then publishes the frame tick. Remains
    /// callable after stop: due timers for stopped streams were cancelled,
    /// while pending delayed continuations still fire harmlessly.
    pub fn advance(&self, elapsed_ms: f64) {
        self.scheduler.advance(elapsed_ms);
        self.on_frame_update.emit(&(elapsed_ms / FRAME_UNIT_MS));
    }

    /// Injects one raw key press into the shared source.
    pub fn feed_key(&self, code: &str) {
        self.pressed_key.emit(&KeyEvent {
            code: code.to_owned(),
        });
    }

    /// Schedules a one-shot deferred continuation on the session scheduler.
    pub fn delay(&self, delay_ms: f64, callback: impl FnOnce() + 'static) -> TimerId {
        self.scheduler.set_timeout(delay_ms, callback)
    }

    /// Fires the session-stop token. Every gated sequence completes now.
    pub fn stop_game(&self) {
        log::info!("session stop");
        self.stop.fire();
    }

    pub fn stopped(&self) -> bool {
        self.stop.fired()
    }
}
