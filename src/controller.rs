//! Game controller.
//!
//! Owns the single running session: binds every service stream to a concrete
//! game-state effect, manages entity spawn and cleanup, paints the scene,
//! and drives the game-over / restart lifecycle. All side effects of the
//! game happen here; the service only tells time and routes input.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::{
    CANVAS_HEIGHT, CANVAS_WIDTH, EASTER_EGG_DURATION_MS, EASTER_EGG_MESSAGE, FLAP_DELAY_MS,
    GAME_OVER_BASE_H, GAME_OVER_BASE_W, GAME_OVER_SCALE, SPRITE_BACKGROUND, SPRITE_GAME_OVER,
};
use crate::entity::World;
use crate::service::GameService;
use crate::stage::{Gui, SpriteFrame, Stage};

struct Session {
    service: Rc<GameService>,
    world: Rc<RefCell<World>>,
}

struct ControllerCtx {
    stage: Rc<RefCell<dyn Stage>>,
    gui: Rc<RefCell<dyn Gui>>,
    seed: Cell<u64>,
    session: RefCell<Option<Session>>,
}

pub struct MainController {
    ctx: Rc<ControllerCtx>,
}

impl Clone for MainController {
    fn clone(&self) -> Self {
        Self {
            ctx: Rc::clone(&self.ctx),
        }
    }
}

impl MainController {
    pub fn new(stage: Rc<RefCell<dyn Stage>>, gui: Rc<RefCell<dyn Gui>>, seed: u64) -> Self {
        Self {
            ctx: Rc::new(ControllerCtx {
                stage,
                gui,
                seed: Cell::new(seed),
                session: RefCell::new(None),
            }),
        }
    }

    /// Runs the startup sequence and leaves the session running.
    pub fn start_game(&self) {
        start_session(&self.ctx);
    }

    /// Per-frame entry point: advance the session streams by the elapsed
    /// wall milliseconds, then repaint. After game over the paint keeps the
    /// frozen scene and overlay visible.
    pub fn tick(&self, elapsed_ms: f64) {
        let Some((service, world)) = self.session_parts() else {
            return;
        };
        service.advance(elapsed_ms);
        render(&self.ctx.stage, &world);
    }

    /// Routes one raw key press into the current session.
    pub fn key_down(&self, code: &str) {
        let Some((service, _)) = self.session_parts() else {
            return;
        };
        service.feed_key(code);
    }

    /// Current session service, for embedding and tests.
    pub fn service(&self) -> Option<Rc<GameService>> {
        self.ctx
            .session
            .borrow()
            .as_ref()
            .map(|s| Rc::clone(&s.service))
    }

    /// Current session world, for embedding and tests.
    pub fn world(&self) -> Option<Rc<RefCell<World>>> {
        self.ctx
            .session
            .borrow()
            .as_ref()
            .map(|s| Rc::clone(&s.world))
    }

    fn session_parts(&self) -> Option<(Rc<GameService>, Rc<RefCell<World>>)> {
        self.ctx
            .session
            .borrow()
            .as_ref()
            .map(|s| (Rc::clone(&s.service), Rc::clone(&s.world)))
    }
}

/// Wires a fresh session. The subscription order of the frame-tick effects
/// is load-bearing: gravity runs before the collision check, which runs
/// before the bounds check, so game-over detection always sees the frame's
/// fully updated player position.
fn start_session(ctx: &Rc<ControllerCtx>) {
    log::info!("starting game session");
    ctx.stage.borrow_mut().mount();

    let service = GameService::new();
    let world = Rc::new(RefCell::new(World::new(next_seed(ctx))));

    // Skyline: scroll each frame, extend and recycle on the slow cadence.
    {
        let world = Rc::clone(&world);
        service.on_frame_update.subscribe(move |delta| {
            for tile in &mut world.borrow_mut().skyline {
                tile.scroll(*delta);
            }
        });
    }
    {
        let world = Rc::clone(&world);
        service
            .skyline_update
            .subscribe(move |_| world.borrow_mut().extend_skyline());
    }

    // Scoreboard.
    {
        let gui = Rc::clone(&ctx.gui);
        service
            .score
            .subscribe(move |score| gui.borrow_mut().set_score(*score));
    }

    // Player: gravity every frame; flap impulse plus the two-phase texture
    // animation. The delayed step only advances the texture.
    {
        let world = Rc::clone(&world);
        service
            .on_frame_update
            .subscribe(move |delta| world.borrow_mut().player.apply_gravity(*delta));
    }
    {
        let world = Rc::clone(&world);
        let service_weak = Rc::downgrade(&service);
        service.on_flap.subscribe(move |_| {
            world.borrow_mut().player.flap();
            if let Some(service) = service_weak.upgrade() {
                let world = Rc::clone(&world);
                service.delay(FLAP_DELAY_MS, move || {
                    world.borrow_mut().player.advance_animation();
                });
            }
        });
    }

    // Obstacles: spawn a pair on every tick, then sweep pipes that left the
    // screen; scroll the live ones each frame.
    {
        let world = Rc::clone(&world);
        service.create_obstacle.subscribe(move |_| {
            let mut world = world.borrow_mut();
            world.spawn_pipe_pair();
            world.sweep_pipes();
        });
    }
    {
        let world = Rc::clone(&world);
        service.on_frame_update.subscribe(move |delta| {
            for pipe in &mut world.borrow_mut().pipes {
                pipe.scroll(*delta);
            }
        });
    }

    // Collision, then bounds. Each releases its world borrow before the
    // game-over transition runs.
    {
        let ctx = Rc::clone(ctx);
        let world = Rc::clone(&world);
        service.on_frame_update.subscribe(move |_| {
            let hit = world.borrow().player_hit_pipe();
            if hit {
                game_over(&ctx);
            }
        });
    }
    {
        let ctx = Rc::clone(ctx);
        let world = Rc::clone(&world);
        service.on_frame_update.subscribe(move |_| {
            let out = world.borrow().player.out_of_bounds();
            if out {
                game_over(&ctx);
            }
        });
    }

    // Easter egg: show the message, clear it after the fixed duration.
    {
        let gui = Rc::clone(&ctx.gui);
        let service_weak = Rc::downgrade(&service);
        service.easter_egg.subscribe(move |_| {
            gui.borrow_mut().set_message(EASTER_EGG_MESSAGE);
            if let Some(service) = service_weak.upgrade() {
                let gui = Rc::clone(&gui);
                service.delay(EASTER_EGG_DURATION_MS, move || {
                    gui.borrow_mut().set_message("");
                });
            }
        });
    }

    ctx.session.replace(Some(Session { service, world }));
}

/// Terminal transition for the session. Marks the player, stops every gated
/// stream, paints the final scene with the overlay, resets the displayed
/// score, then waits for exactly one restart trigger.
fn game_over(ctx: &Rc<ControllerCtx>) {
    let (service, world) = {
        let session = ctx.session.borrow();
        let Some(session) = session.as_ref() else {
            return;
        };
        (Rc::clone(&session.service), Rc::clone(&session.world))
    };
    if service.stopped() {
        return;
    }
    log::info!("game over");

    {
        let mut world = world.borrow_mut();
        world.player.kill();
        world.game_over = true;
    }
    service.stop_game();
    render(&ctx.stage, &world);
    ctx.gui.borrow_mut().set_score(0);

    let ctx = Rc::clone(ctx);
    service.restart.subscribe_once(move |_| {
        log::info!("restarting");
        end_session(&ctx);
        start_session(&ctx);
    });
}

/// Arena reset: drop the old session's streams and entities, release the
/// rendering surface. Nothing carries across the boundary.
fn end_session(ctx: &Rc<ControllerCtx>) {
    ctx.session.replace(None);
    ctx.stage.borrow_mut().teardown();
    ctx.gui.borrow_mut().set_message("");
}

/// Paint pass. Call order encodes the draw order: background first, the
/// skyline band directly above it, then obstacles, the player, and the
/// game-over overlay on top.
fn render(stage: &Rc<RefCell<dyn Stage>>, world: &Rc<RefCell<World>>) {
    let mut stage = stage.borrow_mut();
    let world = world.borrow();

    stage.clear();
    stage.draw(&background_frame());
    for tile in &world.skyline {
        stage.draw(&tile.frame());
    }
    for pipe in &world.pipes {
        stage.draw(&pipe.frame());
    }
    stage.draw(&world.player.frame());
    if world.game_over {
        stage.draw(&game_over_frame());
    }
}

fn background_frame() -> SpriteFrame {
    SpriteFrame {
        texture: SPRITE_BACKGROUND,
        x: 0.0,
        y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        anchor_x: 0.0,
        anchor_y: 0.0,
        base_w: CANVAS_WIDTH,
        base_h: CANVAS_HEIGHT,
        rotation: 0.0,
    }
}

fn game_over_frame() -> SpriteFrame {
    SpriteFrame {
        texture: SPRITE_GAME_OVER,
        x: CANVAS_WIDTH / 2.0,
        y: CANVAS_HEIGHT / 3.0,
        scale_x: GAME_OVER_SCALE,
        scale_y: GAME_OVER_SCALE,
        anchor_x: 0.5,
        anchor_y: 0.5,
        base_w: GAME_OVER_BASE_W,
        base_h: GAME_OVER_BASE_H,
        rotation: 0.0,
    }
}

/// Per-session seed derivation; the constants are the usual LCG pair.
fn next_seed(ctx: &ControllerCtx) -> u64 {
    let seed = ctx
        .seed
        .get()
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    ctx.seed.set(seed);
    seed
}
