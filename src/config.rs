//! Static game tunables: canvas geometry, physics rates, key bindings,
//! timing windows and sprite metadata. No behavior lives here.

pub const CANVAS_WIDTH: f64 = 1000.0;
pub const CANVAS_HEIGHT: f64 = 600.0;

// Vertical kill zone. The player may briefly leave the visible canvas
// before the bounds check ends the session.
pub const BOUND_TOP: f64 = -60.0;
pub const BOUND_BOTTOM: f64 = CANVAS_HEIGHT + 30.0;

// Logical key codes as delivered by `KeyboardEvent.code`.
pub const KEY_SPACE: &str = "Space";
pub const KEY_UP: &str = "ArrowUp";

/// One frame unit is a 60 Hz frame. All speeds below are per frame unit,
/// so `delta = elapsed_ms / FRAME_UNIT_MS` keeps physics frame-rate
/// independent.
pub const FRAME_UNIT_MS: f64 = 1000.0 / 60.0;

pub const GRAVITY: f64 = 0.15;
pub const FLAP_POWER: f64 = 5.0;
pub const FLAP_DELAY_MS: f64 = 150.0;
pub const PIPE_SPEED: f64 = 1.75;
pub const SKYLINE_SPEED: f64 = 0.5;

pub const PIPE_FIRST_WAIT_MS: f64 = 1500.0;
pub const PIPE_INTERVAL_MS: f64 = 2500.0;
pub const SCORE_FIRST_WAIT_MS: f64 = 9000.0;
pub const SKYLINE_INTERVAL_MS: f64 = 1000.0;

pub const VERTICAL_PIPES_SEPARATION: f64 = 1000.0;
pub const PIPE_MIN_ALTITUDE: f64 = 500.0;
pub const PIPE_MAX_ALTITUDE: f64 = 1000.0;

pub const EASTER_EGG_MESSAGE: &str = "Wow, so much power!";
pub const EASTER_EGG_DURATION_MS: f64 = 3000.0;
pub const EASTER_EGG_BUFFER_MS: f64 = 1000.0;
pub const EASTER_EGG_BUFFER_LEN: usize = 6;

// Sprite paths, resolved by the renderer collaborator.
pub const SPRITE_PLAYER_INITIAL: &str = "assets/sprites/player/sprite_0.png";
pub const SPRITE_PLAYER_FLAPPING: &str = "assets/sprites/player/sprite_1.png";
pub const SPRITE_PIPE: &str = "assets/sprites/pipe.png";
pub const SPRITE_BACKGROUND: &str = "assets/backgrounds/background.jpg";
pub const SPRITE_SKYLINE: &str = "assets/backgrounds/skyline.png";
pub const SPRITE_GAME_OVER: &str = "assets/sprites/gameover.png";

// Intrinsic (unscaled) sprite sizes in px. Physics and collision work from
// these constants, so gameplay never depends on what the renderer actually
// decoded.
pub const PLAYER_BASE_W: f64 = 16.0;
pub const PLAYER_BASE_H: f64 = 12.0;
pub const PLAYER_SCALE: f64 = 5.0;
pub const PLAYER_X: f64 = 250.0;

pub const PIPE_BASE_W: f64 = 20.0;
pub const PIPE_BASE_H: f64 = 100.0;
pub const PIPE_SCALE: f64 = 7.0;

pub const SKYLINE_BASE_W: f64 = 100.0;
pub const SKYLINE_BASE_H: f64 = 40.0;
pub const SKYLINE_SCALE: f64 = 5.0;
/// On-screen width of one skyline tile; initial band spacing uses this too.
pub const SKYLINE_TILE_W: f64 = SKYLINE_BASE_W * SKYLINE_SCALE;

pub const GAME_OVER_BASE_W: f64 = 500.0;
pub const GAME_OVER_BASE_H: f64 = 120.0;
pub const GAME_OVER_SCALE: f64 = 0.6;
