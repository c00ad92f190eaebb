//! The player: a kiwi kept airborne by flap impulses against gravity.

use crate::config::{
    BOUND_BOTTOM, BOUND_TOP, CANVAS_HEIGHT, FLAP_POWER, GRAVITY, PLAYER_BASE_H, PLAYER_BASE_W,
    PLAYER_SCALE, PLAYER_X, SPRITE_PLAYER_FLAPPING, SPRITE_PLAYER_INITIAL,
};
use crate::stage::{Rect, SpriteFrame};

/// Two-frame flap animation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlapPhase {
    Initial,
    Flapping,
}

pub struct Player {
    y: f64,
    y_speed: f64,
    phase: FlapPhase,
    rotation: f64,
}

impl Player {
    pub fn new() -> Self {
        Self {
            y: CANVAS_HEIGHT / 2.0,
            y_speed: 0.0,
            phase: FlapPhase::Initial,
            rotation: 0.0,
        }
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn y_speed(&self) -> f64 {
        self.y_speed
    }

    pub fn phase(&self) -> FlapPhase {
        self.phase
    }

    /// Per-frame gravity integration: accelerate, then fall.
    pub fn apply_gravity(&mut self, delta: f64) {
        self.y_speed += GRAVITY * delta;
        self.y += self.y_speed;
    }

    /// Immediate part of the flap contract: upward impulse plus the first
    /// texture toggle. The delayed second toggle is [`Self::advance_animation`].
    pub fn flap(&mut self) {
        self.y_speed = -FLAP_POWER;
        self.toggle_phase();
    }

    /// Delayed part of the flap animation. Toggles the texture only; it is
    /// not a second impulse.
    pub fn advance_animation(&mut self) {
        self.toggle_phase();
    }

    /// Cosmetic death marker. Lifecycle ends at the controller, not here.
    pub fn kill(&mut self) {
        self.rotation = std::f64::consts::PI;
    }

    pub fn out_of_bounds(&self) -> bool {
        self.y < BOUND_TOP || self.y > BOUND_BOTTOM
    }

    pub fn texture(&self) -> &'static str {
        match self.phase {
            FlapPhase::Initial => SPRITE_PLAYER_INITIAL,
            FlapPhase::Flapping => SPRITE_PLAYER_FLAPPING,
        }
    }

    pub fn bounds(&self) -> Rect {
        let w = PLAYER_BASE_W * PLAYER_SCALE;
        let h = PLAYER_BASE_H * PLAYER_SCALE;
        Rect {
            x: PLAYER_X - w / 2.0,
            y: self.y - h / 2.0,
            w,
            h,
        }
    }

    pub fn frame(&self) -> SpriteFrame {
        SpriteFrame {
            texture: self.texture(),
            x: PLAYER_X,
            y: self.y,
            scale_x: PLAYER_SCALE,
            scale_y: PLAYER_SCALE,
            anchor_x: 0.5,
            anchor_y: 0.5,
            base_w: PLAYER_BASE_W,
            base_h: PLAYER_BASE_H,
            rotation: self.rotation,
        }
    }

    fn toggle_phase(&mut self) {
        self.phase = match self.phase {
            FlapPhase::Initial => FlapPhase::Flapping,
            FlapPhase::Flapping => FlapPhase::Initial,
        };
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
