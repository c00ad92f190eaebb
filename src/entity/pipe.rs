//! Pipe obstacles. Pipes always come as a mirrored bottom/top pair spawned
//! just past the right canvas edge.

use crate::config::{
    CANVAS_WIDTH, PIPE_BASE_H, PIPE_BASE_W, PIPE_SCALE, PIPE_SPEED, SPRITE_PIPE,
    VERTICAL_PIPES_SEPARATION,
};
use crate::stage::{Rect, SpriteFrame};

pub struct Pipe {
    x: f64,
    y: f64,
    scale_y: f64,
}

impl Pipe {
    /// Bottom pipe at the given altitude, spawned fully off-screen to the
    /// right.
    pub fn bottom(altitude: f64) -> Self {
        Self {
            x: CANVAS_WIDTH + PIPE_BASE_W * PIPE_SCALE,
            y: altitude,
            scale_y: PIPE_SCALE,
        }
    }

    /// The mirrored partner of a bottom pipe: fixed vertical separation,
    /// flipped vertical scale.
    pub fn top_for(bottom: &Pipe) -> Self {
        Self {
            x: bottom.x,
            y: bottom.y - VERTICAL_PIPES_SEPARATION,
            scale_y: -bottom.scale_y,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn scroll(&mut self, delta: f64) {
        self.x -= PIPE_SPEED * delta;
    }

    /// A pipe whose center has crossed the left canvas edge is garbage.
    pub fn is_off_screen(&self) -> bool {
        self.x < 0.0
    }

    pub fn bounds(&self) -> Rect {
        let w = PIPE_BASE_W * PIPE_SCALE;
        let h = PIPE_BASE_H * PIPE_SCALE;
        Rect {
            x: self.x - w / 2.0,
            y: self.y - h / 2.0,
            w,
            h,
        }
    }

    pub fn frame(&self) -> SpriteFrame {
        SpriteFrame {
            texture: SPRITE_PIPE,
            x: self.x,
            y: self.y,
            scale_x: PIPE_SCALE,
            scale_y: self.scale_y,
            anchor_x: 0.5,
            anchor_y: 0.5,
            base_w: PIPE_BASE_W,
            base_h: PIPE_BASE_H,
            rotation: 0.0,
        }
    }
}
