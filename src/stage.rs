//! Collaborator seams for the renderer and the host page.
//!
//! The game core draws by handing [`SpriteFrame`] descriptions to a
//! [`Stage`] and pushes text to a [`Gui`]; the web front end binds these to
//! a canvas and to DOM elements. Tests bind them to recorders.

/// Axis-aligned bounding box in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Axis-aligned overlap test, the collision predicate for the whole
    /// game. Touching edges do not count as a hit.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// One sprite to paint: texture path plus placement. `base_w`/`base_h` are
/// the intrinsic sprite size; the renderer multiplies them by the scale
/// factors, mirroring when a factor is negative.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteFrame {
    pub texture: &'static str,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub base_w: f64,
    pub base_h: f64,
    pub rotation: f64,
}

/// Scene-graph renderer collaborator. Paint order is draw-call order within
/// one `clear`/`draw`* cycle.
pub trait Stage {
    /// Creates the visual surface and attaches it to the host container.
    fn mount(&mut self);
    /// Begins a frame by wiping the surface to the background color.
    fn clear(&mut self);
    fn draw(&mut self, frame: &SpriteFrame);
    /// Releases the surface and every loaded texture.
    fn teardown(&mut self);
}

/// Host-page text surfaces: the scoreboard and the message line.
pub trait Gui {
    fn set_score(&mut self, score: u32);
    fn set_message(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        let b = Rect { x: 5.0, y: 5.0, w: 10.0, h: 10.0 };
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn disjoint_and_touching_rects_do_not_intersect() {
        let a = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        let apart = Rect { x: 20.0, y: 0.0, w: 10.0, h: 10.0 };
        let touching = Rect { x: 10.0, y: 0.0, w: 10.0, h: 10.0 };
        assert!(!a.intersects(&apart));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn containment_counts_as_intersection() {
        let outer = Rect { x: 0.0, y: 0.0, w: 100.0, h: 100.0 };
        let inner = Rect { x: 40.0, y: 40.0, w: 5.0, h: 5.0 };
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }
}
