//! Entity models and the per-session world.
//!
//! Instead of tagging nodes in a shared render tree, the world owns one
//! collection per entity kind. Collision and cleanup iterate those
//! collections directly; the paint pass mirrors them into the renderer in
//! draw order.

mod pipe;
mod player;
mod skyline;

pub use pipe::Pipe;
pub use player::{FlapPhase, Player};
pub use skyline::Skyline;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{
    CANVAS_HEIGHT, CANVAS_WIDTH, PIPE_MAX_ALTITUDE, PIPE_MIN_ALTITUDE, SKYLINE_TILE_W,
};

/// All mutable state of one game session.
pub struct World {
    pub player: Player,
    pub pipes: Vec<Pipe>,
    pub skyline: Vec<Skyline>,
    pub game_over: bool,
    rng: SmallRng,
}

impl World {
    /// Fresh session state: player at the start position and the initial
    /// skyline band of three tiles.
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            player: Player::new(),
            pipes: Vec::new(),
            skyline: Vec::new(),
            game_over: false,
            rng: SmallRng::seed_from_u64(seed),
        };
        for i in 0..3 {
            world
                .skyline
                .push(Skyline::new(i as f64 * SKYLINE_TILE_W, CANVAS_HEIGHT));
        }
        world
    }

    /// Spawns one mirrored pipe pair; the bottom altitude is uniform within
    /// the configured band.
    pub fn spawn_pipe_pair(&mut self) {
        let altitude = self.rng.gen_range(PIPE_MIN_ALTITUDE..PIPE_MAX_ALTITUDE);
        let bottom = Pipe::bottom(altitude);
        let top = Pipe::top_for(&bottom);
        self.pipes.push(bottom);
        self.pipes.push(top);
    }

    /// Drops every pipe that has scrolled past the left canvas edge.
    pub fn sweep_pipes(&mut self) {
        self.pipes.retain(|pipe| !pipe.is_off_screen());
    }

    /// Appends a tile when the newest one has come within the canvas width,
    /// and recycles tiles that scrolled fully out of view.
    pub fn extend_skyline(&mut self) {
        let newest = self.skyline.last().map(|tile| (tile.x(), tile.right_edge()));
        if let Some((x, right_edge)) = newest {
            if x <= CANVAS_WIDTH {
                self.skyline.push(Skyline::new(right_edge, CANVAS_HEIGHT));
            }
        }
        self.skyline.retain(|tile| !tile.is_off_screen());
    }

    /// The collision predicate: does the player overlap any live pipe.
    pub fn player_hit_pipe(&self) -> bool {
        let player = self.player.bounds();
        self.pipes.iter().any(|pipe| player.intersects(&pipe.bounds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PIPE_SPEED, VERTICAL_PIPES_SEPARATION};

    #[test]
    fn new_world_has_initial_band_and_no_pipes() {
        let world = World::new(1);
        assert_eq!(world.skyline.len(), 3);
        assert_eq!(world.skyline[0].x(), 0.0);
        assert_eq!(world.skyline[1].x(), SKYLINE_TILE_W);
        assert_eq!(world.skyline[2].x(), 2.0 * SKYLINE_TILE_W);
        assert!(world.pipes.is_empty());
        assert!(!world.game_over);
    }

    #[test]
    fn spawned_pairs_always_hold_the_separation_invariant() {
        let mut world = World::new(42);
        for _ in 0..20 {
            world.spawn_pipe_pair();
        }
        assert_eq!(world.pipes.len(), 40);
        for pair in world.pipes.chunks(2) {
            let (bottom, top) = (&pair[0], &pair[1]);
            assert!(bottom.y() >= PIPE_MIN_ALTITUDE && bottom.y() < PIPE_MAX_ALTITUDE);
            assert_eq!(top.y(), bottom.y() - VERTICAL_PIPES_SEPARATION);
            assert_eq!(top.scale_y(), -bottom.scale_y());
        }
    }

    #[test]
    fn sweep_removes_only_off_screen_pipes() {
        let mut world = World::new(7);
        world.spawn_pipe_pair();
        world.spawn_pipe_pair();
        // Scroll the first pair past the left edge, keep the second fresh.
        let distance = world.pipes[0].x() + 1.0;
        let frames = distance / PIPE_SPEED;
        world.pipes[0].scroll(frames);
        world.pipes[1].scroll(frames);

        world.sweep_pipes();
        assert_eq!(world.pipes.len(), 2);
        assert!(world.pipes.iter().all(|pipe| pipe.x() >= 0.0));
    }

    #[test]
    fn skyline_band_never_gaps_under_scroll_and_extension() {
        let mut world = World::new(3);
        // Simulate many one-second cycles: sixty frames of scroll, then one
        // extension sweep, mirroring the live stream cadence.
        for _ in 0..120 {
            for tile in &mut world.skyline {
                tile.scroll(60.0);
            }
            world.extend_skyline();

            let mut xs: Vec<f64> = world.skyline.iter().map(|t| t.x()).collect();
            xs.sort_by(|a, b| a.total_cmp(b));
            assert!(xs[0] <= 0.0, "left edge uncovered");
            let rightmost = xs[xs.len() - 1] + SKYLINE_TILE_W;
            assert!(rightmost >= CANVAS_WIDTH, "right edge uncovered");
            for pair in xs.windows(2) {
                assert_eq!(pair[1] - pair[0], SKYLINE_TILE_W, "band has a gap");
            }
        }
        // Recycling keeps the band bounded.
        assert!(world.skyline.len() <= 5);
    }

    #[test]
    fn player_hit_pipe_is_false_without_overlap() {
        let mut world = World::new(9);
        world.spawn_pipe_pair();
        // Fresh pipes are far right of the player.
        assert!(!world.player_hit_pipe());
    }

    #[test]
    fn player_hit_pipe_detects_overlap_after_scrolling_into_player() {
        let mut world = World::new(11);
        // A bottom pipe at altitude 600 reaches well above the player's
        // start altitude once it arrives at the player's column.
        world.pipes.push(Pipe::bottom(600.0));
        let frames = (world.pipes[0].x() - crate::config::PLAYER_X) / PIPE_SPEED;
        world.pipes[0].scroll(frames);
        assert!(world.player_hit_pipe());
    }
}
