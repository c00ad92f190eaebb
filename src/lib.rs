//! Flappy Kiwi core crate.
//!
//! A browser side-scrolling arcade game: a kiwi is kept airborne by timed
//! flap inputs against continuous gravity and must dodge procedurally
//! spawned pipe pairs while the score ticks up.
//!
//! There is no central update loop. The architecture is a set of composed
//! event streams (`events` + `service`) bound to game effects by the
//! `controller`; the web front end only feeds raw frames and key presses in
//! and paints what the controller decided.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod controller;
pub mod entity;
pub mod events;
pub mod service;
pub mod stage;
mod web;

// Optional small allocator for wasm size (feature gated).
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Entry point called from the host page. Builds the controller against the
/// real DOM and starts the first session.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::launch()
}
