//! Test doubles for the renderer and host-page collaborators, plus a small
//! harness bundling a controller with inspectable fakes.

use std::cell::RefCell;
use std::rc::Rc;

use flappy_kiwi::controller::MainController;
use flappy_kiwi::stage::{Gui, SpriteFrame, Stage};

/// Records draw calls per frame and lifecycle transitions.
#[derive(Default)]
pub struct FakeStage {
    pub mounts: u32,
    pub teardowns: u32,
    pub clears: u32,
    /// Draw calls since the last `clear`, in paint order.
    pub draws: Vec<SpriteFrame>,
}

impl Stage for FakeStage {
    fn mount(&mut self) {
        self.mounts += 1;
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.draws.clear();
    }

    fn draw(&mut self, frame: &SpriteFrame) {
        self.draws.push(frame.clone());
    }

    fn teardown(&mut self) {
        self.teardowns += 1;
        self.draws.clear();
    }
}

/// Records every score and message update.
#[derive(Default)]
pub struct FakeGui {
    pub scores: Vec<u32>,
    pub message: String,
    pub messages_seen: Vec<String>,
}

impl Gui for FakeGui {
    fn set_score(&mut self, score: u32) {
        self.scores.push(score);
    }

    fn set_message(&mut self, message: &str) {
        self.message = message.to_owned();
        self.messages_seen.push(message.to_owned());
    }
}

pub struct Harness {
    pub controller: MainController,
    pub stage: Rc<RefCell<FakeStage>>,
    pub gui: Rc<RefCell<FakeGui>>,
}

pub fn harness(seed: u64) -> Harness {
    let stage = Rc::new(RefCell::new(FakeStage::default()));
    let gui = Rc::new(RefCell::new(FakeGui::default()));
    let controller = MainController::new(stage.clone(), gui.clone(), seed);
    Harness {
        controller,
        stage,
        gui,
    }
}
