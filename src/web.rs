//! Browser front end.
//!
//! Binds the collaborator seams to the real page: a canvas stage under
//! `#canvasContainer`, text surfaces in `#scoreboard` and `#messages`, one
//! page-lifetime `keydown` listener, and a `requestAnimationFrame` loop
//! feeding elapsed milliseconds into the controller.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlImageElement, Window,
    window,
};

use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::controller::MainController;
use crate::stage::{Gui, SpriteFrame, Stage};

struct App {
    controller: MainController,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Canvas-backed renderer. Textures are `HtmlImageElement`s cached per
/// sprite path; an image that has not finished loading simply skips its
/// draw calls until it has.
pub struct CanvasStage {
    document: Document,
    host: Element,
    canvas: Option<HtmlCanvasElement>,
    ctx2d: Option<CanvasRenderingContext2d>,
    textures: HashMap<&'static str, HtmlImageElement>,
}

impl CanvasStage {
    pub fn new(document: Document) -> Result<Self, JsValue> {
        let host = document
            .get_element_by_id("canvasContainer")
            .ok_or_else(|| JsValue::from_str("no #canvasContainer element"))?;
        Ok(Self {
            document,
            host,
            canvas: None,
            ctx2d: None,
            textures: HashMap::new(),
        })
    }

    fn texture(&mut self, path: &'static str) -> HtmlImageElement {
        self.textures
            .entry(path)
            .or_insert_with(|| {
                let image = HtmlImageElement::new().unwrap_throw();
                image.set_src(path);
                image
            })
            .clone()
    }
}

impl Stage for CanvasStage {
    fn mount(&mut self) {
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .unwrap_throw()
            .dyn_into()
            .unwrap_throw();
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);
        self.host.append_child(&canvas).unwrap_throw();
        let ctx2d: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .unwrap_throw()
            .unwrap_throw()
            .dyn_into()
            .unwrap_throw();
        self.canvas = Some(canvas);
        self.ctx2d = Some(ctx2d);
    }

    fn clear(&mut self) {
        if let Some(ctx2d) = &self.ctx2d {
            ctx2d.set_fill_style_str("#1099bb");
            ctx2d.fill_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
        }
    }

    fn draw(&mut self, frame: &SpriteFrame) {
        let Some(ctx2d) = self.ctx2d.clone() else {
            return;
        };
        let image = self.texture(frame.texture);
        let w = frame.base_w * frame.scale_x.abs();
        let h = frame.base_h * frame.scale_y.abs();

        ctx2d.save();
        ctx2d.translate(frame.x, frame.y).ok();
        if frame.rotation != 0.0 {
            ctx2d.rotate(frame.rotation).ok();
        }
        // Mirroring comes from the sign of the scale factors; the magnitude
        // is already folded into w/h.
        ctx2d.scale(frame.scale_x.signum(), frame.scale_y.signum()).ok();
        ctx2d
            .draw_image_with_html_image_element_and_dw_and_dh(
                &image,
                -frame.anchor_x * w,
                -frame.anchor_y * h,
                w,
                h,
            )
            .ok();
        ctx2d.restore();
    }

    fn teardown(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            canvas.remove();
        }
        self.ctx2d = None;
        self.textures.clear();
    }
}

/// DOM text surfaces for the score and the message line.
pub struct DomGui {
    scoreboard: Element,
    messages: Element,
}

impl DomGui {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let scoreboard = document
            .get_element_by_id("scoreboard")
            .ok_or_else(|| JsValue::from_str("no #scoreboard element"))?;
        let messages = document
            .get_element_by_id("messages")
            .ok_or_else(|| JsValue::from_str("no #messages element"))?;
        Ok(Self {
            scoreboard,
            messages,
        })
    }
}

impl Gui for DomGui {
    fn set_score(&mut self, score: u32) {
        self.scoreboard.set_text_content(Some(&score.to_string()));
    }

    fn set_message(&mut self, message: &str) {
        self.messages.set_text_content(Some(message));
    }
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        web_sys::console::log_1(&format!("[{}] {}", record.level(), record.args()).into());
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Builds the controller against the real page and starts the game once.
pub fn launch() -> Result<(), JsValue> {
    init_logging();

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let stage: Rc<RefCell<dyn Stage>> = Rc::new(RefCell::new(CanvasStage::new(document.clone())?));
    let gui: Rc<RefCell<dyn Gui>> = Rc::new(RefCell::new(DomGui::new(&document)?));
    let seed = win
        .performance()
        .map(|p| p.now().to_bits())
        .unwrap_or(0x5eed_f1a9);

    let controller = MainController::new(stage, gui, seed);
    controller.start_game();
    APP.with(|cell| cell.replace(Some(App { controller })));

    attach_keyboard(&document)?;
    start_frame_loop(&win);
    Ok(())
}

/// One page-lifetime listener; every press is routed to whatever session is
/// current, so restarts never re-attach browser events.
fn attach_keyboard(document: &Document) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let code = event.code();
        let controller = APP.with(|cell| cell.borrow().as_ref().map(|app| app.controller.clone()));
        if let Some(controller) = controller {
            controller.key_down(&code);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop(win: &Window) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let mut last_ts: Option<f64> = None;
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let elapsed = match last_ts {
            Some(prev) => (ts - prev).max(0.0),
            None => 0.0,
        };
        last_ts = Some(ts);
        let controller = APP.with(|cell| cell.borrow().as_ref().map(|app| app.controller.clone()));
        if let Some(controller) = controller {
            controller.tick(elapsed);
        }
        if let Some(win) = window() {
            let _ = win
                .request_animation_frame(f.borrow().as_ref().unwrap_throw().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    let _ = win
        .request_animation_frame(g.borrow().as_ref().unwrap_throw().as_ref().unchecked_ref());
}
