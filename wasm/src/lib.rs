mod utils;
pub mod session_state;

use js_sys::Function;
use session_state::SessionState;
use system::{serde_json, Canvas, DrawingAction, Point, RenderState, Timestamp};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Forwards draw calls to the page's 2d-context code and keeps the vector
/// model so the page can repaint after a resize.
struct JsCanvas {
    state: RenderState,
    draw: Function,
    clear: Function,
}

impl Canvas for JsCanvas {
    fn draw(&mut self, action: &DrawingAction) {
        self.state.draw(action);
        match serde_json::to_string(action) {
            Ok(json) => {
                if let Err(e) = self.draw.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("draw callback failed: {:?}", e);
                }
            }
            Err(e) => log::error!("cannot serialize action: {}", e),
        }
    }

    fn clear(&mut self) {
        self.state.clear();
        if let Err(e) = self.clear.call0(&JsValue::NULL) {
            log::warn!("clear callback failed: {:?}", e);
        }
    }
}

impl JsCanvas {
    fn redraw(&mut self) {
        let actions = self.state.actions().to_vec();
        self.clear();
        for action in &actions {
            self.draw(action);
        }
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn timestamp(now: f64) -> Timestamp {
    now.max(0.0) as Timestamp
}

/// Browser entry point. Outbound frames are bincode; connect with `/ws/?codec=bincode`.
#[wasm_bindgen]
pub struct WhiteboardClient {
    session: SessionState<JsCanvas>,
}

#[wasm_bindgen]
impl WhiteboardClient {
    /// `draw` receives one action as JSON, `clear` takes no arguments.
    #[wasm_bindgen(constructor)]
    pub fn new(draw: Function, clear: Function) -> Self {
        Self {
            session: SessionState::new(JsCanvas {
                state: RenderState::new(),
                draw,
                clear,
            }),
        }
    }

    pub fn set_color(&mut self, color: &str) -> Result<(), JsValue> {
        let tools = self.session.tools_mut();
        tools.color = color.parse().map_err(to_js_error)?;
        tools.erasing = false;
        Ok(())
    }

    pub fn set_width(&mut self, width: f32) {
        self.session.tools_mut().width = width;
    }

    pub fn set_line_style(&mut self, style: &str) -> Result<(), JsValue> {
        self.session.tools_mut().line_style = style.parse().map_err(to_js_error)?;
        Ok(())
    }

    /// `None` switches back to freehand, `"normal"` also drops the eraser
    /// and line style.
    pub fn set_shape(&mut self, shape: Option<String>) -> Result<(), JsValue> {
        match shape.as_deref() {
            None => self.session.tools_mut().shape = None,
            Some("normal") => self.use_normal_brush(),
            Some(name) => {
                self.session.tools_mut().shape = Some(name.parse().map_err(to_js_error)?)
            }
        }
        Ok(())
    }

    pub fn use_normal_brush(&mut self) {
        self.session.tools_mut().use_normal_brush();
    }

    /// Returns whether the eraser is now active.
    pub fn toggle_eraser(&mut self) -> bool {
        let tools = self.session.tools_mut();
        tools.toggle_eraser();
        tools.erasing
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.session.pointer_down(Point::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, now: f64) -> Result<Option<Box<[u8]>>, JsValue> {
        self.session
            .pointer_move(Point::new(x, y), timestamp(now))
            .map(|frame| frame.map(Vec::into_boxed_slice))
            .map_err(to_js_error)
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, now: f64) -> Result<Option<Box<[u8]>>, JsValue> {
        self.session
            .pointer_up(Point::new(x, y), timestamp(now))
            .map(|frame| frame.map(Vec::into_boxed_slice))
            .map_err(to_js_error)
    }

    pub fn pointer_leave(&mut self) {
        self.session.pointer_leave();
    }

    /// Call when the timer armed from `next_timer_at` expires.
    pub fn fire_timer(&mut self, now: f64) -> Result<Option<Box<[u8]>>, JsValue> {
        self.session
            .fire_timer(timestamp(now))
            .map(|frame| frame.map(Vec::into_boxed_slice))
            .map_err(to_js_error)
    }

    pub fn next_timer_at(&self) -> Option<f64> {
        self.session.next_timer_at().map(|t| t as f64)
    }

    pub fn clear_canvas(&mut self) -> Result<Box<[u8]>, JsValue> {
        self.session
            .clear_canvas()
            .map(Vec::into_boxed_slice)
            .map_err(to_js_error)
    }

    pub fn handle_frame(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.handle_frame(bytes).map_err(to_js_error)
    }

    /// Repaints everything, e.g. after the canvas element was resized.
    pub fn redraw(&mut self) {
        self.session.canvas_mut().redraw();
    }
}
