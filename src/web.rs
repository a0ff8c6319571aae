// Browser boundary: canvas-backed drawing surface, setTimeout scheduler, and
// the wasm-bindgen facade. JSON strings cross the boundary; the host page
// keeps DOM wiring and CSS to itself.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{PluginError, SurfaceError};
use crate::framework::{Framework, FrameworkOptions};
use crate::plugin::{GamePlugin, SpinContext};
use crate::schedule::{Scheduler, TimerId};
use crate::surface::{DrawSurface, GradientAxis, LineStyle, TextAlign, TextStyle};
use crate::types::{ColorPair, FrameworkConfig, Layout, RiskLevel, SpinResult, StatePatch};

/// The always-available primary adapter over a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap the canvas element with the given DOM id.
    pub fn from_element_id(id: &str) -> Result<Self, SurfaceError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SurfaceError::Missing("document".to_string()))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| SurfaceError::Missing(format!("canvas element #{id}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SurfaceError::Missing(format!("#{id} is not a canvas")))?;
        Self::from_canvas(canvas)
    }

    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| SurfaceError::Missing("2d context".to_string()))?
            .ok_or_else(|| SurfaceError::Missing("2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Missing("2d context".to_string()))?;
        Ok(CanvasSurface { canvas, ctx })
    }
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: &str,
    ) -> Result<(), SurfaceError> {
        self.ctx.set_fill_style(&JsValue::from_str(color));
        self.ctx.fill_rect(x, y, w, h);
        Ok(())
    }

    fn fill_gradient(
        &mut self,
        colors: &ColorPair,
        axis: GradientAxis,
    ) -> Result<(), SurfaceError> {
        let (w, h) = self.size();
        let gradient = match axis {
            GradientAxis::Vertical => self.ctx.create_linear_gradient(0.0, 0.0, 0.0, h as f64),
            GradientAxis::Horizontal => self.ctx.create_linear_gradient(0.0, 0.0, w as f64, 0.0),
        };
        gradient
            .add_color_stop(0.0, &colors.0)
            .map_err(|_| SurfaceError::Draw(format!("bad gradient stop: {}", colors.0)))?;
        gradient
            .add_color_stop(1.0, &colors.1)
            .map_err(|_| SurfaceError::Draw(format!("bad gradient stop: {}", colors.1)))?;
        self.ctx.set_fill_style(&gradient);
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        style: &TextStyle,
    ) -> Result<(), SurfaceError> {
        self.ctx.set_font(&style.font);
        self.ctx.set_fill_style(&JsValue::from_str(&style.color));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.ctx
            .fill_text(text, x, y)
            .map_err(|_| SurfaceError::Draw(format!("fill_text failed: {text}")))
    }

    fn draw_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: &LineStyle,
    ) -> Result<(), SurfaceError> {
        self.ctx.begin_path();
        self.ctx.set_stroke_style(&JsValue::from_str(&style.color));
        self.ctx.set_line_width(style.width);
        self.ctx.move_to(x1, y1);
        self.ctx.line_to(x2, y2);
        self.ctx.stroke();
        Ok(())
    }
}

/// `Scheduler` over `setTimeout`. Pending timeouts are kept so `cancel`
/// (and session teardown) can clear them.
#[derive(Default)]
pub struct TimeoutScheduler {
    timers: Rc<RefCell<HashMap<u64, Timeout>>>,
    next_id: Cell<u64>,
}

impl TimeoutScheduler {
    pub fn new() -> Self {
        TimeoutScheduler::default()
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let timers = self.timers.clone();
        let timeout = Timeout::new(delay_ms, move || {
            timers.borrow_mut().remove(&id);
            callback();
        });
        self.timers.borrow_mut().insert(id, timeout);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) {
        if let Some(timeout) = self.timers.borrow_mut().remove(&id.0) {
            timeout.cancel();
        }
    }
}

/// Plugin that parks the outcome handle for the host page: JS resolves each
/// spin through [`WasmFramework::complete_spin`].
struct BridgeGame {
    slot: Rc<RefCell<Option<SpinContext>>>,
}

impl GamePlugin for BridgeGame {
    fn spin(&mut self, ctx: SpinContext) -> Result<(), PluginError> {
        *self.slot.borrow_mut() = Some(ctx);
        Ok(())
    }
}

/// Framework facade exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmFramework {
    inner: Framework,
    pending_outcome: Rc<RefCell<Option<SpinContext>>>,
    on_change: Rc<RefCell<Option<js_sys::Function>>>,
}

#[wasm_bindgen]
impl WasmFramework {
    /// JS-driven game: the host resolves each spin via `complete_spin`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config_json: &str) -> Result<WasmFramework, JsValue> {
        Self::build(canvas_id, config_json, true)
    }

    /// Built-in game: spins resolve on their own with the configured odds.
    pub fn with_builtin_game(
        canvas_id: &str,
        config_json: &str,
    ) -> Result<WasmFramework, JsValue> {
        Self::build(canvas_id, config_json, false)
    }

    fn build(canvas_id: &str, config_json: &str, bridge: bool) -> Result<WasmFramework, JsValue> {
        let mut config = FrameworkConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if config.rng_seed.is_none() {
            config.rng_seed = Some(js_sys::Date::now() as u64);
        }

        let surface = CanvasSurface::from_element_id(canvas_id)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let scheduler: Rc<dyn Scheduler> = Rc::new(TimeoutScheduler::new());

        let pending_outcome: Rc<RefCell<Option<SpinContext>>> = Rc::new(RefCell::new(None));
        let plugin: Option<Box<dyn GamePlugin>> = if bridge {
            Some(Box::new(BridgeGame {
                slot: pending_outcome.clone(),
            }))
        } else {
            None
        };

        let mut inner = Framework::with_options(
            config,
            Box::new(surface),
            scheduler,
            FrameworkOptions {
                plugin,
                ..Default::default()
            },
        );

        let on_change: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));
        let hook = on_change.clone();
        inner.on_state_change(Box::new(move |state| {
            if let Some(callback) = hook.borrow().as_ref() {
                if let Ok(json) = serde_json::to_string(state) {
                    let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
                }
            }
        }));

        Ok(WasmFramework {
            inner,
            pending_outcome,
            on_change,
        })
    }

    pub fn spin(&mut self) -> Result<(), JsValue> {
        self.inner
            .spin()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Resolve the in-flight spin with a result object. Malformed JSON
    /// settles as a definite loss so the session cannot wedge.
    pub fn complete_spin(&mut self, result_json: &str) {
        let Some(ctx) = self.pending_outcome.borrow_mut().take() else {
            log::debug!("complete_spin with no spin in flight");
            return;
        };
        let result: SpinResult = serde_json::from_str(result_json).unwrap_or_else(|e| {
            log::warn!("malformed spin result: {e}; settling as loss");
            SpinResult::loss()
        });
        ctx.complete(result);
    }

    /// Current session record as JSON.
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.state())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Register a callback invoked with the state JSON after every mutation.
    pub fn set_on_state_change(&mut self, callback: js_sys::Function) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    pub fn half_bet(&mut self) {
        self.inner.half_bet();
    }

    pub fn double_bet(&mut self) {
        self.inner.double_bet();
    }

    pub fn max_bet(&mut self) {
        self.inner.max_bet();
    }

    pub fn set_bet_amount(&mut self, amount: f64) {
        self.inner.set_bet_amount(amount);
    }

    pub fn set_risk_level(&mut self, level: &str) -> Result<(), JsValue> {
        let level = RiskLevel::parse(level)
            .ok_or_else(|| JsValue::from_str(&format!("unknown risk level: {level}")))?;
        self.inner.set_risk_level(level);
        Ok(())
    }

    pub fn change_theme(&mut self, theme: &str) {
        self.inner.change_theme(theme);
    }

    pub fn switch_layout(&mut self, layout: &str) -> Result<(), JsValue> {
        let layout = Layout::parse(layout)
            .ok_or_else(|| JsValue::from_str(&format!("unknown layout: {layout}")))?;
        self.inner.switch_layout(layout);
        Ok(())
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.inner.toggle_sound()
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.inner.set_auto_play(enabled);
    }

    /// Shallow state merge from a JSON patch object.
    pub fn update_state(&mut self, patch_json: &str) -> Result<(), JsValue> {
        let patch: StatePatch = serde_json::from_str(patch_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid patch: {e}")))?;
        self.inner.update_state(patch);
        Ok(())
    }

    pub fn spin_button_label(&self) -> String {
        self.inner.state().spin_button_label().to_string()
    }

    pub fn potential_win(&self) -> f64 {
        self.inner.potential_win()
    }

    pub fn redraw(&self) {
        self.inner.redraw();
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }
}
