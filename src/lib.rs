// spinlab: browser prototyping scaffold for casino-style spin games.
// The session state machine and render dispatch live here in pure Rust;
// game content and DOM wiring stay on the host side of the plugin contract.

mod backend;
mod dispatch;
mod engine;
mod error;
mod framework;
mod plugin;
mod schedule;
mod state;
mod surface;
mod types;

#[cfg(target_arch = "wasm32")]
mod web;

use wasm_bindgen::prelude::*;

pub use backend::{BackendProbe, BackendStrategy};
pub use dispatch::RenderDispatcher;
pub use error::{BackendError, FrameworkError, PluginError, SurfaceError};
pub use framework::{Framework, FrameworkOptions};
pub use plugin::{BuiltinGame, GamePlugin, SpinContext};
pub use schedule::{ManualScheduler, Scheduler, TimerId};
pub use state::SessionStore;
pub use surface::{
    DrawCommand, DrawSurface, GradientAxis, LineStyle, RecordingSurface, TextAlign, TextStyle,
};
pub use types::{
    CanvasSize, CanvasSizes, ColorPair, FrameworkConfig, Layout, RiskLevel, RiskMultipliers,
    SessionState, SpinResult, StatePatch,
};

#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, TimeoutScheduler, WasmFramework};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
