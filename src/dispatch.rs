// Render dispatch. Decides which backend draws each frame and guarantees the
// frame is never left undrawn: secondary failures fall back to the primary
// within the same call, plugin render failures get the built-in fallback
// screen, and primary failures are terminal for that frame only.

use std::collections::HashMap;

use log::{debug, error};

use crate::backend::{init_secondary, BackendProbe, BackendStrategy};
use crate::error::SurfaceError;
use crate::plugin::GamePlugin;
use crate::surface::{DrawSurface, GradientAxis, LineStyle, TextAlign, TextStyle};
use crate::types::{CanvasSize, ColorPair, Layout, SessionState, SpinResult};

/// Owns the drawing surfaces and the per-frame backend decision.
pub struct RenderDispatcher {
    primary: Box<dyn DrawSurface>,
    /// Enhanced surface. `None` means unavailable or disabled by a failure;
    /// a layout switch re-runs the strategies.
    secondary: Option<Box<dyn DrawSurface>>,
    strategies: Vec<BackendStrategy>,
    probe: BackendProbe,
    theme_colors: HashMap<String, ColorPair>,
    fallback_colors: ColorPair,
    debug_grid: bool,
    title: String,
}

impl RenderDispatcher {
    pub fn new(
        primary: Box<dyn DrawSurface>,
        strategies: Vec<BackendStrategy>,
        probe: BackendProbe,
        theme_colors: HashMap<String, ColorPair>,
        debug_grid: bool,
        title: String,
    ) -> Self {
        let secondary = init_secondary(&strategies, &probe);
        RenderDispatcher {
            primary,
            secondary,
            strategies,
            probe,
            theme_colors,
            fallback_colors: ColorPair::new("#0b132b", "#1c2541"),
            debug_grid,
            title,
        }
    }

    pub fn secondary_active(&self) -> bool {
        self.secondary.is_some()
    }

    fn colors_for(&self, theme: &str) -> ColorPair {
        self.theme_colors
            .get(theme)
            .unwrap_or(&self.fallback_colors)
            .clone()
    }

    /// Draw one full frame of the current state.
    pub fn draw_frame(&mut self, state: &SessionState, plugin: &mut dyn GamePlugin) {
        let colors = self.colors_for(&state.theme);

        let mut secondary_failed = false;
        if let Some(secondary) = self.secondary.as_mut() {
            match Self::frame_sequence(
                secondary.as_mut(),
                state,
                plugin,
                &colors,
                self.debug_grid,
                &self.title,
            ) {
                Ok(()) => return,
                Err(e) => {
                    error!("secondary backend draw failed: {e}; falling back to primary");
                    secondary_failed = true;
                }
            }
        }
        if secondary_failed {
            self.teardown_secondary();
        }

        if let Err(e) = Self::frame_sequence(
            self.primary.as_mut(),
            state,
            plugin,
            &colors,
            self.debug_grid,
            &self.title,
        ) {
            error!("frame not drawn: {e}");
        }
    }

    /// Redraw the frame, then let the plugin overlay its win visual.
    pub fn draw_win(
        &mut self,
        plugin: &mut dyn GamePlugin,
        win_amount: f64,
        result: &SpinResult,
        state: &SessionState,
    ) {
        self.draw_frame(state, plugin);
        let surface = self.active_surface();
        let (w, h) = surface.size();
        if let Err(e) = plugin.handle_win(surface, w as f64, h as f64, win_amount, result) {
            error!("handle_win failed: {e}");
        }
    }

    /// Redraw the frame, then let the plugin overlay its loss visual.
    pub fn draw_loss(
        &mut self,
        plugin: &mut dyn GamePlugin,
        result: &SpinResult,
        state: &SessionState,
    ) {
        self.draw_frame(state, plugin);
        let surface = self.active_surface();
        let (w, h) = surface.size();
        if let Err(e) = plugin.handle_loss(surface, w as f64, h as f64, result) {
            error!("handle_loss failed: {e}");
        }
    }

    /// Resize for a layout switch. The secondary backend is released first
    /// and the construction strategies are attempted again for the new
    /// surface, so a previously failed backend gets one more chance.
    pub fn resize(&mut self, size: CanvasSize) {
        self.teardown_secondary();
        if let Err(e) = self.primary.resize(size.width, size.height) {
            error!("primary surface resize failed: {e}");
        }
        self.secondary = init_secondary(&self.strategies, &self.probe);
        if let Some(secondary) = self.secondary.as_mut() {
            if let Err(e) = secondary.resize(size.width, size.height) {
                error!("secondary surface resize failed: {e}; disabling");
                self.secondary = None;
            }
        }
    }

    /// Release the secondary backend. Adapter teardown runs on drop.
    pub fn teardown_secondary(&mut self) {
        if self.secondary.take().is_some() {
            debug!("secondary backend released");
        }
    }

    fn active_surface(&mut self) -> &mut dyn DrawSurface {
        match self.secondary.as_mut() {
            Some(surface) => surface.as_mut(),
            None => self.primary.as_mut(),
        }
    }

    fn frame_sequence(
        surface: &mut dyn DrawSurface,
        state: &SessionState,
        plugin: &mut dyn GamePlugin,
        colors: &ColorPair,
        debug_grid: bool,
        title: &str,
    ) -> Result<(), SurfaceError> {
        let (w, h) = surface.size();
        let (width, height) = (w as f64, h as f64);

        surface.clear()?;
        let axis = match state.layout {
            Layout::Pc => GradientAxis::Vertical,
            Layout::Mobile => GradientAxis::Horizontal,
        };
        surface.fill_gradient(colors, axis)?;

        if debug_grid {
            Self::draw_grid(surface, width, height)?;
        }

        if let Err(e) = plugin.render_game(surface, width, height, state) {
            error!("plugin render_game failed: {e}; drawing fallback screen");
            Self::draw_fallback_screen(surface, width, height, title)?;
        }
        Ok(())
    }

    /// Debug reference grid. Spacing starts at 100 px and widens once more
    /// than 30 vertical lines would fit; the center crosshair is always
    /// drawn, plus a size label.
    fn draw_grid(
        surface: &mut dyn DrawSurface,
        width: f64,
        height: f64,
    ) -> Result<(), SurfaceError> {
        let mut spacing = 100.0;
        if width / 100.0 > 30.0 {
            spacing = (width / 30.0 / 100.0).ceil() * 100.0;
        }

        let grid_style = LineStyle::default();
        let mut x = spacing;
        while x < width {
            surface.draw_line(x, 0.0, x, height, &grid_style)?;
            x += spacing;
        }
        let mut y = spacing;
        while y < height {
            surface.draw_line(0.0, y, width, y, &grid_style)?;
            y += spacing;
        }

        let (cx, cy) = (width / 2.0, height / 2.0);
        let cross_style = LineStyle {
            color: "rgba(255,80,80,0.6)".to_string(),
            width: 2.0,
        };
        surface.draw_line(cx - 50.0, cy, cx + 50.0, cy, &cross_style)?;
        surface.draw_line(cx, cy - 50.0, cx, cy + 50.0, &cross_style)?;

        surface.draw_text(
            &format!("{}x{}", width as u32, height as u32),
            8.0,
            16.0,
            &TextStyle::label(),
        )?;
        Ok(())
    }

    fn draw_fallback_screen(
        surface: &mut dyn DrawSurface,
        width: f64,
        height: f64,
        title: &str,
    ) -> Result<(), SurfaceError> {
        surface.draw_text(title, width / 2.0, height * 0.42, &TextStyle::heading())?;
        let message_style = TextStyle {
            font: "16px sans-serif".to_string(),
            color: "#cccccc".to_string(),
            align: TextAlign::Center,
        };
        surface.draw_text(
            "Initializing...",
            width / 2.0,
            height * 0.55,
            &message_style,
        )?;
        Ok(())
    }
}
