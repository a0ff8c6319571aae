// Drawing surface abstraction. The framework draws through this trait only;
// concrete adapters wrap a 2D canvas context or an enhanced backend.

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::types::ColorPair;

/// Direction of a two-stop gradient fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientAxis {
    Vertical,
    Horizontal,
}

/// Horizontal anchor for drawn text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Style for a text draw call. Font strings use the CSS shorthand the
/// canvas context understands.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font: String,
    pub color: String,
    pub align: TextAlign,
}

impl TextStyle {
    /// Large centered text for titles and win/loss overlays.
    pub fn heading() -> Self {
        TextStyle {
            font: "bold 32px sans-serif".to_string(),
            color: "#ffffff".to_string(),
            align: TextAlign::Center,
        }
    }

    /// Small left-anchored text for labels and debug readouts.
    pub fn label() -> Self {
        TextStyle {
            font: "12px monospace".to_string(),
            color: "#cccccc".to_string(),
            align: TextAlign::Left,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }
}

/// Style for a line draw call.
#[derive(Debug, Clone)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            color: "rgba(255,255,255,0.15)".to_string(),
            width: 1.0,
        }
    }
}

/// A 2D drawing target. The primary adapter is always available; a
/// secondary adapter may fail at any call, which the dispatcher treats as
/// a signal to fall back.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;
    fn clear(&mut self) -> Result<(), SurfaceError>;
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str)
        -> Result<(), SurfaceError>;
    fn fill_gradient(&mut self, colors: &ColorPair, axis: GradientAxis)
        -> Result<(), SurfaceError>;
    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle)
        -> Result<(), SurfaceError>;
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle)
        -> Result<(), SurfaceError>;
}

/// One recorded draw call. See [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Resize { width: u32, height: u32 },
    FillRect { x: f64, y: f64, w: f64, h: f64, color: String },
    FillGradient { colors: ColorPair, axis: GradientAxis },
    Text { content: String, x: f64, y: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

/// Headless surface that records draw calls instead of rasterizing them.
/// Used by the test suite and by hosts that want to inspect frames.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        RecordingSurface {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize { width, height });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Clear);
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
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
        Ok(())
    }

    fn fill_gradient(
        &mut self,
        colors: &ColorPair,
        axis: GradientAxis,
    ) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::FillGradient {
            colors: colors.clone(),
            axis,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        _style: &TextStyle,
    ) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Text {
            content: text.to_string(),
            x,
            y,
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        _style: &LineStyle,
    ) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Line { x1, y1, x2, y2 });
        Ok(())
    }
}

// Test builds draw through a shared handle so assertions can read the log
// after the dispatcher has consumed the surface.
#[cfg(test)]
impl DrawSurface for std::rc::Rc<std::cell::RefCell<RecordingSurface>> {
    fn size(&self) -> (u32, u32) {
        self.borrow().size()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.borrow_mut().resize(width, height)
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.borrow_mut().clear()
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: &str,
    ) -> Result<(), SurfaceError> {
        self.borrow_mut().fill_rect(x, y, w, h, color)
    }

    fn fill_gradient(
        &mut self,
        colors: &ColorPair,
        axis: GradientAxis,
    ) -> Result<(), SurfaceError> {
        self.borrow_mut().fill_gradient(colors, axis)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        style: &TextStyle,
    ) -> Result<(), SurfaceError> {
        self.borrow_mut().draw_text(text, x, y, style)
    }

    fn draw_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: &LineStyle,
    ) -> Result<(), SurfaceError> {
        self.borrow_mut().draw_line(x1, y1, x2, y2, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_surface_logs_calls_in_order() {
        let mut surface = RecordingSurface::new(300, 150);
        surface.clear().unwrap();
        surface
            .fill_rect(0.0, 0.0, 10.0, 10.0, "#ff0000")
            .unwrap();
        surface
            .draw_text("hello", 5.0, 5.0, &TextStyle::label())
            .unwrap();

        let commands = surface.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], DrawCommand::Clear);
        assert!(matches!(&commands[2], DrawCommand::Text { content, .. } if content == "hello"));
    }

    #[test]
    fn resize_updates_reported_size() {
        let mut surface = RecordingSurface::new(300, 150);
        surface.resize(430, 780).unwrap();
        assert_eq!(surface.size(), (430, 780));
    }
}
