use crate::core::{bounds::Bounds, geo::Size};
use serde::{Deserialize, Serialize};

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Alpha scaled by an opacity in `0.0..=1.0`.
    pub fn faded(self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }
}

/// One primitive of a frame, in screen space (y up).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A map tile image.
    Tile { name: String, bounds: Bounds },
    /// A landmark marker with its thumbnail.
    Marker {
        thumbnail: String,
        bounds: Bounds,
        thumbnail_bounds: Bounds,
        pressed: bool,
    },
    /// Solid rectangle, e.g. a popup backdrop.
    Rect { bounds: Bounds, color: Color },
    Image {
        name: String,
        bounds: Bounds,
        opacity: f64,
    },
    Text {
        lines: Vec<String>,
        font_size: f64,
        bounds: Bounds,
        color: Color,
    },
    Button {
        label: String,
        font_size: f64,
        bounds: Bounds,
        color: Color,
        pressed: bool,
    },
    /// Progress bar image clipped to `clip`.
    ProgressBar {
        image: String,
        bounds: Bounds,
        clip: Bounds,
        opacity: f64,
    },
}

/// Backend that turns draw commands into pixels.
pub trait Renderer {
    fn begin_frame(&mut self, _viewport: Size) {}

    fn draw(&mut self, command: &DrawCommand);

    fn end_frame(&mut self) {}

    /// Draws a full frame in order.
    fn render(&mut self, viewport: Size, commands: &[DrawCommand]) {
        self.begin_frame(viewport);
        for command in commands {
            self.draw(command);
        }
        self.end_frame();
    }
}

/// Renderer that only counts what it was asked to draw, for headless runs.
#[derive(Debug, Clone, Default)]
pub struct NullRenderer {
    pub frames: usize,
    pub commands: usize,
}

impl Renderer for NullRenderer {
    fn begin_frame(&mut self, _viewport: Size) {
        self.frames += 1;
    }

    fn draw(&mut self, _command: &DrawCommand) {
        self.commands += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_fading() {
        assert_eq!(Color::WHITE.faded(0.5).a, 128);
        assert_eq!(Color::BLACK.with_alpha(220).faded(0.0).a, 0);
        assert_eq!(Color::RED.faded(2.0), Color::RED);
    }

    #[test]
    fn test_render_wraps_frame() {
        let mut renderer = NullRenderer::default();
        let rect = DrawCommand::Rect {
            bounds: Bounds::from_coords(0.0, 0.0, 1.0, 1.0),
            color: Color::BLACK,
        };
        renderer.render(Size::new(10.0, 10.0), &[rect.clone(), rect]);
        assert_eq!(renderer.frames, 1);
        assert_eq!(renderer.commands, 2);
    }
}
