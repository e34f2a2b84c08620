mod canvas;
mod color;
mod renderer;

pub use canvas::*;
pub use color::*;
pub use renderer::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if any part of the rectangle (edges included) touches a `width` x `height` viewport.
    pub fn touches_viewport(&self, width: f64, height: f64) -> bool {
        self.right() >= 0.0 && self.x <= width && self.bottom() >= 0.0 && self.y <= height
    }
}

/// A 2D drawing target the piano-roll paints onto, sized to its container.
pub trait Surface {
    /// Pixel dimensions as `(width, height)`.
    fn size(&self) -> (u32, u32);

    fn set_size(&mut self, width: u32, height: u32);

    /// Paints the whole surface with `color`, discarding everything drawn before.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draws a 1px border just inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color);

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Color);

    /// Draws `text` centred on `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color);
}
