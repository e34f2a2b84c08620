use crate::render::{Color, Rect, Surface};
use anyhow::{Result, anyhow};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use std::fmt;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Glyphs are 8x8 cells drawn at twice their size.
const GLYPH_CELLS: u32 = 8;
const GLYPH_SCALE: f32 = 2.0;

/// An in-memory RGBA raster implementing [`Surface`], backed by a `tiny-skia` pixmap.
///
/// Shapes are drawn without anti-aliasing so frames are pixel-exact. Text uses the
/// `font8x8` bitmap font; characters outside it are skipped but keep their advance.
#[derive(Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    // a zero-sized canvas has no pixmap
    pixmap: Option<Pixmap>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let px = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some(Color::rgba(px.red(), px.green(), px.blue(), px.alpha()))
    }

    /// Every pixel, row by row.
    pub fn pixels(&self) -> Vec<Color> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter_map(|(x, y)| self.pixel(x, y))
            .collect()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let pixmap = self
            .pixmap
            .as_ref()
            .ok_or_else(|| anyhow!("Cannot encode an empty {}x{} canvas", self.width, self.height))?;

        Ok(pixmap.encode_png()?)
    }

    fn paint(color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = false;
        paint
    }

    fn skia_rect(x: f64, y: f64, width: f64, height: f64) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(x as f32, y as f32, width as f32, height as f32)
    }
}

impl PartialEq for PixelCanvas {
    fn eq(&self, other: &Self) -> bool {
        (self.width, self.height) == (other.width, other.height)
            && self.pixmap.as_ref().map(Pixmap::data) == other.pixmap.as_ref().map(Pixmap::data)
    }
}

impl fmt::Debug for PixelCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            *self = PixelCanvas::new(width, height);
        }
    }

    fn clear(&mut self, color: Color) {
        let (width, height) = (self.width as f64, self.height as f64);
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::BLACK);
        }
        self.fill_rect(Rect::new(0.0, 0.0, width, height), color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(rect) = Self::skia_rect(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };

        pixmap.fill_rect(rect, &Self::paint(color), Transform::identity(), None);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        // centre the 1px stroke on the inner pixel row/column
        let Some(inner) = Self::skia_rect(rect.x + 0.5, rect.y + 0.5, rect.width - 1.0, rect.height - 1.0)
        else {
            self.fill_rect(rect, color);
            return;
        };
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        let path = PathBuilder::from_rect(inner);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &Self::paint(color), &stroke, Transform::identity(), None);
    }

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Color) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        let mut pb = PathBuilder::new();
        pb.move_to(x0 as f32, y0 as f32);
        pb.line_to(x1 as f32, y1 as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width: width.max(1.0) as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &Self::paint(color), &stroke, Transform::identity(), None);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        let advance = GLYPH_CELLS as f32 * GLYPH_SCALE;
        let left = x as f32 - text.chars().count() as f32 * advance / 2.0;
        let top = y as f32 - advance / 2.0;

        let mut pb = PathBuilder::new();
        for (i, ch) in text.chars().enumerate() {
            let Some(glyph) = BASIC_FONTS.get(ch) else {
                continue;
            };

            let origin = left + i as f32 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for col in (0..GLYPH_CELLS).filter(|col| bits & (1u8 << col) != 0) {
                    if let Some(cell) = tiny_skia::Rect::from_xywh(
                        origin + col as f32 * GLYPH_SCALE,
                        top + row as f32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                    ) {
                        pb.push_rect(cell);
                    }
                }
            }
        }

        let Some(path) = pb.finish() else {
            return;
        };
        pixmap.fill_path(&path, &Self::paint(color), FillRule::Winding, Transform::identity(), None);
    }
}
