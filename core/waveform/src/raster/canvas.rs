use std::path::Path;

use tiny_skia::{BlendMode, Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::raster::{RenderTarget, Rgba};

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas size {0}x{1} is not drawable")]
    InvalidSize(u32, u32),

    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// CPU raster backed by a tiny-skia pixmap.
///
/// Nothing is anti-aliased: a 1px bar at an integer column covers exactly
/// that column, and a 2px marker centred on `x` covers columns `x-1` and `x`.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        let pixmap = Pixmap::new(width, height).ok_or(CanvasError::InvalidSize(width, height))?;
        Ok(Self { pixmap })
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Color at a pixel, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba {
                r: c.red(),
                g: c.green(),
                b: c.blue(),
                a: c.alpha(),
            }
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, CanvasError> {
        self.pixmap
            .encode_png()
            .map_err(|e| CanvasError::Encode(e.to_string()))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), CanvasError> {
        self.pixmap
            .save_png(path)
            .map_err(|e| CanvasError::Encode(e.to_string()))
    }

    fn solid(color: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(color.r, color.g, color.b, color.a));
        paint.anti_alias = false;
        paint
    }
}

impl RenderTarget for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Self::solid(Rgba::rgb(0, 0, 0));
        paint.blend_mode = BlendMode::Clear;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &Self::solid(color), Transform::identity(), None);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::solid(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod canvas_tests {
    use super::*;

    const BLUE: Rgba = Rgba::rgb(0, 0, 255);

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(CanvasError::InvalidSize(0, 10))
        ));
    }

    #[test]
    fn fill_rect_covers_exact_pixels() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.fill_rect(1.0, 2.0, 1.0, 1.0, BLUE);

        assert_eq!(canvas.pixel(1, 2), Some(BLUE));
        assert_eq!(canvas.pixel(0, 2).map(|p| p.a), Some(0));
        assert_eq!(canvas.pixel(1, 1).map(|p| p.a), Some(0));
        assert_eq!(canvas.pixel(2, 2).map(|p| p.a), Some(0));
    }

    #[test]
    fn clear_rect_erases_region() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, BLUE);
        canvas.clear_rect(0.0, 0.0, 4.0, 4.0);

        assert!(canvas.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn vertical_line_paints_column() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.stroke_line((5.0, 0.0), (5.0, 10.0), 2.0, BLUE);

        assert_eq!(canvas.pixel(4, 5).map(|p| p.b), Some(255));
        assert_eq!(canvas.pixel(5, 5).map(|p| p.b), Some(255));
        assert_eq!(canvas.pixel(8, 5).map(|p| p.a), Some(0));
    }

    #[test]
    fn stroke_is_not_antialiased() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.stroke_line((5.0, 0.0), (5.0, 10.0), 2.0, BLUE);

        for y in [1, 5, 8] {
            assert_eq!(canvas.pixel(4, y), Some(BLUE));
            assert_eq!(canvas.pixel(5, y), Some(BLUE));
            assert_eq!(canvas.pixel(3, y).map(|p| p.a), Some(0));
            assert_eq!(canvas.pixel(6, y).map(|p| p.a), Some(0));
        }
    }

    #[test]
    fn png_encoding_produces_signature() {
        let canvas = Canvas::new(2, 2).unwrap();
        let png = canvas.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
