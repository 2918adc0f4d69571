use crate::raster::{RenderTarget, Rgba};

/// Draw call captured by [`RecordingTarget`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    Fill {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgba,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgba,
    },
}

/// Test double that records every call instead of rasterizing.
#[derive(Debug)]
pub struct RecordingTarget {
    width: u32,
    height: u32,
    pub ops: Vec<DrawOp>,
}

impl RecordingTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn fills(&self) -> Vec<(f32, f32, f32, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                DrawOp::Fill { x, y, w, h, .. } => Some((x, y, w, h)),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(f32, Rgba)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                DrawOp::Line { from, color, .. } => Some((from.0, color)),
                _ => None,
            })
            .collect()
    }
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(DrawOp::Clear { x, y, w, h });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.ops.push(DrawOp::Fill { x, y, w, h, color });
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }
}
