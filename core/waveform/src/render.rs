use crate::{
    range::ClipRange,
    raster::{Palette, RenderTarget},
    samples::AudioSamples,
};

/// Stroke width of the clip boundary markers.
pub const MARKER_WIDTH: f32 = 2.0;

/// Min/max amplitude folded into one pixel column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnExtent {
    pub min: f32,
    pub max: f32,
}

/// Number of samples folded into each of `width` columns. Rounds up so the
/// last column reaches the end of the buffer.
pub fn samples_per_column(sample_count: usize, width: u32) -> usize {
    if width == 0 {
        return 0;
    }
    sample_count.div_ceil(width as usize)
}

/// Scans `step` samples per column. Indices past the end are absent, so a
/// column with no data keeps its initial `min = 1.0, max = -1.0`.
pub fn column_extents(samples: &[f32], width: u32) -> Vec<ColumnExtent> {
    let step = samples_per_column(samples.len(), width);

    (0..width as usize)
        .map(|column| {
            let from = (column * step).min(samples.len());
            let to = (column * step + step).min(samples.len());
            samples[from..to].iter().fold(
                ColumnExtent {
                    min: 1.0,
                    max: -1.0,
                },
                |acc, &datum| ColumnExtent {
                    min: if datum < acc.min { datum } else { acc.min },
                    max: if datum > acc.max { datum } else { acc.max },
                },
            )
        })
        .collect()
}

/// Draws bar-style waveforms with start/end clip markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformRenderer {
    palette: Palette,
}

impl WaveformRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Clears `target` and paints one bar per pixel column, then the two
    /// clip markers on top. The caller keeps `range` inside the buffer.
    pub fn render<T: RenderTarget + ?Sized>(
        &self,
        target: &mut T,
        samples: &AudioSamples,
        range: ClipRange,
    ) {
        let (width, height) = target.size();
        let (w, h) = (width as f32, height as f32);
        let amp = h / 2.0;

        target.clear_rect(0.0, 0.0, w, h);

        for (i, extent) in column_extents(samples.samples(), width)
            .into_iter()
            .enumerate()
        {
            let top = (1.0 + extent.min) * amp;
            let bar_height = ((extent.max - extent.min) * amp).max(1.0);
            target.fill_rect(i as f32, top, 1.0, bar_height, self.palette.bars);
        }

        let duration = samples.duration();
        if duration <= 0.0 {
            return;
        }

        let start_x = (range.start / duration * f64::from(width)) as f32;
        let end_x = (range.end / duration * f64::from(width)) as f32;

        // start goes last so it stays visible on a zero-width clip
        target.stroke_line(
            (end_x, 0.0),
            (end_x, h),
            MARKER_WIDTH,
            self.palette.end_marker,
        );
        target.stroke_line(
            (start_x, 0.0),
            (start_x, h),
            MARKER_WIDTH,
            self.palette.start_marker,
        );
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;
    use crate::raster::{
        canvas::Canvas,
        recording::{DrawOp, RecordingTarget},
    };

    fn buffer(samples: Vec<f32>, sample_rate: u32) -> AudioSamples {
        AudioSamples::from_channel(samples, sample_rate)
    }

    #[test]
    fn step_rounds_up() {
        assert_eq!(samples_per_column(10, 4), 3);
        assert_eq!(samples_per_column(8, 4), 2);
        assert_eq!(samples_per_column(3, 4), 1);
        assert_eq!(samples_per_column(0, 4), 0);
    }

    #[test]
    fn exactly_width_columns_are_drawn() {
        for (count, width) in [(10usize, 4u32), (1000, 7), (3, 8), (400, 400), (401, 400)] {
            let mut target = RecordingTarget::new(width, 100);
            let samples = buffer(vec![0.1; count], 100);
            WaveformRenderer::default().render(&mut target, &samples, ClipRange::new(0.0, 0.0));

            let fills = target.fills();
            assert_eq!(fills.len(), width as usize);
            for (i, (x, _, w, _)) in fills.iter().enumerate() {
                assert_eq!(*x, i as f32);
                assert_eq!(*w, 1.0);
            }
        }
    }

    #[test]
    fn last_column_scan_stops_at_buffer_end() {
        // 10 samples over 4 columns: step 3, last column only sees index 9
        let samples: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        let extents = column_extents(&samples, 4);

        assert_eq!(extents[3], ColumnExtent { min: 0.9, max: 0.9 });
        assert_eq!(extents[0], ColumnExtent { min: 0.0, max: 0.2 });
    }

    #[test]
    fn columns_without_data_keep_initial_extent() {
        let extents = column_extents(&[0.5, -0.5, 0.5], 4);
        assert_eq!(extents[3], ColumnExtent { min: 1.0, max: -1.0 });
    }

    #[test]
    fn four_samples_on_four_columns() {
        let mut target = RecordingTarget::new(4, 100);
        let samples = buffer(vec![0.5, -0.5, 0.8, -0.8], 4);
        WaveformRenderer::default().render(&mut target, &samples, ClipRange::new(0.0, 1.0));

        let amp = 50.0;
        let fills = target.fills();
        assert_eq!(fills[0], (0.0, 1.5 * amp, 1.0, 1.0));
        assert_eq!(fills[1], (1.0, 0.5 * amp, 1.0, 1.0));
        assert_eq!((fills[2].0, fills[2].3), (2.0, 1.0));
        assert!((fills[2].1 - 1.8 * amp).abs() < 1e-4);
        assert!((fills[3].1 - 0.2 * amp).abs() < 1e-4);
    }

    #[test]
    fn bar_height_spans_min_to_max() {
        let mut target = RecordingTarget::new(1, 100);
        let samples = buffer(vec![-0.5, 0.5], 2);
        WaveformRenderer::default().render(&mut target, &samples, ClipRange::new(0.0, 1.0));

        assert_eq!(target.fills()[0], (0.0, 25.0, 1.0, 50.0));
    }

    #[test]
    fn marker_positions_follow_duration() {
        let mut target = RecordingTarget::new(400, 100);
        let samples = buffer(vec![0.0; 100], 10);
        let palette = Palette::default();
        WaveformRenderer::new(palette).render(&mut target, &samples, ClipRange::new(2.0, 8.0));

        let lines = target.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&(80.0, palette.start_marker)));
        assert!(lines.contains(&(320.0, palette.end_marker)));
    }

    #[test]
    fn markers_are_drawn_after_bars() {
        let mut target = RecordingTarget::new(8, 10);
        let samples = buffer(vec![0.2; 8], 8);
        WaveformRenderer::default().render(&mut target, &samples, ClipRange::new(0.0, 1.0));

        assert!(matches!(target.ops.first(), Some(DrawOp::Clear { .. })));
        let first_line = target
            .ops
            .iter()
            .position(|op| matches!(op, DrawOp::Line { .. }))
            .unwrap();
        let last_fill = target
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Fill { .. }))
            .unwrap();
        assert!(first_line > last_fill);
    }

    #[test]
    fn coinciding_markers_draw_start_last() {
        let mut target = RecordingTarget::new(100, 10);
        let samples = buffer(vec![0.0; 10], 10);
        let palette = Palette::default();
        WaveformRenderer::new(palette).render(&mut target, &samples, ClipRange::new(0.5, 0.5));

        let lines = target.lines();
        assert_eq!(lines, vec![(50.0, palette.end_marker), (50.0, palette.start_marker)]);
    }

    #[test]
    fn zero_duration_skips_markers() {
        let mut target = RecordingTarget::new(16, 10);
        let samples = buffer(Vec::new(), 44100);
        WaveformRenderer::default().render(&mut target, &samples, ClipRange::default());

        assert!(target.lines().is_empty());
        assert_eq!(target.fills().len(), 16);
    }

    #[test]
    fn silence_still_draws_visible_bars() {
        let (width, height) = (32, 20);
        let mut canvas = Canvas::new(width, height).unwrap();
        let samples = buffer(vec![0.0; 256], 256);
        let palette = Palette::default();
        WaveformRenderer::new(palette).render(&mut canvas, &samples, ClipRange::new(0.0, 1.0));

        // markers sit on the first and last columns
        for x in 2..width - 2 {
            assert_eq!(canvas.pixel(x, height / 2), Some(palette.bars));
            assert_eq!(canvas.pixel(x, height / 2 - 1).map(|p| p.a), Some(0));
        }
    }

    #[test]
    fn rendering_twice_is_identical() {
        let samples = buffer((0..500).map(|i| ((i as f32) * 0.05).sin()).collect(), 100);
        let renderer = WaveformRenderer::default();
        let range = ClipRange::new(1.0, 3.5);

        let mut fresh = Canvas::new(120, 40).unwrap();
        renderer.render(&mut fresh, &samples, range);

        let mut reused = Canvas::new(120, 40).unwrap();
        reused.fill_rect(0.0, 0.0, 120.0, 40.0, Palette::default().end_marker);
        renderer.render(&mut reused, &samples, range);
        renderer.render(&mut reused, &samples, range);

        assert_eq!(fresh.data(), reused.data());
    }
}
