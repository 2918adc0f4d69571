use std::{path::Path, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use panel_api::Song;
use waveform::{
    AnyDecoder, Canvas, ClipRange, DecodeOutcome, DecodeTicket, DecodeWorker, EditorSession,
    RangeLabels, WaveformRenderer,
};

use crate::config::PanelConfig;

const DECODE_TIMEOUT: Duration = Duration::from_secs(30);
const QUEUE_DEPTH: usize = 4;

/// The clip editor driven from the command line: one session, one canvas and
/// a background decoder.
#[derive(Debug)]
pub struct ClipEditor {
    session: EditorSession,
    worker: DecodeWorker,
    canvas: Canvas,
}

impl ClipEditor {
    pub fn new(config: &PanelConfig) -> Result<Self> {
        let renderer = WaveformRenderer::new(config.waveform.palette());
        let mut session = EditorSession::new(renderer, config.unit_suffix.clone());
        let mut canvas = Canvas::new(config.waveform.width, config.waveform.height)
            .context("invalid waveform size")?;
        session.open_new(&mut canvas);

        let worker = DecodeWorker::spawn(AnyDecoder::new(), QUEUE_DEPTH)
            .context("failed to start decode worker")?;

        Ok(Self {
            session,
            worker,
            canvas,
        })
    }

    /// Loads a freshly picked file. The range becomes the whole song.
    pub fn load_file(&mut self, bytes: Vec<u8>) -> Result<ClipRange> {
        let ticket = self.session.select_file();
        self.decode(ticket, bytes)
    }

    /// Loads a stored song's audio and restores its trim points.
    pub fn load_song(&mut self, song: &Song, bytes: Vec<u8>) -> Result<ClipRange> {
        let ticket = self
            .session
            .open_existing(song.id.as_str(), song.clip_start, song.clip_end);
        self.decode(ticket, bytes)
    }

    /// Moves either boundary, keeping the other one.
    pub fn set_range(&mut self, start: Option<f64>, end: Option<f64>) -> ClipRange {
        let current = self.session.range();
        self.session.update_range(
            start.unwrap_or(current.start),
            end.unwrap_or(current.end),
            &mut self.canvas,
        )
    }

    pub fn labels(&self) -> &RangeLabels {
        self.session.labels()
    }

    pub fn duration(&self) -> Option<f64> {
        self.session.buffer().map(waveform::AudioSamples::duration)
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.canvas
            .save_png(path)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    fn decode(&mut self, ticket: DecodeTicket, bytes: Vec<u8>) -> Result<ClipRange> {
        if self.worker.submit(ticket, bytes).is_err() {
            bail!("decode queue is full");
        }

        loop {
            let done = self
                .worker
                .wait(DECODE_TIMEOUT)
                .ok_or_else(|| anyhow!("audio decode timed out"))?;
            match self
                .session
                .apply_decoded(done.ticket, done.result, &mut self.canvas)
                .context("failed to decode audio")?
            {
                DecodeOutcome::Applied(range) => return Ok(range),
                DecodeOutcome::Stale => {}
            }
        }
    }
}

impl Drop for ClipEditor {
    fn drop(&mut self) {
        self.session.close();
    }
}
