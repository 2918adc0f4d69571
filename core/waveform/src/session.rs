use crate::{
    decode::DecodeError,
    range::{ClipRange, RangeLabels, SliderBounds},
    raster::RenderTarget,
    render::WaveformRenderer,
    samples::AudioSamples,
};

/// Whether the editor is creating a song or editing a stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { song_id: String },
}

/// What to do with a decoded buffer once it arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodePurpose {
    /// A newly picked file: select the whole song.
    FreshFile,
    /// Audio of a stored song: restore its trim points. Zero means unset.
    StoredSong { clip_start: f64, clip_end: f64 },
}

/// Handed out when a decode starts; the result is only applied if the
/// session is still on the same token when it comes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeTicket {
    token: u64,
    purpose: DecodePurpose,
}

impl DecodeTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn purpose(&self) -> DecodePurpose {
        self.purpose
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodeOutcome {
    /// The buffer was loaded and the range set to the returned value.
    Applied(ClipRange),
    /// A newer file was picked or the editor was closed meanwhile.
    Stale,
}

/// State of one song editor: decoded audio, clip range, labels.
///
/// Every operation takes the session explicitly, so reopening the editor
/// can't leak a buffer or range from a previous run.
#[derive(Debug)]
pub struct EditorSession {
    token: u64,
    mode: EditorMode,
    buffer: Option<AudioSamples>,
    range: ClipRange,
    bounds: SliderBounds,
    labels: RangeLabels,
    unit: String,
    renderer: WaveformRenderer,
}

impl EditorSession {
    pub fn new(renderer: WaveformRenderer, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            token: 0,
            mode: EditorMode::Create,
            buffer: None,
            range: ClipRange::default(),
            bounds: SliderBounds::UNLOADED,
            labels: RangeLabels::for_range(ClipRange::default(), &unit),
            unit,
            renderer,
        }
    }

    /// Resets to create mode with nothing loaded and wipes the target.
    pub fn open_new<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        self.invalidate();
        self.mode = EditorMode::Create;
        self.range = ClipRange::default();
        self.labels = RangeLabels::for_range(self.range, &self.unit);

        let (w, h) = target.size();
        target.clear_rect(0.0, 0.0, w as f32, h as f32);
    }

    /// Switches to editing a stored song. The returned ticket belongs to the
    /// decode of that song's audio.
    pub fn open_existing(
        &mut self,
        song_id: impl Into<String>,
        clip_start: f64,
        clip_end: f64,
    ) -> DecodeTicket {
        self.invalidate();
        self.mode = EditorMode::Edit {
            song_id: song_id.into(),
        };
        self.issue(DecodePurpose::StoredSong {
            clip_start,
            clip_end,
        })
    }

    /// A new file was picked. Any decode still in flight becomes stale and the
    /// slider bound returns to the unloaded default until this one lands.
    pub fn select_file(&mut self) -> DecodeTicket {
        self.invalidate();
        self.issue(DecodePurpose::FreshFile)
    }

    /// Applies a finished decode if `ticket` is still current.
    ///
    /// On failure the session is left with no buffer and the error is handed
    /// back for the caller to report.
    pub fn apply_decoded<T: RenderTarget + ?Sized>(
        &mut self,
        ticket: DecodeTicket,
        result: Result<AudioSamples, DecodeError>,
        target: &mut T,
    ) -> Result<DecodeOutcome, DecodeError> {
        if ticket.token != self.token {
            log::debug!(
                "dropping decode result for token {} (current {})",
                ticket.token,
                self.token
            );
            return Ok(DecodeOutcome::Stale);
        }

        let samples = match result {
            Ok(samples) => samples,
            Err(e) => {
                log::warn!("audio decode failed: {e}");
                self.buffer = None;
                return Err(e);
            }
        };

        let duration = samples.duration();
        log::info!(
            "loaded {} samples ({duration:.2}s at {} Hz)",
            samples.len(),
            samples.sample_rate()
        );
        self.buffer = Some(samples);
        self.bounds = SliderBounds::for_duration(duration);

        let (start, end) = match ticket.purpose {
            DecodePurpose::FreshFile => (0.0, duration),
            DecodePurpose::StoredSong {
                clip_start,
                clip_end,
            } => (clip_start, if clip_end == 0.0 { duration } else { clip_end }),
        };

        Ok(DecodeOutcome::Applied(self.update_range(start, end, target)))
    }

    /// Takes new slider readings, keeps `end >= start`, refreshes the labels
    /// and repaints when audio is loaded.
    pub fn update_range<T: RenderTarget + ?Sized>(
        &mut self,
        start: f64,
        end: f64,
        target: &mut T,
    ) -> ClipRange {
        let start = self.bounds.hold(start);
        let end = self.bounds.hold(end);

        self.range = ClipRange::new(start, end);
        self.labels = RangeLabels::for_range(self.range, &self.unit);
        self.render(target);
        self.range
    }

    /// Repaints with the current range. Does nothing without audio.
    pub fn render<T: RenderTarget + ?Sized>(&self, target: &mut T) {
        if let Some(samples) = &self.buffer {
            self.renderer.render(target, samples, self.range);
        }
    }

    /// Drops the buffer and invalidates pending decodes.
    pub fn close(&mut self) {
        self.invalidate();
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn range(&self) -> ClipRange {
        self.range
    }

    pub fn labels(&self) -> &RangeLabels {
        &self.labels
    }

    pub fn bounds(&self) -> SliderBounds {
        self.bounds
    }

    pub fn buffer(&self) -> Option<&AudioSamples> {
        self.buffer.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    /// Without audio the sliders fall back to the unloaded bound.
    fn invalidate(&mut self) {
        self.token += 1;
        self.buffer = None;
        self.bounds = SliderBounds::UNLOADED;
    }

    fn issue(&self, purpose: DecodePurpose) -> DecodeTicket {
        DecodeTicket {
            token: self.token,
            purpose,
        }
    }
}
