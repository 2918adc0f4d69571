use std::{
    io::Write,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use chrono::Local;
use panel_api::{
    ApiError, AudioUpload, Event, EventDraft, ItemId, Library, PanelClient, Song, SongDraft,
};
use schedule::{MinuteClock, WeeklySlot};
use waveform::{ClipRange, range::format_seconds};

use crate::{config::PanelConfig, editor::ClipEditor};

/// Everything a command needs.
#[derive(Debug)]
pub struct App {
    pub config: PanelConfig,
    pub client: PanelClient,
}

/// Optional trim points given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimArgs {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TrimArgs {
    fn is_set(self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Event fields given on the command line. Unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct EventArgs {
    pub name: Option<String>,
    pub time: Option<String>,
    pub day: Option<String>,
    pub song: Option<String>,
}

impl EventArgs {
    fn apply(self, draft: &mut EventDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(time) = self.time {
            draft.time = time;
        }
        if self.day.is_some() {
            draft.day = self.day;
        }
        if let Some(song) = self.song {
            draft.song_id = Some(ItemId::new(song));
        }
    }
}

/// Where the audio for a waveform comes from.
#[derive(Debug, Clone)]
pub enum AudioSource {
    File(PathBuf),
    Song(ItemId),
}

pub fn song_line(song: &Song, unit: &str) -> String {
    format!(
        "{}  {} ({} - {})",
        song.id,
        song.name,
        format_seconds(song.clip_start, unit),
        format_seconds(song.clip_end, unit)
    )
}

pub fn event_line(event: &Event, library: &Library) -> String {
    format_event(event, library.song_label(&event.song_id))
}

fn format_event(event: &Event, song: &str) -> String {
    format!(
        "{}  {}, {}  {}  {}",
        event.id, event.day, event.time, event.name, song
    )
}

/// Confirmation for a just-saved event. Without a library to resolve the song
/// name, the raw song id is shown instead.
fn saved_event_line(event: &Event, library: Result<Library, ApiError>) -> String {
    match library {
        Ok(library) => event_line(event, &library),
        Err(e) => {
            log::warn!("could not reload library to name song {}: {e}", event.song_id);
            format_event(event, &format!("song {}", event.song_id))
        }
    }
}

pub fn write_library(out: &mut impl Write, library: &Library, unit: &str) -> Result<()> {
    writeln!(out, "Songs ({})", library.songs.len())?;
    for song in &library.songs {
        writeln!(out, "  {}", song_line(song, unit))?;
    }
    writeln!(out, "Events ({})", library.events.len())?;
    for event in library.events_by_schedule() {
        writeln!(out, "  {}", event_line(event, library))?;
    }
    if library.skipped > 0 {
        writeln!(out, "({} unreadable records skipped)", library.skipped)?;
    }
    Ok(())
}

pub fn write_due(out: &mut impl Write, library: &Library, slot: WeeklySlot) -> Result<usize> {
    let due = library.events_due(slot);
    if due.is_empty() {
        writeln!(out, "nothing due at {slot}")?;
    }
    for event in &due {
        writeln!(out, "{}", event_line(event, library))?;
    }
    Ok(due.len())
}

pub fn library(app: &App, out: &mut impl Write) -> Result<()> {
    let library = app
        .client
        .fetch_library()
        .context("failed to load library")?;
    write_library(out, &library, &app.config.unit_suffix)
}

fn read_audio(path: &Path) -> Result<AudioUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map_or_else(|| "audio".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(AudioUpload::new(bytes, filename))
}

pub fn song_add(
    app: &App,
    out: &mut impl Write,
    name: String,
    file: &Path,
    trim: TrimArgs,
) -> Result<()> {
    let audio = read_audio(file)?;
    let mut editor = ClipEditor::new(&app.config)?;
    editor.load_file(audio.bytes.clone())?;
    let range = editor.set_range(trim.start, trim.end);

    let draft = SongDraft {
        id: None,
        name,
        clip_start: range.start,
        clip_end: range.end,
        audio: Some(audio),
    };
    let song = app.client.save_song(&draft).context("failed to save song")?;
    writeln!(out, "saved {}", song_line(&song, &app.config.unit_suffix))?;
    Ok(())
}

pub fn song_edit(
    app: &App,
    out: &mut impl Write,
    id: &ItemId,
    name: Option<String>,
    file: Option<&Path>,
    trim: TrimArgs,
) -> Result<()> {
    let library = app
        .client
        .fetch_library()
        .context("failed to load library")?;
    let Some(existing) = library.find_song(id) else {
        bail!("no song with id {id}");
    };

    let audio = file.map(read_audio).transpose()?;
    let (clip_start, clip_end) = match (&audio, existing.url.as_deref()) {
        (Some(audio), _) => {
            let mut editor = ClipEditor::new(&app.config)?;
            editor.load_file(audio.bytes.clone())?;
            let range = editor.set_range(trim.start, trim.end);
            (range.start, range.end)
        }
        (None, Some(url)) if trim.is_set() => {
            let bytes = app
                .client
                .fetch_audio(url)
                .context("failed to download song audio")?;
            let mut editor = ClipEditor::new(&app.config)?;
            editor.load_song(existing, bytes)?;
            let range = editor.set_range(trim.start, trim.end);
            (range.start, range.end)
        }
        (None, _) => {
            let range = ClipRange::new(
                trim.start.unwrap_or(existing.clip_start),
                trim.end.unwrap_or(existing.clip_end),
            );
            (range.start, range.end)
        }
    };

    let draft = SongDraft {
        id: Some(existing.id.clone()),
        name: name.unwrap_or_else(|| existing.name.clone()),
        clip_start,
        clip_end,
        audio,
    };
    let song = app.client.save_song(&draft).context("failed to save song")?;
    writeln!(out, "updated {}", song_line(&song, &app.config.unit_suffix))?;
    Ok(())
}

pub fn song_rm(app: &App, out: &mut impl Write, id: &ItemId) -> Result<()> {
    app.client
        .delete_song(id)
        .with_context(|| format!("failed to delete song {id}"))?;
    writeln!(out, "deleted song {id}")?;
    Ok(())
}

pub fn event_add(app: &App, out: &mut impl Write, args: EventArgs) -> Result<()> {
    let mut draft = EventDraft::default();
    args.apply(&mut draft);
    let event = app
        .client
        .create_event(&draft)
        .context("failed to create event")?;
    let line = saved_event_line(&event, app.client.fetch_library());
    writeln!(out, "created {line}")?;
    Ok(())
}

pub fn event_edit(app: &App, out: &mut impl Write, id: &ItemId, args: EventArgs) -> Result<()> {
    let library = app
        .client
        .fetch_library()
        .context("failed to load library")?;
    let Some(existing) = library.find_event(id) else {
        bail!("no event with id {id}");
    };

    let mut draft = EventDraft::from(existing);
    args.apply(&mut draft);
    let event = app
        .client
        .update_event(id, &draft)
        .context("failed to update event")?;
    writeln!(out, "updated {}", event_line(&event, &library))?;
    Ok(())
}

pub fn event_rm(app: &App, out: &mut impl Write, id: &ItemId) -> Result<()> {
    app.client
        .delete_event(id)
        .with_context(|| format!("failed to delete event {id}"))?;
    writeln!(out, "deleted event {id}")?;
    Ok(())
}

pub fn panic(app: &App, out: &mut impl Write, file: &Path) -> Result<()> {
    let recording =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    if recording.is_empty() {
        bail!("{} is empty", file.display());
    }
    let receipt = app
        .client
        .send_panic(recording)
        .context("failed to dispatch panic recording")?;
    writeln!(out, "{} ({})", receipt.message, receipt.filename)?;
    Ok(())
}

pub fn render_waveform(
    app: &App,
    out: &mut impl Write,
    source: AudioSource,
    trim: TrimArgs,
    png: &Path,
) -> Result<()> {
    let mut editor = ClipEditor::new(&app.config)?;
    match source {
        AudioSource::File(path) => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            editor.load_file(bytes)?;
        }
        AudioSource::Song(id) => {
            let library = app
                .client
                .fetch_library()
                .context("failed to load library")?;
            let Some(song) = library.find_song(&id) else {
                bail!("no song with id {id}");
            };
            let Some(url) = song.url.as_deref() else {
                bail!("song {id} has no audio");
            };
            let bytes = app
                .client
                .fetch_audio(url)
                .context("failed to download song audio")?;
            editor.load_song(song, bytes)?;
        }
    }
    if trim.is_set() {
        editor.set_range(trim.start, trim.end);
    }
    editor.save_png(png)?;

    let labels = editor.labels();
    if let Some(duration) = editor.duration() {
        writeln!(
            out,
            "duration: {}",
            format_seconds(duration, &app.config.unit_suffix)
        )?;
    }
    writeln!(out, "start: {}", labels.start)?;
    writeln!(out, "end:   {}", labels.end)?;
    writeln!(out, "wrote {}", png.display())?;
    Ok(())
}

fn now_slot() -> WeeklySlot {
    WeeklySlot::at(Local::now().naive_local())
}

pub fn due(app: &App, out: &mut impl Write, at: Option<WeeklySlot>) -> Result<()> {
    let slot = at.unwrap_or_else(now_slot);
    let library = app
        .client
        .fetch_library()
        .context("failed to load library")?;
    write_due(out, &library, slot)?;
    Ok(())
}

/// Polls the wall clock and reports the events of every new minute. Runs
/// until interrupted; a failed library fetch is logged and skipped.
pub fn watch(app: &App, poll: Duration) -> Result<()> {
    let mut clock = MinuteClock::new();
    log::info!("watching schedule on {}", app.client.base());
    loop {
        if let Some(slot) = clock.advance(Local::now().naive_local()) {
            match app.client.fetch_library() {
                Ok(library) => {
                    for event in library.events_due(slot) {
                        log::warn!(
                            "due at {slot}: {} ({})",
                            event.name,
                            library.song_label(&event.song_id)
                        );
                    }
                }
                Err(e) => log::error!("library fetch failed at {slot}: {e}"),
            }
        }
        thread::sleep(poll);
    }
}

#[cfg(test)]
mod commands_tests {
    use super::*;

    fn library() -> Library {
        serde_json::from_str(
            r#"{
                "songs": [
                    { "id": "1", "name": "Morning", "clipStart": 0.5, "clipEnd": 4 }
                ],
                "events": [
                    { "id": "b", "name": "Recess", "time": "10:00", "day": "שני", "songId": "1" },
                    { "id": "a", "name": "Gone", "time": "09:00", "day": "ראשון", "songId": "7" }
                ]
            }"#,
        )
        .unwrap()
    }

    fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn library_listing() {
        let mut buf = Vec::new();
        write_library(&mut buf, &library(), "seconds").unwrap();
        assert_eq!(
            text(buf),
            "Songs (1)\n\
             \x20 1  Morning (0.50 seconds - 4.00 seconds)\n\
             Events (2)\n\
             \x20 a  Sunday, 09:00  Gone  missing song\n\
             \x20 b  Monday, 10:00  Recess  Morning\n"
        );
    }

    #[test]
    fn due_listing() {
        let lib = library();
        let mut buf = Vec::new();
        let count = write_due(&mut buf, &lib, "Monday 10:00".parse().unwrap()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(text(buf), "b  Monday, 10:00  Recess  Morning\n");

        let mut buf = Vec::new();
        let count = write_due(&mut buf, &lib, "Friday 10:00".parse().unwrap()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(text(buf), "nothing due at Friday 10:00\n");
    }

    #[test]
    fn listing_mentions_skipped_records() {
        let lib = Library {
            skipped: 2,
            ..Library::default()
        };
        let mut buf = Vec::new();
        write_library(&mut buf, &lib, "seconds").unwrap();
        assert_eq!(
            text(buf),
            "Songs (0)\nEvents (0)\n(2 unreadable records skipped)\n"
        );
    }

    #[test]
    fn saved_event_names_its_song() {
        let lib = library();
        let event = lib.events[0].clone();
        assert_eq!(
            saved_event_line(&event, Ok(lib)),
            "b  Monday, 10:00  Recess  Morning"
        );
    }

    #[test]
    fn saved_event_falls_back_to_song_id() {
        let lib = library();
        let failed = Err(ApiError::Status {
            status: 500,
            body: "boom".to_owned(),
        });
        assert_eq!(
            saved_event_line(&lib.events[0], failed),
            "b  Monday, 10:00  Recess  song 1"
        );
    }

    #[test]
    fn event_args_override_existing_fields() {
        let lib = library();
        let mut draft = EventDraft::from(&lib.events[0]);
        EventArgs {
            time: Some("11:15".to_owned()),
            song: Some("007".to_owned()),
            ..EventArgs::default()
        }
        .apply(&mut draft);
        let record = draft.validate().unwrap();
        assert_eq!(record.name, "Recess");
        assert_eq!(record.time.to_string(), "11:15");
        assert_eq!(record.song_id, ItemId::from(7));
    }

    #[test]
    fn reads_upload_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.mp3");
        std::fs::write(&path, [1, 2, 3]).unwrap();
        let upload = read_audio(&path).unwrap();
        assert_eq!(upload.filename, "bell.mp3");
        assert_eq!(upload.mime, "audio/mpeg");
        assert!(read_audio(&dir.path().join("missing.mp3")).is_err());
    }

    #[test]
    fn trim_args_report_when_set() {
        assert!(!TrimArgs::default().is_set());
        assert!(
            TrimArgs {
                end: Some(1.0),
                ..TrimArgs::default()
            }
            .is_set()
        );
    }
}
