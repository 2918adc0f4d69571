use schedule::{Scheduled, TimeOfDay, Weekday, WeeklySlot, sort_weekly};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    ItemId,
    validate::{MIN_EVENT_NAME_CHARS, ValidationError},
};

/// Shown in place of a song an event refers to but the library no longer has.
pub const MISSING_SONG: &str = "missing song";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub clip_start: f64,
    #[serde(default)]
    pub clip_end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Where the host serves the audio, usually relative to the server root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: ItemId,
    pub name: String,
    pub time: TimeOfDay,
    pub day: Weekday,
    pub song_id: ItemId,
}

impl Scheduled for Event {
    fn slot(&self) -> WeeklySlot {
        WeeklySlot::new(self.day, self.time)
    }
}

/// Everything `GET /api/data` returns.
///
/// The host stores whatever it was sent, so records that don't parse are
/// skipped with a warning and counted in `skipped`; the rest still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLibrary")]
pub struct Library {
    pub songs: Vec<Song>,
    pub events: Vec<Event>,
    #[serde(skip)]
    pub skipped: usize,
}

#[derive(Deserialize)]
struct RawLibrary {
    #[serde(default)]
    songs: Vec<serde_json::Value>,
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

impl From<RawLibrary> for Library {
    fn from(raw: RawLibrary) -> Self {
        let mut skipped = 0;
        let songs = readable(raw.songs, "song", &mut skipped);
        let events = readable(raw.events, "event", &mut skipped);
        Self {
            songs,
            events,
            skipped,
        }
    }
}

fn readable<T: DeserializeOwned>(
    records: Vec<serde_json::Value>,
    kind: &str,
    skipped: &mut usize,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("id").map(ToString::to_string).unwrap_or_default();
            serde_json::from_value(record)
                .inspect_err(|e| {
                    log::warn!("skipping unreadable {kind} {id}: {e}");
                    *skipped += 1;
                })
                .ok()
        })
        .collect()
}

impl Library {
    pub fn find_song(&self, id: &ItemId) -> Option<&Song> {
        self.songs.iter().find(|song| &song.id == id)
    }

    pub fn find_event(&self, id: &ItemId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    /// Events in week order, Sunday first, then by time.
    pub fn events_by_schedule(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        sort_weekly(&mut events);
        events
    }

    pub fn song_label(&self, id: &ItemId) -> &str {
        self.find_song(id).map_or(MISSING_SONG, |song| song.name.as_str())
    }

    pub fn events_due(&self, slot: WeeklySlot) -> Vec<&Event> {
        schedule::due_at(&self.events, slot)
    }
}

/// An audio file ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

impl AudioUpload {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let mime = mime_for(&filename).to_owned();
        Self {
            bytes,
            filename,
            mime,
        }
    }
}

fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "mp4" | "aac" => "audio/mp4",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Song form contents. `id` is set when editing an existing song.
#[derive(Debug, Clone, PartialEq)]
pub struct SongDraft {
    pub id: Option<ItemId>,
    pub name: String,
    pub clip_start: f64,
    pub clip_end: f64,
    pub audio: Option<AudioUpload>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SongMetadata<'a> {
    name: &'a str,
    clip_start: f64,
    clip_end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a ItemId>,
}

impl SongDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptySongName);
        }
        if self.clip_end <= self.clip_start {
            return Err(ValidationError::ClipOrder {
                start: self.clip_start,
                end: self.clip_end,
            });
        }
        if self.id.is_none() && self.audio.is_none() {
            return Err(ValidationError::MissingFile);
        }
        Ok(())
    }

    /// The `metadata` part of the upload.
    pub fn metadata_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&SongMetadata {
            name: self.name.trim(),
            clip_start: self.clip_start,
            clip_end: self.clip_end,
            id: self.id.as_ref(),
        })
    }
}

/// Event form contents as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub time: String,
    pub day: Option<String>,
    pub song_id: Option<ItemId>,
}

/// A validated event, as sent in create and update bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub name: String,
    pub time: TimeOfDay,
    pub day: Weekday,
    pub song_id: ItemId,
}

impl EventDraft {
    /// Checks the form in field order and returns the first problem.
    pub fn validate(&self) -> Result<EventRecord, ValidationError> {
        let name = self.name.trim();
        if name.chars().count() < MIN_EVENT_NAME_CHARS {
            return Err(ValidationError::EventNameTooShort);
        }

        let time = self
            .time
            .parse::<TimeOfDay>()
            .map_err(|_| ValidationError::BadTime(self.time.clone()))?;

        let day = match self.day.as_deref().map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingDay),
            Some(raw) => raw
                .parse::<Weekday>()
                .map_err(|_| ValidationError::UnknownDay(raw.to_owned()))?,
        };

        let song_id = self
            .song_id
            .clone()
            .filter(|id| !id.as_str().is_empty())
            .ok_or(ValidationError::MissingSong)?;

        Ok(EventRecord {
            id: None,
            name: name.to_owned(),
            time,
            day,
            song_id,
        })
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            time: event.time.to_string(),
            day: Some(event.day.wire_name().to_owned()),
            song_id: Some(event.song_id.clone()),
        }
    }
}

/// Reply to a panic dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PanicReceipt {
    pub message: String,
    pub filename: String,
}
