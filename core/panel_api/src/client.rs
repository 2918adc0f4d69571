use std::time::Duration;

use reqwest::{
    Url,
    blocking::{Client, RequestBuilder, Response, multipart},
};
use serde::de::DeserializeOwned;

use crate::{
    ItemId,
    model::{Event, EventDraft, Library, PanicReceipt, Song, SongDraft},
    validate::ValidationError,
};

/// Placeholder file part sent when an edited song keeps its audio.
pub const UNCHANGED_FILE_NAME: &str = "no_change.txt";
/// Name every panic recording is uploaded under.
pub const PANIC_FILE_NAME: &str = "panic_message.mp3";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad url: {0}")]
    Url(String),
}

impl ApiError {
    /// The host's `{"error": ...}` message, when the reply carried one.
    pub fn server_message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value.get("error")?.as_str().map(str::to_owned)
    }
}

/// Blocking client for one appliance. Every call is a single attempt.
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: Client,
    base: Url,
}

impl PanelClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(server_url).map_err(|err| ApiError::Url(err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves a path or url against the server root.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::Url(err.to_string()))
    }

    pub fn fetch_library(&self) -> Result<Library, ApiError> {
        let url = self.endpoint("api/data")?;
        log::debug!("GET {url}");
        Self::send_json(self.http.get(url))
    }

    /// Creates the song, or updates it when the draft has an id.
    pub fn save_song(&self, draft: &SongDraft) -> Result<Song, ApiError> {
        draft.validate()?;

        let file = match &draft.audio {
            Some(audio) => multipart::Part::bytes(audio.bytes.clone())
                .file_name(audio.filename.clone())
                .mime_str(&audio.mime)?,
            None => multipart::Part::bytes(Vec::new())
                .file_name(UNCHANGED_FILE_NAME)
                .mime_str("application/octet-stream")?,
        };
        let form = multipart::Form::new()
            .text("metadata", draft.metadata_json()?)
            .part("file", file);

        let url = self.endpoint("api/songs")?;
        log::info!("saving song '{}' to {url}", draft.name.trim());
        Self::send_json(self.http.post(url).multipart(form))
    }

    pub fn delete_song(&self, id: &ItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/song/{id}"))?;
        log::info!("DELETE {url}");
        Self::send(self.http.delete(url)).map(drop)
    }

    pub fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        let record = draft.validate()?;
        let url = self.endpoint("api/event")?;
        log::info!("creating event '{}'", record.name);
        Self::send_json(self.http.post(url).json(&record))
    }

    pub fn update_event(&self, id: &ItemId, draft: &EventDraft) -> Result<Event, ApiError> {
        let mut record = draft.validate()?;
        record.id = Some(id.clone());
        let url = self.endpoint(&format!("api/event/{id}"))?;
        log::info!("updating event {id}");
        Self::send_json(self.http.put(url).json(&record))
    }

    pub fn delete_event(&self, id: &ItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/event/{id}"))?;
        log::info!("DELETE {url}");
        Self::send(self.http.delete(url)).map(drop)
    }

    /// Hands a recorded message to the appliance, which plays it on its next poll.
    pub fn send_panic(&self, recording: Vec<u8>) -> Result<PanicReceipt, ApiError> {
        let file = multipart::Part::bytes(recording)
            .file_name(PANIC_FILE_NAME)
            .mime_str("audio/mpeg")?;
        let form = multipart::Form::new().part("file", file);
        let url = self.endpoint("api/panic")?;
        log::warn!("dispatching panic recording to {url}");
        Self::send_json(self.http.post(url).multipart(form))
    }

    /// Downloads a song's audio. Relative urls resolve against the server root.
    pub fn fetch_audio(&self, song_url: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(song_url)?;
        log::debug!("GET {url}");
        let bytes = Self::send(self.http.get(url))?.bytes()?;
        Ok(bytes.to_vec())
    }

    fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        log::error!("server answered {status}: {body}");
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send(request)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
