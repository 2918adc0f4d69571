#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("song name is empty")]
    EmptySongName,

    #[error("clip end ({end:.2}) must be after clip start ({start:.2})")]
    ClipOrder { start: f64, end: f64 },

    #[error("a new song requires an audio file")]
    MissingFile,

    #[error("event name must be at least 2 characters")]
    EventNameTooShort,

    #[error("event time '{0}' must be HH:MM")]
    BadTime(String),

    #[error("event day is required")]
    MissingDay,

    #[error("unknown event day '{0}'")]
    UnknownDay(String),

    #[error("event song is required")]
    MissingSong,
}

pub(crate) const MIN_EVENT_NAME_CHARS: usize = 2;
