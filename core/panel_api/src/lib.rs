//! Client side of the appliance's persistence API.

pub mod client;
pub mod id;
pub mod model;
pub mod validate;

pub use client::{ApiError, PanelClient};
pub use id::ItemId;
pub use model::{
    AudioUpload, Event, EventDraft, EventRecord, Library, MISSING_SONG, PanicReceipt, Song,
    SongDraft,
};
pub use validate::ValidationError;
