pub mod decode;
pub mod range;
pub mod raster;
pub mod render;
pub mod samples;
pub mod session;
pub mod worker;

pub use decode::{AnyDecoder, AudioDecoder, DecodeError};
pub use range::{ClipRange, RangeLabels, SliderBounds};
pub use raster::{Palette, RenderTarget, Rgba, canvas::Canvas};
pub use render::WaveformRenderer;
pub use samples::AudioSamples;
pub use session::{DecodeOutcome, DecodeTicket, EditorSession};
pub use worker::{DecodeDone, DecodeJob, DecodeWorker};
