//! Per-stream header data, codec labels, indices and cursors.

mod audio;
mod codec;
mod video;

pub use audio::AudioStream;
pub use codec::{AudioCodec, VideoCodec};
pub use video::{PaletteEntry, VideoStream};
