//! Stream indices: storage, loading at open, and growth during playback.

mod entry;
mod grow;
pub(crate) mod scanner;
mod source;

pub use entry::{
    AudioIndex, AudioIndexEntry, GrowthCursor, PlaybackCursor, ScanEnd, VideoIndex,
    VideoIndexEntry,
};
pub use source::{Idx1Base, IndexSource};

pub(crate) use grow::Stopper;
pub(crate) use source::load_index;
