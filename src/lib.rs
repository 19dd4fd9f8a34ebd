//! Demultiplex AVI files: parse RIFF/AVI headers, build or load the
//! stream indices, and emit interleaved audio and video chunks with
//! presentation timestamps. Does not and will not decode audio or video.
//!
//! Supports legacy `idx1` indices (absolute or `movi` relative offsets),
//! OpenDML super indices, files with no usable index (the index is then
//! built on the fly, also for files still being written), and forward-only
//! input such as pipes.
//!
//! ```rs
//! use aviiter::{Avi, Buffer, DemuxStatus, Host, SeekableInput};
//! use std::path::Path;
//!
//! struct Printer;
//!
//! impl Host for Printer {
//!     fn put_video(&mut self, buf: Buffer) {
//!         println!("video {:>8} {} bytes", buf.pts, buf.data.len())
//!     }
//!     fn put_audio(&mut self, buf: Buffer) {
//!         println!("audio {:>8} {} bytes", buf.pts, buf.data.len())
//!     }
//!     fn new_pts(&mut self, pts: i64, _seek: bool) {
//!         println!("new pts {pts}")
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = SeekableInput::open(Path::new("VIDEO.AVI"), None)?;
//!     let mut avi = Avi::open(input)?;
//!     let mut host = Printer;
//!
//!     println!("{:?}", avi.duration());
//!
//!     avi.send_headers(&mut host);
//!     // Jump to the middle of the file.
//!     avi.seek(&mut host, 32768, 0, false);
//!     while avi.send_chunk(&mut host) == DemuxStatus::Ok {}
//!
//!     Ok(())
//! }
//! ```

pub mod avi;
pub mod chunk;
pub mod chunk_types;
pub mod config;
pub mod consts;
pub mod demux;
pub mod errors;
pub mod fourcc;
pub mod host;
pub mod index;
pub mod input;
pub mod seek;
pub mod stream;
pub mod timestamp;

pub(crate) mod header;
pub(crate) mod reader;
pub(crate) mod support;

#[cfg(test)]
mod tests;

pub use avi::Avi;
pub use chunk::ChunkHeader;
pub use config::AviOptions;
pub use demux::DemuxStatus;
pub use errors::AviError;
pub use fourcc::FourCC;
pub use host::{Buffer, BufferFlags, BufferInfo, Host, StreamId, StreamInfo};
pub use index::{
    AudioIndexEntry,
    GrowthCursor,
    Idx1Base,
    IndexSource,
    PlaybackCursor,
    VideoIndexEntry,
};
pub use input::{Input, SeekableInput, StreamingInput};
pub use stream::{
    AudioCodec,
    AudioStream,
    PaletteEntry,
    VideoCodec,
    VideoStream,
};
pub use timestamp::{AudioTiming, VideoTiming};
