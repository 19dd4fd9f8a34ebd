//! RIFF chunk framing.

mod chunk_header;

pub use chunk_header::ChunkHeader;
