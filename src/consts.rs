//! AVI constants.

/// Size of a RIFF chunk header in bytes:
/// 32-bit FourCC followed by 32-bit little endian length.
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Size of the list type FourCC following
/// a `LIST` or `RIFF` chunk header.
pub const LIST_TYPE_SIZE: u64 = 4;

/// `AVIIF_KEYFRAME` flag for legacy index entries.
pub const AVIIF_KEYFRAME: u32 = 0x10;

/// Bit in an OpenDML standard index entry size
/// that marks a frame as *not* being a keyframe.
pub const ODML_NON_KEYFRAME: u32 = 0x8000_0000;

/// Maximum number of audio streams read from the header list.
pub const MAX_AUDIO_STREAMS: usize = 8;

/// Presentation time clock in Hz.
pub const PTS_CLOCK: u32 = 90_000;

/// Maximum value for normalized byte positions.
pub const NORMPOS_MAX: u32 = 65_535;

/// Default number of units sent as preview
/// after the stream headers.
pub const NUM_PREVIEW_BUFFERS: usize = 10;

/// Default number of scanned chunks
/// between index growth progress notifications.
pub const PROGRESS_INTERVAL: u32 = 1000;

/// Default maximum payload size for an output buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Size of `BITMAPINFOHEADER` in bytes.
pub const BITMAPINFOHEADER_SIZE: usize = 40;

/// Size of `WAVEFORMATEX` in bytes (including `cbSize`).
pub const WAVEFORMATEX_SIZE: usize = 18;

/// Size of the `strh` fields read, up to and including `dwSampleSize`.
pub const STRH_SIZE: usize = 48;

/// Size of an OpenDML super index header, excluding
/// FourCC and length.
pub const SUPERINDEX_HEADER_SIZE: usize = 24;

/// Size of an OpenDML super index entry.
pub const SUPERINDEX_ENTRY_SIZE: usize = 16;

/// Size of an OpenDML standard index chunk header,
/// including FourCC and length.
pub const STDINDEX_HEADER_SIZE: usize = 32;

/// Size of an OpenDML standard index entry.
pub const STDINDEX_ENTRY_SIZE: usize = 8;

/// Size of a legacy `idx1` entry.
pub const IDX1_ENTRY_SIZE: usize = 16;

/// Maximum number of palette entries.
pub const MAX_PALETTE_ENTRIES: u32 = 256;

/// Stream number assigned to audio streams
/// declaring zero channels. Never matches a chunk.
pub const SILENT_STREAM_NUMBER: u32 = 99;

/// Sample rate forced on audio streams
/// accompanying Xan video.
pub const XAN_AUDIO_RATE: u32 = 11025;
