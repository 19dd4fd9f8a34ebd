//! Host side of a session: receives output buffers and control events.

use crate::{consts::DEFAULT_BUFFER_SIZE, stream::{AudioCodec, PaletteEntry, VideoCodec}};

bitflags::bitflags! {
    /// Output buffer flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct BufferFlags: u32 {
        /// Last buffer of a chunk (frame or audio block).
        const FRAME_END = 0x0001;
        /// Carries side data, e.g. a palette.
        const SPECIAL = 0x0002;
        /// Sent before playback starts.
        const PREVIEW = 0x0010;
        /// Header is a `BITMAPINFOHEADER` or `WAVEFORMATEX`.
        const STDHEADER = 0x0400;
        /// Carries the frame duration.
        const FRAMERATE = 0x0800;
        /// Decoder setup data.
        const HEADER = 0x8000;
    }
}

/// Stream a buffer belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamId {
    #[default]
    Video,
    /// Audio stream by index in the order of
    /// appearance in the header list.
    Audio(usize),
}

/// Side information attached to header buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BufferInfo {
    #[default]
    None,
    /// Video frame duration in 90kHz ticks.
    FrameDuration(u32),
    Palette(Vec<PaletteEntry>),
    AudioFormat{sample_rate: u32, bits_per_sample: u16, channels: u16},
}

/// Unit of output.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub stream: StreamId,
    /// Presentation timestamp, 90kHz.
    pub pts: i64,
    pub data: Vec<u8>,
    pub flags: BufferFlags,
    /// Input time in milliseconds.
    pub input_time: i64,
    /// Input position scaled to `0..=65535`.
    pub input_normpos: u16,
    /// Video frame number, if video.
    pub frame_number: Option<u64>,
    pub info: BufferInfo,
}

impl Buffer {
    pub(crate) fn header(stream: StreamId, data: Vec<u8>, flags: BufferFlags, info: BufferInfo) -> Self {
        Self {
            stream,
            data,
            flags: flags | BufferFlags::HEADER,
            info,
            ..Default::default()
        }
    }
}

/// Stream summary sent before any buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub has_video: bool,
    pub has_audio: bool,
    pub width: i32,
    pub height: i32,
    pub video_codec: VideoCodec,
    /// FourCC the video codec was derived from.
    pub video_fourcc: String,
    pub audio_codecs: Vec<AudioCodec>,
}

/// Receives buffers and control events from a session.
pub trait Host {
    /// Maximum payload per video buffer.
    fn video_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }

    /// Maximum payload per audio buffer.
    fn audio_buffer_size(&self) -> usize {
        DEFAULT_BUFFER_SIZE
    }

    fn put_video(&mut self, buffer: Buffer);

    fn put_audio(&mut self, buffer: Buffer);

    fn stream_info(&mut self, _info: &StreamInfo) {}

    /// Playback is about to start.
    fn start(&mut self) {}

    /// Discard anything queued downstream.
    fn flush(&mut self) {}

    /// Presentation time discontinuity at `pts`.
    fn new_pts(&mut self, pts: i64, seek: bool);

    /// Index growth progress, 0-100.
    fn progress(&mut self, _percent: u8) {}

    /// Polled during long index scans.
    /// Returning `true` makes the scan stop early.
    fn action_pending(&self) -> bool {
        false
    }
}
