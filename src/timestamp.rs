//! Presentation timestamps (90kHz) for video frames and audio positions.
//!
//! All functions are pure: they depend only on stream parameters
//! and the values stored in index entries.

use crate::consts::PTS_CLOCK;

/// Video time base from `strh`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VideoTiming {
    pub scale: u32,
    pub rate: u32,
    /// Start offset in frames.
    pub start: u32,
}

/// Audio time base from `strh` and `WAVEFORMATEX`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioTiming {
    pub scale: u32,
    pub rate: u32,
    /// Start offset in samples (blocks for VBR).
    pub start: u32,
    /// `strh` fixed sample size, 0 if variable.
    pub sample_size: u32,
    /// `WAVEFORMATEX::nBlockAlign`.
    pub block_align: u16,
}

impl AudioTiming {
    /// Variable bitrate: no fixed sample size and a
    /// time scale greater than one, meaning each chunk
    /// holds a whole number of `scale` sized blocks.
    pub fn is_vbr(&self) -> bool {
        self.sample_size == 0 && self.scale > 1
    }

    /// Bytes per timestamp unit for constant bitrate audio.
    /// Block alignment wins over sample size.
    fn bytes_per_unit(&self) -> f64 {
        match (self.block_align, self.sample_size) {
            (0, 0) => 1.0,
            (0, size) => size as f64,
            (align, _) => align as f64,
        }
    }
}

/// Presentation timestamp for video frame number `frame`.
///
/// `90000 * (frame + start) * scale / rate`, truncated.
/// Returns 0 if the rate is 0.
pub fn video_pts(timing: &VideoTiming, frame: u64) -> i64 {
    if timing.rate == 0 {
        return 0
    }
    (PTS_CLOCK as f64
        * (frame as f64 + timing.start as f64)
        * timing.scale as f64
        / timing.rate as f64) as i64
}

/// Presentation timestamp for a position in an audio stream.
///
/// - `block_no`: blocks before the chunk (variable bitrate)
/// - `total_bytes`: bytes before the chunk (constant bitrate)
/// - `offset_in_chunk`: bytes into the chunk (constant bitrate)
///
/// Returns 0 if the rate is 0.
pub fn audio_pts(timing: &AudioTiming, block_no: u32, total_bytes: u64, offset_in_chunk: u32) -> i64 {
    if timing.rate == 0 {
        return 0
    }
    match timing.is_vbr() {
        true => (PTS_CLOCK as f64
            * (block_no as f64 + timing.start as f64)
            * timing.scale as f64
            / timing.rate as f64) as i64,
        false => {
            let bytes = total_bytes as f64 + offset_in_chunk as f64;
            let units = bytes / timing.bytes_per_unit() + timing.start as f64;
            (units * timing.scale as f64 / timing.rate as f64 * PTS_CLOCK as f64) as i64
        }
    }
}

/// Milliseconds for a 90kHz timestamp.
pub fn pts_to_ms(pts: i64) -> i64 {
    pts / (PTS_CLOCK as i64 / 1000)
}
