//! The single video stream of an AVI file.

use time::Duration;

use crate::{
    chunk_types::{BitmapInfoHeader, Strh, SuperIndex},
    consts::{BITMAPINFOHEADER_SIZE, PTS_CLOCK},
    index::{PlaybackCursor, VideoIndex},
    timestamp::VideoTiming,
    VideoCodec,
};

/// Palette colour, converted from the stored `RGBQUAD`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// Video stream header data, index and playback position.
#[derive(Debug, Default, Clone)]
pub struct VideoStream {
    pub(crate) strh: Strh,
    pub(crate) bih: BitmapInfoHeader,
    /// `strf` data load as stored, at least 40 bytes.
    pub(crate) bih_data: Vec<u8>,
    pub(crate) palette: Vec<PaletteEntry>,
    /// Position among all `strh` in the header list.
    pub(crate) stream_number: u32,
    /// Data chunk tag, e.g. `00db`. Only the first
    /// two characters are matched.
    pub(crate) tag: [u8; 4],
    pub(crate) codec: VideoCodec,
    pub(crate) superindex: Option<SuperIndex>,
    pub(crate) index: VideoIndex,
    pub(crate) cursor: PlaybackCursor,
}

impl VideoStream {
    pub fn timing(&self) -> VideoTiming {
        VideoTiming {
            scale: self.strh.scale,
            rate: self.strh.rate,
            start: self.strh.start,
        }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        match self.strh.scale {
            0 => 0.0,
            scale => self.strh.rate as f64 / scale as f64,
        }
    }

    /// Frame duration in 90kHz ticks.
    pub fn frame_step(&self) -> u32 {
        let fps = self.fps();
        match fps > 0.0 {
            true => (PTS_CLOCK as f64 / fps) as u32,
            false => 0,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        match self.fps() > 0.0 {
            true => Duration::seconds_f64(1.0 / self.fps()),
            false => Duration::ZERO,
        }
    }

    pub fn width(&self) -> i32 {
        self.bih.width
    }

    pub fn height(&self) -> i32 {
        self.bih.height
    }

    pub fn stream_number(&self) -> u32 {
        self.stream_number
    }

    pub fn tag(&self) -> [u8; 4] {
        self.tag
    }

    pub fn codec(&self) -> &VideoCodec {
        &self.codec
    }

    pub fn strh(&self) -> &Strh {
        &self.strh
    }

    pub fn bitmap_info_header(&self) -> &BitmapInfoHeader {
        &self.bih
    }

    pub fn palette(&self) -> &[PaletteEntry] {
        &self.palette
    }

    pub fn index(&self) -> &VideoIndex {
        &self.index
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// Decoder header: the first `biSize` bytes of `strf`
    /// (at least the 40 byte `BITMAPINFOHEADER`).
    ///
    /// Uncompressed RGB is stored bottom-up,
    /// which is signalled with a negative height.
    pub fn header_data(&self) -> Vec<u8> {
        let size = (self.bih.size as usize)
            .max(BITMAPINFOHEADER_SIZE)
            .min(self.bih_data.len());
        let mut data = self.bih_data[..size].to_vec();
        if self.codec == VideoCodec::Rgb && data.len() >= 12 {
            data[8..12].copy_from_slice(&self.bih.height.wrapping_neg().to_le_bytes());
        }
        data
    }
}
