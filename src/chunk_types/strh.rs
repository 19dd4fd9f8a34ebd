//! Stream header (`strh`).
//!
//! Location: `RIFF AVI/LIST hdrl/LIST strl[multiple]/strh`
//!
//! See: <https://learn.microsoft.com/en-us/previous-versions/windows/desktop/api/avifmt/ns-avifmt-avistreamheader>

use binrw::BinRead;

use crate::FourCC;

/// Stream header (`strh`), `AVISTREAMHEADER` without the
/// trailing frame rectangle.
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct Strh {
    /// `vids`, `auds`, `txts`, `mids`.
    pub(crate) fcc_type: [u8; 4],
    /// Codec handler, e.g. `XVID`.
    pub(crate) fcc_handler: [u8; 4],
    pub(crate) flags: u32,
    pub(crate) priority: u16,
    pub(crate) language: u16,
    pub(crate) initial_frames: u32,
    /// Time scale. `rate / scale` is the
    /// number of samples (or frames) per second.
    pub(crate) scale: u32,
    pub(crate) rate: u32,
    /// Start time in `scale` units.
    pub(crate) start: u32,
    pub(crate) length: u32,
    pub(crate) suggested_buffer_size: u32,
    pub(crate) quality: u32,
    /// Fixed sample size in bytes, 0 if samples vary in size.
    pub(crate) sample_size: u32,
}

impl Strh {
    pub fn stream_type(&self) -> FourCC {
        FourCC::from_slice(&self.fcc_type)
    }

    pub fn handler(&self) -> [u8; 4] {
        self.fcc_handler
    }

    pub fn initial_frames(&self) -> u32 {
        self.initial_frames
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }
}
