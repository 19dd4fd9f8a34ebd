//! Stream format (`strf`).
//!
//! Location: `RIFF AVI/LIST hdrl/LIST strl[multiple]/strf`
//!
//! Contents depend on the preceding `strh`: a `BITMAPINFOHEADER`
//! (optionally followed by a palette) for video,
//! a `WAVEFORMATEX` for audio.

use binrw::BinRead;

/// `BITMAPINFOHEADER`.
///
/// See: <https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-bitmapinfoheader>
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct BitmapInfoHeader {
    /// Size of the structure including
    /// any codec-specific trailing data.
    pub(crate) size: u32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) planes: u16,
    pub(crate) bit_count: u16,
    /// Codec FourCC, 0 for uncompressed RGB.
    pub(crate) compression: [u8; 4],
    pub(crate) size_image: u32,
    pub(crate) x_pels_per_meter: i32,
    pub(crate) y_pels_per_meter: i32,
    /// Number of palette entries following the header.
    pub(crate) clr_used: u32,
    pub(crate) clr_important: u32,
}

impl BitmapInfoHeader {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bit_count(&self) -> u16 {
        self.bit_count
    }

    pub fn compression(&self) -> [u8; 4] {
        self.compression
    }

    /// Uncompressed RGB.
    pub fn is_rgb(&self) -> bool {
        self.compression == [0; 4]
    }

    pub fn clr_used(&self) -> u32 {
        self.clr_used
    }
}

/// Palette entry as stored in the file (`RGBQUAD`).
#[derive(Debug, Default, Clone, Copy, PartialEq, BinRead)]
#[br(little)]
pub struct RgbQuad {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    _reserved: u8,
}

/// `WAVEFORMATEX`.
///
/// See: <https://learn.microsoft.com/en-us/windows/win32/api/mmeapi/ns-mmeapi-waveformatex>
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct WaveFormatEx {
    pub(crate) format_tag: u16,
    pub(crate) channels: u16,
    pub(crate) samples_per_sec: u32,
    pub(crate) avg_bytes_per_sec: u32,
    /// Minimum atomic unit in bytes.
    pub(crate) block_align: u16,
    pub(crate) bits_per_sample: u16,
    /// Size of codec-specific trailing data.
    pub(crate) cb_size: u16,
}

impl WaveFormatEx {
    pub fn format_tag(&self) -> u16 {
        self.format_tag
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples_per_sec(&self) -> u32 {
        self.samples_per_sec
    }

    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.avg_bytes_per_sec
    }

    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }
}
