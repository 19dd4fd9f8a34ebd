//! Codec classification from FourCC (video) and format tag (audio).
//!
//! Only used for labelling streams towards the host and for picking
//! the keyframe heuristic during index growth. Nothing is decoded.

use crate::support::string_from_fourcc;

/// Video codec, from `BITMAPINFOHEADER::biCompression`
/// or the `strh` handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VideoCodec {
    /// Uncompressed, `biCompression == 0`.
    Rgb,
    MsMpeg4V1,
    MsMpeg4V2,
    MsMpeg4V3,
    /// MPEG-4 part 2, e.g. DivX 4.
    Mpeg4,
    Xvid,
    DivX5,
    Mjpeg,
    H264,
    Cinepak,
    Xan,
    /// Unrecognized FourCC.
    Other(String),
    #[default]
    Unknown,
}

impl VideoCodec {
    pub fn from_fourcc(fourcc: [u8; 4]) -> Self {
        if fourcc == [0; 4] {
            return Self::Rgb
        }
        match &fourcc {
            b"DIB " | b"raw " => Self::Rgb,
            b"MP41" | b"mp41" | b"MPG4" | b"mpg4" => Self::MsMpeg4V1,
            b"MP42" | b"mp42" | b"DIV2" | b"div2" => Self::MsMpeg4V2,
            b"MP43" | b"mp43" | b"DIV3" | b"div3" | b"DIV4" | b"div4"
            | b"DIV5" | b"div5" | b"DIV6" | b"div6" | b"AP41" | b"MPG3"
            | b"COL1" | b"3IVD" => Self::MsMpeg4V3,
            b"DIVX" | b"divx" | b"Divx" | b"DivX" | b"MP4S" | b"mp4v"
            | b"M4S2" | b"m4s2" | b"FMP4" => Self::Mpeg4,
            b"XVID" | b"xvid" => Self::Xvid,
            b"DX50" => Self::DivX5,
            b"MJPG" | b"mjpg" | b"AVRn" | b"dmb1" => Self::Mjpeg,
            b"H264" | b"h264" | b"X264" | b"x264" | b"avc1" | b"AVC1" => Self::H264,
            b"cvid" | b"CVID" => Self::Cinepak,
            b"Xxan" | b"XXAN" | b"xxan" => Self::Xan,
            _ => Self::Other(string_from_fourcc(fourcc, false)),
        }
    }

    /// Returns `true` for codecs that are recognized.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_) | Self::Unknown)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Rgb => "Raw RGB",
            Self::MsMpeg4V1 => "MS MPEG-4 v1",
            Self::MsMpeg4V2 => "MS MPEG-4 v2",
            Self::MsMpeg4V3 => "MS MPEG-4 v3",
            Self::Mpeg4 => "MPEG-4",
            Self::Xvid => "XviD",
            Self::DivX5 => "DivX 5",
            Self::Mjpeg => "Motion JPEG",
            Self::H264 => "H.264",
            Self::Cinepak => "Cinepak",
            Self::Xan => "Wing Commander IV Xan",
            Self::Other(fourcc) => fourcc.as_str(),
            Self::Unknown => "unknown",
        }
    }
}

/// Audio codec, from `WAVEFORMATEX::wFormatTag`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AudioCodec {
    Pcm,
    MsAdpcm,
    Alaw,
    Mulaw,
    ImaAdpcm,
    Mpeg,
    Mp3,
    Aac,
    Wma,
    Ac3,
    Dts,
    /// Forced for audio accompanying Xan video.
    XanDpcm,
    Unknown(u16),
    #[default]
    None,
}

impl AudioCodec {
    pub fn from_format_tag(tag: u16) -> Self {
        match tag {
            0x0001 => Self::Pcm,
            0x0002 => Self::MsAdpcm,
            0x0006 => Self::Alaw,
            0x0007 => Self::Mulaw,
            0x0011 => Self::ImaAdpcm,
            0x0050 => Self::Mpeg,
            0x0055 => Self::Mp3,
            0x00FF | 0x706D => Self::Aac,
            0x0160 | 0x0161 => Self::Wma,
            0x2000 => Self::Ac3,
            0x2001 => Self::Dts,
            t => Self::Unknown(t),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_) | Self::None)
    }

    pub fn name(&self) -> String {
        match self {
            Self::Pcm => "PCM".to_owned(),
            Self::MsAdpcm => "MS ADPCM".to_owned(),
            Self::Alaw => "A-law".to_owned(),
            Self::Mulaw => "mu-law".to_owned(),
            Self::ImaAdpcm => "IMA ADPCM".to_owned(),
            Self::Mpeg => "MPEG audio".to_owned(),
            Self::Mp3 => "MP3".to_owned(),
            Self::Aac => "AAC".to_owned(),
            Self::Wma => "WMA".to_owned(),
            Self::Ac3 => "AC-3".to_owned(),
            Self::Dts => "DTS".to_owned(),
            Self::XanDpcm => "Xan DPCM".to_owned(),
            Self::Unknown(t) => format!("unknown (0x{t:04x})"),
            Self::None => "none".to_owned(),
        }
    }
}
