//! RIFF/AVI chunk FourCC.
//!
//! Chunk and list identifiers are compared case-insensitively,
//! since writers disagree on case (`LIST` vs `list`, `idx1` vs `IDX1`).
//! Stream data chunks (`00db`, `01wb`, ...) and `ix##` index chunks
//! have no variant of their own and end up as `Custom`.
//!
//! See: <https://learn.microsoft.com/en-us/windows/win32/directshow/avi-riff-file-reference>

/// RIFF/AVI Four CC.
#[derive(Debug, Clone, PartialEq)]
pub enum FourCC {
    /// RIFF file, or OpenDML `AVIX` extension.
    Riff,
    /// Generic list.
    List,
    /// RIFF form type.
    Avi,
    /// ON2 signature, alternative to `RIFF`.
    On2,
    /// ON2 form type, alternative to `AVI `.
    On2f,
    /// Header list.
    Hdrl,
    /// Stream list.
    Strl,
    /// Data list.
    Movi,
    /// OpenDML extended header list.
    Odml,
    /// Main AVI header.
    Avih,
    /// Stream header.
    Strh,
    /// Stream format.
    Strf,
    /// Stream codec data, ignored.
    Strd,
    /// Stream name, ignored.
    Strn,
    /// Video properties, ignored.
    Vprp,
    /// OpenDML super index.
    Indx,
    /// OpenDML extended header (total frames).
    Dmlh,
    /// Padding.
    Junk,
    /// Legacy flat index.
    Idx1,
    /// Legacy flat index, alternative name.
    Iddx,
    /// Stream type: video.
    Vids,
    /// Stream type: audio.
    Auds,

    Custom(String)
}

impl Default for FourCC {
    fn default() -> Self {
        Self::Custom(String::from("    "))
    }
}

impl FourCC {
    pub fn from_slice(fourcc: &[u8]) -> Self {
        let mut lower = [0_u8; 4];
        fourcc.iter()
            .take(4)
            .enumerate()
            .for_each(|(i, b)| lower[i] = b.to_ascii_lowercase());

        match &lower {
            b"riff" => Self::Riff,
            b"list" => Self::List,
            b"avi " => Self::Avi,
            b"on2 " => Self::On2,
            b"on2f" => Self::On2f,
            b"hdrl" => Self::Hdrl,
            b"strl" => Self::Strl,
            b"movi" => Self::Movi,
            b"odml" => Self::Odml,
            b"avih" => Self::Avih,
            b"strh" => Self::Strh,
            b"strf" => Self::Strf,
            b"strd" => Self::Strd,
            b"strn" => Self::Strn,
            b"vprp" => Self::Vprp,
            b"indx" => Self::Indx,
            b"dmlh" => Self::Dmlh,
            b"junk" => Self::Junk,
            b"idx1" => Self::Idx1,
            b"iddx" => Self::Iddx,
            b"vids" => Self::Vids,
            b"auds" => Self::Auds,

            _ => Self::Custom(fourcc.iter().take(4).map(|b| *b as char).collect()),
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            Self::Riff => "RIFF",
            Self::List => "LIST",
            Self::Avi => "AVI ",
            Self::On2 => "ON2 ",
            Self::On2f => "ON2f",
            Self::Hdrl => "hdrl",
            Self::Strl => "strl",
            Self::Movi => "movi",
            Self::Odml => "odml",
            Self::Avih => "avih",
            Self::Strh => "strh",
            Self::Strf => "strf",
            Self::Strd => "strd",
            Self::Strn => "strn",
            Self::Vprp => "vprp",
            Self::Indx => "indx",
            Self::Dmlh => "dmlh",
            Self::Junk => "JUNK",
            Self::Idx1 => "idx1",
            Self::Iddx => "iddx",
            Self::Vids => "vids",
            Self::Auds => "auds",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns `true` for chunks that contain
    /// other chunks after a 4 byte list type,
    /// i.e. `LIST` and `RIFF`.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List | Self::Riff)
    }

    /// Returns `true` for chunks in the header list
    /// that carry nothing of interest and do not
    /// end the current stream's header sequence.
    pub fn is_inert(&self) -> bool {
        matches!(self, Self::Junk | Self::Strd | Self::Strn | Self::Vprp)
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
