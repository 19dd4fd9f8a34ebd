//! OpenDML extended AVI header (`dmlh`).
//!
//! Location: `RIFF AVI/LIST hdrl/LIST odml/dmlh`

use binrw::BinRead;

/// OpenDML extended AVI header (`dmlh`).
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct Dmlh {
    /// Total frames across all RIFF segments,
    /// as opposed to `avih`, which only covers
    /// the first.
    pub(crate) total_frames: u32,
}

impl Dmlh {
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }
}
