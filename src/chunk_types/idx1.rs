//! Legacy AVI 1.0 index (`idx1`, sometimes `iddx`).
//!
//! Location: `RIFF AVI/idx1`
//!
//! One 16 byte entry per chunk in `movi`. Offsets are relative to either
//! the start of the file or the `movi` list type, depending on the writer.
//!
//! See: <https://learn.microsoft.com/en-us/previous-versions/windows/desktop/api/aviriff/ns-aviriff-avioldindex>

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt};
use rayon::{prelude::ParallelSlice, iter::ParallelIterator};

use crate::consts::{AVIIF_KEYFRAME, IDX1_ENTRY_SIZE};

/// Legacy index entry.
#[derive(Debug, Default, Clone, Copy, BinRead)]
#[br(little)]
pub struct Idx1Entry {
    /// Chunk ID, e.g. `00dc`, `01wb`.
    pub chunk_id: [u8; 4],
    /// `AVIIF_*` flags.
    pub flags: u32,
    pub offset: u32,
    pub size: u32,
}

impl Idx1Entry {
    pub fn is_keyframe(&self) -> bool {
        self.flags & AVIIF_KEYFRAME != 0
    }
}

/// Legacy index table.
#[derive(Debug, Default, Clone)]
pub struct Idx1 {
    pub(crate) entries: Vec<Idx1Entry>,
}

impl Idx1 {
    /// Decodes `idx1` data load. Any trailing partial entry is ignored.
    pub(crate) fn from_data(data: &[u8]) -> Self {
        let entries = data
            .par_chunks_exact(IDX1_ENTRY_SIZE)
            .filter_map(|row| Cursor::new(row).read_le::<Idx1Entry>().ok())
            .collect::<Vec<_>>();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Idx1Entry] {
        &self.entries
    }
}
