//! OpenDML index chunks.
//!
//! A super index (`indx`, in `strl`) points to one or more standard
//! index chunks (`ix##`, usually in `movi`), each of which lists
//! frame/chunk positions relative to a 64-bit base offset.
//! Supports files beyond the 1GB/4GB limits of `idx1`.
//!
//! See: OpenDML AVI File Format Extensions, version 1.02.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt};

use crate::{
    consts::{ODML_NON_KEYFRAME, STDINDEX_ENTRY_SIZE, STDINDEX_HEADER_SIZE, SUPERINDEX_ENTRY_SIZE, SUPERINDEX_HEADER_SIZE},
    AviError,
};

/// Super index (`indx`) data load, i.e. excluding FourCC and size.
///
/// Location: `RIFF AVI/LIST hdrl/LIST strl[multiple]/indx`
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct SuperIndex {
    pub(crate) longs_per_entry: u16,
    pub(crate) index_sub_type: u8,
    pub(crate) index_type: u8,
    pub(crate) entries_in_use: u32,
    /// Stream data chunk ID, e.g. `00dc`.
    pub(crate) chunk_id: [u8; 4],
    _reserved: [u32; 3],
    #[br(count = entries_in_use)]
    pub(crate) entries: Vec<SuperIndexEntry>,
}

impl SuperIndex {
    /// Parses super index from `indx` data load.
    ///
    /// Returns `None` for truncated chunks or chunks
    /// announcing more entries than the data load can hold.
    pub(crate) fn from_data(data: &[u8]) -> Option<Self> {
        if data.len() < SUPERINDEX_HEADER_SIZE {
            return None
        }
        let entries_in_use = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if entries_in_use as usize > data.len() / SUPERINDEX_ENTRY_SIZE {
            return None
        }
        Cursor::new(data).read_le::<Self>().ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SuperIndexEntry] {
        &self.entries
    }
}

/// Super index entry, pointing to a standard index chunk.
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct SuperIndexEntry {
    /// Absolute offset of the `ix##` chunk header.
    pub offset: u64,
    /// Size of the `ix##` chunk.
    pub size: u32,
    /// Duration covered, in stream ticks.
    pub duration: u32,
}

/// Standard index (`ix##`) chunk header,
/// including FourCC and size.
#[derive(Debug, Default, Clone, BinRead)]
#[br(little)]
pub struct StdIndexHeader {
    pub(crate) fcc: [u8; 4],
    pub(crate) size: u32,
    pub(crate) longs_per_entry: u16,
    pub(crate) index_sub_type: u8,
    pub(crate) index_type: u8,
    pub(crate) entries_in_use: u32,
    pub(crate) chunk_id: [u8; 4],
    /// Entry offsets are relative to this.
    pub(crate) base_offset: u64,
    _reserved: u32,
}

/// Standard index entry.
#[derive(Debug, Default, Clone, Copy, BinRead)]
#[br(little)]
pub struct StdIndexEntry {
    /// Offset of chunk data relative to
    /// `StdIndexHeader::base_offset`.
    pub offset: u32,
    /// Chunk data size. Bit 31 set
    /// means *not* a keyframe.
    pub size: u32,
}

impl StdIndexEntry {
    pub fn len(&self) -> u32 {
        self.size & !ODML_NON_KEYFRAME
    }

    pub fn is_keyframe(&self) -> bool {
        self.size & ODML_NON_KEYFRAME == 0
    }
}

/// Parsed standard index chunk.
#[derive(Debug, Default, Clone)]
pub struct StdIndex {
    pub(crate) header: StdIndexHeader,
    pub(crate) entries: Vec<StdIndexEntry>,
}

impl StdIndex {
    /// Parses a full `ix##` chunk, header included.
    ///
    /// Reads at most as many entries as `chunk` holds,
    /// regardless of the announced count.
    pub(crate) fn from_chunk(chunk: &[u8]) -> Result<Self, AviError> {
        let mut cursor = Cursor::new(chunk);
        let header = cursor.read_le::<StdIndexHeader>()?;
        let available = chunk.len().saturating_sub(STDINDEX_HEADER_SIZE) / STDINDEX_ENTRY_SIZE;
        let count = (header.entries_in_use as usize).min(available);
        let entries = (0..count)
            .map(|_| cursor.read_le::<StdIndexEntry>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { header, entries })
    }

    pub fn base_offset(&self) -> u64 {
        self.header.base_offset
    }

    pub fn entries(&self) -> &[StdIndexEntry] {
        &self.entries
    }
}
