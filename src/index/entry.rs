//! Index entry store: append-only per-stream tables of chunk locations,
//! plus the cursors that walk them.
//!
//! Entries are only ever appended in file order (by the header index
//! loaders or by index growth) and dropped all at once on reset.

use crate::consts::AVIIF_KEYFRAME;

/// Location of one video chunk.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct VideoIndexEntry {
    /// Absolute offset of chunk data, i.e. after the chunk header.
    pub pos: u64,
    /// Chunk data size.
    pub len: u32,
    /// `AVIIF_*` flags. Only `AVIIF_KEYFRAME` is used.
    pub flags: u32,
}

impl VideoIndexEntry {
    pub fn new(pos: u64, len: u32, keyframe: bool) -> Self {
        Self {
            pos,
            len,
            flags: match keyframe {
                true => AVIIF_KEYFRAME,
                false => 0,
            },
        }
    }

    pub fn is_keyframe(&self) -> bool {
        self.flags & AVIIF_KEYFRAME != 0
    }
}

/// Location of one audio chunk,
/// with running totals at the start of the chunk.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AudioIndexEntry {
    /// Absolute offset of chunk data, i.e. after the chunk header.
    pub pos: u64,
    /// Chunk data size.
    pub len: u32,
    /// Sum of the sizes of all earlier chunks of this stream.
    pub tot: u64,
    /// Number of audio blocks in all earlier chunks of this stream.
    pub block_no: u32,
}

/// Video index. Append-only.
#[derive(Debug, Default, Clone)]
pub struct VideoIndex {
    pub(crate) entries: Vec<VideoIndexEntry>,
}

impl VideoIndex {
    pub(crate) fn append(&mut self, entry: VideoIndexEntry) {
        self.entries.push(entry)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, frame: usize) -> Option<&VideoIndexEntry> {
        self.entries.get(frame)
    }

    pub fn entries(&self) -> &[VideoIndexEntry] {
        &self.entries
    }

    /// Closest keyframe at or before `frame`.
    pub fn keyframe_at_or_before(&self, frame: usize) -> Option<usize> {
        let last = frame.min(self.len().checked_sub(1)?);
        (0 ..= last).rev().find(|i| self.entries[*i].is_keyframe())
    }
}

/// Audio index for a single stream. Append-only.
#[derive(Debug, Default, Clone)]
pub struct AudioIndex {
    pub(crate) entries: Vec<AudioIndexEntry>,
}

impl AudioIndex {
    pub(crate) fn append(&mut self, entry: AudioIndexEntry) {
        self.entries.push(entry)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, chunk: usize) -> Option<&AudioIndexEntry> {
        self.entries.get(chunk)
    }

    pub fn entries(&self) -> &[AudioIndexEntry] {
        &self.entries
    }
}

/// Playback position within a stream: next entry to emit,
/// and how many bytes of it were already emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    pub entry: usize,
    pub offset_in_chunk: u32,
}

impl PlaybackCursor {
    pub(crate) fn reset(&mut self) {
        *self = Self::default()
    }

    /// Moves on to the next entry.
    pub(crate) fn advance(&mut self) {
        self.entry += 1;
        self.offset_in_chunk = 0;
    }
}

/// Why a chunk scan stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanEnd {
    /// No complete chunk at the growth cursor (yet).
    Eof,
    /// Read or seek failure.
    Io(std::io::ErrorKind),
}

/// File offset of the next chunk header to scan during index growth.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GrowthCursor {
    pub next_tag_offset: u64,
    /// Outcome of the most recent scan that stopped
    /// before its stopper was satisfied.
    pub last_stop: Option<ScanEnd>,
}
