//! Audio streams of an AVI file (up to 8).

use crate::{
    chunk_types::{Strh, SuperIndex, WaveFormatEx},
    index::{AudioIndex, AudioIndexEntry, PlaybackCursor},
    timestamp::AudioTiming,
    AudioCodec,
};

/// Audio stream header data, index, playback position,
/// and running totals for index growth.
#[derive(Debug, Default, Clone)]
pub struct AudioStream {
    pub(crate) strh: Strh,
    pub(crate) wavex: WaveFormatEx,
    /// `strf` data load as stored.
    pub(crate) wavex_data: Vec<u8>,
    /// Position among all `strh` in the header list.
    pub(crate) stream_number: u32,
    /// Data chunk tag, e.g. `01wb`. Only the first
    /// two characters are matched.
    pub(crate) tag: [u8; 4],
    pub(crate) codec: AudioCodec,
    pub(crate) superindex: Option<SuperIndex>,
    pub(crate) index: AudioIndex,
    pub(crate) cursor: PlaybackCursor,
    /// Blocks indexed so far.
    pub(crate) block_no: u32,
    /// Bytes indexed so far, or for streaming input,
    /// bytes seen so far.
    pub(crate) total_bytes: u64,
}

impl AudioStream {
    pub fn timing(&self) -> AudioTiming {
        AudioTiming {
            scale: self.strh.scale,
            rate: self.strh.rate,
            start: self.strh.start,
            sample_size: self.strh.sample_size,
            block_align: self.wavex.block_align,
        }
    }

    /// Blocks in a chunk of `len` bytes:
    /// `ceil(len / nBlockAlign)`, or 1 without block alignment.
    pub(crate) fn blocks_in(&self, len: u32) -> u32 {
        match self.wavex.block_align as u32 {
            0 => 1,
            align => len.div_ceil(align),
        }
    }

    /// Appends chunk at `pos` to the index,
    /// updating running block and byte totals.
    pub(crate) fn append_chunk(&mut self, pos: u64, len: u32) {
        self.index.append(AudioIndexEntry {
            pos,
            len,
            tot: self.total_bytes,
            block_no: self.block_no,
        });
        self.block_no = self.block_no.wrapping_add(self.blocks_in(len));
        self.total_bytes += len as u64;
    }

    /// Drops the index and running totals.
    pub(crate) fn reset_index(&mut self) {
        self.index.clear();
        self.block_no = 0;
        self.total_bytes = 0;
    }

    /// Presentation timestamp at the playback cursor, if indexed.
    pub(crate) fn cursor_pts(&self) -> Option<i64> {
        let entry = self.index.get(self.cursor.entry)?;
        Some(crate::timestamp::audio_pts(
            &self.timing(),
            entry.block_no,
            entry.tot,
            self.cursor.offset_in_chunk,
        ))
    }

    pub fn stream_number(&self) -> u32 {
        self.stream_number
    }

    pub fn tag(&self) -> [u8; 4] {
        self.tag
    }

    pub fn codec(&self) -> AudioCodec {
        self.codec
    }

    pub fn strh(&self) -> &Strh {
        &self.strh
    }

    pub fn wave_format(&self) -> &WaveFormatEx {
        &self.wavex
    }

    /// `WAVEFORMATEX` as stored, for the decoder.
    pub fn header_data(&self) -> &[u8] {
        &self.wavex_data
    }

    /// Time base rate, `dwRate` of `strh`.
    /// Forced to 11025 for Xan DPCM.
    pub fn rate(&self) -> u32 {
        self.strh.rate
    }

    pub fn index(&self) -> &AudioIndex {
        &self.index
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }
}
