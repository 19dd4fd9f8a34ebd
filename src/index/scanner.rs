//! Chunk scanner: classifies the chunk at the growth cursor
//! and appends it to the matching stream index.

use crate::{
    index::{ScanEnd, VideoIndexEntry},
    Avi, ChunkHeader, Input, VideoCodec,
};

/// What the scanned chunk was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ChunkClass {
    /// `LIST` or `RIFF`, scanning continues inside.
    Descended,
    Video,
    /// Audio stream index.
    Audio(usize),
    /// Skipped.
    Unknown,
}

/// MPEG-4 VOP start code. A chunk starting with it,
/// rather than with a VOL/GOV header, is not a keyframe.
const MPEG4_VOP_START_CODE: u32 = 0x0000_01B6;

/// MS-MPEG4 picture header bit set for inter frames.
const MSMPEG4_INTER_FLAG: u32 = 0x4000_0000;

/// Guesses whether a video chunk holds a keyframe from its first bytes.
///
/// Only MS-MPEG4 and MPEG-4 variants are inspected,
/// anything else counts as a keyframe.
pub(crate) fn is_keyframe(codec: &VideoCodec, data: &[u8]) -> bool {
    let word = |pos: usize| -> Option<u32> {
        let b = data.get(pos .. pos + 4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    };

    match codec {
        VideoCodec::MsMpeg4V1 => match word(4) {
            Some(w) => (w << 5) & MSMPEG4_INTER_FLAG == 0,
            None => true,
        },
        VideoCodec::MsMpeg4V2 | VideoCodec::MsMpeg4V3 => match word(0) {
            Some(w) => w & MSMPEG4_INTER_FLAG == 0,
            None => true,
        },
        VideoCodec::DivX5 | VideoCodec::Mpeg4 | VideoCodec::Xvid => {
            word(0) != Some(MPEG4_VOP_START_CODE)
        }
        _ => true,
    }
}

/// Bytes of chunk data `is_keyframe` needs for `codec`.
fn sniff_len(codec: &VideoCodec) -> usize {
    match codec {
        VideoCodec::MsMpeg4V1 => 8,
        VideoCodec::MsMpeg4V2
        | VideoCodec::MsMpeg4V3
        | VideoCodec::DivX5
        | VideoCodec::Mpeg4
        | VideoCodec::Xvid => 4,
        _ => 0,
    }
}

impl<R: Input> Avi<R> {
    /// Scans one chunk at the growth cursor.
    ///
    /// The growth cursor only moves past a chunk once it is fully
    /// handled, so a chunk cut short by end of input is scanned again
    /// on the next call.
    pub(crate) fn scan_chunk(&mut self) -> Result<ChunkClass, ScanEnd> {
        let offset = self.growth.next_tag_offset;
        let hdr = match self.reader.header_at(offset) {
            Ok(Some(hdr)) => hdr,
            Ok(None) => return Err(ScanEnd::Eof),
            Err(err) => return Err(ScanEnd::Io(err.kind())),
        };

        if hdr.is_list() {
            self.growth.next_tag_offset = hdr.list_data_offset();
            return Ok(ChunkClass::Descended)
        }

        let class = if hdr.matches_stream(&self.video.tag) {
            let keyframe = self.sniff_keyframe(&hdr)?;
            self.video.index.append(VideoIndexEntry::new(hdr.data_offset(), hdr.size, keyframe));
            ChunkClass::Video
        } else if let Some(idx) = self.audio.iter().position(|a| hdr.matches_stream(&a.tag)) {
            self.audio[idx].append_chunk(hdr.data_offset(), hdr.size);
            ChunkClass::Audio(idx)
        } else {
            tracing::debug!(offset, tag = %hdr.name, size = hdr.size, "skipping chunk");
            ChunkClass::Unknown
        };

        self.growth.next_tag_offset = hdr.offset_next_abs();

        Ok(class)
    }

    fn sniff_keyframe(&mut self, hdr: &ChunkHeader) -> Result<bool, ScanEnd> {
        let want = sniff_len(&self.video.codec).min(hdr.size as usize);
        if want == 0 {
            return Ok(true)
        }
        let mut buf = [0_u8; 8];
        match self.reader.read_fill(&mut buf[..want]) {
            Ok(n) if n == want => Ok(is_keyframe(&self.video.codec, &buf[..want])),
            Ok(_) => Err(ScanEnd::Eof),
            Err(err) => Err(ScanEnd::Io(err.kind())),
        }
    }
}
