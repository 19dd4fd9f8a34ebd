//! Index loading at open time.
//!
//! A file is indexed from exactly one source, chosen once:
//! OpenDML super indices when present, else a legacy `idx1` whose offset
//! base could be verified against the file, else nothing, in which case
//! the index is grown by scanning `movi` during playback.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    chunk_types::{Idx1, StdIndex, SuperIndexEntry},
    consts::{CHUNK_HEADER_SIZE, LIST_TYPE_SIZE, STDINDEX_HEADER_SIZE},
    header::AviHeader,
    reader::AviReader,
    AudioStream, AviError, Input, VideoIndexEntry, VideoStream,
};

/// What `idx1` offsets are relative to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Idx1Base {
    /// Offsets point to chunk headers from start of file.
    FileStart,
    /// Offsets are relative to the `movi` list type FourCC.
    MoviStart,
}

impl Idx1Base {
    /// Value added to an `idx1` offset to get the
    /// absolute offset of the chunk data.
    pub fn data_offset(&self, movi_start: u64) -> u64 {
        match self {
            Self::FileStart => CHUNK_HEADER_SIZE,
            Self::MoviStart => movi_start + CHUNK_HEADER_SIZE - LIST_TYPE_SIZE,
        }
    }
}

/// Where the index came from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum IndexSource {
    /// AVI 1.0 `idx1`.
    LegacyFlat(Idx1Base),
    /// OpenDML `indx` + `ix##`.
    OpenDml,
    /// No usable index. Built on demand from `movi`.
    #[default]
    GrowOnly,
}

impl IndexSource {
    pub fn has_index(&self) -> bool {
        !matches!(self, Self::GrowOnly)
    }
}

/// Fills the video and audio indices from the best available source.
///
/// Falls back to `GrowOnly` (with empty indices) if the source does not
/// yield at least one video entry and one entry per audio stream.
pub(crate) fn load_index<R: Input>(
    reader: &mut AviReader<R>,
    header: &mut AviHeader,
) -> Result<IndexSource, AviError> {
    let opendml = header.video.superindex.is_some()
        || header.audio.iter().any(|a| a.superindex.is_some());

    let source = match (opendml, header.idx1.take()) {
        (true, _) => {
            tracing::info!("OpenDML file");
            load_opendml(reader, &mut header.video, &mut header.audio)?;
            IndexSource::OpenDml
        }
        (false, Some(idx1)) => match probe_idx1_base(reader, &idx1, &header.video, header.movi.start) {
            Some(base) => {
                load_idx1(&idx1, base.data_offset(header.movi.start), &mut header.video, &mut header.audio);
                IndexSource::LegacyFlat(base)
            }
            None => {
                tracing::warn!("legacy index offsets do not match file, ignoring it");
                IndexSource::GrowOnly
            }
        },
        (false, None) => IndexSource::GrowOnly,
    };

    if source.has_index()
        && (header.video.index.is_empty() || header.audio.iter().any(|a| a.index.is_empty()))
    {
        tracing::warn!(?source, "index lacks entries for some stream, building index from data instead");
        reset_indices(&mut header.video, &mut header.audio);
        return Ok(IndexSource::GrowOnly)
    }

    tracing::debug!(?source, frames = header.video.index.len(), "index loaded");

    Ok(source)
}

/// Drops all index entries and running audio totals.
fn reset_indices(video: &mut VideoStream, audio: &mut [AudioStream]) {
    video.index.clear();
    audio.iter_mut().for_each(|a| a.reset_index());
}

/// Tests where the first video entry of `idx1` points:
/// first as an absolute offset, then relative to `movi`.
fn probe_idx1_base<R: Input>(
    reader: &mut AviReader<R>,
    idx1: &Idx1,
    video: &VideoStream,
    movi_start: u64,
) -> Option<Idx1Base> {
    let Some(first) = idx1.entries().iter().find(|e| e.chunk_id[..2] == video.tag[..2]) else {
        tracing::warn!("no video entries in legacy index");
        return None
    };

    let candidates = [
        (Idx1Base::FileStart, first.offset as u64),
        (Idx1Base::MoviStart, (first.offset as u64 + movi_start).saturating_sub(LIST_TYPE_SIZE)),
    ];

    candidates.into_iter()
        .find(|(_, pos)| {
            matches!(
                reader.header_at(*pos),
                Ok(Some(hdr)) if hdr.matches(&first.chunk_id, first.size)
            )
        })
        .map(|(base, _)| base)
}

/// Appends `idx1` entries to the stream indices.
/// `ioff` is added to each offset to get the chunk data position.
fn load_idx1(idx1: &Idx1, ioff: u64, video: &mut VideoStream, audio: &mut [AudioStream]) {
    for entry in idx1.entries() {
        let pos = entry.offset as u64 + ioff;
        if entry.chunk_id[..2] == video.tag[..2] {
            video.index.append(VideoIndexEntry {
                pos,
                len: entry.size,
                flags: entry.flags,
            });
        } else if let Some(stream) = audio.iter_mut().find(|a| entry.chunk_id[..2] == a.tag[..2]) {
            stream.append_chunk(pos, entry.size);
        }
    }
}

/// Reads all `ix##` chunks listed in the super indices.
///
/// Chunks are fetched sequentially, decoded in parallel,
/// then appended in super index order.
fn load_opendml<R: Input>(
    reader: &mut AviReader<R>,
    video: &mut VideoStream,
    audio: &mut [AudioStream],
) -> Result<(), AviError> {
    match &video.superindex {
        Some(superindex) => {
            let chunks = read_std_indices(reader, superindex.entries())?;
            for stdindex in chunks {
                for entry in stdindex.entries() {
                    video.index.append(VideoIndexEntry::new(
                        stdindex.base_offset() + entry.offset as u64,
                        entry.len(),
                        entry.is_keyframe(),
                    ));
                }
            }
        }
        None => tracing::warn!("no video super index"),
    }

    for (i, stream) in audio.iter_mut().enumerate() {
        let Some(superindex) = stream.superindex.take() else {
            tracing::warn!(stream = i, "no audio super index");
            continue;
        };
        let chunks = read_std_indices(reader, superindex.entries())?;
        for stdindex in chunks {
            for entry in stdindex.entries() {
                stream.append_chunk(stdindex.base_offset() + entry.offset as u64, entry.len());
            }
        }
        stream.superindex = Some(superindex);
    }

    Ok(())
}

fn read_std_indices<R: Input>(
    reader: &mut AviReader<R>,
    entries: &[SuperIndexEntry],
) -> Result<Vec<StdIndex>, AviError> {
    let mut buffers: Vec<Vec<u8>> = Vec::with_capacity(entries.len());
    for entry in entries {
        if reader.seek_to(entry.offset).is_err() {
            tracing::debug!(offset = entry.offset, "can not seek to standard index");
            continue;
        }
        let buf = reader.read_upto(entry.size as u64 + STDINDEX_HEADER_SIZE as u64)?;
        if buf.is_empty() {
            tracing::debug!(offset = entry.offset, "can not read standard index, incomplete file?");
            continue;
        }
        buffers.push(buf);
    }

    let chunks = buffers
        .into_par_iter()
        .map(|buf| StdIndex::from_chunk(&buf).ok())
        .collect::<Vec<_>>();

    Ok(chunks.into_iter().flatten().collect())
}
