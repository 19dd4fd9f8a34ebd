//! AVI session: parsed headers, stream indices, and playback state
//! for a single input.
//!
//! ```rs
//! use aviiter::{Avi, SeekableInput};
//! use std::path::Path;
//!
//! let input = SeekableInput::open(Path::new("VIDEO.AVI"), None)?;
//! let mut avi = Avi::open(input)?;
//! println!("{:?}", avi.duration());
//! ```

use std::ops::Range;

use time::Duration;

use crate::{
    header::read_header,
    index::{load_index, GrowthCursor, IndexSource},
    reader::AviReader,
    timestamp::{pts_to_ms, video_pts},
    AudioStream, AviError, AviOptions, DemuxStatus, Input, VideoStream,
};

/// AVI session.
///
/// All operations take `&mut self`, so index growth, playback and
/// seeking never interleave.
#[derive(Debug)]
pub struct Avi<R: Input> {
    pub(crate) reader: AviReader<R>,
    pub(crate) video: VideoStream,
    pub(crate) audio: Vec<AudioStream>,
    /// Data range of `LIST movi`.
    pub(crate) movi: Range<u64>,
    pub(crate) source: IndexSource,
    pub(crate) growth: GrowthCursor,
    /// From `dmlh`.
    pub(crate) total_frames: Option<u32>,
    /// Forward-only input: no index, no seeking.
    pub(crate) streaming: bool,
    pub(crate) status: DemuxStatus,
    pub(crate) options: AviOptions,
}

impl<R: Input> Avi<R> {
    /// Opens AVI with default options.
    pub fn open(input: R) -> Result<Self, AviError> {
        Self::with_options(input, AviOptions::default())
    }

    /// Opens AVI: reads the headers and, for seekable input,
    /// the index. The input is left at the first chunk in `movi`.
    pub fn with_options(input: R, options: AviOptions) -> Result<Self, AviError> {
        let mut reader = AviReader::new(input);
        let streaming = !reader.is_seekable();

        let mut header = read_header(&mut reader, streaming)?;

        let (source, next_tag_offset) = match streaming {
            true => (IndexSource::GrowOnly, header.movi.start),
            false => {
                let source = load_index(&mut reader, &mut header)?;
                let next = match source.has_index() {
                    true => header.scan_end,
                    false => header.movi.start,
                };
                reader.seek_to(header.movi.start)?;
                (source, next)
            }
        };

        tracing::info!(
            streaming,
            ?source,
            frames = header.video.index.len(),
            audio_streams = header.audio.len(),
            video_codec = header.video.codec.name(),
            "opened AVI"
        );

        Ok(Self {
            reader,
            video: header.video,
            audio: header.audio,
            movi: header.movi,
            source,
            growth: GrowthCursor{next_tag_offset, last_stop: None},
            total_frames: header.total_frames,
            streaming,
            status: DemuxStatus::Ok,
            options,
        })
    }

    /// Returns the input.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    pub fn status(&self) -> DemuxStatus {
        self.status
    }

    pub fn video(&self) -> &VideoStream {
        &self.video
    }

    pub fn audio(&self) -> &[AudioStream] {
        &self.audio
    }

    pub fn index_source(&self) -> IndexSource {
        self.source
    }

    /// Data range of `LIST movi`.
    pub fn movi(&self) -> Range<u64> {
        self.movi.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Total frames as announced by the OpenDML `dmlh` header.
    pub fn total_frames(&self) -> Option<u32> {
        self.total_frames
    }

    pub fn growth_cursor(&self) -> GrowthCursor {
        self.growth
    }

    /// Stream length in milliseconds.
    ///
    /// For seekable input this is the timestamp after the last frame:
    /// the `dmlh` frame count if present, else the number of frames indexed
    /// so far. For streaming input it is the timestamp of the current frame.
    pub fn stream_length_ms(&self) -> i64 {
        let frames = match self.streaming {
            true => self.video.cursor.entry as u64,
            false => match self.total_frames {
                Some(total) if total > 0 => total as u64,
                _ => self.video.index.len() as u64,
            },
        };
        pts_to_ms(video_pts(&self.video.timing(), frames))
    }

    /// Stream length as `time::Duration`.
    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.stream_length_ms())
    }
}
