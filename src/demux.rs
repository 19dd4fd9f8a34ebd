//! Playback: header emission and interleaved output of audio and video.
//!
//! Each call to `send_chunk` emits at most one buffer per stream. Audio
//! streams whose next position is not later than the next video frame go
//! first, so the decoders receive data in presentation order even when
//! the file is badly interleaved.

use crate::{
    consts::NORMPOS_MAX,
    host::{Buffer, BufferFlags, BufferInfo, StreamId, StreamInfo},
    index::Stopper,
    support::{normalize_position, string_from_fourcc},
    timestamp::{audio_pts, pts_to_ms, video_pts},
    Avi, Host, Input,
};

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemuxStatus {
    #[default]
    Ok,
    /// No more data, or playback can not continue.
    Finished,
}

/// Result of reading part of an indexed chunk.
struct ChunkRead {
    data: Vec<u8>,
    /// The whole chunk has now been read.
    complete: bool,
}

impl<R: Input> Avi<R> {
    /// Sends stream info, decoder headers, and for seekable input
    /// the first few units as preview.
    pub fn send_headers<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.status = DemuxStatus::Ok;

        let info = StreamInfo {
            has_video: true,
            has_audio: !self.audio.is_empty(),
            width: self.video.width(),
            height: self.video.height(),
            video_codec: self.video.codec.clone(),
            video_fourcc: string_from_fourcc(self.video.bih.compression, true),
            audio_codecs: self.audio.iter().map(|a| a.codec).collect(),
        };
        host.stream_info(&info);
        host.start();

        let video_header = self.video.header_data();
        if self.video.bih.size as usize > host.video_buffer_size() {
            tracing::warn!(
                size = self.video.bih.size,
                max = host.video_buffer_size(),
                "video decoder header larger than buffer"
            );
            self.status = DemuxStatus::Finished;
            return
        }
        host.put_video(Buffer::header(
            StreamId::Video,
            video_header,
            BufferFlags::STDHEADER | BufferFlags::FRAMERATE | BufferFlags::FRAME_END,
            BufferInfo::FrameDuration(self.video.frame_step()),
        ));

        if !self.video.palette.is_empty() {
            host.put_video(Buffer::header(
                StreamId::Video,
                Vec::new(),
                BufferFlags::SPECIAL,
                BufferInfo::Palette(self.video.palette.clone()),
            ));
        }

        let max = host.audio_buffer_size().max(1);
        for (i, audio) in self.audio.iter().enumerate() {
            let info = BufferInfo::AudioFormat {
                sample_rate: audio.wavex.samples_per_sec,
                bits_per_sample: audio.wavex.bits_per_sample,
                channels: audio.wavex.channels,
            };
            let pieces = audio.wavex_data.chunks(max).collect::<Vec<_>>();
            let count = pieces.len();
            for (n, piece) in pieces.into_iter().enumerate() {
                let flags = match n + 1 == count {
                    true => BufferFlags::STDHEADER | BufferFlags::FRAME_END,
                    false => BufferFlags::STDHEADER,
                };
                host.put_audio(Buffer::header(StreamId::Audio(i), piece.to_vec(), flags, info.clone()));
            }
        }

        self.seek_start();

        if !self.streaming {
            for _ in 0 .. self.options.preview_buffers {
                if !self.next_unit(host, BufferFlags::PREVIEW) {
                    break
                }
            }
        }
    }

    /// Emits the next unit(s) of data.
    ///
    /// Returns `DemuxStatus::Finished` once neither audio
    /// nor video could be sent.
    pub fn send_chunk<H: Host + ?Sized>(&mut self, host: &mut H) -> DemuxStatus {
        let sent = match self.streaming {
            true => self.next_streaming(host),
            false => self.next_unit(host, BufferFlags::empty()),
        };
        if !sent {
            self.status = DemuxStatus::Finished;
        }
        self.status
    }

    /// Rewinds all playback cursors.
    pub(crate) fn seek_start(&mut self) {
        self.video.cursor.reset();
        self.audio.iter_mut().for_each(|a| a.cursor.reset());
    }

    /// Input position scaled to `0..=65535`, relative to the
    /// second to last video frame if indexed, else to the input length.
    fn input_normpos(&mut self, video: bool) -> u16 {
        let pos = self.reader.pos().unwrap_or_default();
        let frames = self.video.index.len();
        match video && self.source.has_index() && frames > 2 {
            true => normalize_position(pos, self.video.index.entries()[frames - 2].pos),
            false => normalize_position(pos, self.reader.len()),
        }
    }

    /// Indexed playback: one interleaving step.
    pub(crate) fn next_unit<H: Host + ?Sized>(&mut self, host: &mut H, flags: BufferFlags) -> bool {
        let frame = self.video.cursor.entry;
        if self.video.index.len() <= frame {
            self.grow(Stopper::VideoFrame(frame), host);
        }
        for stream in 0 .. self.audio.len() {
            let chunk = self.audio[stream].cursor.entry;
            if self.audio[stream].index.len() <= chunk {
                self.grow(Stopper::AudioChunk{stream, chunk}, host);
            }
        }

        let vpts = video_pts(&self.video.timing(), self.video.cursor.entry as u64);
        let mut do_read_video = self.audio.is_empty();
        let mut audio_sent = false;

        for stream in 0 .. self.audio.len() {
            let Some(apts) = self.audio[stream].cursor_pts() else { continue };

            if apts <= vpts {
                let size = host.audio_buffer_size();
                match self.read_audio(stream, size) {
                    Some(read) => {
                        let input_normpos = self.input_normpos(false);
                        host.put_audio(Buffer {
                            stream: StreamId::Audio(stream),
                            pts: apts,
                            data: read.data,
                            flags: match read.complete {
                                true => BufferFlags::FRAME_END | flags,
                                false => flags,
                            },
                            input_time: pts_to_ms(apts),
                            input_normpos,
                            ..Default::default()
                        });
                        audio_sent = true;
                    }
                    None => tracing::debug!(stream, "audio read failed"),
                }
            } else {
                do_read_video = true;
            }
        }

        if !audio_sent {
            do_read_video = true;
        }

        let mut video_sent = false;
        if do_read_video {
            let frame_number = self.video.cursor.entry as u64;
            let size = host.video_buffer_size();
            match self.read_video(size) {
                Some(read) => {
                    let input_normpos = self.input_normpos(true);
                    host.put_video(Buffer {
                        stream: StreamId::Video,
                        pts: vpts,
                        data: read.data,
                        flags: match read.complete {
                            true => BufferFlags::FRAME_END | flags,
                            false => flags,
                        },
                        input_time: pts_to_ms(vpts),
                        input_normpos,
                        frame_number: Some(frame_number),
                        ..Default::default()
                    });
                    video_sent = true;
                }
                None => tracing::debug!(frame_number, "video read failed"),
            }
        }

        if !audio_sent && !video_sent {
            tracing::info!("video and audio streams ended");
            return false
        }

        true
    }

    /// Reads up to `max` bytes of the current video chunk.
    /// `None` if there is no current chunk or the read fails.
    fn read_video(&mut self, max: usize) -> Option<ChunkRead> {
        let entry = *self.video.index.get(self.video.cursor.entry)?;
        let read = self.read_part(entry.pos, entry.len, self.video.cursor.offset_in_chunk, max)?;
        match read.complete {
            true => self.video.cursor.advance(),
            false => self.video.cursor.offset_in_chunk += read.data.len() as u32,
        }
        Some(read)
    }

    /// Reads up to `max` bytes of the current chunk of audio `stream`.
    fn read_audio(&mut self, stream: usize, max: usize) -> Option<ChunkRead> {
        let audio = &self.audio[stream];
        let entry = *audio.index.get(audio.cursor.entry)?;
        let offset = audio.cursor.offset_in_chunk;
        let read = self.read_part(entry.pos, entry.len, offset, max)?;
        let cursor = &mut self.audio[stream].cursor;
        match read.complete {
            true => cursor.advance(),
            false => cursor.offset_in_chunk += read.data.len() as u32,
        }
        Some(read)
    }

    fn read_part(&mut self, pos: u64, len: u32, offset: u32, max: usize) -> Option<ChunkRead> {
        let left = len.saturating_sub(offset) as usize;
        let todo = left.min(max);
        let mut data = vec![0_u8; todo];
        if todo > 0 {
            self.reader.seek_to(pos + offset as u64).ok()?;
            if self.reader.read_fill(&mut data).ok()? != todo {
                return None
            }
        }
        Some(ChunkRead { data, complete: todo == left })
    }

    /// Streaming playback: emits the next chunk in sequence,
    /// split over as many buffers as needed.
    pub(crate) fn next_streaming<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let hdr = loop {
            match self.reader.header() {
                Ok(Some(hdr)) if hdr.is_list() => {
                    if self.reader.skip(4).is_err() {
                        return false
                    }
                }
                Ok(Some(hdr)) => break hdr,
                _ => return false,
            }
        };

        let len = hdr.size;

        if hdr.matches_stream(&self.video.tag) {
            let vpts = video_pts(&self.video.timing(), self.video.cursor.entry as u64);
            let frame_number = self.video.cursor.entry as u64;
            let max = host.video_buffer_size().max(1);
            let mut left = len as usize;
            while left > 0 {
                let size = left.min(max);
                left -= size;
                let Ok(data) = self.reader.read_bytes(size as u64) else { return false };
                host.put_video(Buffer {
                    stream: StreamId::Video,
                    pts: vpts,
                    data,
                    flags: match left {
                        0 => BufferFlags::FRAME_END,
                        _ => BufferFlags::empty(),
                    },
                    input_time: pts_to_ms(vpts),
                    // position unknown without an index
                    input_normpos: NORMPOS_MAX as u16,
                    frame_number: Some(frame_number),
                    ..Default::default()
                });
            }
            self.video.cursor.advance();
        } else if let Some(stream) = self.audio.iter().position(|a| hdr.matches_stream(&a.tag)) {
            let timing = self.audio[stream].timing();
            let block_no = self.audio[stream].block_no;
            let total_before = self.audio[stream].total_bytes;
            self.audio[stream].total_bytes += len as u64;

            let max = host.audio_buffer_size().max(1);
            let mut left = len as usize;
            while left > 0 {
                let apts = audio_pts(&timing, block_no, total_before, len - left as u32);
                let size = left.min(max);
                left -= size;
                let Ok(data) = self.reader.read_bytes(size as u64) else { return false };
                let input_normpos = self.input_normpos(false);
                host.put_audio(Buffer {
                    stream: StreamId::Audio(stream),
                    pts: apts,
                    data,
                    flags: match left {
                        0 => BufferFlags::FRAME_END,
                        _ => BufferFlags::empty(),
                    },
                    input_time: pts_to_ms(apts),
                    input_normpos,
                    ..Default::default()
                });
            }
            let audio = &mut self.audio[stream];
            audio.cursor.advance();
            audio.block_no = audio.block_no.wrapping_add(audio.blocks_in(len));
        } else {
            tracing::debug!(offset = hdr.offset, tag = %hdr.name, size = len, "skipping chunk");
            if self.reader.skip(len as u64).is_err() {
                return false
            }
        }

        // pad byte
        match self.reader.pos() {
            Ok(pos) if pos & 1 == 1 => self.reader.skip(1).is_ok(),
            Ok(_) => true,
            Err(_) => false,
        }
    }
}
