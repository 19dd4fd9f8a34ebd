//! Seeking by normalized byte position or by time.
//!
//! Video is positioned first, on the keyframe at or before the target.
//! Each audio stream is then positioned independently on the timestamp of
//! that keyframe, down to the byte within a chunk.

use crate::{
    consts::NORMPOS_MAX,
    index::Stopper,
    timestamp::{audio_pts, video_pts},
    Avi, DemuxStatus, Host, Input,
};

/// Lowest value in `lo..hi` for which `pred` holds, or `hi` if none.
/// `pred` must be monotonic: once true, true for all larger values.
fn lower_bound<F>(mut lo: u64, mut hi: u64, pred: F) -> u64
where
    F: Fn(u64) -> bool,
{
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match pred(mid) {
            true => hi = mid,
            false => lo = mid + 1,
        }
    }
    lo
}

impl<R: Input> Avi<R> {
    /// Seeks to `normalized_pos` (`0..=65535`, proportional to input length)
    /// if non-zero, else to `time_ms` if non-zero, else to the start.
    ///
    /// Pending output is flushed first. Once positioned, the host
    /// receives exactly one `new_pts` with the timestamp of the video frame
    /// playback resumes from.
    ///
    /// Streaming input can not seek, the call only returns the status.
    pub fn seek<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        normalized_pos: u16,
        time_ms: i32,
        playing: bool,
    ) -> DemuxStatus {
        if self.streaming {
            tracing::debug!("seek on streaming input ignored");
            return self.status
        }

        if playing {
            host.flush();
        }

        self.status = self.seek_internal(host, normalized_pos, time_ms.max(0));
        self.status
    }

    fn seek_internal<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        normalized_pos: u16,
        time_ms: i32,
    ) -> DemuxStatus {
        let start_pos = normalized_pos as u64 * self.reader.len() / NORMPOS_MAX as u64;
        let start_pts = time_ms as i64 * 90;

        tracing::debug!(start_pos, time_ms, "seek");

        self.seek_start();

        let by_pos = start_pos > 0;
        let by_time = !by_pos && time_ms > 0;

        if by_pos {
            self.grow(Stopper::BytePosition(start_pos), host);
        } else if by_time {
            self.grow(Stopper::Timestamp(start_pts), host);
        }

        let frames = self.video.index.len();
        if (by_pos || by_time) && frames == 0 {
            tracing::info!(start_pos, time_ms, "no video frames to seek to");
            return DemuxStatus::Finished
        }

        let timing = self.video.timing();
        let entries = self.video.index.entries();
        // last frame starting at or before the target
        let after = if by_pos {
            lower_bound(0, frames as u64, |i| entries[i as usize].pos > start_pos)
        } else if by_time {
            lower_bound(0, frames as u64, |i| video_pts(&timing, i) > start_pts)
        } else {
            0
        };
        let target = after.saturating_sub(1) as usize;

        let frame = match self.video.index.keyframe_at_or_before(target) {
            Some(frame) => frame,
            None if frames == 0 => 0,
            None => {
                tracing::warn!(target, "no keyframe at or before seek target, starting at frame 0");
                0
            }
        };
        self.video.cursor.entry = frame;

        let vpts = video_pts(&timing, frame as u64);
        tracing::debug!(frame, vpts, "video positioned");

        for (stream, audio) in self.audio.iter_mut().enumerate() {
            let chunks = audio.index.len();
            if chunks == 0 {
                continue
            }
            let timing = audio.timing();
            let entries = audio.index.entries();
            let chunk_pts = |i: u64| {
                let e = &entries[i as usize];
                audio_pts(&timing, e.block_no, e.tot, 0)
            };

            let mut chunk = lower_bound(0, chunks as u64, |i| chunk_pts(i) >= vpts)
                .min(chunks as u64 - 1);
            if chunk_pts(chunk) > vpts && chunk > 0 {
                chunk -= 1;
            }

            let e = entries[chunk as usize];
            let offset = lower_bound(0, e.len as u64, |b| {
                audio_pts(&timing, e.block_no, e.tot, b as u32) >= vpts
            });

            audio.cursor.entry = chunk as usize;
            audio.cursor.offset_in_chunk = offset as u32;
            tracing::debug!(stream, chunk, offset, "audio positioned");
        }

        host.new_pts(vpts, true);

        DemuxStatus::Ok
    }
}
