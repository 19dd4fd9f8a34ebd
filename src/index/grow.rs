//! Index growth: scan `movi` chunk by chunk from the growth cursor until
//! a stop condition holds, the input ends, or the host wants control back.
//!
//! The input position is restored afterwards, so growth can run in the
//! middle of playback.

use crate::{timestamp::video_pts, Avi, Host, Input};

/// Condition that ends index growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Stopper {
    /// Video frame with this number is indexed.
    VideoFrame(usize),
    /// Audio chunk `chunk` of stream `stream` is indexed.
    AudioChunk{stream: usize, chunk: usize},
    /// A keyframe at or after this absolute byte offset is indexed.
    BytePosition(u64),
    /// A keyframe at or after this 90kHz timestamp is indexed.
    Timestamp(i64),
}

impl<R: Input> Avi<R> {
    pub(crate) fn is_satisfied(&self, stopper: Stopper) -> bool {
        match stopper {
            Stopper::VideoFrame(frame) => self.video.index.len() > frame,
            Stopper::AudioChunk{stream, chunk} => self.audio
                .get(stream)
                .is_some_and(|a| a.index.len() > chunk),
            Stopper::BytePosition(target) => self.video.index
                .entries()
                .iter()
                .rev()
                .take_while(|e| e.pos >= target)
                .any(|e| e.is_keyframe()),
            Stopper::Timestamp(target) => {
                let timing = self.video.timing();
                self.video.index
                    .entries()
                    .iter()
                    .enumerate()
                    .rev()
                    .take_while(|(i, _)| video_pts(&timing, *i as u64) >= target)
                    .any(|(_, e)| e.is_keyframe())
            }
        }
    }

    /// Grows the index until `stopper` is satisfied.
    ///
    /// Returns `true` if it is, `false` if scanning stopped first
    /// (end of input, read error, host interruption).
    pub(crate) fn grow<H: Host + ?Sized>(&mut self, stopper: Stopper, host: &mut H) -> bool {
        if self.is_satisfied(stopper) {
            return true
        }

        let saved = match self.reader.pos() {
            Ok(pos) => pos,
            Err(err) => {
                tracing::warn!(%err, "can not read input position, not growing index");
                return false
            }
        };

        let len = self.reader.len();
        let interval = self.options.progress_interval.max(1);
        let mut scanned: u32 = 0;
        let mut sent_progress = false;
        let mut satisfied = false;

        loop {
            if self.is_satisfied(stopper) {
                satisfied = true;
                break
            }
            if host.action_pending() {
                tracing::debug!(?stopper, "index growth interrupted");
                break
            }

            scanned = scanned.wrapping_add(1);
            if scanned % interval == 0 && len > 0 {
                let percent = (self.growth.next_tag_offset.saturating_mul(100) / len).min(100);
                host.progress(percent as u8);
                sent_progress = true;
            }

            if let Err(end) = self.scan_chunk() {
                tracing::debug!(?end, offset = self.growth.next_tag_offset, "index growth stopped");
                self.growth.last_stop = Some(end);
                break
            }
        }

        if sent_progress {
            host.progress(100);
        }

        if let Err(err) = self.reader.seek_to(saved) {
            tracing::warn!(%err, saved, "failed to restore input position after index growth");
        }

        satisfied
    }
}
