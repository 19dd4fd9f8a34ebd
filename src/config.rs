//! Session options.

use crate::consts::{NUM_PREVIEW_BUFFERS, PROGRESS_INTERVAL};

/// Options for opening an AVI session.
///
/// ```rs
/// use aviiter::AviOptions;
///
/// let options = AviOptions::default()
///     .with_preview_buffers(4)
///     .with_progress_interval(500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AviOptions {
    /// Units sent with the `PREVIEW` flag after the headers.
    /// Seekable input only.
    pub preview_buffers: usize,
    /// Chunks scanned between progress notifications
    /// during index growth.
    pub progress_interval: u32,
}

impl Default for AviOptions {
    fn default() -> Self {
        Self {
            preview_buffers: NUM_PREVIEW_BUFFERS,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl AviOptions {
    pub fn with_preview_buffers(self, preview_buffers: usize) -> Self {
        Self { preview_buffers, ..self }
    }

    /// Minimum 1.
    pub fn with_progress_interval(self, progress_interval: u32) -> Self {
        Self { progress_interval: progress_interval.max(1), ..self }
    }
}
