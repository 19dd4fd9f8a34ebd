//! Byte sources for AVI sessions.
//!
//! Anything `Read + Seek` that knows its length can be used.
//! `StreamingInput` wraps forward-only sources (pipes, network streams)
//! and puts the session into streaming mode, where no index is built
//! and seeking is unavailable.

use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};

/// Byte stream consumed by an AVI session.
pub trait Input: Read + Seek {
    /// Total length in bytes. 0 if unknown.
    fn len(&self) -> u64;

    /// Whether arbitrary seeks are supported.
    /// If `false` the session runs in streaming mode.
    fn is_seekable(&self) -> bool {
        true
    }
}

/// Seekable input with a length probed once on creation.
#[derive(Debug)]
pub struct SeekableInput<R: Read + Seek> {
    inner: R,
    len: u64,
}

impl SeekableInput<BufReader<File>> {
    /// Opens file at `path` with a `BufReader`
    /// of optional custom capacity.
    pub fn open(path: &Path, capacity: Option<usize>) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = match capacity {
            Some(cap) => BufReader::with_capacity(cap, file),
            None => BufReader::new(file),
        };
        Self::new(reader)
    }
}

impl<R: Read + Seek> SeekableInput<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.rewind()?;
        Ok(Self { inner, len })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Re-probes the length, e.g. for files
    /// that are still being written.
    pub fn refresh_len(&mut self) -> io::Result<u64> {
        let pos = self.inner.stream_position()?;
        self.len = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(self.len)
    }
}

impl<R: Read + Seek> Read for SeekableInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> Seek for SeekableInput<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl<R: Read + Seek> Input for SeekableInput<R> {
    fn len(&self) -> u64 {
        self.len
    }
}

/// Forward-only input.
///
/// Seeking forward reads and discards. Seeking
/// backward fails with `ErrorKind::Unsupported`.
#[derive(Debug)]
pub struct StreamingInput<R: Read> {
    inner: R,
    pos: u64,
    len: u64,
}

impl<R: Read> StreamingInput<R> {
    /// New forward-only input. `len` is the announced
    /// total length, if known.
    pub fn new(inner: R, len: Option<u64>) -> Self {
        Self {
            inner,
            pos: 0,
            len: len.unwrap_or(0),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn skip(&mut self, count: u64) -> io::Result<u64> {
        let skipped = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
        self.pos += skipped;
        Ok(self.pos)
    }
}

impl<R: Read> Read for StreamingInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read> Seek for StreamingInput<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(abs) => Some(abs),
            SeekFrom::Current(rel) => self.pos.checked_add_signed(rel),
            SeekFrom::End(rel) => match self.len {
                0 => None,
                len => len.checked_add_signed(rel),
            },
        };
        match target {
            Some(t) if t >= self.pos => self.skip(t - self.pos),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "backward seek on forward-only input"
            )),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

impl<R: Read> Input for StreamingInput<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
