use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use crate::{consts::CHUNK_HEADER_SIZE, AviError, ChunkHeader, Input};

const READ_RESERVE_MAX: u64 = 1 << 20;

/// Reader over an AVI byte source,
/// with chunk header and sized reads.
#[derive(Debug)]
pub(crate) struct AviReader<R: Input> {
    pub(crate) inner: R,
}

impl<R: Input> AviReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner }
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }

    /// Input size in bytes. 0 if unknown.
    pub(crate) fn len(&self) -> u64 {
        self.inner.len()
    }

    pub(crate) fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// Current position.
    pub(crate) fn pos(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    /// Seeks to absolute position `pos`.
    pub(crate) fn seek_to(&mut self, pos: u64) -> io::Result<u64> {
        self.inner.seek(SeekFrom::Start(pos))
    }

    /// Seeks `count` bytes forward from current position.
    pub(crate) fn skip(&mut self, count: u64) -> io::Result<u64> {
        let rel = i64::try_from(count).map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?;
        self.inner.seek(SeekFrom::Current(rel))
    }

    /// Reads until `buf` is full or end of input.
    /// Returns number of bytes read.
    pub(crate) fn read_fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            match self.inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    /// Reads exactly `len` bytes into a new buffer.
    ///
    /// Raises `AviError::Allocation` if memory for `len` bytes
    /// can not be reserved, `AviError::ReadMismatch` on short reads.
    pub(crate) fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>, AviError> {
        let buf = self.read_upto(len)?;
        if buf.len() as u64 != len {
            return Err(AviError::ReadMismatch{got: buf.len() as u64, expected: len})
        }
        Ok(buf)
    }

    /// Reads up to `len` bytes, returning what was available.
    ///
    /// Memory is reserved up front for at most `READ_RESERVE_MAX` bytes,
    /// the rest grows with the data actually read, so that bogus chunk
    /// sizes do not allocate more than the input holds.
    pub(crate) fn read_upto(&mut self, len: u64) -> Result<Vec<u8>, AviError> {
        let reserve = usize::try_from(len.min(READ_RESERVE_MAX))?;
        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(reserve).map_err(|_| AviError::Allocation(len))?;
        (&mut self.inner).take(len).read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Reads chunk header at current position.
    /// Returns `None` if fewer than 8 bytes remain.
    pub(crate) fn header(&mut self) -> io::Result<Option<ChunkHeader>> {
        let offset = self.pos()?;
        let mut buf = [0_u8; CHUNK_HEADER_SIZE as usize];
        match self.read_fill(&mut buf)? {
            8 => Ok(Some(ChunkHeader::new(buf, offset))),
            _ => Ok(None),
        }
    }

    /// Reads chunk header at absolute position `pos`.
    pub(crate) fn header_at(&mut self, pos: u64) -> io::Result<Option<ChunkHeader>> {
        self.seek_to(pos)?;
        self.header()
    }

    /// Reads a four character code at current position.
    pub(crate) fn fourcc(&mut self) -> Result<[u8; 4], AviError> {
        let mut buf = [0_u8; 4];
        match self.read_fill(&mut buf)? {
            4 => Ok(buf),
            n => Err(AviError::ReadMismatch{got: n as u64, expected: 4}),
        }
    }
}
