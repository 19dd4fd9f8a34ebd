//! Various AVI-related errors.
//!
//! Only opening a file is fallible. Once a session exists,
//! index, playback and seek problems degrade to warnings
//! and an end-of-stream status instead.

use std::fmt;

/// AVI read/parse errors.
#[derive(Debug)]
pub enum AviError {
    /// Converted `BinResult` error.
    BinReadError(binrw::Error),
    /// IO error
    IOError(std::io::Error),
    /// Converted `TryFromIntError`.
    IntConversion(std::num::TryFromIntError),
    /// Neither `RIFF....AVI ` nor `ON2 ....ON2f`.
    NotAvi,
    /// Short read, e.g. truncated file
    /// or header list.
    ReadMismatch{got: u64, expected: u64},
    /// No `LIST hdrl` before end of file,
    /// or before `movi` for non-seekable input.
    NoHeaderList,
    /// No video `strh`/`strf` pair in `hdrl`.
    NoVideoStream,
    /// Chunk length inside `hdrl` that would not move
    /// the parse cursor forward.
    BadChunkSize{offset: u64},
    /// Could not reserve memory for a chunk of the
    /// specified size.
    Allocation(u64),
}

impl std::error::Error for AviError {}

impl fmt::Display for AviError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AviError::BinReadError(err) => write!(f, "{err}"),
            AviError::IOError(err) => write!(f, "IO error: {}", err),
            AviError::IntConversion(err) => write!(f, "{err}"),
            AviError::NotAvi => write!(f, "Not an AVI file."),
            AviError::ReadMismatch{got, expected} => write!(f, "Read {got} bytes, expected {expected} bytes."),
            AviError::NoHeaderList => write!(f, "No 'hdrl' header list."),
            AviError::NoVideoStream => write!(f, "No video stream header ('strh' and 'strf' for 'vids')."),
            AviError::BadChunkSize{offset} => write!(f, "Invalid chunk size in header list @ offset {offset}."),
            AviError::Allocation(size) => write!(f, "Failed to allocate {size} bytes."),
        }
    }
}

/// Converts std::io::Error to AviError
impl From<std::io::Error> for AviError {
    fn from(err: std::io::Error) -> Self {
        AviError::IOError(err)
    }
}

/// Converts std::num::TryFromIntError to AviError
impl From<std::num::TryFromIntError> for AviError {
    fn from(err: std::num::TryFromIntError) -> Self {
        AviError::IntConversion(err)
    }
}

/// Converts AviError to std::io::Error
impl From<AviError> for std::io::Error {
    fn from(err: AviError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}

/// Converts binrw::Error to AviError
impl From<binrw::Error> for AviError {
    fn from(err: binrw::Error) -> AviError {
        AviError::BinReadError(err)
    }
}
