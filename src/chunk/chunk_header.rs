use crate::{
    consts::{CHUNK_HEADER_SIZE, LIST_TYPE_SIZE},
    support::{fourcc_eq, pad_even},
    FourCC,
};

/// RIFF chunk header. Always 8 bytes.
///
/// ```ignore
/// | [X X X X] [Y Y Y Y] |
///    |         |
///    |         32bit little endian data size (excludes header and pad byte)
///    FourCC
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChunkHeader {
    /// FourCC
    pub(crate) name: FourCC,
    /// FourCC as stored, for matching stream data
    /// chunks such as `00db` or `01wb`.
    pub(crate) tag: [u8; 4],
    /// Data size in bytes, excluding header
    /// and pad byte.
    pub(crate) size: u32,
    /// Absolute byte offset for start of chunk,
    /// i.e. byte offset for its header.
    pub(crate) offset: u64,
}

impl ChunkHeader {
    pub(crate) fn new(bytes: [u8; 8], offset: u64) -> Self {
        let tag = [bytes[0], bytes[1], bytes[2], bytes[3]];
        Self {
            name: FourCC::from_slice(&tag),
            tag,
            size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            offset,
        }
    }

    pub fn name(&self) -> &FourCC {
        &self.name
    }

    pub fn tag(&self) -> [u8; 4] {
        self.tag
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// `LIST` or `RIFF`.
    pub fn is_list(&self) -> bool {
        self.name.is_list()
    }

    /// Data load absolute offset,
    /// i.e. position after header.
    pub fn data_offset(&self) -> u64 {
        self.offset + CHUNK_HEADER_SIZE
    }

    /// Absolute offset of the first sub-chunk
    /// for `LIST`/`RIFF`, i.e. after the list type.
    pub fn list_data_offset(&self) -> u64 {
        self.data_offset() + LIST_TYPE_SIZE
    }

    /// Data size padded to 16-bit boundary.
    pub fn padded_size(&self) -> u64 {
        pad_even(self.size as u64)
    }

    /// Absolute offset to next chunk on the same level.
    pub fn offset_next_abs(&self) -> u64 {
        self.data_offset() + self.padded_size()
    }

    /// Returns `true` if the first two characters of the tag,
    /// i.e. the stream number, match those of `stream_tag`.
    pub fn matches_stream(&self, stream_tag: &[u8; 4]) -> bool {
        self.tag[..2] == stream_tag[..2]
    }

    /// Case-insensitive match against full tag and size,
    /// used when verifying index offsets against the file.
    pub fn matches(&self, tag: &[u8; 4], size: u32) -> bool {
        fourcc_eq(&self.tag, tag) && self.size == size
    }
}
