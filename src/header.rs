//! Container header parsing.
//!
//! Walks the top level of the file for `LIST hdrl`, `LIST movi` and
//! `idx1`, then decodes the header list into a video stream and up to
//! eight audio streams.
//!
//! Stream formats (`strf`) and super indices (`indx`) belong to the most
//! recent stream header (`strh`). That association is tracked by
//! `LastTag`, which is reset by any chunk other than the inert ones
//! (`JUNK`, `strd`, `strn`, `vprp`).

use std::{io::Cursor, ops::Range};

use binrw::BinReaderExt;

use crate::{
    chunk_types::{BitmapInfoHeader, Dmlh, Idx1, RgbQuad, Strh, SuperIndex, WaveFormatEx},
    consts::{
        BITMAPINFOHEADER_SIZE, CHUNK_HEADER_SIZE, LIST_TYPE_SIZE, MAX_AUDIO_STREAMS,
        MAX_PALETTE_ENTRIES, SILENT_STREAM_NUMBER, STRH_SIZE, SUPERINDEX_HEADER_SIZE,
        WAVEFORMATEX_SIZE, XAN_AUDIO_RATE,
    },
    reader::AviReader,
    support::{fourcc_eq, le_u32, pad_even, string_from_fourcc, zero_padded},
    AudioCodec, AudioStream, AviError, FourCC, Input, PaletteEntry, VideoCodec, VideoStream,
};

/// Stream the most recent `strh` declared.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LastTag {
    None,
    Video,
    /// Index into audio streams.
    Audio(usize),
}

/// Everything read before the first data chunk is played.
#[derive(Debug, Default)]
pub(crate) struct AviHeader {
    pub(crate) video: VideoStream,
    pub(crate) audio: Vec<AudioStream>,
    /// Data range of `LIST movi`, starting after the list type.
    pub(crate) movi: Range<u64>,
    pub(crate) idx1: Option<Idx1>,
    /// From `dmlh`.
    pub(crate) total_frames: Option<u32>,
    /// Offset where the top level walk stopped.
    pub(crate) scan_end: u64,
}

/// Reads the top level chunks and the header list.
///
/// For non-seekable input, reading stops at `LIST movi`, leaving the
/// input positioned at the first chunk inside it.
pub(crate) fn read_header<R: Input>(
    reader: &mut AviReader<R>,
    streaming: bool,
) -> Result<AviHeader, AviError> {
    if !streaming {
        reader.seek_to(0)?;
    }

    let sig = reader.read_bytes(12)?;
    let riff = fourcc_eq(&sig[0..4], b"RIFF") && fourcc_eq(&sig[8..12], b"AVI ");
    let on2 = fourcc_eq(&sig[0..4], b"ON2 ") && fourcc_eq(&sig[8..12], b"ON2f");
    if !riff && !on2 {
        return Err(AviError::NotAvi)
    }

    let mut hdrl: Option<(Vec<u8>, u64)> = None;
    let mut movi: Option<Range<u64>> = None;
    let mut idx1: Option<Idx1> = None;
    let mut scan_end;

    loop {
        scan_end = reader.pos()?;
        let Some(hdr) = reader.header()? else { break };
        let mut n = hdr.padded_size();

        if n >= LIST_TYPE_SIZE && hdr.name == FourCC::List {
            let list_type = FourCC::from_slice(&reader.fourcc()?);
            n -= LIST_TYPE_SIZE;
            match list_type {
                FourCC::Hdrl => {
                    hdrl = Some((reader.read_bytes(n)?, hdr.list_data_offset()));
                }
                FourCC::Movi => {
                    let start = hdr.list_data_offset();
                    movi = Some(start .. start + n);
                    tracing::debug!(start, len = n, "movi list");
                    if streaming {
                        break
                    }
                }
                _ => (),
            }
        } else if matches!(hdr.name, FourCC::Idx1 | FourCC::Iddx) {
            match reader.read_bytes(n) {
                Ok(data) => {
                    let table = Idx1::from_data(&data);
                    tracing::debug!(entries = table.len(), "legacy index");
                    idx1 = Some(table);
                }
                Err(AviError::ReadMismatch{got, expected}) => {
                    tracing::warn!(got, expected, "truncated legacy index, ignoring it");
                    break
                }
                Err(err) => return Err(err),
            }
        }

        let next = hdr.offset_next_abs();
        match reader.seek_to(next) {
            Ok(pos) if pos == next => (),
            _ => {
                tracing::warn!(next, "failed to seek to next top level chunk");
                break
            }
        }
    }

    let Some((hdrl_data, hdrl_offset)) = hdrl else {
        return Err(AviError::NoHeaderList)
    };

    let mut header = parse_header_list(&hdrl_data, hdrl_offset)?;
    header.idx1 = idx1;
    header.scan_end = scan_end;
    header.movi = match movi {
        Some(range) => range,
        None => {
            tracing::warn!("no movi list, scanning from start of file");
            0 .. reader.len()
        }
    };

    Ok(header)
}

/// Decodes `LIST hdrl` data load.
/// `base` is the absolute file offset of `data`, for error reporting.
fn parse_header_list(data: &[u8], base: u64) -> Result<AviHeader, AviError> {
    let mut header = AviHeader::default();
    let mut video_strh: Option<(Strh, u32)> = None;
    let mut video_strf: Option<(BitmapInfoHeader, Vec<u8>, Vec<PaletteEntry>)> = None;
    let mut video_superindex: Option<SuperIndex> = None;

    let mut last = LastTag::None;
    let mut num_stream: u32 = 0;
    let mut i: usize = 0;

    while i < data.len() {
        let old = i;
        let Some(tag) = data.get(i .. i + 4) else { break };

        if fourcc_eq(tag, b"LIST") {
            i += (CHUNK_HEADER_SIZE + LIST_TYPE_SIZE) as usize;
            continue;
        }

        let Some(size) = le_u32(data, i + 4) else { break };
        let n = usize::try_from(pad_even(size as u64))?;
        let payload_start = i + CHUNK_HEADER_SIZE as usize;
        let payload = data
            .get(payload_start .. data.len().min(payload_start.saturating_add(size as usize)))
            .unwrap_or_default();

        match FourCC::from_slice(tag) {
            FourCC::Strh => {
                let strh = Cursor::new(zero_padded(payload, STRH_SIZE)).read_le::<Strh>()?;
                last = match strh.stream_type() {
                    FourCC::Vids if video_strh.is_none() => {
                        tracing::debug!(
                            stream = num_stream,
                            handler = %string_from_fourcc(strh.fcc_handler, true),
                            scale = strh.scale,
                            rate = strh.rate,
                            start = strh.start,
                            "video stream header"
                        );
                        video_strh = Some((strh, num_stream));
                        LastTag::Video
                    }
                    FourCC::Auds if header.audio.len() < MAX_AUDIO_STREAMS => {
                        tracing::debug!(
                            stream = num_stream,
                            scale = strh.scale,
                            rate = strh.rate,
                            sample_size = strh.sample_size,
                            "audio stream header"
                        );
                        header.audio.push(AudioStream {
                            strh,
                            stream_number: num_stream,
                            ..Default::default()
                        });
                        LastTag::Audio(header.audio.len() - 1)
                    }
                    FourCC::Auds => {
                        tracing::warn!(stream = num_stream, "too many audio streams, ignoring");
                        LastTag::None
                    }
                    _ => LastTag::None,
                };
                num_stream += 1;
            }
            FourCC::Dmlh => {
                if let Ok(dmlh) = Cursor::new(payload).read_le::<Dmlh>() {
                    header.total_frames = Some(dmlh.total_frames);
                }
            }
            FourCC::Strf => match last {
                LastTag::Video => {
                    let bih_data = zero_padded(payload, BITMAPINFOHEADER_SIZE);
                    let bih = Cursor::new(&bih_data).read_le::<BitmapInfoHeader>()?;
                    let palette = read_palette(&bih, payload);
                    video_strf = Some((bih, bih_data, palette));
                }
                LastTag::Audio(idx) => {
                    let wavex = Cursor::new(zero_padded(payload, WAVEFORMATEX_SIZE))
                        .read_le::<WaveFormatEx>()?;
                    let audio = &mut header.audio[idx];
                    audio.wavex = wavex;
                    audio.wavex_data = payload.to_vec();
                }
                LastTag::None => (),
            },
            FourCC::Indx => {
                if n < SUPERINDEX_HEADER_SIZE {
                    tracing::warn!(offset = base + old as u64, size, "broken super index");
                } else {
                    match SuperIndex::from_data(payload) {
                        Some(superindex) => match last {
                            LastTag::Video => video_superindex = Some(superindex),
                            LastTag::Audio(idx) => header.audio[idx].superindex = Some(superindex),
                            LastTag::None => {
                                tracing::debug!("super index for unsupported stream")
                            }
                        },
                        None => {
                            tracing::warn!(offset = base + old as u64, size, "broken super index")
                        }
                    }
                }
            }
            f if f.is_inert() => (),
            _ => last = LastTag::None,
        }

        i = payload_start
            .checked_add(n)
            .ok_or(AviError::BadChunkSize{offset: base + old as u64})?;
        if i <= old {
            return Err(AviError::BadChunkSize{offset: base + old as u64})
        }
    }

    let (Some((strh, stream_number)), Some((bih, bih_data, palette))) = (video_strh, video_strf) else {
        return Err(AviError::NoVideoStream)
    };

    let (codec, xvid_handler) = video_codec(&strh, &bih);
    header.video = VideoStream {
        tag: stream_tag(stream_number, *b"db"),
        codec,
        strh,
        bih,
        bih_data,
        palette,
        stream_number,
        superindex: video_superindex,
        ..Default::default()
    };
    if xvid_handler {
        header.video.bih.compression = header.video.strh.fcc_handler;
        header.video.bih_data[16..20].copy_from_slice(&header.video.strh.fcc_handler);
    }

    let xan = header.video.codec == VideoCodec::Xan;
    for audio in header.audio.iter_mut() {
        if audio.wavex.channels == 0 {
            audio.stream_number = SILENT_STREAM_NUMBER;
        }
        audio.tag = stream_tag(audio.stream_number, *b"wb");
        audio.codec = match xan {
            true => {
                audio.strh.rate = XAN_AUDIO_RATE;
                AudioCodec::XanDpcm
            }
            false => AudioCodec::from_format_tag(audio.wavex.format_tag),
        };
        if !audio.codec.is_known() {
            tracing::warn!(
                stream = audio.stream_number,
                format_tag = audio.wavex.format_tag,
                "unknown audio codec"
            );
        }
    }

    Ok(header)
}

/// Data chunk tag: two digit stream number and a two character type.
fn stream_tag(stream_number: u32, kind: [u8; 2]) -> [u8; 4] {
    [
        b'0'.wrapping_add((stream_number / 10) as u8),
        b'0'.wrapping_add((stream_number % 10) as u8),
        kind[0],
        kind[1],
    ]
}

/// Classifies video by `biCompression`, falling back on the `strh` handler.
///
/// MPEG-4 in `biCompression` with an XviD handler is XviD, and only then
/// is `true` returned: `biCompression` must be replaced by the handler.
fn video_codec(strh: &Strh, bih: &BitmapInfoHeader) -> (VideoCodec, bool) {
    let handler = VideoCodec::from_fourcc(strh.fcc_handler);
    let (codec, xvid_handler) = match VideoCodec::from_fourcc(bih.compression) {
        VideoCodec::Mpeg4 if handler == VideoCodec::Xvid => (VideoCodec::Xvid, true),
        VideoCodec::Other(_) if handler.is_known() && handler != VideoCodec::Rgb => (handler, false),
        codec => (codec, false),
    };
    if !codec.is_known() {
        tracing::warn!(fourcc = codec.name(), "unknown video codec");
    }
    (codec, xvid_handler)
}

/// Palette following `BITMAPINFOHEADER` in `strf`.
///
/// If `strf` is too short for the announced number of entries,
/// a 256 entry greyscale palette is generated instead.
fn read_palette(bih: &BitmapInfoHeader, strf: &[u8]) -> Vec<PaletteEntry> {
    let count = bih.clr_used.min(MAX_PALETTE_ENTRIES) as usize;
    let available = strf.len().saturating_sub(BITMAPINFOHEADER_SIZE);

    match available >= count * 4 {
        true => {
            let mut cursor = Cursor::new(&strf[BITMAPINFOHEADER_SIZE.min(strf.len())..]);
            (0..count)
                .filter_map(|_| cursor.read_le::<RgbQuad>().ok())
                .map(|q| PaletteEntry{red: q.red, green: q.green, blue: q.blue})
                .collect()
        }
        false => (0 ..= 255_u8)
            .map(|v| PaletteEntry{red: v, green: v, blue: v})
            .collect(),
    }
}
