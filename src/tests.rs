use std::{
    cell::RefCell,
    io::{self, Cursor, Read, Seek, SeekFrom},
    rc::Rc,
};

use crate::{
    consts::DEFAULT_BUFFER_SIZE,
    index::{scanner::is_keyframe, ScanEnd, Stopper},
    timestamp::{audio_pts, pts_to_ms, video_pts},
    AudioCodec, AudioTiming, Avi, AviError, AviOptions, Buffer, BufferFlags, BufferInfo,
    DemuxStatus, Host, Idx1Base, IndexSource, Input, SeekableInput, StreamId, StreamInfo,
    StreamingInput, VideoCodec, VideoTiming,
};

// Synthetic AVI files

fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut b = Vec::with_capacity(data.len() + 9);
    b.extend_from_slice(tag);
    b.extend_from_slice(&(data.len() as u32).to_le_bytes());
    b.extend_from_slice(data);
    if data.len() % 2 == 1 {
        b.push(0);
    }
    b
}

fn list(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut b = Vec::with_capacity(body.len() + 12);
    b.extend_from_slice(b"LIST");
    b.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
    b.extend_from_slice(kind);
    b.extend_from_slice(body);
    b
}

fn strh(kind: &[u8; 4], handler: [u8; 4], scale: u32, rate: u32, sample_size: u32) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(kind);
    b.extend_from_slice(&handler);
    b.extend_from_slice(&0_u32.to_le_bytes()); // flags
    b.extend_from_slice(&0_u16.to_le_bytes()); // priority
    b.extend_from_slice(&0_u16.to_le_bytes()); // language
    b.extend_from_slice(&0_u32.to_le_bytes()); // initial frames
    b.extend_from_slice(&scale.to_le_bytes());
    b.extend_from_slice(&rate.to_le_bytes());
    b.extend_from_slice(&0_u32.to_le_bytes()); // start
    b.extend_from_slice(&0_u32.to_le_bytes()); // length
    b.extend_from_slice(&0_u32.to_le_bytes()); // suggested buffer size
    b.extend_from_slice(&u32::MAX.to_le_bytes()); // quality
    b.extend_from_slice(&sample_size.to_le_bytes());
    b.extend_from_slice(&[0; 8]); // rcFrame
    b
}

#[derive(Debug, Clone)]
struct AudioParams {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits: u16,
    scale: u32,
    rate: u32,
    sample_size: u32,
    extra: Vec<u8>,
}

impl AudioParams {
    /// 44.1kHz stereo 16-bit PCM.
    fn pcm() -> Self {
        Self {
            format_tag: 1,
            channels: 2,
            sample_rate: 44100,
            block_align: 4,
            bits: 16,
            scale: 1,
            rate: 44100,
            sample_size: 0,
            extra: Vec::new(),
        }
    }

    fn wavex(&self) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&self.format_tag.to_le_bytes());
        b.extend_from_slice(&self.channels.to_le_bytes());
        b.extend_from_slice(&self.sample_rate.to_le_bytes());
        b.extend_from_slice(&(self.sample_rate * self.block_align as u32).to_le_bytes());
        b.extend_from_slice(&self.block_align.to_le_bytes());
        b.extend_from_slice(&self.bits.to_le_bytes());
        b.extend_from_slice(&(self.extra.len() as u16).to_le_bytes());
        b.extend_from_slice(&self.extra);
        b
    }

    fn tag(&self, stream: usize) -> [u8; 4] {
        match self.channels {
            0 => *b"99wb",
            _ => {
                let n = stream as u8 + 1;
                [b'0' + n / 10, b'0' + n % 10, b'w', b'b']
            }
        }
    }

    fn timing(&self) -> AudioTiming {
        AudioTiming {
            scale: self.scale,
            rate: self.rate,
            start: 0,
            sample_size: self.sample_size,
            block_align: self.block_align,
        }
    }
}

#[derive(Debug, Clone)]
enum Data {
    Video{data: Vec<u8>, keyframe: bool},
    Audio{stream: usize, data: Vec<u8>},
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum IndexKind {
    None,
    /// `idx1` with offsets from start of file.
    Absolute,
    /// `idx1` with offsets from the `movi` list type.
    MoviRelative,
    /// `idx1` with offsets matching neither.
    Broken,
    /// Video `indx` pointing to `ix00` chunks after `movi`.
    OpenDml{per_chunk: usize},
}

#[derive(Debug, Clone)]
struct AviBuilder {
    compression: [u8; 4],
    handler: [u8; 4],
    /// `biSize` as written. The `strf` payload is always 40 bytes plus palette.
    bi_size: u32,
    scale: u32,
    rate: u32,
    width: i32,
    height: i32,
    bit_count: u16,
    clr_used: u32,
    palette: Vec<u8>,
    audio: Vec<AudioParams>,
    chunks: Vec<Data>,
    index: IndexKind,
    total_frames: Option<u32>,
    rec_lists: bool,
    junk_after_strh: bool,
}

/// Built file and where its data chunks ended up.
#[derive(Debug, Clone)]
struct Built {
    data: Vec<u8>,
    /// Data offsets of video chunks.
    video_pos: Vec<u64>,
    /// Data offsets of audio chunks, per stream.
    audio_pos: Vec<Vec<u64>>,
    movi_start: u64,
    /// Offset and size of each `ix00` chunk.
    ix: Vec<(u64, u32)>,
}

impl AviBuilder {
    /// 25 fps Motion JPEG, no audio, no index.
    fn new() -> Self {
        Self {
            compression: *b"MJPG",
            handler: *b"mjpg",
            bi_size: 40,
            scale: 1,
            rate: 25,
            width: 320,
            height: 240,
            bit_count: 24,
            clr_used: 0,
            palette: Vec::new(),
            audio: Vec::new(),
            chunks: Vec::new(),
            index: IndexKind::None,
            total_frames: None,
            rec_lists: false,
            junk_after_strh: false,
        }
    }

    fn codec(mut self, fourcc: &[u8; 4]) -> Self {
        self.compression = *fourcc;
        self.handler = *fourcc;
        self
    }

    fn audio(mut self, params: AudioParams) -> Self {
        self.audio.push(params);
        self
    }

    fn index(mut self, kind: IndexKind) -> Self {
        self.index = kind;
        self
    }

    fn video(mut self, data: Vec<u8>, keyframe: bool) -> Self {
        self.chunks.push(Data::Video{data, keyframe});
        self
    }

    fn audio_chunk(mut self, stream: usize, data: Vec<u8>) -> Self {
        self.chunks.push(Data::Audio{stream, data});
        self
    }

    /// `frames` video chunks of `frame_len` bytes, each followed
    /// by an audio chunk of `audio_len` bytes for stream 0.
    fn interleaved(mut self, frames: usize, frame_len: usize, audio_len: usize) -> Self {
        for i in 0 .. frames {
            self = self.video(frame(i, frame_len, true), true);
            if !self.audio.is_empty() {
                self = self.audio_chunk(0, vec![i as u8; audio_len]);
            }
        }
        self
    }

    fn strf_video(&self) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&self.bi_size.to_le_bytes());
        b.extend_from_slice(&self.width.to_le_bytes());
        b.extend_from_slice(&self.height.to_le_bytes());
        b.extend_from_slice(&1_u16.to_le_bytes()); // planes
        b.extend_from_slice(&self.bit_count.to_le_bytes());
        b.extend_from_slice(&self.compression);
        b.extend_from_slice(&0_u32.to_le_bytes()); // size image
        b.extend_from_slice(&0_i32.to_le_bytes());
        b.extend_from_slice(&0_i32.to_le_bytes());
        b.extend_from_slice(&self.clr_used.to_le_bytes());
        b.extend_from_slice(&0_u32.to_le_bytes());
        b.extend_from_slice(&self.palette);
        b
    }

    fn ix_count(&self) -> usize {
        let frames = self.chunks.iter().filter(|c| matches!(c, Data::Video{..})).count();
        match self.index {
            IndexKind::OpenDml{per_chunk} => frames.div_ceil(per_chunk),
            _ => 0,
        }
    }

    fn build(&self) -> Built {
        // super index offsets are only known after layout
        let first = self.layout(&[]);
        self.layout(&first.ix)
    }

    fn layout(&self, ix: &[(u64, u32)]) -> Built {
        let mut vstrl = chunk(b"strh", &strh(b"vids", self.handler, self.scale, self.rate, 0));
        if self.junk_after_strh {
            vstrl.extend(chunk(b"JUNK", &[0; 6]));
        }
        vstrl.extend(chunk(b"strf", &self.strf_video()));
        if let IndexKind::OpenDml{..} = self.index {
            let count = self.ix_count();
            let mut indx = Vec::new();
            indx.extend_from_slice(&4_u16.to_le_bytes());
            indx.push(0);
            indx.push(0); // index of indexes
            indx.extend_from_slice(&(count as u32).to_le_bytes());
            indx.extend_from_slice(b"00db");
            indx.extend_from_slice(&[0; 12]);
            for i in 0 .. count {
                let (offset, size) = ix.get(i).copied().unwrap_or_default();
                indx.extend_from_slice(&offset.to_le_bytes());
                indx.extend_from_slice(&size.to_le_bytes());
                indx.extend_from_slice(&0_u32.to_le_bytes());
            }
            vstrl.extend(chunk(b"indx", &indx));
        }

        let mut hdrl = chunk(b"avih", &[0; 56]);
        hdrl.extend(list(b"strl", &vstrl));
        for a in self.audio.iter() {
            let mut astrl = chunk(b"strh", &strh(b"auds", [0; 4], a.scale, a.rate, a.sample_size));
            astrl.extend(chunk(b"strf", &a.wavex()));
            hdrl.extend(list(b"strl", &astrl));
        }
        if let Some(total) = self.total_frames {
            let mut dmlh = total.to_le_bytes().to_vec();
            dmlh.resize(248, 0);
            hdrl.extend(list(b"odml", &chunk(b"dmlh", &dmlh)));
        }

        let mut file = Vec::new();
        file.extend_from_slice(b"RIFF");
        file.extend_from_slice(&[0; 4]);
        file.extend_from_slice(b"AVI ");
        file.extend(list(b"hdrl", &hdrl));

        let movi_hdr = file.len();
        file.extend_from_slice(b"LIST");
        file.extend_from_slice(&[0; 4]);
        file.extend_from_slice(b"movi");
        let movi_start = file.len() as u64;

        let mut video_pos = Vec::new();
        // length, keyframe
        let mut video_meta = Vec::new();
        let mut audio_pos = vec![Vec::new(); self.audio.len()];
        // tag, flags, chunk header offset, size
        let mut entries: Vec<([u8; 4], u32, u64, u32)> = Vec::new();

        for c in self.chunks.iter() {
            let (tag, data, flags) = match c {
                Data::Video{data, keyframe} => (*b"00db", data, if *keyframe {0x10} else {0}),
                Data::Audio{stream, data} => (self.audio[*stream].tag(*stream), data, 0x10),
            };
            let hdr_offset = match self.rec_lists {
                true => file.len() as u64 + 12,
                false => file.len() as u64,
            };
            let raw = chunk(&tag, data);
            match self.rec_lists {
                true => file.extend(list(b"rec ", &raw)),
                false => file.extend(raw),
            }
            match c {
                Data::Video{data, keyframe} => {
                    video_pos.push(hdr_offset + 8);
                    video_meta.push((data.len() as u32, *keyframe));
                }
                Data::Audio{stream, ..} => audio_pos[*stream].push(hdr_offset + 8),
            }
            entries.push((tag, flags, hdr_offset, data.len() as u32));
        }

        let movi_size = (file.len() - movi_hdr - 8) as u32;
        file[movi_hdr + 4 .. movi_hdr + 8].copy_from_slice(&movi_size.to_le_bytes());

        let mut ix_out = Vec::new();
        if let IndexKind::OpenDml{per_chunk} = self.index {
            let base = movi_start;
            let frames = video_pos.iter().copied().zip(video_meta.iter().copied()).collect::<Vec<_>>();
            for group in frames.chunks(per_chunk) {
                let mut data = Vec::new();
                data.extend_from_slice(&2_u16.to_le_bytes());
                data.push(0);
                data.push(1); // index of chunks
                data.extend_from_slice(&(group.len() as u32).to_le_bytes());
                data.extend_from_slice(b"00db");
                data.extend_from_slice(&base.to_le_bytes());
                data.extend_from_slice(&0_u32.to_le_bytes());
                for (pos, (len, key)) in group.iter() {
                    let size = match key {
                        true => *len,
                        false => len | 0x8000_0000,
                    };
                    data.extend_from_slice(&((pos - base) as u32).to_le_bytes());
                    data.extend_from_slice(&size.to_le_bytes());
                }
                ix_out.push((file.len() as u64, data.len() as u32));
                file.extend(chunk(b"ix00", &data));
            }
        }

        let idx1_base = match self.index {
            IndexKind::Absolute => Some(0),
            IndexKind::MoviRelative => Some(movi_start - 4),
            _ => None,
        };
        if let Some(base) = idx1_base.or((self.index == IndexKind::Broken).then_some(0)) {
            let mut data = Vec::new();
            for (tag, flags, offset, size) in entries.iter() {
                let offset = match self.index {
                    IndexKind::Broken => offset + 3,
                    _ => offset - base,
                };
                data.extend_from_slice(tag);
                data.extend_from_slice(&flags.to_le_bytes());
                data.extend_from_slice(&(offset as u32).to_le_bytes());
                data.extend_from_slice(&size.to_le_bytes());
            }
            file.extend(chunk(b"idx1", &data));
        }

        let riff_size = (file.len() - 8) as u32;
        file[4..8].copy_from_slice(&riff_size.to_le_bytes());

        Built {
            data: file,
            video_pos,
            audio_pos,
            movi_start,
            ix: ix_out,
        }
    }
}

/// Video chunk data. MPEG-4 style: keyframes start with
/// a VOL start code, other frames with a VOP start code.
fn frame(n: usize, len: usize, keyframe: bool) -> Vec<u8> {
    let mut data = vec![n as u8; len.max(4)];
    let code = match keyframe {
        true => [0, 0, 1, 0xB0],
        false => [0, 0, 1, 0xB6],
    };
    data[..4].copy_from_slice(&code);
    data
}

type MemAvi = Avi<SeekableInput<Cursor<Vec<u8>>>>;

fn open(data: Vec<u8>) -> MemAvi {
    open_with(data, AviOptions::default())
}

fn open_with(data: Vec<u8>, options: AviOptions) -> MemAvi {
    let input = SeekableInput::new(Cursor::new(data)).unwrap();
    Avi::with_options(input, options).unwrap()
}

fn open_err(data: Vec<u8>) -> AviError {
    let input = SeekableInput::new(Cursor::new(data)).unwrap();
    Avi::open(input).unwrap_err()
}

// Host

#[derive(Debug, Default)]
struct Recorder {
    video: Vec<Buffer>,
    audio: Vec<Buffer>,
    /// Non-header buffers in emission order.
    order: Vec<(StreamId, i64)>,
    info: Option<StreamInfo>,
    started: bool,
    flushes: usize,
    new_pts: Vec<(i64, bool)>,
    progress: Vec<u8>,
    video_max: Option<usize>,
    audio_max: Option<usize>,
    cancel: bool,
}

impl Recorder {
    fn frames(&self) -> Vec<&Buffer> {
        self.video.iter().filter(|b| !b.flags.contains(BufferFlags::HEADER)).collect()
    }

    fn samples(&self) -> Vec<&Buffer> {
        self.audio.iter().filter(|b| !b.flags.contains(BufferFlags::HEADER)).collect()
    }
}

impl Host for Recorder {
    fn video_buffer_size(&self) -> usize {
        self.video_max.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    fn audio_buffer_size(&self) -> usize {
        self.audio_max.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    fn put_video(&mut self, buffer: Buffer) {
        if !buffer.flags.contains(BufferFlags::HEADER) {
            self.order.push((buffer.stream, buffer.pts));
        }
        self.video.push(buffer)
    }

    fn put_audio(&mut self, buffer: Buffer) {
        if !buffer.flags.contains(BufferFlags::HEADER) {
            self.order.push((buffer.stream, buffer.pts));
        }
        self.audio.push(buffer)
    }

    fn stream_info(&mut self, info: &StreamInfo) {
        self.info = Some(info.clone())
    }

    fn start(&mut self) {
        self.started = true
    }

    fn flush(&mut self) {
        self.flushes += 1
    }

    fn new_pts(&mut self, pts: i64, seek: bool) {
        self.new_pts.push((pts, seek))
    }

    fn progress(&mut self, percent: u8) {
        self.progress.push(percent)
    }

    fn action_pending(&self) -> bool {
        self.cancel
    }
}

/// File that is still being written: reads see
/// whatever has been appended so far.
#[derive(Debug, Clone)]
struct LiveFile {
    data: Rc<RefCell<Vec<u8>>>,
    pos: u64,
}

impl Read for LiveFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.borrow();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start .. start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for LiveFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.data.borrow().len() as u64;
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(rel) => self.pos.checked_add_signed(rel),
            SeekFrom::End(rel) => len.checked_add_signed(rel),
        };
        match target {
            Some(t) => {
                self.pos = t;
                Ok(t)
            }
            None => Err(io::Error::new(io::ErrorKind::InvalidInput, "negative seek")),
        }
    }
}

impl Input for LiveFile {
    fn len(&self) -> u64 {
        self.data.borrow().len() as u64
    }
}

// Timestamps

#[test]
fn video_and_audio_pts_at_one_second() {
    let video = VideoTiming{scale: 1, rate: 25, start: 0};
    assert_eq!(video_pts(&video, 0), 0);
    assert_eq!(video_pts(&video, 25), 90000);

    let audio = AudioParams::pcm().timing();
    assert!(!audio.is_vbr());
    assert_eq!(audio_pts(&audio, 0, 0, 0), 0);
    assert_eq!(audio_pts(&audio, 0, 176400, 0), 90000);
    // offset within chunk counts the same as bytes before it
    assert_eq!(audio_pts(&audio, 0, 88200, 88200), 90000);
}

#[test]
fn vbr_audio_pts_counts_blocks() {
    // MP3, 1152 samples per block
    let audio = AudioTiming{scale: 1152, rate: 44100, start: 0, sample_size: 0, block_align: 1152};
    assert!(audio.is_vbr());
    assert_eq!(audio_pts(&audio, 0, 0, 0), 0);
    assert_eq!(audio_pts(&audio, 1225, 999_999, 500), 32 * 90000);
}

#[test]
fn zero_rate_gives_zero_pts() {
    assert_eq!(video_pts(&VideoTiming{scale: 1, rate: 0, start: 0}, 100), 0);
    let audio = AudioTiming{rate: 0, ..AudioParams::pcm().timing()};
    assert_eq!(audio_pts(&audio, 3, 4000, 10), 0);
}

#[test]
fn video_pts_non_decreasing() {
    let ntsc = VideoTiming{scale: 1001, rate: 30000, start: 0};
    for i in 0 .. 10_000 {
        assert!(video_pts(&ntsc, i) <= video_pts(&ntsc, i + 1));
    }
    assert_eq!(pts_to_ms(video_pts(&ntsc, 30)), 1001);
}

// Keyframe heuristic

#[test]
fn keyframe_heuristic() {
    assert!(is_keyframe(&VideoCodec::Mpeg4, &[0, 0, 1, 0xB0, 0]));
    assert!(!is_keyframe(&VideoCodec::Mpeg4, &[0, 0, 1, 0xB6, 0]));
    assert!(!is_keyframe(&VideoCodec::Xvid, &[0, 0, 1, 0xB6]));
    assert!(!is_keyframe(&VideoCodec::DivX5, &[0, 0, 1, 0xB6]));

    assert!(is_keyframe(&VideoCodec::MsMpeg4V3, &[0x3F, 0xFF, 0xFF, 0xFF]));
    assert!(!is_keyframe(&VideoCodec::MsMpeg4V3, &[0x40, 0, 0, 0]));
    assert!(!is_keyframe(&VideoCodec::MsMpeg4V2, &[0x40, 0, 0, 0]));

    // v1 picture type sits 5 bits further into the second word
    assert!(!is_keyframe(&VideoCodec::MsMpeg4V1, &[0, 0, 0, 0, 0x02, 0, 0, 0]));
    assert!(is_keyframe(&VideoCodec::MsMpeg4V1, &[0x40, 0, 0, 0, 0, 0, 0, 0]));

    // too short to tell, or not inspected
    assert!(is_keyframe(&VideoCodec::MsMpeg4V3, &[0x40, 0]));
    assert!(is_keyframe(&VideoCodec::Mpeg4, &[]));
    assert!(is_keyframe(&VideoCodec::H264, &[0, 0, 1, 0xB6]));
    assert!(is_keyframe(&VideoCodec::Mjpeg, &[0x40, 0, 0, 0]));
}

// Header parsing

#[test]
fn not_avi() {
    let err = open_err(b"RIFF\x24\x00\x00\x00WAVEfmt \x10\x00\x00\x00".to_vec());
    assert!(matches!(err, AviError::NotAvi));

    let err = open_err(b"RIFF".to_vec());
    assert!(matches!(err, AviError::ReadMismatch{got: 4, expected: 12}));
}

#[test]
fn missing_header_list() {
    let body = [b"AVI ".to_vec(), list(b"movi", &chunk(b"00db", &[1, 2, 3, 4]))].concat();
    let file = [b"RIFF".to_vec(), (body.len() as u32).to_le_bytes().to_vec(), body].concat();
    assert!(matches!(open_err(file), AviError::NoHeaderList));
}

#[test]
fn missing_video_stream() {
    let audio = AudioParams::pcm();
    let astrl = [
        chunk(b"strh", &strh(b"auds", [0; 4], 1, 44100, 0)),
        chunk(b"strf", &audio.wavex()),
    ].concat();
    let hdrl = [chunk(b"avih", &[0; 56]), list(b"strl", &astrl)].concat();
    let body = [b"AVI ".to_vec(), list(b"hdrl", &hdrl), list(b"movi", &[])].concat();
    let file = [b"RIFF".to_vec(), (body.len() as u32).to_le_bytes().to_vec(), body].concat();
    assert!(matches!(open_err(file), AviError::NoVideoStream));
}

#[test]
fn on2_signature() {
    let mut data = AviBuilder::new().interleaved(3, 64, 0).build().data;
    data[0..4].copy_from_slice(b"ON2 ");
    data[8..12].copy_from_slice(b"ON2f");
    let avi = open(data);
    assert_eq!(avi.video().width(), 320);
}

#[test]
fn stream_parameters() {
    let built = AviBuilder::new()
        .audio(AudioParams::pcm())
        .interleaved(2, 64, 7056)
        .build();
    let avi = open(built.data);

    let video = avi.video();
    assert_eq!(video.codec(), &VideoCodec::Mjpeg);
    assert_eq!(video.width(), 320);
    assert_eq!(video.height(), 240);
    assert_eq!(video.tag(), *b"00db");
    assert_eq!(video.frame_step(), 3600);
    assert_eq!(video.fps(), 25.0);
    assert_eq!(video.frame_duration().whole_milliseconds(), 40);
    assert_eq!(video.bitmap_info_header().compression(), *b"MJPG");
    assert!(!video.bitmap_info_header().is_rgb());

    assert_eq!(avi.audio().len(), 1);
    let audio = &avi.audio()[0];
    assert_eq!(audio.codec(), AudioCodec::Pcm);
    assert_eq!(audio.stream_number(), 1);
    assert_eq!(audio.tag(), *b"01wb");
    assert_eq!(audio.wave_format().block_align(), 4);
    assert_eq!(audio.rate(), 44100);
}

#[test]
fn inert_chunk_keeps_stream_association() {
    let mut builder = AviBuilder::new().interleaved(2, 64, 0);
    builder.junk_after_strh = true;
    let avi = open(builder.build().data);
    assert_eq!(avi.video().width(), 320);
    assert_eq!(avi.video().codec(), &VideoCodec::Mjpeg);
}

#[test]
fn silent_audio_stream_number() {
    let silent = AudioParams{channels: 0, ..AudioParams::pcm()};
    let built = AviBuilder::new()
        .audio(silent)
        .interleaved(3, 64, 400)
        .build();
    let mut avi = open(built.data);
    assert_eq!(avi.audio()[0].stream_number(), 99);
    assert_eq!(avi.audio()[0].tag(), *b"99wb");

    let mut host = Recorder::default();
    avi.grow(Stopper::AudioChunk{stream: 0, chunk: 2}, &mut host);
    assert_eq!(avi.audio()[0].index().len(), 3);
}

#[test]
fn at_most_eight_audio_streams() {
    let mut builder = AviBuilder::new();
    for _ in 0 .. 9 {
        builder = builder.audio(AudioParams::pcm());
    }
    let avi = open(builder.interleaved(2, 64, 100).build().data);
    assert_eq!(avi.audio().len(), 8);
    assert_eq!(avi.audio()[7].tag(), *b"08wb");
}

#[test]
fn dmlh_sets_stream_length() {
    let mut builder = AviBuilder::new().index(IndexKind::Absolute).interleaved(25, 32, 0);
    let avi = open(builder.build().data);
    assert_eq!(avi.total_frames(), None);
    assert_eq!(avi.stream_length_ms(), 1000);
    assert_eq!(avi.duration(), time::Duration::seconds(1));

    builder.total_frames = Some(50);
    let avi = open(builder.build().data);
    assert_eq!(avi.total_frames(), Some(50));
    assert_eq!(avi.stream_length_ms(), 2000);
}

// Index loading

#[test]
fn legacy_index_relative_to_movi() {
    let built = AviBuilder::new()
        .audio(AudioParams::pcm())
        .index(IndexKind::MoviRelative)
        .interleaved(6, 100, 7056)
        .build();
    let avi = open(built.data.clone());

    assert_eq!(avi.index_source(), IndexSource::LegacyFlat(Idx1Base::MoviStart));
    assert_eq!(avi.movi().start, built.movi_start);

    let entries = avi.video().index().entries();
    assert_eq!(entries.len(), 6);
    for (entry, pos) in entries.iter().zip(built.video_pos.iter()) {
        assert_eq!(entry.pos, *pos);
        assert_eq!(entry.len, 100);
        assert!(entry.is_keyframe());
        let tag = &built.data[entry.pos as usize - 8 .. entry.pos as usize - 4];
        assert_eq!(&tag[..2], b"00");
    }

    let audio = avi.audio()[0].index().entries();
    assert_eq!(audio.len(), 6);
    for (i, (entry, pos)) in audio.iter().zip(built.audio_pos[0].iter()).enumerate() {
        assert_eq!(entry.pos, *pos);
        assert_eq!(entry.tot, 7056 * i as u64);
        assert_eq!(entry.block_no, 1764 * i as u32);
    }
}

#[test]
fn legacy_index_absolute() {
    let built = AviBuilder::new()
        .audio(AudioParams::pcm())
        .index(IndexKind::Absolute)
        .interleaved(4, 100, 7056)
        .build();
    let avi = open(built.data);

    assert_eq!(avi.index_source(), IndexSource::LegacyFlat(Idx1Base::FileStart));
    let positions = avi.video().index().entries().iter().map(|e| e.pos).collect::<Vec<_>>();
    assert_eq!(positions, built.video_pos);
}

#[test]
fn unverifiable_legacy_index_is_ignored() {
    let built = AviBuilder::new()
        .audio(AudioParams::pcm())
        .index(IndexKind::Broken)
        .interleaved(5, 100, 7056)
        .build();
    let mut avi = open_with(built.data, AviOptions::default().with_preview_buffers(0));

    assert_eq!(avi.index_source(), IndexSource::GrowOnly);
    assert!(avi.video().index().is_empty());
    assert_eq!(avi.growth_cursor().next_tag_offset, built.movi_start);

    // still plays, indexing on the fly
    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    while avi.send_chunk(&mut host) == DemuxStatus::Ok {}
    assert_eq!(host.frames().len(), 5);
    assert_eq!(host.samples().len(), 5);
    let positions = avi.video().index().entries().iter().map(|e| e.pos).collect::<Vec<_>>();
    assert_eq!(positions, built.video_pos);
}

#[test]
fn opendml_two_standard_indices() {
    let mut builder = AviBuilder::new().codec(b"DX50").index(IndexKind::OpenDml{per_chunk: 100});
    for i in 0 .. 200 {
        let key = i % 10 == 0;
        builder = builder.video(frame(i, 8 + i % 5, key), key);
    }
    let built = builder.build();
    assert_eq!(built.ix.len(), 2);

    let avi = open(built.data);
    assert_eq!(avi.index_source(), IndexSource::OpenDml);

    let entries = avi.video().index().entries();
    assert_eq!(entries.len(), 200);
    assert!(entries.windows(2).all(|w| w[0].pos < w[1].pos));
    for (i, (entry, pos)) in entries.iter().zip(built.video_pos.iter()).enumerate() {
        assert_eq!(entry.pos, *pos);
        assert_eq!(entry.len as usize, 8 + i % 5);
        assert_eq!(entry.is_keyframe(), i % 10 == 0);
    }
}

#[test]
fn opendml_without_audio_index_falls_back_to_growth() {
    let built = AviBuilder::new()
        .audio(AudioParams::pcm())
        .index(IndexKind::OpenDml{per_chunk: 10})
        .interleaved(4, 64, 7056)
        .build();
    let mut avi = open(built.data);

    assert_eq!(avi.index_source(), IndexSource::GrowOnly);
    assert!(avi.video().index().is_empty());
    assert!(avi.audio()[0].index().is_empty());

    let mut host = Recorder::default();
    assert!(avi.grow(Stopper::AudioChunk{stream: 0, chunk: 3}, &mut host));
    assert_eq!(avi.video().index().len(), 4);
}

// Index growth

#[test]
fn growth_through_rec_lists() {
    let mut builder = AviBuilder::new()
        .audio(AudioParams::pcm())
        .interleaved(6, 90, 1001);
    builder.rec_lists = true;
    let built = builder.build();
    let mut avi = open(built.data);
    let mut host = Recorder::default();

    assert!(avi.grow(Stopper::VideoFrame(5), &mut host));
    let positions = avi.video().index().entries().iter().map(|e| e.pos).collect::<Vec<_>>();
    assert_eq!(positions, built.video_pos);

    // to end of input
    assert!(!avi.grow(Stopper::VideoFrame(usize::MAX - 1), &mut host));
    assert_eq!(avi.growth_cursor().last_stop, Some(ScanEnd::Eof));

    let video = avi.video().index().entries();
    assert!(video.windows(2).all(|w| w[0].pos < w[1].pos));

    let audio = avi.audio()[0].index().entries();
    assert_eq!(audio.len(), 6);
    let mut sum = 0;
    for entry in audio.iter() {
        assert_eq!(entry.tot, sum);
        sum += entry.len as u64;
    }
    // ceil(1001 / 4) blocks per chunk
    assert_eq!(audio[5].block_no, 5 * 251);
}

#[test]
fn growth_restores_input_position() {
    let built = AviBuilder::new().interleaved(8, 50, 0).build();
    let mut avi = open(built.data);
    let mut host = Recorder::default();

    let before = built.movi_start + 3;
    avi.reader.seek_to(before).unwrap();

    assert!(avi.grow(Stopper::VideoFrame(2), &mut host));
    assert_eq!(avi.reader.pos().unwrap(), before);
    assert_eq!(avi.video().index().len(), 3);

    assert!(!avi.grow(Stopper::VideoFrame(100), &mut host));
    assert_eq!(avi.reader.pos().unwrap(), before);
    assert_eq!(avi.video().index().len(), 8);
}

#[test]
fn growth_sniffs_keyframes() {
    let mut builder = AviBuilder::new().codec(b"DX50");
    for i in 0 .. 6 {
        builder = builder.video(frame(i, 40, i == 0 || i == 4), false);
    }
    let mut avi = open(builder.build().data);
    let mut host = Recorder::default();
    avi.grow(Stopper::VideoFrame(5), &mut host);

    let keys = avi.video().index().entries().iter().map(|e| e.is_keyframe()).collect::<Vec<_>>();
    assert_eq!(keys, vec![true, false, false, false, true, false]);
    assert_eq!(avi.video().index().keyframe_at_or_before(3), Some(0));
    assert_eq!(avi.video().index().keyframe_at_or_before(5), Some(4));
}

#[test]
fn growth_byte_and_time_stoppers() {
    let mut builder = AviBuilder::new().codec(b"DX50");
    for i in 0 .. 20 {
        builder = builder.video(frame(i, 100, i % 5 == 0), false);
    }
    let built = builder.build();
    let mut avi = open(built.data);
    let mut host = Recorder::default();

    // keyframe at or past frame 6 is frame 10
    assert!(avi.grow(Stopper::BytePosition(built.video_pos[6]), &mut host));
    assert_eq!(avi.video().index().len(), 11);

    // 25 fps, frame 16 at 57600, next keyframe at or past it is 20: none
    assert!(!avi.grow(Stopper::Timestamp(57600), &mut host));
    assert_eq!(avi.video().index().len(), 20);
}

#[test]
fn growth_interrupted_by_host() {
    let built = AviBuilder::new().interleaved(10, 50, 0).build();
    let mut avi = open(built.data);
    let mut host = Recorder{cancel: true, ..Default::default()};

    assert!(!avi.grow(Stopper::VideoFrame(3), &mut host));
    assert!(avi.video().index().is_empty());
    assert_eq!(avi.growth_cursor().next_tag_offset, built.movi_start);
    assert_eq!(avi.growth_cursor().last_stop, None);
}

#[test]
fn growth_reports_progress() {
    let built = AviBuilder::new().interleaved(10, 50, 0).build();
    let mut avi = open_with(built.data, AviOptions::default().with_progress_interval(2));
    let mut host = Recorder::default();

    assert!(avi.grow(Stopper::VideoFrame(9), &mut host));
    assert!(host.progress.len() > 1);
    assert_eq!(host.progress.last(), Some(&100));
    assert!(host.progress.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn growth_retries_incomplete_chunks() {
    let mut builder = AviBuilder::new().codec(b"DX50");
    for i in 0 .. 6 {
        builder = builder.video(frame(i, 60, i % 2 == 0), false);
    }
    let built = builder.build();
    let full = built.data.clone();
    let frame3 = built.video_pos[3] - 8;

    // cut inside the chunk header of frame 3
    let shared = Rc::new(RefCell::new(full[.. frame3 as usize + 4].to_vec()));
    let mut avi = Avi::open(LiveFile{data: shared.clone(), pos: 0}).unwrap();
    let mut host = Recorder::default();

    assert!(!avi.grow(Stopper::VideoFrame(3), &mut host));
    assert_eq!(avi.video().index().len(), 3);
    assert_eq!(avi.growth_cursor().next_tag_offset, frame3);

    // header complete, but too little data to tell the frame type
    shared.borrow_mut().extend_from_slice(&full[frame3 as usize + 4 .. frame3 as usize + 10]);
    assert!(!avi.grow(Stopper::VideoFrame(3), &mut host));
    assert_eq!(avi.video().index().len(), 3);
    assert_eq!(avi.growth_cursor().next_tag_offset, frame3);

    shared.borrow_mut().extend_from_slice(&full[frame3 as usize + 10 ..]);
    assert!(avi.grow(Stopper::VideoFrame(3), &mut host));
    let entry = avi.video().index().entries()[3];
    assert_eq!(entry.pos, built.video_pos[3]);
    assert!(!entry.is_keyframe());
}

#[test]
fn seekable_input_refreshes_length() {
    let shared = Rc::new(RefCell::new(vec![0_u8; 100]));
    let mut input = SeekableInput::new(LiveFile{data: shared.clone(), pos: 0}).unwrap();
    assert_eq!(input.len(), 100);

    input.seek(SeekFrom::Start(40)).unwrap();
    shared.borrow_mut().extend_from_slice(&[0; 60]);
    assert_eq!(input.len(), 100);
    assert_eq!(input.refresh_len().unwrap(), 160);
    assert_eq!(input.len(), 160);
    // position kept
    assert_eq!(input.stream_position().unwrap(), 40);
}

// Playback

#[test]
fn header_buffers() {
    let built = AviBuilder::new()
        .audio(AudioParams{extra: vec![7; 12], ..AudioParams::pcm()})
        .index(IndexKind::Absolute)
        .interleaved(12, 64, 7056)
        .build();
    let mut avi = open_with(built.data, AviOptions::default().with_preview_buffers(0));
    let mut host = Recorder{audio_max: Some(20), ..Default::default()};
    avi.send_headers(&mut host);

    assert!(host.started);
    assert_eq!(avi.status(), DemuxStatus::Ok);
    let info = host.info.clone().unwrap();
    assert!(info.has_video && info.has_audio);
    assert_eq!((info.width, info.height), (320, 240));
    assert_eq!(info.video_fourcc, "MJPG");
    assert_eq!(info.audio_codecs, vec![AudioCodec::Pcm]);

    let header = &host.video[0];
    assert!(header.flags.contains(
        BufferFlags::HEADER | BufferFlags::STDHEADER | BufferFlags::FRAMERATE | BufferFlags::FRAME_END
    ));
    assert_eq!(header.info, BufferInfo::FrameDuration(3600));
    assert_eq!(header.data.len(), 40);

    // 30 byte WAVEFORMATEX in 20 byte buffers
    let audio_headers = host.audio
        .iter()
        .filter(|b| b.flags.contains(BufferFlags::HEADER))
        .collect::<Vec<_>>();
    assert_eq!(audio_headers.len(), 2);
    assert_eq!(audio_headers[0].data.len(), 20);
    assert_eq!(audio_headers[1].data.len(), 10);
    assert!(!audio_headers[0].flags.contains(BufferFlags::FRAME_END));
    assert!(audio_headers[1].flags.contains(BufferFlags::STDHEADER | BufferFlags::FRAME_END));
    assert_eq!(
        audio_headers[0].info,
        BufferInfo::AudioFormat{sample_rate: 44100, bits_per_sample: 16, channels: 2}
    );

    assert!(host.order.is_empty());
}

#[test]
fn preview_count() {
    let built = AviBuilder::new().index(IndexKind::Absolute).interleaved(12, 64, 0).build();
    let mut avi = open(built.data);
    let mut host = Recorder::default();
    avi.send_headers(&mut host);

    assert_eq!(host.frames().len(), 10);
    assert!(host.frames().iter().all(|b| b.flags.contains(BufferFlags::PREVIEW | BufferFlags::FRAME_END)));

    assert_eq!(avi.send_chunk(&mut host), DemuxStatus::Ok);
    let next = host.frames()[10];
    assert_eq!(next.frame_number, Some(10));
    assert!(!next.flags.contains(BufferFlags::PREVIEW));
}

#[test]
fn palette_buffer() {
    let mut builder = AviBuilder::new().codec(b"cvid").interleaved(1, 64, 0);
    builder.bit_count = 8;
    builder.clr_used = 2;
    builder.palette = vec![10, 20, 30, 0, 40, 50, 60, 0];
    let mut avi = open_with(builder.build().data, AviOptions::default().with_preview_buffers(0));
    let mut host = Recorder::default();
    avi.send_headers(&mut host);

    assert_eq!(host.video.len(), 2);
    let palette = &host.video[1];
    assert!(palette.flags.contains(BufferFlags::SPECIAL | BufferFlags::HEADER));
    assert!(palette.data.is_empty());
    match &palette.info {
        BufferInfo::Palette(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!((entries[0].red, entries[0].green, entries[0].blue), (30, 20, 10));
            assert_eq!((entries[1].red, entries[1].green, entries[1].blue), (60, 50, 40));
        }
        info => panic!("expected palette, got {info:?}"),
    }
}

#[test]
fn truncated_palette_is_greyscale() {
    let mut builder = AviBuilder::new().codec(b"cvid").interleaved(1, 64, 0);
    builder.bit_count = 8;
    builder.clr_used = 16;
    builder.palette = vec![1, 2, 3, 0];
    let avi = open(builder.build().data);

    let palette = avi.video().palette();
    assert_eq!(palette.len(), 256);
    assert!(palette.iter().enumerate().all(|(i, p)| {
        p.red == i as u8 && p.green == i as u8 && p.blue == i as u8
    }));
}

#[test]
fn rgb_header_has_negative_height() {
    let builder = AviBuilder::new().codec(&[0; 4]).interleaved(1, 64, 0);
    let mut avi = open_with(builder.build().data, AviOptions::default().with_preview_buffers(0));
    assert_eq!(avi.video().codec(), &VideoCodec::Rgb);

    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    let header = &host.video[0].data;
    assert_eq!(i32::from_le_bytes([header[8], header[9], header[10], header[11]]), -240);
    // stream info keeps the stored height
    assert_eq!(host.info.unwrap().height, 240);
}

#[test]
fn xvid_handler_overrides_mpeg4() {
    let mut builder = AviBuilder::new().codec(b"FMP4").interleaved(1, 64, 0);
    builder.handler = *b"XVID";
    let mut avi = open_with(builder.build().data, AviOptions::default().with_preview_buffers(0));
    assert_eq!(avi.video().codec(), &VideoCodec::Xvid);

    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    assert_eq!(&host.video[0].data[16..20], b"XVID");
    assert_eq!(host.info.unwrap().video_fourcc, "XVID");
}

#[test]
fn xvid_compression_is_kept() {
    // no handler
    let mut builder = AviBuilder::new().codec(b"XVID").interleaved(1, 64, 0);
    builder.handler = [0; 4];
    let mut avi = open_with(builder.build().data, AviOptions::default().with_preview_buffers(0));
    assert_eq!(avi.video().codec(), &VideoCodec::Xvid);

    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    assert_eq!(&host.video[0].data[16..20], b"XVID");
    assert_eq!(host.info.unwrap().video_fourcc, "XVID");

    // handler of another MPEG-4 flavour
    let mut builder = AviBuilder::new().codec(b"XVID").interleaved(1, 64, 0);
    builder.handler = *b"DIVX";
    let mut avi = open_with(builder.build().data, AviOptions::default().with_preview_buffers(0));
    assert_eq!(avi.video().codec(), &VideoCodec::Xvid);

    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    assert_eq!(&host.video[0].data[16..20], b"XVID");
    assert_eq!(host.info.unwrap().video_fourcc, "XVID");
}

#[test]
fn xan_video_forces_xan_audio() {
    let built = AviBuilder::new()
        .codec(b"Xxan")
        .audio(AudioParams::pcm())
        .interleaved(1, 64, 100)
        .build();
    let avi = open(built.data);
    assert_eq!(avi.video().codec(), &VideoCodec::Xan);
    assert_eq!(avi.audio()[0].codec(), AudioCodec::XanDpcm);
    assert_eq!(avi.audio()[0].rate(), 11025);
}

#[test]
fn oversized_video_header_finishes() {
    let built = AviBuilder::new().interleaved(3, 64, 0).build();
    let mut avi = open(built.data);
    let mut host = Recorder{video_max: Some(16), ..Default::default()};
    avi.send_headers(&mut host);

    assert_eq!(avi.status(), DemuxStatus::Finished);
    assert!(host.video.is_empty());
}

#[test]
fn oversized_bi_size_finishes() {
    let mut builder = AviBuilder::new().interleaved(3, 64, 0);
    builder.bi_size = 100_000;
    let mut avi = open(builder.build().data);
    let mut host = Recorder::default();
    avi.send_headers(&mut host);

    assert_eq!(avi.status(), DemuxStatus::Finished);
    assert!(host.video.is_empty());
}

#[test]
fn audio_first_on_ties() {
    let built = AviBuilder::new()
        .audio(AudioParams::pcm())
        .index(IndexKind::Absolute)
        .interleaved(4, 100, 7056)
        .build();
    let mut avi = open_with(built.data, AviOptions::default().with_preview_buffers(0));
    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    while avi.send_chunk(&mut host) == DemuxStatus::Ok {}
    assert_eq!(avi.status(), DemuxStatus::Finished);

    let streams = host.order.iter().map(|(s, _)| *s).collect::<Vec<_>>();
    let a = StreamId::Audio(0);
    let v = StreamId::Video;
    assert_eq!(streams, vec![a, v, a, v, a, v, a, v]);
    assert!(host.order.windows(2).all(|w| w[0].1 <= w[1].1));

    let timing = AudioParams::pcm().timing();
    for (i, buf) in host.samples().iter().enumerate() {
        assert_eq!(buf.pts, audio_pts(&timing, 0, 7056 * i as u64, 0));
        assert_eq!(buf.input_time, pts_to_ms(buf.pts));
        assert_eq!(buf.data, vec![i as u8; 7056]);
        assert!(buf.flags.contains(BufferFlags::FRAME_END));
    }
    for (i, buf) in host.frames().iter().enumerate() {
        assert_eq!(buf.pts, 3600 * i as i64);
        assert_eq!(buf.frame_number, Some(i as u64));
    }
    // past the second to last frame
    assert_eq!(host.frames()[3].input_normpos, u16::MAX);
    assert!(host.frames()[0].input_normpos < u16::MAX);
}

#[test]
fn large_chunks_split_over_buffers() {
    let built = AviBuilder::new().index(IndexKind::Absolute).interleaved(2, 100, 0).build();
    let mut avi = open_with(built.data, AviOptions::default().with_preview_buffers(0));
    let mut host = Recorder{video_max: Some(40), ..Default::default()};
    avi.send_headers(&mut host);
    while avi.send_chunk(&mut host) == DemuxStatus::Ok {}

    let frames = host.frames();
    let sizes = frames.iter().map(|b| b.data.len()).collect::<Vec<_>>();
    assert_eq!(sizes, vec![40, 40, 20, 40, 40, 20]);
    let ends = frames.iter().map(|b| b.flags.contains(BufferFlags::FRAME_END)).collect::<Vec<_>>();
    assert_eq!(ends, vec![false, false, true, false, false, true]);
    let numbers = frames.iter().map(|b| b.frame_number).collect::<Vec<_>>();
    assert_eq!(numbers, vec![Some(0), Some(0), Some(0), Some(1), Some(1), Some(1)]);
    assert!(frames[3..].iter().all(|b| b.pts == 3600));

    let first = frames[..3].iter().flat_map(|b| b.data.clone()).collect::<Vec<_>>();
    assert_eq!(first, frame(0, 100, true));
}

// Streaming

fn streaming(data: Vec<u8>) -> Avi<StreamingInput<Cursor<Vec<u8>>>> {
    let len = data.len() as u64;
    Avi::open(StreamingInput::new(Cursor::new(data), Some(len))).unwrap()
}

#[test]
fn streaming_playback() {
    let mut builder = AviBuilder::new()
        .audio(AudioParams::pcm())
        .index(IndexKind::Absolute)
        .interleaved(4, 100, 7056);
    builder.rec_lists = true;
    let mut avi = streaming(builder.build().data);

    assert!(avi.is_streaming());
    assert_eq!(avi.index_source(), IndexSource::GrowOnly);

    let mut host = Recorder{audio_max: Some(3000), ..Default::default()};
    avi.send_headers(&mut host);
    // no preview
    assert!(host.order.is_empty());

    while avi.send_chunk(&mut host) == DemuxStatus::Ok {}

    let frames = host.frames();
    assert_eq!(frames.len(), 4);
    for (i, buf) in frames.iter().enumerate() {
        assert_eq!(buf.pts, 3600 * i as i64);
        assert_eq!(buf.frame_number, Some(i as u64));
        assert!(buf.flags.contains(BufferFlags::FRAME_END));
        assert_eq!(buf.input_normpos, 65535);
    }

    let timing = avi.audio()[0].timing();
    let samples = host.samples();
    let sizes = samples.iter().map(|b| b.data.len()).collect::<Vec<_>>();
    assert_eq!(sizes, [3000, 3000, 1056].repeat(4));
    assert_eq!(samples[0].pts, 0);
    assert_eq!(samples[1].pts, audio_pts(&timing, 0, 0, 3000));
    assert_eq!(samples[3].pts, audio_pts(&timing, 0, 7056, 0));
    assert!(samples[2].flags.contains(BufferFlags::FRAME_END));
    assert!(!samples[1].flags.contains(BufferFlags::FRAME_END));

    assert_eq!(avi.stream_length_ms(), 160);
}

#[test]
fn streaming_ignores_seek() {
    let built = AviBuilder::new().interleaved(4, 100, 0).build();
    let mut avi = streaming(built.data);
    let mut host = Recorder::default();

    assert_eq!(avi.seek(&mut host, 30000, 0, true), DemuxStatus::Ok);
    assert!(host.new_pts.is_empty());
    assert_eq!(host.flushes, 0);
}

// Seeking

fn keyframe_every_five(frames: usize) -> AviBuilder {
    let mut builder = AviBuilder::new().codec(b"DX50");
    for i in 0 .. frames {
        builder = builder.video(frame(i, 50 + (i * 37) % 200, i % 5 == 0), false);
    }
    builder
}

#[test]
fn seek_by_position_lands_on_preceding_keyframe() {
    let built = keyframe_every_five(30).build();
    let len = built.data.len() as u64;
    let mut avi = open(built.data.clone());
    let timing = avi.video().timing();

    for normpos in (0 ..= u16::MAX).step_by(997) {
        let target = normpos as u64 * len / 65535;
        let expected = (0 .. 30)
            .filter(|i| i % 5 == 0 && built.video_pos[*i] <= target)
            .last()
            .unwrap_or_default();

        let mut host = Recorder::default();
        assert_eq!(avi.seek(&mut host, normpos, 0, true), DemuxStatus::Ok);
        assert_eq!(avi.video().cursor().entry, expected, "normpos {normpos}");
        assert_eq!(avi.video().cursor().offset_in_chunk, 0);
        assert_eq!(host.new_pts, vec![(video_pts(&timing, expected as u64), true)]);
        assert_eq!(host.flushes, 1);
    }
}

#[test]
fn seek_by_time_to_current_position() {
    let mut builder = AviBuilder::new().index(IndexKind::Absolute).interleaved(60, 32, 0);
    builder.scale = 1001;
    builder.rate = 30000;
    let mut avi = open(builder.build().data);
    let timing = avi.video().timing();

    for current in [1_u64, 10, 29, 59] {
        let mut host = Recorder::default();
        let time_ms = pts_to_ms(video_pts(&timing, current)) as i32;
        assert_eq!(avi.seek(&mut host, 0, time_ms, false), DemuxStatus::Ok);
        let landed = avi.video().cursor().entry as u64;
        assert!(landed.abs_diff(current) <= 1, "{landed} for {current}");
        assert_eq!(host.flushes, 0);
        assert_eq!(host.new_pts.len(), 1);
    }

    // exact frame times at 25 fps
    let mut avi = open(AviBuilder::new().index(IndexKind::Absolute).interleaved(30, 32, 0).build().data);
    let mut host = Recorder::default();
    avi.seek(&mut host, 0, 400, true);
    assert_eq!(avi.video().cursor().entry, 10);
    assert_eq!(host.new_pts, vec![(36000, true)]);
}

#[test]
fn seek_positions_audio_within_chunk() {
    // one audio chunk of 80ms per two frames
    let mut builder = AviBuilder::new().audio(AudioParams::pcm()).index(IndexKind::Absolute);
    for i in 0 .. 20 {
        builder = builder.video(frame(i, 64, true), true);
        if i % 2 == 0 {
            builder = builder.audio_chunk(0, vec![0; 14112]);
        }
    }
    let mut avi = open_with(builder.build().data, AviOptions::default().with_preview_buffers(0));
    let mut host = Recorder::default();

    assert_eq!(avi.seek(&mut host, 0, 360, true), DemuxStatus::Ok);
    assert_eq!(avi.video().cursor().entry, 9);
    let vpts = 32400;
    assert_eq!(host.new_pts, vec![(vpts, true)]);

    let audio = &avi.audio()[0];
    let cursor = audio.cursor();
    assert_eq!(cursor.entry, 4);
    let entry = audio.index().entries()[4];
    let timing = audio.timing();
    let pts_at = |offset: u32| audio_pts(&timing, entry.block_no, entry.tot, offset);
    assert!(pts_at(cursor.offset_in_chunk) >= vpts);
    assert!(pts_at(cursor.offset_in_chunk - 1) < vpts);
    assert!((7050 .. 7060).contains(&cursor.offset_in_chunk));

    // audio resumes with the rest of the chunk
    while host.samples().is_empty() {
        assert_eq!(avi.send_chunk(&mut host), DemuxStatus::Ok);
    }
    let first = host.samples()[0];
    assert_eq!(first.data.len() as u32, 14112 - cursor.offset_in_chunk);
    assert_eq!(first.pts, pts_at(cursor.offset_in_chunk));
}

#[test]
fn seek_without_keyframe_starts_at_zero() {
    let mut builder = AviBuilder::new().codec(b"DX50");
    for i in 0 .. 10 {
        builder = builder.video(frame(i, 80, false), false);
    }
    let mut avi = open(builder.build().data);
    let mut host = Recorder::default();

    assert_eq!(avi.seek(&mut host, 40000, 0, false), DemuxStatus::Ok);
    assert_eq!(avi.video().cursor().entry, 0);
    assert_eq!(host.new_pts, vec![(0, true)]);
}

#[test]
fn seek_past_end_of_empty_movi_finishes() {
    let built = AviBuilder::new().build();
    let mut avi = open(built.data);
    let mut host = Recorder::default();

    assert_eq!(avi.seek(&mut host, u16::MAX, 0, true), DemuxStatus::Finished);
    assert_eq!(avi.status(), DemuxStatus::Finished);
    assert!(host.new_pts.is_empty());
}

#[test]
fn seek_to_start_then_play() {
    let built = AviBuilder::new().index(IndexKind::Absolute).interleaved(5, 32, 0).build();
    let mut avi = open_with(built.data, AviOptions::default().with_preview_buffers(0));
    let mut host = Recorder::default();
    avi.send_headers(&mut host);
    while avi.send_chunk(&mut host) == DemuxStatus::Ok {}
    assert_eq!(host.frames().len(), 5);

    // seeking revives a finished session
    assert_eq!(avi.seek(&mut host, 0, 0, true), DemuxStatus::Ok);
    assert_eq!(host.new_pts, vec![(0, true)]);
    assert_eq!(avi.send_chunk(&mut host), DemuxStatus::Ok);
    assert_eq!(host.frames().last().and_then(|b| b.frame_number), Some(0));
}
