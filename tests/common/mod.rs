#![allow(dead_code)]

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;

use vorbis_stream::{DecodeStep, Engine, EngineConfig, Frame, OpenStep, StreamParams};

const MAGIC: &'static [u8] = b"TOY";
const HEADER_LEN: usize = 8;
const FRAME_HEADER_LEN: usize = 3;
const BROKEN_FRAME: u8 = 0xff;

pub const MISSING_CAPTURE_PATTERN: i32 = 30;
pub const INVALID_STREAM: i32 = 21;

#[derive(Default)]
pub struct Stats {
    pub open_calls: Cell<usize>,
    pub decode_calls: Cell<usize>,
    pub opened: Cell<usize>,
    pub closed: Cell<usize>,
}

impl Stats {
    pub fn live_handles(&self) -> usize {
        self.opened.get() - self.closed.get()
    }
}

fn bump(c: &Cell<usize>) {
    c.set(c.get() + 1);
}

/// Engine for a trivial framed format:
///
/// * header: `TOY`, channel count (`u8`), sample rate (`u32` LE);
/// * frame: channel count (`u8`, `0xff` marks a broken frame), sample count (`u16` LE), then
///   every channel's samples as `f32` LE, one channel after another.
#[derive(Default)]
pub struct ToyEngine {
    pub stats: Rc<Stats>,
}

pub struct ToyHandle {
    planes: Vec<Vec<f32>>,
}

impl ToyEngine {
    pub fn new() -> (Self, Rc<Stats>) {
        let engine = ToyEngine::default();
        let stats = engine.stats.clone();
        (engine, stats)
    }
}

impl Engine for ToyEngine {
    type Handle = ToyHandle;

    fn open_push_data(&mut self, data: &[u8], _config: &EngineConfig) -> OpenStep<ToyHandle> {
        bump(&self.stats.open_calls);
        let magic_len = data.len().min(MAGIC.len());
        if data[..magic_len] != MAGIC[..magic_len] {
            return OpenStep::Fatal(MISSING_CAPTURE_PATTERN);
        }
        if data.len() < HEADER_LEN {
            return OpenStep::NeedMoreData;
        }
        let channel_count = data[3] as usize;
        let sample_rate = read_u32(&data[4..]);
        bump(&self.stats.opened);
        OpenStep::Opened {
            consumed: HEADER_LEN,
            handle: ToyHandle { planes: Vec::new() },
            params: StreamParams::new(channel_count, sample_rate),
        }
    }

    fn decode_frame_push_data<'a>(&mut self, handle: &'a mut ToyHandle, data: &[u8])
            -> DecodeStep<'a> {
        bump(&self.stats.decode_calls);
        if data.first() == Some(&BROKEN_FRAME) {
            return DecodeStep::Fatal(INVALID_STREAM);
        }
        if data.len() < FRAME_HEADER_LEN {
            return DecodeStep::ZeroProgress;
        }
        let channel_count = data[0] as usize;
        let len = (data[1] as usize) | (data[2] as usize) << 8;
        let consumed = FRAME_HEADER_LEN + channel_count * len * 4;
        if data.len() < consumed {
            return DecodeStep::ZeroProgress;
        }
        handle.planes = (0..channel_count)
            .map(|c| (0..len)
                .map(|s| f32::from_bits(read_u32(&data[FRAME_HEADER_LEN + (c * len + s) * 4..])))
                .collect())
            .collect();
        DecodeStep::Frame {
            consumed: consumed,
            frame: Frame::new(&handle.planes, len),
        }
    }

    fn close(&mut self, _handle: ToyHandle) {
        bump(&self.stats.closed);
    }
}

/// Engine that never finds enough data to open a stream.
#[derive(Default)]
pub struct StubbornEngine {
    pub open_calls: Rc<Cell<usize>>,
}

impl Engine for StubbornEngine {
    type Handle = ();

    fn open_push_data(&mut self, _data: &[u8], _config: &EngineConfig) -> OpenStep<()> {
        bump(&self.open_calls);
        OpenStep::NeedMoreData
    }

    fn decode_frame_push_data<'a>(&mut self, _handle: &'a mut (), _data: &[u8]) -> DecodeStep<'a> {
        DecodeStep::ZeroProgress
    }

    fn close(&mut self, _handle: ()) {}
}

fn read_u32(b: &[u8]) -> u32 {
    b[..4].iter().rev().fold(0, |r, &v| (r << 8) | v as u32)
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    for i in 0..4 {
        out.push((v >> (i * 8)) as u8);
    }
}

pub fn header(channel_count: u8, sample_rate: u32) -> Vec<u8> {
    let mut r = MAGIC.to_vec();
    r.push(channel_count);
    push_u32(&mut r, sample_rate);
    r
}

pub fn frame(planes: &[&[f32]]) -> Vec<u8> {
    let len = planes.first().map_or(0, |p| p.len());
    let mut r = vec![planes.len() as u8, len as u8, (len >> 8) as u8];
    for plane in planes {
        assert_eq!(plane.len(), len);
        for &s in plane.iter() {
            push_u32(&mut r, s.to_bits());
        }
    }
    r
}

pub fn broken_frame() -> Vec<u8> {
    vec![BROKEN_FRAME, 0, 0]
}

/// Source handing out at most `max_read` bytes per read.
pub struct Trickle<R> {
    inner: R,
    max_read: usize,
}

impl<R> Trickle<R> {
    pub fn new(inner: R, max_read: usize) -> Self {
        Trickle {
            inner: inner,
            max_read: max_read,
        }
    }
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.max_read);
        self.inner.read(&mut buf[..len])
    }
}

/// Source that delivers `data` and then fails.
pub struct FailAfter {
    data: io::Cursor<Vec<u8>>,
}

impl FailAfter {
    pub fn new(data: Vec<u8>) -> Self {
        FailAfter { data: io::Cursor::new(data) }
    }
}

impl Read for FailAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::TimedOut, "peer went silent")),
            n => Ok(n),
        }
    }
}
