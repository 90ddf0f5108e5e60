//! Push-data decoding engines.
//!
//! An engine is driven with whatever compressed bytes the session has buffered and answers with
//! one of three outcomes: it made progress (and says how many bytes it used), it needs more
//! bytes to make any progress, or the stream is broken beyond repair.

use config::EngineConfig;

pub mod vorbis;

/// Fixed parameters of an opened stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamParams {
    channel_count: usize,
    sample_rate: u32,
}

impl StreamParams {
    pub fn new(channel_count: usize, sample_rate: u32) -> Self {
        StreamParams {
            channel_count: channel_count,
            sample_rate: sample_rate,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns `true` if there's at least one channel and the sample rate is non-zero.
    pub fn is_valid(&self) -> bool {
        self.channel_count > 0 && self.sample_rate > 0
    }
}

/// Result of [`Engine::open_push_data()`](trait.Engine.html#tymethod.open_push_data).
pub enum OpenStep<H> {
    /// The stream headers were read from the first `consumed` bytes.
    Opened {
        consumed: usize,
        handle: H,
        params: StreamParams,
    },
    /// The supplied bytes don't hold all the headers yet.
    NeedMoreData,
    /// The stream can't be opened. Carries the engine error code.
    Fatal(i32),
}

/// Result of [`Engine::decode_frame_push_data()`](trait.Engine.html#tymethod.decode_frame_push_data).
pub enum DecodeStep<'a> {
    /// The first `consumed` bytes were used and decoded into `frame`, which may be empty.
    Frame {
        consumed: usize,
        frame: Frame<'a>,
    },
    /// The supplied bytes don't hold a complete packet.
    ZeroProgress,
    /// The frame can't be decoded. Carries the engine error code.
    Fatal(i32),
}

/// Planar samples of a single decoded frame, borrowed from the engine.
///
/// The borrow ends with the next call into the engine, so the samples must be copied out
/// before that.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    planes: &'a [Vec<f32>],
    len: usize,
}

impl<'a> Frame<'a> {
    /// Creates a frame of the first `len` samples of every plane.
    ///
    /// # Panics
    /// Panics if any plane is shorter than `len`.
    pub fn new(planes: &'a [Vec<f32>], len: usize) -> Self {
        assert!(planes.iter().all(|p| p.len() >= len), "Plane is shorter than frame length");
        Frame {
            planes: planes,
            len: len,
        }
    }

    /// Returns the number of samples each channel has.
    pub fn len(&self) -> usize {
        if self.planes.is_empty() { 0 } else { self.len }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// Returns samples slice for the specified zero-based channel index.
    pub fn channel(&self, index: usize) -> &'a [f32] {
        &self.planes[index][..self.len]
    }
}

/// Frame-oriented decoder fed with pushed bytes.
pub trait Engine {
    /// Decoding state of one opened stream.
    type Handle;

    /// Tries to read stream headers from the start of `data`.
    fn open_push_data(&mut self, data: &[u8], config: &EngineConfig) -> OpenStep<Self::Handle>;

    /// Tries to decode one frame from the start of `data`.
    fn decode_frame_push_data<'a>(&mut self, handle: &'a mut Self::Handle, data: &[u8])
            -> DecodeStep<'a>;

    /// Releases the handle.
    fn close(&mut self, handle: Self::Handle);
}

enum_from_primitive! {
/// Engine error codes understood by [`Error`](../enum.Error.html) when printing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorCode {
    OutOfMemory                     = 3,
    FeatureNotSupported             = 4,
    TooManyChannels                 = 5,
    UnexpectedEof                   = 10,

    // Vorbis layer.
    InvalidSetup                    = 20,
    InvalidStream                   = 21,

    // Ogg layer.
    MissingCapturePattern           = 30,
    InvalidStreamStructureVersion   = 31,
    ContinuedPacketFlagInvalid      = 32,
    IncorrectStreamSerialNumber     = 33,
    InvalidFirstPage                = 34,
    BadPacketType                   = 35,
    BadChecksum                     = 36,
}}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
