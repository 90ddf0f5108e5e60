//! Ogg Vorbis engine.
//!
//! Ogg pages are taken apart by the crate's own push-friendly [`ogg`](../../ogg/index.html)
//! layer, the Vorbis packets are decoded with `lewton`.

use lewton::audio::{read_audio_packet_generic, AudioReadError, PreviousWindowRight};
use lewton::header::{read_header_comment, read_header_ident, read_header_setup, CommentHeader,
                     HeaderReadError, IdentHeader, SetupHeader};
use std::cmp;

use config::EngineConfig;
use engine::{DecodeStep, Engine, ErrorCode, Frame, OpenStep, StreamParams};
use ogg::{Packet, PacketCursor};

type Result<T> = ::std::result::Result<T, ErrorCode>;

/// Engine decoding a single logical Vorbis bitstream in an Ogg container.
#[derive(Clone, Copy, Debug, Default)]
pub struct VorbisEngine;

impl VorbisEngine {
    pub fn new() -> Self {
        VorbisEngine
    }
}

/// Decoding state of an opened Vorbis stream.
pub struct VorbisStream {
    ident: IdentHeader,
    comments: CommentHeader,
    setup: SetupHeader,
    window: PreviousWindowRight,
    cursor: PacketCursor,
    planes: Vec<Vec<f32>>,
    pos: u64,
}

impl VorbisStream {
    pub fn params(&self) -> StreamParams {
        StreamParams::new(self.ident.audio_channels as usize, self.ident.audio_sample_rate)
    }

    pub fn vendor(&self) -> &str {
        &self.comments.vendor
    }

    /// User comments as `(tag, value)` pairs in stream order.
    pub fn comments(&self) -> &[(String, String)] {
        &self.comments.comment_list
    }

    /// Nominal bitrate in bits per second, `None` if the encoder didn't set it.
    pub fn nominal_bitrate(&self) -> Option<u32> {
        if self.ident.bitrate_nominal > 0 { Some(self.ident.bitrate_nominal as u32) } else { None }
    }

    /// Returns the number of samples per channel produced so far.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    fn open(data: &[u8], config: &EngineConfig) -> Result<Option<(usize, VorbisStream)>> {
        let mut cursor = PacketCursor::new(config.verify_crc());
        let mut pos = 0;

        let ident = match next_packet(&mut cursor, data, &mut pos)? {
            Some(p) => read_header_ident(&p.data).map_err(header_error)?,
            None => return Ok(None),
        };
        if ident.audio_channels as usize > config.max_channels() {
            return Err(ErrorCode::TooManyChannels);
        }
        let comments = match next_packet(&mut cursor, data, &mut pos)? {
            Some(p) => read_header_comment(&p.data).map_err(header_error)?,
            None => return Ok(None),
        };
        let setup = match next_packet(&mut cursor, data, &mut pos)? {
            Some(p) => read_header_setup(&p.data, ident.audio_channels,
                                         (ident.blocksize_0, ident.blocksize_1))
                    .map_err(header_error)?,
            None => return Ok(None),
        };

        let planes = vec![Vec::new(); ident.audio_channels as usize];
        Ok(Some((pos, VorbisStream {
            ident: ident,
            comments: comments,
            setup: setup,
            window: PreviousWindowRight::new(),
            cursor: cursor,
            planes: planes,
            pos: 0,
        })))
    }

    /// Decodes an audio packet into `planes` and returns the number of samples per channel.
    /// The first audio packet only primes the overlap window and yields no samples.
    fn decode(&mut self, packet: &Packet) -> Result<usize> {
        if packet.data.is_empty() {
            return Ok(0);
        }
        let planes: Vec<Vec<f32>> = read_audio_packet_generic(&self.ident, &self.setup,
                &packet.data, &mut self.window).map_err(audio_error)?;
        let mut len = planes.iter().map(|p| p.len()).min().unwrap_or(0);

        // The granule position of the final page marks where the stream really ends.
        if packet.last_in_stream() {
            if let Some(end) = packet.granule() {
                len = cmp::min(len as u64, end.saturating_sub(self.pos)) as usize;
            }
        }

        self.pos += len as u64;
        self.planes = planes;
        Ok(len)
    }
}

fn next_packet(cursor: &mut PacketCursor, data: &[u8], pos: &mut usize) -> Result<Option<Packet>> {
    let packet = cursor.next_packet(&data[*pos..])?;
    if let Some(ref p) = packet {
        *pos += p.consumed();
    }
    Ok(packet)
}

fn header_error(e: HeaderReadError) -> ErrorCode {
    debug!("Vorbis header rejected: {:?}", e);
    match e {
        HeaderReadError::NotVorbisHeader | HeaderReadError::HeaderIsAudio => ErrorCode::BadPacketType,
        HeaderReadError::UnsupportedVorbisVersion => ErrorCode::FeatureNotSupported,
        HeaderReadError::EndOfPacket => ErrorCode::UnexpectedEof,
        HeaderReadError::BufferNotAddressable => ErrorCode::OutOfMemory,
        _ => ErrorCode::InvalidSetup,
    }
}

fn audio_error(e: AudioReadError) -> ErrorCode {
    debug!("Vorbis audio packet rejected: {:?}", e);
    match e {
        AudioReadError::AudioIsHeader => ErrorCode::BadPacketType,
        AudioReadError::EndOfPacket => ErrorCode::UnexpectedEof,
        AudioReadError::BufferNotAddressable => ErrorCode::OutOfMemory,
        _ => ErrorCode::InvalidStream,
    }
}

impl Engine for VorbisEngine {
    type Handle = VorbisStream;

    fn open_push_data(&mut self, data: &[u8], config: &EngineConfig) -> OpenStep<VorbisStream> {
        match VorbisStream::open(data, config) {
            Ok(Some((consumed, stream))) => {
                let params = stream.params();
                OpenStep::Opened {
                    consumed: consumed,
                    handle: stream,
                    params: params,
                }
            }
            Ok(None) => OpenStep::NeedMoreData,
            Err(code) => OpenStep::Fatal(code.code()),
        }
    }

    fn decode_frame_push_data<'a>(&mut self, stream: &'a mut VorbisStream, data: &[u8])
            -> DecodeStep<'a> {
        let packet = match stream.cursor.next_packet(data) {
            Ok(Some(p)) => p,
            Ok(None) => return DecodeStep::ZeroProgress,
            Err(code) => return DecodeStep::Fatal(code.code()),
        };
        let len = match stream.decode(&packet) {
            Ok(len) => len,
            Err(code) => return DecodeStep::Fatal(code.code()),
        };
        DecodeStep::Frame {
            consumed: packet.consumed(),
            frame: Frame::new(&stream.planes, len),
        }
    }

    fn close(&mut self, stream: VorbisStream) {
        trace!("Releasing Vorbis stream {:?} at sample {}", stream.cursor.serial(), stream.pos);
    }
}
