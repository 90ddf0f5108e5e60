extern crate vorbis_stream;

mod common;

use std::io::{self, Cursor, Read};
use std::time::Duration;

use vorbis_stream::{to_i16, Config, DecodeStep, Engine, EngineConfig, ErrorCode, ErrorKind, OpenStep,
                    StreamParams, VorbisEngine};

use common::Trickle;

fn open_err<R: Read>(source: R) -> vorbis_stream::Error {
    match vorbis_stream::open(source) {
        Ok(_) => panic!("Opened a stream that shouldn't open"),
        Err(e) => e,
    }
}

#[test]
fn empty_source_is_truncated() {
    assert_eq!(open_err(io::empty()).kind(), ErrorKind::Truncated);
}

#[test]
fn partial_page_is_truncated() {
    let e = open_err(Trickle::new(Cursor::new(b"OggS\x00\x02".to_vec()), 1));
    assert_eq!(e.kind(), ErrorKind::Truncated);
}

#[test]
fn non_ogg_data_is_malformed() {
    for &max_read in &[1, 4096] {
        let e = open_err(Trickle::new(Cursor::new(b"fLaC\x00\x00\x00\x22".to_vec()), max_read));
        assert_eq!(e.kind(), ErrorKind::Malformed);
        assert_eq!(e.engine_code(), Some(ErrorCode::MissingCapturePattern.code()));
    }
}

#[test]
fn endless_page_without_headers_is_malformed() {
    // A page header announcing a body that never ends within the ceiling.
    let mut data = b"OggS\x00\x02".to_vec();
    data.extend_from_slice(&[0; 20]);
    data.push(255);
    data.extend(vec![255; 255]);
    let config = Config::new()
        .with_max_chunk_len(8192)
        .with_engine(EngineConfig::new().with_verify_crc(false));
    let source = Cursor::new(data).chain(io::repeat(0));
    match vorbis_stream::open_with_config(source, config) {
        Ok(_) => panic!("Opened a stream that shouldn't open"),
        Err(e) => assert_eq!(e.kind(), ErrorKind::Malformed),
    }
}

const MONO: &'static [u8] = include_bytes!("data/mono.ogg");
const STEREO: &'static [u8] = include_bytes!("data/stereo.ogg");

// Both files hold the same 2 s tone at 44.1 kHz. Their EOS pages end at this granule.
const FRAMES_PER_CHANNEL: u64 = 88323;

fn decode_trickled(data: &[u8], max_read: usize) -> (Vec<f32>, u64) {
    let mut session = vorbis_stream::open(Trickle::new(Cursor::new(data), max_read)).unwrap();
    let mut pcm = Vec::new();
    while let Some(frame) = session.decode_next().unwrap() {
        pcm.extend(frame);
    }
    let pos = session.handle().unwrap().pos();
    session.close();
    (pcm, pos)
}

#[test]
fn real_stream_decodes_the_same_at_any_delivery_size() {
    for &(data, channel_count) in &[(MONO, 1), (STEREO, 2)] {
        let whole = vorbis_stream::decode_memory(data).unwrap();
        assert_eq!(whole.params(), StreamParams::new(channel_count, 44100));
        assert_eq!(whole.samples().len() as u64, FRAMES_PER_CHANNEL * channel_count as u64);

        for &max_read in &[1, 3, 100000] {
            let (pcm, pos) = decode_trickled(data, max_read);
            assert_eq!(pos, FRAMES_PER_CHANNEL);
            let pcm: Vec<i16> = pcm.iter().map(|&s| to_i16(s)).collect();
            assert!(pcm == whole.samples(), "max_read {} differs from whole decode", max_read);
        }
    }
}

#[test]
fn real_stream_is_trimmed_to_last_granule() {
    // The final mono packet decodes to more samples than the EOS granule allows.
    let (pcm, _) = decode_trickled(MONO, 4096);
    assert_eq!(pcm.len() as u64, FRAMES_PER_CHANNEL);

    let expected = Duration::new(FRAMES_PER_CHANNEL / 44100, 2_789_115);
    assert_eq!(vorbis_stream::duration(MONO).unwrap(), expected);
    assert_eq!(vorbis_stream::duration(STEREO).unwrap(), expected);
}

#[test]
fn real_stream_headers() {
    for &(data, bitrate) in &[(MONO, 96000), (STEREO, 160000)] {
        let mut session = vorbis_stream::open(data).unwrap();
        assert_eq!(session.config().chunk_len(), vorbis_stream::DEFAULT_CHUNK_LEN);
        {
            let stream = session.handle().unwrap();
            assert!(stream.vendor().starts_with("BS; LancerMod"));
            assert!(stream.comments().is_empty());
            assert_eq!(stream.nominal_bitrate(), Some(bitrate));
            assert_eq!(stream.pos(), 0);
        }
        session.close();
        assert!(session.handle().is_none());
    }
}

#[test]
fn first_audio_packet_only_primes_the_window() {
    let mut engine = VorbisEngine::new();
    let (mut pos, mut stream) = match engine.open_push_data(STEREO, &EngineConfig::default()) {
        OpenStep::Opened { consumed, handle, params } => {
            assert_eq!(params, StreamParams::new(2, 44100));
            (consumed, handle)
        }
        _ => panic!("Couldn't open stream"),
    };

    let mut lens = Vec::new();
    for _ in 0..2 {
        match engine.decode_frame_push_data(&mut stream, &STEREO[pos..]) {
            DecodeStep::Frame { consumed, frame } => {
                assert!(consumed > 0);
                assert_eq!(frame.channel_count(), 2);
                lens.push(frame.len());
                pos += consumed;
            }
            _ => panic!("Couldn't decode frame"),
        }
    }
    assert_eq!(lens[0], 0);
    assert!(lens[1] > 0);
    assert_eq!(stream.pos(), lens[1] as u64);
    engine.close(stream);
}
