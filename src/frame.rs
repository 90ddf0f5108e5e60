use config::Config;
use engine::{DecodeStep, Engine, Frame, StreamParams};
use error::{Error, Result};
use pending::{Fill, PendingBuffer};
use source::ByteSource;

/// Decodes the next frame with samples and returns it interleaved, or `None` once the source
/// has ended on a packet boundary.
///
/// Frames the engine decodes without samples (like the one priming the overlap window) are
/// skipped.
pub fn decode_frame<E, S>(engine: &mut E, handle: &mut E::Handle, source: &mut S,
                          pending: &mut PendingBuffer, params: StreamParams, config: &Config)
        -> Result<Option<Vec<f32>>>
        where E: Engine, S: ByteSource + ?Sized {
    let mut chunk_len = config.chunk_len();
    loop {
        let fill = pending.fill(source, chunk_len)?;
        let chunk = pending.take_chunk(chunk_len);
        if chunk.is_empty() && fill == Fill::Eof {
            return Ok(None);
        }

        match engine.decode_frame_push_data(handle, &chunk) {
            DecodeStep::Frame { consumed, frame } => {
                if consumed > chunk.len() {
                    pending.prepend_remainder(&chunk);
                    return Err(Error::Stream("Engine consumed more bytes than supplied"));
                }
                pending.prepend_remainder(&chunk[consumed..]);
                // Zero bytes consumed is no progress whatever the engine decoded.
                if consumed > 0 {
                    if frame.is_empty() {
                        trace!("Skipping frame without samples ({} bytes)", consumed);
                        continue;
                    }
                    if frame.channel_count() != params.channel_count() {
                        return Err(Error::Stream("Channel count changed after open"));
                    }
                    return Ok(Some(interleave(&frame)));
                }
            }
            DecodeStep::ZeroProgress => {
                pending.prepend_remainder(&chunk);
            }
            DecodeStep::Fatal(code) => {
                pending.prepend_remainder(&chunk);
                return Err(Error::Decode(code));
            }
        }

        if fill == Fill::Eof {
            return Err(Error::Truncated);
        }
        chunk_len = match config.grow(chunk_len) {
            Some(len) => len,
            None => return Err(Error::Malformed(None)),
        };
        trace!("Frame needs more data, growing chunk to {} bytes", chunk_len);
    }
}

/// Copies planar samples into a single channel-interleaved buffer.
pub fn interleave(frame: &Frame) -> Vec<f32> {
    let channel_count = frame.channel_count();
    let mut r = vec![0.0; frame.len() * channel_count];
    for c in 0..channel_count {
        for (s, &v) in frame.channel(c).iter().enumerate() {
            r[s * channel_count + c] = v;
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_stereo() {
        let planes = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(interleave(&Frame::new(&planes, 3)), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn interleave_respects_frame_len() {
        let planes = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]];
        assert_eq!(interleave(&Frame::new(&planes, 2)), vec![1.0, 4.0, 7.0, 2.0, 5.0, 8.0]);
    }

    #[test]
    fn interleave_mono_is_a_copy() {
        let planes = vec![vec![0.5, -0.5]];
        assert_eq!(interleave(&Frame::new(&planes, 2)), vec![0.5, -0.5]);
    }
}
