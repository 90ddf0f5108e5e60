//! One-shot helpers for streams that are already fully in memory.

use std::time::Duration;

use engine::StreamParams;
use error::{Error, Result};
use ogg;
use session::open;

/// Whole stream decoded to interleaved 16-bit samples.
#[derive(Clone, Debug)]
pub struct Pcm16 {
    samples: Vec<i16>,
    params: StreamParams,
}

impl Pcm16 {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn params(&self) -> StreamParams {
        self.params
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

/// Converts a float sample in `[-1, 1]` to 16 bits, saturating outside that range.
pub fn to_i16(s: f32) -> i16 {
    (s * 32767.0 + 0.5).floor().max(-32768.0).min(32767.0) as i16
}

/// Decodes a complete Ogg Vorbis file.
pub fn decode_memory(data: &[u8]) -> Result<Pcm16> {
    let mut session = open(data)?;
    let params = match session.params() {
        Some(p) => p,
        None => return Err(Error::Stream("Opened session has no parameters")),
    };
    let mut samples = Vec::new();
    while let Some(pcm) = session.decode_next()? {
        samples.extend(pcm.iter().map(|&s| to_i16(s)));
    }
    session.close();
    Ok(Pcm16 {
        samples: samples,
        params: params,
    })
}

/// Returns the playback duration of a complete Ogg Vorbis file, from the granule position of
/// its last page.
pub fn duration(data: &[u8]) -> Result<Duration> {
    let mut session = open(data)?;
    let sample_rate = match session.params() {
        Some(p) => p.sample_rate() as u64,
        None => return Err(Error::Stream("Opened session has no parameters")),
    };
    session.close();

    let samples = ogg::last_granule(data)
        .map_err(|code| Error::Malformed(Some(code.code())))?
        .unwrap_or(0);
    let nanos = (samples % sample_rate) * 1_000_000_000 / sample_rate;
    Ok(Duration::new(samples / sample_rate, nanos as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    use error::ErrorKind;

    #[test]
    fn to_i16_rounds_and_saturates() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), 32767);
        assert_eq!(to_i16(-1.0), -32767);
        assert_eq!(to_i16(4.0), 32767);
        assert_eq!(to_i16(-4.0), -32768);
        assert_eq!(to_i16(0.5), 16384);
    }

    #[test]
    fn empty_input_is_truncated() {
        assert_eq!(decode_memory(&[]).unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(duration(&[]).unwrap_err().kind(), ErrorKind::Truncated);
    }

    #[test]
    fn garbage_is_malformed() {
        let e = decode_memory(b"RIFF\x24\x00\x00\x00WAVEfmt ").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Malformed);
        assert_eq!(e.engine_code(), Some(30));
    }
}
