use std::io;

use error::Result;
use source::ByteSource;

/// Outcome of [`PendingBuffer::fill()`](struct.PendingBuffer.html#method.fill).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    /// The buffer holds at least the requested number of bytes.
    Ready,
    /// The source ended first. Whatever it delivered is still buffered.
    Eof,
}

/// Compressed bytes received from the source but not yet consumed by the engine.
///
/// Bytes are kept contiguous and in stream order.
#[derive(Debug, Default)]
pub struct PendingBuffer {
    buf: Vec<u8>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Tops the buffer up from `source` until it holds at least `min_len` bytes.
    pub fn fill<S: ByteSource + ?Sized>(&mut self, source: &mut S, min_len: usize) -> Result<Fill> {
        let mut filled = self.buf.len();
        if filled >= min_len {
            return Ok(Fill::Ready);
        }
        self.buf.resize(min_len, 0);
        let r = loop {
            if filled == min_len {
                break Ok(Fill::Ready);
            }
            match source.read_bytes(&mut self.buf[filled..]) {
                Ok(0) => break Ok(Fill::Eof),
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e.into()),
            }
        };
        self.buf.truncate(filled);
        r
    }

    /// Drops the first `n` bytes.
    ///
    /// # Panics
    /// Panics if `n` is greater than `len()`.
    pub fn consume_front(&mut self, n: usize) {
        assert!(n <= self.buf.len(), "Can't consume {} bytes out of {}", n, self.buf.len());
        self.buf.drain(..n);
    }

    /// Puts `bytes` back in front of the buffered data.
    pub fn prepend_remainder(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.buf.splice(..0, bytes.iter().cloned());
        }
    }

    /// Splits at most `n` bytes off the front of the buffer.
    pub fn take_chunk(&mut self, n: usize) -> Vec<u8> {
        let n = n.min(self.buf.len());
        let chunk = self.buf[..n].to_vec();
        self.consume_front(n);
        chunk
    }

    pub fn clear(&mut self) {
        self.buf = Vec::new();
    }
}
