use std::io::{self, Read};

/// Sequential, non-seekable supplier of compressed bytes.
///
/// Every `io::Read` is a byte source: reading `0` bytes into a non-empty buffer means the
/// stream has ended, and an error means the source failed. Reads may block.
pub trait ByteSource {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: Read> ByteSource for R {
    #[inline]
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}
