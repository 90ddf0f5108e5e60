use config::Config;
use engine::{Engine, OpenStep, StreamParams};
use error::{Error, Result};
use pending::{Fill, PendingBuffer};
use source::ByteSource;

/// Feeds growing chunks to the engine until it opens the stream.
///
/// On success the bytes the engine didn't use are left in `pending`, in stream order. On
/// failure no handle is held.
pub fn open_stream<E, S>(engine: &mut E, source: &mut S, pending: &mut PendingBuffer, config: &Config)
        -> Result<(E::Handle, StreamParams)>
        where E: Engine, S: ByteSource + ?Sized {
    let mut chunk_len = config.chunk_len();
    loop {
        let fill = pending.fill(source, chunk_len)?;
        let chunk = pending.take_chunk(chunk_len);

        match engine.open_push_data(&chunk, config.engine()) {
            OpenStep::Opened { consumed, handle, params } => {
                if consumed > chunk.len() {
                    engine.close(handle);
                    pending.prepend_remainder(&chunk);
                    return Err(Error::Stream("Engine consumed more bytes than supplied"));
                }
                pending.prepend_remainder(&chunk[consumed..]);
                if !params.is_valid() {
                    engine.close(handle);
                    return Err(Error::Stream("Engine reported invalid stream parameters"));
                }
                debug!("Opened stream: {} channel(s) at {} Hz, headers took {} bytes",
                    params.channel_count(), params.sample_rate(), consumed);
                return Ok((handle, params));
            }
            OpenStep::NeedMoreData => {
                pending.prepend_remainder(&chunk);
                if fill == Fill::Eof {
                    return Err(Error::Truncated);
                }
                chunk_len = match config.grow(chunk_len) {
                    Some(len) => len,
                    None => return Err(Error::Malformed(None)),
                };
                trace!("Stream headers need more data, growing chunk to {} bytes", chunk_len);
            }
            OpenStep::Fatal(code) => {
                pending.prepend_remainder(&chunk);
                return Err(Error::Malformed(Some(code)));
            }
        }
    }
}
