use config::Config;
use engine::{Engine, StreamParams};
use engine::vorbis::VorbisEngine;
use error::{Error, Result};
use frame::decode_frame;
use open::open_stream;
use pending::PendingBuffer;
use source::ByteSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opening,
    Ready,
    Failed,
    Closed,
}

/// Streaming decode session.
///
/// Pulls compressed bytes from the source only as needed and hands out one frame of
/// interleaved samples per [`decode_next()`](#method.decode_next) call. Bytes the engine didn't
/// use yet are kept between calls.
///
/// The engine stream handle is released exactly once: by [`close()`](#method.close) or when
/// the session is dropped.
pub struct Session<E: Engine, S> {
    engine: E,
    source: S,
    config: Config,
    pending: PendingBuffer,
    handle: Option<E::Handle>,
    params: Option<StreamParams>,
    state: SessionState,
}

impl<E: Engine, S: ByteSource> Session<E, S> {
    /// Creates an unopened session.
    ///
    /// # Panics
    /// Panics if `config` has a zero chunk length or a ceiling below the chunk length.
    pub fn new(engine: E, source: S, config: Config) -> Self {
        config.assert_valid();
        Session {
            engine: engine,
            source: source,
            config: config,
            pending: PendingBuffer::new(),
            handle: None,
            params: None,
            state: SessionState::Unopened,
        }
    }

    /// Reads the stream headers.
    pub fn open(&mut self) -> Result<StreamParams> {
        if self.state != SessionState::Unopened {
            return Err(Error::InvalidState(self.state));
        }
        self.state = SessionState::Opening;
        match open_stream(&mut self.engine, &mut self.source, &mut self.pending, &self.config) {
            Ok((handle, params)) => {
                self.handle = Some(handle);
                self.params = Some(params);
                self.state = SessionState::Ready;
                Ok(params)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Decodes the next frame. Returns `Ok(None)` once the source has ended cleanly.
    ///
    /// Any error leaves the session `Failed`.
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>> {
        if self.state != SessionState::Ready {
            return Err(Error::InvalidState(self.state));
        }
        let r = match (self.handle.as_mut(), self.params) {
            (Some(handle), Some(params)) => decode_frame(&mut self.engine, handle, &mut self.source,
                                                         &mut self.pending, params, &self.config),
            _ => Err(Error::Stream("Ready session has no stream handle")),
        };
        match r {
            Ok(None) => {
                debug!("End of stream, {} byte(s) left unused", self.pending.len());
                Ok(None)
            }
            Ok(Some(pcm)) => Ok(Some(pcm)),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Returns an iterator over the remaining frames. The iterator stops after the first error.
    pub fn frames<'a>(&'a mut self) -> Frames<'a, E, S> {
        Frames {
            session: self,
            done: false,
        }
    }

    fn fail(&mut self, e: Error) -> Error {
        debug!("Session failed: {}", e);
        self.state = SessionState::Failed;
        e
    }
}

impl<E: Engine, S> Session<E, S> {
    /// Stream parameters, available once the session was opened.
    pub fn params(&self) -> Option<StreamParams> {
        self.params
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The engine stream handle while the session holds it.
    pub fn handle(&self) -> Option<&E::Handle> {
        self.handle.as_ref()
    }

    /// Releases the engine stream handle and buffered bytes. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.release();
        self.pending.clear();
        self.state = SessionState::Closed;
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Releasing stream handle");
            self.engine.close(handle);
        }
    }
}

impl<E: Engine, S> Drop for Session<E, S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Iterator returned by [`Session::frames()`](struct.Session.html#method.frames).
pub struct Frames<'a, E: Engine + 'a, S: 'a> {
    session: &'a mut Session<E, S>,
    done: bool,
}

impl<'a, E: Engine + 'a, S: ByteSource + 'a> Iterator for Frames<'a, E, S> {
    type Item = Result<Vec<f32>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.session.decode_next() {
            Ok(Some(pcm)) => Some(Ok(pcm)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Opens a session decoding Ogg Vorbis from `source` with the default config.
pub fn open<S: ByteSource>(source: S) -> Result<Session<VorbisEngine, S>> {
    open_with_config(source, Config::default())
}

/// Opens a session decoding Ogg Vorbis from `source`.
pub fn open_with_config<S: ByteSource>(source: S, config: Config) -> Result<Session<VorbisEngine, S>> {
    let mut session = Session::new(VorbisEngine::new(), source, config);
    session.open()?;
    Ok(session)
}
