use num::FromPrimitive;
use std::{error, fmt, io};

use engine::ErrorCode;
use session::SessionState;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The byte source failed.
    Source(io::Error),
    /// The engine rejected the stream while opening (`Some(code)`) or couldn't make progress
    /// before the working chunk outgrew the configured ceiling (`None`).
    Malformed(Option<i32>),
    /// The byte source ended while the engine still needed more data.
    Truncated,
    /// The engine failed to decode a frame.
    Decode(i32),
    /// The engine broke its contract or changed stream parameters after open.
    Stream(&'static str),
    /// The session is not in a state that allows the call.
    InvalidState(SessionState),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorKind {
    Source,
    Malformed,
    Truncated,
    Decode,
    Stream,
    InvalidState,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            &Error::Source(_)       => ErrorKind::Source,
            &Error::Malformed(_)    => ErrorKind::Malformed,
            &Error::Truncated       => ErrorKind::Truncated,
            &Error::Decode(_)       => ErrorKind::Decode,
            &Error::Stream(_)       => ErrorKind::Stream,
            &Error::InvalidState(_) => ErrorKind::InvalidState,
        }
    }

    /// Returns the engine error code carried by this error, if any.
    pub fn engine_code(&self) -> Option<i32> {
        match self {
            &Error::Malformed(code) => code,
            &Error::Decode(code)    => Some(code),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Source(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Error::Source(ref e) => write!(f, "byte source failed: {}", e),
            &Error::Malformed(None) => f.write_str("malformed stream: no progress within the buffer ceiling"),
            &Error::Malformed(Some(code)) => write!(f, "malformed stream: {}", EngineCode(code)),
            &Error::Truncated => f.write_str("stream ended in the middle of a packet"),
            &Error::Decode(code) => write!(f, "frame decode failed: {}", EngineCode(code)),
            &Error::Stream(msg) => write!(f, "stream error: {}", msg),
            &Error::InvalidState(state) => write!(f, "invalid session state: {:?}", state),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            &Error::Source(ref e) => Some(e),
            _ => None,
        }
    }
}

struct EngineCode(i32);

impl fmt::Display for EngineCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match ErrorCode::from_i32(self.0) {
            Some(code) => write!(f, "engine error {} ({:?})", self.0, code),
            None => write!(f, "engine error {}", self.0),
        }
    }
}
