//! Push-based streaming [Ogg Vorbis](http://www.vorbis.com/) decoder.
//!
//! Compressed bytes are pulled from any sequential source (anything implementing `io::Read`)
//! only as the decoder needs them, so playback can start long before the whole stream arrived.
//! Every decoded frame comes back as channel-interleaved `f32` samples.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//!
//! let socket = TcpStream::connect("127.0.0.1:8000").expect("Couldn't connect");
//! let mut session = vorbis_stream::open(socket).expect("Couldn't open stream");
//! let params = session.params().unwrap();
//! println!("{} channel(s) at {} Hz", params.channel_count(), params.sample_rate());
//!
//! while let Some(pcm) = session.decode_next().expect("Couldn't decode frame") {
//!     let frames = pcm.len() / params.channel_count();
//!     // Queue `pcm` for playback.
//!     # let _ = frames;
//! }
//! session.close();
//! ```
//!
//! Other frame decoders plug in through the [`Engine`](engine/trait.Engine.html) trait and
//! [`Session::new()`](struct.Session.html#method.new).

#[macro_use] extern crate enum_primitive;
extern crate lewton;
#[macro_use] extern crate log;
extern crate num;

mod config;
pub mod engine;
mod error;
mod frame;
mod memory;
pub mod ogg;
mod open;
mod pending;
mod session;
mod source;

pub use config::{Config, EngineConfig, DEFAULT_CHUNK_LEN, DEFAULT_MAX_CHANNELS, DEFAULT_MAX_CHUNK_LEN};
pub use engine::{DecodeStep, Engine, ErrorCode, Frame, OpenStep, StreamParams};
pub use engine::vorbis::{VorbisEngine, VorbisStream};
pub use error::{Error, ErrorKind, Result};
pub use frame::interleave;
pub use memory::{decode_memory, duration, to_i16, Pcm16};
pub use pending::{Fill, PendingBuffer};
pub use session::{open, open_with_config, Frames, Session, SessionState};
pub use source::ByteSource;
