/// Size of the first working chunk handed to the engine.
pub const DEFAULT_CHUNK_LEN: usize = 2048;

/// Working chunks never grow past this many bytes by default.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 1 << 20;

/// Channel limit of the built-in Vorbis engine.
pub const DEFAULT_MAX_CHANNELS: usize = 16;

/// Session buffering settings.
///
/// # Example
///
/// ```rust
/// use vorbis_stream::Config;
///
/// let config = Config::new()
///         .with_chunk_len(4096)
///         .with_max_chunk_len(256 * 1024);
/// assert_eq!(config.chunk_len(), 4096);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    chunk_len: usize,
    max_chunk_len: usize,
    engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chunk_len: DEFAULT_CHUNK_LEN,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the size of the first chunk tried by every open and decode call.
    pub fn with_chunk_len(mut self, len: usize) -> Self {
        self.chunk_len = len;
        self
    }

    /// Sets the ceiling past which a chunk that still doesn't let the engine make progress
    /// is reported as a malformed stream.
    pub fn with_max_chunk_len(mut self, len: usize) -> Self {
        self.max_chunk_len = len;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    pub fn max_chunk_len(&self) -> usize {
        self.max_chunk_len
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Returns the next working chunk size after `len` turned out too small, or `None` if it
    /// would exceed the ceiling.
    pub(crate) fn grow(&self, len: usize) -> Option<usize> {
        len.checked_mul(2).and_then(|n| if n <= self.max_chunk_len { Some(n) } else { None })
    }

    pub(crate) fn assert_valid(&self) {
        assert!(self.chunk_len > 0, "Chunk length must be positive");
        assert!(self.max_chunk_len >= self.chunk_len,
            "Max chunk length must not be less than chunk length");
    }
}

/// Settings handed to the engine when a stream is opened.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    max_channels: usize,
    verify_crc: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_channels: DEFAULT_MAX_CHANNELS,
            verify_crc: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_channels(mut self, max_channels: usize) -> Self {
        self.max_channels = max_channels;
        self
    }

    /// Enables or disables Ogg page checksum verification.
    pub fn with_verify_crc(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }

    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    pub fn verify_crc(&self) -> bool {
        self.verify_crc
    }
}
