//! Ogg page layer for pushed bytes.
//!
//! Extracts whole packets of a single logical bitstream from whatever prefix of the physical
//! stream has arrived so far. Nothing is committed until a packet is complete, so a caller that
//! gets `Ok(None)` can retry later with the same bytes plus more.

use engine::ErrorCode;

const CAPTURE_PATTERN: &'static [u8] = b"OggS";
const HEADER_LEN: usize = 27;
const MAX_LACING_VALUE: u8 = 255;

const FLAG_CONTINUED: u8 = 0x01;
const FLAG_BOS: u8 = 0x02;
const FLAG_EOS: u8 = 0x04;

const NO_GRANULE: u64 = !0;

pub type Result<T> = ::std::result::Result<T, ErrorCode>;

static CRC_TABLE: [u32; 256] = crc_table();

const fn crc_table() -> [u32; 256] {
    let mut table = [0; 256];
    let mut i = 0;
    while i < 256 {
        let mut r = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            r = if r & 0x8000_0000 != 0 { (r << 1) ^ 0x04c1_1db7 } else { r << 1 };
            j += 1;
        }
        table[i] = r;
        i += 1;
    }
    table
}

fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    data.iter().fold(crc, |crc, &b| (crc << 8) ^ CRC_TABLE[((crc >> 24) as u8 ^ b) as usize])
}

/// Ogg flavour of CRC-32: polynomial `0x04c11db7`, zero initial value, no reflection.
pub fn crc32(data: &[u8]) -> u32 {
    crc32_update(0, data)
}

/// Checksum of a whole page, computed as if its checksum field were zero.
fn page_checksum(page: &[u8]) -> u32 {
    let crc = crc32_update(0, &page[..22]);
    let crc = crc32_update(crc, &[0; 4]);
    crc32_update(crc, &page[26..])
}

fn read_u32_le(b: &[u8]) -> u32 {
    b[..4].iter().rev().fold(0, |r, &v| (r << 8) | v as u32)
}

fn read_u64_le(b: &[u8]) -> u64 {
    b[..8].iter().rev().fold(0, |r, &v| (r << 8) | v as u64)
}

#[derive(Clone, Debug)]
pub struct PageHeader {
    flags: u8,
    granule: u64,
    serial: u32,
    sequence: u32,
    checksum: u32,
    lacing: Vec<u8>,
}

impl PageHeader {
    /// Parses the page header at the start of `data`. Returns `Ok(None)` if `data` ends before
    /// the header (including its lacing table) does.
    pub fn parse(data: &[u8]) -> Result<Option<PageHeader>> {
        let capture_len = data.len().min(CAPTURE_PATTERN.len());
        if data[..capture_len] != CAPTURE_PATTERN[..capture_len] {
            return Err(ErrorCode::MissingCapturePattern);
        }
        if data.len() < HEADER_LEN {
            return Ok(None);
        }
        if data[4] != 0 {
            return Err(ErrorCode::InvalidStreamStructureVersion);
        }
        let segment_count = data[26] as usize;
        if data.len() < HEADER_LEN + segment_count {
            return Ok(None);
        }
        Ok(Some(PageHeader {
            flags: data[5],
            granule: read_u64_le(&data[6..]),
            serial: read_u32_le(&data[14..]),
            sequence: read_u32_le(&data[18..]),
            checksum: read_u32_le(&data[22..]),
            lacing: data[HEADER_LEN..HEADER_LEN + segment_count].to_vec(),
        }))
    }

    pub fn header_len(&self) -> usize {
        HEADER_LEN + self.lacing.len()
    }

    pub fn body_len(&self) -> usize {
        self.lacing.iter().map(|&v| v as usize).sum()
    }

    pub fn page_len(&self) -> usize {
        self.header_len() + self.body_len()
    }

    pub fn is_continued(&self) -> bool {
        self.flags & FLAG_CONTINUED != 0
    }

    pub fn is_bos(&self) -> bool {
        self.flags & FLAG_BOS != 0
    }

    pub fn is_eos(&self) -> bool {
        self.flags & FLAG_EOS != 0
    }

    /// Absolute granule position, `None` if no packet ends on this page.
    pub fn granule(&self) -> Option<u64> {
        if self.granule == NO_GRANULE { None } else { Some(self.granule) }
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn lacing(&self) -> &[u8] {
        &self.lacing
    }
}

/// A complete packet extracted by [`PacketCursor`](struct.PacketCursor.html).
#[derive(Debug)]
pub struct Packet {
    pub data: Vec<u8>,
    consumed: usize,
    granule: Option<u64>,
    last_in_stream: bool,
}

impl Packet {
    /// Number of input bytes (page headers included) the packet took.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Granule position of the page this packet ended, if it was the last packet on the page.
    pub fn granule(&self) -> Option<u64> {
        self.granule
    }

    /// Returns `true` if this is the last packet of an end-of-stream page.
    pub fn last_in_stream(&self) -> bool {
        self.last_in_stream
    }
}

#[derive(Clone, Debug)]
struct PageCursor {
    lacing: Vec<u8>,
    next: usize,
    granule: Option<u64>,
    eos: bool,
}

impl PageCursor {
    fn new(header: &PageHeader) -> Self {
        PageCursor {
            lacing: header.lacing.clone(),
            next: 0,
            granule: header.granule(),
            eos: header.is_eos(),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.next >= self.lacing.len()
    }
}

/// Position inside a logical bitstream, always at a packet boundary.
#[derive(Clone, Debug)]
pub struct PacketCursor {
    verify_crc: bool,
    serial: Option<u32>,
    page: Option<PageCursor>,
}

impl PacketCursor {
    pub fn new(verify_crc: bool) -> Self {
        PacketCursor {
            verify_crc: verify_crc,
            serial: None,
            page: None,
        }
    }

    /// Serial number of the logical bitstream, known once the first page was read.
    pub fn serial(&self) -> Option<u32> {
        self.serial
    }

    /// Extracts the next packet from `data`, which must continue exactly where the previously
    /// returned packet ended. Returns `Ok(None)` and leaves the cursor untouched if `data`
    /// doesn't hold the whole packet. Pages are only entered once they're complete.
    pub fn next_packet(&mut self, data: &[u8]) -> Result<Option<Packet>> {
        let mut cursor = self.clone();
        let mut pos = 0;
        let mut packet = Vec::new();
        let mut continued = false;

        let (granule, last_in_stream) = loop {
            if cursor.page.as_ref().map_or(true, PageCursor::is_exhausted) {
                let header = match PageHeader::parse(&data[pos..])? {
                    Some(h) => h,
                    None => return Ok(None),
                };
                let page_len = header.page_len();
                if data.len() - pos < page_len {
                    return Ok(None);
                }
                cursor.enter_page(&header, &data[pos..pos + page_len], continued)?;
                pos += header.header_len();
                continue;
            }

            let page = match cursor.page.as_mut() {
                Some(p) => p,
                None => continue,
            };
            let len = page.lacing[page.next] as usize;
            if data.len() - pos < len {
                return Ok(None);
            }
            page.next += 1;
            packet.extend_from_slice(&data[pos..pos + len]);
            pos += len;

            if len < MAX_LACING_VALUE as usize {
                let last_on_page = page.is_exhausted();
                break (if last_on_page { page.granule } else { None }, last_on_page && page.eos);
            }
            continued = true;
        };

        *self = cursor;
        Ok(Some(Packet {
            data: packet,
            consumed: pos,
            granule: granule,
            last_in_stream: last_in_stream,
        }))
    }

    fn enter_page(&mut self, header: &PageHeader, page: &[u8], continued: bool) -> Result<()> {
        match self.serial {
            None => {
                if !header.is_bos() {
                    return Err(ErrorCode::InvalidFirstPage);
                }
                self.serial = Some(header.serial());
            }
            Some(serial) => if header.serial() != serial {
                return Err(ErrorCode::IncorrectStreamSerialNumber);
            },
        }
        if header.is_continued() != continued {
            return Err(ErrorCode::ContinuedPacketFlagInvalid);
        }
        if self.verify_crc && page_checksum(page) != header.checksum() {
            return Err(ErrorCode::BadChecksum);
        }
        self.page = Some(PageCursor::new(header));
        Ok(())
    }
}

/// Returns the granule position of the last complete page in `data` that belongs to the logical
/// bitstream started by the first BOS page. Scanning stops at that bitstream's EOS page.
pub fn last_granule(data: &[u8]) -> Result<Option<u64>> {
    let mut pos = 0;
    let mut serial = None;
    let mut last = None;
    while let Some(header) = PageHeader::parse(&data[pos..])? {
        let page_len = header.page_len();
        if data.len() - pos < page_len {
            break;
        }
        pos += page_len;
        if serial.is_none() && header.is_bos() {
            serial = Some(header.serial());
        }
        if serial != Some(header.serial()) {
            continue;
        }
        if let Some(g) = header.granule() {
            last = Some(g);
        }
        if header.is_eos() {
            break;
        }
    }
    Ok(last)
}
