//! Serial protocol spoken with the OpenTherm adapter board.
//!
//! The adapter drives the bus itself; the host exchanges small fixed-size
//! packets with it over UART. On the wire a packet is:
//!
//! ```text
//! START | type id | payload ...  | crc16   | STOP
//! 0xA0  | 2 nib.  | 2 nib./byte  | 4 nib.  | 0x60
//! ```
//!
//! Every byte between the markers carries a single nibble, so the high
//! nibble is always zero and can never be mistaken for `START` or `STOP`.
//! The crc nibbles are always zero and are not checked.
//!
//! Sending type id [`STREAM_REQ_ID`] switches the link to streaming: every
//! following nibble pair is a raw byte until the next `STOP`.

use tracing::{debug, trace};

use crate::frame::{Frame, FrameError};

pub const BAUD_RATE: u32 = 200_000;
/// Nibbles buffered between `START` and `STOP`.
pub const BUFFER_SIZE: usize = 64;
pub const START_BYTE: u8 = 0b1010_0000;
pub const STOP_BYTE: u8 = 0b0110_0000;
pub const STREAM_REQ_ID: u8 = 100;

const CRC_NIBBLES: usize = 4;
/// Type id, one payload byte and the crc.
const MIN_PACKET_NIBBLES: usize = 2 + 2 + CRC_NIBBLES;

/// Packet type ids.
pub mod type_id {
    pub const CPU_STATUS_REQUEST: u8 = 1;
    pub const CPU_STATUS_RESPONSE: u8 = 2;
    pub const GENERIC_STATUS_RESPONSE: u8 = 3;
    pub const OT_COMMAND_REQUEST: u8 = 4;
    pub const OT_COMMAND_RESPONSE: u8 = 5;
    pub const LOG_REQUEST: u8 = 6;
}

/// Why a received packet was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("packet of {0} nibbles is too short or misaligned")]
    Truncated(usize),

    #[error("no packet type with id {0}")]
    UnknownType(u8),

    #[error("packet type {type_id} carries {expected} bytes, got {actual}")]
    WrongSize {
        type_id: u8,
        expected: usize,
        actual: usize,
    },
}

/// A fixed-size packet body. Multi-byte fields are little endian.
pub trait Payload: Sized {
    const TYPE_ID: u8;
    const SIZE: usize;

    fn write(&self, out: &mut Vec<u8>);

    /// `bytes` is exactly [`Payload::SIZE`] long.
    fn read(bytes: &[u8]) -> Self;
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuStatusRequest {
    pub dummy: u8,
}

impl Payload for CpuStatusRequest {
    const TYPE_ID: u8 = type_id::CPU_STATUS_REQUEST;
    const SIZE: usize = 1;

    fn write(&self, out: &mut Vec<u8>) {
        out.push(self.dummy);
    }

    fn read(bytes: &[u8]) -> Self {
        Self { dummy: bytes[0] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuStatusResponse {
    pub cpu_ver: u8,
    pub fw_ver: u8,
    pub board_rev: u8,
    /// Seconds since the adapter booted.
    pub uptime: u32,
}

impl Payload for CpuStatusResponse {
    const TYPE_ID: u8 = type_id::CPU_STATUS_RESPONSE;
    const SIZE: usize = 7;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend([self.cpu_ver, self.fw_ver, self.board_rev]);
        out.extend(self.uptime.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> Self {
        Self {
            cpu_ver: bytes[0],
            fw_ver: bytes[1],
            board_rev: bytes[2],
            uptime: le_u32(bytes, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenericStatusResponse {
    pub boiler_status: u32,
    pub ext_temp: f32,
    pub light_value: u16,
}

impl Payload for GenericStatusResponse {
    const TYPE_ID: u8 = type_id::GENERIC_STATUS_RESPONSE;
    const SIZE: usize = 10;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend(self.boiler_status.to_le_bytes());
        out.extend(self.ext_temp.to_le_bytes());
        out.extend(self.light_value.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> Self {
        Self {
            boiler_status: le_u32(bytes, 0),
            ext_temp: f32::from_bits(le_u32(bytes, 4)),
            light_value: le_u16(bytes, 8),
        }
    }
}

/// Asks the adapter to put one frame on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtCommandRequest {
    pub payload: u32,
}

impl From<Frame> for OtCommandRequest {
    fn from(frame: Frame) -> Self {
        Self {
            payload: frame.to_word(),
        }
    }
}

impl Payload for OtCommandRequest {
    const TYPE_ID: u8 = type_id::OT_COMMAND_REQUEST;
    const SIZE: usize = 4;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend(self.payload.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> Self {
        Self {
            payload: le_u32(bytes, 0),
        }
    }
}

/// The boiler's answer to an [`OtCommandRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtCommandResponse {
    pub payload: u32,
    pub response_status: u8,
}

impl OtCommandResponse {
    /// Decode the carried word as a bus frame.
    pub fn frame(&self) -> Result<Frame, FrameError> {
        Frame::from_word(self.payload)
    }
}

impl Payload for OtCommandResponse {
    const TYPE_ID: u8 = type_id::OT_COMMAND_RESPONSE;
    const SIZE: usize = 5;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend(self.payload.to_le_bytes());
        out.push(self.response_status);
    }

    fn read(bytes: &[u8]) -> Self {
        Self {
            payload: le_u32(bytes, 0),
            response_status: bytes[4],
        }
    }
}

pub const LOG_PAYLOAD_SIZE: usize = 25;

/// A log line from the adapter firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRequest {
    pub payload: [u8; LOG_PAYLOAD_SIZE],
    pub length: u8,
}

impl LogRequest {
    pub fn new(text: &str) -> Self {
        let mut payload = [0u8; LOG_PAYLOAD_SIZE];
        let bytes = &text.as_bytes()[..text.len().min(LOG_PAYLOAD_SIZE)];
        payload[..bytes.len()].copy_from_slice(bytes);
        Self {
            payload,
            length: bytes.len() as u8,
        }
    }

    pub fn text(&self) -> String {
        let len = usize::from(self.length).min(LOG_PAYLOAD_SIZE);
        String::from_utf8_lossy(&self.payload[..len]).into_owned()
    }
}

impl Payload for LogRequest {
    const TYPE_ID: u8 = type_id::LOG_REQUEST;
    const SIZE: usize = LOG_PAYLOAD_SIZE + 1;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend(self.payload);
        out.push(self.length);
    }

    fn read(bytes: &[u8]) -> Self {
        let mut payload = [0u8; LOG_PAYLOAD_SIZE];
        payload.copy_from_slice(&bytes[..LOG_PAYLOAD_SIZE]);
        Self {
            payload,
            length: bytes[LOG_PAYLOAD_SIZE],
        }
    }
}

/// Any packet the adapter link carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    CpuStatusRequest(CpuStatusRequest),
    CpuStatusResponse(CpuStatusResponse),
    GenericStatusResponse(GenericStatusResponse),
    OtCommandRequest(OtCommandRequest),
    OtCommandResponse(OtCommandResponse),
    LogRequest(LogRequest),
}

fn read_sized<T: Payload>(bytes: &[u8]) -> Result<T, PacketError> {
    if bytes.len() != T::SIZE {
        return Err(PacketError::WrongSize {
            type_id: T::TYPE_ID,
            expected: T::SIZE,
            actual: bytes.len(),
        });
    }
    Ok(T::read(bytes))
}

impl Packet {
    /// Build a packet from its type id and decoded payload bytes.
    pub fn decode(id: u8, bytes: &[u8]) -> Result<Self, PacketError> {
        match id {
            type_id::CPU_STATUS_REQUEST => read_sized(bytes).map(Self::CpuStatusRequest),
            type_id::CPU_STATUS_RESPONSE => read_sized(bytes).map(Self::CpuStatusResponse),
            type_id::GENERIC_STATUS_RESPONSE => {
                read_sized(bytes).map(Self::GenericStatusResponse)
            }
            type_id::OT_COMMAND_REQUEST => read_sized(bytes).map(Self::OtCommandRequest),
            type_id::OT_COMMAND_RESPONSE => read_sized(bytes).map(Self::OtCommandResponse),
            type_id::LOG_REQUEST => read_sized(bytes).map(Self::LogRequest),
            other => Err(PacketError::UnknownType(other)),
        }
    }

    pub fn type_id(&self) -> u8 {
        match self {
            Self::CpuStatusRequest(_) => CpuStatusRequest::TYPE_ID,
            Self::CpuStatusResponse(_) => CpuStatusResponse::TYPE_ID,
            Self::GenericStatusResponse(_) => GenericStatusResponse::TYPE_ID,
            Self::OtCommandRequest(_) => OtCommandRequest::TYPE_ID,
            Self::OtCommandResponse(_) => OtCommandResponse::TYPE_ID,
            Self::LogRequest(_) => LogRequest::TYPE_ID,
        }
    }

    /// Wire bytes for this packet.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::CpuStatusRequest(p) => encode(p),
            Self::CpuStatusResponse(p) => encode(p),
            Self::GenericStatusResponse(p) => encode(p),
            Self::OtCommandRequest(p) => encode(p),
            Self::OtCommandResponse(p) => encode(p),
            Self::LogRequest(p) => encode(p),
        }
    }
}

fn push_nibbles(out: &mut Vec<u8>, byte: u8) {
    out.push(byte >> 4);
    out.push(byte & 0xF);
}

fn join_nibbles(high: u8, low: u8) -> u8 {
    ((high & 0xF) << 4) | (low & 0xF)
}

/// Frame `payload` for the wire.
pub fn encode<T: Payload>(payload: &T) -> Vec<u8> {
    let mut body = Vec::with_capacity(T::SIZE);
    payload.write(&mut body);

    let mut out = Vec::with_capacity(2 + 2 * (1 + body.len()) + CRC_NIBBLES);
    out.push(START_BYTE);
    push_nibbles(&mut out, T::TYPE_ID);
    for byte in body {
        push_nibbles(&mut out, byte);
    }
    out.extend([0u8; CRC_NIBBLES]);
    out.push(STOP_BYTE);
    out
}

/// What a byte completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Packet(Packet),
    /// One byte received in streaming mode.
    Stream(u8),
    /// `STOP` ended a stream.
    StreamEnd,
    /// A packet arrived complete but could not be used.
    Dropped(PacketError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitingStart,
    WaitingStop,
}

/// Incremental decoder for the adapter byte stream.
#[derive(Debug, Clone)]
pub struct PacketDecoder {
    state: State,
    streaming: bool,
    data: Vec<u8>,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            state: State::WaitingStart,
            streaming: false,
            data: Vec::with_capacity(BUFFER_SIZE),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Feed one byte from the link.
    pub fn push(&mut self, byte: u8) -> Option<Event> {
        match self.state {
            State::WaitingStart => {
                if byte == START_BYTE {
                    self.state = State::WaitingStop;
                }
                None
            }
            State::WaitingStop if byte == STOP_BYTE => {
                let event = if self.streaming {
                    Event::StreamEnd
                } else {
                    match self.finish() {
                        Ok(packet) => Event::Packet(packet),
                        Err(e) => {
                            debug!(error = %e, "Dropped adapter packet");
                            Event::Dropped(e)
                        }
                    }
                };
                self.reset();
                Some(event)
            }
            State::WaitingStop => {
                if byte >> 4 != 0 {
                    // repeated START before any data is skipped
                    if !self.data.is_empty() || byte != START_BYTE {
                        trace!(byte, "Invalid nibble, waiting for the next packet");
                        self.reset();
                    }
                    return None;
                }
                if self.data.len() >= BUFFER_SIZE {
                    trace!("Packet buffer overflow, waiting for the next packet");
                    self.reset();
                    return None;
                }

                self.data.push(byte);
                if self.data.len() == 2 {
                    let value = join_nibbles(self.data[0], self.data[1]);
                    if self.streaming {
                        self.data.clear();
                        return Some(Event::Stream(value));
                    }
                    if value == STREAM_REQ_ID {
                        debug!("Adapter link switched to streaming");
                        self.streaming = true;
                        self.data.clear();
                    }
                }
                None
            }
        }
    }

    /// Feed a run of bytes, collecting every completed event.
    pub fn push_all(&mut self, bytes: &[u8]) -> Vec<Event> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    fn finish(&self) -> Result<Packet, PacketError> {
        let n = self.data.len();
        if n < MIN_PACKET_NIBBLES || n % 2 != 0 {
            return Err(PacketError::Truncated(n));
        }
        let id = join_nibbles(self.data[0], self.data[1]);
        let bytes: Vec<u8> = self.data[2..n - CRC_NIBBLES]
            .chunks_exact(2)
            .map(|pair| join_nibbles(pair[0], pair[1]))
            .collect();
        Packet::decode(id, &bytes)
    }

    fn reset(&mut self) {
        self.state = State::WaitingStart;
        self.streaming = false;
        self.data.clear();
    }
}
