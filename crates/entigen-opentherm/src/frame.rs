//! OpenTherm frames.
//!
//! A frame is one 32-bit word on the bus:
//!
//! ```text
//!  31   30..28   27..24   23..16   15..8   7..0
//! [P] [ type ] [spare ] [  id  ] [  HB ] [ LB ]
//! ```
//!
//! `P` makes the number of set bits in the whole word even.

use serde::Serialize;

use crate::message::{MessageId, MessageType};

const PARITY_BIT: u32 = 0x8000_0000;

/// Errors decoding a raw word.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("parity error in frame {0:#010x}")]
    Parity(u32),

    #[error("reserved message type {0} in frame")]
    ReservedMessageType(u8),
}

/// Returns `true` when `word` has an even number of set bits.
pub fn check_parity(word: u32) -> bool {
    let mut val = word;
    val ^= val >> 16;
    val ^= val >> 8;
    val ^= val >> 4;
    val ^= val >> 2;
    val ^= val >> 1;
    (!val) & 1 == 1
}

/// One decoded OpenTherm message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub msg_type: MessageType,
    pub id: u8,
    pub value_hb: u8,
    pub value_lb: u8,
}

impl Frame {
    pub fn new(msg_type: MessageType, id: MessageId) -> Self {
        Self {
            msg_type,
            id: id as u8,
            value_hb: 0,
            value_lb: 0,
        }
    }

    /// Decode a word read from the bus, checking parity.
    pub fn from_word(word: u32) -> Result<Self, FrameError> {
        if !check_parity(word) {
            return Err(FrameError::Parity(word));
        }
        let raw_type = ((word >> 28) & 0x7) as u8;
        let msg_type =
            MessageType::from_u8(raw_type).ok_or(FrameError::ReservedMessageType(raw_type))?;
        Ok(Self {
            msg_type,
            id: ((word >> 16) & 0xFF) as u8,
            value_hb: ((word >> 8) & 0xFF) as u8,
            value_lb: (word & 0xFF) as u8,
        })
    }

    /// Encode to a word, setting the parity bit when needed.
    pub fn to_word(&self) -> u32 {
        let mut word = self.msg_type as u32;
        word = (word << 12) | self.id as u32;
        word = (word << 8) | self.value_hb as u32;
        word = (word << 8) | self.value_lb as u32;
        if !check_parity(word) {
            word |= PARITY_BIT;
        }
        word
    }

    /// The data id, if it is one this component knows.
    pub fn message_id(&self) -> Option<MessageId> {
        MessageId::from_u8(self.id)
    }

    pub fn u16(&self) -> u16 {
        (u16::from(self.value_hb) << 8) | u16::from(self.value_lb)
    }

    pub fn set_u16(&mut self, value: u16) {
        self.value_lb = (value & 0xFF) as u8;
        self.value_hb = ((value >> 8) & 0xFF) as u8;
    }

    pub fn s16(&self) -> i16 {
        self.u16() as i16
    }

    pub fn set_s16(&mut self, value: i16) {
        self.set_u16(value as u16);
    }

    /// Signed fixed point with 8 fractional bits.
    pub fn f88(&self) -> f32 {
        f32::from(self.s16()) / 256.0
    }

    pub fn set_f88(&mut self, value: f32) {
        self.set_s16((value * 256.0) as i16);
    }

    /// Type, id, HB and LB as binary octets.
    pub fn bits(&self) -> String {
        format!(
            "{:08b} {:08b} {:08b} {:08b}",
            self.msg_type as u8, self.id, self.value_hb, self.value_lb
        )
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self.message_id() {
            Some(id) => id.name().to_string(),
            None => self.id.to_string(),
        };
        write!(
            f,
            "type: {}; id: {}; HB: {}; LB: {}; uint_16: {}; float: {}",
            self.msg_type,
            id,
            self.value_hb,
            self.value_lb,
            self.u16(),
            self.f88()
        )
    }
}
