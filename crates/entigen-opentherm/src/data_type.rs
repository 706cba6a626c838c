//! How the 16-bit payload of a message is turned into a reading.

use entigen_core::config_enum;

use crate::frame::Frame;

config_enum! {
    /// Payload encoding of a message.
    pub enum MessageDataType {
        /// Unsigned low byte.
        U8Lb => "u8_lb",
        /// Unsigned high byte.
        U8Hb => "u8_hb",
        /// Signed low byte.
        S8Lb => "s8_lb",
        /// Signed high byte.
        S8Hb => "s8_hb",
        /// Unsigned low byte, in units of 60.
        U8Lb60 => "u8_lb_60",
        /// Unsigned high byte, in units of 60.
        U8Hb60 => "u8_hb_60",
        U16 => "u16",
        S16 => "s16",
        /// Signed fixed point, 8 fractional bits.
        F88 => "f88",
    }
}

impl MessageDataType {
    /// Enumerator name in the generated code.
    pub fn cpp_member(&self) -> &'static str {
        match self {
            Self::U8Lb => "U8_LB",
            Self::U8Hb => "U8_HB",
            Self::S8Lb => "S8_LB",
            Self::S8Hb => "S8_HB",
            Self::U8Lb60 => "U8_LB_60",
            Self::U8Hb60 => "U8_HB_60",
            Self::U16 => "U16",
            Self::S16 => "S16",
            Self::F88 => "F88",
        }
    }

    /// Decode the payload of `frame`.
    pub fn decode(&self, frame: &Frame) -> f32 {
        match self {
            Self::U8Lb => f32::from(frame.value_lb),
            Self::U8Hb => f32::from(frame.value_hb),
            Self::S8Lb => f32::from(frame.value_lb as i8),
            Self::S8Hb => f32::from(frame.value_hb as i8),
            Self::U8Lb60 => f32::from(frame.value_lb) * 60.0,
            Self::U8Hb60 => f32::from(frame.value_hb) * 60.0,
            Self::U16 => f32::from(frame.u16()),
            Self::S16 => f32::from(frame.s16()),
            Self::F88 => frame.f88(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageId, MessageType};

    fn frame(hb: u8, lb: u8) -> Frame {
        let mut frame = Frame::new(MessageType::ReadAck, MessageId::DhwBounds);
        frame.value_hb = hb;
        frame.value_lb = lb;
        frame
    }

    #[test]
    fn test_exactly_nine_tags() {
        assert_eq!(
            MessageDataType::options(),
            vec!["u8_lb", "u8_hb", "s8_lb", "s8_hb", "u8_lb_60", "u8_hb_60", "u16", "s16", "f88"]
        );
    }

    #[test]
    fn test_decode_bytes() {
        let f = frame(0xF6, 0x28);
        assert_eq!(MessageDataType::U8Hb.decode(&f), 246.0);
        assert_eq!(MessageDataType::S8Hb.decode(&f), -10.0);
        assert_eq!(MessageDataType::U8Lb.decode(&f), 40.0);
        assert_eq!(MessageDataType::S8Lb.decode(&f), 40.0);
        assert_eq!(MessageDataType::U8Lb60.decode(&f), 2400.0);
        assert_eq!(MessageDataType::U8Hb60.decode(&f), 14760.0);
    }

    #[test]
    fn test_decode_words() {
        let f = frame(0xFF, 0x00);
        assert_eq!(MessageDataType::U16.decode(&f), 65280.0);
        assert_eq!(MessageDataType::S16.decode(&f), -256.0);
        assert_eq!(MessageDataType::F88.decode(&f), -1.0);
    }

    #[test]
    fn test_rejection_lists_all_tags() {
        let err = "u32".parse::<MessageDataType>().unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("unknown value 'u32'"));
        assert!(message.contains("'u8_lb_60'"));
        assert!(message.contains("'f88'"));
    }
}
