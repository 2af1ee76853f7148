//! Vendor payload decoding.
//!
//! The vendor frame lives in the manufacturer-specific data field of an
//! advertisement, under company identifier `0xFFFF`:
//!
//! ```text
//! offset  0      1      2      3
//!       +------+------+------+------+
//!       | 0xAB | red  | green| blue |
//!       +------+------+------+------+
//! ```
//!
//! Trailing bytes after the blue channel are ignored. Decoding never panics;
//! every rejection is a [`DecodeFailure`] value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DecodedColor;

/// Company identifier the vendor frame is registered under.
pub const VENDOR_ID: u16 = 0xFFFF;

/// First byte of every vendor frame.
pub const MAGIC_BYTE: u8 = 0xAB;

/// Length of a complete vendor frame.
pub const PAYLOAD_LEN: usize = 4;

/// Why a payload was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailure {
    #[error("manufacturer id does not match the vendor id")]
    WrongVendorId,

    #[error("payload shorter than 4 bytes")]
    TooShort,

    #[error("payload does not start with the magic byte")]
    BadMagicByte,
}

/// Outcome of decoding one payload.
pub type DecodeOutcome = Result<DecodedColor, DecodeFailure>;

/// Decode a payload with the registered vendor id and magic byte.
pub fn decode(manufacturer_id: u16, payload: &[u8]) -> DecodeOutcome {
    PayloadDecoder::default().decode(manufacturer_id, payload)
}

/// Encode a color into the 4-byte vendor frame.
pub fn encode(color: DecodedColor) -> [u8; PAYLOAD_LEN] {
    PayloadDecoder::default().encode(color)
}

/// Stateless payload decoder parameterized by vendor id and magic byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadDecoder {
    vendor_id: u16,
    magic_byte: u8,
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self { vendor_id: VENDOR_ID, magic_byte: MAGIC_BYTE }
    }
}

impl PayloadDecoder {
    pub fn new(vendor_id: u16, magic_byte: u8) -> Self {
        Self { vendor_id, magic_byte }
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn magic_byte(&self) -> u8 {
        self.magic_byte
    }

    /// Validate and decode a manufacturer payload.
    ///
    /// Checks run in a fixed order: vendor id, length, magic byte.
    pub fn decode(&self, manufacturer_id: u16, payload: &[u8]) -> DecodeOutcome {
        if manufacturer_id != self.vendor_id {
            return Err(DecodeFailure::WrongVendorId);
        }

        let &[magic, red, green, blue, ..] = payload else {
            return Err(DecodeFailure::TooShort);
        };

        if magic != self.magic_byte {
            return Err(DecodeFailure::BadMagicByte);
        }

        Ok(DecodedColor { red, green, blue })
    }

    /// Build the vendor frame for a color.
    pub fn encode(&self, color: DecodedColor) -> [u8; PAYLOAD_LEN] {
        [self.magic_byte, color.red, color.green, color.blue]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_reference_payload() {
        assert_eq!(decode(0xFFFF, &[0xAB, 10, 20, 30]), Ok(DecodedColor::new(10, 20, 30)));
    }

    #[test]
    fn ignores_trailing_bytes() {
        assert_eq!(decode(VENDOR_ID, &[0xAB, 1, 2, 3, 0xEE, 0xFF]), Ok(DecodedColor::new(1, 2, 3)));
    }

    #[test]
    fn rejects_foreign_vendor_before_inspecting_payload() {
        assert_eq!(decode(0x004C, &[0xAB, 10, 20, 30]), Err(DecodeFailure::WrongVendorId));
        assert_eq!(decode(0x004C, &[]), Err(DecodeFailure::WrongVendorId));
    }

    #[test]
    fn short_payloads_are_too_short_even_with_bad_magic() {
        assert_eq!(decode(VENDOR_ID, &[]), Err(DecodeFailure::TooShort));
        assert_eq!(decode(VENDOR_ID, &[0x00, 1]), Err(DecodeFailure::TooShort));
        assert_eq!(decode(VENDOR_ID, &[0xAB, 1, 2]), Err(DecodeFailure::TooShort));
    }

    #[test]
    fn custom_decoder_uses_its_own_constants() {
        let decoder = PayloadDecoder::new(0x0059, 0x42);
        assert_eq!(decoder.decode(0x0059, &[0x42, 9, 8, 7]), Ok(DecodedColor::new(9, 8, 7)));
        assert_eq!(decoder.decode(0xFFFF, &[0x42, 9, 8, 7]), Err(DecodeFailure::WrongVendorId));
        assert_eq!(decoder.decode(0x0059, &[0xAB, 9, 8, 7]), Err(DecodeFailure::BadMagicByte));
    }

    #[test]
    fn encode_produces_wire_layout() {
        assert_eq!(encode(DecodedColor::new(0x10, 0x20, 0x30)), [0xAB, 0x10, 0x20, 0x30]);
    }

    proptest! {
        #[test]
        fn any_payload_under_four_bytes_is_too_short(payload in prop::collection::vec(any::<u8>(), 0..PAYLOAD_LEN)) {
            prop_assert_eq!(decode(VENDOR_ID, &payload), Err(DecodeFailure::TooShort));
        }

        #[test]
        fn wrong_magic_is_rejected_at_any_length(
            magic in any::<u8>().prop_filter("not the magic byte", |b| *b != MAGIC_BYTE),
            rest in prop::collection::vec(any::<u8>(), 3..32)
        ) {
            let mut payload = vec![magic];
            payload.extend(rest);
            prop_assert_eq!(decode(VENDOR_ID, &payload), Err(DecodeFailure::BadMagicByte));
        }

        #[test]
        fn foreign_vendor_ids_never_decode(
            vendor in any::<u16>().prop_filter("not the vendor id", |v| *v != VENDOR_ID),
            payload in prop::collection::vec(any::<u8>(), 0..16)
        ) {
            prop_assert_eq!(decode(vendor, &payload), Err(DecodeFailure::WrongVendorId));
        }

        #[test]
        fn decoding_is_deterministic(vendor in any::<u16>(), payload in prop::collection::vec(any::<u8>(), 0..16)) {
            prop_assert_eq!(decode(vendor, &payload), decode(vendor, &payload));
        }

        #[test]
        fn valid_frames_carry_their_channels(red in any::<u8>(), green in any::<u8>(), blue in any::<u8>()) {
            let color = DecodedColor::new(red, green, blue);
            prop_assert_eq!(decode(VENDOR_ID, &encode(color)), Ok(color));
        }
    }
}
