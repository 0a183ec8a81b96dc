//! FastRPC type tags and header constants.

/// Magic bytes opening every message.
pub const MAGIC: [u8; 2] = [0xCA, 0x11];

/// Version written by the encoder.
pub const VERSION_MAJOR: u8 = 2;
pub const VERSION_MINOR: u8 = 1;

/// Size of magic plus version.
pub const HEADER_SIZE: usize = 4;

pub const INT: u8 = 1;
pub const BOOL: u8 = 2;
pub const DOUBLE: u8 = 3;
pub const STRING: u8 = 4;
pub const DATETIME: u8 = 5;
pub const BINARY: u8 = 6;
pub const INT8P: u8 = 7;
pub const INT8N: u8 = 8;
pub const STRUCT: u8 = 10;
pub const ARRAY: u8 = 11;
pub const NULL: u8 = 12;
pub const METHOD_CALL: u8 = 13;
pub const METHOD_RESPONSE: u8 = 14;
pub const FAULT: u8 = 15;

/// Longest method name or struct member name (single length byte).
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Packed body of a DATETIME after the type byte: zone, timestamp, fields.
pub const DATETIME_BODY_SIZE: usize = 1 + 4 + 5;

/// Year offset of the packed DATETIME year field.
pub const DATETIME_YEAR_BASE: i32 = 1600;
/// Last year the 11-bit packed field can hold.
pub const DATETIME_YEAR_MAX: i32 = DATETIME_YEAR_BASE + 0x7ff;

pub fn type_byte(type_id: u8, info: u8) -> u8 {
    (type_id << 3) | (info & 0x07)
}

pub fn split_type_byte(byte: u8) -> (u8, u8) {
    (byte >> 3, byte & 0x07)
}

/// Number of little-endian octets needed to hold `value` (at least one).
pub fn octets_for(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octets_for() {
        assert_eq!(octets_for(0), 1);
        assert_eq!(octets_for(255), 1);
        assert_eq!(octets_for(256), 2);
        assert_eq!(octets_for(u32::MAX as u64), 4);
        assert_eq!(octets_for(u64::MAX), 8);
    }

    #[test]
    fn test_type_byte() {
        assert_eq!(type_byte(METHOD_CALL, 0), 0x68);
        assert_eq!(type_byte(NULL, 0), 0x60);
        assert_eq!(split_type_byte(0x21), (STRING, 1));
    }
}
