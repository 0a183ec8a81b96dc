//! FastRPC message decoder.
//!
//! Reads from a borrowed slice and reports the byte offset of every failure.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::bridge::Value;
use crate::codec::error::CodecError;
use crate::codec::types::*;
use crate::codec::CallDescriptor;

/// Deepest array/struct nesting accepted from the wire.
pub const MAX_DEPTH: usize = 256;

pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Decode a complete method response message.
    pub fn read_response(mut self) -> Result<Value, CodecError> {
        self.read_header()?;
        let (type_id, _) = split_type_byte(self.read_u8()?);
        match type_id {
            METHOD_RESPONSE => {
                let value = self.read_value(0)?;
                self.expect_end()?;
                Ok(value)
            }
            FAULT => {
                let code = match self.read_value(0)? {
                    Value::Integer(code) => code,
                    _ => return Err(CodecError::InvalidFault),
                };
                let message = match self.read_value(0)? {
                    Value::String(message) => message,
                    _ => return Err(CodecError::InvalidFault),
                };
                Err(CodecError::Fault { code, message })
            }
            tag => Err(CodecError::UnexpectedMessage {
                expected: "method response",
                tag,
            }),
        }
    }

    /// Decode a complete method call message.
    pub fn read_call(mut self) -> Result<CallDescriptor, CodecError> {
        self.read_header()?;
        let (type_id, _) = split_type_byte(self.read_u8()?);
        if type_id != METHOD_CALL {
            return Err(CodecError::UnexpectedMessage {
                expected: "method call",
                tag: type_id,
            });
        }
        let method_name = self.read_name()?;
        let mut params = Vec::new();
        while self.pos < self.input.len() {
            params.push(self.read_value(0)?);
        }
        Ok(CallDescriptor {
            method_name,
            params,
        })
    }

    fn read_header(&mut self) -> Result<(), CodecError> {
        let prefix = &self.input[..self.input.len().min(MAGIC.len())];
        if prefix != &MAGIC[..prefix.len()] {
            return Err(CodecError::InvalidMagic(prefix.to_vec()));
        }
        let header = self.take(HEADER_SIZE)?;
        let (major, minor) = (header[2], header[3]);
        if !(1..=2).contains(&major) {
            return Err(CodecError::UnsupportedVersion { major, minor });
        }
        Ok(())
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::TooDeep(MAX_DEPTH));
        }
        let offset = self.pos;
        let (type_id, info) = split_type_byte(self.read_u8()?);
        let octets = info as usize + 1;

        match type_id {
            NULL => Ok(Value::Null),
            BOOL => Ok(Value::Bool(info & 0x01 != 0)),
            INT => {
                let raw = self.read_uint(octets)?;
                let shift = 64 - 8 * octets as u32;
                Ok(Value::Integer(((raw << shift) as i64) >> shift))
            }
            INT8P => {
                let raw = self.read_uint(octets)?;
                i64::try_from(raw)
                    .map(Value::Integer)
                    .map_err(|_| CodecError::IntegerOverflow(offset))
            }
            INT8N => {
                let raw = self.read_uint(octets)?;
                i64::try_from(-(raw as i128))
                    .map(Value::Integer)
                    .map_err(|_| CodecError::IntegerOverflow(offset))
            }
            DOUBLE => {
                let bytes = self.take(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Ok(Value::Double(f64::from_le_bytes(raw)))
            }
            STRING => {
                let len = self.read_len(octets)?;
                let bytes = self.take(len)?;
                let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8(offset))?;
                Ok(Value::String(text.to_owned()))
            }
            BINARY => {
                let len = self.read_len(octets)?;
                Ok(Value::Binary(self.take(len)?.to_vec()))
            }
            DATETIME => self.read_datetime(offset).map(Value::Timestamp),
            ARRAY => {
                let count = self.read_len(octets)?;
                // every element takes at least one byte
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            STRUCT => {
                let count = self.read_len(octets)?;
                let mut members = BTreeMap::new();
                for _ in 0..count {
                    let name = self.read_name()?;
                    let value = self.read_value(depth + 1)?;
                    members.insert(name, value);
                }
                Ok(Value::Struct(members))
            }
            tag => Err(CodecError::UnknownType { tag, offset }),
        }
    }

    fn read_datetime(&mut self, offset: usize) -> Result<DateTime<Utc>, CodecError> {
        let body = self.take(DATETIME_BODY_SIZE)?;
        let zone = body[0] as i8;
        let unix = i32::from_le_bytes([body[1], body[2], body[3], body[4]]);
        let d = &body[5..];

        if unix != -1 {
            return DateTime::from_timestamp(unix as i64, 0)
                .ok_or(CodecError::InvalidDateTime(offset));
        }

        // Out of 32-bit range: rebuild from the packed zone-local fields.
        let second = (d[0] >> 3) as u32 | ((d[1] as u32 & 0x01) << 5);
        let minute = (d[1] as u32 >> 1) & 0x3f;
        let hour = (d[1] as u32 >> 7) | ((d[2] as u32 & 0x0f) << 1);
        let day = (d[2] as u32 >> 4) | ((d[3] as u32 & 0x01) << 4);
        let month = (d[3] as u32 >> 1) & 0x0f;
        let year = ((d[3] as u32 >> 5) | ((d[4] as u32) << 3)) as i32 + DATETIME_YEAR_BASE;

        let local = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or(CodecError::InvalidDateTime(offset))?;
        Ok((local - Duration::minutes(zone as i64 * 15)).and_utc())
    }

    fn read_name(&mut self) -> Result<String, CodecError> {
        let offset = self.pos;
        let len = self.read_u8()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8(offset))
    }

    fn read_len(&mut self, octets: usize) -> Result<usize, CodecError> {
        let offset = self.pos;
        let raw = self.read_uint(octets)?;
        usize::try_from(raw).map_err(|_| CodecError::IntegerOverflow(offset))
    }

    fn read_uint(&mut self, octets: usize) -> Result<u64, CodecError> {
        let bytes = self.take(octets)?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, byte| (acc << 8) | *byte as u64))
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn expect_end(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}
