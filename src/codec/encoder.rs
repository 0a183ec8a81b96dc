//! FastRPC message encoder.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::bridge::Value;
use crate::codec::error::CodecError;
use crate::codec::types::*;

/// Writes one message into an owned buffer.
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Creates an encoder with the protocol header already written.
    pub fn new() -> Self {
        let mut buf = BytesMut::with_capacity(256);
        buf.put_slice(&MAGIC);
        buf.put_u8(VERSION_MAJOR);
        buf.put_u8(VERSION_MINOR);
        Self { buf }
    }

    pub fn write_call(&mut self, method_name: &str, params: &[Value]) -> Result<(), CodecError> {
        self.buf.put_u8(type_byte(METHOD_CALL, 0));
        self.write_name(method_name)?;
        for param in params {
            self.write_value(param)?;
        }
        Ok(())
    }

    pub fn write_response(&mut self, value: &Value) -> Result<(), CodecError> {
        self.buf.put_u8(type_byte(METHOD_RESPONSE, 0));
        self.write_value(value)
    }

    pub fn write_fault(&mut self, code: i64, message: &str) {
        self.buf.put_u8(type_byte(FAULT, 0));
        self.write_integer(code);
        self.write_sized(STRING, message.as_bytes());
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    fn write_value(&mut self, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Null => self.buf.put_u8(type_byte(NULL, 0)),
            Value::Bool(b) => self.buf.put_u8(type_byte(BOOL, u8::from(*b))),
            Value::Integer(i) => self.write_integer(*i),
            Value::Double(d) => {
                self.buf.put_u8(type_byte(DOUBLE, 0));
                self.buf.put_f64_le(*d);
            }
            Value::String(s) => self.write_sized(STRING, s.as_bytes()),
            Value::Timestamp(ts) => self.write_datetime(ts)?,
            Value::Binary(bytes) => self.write_sized(BINARY, bytes),
            Value::Array(items) => {
                self.write_counted(ARRAY, items.len() as u64);
                for item in items {
                    self.write_value(item)?;
                }
            }
            Value::Struct(members) => {
                self.write_counted(STRUCT, members.len() as u64);
                for (name, member) in members {
                    self.write_name(name)?;
                    self.write_value(member)?;
                }
            }
        }
        Ok(())
    }

    fn write_integer(&mut self, value: i64) {
        let (type_id, magnitude) = if value < 0 {
            (INT8N, value.unsigned_abs())
        } else {
            (INT8P, value as u64)
        };
        self.write_counted(type_id, magnitude);
    }

    /// Type byte with `octets - 1` info, then `value` in that many octets.
    fn write_counted(&mut self, type_id: u8, value: u64) {
        let octets = octets_for(value);
        self.buf.put_u8(type_byte(type_id, (octets - 1) as u8));
        self.buf.put_uint_le(value, octets);
    }

    fn write_sized(&mut self, type_id: u8, data: &[u8]) {
        self.write_counted(type_id, data.len() as u64);
        self.buf.put_slice(data);
    }

    fn write_name(&mut self, name: &str) -> Result<(), CodecError> {
        if name.len() > MAX_NAME_LEN {
            return Err(CodecError::NameTooLong(name.len()));
        }
        self.buf.put_u8(name.len() as u8);
        self.buf.put_slice(name.as_bytes());
        Ok(())
    }

    /// Always written in UTC (zone 0).
    fn write_datetime(&mut self, ts: &DateTime<Utc>) -> Result<(), CodecError> {
        if !(DATETIME_YEAR_BASE..=DATETIME_YEAR_MAX).contains(&ts.year()) {
            return Err(CodecError::DateOutOfRange(ts.year()));
        }
        self.buf.put_u8(type_byte(DATETIME, 0));
        self.buf.put_i8(0);
        self.buf.put_i32_le(i32::try_from(ts.timestamp()).unwrap_or(-1));

        let year = (ts.year() - DATETIME_YEAR_BASE) as u32;
        let month = ts.month();
        let day = ts.day();
        let hour = ts.hour();
        let minute = ts.minute();
        let second = ts.second();
        let weekday = ts.weekday().num_days_from_sunday();

        self.buf.put_u8(((weekday & 0x07) | ((second & 0x1f) << 3)) as u8);
        self.buf
            .put_u8((((second & 0x20) >> 5) | ((minute & 0x3f) << 1) | ((hour & 0x01) << 7)) as u8);
        self.buf.put_u8((((hour & 0x1e) >> 1) | ((day & 0x0f) << 4)) as u8);
        self.buf
            .put_u8((((day & 0x1f) >> 4) | ((month & 0x0f) << 1) | ((year & 0x07) << 5)) as u8);
        self.buf.put_u8(((year & 0x07f8) >> 3) as u8);
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
