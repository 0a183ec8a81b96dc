//! Binary wire codec (FastRPC).
//!
//! # Message layout
//! ```text
//! +-----------+-------+-------+---------------------------------------+
//! | magic     | major | minor | message                               |
//! | 0xCA 0x11 | 1 byte| 1 byte| METHOD_CALL | METHOD_RESPONSE | FAULT |
//! +-----------+-------+-------+---------------------------------------+
//! ```
//!
//! Every value starts with a type byte: the upper five bits select the type,
//! the lower three carry type-specific info (usually `octets - 1` of the
//! length or magnitude that follows, little-endian).
//!
//! # Design Decisions
//! - The gateway talks to the codec only through [`WireCodec`]
//! - Codec instances hold no per-call state and are shared across calls
//! - Decoding never panics on malformed input; every failure is a [`CodecError`]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod types;

use bytes::Bytes;

use crate::bridge::Value;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::CodecError;

/// Media type of FastRPC payloads.
pub const FRPC_MEDIA_TYPE: &str = "application/x-frpc";

/// One outbound call: the method name comes from endpoint configuration,
/// never from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    pub method_name: String,
    pub params: Vec<Value>,
}

impl CallDescriptor {
    pub fn new(method_name: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method_name: method_name.into(),
            params,
        }
    }
}

/// Encode/decode contract the gateway relies on.
pub trait WireCodec: Send + Sync + std::fmt::Debug {
    /// Media type sent as `Content-Type`/`Accept` and required on responses.
    fn media_type(&self) -> &'static str;

    /// Encode a call into the binary request body.
    fn encode_call(&self, call: &CallDescriptor) -> Result<Bytes, CodecError>;

    /// Decode a binary response body into its result value.
    fn decode_response(&self, payload: &[u8]) -> Result<Value, CodecError>;
}

/// FastRPC 2.1 codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrpcCodec;

impl FrpcCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode a method call, as an upstream server would.
    pub fn decode_call(&self, payload: &[u8]) -> Result<CallDescriptor, CodecError> {
        Decoder::new(payload).read_call()
    }

    /// Encode a successful method response.
    pub fn encode_response(&self, value: &Value) -> Result<Bytes, CodecError> {
        let mut encoder = Encoder::new();
        encoder.write_response(value)?;
        Ok(encoder.finish())
    }

    /// Encode a fault response.
    pub fn encode_fault(&self, code: i64, message: &str) -> Bytes {
        let mut encoder = Encoder::new();
        encoder.write_fault(code, message);
        encoder.finish()
    }
}

impl WireCodec for FrpcCodec {
    fn media_type(&self) -> &'static str {
        FRPC_MEDIA_TYPE
    }

    fn encode_call(&self, call: &CallDescriptor) -> Result<Bytes, CodecError> {
        let mut encoder = Encoder::new();
        encoder.write_call(&call.method_name, &call.params)?;
        Ok(encoder.finish())
    }

    fn decode_response(&self, payload: &[u8]) -> Result<Value, CodecError> {
        Decoder::new(payload).read_response()
    }
}
