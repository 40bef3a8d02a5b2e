// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Packet framing and CBOR helpers.
//!
//! Packet layout:
//!
//! ``MAGIC(4) || VERSION(2) || FLAGS(2) || LENGTH(4) || PAYLOAD || CHECKSUM(32)``
//!
//! * PAYLOAD is a CBOR `OpEnvelope`
//! * CHECKSUM = blake3-256 over HEADER (first 12 bytes) || PAYLOAD

use blake3::Hasher;
use ciborium::value::Value;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{Message, OpEnvelope};

/// Protocol magic constant "SEEK".
pub const MAGIC: [u8; 4] = [0x53, 0x45, 0x45, 0x4b];
/// Wire protocol version (big-endian u16).
pub const VERSION: u16 = 0x0001;
/// Reserved flags (set to zero for v1).
pub const FLAGS: u16 = 0x0000;
/// Header length in bytes.
pub const HEADER_BYTES: usize = 12;
/// Trailing checksum length in bytes.
pub const CHECKSUM_BYTES: usize = 32;
/// Largest payload a peer may announce.
pub const MAX_PAYLOAD: usize = 8 * 1024 * 1024;

/// Framing or CBOR failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    /// Fewer bytes than the header announces.
    #[error("incomplete packet")]
    Incomplete,
    /// First four bytes are not [`MAGIC`].
    #[error("bad magic")]
    BadMagic,
    /// Header carries a version this build does not speak.
    #[error("unsupported version {0:#06x}")]
    UnsupportedVersion(u16),
    /// Announced payload exceeds [`MAX_PAYLOAD`].
    #[error("payload too large: {0} bytes")]
    TooLarge(usize),
    /// Checksum does not match header and payload.
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// Envelope carries an op this build does not know.
    #[error("unknown op {0}")]
    UnknownOp(String),
    /// CBOR serialization failed.
    #[error("encode error: {0}")]
    Encode(String),
    /// CBOR deserialization failed.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Encode to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).map_err(|e| WireError::Encode(e.to_string()))?;
    Ok(out)
}

/// Decode from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    ciborium::de::from_reader(bytes).map_err(|e| WireError::Decode(e.to_string()))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, WireError> {
    Value::serialized(value).map_err(|e| WireError::Encode(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, WireError> {
    value
        .deserialized()
        .map_err(|e| WireError::Decode(e.to_string()))
}

/// Total packet length announced by `header`.
pub fn packet_len(header: &[u8; HEADER_BYTES]) -> Result<usize, WireError> {
    if header[0..4] != MAGIC {
        return Err(WireError::BadMagic);
    }
    let len = u32::from_be_bytes([header[8], header[9], header[10], header[11]]) as usize;
    if len > MAX_PAYLOAD {
        return Err(WireError::TooLarge(len));
    }
    Ok(HEADER_BYTES + len + CHECKSUM_BYTES)
}

/// A full packet (header + payload + checksum).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw header (12 bytes).
    pub header: [u8; HEADER_BYTES],
    /// CBOR payload bytes.
    pub payload: Vec<u8>,
    /// blake3 checksum over header||payload.
    pub checksum: [u8; CHECKSUM_BYTES],
}

impl Packet {
    /// Build a packet from a CBOR payload.
    pub fn from_payload(payload: Vec<u8>) -> Result<Self, WireError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(WireError::TooLarge(payload.len()));
        }
        let mut header = [0u8; HEADER_BYTES];
        header[0..4].copy_from_slice(&MAGIC);
        header[4..6].copy_from_slice(&VERSION.to_be_bytes());
        header[6..8].copy_from_slice(&FLAGS.to_be_bytes());
        #[allow(clippy::cast_possible_truncation)]
        header[8..12].copy_from_slice(&(payload.len() as u32).to_be_bytes());

        let mut hasher = Hasher::new();
        hasher.update(&header);
        hasher.update(&payload);
        let checksum = *hasher.finalize().as_bytes();

        Ok(Packet {
            header,
            payload,
            checksum,
        })
    }

    /// Encode an `OpEnvelope` into a full packet byte vector.
    pub fn encode_envelope<P: Serialize>(env: &OpEnvelope<P>) -> Result<Vec<u8>, WireError> {
        let packet = Packet::from_payload(to_cbor(env)?)?;
        let mut out = Vec::with_capacity(HEADER_BYTES + packet.payload.len() + CHECKSUM_BYTES);
        out.extend_from_slice(&packet.header);
        out.extend_from_slice(&packet.payload);
        out.extend_from_slice(&packet.checksum);
        Ok(out)
    }

    /// Decode a packet from a byte slice, returning the envelope and bytes consumed.
    pub fn decode_envelope<P: DeserializeOwned>(
        bytes: &[u8],
    ) -> Result<(OpEnvelope<P>, usize), WireError> {
        let header: &[u8; HEADER_BYTES] = bytes
            .get(..HEADER_BYTES)
            .and_then(|h| h.try_into().ok())
            .ok_or(WireError::Incomplete)?;
        let total = packet_len(header)?;
        let version = u16::from_be_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }
        if bytes.len() < total {
            return Err(WireError::Incomplete);
        }
        let payload = &bytes[HEADER_BYTES..total - CHECKSUM_BYTES];
        let checksum = &bytes[total - CHECKSUM_BYTES..total];

        let mut hasher = Hasher::new();
        hasher.update(header);
        hasher.update(payload);
        if hasher.finalize().as_bytes() != checksum {
            return Err(WireError::ChecksumMismatch);
        }

        let env: OpEnvelope<P> = from_cbor(payload)?;
        Ok((env, total))
    }
}

/// Encode a `Message` into a packet with the provided sequence number.
pub fn encode_message(msg: &Message, ts: u64) -> Result<Vec<u8>, WireError> {
    let payload = match msg {
        Message::QueryState(p) | Message::SubscribeState(p) => to_value(p)?,
        Message::State(p) | Message::StateStream(p) => to_value(p)?,
        Message::Signin(p) => to_value(p)?,
        Message::SigninAck(p) => to_value(p)?,
        Message::Dispatch(p) => to_value(p)?,
        Message::DispatchAck(p) => to_value(p)?,
        Message::Error(p) => to_value(p)?,
    };
    let env = OpEnvelope {
        op: msg.op_name().to_string(),
        ts,
        payload,
    };
    Packet::encode_envelope(&env)
}

/// Decode bytes into (Message, ts, bytes_consumed).
pub fn decode_message(bytes: &[u8]) -> Result<(Message, u64, usize), WireError> {
    let (env, used) = Packet::decode_envelope::<Value>(bytes)?;
    let ts = env.ts;
    let msg = match env.op.as_str() {
        "query_state" => Message::QueryState(from_value(env.payload)?),
        "state" => Message::State(from_value(env.payload)?),
        "subscribe_state" => Message::SubscribeState(from_value(env.payload)?),
        "state_stream" => Message::StateStream(from_value(env.payload)?),
        "signin" => Message::Signin(from_value(env.payload)?),
        "signin_ack" => Message::SigninAck(from_value(env.payload)?),
        "dispatch" => Message::Dispatch(from_value(env.payload)?),
        "dispatch_ack" => Message::DispatchAck(from_value(env.payload)?),
        "error" => Message::Error(from_value(env.payload)?),
        other => return Err(WireError::UnknownOp(other.to_string())),
    };
    Ok((msg, ts, used))
}

// --- Unit tests -----------------------------------------------------------
