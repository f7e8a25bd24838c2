//! Protobuf-compatible wire primitives.
//!
//! Only the pieces the protocol messages need: varints, fixed32 floats,
//! length-delimited payloads, and skipping of fields we do not know.

use bytes::{Buf, BufMut};

const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl TryFrom<u64> for WireType {
    type Error = DecodeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::InvalidWireType(other as u8)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("varint longer than 10 bytes")]
    VarintOverflow,
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),
    #[error("field number 0 is reserved")]
    InvalidFieldNumber,
    #[error("field {field} has wire type {found:?}, expected {expected:?}")]
    WireTypeMismatch {
        field: u32,
        expected: WireType,
        found: WireType,
    },
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    #[error("group for field {0} is not terminated")]
    UnterminatedGroup(u32),
}

/// A message that can be written to and read from the wire.
///
/// Implementors only describe their own fields; framing of nested messages,
/// the decode loop and unknown-field skipping live here.
pub trait Message: Default + Sized {
    fn encode_raw(&self, buf: &mut impl BufMut);

    /// Merges one field into `self`. Unknown fields must be handed to
    /// [`skip_field`].
    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError>;

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_raw(&mut buf);
        buf
    }

    fn decode(mut buf: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        while buf.has_remaining() {
            let (field, wire_type) = decode_key(&mut buf)?;
            if wire_type == WireType::EndGroup {
                return Err(DecodeError::UnterminatedGroup(field));
            }
            message.merge_field(field, wire_type, &mut buf)?;
        }
        Ok(message)
    }
}

pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

pub fn decode_varint(buf: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(DecodeError::Truncated);
        }
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(DecodeError::VarintOverflow)
}

pub fn encode_key(field: u32, wire_type: WireType, buf: &mut impl BufMut) {
    encode_varint((u64::from(field) << 3) | wire_type as u64, buf);
}

pub fn decode_key(buf: &mut &[u8]) -> Result<(u32, WireType), DecodeError> {
    let key = decode_varint(buf)?;
    let wire_type = WireType::try_from(key & 0x7)?;
    let field = (key >> 3) as u32;
    if field == 0 {
        return Err(DecodeError::InvalidFieldNumber);
    }
    Ok((field, wire_type))
}

/// Skips the payload of a field whose key was already consumed.
pub fn skip_field(field: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<(), DecodeError> {
    match wire_type {
        WireType::Varint => {
            decode_varint(buf)?;
        }
        WireType::Fixed64 => advance(buf, 8)?,
        WireType::Fixed32 => advance(buf, 4)?,
        WireType::LengthDelimited => {
            let len = decode_len(buf)?;
            advance(buf, len)?;
        }
        WireType::StartGroup => loop {
            if !buf.has_remaining() {
                return Err(DecodeError::UnterminatedGroup(field));
            }
            let (inner, inner_type) = decode_key(buf)?;
            if inner_type == WireType::EndGroup {
                if inner != field {
                    return Err(DecodeError::UnterminatedGroup(field));
                }
                break;
            }
            skip_field(inner, inner_type, buf)?;
        },
        WireType::EndGroup => return Err(DecodeError::UnterminatedGroup(field)),
    }
    Ok(())
}

fn advance(buf: &mut &[u8], len: usize) -> Result<(), DecodeError> {
    if buf.remaining() < len {
        return Err(DecodeError::Truncated);
    }
    buf.advance(len);
    Ok(())
}

fn decode_len(buf: &mut &[u8]) -> Result<usize, DecodeError> {
    let len = decode_varint(buf)?;
    usize::try_from(len).map_err(|_| DecodeError::Truncated)
}

pub fn check_wire_type(
    field: u32,
    expected: WireType,
    found: WireType,
) -> Result<(), DecodeError> {
    if expected == found {
        Ok(())
    } else {
        Err(DecodeError::WireTypeMismatch {
            field,
            expected,
            found,
        })
    }
}

// Zero-valued scalars are omitted on encode; -0.0 compares equal to 0.0 and
// is omitted too.

pub fn put_float(field: u32, value: f32, buf: &mut impl BufMut) {
    if value != 0.0 {
        encode_key(field, WireType::Fixed32, buf);
        buf.put_f32_le(value);
    }
}

pub fn put_uint64(field: u32, value: u64, buf: &mut impl BufMut) {
    if value != 0 {
        put_uint64_always(field, value, buf);
    }
}

pub fn put_uint64_always(field: u32, value: u64, buf: &mut impl BufMut) {
    encode_key(field, WireType::Varint, buf);
    encode_varint(value, buf);
}

pub fn put_string(field: u32, value: &str, buf: &mut impl BufMut) {
    if !value.is_empty() {
        put_bytes(field, value.as_bytes(), buf);
    }
}

pub fn put_message<M: Message>(field: u32, message: &M, buf: &mut impl BufMut) {
    put_bytes(field, &message.encode_to_vec(), buf);
}

fn put_bytes(field: u32, bytes: &[u8], buf: &mut impl BufMut) {
    encode_key(field, WireType::LengthDelimited, buf);
    encode_varint(bytes.len() as u64, buf);
    buf.put_slice(bytes);
}

pub fn read_float(field: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<f32, DecodeError> {
    check_wire_type(field, WireType::Fixed32, wire_type)?;
    if buf.remaining() < 4 {
        return Err(DecodeError::Truncated);
    }
    Ok(buf.get_f32_le())
}

pub fn read_uint64(field: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<u64, DecodeError> {
    check_wire_type(field, WireType::Varint, wire_type)?;
    decode_varint(buf)
}

/// Splits off the payload of a length-delimited field.
pub fn read_bytes<'a>(
    field: u32,
    wire_type: WireType,
    buf: &mut &'a [u8],
) -> Result<&'a [u8], DecodeError> {
    check_wire_type(field, WireType::LengthDelimited, wire_type)?;
    let len = decode_len(buf)?;
    if buf.len() < len {
        return Err(DecodeError::Truncated);
    }
    let (payload, rest) = buf.split_at(len);
    *buf = rest;
    Ok(payload)
}

pub fn read_string(field: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<String, DecodeError> {
    let payload = read_bytes(field, wire_type, buf)?;
    String::from_utf8(payload.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
}

pub fn read_message<M: Message>(
    field: u32,
    wire_type: WireType,
    buf: &mut &[u8],
) -> Result<M, DecodeError> {
    let payload = read_bytes(field, wire_type, buf)?;
    M::decode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_encoding() {
        let mut buf = Vec::new();
        encode_varint(300, &mut buf);
        assert_eq!(buf, [0xac, 0x02]);

        let mut slice = buf.as_slice();
        assert_eq!(decode_varint(&mut slice).unwrap(), 300);
        assert!(slice.is_empty());
    }

    #[test]
    fn varint_max_value() {
        let mut buf = Vec::new();
        encode_varint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), MAX_VARINT_LEN);
        assert_eq!(decode_varint(&mut buf.as_slice()).unwrap(), u64::MAX);
    }

    #[test]
    fn varint_overflow_and_truncation() {
        let overlong = [0xffu8; 11];
        assert_eq!(
            decode_varint(&mut &overlong[..]),
            Err(DecodeError::VarintOverflow)
        );
        assert_eq!(decode_varint(&mut &[0x80u8][..]), Err(DecodeError::Truncated));
    }

    #[test]
    fn key_rejects_reserved_field_and_bad_wire_type() {
        assert_eq!(
            decode_key(&mut &[0x02u8][..]),
            Err(DecodeError::InvalidFieldNumber)
        );
        assert_eq!(
            decode_key(&mut &[0x0eu8][..]),
            Err(DecodeError::InvalidWireType(6))
        );
    }

    #[test]
    fn skips_every_wire_type() {
        let mut buf = Vec::new();
        encode_key(9, WireType::Varint, &mut buf);
        encode_varint(150, &mut buf);
        encode_key(10, WireType::Fixed64, &mut buf);
        buf.put_u64_le(7);
        encode_key(11, WireType::LengthDelimited, &mut buf);
        encode_varint(3, &mut buf);
        buf.put_slice(b"abc");
        encode_key(12, WireType::StartGroup, &mut buf);
        encode_key(1, WireType::Fixed32, &mut buf);
        buf.put_f32_le(1.5);
        encode_key(12, WireType::EndGroup, &mut buf);
        encode_key(13, WireType::Fixed32, &mut buf);
        buf.put_f32_le(2.5);

        let mut slice = buf.as_slice();
        while !slice.is_empty() {
            let (field, wire_type) = decode_key(&mut slice).unwrap();
            skip_field(field, wire_type, &mut slice).unwrap();
        }
    }

    #[test]
    fn skip_reports_truncated_payload() {
        let mut buf = Vec::new();
        encode_varint(5, &mut buf);
        buf.put_slice(b"ab");
        assert_eq!(
            skip_field(1, WireType::LengthDelimited, &mut buf.as_slice()),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn zero_scalars_are_omitted() {
        let mut buf = Vec::new();
        put_float(1, 0.0, &mut buf);
        put_float(2, -0.0, &mut buf);
        put_uint64(3, 0, &mut buf);
        put_string(4, "", &mut buf);
        assert!(buf.is_empty());

        put_uint64_always(5, 0, &mut buf);
        assert_eq!(buf, [0x28, 0x00]);
    }
}
