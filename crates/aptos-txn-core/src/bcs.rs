//! Canonical binary serialization.
//!
//! The wire format used by every on-chain structure: little-endian
//! fixed-width integers, uleb128 length and variant prefixes, strict
//! booleans, presence-byte options, no padding or alignment. Encoding is
//! infallible and deterministic; decoding rejects every non-canonical form,
//! so `encode(decode(bytes)) == bytes` for all accepted inputs.

use crate::error::BcsError;

/// Largest value accepted for a uleb128 length or variant prefix.
pub const MAX_SEQUENCE_LENGTH: u32 = u32::MAX;

/// Encodes a value to its canonical byte representation.
pub fn to_bytes<T: BcsSerialize + ?Sized>(value: &T) -> Vec<u8> {
    let mut serializer = Serializer::new();
    value.serialize(&mut serializer);
    serializer.into_bytes()
}

/// Decodes a value from its canonical byte representation.
///
/// # Errors
///
/// Fails on truncated input, non-canonical encodings, unknown variant
/// indices, and trailing bytes after the decoded value.
pub fn from_bytes<T: BcsDeserialize>(bytes: &[u8]) -> Result<T, BcsError> {
    let mut deserializer = Deserializer::new(bytes);
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// A type that can be written to the canonical wire format.
pub trait BcsSerialize {
    /// Appends this value's canonical encoding to the serializer.
    fn serialize(&self, serializer: &mut Serializer);
}

/// A type that can be read back from the canonical wire format.
pub trait BcsDeserialize: Sized {
    /// Reads one value from the deserializer's current position.
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError>;
}

/// An append-only encoder over a growable byte buffer.
#[derive(Debug, Default)]
pub struct Serializer {
    buffer: Vec<u8>,
}

impl Serializer {
    /// Creates an empty serializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the serializer, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Writes a bool as a single strict byte (0x00 or 0x01).
    pub fn serialize_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Writes a u8.
    pub fn serialize_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a u16 little-endian.
    pub fn serialize_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32 little-endian.
    pub fn serialize_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u64 little-endian.
    pub fn serialize_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u128 little-endian.
    pub fn serialize_u128(&mut self, value: u128) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes raw bytes with no length prefix (fixed-size fields).
    pub fn serialize_fixed_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a uleb128 length prefix followed by the bytes.
    pub fn serialize_bytes(&mut self, bytes: &[u8]) {
        self.serialize_uleb128(bytes.len() as u32);
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a string as length-prefixed UTF-8 bytes.
    pub fn serialize_str(&mut self, value: &str) {
        self.serialize_bytes(value.as_bytes());
    }

    /// Writes an option presence byte. The caller serializes the payload
    /// after a `true` tag.
    pub fn serialize_option_tag(&mut self, present: bool) {
        self.serialize_bool(present);
    }

    /// Writes an enum variant index as uleb128.
    pub fn serialize_variant_index(&mut self, index: u32) {
        self.serialize_uleb128(index);
    }

    /// Writes an unsigned integer in minimal uleb128 form.
    pub fn serialize_uleb128(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }
}

/// A cursor-based decoder over a byte slice.
///
/// Tracks its offset so every error can report where decoding failed.
#[derive(Debug)]
pub struct Deserializer<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Deserializer<'a> {
    /// Creates a deserializer over the given input.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.position
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Asserts that the input is fully consumed.
    pub fn end(&self) -> Result<(), BcsError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(BcsError::RemainingInput(n)),
        }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], BcsError> {
        if self.remaining() < count {
            return Err(BcsError::TruncatedInput {
                offset: self.position,
                needed: count - self.remaining(),
            });
        }
        let bytes = &self.input[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Reads a strict boolean byte.
    pub fn deserialize_bool(&mut self) -> Result<bool, BcsError> {
        match self.deserialize_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BcsError::InvalidBoolByte(other)),
        }
    }

    /// Reads a u8.
    pub fn deserialize_u8(&mut self) -> Result<u8, BcsError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a u16 little-endian.
    pub fn deserialize_u16(&mut self) -> Result<u16, BcsError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a u32 little-endian.
    pub fn deserialize_u32(&mut self) -> Result<u32, BcsError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a u64 little-endian.
    pub fn deserialize_u64(&mut self) -> Result<u64, BcsError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a u128 little-endian.
    pub fn deserialize_u128(&mut self) -> Result<u128, BcsError> {
        let bytes = self.take(16)?;
        let mut buf = [0u8; 16];
        buf.copy_from_slice(bytes);
        Ok(u128::from_le_bytes(buf))
    }

    /// Reads exactly `count` raw bytes.
    pub fn deserialize_fixed_bytes(&mut self, count: usize) -> Result<&'a [u8], BcsError> {
        self.take(count)
    }

    /// Reads a uleb128 length prefix followed by that many bytes.
    pub fn deserialize_bytes(&mut self) -> Result<&'a [u8], BcsError> {
        let length = self.deserialize_uleb128()? as usize;
        self.take(length)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn deserialize_str(&mut self) -> Result<String, BcsError> {
        let bytes = self.deserialize_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| BcsError::NonUtf8String)
    }

    /// Reads an option presence byte.
    pub fn deserialize_option_tag(&mut self) -> Result<bool, BcsError> {
        self.deserialize_bool()
    }

    /// Reads an enum variant index.
    pub fn deserialize_variant_index(&mut self) -> Result<u32, BcsError> {
        self.deserialize_uleb128()
    }

    /// Reads a uleb128 integer, rejecting non-minimal encodings.
    ///
    /// A trailing zero byte that is not the sole byte (e.g. `[0x81, 0x00]`
    /// for the value 1) is a canonicality violation, as is any value that
    /// does not fit in a u32.
    pub fn deserialize_uleb128(&mut self) -> Result<u32, BcsError> {
        let start = self.position;
        let mut value: u64 = 0;
        for shift in (0..).step_by(7) {
            let byte = self.deserialize_u8()?;
            if shift > 28 {
                return Err(BcsError::InvalidUleb128 {
                    offset: start,
                    reason: "value does not fit in 32 bits",
                });
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                if byte == 0 && self.position - start > 1 {
                    return Err(BcsError::InvalidUleb128 {
                        offset: start,
                        reason: "non-minimal encoding with trailing zero byte",
                    });
                }
                if value > u64::from(MAX_SEQUENCE_LENGTH) {
                    return Err(BcsError::InvalidUleb128 {
                        offset: start,
                        reason: "value does not fit in 32 bits",
                    });
                }
                return Ok(value as u32);
            }
        }
        unreachable!("loop always returns or errors within 5 iterations")
    }
}

macro_rules! impl_primitive {
    ($ty:ty, $ser:ident, $de:ident) => {
        impl BcsSerialize for $ty {
            fn serialize(&self, serializer: &mut Serializer) {
                serializer.$ser(*self);
            }
        }
        impl BcsDeserialize for $ty {
            fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
                deserializer.$de()
            }
        }
    };
}

impl_primitive!(bool, serialize_bool, deserialize_bool);
impl_primitive!(u8, serialize_u8, deserialize_u8);
impl_primitive!(u16, serialize_u16, deserialize_u16);
impl_primitive!(u32, serialize_u32, deserialize_u32);
impl_primitive!(u64, serialize_u64, deserialize_u64);
impl_primitive!(u128, serialize_u128, deserialize_u128);

impl BcsSerialize for String {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_str(self);
    }
}

impl BcsDeserialize for String {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        deserializer.deserialize_str()
    }
}

impl BcsSerialize for str {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_str(self);
    }
}

impl<T: BcsSerialize> BcsSerialize for Vec<T> {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_uleb128(self.len() as u32);
        for item in self {
            item.serialize(serializer);
        }
    }
}

impl<T: BcsDeserialize> BcsDeserialize for Vec<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let length = deserializer.deserialize_uleb128()? as usize;
        let mut items = Vec::with_capacity(length.min(4096));
        for _ in 0..length {
            items.push(T::deserialize(deserializer)?);
        }
        Ok(items)
    }
}

impl<T: BcsSerialize> BcsSerialize for Option<T> {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Some(value) => {
                serializer.serialize_option_tag(true);
                value.serialize(serializer);
            }
            None => serializer.serialize_option_tag(false),
        }
    }
}

impl<T: BcsDeserialize> BcsDeserialize for Option<T> {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        if deserializer.deserialize_option_tag()? {
            Ok(Some(T::deserialize(deserializer)?))
        } else {
            Ok(None)
        }
    }
}

impl<const N: usize> BcsSerialize for [u8; N] {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_fixed_bytes(self);
    }
}

impl<const N: usize> BcsDeserialize for [u8; N] {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let bytes = deserializer.deserialize_fixed_bytes(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        Ok(buf)
    }
}
