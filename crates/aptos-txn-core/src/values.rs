//! Typed runtime values and argument coercion.
//!
//! [`MoveValue`] is the client-side value model: every runtime type a
//! transaction argument can carry, with canonical encoding. Because the
//! wire format is not self-describing, decoding is driven by a [`TypeTag`].
//!
//! [`MoveValue::coerce`] converts loosely-typed JSON input (the shape an
//! ABI-driven caller supplies) into a typed value, with precise errors when
//! the input does not match the declared type.

use crate::bcs::{self, BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::error::{BcsError, CoreError, CoreResult};
use crate::types::{AccountAddress, TypeTag};
use std::fmt;

/// A 256-bit unsigned integer, represented as 32 little-endian bytes.
///
/// A value carrier, not an arithmetic type: the protocol only moves these
/// around and compares them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct U256([u8; 32]);

impl U256 {
    /// The zero value.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a value from a u128.
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }

    /// Creates a value from raw little-endian bytes.
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the little-endian byte representation.
    pub const fn to_le_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Parses a decimal string, accepting the full 256-bit range.
    ///
    /// # Errors
    ///
    /// Fails on empty input, non-digit characters, or overflow.
    pub fn parse(s: &str) -> CoreResult<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::transaction(format!("invalid u256: {s:?}")));
        }
        let mut bytes = [0u8; 32];
        for digit in s.bytes() {
            // bytes = bytes * 10 + digit, schoolbook with carry
            let mut carry = u16::from(digit - b'0');
            for byte in bytes.iter_mut() {
                let value = u16::from(*byte) * 10 + carry;
                *byte = (value & 0xff) as u8;
                carry = value >> 8;
            }
            if carry != 0 {
                return Err(CoreError::transaction(format!("u256 overflow: {s}")));
            }
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256(0x{})", hex::encode(self.0))
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl BcsSerialize for U256 {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_fixed_bytes(&self.0);
    }
}

impl BcsDeserialize for U256 {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self(<[u8; 32]>::deserialize(deserializer)?))
    }
}

/// A typed runtime value.
///
/// Vectors are homogeneous; use [`MoveValue::vector`] to construct one with
/// the invariant enforced. Struct values are positional field lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveValue {
    /// Boolean
    Bool(bool),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// Unsigned 128-bit integer
    U128(u128),
    /// Unsigned 256-bit integer
    U256(U256),
    /// Account address
    Address(AccountAddress),
    /// UTF-8 string
    String(String),
    /// Optional value (absence encoded as a zero presence byte)
    Option(Option<Box<MoveValue>>),
    /// Homogeneous vector
    Vector(Vec<MoveValue>),
    /// Struct with positional fields
    Struct(Vec<MoveValue>),
}

impl MoveValue {
    /// Creates a homogeneous vector, rejecting mixed element kinds.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::ArgumentTypeMismatch`] when elements have
    /// differing kinds.
    pub fn vector(elements: Vec<MoveValue>) -> CoreResult<Self> {
        if let Some(first) = elements.first() {
            let kind = first.kind();
            if let Some(offender) = elements.iter().find(|e| e.kind() != kind) {
                return Err(CoreError::ArgumentTypeMismatch {
                    expected: format!("vector<{kind}>"),
                    actual: offender.kind().to_string(),
                });
            }
        }
        Ok(Self::Vector(elements))
    }

    /// A short name for this value's runtime kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::U256(_) => "u256",
            Self::Address(_) => "address",
            Self::String(_) => "string",
            Self::Option(_) => "option",
            Self::Vector(_) => "vector",
            Self::Struct(_) => "struct",
        }
    }

    /// Encodes this value to its canonical bytes.
    pub fn encode(&self) -> Vec<u8> {
        bcs::to_bytes(self)
    }

    /// Decodes a value of the given type from canonical bytes.
    ///
    /// `0x1::string::String` and `0x1::option::Option<T>` struct tags map
    /// to the [`String`](MoveValue::String) and
    /// [`Option`](MoveValue::Option) variants.
    ///
    /// # Errors
    ///
    /// Fails on malformed input or trailing bytes.
    pub fn decode(tag: &TypeTag, bytes: &[u8]) -> CoreResult<Self> {
        let mut deserializer = Deserializer::new(bytes);
        let value = Self::decode_inner(tag, &mut deserializer)?;
        deserializer.end()?;
        Ok(value)
    }

    fn decode_inner(tag: &TypeTag, de: &mut Deserializer<'_>) -> CoreResult<Self> {
        Ok(match tag {
            TypeTag::Bool => Self::Bool(de.deserialize_bool()?),
            TypeTag::U8 => Self::U8(de.deserialize_u8()?),
            TypeTag::U16 => Self::U16(de.deserialize_u16()?),
            TypeTag::U32 => Self::U32(de.deserialize_u32()?),
            TypeTag::U64 => Self::U64(de.deserialize_u64()?),
            TypeTag::U128 => Self::U128(de.deserialize_u128()?),
            TypeTag::U256 => Self::U256(U256::deserialize(de)?),
            TypeTag::Address | TypeTag::Signer => Self::Address(AccountAddress::deserialize(de)?),
            TypeTag::Vector(element) => {
                let length = de.deserialize_uleb128()? as usize;
                let mut values = Vec::with_capacity(length.min(4096));
                for _ in 0..length {
                    values.push(Self::decode_inner(element, de)?);
                }
                Self::Vector(values)
            }
            TypeTag::Struct(struct_tag) => {
                if struct_tag.address == AccountAddress::ONE
                    && struct_tag.module.as_str() == "string"
                    && struct_tag.name.as_str() == "String"
                {
                    Self::String(de.deserialize_str()?)
                } else if struct_tag.address == AccountAddress::ONE
                    && struct_tag.module.as_str() == "option"
                    && struct_tag.name.as_str() == "Option"
                {
                    let element = struct_tag.type_args.first().ok_or_else(|| {
                        CoreError::transaction("option struct tag missing type argument")
                    })?;
                    // on-chain Option is a vector of length 0 or 1
                    match de.deserialize_uleb128()? {
                        0 => Self::Option(None),
                        1 => Self::Option(Some(Box::new(Self::decode_inner(element, de)?))),
                        n => {
                            return Err(CoreError::transaction(format!(
                                "option encoded with {n} elements"
                            )))
                        }
                    }
                } else {
                    return Err(CoreError::transaction(format!(
                        "cannot decode opaque struct type {struct_tag}"
                    )));
                }
            }
        })
    }

    /// Coerces loosely-typed JSON input into a value of the given type.
    ///
    /// Integers accept JSON numbers or decimal strings; addresses accept
    /// hex strings; options accept `null` (absent), a bare value, or an
    /// array of zero or one element.
    ///
    /// # Errors
    ///
    /// [`CoreError::ArgumentTypeMismatch`] when the input shape does not
    /// match the declared type, [`CoreError::AmbiguousOptionInput`] when an
    /// option array has more than one element.
    pub fn coerce(tag: &TypeTag, input: &serde_json::Value) -> CoreResult<Self> {
        use serde_json::Value;
        Ok(match tag {
            TypeTag::Bool => match input {
                Value::Bool(b) => Self::Bool(*b),
                other => return Err(mismatch(tag, other)),
            },
            TypeTag::U8 => Self::U8(coerce_small_int(tag, input)? as u8),
            TypeTag::U16 => Self::U16(coerce_small_int(tag, input)? as u16),
            TypeTag::U32 => Self::U32(coerce_small_int(tag, input)? as u32),
            TypeTag::U64 => Self::U64(coerce_u64(tag, input)?),
            TypeTag::U128 => Self::U128(coerce_u128(tag, input)?),
            TypeTag::U256 => match input {
                Value::String(s) => Self::U256(U256::parse(s).map_err(|_| mismatch(tag, input))?),
                Value::Number(_) => Self::U256(U256::from_u128(coerce_u128(tag, input)?)),
                other => return Err(mismatch(tag, other)),
            },
            TypeTag::Address | TypeTag::Signer => match input {
                Value::String(s) => {
                    Self::Address(AccountAddress::from_hex(s).map_err(|_| mismatch(tag, input))?)
                }
                other => return Err(mismatch(tag, other)),
            },
            TypeTag::Vector(element) => match input {
                // vector<u8> additionally accepts a hex string
                Value::String(s) if **element == TypeTag::U8 => {
                    let stripped = s.strip_prefix("0x").unwrap_or(s);
                    let bytes = hex::decode(stripped).map_err(|_| mismatch(tag, input))?;
                    Self::Vector(bytes.into_iter().map(Self::U8).collect())
                }
                Value::Array(items) => {
                    let values = items
                        .iter()
                        .map(|item| Self::coerce(element, item))
                        .collect::<CoreResult<Vec<_>>>()?;
                    Self::vector(values)?
                }
                other => return Err(mismatch(tag, other)),
            },
            TypeTag::Struct(struct_tag)
                if struct_tag.address == AccountAddress::ONE
                    && struct_tag.module.as_str() == "string"
                    && struct_tag.name.as_str() == "String" =>
            {
                match input {
                    Value::String(s) => Self::String(s.clone()),
                    other => return Err(mismatch(tag, other)),
                }
            }
            TypeTag::Struct(struct_tag)
                if struct_tag.address == AccountAddress::ONE
                    && struct_tag.module.as_str() == "option"
                    && struct_tag.name.as_str() == "Option" =>
            {
                let element = struct_tag.type_args.first().ok_or_else(|| {
                    CoreError::transaction("option struct tag missing type argument")
                })?;
                match input {
                    Value::Null => Self::Option(None),
                    Value::Array(items) => match items.len() {
                        0 => Self::Option(None),
                        1 => Self::Option(Some(Box::new(Self::coerce(element, &items[0])?))),
                        n => return Err(CoreError::AmbiguousOptionInput(n)),
                    },
                    other => Self::Option(Some(Box::new(Self::coerce(element, other)?))),
                }
            }
            TypeTag::Struct(struct_tag) => {
                return Err(CoreError::ArgumentTypeMismatch {
                    expected: struct_tag.to_string(),
                    actual: describe(input).to_string(),
                })
            }
        })
    }

    /// Coerces JSON input and returns the canonical argument bytes.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`MoveValue::coerce`].
    pub fn encode_arg(tag: &TypeTag, input: &serde_json::Value) -> CoreResult<Vec<u8>> {
        Ok(Self::coerce(tag, input)?.encode())
    }
}

fn describe(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(tag: &TypeTag, input: &serde_json::Value) -> CoreError {
    CoreError::ArgumentTypeMismatch {
        expected: tag.to_string(),
        actual: describe(input).to_string(),
    }
}

fn coerce_u64(tag: &TypeTag, input: &serde_json::Value) -> CoreResult<u64> {
    use serde_json::Value;
    match input {
        Value::Number(n) => n.as_u64().ok_or_else(|| mismatch(tag, input)),
        Value::String(s) => s.parse::<u64>().map_err(|_| mismatch(tag, input)),
        other => Err(mismatch(tag, other)),
    }
}

fn coerce_u128(tag: &TypeTag, input: &serde_json::Value) -> CoreResult<u128> {
    use serde_json::Value;
    match input {
        Value::Number(n) => {
            // arbitrary_precision keeps wide integers intact in the raw form
            n.to_string().parse::<u128>().map_err(|_| mismatch(tag, input))
        }
        Value::String(s) => s.parse::<u128>().map_err(|_| mismatch(tag, input)),
        other => Err(mismatch(tag, other)),
    }
}

fn coerce_small_int(tag: &TypeTag, input: &serde_json::Value) -> CoreResult<u64> {
    let value = coerce_u64(tag, input)?;
    let max = match tag {
        TypeTag::U8 => u64::from(u8::MAX),
        TypeTag::U16 => u64::from(u16::MAX),
        TypeTag::U32 => u64::from(u32::MAX),
        _ => u64::MAX,
    };
    if value > max {
        return Err(CoreError::ArgumentTypeMismatch {
            expected: tag.to_string(),
            actual: format!("number {value} out of range"),
        });
    }
    Ok(value)
}

impl BcsSerialize for MoveValue {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::U8(v) => serializer.serialize_u8(*v),
            Self::U16(v) => serializer.serialize_u16(*v),
            Self::U32(v) => serializer.serialize_u32(*v),
            Self::U64(v) => serializer.serialize_u64(*v),
            Self::U128(v) => serializer.serialize_u128(*v),
            Self::U256(v) => v.serialize(serializer),
            Self::Address(addr) => addr.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Option(None) => serializer.serialize_uleb128(0),
            Self::Option(Some(value)) => {
                serializer.serialize_uleb128(1);
                value.serialize(serializer);
            }
            Self::Vector(values) => {
                serializer.serialize_uleb128(values.len() as u32);
                for value in values {
                    value.serialize(serializer);
                }
            }
            Self::Struct(fields) => {
                for field in fields {
                    field.serialize(serializer);
                }
            }
        }
    }
}
