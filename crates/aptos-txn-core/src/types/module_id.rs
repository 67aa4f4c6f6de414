//! Module, struct, and type references.
//!
//! [`TypeTag`] drives both the typed value model (which runtime type a
//! value or argument carries) and entry-function type arguments. Tags are
//! built programmatically; no string grammar is parsed here.

use crate::bcs::{BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::error::{BcsError, CoreError, CoreResult};
use crate::types::AccountAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated Move identifier: `[a-zA-Z_][a-zA-Z0-9_]*`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Creates an identifier, validating its character set.
    ///
    /// # Errors
    ///
    /// Fails on empty input or characters outside `[a-zA-Z0-9_]` (the
    /// first character must not be a digit).
    pub fn new<S: Into<String>>(name: S) -> CoreResult<Self> {
        let name = name.into();
        let valid = match name.chars().next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if valid {
            Ok(Self(name))
        } else {
            Err(CoreError::InvalidIdentifier(name))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl BcsSerialize for Identifier {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_str(&self.0);
    }
}

impl BcsDeserialize for Identifier {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        // Wire decoding only checks UTF-8; identifier charset is validated
        // at construction time by the sender.
        Ok(Self(deserializer.deserialize_str()?))
    }
}

/// A reference to a published module: address plus module name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    /// Address the module is published under
    pub address: AccountAddress,
    /// Name of the module
    pub name: Identifier,
}

impl ModuleId {
    /// Creates a module reference.
    pub fn new(address: AccountAddress, name: Identifier) -> Self {
        Self { address, name }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address.to_short_string(), self.name)
    }
}

impl BcsSerialize for ModuleId {
    fn serialize(&self, serializer: &mut Serializer) {
        BcsSerialize::serialize(&self.address, serializer);
        BcsSerialize::serialize(&self.name, serializer);
    }
}

impl BcsDeserialize for ModuleId {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            address: <AccountAddress as BcsDeserialize>::deserialize(deserializer)?,
            name: <Identifier as BcsDeserialize>::deserialize(deserializer)?,
        })
    }
}

/// A fully-qualified struct type, including its type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    /// Address the defining module is published under
    pub address: AccountAddress,
    /// Name of the defining module
    pub module: Identifier,
    /// Name of the struct
    pub name: Identifier,
    /// Type arguments, if the struct is generic
    pub type_args: Vec<TypeTag>,
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_string(),
            self.module,
            self.name
        )?;
        if !self.type_args.is_empty() {
            write!(f, "<")?;
            for (i, tag) in self.type_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{tag}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl BcsSerialize for StructTag {
    fn serialize(&self, serializer: &mut Serializer) {
        BcsSerialize::serialize(&self.address, serializer);
        BcsSerialize::serialize(&self.module, serializer);
        BcsSerialize::serialize(&self.name, serializer);
        BcsSerialize::serialize(&self.type_args, serializer);
    }
}

impl BcsDeserialize for StructTag {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            address: <AccountAddress as BcsDeserialize>::deserialize(deserializer)?,
            module: <Identifier as BcsDeserialize>::deserialize(deserializer)?,
            name: <Identifier as BcsDeserialize>::deserialize(deserializer)?,
            type_args: <Vec<TypeTag> as BcsDeserialize>::deserialize(deserializer)?,
        })
    }
}

/// A runtime type.
///
/// Wire variant indices are fixed by the protocol; note that U16/U32/U256
/// were added later and carry the trailing indices 8, 9, and 10.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// Boolean (variant 0)
    Bool,
    /// Unsigned 8-bit integer (variant 1)
    U8,
    /// Unsigned 64-bit integer (variant 2)
    U64,
    /// Unsigned 128-bit integer (variant 3)
    U128,
    /// Account address (variant 4)
    Address,
    /// Transaction signer (variant 5)
    Signer,
    /// Homogeneous vector (variant 6)
    Vector(Box<TypeTag>),
    /// Struct type (variant 7)
    Struct(Box<StructTag>),
    /// Unsigned 16-bit integer (variant 8)
    U16,
    /// Unsigned 32-bit integer (variant 9)
    U32,
    /// Unsigned 256-bit integer (variant 10)
    U256,
}

impl TypeTag {
    /// Convenience constructor for `vector<element>`.
    pub fn vector(element: TypeTag) -> Self {
        Self::Vector(Box::new(element))
    }

    /// Convenience constructor for a struct tag.
    pub fn struct_tag(
        address: AccountAddress,
        module: Identifier,
        name: Identifier,
        type_args: Vec<TypeTag>,
    ) -> Self {
        Self::Struct(Box::new(StructTag {
            address,
            module,
            name,
            type_args,
        }))
    }

    /// The `0x1::string::String` struct tag.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the identifiers are statically valid.
    pub fn move_string() -> CoreResult<Self> {
        Ok(Self::struct_tag(
            AccountAddress::ONE,
            Identifier::new("string")?,
            Identifier::new("String")?,
            vec![],
        ))
    }

    /// The `0x1::aptos_coin::AptosCoin` struct tag.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the identifiers are statically valid.
    pub fn aptos_coin() -> CoreResult<Self> {
        Ok(Self::struct_tag(
            AccountAddress::ONE,
            Identifier::new("aptos_coin")?,
            Identifier::new("AptosCoin")?,
            vec![],
        ))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::U256 => write!(f, "u256"),
            Self::Address => write!(f, "address"),
            Self::Signer => write!(f, "signer"),
            Self::Vector(element) => write!(f, "vector<{element}>"),
            Self::Struct(tag) => write!(f, "{tag}"),
        }
    }
}

impl BcsSerialize for TypeTag {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Self::Bool => serializer.serialize_variant_index(0),
            Self::U8 => serializer.serialize_variant_index(1),
            Self::U64 => serializer.serialize_variant_index(2),
            Self::U128 => serializer.serialize_variant_index(3),
            Self::Address => serializer.serialize_variant_index(4),
            Self::Signer => serializer.serialize_variant_index(5),
            Self::Vector(element) => {
                serializer.serialize_variant_index(6);
                BcsSerialize::serialize(element.as_ref(), serializer);
            }
            Self::Struct(tag) => {
                serializer.serialize_variant_index(7);
                BcsSerialize::serialize(tag.as_ref(), serializer);
            }
            Self::U16 => serializer.serialize_variant_index(8),
            Self::U32 => serializer.serialize_variant_index(9),
            Self::U256 => serializer.serialize_variant_index(10),
        }
    }
}

impl BcsDeserialize for TypeTag {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        match deserializer.deserialize_variant_index()? {
            0 => Ok(Self::Bool),
            1 => Ok(Self::U8),
            2 => Ok(Self::U64),
            3 => Ok(Self::U128),
            4 => Ok(Self::Address),
            5 => Ok(Self::Signer),
            6 => Ok(Self::Vector(Box::new(
                <TypeTag as BcsDeserialize>::deserialize(deserializer)?,
            ))),
            7 => Ok(Self::Struct(Box::new(
                <StructTag as BcsDeserialize>::deserialize(deserializer)?,
            ))),
            8 => Ok(Self::U16),
            9 => Ok(Self::U32),
            10 => Ok(Self::U256),
            index => Err(BcsError::VariantIndexOutOfRange {
                type_name: "TypeTag",
                index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs;

    #[test]
    fn test_identifier_validation() {
        assert!(Identifier::new("coin").is_ok());
        assert!(Identifier::new("_private").is_ok());
        assert!(Identifier::new("transfer_v2").is_ok());
        assert!(Identifier::new("").is_err());
        assert!(Identifier::new("2fast").is_err());
        assert!(Identifier::new("has space").is_err());
        assert!(Identifier::new("has::colons").is_err());
    }

    #[test]
    fn test_module_id_display() {
        let module = ModuleId::new(AccountAddress::ONE, Identifier::new("coin").unwrap());
        assert_eq!(module.to_string(), "0x1::coin");
    }

    #[test]
    fn test_type_tag_display() {
        assert_eq!(TypeTag::vector(TypeTag::U8).to_string(), "vector<u8>");
        let tag = TypeTag::struct_tag(
            AccountAddress::ONE,
            Identifier::new("coin").unwrap(),
            Identifier::new("Coin").unwrap(),
            vec![TypeTag::struct_tag(
                AccountAddress::ONE,
                Identifier::new("aptos_coin").unwrap(),
                Identifier::new("AptosCoin").unwrap(),
                vec![],
            )],
        );
        assert_eq!(tag.to_string(), "0x1::coin::Coin<0x1::aptos_coin::AptosCoin>");
    }

    #[test]
    fn test_type_tag_variant_indices() {
        assert_eq!(bcs::to_bytes(&TypeTag::Bool), vec![0]);
        assert_eq!(bcs::to_bytes(&TypeTag::U64), vec![2]);
        assert_eq!(bcs::to_bytes(&TypeTag::U16), vec![8]);
        assert_eq!(bcs::to_bytes(&TypeTag::U256), vec![10]);
        assert_eq!(bcs::to_bytes(&TypeTag::vector(TypeTag::U8)), vec![6, 1]);
    }

    #[test]
    fn test_type_tag_round_trip() {
        let tag = TypeTag::vector(TypeTag::vector(TypeTag::move_string().unwrap()));
        let encoded = bcs::to_bytes(&tag);
        assert_eq!(bcs::from_bytes::<TypeTag>(&encoded).unwrap(), tag);
    }

    #[test]
    fn test_type_tag_unknown_variant() {
        let err = bcs::from_bytes::<TypeTag>(&[11]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::BcsError::VariantIndexOutOfRange {
                type_name: "TypeTag",
                index: 11
            }
        ));
    }
}
