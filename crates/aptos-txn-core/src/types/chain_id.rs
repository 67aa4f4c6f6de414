//! Chain identifier.
//!
//! A single byte on the wire, bound into every raw transaction so a signed
//! transaction cannot be replayed on another network.

use crate::bcs::{BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::error::BcsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The network a transaction is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// Mainnet (chain id 1)
    Mainnet,
    /// Testnet (chain id 2)
    Testnet,
    /// Local testing networks (chain id 4)
    Testing,
    /// Any other network, by raw id
    Custom(u8),
}

impl ChainId {
    /// Returns the raw chain id byte.
    pub fn id(&self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 2,
            Self::Testing => 4,
            Self::Custom(id) => *id,
        }
    }

    /// Creates a chain id from its raw byte, mapping known networks to
    /// their named variants.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Self::Mainnet,
            2 => Self::Testnet,
            4 => Self::Testing,
            other => Self::Custom(other),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Testing => write!(f, "testing"),
            Self::Custom(id) => write!(f, "chain-{id}"),
        }
    }
}

impl BcsSerialize for ChainId {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_u8(self.id());
    }
}

impl BcsDeserialize for ChainId {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self::from_id(deserializer.deserialize_u8()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs;

    #[test]
    fn test_known_ids() {
        assert_eq!(ChainId::Mainnet.id(), 1);
        assert_eq!(ChainId::Testnet.id(), 2);
        assert_eq!(ChainId::Testing.id(), 4);
        assert_eq!(ChainId::from_id(1), ChainId::Mainnet);
        assert_eq!(ChainId::from_id(99), ChainId::Custom(99));
    }

    #[test]
    fn test_custom_round_trip_normalizes() {
        // A Custom carrying a known id collapses to the named variant
        let encoded = bcs::to_bytes(&ChainId::Custom(2));
        assert_eq!(encoded, vec![2]);
        assert_eq!(bcs::from_bytes::<ChainId>(&encoded).unwrap(), ChainId::Testnet);
    }

    #[test]
    fn test_wire_is_single_byte() {
        assert_eq!(bcs::to_bytes(&ChainId::Mainnet), vec![1]);
        assert_eq!(bcs::from_bytes::<ChainId>(&[4]).unwrap(), ChainId::Testing);
    }

    #[test]
    fn test_display() {
        assert_eq!(ChainId::Mainnet.to_string(), "mainnet");
        assert_eq!(ChainId::Custom(7).to_string(), "chain-7");
    }
}
