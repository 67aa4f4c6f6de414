//! Transaction envelopes and signing messages.

use crate::bcs::{self, BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::crypto::hash::{sha3_256, signing_message};
use crate::error::BcsError;
use crate::transaction::authenticator::TransactionAuthenticator;
use crate::transaction::payload::TransactionPayload;
use crate::types::{AccountAddress, ChainId};
use std::fmt;

/// The raw transaction that a client signs.
///
/// A `RawTransaction` contains all the details of a transaction before it
/// is signed: the sender, payload, gas parameters, and expiration time.
/// It is immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTransaction {
    /// Sender's address.
    pub sender: AccountAddress,
    /// Sequence number of this transaction.
    pub sequence_number: u64,
    /// The transaction payload (entry function, script, multisig).
    pub payload: TransactionPayload,
    /// Maximum gas units the sender is willing to pay.
    pub max_gas_amount: u64,
    /// Price per gas unit in octas.
    pub gas_unit_price: u64,
    /// Expiration time in seconds since Unix epoch.
    pub expiration_timestamp_secs: u64,
    /// Chain ID to prevent cross-chain replay.
    pub chain_id: ChainId,
}

impl RawTransaction {
    /// Creates a new raw transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sender: AccountAddress,
        sequence_number: u64,
        payload: TransactionPayload,
        max_gas_amount: u64,
        gas_unit_price: u64,
        expiration_timestamp_secs: u64,
        chain_id: ChainId,
    ) -> Self {
        Self {
            sender,
            sequence_number,
            payload,
            max_gas_amount,
            gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        }
    }

    /// Generates the signing message for a simple (single-sender)
    /// transaction.
    ///
    /// The message is the `RawTransaction` domain prefix followed by the
    /// canonical transaction bytes.
    pub fn signing_message(&self) -> Vec<u8> {
        signing_message("RawTransaction", &self.to_bytes())
    }

    /// Serializes this transaction to canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        bcs::to_bytes(self)
    }
}

impl BcsSerialize for RawTransaction {
    fn serialize(&self, serializer: &mut Serializer) {
        self.sender.serialize(serializer);
        serializer.serialize_u64(self.sequence_number);
        self.payload.serialize(serializer);
        serializer.serialize_u64(self.max_gas_amount);
        serializer.serialize_u64(self.gas_unit_price);
        serializer.serialize_u64(self.expiration_timestamp_secs);
        self.chain_id.serialize(serializer);
    }
}

impl BcsDeserialize for RawTransaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            sender: AccountAddress::deserialize(deserializer)?,
            sequence_number: deserializer.deserialize_u64()?,
            payload: TransactionPayload::deserialize(deserializer)?,
            max_gas_amount: deserializer.deserialize_u64()?,
            gas_unit_price: deserializer.deserialize_u64()?,
            expiration_timestamp_secs: deserializer.deserialize_u64()?,
            chain_id: ChainId::deserialize(deserializer)?,
        })
    }
}

/// A raw transaction wrapped with the extra signer data of a multi-agent
/// or fee-payer envelope.
///
/// Wire variant indices: `MultiAgent` = 0, `MultiAgentWithFeePayer` = 1.
/// The variant index is part of the signed bytes, so a signature for one
/// envelope shape can never be replayed as the other.
enum RawTransactionWithData<'a> {
    MultiAgent {
        raw_txn: &'a RawTransaction,
        secondary_signer_addresses: &'a [AccountAddress],
    },
    MultiAgentWithFeePayer {
        raw_txn: &'a RawTransaction,
        secondary_signer_addresses: &'a [AccountAddress],
        fee_payer_address: &'a AccountAddress,
    },
}

impl RawTransactionWithData<'_> {
    fn signing_message(&self) -> Vec<u8> {
        let mut serializer = Serializer::new();
        match self {
            Self::MultiAgent {
                raw_txn,
                secondary_signer_addresses,
            } => {
                serializer.serialize_variant_index(0);
                raw_txn.serialize(&mut serializer);
                serialize_addresses(&mut serializer, secondary_signer_addresses);
            }
            Self::MultiAgentWithFeePayer {
                raw_txn,
                secondary_signer_addresses,
                fee_payer_address,
            } => {
                serializer.serialize_variant_index(1);
                raw_txn.serialize(&mut serializer);
                serialize_addresses(&mut serializer, secondary_signer_addresses);
                fee_payer_address.serialize(&mut serializer);
            }
        }
        signing_message("RawTransactionWithData", &serializer.into_bytes())
    }
}

fn serialize_addresses(serializer: &mut Serializer, addresses: &[AccountAddress]) {
    serializer.serialize_uleb128(addresses.len() as u32);
    for address in addresses {
        address.serialize(serializer);
    }
}

/// Multi-agent transaction with additional signers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiAgentRawTransaction {
    /// The raw transaction.
    pub raw_txn: RawTransaction,
    /// Secondary signer addresses.
    pub secondary_signer_addresses: Vec<AccountAddress>,
}

impl MultiAgentRawTransaction {
    /// Creates a new multi-agent transaction.
    pub fn new(raw_txn: RawTransaction, secondary_signer_addresses: Vec<AccountAddress>) -> Self {
        Self {
            raw_txn,
            secondary_signer_addresses,
        }
    }

    /// Generates the signing message every participant signs.
    pub fn signing_message(&self) -> Vec<u8> {
        RawTransactionWithData::MultiAgent {
            raw_txn: &self.raw_txn,
            secondary_signer_addresses: &self.secondary_signer_addresses,
        }
        .signing_message()
    }
}

/// Fee payer transaction where a third party pays gas fees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeePayerRawTransaction {
    /// The raw transaction.
    pub raw_txn: RawTransaction,
    /// Secondary signer addresses (for multi-agent).
    pub secondary_signer_addresses: Vec<AccountAddress>,
    /// The fee payer's address.
    pub fee_payer_address: AccountAddress,
}

impl FeePayerRawTransaction {
    /// Creates a new fee payer transaction.
    pub fn new(
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
        fee_payer_address: AccountAddress,
    ) -> Self {
        Self {
            raw_txn,
            secondary_signer_addresses,
            fee_payer_address,
        }
    }

    /// Creates a fee payer transaction without secondary signers.
    pub fn new_simple(raw_txn: RawTransaction, fee_payer_address: AccountAddress) -> Self {
        Self {
            raw_txn,
            secondary_signer_addresses: vec![],
            fee_payer_address,
        }
    }

    /// Generates the signing message every participant signs, fee payer
    /// included.
    pub fn signing_message(&self) -> Vec<u8> {
        RawTransactionWithData::MultiAgentWithFeePayer {
            raw_txn: &self.raw_txn,
            secondary_signer_addresses: &self.secondary_signer_addresses,
            fee_payer_address: &self.fee_payer_address,
        }
        .signing_message()
    }
}

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashValue([u8; 32]);

impl HashValue {
    /// Wraps raw hash bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the hash bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hash as a `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self.to_hex())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A signed transaction ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The raw transaction.
    pub raw_txn: RawTransaction,
    /// The authenticator (signature(s) and public key(s)).
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    /// Creates a new signed transaction.
    pub fn new(raw_txn: RawTransaction, authenticator: TransactionAuthenticator) -> Self {
        Self {
            raw_txn,
            authenticator,
        }
    }

    /// Serializes this signed transaction to canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        bcs::to_bytes(self)
    }

    /// Returns the sender address.
    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    /// Returns the sequence number.
    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    /// Computes the transaction hash.
    ///
    /// The hash covers the `Transaction` domain prefix, the user-transaction
    /// variant byte, and the canonical signed-transaction bytes.
    pub fn hash(&self) -> HashValue {
        let bytes = self.to_bytes();
        let prefix = sha3_256(b"APTOS::Transaction");

        let mut data = Vec::with_capacity(prefix.len() + 1 + bytes.len());
        data.extend_from_slice(&prefix);
        data.push(0);
        data.extend_from_slice(&bytes);

        HashValue::new(sha3_256(&data))
    }
}

impl BcsSerialize for SignedTransaction {
    fn serialize(&self, serializer: &mut Serializer) {
        self.raw_txn.serialize(serializer);
        self.authenticator.serialize(serializer);
    }
}

impl BcsDeserialize for SignedTransaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            raw_txn: RawTransaction::deserialize(deserializer)?,
            authenticator: TransactionAuthenticator::deserialize(deserializer)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519::Ed25519PrivateKey;
    use crate::transaction::payload::EntryFunction;

    fn create_test_raw_transaction() -> RawTransaction {
        RawTransaction::new(
            AccountAddress::ONE,
            0,
            TransactionPayload::EntryFunction(
                EntryFunction::apt_transfer(AccountAddress::THREE, 1000).unwrap(),
            ),
            100_000,
            100,
            1_000_000_000,
            ChainId::Testnet,
        )
    }

    #[test]
    fn test_raw_transaction_signing_message() {
        let txn = create_test_raw_transaction();
        let message = txn.signing_message();
        assert_eq!(message.len(), 32 + txn.to_bytes().len());
        assert_eq!(&message[..32], sha3_256(b"APTOS::RawTransaction"));
        assert_eq!(&message[32..], txn.to_bytes());
    }

    #[test]
    fn test_raw_transaction_round_trip() {
        let txn = create_test_raw_transaction();
        let encoded = txn.to_bytes();
        assert_eq!(bcs::from_bytes::<RawTransaction>(&encoded).unwrap(), txn);
    }

    #[test]
    fn test_raw_transaction_wire_layout() {
        let txn = create_test_raw_transaction();
        let encoded = txn.to_bytes();
        // sender address occupies the first 32 bytes
        assert_eq!(&encoded[..32], txn.sender.as_bytes());
        // then the little-endian sequence number
        assert_eq!(&encoded[32..40], &[0u8; 8]);
        // then the payload variant index (entry function)
        assert_eq!(encoded[40], 2);
        // chain id is the final byte
        assert_eq!(encoded[encoded.len() - 1], ChainId::Testnet.id());
    }

    #[test]
    fn test_multi_agent_signing_message_layout() {
        let txn = create_test_raw_transaction();
        let secondary = vec![AccountAddress::THREE];
        let multi_agent = MultiAgentRawTransaction::new(txn.clone(), secondary);
        let message = multi_agent.signing_message();

        assert_eq!(&message[..32], sha3_256(b"APTOS::RawTransactionWithData"));
        // variant 0, then the raw transaction bytes
        assert_eq!(message[32], 0);
        assert_eq!(&message[33..33 + txn.to_bytes().len()], txn.to_bytes());
        // then the address vector: length 1 plus one 32-byte address
        let tail = &message[33 + txn.to_bytes().len()..];
        assert_eq!(tail.len(), 1 + 32);
        assert_eq!(tail[0], 1);
    }

    #[test]
    fn test_fee_payer_signing_message_layout() {
        let txn = create_test_raw_transaction();
        let fee_payer = FeePayerRawTransaction::new_simple(txn.clone(), AccountAddress::FOUR);
        let message = fee_payer.signing_message();

        assert_eq!(&message[..32], sha3_256(b"APTOS::RawTransactionWithData"));
        assert_eq!(message[32], 1);
        // empty secondary vector then the fee payer address at the tail
        let tail = &message[33 + txn.to_bytes().len()..];
        assert_eq!(tail[0], 0);
        assert_eq!(&tail[1..], AccountAddress::FOUR.as_bytes());
    }

    #[test]
    fn test_envelope_domains_never_collide() {
        let txn = create_test_raw_transaction();
        let simple = txn.signing_message();
        let multi_agent = MultiAgentRawTransaction::new(txn.clone(), vec![]).signing_message();
        let fee_payer =
            FeePayerRawTransaction::new_simple(txn, AccountAddress::FOUR).signing_message();

        // same embedded transaction, three distinct messages
        assert_ne!(simple, multi_agent);
        assert_ne!(simple, fee_payer);
        assert_ne!(multi_agent, fee_payer);
    }

    #[test]
    fn test_multi_agent_vs_fee_payer_variant_byte() {
        // a fee-payer envelope with no secondaries differs from a
        // multi-agent envelope only by the variant byte and trailing address
        let txn = create_test_raw_transaction();
        let multi_agent = MultiAgentRawTransaction::new(txn.clone(), vec![]).signing_message();
        let fee_payer =
            FeePayerRawTransaction::new_simple(txn, AccountAddress::ZERO).signing_message();
        assert_eq!(multi_agent[32], 0);
        assert_eq!(fee_payer[32], 1);
    }

    #[test]
    fn test_signed_transaction_round_trip_and_hash() {
        let txn = create_test_raw_transaction();
        let key = Ed25519PrivateKey::generate();
        let signature = key.sign(&txn.signing_message());
        let auth = TransactionAuthenticator::ed25519(key.public_key(), signature);
        let signed = SignedTransaction::new(txn, auth);

        let encoded = signed.to_bytes();
        assert_eq!(
            bcs::from_bytes::<SignedTransaction>(&encoded).unwrap(),
            signed
        );

        let hash = signed.hash();
        assert!(hash.to_hex().starts_with("0x"));
        assert_eq!(hash.to_hex().len(), 2 + 64);
        // hash is deterministic over the canonical bytes
        assert_eq!(signed.hash(), hash);
    }

    #[test]
    fn test_ed25519_authenticator_wire_size() {
        let txn = create_test_raw_transaction();
        let key = Ed25519PrivateKey::generate();
        let signature = key.sign(&txn.signing_message());
        let auth = TransactionAuthenticator::ed25519(key.public_key(), signature);

        let raw_len = txn.to_bytes().len();
        let signed = SignedTransaction::new(txn, auth);
        // variant + length-prefixed key (1+32) + length-prefixed sig (1+64)
        assert_eq!(signed.to_bytes().len(), raw_len + 99);
    }
}
