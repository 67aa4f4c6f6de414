//! Transaction and account authenticators.
//!
//! An [`AccountAuthenticator`] proves one account approved a message; a
//! [`TransactionAuthenticator`] combines the account authenticators an
//! envelope requires (sender, secondary signers, fee payer). Both are
//! closed enums with protocol-fixed variant indices, and verification is
//! an exhaustive match returning `bool`: a bad signature, a scheme
//! mismatch, or a threshold shortfall is an outcome, not an error.

use crate::bcs::{self, BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::crypto::ed25519::{Ed25519PublicKey, Ed25519Signature};
use crate::crypto::keyless::{KeylessPublicKey, KeylessSignature};
use crate::crypto::multi_ed25519::{MultiEd25519PublicKey, MultiEd25519Signature};
use crate::crypto::multi_key::{
    AnyPublicKey, AnySignature, MultiKeyPublicKey, MultiKeySignature,
};
use crate::crypto::secp256k1::{Secp256k1PublicKey, Secp256k1Signature};
use crate::crypto::{
    derive_authentication_key, ED25519_SCHEME, KEYLESS_SCHEME, MULTI_ED25519_SCHEME,
};
use crate::error::{BcsError, CoreError, CoreResult};
use crate::transaction::types::{
    FeePayerRawTransaction, MultiAgentRawTransaction, RawTransaction,
};
use crate::types::AccountAddress;

/// An authenticator for a single account.
///
/// Variant indices are fixed by the protocol:
/// 0 Ed25519, 1 `MultiEd25519`, 2 `SingleKey`, 3 `MultiKey`,
/// 4 `NoAccountAuthenticator`, 5 `Keyless`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountAuthenticator {
    /// Ed25519 authentication (variant 0).
    Ed25519 {
        /// The public key.
        public_key: Ed25519PublicKey,
        /// The signature.
        signature: Ed25519Signature,
    },
    /// Multi-Ed25519 threshold authentication (variant 1).
    MultiEd25519 {
        /// The key set.
        public_key: MultiEd25519PublicKey,
        /// The signature set with its bitmap.
        signature: MultiEd25519Signature,
    },
    /// Unified single-key authentication (variant 2).
    SingleKey {
        /// The scheme-tagged public key.
        public_key: AnyPublicKey,
        /// The scheme-tagged signature.
        signature: AnySignature,
    },
    /// Unified multi-key authentication (variant 3).
    MultiKey {
        /// The mixed-scheme key set.
        public_key: MultiKeyPublicKey,
        /// The signature set with its bitmap.
        signature: MultiKeySignature,
    },
    /// No authenticator, used for simulation only (variant 4).
    NoAccountAuthenticator,
    /// Keyless (OIDC-based) authentication (variant 5).
    Keyless {
        /// The keyless account's public key.
        public_key: KeylessPublicKey,
        /// The ephemeral signature, proof, and expiry.
        signature: KeylessSignature,
    },
}

impl AccountAuthenticator {
    /// Creates an Ed25519 account authenticator.
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    /// Creates a multi-Ed25519 account authenticator.
    ///
    /// # Errors
    ///
    /// [`CoreError::InsufficientSignatures`] when the signature set falls
    /// short of the key set's threshold; such an authenticator could never
    /// verify.
    pub fn multi_ed25519(
        public_key: MultiEd25519PublicKey,
        signature: MultiEd25519Signature,
    ) -> CoreResult<Self> {
        if signature.num_signatures() < public_key.threshold() as usize {
            return Err(CoreError::InsufficientSignatures {
                required: public_key.threshold() as usize,
                provided: signature.num_signatures(),
            });
        }
        Ok(Self::MultiEd25519 {
            public_key,
            signature,
        })
    }

    /// Creates a single-key account authenticator.
    pub fn single_key(public_key: AnyPublicKey, signature: AnySignature) -> Self {
        Self::SingleKey {
            public_key,
            signature,
        }
    }

    /// Creates a single-key account authenticator over Secp256k1 material.
    ///
    /// Standalone Secp256k1 accounts travel as the unified single-key
    /// scheme on the wire.
    pub fn secp256k1(public_key: Secp256k1PublicKey, signature: Secp256k1Signature) -> Self {
        Self::SingleKey {
            public_key: AnyPublicKey::Secp256k1(public_key),
            signature: AnySignature::Secp256k1(signature),
        }
    }

    /// Creates a multi-key account authenticator.
    ///
    /// # Errors
    ///
    /// [`CoreError::InsufficientSignatures`] when the signature set falls
    /// short of `signatures_required`; such an authenticator could never
    /// verify.
    pub fn multi_key(
        public_key: MultiKeyPublicKey,
        signature: MultiKeySignature,
    ) -> CoreResult<Self> {
        if signature.num_signatures() < public_key.signatures_required() as usize {
            return Err(CoreError::InsufficientSignatures {
                required: public_key.signatures_required() as usize,
                provided: signature.num_signatures(),
            });
        }
        Ok(Self::MultiKey {
            public_key,
            signature,
        })
    }

    /// Creates a no-op authenticator for simulation.
    pub fn no_account_authenticator() -> Self {
        Self::NoAccountAuthenticator
    }

    /// Creates a keyless account authenticator.
    pub fn keyless(public_key: KeylessPublicKey, signature: KeylessSignature) -> Self {
        Self::Keyless {
            public_key,
            signature,
        }
    }

    /// Returns true when this authenticator's signature material is valid
    /// for the message.
    ///
    /// `NoAccountAuthenticator` carries no proof and never verifies.
    pub fn verify(&self, message: &[u8]) -> bool {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => public_key.verify(message, signature),
            Self::MultiEd25519 {
                public_key,
                signature,
            } => public_key.verify(message, signature),
            Self::SingleKey {
                public_key,
                signature,
            } => public_key.verify(message, signature),
            Self::MultiKey {
                public_key,
                signature,
            } => public_key.verify(message, signature),
            Self::NoAccountAuthenticator => false,
            Self::Keyless {
                public_key,
                signature,
            } => !public_key.id_commitment.is_empty() && signature.verify(message),
        }
    }

    /// Derives the authentication key for this authenticator's public-key
    /// material, or `None` when there is none.
    pub fn authentication_key(&self) -> Option<[u8; 32]> {
        match self {
            Self::Ed25519 { public_key, .. } => Some(derive_authentication_key(
                &public_key.to_bytes(),
                ED25519_SCHEME,
            )),
            Self::MultiEd25519 { public_key, .. } => Some(derive_authentication_key(
                &public_key.to_bytes(),
                MULTI_ED25519_SCHEME,
            )),
            Self::SingleKey { public_key, .. } => Some(public_key.to_authentication_key()),
            Self::MultiKey { public_key, .. } => Some(public_key.to_authentication_key()),
            Self::NoAccountAuthenticator => None,
            Self::Keyless { public_key, .. } => Some(derive_authentication_key(
                &public_key.to_bytes(),
                KEYLESS_SCHEME,
            )),
        }
    }
}

impl BcsSerialize for AccountAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(0);
                serializer.serialize_bytes(&public_key.to_bytes());
                serializer.serialize_bytes(&signature.to_bytes());
            }
            Self::MultiEd25519 {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(1);
                serializer.serialize_bytes(&public_key.to_bytes());
                serializer.serialize_bytes(&signature.to_bytes());
            }
            Self::SingleKey {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(2);
                public_key.serialize(serializer);
                signature.serialize(serializer);
            }
            Self::MultiKey {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(3);
                public_key.serialize(serializer);
                signature.serialize(serializer);
            }
            Self::NoAccountAuthenticator => serializer.serialize_variant_index(4),
            Self::Keyless {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(5);
                serializer.serialize_bytes(&bcs::to_bytes(public_key));
                serializer.serialize_bytes(&bcs::to_bytes(signature));
            }
        }
    }
}

impl BcsDeserialize for AccountAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        match deserializer.deserialize_variant_index()? {
            0 => {
                let pk_bytes = deserializer.deserialize_bytes()?.to_vec();
                let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
                Ok(Self::Ed25519 {
                    public_key: Ed25519PublicKey::from_bytes(&pk_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "Ed25519PublicKey",
                        }
                    })?,
                    signature: Ed25519Signature::from_bytes(&sig_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "Ed25519Signature",
                        }
                    })?,
                })
            }
            1 => {
                let pk_bytes = deserializer.deserialize_bytes()?.to_vec();
                let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
                Ok(Self::MultiEd25519 {
                    public_key: MultiEd25519PublicKey::from_bytes(&pk_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "MultiEd25519PublicKey",
                        }
                    })?,
                    signature: MultiEd25519Signature::from_bytes(&sig_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "MultiEd25519Signature",
                        }
                    })?,
                })
            }
            2 => Ok(Self::SingleKey {
                public_key: AnyPublicKey::deserialize(deserializer)?,
                signature: AnySignature::deserialize(deserializer)?,
            }),
            3 => Ok(Self::MultiKey {
                public_key: MultiKeyPublicKey::deserialize(deserializer)?,
                signature: MultiKeySignature::deserialize(deserializer)?,
            }),
            4 => Ok(Self::NoAccountAuthenticator),
            5 => {
                let pk_bytes = deserializer.deserialize_bytes()?.to_vec();
                let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
                Ok(Self::Keyless {
                    public_key: bcs::from_bytes(&pk_bytes)?,
                    signature: bcs::from_bytes(&sig_bytes)?,
                })
            }
            index => Err(BcsError::VariantIndexOutOfRange {
                type_name: "AccountAuthenticator",
                index,
            }),
        }
    }
}

/// An authenticator for a whole transaction.
///
/// Variant indices are fixed by the protocol:
/// 0 Ed25519, 1 `MultiEd25519`, 2 `MultiAgent`, 3 `FeePayer`,
/// 4 `SingleSender`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionAuthenticator {
    /// Ed25519 single-sender authentication (variant 0).
    Ed25519 {
        /// The sender's public key.
        public_key: Ed25519PublicKey,
        /// The sender's signature.
        signature: Ed25519Signature,
    },
    /// Multi-Ed25519 single-sender authentication (variant 1).
    MultiEd25519 {
        /// The sender's key set.
        public_key: MultiEd25519PublicKey,
        /// The sender's signature set.
        signature: MultiEd25519Signature,
    },
    /// Multi-agent authentication (variant 2).
    MultiAgent {
        /// The sender's authenticator.
        sender: Box<AccountAuthenticator>,
        /// Secondary signer addresses.
        secondary_signer_addresses: Vec<AccountAddress>,
        /// Secondary signers' authenticators, in address order.
        secondary_signers: Vec<AccountAuthenticator>,
    },
    /// Fee payer authentication (variant 3).
    FeePayer {
        /// The sender's authenticator.
        sender: Box<AccountAuthenticator>,
        /// Secondary signer addresses.
        secondary_signer_addresses: Vec<AccountAddress>,
        /// Secondary signers' authenticators, in address order.
        secondary_signers: Vec<AccountAuthenticator>,
        /// The fee payer's address.
        fee_payer_address: AccountAddress,
        /// The fee payer's authenticator.
        fee_payer_signer: Box<AccountAuthenticator>,
    },
    /// Single sender with an account authenticator (variant 4), used for
    /// the unified single-key, multi-key, and keyless account models.
    SingleSender {
        /// The sender's account authenticator.
        sender: Box<AccountAuthenticator>,
    },
}

impl TransactionAuthenticator {
    /// Creates an Ed25519 authenticator.
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self::Ed25519 {
            public_key,
            signature,
        }
    }

    /// Creates a multi-Ed25519 authenticator.
    pub fn multi_ed25519(
        public_key: MultiEd25519PublicKey,
        signature: MultiEd25519Signature,
    ) -> Self {
        Self::MultiEd25519 {
            public_key,
            signature,
        }
    }

    /// Creates a single-sender authenticator over Secp256k1 material.
    pub fn secp256k1(public_key: Secp256k1PublicKey, signature: Secp256k1Signature) -> Self {
        Self::single_sender(AccountAuthenticator::secp256k1(public_key, signature))
    }

    /// Creates a multi-agent authenticator.
    pub fn multi_agent(
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
    ) -> Self {
        Self::MultiAgent {
            sender: Box::new(sender),
            secondary_signer_addresses,
            secondary_signers,
        }
    }

    /// Creates a fee payer authenticator.
    pub fn fee_payer(
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
        fee_payer_address: AccountAddress,
        fee_payer_signer: AccountAuthenticator,
    ) -> Self {
        Self::FeePayer {
            sender: Box::new(sender),
            secondary_signer_addresses,
            secondary_signers,
            fee_payer_address,
            fee_payer_signer: Box::new(fee_payer_signer),
        }
    }

    /// Creates a single-sender authenticator.
    pub fn single_sender(sender: AccountAuthenticator) -> Self {
        Self::SingleSender {
            sender: Box::new(sender),
        }
    }

    /// Returns true when every required signer verifies against the
    /// signing message this authenticator's envelope shape derives from
    /// the raw transaction.
    ///
    /// Simple variants verify against the `RawTransaction` message;
    /// multi-agent and fee-payer variants rebuild the wrapped message with
    /// the addresses recorded here, so an authenticator moved to a
    /// different signer set fails.
    pub fn verify(&self, raw_txn: &RawTransaction) -> bool {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => public_key.verify(&raw_txn.signing_message(), signature),
            Self::MultiEd25519 {
                public_key,
                signature,
            } => public_key.verify(&raw_txn.signing_message(), signature),
            Self::MultiAgent {
                sender,
                secondary_signer_addresses,
                secondary_signers,
            } => {
                if secondary_signers.len() != secondary_signer_addresses.len() {
                    return false;
                }
                let message = MultiAgentRawTransaction::new(
                    raw_txn.clone(),
                    secondary_signer_addresses.clone(),
                )
                .signing_message();
                sender.verify(&message)
                    && secondary_signers.iter().all(|auth| auth.verify(&message))
            }
            Self::FeePayer {
                sender,
                secondary_signer_addresses,
                secondary_signers,
                fee_payer_address,
                fee_payer_signer,
            } => {
                if secondary_signers.len() != secondary_signer_addresses.len() {
                    return false;
                }
                let message = FeePayerRawTransaction::new(
                    raw_txn.clone(),
                    secondary_signer_addresses.clone(),
                    *fee_payer_address,
                )
                .signing_message();
                sender.verify(&message)
                    && secondary_signers.iter().all(|auth| auth.verify(&message))
                    && fee_payer_signer.verify(&message)
            }
            Self::SingleSender { sender } => sender.verify(&raw_txn.signing_message()),
        }
    }
}

impl BcsSerialize for TransactionAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Self::Ed25519 {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(0);
                serializer.serialize_bytes(&public_key.to_bytes());
                serializer.serialize_bytes(&signature.to_bytes());
            }
            Self::MultiEd25519 {
                public_key,
                signature,
            } => {
                serializer.serialize_variant_index(1);
                serializer.serialize_bytes(&public_key.to_bytes());
                serializer.serialize_bytes(&signature.to_bytes());
            }
            Self::MultiAgent {
                sender,
                secondary_signer_addresses,
                secondary_signers,
            } => {
                serializer.serialize_variant_index(2);
                sender.serialize(serializer);
                secondary_signer_addresses.serialize(serializer);
                secondary_signers.serialize(serializer);
            }
            Self::FeePayer {
                sender,
                secondary_signer_addresses,
                secondary_signers,
                fee_payer_address,
                fee_payer_signer,
            } => {
                serializer.serialize_variant_index(3);
                sender.serialize(serializer);
                secondary_signer_addresses.serialize(serializer);
                secondary_signers.serialize(serializer);
                fee_payer_address.serialize(serializer);
                fee_payer_signer.serialize(serializer);
            }
            Self::SingleSender { sender } => {
                serializer.serialize_variant_index(4);
                sender.serialize(serializer);
            }
        }
    }
}

impl BcsDeserialize for TransactionAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        match deserializer.deserialize_variant_index()? {
            0 => {
                let pk_bytes = deserializer.deserialize_bytes()?.to_vec();
                let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
                Ok(Self::Ed25519 {
                    public_key: Ed25519PublicKey::from_bytes(&pk_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "Ed25519PublicKey",
                        }
                    })?,
                    signature: Ed25519Signature::from_bytes(&sig_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "Ed25519Signature",
                        }
                    })?,
                })
            }
            1 => {
                let pk_bytes = deserializer.deserialize_bytes()?.to_vec();
                let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
                Ok(Self::MultiEd25519 {
                    public_key: MultiEd25519PublicKey::from_bytes(&pk_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "MultiEd25519PublicKey",
                        }
                    })?,
                    signature: MultiEd25519Signature::from_bytes(&sig_bytes).map_err(|_| {
                        BcsError::InvalidValue {
                            type_name: "MultiEd25519Signature",
                        }
                    })?,
                })
            }
            2 => Ok(Self::MultiAgent {
                sender: Box::new(AccountAuthenticator::deserialize(deserializer)?),
                secondary_signer_addresses: Vec::<AccountAddress>::deserialize(deserializer)?,
                secondary_signers: Vec::<AccountAuthenticator>::deserialize(deserializer)?,
            }),
            3 => Ok(Self::FeePayer {
                sender: Box::new(AccountAuthenticator::deserialize(deserializer)?),
                secondary_signer_addresses: Vec::<AccountAddress>::deserialize(deserializer)?,
                secondary_signers: Vec::<AccountAuthenticator>::deserialize(deserializer)?,
                fee_payer_address: AccountAddress::deserialize(deserializer)?,
                fee_payer_signer: Box::new(AccountAuthenticator::deserialize(deserializer)?),
            }),
            4 => Ok(Self::SingleSender {
                sender: Box::new(AccountAuthenticator::deserialize(deserializer)?),
            }),
            index => Err(BcsError::VariantIndexOutOfRange {
                type_name: "TransactionAuthenticator",
                index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519::Ed25519PrivateKey;
    use crate::crypto::secp256k1::Secp256k1PrivateKey;
    use crate::transaction::payload::{EntryFunction, TransactionPayload};
    use crate::types::ChainId;

    fn test_raw_transaction() -> RawTransaction {
        RawTransaction::new(
            AccountAddress::ONE,
            7,
            TransactionPayload::EntryFunction(
                EntryFunction::apt_transfer(AccountAddress::THREE, 500).unwrap(),
            ),
            200_000,
            100,
            2_000_000_000,
            ChainId::Testing,
        )
    }

    #[test]
    fn test_ed25519_bcs_format() {
        let key = Ed25519PrivateKey::generate();
        let auth = TransactionAuthenticator::ed25519(key.public_key(), key.sign(b"m"));
        let encoded = bcs::to_bytes(&auth);

        assert_eq!(encoded[0], 0);
        assert_eq!(encoded[1], 32);
        assert_eq!(encoded[34], 64);
        // 1 variant + (1 + 32) key + (1 + 64) signature
        assert_eq!(encoded.len(), 99);
        assert_eq!(
            bcs::from_bytes::<TransactionAuthenticator>(&encoded).unwrap(),
            auth
        );
    }

    #[test]
    fn test_account_authenticator_variant_indices() {
        let key = Ed25519PrivateKey::generate();
        let pk = key.public_key();
        let sig = key.sign(b"m");

        let ed25519 = AccountAuthenticator::ed25519(pk, sig);
        assert_eq!(bcs::to_bytes(&ed25519)[0], 0);

        let multi_pk = MultiEd25519PublicKey::new(vec![pk], 1).unwrap();
        let multi_sig = MultiEd25519Signature::new(vec![(0, sig)]).unwrap();
        let multi = AccountAuthenticator::multi_ed25519(multi_pk, multi_sig).unwrap();
        assert_eq!(bcs::to_bytes(&multi)[0], 1);

        let single =
            AccountAuthenticator::single_key(AnyPublicKey::Ed25519(pk), AnySignature::Ed25519(sig));
        assert_eq!(bcs::to_bytes(&single)[0], 2);

        let multi_key_pk = MultiKeyPublicKey::new(vec![AnyPublicKey::Ed25519(pk)], 1).unwrap();
        let multi_key_sig = MultiKeySignature::new(vec![(0, AnySignature::Ed25519(sig))]).unwrap();
        let multi_key = AccountAuthenticator::multi_key(multi_key_pk, multi_key_sig).unwrap();
        assert_eq!(bcs::to_bytes(&multi_key)[0], 3);

        let none = AccountAuthenticator::no_account_authenticator();
        assert_eq!(bcs::to_bytes(&none), vec![4]);
    }

    #[test]
    fn test_below_threshold_assembly_rejected() {
        let private_keys: Vec<_> = (0..3).map(|_| Ed25519PrivateKey::generate()).collect();
        let message = b"threshold";

        // 2-of-3 multi-key set with only one collected signature
        let multi_key_pk = MultiKeyPublicKey::new(
            private_keys
                .iter()
                .map(|k| AnyPublicKey::Ed25519(k.public_key()))
                .collect(),
            2,
        )
        .unwrap();
        let short_sig =
            MultiKeySignature::new(vec![(0, AnySignature::Ed25519(private_keys[0].sign(message)))])
                .unwrap();
        let err = AccountAuthenticator::multi_key(multi_key_pk, short_sig).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientSignatures {
                required: 2,
                provided: 1
            }
        ));

        // same shortfall through the multi-Ed25519 path
        let multi_pk = MultiEd25519PublicKey::new(
            private_keys.iter().map(|k| k.public_key()).collect(),
            2,
        )
        .unwrap();
        let short_sig =
            MultiEd25519Signature::new(vec![(0, private_keys[0].sign(message))]).unwrap();
        let err = AccountAuthenticator::multi_ed25519(multi_pk, short_sig).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientSignatures {
                required: 2,
                provided: 1
            }
        ));
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let err = bcs::from_bytes::<AccountAuthenticator>(&[6]).unwrap_err();
        assert!(matches!(
            err,
            BcsError::VariantIndexOutOfRange { index: 6, .. }
        ));
        let err = bcs::from_bytes::<TransactionAuthenticator>(&[5]).unwrap_err();
        assert!(matches!(
            err,
            BcsError::VariantIndexOutOfRange { index: 5, .. }
        ));
    }

    #[test]
    fn test_simple_verify() {
        let txn = test_raw_transaction();
        let key = Ed25519PrivateKey::generate();
        let auth =
            TransactionAuthenticator::ed25519(key.public_key(), key.sign(&txn.signing_message()));
        assert!(auth.verify(&txn));

        // a signature over different transaction bytes fails
        let mut other = txn.clone();
        other.sequence_number += 1;
        assert!(!auth.verify(&other));
    }

    #[test]
    fn test_secp256k1_travels_as_single_sender() {
        let txn = test_raw_transaction();
        let key = Secp256k1PrivateKey::generate();
        let auth = TransactionAuthenticator::secp256k1(
            key.public_key(),
            key.sign(&txn.signing_message()),
        );
        let encoded = bcs::to_bytes(&auth);
        // SingleSender variant wrapping a SingleKey(secp256k1) authenticator
        assert_eq!(encoded[0], 4);
        assert_eq!(encoded[1], 2);
        assert_eq!(encoded[2], 1);
        assert!(auth.verify(&txn));
    }

    #[test]
    fn test_multi_agent_verify_binds_addresses() {
        let txn = test_raw_transaction();
        let secondary_address = AccountAddress::FOUR;
        let message =
            MultiAgentRawTransaction::new(txn.clone(), vec![secondary_address]).signing_message();

        let sender_key = Ed25519PrivateKey::generate();
        let secondary_key = Ed25519PrivateKey::generate();
        let auth = TransactionAuthenticator::multi_agent(
            AccountAuthenticator::ed25519(sender_key.public_key(), sender_key.sign(&message)),
            vec![secondary_address],
            vec![AccountAuthenticator::ed25519(
                secondary_key.public_key(),
                secondary_key.sign(&message),
            )],
        );
        assert!(auth.verify(&txn));

        // the same signatures do not verify under a different secondary set
        let moved = TransactionAuthenticator::multi_agent(
            AccountAuthenticator::ed25519(sender_key.public_key(), sender_key.sign(&message)),
            vec![AccountAddress::THREE],
            vec![AccountAuthenticator::ed25519(
                secondary_key.public_key(),
                secondary_key.sign(&message),
            )],
        );
        assert!(!moved.verify(&txn));
    }

    #[test]
    fn test_multi_agent_signer_count_mismatch() {
        let txn = test_raw_transaction();
        let key = Ed25519PrivateKey::generate();
        let message = MultiAgentRawTransaction::new(txn.clone(), vec![AccountAddress::FOUR])
            .signing_message();
        let auth = TransactionAuthenticator::multi_agent(
            AccountAuthenticator::ed25519(key.public_key(), key.sign(&message)),
            vec![AccountAddress::FOUR],
            vec![],
        );
        assert!(!auth.verify(&txn));
    }

    #[test]
    fn test_fee_payer_verify() {
        let txn = test_raw_transaction();
        let fee_payer_address = AccountAddress::FOUR;
        let message =
            FeePayerRawTransaction::new_simple(txn.clone(), fee_payer_address).signing_message();

        let sender_key = Ed25519PrivateKey::generate();
        let payer_key = Ed25519PrivateKey::generate();
        let auth = TransactionAuthenticator::fee_payer(
            AccountAuthenticator::ed25519(sender_key.public_key(), sender_key.sign(&message)),
            vec![],
            vec![],
            fee_payer_address,
            AccountAuthenticator::ed25519(payer_key.public_key(), payer_key.sign(&message)),
        );
        assert!(auth.verify(&txn));

        // a simple-envelope signature cannot stand in for a fee-payer one
        let simple_sig = sender_key.sign(&txn.signing_message());
        let replayed = TransactionAuthenticator::fee_payer(
            AccountAuthenticator::ed25519(sender_key.public_key(), simple_sig),
            vec![],
            vec![],
            fee_payer_address,
            AccountAuthenticator::ed25519(payer_key.public_key(), payer_key.sign(&message)),
        );
        assert!(!replayed.verify(&txn));
    }

    #[test]
    fn test_no_account_authenticator_never_verifies() {
        let auth = AccountAuthenticator::no_account_authenticator();
        assert!(!auth.verify(b"anything"));
        assert_eq!(auth.authentication_key(), None);
    }

    #[test]
    fn test_authentication_keys_distinct_per_scheme() {
        let key = Ed25519PrivateKey::generate();
        let pk = key.public_key();
        let sig = key.sign(b"m");

        let ed = AccountAuthenticator::ed25519(pk, sig);
        let single =
            AccountAuthenticator::single_key(AnyPublicKey::Ed25519(pk), AnySignature::Ed25519(sig));
        assert_ne!(ed.authentication_key(), single.authentication_key());
    }

    #[test]
    fn test_fee_payer_round_trip() {
        let key = Ed25519PrivateKey::generate();
        let account = AccountAuthenticator::ed25519(key.public_key(), key.sign(b"m"));
        let auth = TransactionAuthenticator::fee_payer(
            account.clone(),
            vec![AccountAddress::THREE],
            vec![account.clone()],
            AccountAddress::FOUR,
            account,
        );
        let encoded = bcs::to_bytes(&auth);
        assert_eq!(encoded[0], 3);
        assert_eq!(
            bcs::from_bytes::<TransactionAuthenticator>(&encoded).unwrap(),
            auth
        );
    }
}
