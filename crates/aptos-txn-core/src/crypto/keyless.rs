//! Keyless (OIDC-backed) signature scheme.
//!
//! A keyless account authenticates with a short-lived ephemeral Ed25519 key
//! plus a zero-knowledge proof binding that key to an OIDC identity. The
//! proof itself is produced and checked by the prover service; locally it is
//! carried opaquely and only validated structurally. Expiry and the
//! ephemeral signature are two independently checked conditions.

use crate::bcs::{BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::crypto::ed25519::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use crate::error::{BcsError, CoreError, CoreResult};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// An opaque zero-knowledge proof produced by the prover service.
#[derive(Clone, PartialEq, Eq)]
pub struct ZkProof(Vec<u8>);

impl ZkProof {
    /// Wraps raw proof bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true when the proof is structurally present (non-empty).
    pub fn is_wellformed(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Debug for ZkProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZkProof({} bytes)", self.0.len())
    }
}

/// An ephemeral key pair for keyless signing, bound to an expiry.
pub struct EphemeralKeyPair {
    private_key: Ed25519PrivateKey,
    expiry_timestamp_secs: u64,
}

impl EphemeralKeyPair {
    /// Generates a fresh ephemeral key valid until the given unix time.
    pub fn generate(expiry_timestamp_secs: u64) -> Self {
        Self {
            private_key: Ed25519PrivateKey::generate(),
            expiry_timestamp_secs,
        }
    }

    /// Returns the ephemeral public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.private_key.public_key()
    }

    /// Returns the expiry as unix seconds.
    pub fn expiry_timestamp_secs(&self) -> u64 {
        self.expiry_timestamp_secs
    }

    /// Returns true when the key has expired at the given unix time.
    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.expiry_timestamp_secs
    }

    /// Signs a message with the ephemeral key and attaches the proof.
    pub fn sign(&self, message: &[u8], proof: ZkProof) -> KeylessSignature {
        KeylessSignature {
            ephemeral_public_key: self.public_key(),
            ephemeral_signature: self.private_key.sign(message),
            proof,
            expiry_timestamp_secs: self.expiry_timestamp_secs,
        }
    }
}

impl fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("private_key", &"[REDACTED]")
            .field("expiry_timestamp_secs", &self.expiry_timestamp_secs)
            .finish()
    }
}

/// A keyless public key: the OIDC issuer plus the identity commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeylessPublicKey {
    /// The OIDC issuer URL
    pub iss: String,
    /// Commitment to the account's identity within the issuer
    pub id_commitment: Vec<u8>,
}

impl KeylessPublicKey {
    /// Creates a keyless public key.
    ///
    /// # Errors
    ///
    /// Fails on an empty issuer or commitment.
    pub fn new(iss: String, id_commitment: Vec<u8>) -> CoreResult<Self> {
        if iss.is_empty() || id_commitment.is_empty() {
            return Err(CoreError::InvalidPublicKey(
                "keyless public key requires an issuer and an identity commitment".into(),
            ));
        }
        Ok(Self { iss, id_commitment })
    }

    /// Returns the canonical byte representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::bcs::to_bytes(self)
    }
}

impl BcsSerialize for KeylessPublicKey {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_str(&self.iss);
        serializer.serialize_bytes(&self.id_commitment);
    }
}

impl BcsDeserialize for KeylessPublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        Ok(Self {
            iss: deserializer.deserialize_str()?,
            id_commitment: deserializer.deserialize_bytes()?.to_vec(),
        })
    }
}

/// A keyless signature: ephemeral signature, proof, and expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeylessSignature {
    /// The ephemeral public key that signed
    pub ephemeral_public_key: Ed25519PublicKey,
    /// The ephemeral key's signature over the message
    pub ephemeral_signature: Ed25519Signature,
    /// The proof binding the ephemeral key to the identity
    pub proof: ZkProof,
    /// Unix time after which this signature is invalid
    pub expiry_timestamp_secs: u64,
}

impl KeylessSignature {
    /// Verifies this signature at the given unix time.
    ///
    /// Three independent conditions: the ephemeral signature covers the
    /// message, the signature has not expired, and the proof is
    /// structurally present.
    pub fn verify_at(&self, message: &[u8], now_secs: u64) -> bool {
        let signature_valid = self
            .ephemeral_public_key
            .verify(message, &self.ephemeral_signature);
        let not_expired = now_secs < self.expiry_timestamp_secs;
        signature_valid && not_expired && self.proof.is_wellformed()
    }

    /// Verifies this signature at the current time.
    pub fn verify(&self, message: &[u8]) -> bool {
        self.verify_at(message, unix_now_secs())
    }
}

impl BcsSerialize for KeylessSignature {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_bytes(&self.ephemeral_public_key.to_bytes());
        serializer.serialize_bytes(&self.ephemeral_signature.to_bytes());
        serializer.serialize_bytes(self.proof.as_bytes());
        serializer.serialize_u64(self.expiry_timestamp_secs);
    }
}

impl BcsDeserialize for KeylessSignature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let pk_bytes = deserializer.deserialize_bytes()?.to_vec();
        let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
        let proof_bytes = deserializer.deserialize_bytes()?.to_vec();
        let expiry_timestamp_secs = deserializer.deserialize_u64()?;
        let ephemeral_public_key = Ed25519PublicKey::from_bytes(&pk_bytes).map_err(|_| {
            BcsError::InvalidValue {
                type_name: "Ed25519PublicKey",
            }
        })?;
        let ephemeral_signature = Ed25519Signature::from_bytes(&sig_bytes).map_err(|_| {
            BcsError::InvalidValue {
                type_name: "Ed25519Signature",
            }
        })?;
        Ok(Self {
            ephemeral_public_key,
            ephemeral_signature,
            proof: ZkProof::new(proof_bytes),
            expiry_timestamp_secs,
        })
    }
}

/// Current unix time in seconds.
pub(crate) fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
