//! Unified single-key and multi-key scheme.
//!
//! [`AnyPublicKey`] and [`AnySignature`] wrap the concrete schemes behind a
//! variant byte so one account model covers Ed25519, Secp256k1, and keyless
//! material. [`MultiKeyPublicKey`] combines any mix of those into an M-of-N
//! key set with a signer bitmap, and [`MultiKeySigner`] holds a
//! possibly-partial set of the private keys and signs with a chosen subset.

use crate::bcs::{self, BcsDeserialize, BcsSerialize, Deserializer, Serializer};
use crate::crypto::ed25519::{Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
use crate::crypto::keyless::{KeylessPublicKey, KeylessSignature};
use crate::crypto::secp256k1::{Secp256k1PrivateKey, Secp256k1PublicKey, Secp256k1Signature};
use crate::error::{BcsError, CoreError, CoreResult};
use std::fmt;

/// Maximum number of keys in a multi-key key set.
pub const MAX_NUM_OF_KEYS: usize = 32;

/// Minimum signatures-required value.
pub const MIN_SIGNATURES_REQUIRED: u8 = 1;

/// The wire variant index of a unified public key or signature.
///
/// Index 2 is reserved for secp256r1 WebAuthn material, which this crate
/// does not produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnyKeyVariant {
    /// Ed25519 (variant 0)
    Ed25519,
    /// Secp256k1 ECDSA (variant 1)
    Secp256k1,
    /// Keyless (variant 3)
    Keyless,
}

impl AnyKeyVariant {
    /// Returns the wire variant index.
    pub fn index(&self) -> u32 {
        match self {
            Self::Ed25519 => 0,
            Self::Secp256k1 => 1,
            Self::Keyless => 3,
        }
    }

    /// Maps a wire variant index back to a known variant.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Ed25519),
            1 => Some(Self::Secp256k1),
            3 => Some(Self::Keyless),
            _ => None,
        }
    }

    /// A short scheme name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Secp256k1 => "secp256k1",
            Self::Keyless => "keyless",
        }
    }
}

/// A public key of any supported scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyPublicKey {
    /// An Ed25519 public key
    Ed25519(Ed25519PublicKey),
    /// A Secp256k1 public key
    Secp256k1(Secp256k1PublicKey),
    /// A keyless public key
    Keyless(KeylessPublicKey),
}

impl AnyPublicKey {
    /// Returns this key's wire variant.
    pub fn variant(&self) -> AnyKeyVariant {
        match self {
            Self::Ed25519(_) => AnyKeyVariant::Ed25519,
            Self::Secp256k1(_) => AnyKeyVariant::Secp256k1,
            Self::Keyless(_) => AnyKeyVariant::Keyless,
        }
    }

    /// Returns the inner key's byte representation (without the variant).
    pub fn key_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(pk) => pk.to_bytes().to_vec(),
            Self::Secp256k1(pk) => pk.to_bytes(),
            Self::Keyless(pk) => pk.to_bytes(),
        }
    }

    /// Returns true when the signature is valid for the message.
    ///
    /// A signature of a different scheme than this key is simply invalid.
    pub fn verify(&self, message: &[u8], signature: &AnySignature) -> bool {
        match (self, signature) {
            (Self::Ed25519(pk), AnySignature::Ed25519(sig)) => pk.verify(message, sig),
            (Self::Secp256k1(pk), AnySignature::Secp256k1(sig)) => pk.verify(message, sig),
            (Self::Keyless(pk), AnySignature::Keyless(sig)) => {
                // the ephemeral chain carries its own key; the account key
                // only has to be present and structurally valid
                !pk.id_commitment.is_empty() && sig.verify(message)
            }
            _ => false,
        }
    }

    /// Derives the authentication key for a single-key account holding
    /// this key: `sha3_256(bcs(self) || SINGLE_KEY_SCHEME)`.
    pub fn to_authentication_key(&self) -> [u8; 32] {
        crate::crypto::derive_authentication_key(
            &bcs::to_bytes(self),
            crate::crypto::SINGLE_KEY_SCHEME,
        )
    }
}

impl BcsSerialize for AnyPublicKey {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_variant_index(self.variant().index());
        serializer.serialize_bytes(&self.key_bytes());
    }
}

impl BcsDeserialize for AnyPublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let index = deserializer.deserialize_variant_index()?;
        let variant = AnyKeyVariant::from_index(index).ok_or(BcsError::VariantIndexOutOfRange {
            type_name: "AnyPublicKey",
            index,
        })?;
        let key_bytes = deserializer.deserialize_bytes()?.to_vec();
        match variant {
            AnyKeyVariant::Ed25519 => Ed25519PublicKey::from_bytes(&key_bytes)
                .map(Self::Ed25519)
                .map_err(|_| BcsError::InvalidValue {
                    type_name: "Ed25519PublicKey",
                }),
            AnyKeyVariant::Secp256k1 => Secp256k1PublicKey::from_bytes(&key_bytes)
                .map(Self::Secp256k1)
                .map_err(|_| BcsError::InvalidValue {
                    type_name: "Secp256k1PublicKey",
                }),
            AnyKeyVariant::Keyless => {
                bcs::from_bytes::<KeylessPublicKey>(&key_bytes).map(Self::Keyless)
            }
        }
    }
}

/// A signature of any supported scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnySignature {
    /// An Ed25519 signature
    Ed25519(Ed25519Signature),
    /// A Secp256k1 signature
    Secp256k1(Secp256k1Signature),
    /// A keyless signature
    Keyless(KeylessSignature),
}

impl AnySignature {
    /// Returns this signature's wire variant.
    pub fn variant(&self) -> AnyKeyVariant {
        match self {
            Self::Ed25519(_) => AnyKeyVariant::Ed25519,
            Self::Secp256k1(_) => AnyKeyVariant::Secp256k1,
            Self::Keyless(_) => AnyKeyVariant::Keyless,
        }
    }

    fn signature_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(sig) => sig.to_bytes().to_vec(),
            Self::Secp256k1(sig) => sig.to_bytes().to_vec(),
            Self::Keyless(sig) => bcs::to_bytes(sig),
        }
    }
}

impl BcsSerialize for AnySignature {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_variant_index(self.variant().index());
        serializer.serialize_bytes(&self.signature_bytes());
    }
}

impl BcsDeserialize for AnySignature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let index = deserializer.deserialize_variant_index()?;
        let variant = AnyKeyVariant::from_index(index).ok_or(BcsError::VariantIndexOutOfRange {
            type_name: "AnySignature",
            index,
        })?;
        let sig_bytes = deserializer.deserialize_bytes()?.to_vec();
        match variant {
            AnyKeyVariant::Ed25519 => Ed25519Signature::from_bytes(&sig_bytes)
                .map(Self::Ed25519)
                .map_err(|_| BcsError::InvalidValue {
                    type_name: "Ed25519Signature",
                }),
            AnyKeyVariant::Secp256k1 => Secp256k1Signature::from_bytes(&sig_bytes)
                .map(Self::Secp256k1)
                .map_err(|_| BcsError::InvalidValue {
                    type_name: "Secp256k1Signature",
                }),
            AnyKeyVariant::Keyless => {
                bcs::from_bytes::<KeylessSignature>(&sig_bytes).map(Self::Keyless)
            }
        }
    }
}

/// A private key of any signing-capable scheme.
///
/// Keyless accounts sign through an [`crate::crypto::keyless::EphemeralKeyPair`]
/// rather than a long-lived private key, so they have no variant here.
pub enum AnyPrivateKey {
    /// An Ed25519 private key
    Ed25519(Ed25519PrivateKey),
    /// A Secp256k1 private key
    Secp256k1(Secp256k1PrivateKey),
}

impl AnyPrivateKey {
    /// Returns this key's scheme variant.
    pub fn variant(&self) -> AnyKeyVariant {
        match self {
            Self::Ed25519(_) => AnyKeyVariant::Ed25519,
            Self::Secp256k1(_) => AnyKeyVariant::Secp256k1,
        }
    }

    /// Returns the corresponding public key.
    pub fn public_key(&self) -> AnyPublicKey {
        match self {
            Self::Ed25519(sk) => AnyPublicKey::Ed25519(sk.public_key()),
            Self::Secp256k1(sk) => AnyPublicKey::Secp256k1(sk.public_key()),
        }
    }

    /// Signs a message with this key's scheme.
    pub fn sign(&self, message: &[u8]) -> AnySignature {
        match self {
            Self::Ed25519(sk) => AnySignature::Ed25519(sk.sign(message)),
            Self::Secp256k1(sk) => AnySignature::Secp256k1(sk.sign(message)),
        }
    }

    /// Signs a message, first checking that this key is of the expected
    /// scheme.
    ///
    /// # Errors
    ///
    /// [`CoreError::SchemeMismatch`] when the key's scheme differs from
    /// `expected`.
    pub fn sign_with_scheme(
        &self,
        expected: AnyKeyVariant,
        message: &[u8],
    ) -> CoreResult<AnySignature> {
        if self.variant() != expected {
            return Err(CoreError::SchemeMismatch {
                expected: expected.name(),
                actual: self.variant().name(),
            });
        }
        Ok(self.sign(message))
    }
}

impl fmt::Debug for AnyPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519(_) => write!(f, "AnyPrivateKey::Ed25519([REDACTED])"),
            Self::Secp256k1(_) => write!(f, "AnyPrivateKey::Secp256k1([REDACTED])"),
        }
    }
}

/// A multi-key public key: N keys of any scheme with an M-of-N requirement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiKeyPublicKey {
    public_keys: Vec<AnyPublicKey>,
    signatures_required: u8,
}

impl MultiKeyPublicKey {
    /// Creates a new key set.
    ///
    /// # Errors
    ///
    /// Same bounds as multi-Ed25519: 1..=32 keys, requirement at least 1
    /// and at most the key count.
    pub fn new(public_keys: Vec<AnyPublicKey>, signatures_required: u8) -> CoreResult<Self> {
        if public_keys.is_empty() {
            return Err(CoreError::InvalidPublicKey(
                "multi-key requires at least one public key".into(),
            ));
        }
        if public_keys.len() > MAX_NUM_OF_KEYS {
            return Err(CoreError::InvalidPublicKey(format!(
                "multi-key supports at most {} keys, got {}",
                MAX_NUM_OF_KEYS,
                public_keys.len()
            )));
        }
        if signatures_required < MIN_SIGNATURES_REQUIRED {
            return Err(CoreError::InvalidPublicKey(
                "signatures_required must be at least 1".into(),
            ));
        }
        if signatures_required as usize > public_keys.len() {
            return Err(CoreError::InvalidPublicKey(format!(
                "signatures_required {} exceeds number of keys {}",
                signatures_required,
                public_keys.len()
            )));
        }
        Ok(Self {
            public_keys,
            signatures_required,
        })
    }

    /// Returns the number of keys.
    pub fn num_keys(&self) -> usize {
        self.public_keys.len()
    }

    /// Returns the number of signatures required.
    pub fn signatures_required(&self) -> u8 {
        self.signatures_required
    }

    /// Returns the individual keys.
    pub fn public_keys(&self) -> &[AnyPublicKey] {
        &self.public_keys
    }

    /// Derives the authentication key (scheme byte 3 over the canonical
    /// key-set bytes).
    pub fn to_authentication_key(&self) -> [u8; 32] {
        crate::crypto::derive_authentication_key(
            &bcs::to_bytes(self),
            crate::crypto::MULTI_KEY_SCHEME,
        )
    }

    /// Returns true when at least `signatures_required` valid signatures
    /// from distinct in-range signers cover the message.
    pub fn verify(&self, message: &[u8], signature: &MultiKeySignature) -> bool {
        if signature.num_signatures() < self.signatures_required as usize {
            return false;
        }
        signature.signatures().iter().all(|(index, sig)| {
            self.public_keys
                .get(*index as usize)
                .is_some_and(|pk| pk.verify(message, sig))
        })
    }
}

impl BcsSerialize for MultiKeyPublicKey {
    fn serialize(&self, serializer: &mut Serializer) {
        self.public_keys.serialize(serializer);
        serializer.serialize_u8(self.signatures_required);
    }
}

impl BcsDeserialize for MultiKeyPublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let public_keys = Vec::<AnyPublicKey>::deserialize(deserializer)?;
        let signatures_required = deserializer.deserialize_u8()?;
        // bounds re-checked so hostile wire input cannot smuggle an
        // unconstructible key set
        if public_keys.is_empty()
            || public_keys.len() > MAX_NUM_OF_KEYS
            || signatures_required < MIN_SIGNATURES_REQUIRED
            || signatures_required as usize > public_keys.len()
        {
            return Err(BcsError::InvalidValue {
                type_name: "MultiKeyPublicKey",
            });
        }
        Ok(Self {
            public_keys,
            signatures_required,
        })
    }
}

/// A multi-key signature: signatures in ascending signer-index order plus
/// the 4-byte signer bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiKeySignature {
    signatures: Vec<(u8, AnySignature)>,
    bitmap: [u8; 4],
}

impl MultiKeySignature {
    /// Creates a signature from `(signer_index, signature)` pairs, sorting
    /// them ascending by index.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateSignerIndex`] and
    /// [`CoreError::SignerIndexOutOfRange`] on bad indices, and an
    /// insufficient-signatures error for an empty set.
    pub fn new(mut signatures: Vec<(u8, AnySignature)>) -> CoreResult<Self> {
        if signatures.is_empty() {
            return Err(CoreError::InsufficientSignatures {
                required: 1,
                provided: 0,
            });
        }

        signatures.sort_by_key(|(index, _)| *index);

        let mut bitmap = [0u8; 4];
        let mut last_index: Option<u8> = None;
        for (index, _) in &signatures {
            if *index as usize >= MAX_NUM_OF_KEYS {
                return Err(CoreError::SignerIndexOutOfRange {
                    index: *index,
                    num_keys: MAX_NUM_OF_KEYS,
                });
            }
            if last_index == Some(*index) {
                return Err(CoreError::DuplicateSignerIndex(*index));
            }
            last_index = Some(*index);
            bitmap[(index / 8) as usize] |= 1 << (index % 8);
        }

        Ok(Self { signatures, bitmap })
    }

    /// Returns the number of signatures.
    pub fn num_signatures(&self) -> usize {
        self.signatures.len()
    }

    /// Returns the signatures in ascending index order.
    pub fn signatures(&self) -> &[(u8, AnySignature)] {
        &self.signatures
    }

    /// Returns the signer bitmap.
    pub fn bitmap(&self) -> &[u8; 4] {
        &self.bitmap
    }

    /// Returns true when the given signer index contributed a signature.
    pub fn has_signature(&self, index: u8) -> bool {
        if index as usize >= MAX_NUM_OF_KEYS {
            return false;
        }
        (self.bitmap[(index / 8) as usize] >> (index % 8)) & 1 == 1
    }
}

impl BcsSerialize for MultiKeySignature {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.serialize_uleb128(self.signatures.len() as u32);
        for (_, sig) in &self.signatures {
            sig.serialize(serializer);
        }
        serializer.serialize_fixed_bytes(&self.bitmap);
    }
}

impl BcsDeserialize for MultiKeySignature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, BcsError> {
        let count = deserializer.deserialize_uleb128()? as usize;
        let mut raw = Vec::with_capacity(count.min(MAX_NUM_OF_KEYS));
        for _ in 0..count {
            raw.push(AnySignature::deserialize(deserializer)?);
        }
        let bitmap: [u8; 4] = <[u8; 4]>::deserialize(deserializer)?;

        // recover signer indices from the bitmap, in ascending bit order
        let mut indices = Vec::with_capacity(count);
        for bit_pos in 0..(MAX_NUM_OF_KEYS as u8) {
            if (bitmap[(bit_pos / 8) as usize] >> (bit_pos % 8)) & 1 == 1 {
                indices.push(bit_pos);
            }
        }
        if indices.len() != raw.len() {
            return Err(BcsError::InvalidValue {
                type_name: "MultiKeySignature",
            });
        }
        let signatures = indices.into_iter().zip(raw).collect();
        Ok(Self { signatures, bitmap })
    }
}

/// Holds a (possibly partial) set of the private keys behind a
/// [`MultiKeyPublicKey`] and signs with chosen signer indices.
#[derive(Debug)]
pub struct MultiKeySigner {
    private_keys: Vec<(u8, AnyPrivateKey)>,
    public_key: MultiKeyPublicKey,
}

impl MultiKeySigner {
    /// Creates a signer from index-tagged private keys.
    ///
    /// # Errors
    ///
    /// Fails when an index is out of range for the key set or a private
    /// key does not match the public key at its index.
    pub fn new(
        private_keys: Vec<(u8, AnyPrivateKey)>,
        public_key: MultiKeyPublicKey,
    ) -> CoreResult<Self> {
        for (index, private_key) in &private_keys {
            let expected = public_key.public_keys().get(*index as usize).ok_or(
                CoreError::SignerIndexOutOfRange {
                    index: *index,
                    num_keys: public_key.num_keys(),
                },
            )?;
            if private_key.public_key() != *expected {
                return Err(CoreError::InvalidPrivateKey(format!(
                    "private key at index {index} does not match the key set"
                )));
            }
        }
        Ok(Self {
            private_keys,
            public_key,
        })
    }

    /// Returns the key set.
    pub fn public_key(&self) -> &MultiKeyPublicKey {
        &self.public_key
    }

    /// Signs a message with the given signer indices.
    ///
    /// The subset may be smaller than the signatures-required value; the
    /// shortfall surfaces at verification or final assembly, not here.
    /// Repeated calls with overlapping subsets each produce an independent
    /// signature set.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateSignerIndex`] on a repeated index,
    /// [`CoreError::SignerIndexOutOfRange`] on an index outside the key
    /// set, an invalid-private-key error when this signer does not hold
    /// the key for a requested index, and an insufficient-signatures error
    /// for an empty subset.
    pub fn sign_subset(&self, indices: &[u8], message: &[u8]) -> CoreResult<MultiKeySignature> {
        let mut seen = [false; MAX_NUM_OF_KEYS];
        let mut signatures = Vec::with_capacity(indices.len());
        for &index in indices {
            if index as usize >= self.public_key.num_keys() {
                return Err(CoreError::SignerIndexOutOfRange {
                    index,
                    num_keys: self.public_key.num_keys(),
                });
            }
            if seen[index as usize] {
                return Err(CoreError::DuplicateSignerIndex(index));
            }
            seen[index as usize] = true;

            let private_key = self
                .private_keys
                .iter()
                .find(|(held, _)| *held == index)
                .map(|(_, key)| key)
                .ok_or_else(|| {
                    CoreError::InvalidPrivateKey(format!(
                        "no private key held for signer index {index}"
                    ))
                })?;
            signatures.push((index, private_key.sign(message)));
        }
        MultiKeySignature::new(signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_key_signer() -> MultiKeySigner {
        let ed = Ed25519PrivateKey::generate();
        let k1 = Secp256k1PrivateKey::generate();
        let ed2 = Ed25519PrivateKey::generate();
        let public_key = MultiKeyPublicKey::new(
            vec![
                AnyPublicKey::Ed25519(ed.public_key()),
                AnyPublicKey::Secp256k1(k1.public_key()),
                AnyPublicKey::Ed25519(ed2.public_key()),
            ],
            2,
        )
        .unwrap();
        MultiKeySigner::new(
            vec![
                (0, AnyPrivateKey::Ed25519(ed)),
                (1, AnyPrivateKey::Secp256k1(k1)),
                (2, AnyPrivateKey::Ed25519(ed2)),
            ],
            public_key,
        )
        .unwrap()
    }

    #[test]
    fn test_any_public_key_wire_layout() {
        let ed = Ed25519PrivateKey::generate();
        let pk = AnyPublicKey::Ed25519(ed.public_key());
        let encoded = bcs::to_bytes(&pk);
        // variant 0, uleb length 32, then the raw key
        assert_eq!(encoded[0], 0);
        assert_eq!(encoded[1], 32);
        assert_eq!(encoded.len(), 34);
        assert_eq!(bcs::from_bytes::<AnyPublicKey>(&encoded).unwrap(), pk);

        let k1 = Secp256k1PrivateKey::generate();
        let pk = AnyPublicKey::Secp256k1(k1.public_key());
        let encoded = bcs::to_bytes(&pk);
        assert_eq!(encoded[0], 1);
        assert_eq!(encoded[1], 33);
    }

    #[test]
    fn test_any_key_reserved_variant_rejected() {
        // variant 2 (secp256r1) is not produced or accepted here
        let err = bcs::from_bytes::<AnyPublicKey>(&[2, 1, 0xaa]).unwrap_err();
        assert!(matches!(err, BcsError::VariantIndexOutOfRange { index: 2, .. }));
    }

    #[test]
    fn test_cross_scheme_verify_is_false() {
        let ed = Ed25519PrivateKey::generate();
        let k1 = Secp256k1PrivateKey::generate();
        let message = b"msg";
        let ed_sig = AnySignature::Ed25519(ed.sign(message));
        let k1_pk = AnyPublicKey::Secp256k1(k1.public_key());
        assert!(!k1_pk.verify(message, &ed_sig));
    }

    #[test]
    fn test_sign_with_scheme_mismatch() {
        let key = AnyPrivateKey::Ed25519(Ed25519PrivateKey::generate());
        let err = key
            .sign_with_scheme(AnyKeyVariant::Secp256k1, b"msg")
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::SchemeMismatch {
                expected: "secp256k1",
                actual: "ed25519"
            }
        ));
        assert!(key.sign_with_scheme(AnyKeyVariant::Ed25519, b"msg").is_ok());
    }

    #[test]
    fn test_sign_subset_and_verify() {
        let signer = three_key_signer();
        let message = b"multi key message";
        let signature = signer.sign_subset(&[0, 2], message).unwrap();
        assert!(signer.public_key().verify(message, &signature));
        assert!(!signer.public_key().verify(b"other", &signature));
        // bitmap bits 0 and 2
        assert_eq!(signature.bitmap(), &[0b0000_0101, 0, 0, 0]);
    }

    #[test]
    fn test_sign_subset_misordered_indices_sorted() {
        let signer = three_key_signer();
        let signature = signer.sign_subset(&[2, 0], b"msg").unwrap();
        let indices: Vec<u8> = signature.signatures().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_sign_subset_duplicate_index() {
        let signer = three_key_signer();
        let err = signer.sign_subset(&[0, 0], b"msg").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSignerIndex(0)));
    }

    #[test]
    fn test_sign_subset_out_of_range() {
        let signer = three_key_signer();
        let err = signer.sign_subset(&[3], b"msg").unwrap_err();
        assert!(matches!(
            err,
            CoreError::SignerIndexOutOfRange {
                index: 3,
                num_keys: 3
            }
        ));
    }

    #[test]
    fn test_below_threshold_subset_signs_but_fails_verify() {
        let signer = three_key_signer();
        let message = b"partial";
        let signature = signer.sign_subset(&[1], message).unwrap();
        assert!(!signer.public_key().verify(message, &signature));
    }

    #[test]
    fn test_overlapping_subsets_are_independent() {
        let signer = three_key_signer();
        let first = signer.sign_subset(&[0, 1], b"msg").unwrap();
        let second = signer.sign_subset(&[1, 2], b"msg").unwrap();
        assert!(first.has_signature(0) && first.has_signature(1));
        assert!(second.has_signature(1) && second.has_signature(2));
    }

    #[test]
    fn test_partial_key_holder() {
        let ed = Ed25519PrivateKey::generate();
        let other = Ed25519PrivateKey::generate();
        let public_key = MultiKeyPublicKey::new(
            vec![
                AnyPublicKey::Ed25519(ed.public_key()),
                AnyPublicKey::Ed25519(other.public_key()),
            ],
            1,
        )
        .unwrap();
        // holds only index 0
        let signer =
            MultiKeySigner::new(vec![(0, AnyPrivateKey::Ed25519(ed))], public_key).unwrap();
        assert!(signer.sign_subset(&[0], b"m").is_ok());
        assert!(matches!(
            signer.sign_subset(&[1], b"m").unwrap_err(),
            CoreError::InvalidPrivateKey(_)
        ));
    }

    #[test]
    fn test_signer_rejects_wrong_private_key() {
        let ed = Ed25519PrivateKey::generate();
        let wrong = Ed25519PrivateKey::generate();
        let public_key =
            MultiKeyPublicKey::new(vec![AnyPublicKey::Ed25519(ed.public_key())], 1).unwrap();
        assert!(MultiKeySigner::new(vec![(0, AnyPrivateKey::Ed25519(wrong))], public_key).is_err());
    }

    #[test]
    fn test_signature_round_trip() {
        let signer = three_key_signer();
        let signature = signer.sign_subset(&[0, 1], b"round trip").unwrap();
        let encoded = bcs::to_bytes(&signature);
        let restored = bcs::from_bytes::<MultiKeySignature>(&encoded).unwrap();
        assert_eq!(restored, signature);
    }

    #[test]
    fn test_public_key_round_trip_and_bounds() {
        let signer = three_key_signer();
        let encoded = bcs::to_bytes(signer.public_key());
        let restored = bcs::from_bytes::<MultiKeyPublicKey>(&encoded).unwrap();
        assert_eq!(&restored, signer.public_key());

        // signatures_required beyond key count rejected on decode
        let mut tampered = encoded.clone();
        let last = tampered.len() - 1;
        tampered[last] = 200;
        assert!(bcs::from_bytes::<MultiKeyPublicKey>(&tampered).is_err());
    }

    #[test]
    fn test_public_key_construction_bounds() {
        let keys: Vec<_> = (0..3)
            .map(|_| AnyPublicKey::Ed25519(Ed25519PrivateKey::generate().public_key()))
            .collect();

        let multi_pk = MultiKeyPublicKey::new(keys.clone(), 2).unwrap();
        assert_eq!(multi_pk.num_keys(), 3);
        assert_eq!(multi_pk.signatures_required(), 2);

        assert!(MultiKeyPublicKey::new(keys.clone(), 4).is_err());
        assert!(MultiKeyPublicKey::new(keys, 0).is_err());
        assert!(MultiKeyPublicKey::new(vec![], 1).is_err());
    }

    #[test]
    fn test_auth_keys_differ_by_scheme() {
        let ed = Ed25519PrivateKey::generate();
        let single = AnyPublicKey::Ed25519(ed.public_key());
        let multi =
            MultiKeyPublicKey::new(vec![AnyPublicKey::Ed25519(ed.public_key())], 1).unwrap();
        assert_ne!(single.to_authentication_key(), multi.to_authentication_key());
    }
}
