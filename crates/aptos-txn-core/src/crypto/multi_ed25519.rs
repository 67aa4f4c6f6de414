//! Multi-Ed25519 threshold signature scheme.
//!
//! M-of-N signatures: a key set with a threshold, and a signature carrying
//! individual Ed25519 signatures plus a 4-byte little-endian bitmap naming
//! the signer indices.

use crate::crypto::ed25519::{
    Ed25519PublicKey, Ed25519Signature, ED25519_PUBLIC_KEY_LENGTH, ED25519_SIGNATURE_LENGTH,
};
use crate::crypto::traits::{PublicKey, SignatureBytes, Verifier};
use crate::error::{CoreError, CoreResult};
use std::fmt;

/// Maximum number of keys in a multi-Ed25519 key set.
pub const MAX_NUM_OF_KEYS: usize = 32;

/// Minimum threshold (at least 1 signature required).
pub const MIN_THRESHOLD: u8 = 1;

/// A multi-Ed25519 public key: N Ed25519 keys with an M-of-N threshold.
#[derive(Clone, PartialEq, Eq)]
pub struct MultiEd25519PublicKey {
    public_keys: Vec<Ed25519PublicKey>,
    threshold: u8,
}

impl MultiEd25519PublicKey {
    /// Creates a new key set.
    ///
    /// # Errors
    ///
    /// Fails when no keys are given, more than 32 keys are given, the
    /// threshold is 0, or the threshold exceeds the key count.
    pub fn new(public_keys: Vec<Ed25519PublicKey>, threshold: u8) -> CoreResult<Self> {
        if public_keys.is_empty() {
            return Err(CoreError::InvalidPublicKey(
                "multi-Ed25519 requires at least one public key".into(),
            ));
        }
        if public_keys.len() > MAX_NUM_OF_KEYS {
            return Err(CoreError::InvalidPublicKey(format!(
                "multi-Ed25519 supports at most {} keys, got {}",
                MAX_NUM_OF_KEYS,
                public_keys.len()
            )));
        }
        if threshold < MIN_THRESHOLD {
            return Err(CoreError::InvalidPublicKey(
                "threshold must be at least 1".into(),
            ));
        }
        if threshold as usize > public_keys.len() {
            return Err(CoreError::InvalidPublicKey(format!(
                "threshold {} exceeds number of keys {}",
                threshold,
                public_keys.len()
            )));
        }
        Ok(Self {
            public_keys,
            threshold,
        })
    }

    /// Returns the number of public keys.
    pub fn num_keys(&self) -> usize {
        self.public_keys.len()
    }

    /// Returns the threshold (M in M-of-N).
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Returns the individual public keys.
    pub fn public_keys(&self) -> &[Ed25519PublicKey] {
        &self.public_keys
    }

    /// Serializes to `pk_1 || pk_2 || ... || pk_n || threshold`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.public_keys.len() * ED25519_PUBLIC_KEY_LENGTH + 1);
        for pk in &self.public_keys {
            bytes.extend_from_slice(&pk.to_bytes());
        }
        bytes.push(self.threshold);
        bytes
    }

    /// Parses a key set from its packed byte form.
    ///
    /// # Errors
    ///
    /// Fails on truncated input, a key-section length that is not a
    /// multiple of 32, an invalid key, or invalid threshold bounds.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() < ED25519_PUBLIC_KEY_LENGTH + 1 {
            return Err(CoreError::InvalidPublicKey(format!(
                "bytes too short: {} bytes",
                bytes.len()
            )));
        }

        let threshold = bytes[bytes.len() - 1];
        let key_bytes = &bytes[..bytes.len() - 1];
        if key_bytes.len() % ED25519_PUBLIC_KEY_LENGTH != 0 {
            return Err(CoreError::InvalidPublicKey(format!(
                "key bytes length {} is not a multiple of {}",
                key_bytes.len(),
                ED25519_PUBLIC_KEY_LENGTH
            )));
        }

        let public_keys = key_bytes
            .chunks_exact(ED25519_PUBLIC_KEY_LENGTH)
            .map(Ed25519PublicKey::from_bytes)
            .collect::<CoreResult<Vec<_>>>()?;
        Self::new(public_keys, threshold)
    }

    /// Returns true when at least `threshold` valid signatures from
    /// distinct in-range signers cover the message.
    pub fn verify(&self, message: &[u8], signature: &MultiEd25519Signature) -> bool {
        if signature.num_signatures() < self.threshold as usize {
            return false;
        }
        signature.signatures().iter().all(|(index, sig)| {
            self.public_keys
                .get(*index as usize)
                .is_some_and(|pk| pk.verify(message, sig))
        })
    }
}

impl PublicKey for MultiEd25519PublicKey {
    const LENGTH: usize = 0; // variable length

    fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        MultiEd25519PublicKey::from_bytes(bytes)
    }

    fn to_bytes(&self) -> Vec<u8> {
        MultiEd25519PublicKey::to_bytes(self)
    }
}

impl Verifier for MultiEd25519PublicKey {
    type Signature = MultiEd25519Signature;

    fn verify(&self, message: &[u8], signature: &MultiEd25519Signature) -> bool {
        MultiEd25519PublicKey::verify(self, message, signature)
    }
}

impl fmt::Debug for MultiEd25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MultiEd25519PublicKey({}-of-{} keys)",
            self.threshold,
            self.public_keys.len()
        )
    }
}

/// A multi-Ed25519 signature: the individual signatures in ascending
/// signer-index order, plus the signer bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct MultiEd25519Signature {
    signatures: Vec<(u8, Ed25519Signature)>,
    bitmap: [u8; 4],
}

impl MultiEd25519Signature {
    /// Creates a signature from `(signer_index, signature)` pairs.
    ///
    /// Pairs may arrive in any order; they are sorted ascending by index.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateSignerIndex`] when an index repeats,
    /// [`CoreError::SignerIndexOutOfRange`] when an index is 32 or more,
    /// and an invalid-signature error for an empty set.
    pub fn new(mut signatures: Vec<(u8, Ed25519Signature)>) -> CoreResult<Self> {
        if signatures.is_empty() {
            return Err(CoreError::InvalidSignature(
                "multi-Ed25519 signature requires at least one signature".into(),
            ));
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

    /// Parses a signature from `sig_1 || ... || sig_m || bitmap`.
    ///
    /// Signer indices are recovered from the bitmap's set bits.
    ///
    /// # Errors
    ///
    /// Fails when the signature section does not match the bitmap's
    /// population count.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() < 4 {
            return Err(CoreError::InvalidSignature("bytes too short".into()));
        }

        let bitmap_start = bytes.len() - 4;
        let mut bitmap = [0u8; 4];
        bitmap.copy_from_slice(&bytes[bitmap_start..]);
        let sig_bytes = &bytes[..bitmap_start];

        let num_sigs = bitmap.iter().map(|b| b.count_ones()).sum::<u32>() as usize;
        if sig_bytes.len() != num_sigs * ED25519_SIGNATURE_LENGTH {
            return Err(CoreError::InvalidSignature(format!(
                "signature bytes length {} doesn't match bitmap with {} set bit(s)",
                sig_bytes.len(),
                num_sigs
            )));
        }

        let mut signatures = Vec::with_capacity(num_sigs);
        let mut sig_index = 0;
        for bit_pos in 0..(MAX_NUM_OF_KEYS as u8) {
            if (bitmap[(bit_pos / 8) as usize] >> (bit_pos % 8)) & 1 == 1 {
                let start = sig_index * ED25519_SIGNATURE_LENGTH;
                let sig =
                    Ed25519Signature::from_bytes(&sig_bytes[start..start + ED25519_SIGNATURE_LENGTH])?;
                signatures.push((bit_pos, sig));
                sig_index += 1;
            }
        }

        Ok(Self { signatures, bitmap })
    }

    /// Serializes to `sig_1 || ... || sig_m || bitmap`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.signatures.len() * ED25519_SIGNATURE_LENGTH + 4);
        for (_, sig) in &self.signatures {
            bytes.extend_from_slice(&sig.to_bytes());
        }
        bytes.extend_from_slice(&self.bitmap);
        bytes
    }

    /// Returns the number of signatures.
    pub fn num_signatures(&self) -> usize {
        self.signatures.len()
    }

    /// Returns the signatures in ascending index order.
    pub fn signatures(&self) -> &[(u8, Ed25519Signature)] {
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

impl SignatureBytes for MultiEd25519Signature {
    type PublicKey = MultiEd25519PublicKey;

    const LENGTH: usize = 0; // variable length

    fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        MultiEd25519Signature::from_bytes(bytes)
    }

    fn to_bytes(&self) -> Vec<u8> {
        MultiEd25519Signature::to_bytes(self)
    }
}

impl fmt::Debug for MultiEd25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MultiEd25519Signature({} signatures, bitmap={:?})",
            self.signatures.len(),
            self.bitmap
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519::Ed25519PrivateKey;

    #[test]
    fn test_public_key_bounds() {
        let keys: Vec<_> = (0..3)
            .map(|_| Ed25519PrivateKey::generate().public_key())
            .collect();

        let multi_pk = MultiEd25519PublicKey::new(keys.clone(), 2).unwrap();
        assert_eq!(multi_pk.num_keys(), 3);
        assert_eq!(multi_pk.threshold(), 2);

        assert!(MultiEd25519PublicKey::new(keys.clone(), 4).is_err());
        assert!(MultiEd25519PublicKey::new(keys, 0).is_err());
        assert!(MultiEd25519PublicKey::new(vec![], 1).is_err());
    }

    #[test]
    fn test_sign_and_verify_threshold() {
        let private_keys: Vec<_> = (0..3).map(|_| Ed25519PrivateKey::generate()).collect();
        let public_keys: Vec<_> = private_keys.iter().map(|k| k.public_key()).collect();
        let multi_pk = MultiEd25519PublicKey::new(public_keys, 2).unwrap();
        let message = b"test message";

        let multi_sig = MultiEd25519Signature::new(vec![
            (0, private_keys[0].sign(message)),
            (2, private_keys[2].sign(message)),
        ])
        .unwrap();

        assert!(multi_pk.verify(message, &multi_sig));
        assert!(!multi_pk.verify(b"wrong message", &multi_sig));

        // below threshold
        let single =
            MultiEd25519Signature::new(vec![(0, private_keys[0].sign(message))]).unwrap();
        assert!(!multi_pk.verify(message, &single));
    }

    #[test]
    fn test_misordered_input_is_sorted() {
        let private_keys: Vec<_> = (0..3).map(|_| Ed25519PrivateKey::generate()).collect();
        let message = b"unordered";

        let multi_sig = MultiEd25519Signature::new(vec![
            (2, private_keys[2].sign(message)),
            (0, private_keys[0].sign(message)),
        ])
        .unwrap();
        let indices: Vec<u8> = multi_sig.signatures().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_duplicate_and_out_of_range_indices() {
        let key = Ed25519PrivateKey::generate();
        let sig = key.sign(b"m");

        let err = MultiEd25519Signature::new(vec![(0, sig), (0, sig)]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSignerIndex(0)));

        let err = MultiEd25519Signature::new(vec![(32, sig)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SignerIndexOutOfRange { index: 32, .. }
        ));
    }

    #[test]
    fn test_bitmap_bits() {
        let private_keys: Vec<_> = (0..5).map(|_| Ed25519PrivateKey::generate()).collect();
        let message = b"test";

        let signatures: Vec<_> = [1u8, 3, 4]
            .iter()
            .map(|&i| (i, private_keys[i as usize].sign(message)))
            .collect();
        let multi_sig = MultiEd25519Signature::new(signatures).unwrap();

        assert!(!multi_sig.has_signature(0));
        assert!(multi_sig.has_signature(1));
        assert!(!multi_sig.has_signature(2));
        assert!(multi_sig.has_signature(3));
        assert!(multi_sig.has_signature(4));
        // bit order inside each byte is little-endian
        assert_eq!(multi_sig.bitmap()[0], 0b0001_1010);
    }

    #[test]
    fn test_trait_surface_round_trips_and_verifies() {
        let private_keys: Vec<_> = (0..3).map(|_| Ed25519PrivateKey::generate()).collect();
        let public_keys: Vec<_> = private_keys.iter().map(|k| k.public_key()).collect();
        let multi_pk = MultiEd25519PublicKey::new(public_keys, 2).unwrap();
        let message = b"trait surface";

        let multi_sig = MultiEd25519Signature::new(vec![
            (0, private_keys[0].sign(message)),
            (1, private_keys[1].sign(message)),
        ])
        .unwrap();

        let restored =
            <MultiEd25519Signature as SignatureBytes>::from_bytes(&SignatureBytes::to_bytes(
                &multi_sig,
            ))
            .unwrap();
        assert!(Verifier::verify(&multi_pk, message, &restored));
    }

    #[test]
    fn test_bytes_round_trips() {
        let private_keys: Vec<_> = (0..3).map(|_| Ed25519PrivateKey::generate()).collect();
        let public_keys: Vec<_> = private_keys.iter().map(|k| k.public_key()).collect();
        let multi_pk = MultiEd25519PublicKey::new(public_keys, 2).unwrap();
        assert_eq!(
            MultiEd25519PublicKey::from_bytes(&multi_pk.to_bytes())
                .unwrap()
                .to_bytes(),
            multi_pk.to_bytes()
        );

        let multi_sig = MultiEd25519Signature::new(vec![
            (0, private_keys[0].sign(b"t")),
            (2, private_keys[2].sign(b"t")),
        ])
        .unwrap();
        let restored = MultiEd25519Signature::from_bytes(&multi_sig.to_bytes()).unwrap();
        assert_eq!(restored.bitmap(), multi_sig.bitmap());
        assert_eq!(restored.num_signatures(), 2);
    }
}
