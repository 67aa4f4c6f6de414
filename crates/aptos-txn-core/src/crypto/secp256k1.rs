//! Secp256k1 ECDSA signature scheme.
//!
//! Messages are prehashed with SHA2-256 before signing. Public keys use
//! the 33-byte compressed SEC1 encoding on the wire.

use crate::crypto::hash::sha2_256;
use crate::crypto::traits::{PublicKey, SignatureBytes, Signer, Verifier};
use crate::error::{CoreError, CoreResult};
use k256::ecdsa::{
    signature::Signer as K256Signer, signature::Verifier as K256Verifier,
    Signature as K256Signature, SigningKey, VerifyingKey,
};
use std::fmt;
use zeroize::Zeroize;

/// Secp256k1 private key length in bytes.
pub const SECP256K1_PRIVATE_KEY_LENGTH: usize = 32;
/// Secp256k1 compressed public key length in bytes.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;
/// Secp256k1 signature length in bytes (fixed r || s).
pub const SECP256K1_SIGNATURE_LENGTH: usize = 64;

/// A Secp256k1 ECDSA private key, zeroized on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Secp256k1PrivateKey {
    #[zeroize(skip)] // SigningKey zeroizes itself on drop
    inner: SigningKey,
}

impl Secp256k1PrivateKey {
    /// Generates a new random private key.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Creates a private key from raw bytes.
    ///
    /// # Errors
    ///
    /// Fails on wrong length or a scalar outside the curve order.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != SECP256K1_PRIVATE_KEY_LENGTH {
            return Err(CoreError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                SECP256K1_PRIVATE_KEY_LENGTH,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| CoreError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { inner: signing_key })
    }

    /// Creates a private key from a hex string.
    ///
    /// # Errors
    ///
    /// Fails on malformed hex or an invalid scalar.
    pub fn from_hex(hex_str: &str) -> CoreResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the private key as bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; SECP256K1_PRIVATE_KEY_LENGTH] {
        self.inner.to_bytes().into()
    }

    /// Returns the corresponding public key.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Signs a message, prehashing it with SHA2-256.
    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        let hash = sha2_256(message);
        let signature: K256Signature = self.inner.sign(&hash);
        Secp256k1Signature { inner: signature }
    }
}

impl Signer for Secp256k1PrivateKey {
    type Signature = Secp256k1Signature;

    fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        Secp256k1PrivateKey::sign(self, message)
    }

    fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PrivateKey::public_key(self)
    }
}

impl fmt::Debug for Secp256k1PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PrivateKey([REDACTED])")
    }
}

/// A Secp256k1 ECDSA public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1PublicKey {
    inner: VerifyingKey,
}

impl Secp256k1PublicKey {
    /// Creates a public key from SEC1 bytes (compressed or uncompressed).
    ///
    /// # Errors
    ///
    /// Fails when the bytes do not encode a curve point.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(CoreError::invalid_public_key)?;
        Ok(Self {
            inner: verifying_key,
        })
    }

    /// Creates a public key from a hex string.
    ///
    /// # Errors
    ///
    /// Fails on malformed hex or an invalid point.
    pub fn from_hex(hex_str: &str) -> CoreResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the public key as compressed bytes (33 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_sec1_bytes().to_vec()
    }

    /// Returns the public key as a hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Returns true when the signature is valid for the message.
    pub fn verify(&self, message: &[u8], signature: &Secp256k1Signature) -> bool {
        let hash = sha2_256(message);
        self.inner.verify(&hash, &signature.inner).is_ok()
    }
}

impl PublicKey for Secp256k1PublicKey {
    const LENGTH: usize = SECP256K1_PUBLIC_KEY_LENGTH;

    fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        Secp256k1PublicKey::from_bytes(bytes)
    }

    fn to_bytes(&self) -> Vec<u8> {
        Secp256k1PublicKey::to_bytes(self)
    }
}

impl Verifier for Secp256k1PublicKey {
    type Signature = Secp256k1Signature;

    fn verify(&self, message: &[u8], signature: &Secp256k1Signature) -> bool {
        Secp256k1PublicKey::verify(self, message, signature)
    }
}

impl fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PublicKey({})", self.to_hex())
    }
}

/// A Secp256k1 ECDSA signature in fixed 64-byte `r || s` form.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1Signature {
    inner: K256Signature,
}

impl Secp256k1Signature {
    /// Creates a signature from 64 raw bytes.
    ///
    /// # Errors
    ///
    /// Fails on wrong length or out-of-range scalars.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != SECP256K1_SIGNATURE_LENGTH {
            return Err(CoreError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SECP256K1_SIGNATURE_LENGTH,
                bytes.len()
            )));
        }
        let signature =
            K256Signature::from_slice(bytes).map_err(CoreError::invalid_signature)?;
        Ok(Self { inner: signature })
    }

    /// Returns the signature as bytes.
    pub fn to_bytes(&self) -> [u8; SECP256K1_SIGNATURE_LENGTH] {
        self.inner.to_bytes().into()
    }

    /// Returns the signature as a hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl SignatureBytes for Secp256k1Signature {
    type PublicKey = Secp256k1PublicKey;
    const LENGTH: usize = SECP256K1_SIGNATURE_LENGTH;

    fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        Secp256k1Signature::from_bytes(bytes)
    }

    fn to_bytes(&self) -> Vec<u8> {
        Secp256k1Signature::to_bytes(self).to_vec()
    }
}

impl fmt::Debug for Secp256k1Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1Signature({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let private_key = Secp256k1PrivateKey::generate();
        let message = b"hello world";
        let signature = private_key.sign(message);
        assert!(private_key.public_key().verify(message, &signature));
        assert!(!private_key.public_key().verify(b"other", &signature));
    }

    #[test]
    fn test_key_round_trip() {
        let private_key = Secp256k1PrivateKey::generate();
        let restored = Secp256k1PrivateKey::from_bytes(&private_key.to_bytes()).unwrap();
        assert_eq!(private_key.to_bytes(), restored.to_bytes());

        let public_key = private_key.public_key();
        assert_eq!(public_key.to_bytes().len(), SECP256K1_PUBLIC_KEY_LENGTH);
        let restored = Secp256k1PublicKey::from_bytes(&public_key.to_bytes()).unwrap();
        assert_eq!(public_key, restored);
    }

    #[test]
    fn test_signature_round_trip() {
        let private_key = Secp256k1PrivateKey::generate();
        let signature = private_key.sign(b"message");
        let restored = Secp256k1Signature::from_bytes(&signature.to_bytes()).unwrap();
        assert_eq!(signature, restored);
    }

    #[test]
    fn test_invalid_material_rejected() {
        assert!(Secp256k1PrivateKey::from_bytes(&[0u8; 31]).is_err());
        // all-zero scalar is outside the valid range
        assert!(Secp256k1PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(Secp256k1PublicKey::from_bytes(&[0u8; 33]).is_err());
        assert!(Secp256k1Signature::from_bytes(&[1u8; 10]).is_err());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let private_key = Secp256k1PrivateKey::generate();
        assert!(format!("{private_key:?}").contains("REDACTED"));
    }
}
