//! Cryptographic traits.
//!
//! A unified surface over the signature schemes. Verification returns
//! `bool`: a mismatched signature is an outcome, not an error. Only
//! structurally invalid material (wrong lengths, off-curve points) errors.

use crate::error::CoreResult;

/// A trait for types that can sign messages.
pub trait Signer {
    /// The signature type produced by this signer.
    type Signature: SignatureBytes;

    /// Signs the given message and returns a signature.
    fn sign(&self, message: &[u8]) -> Self::Signature;

    /// Returns the public key corresponding to this signer.
    fn public_key(&self) -> <Self::Signature as SignatureBytes>::PublicKey;
}

/// A trait for types that can verify signatures.
pub trait Verifier {
    /// The signature type this verifier can check.
    type Signature: SignatureBytes;

    /// Returns true when the signature is valid for the message.
    fn verify(&self, message: &[u8], signature: &Self::Signature) -> bool;
}

/// A trait for public key types.
pub trait PublicKey: Clone + Sized {
    /// The length of the public key in bytes.
    const LENGTH: usize;

    /// Creates a public key from bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are the wrong length or not a valid key.
    fn from_bytes(bytes: &[u8]) -> CoreResult<Self>;

    /// Returns the public key as bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Returns the public key as a hex string with 0x prefix.
    fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// A trait for signature types.
pub trait SignatureBytes: Clone + Sized {
    /// The public key type for this signature scheme.
    type PublicKey: PublicKey;

    /// The length of the signature in bytes.
    const LENGTH: usize;

    /// Creates a signature from bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are the wrong length or not a valid signature.
    fn from_bytes(bytes: &[u8]) -> CoreResult<Self>;

    /// Returns the signature as bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Returns the signature as a hex string with 0x prefix.
    fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}
