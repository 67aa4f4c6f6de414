//! Cryptographic key, signature, and hashing support.
//!
//! Each signature scheme lives in its own submodule; the common surface is
//! the [`Signer`]/[`Verifier`]/[`PublicKey`]/[`SignatureBytes`] traits in
//! [`traits`] plus the authentication-key derivation helpers here.

pub mod ed25519;
pub mod hash;
pub mod keyless;
pub mod multi_ed25519;
pub mod multi_key;
pub mod secp256k1;
pub mod traits;

pub use traits::{PublicKey, SignatureBytes, Signer, Verifier};

use crate::crypto::hash::sha3_256_of;
use crate::types::AccountAddress;

/// Authentication key scheme identifier for single-signer Ed25519.
pub const ED25519_SCHEME: u8 = 0;

/// Authentication key scheme identifier for multi-Ed25519.
pub const MULTI_ED25519_SCHEME: u8 = 1;

/// Authentication key scheme identifier for the unified single-key scheme.
pub const SINGLE_KEY_SCHEME: u8 = 2;

/// Authentication key scheme identifier for the unified multi-key scheme.
pub const MULTI_KEY_SCHEME: u8 = 3;

/// Authentication key scheme identifier for keyless accounts.
pub const KEYLESS_SCHEME: u8 = 5;

/// Derives an authentication key: `sha3_256(key_bytes || scheme)`.
///
/// `key_bytes` is the scheme's canonical public-key representation, for
/// example the raw 32 bytes of an Ed25519 key or the concatenated
/// keys-plus-threshold form of a multi-Ed25519 key set.
pub fn derive_authentication_key(key_bytes: &[u8], scheme: u8) -> [u8; 32] {
    sha3_256_of([key_bytes, [scheme].as_slice()])
}

/// Derives the account address for a public key under the given scheme.
///
/// For a fresh account the address equals the authentication key.
pub fn derive_address(key_bytes: &[u8], scheme: u8) -> AccountAddress {
    AccountAddress::new(derive_authentication_key(key_bytes, scheme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ed25519::Ed25519PrivateKey;

    #[test]
    fn test_scheme_byte_changes_auth_key() {
        let key = Ed25519PrivateKey::generate();
        let bytes = key.public_key().to_bytes();
        let ed = derive_authentication_key(&bytes, ED25519_SCHEME);
        let single = derive_authentication_key(&bytes, SINGLE_KEY_SCHEME);
        assert_ne!(ed, single);
    }

    #[test]
    fn test_address_matches_auth_key_for_fresh_account() {
        let key = Ed25519PrivateKey::generate();
        let bytes = key.public_key().to_bytes();
        let auth_key = derive_authentication_key(&bytes, ED25519_SCHEME);
        let address = derive_address(&bytes, ED25519_SCHEME);
        assert_eq!(address.as_bytes(), &auth_key);
    }

    #[test]
    fn test_known_auth_key_vector() {
        // sha3_256 of 32 zero bytes followed by scheme byte 0
        let derived = derive_authentication_key(&[0u8; 32], ED25519_SCHEME);
        let expected = sha3_256_of(&[&[0u8; 33][..]]);
        assert_eq!(derived, expected);
    }
}
