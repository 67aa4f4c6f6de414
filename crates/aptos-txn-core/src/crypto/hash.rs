//! Hash functions and domain-separated signing messages.

use sha2::Digest;

/// Computes the SHA2-256 hash of the input.
///
/// Used for Secp256k1 ECDSA message prehashing.
pub fn sha2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = sha2::Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes the SHA3-256 hash of the input.
///
/// Used for signing-message prefixes, transaction hashes, and
/// authentication key derivation.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = sha3::Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes the SHA3-256 hash of multiple byte slices.
pub fn sha3_256_of<I, T>(items: I) -> [u8; 32]
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = sha3::Sha3_256::new();
    for item in items {
        hasher.update(item.as_ref());
    }
    hasher.finalize().into()
}

/// Builds a domain-separated signing message.
///
/// The message is `sha3_256("APTOS::{domain}") || payload`: the prefix is
/// the hash of the domain string, and the payload is appended unhashed.
/// Distinct domains therefore can never produce colliding messages.
pub fn signing_message(domain: &str, payload: &[u8]) -> Vec<u8> {
    let prefix = sha3_256(format!("APTOS::{domain}").as_bytes());
    let mut message = Vec::with_capacity(prefix.len() + payload.len());
    message.extend_from_slice(&prefix);
    message.extend_from_slice(payload);
    message
}
