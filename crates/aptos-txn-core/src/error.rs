//! Error types for the transaction core.
//!
//! This module provides a unified error type [`CoreError`] covering every
//! failure the crate can produce, plus [`BcsError`] for the canonical codec.
//! Signature verification mismatches are *not* errors: `verify` methods
//! return `bool`, and only structural or invariant problems surface here.

use std::fmt;
use thiserror::Error;

/// A specialized Result type for transaction core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the canonical serialization codec.
///
/// Every decoding failure names the exact structural problem so callers can
/// distinguish truncated input from non-canonical input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BcsError {
    /// The input ended before the value was fully decoded.
    #[error("unexpected end of input: needed {needed} more byte(s) at offset {offset}")]
    TruncatedInput {
        /// Byte offset at which the shortfall was detected
        offset: usize,
        /// How many more bytes were required
        needed: usize,
    },

    /// A boolean byte was neither 0x00 nor 0x01.
    #[error("invalid boolean byte 0x{0:02x}: must be 0x00 or 0x01")]
    InvalidBoolByte(u8),

    /// A uleb128 value overflowed or used a non-minimal encoding.
    #[error("invalid uleb128 at offset {offset}: {reason}")]
    InvalidUleb128 {
        /// Byte offset of the first uleb128 byte
        offset: usize,
        /// What was wrong with the encoding
        reason: &'static str,
    },

    /// An enum variant index had no corresponding variant.
    #[error("variant index {index} out of range for {type_name}")]
    VariantIndexOutOfRange {
        /// The enum being decoded
        type_name: &'static str,
        /// The index that was read
        index: u32,
    },

    /// A decoded string was not valid UTF-8.
    #[error("string is not valid UTF-8")]
    NonUtf8String,

    /// Bytes decoded structurally but do not form a valid value.
    #[error("decoded bytes do not form a valid {type_name}")]
    InvalidValue {
        /// The type being decoded
        type_name: &'static str,
    },

    /// Decoding succeeded but left unconsumed bytes.
    #[error("{0} byte(s) of trailing input after decoded value")]
    RemainingInput(usize),
}

/// The main error type for the transaction core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error occurred during canonical serialization/deserialization
    #[error("BCS error: {0}")]
    Bcs(#[from] BcsError),

    /// Error occurred during JSON handling of loosely-typed input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Invalid account address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Invalid module or struct identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A key or signature was used with the wrong signature scheme
    #[error("Scheme mismatch: expected {expected}, got {actual}")]
    SchemeMismatch {
        /// The scheme the operation required
        expected: &'static str,
        /// The scheme of the value actually supplied
        actual: &'static str,
    },

    /// A loosely-typed argument did not match its declared type
    #[error("Argument type mismatch: expected {expected}, got {actual}")]
    ArgumentTypeMismatch {
        /// The declared type of the argument
        expected: String,
        /// A description of the value that was supplied
        actual: String,
    },

    /// An optional argument was supplied with more than one element
    #[error("Ambiguous option input: expected at most one element, got {0}")]
    AmbiguousOptionInput(usize),

    /// A multi-signature signer index appeared more than once
    #[error("Duplicate signer index {0}")]
    DuplicateSignerIndex(u8),

    /// A multi-signature signer index exceeded the key count
    #[error("Signer index {index} out of range: only {num_keys} key(s)")]
    SignerIndexOutOfRange {
        /// The offending index
        index: u8,
        /// Number of keys in the key set
        num_keys: usize,
    },

    /// Insufficient signatures for a threshold signature
    #[error("Insufficient signatures: need {required}, got {provided}")]
    InsufficientSignatures {
        /// Number of signatures required
        required: usize,
        /// Number of signatures provided
        provided: usize,
    },

    /// A signing session was finalized before all required signers signed
    #[error("Transaction is not fully signed: missing {0}")]
    NotFullySigned(String),

    /// Transaction building error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Sequence number synchronization did not converge in time
    #[error("Synchronization timed out after {attempts} attempt(s)")]
    SynchronizationTimeout {
        /// How many reconcile attempts were made
        attempts: u32,
    },

    /// An external collaborator (node, prover, submitter) failed
    #[error("{0}")]
    External(#[from] anyhow::Error),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &["private_key", "secret", "password", "seed"];

impl CoreError {
    /// Creates a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a new invalid-public-key error
    pub fn invalid_public_key<E: fmt::Display>(err: E) -> Self {
        Self::InvalidPublicKey(err.to_string())
    }

    /// Creates a new invalid-signature error
    pub fn invalid_signature<E: fmt::Display>(err: E) -> Self {
        Self::InvalidSignature(err.to_string())
    }

    /// Returns true if this is a timeout that might succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SynchronizationTimeout { .. })
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Removes control characters, truncates very long messages, and redacts
    /// patterns that might indicate sensitive information.
    pub fn sanitized_message(&self) -> String {
        let raw_message = self.to_string();
        Self::sanitize_string(&raw_message)
    }

    /// Sanitizes a string for safe logging.
    fn sanitize_string(s: &str) -> String {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        for pattern in SENSITIVE_PATTERNS {
            if lower.contains(pattern) {
                return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
            }
        }

        if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
            format!(
                "{}... [truncated, total length: {}]",
                &cleaned[..MAX_ERROR_MESSAGE_LENGTH],
                cleaned.len()
            )
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcs_error_display() {
        let err = BcsError::TruncatedInput {
            offset: 4,
            needed: 8,
        };
        assert!(err.to_string().contains("offset 4"));
        assert!(err.to_string().contains("8 more"));

        let err = BcsError::InvalidBoolByte(0x02);
        assert!(err.to_string().contains("0x02"));

        let err = BcsError::VariantIndexOutOfRange {
            type_name: "TransactionPayload",
            index: 9,
        };
        assert!(err.to_string().contains("TransactionPayload"));
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_core_wraps_bcs() {
        let err = CoreError::from(BcsError::RemainingInput(3));
        assert!(matches!(err, CoreError::Bcs(_)));
        assert!(err.to_string().contains("trailing input"));
    }

    #[test]
    fn test_scheme_mismatch_display() {
        let err = CoreError::SchemeMismatch {
            expected: "ed25519",
            actual: "secp256k1",
        };
        assert_eq!(
            err.to_string(),
            "Scheme mismatch: expected ed25519, got secp256k1"
        );
    }

    #[test]
    fn test_insufficient_signatures() {
        let err = CoreError::InsufficientSignatures {
            required: 3,
            provided: 1,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('1'));
    }

    #[test]
    fn test_is_retryable() {
        assert!(CoreError::SynchronizationTimeout { attempts: 5 }.is_retryable());
        assert!(!CoreError::DuplicateSignerIndex(0).is_retryable());
    }

    #[test]
    fn test_sanitized_message_redacts_sensitive_patterns() {
        let err = CoreError::InvalidPrivateKey("private_key: abc123".to_string());
        let sanitized = err.sanitized_message();
        assert!(sanitized.contains("REDACTED"));
        assert!(!sanitized.contains("abc123"));
    }

    #[test]
    fn test_sanitized_message_truncates_long_messages() {
        let long_message = "x".repeat(2000);
        let err = CoreError::Transaction(long_message);
        let sanitized = err.sanitized_message();
        assert!(sanitized.len() < 1200);
        assert!(sanitized.contains("truncated"));
    }
}
