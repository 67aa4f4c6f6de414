//! # Aptos Transaction Core
//!
//! Client-side transaction construction for the Aptos blockchain: the
//! canonical BCS wire codec, the typed Move value model, payload and raw
//! transaction assembly, signing-message derivation, the authenticator
//! schemes, and a concurrency-safe sequence number allocator.
//!
//! Network transport is deliberately out of scope. The crate produces and
//! consumes canonical bytes; the [`submit`] and [`sequence`] modules define
//! the trait seams a network client plugs into.
//!
//! ## Quick start
//!
//! ```rust
//! use aptos_txn_core::crypto::ed25519::Ed25519PrivateKey;
//! use aptos_txn_core::transaction::{sign_transaction, EntryFunction, TransactionBuilder};
//! use aptos_txn_core::types::{AccountAddress, ChainId};
//!
//! # fn main() -> aptos_txn_core::error::CoreResult<()> {
//! let key = Ed25519PrivateKey::generate();
//! let recipient = AccountAddress::from_hex("0xcafe")?;
//!
//! let raw_txn = TransactionBuilder::new()
//!     .sender(AccountAddress::ONE)
//!     .sequence_number(0)
//!     .payload(EntryFunction::apt_transfer(recipient, 1_000)?.into())
//!     .chain_id(ChainId::Testnet)
//!     .build()?;
//!
//! let signed = sign_transaction(raw_txn, &key)?;
//! let wire_bytes = signed.to_bytes();
//! # let _ = wire_bytes;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`bcs`] - Canonical binary serialization (strict decode)
//! - [`values`] - Typed Move values and JSON argument coercion
//! - [`crypto`] - Signature schemes and authentication key derivation
//! - [`transaction`] - Payloads, envelopes, builders, authenticators
//! - [`sequence`] - Per-account sequence number allocation
//! - [`submit`] - The submission seam towards a network client

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod bcs;
pub mod crypto;
pub mod error;
pub mod sequence;
pub mod submit;
pub mod transaction;
pub mod types;
pub mod values;

pub use error::{CoreError, CoreResult};

// Re-export commonly used types
pub use transaction::{HashValue, RawTransaction, SignedTransaction, TransactionBuilder};
pub use types::{AccountAddress, ChainId};
pub use values::MoveValue;
