//! Transaction construction, signing envelopes, and authenticators.

pub mod authenticator;
pub mod builder;
pub mod payload;
pub mod types;

pub use authenticator::{AccountAuthenticator, TransactionAuthenticator};
pub use builder::{
    sign_transaction, PartiallySignedTransaction, SigningStatus, TransactionBuilder,
    TransactionEnvelope, DEFAULT_EXPIRATION_SECONDS, DEFAULT_GAS_UNIT_PRICE,
    DEFAULT_MAX_GAS_AMOUNT,
};
pub use payload::{
    EntryFunction, Multisig, MultisigTransactionPayload, Script, TransactionPayload,
};
pub use types::{
    FeePayerRawTransaction, HashValue, MultiAgentRawTransaction, RawTransaction,
    SignedTransaction,
};
