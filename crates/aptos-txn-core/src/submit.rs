//! The submission seam between this crate and a network client.

use crate::transaction::SignedTransaction;
use async_trait::async_trait;
use tracing::debug;

/// Accepts canonical signed-transaction bytes for submission.
///
/// Implementations own the transport (a node API, a gas station, a mempool
/// shim in tests) and return an opaque pending handle such as a transaction
/// hash string. This crate hands over exactly the canonical bytes and never
/// interprets the response.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync + 'static {
    /// Submits signed-transaction bytes, returning an opaque pending handle.
    async fn submit_transaction_bytes(&self, txn_bytes: Vec<u8>) -> anyhow::Result<String>;
}

/// Serializes a signed transaction and hands it to the submitter.
///
/// # Errors
///
/// Whatever the submitter returns, unmodified.
pub async fn submit_transaction(
    submitter: &dyn TransactionSubmitter,
    txn: &SignedTransaction,
) -> anyhow::Result<String> {
    let bytes = txn.to_bytes();
    debug!(
        sender = %txn.sender(),
        sequence_number = txn.sequence_number(),
        num_bytes = bytes.len(),
        "submitting transaction"
    );
    submitter.submit_transaction_bytes(bytes).await
}
