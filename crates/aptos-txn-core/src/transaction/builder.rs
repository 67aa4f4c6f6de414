//! Transaction building and signature collection.

use crate::crypto::ed25519::Ed25519PrivateKey;
use crate::error::{CoreError, CoreResult};
use crate::sequence::SequenceNumberAllocator;
use crate::transaction::authenticator::{AccountAuthenticator, TransactionAuthenticator};
use crate::transaction::payload::TransactionPayload;
use crate::transaction::types::{
    FeePayerRawTransaction, MultiAgentRawTransaction, RawTransaction, SignedTransaction,
};
use crate::types::{AccountAddress, ChainId};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Default maximum gas amount.
pub const DEFAULT_MAX_GAS_AMOUNT: u64 = 200_000;
/// Default gas unit price in octas.
pub const DEFAULT_GAS_UNIT_PRICE: u64 = 100;
/// Default transaction expiration time in seconds.
pub const DEFAULT_EXPIRATION_SECONDS: u64 = 600; // 10 minutes

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A builder for constructing raw transactions.
///
/// # Example
///
/// ```rust
/// use aptos_txn_core::transaction::{EntryFunction, TransactionBuilder};
/// use aptos_txn_core::types::{AccountAddress, ChainId};
///
/// let payload = EntryFunction::apt_transfer(
///     AccountAddress::from_hex("0x123").unwrap(),
///     1000,
/// ).unwrap();
///
/// let txn = TransactionBuilder::new()
///     .sender(AccountAddress::ONE)
///     .sequence_number(0)
///     .payload(payload.into())
///     .chain_id(ChainId::Testnet)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: Option<AccountAddress>,
    sequence_number: Option<u64>,
    payload: Option<TransactionPayload>,
    max_gas_amount: u64,
    gas_unit_price: u64,
    expiration_timestamp_secs: Option<u64>,
    chain_id: Option<ChainId>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    /// Creates a new transaction builder with default gas values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: None,
            sequence_number: None,
            payload: None,
            max_gas_amount: DEFAULT_MAX_GAS_AMOUNT,
            gas_unit_price: DEFAULT_GAS_UNIT_PRICE,
            expiration_timestamp_secs: None,
            chain_id: None,
        }
    }

    /// Sets the sender address.
    #[must_use]
    pub fn sender(mut self, sender: AccountAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Sets the sequence number.
    #[must_use]
    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Sets the transaction payload.
    #[must_use]
    pub fn payload(mut self, payload: TransactionPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the maximum gas amount.
    #[must_use]
    pub fn max_gas_amount(mut self, max_gas_amount: u64) -> Self {
        self.max_gas_amount = max_gas_amount;
        self
    }

    /// Sets the gas unit price in octas.
    #[must_use]
    pub fn gas_unit_price(mut self, gas_unit_price: u64) -> Self {
        self.gas_unit_price = gas_unit_price;
        self
    }

    /// Sets the expiration timestamp in seconds since Unix epoch.
    #[must_use]
    pub fn expiration_timestamp_secs(mut self, expiration_timestamp_secs: u64) -> Self {
        self.expiration_timestamp_secs = Some(expiration_timestamp_secs);
        self
    }

    /// Sets the expiration time relative to now, saturating on overflow.
    #[must_use]
    pub fn expiration_from_now(mut self, seconds: u64) -> Self {
        self.expiration_timestamp_secs = Some(unix_now_secs().saturating_add(seconds));
        self
    }

    /// Sets the chain ID.
    #[must_use]
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Builds the raw transaction.
    ///
    /// The expiration defaults to now plus [`DEFAULT_EXPIRATION_SECONDS`]
    /// when unset.
    ///
    /// # Errors
    ///
    /// Fails when `sender`, `sequence_number`, `payload`, or `chain_id`
    /// is missing.
    pub fn build(self) -> CoreResult<RawTransaction> {
        let sender = self
            .sender
            .ok_or_else(|| CoreError::transaction("sender is required"))?;
        let sequence_number = self
            .sequence_number
            .ok_or_else(|| CoreError::transaction("sequence_number is required"))?;
        let payload = self
            .payload
            .ok_or_else(|| CoreError::transaction("payload is required"))?;
        let chain_id = self
            .chain_id
            .ok_or_else(|| CoreError::transaction("chain_id is required"))?;

        let expiration_timestamp_secs = self
            .expiration_timestamp_secs
            .unwrap_or_else(|| unix_now_secs().saturating_add(DEFAULT_EXPIRATION_SECONDS));

        Ok(RawTransaction::new(
            sender,
            sequence_number,
            payload,
            self.max_gas_amount,
            self.gas_unit_price,
            expiration_timestamp_secs,
            chain_id,
        ))
    }

    /// Builds the raw transaction, drawing the sequence number from the
    /// allocator when none was set explicitly.
    ///
    /// Concurrent builders sharing one allocator each receive a distinct
    /// number; an explicitly set sequence number is kept as-is.
    ///
    /// # Errors
    ///
    /// Propagates allocator errors and the same missing-field errors as
    /// [`TransactionBuilder::build`].
    pub async fn build_with_allocator(
        mut self,
        allocator: &SequenceNumberAllocator,
    ) -> CoreResult<RawTransaction> {
        if self.sequence_number.is_none() {
            self.sequence_number = Some(allocator.allocate().await?);
        }
        self.build()
    }
}

/// The envelope shape of a transaction under signing.
///
/// Exactly one shape is active per transaction; it determines the signing
/// message and which authenticators [`PartiallySignedTransaction`] requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionEnvelope {
    /// A single-sender transaction.
    Simple(RawTransaction),
    /// A transaction with secondary signers.
    MultiAgent(MultiAgentRawTransaction),
    /// A transaction whose gas a third party pays.
    FeePayer(FeePayerRawTransaction),
}

impl TransactionEnvelope {
    /// Returns the signing message every participant signs.
    pub fn signing_message(&self) -> Vec<u8> {
        match self {
            Self::Simple(txn) => txn.signing_message(),
            Self::MultiAgent(txn) => txn.signing_message(),
            Self::FeePayer(txn) => txn.signing_message(),
        }
    }

    /// Returns the embedded raw transaction.
    pub fn raw_txn(&self) -> &RawTransaction {
        match self {
            Self::Simple(txn) => txn,
            Self::MultiAgent(txn) => &txn.raw_txn,
            Self::FeePayer(txn) => &txn.raw_txn,
        }
    }

    fn num_secondary_signers(&self) -> usize {
        match self {
            Self::Simple(_) => 0,
            Self::MultiAgent(txn) => txn.secondary_signer_addresses.len(),
            Self::FeePayer(txn) => txn.secondary_signer_addresses.len(),
        }
    }

    fn requires_fee_payer(&self) -> bool {
        matches!(self, Self::FeePayer(_))
    }
}

/// How far along signature collection is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningStatus {
    /// No signatures collected yet.
    Unsigned,
    /// Some but not all required signatures collected.
    PartiallySigned,
    /// Every required signature collected.
    FullySigned,
}

/// A transaction under signature collection.
///
/// Collects the sender, secondary-signer, and fee-payer authenticators an
/// envelope requires; it can be handed between parties, and only a fully
/// signed session produces a [`SignedTransaction`].
#[derive(Clone, Debug)]
pub struct PartiallySignedTransaction {
    envelope: TransactionEnvelope,
    sender_auth: Option<AccountAuthenticator>,
    secondary_auths: Vec<Option<AccountAuthenticator>>,
    fee_payer_auth: Option<AccountAuthenticator>,
}

impl PartiallySignedTransaction {
    /// Starts signature collection for an envelope.
    pub fn new(envelope: TransactionEnvelope) -> Self {
        let num_secondary = envelope.num_secondary_signers();
        Self {
            envelope,
            sender_auth: None,
            secondary_auths: vec![None; num_secondary],
            fee_payer_auth: None,
        }
    }

    /// Returns the envelope under signing.
    pub fn envelope(&self) -> &TransactionEnvelope {
        &self.envelope
    }

    /// Returns the message every participant must sign.
    pub fn signing_message(&self) -> Vec<u8> {
        self.envelope.signing_message()
    }

    /// Records the sender's authenticator.
    pub fn add_sender(&mut self, authenticator: AccountAuthenticator) {
        debug!(sender = %self.envelope.raw_txn().sender, "sender signature collected");
        self.sender_auth = Some(authenticator);
    }

    /// Records a secondary signer's authenticator at its address index.
    ///
    /// # Errors
    ///
    /// Fails when the index is outside the envelope's secondary signer
    /// list.
    pub fn add_secondary(
        &mut self,
        index: usize,
        authenticator: AccountAuthenticator,
    ) -> CoreResult<()> {
        if index >= self.secondary_auths.len() {
            return Err(CoreError::transaction(format!(
                "secondary signer index {} out of bounds (max {})",
                index,
                self.secondary_auths.len()
            )));
        }
        debug!(index, "secondary signature collected");
        self.secondary_auths[index] = Some(authenticator);
        Ok(())
    }

    /// Records the fee payer's authenticator.
    ///
    /// # Errors
    ///
    /// Fails when the envelope has no fee payer.
    pub fn add_fee_payer(&mut self, authenticator: AccountAuthenticator) -> CoreResult<()> {
        if !self.envelope.requires_fee_payer() {
            return Err(CoreError::transaction(
                "envelope has no fee payer to sign for",
            ));
        }
        debug!("fee payer signature collected");
        self.fee_payer_auth = Some(authenticator);
        Ok(())
    }

    /// Signs as the sender with an Ed25519 key.
    pub fn sign_sender_ed25519(&mut self, key: &Ed25519PrivateKey) {
        let signature = key.sign(&self.signing_message());
        self.add_sender(AccountAuthenticator::ed25519(key.public_key(), signature));
    }

    /// Signs as the secondary signer at `index` with an Ed25519 key.
    ///
    /// # Errors
    ///
    /// Fails when the index is outside the envelope's secondary signer
    /// list.
    pub fn sign_secondary_ed25519(
        &mut self,
        index: usize,
        key: &Ed25519PrivateKey,
    ) -> CoreResult<()> {
        let signature = key.sign(&self.signing_message());
        self.add_secondary(
            index,
            AccountAuthenticator::ed25519(key.public_key(), signature),
        )
    }

    /// Signs as the fee payer with an Ed25519 key.
    ///
    /// # Errors
    ///
    /// Fails when the envelope has no fee payer.
    pub fn sign_fee_payer_ed25519(&mut self, key: &Ed25519PrivateKey) -> CoreResult<()> {
        let signature = key.sign(&self.signing_message());
        self.add_fee_payer(AccountAuthenticator::ed25519(key.public_key(), signature))
    }

    fn missing_signers(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.sender_auth.is_none() {
            missing.push("sender".to_string());
        }
        for (index, auth) in self.secondary_auths.iter().enumerate() {
            if auth.is_none() {
                missing.push(format!("secondary signer {index}"));
            }
        }
        if self.envelope.requires_fee_payer() && self.fee_payer_auth.is_none() {
            missing.push("fee payer".to_string());
        }
        missing
    }

    /// Reports how far along signature collection is.
    pub fn status(&self) -> SigningStatus {
        let required = 1
            + self.secondary_auths.len()
            + usize::from(self.envelope.requires_fee_payer());
        let collected = usize::from(self.sender_auth.is_some())
            + self.secondary_auths.iter().filter(|a| a.is_some()).count()
            + usize::from(
                self.envelope.requires_fee_payer() && self.fee_payer_auth.is_some(),
            );
        match collected {
            0 => SigningStatus::Unsigned,
            n if n == required => SigningStatus::FullySigned,
            _ => SigningStatus::PartiallySigned,
        }
    }

    /// Finalizes into a signed transaction.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFullySigned`] naming the missing signers when any
    /// required authenticator is absent. A transaction must never be
    /// submitted partially signed.
    pub fn finish(self) -> CoreResult<SignedTransaction> {
        let missing = self.missing_signers();
        if !missing.is_empty() {
            return Err(CoreError::NotFullySigned(missing.join(", ")));
        }

        // missing_signers() checked presence of everything unwrapped below
        let sender_auth = self
            .sender_auth
            .ok_or_else(|| CoreError::NotFullySigned("sender".to_string()))?;
        let secondary_auths: Vec<AccountAuthenticator> =
            self.secondary_auths.into_iter().flatten().collect();

        let (raw_txn, authenticator) = match self.envelope {
            TransactionEnvelope::Simple(raw_txn) => {
                let authenticator = single_sender_authenticator(sender_auth);
                (raw_txn, authenticator)
            }
            TransactionEnvelope::MultiAgent(txn) => {
                let authenticator = TransactionAuthenticator::multi_agent(
                    sender_auth,
                    txn.secondary_signer_addresses,
                    secondary_auths,
                );
                (txn.raw_txn, authenticator)
            }
            TransactionEnvelope::FeePayer(txn) => {
                let fee_payer_auth = self
                    .fee_payer_auth
                    .ok_or_else(|| CoreError::NotFullySigned("fee payer".to_string()))?;
                let authenticator = TransactionAuthenticator::fee_payer(
                    sender_auth,
                    txn.secondary_signer_addresses,
                    secondary_auths,
                    txn.fee_payer_address,
                    fee_payer_auth,
                );
                (txn.raw_txn, authenticator)
            }
        };

        debug!(sender = %raw_txn.sender, "transaction fully signed");
        Ok(SignedTransaction::new(raw_txn, authenticator))
    }
}

/// Lifts an account authenticator into the transaction authenticator a
/// simple envelope uses.
///
/// Classic Ed25519 and multi-Ed25519 keep their dedicated variants; the
/// unified schemes travel as `SingleSender`.
fn single_sender_authenticator(auth: AccountAuthenticator) -> TransactionAuthenticator {
    match auth {
        AccountAuthenticator::Ed25519 {
            public_key,
            signature,
        } => TransactionAuthenticator::ed25519(public_key, signature),
        AccountAuthenticator::MultiEd25519 {
            public_key,
            signature,
        } => TransactionAuthenticator::multi_ed25519(public_key, signature),
        other => TransactionAuthenticator::single_sender(other),
    }
}

/// Builds and signs a simple Ed25519 transaction in one step.
///
/// # Errors
///
/// Propagates builder errors; signing itself cannot fail.
pub fn sign_transaction(
    raw_txn: RawTransaction,
    key: &Ed25519PrivateKey,
) -> CoreResult<SignedTransaction> {
    let mut session = PartiallySignedTransaction::new(TransactionEnvelope::Simple(raw_txn));
    session.sign_sender_ed25519(key);
    session.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::AccountInfoProvider;
    use crate::transaction::payload::EntryFunction;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedCommitted(u64);

    #[async_trait]
    impl AccountInfoProvider for FixedCommitted {
        async fn committed_sequence_number(
            &self,
            _address: AccountAddress,
        ) -> anyhow::Result<u64> {
            Ok(self.0)
        }
    }

    fn test_payload() -> TransactionPayload {
        EntryFunction::apt_transfer(AccountAddress::THREE, 1000)
            .unwrap()
            .into()
    }

    fn test_builder() -> TransactionBuilder {
        TransactionBuilder::new()
            .sender(AccountAddress::ONE)
            .sequence_number(0)
            .payload(test_payload())
            .chain_id(ChainId::Testnet)
    }

    #[test]
    fn test_builder_missing_fields() {
        assert!(TransactionBuilder::new().build().is_err());
        assert!(TransactionBuilder::new()
            .sequence_number(0)
            .payload(test_payload())
            .chain_id(ChainId::Testnet)
            .build()
            .is_err());
        assert!(TransactionBuilder::new()
            .sender(AccountAddress::ONE)
            .sequence_number(0)
            .chain_id(ChainId::Testnet)
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let txn = test_builder().build().unwrap();
        assert_eq!(txn.max_gas_amount, DEFAULT_MAX_GAS_AMOUNT);
        assert_eq!(txn.gas_unit_price, DEFAULT_GAS_UNIT_PRICE);

        let now = unix_now_secs();
        assert!(txn.expiration_timestamp_secs >= now + DEFAULT_EXPIRATION_SECONDS - 5);
        assert!(txn.expiration_timestamp_secs <= now + DEFAULT_EXPIRATION_SECONDS + 5);
    }

    #[test]
    fn test_builder_custom_gas_and_expiry() {
        let txn = test_builder()
            .max_gas_amount(500_000)
            .gas_unit_price(200)
            .expiration_timestamp_secs(9_999_999_999)
            .build()
            .unwrap();
        assert_eq!(txn.max_gas_amount, 500_000);
        assert_eq!(txn.gas_unit_price, 200);
        assert_eq!(txn.expiration_timestamp_secs, 9_999_999_999);
    }

    #[tokio::test]
    async fn test_build_with_allocator_assigns_distinct_numbers() {
        let allocator = Arc::new(SequenceNumberAllocator::new(
            AccountAddress::ONE,
            Arc::new(FixedCommitted(5)),
            100,
        ));

        let build = |allocator: Arc<SequenceNumberAllocator>| async move {
            TransactionBuilder::new()
                .sender(AccountAddress::ONE)
                .payload(test_payload())
                .chain_id(ChainId::Testnet)
                .build_with_allocator(&allocator)
                .await
        };
        let first = tokio::spawn(build(allocator.clone()));
        let second = tokio::spawn(build(allocator.clone()));

        let mut issued = vec![
            first.await.unwrap().unwrap().sequence_number,
            second.await.unwrap().unwrap().sequence_number,
        ];
        issued.sort_unstable();
        assert_eq!(issued, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_build_with_allocator_keeps_explicit_number() {
        let allocator = SequenceNumberAllocator::new(
            AccountAddress::ONE,
            Arc::new(FixedCommitted(5)),
            100,
        );

        let txn = test_builder()
            .sequence_number(42)
            .build_with_allocator(&allocator)
            .await
            .unwrap();
        assert_eq!(txn.sequence_number, 42);

        // The allocator stream is untouched by the explicit build.
        assert_eq!(allocator.allocate().await.unwrap(), 5);
    }

    #[test]
    fn test_sign_simple_transaction() {
        let key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let signed = sign_transaction(txn.clone(), &key).unwrap();
        assert_eq!(signed.sender(), AccountAddress::ONE);
        assert!(signed.authenticator.verify(&txn));
    }

    #[test]
    fn test_simple_session_status() {
        let key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let mut session = PartiallySignedTransaction::new(TransactionEnvelope::Simple(txn));

        assert_eq!(session.status(), SigningStatus::Unsigned);
        session.sign_sender_ed25519(&key);
        assert_eq!(session.status(), SigningStatus::FullySigned);
        assert!(session.finish().is_ok());
    }

    #[test]
    fn test_unsigned_finish_fails_fast() {
        let txn = test_builder().build().unwrap();
        let session = PartiallySignedTransaction::new(TransactionEnvelope::Simple(txn));
        let err = session.finish().unwrap_err();
        assert!(matches!(err, CoreError::NotFullySigned(ref m) if m == "sender"));
    }

    #[test]
    fn test_multi_agent_session() {
        let sender_key = Ed25519PrivateKey::generate();
        let secondary_key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let envelope = TransactionEnvelope::MultiAgent(MultiAgentRawTransaction::new(
            txn.clone(),
            vec![AccountAddress::FOUR],
        ));
        let mut session = PartiallySignedTransaction::new(envelope);

        session.sign_sender_ed25519(&sender_key);
        assert_eq!(session.status(), SigningStatus::PartiallySigned);

        session.sign_secondary_ed25519(0, &secondary_key).unwrap();
        assert_eq!(session.status(), SigningStatus::FullySigned);

        let signed = session.finish().unwrap();
        assert!(signed.authenticator.verify(&txn));
    }

    #[test]
    fn test_secondary_index_out_of_bounds() {
        let key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let envelope =
            TransactionEnvelope::MultiAgent(MultiAgentRawTransaction::new(txn, vec![]));
        let mut session = PartiallySignedTransaction::new(envelope);
        assert!(session.sign_secondary_ed25519(0, &key).is_err());
    }

    #[test]
    fn test_fee_payer_session_names_missing_signers() {
        let sender_key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let envelope = TransactionEnvelope::FeePayer(FeePayerRawTransaction::new(
            txn,
            vec![AccountAddress::THREE],
            AccountAddress::FOUR,
        ));
        let mut session = PartiallySignedTransaction::new(envelope);
        session.sign_sender_ed25519(&sender_key);

        let err = session.finish().unwrap_err();
        match err {
            CoreError::NotFullySigned(missing) => {
                assert!(missing.contains("secondary signer 0"));
                assert!(missing.contains("fee payer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fee_payer_session_complete() {
        let sender_key = Ed25519PrivateKey::generate();
        let payer_key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let envelope = TransactionEnvelope::FeePayer(FeePayerRawTransaction::new_simple(
            txn.clone(),
            AccountAddress::FOUR,
        ));
        let mut session = PartiallySignedTransaction::new(envelope);

        session.sign_sender_ed25519(&sender_key);
        session.sign_fee_payer_ed25519(&payer_key).unwrap();

        let signed = session.finish().unwrap();
        assert!(signed.authenticator.verify(&txn));
    }

    #[test]
    fn test_fee_payer_rejected_on_simple_envelope() {
        let key = Ed25519PrivateKey::generate();
        let txn = test_builder().build().unwrap();
        let mut session = PartiallySignedTransaction::new(TransactionEnvelope::Simple(txn));
        assert!(session.sign_fee_payer_ed25519(&key).is_err());
    }
}
