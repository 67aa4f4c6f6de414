//! Per-account sequence number allocation for concurrent submission.
//!
//! One allocator instance owns the sequence number stream of one account.
//! Many transaction builders may call [`SequenceNumberAllocator::allocate`]
//! concurrently; the allocator never issues the same number twice and never
//! leaves a gap. If you also submit transactions from the account outside of
//! this allocator, committed numbers observed on chain are treated as ground
//! truth and the local stream jumps forward to match.

use crate::error::{CoreError, CoreResult};
use crate::types::AccountAddress;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

/// Reports an account's committed on-chain sequence number.
///
/// Implementations wrap whatever lookup path exists (a node API, a local
/// view, a test double); the allocator only consumes the number.
#[async_trait]
pub trait AccountInfoProvider: Send + Sync + 'static {
    /// Returns the committed sequence number for `address`.
    async fn committed_sequence_number(&self, address: AccountAddress) -> anyhow::Result<u64>;
}

struct AllocatorState {
    /// False until the first successful reconcile seeds the counters.
    initialized: bool,
    last_known_committed: u64,
    next_to_issue: u64,
}

/// Hands out monotonically increasing sequence numbers for one account.
///
/// `allocate` suspends when `max_in_flight` issued numbers are still
/// uncommitted, and resumes when any task's `reconcile` advances the
/// committed counter. A fresh allocator reconciles lazily before its first
/// issue, so no number is handed out from a stale or guessed baseline.
pub struct SequenceNumberAllocator {
    account: AccountAddress,
    provider: Arc<dyn AccountInfoProvider>,
    max_in_flight: u32,
    state: Mutex<AllocatorState>,
    /// Signaled whenever `last_known_committed` advances.
    committed_advanced: Notify,
}

impl std::fmt::Debug for SequenceNumberAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceNumberAllocator")
            .field("account", &self.account)
            .field("max_in_flight", &self.max_in_flight)
            .finish_non_exhaustive()
    }
}

impl SequenceNumberAllocator {
    /// Creates an allocator for `account` with at most `max_in_flight`
    /// uncommitted numbers outstanding (clamped to at least 1).
    pub fn new(
        account: AccountAddress,
        provider: Arc<dyn AccountInfoProvider>,
        max_in_flight: u32,
    ) -> Self {
        Self {
            account,
            provider,
            max_in_flight: max_in_flight.max(1),
            state: Mutex::new(AllocatorState {
                initialized: false,
                last_known_committed: 0,
                next_to_issue: 0,
            }),
            committed_advanced: Notify::new(),
        }
    }

    /// Returns the account this allocator serves.
    pub fn account(&self) -> AccountAddress {
        self.account
    }

    /// Issues the next sequence number, suspending at the in-flight limit.
    ///
    /// Numbers are issued in increasing order with no duplicates and no
    /// gaps. A suspended caller wakes when a `reconcile` from any task
    /// advances the committed counter; dropping a suspended caller does not
    /// starve other waiters.
    ///
    /// # Errors
    ///
    /// [`CoreError::External`] when the provider fails during the lazy
    /// first reconcile.
    pub async fn allocate(&self) -> CoreResult<u64> {
        loop {
            // Register for the wakeup before re-checking the condition so
            // a reconcile landing between the check and the await is not
            // lost.
            let advanced = self.committed_advanced.notified();
            {
                let mut state = self.state.lock().await;
                if state.initialized {
                    let in_flight = state.next_to_issue - state.last_known_committed;
                    if in_flight < u64::from(self.max_in_flight) {
                        let issued = state.next_to_issue;
                        state.next_to_issue += 1;
                        debug!(
                            account = %self.account,
                            sequence_number = issued,
                            in_flight = in_flight + 1,
                            "issued sequence number"
                        );
                        return Ok(issued);
                    }
                    debug!(
                        account = %self.account,
                        in_flight,
                        max_in_flight = self.max_in_flight,
                        "in-flight limit reached, waiting for reconcile"
                    );
                } else {
                    drop(state);
                    self.reconcile().await?;
                    continue;
                }
            }
            advanced.await;
        }
    }

    /// Refreshes the committed counter from the provider.
    ///
    /// The committed counter never decreases. A committed value above
    /// `next_to_issue` means another process issued numbers for this
    /// account; the local stream jumps forward to match, since committed
    /// numbers are ground truth.
    ///
    /// # Errors
    ///
    /// [`CoreError::External`] when the provider fails.
    pub async fn reconcile(&self) -> CoreResult<()> {
        let committed = match self.provider.committed_sequence_number(self.account).await {
            Ok(committed) => committed,
            Err(err) => {
                let err = CoreError::from(err);
                warn!(
                    account = %self.account,
                    retryable = err.is_retryable(),
                    error = %err.sanitized_message(),
                    "account info provider failed"
                );
                return Err(err);
            }
        };

        let mut state = self.state.lock().await;
        if !state.initialized {
            state.initialized = true;
            state.last_known_committed = committed;
            state.next_to_issue = committed;
            debug!(
                account = %self.account,
                committed,
                "allocator seeded from committed sequence number"
            );
            self.committed_advanced.notify_waiters();
            return Ok(());
        }

        if committed > state.last_known_committed {
            state.last_known_committed = committed;
            if committed > state.next_to_issue {
                warn!(
                    account = %self.account,
                    committed,
                    next_to_issue = state.next_to_issue,
                    "committed sequence number ahead of local stream, jumping forward"
                );
                state.next_to_issue = committed;
            }
            debug!(
                account = %self.account,
                committed,
                next_to_issue = state.next_to_issue,
                "committed sequence number advanced"
            );
            self.committed_advanced.notify_waiters();
        }
        Ok(())
    }

    /// Blocks until every issued number is committed, reconciling between
    /// bounded polls.
    ///
    /// # Errors
    ///
    /// [`CoreError::SynchronizationTimeout`] after `max_attempts` polls
    /// without convergence; [`CoreError::External`] when the provider
    /// fails.
    pub async fn synchronize(&self, max_attempts: u32, interval: Duration) -> CoreResult<()> {
        for attempt in 1..=max_attempts {
            self.reconcile().await?;
            {
                let state = self.state.lock().await;
                if state.initialized && state.last_known_committed >= state.next_to_issue {
                    debug!(
                        account = %self.account,
                        committed = state.last_known_committed,
                        attempt,
                        "synchronized"
                    );
                    return Ok(());
                }
            }
            debug!(account = %self.account, attempt, "not yet synchronized");
            tokio::time::sleep(interval).await;
        }
        warn!(
            account = %self.account,
            attempts = max_attempts,
            "synchronization timed out"
        );
        Err(CoreError::SynchronizationTimeout {
            attempts: max_attempts,
        })
    }
}
