//! Voting coordinator: the only write path onto the ledger

use crate::error::VoteChainError;
use crate::ledger::{verify_chain, BlockView, Ledger};
use crate::store::CredentialStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Structured result of a cast-vote attempt. Every expected failure is
/// reported as a value here, never as an error.
#[derive(Debug, Clone, Serialize)]
pub struct VoteOutcome {
    pub success: bool,
    pub message: String,
}

impl VoteOutcome {
    fn accepted(message: &str) -> Self {
        VoteOutcome {
            success: true,
            message: message.to_string(),
        }
    }

    fn rejected(message: &str) -> Self {
        VoteOutcome {
            success: false,
            message: message.to_string(),
        }
    }
}

/// Orchestrates a vote: credential check, ledger append, credential
/// consumption and post-append verification.
///
/// The ledger sits behind a single mutex and the guard is held across the
/// whole cast sequence, so the check-append-consume critical section is
/// serialized globally. Two concurrent casts of the same credential cannot
/// both pass the validity check.
pub struct VotingService {
    ledger: Mutex<Ledger>,
    store: Arc<dyn CredentialStore>,
}

impl VotingService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        VotingService {
            ledger: Mutex::new(Ledger::new()),
            store,
        }
    }

    /// Create the genesis block. Must run once, before any vote traffic.
    pub async fn initialize_ledger(&self) {
        self.ledger.lock().await.create_genesis();
    }

    /// Record one vote backed by a single-use credential.
    ///
    /// The not-found and already-used cases share one rejection message so
    /// callers cannot probe which tokens exist. The append happens before
    /// the credential is consumed, matching the original transaction order.
    pub async fn cast_vote(
        &self,
        token: &str,
        candidate: &str,
    ) -> Result<VoteOutcome, VoteChainError> {
        let mut ledger = self.ledger.lock().await;

        if !self.store.is_credential_valid(token)? {
            return Ok(VoteOutcome::rejected("Invalid or already used token."));
        }

        let record = format!("User token {} voted for {}", token, candidate);
        ledger.append(vec![record]);

        self.store.consume_credential(token)?;

        if !verify_chain(ledger.blocks()) {
            return Ok(VoteOutcome::rejected(
                "Blockchain integrity compromised. Vote not recorded.",
            ));
        }

        Ok(VoteOutcome::accepted(
            "Vote successfully added to the blockchain!",
        ))
    }

    /// Read-only views of the current chain.
    pub async fn snapshot(&self) -> Vec<BlockView> {
        self.ledger.lock().await.snapshot()
    }

    pub async fn chain_len(&self) -> usize {
        self.ledger.lock().await.len()
    }

    /// Run full verification over the current chain.
    pub async fn verify(&self) -> bool {
        verify_chain(self.ledger.lock().await.blocks())
    }
}
