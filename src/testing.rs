// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test utilities and fake implementations of the bridge traits
//!
//! These fakes let the burn, mint and HTTP layers be exercised without a
//! fullnode, Solana RPC, gas station or Circle, including adversarial
//! scenarios: rate limiting, attestations that never arrive, flaky
//! submission and failed VM statuses.
//!
//! Every fake is cheap to clone and clones share state, so a test can keep
//! a handle and inspect what the code under test did.

use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, transaction::Transaction};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::chain::aptos::{
    AccountAddress, AuthenticatorBytes, LedgerInfo, SignedTransaction, SimpleTransaction,
    TransactionStatus,
};
use crate::protocol::{
    AttestationLookup, AttestedMessage, BurnMessageBody, DomainId, ReadyAttestation,
};
use crate::traits::{AptosNode, AttestationProvider, Clock, SolanaRpc, SponsorRelay};
use crate::{CctpError, Result};

// ============================================================================
// Fake Attestation Provider
// ============================================================================

#[derive(Clone, Debug)]
enum ScriptedLookup {
    Pending,
    Ready(ReadyAttestation),
    RateLimited(u64),
    Error(String),
}

/// A fake attestation provider that replays a scripted sequence of lookups.
///
/// The last entry repeats once the script is exhausted. Scenarios:
/// - Immediate success
/// - Pending → ready progression
/// - Rate limiting (429)
/// - Provider errors
/// - Attestations that never arrive
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    script: Arc<Mutex<Vec<ScriptedLookup>>>,
    calls: Arc<Mutex<usize>>,
}

impl FakeAttestationProvider {
    fn scripted(script: Vec<ScriptedLookup>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
            calls: Arc::default(),
        }
    }

    /// Never attested, for timeout testing
    pub fn pending() -> Self {
        Self::scripted(vec![ScriptedLookup::Pending])
    }

    pub fn ready(ready: ReadyAttestation) -> Self {
        Self::scripted(vec![ScriptedLookup::Ready(ready)])
    }

    /// `pending_count` pending lookups, then ready
    pub fn pending_then_ready(pending_count: usize, ready: ReadyAttestation) -> Self {
        let mut script = vec![ScriptedLookup::Pending; pending_count];
        script.push(ScriptedLookup::Ready(ready));
        Self::scripted(script)
    }

    /// One 429 asking for a five minute pause, then ready
    pub fn rate_limited_then_ready(ready: ReadyAttestation) -> Self {
        Self::scripted(vec![
            ScriptedLookup::RateLimited(300),
            ScriptedLookup::Ready(ready),
        ])
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted(vec![ScriptedLookup::Error(message.into())])
    }

    /// Number of lookups made so far
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_messages(
        &self,
        _source_domain: DomainId,
        _tx_hash: &str,
    ) -> Result<AttestationLookup> {
        let mut calls = self.calls.lock().unwrap();
        let script = self.script.lock().unwrap();
        let index = (*calls).min(script.len().saturating_sub(1));
        *calls += 1;

        match script.get(index) {
            Some(ScriptedLookup::Ready(ready)) => Ok(AttestationLookup::Ready(ready.clone())),
            Some(ScriptedLookup::RateLimited(secs)) => Err(CctpError::RateLimitExceeded {
                retry_after_seconds: *secs,
            }),
            Some(ScriptedLookup::Error(message)) => Err(CctpError::Provider(message.clone())),
            Some(ScriptedLookup::Pending) | None => {
                Ok(AttestationLookup::pending("Attestation not yet available"))
            }
        }
    }
}

/// Encodes a Solana-sourced burn message as Circle would attest it.
pub fn attested_message_bytes(destination: DomainId, mint_recipient: B256, nonce: u64) -> Vec<u8> {
    AttestedMessage {
        version: 0,
        source_domain: DomainId::Solana,
        destination_domain: destination,
        nonce,
        sender: B256::repeat_byte(0xaa),
        recipient: B256::repeat_byte(0xbb),
        destination_caller: B256::ZERO,
        body: BurnMessageBody {
            version: 0,
            burn_token: B256::repeat_byte(0xcc),
            mint_recipient,
            amount: U256::from(1_000_000u64),
            message_sender: B256::repeat_byte(0xdd),
        },
    }
    .encode()
}

// ============================================================================
// Fake Aptos Node
// ============================================================================

#[derive(Clone, Debug)]
enum CommitBehavior {
    Success,
    VmFailure(String),
    Never,
}

#[derive(Debug)]
struct NodeState {
    chain_id: u8,
    commit: CommitBehavior,
    failing_submissions: u32,
    submit_attempts: u32,
    ledger_calls: u32,
    submitted: Vec<(String, SignedTransaction)>,
}

/// A fake Aptos fullnode.
///
/// Submissions are recorded and reported committed on the next status
/// lookup unless configured otherwise.
#[derive(Clone, Debug)]
pub struct FakeAptosNode {
    state: Arc<Mutex<NodeState>>,
}

impl FakeAptosNode {
    pub const LEDGER_TIMESTAMP_SECS: u64 = 1_700_000_000;

    fn with_chain_id(chain_id: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(NodeState {
                chain_id,
                commit: CommitBehavior::Success,
                failing_submissions: 0,
                submit_attempts: 0,
                ledger_calls: 0,
                submitted: Vec::new(),
            })),
        }
    }

    pub fn mainnet() -> Self {
        Self::with_chain_id(1)
    }

    pub fn testnet() -> Self {
        Self::with_chain_id(2)
    }

    /// The first `count` submissions fail with a transient provider error.
    pub fn fail_submissions(self, count: u32) -> Self {
        self.state.lock().unwrap().failing_submissions = count;
        self
    }

    /// Submitted transactions commit with `success: false`.
    pub fn with_vm_failure(self, vm_status: impl Into<String>) -> Self {
        self.state.lock().unwrap().commit = CommitBehavior::VmFailure(vm_status.into());
        self
    }

    /// Submitted transactions stay pending forever.
    pub fn never_commits(self) -> Self {
        self.state.lock().unwrap().commit = CommitBehavior::Never;
        self
    }

    /// Transactions accepted so far
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state
            .lock()
            .unwrap()
            .submitted
            .iter()
            .map(|(_, tx)| tx.clone())
            .collect()
    }

    /// Submission calls, including failed ones
    pub fn submit_attempts(&self) -> u32 {
        self.state.lock().unwrap().submit_attempts
    }

    pub fn ledger_calls(&self) -> u32 {
        self.state.lock().unwrap().ledger_calls
    }
}

#[async_trait]
impl AptosNode for FakeAptosNode {
    async fn ledger_info(&self) -> Result<LedgerInfo> {
        let mut state = self.state.lock().unwrap();
        state.ledger_calls += 1;
        Ok(LedgerInfo {
            chain_id: state.chain_id,
            ledger_timestamp_usecs: Self::LEDGER_TIMESTAMP_SECS * 1_000_000,
        })
    }

    async fn sequence_number(&self, _address: AccountAddress) -> Result<u64> {
        Ok(self.state.lock().unwrap().submitted.len() as u64)
    }

    async fn submit(&self, transaction: &SignedTransaction) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.submit_attempts += 1;
        if state.failing_submissions > 0 {
            state.failing_submissions -= 1;
            return Err(CctpError::Provider("Simulated fullnode outage".to_string()));
        }
        let hash = transaction.hash()?.to_string();
        state.submitted.push((hash.clone(), transaction.clone()));
        Ok(hash)
    }

    async fn transaction_status(&self, tx_hash: &str) -> Result<Option<TransactionStatus>> {
        let state = self.state.lock().unwrap();
        if !state.submitted.iter().any(|(hash, _)| hash == tx_hash) {
            return Ok(None);
        }
        Ok(Some(match &state.commit {
            CommitBehavior::Success => TransactionStatus::Committed {
                success: true,
                vm_status: "Executed successfully".to_string(),
            },
            CommitBehavior::VmFailure(vm_status) => TransactionStatus::Committed {
                success: false,
                vm_status: vm_status.clone(),
            },
            CommitBehavior::Never => TransactionStatus::Pending,
        }))
    }
}

// ============================================================================
// Fake Solana RPC
// ============================================================================

#[derive(Debug, Default)]
struct SolanaState {
    balance: u64,
    calls: u32,
    sent: Vec<Transaction>,
}

/// A fake Solana JSON-RPC endpoint with a single USDC balance.
#[derive(Clone, Debug, Default)]
pub struct FakeSolanaRpc {
    state: Arc<Mutex<SolanaState>>,
}

impl FakeSolanaRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, balance: u64) -> Self {
        self.state.lock().unwrap().balance = balance;
        self
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().sent.clone()
    }

    /// RPC calls of any kind
    pub fn calls(&self) -> u32 {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl SolanaRpc for FakeSolanaRpc {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.state.lock().unwrap().calls += 1;
        Ok(Hash::new_from_array([9; 32]))
    }

    async fn token_balance(&self, _token_account: &Pubkey) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        Ok(state.balance)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state.sent.push(transaction.clone());
        Ok(transaction
            .signatures
            .first()
            .map(|signature| signature.to_string())
            .unwrap_or_default())
    }
}

// ============================================================================
// Fake Sponsor Relay
// ============================================================================

/// A fake gas station that either accepts everything or rejects everything.
#[derive(Clone, Debug)]
pub struct FakeSponsorRelay {
    outcome: std::result::Result<String, String>,
    submissions: Arc<Mutex<Vec<SimpleTransaction>>>,
}

impl FakeSponsorRelay {
    pub fn accepting(tx_hash: impl Into<String>) -> Self {
        Self {
            outcome: Ok(tx_hash.into()),
            submissions: Arc::default(),
        }
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            submissions: Arc::default(),
        }
    }

    pub fn submissions(&self) -> Vec<SimpleTransaction> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SponsorRelay for FakeSponsorRelay {
    async fn sign_and_submit(
        &self,
        transaction: &SimpleTransaction,
        _sender_authenticator: &AuthenticatorBytes,
    ) -> Result<String> {
        self.submissions.lock().unwrap().push(transaction.clone());
        self.outcome
            .clone()
            .map_err(|reason| CctpError::SponsorshipRejected {
                function: transaction.raw_txn.payload.function_id(),
                reason,
            })
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// This enables testing timeout behavior without actually waiting.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}
