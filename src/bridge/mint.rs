// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Attestation retrieval and the Aptos mint.
//!
//! [`MintOrchestrator::mint`] is single shot: a burn Circle has not attested
//! yet comes back as [`MintOutcome::Pending`] and the caller retries later.
//! [`MintOrchestrator::wait_and_mint`] hosts the poll loop instead, backing
//! off between attempts; dropping its future abandons polling with no side
//! effects.

use alloy_primitives::{B256, U256};
use bon::Builder;
use serde::Serialize;
use tracing::{debug, error, info, warn, Instrument};

use super::config::{
    expiration_timestamp_secs, ConfirmationConfig, GasConfig, PollingConfig, SubmitRetryConfig,
};
use super::state::{BridgeOperation, BridgeState};
use crate::chain::aptos::{
    AccountAddress, LocalAccount, RawTransaction, Script, SignedTransaction, SimpleTransaction,
    TransactionArgument, TransactionAuthenticator, TransactionPayload, TransactionStatus,
};
use crate::chain::Network;
use crate::config::RECEIVE_MESSAGE_SCRIPT_ENV;
use crate::error::{CctpError, Result};
use crate::protocol::{AttestationLookup, AttestedMessage, DomainId, ReadyAttestation};
use crate::spans;
use crate::traits::{AptosNode, AttestationProvider, Clock, TransactionSigner};
use crate::wallet::FeePayerConfig;

/// A committed mint on Aptos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub mint_tx_hash: String,
    pub source_domain: u32,
    pub nonce: u64,
    pub amount: U256,
    pub mint_recipient: B256,
}

/// Result of one pass through the mint flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintOutcome {
    /// Circle has not attested the burn yet; retry after a cool-down.
    Pending {
        operation: BridgeOperation,
        reason: String,
    },
    Minted {
        operation: BridgeOperation,
        receipt: MintReceipt,
    },
}

impl MintOutcome {
    pub fn operation(&self) -> &BridgeOperation {
        match self {
            Self::Pending { operation, .. } | Self::Minted { operation, .. } => operation,
        }
    }
}

/// Drives attested burns to a confirmed mint on Aptos.
///
/// The configured fee payer key signs and pays for the mint; receiving a
/// message is permissionless unless the burn named a destination caller.
#[derive(Builder, Clone, Debug)]
pub struct MintOrchestrator<A: AttestationProvider, N: AptosNode, C: Clock> {
    attestation: A,
    node: N,
    clock: C,
    network: Network,
    /// Compiled `handle_receive_message` script
    receive_message_script: Option<Vec<u8>>,
    #[builder(default)]
    fee_payer: FeePayerConfig,
    #[builder(default)]
    polling: PollingConfig,
    #[builder(default)]
    confirmation: ConfirmationConfig,
    #[builder(default)]
    submit_retry: SubmitRetryConfig,
    #[builder(default)]
    gas: GasConfig,
}

impl<A: AttestationProvider, N: AptosNode, C: Clock> MintOrchestrator<A, N, C> {
    pub fn network(&self) -> Network {
        self.network
    }

    /// One attestation lookup.
    pub async fn check_attestation(
        &self,
        source_domain: DomainId,
        tx_hash: &str,
    ) -> Result<AttestationLookup> {
        validate_source(source_domain, tx_hash)?;
        let span = spans::check_attestation(source_domain, tx_hash, 1);
        self.attestation
            .get_messages(source_domain, tx_hash)
            .instrument(span)
            .await
    }

    /// Polls until the attestation is ready, backing off per
    /// [`PollingConfig`].
    ///
    /// Rate limiting waits out the advertised retry window and counts as an
    /// attempt.
    ///
    /// # Errors
    ///
    /// Returns [`CctpError::AttestationTimeout`] once `max_attempts` lookups
    /// have come back pending. Other lookup errors end polling immediately.
    pub async fn wait_for_attestation(
        &self,
        source_domain: DomainId,
        tx_hash: &str,
    ) -> Result<ReadyAttestation> {
        validate_source(source_domain, tx_hash)?;
        let polling = self.polling;
        let span = spans::wait_for_attestation(
            source_domain,
            tx_hash,
            polling.max_attempts,
            polling.poll_interval_secs,
        );

        async move {
            info!(event = "attestation_polling_started");

            for attempt in 1..=polling.max_attempts {
                let attempt_span = spans::check_attestation(source_domain, tx_hash, attempt);
                let lookup = self
                    .attestation
                    .get_messages(source_domain, tx_hash)
                    .instrument(attempt_span)
                    .await;

                let wait = match lookup {
                    Ok(AttestationLookup::Ready(ready)) => {
                        info!(
                            attempt = attempt,
                            message_length_bytes = ready.message.len(),
                            attestation_length_bytes = ready.attestation.len(),
                            event = "attestation_complete"
                        );
                        return Ok(ready);
                    }
                    Ok(AttestationLookup::Pending { reason }) => {
                        debug!(attempt = attempt, reason = %reason, event = "attestation_pending");
                        polling.interval_after(attempt)
                    }
                    Err(CctpError::RateLimitExceeded {
                        retry_after_seconds,
                    }) => {
                        warn!(
                            attempt = attempt,
                            sleep_secs = retry_after_seconds,
                            event = "rate_limit_exceeded"
                        );
                        std::time::Duration::from_secs(retry_after_seconds)
                    }
                    Err(e) => {
                        spans::record_error_with_context(
                            "AttestationLookupFailed",
                            &format!("Failed to fetch attestation: {e}"),
                            Some(&format!("Attempt {attempt}/{}", polling.max_attempts)),
                        );
                        error!(error = %e, attempt = attempt, event = "attestation_lookup_failed");
                        return Err(e);
                    }
                };

                if attempt < polling.max_attempts {
                    self.clock.sleep(wait).await;
                }
            }

            spans::record_error_with_context(
                "AttestationTimeout",
                &format!(
                    "Attestation polling timed out after {} attempts",
                    polling.max_attempts
                ),
                Some(&format!(
                    "Total wait: {} seconds",
                    polling.total_timeout_secs()
                )),
            );
            error!(
                total_wait_secs = polling.total_timeout_secs(),
                event = "attestation_timeout"
            );
            Err(CctpError::AttestationTimeout)
        }
        .instrument(span)
        .await
    }

    /// Single pass: look the attestation up once and mint if it is ready.
    ///
    /// `final_recipient`, when given, must be the mint recipient the burn
    /// committed to; the attested message decides who is credited.
    pub async fn mint(
        &self,
        source_domain: DomainId,
        tx_hash: &str,
        final_recipient: Option<AccountAddress>,
    ) -> Result<MintOutcome> {
        let mut operation = BridgeOperation::burn_submitted(tx_hash);
        operation.transition(BridgeState::AttestationPending)?;

        let ready = match self.check_attestation(source_domain, tx_hash).await {
            Ok(AttestationLookup::Ready(ready)) => ready,
            Ok(AttestationLookup::Pending { reason }) => {
                info!(
                    tx_hash = %tx_hash,
                    source_domain = %source_domain,
                    reason = %reason,
                    event = "mint_attestation_pending"
                );
                return Ok(MintOutcome::Pending { operation, reason });
            }
            Err(e) => {
                operation.fail(e.to_string());
                return Err(e);
            }
        };

        self.complete(operation, &ready, final_recipient).await
    }

    /// Polls for the attestation, then mints and waits for the commit.
    pub async fn wait_and_mint(
        &self,
        source_domain: DomainId,
        tx_hash: &str,
        final_recipient: Option<AccountAddress>,
    ) -> Result<MintOutcome> {
        let mut operation = BridgeOperation::burn_submitted(tx_hash);
        operation.transition(BridgeState::AttestationPending)?;
        let ready = self.wait_for_attestation(source_domain, tx_hash).await?;
        self.complete(operation, &ready, final_recipient).await
    }

    async fn complete(
        &self,
        mut operation: BridgeOperation,
        ready: &ReadyAttestation,
        final_recipient: Option<AccountAddress>,
    ) -> Result<MintOutcome> {
        operation.transition(BridgeState::AttestationReady)?;

        let mint_tx_hash = match self.receive_message(ready, final_recipient).await {
            Ok(hash) => hash,
            Err(e) => {
                operation.fail(e.to_string());
                return Err(e);
            }
        };
        operation.mint_submitted(&mint_tx_hash)?;

        if let Err(e) = self.confirm(&mint_tx_hash).await {
            operation.fail(e.to_string());
            return Err(e);
        }
        operation.transition(BridgeState::MintConfirmed)?;

        let message = AttestedMessage::decode(&ready.message)?;
        Ok(MintOutcome::Minted {
            operation,
            receipt: MintReceipt {
                mint_tx_hash,
                source_domain: message.source_domain.as_u32(),
                nonce: message.nonce,
                amount: message.body.amount,
                mint_recipient: message.body.mint_recipient,
            },
        })
    }

    /// Builds, signs and submits the receive-message transaction; returns
    /// its hash without waiting for the commit.
    pub async fn receive_message(
        &self,
        ready: &ReadyAttestation,
        final_recipient: Option<AccountAddress>,
    ) -> Result<String> {
        let message = AttestedMessage::decode(&ready.message)?;
        let span = spans::receive_message(
            message.source_domain,
            message.nonce,
            ready.attestation.len(),
        );

        async move {
            let result = self.receive_message_inner(ready, &message, final_recipient).await;
            match &result {
                Ok(hash) => {
                    tracing::Span::current().record("mint_tx_hash", hash.as_str());
                    info!(
                        mint_tx_hash = %hash,
                        amount = %message.body.amount,
                        mint_recipient = %message.body.mint_recipient,
                        event = "mint_submitted"
                    );
                }
                Err(e) => {
                    spans::record_error(e);
                    error!(error = %e, event = "mint_submit_failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn receive_message_inner(
        &self,
        ready: &ReadyAttestation,
        message: &AttestedMessage,
        final_recipient: Option<AccountAddress>,
    ) -> Result<String> {
        if message.destination_domain != DomainId::Aptos {
            return Err(CctpError::Validation(format!(
                "Attested message is for {}, not Aptos",
                message.destination_domain
            )));
        }
        let mint_recipient = AccountAddress::from(message.body.mint_recipient);
        if let Some(final_recipient) = final_recipient {
            if final_recipient != mint_recipient {
                return Err(CctpError::Validation(format!(
                    "Final recipient {final_recipient} does not match attested mint recipient {mint_recipient}"
                )));
            }
        }

        let payer = self.fee_payer.signer()?;
        if message.destination_caller != B256::ZERO
            && AccountAddress::from(message.destination_caller) != payer.address()
        {
            return Err(CctpError::Validation(format!(
                "Message may only be received by {}",
                AccountAddress::from(message.destination_caller)
            )));
        }
        let script = self
            .receive_message_script
            .as_ref()
            .ok_or_else(|| CctpError::MissingConfig(RECEIVE_MESSAGE_SCRIPT_ENV.to_string()))?;

        let signed = self.sign_receive_message(payer, script, ready).await?;
        self.submit_with_retry(&signed).await
    }

    async fn sign_receive_message(
        &self,
        payer: &LocalAccount,
        script: &[u8],
        ready: &ReadyAttestation,
    ) -> Result<SignedTransaction> {
        let ledger = self.node.ledger_info().await?;
        let sequence_number = self.node.sequence_number(payer.address()).await?;
        let transaction = SimpleTransaction {
            raw_txn: RawTransaction {
                sender: payer.address(),
                sequence_number,
                payload: TransactionPayload::Script(Script {
                    code: script.to_vec(),
                    ty_args: vec![],
                    args: vec![
                        TransactionArgument::U8Vector(ready.message.to_vec()),
                        TransactionArgument::U8Vector(ready.attestation.to_vec()),
                    ],
                }),
                max_gas_amount: self.gas.max_gas_amount,
                gas_unit_price: self.gas.gas_unit_price,
                expiration_timestamp_secs: expiration_timestamp_secs(
                    ledger.ledger_timestamp_secs(),
                    false,
                ),
                chain_id: ledger.chain_id,
            },
            fee_payer_address: None,
        };
        let authenticator = payer.sign_transaction(&transaction, false)?.to_bytes()?;

        Ok(SignedTransaction {
            raw_txn: transaction.raw_txn,
            authenticator: TransactionAuthenticator::SingleSender(authenticator),
        })
    }

    /// Resubmits the same signed transaction after transient failures; a
    /// duplicate lands on the same hash, and a replayed nonce is rejected
    /// on chain.
    async fn submit_with_retry(&self, signed: &SignedTransaction) -> Result<String> {
        let retry = self.submit_retry;
        let mut attempt = 1;
        loop {
            match self.node.submit(signed).await {
                Ok(hash) => return Ok(hash),
                Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                    warn!(
                        error = %e,
                        attempt = attempt,
                        max_attempts = retry.max_attempts,
                        event = "mint_submit_retry"
                    );
                    self.clock.sleep(retry.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Waits for `tx_hash` to commit.
    ///
    /// # Errors
    ///
    /// A committed transaction with a failed VM status is
    /// [`CctpError::TransactionFailed`] and is not retried.
    pub async fn confirm(&self, tx_hash: &str) -> Result<()> {
        let confirmation = self.confirmation;
        let span = spans::wait_for_confirmation(tx_hash, confirmation.max_attempts);

        async move {
            for attempt in 1..=confirmation.max_attempts {
                match self.node.transaction_status(tx_hash).await? {
                    Some(TransactionStatus::Committed { success: true, .. }) => {
                        info!(tx_hash = %tx_hash, attempt = attempt, event = "mint_confirmed");
                        return Ok(());
                    }
                    Some(TransactionStatus::Committed {
                        success: false,
                        vm_status,
                    }) => {
                        error!(tx_hash = %tx_hash, vm_status = %vm_status, event = "mint_failed");
                        return Err(CctpError::TransactionFailed { vm_status });
                    }
                    Some(TransactionStatus::Pending) | None => {
                        debug!(attempt = attempt, event = "mint_pending");
                    }
                }
                if attempt < confirmation.max_attempts {
                    self.clock.sleep(confirmation.poll_interval).await;
                }
            }

            error!(tx_hash = %tx_hash, event = "mint_confirmation_timeout");
            Err(CctpError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
            })
        }
        .instrument(span)
        .await
    }
}

fn validate_source(source_domain: DomainId, tx_hash: &str) -> Result<()> {
    if tx_hash.trim().is_empty() {
        return Err(CctpError::Validation(
            "Source transaction signature is required".to_string(),
        ));
    }
    if source_domain == DomainId::Aptos {
        return Err(CctpError::Validation(
            "Source domain must differ from Aptos".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        attested_message_bytes, FakeAptosNode, FakeAttestationProvider, FakeClock,
    };
    use alloy_primitives::Bytes;
    use std::time::Duration;

    const BURN_SIG: &str = "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnb";

    fn payer() -> LocalAccount {
        LocalAccount::from_private_key(&"44".repeat(32)).unwrap()
    }

    fn ready(recipient: B256) -> ReadyAttestation {
        ReadyAttestation {
            message: Bytes::from(attested_message_bytes(DomainId::Aptos, recipient, 42)),
            attestation: Bytes::from(vec![0xab; 130]),
            event_nonce: Some("42".to_string()),
        }
    }

    fn orchestrator(
        attestation: FakeAttestationProvider,
        node: FakeAptosNode,
        clock: FakeClock,
    ) -> MintOrchestrator<FakeAttestationProvider, FakeAptosNode, FakeClock> {
        MintOrchestrator::builder()
            .attestation(attestation)
            .node(node)
            .clock(clock)
            .network(Network::Mainnet)
            .receive_message_script(vec![0xa1, 0x1c, 0xeb, 0x0b])
            .fee_payer(FeePayerConfig {
                address: None,
                account: Some(payer()),
            })
            .build()
    }

    #[tokio::test]
    async fn test_pending_is_an_outcome_not_an_error() {
        let mint = orchestrator(
            FakeAttestationProvider::pending(),
            FakeAptosNode::mainnet(),
            FakeClock::new(),
        );
        let outcome = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap();
        assert!(matches!(outcome, MintOutcome::Pending { .. }));
        assert_eq!(outcome.operation().state(), BridgeState::AttestationPending);
    }

    #[tokio::test]
    async fn test_ready_attestation_mints_and_confirms() {
        let recipient = B256::repeat_byte(7);
        let node = FakeAptosNode::mainnet();
        let mint = orchestrator(
            FakeAttestationProvider::ready(ready(recipient)),
            node.clone(),
            FakeClock::new(),
        );
        let outcome = mint
            .mint(DomainId::Solana, BURN_SIG, Some(AccountAddress::from(recipient)))
            .await
            .unwrap();

        let MintOutcome::Minted { operation, receipt } = outcome else {
            panic!("expected mint");
        };
        assert_eq!(operation.state(), BridgeState::MintConfirmed);
        assert_eq!(receipt.nonce, 42);
        assert_eq!(receipt.mint_recipient, recipient);
        assert_eq!(Some(receipt.mint_tx_hash.as_str()), operation.mint_tx_hash());

        let submitted = node.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].raw_txn.sender, payer().address());
    }

    #[tokio::test]
    async fn test_final_recipient_must_match_attested_recipient() {
        let node = FakeAptosNode::mainnet();
        let mint = orchestrator(
            FakeAttestationProvider::ready(ready(B256::repeat_byte(7))),
            node.clone(),
            FakeClock::new(),
        );
        let err = mint
            .mint(DomainId::Solana, BURN_SIG, Some(AccountAddress([8; 32])))
            .await
            .unwrap_err();
        assert!(matches!(err, CctpError::Validation(_)));
        assert!(node.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_message_for_other_chain_is_rejected() {
        let wrong = ReadyAttestation {
            message: Bytes::from(attested_message_bytes(
                DomainId::Ethereum,
                B256::repeat_byte(7),
                1,
            )),
            attestation: Bytes::from(vec![1; 65]),
            event_nonce: None,
        };
        let mint = orchestrator(
            FakeAttestationProvider::ready(wrong),
            FakeAptosNode::mainnet(),
            FakeClock::new(),
        );
        let err = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap_err();
        assert!(matches!(err, CctpError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_script_is_missing_config() {
        let mint = MintOrchestrator::builder()
            .attestation(FakeAttestationProvider::ready(ready(B256::repeat_byte(7))))
            .node(FakeAptosNode::mainnet())
            .clock(FakeClock::new())
            .network(Network::Mainnet)
            .fee_payer(FeePayerConfig {
                address: None,
                account: Some(payer()),
            })
            .build();
        let err = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap_err();
        assert!(matches!(err, CctpError::MissingConfig(_)));
    }

    #[tokio::test]
    async fn test_wait_for_attestation_backs_off_until_ready() {
        let clock = FakeClock::new();
        let provider = FakeAttestationProvider::pending_then_ready(3, ready(B256::repeat_byte(7)));
        let mint = orchestrator(provider.clone(), FakeAptosNode::mainnet(), clock.clone());

        mint.wait_for_attestation(DomainId::Solana, BURN_SIG)
            .await
            .unwrap();

        assert_eq!(provider.calls(), 4);
        // 10 + 20 + 40
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(70));
    }

    #[tokio::test]
    async fn test_wait_for_attestation_times_out() {
        let clock = FakeClock::new();
        let mint = MintOrchestrator::builder()
            .attestation(FakeAttestationProvider::pending())
            .node(FakeAptosNode::mainnet())
            .clock(clock.clone())
            .network(Network::Mainnet)
            .polling(PollingConfig::default().with_max_attempts(3))
            .build();

        let err = mint
            .wait_for_attestation(DomainId::Solana, BURN_SIG)
            .await
            .unwrap_err();
        assert!(matches!(err, CctpError::AttestationTimeout));
        // no sleep after the final attempt
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_wait_for_attestation_honours_rate_limit() {
        let clock = FakeClock::new();
        let provider = FakeAttestationProvider::rate_limited_then_ready(ready(B256::repeat_byte(7)));
        let mint = orchestrator(provider, FakeAptosNode::mainnet(), clock.clone());

        mint.wait_for_attestation(DomainId::Solana, BURN_SIG)
            .await
            .unwrap();
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_transient_submit_failures_are_retried() {
        let node = FakeAptosNode::mainnet().fail_submissions(2);
        let clock = FakeClock::new();
        let mint = orchestrator(
            FakeAttestationProvider::ready(ready(B256::repeat_byte(7))),
            node.clone(),
            clock.clone(),
        );
        mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap();
        assert_eq!(node.submit_attempts(), 3);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_submit_retries_are_bounded() {
        let node = FakeAptosNode::mainnet().fail_submissions(5);
        let mint = orchestrator(
            FakeAttestationProvider::ready(ready(B256::repeat_byte(7))),
            node.clone(),
            FakeClock::new(),
        );
        let err = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(node.submit_attempts(), 3);
    }

    #[tokio::test]
    async fn test_failed_vm_status_is_terminal() {
        let node = FakeAptosNode::mainnet().with_vm_failure("Move abort: ENONCE_ALREADY_USED");
        let mint = orchestrator(
            FakeAttestationProvider::ready(ready(B256::repeat_byte(7))),
            node.clone(),
            FakeClock::new(),
        );
        let err = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Transaction failed: Move abort: ENONCE_ALREADY_USED");
        assert_eq!(node.submit_attempts(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_timeout() {
        let node = FakeAptosNode::mainnet().never_commits();
        let clock = FakeClock::new();
        let mint = orchestrator(
            FakeAttestationProvider::ready(ready(B256::repeat_byte(7))),
            node,
            clock.clone(),
        );
        let err = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap_err();
        assert!(matches!(err, CctpError::ConfirmationTimeout { .. }));
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(29));
    }

    #[tokio::test]
    async fn test_rejects_empty_signature_and_aptos_source() {
        let mint = orchestrator(
            FakeAttestationProvider::pending(),
            FakeAptosNode::mainnet(),
            FakeClock::new(),
        );
        assert!(matches!(
            mint.check_attestation(DomainId::Solana, " ").await.unwrap_err(),
            CctpError::Validation(_)
        ));
        assert!(matches!(
            mint.check_attestation(DomainId::Aptos, BURN_SIG)
                .await
                .unwrap_err(),
            CctpError::Validation(_)
        ));
    }
}
