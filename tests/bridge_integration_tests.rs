//! Integration tests for the bridge flows using fake implementations
//!
//! Burns, attestation polling and mints run end to end against the fakes in
//! `cctp_aptos::testing`; the fake clock makes backoff and timeouts instant.

use alloy_primitives::{Bytes, B256};
use cctp_aptos::bridge::{ConfirmationConfig, SubmitRetryConfig};
use cctp_aptos::chain::aptos::{LocalAccount, TransactionAuthenticator};
use cctp_aptos::testing::{
    attested_message_bytes, FakeAptosNode, FakeAttestationProvider, FakeClock, FakeSolanaRpc,
    FakeSponsorRelay,
};
use cctp_aptos::traits::TransactionSigner;
use cctp_aptos::wallet::{FeePayerConfig, SolanaDerivedSigner};
use cctp_aptos::{
    AccountAddress, AptosBurner, BridgeState, BurnRequest, CctpError, DomainId, MintOrchestrator,
    MintOutcome, Network, PollingConfig, ReadyAttestation,
};
use solana_sdk::signature::Keypair;
use std::time::Duration;

const BURN_SIG: &str = "4hXTCkRzt9WyecNzV1XPgCDfGAZzQKNxLXgynz5QDuWWPSAZBZSHptvWRL3BjCvzUXRdKvHL2b7yGrRQcWyaqsaBCncVG7BFggS";
const SOLANA_OWNER: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

fn payer() -> LocalAccount {
    LocalAccount::from_private_key(&"5a".repeat(32)).unwrap()
}

fn payer_config() -> FeePayerConfig {
    FeePayerConfig {
        address: None,
        account: Some(payer()),
    }
}

fn ready(recipient: B256, nonce: u64) -> ReadyAttestation {
    ReadyAttestation {
        message: Bytes::from(attested_message_bytes(DomainId::Aptos, recipient, nonce)),
        attestation: Bytes::from(vec![0x1b; 130]),
        event_nonce: Some(nonce.to_string()),
    }
}

fn minter(
    attestation: FakeAttestationProvider,
    node: FakeAptosNode,
    clock: FakeClock,
) -> MintOrchestrator<FakeAttestationProvider, FakeAptosNode, FakeClock> {
    MintOrchestrator::builder()
        .attestation(attestation)
        .node(node)
        .clock(clock)
        .network(Network::Mainnet)
        .receive_message_script(vec![0xa1, 0x1c, 0xeb, 0x0b, 0x07])
        .fee_payer(payer_config())
        .polling(
            PollingConfig::default()
                .with_max_attempts(6)
                .with_poll_interval_secs(15)
                .with_max_interval_secs(60),
        )
        .build()
}

fn burner(
    node: FakeAptosNode,
    relay: FakeSponsorRelay,
) -> AptosBurner<FakeAptosNode, FakeSponsorRelay> {
    AptosBurner::builder()
        .node(node)
        .relay(relay)
        .network(Network::Mainnet)
        .cctp_tools(AccountAddress::from_hex("0xc7a5").unwrap())
        .fee_payer(payer_config())
        .build()
}

#[tokio::test]
async fn test_wait_and_mint_backs_off_until_attested() {
    let recipient = B256::repeat_byte(0x42);
    let attestation = FakeAttestationProvider::pending_then_ready(3, ready(recipient, 7));
    let node = FakeAptosNode::mainnet();
    let clock = FakeClock::new();
    let mint = minter(attestation.clone(), node.clone(), clock.clone());

    let outcome = mint
        .wait_and_mint(DomainId::Solana, BURN_SIG, Some(AccountAddress::from(recipient)))
        .await
        .unwrap();

    let MintOutcome::Minted { operation, receipt } = outcome else {
        panic!("expected a confirmed mint");
    };
    assert_eq!(operation.state(), BridgeState::MintConfirmed);
    assert_eq!(operation.source_tx_hash(), BURN_SIG);
    assert_eq!(receipt.nonce, 7);
    assert_eq!(receipt.source_domain, 5);
    assert_eq!(attestation.calls(), 4, "three pending lookups then ready");

    // 15s, 30s, 60s between lookups; the fake node commits on first status check
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(105));
    assert_eq!(node.submitted().len(), 1);
}

#[tokio::test]
async fn test_wait_and_mint_times_out_without_minting() {
    let node = FakeAptosNode::mainnet();
    let clock = FakeClock::new();
    let mint = minter(FakeAttestationProvider::pending(), node.clone(), clock.clone());

    let err = mint
        .wait_and_mint(DomainId::Solana, BURN_SIG, None)
        .await
        .unwrap_err();

    assert!(matches!(err, CctpError::AttestationTimeout));
    assert_eq!(err.status_code(), 504);
    assert_eq!(clock.sleep_count(), 5, "no sleep after the last attempt");
    assert!(node.submitted().is_empty());
}

#[tokio::test]
async fn test_client_driven_polling_reports_pending_then_mints() {
    let recipient = B256::repeat_byte(0x42);
    let attestation = FakeAttestationProvider::pending_then_ready(2, ready(recipient, 11));
    let node = FakeAptosNode::mainnet();
    let clock = FakeClock::new();
    let mint = minter(attestation, node.clone(), clock.clone());

    for _ in 0..2 {
        let outcome = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap();
        assert!(matches!(outcome, MintOutcome::Pending { .. }));
    }
    let outcome = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap();
    assert!(matches!(outcome, MintOutcome::Minted { .. }));

    // Single-shot lookups never sleep server side
    assert_eq!(clock.sleep_count(), 0);
    assert_eq!(node.submitted().len(), 1);
}

#[tokio::test]
async fn test_failed_vm_status_is_terminal() {
    let recipient = B256::repeat_byte(0x42);
    let node = FakeAptosNode::mainnet().with_vm_failure("Move abort: ENONCE_ALREADY_USED");
    let clock = FakeClock::new();
    let mint = minter(
        FakeAttestationProvider::ready(ready(recipient, 3)),
        node.clone(),
        clock.clone(),
    );

    let err = mint
        .mint(DomainId::Solana, BURN_SIG, None)
        .await
        .unwrap_err();

    match err {
        CctpError::TransactionFailed { vm_status } => {
            assert!(vm_status.contains("ENONCE_ALREADY_USED"));
        }
        other => panic!("expected TransactionFailed, got {other:?}"),
    }
    assert_eq!(node.submit_attempts(), 1, "a VM failure is not resubmitted");
}

#[tokio::test]
async fn test_transient_submission_failures_are_retried() {
    let recipient = B256::repeat_byte(0x42);
    let node = FakeAptosNode::mainnet().fail_submissions(2);
    let clock = FakeClock::new();
    let mint = MintOrchestrator::builder()
        .attestation(FakeAttestationProvider::ready(ready(recipient, 9)))
        .node(node.clone())
        .clock(clock.clone())
        .network(Network::Mainnet)
        .receive_message_script(vec![0xa1, 0x1c, 0xeb, 0x0b])
        .fee_payer(payer_config())
        .submit_retry(SubmitRetryConfig {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        })
        .confirmation(ConfirmationConfig {
            max_attempts: 4,
            poll_interval: Duration::from_secs(2),
        })
        .build();

    let outcome = mint.mint(DomainId::Solana, BURN_SIG, None).await.unwrap();

    assert!(matches!(outcome, MintOutcome::Minted { .. }));
    assert_eq!(node.submit_attempts(), 3);
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(10));
}

#[tokio::test]
async fn test_sponsored_burn_goes_through_relay() {
    let node = FakeAptosNode::mainnet();
    let relay = FakeSponsorRelay::accepting("0xsponsored");
    let burner = burner(node.clone(), relay.clone());
    let sender = LocalAccount::from_private_key(&"0c".repeat(32)).unwrap();

    let request = BurnRequest::builder()
        .sender(sender.address())
        .amount(2_500_000)
        .destination_domain(DomainId::Solana)
        .recipient(SOLANA_OWNER)
        .sponsored(true)
        .build();

    let tx_hash = burner.burn_with_signer(&request, &sender).await.unwrap();

    assert_eq!(tx_hash, "0xsponsored");
    let submissions = relay.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].fee_payer_address, None);
    assert!(node.submitted().is_empty(), "sponsored burns skip the fullnode");
}

#[tokio::test]
async fn test_direct_burn_is_cosigned_by_fee_payer() {
    let node = FakeAptosNode::mainnet();
    let burner = burner(node.clone(), FakeSponsorRelay::rejecting("unused"));
    let sender = LocalAccount::from_private_key(&"0c".repeat(32)).unwrap();

    let request = BurnRequest::builder()
        .sender(sender.address())
        .amount(1_000_000)
        .destination_domain(DomainId::Ethereum)
        .recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d")
        .build();

    burner.burn_with_signer(&request, &sender).await.unwrap();

    let submitted = node.submitted();
    assert_eq!(submitted.len(), 1);
    match &submitted[0].authenticator {
        TransactionAuthenticator::FeePayer {
            fee_payer_address, ..
        } => assert_eq!(*fee_payer_address, payer().address()),
        other => panic!("expected fee payer authenticator, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sponsorship_rejection_names_the_function() {
    let burner = burner(
        FakeAptosNode::mainnet(),
        FakeSponsorRelay::rejecting("no rule matches"),
    );
    let sender = LocalAccount::from_private_key(&"0c".repeat(32)).unwrap();
    let request = BurnRequest::builder()
        .sender(sender.address())
        .amount(1_000_000)
        .destination_domain(DomainId::Solana)
        .recipient(SOLANA_OWNER)
        .sponsored(true)
        .build();

    let err = burner
        .burn_with_signer(&request, &sender)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 502);
    assert!(err
        .to_string()
        .contains("::cctp_tools::deposit_for_burn"));
}

#[tokio::test]
async fn test_derived_solana_account_burns_with_abstraction_auth() {
    let node = FakeAptosNode::mainnet();
    let relay = FakeSponsorRelay::accepting("0xderived");
    let burner = burner(node, relay.clone());
    let signer = SolanaDerivedSigner::new(
        Keypair::new_from_array([3; 32]),
        "bridge.example.com",
        Network::Mainnet,
    )
    .unwrap();

    let request = BurnRequest::builder()
        .sender(signer.address())
        .amount(1_000_000)
        .destination_domain(DomainId::Solana)
        .recipient(SOLANA_OWNER)
        .sponsored(true)
        .build();

    let tx_hash = burner.burn_with_signer(&request, &signer).await.unwrap();
    assert_eq!(tx_hash, "0xderived");
    assert_eq!(relay.submissions()[0].raw_txn.sender, signer.address());
}

#[tokio::test]
async fn test_signer_must_match_sender() {
    let burner = burner(
        FakeAptosNode::mainnet(),
        FakeSponsorRelay::accepting("0xunused"),
    );
    let signer = LocalAccount::from_private_key(&"0c".repeat(32)).unwrap();
    let request = BurnRequest::builder()
        .sender(AccountAddress([1; 32]))
        .amount(1_000_000)
        .destination_domain(DomainId::Solana)
        .recipient(SOLANA_OWNER)
        .build();

    let err = burner
        .burn_with_signer(&request, &signer)
        .await
        .unwrap_err();
    assert!(matches!(err, CctpError::Validation(_)));
}

#[tokio::test]
async fn test_solana_burn_then_aptos_mint() {
    use cctp_aptos::config::SolanaPayerConfig;
    use cctp_aptos::SolanaBurner;
    use solana_sdk::signature::Signer;

    let solana_payer = Keypair::new_from_array([1; 32]);
    let tmp_wallet = Keypair::new_from_array([2; 32]);
    let aptos_recipient = AccountAddress([0x42; 32]);

    let rpc = FakeSolanaRpc::new().with_balance(3_000_000);
    let solana = SolanaBurner::builder()
        .rpc(rpc.clone())
        .network(Network::Mainnet)
        .payer(SolanaPayerConfig::new(
            Some(solana_payer.to_base58_string()),
            Some(solana_payer.pubkey().to_string()),
        ))
        .build();

    let receipt = solana
        .burn(
            &tmp_wallet.to_base58_string(),
            &aptos_recipient.to_string(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(receipt.amount, 3_000_000);
    assert_eq!(receipt.mint_recipient, aptos_recipient.to_b256());
    assert_eq!(rpc.sent().len(), 1);

    let node = FakeAptosNode::mainnet();
    let mint = minter(
        FakeAttestationProvider::ready(ready(receipt.mint_recipient, 21)),
        node.clone(),
        FakeClock::new(),
    );
    let outcome = mint
        .mint(DomainId::Solana, &receipt.signature, Some(aptos_recipient))
        .await
        .unwrap();

    let MintOutcome::Minted { operation, .. } = outcome else {
        panic!("expected mint");
    };
    assert_eq!(operation.source_tx_hash(), receipt.signature);
    assert_eq!(node.submitted()[0].raw_txn.sender, payer().address());
}
