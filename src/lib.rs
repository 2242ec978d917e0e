// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # cctp-aptos
//!
//! Circle's Cross-Chain Transfer Protocol (CCTP) for USDC moving into and out
//! of Aptos, with Solana as the main counterpart.
//!
//! The crate covers the whole burn → attestation → mint path:
//!
//! - the deposit message codec and its digest ([`DepositMessage`])
//! - building and submitting Aptos `deposit_for_burn` transactions, paid by
//!   a configured fee payer or sponsored by the Aptos Gas Station
//!   ([`AptosBurner`])
//! - burning from a throwaway Solana wallet toward an Aptos recipient
//!   ([`SolanaBurner`])
//! - fetching Circle's attestation and minting on Aptos ([`MintOrchestrator`])
//! - normalizing whatever a wallet hands back into a BCS authenticator
//!   ([`wallet`])
//!
//! and a warp server exposing it all over HTTP ([`api`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cctp_aptos::providers::{AptosRestClient, IrisAttestationProvider, TokioClock};
//! use cctp_aptos::{CctpError, DomainId, MintOrchestrator, MintOutcome, Network};
//!
//! # async fn example() -> Result<(), CctpError> {
//! let minter = MintOrchestrator::builder()
//!     .attestation(IrisAttestationProvider::production())
//!     .node(AptosRestClient::new(Network::Mainnet.default_aptos_node_url(), None))
//!     .clock(TokioClock::new())
//!     .network(Network::Mainnet)
//!     .build();
//!
//! // One lookup; a burn Circle has not attested yet is not an error.
//! match minter.mint(DomainId::Solana, "5h3v...burnSignature", None).await? {
//!     MintOutcome::Pending { reason, .. } => println!("retry later: {reason}"),
//!     MintOutcome::Minted { receipt, .. } => println!("minted in {}", receipt.mint_tx_hash),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`DomainId`], [`DepositMessage`], [`AttestedMessage`] - protocol types
//! - [`AptosBurner`], [`SolanaBurner`], [`MintOrchestrator`] - bridge flows
//! - [`BridgeOperation`] and [`BridgeState`] - lifecycle of one transfer
//! - [`Config`] - environment-derived server configuration
//! - [`CctpError`] and [`Result`] - Error types for error handling
//! - [`traits`] and [`testing`] - provider seams and their fakes

pub mod api;
pub mod bridge;
pub mod chain;
pub mod config;
mod error;
pub mod protocol;
pub mod providers;
pub mod testing;
pub mod traits;
pub mod wallet;

pub use bridge::{
    AptosBurner, BridgeOperation, BridgeState, BuiltBurn, BurnRequest, MintOrchestrator,
    MintOutcome, MintReceipt, PollingConfig, SolanaBurnReceipt, SolanaBurner,
};
pub use chain::aptos::AccountAddress;
pub use chain::Network;
pub use config::Config;
pub use error::{CctpError, Result};
pub use protocol::{
    AddressInput, AttestationLookup, AttestedMessage, DepositMessage, DigestAlgorithm, DomainId,
    ReadyAttestation,
};

// Public module for advanced users who need custom instrumentation
pub mod spans;
