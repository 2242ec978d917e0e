// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Bridge flows
//!
//! Burning USDC on Aptos or Solana, fetching Circle's attestation, and
//! minting on Aptos, each generic over the provider traits in
//! [`crate::traits`].

mod burn;
mod config;
mod mint;
mod params;
mod solana_burn;
mod state;

pub use burn::{AptosBurner, BuiltBurn, ScriptSigningRequest, CCTP_TOOLS_MODULE, DEPOSIT_FOR_BURN};
pub use config::{
    expiration_timestamp_secs, ConfirmationConfig, GasConfig, PollingConfig, SubmitRetryConfig,
    DEFAULT_EXPIRY_SECS, IRIS_API, IRIS_API_SANDBOX, MESSAGES_PATH_V1, SPONSORED_EXPIRY_SECS,
};
pub use mint::{MintOrchestrator, MintOutcome, MintReceipt};
pub use params::{parse_usdc_amount, BurnRequest, HumanAmount};
pub use solana_burn::{SolanaBurnReceipt, SolanaBurner};
pub use state::{BridgeOperation, BridgeState};
