// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP surface of the bridge service
//!
//! JSON endpoints for the wallet front end:
//!
//! | Route | Purpose |
//! |---|---|
//! | `POST /api/aptos/get-signing-message` | signing message of the compiled burn script |
//! | `POST /api/aptos/build-burn` | unsigned `deposit_for_burn` transaction |
//! | `POST /api/aptos/submit-burn` | submit a wallet-signed burn |
//! | `POST /api/aptos/mint-cctp` | one attestation lookup, minting when ready |
//! | `POST /api/compute-deposit-message-hash` | deposit message digest |
//! | `POST /api/privacy-bridge/burn` | Solana burn from a temporary wallet |
//! | `GET /health` | liveness |
//!
//! Every JSON response is wrapped in [`ApiResponse`]. An attestation Circle
//! has not produced yet is a successful response with `data.pending = true`.
//!
//! ## Security Model
//!
//! The server holds the fee payer keys for both chains. User keys never reach
//! it, except the throwaway Solana wallet of the privacy bridge.

mod aptos;
mod generic;
mod message;
mod privacy_bridge;

pub use aptos::{
    BuildBurnRequest, BuildBurnResponse, MintCctpRequest, MintCctpResponse,
    SigningMessageRequest, SigningMessageResponse, SubmitBurnRequest, SubmitBurnResponse,
};
pub use generic::{ApiResponse, ApiServer, AppState, Burner, HealthResponse, Minter, SolanaBridge};
pub use message::{DepositMessageHashRequest, DepositMessageHashResponse};
pub use privacy_bridge::PrivacyBurnRequest;
