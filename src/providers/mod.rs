// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Production implementations of CCTP trait abstractions.
//!
//! This module provides the "real" implementations of the traits defined in
//! [`crate::traits`] that talk to Circle's Iris API, the Aptos fullnode,
//! Solana JSON-RPC, the Aptos Gas Station and the system clock.

mod aptos_node;
mod gas_station;
mod iris;
mod solana_rpc;
mod tokio_clock;

pub use self::aptos_node::AptosRestClient;
pub use self::gas_station::GasStationClient;
pub use self::iris::IrisAttestationProvider;
pub use self::solana_rpc::SolanaRpcClient;
pub use self::tokio_clock::TokioClock;
