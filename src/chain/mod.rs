// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain configuration and transaction formats for CCTP on Aptos and Solana
//!
//! This module contains the fixed package/program addresses, the Aptos BCS
//! transaction model and the Solana CCTP instruction builders.

pub mod addresses;
pub mod aptos;
pub mod solana;

use alloy_primitives::B256;
use solana_sdk::pubkey::Pubkey;
use std::{fmt, str::FromStr};

use crate::bridge::{IRIS_API, IRIS_API_SANDBOX};
use crate::error::CctpError;
use addresses::*;

/// Which pair of networks the service bridges between.
///
/// Aptos mainnet pairs with Solana mainnet-beta, Aptos testnet with Solana
/// devnet, mirroring Circle's own environment split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn aptos_chain_id(self) -> u8 {
        match self {
            Self::Mainnet => APTOS_MAINNET_CHAIN_ID,
            Self::Testnet => APTOS_TESTNET_CHAIN_ID,
        }
    }

    pub fn aptos_message_transmitter(self) -> B256 {
        match self {
            Self::Mainnet => APTOS_MESSAGE_TRANSMITTER,
            Self::Testnet => APTOS_TESTNET_MESSAGE_TRANSMITTER,
        }
    }

    pub fn aptos_token_messenger_minter(self) -> B256 {
        match self {
            Self::Mainnet => APTOS_TOKEN_MESSENGER_MINTER,
            Self::Testnet => APTOS_TESTNET_TOKEN_MESSENGER_MINTER,
        }
    }

    pub fn aptos_usdc(self) -> B256 {
        match self {
            Self::Mainnet => APTOS_USDC,
            Self::Testnet => APTOS_TESTNET_USDC,
        }
    }

    pub fn solana_usdc(self) -> Pubkey {
        match self {
            Self::Mainnet => SOLANA_USDC,
            Self::Testnet => SOLANA_DEVNET_USDC,
        }
    }

    pub fn default_aptos_node_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet.aptoslabs.com/v1",
            Self::Testnet => "https://api.testnet.aptoslabs.com/v1",
        }
    }

    pub fn default_solana_rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet-beta.solana.com",
            Self::Testnet => "https://api.devnet.solana.com",
        }
    }

    pub fn iris_api_url(self) -> &'static str {
        match self {
            Self::Mainnet => IRIS_API,
            Self::Testnet => IRIS_API_SANDBOX,
        }
    }

    /// Label used in the Sign-In-With-Solana statement for derived accounts.
    pub fn aptos_label(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl FromStr for Network {
    type Err = CctpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" | "devnet" => Ok(Self::Testnet),
            other => Err(CctpError::InvalidConfig(format!(
                "Unknown network '{other}', expected mainnet or testnet"
            ))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.aptos_label())
    }
}
