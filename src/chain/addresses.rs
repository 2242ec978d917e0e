// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Fixed CCTP addresses for Aptos and Solana
//!
//! Aptos object and package addresses are 32-byte values; Solana program ids
//! and mints are [`Pubkey`]s.
//!
//! References:
//! - <https://developers.circle.com/stablecoins/aptos-packages>
//! - <https://developers.circle.com/stablecoins/solana-programs>
//! - <https://developers.circle.com/stablecoins/usdc-on-main-networks>

use alloy_primitives::{b256, B256};
use solana_sdk::{pubkey, pubkey::Pubkey};

// Aptos mainnet

/// `message_transmitter` package
pub const APTOS_MESSAGE_TRANSMITTER: B256 =
    b256!("177e17751820e4b4371873ca8c30279be63bdea63b88ed0f2239c2eea10f1772");

/// `token_messenger_minter` package
pub const APTOS_TOKEN_MESSENGER_MINTER: B256 =
    b256!("9bce6734f7b63e835108e3bd8c36743d4709fe435f44791918801d0989640a9d");

/// USDC fungible asset metadata object
pub const APTOS_USDC: B256 =
    b256!("bae207659db88bea0cbead6da0ed00aac12edcdda169e591cd41c94180b46f3b");

// Aptos testnet

pub const APTOS_TESTNET_MESSAGE_TRANSMITTER: B256 =
    b256!("081e86cebf457a0c6004f35bd648a2794698f52e0dde09a48619dcd3d4cc23d9");

pub const APTOS_TESTNET_TOKEN_MESSENGER_MINTER: B256 =
    b256!("5f9b937419dda90aa06c1836b7847f65bbbe3f1217567758dc2488be31a477b9");

pub const APTOS_TESTNET_USDC: B256 =
    b256!("69091fbab5f7d635ee7ac5098cf0c1efbe31d68fec0f2cd565e8d168daf52832");

/// Aptos chain ids as used in `RawTransaction::chain_id`
pub const APTOS_MAINNET_CHAIN_ID: u8 = 1;
pub const APTOS_TESTNET_CHAIN_ID: u8 = 2;

// Solana (program ids are identical on mainnet and devnet)

/// `MessageTransmitter` program
pub const SOLANA_MESSAGE_TRANSMITTER: Pubkey =
    pubkey!("CCTPmbSD7gX1bxKPAmg77w8oFzNFpaQiQUWD43TKaecd");

/// `TokenMessengerMinter` program
pub const SOLANA_TOKEN_MESSENGER_MINTER: Pubkey =
    pubkey!("CCTPiPYPc6AsJuwueEnWgSgucamXDZwBd53dQ11YiKX3");

/// <https://solscan.io/token/EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v>
pub const SOLANA_USDC: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

/// <https://solscan.io/token/4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU?cluster=devnet>
pub const SOLANA_DEVNET_USDC: Pubkey = pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");

pub const SPL_TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// USDC uses six decimals on every CCTP chain.
pub const USDC_DECIMALS: u32 = 6;

pub const SYSTEM_PROGRAM: Pubkey = pubkey!("11111111111111111111111111111111");
