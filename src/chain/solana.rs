// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Solana side of the bridge: token account derivation, the CCTP
//! `deposit_for_burn` instruction, and keypair loading.

use alloy_primitives::B256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use borsh::BorshSerialize;
use solana_sdk::{
    hash::{hash, Hash},
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use super::addresses::{
    ASSOCIATED_TOKEN_PROGRAM, SOLANA_MESSAGE_TRANSMITTER, SOLANA_TOKEN_MESSENGER_MINTER,
    SPL_TOKEN_PROGRAM, SYSTEM_PROGRAM,
};
use crate::error::{CctpError, Result};

const DISCRIMINATOR_SIZE: usize = 8;

/// Decodes a base58 private key string into a Keypair.
///
/// Solana private keys are 64 bytes (seed + public key) encoded as base58.
pub fn keypair_from_base58(b58: &str) -> Result<Keypair> {
    let bytes = bs58::decode(b58.trim())
        .into_vec()
        .map_err(|e| CctpError::Validation(format!("Invalid base58 private key: {e}")))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| CctpError::Validation(format!("Invalid keypair bytes: {e}")))
}

/// Associated token account of `owner` for `mint` under the classic SPL
/// token program.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), SPL_TOKEN_PROGRAM.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM,
    )
    .0
}

/// CCTP mint recipient for a Solana destination.
///
/// The Solana token minter credits a token account, so the recipient is the
/// owner's USDC associated token account, never the wallet itself.
pub fn mint_recipient_for(owner: &Pubkey, usdc_mint: &Pubkey) -> B256 {
    B256::from(associated_token_address(owner, usdc_mint).to_bytes())
}

pub fn pubkey_from_b256(value: B256) -> Pubkey {
    Pubkey::new_from_array(value.0)
}

/// Arguments of `token_messenger_minter::deposit_for_burn`.
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct DepositForBurnParams {
    pub amount: u64,
    pub destination_domain: u32,
    pub mint_recipient: [u8; 32],
}

impl DepositForBurnParams {
    /// Anchor instruction data: `sha256("global:deposit_for_burn")[..8]`
    /// followed by the borsh-encoded params.
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(DISCRIMINATOR_SIZE + 44);
        data.extend_from_slice(&hash(b"global:deposit_for_burn").to_bytes()[..DISCRIMINATOR_SIZE]);
        data.extend(self.try_to_vec().map_err(CctpError::build)?);
        Ok(data)
    }
}

/// Program-derived accounts the token messenger minter expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CctpAccounts {
    pub sender_authority: Pubkey,
    pub message_transmitter: Pubkey,
    pub token_messenger: Pubkey,
    pub remote_token_messenger: Pubkey,
    pub token_minter: Pubkey,
    pub local_token: Pubkey,
    pub event_authority: Pubkey,
}

impl CctpAccounts {
    pub fn derive(burn_token_mint: &Pubkey, destination_domain: u32) -> Self {
        let tmm = &SOLANA_TOKEN_MESSENGER_MINTER;
        let pda = |seeds: &[&[u8]], program: &Pubkey| Pubkey::find_program_address(seeds, program).0;
        let domain = destination_domain.to_string();

        Self {
            sender_authority: pda(&[b"sender_authority"], tmm),
            message_transmitter: pda(&[b"message_transmitter"], &SOLANA_MESSAGE_TRANSMITTER),
            token_messenger: pda(&[b"token_messenger"], tmm),
            remote_token_messenger: pda(&[b"remote_token_messenger", domain.as_bytes()], tmm),
            token_minter: pda(&[b"token_minter"], tmm),
            local_token: pda(&[b"local_token", burn_token_mint.as_ref()], tmm),
            event_authority: pda(&[b"__event_authority"], tmm),
        }
    }
}

/// Everything needed to burn USDC from a Solana wallet.
#[derive(Debug, Clone)]
pub struct DepositForBurn {
    pub owner: Pubkey,
    pub event_rent_payer: Pubkey,
    pub burn_token_mint: Pubkey,
    /// Fresh account that stores the emitted message; must co-sign.
    pub message_sent_event_data: Pubkey,
    pub params: DepositForBurnParams,
}

impl DepositForBurn {
    pub fn instruction(&self) -> Result<Instruction> {
        let accounts = CctpAccounts::derive(&self.burn_token_mint, self.params.destination_domain);
        let burn_token_account = associated_token_address(&self.owner, &self.burn_token_mint);

        Ok(Instruction {
            program_id: SOLANA_TOKEN_MESSENGER_MINTER,
            accounts: vec![
                AccountMeta::new_readonly(self.owner, true),
                AccountMeta::new(self.event_rent_payer, true),
                AccountMeta::new_readonly(accounts.sender_authority, false),
                AccountMeta::new(burn_token_account, false),
                AccountMeta::new(accounts.message_transmitter, false),
                AccountMeta::new_readonly(accounts.token_messenger, false),
                AccountMeta::new_readonly(accounts.remote_token_messenger, false),
                AccountMeta::new_readonly(accounts.token_minter, false),
                AccountMeta::new(accounts.local_token, false),
                AccountMeta::new(self.burn_token_mint, false),
                AccountMeta::new(self.message_sent_event_data, true),
                AccountMeta::new_readonly(SOLANA_MESSAGE_TRANSMITTER, false),
                AccountMeta::new_readonly(SOLANA_TOKEN_MESSENGER_MINTER, false),
                AccountMeta::new_readonly(SPL_TOKEN_PROGRAM, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM, false),
                AccountMeta::new_readonly(accounts.event_authority, false),
                AccountMeta::new_readonly(SOLANA_TOKEN_MESSENGER_MINTER, false),
            ],
            data: self.params.instruction_data()?,
        })
    }
}

/// Builds and signs the burn transaction. The payer covers fees and event
/// rent; the owner authorizes the burn.
pub fn sign_deposit_for_burn(
    payer: &Keypair,
    owner: &Keypair,
    event_data: &Keypair,
    burn_token_mint: Pubkey,
    params: DepositForBurnParams,
    recent_blockhash: Hash,
) -> Result<Transaction> {
    let instruction = DepositForBurn {
        owner: owner.pubkey(),
        event_rent_payer: payer.pubkey(),
        burn_token_mint,
        message_sent_event_data: event_data.pubkey(),
        params,
    }
    .instruction()?;

    Ok(Transaction::new_signed_with_payer(
        &[instruction],
        Some(&payer.pubkey()),
        &[payer, owner, event_data],
        recent_blockhash,
    ))
}

/// Base64 wire encoding accepted by `sendTransaction`.
pub fn encode_transaction(transaction: &Transaction) -> Result<String> {
    let bytes = bincode::serialize(transaction).map_err(CctpError::build)?;
    Ok(STANDARD.encode(bytes))
}
