// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Solana → Aptos burn from a temporary wallet.
//!
//! The temporary wallet owns the USDC and authorizes the burn; the server's
//! payer covers fees and the message account rent, so the temporary wallet
//! never needs SOL.

use alloy_primitives::B256;
use bon::Builder;
use serde::Serialize;
use solana_sdk::signature::{Keypair, Signer};
use tracing::{error, info, Instrument};

use crate::chain::solana::{
    associated_token_address, keypair_from_base58, sign_deposit_for_burn, DepositForBurnParams,
};
use crate::chain::Network;
use crate::config::SolanaPayerConfig;
use crate::error::{CctpError, Result};
use crate::protocol::{parse_recipient, DomainId};
use crate::spans;
use crate::traits::SolanaRpc;

/// Outcome of a submitted Solana burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaBurnReceipt {
    pub signature: String,
    /// Base units
    pub amount: u64,
    pub owner: String,
    pub mint_recipient: B256,
}

#[derive(Builder, Clone, Debug)]
pub struct SolanaBurner<S: SolanaRpc> {
    rpc: S,
    network: Network,
    payer: SolanaPayerConfig,
}

impl<S: SolanaRpc> SolanaBurner<S> {
    /// Burns USDC held by `tmp_wallet_private_key` toward `aptos_recipient`.
    ///
    /// Without `amount` the wallet's whole USDC balance is burned.
    ///
    /// # Errors
    ///
    /// Payer configuration problems and malformed inputs are reported before
    /// any RPC call is made. An empty balance is a validation error.
    pub async fn burn(
        &self,
        tmp_wallet_private_key: &str,
        aptos_recipient: &str,
        amount: Option<u64>,
    ) -> Result<SolanaBurnReceipt> {
        let payer = self.payer.keypair()?;
        let owner = keypair_from_base58(tmp_wallet_private_key)?;
        let mint_recipient = parse_recipient(DomainId::Aptos, aptos_recipient)?;
        if amount == Some(0) {
            return Err(CctpError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let owner_address = owner.pubkey().to_string();
        let span = spans::solana_burn(&owner_address, aptos_recipient);
        async move {
            let result = self
                .burn_inner(&payer, &owner, mint_recipient, amount)
                .await;
            match &result {
                Ok(receipt) => {
                    let span = tracing::Span::current();
                    span.record("amount", receipt.amount);
                    span.record("signature", receipt.signature.as_str());
                    info!(
                        signature = %receipt.signature,
                        amount = receipt.amount,
                        mint_recipient = %receipt.mint_recipient,
                        event = "solana_burn_submitted"
                    );
                }
                Err(e) => {
                    spans::record_error(e);
                    error!(error = %e, event = "solana_burn_failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn burn_inner(
        &self,
        payer: &Keypair,
        owner: &Keypair,
        mint_recipient: B256,
        amount: Option<u64>,
    ) -> Result<SolanaBurnReceipt> {
        let usdc = self.network.solana_usdc();
        let amount = match amount {
            Some(amount) => amount,
            None => {
                let token_account = associated_token_address(&owner.pubkey(), &usdc);
                let balance = self.rpc.token_balance(&token_account).await?;
                info!(
                    token_account = %token_account,
                    balance = balance,
                    event = "solana_usdc_balance_fetched"
                );
                if balance == 0 {
                    return Err(CctpError::Validation(format!(
                        "Wallet {} holds no USDC to burn",
                        owner.pubkey()
                    )));
                }
                balance
            }
        };

        let params = DepositForBurnParams {
            amount,
            destination_domain: DomainId::Aptos.as_u32(),
            mint_recipient: mint_recipient.0,
        };
        let message_sent_event_data = Keypair::new();
        let blockhash = self.rpc.latest_blockhash().await?;
        let transaction = sign_deposit_for_burn(
            payer,
            owner,
            &message_sent_event_data,
            usdc,
            params,
            blockhash,
        )?;
        let signature = self.rpc.send_transaction(&transaction).await?;

        Ok(SolanaBurnReceipt {
            signature,
            amount,
            owner: owner.pubkey().to_string(),
            mint_recipient,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSolanaRpc;

    const APTOS_RECIPIENT: &str =
        "0x0707070707070707070707070707070707070707070707070707070707070707";

    fn keypair_b58(seed: u8) -> String {
        Keypair::new_from_array([seed; 32]).to_base58_string()
    }

    fn burner(rpc: FakeSolanaRpc, payer: SolanaPayerConfig) -> SolanaBurner<FakeSolanaRpc> {
        SolanaBurner::builder()
            .rpc(rpc)
            .network(Network::Mainnet)
            .payer(payer)
            .build()
    }

    #[tokio::test]
    async fn test_burns_explicit_amount() {
        let rpc = FakeSolanaRpc::new();
        let receipt = burner(rpc.clone(), SolanaPayerConfig::new(Some(keypair_b58(1)), None))
            .burn(&keypair_b58(2), APTOS_RECIPIENT, Some(250_000))
            .await
            .unwrap();

        assert_eq!(receipt.amount, 250_000);
        assert_eq!(receipt.mint_recipient, B256::repeat_byte(7));
        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        // payer, owner and the message account all sign
        assert_eq!(sent[0].signatures.len(), 3);
        assert_eq!(
            sent[0].message.account_keys[0],
            Keypair::new_from_array([1; 32]).pubkey()
        );
    }

    #[tokio::test]
    async fn test_burns_whole_balance_when_amount_missing() {
        let rpc = FakeSolanaRpc::new().with_balance(3_000_000);
        let receipt = burner(rpc, SolanaPayerConfig::new(Some(keypair_b58(1)), None))
            .burn(&keypair_b58(2), APTOS_RECIPIENT, None)
            .await
            .unwrap();
        assert_eq!(receipt.amount, 3_000_000);
    }

    #[tokio::test]
    async fn test_empty_balance_is_validation_error() {
        let rpc = FakeSolanaRpc::new();
        let err = burner(rpc.clone(), SolanaPayerConfig::new(Some(keypair_b58(1)), None))
            .burn(&keypair_b58(2), APTOS_RECIPIENT, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CctpError::Validation(_)));
        assert!(rpc.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_payer_key_before_network() {
        let rpc = FakeSolanaRpc::new();
        let err = burner(rpc.clone(), SolanaPayerConfig::new(None, None))
            .burn(&keypair_b58(2), APTOS_RECIPIENT, Some(1))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(rpc.calls(), 0);
    }

    #[tokio::test]
    async fn test_payer_mismatch_before_network() {
        let rpc = FakeSolanaRpc::new();
        let other = Keypair::new_from_array([9; 32]).pubkey().to_string();
        let err = burner(
            rpc.clone(),
            SolanaPayerConfig::new(Some(keypair_b58(1)), Some(other)),
        )
        .burn(&keypair_b58(2), APTOS_RECIPIENT, Some(1))
        .await
        .unwrap_err();
        assert!(matches!(err, CctpError::FeePayerMismatch { .. }));
        assert_eq!(err.status_code(), 500);
        assert_eq!(rpc.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_recipient() {
        let rpc = FakeSolanaRpc::new();
        let err = burner(rpc, SolanaPayerConfig::new(Some(keypair_b58(1)), None))
            .burn(&keypair_b58(2), "not-an-address", Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CctpError::Validation(_) | CctpError::Hex(_)));
    }
}
