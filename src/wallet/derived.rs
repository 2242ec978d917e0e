// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aptos accounts controlled by a Solana keypair.
//!
//! The account is a derivable account abstraction bound to
//! `0x1::solana_derivable_account::authenticate`. Its identity is the
//! Solana public key plus the dApp domain, so the same keypair used from a
//! different origin controls a different Aptos account.

use alloy_primitives::hex;
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use solana_sdk::signature::{Keypair, Signer};
use tracing::debug;

use crate::chain::aptos::{
    derivable_account_address, AbstractionAuthData, AccountAddress, AccountAuthenticator,
    FunctionInfo, SimpleTransaction,
};
use crate::chain::Network;
use crate::error::Result;
use crate::traits::TransactionSigner;

/// `SIWSAbstractSignature`
#[derive(Serialize)]
enum AbstractSignature {
    MessageV1 { signature: Vec<u8> },
}

fn authentication_function() -> FunctionInfo {
    FunctionInfo {
        module_address: AccountAddress::ONE,
        module_name: "solana_derivable_account".to_string(),
        function_name: "authenticate".to_string(),
    }
}

/// Signs Aptos transactions with a Solana keypair for a derived account.
pub struct SolanaDerivedSigner {
    keypair: Keypair,
    domain: String,
    network: Network,
    address: AccountAddress,
}

impl std::fmt::Debug for SolanaDerivedSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaDerivedSigner")
            .field("solana_address", &self.keypair.pubkey())
            .field("domain", &self.domain)
            .field("address", &self.address)
            .finish()
    }
}

impl SolanaDerivedSigner {
    /// `domain` must be the origin registered for the dApp, e.g.
    /// `app.example.com`. A mismatch produces a valid-looking signature the
    /// chain rejects.
    pub fn new(keypair: Keypair, domain: impl Into<String>, network: Network) -> Result<Self> {
        let domain = domain.into();
        let identity = abstract_public_key(&keypair.pubkey().to_string(), &domain)?;
        let address = derivable_account_address(&authentication_function(), &identity)?;
        Ok(Self {
            keypair,
            domain,
            network,
            address,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Sign-In-With-Solana statement the wallet signs in place of the raw
    /// transaction bytes.
    pub fn siws_message(&self, function_id: &str, digest: &[u8]) -> String {
        format!(
            "{domain} wants you to sign in with your Solana account:\n\
             {address}\n\
             \n\
             Please confirm you explicitly initiated this request from {domain}. \
             You are approving to execute transaction {function_id} on Aptos blockchain ({network}).\n\
             \n\
             Nonce: 0x{nonce}",
            domain = self.domain,
            address = self.keypair.pubkey(),
            network = self.network.aptos_label(),
            nonce = hex::encode(digest),
        )
    }
}

/// `bcs(base58 pubkey) ∥ bcs(domain)`
fn abstract_public_key(base58_public_key: &str, domain: &str) -> Result<Vec<u8>> {
    let mut out = bcs::to_bytes(base58_public_key)?;
    out.extend(bcs::to_bytes(domain)?);
    Ok(out)
}

impl TransactionSigner for SolanaDerivedSigner {
    fn address(&self) -> AccountAddress {
        self.address
    }

    fn sign_transaction(
        &self,
        transaction: &SimpleTransaction,
        sponsored: bool,
    ) -> Result<AccountAuthenticator> {
        let signing_message = transaction.signing_message(sponsored)?;
        let digest = Sha3_256::digest(&signing_message).to_vec();
        let statement = self.siws_message(&transaction.raw_txn.payload.function_id(), &digest);
        let signature = self.keypair.sign_message(statement.as_bytes());

        debug!(
            aptos_address = %self.address,
            solana_address = %self.keypair.pubkey(),
            domain = %self.domain,
            signing_message_len = signing_message.len(),
            event = "derived_account_signed"
        );

        Ok(AccountAuthenticator::Abstraction {
            function_info: authentication_function(),
            auth_data: AbstractionAuthData::DerivableV1 {
                signing_message_digest: digest,
                abstract_signature: bcs::to_bytes(&AbstractSignature::MessageV1 {
                    signature: signature.as_ref().to_vec(),
                })?,
                abstract_public_key: abstract_public_key(
                    &self.keypair.pubkey().to_string(),
                    &self.domain,
                )?,
            },
        })
    }
}
