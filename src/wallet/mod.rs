// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Wallet and signer adapters
//!
//! Pure, synchronous helpers that turn whatever a wallet returns into the
//! single authenticator shape the submission paths need, and that decide
//! who pays for a transaction.

mod authenticator;
mod derived;
mod fee_payer;

pub use authenticator::{
    parse_function_info, AbstractionAuthenticator, ByteInput, Ed25519Authenticator,
    LegacyEd25519, SenderAuthenticatorInput, WalletResponse, WalletStatus,
};
pub use derived::SolanaDerivedSigner;
pub use fee_payer::{FeePayerConfig, FeePayerPurpose, FeePayerSource, ResolvedFeePayer};

use crate::chain::aptos::{AccountAddress, AccountAuthenticator, LocalAccount, SimpleTransaction};
use crate::error::Result;
use crate::traits::TransactionSigner;

impl TransactionSigner for LocalAccount {
    fn address(&self) -> AccountAddress {
        LocalAccount::address(self)
    }

    fn sign_transaction(
        &self,
        transaction: &SimpleTransaction,
        sponsored: bool,
    ) -> Result<AccountAuthenticator> {
        Ok(self.sign(&transaction.signing_message(sponsored)?))
    }
}
