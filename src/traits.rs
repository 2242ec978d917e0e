// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Core trait abstractions for CCTP bridge operations.
//!
//! This module defines the seams between the bridge logic and the outside
//! world: Circle's attestation service, the Aptos fullnode, Solana JSON-RPC,
//! the Aptos Gas Station and the clock. Production implementations live in
//! [`crate::providers`], fakes in [`crate::testing`].
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use cctp_aptos::{AttestationLookup, AttestationProvider, DomainId, Result};
//!
//! struct AlwaysPending;
//!
//! #[async_trait::async_trait]
//! impl AttestationProvider for AlwaysPending {
//!     async fn get_messages(&self, _: DomainId, _: &str) -> Result<AttestationLookup> {
//!         Ok(AttestationLookup::pending("not yet"))
//!     }
//! }
//! ```

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, transaction::Transaction};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chain::aptos::{
    AccountAddress, AccountAuthenticator, AuthenticatorBytes, LedgerInfo, SignedTransaction,
    SimpleTransaction, TransactionStatus,
};
use crate::error::Result;
use crate::protocol::{AttestationLookup, DomainId};

/// Trait for attestation retrieval from Circle's Iris API.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Rate limiting (429 responses)
/// - Burns Circle has not indexed yet (404 / empty message list)
/// - Pending → ready transitions
/// - Malformed responses
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Looks up the messages emitted by a source-chain transaction.
    ///
    /// A burn Circle has not seen yet is `Ok(AttestationLookup::Pending)`,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the API rate limits the
    /// caller, or the response cannot be parsed.
    async fn get_messages(&self, source_domain: DomainId, tx_hash: &str)
        -> Result<AttestationLookup>;
}

/// Trait for the Aptos fullnode REST API.
#[async_trait]
pub trait AptosNode: Send + Sync {
    /// Chain id and current ledger timestamp.
    async fn ledger_info(&self) -> Result<LedgerInfo>;

    /// Next sequence number for `address`.
    async fn sequence_number(&self, address: AccountAddress) -> Result<u64>;

    /// Submits a signed transaction and returns its hash.
    async fn submit(&self, transaction: &SignedTransaction) -> Result<String>;

    /// Returns `None` while the node has never heard of the hash.
    async fn transaction_status(&self, tx_hash: &str) -> Result<Option<TransactionStatus>>;
}

/// Trait for the subset of Solana JSON-RPC the burn path needs.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Base-unit balance of an SPL token account; zero when it does not exist.
    async fn token_balance(&self, token_account: &Pubkey) -> Result<u64>;

    /// Sends a signed transaction and returns its base58 signature.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<String>;
}

/// Trait for a fee sponsorship relay (Aptos Gas Station).
#[async_trait]
pub trait SponsorRelay: Send + Sync {
    /// Has the relay co-sign as fee payer and submit; returns the hash.
    ///
    /// # Errors
    ///
    /// A relay refusal is [`crate::CctpError::SponsorshipRejected`] naming
    /// the entry function, so operators know which rule to add.
    async fn sign_and_submit(
        &self,
        transaction: &SimpleTransaction,
        sender_authenticator: &AuthenticatorBytes,
    ) -> Result<String>;
}

/// Trait for time-based operations.
///
/// This trait abstracts sleep and time queries, enabling fast-forward testing
/// where tests can instantly advance through polling loops and timeouts without
/// actually waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}

/// Something that can authorize an Aptos transaction as its sender.
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> AccountAddress;

    /// Signs `transaction`. `sponsored` selects the fee-payer signing
    /// envelope even when the payer address is not yet known.
    fn sign_transaction(
        &self,
        transaction: &SimpleTransaction,
        sponsored: bool,
    ) -> Result<AccountAuthenticator>;
}

// Shared handles delegate, so services can hold `Arc<dyn Trait>`.

#[async_trait]
impl<T: AttestationProvider + ?Sized> AttestationProvider for Arc<T> {
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_hash: &str,
    ) -> Result<AttestationLookup> {
        (**self).get_messages(source_domain, tx_hash).await
    }
}

#[async_trait]
impl<T: AptosNode + ?Sized> AptosNode for Arc<T> {
    async fn ledger_info(&self) -> Result<LedgerInfo> {
        (**self).ledger_info().await
    }

    async fn sequence_number(&self, address: AccountAddress) -> Result<u64> {
        (**self).sequence_number(address).await
    }

    async fn submit(&self, transaction: &SignedTransaction) -> Result<String> {
        (**self).submit(transaction).await
    }

    async fn transaction_status(&self, tx_hash: &str) -> Result<Option<TransactionStatus>> {
        (**self).transaction_status(tx_hash).await
    }
}

#[async_trait]
impl<T: SolanaRpc + ?Sized> SolanaRpc for Arc<T> {
    async fn latest_blockhash(&self) -> Result<Hash> {
        (**self).latest_blockhash().await
    }

    async fn token_balance(&self, token_account: &Pubkey) -> Result<u64> {
        (**self).token_balance(token_account).await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<String> {
        (**self).send_transaction(transaction).await
    }
}

#[async_trait]
impl<T: SponsorRelay + ?Sized> SponsorRelay for Arc<T> {
    async fn sign_and_submit(
        &self,
        transaction: &SimpleTransaction,
        sender_authenticator: &AuthenticatorBytes,
    ) -> Result<String> {
        (**self)
            .sign_and_submit(transaction, sender_authenticator)
            .await
    }
}

#[async_trait]
impl<T: Clock + ?Sized> Clock for Arc<T> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}
