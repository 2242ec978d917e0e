// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Fee payer identity resolution.
//!
//! Priority, highest first:
//!
//! 1. the configured payer address
//! 2. the address derived from the configured payer private key
//! 3. an address supplied with the request
//! 4. the sender paying for itself, for signing-message previews only
//!
//! When both an address and a private key are configured they must agree.

use crate::chain::aptos::{AccountAddress, LocalAccount};
use crate::config::{APTOS_PAYER_ADDRESS_ENV, APTOS_PAYER_PRIVATE_KEY_ENV};
use crate::error::{CctpError, Result};

/// What the resolved payer will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePayerPurpose {
    /// A transaction that will actually be submitted.
    Submission,
    /// Computing a signing message for display; nothing is spent.
    SigningPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePayerSource {
    ConfiguredAddress,
    ConfiguredKey,
    Request,
    Sender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFeePayer {
    pub address: AccountAddress,
    pub source: FeePayerSource,
}

/// Payer identity as configured on the server.
#[derive(Debug, Clone, Default)]
pub struct FeePayerConfig {
    pub address: Option<AccountAddress>,
    pub account: Option<LocalAccount>,
}

impl FeePayerConfig {
    /// Fails when both values are set and disagree.
    pub fn validate(&self) -> Result<()> {
        if let (Some(address), Some(account)) = (self.address, &self.account) {
            if address != account.address() {
                return Err(CctpError::FeePayerMismatch {
                    env: APTOS_PAYER_ADDRESS_ENV,
                    expected: address.to_string(),
                    derived: account.address().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn resolve(
        &self,
        requested: Option<AccountAddress>,
        sender: AccountAddress,
        purpose: FeePayerPurpose,
    ) -> Result<ResolvedFeePayer> {
        self.validate()?;

        let resolved = self
            .address
            .map(|address| (address, FeePayerSource::ConfiguredAddress))
            .or_else(|| {
                self.account
                    .as_ref()
                    .map(|account| (account.address(), FeePayerSource::ConfiguredKey))
            })
            .or_else(|| requested.map(|address| (address, FeePayerSource::Request)));

        match (resolved, purpose) {
            (Some((address, source)), _) => Ok(ResolvedFeePayer { address, source }),
            (None, FeePayerPurpose::SigningPreview) => Ok(ResolvedFeePayer {
                address: sender,
                source: FeePayerSource::Sender,
            }),
            (None, FeePayerPurpose::Submission) => Err(CctpError::MissingConfig(format!(
                "{APTOS_PAYER_ADDRESS_ENV} or {APTOS_PAYER_PRIVATE_KEY_ENV}"
            ))),
        }
    }

    /// The key that co-signs as fee payer. Required for direct submission.
    pub fn signer(&self) -> Result<&LocalAccount> {
        self.validate()?;
        self.account
            .as_ref()
            .ok_or_else(|| CctpError::MissingConfig(APTOS_PAYER_PRIVATE_KEY_ENV.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: &str) -> LocalAccount {
        LocalAccount::from_private_key(&byte.repeat(32)).unwrap()
    }

    fn addr(byte: u8) -> AccountAddress {
        AccountAddress([byte; 32])
    }

    #[test]
    fn test_configured_address_wins() {
        let config = FeePayerConfig {
            address: Some(addr(1)),
            account: None,
        };
        let resolved = config
            .resolve(Some(addr(2)), addr(3), FeePayerPurpose::Submission)
            .unwrap();
        assert_eq!(resolved.address, addr(1));
        assert_eq!(resolved.source, FeePayerSource::ConfiguredAddress);
    }

    #[test]
    fn test_key_derived_address_beats_request() {
        let key = account("11");
        let config = FeePayerConfig {
            address: None,
            account: Some(key.clone()),
        };
        let resolved = config
            .resolve(Some(addr(2)), addr(3), FeePayerPurpose::Submission)
            .unwrap();
        assert_eq!(resolved.address, key.address());
        assert_eq!(resolved.source, FeePayerSource::ConfiguredKey);
    }

    #[test]
    fn test_request_address_used_when_unconfigured() {
        let resolved = FeePayerConfig::default()
            .resolve(Some(addr(2)), addr(3), FeePayerPurpose::Submission)
            .unwrap();
        assert_eq!(resolved.source, FeePayerSource::Request);
    }

    #[test]
    fn test_sender_fallback_only_for_preview() {
        let config = FeePayerConfig::default();
        let preview = config
            .resolve(None, addr(3), FeePayerPurpose::SigningPreview)
            .unwrap();
        assert_eq!(preview.address, addr(3));
        assert_eq!(preview.source, FeePayerSource::Sender);

        let err = config
            .resolve(None, addr(3), FeePayerPurpose::Submission)
            .unwrap_err();
        assert!(matches!(err, CctpError::MissingConfig(_)));
    }

    #[test]
    fn test_mismatched_address_and_key_fail_closed() {
        let config = FeePayerConfig {
            address: Some(addr(9)),
            account: Some(account("11")),
        };
        assert!(matches!(
            config
                .resolve(None, addr(3), FeePayerPurpose::SigningPreview)
                .unwrap_err(),
            CctpError::FeePayerMismatch { .. }
        ));
        assert!(config.signer().is_err());
    }

    #[test]
    fn test_signer_requires_private_key() {
        let config = FeePayerConfig {
            address: Some(addr(1)),
            account: None,
        };
        assert!(matches!(
            config.signer().unwrap_err(),
            CctpError::MissingConfig(_)
        ));
    }
}
