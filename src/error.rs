// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CctpError {
    /// A request field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A required server secret or setting is absent.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Fee payer mismatch: {env} is {expected}, but the configured private key derives {derived}"
    )]
    FeePayerMismatch {
        env: &'static str,
        expected: String,
        derived: String,
    },

    #[error("Failed to build transaction: {0}")]
    Build(String),

    #[error("User rejected the request")]
    UserRejected,

    #[error("Gas station rejected transaction for {function}: {reason}")]
    SponsorshipRejected { function: String, reason: String },

    #[error("Unsupported domain: {0}")]
    UnsupportedDomain(u32),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Timeout waiting for attestation")]
    AttestationTimeout,

    #[error("Transaction failed: {vm_status}")]
    TransactionFailed { vm_status: String },

    #[error("Timeout waiting for transaction {tx_hash} to commit")]
    ConfirmationTimeout { tx_hash: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("BCS error: {0}")]
    Bcs(#[from] bcs::Error),
}

impl CctpError {
    /// HTTP status the API layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::UserRejected
            | Self::UnsupportedDomain(_)
            | Self::Hex(_)
            | Self::Json(_) => 400,
            Self::MissingConfig(_) => 503,
            Self::SponsorshipRejected { .. } => 502,
            Self::RateLimitExceeded { .. } => 429,
            Self::ConfirmationTimeout { .. } | Self::AttestationTimeout => 504,
            Self::InvalidConfig(_)
            | Self::FeePayerMismatch { .. }
            | Self::Build(_)
            | Self::Network(_)
            | Self::Provider(_)
            | Self::AttestationFailed { .. }
            | Self::TransactionFailed { .. }
            | Self::InvalidTransition { .. }
            | Self::Bcs(_) => 500,
        }
    }

    /// Stable machine-readable code, so callers can tell a wallet
    /// rejection apart from a failed transaction.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Hex(_) | Self::Json(_) => "VALIDATION_ERROR",
            Self::MissingConfig(_) => "MISSING_CONFIG",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::FeePayerMismatch { .. } => "FEE_PAYER_MISMATCH",
            Self::Build(_) | Self::Bcs(_) => "BUILD_FAILED",
            Self::UserRejected => "USER_REJECTED",
            Self::SponsorshipRejected { .. } => "SPONSORSHIP_REJECTED",
            Self::UnsupportedDomain(_) => "UNSUPPORTED_DOMAIN",
            Self::Network(_) | Self::Provider(_) => "UPSTREAM_ERROR",
            Self::AttestationFailed { .. } => "ATTESTATION_FAILED",
            Self::RateLimitExceeded { .. } => "RATE_LIMITED",
            Self::AttestationTimeout => "ATTESTATION_TIMEOUT",
            Self::TransactionFailed { .. } => "TRANSACTION_FAILED",
            Self::ConfirmationTimeout { .. } => "CONFIRMATION_TIMEOUT",
            Self::InvalidTransition { .. } => "INVALID_STATE",
        }
    }

    /// Wraps an SDK/encoding failure with the build prefix.
    pub fn build(err: impl std::fmt::Display) -> Self {
        Self::Build(err.to_string())
    }

    /// Whether a failed submission may be retried without side effects.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Provider(_) | Self::RateLimitExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CctpError>;
