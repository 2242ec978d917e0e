// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Circle Iris API environment URLs
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
///
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// CCTP v1 messages API path: `/v1/messages/{sourceDomain}/{txHash}`
pub const MESSAGES_PATH_V1: &str = "/v1/messages/";

/// Transaction lifetime when a sponsor co-signs; the gas station refuses
/// transactions that stay valid for long.
pub const SPONSORED_EXPIRY_SECS: u64 = 100;
/// Transaction lifetime when the sender pays, long enough for a wallet prompt.
pub const DEFAULT_EXPIRY_SECS: u64 = 30 * 60;

/// Gas settings for Aptos transactions built by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasConfig {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            max_gas_amount: 200_000,
            gas_unit_price: 100,
        }
    }
}

impl GasConfig {
    /// Overrides individual fields, keeping defaults for the rest.
    pub fn with_overrides(self, max_gas_amount: Option<u64>, gas_unit_price: Option<u64>) -> Self {
        Self {
            max_gas_amount: max_gas_amount.unwrap_or(self.max_gas_amount),
            gas_unit_price: gas_unit_price.unwrap_or(self.gas_unit_price),
        }
    }
}

/// Expiry timestamp for a transaction built at `ledger_timestamp_secs`.
pub fn expiration_timestamp_secs(ledger_timestamp_secs: u64, sponsored: bool) -> u64 {
    let ttl = if sponsored {
        SPONSORED_EXPIRY_SECS
    } else {
        DEFAULT_EXPIRY_SECS
    };
    ledger_timestamp_secs + ttl
}

/// Configuration for attestation polling behavior.
///
/// Controls how [`MintOrchestrator::wait_for_attestation`] polls Circle's
/// Iris API. The interval starts at `poll_interval_secs` and grows by
/// `backoff_multiplier` after every pending response, capped at
/// `max_interval_secs`.
///
/// [`MintOrchestrator::wait_for_attestation`]: crate::MintOrchestrator::wait_for_attestation
///
/// # Examples
///
/// ```rust
/// use cctp_aptos::PollingConfig;
///
/// // Use defaults (20 attempts, 10 second initial interval doubling up to 2 minutes)
/// let config = PollingConfig::default();
///
/// // Customize polling behavior
/// let config = PollingConfig::default()
///     .with_max_attempts(10)
///     .with_poll_interval_secs(30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollingConfig {
    /// Maximum number of polling attempts before giving up.
    pub max_attempts: u32,
    /// Seconds to wait after the first pending response.
    pub poll_interval_secs: u64,
    /// Upper bound for the wait between attempts.
    pub max_interval_secs: u64,
    pub backoff_multiplier: f64,
}

impl Default for PollingConfig {
    /// Solana burns are typically attested one to two minutes after
    /// finality, so polling starts fast and backs off.
    ///
    /// - `max_attempts`: 20
    /// - `poll_interval_secs`: 10
    /// - `max_interval_secs`: 120
    /// - `backoff_multiplier`: 2.0
    fn default() -> Self {
        Self {
            max_attempts: 20,
            poll_interval_secs: 10,
            max_interval_secs: 120,
            backoff_multiplier: 2.0,
        }
    }
}

impl PollingConfig {
    /// Sets the maximum number of polling attempts.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cctp_aptos::PollingConfig;
    ///
    /// let config = PollingConfig::default().with_max_attempts(60);
    /// assert_eq!(config.max_attempts, 60);
    /// ```
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the initial interval between polling attempts in seconds.
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn with_max_interval_secs(mut self, secs: u64) -> Self {
        self.max_interval_secs = secs;
        self
    }

    /// A multiplier of 1.0 polls at a fixed interval.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier.max(1.0);
        self
    }

    /// Wait before attempt `attempt + 1`, where `attempt` counts from 1.
    pub fn interval_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.poll_interval_secs as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_interval_secs as f64))
    }

    /// Returns the total maximum wait time in seconds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cctp_aptos::PollingConfig;
    ///
    /// let config = PollingConfig::default()
    ///     .with_max_attempts(3)
    ///     .with_poll_interval_secs(10)
    ///     .with_backoff_multiplier(1.0);
    /// assert_eq!(config.total_timeout_secs(), 20);
    /// ```
    pub fn total_timeout_secs(&self) -> u64 {
        (1..self.max_attempts)
            .map(|attempt| self.interval_after(attempt).as_secs())
            .sum()
    }
}

/// Configuration for waiting on an Aptos transaction to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationConfig {
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ConfirmationConfig {
    /// Aptos commits in well under a second; 30 attempts one second apart
    /// also outlasts a sponsored transaction's expiry.
    fn default() -> Self {
        Self {
            max_attempts: 30,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Bounded retry of a failed mint submission.
///
/// Retrying is safe: the destination message transmitter rejects a nonce
/// it has already used, so a duplicate submission cannot mint twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitRetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for SubmitRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}
