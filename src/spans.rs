// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span helpers for bridge operations
//!
//! Static span names, structured attributes, and error recording kept apart
//! from the bridge logic. Operation spans declare the `error.*` and
//! `otel.status_code` fields up front so [`record_error`] and
//! [`record_error_with_context`] can fill them in later.
//!
//! # Example
//!
//! ```rust,no_run
//! use cctp_aptos::{spans, DomainId};
//!
//! let span = spans::check_attestation(DomainId::Solana, "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnb", 1);
//! let _guard = span.enter();
//! // Your custom attestation logic here
//! ```

use tracing::Span;

use crate::chain::aptos::AccountAddress;
use crate::protocol::DomainId;

/// Create span for building an Aptos burn transaction.
///
/// Parent: HTTP request or caller span
/// Children: Fullnode ledger and sequence number lookups
#[inline]
pub fn build_burn(
    sender: &AccountAddress,
    destination_domain: DomainId,
    amount: u64,
    sponsored: bool,
) -> Span {
    tracing::info_span!(
        "cctp_aptos.build_burn",
        sender = %sender,
        destination_domain = %destination_domain,
        amount = amount,
        sponsored = sponsored,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for submitting a wallet-signed burn.
///
/// Parent: HTTP request or caller span
/// Children: Gas station or fullnode submission
#[inline]
pub fn submit_burn(function_id: &str, sender: &AccountAddress, sponsored: bool) -> Span {
    tracing::info_span!(
        "cctp_aptos.submit_burn",
        function = function_id,
        sender = %sender,
        sponsored = sponsored,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for the Solana temp-wallet burn.
#[inline]
pub fn solana_burn(owner: &str, aptos_recipient: &str) -> Span {
    tracing::info_span!(
        "cctp_aptos.solana_burn",
        owner = owner,
        aptos_recipient = aptos_recipient,
        amount = tracing::field::Empty,
        signature = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a single attestation lookup.
///
/// Parent: cctp_aptos.wait_for_attestation or cctp_aptos.mint
/// Children: HTTP client request spans
#[inline]
pub fn check_attestation(source_domain: DomainId, tx_hash: &str, attempt: u32) -> Span {
    tracing::debug_span!(
        "cctp_aptos.check_attestation",
        source_domain = %source_domain,
        tx_hash = tx_hash,
        attempt = attempt,
    )
}

/// Create span for polling the attestation API with backoff.
///
/// Parent: Top-level bridge operation span
/// Children: cctp_aptos.check_attestation (multiple attempts)
#[inline]
pub fn wait_for_attestation(
    source_domain: DomainId,
    tx_hash: &str,
    max_attempts: u32,
    poll_interval_secs: u64,
) -> Span {
    tracing::info_span!(
        "cctp_aptos.wait_for_attestation",
        source_domain = %source_domain,
        tx_hash = tx_hash,
        max_attempts = max_attempts,
        poll_interval_secs = poll_interval_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for receiving an attested message on Aptos.
///
/// Parent: Top-level bridge operation span
/// Children: Fullnode submission and confirmation polling
#[inline]
pub fn receive_message(source_domain: DomainId, nonce: u64, attestation_length: usize) -> Span {
    tracing::info_span!(
        "cctp_aptos.receive_message",
        source_domain = %source_domain,
        nonce = nonce,
        attestation_length_bytes = attestation_length,
        mint_tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on an Aptos transaction to commit.
#[inline]
pub fn wait_for_confirmation(tx_hash: &str, max_attempts: u32) -> Span {
    tracing::debug_span!(
        "cctp_aptos.wait_for_confirmation",
        tx_hash = tx_hash,
        max_attempts = max_attempts,
    )
}

/// Create span for an inbound HTTP request.
///
/// Parent: None
/// Children: Bridge operation spans
#[inline]
pub fn http_request(method: &str, path: &str) -> Span {
    tracing::info_span!(
        "cctp_aptos.http_request",
        http.method = method,
        http.route = path,
        http.status_code = tracing::field::Empty,
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error type/variant
/// - error.message: Human-readable error message
/// - error.context: The underlying source, when there is one
///
/// # Example
///
/// ```rust,no_run
/// use cctp_aptos::spans;
/// use cctp_aptos::CctpError;
///
/// # fn example() -> Result<(), CctpError> {
/// let span = tracing::info_span!("cctp_aptos.operation");
/// let _guard = span.enter();
///
/// let result = some_operation();
/// if let Err(ref e) = result {
///     spans::record_error(e);
/// }
/// result
/// # }
/// # fn some_operation() -> Result<(), CctpError> { Ok(()) }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");

    if let Some(source) = error.source() {
        current_span.record("error.context", source.to_string());
    }
}

/// Record error attributes with custom context on the current span.
///
/// # Example
///
/// ```rust,no_run
/// use cctp_aptos::spans;
///
/// # fn example() {
/// let span = tracing::info_span!("cctp_aptos.operation");
/// let _guard = span.enter();
///
/// if let Err(e) = some_operation() {
///     spans::record_error_with_context(
///         "TransactionFailed",
///         &format!("Failed to submit transaction: {}", e),
///         Some("Transaction may have expired before reaching the fullnode"),
///     );
/// }
/// # }
/// # fn some_operation() -> Result<(), String> { Ok(()) }
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
