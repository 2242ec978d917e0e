// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aptos fullnode REST client.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::chain::aptos::{AccountAddress, LedgerInfo, SignedTransaction, TransactionStatus};
use crate::error::{CctpError, Result};
use crate::protocol::Numeric;
use crate::traits::AptosNode;

const SIGNED_TRANSACTION_BCS: &str = "application/x.aptos.signed_transaction+bcs";

/// Used when a 429 carries no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

fn is_duplicate_submission(message: &str) -> bool {
    message.contains("SEQUENCE_NUMBER_TOO_OLD")
        || (message.contains("already in mempool") && !message.contains("different"))
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    chain_id: u8,
    ledger_timestamp: Numeric,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    sequence_number: Numeric,
}

#[derive(Debug, Deserialize)]
struct PendingTransactionResponse {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// Aptos fullnode client over the `/v1` REST API.
///
/// `base_url` includes the `/v1` suffix, e.g.
/// `https://api.mainnet.aptoslabs.com/v1`.
#[derive(Debug, Clone)]
pub struct AptosRestClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl AptosRestClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(format!("{}{path}", self.base_url)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => match body.error_code {
                Some(code) => format!("{code}: {}", body.message),
                None => body.message,
            },
            Err(_) => format!("HTTP {status}"),
        }
    }
}

#[async_trait]
impl AptosNode for AptosRestClient {
    #[instrument(skip(self))]
    async fn ledger_info(&self) -> Result<LedgerInfo> {
        let response = self.get("/").send().await?;
        response.error_for_status_ref()?;
        let index: IndexResponse = response.json().await?;

        Ok(LedgerInfo {
            chain_id: index.chain_id,
            ledger_timestamp_usecs: index.ledger_timestamp.to_u64("ledger_timestamp")?,
        })
    }

    #[instrument(skip(self), fields(address = %address))]
    async fn sequence_number(&self, address: AccountAddress) -> Result<u64> {
        let response = self.get(&format!("/accounts/{address}")).send().await?;

        // Accounts that have never transacted (fresh derived accounts) start at 0
        if response.status() == StatusCode::NOT_FOUND {
            trace!("Account not found on chain, using sequence number 0");
            return Ok(0);
        }

        response.error_for_status_ref()?;
        let account: AccountResponse = response.json().await?;
        account.sequence_number.to_u64("sequence_number")
    }

    #[instrument(skip(self, transaction), fields(sender = %transaction.raw_txn.sender))]
    async fn submit(&self, transaction: &SignedTransaction) -> Result<String> {
        let body = transaction.to_bytes()?;
        let request = self
            .client
            .post(format!("{}/transactions", self.base_url))
            .header(CONTENT_TYPE, SIGNED_TRANSACTION_BCS)
            .body(body);
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            debug!(retry_after_seconds = retry_after, "Fullnode rate limit exceeded");
            return Err(CctpError::RateLimitExceeded {
                retry_after_seconds: retry_after,
            });
        }
        if status.is_client_error() {
            let message = Self::error_message(response).await;
            // A resubmission of a transaction the node already has; the
            // caller confirms the hash, so a wrong guess surfaces there.
            if is_duplicate_submission(&message) {
                let hash = transaction.hash()?.to_string();
                debug!(tx_hash = %hash, message = %message, "Transaction already submitted");
                return Ok(hash);
            }
            debug!(status = %status, message = %message, "Fullnode rejected transaction");
            return Err(CctpError::TransactionFailed {
                vm_status: message,
            });
        }
        if !status.is_success() {
            return Err(CctpError::Provider(format!(
                "Fullnode returned {status}: {}",
                Self::error_message(response).await
            )));
        }

        let pending: PendingTransactionResponse = response.json().await?;
        Ok(pending.hash)
    }

    #[instrument(skip(self))]
    async fn transaction_status(&self, tx_hash: &str) -> Result<Option<TransactionStatus>> {
        let response = self
            .get(&format!("/transactions/by_hash/{tx_hash}"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        response.error_for_status_ref()?;
        let tx: TransactionResponse = response.json().await?;

        if tx.kind == "pending_transaction" {
            return Ok(Some(TransactionStatus::Pending));
        }

        Ok(Some(TransactionStatus::Committed {
            success: tx.success.unwrap_or(false),
            vm_status: tx.vm_status.unwrap_or_default(),
        }))
    }
}
