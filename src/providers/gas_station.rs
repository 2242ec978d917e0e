// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aptos Gas Station sponsorship relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::chain::aptos::{AuthenticatorBytes, SimpleTransaction};
use crate::error::{CctpError, Result};
use crate::traits::SponsorRelay;

const SIGN_AND_SUBMIT_PATH: &str = "/api/transaction/signAndSubmit";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignAndSubmitRequest {
    transaction: Vec<u8>,
    sender_auth: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignAndSubmitResponse {
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
struct RelayError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GasStationClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl GasStationClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl SponsorRelay for GasStationClient {
    #[instrument(skip_all, fields(function = %transaction.raw_txn.payload.function_id()))]
    async fn sign_and_submit(
        &self,
        transaction: &SimpleTransaction,
        sender_authenticator: &AuthenticatorBytes,
    ) -> Result<String> {
        let function = transaction.raw_txn.payload.function_id();
        let request = SignAndSubmitRequest {
            transaction: transaction.to_bytes()?,
            sender_auth: sender_authenticator.as_bytes().to_vec(),
        };

        let response = self
            .client
            .post(format!("{}{SIGN_AND_SUBMIT_PATH}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CctpError::Provider(format!("Gas station returned {status}")));
        }
        if !status.is_success() {
            let reason = match response.json::<RelayError>().await {
                Ok(body) => body
                    .message
                    .or(body.error)
                    .unwrap_or_else(|| format!("HTTP {status}")),
                Err(_) => format!("HTTP {status}"),
            };
            error!(
                function = %function,
                status = %status,
                reason = %reason,
                event = "sponsorship_rejected"
            );
            return Err(CctpError::SponsorshipRejected { function, reason });
        }

        let body: SignAndSubmitResponse = response.json().await?;
        info!(
            function = %function,
            tx_hash = %body.transaction_hash,
            event = "sponsored_transaction_submitted"
        );
        Ok(body.transaction_hash)
    }
}
