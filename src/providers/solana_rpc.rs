// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Minimal Solana JSON-RPC client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_sdk::{hash::Hash, pubkey::Pubkey, transaction::Transaction};
use std::str::FromStr;
use tracing::{instrument, trace};
use url::Url;

use crate::chain::solana::encode_transaction;
use crate::error::{CctpError, Result};
use crate::traits::SolanaRpc;

// ============================================================================
// JSON-RPC TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: serde_json::Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
}

/// Outcome of an RPC call that the server answered.
enum RpcOutcome<T> {
    Ok(T),
    Err(String),
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    client: Client,
    rpc_url: Url,
}

impl SolanaRpcClient {
    /// `api_key` is appended as the `api-key` query parameter, the form
    /// hosted RPC providers accept.
    pub fn new(rpc_url: &str, api_key: Option<&str>) -> Result<Self> {
        let mut rpc_url = Url::parse(rpc_url)
            .map_err(|e| CctpError::InvalidConfig(format!("Invalid Solana RPC URL: {e}")))?;
        if let Some(key) = api_key {
            rpc_url.query_pairs_mut().append_pair("api-key", key);
        }
        Ok(Self {
            client: Client::new(),
            rpc_url,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<RpcOutcome<T>> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.result, response.error) {
            (_, Some(error)) => Ok(RpcOutcome::Err(error.message)),
            (Some(result), None) => Ok(RpcOutcome::Ok(result)),
            (None, None) => Ok(RpcOutcome::Err(format!("{method} returned no result"))),
        }
    }

    async fn call_ok<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        match self.call(method, params).await? {
            RpcOutcome::Ok(value) => Ok(value),
            RpcOutcome::Err(message) => Err(CctpError::Provider(format!(
                "Solana RPC error in {method}: {message}"
            ))),
        }
    }
}

#[async_trait]
impl SolanaRpc for SolanaRpcClient {
    #[instrument(skip(self))]
    async fn latest_blockhash(&self) -> Result<Hash> {
        let response: WithContext<BlockhashValue> = self
            .call_ok(
                "getLatestBlockhash",
                serde_json::json!([{ "commitment": "finalized" }]),
            )
            .await?;
        Hash::from_str(&response.value.blockhash)
            .map_err(|e| CctpError::Provider(format!("Invalid blockhash from RPC: {e}")))
    }

    #[instrument(skip(self), fields(token_account = %token_account))]
    async fn token_balance(&self, token_account: &Pubkey) -> Result<u64> {
        let outcome: RpcOutcome<WithContext<TokenAmount>> = self
            .call(
                "getTokenAccountBalance",
                serde_json::json!([token_account.to_string()]),
            )
            .await?;

        match outcome {
            RpcOutcome::Ok(balance) => balance.value.amount.parse().map_err(|e| {
                CctpError::Provider(format!("Invalid token amount from RPC: {e}"))
            }),
            RpcOutcome::Err(message) if message.contains("could not find account") => {
                trace!("Token account does not exist, balance is zero");
                Ok(0)
            }
            RpcOutcome::Err(message) => Err(CctpError::Provider(format!(
                "Solana RPC error in getTokenAccountBalance: {message}"
            ))),
        }
    }

    #[instrument(skip(self, transaction))]
    async fn send_transaction(&self, transaction: &Transaction) -> Result<String> {
        let encoded = encode_transaction(transaction)?;
        self.call_ok(
            "sendTransaction",
            serde_json::json!([
                encoded,
                { "encoding": "base64", "preflightCommitment": "confirmed" }
            ]),
        )
        .await
    }
}
