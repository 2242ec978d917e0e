// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Circle Iris API attestation provider implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, trace};

use crate::bridge::{IRIS_API, IRIS_API_SANDBOX, MESSAGES_PATH_V1};
use crate::error::{CctpError, Result};
use crate::protocol::{AttestationLookup, DomainId, MessagesResponse};
use crate::traits::AttestationProvider;

/// Production attestation provider using Circle's Iris API.
///
/// Messages are looked up by source domain and transaction hash, so the
/// caller never needs the message bytes up front.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_aptos::providers::IrisAttestationProvider;
/// use cctp_aptos::traits::AttestationProvider;
/// use cctp_aptos::DomainId;
///
/// # async fn example() -> Result<(), cctp_aptos::CctpError> {
/// let provider = IrisAttestationProvider::production();
/// let lookup = provider.get_messages(DomainId::Solana, "5Xy…").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a new Iris attestation provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the Iris API (e.g., <https://iris-api.circle.com>)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Creates a provider for Circle's production environment.
    pub fn production() -> Self {
        Self::new(IRIS_API)
    }

    /// Creates a provider for Circle's sandbox (testnet) environment.
    pub fn sandbox() -> Self {
        Self::new(IRIS_API_SANDBOX)
    }

    /// Constructs the full API URL for a source transaction.
    fn messages_url(&self, source_domain: DomainId, tx_hash: &str) -> String {
        format!(
            "{}{}{}/{}",
            self.base_url,
            MESSAGES_PATH_V1,
            source_domain.as_u32(),
            tx_hash
        )
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(skip(self), fields(source_domain = %source_domain))]
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_hash: &str,
    ) -> Result<AttestationLookup> {
        let url = self.messages_url(source_domain, tx_hash);
        trace!(url = %url, "Requesting messages from Iris API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(CctpError::Network)?;

        let status_code = response.status();
        trace!(status_code = %status_code, "Received response from Iris API");

        // Handle rate limiting - extract Retry-After header if present
        if status_code == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(300);

            debug!(retry_after_seconds = retry_after, "Rate limit exceeded");
            return Err(CctpError::RateLimitExceeded {
                retry_after_seconds: retry_after,
            });
        }

        // Circle answers 404 until it has indexed the burn
        if status_code == StatusCode::NOT_FOUND {
            debug!("Messages not found yet");
            return Ok(AttestationLookup::pending(
                "Burn transaction not yet observed by Circle",
            ));
        }

        response.error_for_status_ref()?;

        let json_value = response
            .json::<serde_json::Value>()
            .await
            .map_err(CctpError::Network)?;

        let messages: MessagesResponse =
            serde_json::from_value(json_value).map_err(|e| CctpError::AttestationFailed {
                reason: format!("Malformed Iris response: {e}"),
            })?;
        debug!(message_count = messages.messages.len(), "Messages response parsed");

        Ok(messages.into_lookup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_messages_url() {
        let provider = IrisAttestationProvider::new("https://iris-api.circle.com/");
        insta::assert_snapshot!(
            provider.messages_url(DomainId::Solana, "abc"),
            @"https://iris-api.circle.com/v1/messages/5/abc"
        );
    }

    #[tokio::test]
    async fn test_ready_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/messages/5/sig"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"attestation": "0xaa", "message": "0xbb", "eventNonce": "1"}]
            })))
            .mount(&server)
            .await;

        let provider = IrisAttestationProvider::new(server.uri());
        let lookup = provider.get_messages(DomainId::Solana, "sig").await.unwrap();
        assert!(!lookup.is_pending());
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/messages/5/sig"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"attestation": "zz-not-hex", "message": "0xaa"}]
            })))
            .mount(&server)
            .await;

        let provider = IrisAttestationProvider::new(server.uri());
        let err = provider
            .get_messages(DomainId::Solana, "sig")
            .await
            .unwrap_err();
        assert!(matches!(err, CctpError::AttestationFailed { .. }));
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("Malformed Iris response"));
    }

    #[tokio::test]
    async fn test_not_found_is_pending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = IrisAttestationProvider::new(server.uri());
        let lookup = provider.get_messages(DomainId::Solana, "sig").await.unwrap();
        assert!(lookup.is_pending());
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "42"))
            .mount(&server)
            .await;

        let provider = IrisAttestationProvider::new(server.uri());
        let err = provider
            .get_messages(DomainId::Solana, "sig")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CctpError::RateLimitExceeded {
                retry_after_seconds: 42
            }
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = IrisAttestationProvider::new(server.uri());
        let err = provider
            .get_messages(DomainId::Solana, "sig")
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
