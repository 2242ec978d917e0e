// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer, Serialize};

/// Response from Circle's `/v1/messages/{sourceDomain}/{txHash}` endpoint.
///
/// A single burn transaction can emit more than one `MessageSent` event, so
/// the API always returns an array.
///
/// # Example Response
///
/// ```json
/// {
///   "messages": [
///     {
///       "attestation": "0x...",
///       "message": "0x...",
///       "eventNonce": "9682"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<IrisMessage>,
}

/// A single message entry from the Iris messages endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrisMessage {
    /// Signed attestation, absent until Circle has observed enough confirmations
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,

    /// Raw CCTP message bytes from the source chain's `MessageSent` event
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,

    #[serde(default)]
    pub event_nonce: Option<String>,
}

/// Message bytes and the attestation over them, ready for the destination
/// message transmitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyAttestation {
    pub message: Bytes,
    pub attestation: Bytes,
    pub event_nonce: Option<String>,
}

/// Outcome of a single attestation lookup.
///
/// `Pending` is a normal outcome, not an error: Circle needs time to observe
/// the burn (typically one to two minutes on Solana).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationLookup {
    Pending { reason: String },
    Ready(ReadyAttestation),
}

impl AttestationLookup {
    pub fn pending(reason: impl Into<String>) -> Self {
        Self::Pending {
            reason: reason.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

impl MessagesResponse {
    /// Picks the first message that carries both bytes and a signature.
    pub fn into_lookup(self) -> AttestationLookup {
        if self.messages.is_empty() {
            return AttestationLookup::pending("No messages found for transaction yet");
        }

        self.messages
            .into_iter()
            .find_map(|m| match (m.message, m.attestation) {
                (Some(message), Some(attestation)) => Some(ReadyAttestation {
                    message,
                    attestation,
                    event_nonce: m.event_nonce,
                }),
                _ => None,
            })
            .map_or_else(
                || AttestationLookup::pending("Attestation not yet available"),
                AttestationLookup::Ready,
            )
    }
}

/// Custom deserializer that handles Circle API quirk where attestation field
/// may be the string "PENDING" instead of null
///
/// Handles the following cases:
/// - Valid hex string (with or without "0x") → deserializes to `Some(Bytes)`
/// - "PENDING" or "pending" → returns `None`
/// - null or missing field → returns `None`
/// - Empty string or bare "0x" → returns `None`
/// - Invalid hex → returns error
fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() || s == "0x" => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(json: &str) -> AttestationLookup {
        serde_json::from_str::<MessagesResponse>(json)
            .unwrap()
            .into_lookup()
    }

    #[test]
    fn test_ready_message() {
        let result = lookup(
            r#"{"messages":[{"attestation":"0x1234abcd","message":"0xdeadbeef","eventNonce":"42"}]}"#,
        );
        let AttestationLookup::Ready(ready) = result else {
            panic!("expected ready attestation");
        };
        assert_eq!(ready.attestation.to_vec(), vec![0x12, 0x34, 0xab, 0xcd]);
        assert_eq!(ready.message.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(ready.event_nonce.as_deref(), Some("42"));
    }

    #[test]
    fn test_pending_string_is_pending() {
        let result = lookup(r#"{"messages":[{"attestation":"PENDING","message":"0xdeadbeef"}]}"#);
        assert!(result.is_pending());
    }

    #[test]
    fn test_pending_lowercase_is_pending() {
        let result = lookup(r#"{"messages":[{"attestation":"pending","message":"0xdeadbeef"}]}"#);
        assert!(result.is_pending());
    }

    #[test]
    fn test_null_attestation_is_pending() {
        let result = lookup(r#"{"messages":[{"attestation":null,"message":"0xdeadbeef"}]}"#);
        assert!(result.is_pending());
    }

    #[test]
    fn test_missing_message_bytes_is_pending() {
        let result = lookup(r#"{"messages":[{"attestation":"0xaa"}]}"#);
        assert!(result.is_pending());
    }

    #[test]
    fn test_empty_messages_is_pending() {
        assert!(lookup(r#"{"messages":[]}"#).is_pending());
        assert!(lookup(r#"{}"#).is_pending());
    }

    #[test]
    fn test_bare_prefix_is_none() {
        let result = lookup(r#"{"messages":[{"attestation":"0x","message":"0xaa"}]}"#);
        assert!(result.is_pending());
    }

    #[test]
    fn test_hex_without_prefix() {
        let result = lookup(r#"{"messages":[{"attestation":"deadbeef","message":"aa"}]}"#);
        assert!(!result.is_pending());
    }

    #[test]
    fn test_invalid_hex_fails() {
        let result = serde_json::from_str::<MessagesResponse>(
            r#"{"messages":[{"attestation":"not_valid_hex"}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_first_complete_message_wins() {
        let result = lookup(
            r#"{"messages":[
                {"attestation":"PENDING","message":"0xaa"},
                {"attestation":"0xbb","message":"0xcc"}
            ]}"#,
        );
        let AttestationLookup::Ready(ready) = result else {
            panic!("expected ready attestation");
        };
        assert_eq!(ready.message.to_vec(), vec![0xcc]);
    }
}
