// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCTP message formats
//!
//! Two layouts live here:
//!
//! - [`DepositMessage`]: the canonical 213-byte form used to compute the
//!   deposit message hash. Domains and nonce are little-endian, the burn
//!   amount is a big-endian u256.
//! - [`AttestedMessage`]: Circle's CCTP v1 wire message as returned by the
//!   Iris API and consumed by the destination message transmitter. All
//!   integers are big-endian.

use alloy_primitives::{hex, keccak256, B256, U256};
use serde::Deserialize;
use sha3::{Digest, Sha3_256};
use std::str::FromStr;

use super::address::{normalize_or_zero, AddressInput};
use super::DomainId;
use crate::error::{CctpError, Result};

/// Number or decimal/hex string, as JavaScript callers send big integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(u64),
    Text(String),
}

impl Numeric {
    pub fn to_u64(&self, field: &str) -> Result<u64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| CctpError::Validation(format!("{field} must be a u64, got '{s}'"))),
        }
    }

    pub fn to_u32(&self, field: &str) -> Result<u32> {
        let value = self.to_u64(field)?;
        u32::try_from(value)
            .map_err(|_| CctpError::Validation(format!("{field} must fit in a u32, got {value}")))
    }

    pub fn to_u256(&self, field: &str) -> Result<U256> {
        match self {
            Self::Number(n) => Ok(U256::from(*n)),
            Self::Text(s) => U256::from_str(s.trim())
                .map_err(|e| CctpError::Validation(format!("{field} is not a valid u256: {e}"))),
        }
    }
}

/// Digest used for the deposit message hash.
///
/// The hash endpoint has always produced SHA3-256 while calling it keccak256.
/// The two differ in padding, so both are kept and named for what they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha3_256,
    Keccak256,
}

impl DigestAlgorithm {
    pub fn digest(self, bytes: &[u8]) -> B256 {
        match self {
            Self::Sha3_256 => B256::from_slice(&Sha3_256::digest(bytes)),
            Self::Keccak256 => keccak256(bytes),
        }
    }
}

/// Hex forms of a message digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDigest(pub B256);

impl MessageDigest {
    /// 64 lowercase hex characters, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `0x` followed by 64 lowercase hex characters.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

// ============================================================================
// Deposit message (canonical hash form)
// ============================================================================

/// Burn-specific part of a deposit message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurnPayload {
    pub burn_token: B256,
    pub mint_recipient: B256,
    pub amount: U256,
    pub message_sender: B256,
}

impl BurnPayload {
    /// Serialized payload size in bytes
    pub const SIZE: usize = 128;

    /// burnToken ∥ mintRecipient ∥ amount (u256 BE) ∥ messageSender
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..32].copy_from_slice(self.burn_token.as_slice());
        out[32..64].copy_from_slice(self.mint_recipient.as_slice());
        out[64..96].copy_from_slice(&self.amount.to_be_bytes::<32>());
        out[96..128].copy_from_slice(self.message_sender.as_slice());
        out
    }
}

/// Canonical cross-chain deposit message.
///
/// # Format
///
/// - version: u8 (1 byte, always 0)
/// - sourceDomain: u32 LE (4 bytes)
/// - destinationDomain: u32 LE (4 bytes)
/// - nonce: u64 LE (8 bytes)
/// - sender, recipient, destinationCaller: 32 bytes each
/// - payload: 128 bytes
///
/// Total: 1 + 4 + 4 + 8 + 96 + 128 = 213 bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositMessage {
    pub source_domain: u32,
    pub destination_domain: u32,
    pub nonce: u64,
    pub sender: B256,
    pub recipient: B256,
    pub destination_caller: B256,
    pub payload: BurnPayload,
}

impl DepositMessage {
    pub const VERSION: u8 = 0;
    pub const SIZE: usize = 213;

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        bytes.push(Self::VERSION);
        bytes.extend_from_slice(&self.source_domain.to_le_bytes());
        bytes.extend_from_slice(&self.destination_domain.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.payload.encode());
        bytes
    }

    pub fn digest(&self, algorithm: DigestAlgorithm) -> MessageDigest {
        MessageDigest(algorithm.digest(&self.encode()))
    }
}

/// Payload as it arrives over JSON; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnPayloadInput {
    pub burn_token: Option<AddressInput>,
    pub mint_recipient: Option<AddressInput>,
    pub amount: Option<Numeric>,
    pub message_sender: Option<AddressInput>,
}

impl BurnPayloadInput {
    pub fn resolve(&self) -> Result<BurnPayload> {
        Ok(BurnPayload {
            burn_token: normalize_or_zero(self.burn_token.as_ref())?,
            mint_recipient: normalize_or_zero(self.mint_recipient.as_ref())?,
            amount: self
                .amount
                .as_ref()
                .map_or(Ok(U256::ZERO), |a| a.to_u256("payload.amount"))?,
            message_sender: normalize_or_zero(self.message_sender.as_ref())?,
        })
    }
}

/// Deposit message as it arrives over JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMessageInput {
    pub source_domain: Option<Numeric>,
    pub destination_domain: Option<Numeric>,
    pub nonce: Option<Numeric>,
    pub sender: Option<AddressInput>,
    pub recipient: Option<AddressInput>,
    pub destination_caller: Option<AddressInput>,
    #[serde(default)]
    pub payload: BurnPayloadInput,
}

impl DepositMessageInput {
    /// Checks required fields, then normalizes everything else to defaults.
    pub fn validate(&self) -> Result<DepositMessage> {
        let missing: Vec<&str> = [
            ("sourceDomain", self.source_domain.is_none()),
            ("destinationDomain", self.destination_domain.is_none()),
            ("nonce", self.nonce.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(source), Some(destination), Some(nonce)) =
            (&self.source_domain, &self.destination_domain, &self.nonce)
        else {
            return Err(CctpError::Validation(format!(
                "Missing required message fields: {}",
                missing.join(", ")
            )));
        };

        Ok(DepositMessage {
            source_domain: source.to_u32("sourceDomain")?,
            destination_domain: destination.to_u32("destinationDomain")?,
            nonce: nonce.to_u64("nonce")?,
            sender: normalize_or_zero(self.sender.as_ref())?,
            recipient: normalize_or_zero(self.recipient.as_ref())?,
            destination_caller: normalize_or_zero(self.destination_caller.as_ref())?,
            payload: self.payload.resolve()?,
        })
    }
}

// ============================================================================
// Attested message (Circle CCTP v1 wire format)
// ============================================================================

/// Burn message body of a CCTP v1 message.
///
/// - version: uint32 (4 bytes)
/// - burnToken: bytes32
/// - mintRecipient: bytes32
/// - amount: uint256
/// - messageSender: bytes32
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnMessageBody {
    pub version: u32,
    pub burn_token: B256,
    pub mint_recipient: B256,
    pub amount: U256,
    pub message_sender: B256,
}

impl BurnMessageBody {
    pub const SIZE: usize = 132;

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(self.burn_token.as_slice());
        bytes.extend_from_slice(self.mint_recipient.as_slice());
        bytes.extend_from_slice(&self.amount.to_be_bytes::<32>());
        bytes.extend_from_slice(self.message_sender.as_slice());
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            version: u32::from_be_bytes(bytes[0..4].try_into().ok()?),
            burn_token: B256::from_slice(&bytes[4..36]),
            mint_recipient: B256::from_slice(&bytes[36..68]),
            amount: U256::from_be_slice(&bytes[68..100]),
            message_sender: B256::from_slice(&bytes[100..132]),
        })
    }
}

/// A CCTP v1 message as emitted by the source message transmitter and
/// attested by Circle.
///
/// Header: version u32, sourceDomain u32, destinationDomain u32, nonce u64,
/// sender, recipient, destinationCaller (bytes32 each) = 116 bytes, followed
/// by the burn message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedMessage {
    pub version: u32,
    pub source_domain: DomainId,
    pub destination_domain: DomainId,
    pub nonce: u64,
    pub sender: B256,
    pub recipient: B256,
    pub destination_caller: B256,
    pub body: BurnMessageBody,
}

impl AttestedMessage {
    pub const HEADER_SIZE: usize = 116;
    pub const SIZE: usize = Self::HEADER_SIZE + BurnMessageBody::SIZE;

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.body.encode());
        bytes
    }

    /// Decodes an attested message.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CctpError::AttestationFailed {
                reason: format!(
                    "Attested message too short: {} bytes, expected at least {}",
                    bytes.len(),
                    Self::SIZE
                ),
            });
        }

        let read_u32 = |offset: usize| {
            u32::from_be_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        // Domains here come from Circle, so an unknown one is an upstream fault
        let domain = |offset: usize| {
            let raw = read_u32(offset);
            DomainId::try_from(raw).map_err(|_| CctpError::AttestationFailed {
                reason: format!("Attested message carries unknown domain {raw}"),
            })
        };
        let source_domain = domain(4)?;
        let destination_domain = domain(8)?;
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&bytes[12..20]);

        let body = BurnMessageBody::decode(&bytes[Self::HEADER_SIZE..]).ok_or_else(|| {
            CctpError::AttestationFailed {
                reason: "Burn message body truncated".to_string(),
            }
        })?;

        Ok(Self {
            version: read_u32(0),
            source_domain,
            destination_domain,
            nonce: u64::from_be_bytes(nonce),
            sender: B256::from_slice(&bytes[20..52]),
            recipient: B256::from_slice(&bytes[52..84]),
            destination_caller: B256::from_slice(&bytes[84..116]),
            body,
        })
    }

    /// keccak256 of the raw message bytes, the key Iris v1 attestations use.
    pub fn message_hash(bytes: &[u8]) -> B256 {
        keccak256(bytes)
    }

    /// Projects the attested message onto the canonical deposit form.
    pub fn to_deposit_message(&self) -> DepositMessage {
        DepositMessage {
            source_domain: self.source_domain.as_u32(),
            destination_domain: self.destination_domain.as_u32(),
            nonce: self.nonce,
            sender: self.sender,
            recipient: self.recipient,
            destination_caller: self.destination_caller,
            payload: BurnPayload {
                burn_token: self.body.burn_token,
                mint_recipient: self.body.mint_recipient,
                amount: self.body.amount,
                message_sender: self.body.message_sender,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_message() -> DepositMessage {
        let input: DepositMessageInput = serde_json::from_str(
            r#"{
                "sourceDomain": 5,
                "destinationDomain": 9,
                "nonce": "42",
                "sender": {"address": {"0": 1}},
                "recipient": {"address": {"0": 2}},
                "destinationCaller": {"address": {}},
                "payload": {"amount": "1000000"}
            }"#,
        )
        .unwrap();
        input.validate().unwrap()
    }

    #[test]
    fn test_scenario_layout() {
        let bytes = scenario_message().encode();
        assert_eq!(bytes.len(), DepositMessage::SIZE);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..5], &[5, 0, 0, 0]);
        assert_eq!(&bytes[5..9], &[9, 0, 0, 0]);
        assert_eq!(&bytes[9..17], &42u64.to_le_bytes());
        assert_eq!(bytes[17], 0x01);
        assert!(bytes[18..49].iter().all(|b| *b == 0));
        assert_eq!(bytes[49], 0x02);
        // amount sits at payload offset 64
        let amount_offset = 17 + 96 + 64;
        assert_eq!(
            U256::from_be_slice(&bytes[amount_offset..amount_offset + 32]),
            U256::from(1_000_000u64)
        );
    }

    #[test]
    fn test_default_message_is_213_bytes() {
        assert_eq!(DepositMessage::default().encode().len(), 213);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let message = scenario_message();
        assert_eq!(message.encode(), message.encode());
        assert_eq!(
            message.digest(DigestAlgorithm::Sha3_256),
            message.digest(DigestAlgorithm::Sha3_256)
        );
    }

    #[test]
    fn test_empty_payload_is_all_zero() {
        let payload = BurnPayloadInput::default().resolve().unwrap();
        assert_eq!(payload.encode(), [0u8; BurnPayload::SIZE]);
    }

    #[test]
    fn test_amount_encoding_is_big_endian() {
        let one = BurnPayload {
            amount: U256::from(1u8),
            ..Default::default()
        }
        .encode();
        assert_eq!(one[64 + 31], 0x01);
        assert!(one[64..64 + 31].iter().all(|b| *b == 0));

        let max = BurnPayload {
            amount: U256::MAX,
            ..Default::default()
        }
        .encode();
        assert!(max[64..96].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_domain_is_little_endian() {
        let message = DepositMessage {
            source_domain: 5,
            ..Default::default()
        };
        assert_eq!(&message.encode()[1..5], &[0x05, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_digest_hex_forms() {
        let digest = scenario_message().digest(DigestAlgorithm::Sha3_256);
        let plain = digest.to_hex();
        let prefixed = digest.to_prefixed_hex();
        assert_eq!(plain.len(), 64);
        assert_eq!(prefixed.len(), 66);
        assert!(plain.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(prefixed, format!("0x{plain}"));
    }

    #[test]
    fn test_sha3_and_keccak_differ() {
        let bytes = scenario_message().encode();
        assert_ne!(
            DigestAlgorithm::Sha3_256.digest(&bytes),
            DigestAlgorithm::Keccak256.digest(&bytes)
        );
    }

    #[test]
    fn test_sha3_empty_input_known_vector() {
        let digest = MessageDigest(DigestAlgorithm::Sha3_256.digest(b""));
        insta::assert_snapshot!(digest.to_hex(), @"a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a");
    }

    #[test]
    fn test_missing_fields_are_named() {
        let input: DepositMessageInput = serde_json::from_str(r#"{"nonce": 1}"#).unwrap();
        let err = input.validate().unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"Missing required message fields: sourceDomain, destinationDomain");
    }

    #[test]
    fn test_nonce_must_be_numeric() {
        let input: DepositMessageInput =
            serde_json::from_str(r#"{"sourceDomain":5,"destinationDomain":9,"nonce":"abc"}"#)
                .unwrap();
        assert!(matches!(
            input.validate().unwrap_err(),
            CctpError::Validation(_)
        ));
    }

    fn attested_fixture() -> AttestedMessage {
        AttestedMessage {
            version: 0,
            source_domain: DomainId::Solana,
            destination_domain: DomainId::Aptos,
            nonce: 7,
            sender: B256::from([1u8; 32]),
            recipient: B256::from([2u8; 32]),
            destination_caller: B256::ZERO,
            body: BurnMessageBody {
                version: 0,
                burn_token: B256::from([3u8; 32]),
                mint_recipient: B256::from([4u8; 32]),
                amount: U256::from(2_500_000u64),
                message_sender: B256::from([5u8; 32]),
            },
        }
    }

    #[test]
    fn test_attested_message_decode() {
        let message = attested_fixture();
        let bytes = message.encode();
        assert_eq!(bytes.len(), AttestedMessage::SIZE);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 5]);

        let decoded = AttestedMessage::decode(&bytes).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.body.amount, U256::from(2_500_000u64));
    }

    #[test]
    fn test_attested_message_too_short() {
        let err = AttestedMessage::decode(&[0u8; 100]).unwrap_err();
        assert!(matches!(err, CctpError::AttestationFailed { .. }));
    }

    #[test]
    fn test_attested_message_unknown_domain() {
        let mut bytes = attested_fixture().encode();
        bytes[4..8].copy_from_slice(&999u32.to_be_bytes());
        let err = AttestedMessage::decode(&bytes).unwrap_err();
        assert!(matches!(err, CctpError::AttestationFailed { .. }));
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("unknown domain 999"));
    }

    #[test]
    fn test_projection_to_deposit_message() {
        let deposit = attested_fixture().to_deposit_message();
        assert_eq!(deposit.source_domain, 5);
        assert_eq!(deposit.destination_domain, 9);
        assert_eq!(deposit.payload.mint_recipient, B256::from([4u8; 32]));
        assert_eq!(deposit.encode().len(), DepositMessage::SIZE);
    }
}
