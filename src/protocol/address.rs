// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-agnostic 32-byte addresses.
//!
//! Callers hand addresses over in several shapes: a hex string, a JSON array
//! of bytes, a serialized `Uint8Array` (an object of byte-index to value,
//! possibly sparse), or any of those wrapped in `{ "address": … }`. All of
//! them normalize to a single [`B256`].

use alloy_primitives::{hex, B256};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::domain_id::{AddressKind, DomainId};
use crate::error::{CctpError, Result};

/// Width of every address slot in a CCTP message.
pub const ADDRESS_LEN: usize = 32;

/// Address as received from a caller, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    Hex(String),
    Bytes(Vec<u8>),
    Wrapped { address: Box<AddressInput> },
    Sparse(BTreeMap<String, u64>),
}

impl AddressInput {
    /// Normalizes the input into a fixed 32-byte array.
    ///
    /// Indices absent from a sparse map are zero. Anything that cannot be
    /// read as at most 32 bytes is rejected rather than zero-filled.
    pub fn normalize(&self) -> Result<B256> {
        match self {
            Self::Hex(s) => hex_to_b256(s),
            Self::Bytes(bytes) => left_pad(bytes),
            Self::Wrapped { address } => address.normalize(),
            Self::Sparse(map) => {
                let mut out = [0u8; ADDRESS_LEN];
                for (key, value) in map {
                    let index: usize = key.parse().map_err(|_| {
                        CctpError::Validation(format!("Invalid address byte index '{key}'"))
                    })?;
                    if index >= ADDRESS_LEN {
                        return Err(CctpError::Validation(format!(
                            "Address byte index {index} out of range (max {})",
                            ADDRESS_LEN - 1
                        )));
                    }
                    out[index] = u8::try_from(*value).map_err(|_| {
                        CctpError::Validation(format!(
                            "Address byte {index} has value {value}, expected 0-255"
                        ))
                    })?;
                }
                Ok(B256::from(out))
            }
        }
    }
}

impl From<B256> for AddressInput {
    fn from(value: B256) -> Self {
        Self::Hex(value.to_string())
    }
}

/// Normalizes an optional address, treating an absent field as zero.
pub fn normalize_or_zero(input: Option<&AddressInput>) -> Result<B256> {
    input.map_or(Ok(B256::ZERO), AddressInput::normalize)
}

/// Parses a hex string of at most 32 bytes, left padding short values the way
/// Move strips leading zeros from addresses.
pub fn hex_to_b256(value: &str) -> Result<B256> {
    let stripped = value.trim();
    let stripped = stripped.strip_prefix("0x").unwrap_or(stripped);
    if stripped.is_empty() {
        return Err(CctpError::Validation("Address must not be empty".to_string()));
    }
    if stripped.len() > ADDRESS_LEN * 2 {
        return Err(CctpError::Validation(format!(
            "Address hex too long: {} chars",
            stripped.len()
        )));
    }
    let padded = format!("{stripped:0>64}");
    let bytes = hex::decode(padded)?;
    Ok(B256::from_slice(&bytes))
}

fn left_pad(bytes: &[u8]) -> Result<B256> {
    if bytes.len() > ADDRESS_LEN {
        return Err(CctpError::Validation(format!(
            "Address too long: {} bytes",
            bytes.len()
        )));
    }
    let mut out = [0u8; ADDRESS_LEN];
    out[ADDRESS_LEN - bytes.len()..].copy_from_slice(bytes);
    Ok(B256::from(out))
}

/// Widens a destination-chain account identifier to the 32-byte CCTP form.
///
/// This is the owner address only; for Solana destinations the mint
/// recipient is the owner's associated token account, see
/// [`crate::chain::solana::mint_recipient_for`].
pub fn parse_recipient(domain: DomainId, recipient: &str) -> Result<B256> {
    match domain.address_kind() {
        AddressKind::Solana => {
            let bytes = bs58::decode(recipient.trim()).into_vec().map_err(|e| {
                CctpError::Validation(format!("Invalid Solana address '{recipient}': {e}"))
            })?;
            if bytes.len() != ADDRESS_LEN {
                return Err(CctpError::Validation(format!(
                    "Invalid Solana address '{recipient}': expected 32 bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(B256::from_slice(&bytes))
        }
        AddressKind::Evm => {
            let stripped = recipient.trim().trim_start_matches("0x");
            if stripped.len() != 40 {
                return Err(CctpError::Validation(format!(
                    "Invalid {} address '{recipient}': expected 20 bytes",
                    domain.name()
                )));
            }
            let bytes = hex::decode(stripped)?;
            left_pad(&bytes)
        }
        AddressKind::Move => hex_to_b256(recipient),
        AddressKind::Cosmos => Err(CctpError::UnsupportedDomain(domain.as_u32())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AddressInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_sparse_map_defaults_missing_indices_to_zero() {
        let address = parse(r#"{"address":{"0":1}}"#).normalize().unwrap();
        assert_eq!(address[0], 1);
        assert!(address[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_empty_sparse_map_is_zero() {
        let address = parse(r#"{"address":{}}"#).normalize().unwrap();
        assert_eq!(address, B256::ZERO);
    }

    #[test]
    fn test_unwrapped_sparse_map() {
        let address = parse(r#"{"31":255,"30":1}"#).normalize().unwrap();
        assert_eq!(address[31], 0xff);
        assert_eq!(address[30], 0x01);
    }

    #[test]
    fn test_sparse_index_out_of_range_is_rejected() {
        let err = parse(r#"{"address":{"32":1}}"#).normalize().unwrap_err();
        assert!(matches!(err, CctpError::Validation(_)));
    }

    #[test]
    fn test_sparse_value_out_of_range_is_rejected() {
        let err = parse(r#"{"0":256}"#).normalize().unwrap_err();
        assert!(err.to_string().contains("expected 0-255"));
    }

    #[test]
    fn test_sparse_non_numeric_index_is_rejected() {
        assert!(parse(r#"{"zero":1}"#).normalize().is_err());
    }

    #[test]
    fn test_short_hex_is_left_padded() {
        let address = parse(r#""0x1""#).normalize().unwrap();
        assert_eq!(address[31], 1);
        assert!(address[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_wrapped_hex() {
        let address = parse(r#"{"address":"0x02"}"#).normalize().unwrap();
        assert_eq!(address[31], 2);
    }

    #[test]
    fn test_overlong_hex_is_rejected() {
        let long = format!("\"0x{}\"", "ab".repeat(33));
        assert!(parse(&long).normalize().is_err());
    }

    #[test]
    fn test_empty_hex_is_rejected() {
        assert!(parse(r#""0x""#).normalize().is_err());
    }

    #[test]
    fn test_byte_array_input() {
        let address = parse("[1,2,3]").normalize().unwrap();
        assert_eq!(&address[29..], &[1, 2, 3]);
    }

    #[test]
    fn test_normalize_or_zero_for_missing() {
        assert_eq!(normalize_or_zero(None).unwrap(), B256::ZERO);
    }

    #[test]
    fn test_parse_evm_recipient_is_left_padded() {
        let recipient =
            parse_recipient(DomainId::Base, "0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d").unwrap();
        assert!(recipient[..12].iter().all(|b| *b == 0));
        assert_eq!(recipient[12], 0x74);
    }

    #[test]
    fn test_parse_solana_recipient() {
        let recipient = parse_recipient(
            DomainId::Solana,
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        )
        .unwrap();
        assert_ne!(recipient, B256::ZERO);
    }

    #[test]
    fn test_parse_noble_recipient_is_unsupported() {
        let err = parse_recipient(DomainId::Noble, "noble1xyz").unwrap_err();
        assert!(matches!(err, CctpError::UnsupportedDomain(4)));
    }
}
