// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Normalization of the authenticator shapes wallets hand back.
//!
//! Depending on wallet and SDK version, a signed sender authenticator shows
//! up as BCS hex, a byte array, a serialized `Uint8Array`, the legacy
//! `{public_key, signature}` object, the newer `{publicKey, signature}`
//! object, an account-abstraction object, or any of these wrapped in the
//! wallet-adapter `{status, args}` response. All of them become
//! [`AuthenticatorBytes`].

use alloy_primitives::hex;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::chain::aptos::{
    AbstractionAuthData, AccountAddress, AccountAuthenticator, AuthenticatorBytes, FunctionInfo,
};
use crate::error::{CctpError, Result};

const ED25519_PUBLIC_KEY_LEN: usize = 32;
const ED25519_SIGNATURE_LEN: usize = 64;

/// Variable-length bytes in any of the encodings JavaScript produces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ByteInput {
    Hex(String),
    Array(Vec<u8>),
    Key { key: Box<ByteInput> },
    Data { data: Box<ByteInput> },
    Indexed(BTreeMap<String, u64>),
}

impl ByteInput {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Hex(s) => Ok(hex::decode(s.trim().trim_start_matches("0x"))?),
            Self::Array(bytes) => Ok(bytes.clone()),
            Self::Key { key } => key.to_bytes(),
            Self::Data { data } => data.to_bytes(),
            Self::Indexed(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let index: usize = key.parse().map_err(|_| {
                        CctpError::Validation(format!("Invalid byte index '{key}'"))
                    })?;
                    let byte = u8::try_from(*value).map_err(|_| {
                        CctpError::Validation(format!("Byte {index} has value {value}"))
                    })?;
                    entries.push((index, byte));
                }
                // A Uint8Array serializes densely; gaps mean a mangled payload.
                entries.sort_unstable_by_key(|(index, _)| *index);
                if entries.iter().enumerate().any(|(i, (index, _))| i != *index) {
                    return Err(CctpError::Validation(
                        "Byte map is not a contiguous array".to_string(),
                    ));
                }
                Ok(entries.into_iter().map(|(_, byte)| byte).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum WalletStatus {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletResponse {
    pub status: WalletStatus,
    #[serde(default)]
    pub args: Option<Box<SenderAuthenticatorInput>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyEd25519 {
    pub public_key: ByteInput,
    pub signature: ByteInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ed25519Authenticator {
    pub public_key: ByteInput,
    pub signature: ByteInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractionAuthenticator {
    /// `0xaddr::module::function`
    pub function_info: String,
    pub signing_message_digest: ByteInput,
    pub abstract_signature: ByteInput,
    pub abstract_public_key: ByteInput,
}

/// Sender authenticator as received from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SenderAuthenticatorInput {
    Wallet(WalletResponse),
    Abstraction(AbstractionAuthenticator),
    Legacy(LegacyEd25519),
    Ed25519(Ed25519Authenticator),
    Encoded(ByteInput),
}

impl SenderAuthenticatorInput {
    /// Produces the BCS authenticator the fullnode and gas station expect.
    ///
    /// A wallet rejection surfaces as [`CctpError::UserRejected`], never as
    /// a malformed-input error.
    pub fn normalize(&self) -> Result<AuthenticatorBytes> {
        match self {
            Self::Wallet(response) => match (&response.status, &response.args) {
                (WalletStatus::Rejected, _) => Err(CctpError::UserRejected),
                (WalletStatus::Approved, Some(args)) => args.normalize(),
                (WalletStatus::Approved, None) => Err(CctpError::Validation(
                    "Wallet approved but returned no authenticator".to_string(),
                )),
            },
            Self::Legacy(LegacyEd25519 {
                public_key,
                signature,
            })
            | Self::Ed25519(Ed25519Authenticator {
                public_key,
                signature,
            }) => ed25519(public_key, signature),
            Self::Abstraction(auth) => abstraction(auth),
            Self::Encoded(bytes) => AuthenticatorBytes::new(bytes.to_bytes()?),
        }
    }
}

fn ed25519(public_key: &ByteInput, signature: &ByteInput) -> Result<AuthenticatorBytes> {
    let public_key = public_key.to_bytes()?;
    let signature = signature.to_bytes()?;
    if public_key.len() != ED25519_PUBLIC_KEY_LEN {
        return Err(CctpError::Validation(format!(
            "Ed25519 public key must be {ED25519_PUBLIC_KEY_LEN} bytes, got {}",
            public_key.len()
        )));
    }
    if signature.len() != ED25519_SIGNATURE_LEN {
        return Err(CctpError::Validation(format!(
            "Ed25519 signature must be {ED25519_SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }
    AccountAuthenticator::Ed25519 {
        public_key,
        signature,
    }
    .to_bytes()
}

fn abstraction(auth: &AbstractionAuthenticator) -> Result<AuthenticatorBytes> {
    AccountAuthenticator::Abstraction {
        function_info: parse_function_info(&auth.function_info)?,
        auth_data: AbstractionAuthData::DerivableV1 {
            signing_message_digest: auth.signing_message_digest.to_bytes()?,
            abstract_signature: auth.abstract_signature.to_bytes()?,
            abstract_public_key: auth.abstract_public_key.to_bytes()?,
        },
    }
    .to_bytes()
}

/// Parses `0xaddr::module::function`.
pub fn parse_function_info(value: &str) -> Result<FunctionInfo> {
    let mut parts = value.split("::");
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(address), Some(module), Some(function), None)
            if !module.is_empty() && !function.is_empty() =>
        {
            Ok(FunctionInfo {
                module_address: AccountAddress::from_hex(address)?,
                module_name: module.to_string(),
                function_name: function.to_string(),
            })
        }
        _ => Err(CctpError::Validation(format!(
            "Invalid function identifier '{value}', expected address::module::function"
        ))),
    }
}
