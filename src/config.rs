// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Process configuration, read once at startup.
//!
//! Payer secrets are parsed up front, but a missing or mismatched payer is
//! reported per request so the affected endpoint answers 503 / 500 while
//! the rest of the server keeps working.

use solana_sdk::signature::{Keypair, Signer};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::chain::aptos::{AccountAddress, LocalAccount};
use crate::chain::solana::keypair_from_base58;
use crate::chain::Network;
use crate::error::{CctpError, Result};
use crate::wallet::{FeePayerConfig, SolanaDerivedSigner};

pub const APTOS_PAYER_ADDRESS_ENV: &str = "NEXT_PUBLIC_APTOS_PAYER_WALLET_ADDRESS";
pub const APTOS_PAYER_PRIVATE_KEY_ENV: &str = "NEXT_PUBLIC_APTOS_PAYER_WALLET_PRIVATE_KEY";
pub const SOLANA_PAYER_PRIVATE_KEY_ENV: &str = "SOLANA_PAYER_WALLET_PRIVATE_KEY";
pub const SOLANA_PAYER_ADDRESS_ENV: &str = "SOLANA_PAYER_WALLET_ADDRESS";
pub const SOLANA_RPC_URL_ENV: &str = "SOLANA_RPC_URL";
pub const PUBLIC_SOLANA_RPC_URL_ENV: &str = "NEXT_PUBLIC_SOLANA_RPC_URL";
pub const SOLANA_RPC_API_KEY_ENV: &str = "SOLANA_RPC_API_KEY";
pub const APTOS_API_KEY_ENV: &str = "APTOS_API_KEY";
pub const APTOS_NETWORK_ENV: &str = "APTOS_NETWORK";
pub const APTOS_NODE_URL_ENV: &str = "APTOS_NODE_URL";
pub const GAS_STATION_URL_ENV: &str = "APTOS_GAS_STATION_URL";
pub const GAS_STATION_API_KEY_ENV: &str = "APTOS_GAS_STATION_API_KEY";
pub const CCTP_TOOLS_ADDRESS_ENV: &str = "APTOS_CCTP_TOOLS_ADDRESS";
pub const RECEIVE_MESSAGE_SCRIPT_ENV: &str = "APTOS_RECEIVE_MESSAGE_SCRIPT";
pub const DAPP_DOMAIN_ENV: &str = "DAPP_DOMAIN";
pub const SERVER_BIND_ENV: &str = "SERVER_BIND";
pub const IRIS_API_URL_ENV: &str = "IRIS_API_URL";

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";
pub const DEFAULT_GAS_STATION_URL: &str = "https://api.mainnet.aptoslabs.com/gs/v1";

/// The Solana payer that funds privacy-bridge burns.
///
/// Kept as the raw secret so that a missing or inconsistent key fails the
/// burn request rather than server startup.
#[derive(Clone, Default)]
pub struct SolanaPayerConfig {
    private_key: Option<String>,
    expected_address: Option<String>,
}

impl fmt::Debug for SolanaPayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaPayerConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("expected_address", &self.expected_address)
            .finish()
    }
}

impl SolanaPayerConfig {
    pub fn new(private_key: Option<String>, expected_address: Option<String>) -> Self {
        Self {
            private_key,
            expected_address,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.private_key.is_some()
    }

    /// Decodes the payer key and checks it against the expected address.
    ///
    /// # Errors
    ///
    /// [`CctpError::MissingConfig`] without a key, [`CctpError::InvalidConfig`]
    /// for an undecodable key, [`CctpError::FeePayerMismatch`] when the key
    /// derives a different address than configured.
    pub fn keypair(&self) -> Result<Keypair> {
        let private_key = self
            .private_key
            .as_deref()
            .ok_or_else(|| CctpError::MissingConfig(SOLANA_PAYER_PRIVATE_KEY_ENV.to_string()))?;
        let keypair = keypair_from_base58(private_key).map_err(|e| {
            CctpError::InvalidConfig(format!("{SOLANA_PAYER_PRIVATE_KEY_ENV}: {e}"))
        })?;

        if let Some(expected) = &self.expected_address {
            let derived = keypair.pubkey().to_string();
            if expected.trim() != derived {
                return Err(CctpError::FeePayerMismatch {
                    env: SOLANA_PAYER_ADDRESS_ENV,
                    expected: expected.trim().to_string(),
                    derived,
                });
            }
        }
        Ok(keypair)
    }
}

/// Server configuration built once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub bind: SocketAddr,
    /// Fullnode REST base, including `/v1`
    pub aptos_node_url: String,
    pub aptos_api_key: Option<String>,
    pub solana_rpc_url: String,
    pub solana_rpc_api_key: Option<String>,
    pub iris_api_url: String,
    pub gas_station_url: String,
    /// Sponsorship is disabled without a key.
    pub gas_station_api_key: Option<String>,
    pub cctp_tools_address: Option<AccountAddress>,
    pub receive_message_script: Option<PathBuf>,
    /// Origin derived Solana accounts are registered under
    pub dapp_domain: Option<String>,
    pub aptos_fee_payer: FeePayerConfig,
    pub solana_payer: SolanaPayerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let network: Network = get(APTOS_NETWORK_ENV)
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or_default();

        let bind = get(SERVER_BIND_ENV)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .map_err(|e| CctpError::InvalidConfig(format!("{SERVER_BIND_ENV}: {e}")))?;

        let aptos_api_key = get(APTOS_API_KEY_ENV);
        let gas_station_api_key = get(GAS_STATION_API_KEY_ENV).or_else(|| aptos_api_key.clone());

        let cctp_tools_address = get(CCTP_TOOLS_ADDRESS_ENV)
            .map(|value| AccountAddress::from_hex(&value))
            .transpose()
            .map_err(|e| CctpError::InvalidConfig(format!("{CCTP_TOOLS_ADDRESS_ENV}: {e}")))?;

        let aptos_fee_payer = FeePayerConfig {
            address: get(APTOS_PAYER_ADDRESS_ENV)
                .map(|value| AccountAddress::from_hex(&value))
                .transpose()
                .map_err(|e| {
                    CctpError::InvalidConfig(format!("{APTOS_PAYER_ADDRESS_ENV}: {e}"))
                })?,
            account: get(APTOS_PAYER_PRIVATE_KEY_ENV)
                .map(|value| LocalAccount::from_private_key(&value))
                .transpose()?,
        };

        Ok(Self {
            network,
            bind,
            aptos_node_url: get(APTOS_NODE_URL_ENV)
                .unwrap_or_else(|| network.default_aptos_node_url().to_string()),
            aptos_api_key,
            solana_rpc_url: get(SOLANA_RPC_URL_ENV)
                .or_else(|| get(PUBLIC_SOLANA_RPC_URL_ENV))
                .unwrap_or_else(|| network.default_solana_rpc_url().to_string()),
            solana_rpc_api_key: get(SOLANA_RPC_API_KEY_ENV),
            iris_api_url: get(IRIS_API_URL_ENV)
                .unwrap_or_else(|| network.iris_api_url().to_string()),
            gas_station_url: get(GAS_STATION_URL_ENV)
                .unwrap_or_else(|| default_gas_station_url(network)),
            gas_station_api_key,
            cctp_tools_address,
            receive_message_script: get(RECEIVE_MESSAGE_SCRIPT_ENV).map(PathBuf::from),
            dapp_domain: get(DAPP_DOMAIN_ENV),
            aptos_fee_payer,
            solana_payer: SolanaPayerConfig::new(
                get(SOLANA_PAYER_PRIVATE_KEY_ENV),
                get(SOLANA_PAYER_ADDRESS_ENV),
            ),
        })
    }

    /// Derived Aptos account for `keypair` under the configured dApp origin.
    pub fn derived_signer(&self, keypair: Keypair) -> Result<SolanaDerivedSigner> {
        let domain = self
            .dapp_domain
            .as_deref()
            .ok_or_else(|| CctpError::MissingConfig(DAPP_DOMAIN_ENV.to_string()))?;
        SolanaDerivedSigner::new(keypair, domain, self.network)
    }

    /// Reads the compiled receive-message script, if one is configured.
    pub fn load_receive_message_script(&self) -> Result<Option<Vec<u8>>> {
        self.receive_message_script
            .as_ref()
            .map(|path| {
                std::fs::read(path).map_err(|e| {
                    CctpError::InvalidConfig(format!(
                        "{RECEIVE_MESSAGE_SCRIPT_ENV} {}: {e}",
                        path.display()
                    ))
                })
            })
            .transpose()
    }
}

fn default_gas_station_url(network: Network) -> String {
    match network {
        Network::Mainnet => DEFAULT_GAS_STATION_URL.to_string(),
        Network::Testnet => DEFAULT_GAS_STATION_URL.replace("mainnet", "testnet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.bind.to_string(), "0.0.0.0:3001");
        assert_eq!(config.aptos_node_url, "https://api.mainnet.aptoslabs.com/v1");
        assert_eq!(config.iris_api_url, "https://iris-api.circle.com");
        assert!(config.gas_station_api_key.is_none());
        assert!(!config.solana_payer.is_configured());
    }

    #[test]
    fn test_testnet_urls() {
        let config = config(&[(APTOS_NETWORK_ENV, "testnet")]).unwrap();
        assert_eq!(config.aptos_node_url, "https://api.testnet.aptoslabs.com/v1");
        assert_eq!(config.iris_api_url, "https://iris-api-sandbox.circle.com");
        insta::assert_snapshot!(config.gas_station_url, @"https://api.testnet.aptoslabs.com/gs/v1");
    }

    #[test]
    fn test_gas_station_key_falls_back_to_aptos_key() {
        let config = config(&[(APTOS_API_KEY_ENV, "aptos-key")]).unwrap();
        assert_eq!(config.gas_station_api_key.as_deref(), Some("aptos-key"));

        let config = config_with_both();
        assert_eq!(config.gas_station_api_key.as_deref(), Some("gs-key"));
    }

    fn config_with_both() -> Config {
        config(&[
            (APTOS_API_KEY_ENV, "aptos-key"),
            (GAS_STATION_API_KEY_ENV, "gs-key"),
        ])
        .unwrap()
    }

    #[test]
    fn test_solana_rpc_url_precedence() {
        let config = config(&[
            (PUBLIC_SOLANA_RPC_URL_ENV, "https://public.example"),
            (SOLANA_RPC_URL_ENV, "https://private.example"),
        ])
        .unwrap();
        assert_eq!(config.solana_rpc_url, "https://private.example");

        let config = config_public_only();
        assert_eq!(config.solana_rpc_url, "https://public.example");
    }

    fn config_public_only() -> Config {
        config(&[(PUBLIC_SOLANA_RPC_URL_ENV, "https://public.example")]).unwrap()
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config(&[(SOLANA_PAYER_PRIVATE_KEY_ENV, "  ")]).unwrap();
        assert!(!config.solana_payer.is_configured());
    }

    #[test]
    fn test_derived_signer_uses_dapp_domain() {
        let err = config(&[])
            .unwrap()
            .derived_signer(Keypair::new_from_array([2; 32]))
            .unwrap_err();
        assert!(matches!(err, CctpError::MissingConfig(_)));
        assert_eq!(err.status_code(), 503);

        let config = config(&[(DAPP_DOMAIN_ENV, "bridge.example.com")]).unwrap();
        let signer = config
            .derived_signer(Keypair::new_from_array([3; 32]))
            .unwrap();
        assert_eq!(signer.domain(), "bridge.example.com");
    }

    #[test]
    fn test_invalid_network_is_rejected() {
        assert!(matches!(
            config(&[(APTOS_NETWORK_ENV, "moonnet")]).unwrap_err(),
            CctpError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_aptos_payer_key_is_parsed() {
        let key = format!("0x{}", "55".repeat(32));
        let config = config(&[(APTOS_PAYER_PRIVATE_KEY_ENV, key.as_str())]).unwrap();
        let account = LocalAccount::from_private_key(&key).unwrap();
        assert_eq!(
            config.aptos_fee_payer.signer().unwrap().address(),
            account.address()
        );
    }

    #[test]
    fn test_solana_payer_mismatch() {
        let payer = Keypair::new_from_array([1; 32]);
        let other = Keypair::new_from_array([2; 32]);
        let config = SolanaPayerConfig::new(
            Some(payer.to_base58_string()),
            Some(other.pubkey().to_string()),
        );
        assert!(matches!(
            config.keypair().unwrap_err(),
            CctpError::FeePayerMismatch { .. }
        ));

        let matching = SolanaPayerConfig::new(
            Some(payer.to_base58_string()),
            Some(payer.pubkey().to_string()),
        );
        assert_eq!(matching.keypair().unwrap().pubkey(), payer.pubkey());
    }

    #[test]
    fn test_solana_payer_debug_hides_secret() {
        let payer = Keypair::new_from_array([1; 32]).to_base58_string();
        let config = SolanaPayerConfig::new(Some(payer.clone()), None);
        assert!(!format!("{config:?}").contains(&payer));
    }
}
