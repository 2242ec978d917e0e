// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! `cctp-aptos-server`: the bridge HTTP service.
//!
//! Configuration comes from the environment (and `.env` when present); log
//! verbosity from `RUST_LOG`, defaulting to `info`.

use cctp_aptos::api::ApiServer;
use cctp_aptos::{Config, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), event = "dotenv_loaded");
    }

    let config = Config::from_env()?;
    info!(
        network = %config.network,
        bind = %config.bind,
        aptos_node_url = %config.aptos_node_url,
        iris_api_url = %config.iris_api_url,
        cctp_tools_address = ?config.cctp_tools_address,
        dapp_domain = ?config.dapp_domain,
        event = "config_loaded"
    );
    if config.aptos_fee_payer.account.is_none() {
        warn!(event = "aptos_fee_payer_key_missing");
    }
    if !config.solana_payer.is_configured() {
        warn!(event = "solana_payer_missing");
    }

    let server = ApiServer::from_config(&config)?;
    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, event = "shutdown_signal_failed");
                std::future::pending::<()>().await;
            }
            info!(event = "shutdown_requested");
        })
        .await
}
