// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use warp::{Rejection, Reply};

use super::generic::{respond, AppState, PRIVACY_BURN_ROUTE};
use crate::bridge::{HumanAmount, SolanaBurnReceipt};
use crate::error::Result;

/// Body of the privacy-bridge burn. Carries a private key, so it has no
/// `Debug` impl.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyBurnRequest {
    /// base58 secret key of the temporary Solana wallet
    pub tmp_wallet_private_key: String,
    pub aptos_recipient: String,
    /// Decimal USDC; the whole balance when absent
    pub amount: Option<HumanAmount>,
}

async fn burn(state: &AppState, request: PrivacyBurnRequest) -> Result<SolanaBurnReceipt> {
    let amount = request
        .amount
        .as_ref()
        .map(HumanAmount::to_base_units)
        .transpose()?;
    state
        .solana_burner
        .burn(
            &request.tmp_wallet_private_key,
            &request.aptos_recipient,
            amount,
        )
        .await
}

pub(crate) async fn burn_handler(
    state: AppState,
    request: PrivacyBurnRequest,
) -> std::result::Result<impl Reply, Rejection> {
    Ok(respond(PRIVACY_BURN_ROUTE, burn(&state, request)).await)
}
