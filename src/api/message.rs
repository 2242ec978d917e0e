// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use tracing::info;
use warp::{Rejection, Reply};

use super::generic::{respond, DEPOSIT_MESSAGE_HASH_ROUTE};
use crate::error::Result;
use crate::protocol::{DepositMessageInput, DigestAlgorithm};

#[derive(Debug, Clone, Deserialize)]
pub struct DepositMessageHashRequest {
    pub message: DepositMessageInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositMessageHashResponse {
    /// `0x`-prefixed
    pub deposit_message_hash: String,
    pub message_hash: String,
}

fn deposit_message_hash(request: DepositMessageHashRequest) -> Result<DepositMessageHashResponse> {
    let message = request.message.validate()?;
    let digest = message.digest(DigestAlgorithm::Sha3_256);
    info!(
        source_domain = message.source_domain,
        destination_domain = message.destination_domain,
        nonce = message.nonce,
        message_length_bytes = message.encode().len(),
        digest = %digest.to_prefixed_hex(),
        event = "deposit_message_hashed"
    );
    Ok(DepositMessageHashResponse {
        deposit_message_hash: digest.to_prefixed_hex(),
        message_hash: digest.to_hex(),
    })
}

pub(crate) async fn deposit_message_hash_handler(
    request: DepositMessageHashRequest,
) -> std::result::Result<impl Reply, Rejection> {
    Ok(respond(DEPOSIT_MESSAGE_HASH_ROUTE, async move {
        deposit_message_hash(request)
    })
    .await)
}
