// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aptos burn and mint endpoints.

use alloy_primitives::{hex, B256};
use serde::{Deserialize, Serialize};
use tracing::info;
use warp::{Rejection, Reply};

use super::generic::{
    respond, AppState, BUILD_BURN_ROUTE, MINT_CCTP_ROUTE, SIGNING_MESSAGE_ROUTE,
    SUBMIT_BURN_ROUTE,
};
use crate::bridge::{BurnRequest, HumanAmount, MintOutcome, MintReceipt, ScriptSigningRequest};
use crate::chain::aptos::{AccountAddress, SimpleTransaction};
use crate::error::{CctpError, Result};
use crate::protocol::{AddressInput, DomainId, Numeric};
use crate::wallet::{ByteInput, SenderAuthenticatorInput};

fn domain(value: &Numeric, field: &str) -> Result<DomainId> {
    let raw = value.to_u32(field)?;
    DomainId::from_u32(raw).ok_or(CctpError::UnsupportedDomain(raw))
}

fn optional_address(value: Option<&str>) -> Result<Option<AccountAddress>> {
    value.map(AccountAddress::from_hex).transpose()
}

fn optional_u64(value: Option<&Numeric>, field: &str) -> Result<Option<u64>> {
    value.map(|n| n.to_u64(field)).transpose()
}

// ============================================================================
// POST /api/aptos/get-signing-message
// ============================================================================

/// Body of the script signing-message preview.
///
/// `functionArguments` is `[amount, destinationDomain, mintRecipient,
/// burnToken]`, exactly as the wallet passes them to the script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningMessageRequest {
    pub sender: String,
    pub bytecode: ByteInput,
    pub function_arguments: (Numeric, Numeric, AddressInput, AddressInput),
    pub max_gas_amount: Option<Numeric>,
    pub gas_unit_price: Option<Numeric>,
    pub fee_payer_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningMessageResponse {
    pub signing_message: Vec<u8>,
}

async fn signing_message(
    state: &AppState,
    request: SigningMessageRequest,
) -> Result<SigningMessageResponse> {
    let (amount, destination_domain, mint_recipient, burn_token) = &request.function_arguments;
    let script = ScriptSigningRequest::builder()
        .sender(AccountAddress::from_hex(&request.sender)?)
        .bytecode(request.bytecode.to_bytes()?)
        .amount(amount.to_u64("functionArguments[0]")?)
        .destination_domain(destination_domain.to_u32("functionArguments[1]")?)
        .mint_recipient(mint_recipient.normalize()?)
        .burn_token(burn_token.normalize()?)
        .maybe_fee_payer(optional_address(request.fee_payer_address.as_deref())?)
        .maybe_max_gas_amount(optional_u64(request.max_gas_amount.as_ref(), "maxGasAmount")?)
        .maybe_gas_unit_price(optional_u64(request.gas_unit_price.as_ref(), "gasUnitPrice")?)
        .build();

    let signing_message = state.burner.script_signing_message(&script).await?;
    Ok(SigningMessageResponse { signing_message })
}

pub(crate) async fn signing_message_handler(
    state: AppState,
    request: SigningMessageRequest,
) -> std::result::Result<impl Reply, Rejection> {
    Ok(respond(SIGNING_MESSAGE_ROUTE, signing_message(&state, request)).await)
}

// ============================================================================
// POST /api/aptos/build-burn
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildBurnRequest {
    pub sender: String,
    /// Decimal USDC, e.g. `"12.5"`
    pub amount: HumanAmount,
    pub destination_domain: Numeric,
    pub recipient: String,
    #[serde(default)]
    pub sponsored: bool,
    pub fee_payer_address: Option<String>,
    pub max_gas_amount: Option<Numeric>,
    pub gas_unit_price: Option<Numeric>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildBurnResponse {
    /// BCS `SimpleTransaction`, `0x` hex
    pub transaction: String,
    pub signing_message: Vec<u8>,
    pub expiration_timestamp_secs: u64,
    pub fee_payer_address: Option<String>,
    pub mint_recipient: B256,
    pub sponsored: bool,
}

async fn build_burn(state: &AppState, request: BuildBurnRequest) -> Result<BuildBurnResponse> {
    let burn = BurnRequest::builder()
        .sender(AccountAddress::from_hex(&request.sender)?)
        .amount(request.amount.to_base_units()?)
        .destination_domain(domain(&request.destination_domain, "destinationDomain")?)
        .recipient(request.recipient)
        .sponsored(request.sponsored)
        .maybe_fee_payer(optional_address(request.fee_payer_address.as_deref())?)
        .maybe_max_gas_amount(optional_u64(request.max_gas_amount.as_ref(), "maxGasAmount")?)
        .maybe_gas_unit_price(optional_u64(request.gas_unit_price.as_ref(), "gasUnitPrice")?)
        .build();

    let built = state.burner.build(&burn).await?;
    Ok(BuildBurnResponse {
        transaction: format!("0x{}", hex::encode(built.transaction.to_bytes()?)),
        signing_message: built.signing_message,
        expiration_timestamp_secs: built.expiration_timestamp_secs,
        fee_payer_address: built.fee_payer.map(|payer| payer.address.to_string()),
        mint_recipient: built.mint_recipient,
        sponsored: built.sponsored,
    })
}

pub(crate) async fn build_burn_handler(
    state: AppState,
    request: BuildBurnRequest,
) -> std::result::Result<impl Reply, Rejection> {
    Ok(respond(BUILD_BURN_ROUTE, build_burn(&state, request)).await)
}

// ============================================================================
// POST /api/aptos/submit-burn
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBurnRequest {
    /// BCS `SimpleTransaction` as returned by `build-burn`
    pub transaction: ByteInput,
    /// Whatever the wallet returned from `signTransaction`
    pub sender_authenticator: SenderAuthenticatorInput,
    #[serde(default)]
    pub sponsored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBurnResponse {
    pub transaction_hash: String,
}

async fn submit_burn(state: &AppState, request: SubmitBurnRequest) -> Result<SubmitBurnResponse> {
    let transaction = SimpleTransaction::from_bytes(&request.transaction.to_bytes()?)
        .map_err(|e| CctpError::Validation(format!("Invalid transaction bytes: {e}")))?;
    let authenticator = request.sender_authenticator.normalize()?;
    let transaction_hash = state
        .burner
        .submit(&transaction, &authenticator, request.sponsored)
        .await?;
    Ok(SubmitBurnResponse { transaction_hash })
}

pub(crate) async fn submit_burn_handler(
    state: AppState,
    request: SubmitBurnRequest,
) -> std::result::Result<impl Reply, Rejection> {
    Ok(respond(SUBMIT_BURN_ROUTE, submit_burn(&state, request)).await)
}

// ============================================================================
// POST /api/aptos/mint-cctp
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintCctpRequest {
    /// Source-chain burn transaction hash or signature
    pub signature: String,
    pub source_domain: Numeric,
    pub final_recipient: Option<String>,
}

/// Either `pending: true` with a reason, or the mint receipt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintCctpResponse {
    pub pending: bool,
    pub state: &'static str,
    pub source_tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub receipt: Option<MintReceipt>,
}

impl From<MintOutcome> for MintCctpResponse {
    fn from(outcome: MintOutcome) -> Self {
        let operation = outcome.operation();
        let state = operation.state().as_str();
        let source_tx_hash = operation.source_tx_hash().to_string();
        match outcome {
            MintOutcome::Pending { reason, .. } => Self {
                pending: true,
                state,
                source_tx_hash,
                message: Some(format!("{reason}. Retry in a minute or two.")),
                receipt: None,
            },
            MintOutcome::Minted { receipt, .. } => Self {
                pending: false,
                state,
                source_tx_hash,
                message: None,
                receipt: Some(receipt),
            },
        }
    }
}

async fn mint_cctp(state: &AppState, request: MintCctpRequest) -> Result<MintCctpResponse> {
    let source_domain = domain(&request.source_domain, "sourceDomain")?;
    let final_recipient = optional_address(request.final_recipient.as_deref())?;
    let outcome = state
        .minter
        .mint(source_domain, &request.signature, final_recipient)
        .await?;
    let response = MintCctpResponse::from(outcome);
    info!(
        source_tx_hash = %response.source_tx_hash,
        pending = response.pending,
        state = response.state,
        event = "mint_request_handled"
    );
    Ok(response)
}

pub(crate) async fn mint_cctp_handler(
    state: AppState,
    request: MintCctpRequest,
) -> std::result::Result<impl Reply, Rejection> {
    Ok(respond(MINT_CCTP_ROUTE, mint_cctp(&state, request)).await)
}
