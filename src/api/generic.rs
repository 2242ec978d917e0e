// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared response envelope, server wiring and rejection handling.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};
use warp::http::{Method, StatusCode};
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use super::{aptos, message, privacy_bridge};
use crate::bridge::{AptosBurner, MintOrchestrator, SolanaBurner};
use crate::config::Config;
use crate::error::{CctpError, Result};
use crate::providers::{
    AptosRestClient, GasStationClient, IrisAttestationProvider, SolanaRpcClient, TokioClock,
};
use crate::spans;
use crate::traits::{AptosNode, AttestationProvider, Clock, SolanaRpc, SponsorRelay};

/// Largest request body accepted by any route.
const MAX_BODY_BYTES: u64 = 256 * 1024;

pub(crate) const SIGNING_MESSAGE_ROUTE: &str = "/api/aptos/get-signing-message";
pub(crate) const BUILD_BURN_ROUTE: &str = "/api/aptos/build-burn";
pub(crate) const SUBMIT_BURN_ROUTE: &str = "/api/aptos/submit-burn";
pub(crate) const MINT_CCTP_ROUTE: &str = "/api/aptos/mint-cctp";
pub(crate) const DEPOSIT_MESSAGE_HASH_ROUTE: &str = "/api/compute-deposit-message-hash";
pub(crate) const PRIVACY_BURN_ROUTE: &str = "/api/privacy-bridge/burn";

pub type Burner = AptosBurner<Arc<dyn AptosNode>, Arc<dyn SponsorRelay>>;
pub type Minter =
    MintOrchestrator<Arc<dyn AttestationProvider>, Arc<dyn AptosNode>, Arc<dyn Clock>>;
pub type SolanaBridge = SolanaBurner<Arc<dyn SolanaRpc>>;

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

/// Standardized response structure for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Machine-readable error code (if failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    fn failure(message: String, code: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            code: Some(code.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Runs a handler body inside an HTTP span and turns its result into a
/// reply, taking the status from [`CctpError::status_code`].
pub(crate) async fn respond<T, F>(route: &'static str, work: F) -> WithStatus<Json>
where
    T: Serialize,
    F: Future<Output = Result<T>>,
{
    let span = spans::http_request("POST", route);
    async move {
        let (body, status) = match work.await {
            Ok(data) => (warp::reply::json(&ApiResponse::ok(data)), StatusCode::OK),
            Err(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    spans::record_error(&e);
                    error!(
                        route,
                        status = status.as_u16(),
                        code = e.code(),
                        error = %e,
                        event = "request_failed"
                    );
                } else {
                    warn!(
                        route,
                        status = status.as_u16(),
                        code = e.code(),
                        error = %e,
                        event = "request_rejected"
                    );
                }
                (
                    warp::reply::json(&ApiResponse::<()>::failure(e.to_string(), e.code())),
                    status,
                )
            }
        };
        tracing::Span::current().record("http.status_code", status.as_u16());
        warp::reply::with_status(body, status)
    }
    .instrument(span)
    .await
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Shared services behind every handler.
///
/// Providers sit behind `Arc<dyn …>` so the same state serves the real
/// clients and the test fakes.
#[derive(Clone)]
pub struct AppState {
    pub burner: Arc<Burner>,
    pub minter: Arc<Minter>,
    pub solana_burner: Arc<SolanaBridge>,
}

impl AppState {
    pub fn new(burner: Burner, minter: Minter, solana_burner: SolanaBridge) -> Self {
        Self {
            burner: Arc::new(burner),
            minter: Arc::new(minter),
            solana_burner: Arc::new(solana_burner),
        }
    }
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Converts warp rejections into the standard envelope.
pub async fn handle_rejection(rej: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, message, code) =
        if let Some(err) = rej.find::<warp::filters::body::BodyDeserializeError>() {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {err}"),
                "VALIDATION_ERROR",
            )
        } else if rej.is_not_found() {
            (
                StatusCode::NOT_FOUND,
                "Endpoint not found".to_string(),
                "NOT_FOUND",
            )
        } else if rej.find::<warp::reject::PayloadTooLarge>().is_some() {
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
                "VALIDATION_ERROR",
            )
        } else if rej.find::<warp::reject::UnsupportedMediaType>().is_some() {
            (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected application/json".to_string(),
                "VALIDATION_ERROR",
            )
        } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
            (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
                "METHOD_NOT_ALLOWED",
            )
        } else {
            error!(rejection = ?rej, event = "unhandled_rejection");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            )
        };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::<()>::failure(message, code)),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for the bridge.
pub struct ApiServer {
    bind: SocketAddr,
    state: AppState,
}

impl ApiServer {
    pub fn new(bind: SocketAddr, state: AppState) -> Self {
        Self { bind, state }
    }

    /// Wires the production providers from `config`.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable receive-message script or an invalid Solana
    /// RPC URL. Missing payer keys are not an error here; the routes that
    /// need them answer 503.
    pub fn from_config(config: &Config) -> Result<Self> {
        let node: Arc<dyn AptosNode> = Arc::new(AptosRestClient::new(
            config.aptos_node_url.clone(),
            config.aptos_api_key.clone(),
        ));
        let relay = config.gas_station_api_key.as_ref().map(|key| {
            Arc::new(GasStationClient::new(config.gas_station_url.clone(), key.clone()))
                as Arc<dyn SponsorRelay>
        });
        if relay.is_none() {
            warn!(event = "gas_station_disabled");
        }

        let burner = AptosBurner::builder()
            .node(node.clone())
            .maybe_relay(relay)
            .network(config.network)
            .maybe_cctp_tools(config.cctp_tools_address)
            .fee_payer(config.aptos_fee_payer.clone())
            .build();

        let minter = MintOrchestrator::builder()
            .attestation(
                Arc::new(IrisAttestationProvider::new(config.iris_api_url.clone()))
                    as Arc<dyn AttestationProvider>,
            )
            .node(node)
            .clock(Arc::new(TokioClock::new()) as Arc<dyn Clock>)
            .network(config.network)
            .maybe_receive_message_script(config.load_receive_message_script()?)
            .fee_payer(config.aptos_fee_payer.clone())
            .build();

        let rpc: Arc<dyn SolanaRpc> = Arc::new(SolanaRpcClient::new(
            &config.solana_rpc_url,
            config.solana_rpc_api_key.as_deref(),
        )?);
        let solana_burner = SolanaBurner::builder()
            .rpc(rpc)
            .network(config.network)
            .payer(config.solana_payer.clone())
            .build();

        Ok(Self::new(
            config.bind,
            AppState::new(burner, minter, solana_burner),
        ))
    }

    /// Serves until `shutdown` resolves.
    pub async fn run<S>(self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let (addr, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(self.bind, shutdown)
            .map_err(|e| CctpError::InvalidConfig(format!("cannot bind {}: {e}", self.bind)))?;
        info!(addr = %addr, event = "server_listening");
        server.await;
        info!(event = "server_stopped");
        Ok(())
    }

    /// All routes, with CORS and the rejection handler applied.
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        let state = self.state.clone();

        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| {
                warp::reply::json(&HealthResponse {
                    status: "ok".to_string(),
                })
            });

        let signing_message = warp::path!("api" / "aptos" / "get-signing-message")
            .and(warp::post())
            .and(with_state(state.clone()))
            .and(json_body())
            .and_then(aptos::signing_message_handler);

        let build_burn = warp::path!("api" / "aptos" / "build-burn")
            .and(warp::post())
            .and(with_state(state.clone()))
            .and(json_body())
            .and_then(aptos::build_burn_handler);

        let submit_burn = warp::path!("api" / "aptos" / "submit-burn")
            .and(warp::post())
            .and(with_state(state.clone()))
            .and(json_body())
            .and_then(aptos::submit_burn_handler);

        let mint = warp::path!("api" / "aptos" / "mint-cctp")
            .and(warp::post())
            .and(with_state(state.clone()))
            .and(json_body())
            .and_then(aptos::mint_cctp_handler);

        let deposit_hash = warp::path!("api" / "compute-deposit-message-hash")
            .and(warp::post())
            .and(json_body())
            .and_then(message::deposit_message_hash_handler);

        let privacy_burn = warp::path!("api" / "privacy-bridge" / "burn")
            .and(warp::post())
            .and(with_state(state))
            .and(json_body())
            .and_then(privacy_bridge::burn_handler);

        let cors = warp::cors()
            .allow_any_origin()
            .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(vec!["content-type"]);

        health
            .or(signing_message)
            .or(build_burn)
            .or(submit_burn)
            .or(mint)
            .or(deposit_hash)
            .or(privacy_burn)
            .with(cors)
            .recover(handle_rejection)
    }
}
