use crate::config::ToolPaths;
use crate::interfaces::{InterfaceInfo, interface_info, list_interfaces};
use crate::metrics::estimate_distance;
use crate::permissions::wifi_adapters;
use crate::traits::NetworkRecord;
use crate::view::ScanViewHandle;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// The shared state for our web server.
pub type WebServerState = State<Arc<AppState>>;

pub struct AppState {
    pub view: ScanViewHandle,
    pub tools: ToolPaths,
}

/// Builds the API router. Split out from `start_web_server` so tests can
/// drive it without binding a socket.
pub fn router(view: ScanViewHandle, tools: ToolPaths) -> Router {
    let app_state = Arc::new(AppState { view, tools });

    Router::new()
        .route("/api/networks", get(api_networks))
        .route("/api/networks/{bssid}", get(api_network_details))
        .route("/api/status", get(api_status))
        .route("/api/scan/start", post(api_scan_start))
        .route("/api/scan/stop", post(api_scan_stop))
        .route("/api/clear", post(api_clear))
        .route("/api/export", post(api_export))
        .route("/api/interfaces", get(api_interfaces))
        .with_state(app_state)
}

/// Starts the Axum web server.
///
/// # Returns
/// A `JoinHandle` for the server task.
pub fn start_web_server(
    view: ScanViewHandle,
    tools: ToolPaths,
    addr: SocketAddr,
) -> JoinHandle<Result<(), crate::Error>> {
    let app = router(view, tools);
    tracing::info!("🌐 Web server listening on {}", addr);

    tokio::spawn(async move {
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service())
            .await
            .map_err(|e| crate::Error::WebServer(e.into()))
    })
}

fn error_response(status: StatusCode, e: impl std::fmt::Display) -> Response {
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

// --- Route Handlers ---

/// The display collection, in first-seen order.
async fn api_networks(State(state): WebServerState) -> impl IntoResponse {
    let networks = state.view.snapshot();
    (StatusCode::OK, Json(networks.as_ref().clone())).into_response()
}

#[derive(Serialize)]
struct NetworkDetails {
    #[serde(flatten)]
    record: NetworkRecord,
    estimated_distance_m: Option<f64>,
}

async fn api_network_details(
    State(state): WebServerState,
    Path(bssid): Path<String>,
) -> impl IntoResponse {
    match state.view.get(&bssid) {
        Some(record) => {
            let estimated_distance_m = estimate_distance(Some(record.signal_level))
                .map(|d| (d * 100.0).round() / 100.0);
            (StatusCode::OK, Json(NetworkDetails { record, estimated_distance_m })).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, format!("Network not found: {}", bssid)),
    }
}

async fn api_status(State(state): WebServerState) -> impl IntoResponse {
    match state.view.status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, e),
    }
}

#[derive(Deserialize)]
struct StartParams {
    #[serde(default)]
    clear: bool,
}

async fn api_scan_start(
    State(state): WebServerState,
    Query(params): Query<StartParams>,
) -> impl IntoResponse {
    match state.view.start(params.clear).await {
        Ok(started) => {
            (StatusCode::OK, Json(serde_json::json!({ "scanning": true, "started": started })))
                .into_response()
        }
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, e),
    }
}

async fn api_scan_stop(State(state): WebServerState) -> impl IntoResponse {
    match state.view.stop().await {
        Ok(stopped) => {
            (StatusCode::OK, Json(serde_json::json!({ "scanning": false, "stopped": stopped })))
                .into_response()
        }
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, e),
    }
}

async fn api_clear(State(state): WebServerState) -> impl IntoResponse {
    match state.view.clear().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "cleared" }))).into_response(),
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, e),
    }
}

#[derive(Deserialize, Default)]
struct ExportRequest {
    path: Option<PathBuf>,
}

/// Export failures come back as a JSON error instead of taking the server down.
async fn api_export(
    State(state): WebServerState,
    payload: Option<Json<ExportRequest>>,
) -> impl IntoResponse {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    match state.view.export(req.path).await {
        Ok(path) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "success", "path": path.display().to_string() })),
        )
            .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to export results: {}", e)),
    }
}

async fn api_interfaces(State(state): WebServerState) -> impl IntoResponse {
    let names = match list_interfaces(&state.tools.ifconfig_path).await {
        Ok(names) => names,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };
    let wifi_devices: Vec<String> = match wifi_adapters(&state.tools.networksetup_path).await {
        Ok(adapters) => adapters.into_iter().map(|a| a.device).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list hardware ports, guessing interface kinds");
            Vec::new()
        }
    };

    let mut infos: Vec<InterfaceInfo> = Vec::with_capacity(names.len());
    for name in names {
        match interface_info(&state.tools.ifconfig_path, &name, &wifi_devices).await {
            Ok(info) => infos.push(info),
            Err(e) => tracing::error!(interface = %name, error = %e, "Error getting interface info"),
        }
    }
    (StatusCode::OK, Json(infos)).into_response()
}
