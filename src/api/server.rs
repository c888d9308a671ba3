//! HTTP server exposing the transformation pipeline.
//!
//! # API Endpoints
//!
//! | Method | Path                             | Description                        |
//! |--------|----------------------------------|------------------------------------|
//! | GET    | `/health`                        | Health check                       |
//! | GET    | `/transformations`               | List registered transformations    |
//! | POST   | `/transformations/{name}/enable` | Enable or disable one unit         |
//! | POST   | `/transform`                     | Upload CSV + pipeline, get JSON    |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use super::types::{ErrorResponse, ToggleRequest, ToggleResponse, TransformationList};
use crate::error::ServerResult;
use crate::parser;
use crate::transform::{execute, PipelineConfig, PipelineResult, TransformationRegistry};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Upload cap; everything is held in memory for the duration of a request.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Builds the application router around a registry.
///
/// Split out from [`start_server`] so integration tests can drive the full
/// stack without binding a socket.
pub fn app(registry: Arc<TransformationRegistry>) -> Router {
    // Permissive CORS; the service carries no credentials.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/transformations", get(list_transformations))
        .route("/transformations/{name}/enable", post(toggle_transformation))
        .route("/transform", post(transform_csv))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Start the HTTP server with the default registry.
pub async fn start_server(port: u16) -> ServerResult<()> {
    let registry = Arc::new(TransformationRegistry::with_defaults());
    let app = app(registry);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("🚀 tablepipe server running on http://localhost:{}", port);
    println!("   GET  /transformations                 - List transformations");
    println!("   POST /transformations/{{name}}/enable  - Toggle a transformation");
    println!("   POST /transform                       - Upload CSV + pipeline");
    println!("   GET  /health                          - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "tablepipe",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Every registered transformation with its enabled state and config schema.
async fn list_transformations(
    State(registry): State<Arc<TransformationRegistry>>,
) -> Json<TransformationList> {
    Json(TransformationList {
        transformations: registry.list(),
    })
}

/// Enable or disable one transformation at runtime.
async fn toggle_transformation(
    State(registry): State<Arc<TransformationRegistry>>,
    Path(name): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    registry.set_enabled(&name, request.enabled).map_err(|e| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(e.kind(), e.to_string())),
        )
    })?;

    info!(transformation = %name, enabled = request.enabled, "transformation toggled");
    let state = if request.enabled { "enabled" } else { "disabled" };
    Ok(Json(ToggleResponse {
        success: true,
        message: format!("Transformation '{}' {}", name, state),
    }))
}

/// Transform an uploaded CSV file through a submitted pipeline.
async fn transform_csv(
    State(registry): State<Arc<TransformationRegistry>>,
    mut multipart: Multipart,
) -> Result<Json<PipelineResult>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut pipeline_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request("bad_request", format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| bad_request("bad_request", format!("Read error: {}", e)))?
                        .to_vec(),
                );
            }
            "pipeline" => {
                pipeline_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request("bad_request", format!("Read error: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request("bad_request", "No file provided"))?;
    let file_name = file_name.unwrap_or_default();
    if file_name.is_empty() {
        return Err(bad_request("bad_request", "No file selected"));
    }
    if !file_name.ends_with(".csv") {
        return Err(bad_request("bad_request", "Only CSV files are supported"));
    }
    let pipeline_raw = match pipeline_raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(bad_request("bad_request", "No pipeline configuration provided")),
    };
    let config = PipelineConfig::from_json(&pipeline_raw)
        .map_err(|_| bad_request("bad_request", "Invalid JSON in pipeline configuration"))?;

    info!(
        file = %file_name,
        bytes = bytes.len(),
        steps = config.steps.len(),
        "transform request"
    );

    let parsed = parser::parse_bytes(&bytes).map_err(|e| bad_request("csv_error", e.to_string()))?;
    debug!(
        encoding = %parsed.encoding,
        delimiter = %parsed.delimiter,
        rows = parsed.table.shape().0,
        columns = parsed.table.shape().1,
        "csv parsed"
    );

    let result = execute(&registry, &parsed.table, &config.steps).map_err(|e| {
        debug!(error = %e, "pipeline failed");
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&e)))
    })?;

    Ok(Json(result))
}

fn bad_request(kind: &str, message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(kind, message)))
}
