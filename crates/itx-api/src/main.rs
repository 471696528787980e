//! itx-api: REST API server for the itx issue tracker
//!
//! One resource, `/api/issues/{project}`, with project-scoped CRUD.
//! Validation problems are reported in a 200 body carrying an `error`
//! key; only store unavailability (503) and unexpected store failures
//! (500) use HTTP error statuses.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use itx_core::{
    Config, CreateIssue, CreateOutcome, DeleteIssue, DeleteOutcome, Error, IssueService,
    JsonlStore, UpdateIssue, UpdateOutcome,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
struct AppState {
    service: IssueService<JsonlStore>,
}

/// Map a service error to its HTTP shape
fn service_error(err: Error) -> Response {
    match err {
        Error::NotConnected => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "database unavailable",
                "message": "document store is not connected; set ITX_STORE or store_path in itx.toml",
            })),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "database error",
                "message": other.to_string(),
            })),
        )
            .into_response(),
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// View issues on a project, optionally filtered by query params
async fn get_issues(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Query(filter): Query<BTreeMap<String, String>>,
) -> Response {
    match state.service.query(&project, filter) {
        Ok(issues) => (StatusCode::OK, Json(issues)).into_response(),
        Err(err) => service_error(err),
    }
}

/// Create an issue under a project
async fn create_issue(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    body: Option<Json<CreateIssue>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();
    match state.service.create(&project, body) {
        Ok(CreateOutcome::Created(issue)) => (StatusCode::OK, Json(issue)).into_response(),
        Ok(CreateOutcome::MissingFields) => {
            (StatusCode::OK, Json(json!({ "error": "required field(s) missing" }))).into_response()
        }
        Err(err) => service_error(err),
    }
}

/// Partially update an issue by `_id`
async fn update_issue(
    State(state): State<Arc<AppState>>,
    body: Option<Json<UpdateIssue>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();
    let payload = match state.service.update(body) {
        Ok(UpdateOutcome::Updated(id)) => json!({ "result": "successfully updated", "_id": id }),
        Ok(UpdateOutcome::MissingId) => json!({ "error": "missing _id" }),
        Ok(UpdateOutcome::NoFields(id)) => json!({ "error": "no update field(s) sent", "_id": id }),
        Ok(UpdateOutcome::Failed(id)) => json!({ "error": "could not update", "_id": id }),
        Err(err) => return service_error(err),
    };
    (StatusCode::OK, Json(payload)).into_response()
}

/// Delete an issue by `_id`
async fn delete_issue(
    State(state): State<Arc<AppState>>,
    body: Option<Json<DeleteIssue>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();
    let payload = match state.service.delete(body) {
        Ok(DeleteOutcome::Deleted(id)) => json!({ "result": "successfully deleted", "_id": id }),
        Ok(DeleteOutcome::MissingId) => json!({ "error": "missing _id" }),
        Ok(DeleteOutcome::Failed(id)) => json!({ "error": "could not delete", "_id": id }),
        Err(err) => return service_error(err),
    };
    (StatusCode::OK, Json(payload)).into_response()
}

/// Build the router
fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/issues/{project}",
            get(get_issues)
                .post(create_issue)
                .put(update_issue)
                .delete(delete_issue),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut config = Config::load(std::path::Path::new("itx.toml"))?;
    if let Ok(path) = std::env::var("ITX_STORE") {
        config.store_path = path;
    }
    if let Ok(port) = std::env::var("ITX_API_PORT")
        && let Ok(port) = port.parse()
    {
        config.port = port;
    }

    // Serve immediately; requests get 503 until the store is attached.
    let state = Arc::new(AppState {
        service: IssueService::new(JsonlStore::disconnected()),
    });

    {
        let state = state.clone();
        let path = config.store_path.clone();
        tokio::spawn(async move {
            match JsonlStore::open(&path) {
                Ok(store) => {
                    state.service.attach(store);
                    tracing::info!("document store connected at {}", path);
                }
                Err(err) => {
                    tracing::error!("document store connection error: {}", err);
                    tracing::error!("the API will return 503 until the store is reachable");
                }
            }
        });
    }

    let app = app(state);

    let addr: std::net::SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address: {}", e))?;
    tracing::info!("Starting itx-api on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
