//! HTTP API server.
//!
//! Exposes the query pipeline to browsers and other programs, and serves
//! generated audio and summary files from the data directory.

use crate::cli::delivery::{static_url, Delivery, DeliveryOptions};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::collaborators::SUPPORTED_LANGUAGES;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, QueryResult};
use crate::summarizer::AudienceTier;
use crate::VettError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::error;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    delivery: Delivery,
    data_dir: PathBuf,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vett doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::from_settings(&settings)?;
    let delivery = Delivery::from_settings(&settings, &orchestrator.summarizer());
    let state = Arc::new(AppState {
        orchestrator,
        delivery,
        data_dir: settings.data_dir(),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Vett API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Search", "GET  /api/search-and-process?query=...");
    Output::kv("Languages", "GET  /api/languages");
    Output::kv("Files", "GET  /static/...");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/search-and-process", get(search_and_process))
        .route("/api/languages", get(languages))
        .nest_service("/static", ServeDir::new(&state.data_dir))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
    #[serde(default)]
    age_group: Option<String>,
    #[serde(default)]
    translate_to: Option<String>,
    #[serde(default)]
    speak: bool,
    #[serde(default)]
    download: bool,
}

#[derive(Serialize)]
struct SearchResponse {
    #[serde(flatten)]
    result: QueryResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    translated_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_download_url: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search_and_process(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let tier = AudienceTier::from_label(params.age_group.as_deref().unwrap_or("adult"));

    let result = match state.orchestrator.answer(&params.query, tier).await {
        Ok(result) => result,
        Err(e @ VettError::Validation(_)) => {
            return error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!("Search failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let options = DeliveryOptions {
        translate_to: params.translate_to.filter(|t| !t.trim().is_empty()),
        speak: params.speak,
        download: params.download,
    };
    let extras = state
        .delivery
        .deliver(&result.summary, &result.query, &options)
        .await;

    Json(SearchResponse {
        translated_summary: extras.translated_summary,
        audio_download_url: extras
            .audio_path
            .and_then(|p| static_url(&state.data_dir, &p)),
        audio_error: extras.audio_error,
        summary_download_url: extras
            .summary_path
            .and_then(|p| static_url(&state.data_dir, &p)),
        result,
    })
    .into_response()
}

async fn languages() -> impl IntoResponse {
    let map: serde_json::Map<String, serde_json::Value> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(name, code)| (name.to_string(), serde_json::Value::from(*code)))
        .collect();
    Json(map)
}
