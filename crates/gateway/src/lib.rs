//! HTTP gateway for Deskmate — the embeddable chat widget.
//!
//! Serves the single-page widget and the JSON API it talks to. The gateway
//! hosts exactly one session; turns are serialized behind an async mutex.
//!
//! Built on Axum.

pub mod api_v1;
pub mod widget;

use axum::extract::DefaultBodyLimit;
use axum::{Router, http::Method, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use deskmate_agent::{CompletionInvoker, Session, SessionState, load_or_empty};
use deskmate_config::AppConfig;
use deskmate_core::store::{HistoryStore, TemplateStore};
use deskmate_core::turn::History;
use deskmate_memory::{FALLBACK_TEMPLATE, FileHistoryStore, FileTemplateStore};

pub use api_v1::SettingsResponse;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub session: Session,
    pub chat: Mutex<SessionState>,
    pub settings: SettingsResponse,
}

impl GatewayState {
    pub fn new(session: Session, history: History, settings: SettingsResponse) -> Self {
        Self {
            session,
            chat: Mutex::new(SessionState::new(history)),
            settings,
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router: health, v1 API and the embedded widget.
pub fn build_router(state: SharedState, allowed_origin: Option<&str>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));
    if let Some(origin) = allowed_origin.and_then(|o| o.parse::<axum::http::HeaderValue>().ok()) {
        cors = cors.allow_origin(tower_http::cors::AllowOrigin::exact(origin));
    }

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .merge(widget::widget_router())
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = deskmate_providers::build_from_config(&config)?;

    let templates = FileTemplateStore::new(&config.paths.template);
    let template = match templates.load_template().await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Using built-in template");
            FALLBACK_TEMPLATE.to_string()
        }
    };

    let store: Arc<dyn HistoryStore> = Arc::new(FileHistoryStore::new(&config.paths.history));
    let history = load_or_empty(store.as_ref()).await;
    info!(
        path = %config.paths.history.display(),
        turns = history.len(),
        "History loaded"
    );

    let invoker = CompletionInvoker::new(provider, config.model_params());
    let session = Session::new(template, store, invoker, config.max_turns_to_keep);
    let state = Arc::new(GatewayState::new(
        session,
        history,
        SettingsResponse::from_config(&config),
    ));

    let origin = format!("http://{addr}");
    let app = build_router(state, Some(&origin));

    info!(addr = %addr, model = %config.model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
