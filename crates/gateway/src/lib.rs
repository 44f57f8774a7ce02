//! PaperLens API Gateway
//!
//! HTTP surface over the common library:
//! - PDF metadata extraction (upload or Drive file id)
//! - Saved paper create / list / delete and CSV export
//! - Google Drive change notifications
//! - Health, readiness and request metrics

pub mod handlers;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use paperlens_common::{
    config::AppConfig,
    db::{self, PaperStore},
    errors::Result,
    extraction::ExtractionPipeline,
    ingestion::{NotificationTrigger, RemoteIngestion},
    llm::{self, MetadataModel},
    sources::{self, DocumentSource, GOOGLE_DRIVE},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: ExtractionPipeline,
    pub store: Arc<dyn PaperStore>,
    pub remote: RemoteIngestion,
    pub trigger: NotificationTrigger,
}

impl AppState {
    /// Assemble state from already constructed components
    pub fn new(
        config: Arc<AppConfig>,
        model: Arc<dyn MetadataModel>,
        store: Arc<dyn PaperStore>,
        source: Option<Arc<dyn DocumentSource>>,
    ) -> Self {
        let pipeline = ExtractionPipeline::new(model);
        let remote = RemoteIngestion::new(pipeline.clone(), source);
        let trigger = NotificationTrigger::new(remote.clone(), GOOGLE_DRIVE);

        Self {
            config,
            pipeline,
            store,
            remote,
            trigger,
        }
    }

    /// Build model, store and Drive source from configuration
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self> {
        let model = llm::create_model(&config.llm)?;
        let store = db::create_store(&config).await?;
        let source = sources::create_drive_source(&config.drive)?;

        tracing::info!(
            model = %model.model_name(),
            store = store.backend_name(),
            drive_enabled = source.is_some(),
            "Application state initialized"
        );

        Ok(Self::new(config, model, store, source))
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    let api_routes = Router::new()
        // Extraction
        .route("/extract", post(handlers::extract::extract))

        // Saved papers
        .route("/papers", get(handlers::papers::list_papers))
        .route("/papers/create", post(handlers::papers::create_paper))
        .route("/papers/export", get(handlers::papers::export_papers))
        .route("/papers/{id}", delete(handlers::papers::delete_paper))

        // Drive change notifications
        .route(
            "/webhooks/google-drive",
            get(handlers::webhooks::verify).post(handlers::webhooks::notify),
        );

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(body_limit)
        .layer(axum::middleware::from_fn(middleware::metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}
