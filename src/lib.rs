pub mod api;
pub mod client;
pub mod config;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::config::ServerConfig;
use crate::services::template_store::TemplateStore;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::upload::upload_template,
        handlers::templates::get_template,
        handlers::templates::generate,
    ),
    components(
        schemas(
            handlers::health::MessageResponse,
            handlers::health::HealthResponse,
            handlers::upload::UploadResponse,
        )
    ),
    tags(
        (name = "system", description = "Service status endpoints"),
        (name = "templates", description = "Template upload and retrieval")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub templates: Arc<TemplateStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let templates = Arc::new(TemplateStore::new(
            config.storage_dir.clone(),
            config.inflate_limits(),
        ));
        Self { config, templates }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn request_span(request: &axum::http::Request<axum::body::Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(api::middleware::request_id::REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Bind the configured address. Host names such as `localhost` are resolved.
pub async fn bind_listener(config: &ServerConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port)).await
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/upload", post(handlers::upload::upload_template))
        .route("/templates/:id", get(handlers::templates::get_template))
        .route("/generate", post(handlers::templates::generate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        // Inside the request-id middleware, so spans carry the assigned id
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    tracing::info!("📥 {} {}", request.method(), request.uri());
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            "📤 Finished in {:?} with status {}",
                            latency,
                            response.status()
                        );
                    },
                ),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
