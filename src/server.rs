//! # Server Configuration
//!
//! This module contains the server setup and configuration for the LocalList
//! API: shared application state, the router with the tenant rewrite
//! middleware in front of it, and the OpenAPI document.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::captcha::CaptchaVerifier;
use crate::config::AppConfig;
use crate::handlers;
use crate::mail::{self, Mailer};
use crate::routing::tenant_rewrite_middleware;
use crate::telemetry::{TraceContext, with_trace_context};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    /// Shared HTTP client for all outbound calls (Sheets, CAPTCHA, storage).
    pub http: reqwest::Client,
    pub captcha: Arc<CaptchaVerifier>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Build application state from configuration and an initialized pool.
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let http = reqwest::Client::new();
        let captcha = Arc::new(CaptchaVerifier::from_config(
            http.clone(),
            &config.captcha,
        ));
        let mailer = mail::from_config(http.clone(), &config.mail);

        Self {
            config: Arc::new(config),
            db,
            http,
            captcha,
            mailer,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let routes = Router::new()
        .route("/healthz", get(handlers::health))
        .route("/landing", get(handlers::directory::landing))
        .route("/api/admin/sync", post(handlers::sync::run_sync))
        .route("/api/signup", post(handlers::signup::submit_signup))
        .route(
            "/api/prepare-upload",
            post(handlers::uploads::prepare_upload),
        )
        .route("/api/contact", post(handlers::contact::submit_contact))
        .route("/{domain}", get(handlers::directory::directory_home))
        .route("/{domain}/signup", get(handlers::directory::signup_page))
        .route(
            "/{domain}/thank-you-signup",
            get(handlers::directory::thank_you_page),
        )
        .route("/{domain}/{slug}", get(handlers::directory::ad_detail))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone())
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()));

    // Middleware layered on a router runs only after its routes have matched,
    // which is too late to change which handler a rewritten URI hits. The
    // rewrite therefore sits on an outer router that forwards everything to
    // the routed tree, so the rewritten URI goes through route matching.
    Router::new()
        .fallback_service(routes)
        .layer(middleware::from_fn_with_state(
            state,
            tenant_rewrite_middleware,
        ))
}

/// Assign each request a trace id, exposed to handlers and error responses
/// through the task-local trace context.
async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let context = TraceContext {
        trace_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(context.clone());
    with_trace_context(context, next.run(request)).await
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address before consuming the config.
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState::new(config, db);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::directory::landing,
        crate::handlers::directory::directory_home,
        crate::handlers::directory::ad_detail,
        crate::handlers::directory::signup_page,
        crate::handlers::directory::thank_you_page,
        crate::handlers::sync::run_sync,
        crate::handlers::signup::submit_signup,
        crate::handlers::uploads::prepare_upload,
        crate::handlers::contact::submit_contact,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::ad::AdTier,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::handlers::directory::TenantDto,
            crate::handlers::directory::AdDto,
            crate::handlers::directory::AdImageDto,
            crate::handlers::directory::LandingResponse,
            crate::handlers::directory::DirectoryResponse,
            crate::handlers::directory::AdDetailResponse,
            crate::handlers::directory::SignupPageResponse,
            crate::handlers::directory::ThankYouResponse,
            crate::handlers::sync::SyncRequestDto,
            crate::handlers::sync::SyncResponseDto,
            crate::handlers::sync::SkippedRowDto,
            crate::handlers::signup::SignupRequestDto,
            crate::handlers::signup::SignupResponseDto,
            crate::handlers::uploads::PrepareUploadRequestDto,
            crate::handlers::uploads::PrepareUploadResponseDto,
            crate::handlers::contact::ContactRequestDto,
            crate::handlers::contact::ContactResponseDto,
        )
    ),
    info(
        title = "LocalList API",
        description = "Multi-tenant local business directory platform",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
