//! HTTP surface of the research platform: JSON API, dashboard and the
//! middleware stack around them.

use analysis_core::{MarketDataProvider, NewsProvider, SocialProvider};
use analysis_orchestrator::ResearchOrchestrator;
use axum::{
    error_handling::HandleErrorLayer,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    BoxError, Json, Router,
};
use market_data_client::{AlphaVantageClient, DemoProvider, NewsApiClient, TwitterClient, YahooClient, YahooConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod analysis_routes;
pub mod company_routes;
pub mod config;
pub mod dashboard;
pub mod market_routes;
pub mod request_id;
pub mod security_headers;
pub mod sentiment_routes;
pub mod valuation_routes;

pub use config::{AppConfig, AppEnv};

use analysis_routes::analysis_routes;
use company_routes::company_routes;
use market_routes::market_routes;
use request_id::request_id_middleware;
use security_headers::security_headers_middleware;
use sentiment_routes::sentiment_routes;
use valuation_routes::valuation_routes;

/// Timeout for a single upstream HTTP call.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ResearchOrchestrator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orchestrator: ResearchOrchestrator, config: AppConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }
}

/// Envelope for every JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error. The message is what clients see; the source, when
/// present, is only logged.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    pub fn with_status(status: StatusCode, err: impl Into<anyhow::Error>) -> Self {
        let err = err.into();
        Self {
            status,
            message: err.to_string(),
            source: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            source: None,
        }
    }

    /// 500 with a fixed public message.
    pub fn internal(message: impl Into<String>, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            source: Some(err.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match (&self.source, self.status.is_server_error()) {
            (Some(source), _) => tracing::error!("{}: {:#}", self.message, source),
            (None, true) => tracing::error!("{}", self.message),
            (None, false) => tracing::debug!("{} {}", self.status, self.message),
        }
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::internal("Internal server error", err)
    }
}

/// Trimmed, upper-cased symbol; blank or missing is a 400.
pub(crate) fn require_symbol(symbol: Option<&str>) -> Result<String, AppError> {
    match symbol.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_uppercase()),
        _ => Err(AppError::bad_request("Stock symbol is required")),
    }
}

/// Trimmed free-text input; blank or missing is a 400 with `message`.
pub(crate) fn require_text(value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(AppError::bad_request(message)),
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: AppEnv,
    pub demo_mode: bool,
    pub providers: Vec<&'static str>,
    pub social_configured: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.env,
        demo_mode: state.config.demo_mode,
        providers: state.orchestrator.provider_names(),
        social_configured: state.orchestrator.has_social(),
    }))
}

/// Provider chain for the configured environment: Yahoo first, Alpha
/// Vantage when a real key is set, the built-in dataset last. News comes
/// from NewsAPI alone; without a key there are no headlines.
pub fn build_orchestrator(config: &AppConfig) -> ResearchOrchestrator {
    let settings = config.orchestrator_settings();
    if config.demo_mode {
        return ResearchOrchestrator::demo(settings);
    }

    let mut yahoo = YahooConfig {
        rate_limit: config.yahoo_rate_limit,
        timeout: UPSTREAM_TIMEOUT,
        ..YahooConfig::default()
    };
    if let Some(url) = &config.yahoo_base_url {
        yahoo.base_url = url.clone();
        yahoo.search_url = url.clone();
        // a custom host has no consent page to collect cookies from
        yahoo.cookie_url = None;
    }
    if let Some(url) = &config.yahoo_search_url {
        yahoo.search_url = url.clone();
    }

    let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();
    providers.push(Arc::new(YahooClient::new(yahoo)));
    if config.has_alpha_vantage_key() {
        providers.push(Arc::new(AlphaVantageClient::new(
            config.alpha_vantage_api_key.clone(),
            config.alpha_vantage_base_url.clone(),
            config.alpha_vantage_rate_limit,
            UPSTREAM_TIMEOUT,
        )));
    }
    providers.push(Arc::new(DemoProvider));

    let mut news_providers: Vec<Arc<dyn NewsProvider>> = Vec::new();
    if config.has_news_api_key() {
        news_providers.push(Arc::new(NewsApiClient::new(
            config.news_api_key.clone(),
            config.news_api_base_url.clone(),
            config.news_api_rate_limit,
            UPSTREAM_TIMEOUT,
        )));
    }

    let social = config.twitter_bearer_token.as_ref().map(|token| {
        Arc::new(TwitterClient::new(
            token.clone(),
            config.twitter_api_base_url.clone(),
            UPSTREAM_TIMEOUT,
        )) as Arc<dyn SocialProvider>
    });

    ResearchOrchestrator::new(providers, news_providers, social, settings)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<http::HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE])
}

async fn handle_timeout(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::with_status(StatusCode::REQUEST_TIMEOUT, anyhow::anyhow!("Request timed out"))
    } else {
        AppError::internal("Internal server error", anyhow::anyhow!(err))
    }
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(health_check))
        .merge(analysis_routes())
        .merge(company_routes())
        .merge(valuation_routes())
        .merge(sentiment_routes())
        .merge(market_routes())
        .layer(middleware::from_fn_with_state(config.enable_hsts, security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors_layer(&config.allowed_origins))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(config.request_timeout),
        )
        .with_state(state)
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,api_server=debug".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    config.log_startup();

    let orchestrator = build_orchestrator(&config);
    tracing::info!("Market data providers: {}", orchestrator.provider_names().join(" -> "));

    let addr = config.bind_address();
    let state = AppState::new(orchestrator, config);

    // expired cache entries are only evicted on lookup otherwise
    let sweeper = state.orchestrator.clone();
    let period = state.config.cache_ttl.max(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let remaining = sweeper.purge_expired_caches();
            tracing::debug!("Cache sweep done, {} entries live", remaining);
        }
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Investment research platform v{} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
