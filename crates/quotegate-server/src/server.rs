use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::extractors::ENDPOINT_CAPTURE;
use crate::handlers::{health::health_check, metrics::metrics_handler, proxy::proxy_request};
use crate::metrics::http::http_metrics_middleware;
use crate::middleware::{LoggingLayer, RequestIdLayer};
use crate::settings::Settings;
use crate::state::AppState;

/// Routing options taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Literal prefix of the proxy routes, e.g. `/api/crypto`.
    pub route_prefix: String,
    /// The single origin allowed by CORS.
    pub cors_allowed_origin: HeaderValue,
}

impl RouterConfig {
    /// `<prefix>/{*endpoint}`: every non-empty endpoint path.
    pub fn proxy_route(&self) -> String {
        format!("{}/{}", self.route_prefix, ENDPOINT_CAPTURE)
    }

    /// `<prefix>/`: the wildcard does not match an empty suffix.
    pub fn root_route(&self) -> String {
        format!("{}/", self.route_prefix)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/api/crypto".to_string(),
            cors_allowed_origin: HeaderValue::from_static("http://localhost:3000"),
        }
    }
}

impl From<&Settings> for RouterConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            route_prefix: settings.route_prefix.clone(),
            cors_allowed_origin: settings.cors_allowed_origin.clone(),
        }
    }
}

/// Creates the router: proxy route, `/health` and `/metrics`.
pub fn create_router(
    state: AppState,
    prometheus_handle: PrometheusHandle,
    config: &RouterConfig,
) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    let cors = CorsLayer::new()
        .allow_origin(config.cors_allowed_origin.clone())
        .allow_methods([Method::GET]);

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let app_router = Router::new()
        .route("/health", get(health_check))
        .route(&config.root_route(), get(proxy_request))
        .route(&config.proxy_route(), get(proxy_request))
        .with_state(state);

    Router::new()
        .merge(app_router)
        .merge(metrics_router)
        // MatchedPath is only visible to route layers
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(middleware_stack)
}

/// Binds `HOST:PORT` and serves until Ctrl-C or SIGTERM.
pub async fn run_server(
    settings: &Settings,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let config = RouterConfig::from(settings);
    let app = create_router(state, prometheus_handle, &config);

    let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    tracing::info!(
        "Server listening on {} (proxy route {})",
        listener.local_addr()?,
        config.proxy_route()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
