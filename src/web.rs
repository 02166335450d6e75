use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, http::HeaderValue, routing::get};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::{CorsConfig, RelayConfig};
use crate::weather::OpenMeteoClient;

/// Build the full router: welcome route, `/api` routes, tracing and CORS.
pub fn build_app(config: &RelayConfig) -> Result<Router> {
    let state = Arc::new(AppState {
        open_meteo: OpenMeteoClient::new(&config.upstream)?,
    });

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors)?);

    Ok(Router::new()
        .route("/", get(api::root))
        .nest("/api", api::router())
        .layer(layers)
        .with_state(state))
}

/// Any origin, method and header. Origins, methods and headers are mirrored
/// from the request because a literal `*` may not be combined with credentials.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origin = if config.allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| "Invalid CORS origin")?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials))
}

pub async fn run(config: RelayConfig) -> Result<()> {
    let app = build_app(&config)?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "Server error")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/weather/city?city=Paris")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-custom-header")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_preflight_allows_any_origin_with_credentials() {
        let app = build_app(&RelayConfig::default()).unwrap();
        let response = app.oneshot(preflight("http://localhost:5173")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "x-custom-header");
    }

    #[tokio::test]
    async fn test_restricted_origins_reject_others() {
        let mut config = RelayConfig::default();
        config.cors.allowed_origins = vec!["https://weather.example".to_string()];
        let app = build_app(&config).unwrap();

        let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_simple_request_gets_cors_headers() {
        let app = build_app(&RelayConfig::default()).unwrap();
        let request = Request::get("/")
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let config = CorsConfig {
            allowed_origins: vec!["http://bad\norigin".to_string()],
            allow_credentials: true,
        };
        assert!(cors_layer(&config).is_err());
    }
}
