//! Axum web server for the forecast API and log viewer.
//!
//! CORS enabled so the card front-end can be served from elsewhere
//! during development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

pub use routes::{AppState, ServiceState};

/// Run the web server until shutdown is requested.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Server listening on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("Server error")?;

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/forecast", get(routes::get_forecast))
        .route(
            "/api/logs",
            get(routes::get_logs).delete(routes::clear_logs),
        )
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::aggregator::ForecastAggregator;
    use crate::logbuf::{LogBuffer, LogLevel};
    use crate::providers::{ForecastProvider, MockForecastProvider};
    use crate::types::ForecastSource;

    fn state_without_providers() -> AppState {
        let log = LogBuffer::default();
        Arc::new(ServiceState {
            aggregator: ForecastAggregator::new(None, None, None, log.clone()),
            log,
        })
    }

    /// A provider that must never be reached.
    fn untouchable_provider() -> Box<dyn ForecastProvider> {
        let mut mock = MockForecastProvider::new();
        mock.expect_source().return_const(ForecastSource::OpenMeteo);
        mock.expect_fetch_forecast().times(0);
        Box::new(mock)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(state_without_providers());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forecast_endpoint_all_absent() {
        let app = build_router(state_without_providers());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/forecast?day=6")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["accuweather"].is_null());
        assert!(json["open_meteo"].is_null());
        assert!(json["openweather"].is_null());
    }

    #[tokio::test]
    async fn test_forecast_invalid_day_is_rejected_before_any_fetch() {
        let log = LogBuffer::default();
        let state = Arc::new(ServiceState {
            aggregator: ForecastAggregator::new(
                None,
                Some(untouchable_provider()),
                None,
                log.clone(),
            ),
            log,
        });

        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/forecast?day=7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Unsupported day"));
        // The mock's times(0) expectation also panics on drop if it was called.
    }

    #[tokio::test]
    async fn test_logs_json_endpoint() {
        let state = state_without_providers();
        state.log.record(LogLevel::Warning, "heads up", None).await;

        let app = build_router(state);
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/logs?format=json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["logs"][0]["message"], "heads up");
        assert_eq!(json["logs"][0]["level"], "warning");
    }

    #[tokio::test]
    async fn test_logs_html_endpoint() {
        let app = build_router(state_without_providers());
        let resp = app
            .oneshot(Request::builder().uri("/api/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("CEEFGuru"));
        assert!(html.contains("<table>"));
    }

    #[tokio::test]
    async fn test_logs_delete_endpoint() {
        let state = state_without_providers();
        state.log.record(LogLevel::Info, "to be cleared", None).await;

        let app = build_router(state.clone());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/logs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.log.is_empty().await);
    }
}
